use anyhow::{Context, Result};
use aws_sdk_ec2::{types::Filter, Client};
use tracing::info;

use crate::provision::application::APPLICATION_NAME;

/// Name of the instance security group for one customer.
pub fn security_group_name(customer: &str) -> String {
    format!("{customer}-{APPLICATION_NAME}")
}

/// Look up or create the environment's instance security group.
///
/// Unlike the application, environment, and table, this never prompts: the
/// group is an implementation detail of environment creation, not a
/// top-level resource an operator approves.
pub async fn ensure_security_group(ec2: &Client, vpc_id: &str, customer: &str) -> Result<String> {
    let name = security_group_name(customer);
    let resp = ec2
        .describe_security_groups()
        .filters(Filter::builder().name("vpc-id").values(vpc_id).build())
        .filters(Filter::builder().name("group-name").values(name.as_str()).build())
        .send()
        .await
        .with_context(|| format!("Failed to describe security group {name}"))?;
    if let Some(group_id) = resp.security_groups().first().and_then(|sg| sg.group_id()) {
        info!("found security group {name}: {group_id}");
        return Ok(group_id.to_string());
    }

    let created = ec2
        .create_security_group()
        .group_name(name.as_str())
        .description(name.as_str())
        .vpc_id(vpc_id)
        .send()
        .await
        .with_context(|| format!("Failed to create security group {name}"))?;
    let group_id = created.group_id().context("CreateSecurityGroup response missing group id")?;
    info!("created security group {name}: {group_id}");
    Ok(group_id.to_string())
}
