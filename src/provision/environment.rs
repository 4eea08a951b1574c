use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use aws_sdk_elasticbeanstalk::{
    types::{ConfigurationOptionSetting, EnvironmentStatus, EnvironmentTier},
    Client,
};
use tokio::time::sleep;
use tracing::{debug, info};

use crate::{
    aws::tags_from_pairs,
    errors::ProvisionError,
    network::VpcLayout,
    provision::{
        application::{APPLICATION_NAME, SERVICE_ROLE_NAME},
        ProvisioningTarget,
    },
    s3::fetch_monitoring_key,
};

/// Platform version newly created environments run on.
pub const DEFAULT_SOLUTION_STACK: &str = "64bit Amazon Linux 2023 v4.3.1 running Python 3.11";

/// Environment property the monitoring agent reads its key from.
pub const MONITORING_KEY_VAR: &str = "MONITORING_API_KEY";

/// No monitoring key is published in this region's partition.
const MONITORING_KEY_SKIP_REGION: &str = "cn-north-1";

const INSTANCE_TYPE: &str = "t2.micro";
const WORKER_INSTANCE_PROFILE: &str = "export-service-elasticbeanstalk-ec2-worker-role";
const WORKER_HTTP_PATH: &str = "/export";
const WORKER_HTTP_CONNECTIONS: &str = "10";

/// Poll interval while waiting for the environment to come up.
const POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Deadline after which the ready-wait gives up.
const READY_TIMEOUT: Duration = Duration::from_secs(20 * 60);

pub async fn environment_exists(eb: &Client, environment_name: &str) -> Result<bool> {
    info!("checking for environment {environment_name:?} within {APPLICATION_NAME:?}");
    let resp = eb
        .describe_environments()
        .application_name(APPLICATION_NAME)
        .send()
        .await
        .context("Failed to describe environments")?;
    let names: Vec<&str> =
        resp.environments().iter().filter_map(|e| e.environment_name()).collect();
    info!("found {APPLICATION_NAME} environments: {names:?}");
    Ok(names.iter().any(|name| *name == environment_name))
}

/// Create the customer's worker environment inside the shared application.
pub async fn create_environment(
    eb: &Client,
    target: &ProvisioningTarget,
    aws_region: &str,
    layout: &VpcLayout,
    security_group_id: &str,
    solution_stack: &str,
) -> Result<()> {
    let tags = tags_from_pairs(&[
        ("region", aws_region.to_string()),
        ("group", APPLICATION_NAME.to_string()),
        ("env", "prod".to_string()),
        ("subenv", target.customer.clone()),
        ("name", format!("{}-{APPLICATION_NAME}", target.customer)),
    ]);
    let option_settings = vec![
        option("aws:ec2:vpc", "VPCId", layout.vpc_id.as_str()),
        option("aws:ec2:vpc", "Subnets", layout.ec2_subnets.join(", ")),
        option("aws:ec2:vpc", "ELBSubnets", layout.elb_subnets.join(", ")),
        option("aws:ec2:vpc", "DBSubnets", layout.db_subnets.join(", ")),
        option("aws:ec2:vpc", "AssociatePublicIpAddress", "true"),
        option("aws:autoscaling:launchconfiguration", "SecurityGroups", security_group_id),
        option("aws:autoscaling:launchconfiguration", "InstanceType", INSTANCE_TYPE),
        option("aws:autoscaling:launchconfiguration", "IamInstanceProfile", WORKER_INSTANCE_PROFILE),
        option("aws:elasticbeanstalk:environment", "EnvironmentType", "SingleInstance"),
        option("aws:elasticbeanstalk:environment", "ServiceRole", SERVICE_ROLE_NAME),
    ];
    let resp = eb
        .create_environment()
        .application_name(APPLICATION_NAME)
        .environment_name(target.environment_name.as_str())
        .tier(EnvironmentTier::builder().name("Worker").r#type("SQS/HTTP").build())
        .set_tags(Some(tags))
        .solution_stack_name(solution_stack)
        .set_option_settings(Some(option_settings))
        .send()
        .await
        .with_context(|| format!("Failed to create environment {}", target.environment_name))?;
    debug!("create environment returned {:?}", resp.environment_id());
    Ok(())
}

/// Block until the environment reports Ready.
///
/// Everything after creation (option settings, resource discovery) needs a
/// Ready environment, so the whole run waits here. The deadline turns a
/// stuck launch into a clear error instead of an endless loop.
pub async fn wait_until_ready(eb: &Client, environment_name: &str) -> Result<(), ProvisionError> {
    let started = Instant::now();
    loop {
        let status = environment_status(eb, environment_name)
            .await
            .map_err(|cause| ProvisionError::CheckFailed { kind: "environment status", cause })?;
        info!("environment status: {}", status.as_str());
        if status == EnvironmentStatus::Ready {
            return Ok(());
        }
        if started.elapsed() >= READY_TIMEOUT {
            return Err(ProvisionError::ReadyTimeout {
                environment: environment_name.to_string(),
                timeout: READY_TIMEOUT,
            });
        }
        sleep(POLL_INTERVAL).await;
    }
}

async fn environment_status(eb: &Client, environment_name: &str) -> Result<EnvironmentStatus> {
    let resp = eb
        .describe_environments()
        .application_name(APPLICATION_NAME)
        .environment_names(environment_name)
        .send()
        .await
        .context("Failed to describe environment status")?;
    let env = resp
        .environments()
        .first()
        .with_context(|| format!("Environment {environment_name} missing from describe response"))?;
    env.status().cloned().context("Environment has no status")
}

/// Apply the worker daemon settings, plus the monitoring key where one
/// exists for the region.
pub async fn configure_environment(
    eb: &Client,
    s3: &aws_sdk_s3::Client,
    environment_name: &str,
    aws_region: &str,
    key_bucket: &str,
) -> Result<()> {
    let mut option_settings = vec![
        option("aws:elasticbeanstalk:sqsd", "HttpPath", WORKER_HTTP_PATH),
        option("aws:elasticbeanstalk:sqsd", "HttpConnections", WORKER_HTTP_CONNECTIONS),
    ];
    if aws_region == MONITORING_KEY_SKIP_REGION {
        info!("skipping monitoring key since there is none in {aws_region}");
    } else {
        let key = fetch_monitoring_key(s3, key_bucket).await?;
        option_settings.push(option(
            "aws:elasticbeanstalk:application:environment",
            MONITORING_KEY_VAR,
            key,
        ));
    }
    eb.update_environment()
        .application_name(APPLICATION_NAME)
        .environment_name(environment_name)
        .set_option_settings(Some(option_settings))
        .send()
        .await
        .with_context(|| format!("Failed to update environment {environment_name}"))?;
    Ok(())
}

fn option(namespace: &str, name: &str, value: impl Into<String>) -> ConfigurationOptionSetting {
    ConfigurationOptionSetting::builder()
        .namespace(namespace)
        .option_name(name)
        .value(value.into())
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_setting_carries_all_three_fields() {
        let setting = option("aws:ec2:vpc", "Subnets", "subnet-a, subnet-b");
        assert_eq!(setting.namespace(), Some("aws:ec2:vpc"));
        assert_eq!(setting.option_name(), Some("Subnets"));
        assert_eq!(setting.value(), Some("subnet-a, subnet-b"));
    }
}
