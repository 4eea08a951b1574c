use anyhow::{Context, Result};
use aws_sdk_elasticbeanstalk::{types::ApplicationResourceLifecycleConfig, Client};
use tracing::{debug, info};

use crate::arn::Arn;

/// Application every customer environment hangs off.
pub const APPLICATION_NAME: &str = "export-service";

/// Role the platform's lifecycle hooks run under.
pub const SERVICE_ROLE_NAME: &str = "aws-elasticbeanstalk-service-role";

pub async fn application_exists(eb: &Client) -> Result<bool> {
    info!("checking for application {APPLICATION_NAME:?}");
    let resp =
        eb.describe_applications().send().await.context("Failed to describe applications")?;
    debug!("describe applications returned {} entries", resp.applications().len());
    Ok(resp.applications().iter().any(|app| app.application_name() == Some(APPLICATION_NAME)))
}

/// Create the shared application with its lifecycle service role.
pub async fn create_application(eb: &Client, caller: &Arn) -> Result<()> {
    let service_role =
        caller.derive("iam", "", &caller.account, &format!("role/{SERVICE_ROLE_NAME}"));
    eb.create_application()
        .application_name(APPLICATION_NAME)
        .description("Customer specific export service apps")
        .resource_lifecycle_config(
            ApplicationResourceLifecycleConfig::builder()
                .service_role(service_role.to_string())
                .build(),
        )
        .send()
        .await
        .with_context(|| format!("Failed to create application {APPLICATION_NAME}"))?;
    Ok(())
}
