use anyhow::Context;
use aws_sdk_elasticbeanstalk::Client;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::errors::ProvisionError;

/// Queue the worker daemon polls; the platform generates its real name.
const WORKER_QUEUE: &str = "WorkerQueue";

static QUEUE_NAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"/(awseb-e-.*)").unwrap());
static STACK_NAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(awseb-e-.*-stack)").unwrap());

/// Short names of the environment's generated worker queue and deployment
/// stack, as needed to build policy grant ARNs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentResources {
    pub queue_name: String,
    pub stack_name: String,
}

/// Extract the generated queue and stack names from the environment's
/// resource listing. Both are pattern matches over platform-generated
/// names; a miss is fatal, there is no fallback.
pub async fn discover(
    eb: &Client,
    environment_name: &str,
) -> Result<EnvironmentResources, ProvisionError> {
    let resp = eb
        .describe_environment_resources()
        .environment_name(environment_name)
        .send()
        .await
        .context("Failed to describe environment resources")
        .map_err(|cause| ProvisionError::CheckFailed { kind: "environment resources", cause })?;
    let resources = resp.environment_resources().ok_or_else(|| {
        ProvisionError::DiscoveryFailed {
            what: "environment resources",
            environment: environment_name.to_string(),
        }
    })?;

    let queue_name = resources
        .queues()
        .iter()
        .find(|queue| queue.name() == Some(WORKER_QUEUE))
        .and_then(|queue| queue.url())
        .and_then(queue_name_from_url)
        .ok_or_else(|| ProvisionError::DiscoveryFailed {
            what: "worker queue",
            environment: environment_name.to_string(),
        })?;

    let stack_name = resources
        .launch_configurations()
        .first()
        .and_then(|config| config.name())
        .and_then(stack_name_from_launch_config)
        .ok_or_else(|| ProvisionError::DiscoveryFailed {
            what: "deployment stack",
            environment: environment_name.to_string(),
        })?;

    debug!("discovered queue {queue_name} and stack {stack_name}");
    Ok(EnvironmentResources { queue_name, stack_name })
}

/// The queue's short name is the `awseb-e-…` tail of its URL.
fn queue_name_from_url(url: &str) -> Option<String> {
    QUEUE_NAME_RE.captures(url).map(|caps| caps[1].to_string())
}

/// The stack name is the `awseb-e-…-stack` token inside the generated
/// launch-configuration name.
fn stack_name_from_launch_config(name: &str) -> Option<String> {
    STACK_NAME_RE.captures(name).map(|caps| caps[1].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_name_is_the_url_tail() {
        let url =
            "https://sqs.us-east-1.amazonaws.com/123456789012/awseb-e-mnp3abcd-stack-AWSEBWorkerQueue-1XY2Z";
        assert_eq!(
            queue_name_from_url(url).as_deref(),
            Some("awseb-e-mnp3abcd-stack-AWSEBWorkerQueue-1XY2Z")
        );
    }

    #[test]
    fn queue_name_requires_the_generated_prefix() {
        assert_eq!(queue_name_from_url("https://sqs.us-east-1.amazonaws.com/1/plain-queue"), None);
    }

    #[test]
    fn stack_name_is_cut_at_the_stack_suffix() {
        let launch_config = "awseb-e-mnp3abcd-stack-AWSEBAutoScalingLaunchConfiguration-9QR8S";
        assert_eq!(
            stack_name_from_launch_config(launch_config).as_deref(),
            Some("awseb-e-mnp3abcd-stack")
        );
    }

    #[test]
    fn stack_name_requires_both_prefix_and_suffix() {
        assert_eq!(stack_name_from_launch_config("awseb-e-mnp3abcd"), None);
        assert_eq!(stack_name_from_launch_config("custom-launch-config"), None);
    }
}
