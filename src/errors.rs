use std::time::Duration;

use thiserror::Error;

/// Fatal conditions that end a provisioning run.
///
/// None of these are retried. Anything created before the failure is left
/// as-is; every step is idempotent, so a re-run picks up where this one
/// stopped.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// An existence check against the cloud API failed.
    #[error("checking for the {kind} failed: {cause:#}")]
    CheckFailed { kind: &'static str, cause: anyhow::Error },

    /// A create call failed.
    #[error("creating the {kind} failed: {cause:#}")]
    CreationFailed { kind: &'static str, cause: anyhow::Error },

    /// The operator answered no at a creation gate.
    #[error("operator declined to create the {kind}")]
    Declined { kind: &'static str },

    /// No IAM policy with the expected name exists. The tool appends to an
    /// existing policy; it never creates one from scratch.
    #[error("no IAM policy named {name:?} found; create the policy, then rerun")]
    PolicyNotFound { name: String },

    /// The policy exists but has no versions to reconcile against.
    #[error("policy {arn} has no versions to reconcile against")]
    NoPolicyVersions { arn: String },

    /// A generated resource name did not match its expected pattern.
    #[error("could not locate the {what} for environment {environment:?}")]
    DiscoveryFailed { what: &'static str, environment: String },

    /// The environment never reached Ready within the deadline.
    #[error("environment {environment:?} was not Ready after {}s", timeout.as_secs())]
    ReadyTimeout { environment: String, timeout: Duration },
}

impl ProvisionError {
    /// Declines are a normal termination path, not a failure.
    pub fn is_decline(&self) -> bool {
        matches!(self, ProvisionError::Declined { .. })
    }
}
