use serde_json::{json, Value};

use crate::arn::Arn;

pub mod reconcile;
pub mod store;

pub use reconcile::reconcile;
pub use store::{CurrentPolicy, PolicyStore};

/// Name of the shared access policy each run appends grants to.
pub const POLICY_NAME: &str = "allow-export-service-configuration";

/// Maximum number of versions IAM retains per policy.
pub const MAX_POLICY_VERSIONS: usize = 5;

/// One (action-set, resource) pair that must be present in some statement of
/// the policy document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grant {
    pub actions: Vec<String>,
    pub resource: String,
}

impl Grant {
    pub fn new(actions: &[&str], resource: impl Into<String>) -> Self {
        Self {
            actions: actions.iter().map(|a| a.to_string()).collect(),
            resource: resource.into(),
        }
    }

    /// The action set as the JSON value a statement's `Action` must exactly
    /// equal for this grant to apply.
    pub(crate) fn actions_value(&self) -> Value {
        json!(self.actions)
    }
}

/// Grants a freshly provisioned environment needs: stack updates for its
/// deployment stack and message sends for its worker queue.
///
/// Both ARNs are derived from the caller's identity so they land in the
/// right partition and account.
pub fn required_grants(caller: &Arn, region: &str, queue_name: &str, stack_name: &str) -> Vec<Grant> {
    let queue_arn = caller.derive("sqs", region, &caller.account, queue_name);
    let stack_arn =
        caller.derive("cloudformation", region, &caller.account, &format!("stack/{stack_name}/*"));
    vec![
        Grant::new(
            &["cloudformation:UpdateStack", "cloudformation:CancelUpdateStack"],
            stack_arn.to_string(),
        ),
        Grant::new(&["sqs:SendMessage"], queue_arn.to_string()),
    ]
}
