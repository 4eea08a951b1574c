use tracing::info;

pub mod application;
pub mod discovery;
pub mod ensure;
pub mod environment;
pub mod security_group;
pub mod table;

pub use ensure::{ensure_exists, EnsureOutcome};

use crate::{
    arn::Arn,
    aws::AwsClients,
    errors::ProvisionError,
    network::VpcLayout,
    policy::{self, PolicyStore},
    prompt::Confirm,
    provision::application::APPLICATION_NAME,
    provision::table::TABLE_NAME,
    regions::RegionProfile,
};

/// Who and what one run provisions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisioningTarget {
    pub customer: String,
    pub environment: String,
    /// Derived environment name, `{customer}-{environment}`.
    pub environment_name: String,
}

impl ProvisioningTarget {
    pub fn new(customer: &str, environment: &str) -> Self {
        Self {
            customer: customer.to_string(),
            environment: environment.to_string(),
            environment_name: format!("{customer}-{environment}"),
        }
    }
}

/// Resolved inputs of one deploy run.
pub struct DeployPlan<'a> {
    pub target: ProvisioningTarget,
    pub region: &'a RegionProfile,
    pub profile: Option<String>,
    pub vpc_id: String,
    pub key_bucket: String,
    pub solution_stack: String,
}

/// Drives the full ensure → wait → configure → reconcile sequence.
///
/// Strictly sequential: each step only starts once the previous one is
/// done, and every step is idempotent so a failed run can simply be
/// re-run.
pub struct Deployer<'a> {
    clients: &'a AwsClients,
    confirm: &'a mut dyn Confirm,
    plan: DeployPlan<'a>,
}

impl<'a> Deployer<'a> {
    pub fn new(clients: &'a AwsClients, confirm: &'a mut dyn Confirm, plan: DeployPlan<'a>) -> Self {
        Self { clients, confirm, plan }
    }

    pub async fn run(&mut self) -> Result<(), ProvisionError> {
        let caller = self
            .clients
            .caller_identity()
            .await
            .map_err(|cause| ProvisionError::CheckFailed { kind: "caller identity", cause })?;
        let layout = VpcLayout::gather(&self.clients.ec2, &self.plan.vpc_id)
            .await
            .map_err(|cause| ProvisionError::CheckFailed { kind: "VPC layout", cause })?;

        self.ensure_application(&caller).await?;
        self.ensure_environment(&layout).await?;
        self.ensure_table().await?;

        let environment_name = &self.plan.target.environment_name;
        environment::wait_until_ready(&self.clients.eb, environment_name).await?;
        environment::configure_environment(
            &self.clients.eb,
            &self.clients.s3,
            environment_name,
            self.plan.region.aws_name,
            &self.plan.key_bucket,
        )
        .await
        .map_err(|cause| ProvisionError::CreationFailed {
            kind: "environment configuration",
            cause,
        })?;

        self.reconcile_policy(&caller).await?;
        info!("Done");
        Ok(())
    }

    async fn ensure_application(&mut self, caller: &Arn) -> Result<EnsureOutcome, ProvisionError> {
        let eb = &self.clients.eb;
        let question = format!(
            "Did not find application {APPLICATION_NAME:?} in {} for profile {:?}.\nDo you want to create it?",
            self.plan.region.aws_name,
            self.profile_label(),
        );
        ensure_exists(
            "application",
            &question,
            &mut *self.confirm,
            || application::application_exists(eb),
            || application::create_application(eb, caller),
        )
        .await
    }

    async fn ensure_environment(
        &mut self,
        layout: &VpcLayout,
    ) -> Result<EnsureOutcome, ProvisionError> {
        let eb = &self.clients.eb;
        let ec2 = &self.clients.ec2;
        let target = &self.plan.target;
        let aws_region = self.plan.region.aws_name;
        let solution_stack = &self.plan.solution_stack;
        let question = format!(
            "Did not find environment {:?} for application {APPLICATION_NAME:?} in {aws_region} for profile {:?}.\nDo you want to create it?",
            target.environment_name,
            self.plan.profile.as_deref().unwrap_or("default"),
        );
        ensure_exists(
            "environment",
            &question,
            &mut *self.confirm,
            || environment::environment_exists(eb, &target.environment_name),
            || async move {
                // The instance security group is an implementation detail of
                // the environment, ensured silently right before use.
                let group_id =
                    security_group::ensure_security_group(ec2, &layout.vpc_id, &target.customer)
                        .await?;
                environment::create_environment(
                    eb,
                    target,
                    aws_region,
                    layout,
                    &group_id,
                    solution_stack,
                )
                .await
            },
        )
        .await
    }

    async fn ensure_table(&mut self) -> Result<EnsureOutcome, ProvisionError> {
        let ddb = &self.clients.dynamodb;
        let question = format!(
            "Did not find table {TABLE_NAME:?} in {} for profile {:?}.\nDo you want to create it?",
            self.plan.region.aws_name,
            self.profile_label(),
        );
        ensure_exists(
            "table",
            &question,
            &mut *self.confirm,
            || table::table_exists(ddb),
            || table::create_table(ddb),
        )
        .await
    }

    /// Terminal step: make the shared access policy cover the generated
    /// queue and stack, publishing a new default version only on change.
    async fn reconcile_policy(&self, caller: &Arn) -> Result<(), ProvisionError> {
        let resources =
            discovery::discover(&self.clients.eb, &self.plan.target.environment_name).await?;
        let grants = policy::required_grants(
            caller,
            self.plan.region.aws_name,
            &resources.queue_name,
            &resources.stack_name,
        );

        let store = PolicyStore::new(&self.clients.iam);
        let current = store.get_current(policy::POLICY_NAME).await?;
        let updated = policy::reconcile(&current.document, &grants);
        if updated == current.document {
            info!("no change needed for IAM policy {}", current.arn);
            return Ok(());
        }
        store
            .publish(&current.arn, &updated)
            .await
            .map_err(|cause| ProvisionError::CreationFailed { kind: "IAM policy version", cause })
    }

    fn profile_label(&self) -> &str {
        self.plan.profile.as_deref().unwrap_or("default")
    }
}
