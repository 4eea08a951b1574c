use clap::Args;

use crate::provision::environment::DEFAULT_SOLUTION_STACK;

/// `osprey deploy` command and flags
#[derive(Args, Debug, Clone)]
pub struct DeployArgs {
    /// AWS credentials profile from ~/.aws to use
    #[arg(long, short = 'p')]
    pub profile: Option<String>,

    /// Region to deploy into (short code, AWS name, or ISO name)
    #[arg(long, short = 'r')]
    pub region: String,

    /// VPC to deploy into (default: the region's services or deployment VPC)
    #[arg(long = "vpc-id", short = 'i', value_name = "VPC_ID")]
    pub vpc_id: Option<String>,

    /// S3 bucket holding the monitoring agent key
    #[arg(long = "key-bucket", short = 'k', default_value = "services-keys", value_name = "BUCKET")]
    pub key_bucket: String,

    /// Solution stack newly created environments run on
    #[arg(long = "solution-stack", default_value = DEFAULT_SOLUTION_STACK, value_name = "NAME")]
    pub solution_stack: String,

    /// Name of the customer, used for the subenv and the environment name.
    /// No special characters; use - instead of space, e.g. acme-consumer
    #[arg(value_name = "CUSTOMER_NAME")]
    pub customer_name: String,

    /// Environment tag, e.g. dev, staging, test, prod
    #[arg(value_name = "ENVIRONMENT")]
    pub environment: String,
}
