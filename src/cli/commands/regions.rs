use clap::{Args, ValueEnum};
use strum::Display;

/// `osprey regions` command and flags
#[derive(Args, Debug, Clone)]
pub struct RegionsArgs {
    /// Output format
    #[arg(long, short = 'f', value_enum, default_value_t = RegionsOutputFormat::Pretty)]
    pub format: RegionsOutputFormat,
}

/// Output formats for the regions listing
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, ValueEnum)]
#[strum(serialize_all = "kebab-case")]
pub enum RegionsOutputFormat {
    Pretty,
    Json,
}
