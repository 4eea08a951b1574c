use std::io::Write;

use anyhow::{Context, Result};
use osprey::{
    aws::AwsClients,
    cli::{
        commands::{
            deploy::DeployArgs,
            regions::{RegionsArgs, RegionsOutputFormat},
        },
        global::Command,
        CommandLineArgs, GlobalArgs,
    },
    errors::ProvisionError,
    prompt::TerminalConfirm,
    provision::{DeployPlan, Deployer, ProvisioningTarget},
    regions::RegionRegistry,
};
use tokio::runtime::Builder;
use tracing::{error, info};
use tracing_core::metadata::LevelFilter;
use tracing_subscriber::{
    self, fmt, prelude::__tracing_subscriber_SubscriberExt, registry, util::SubscriberInitExt,
};

fn main() -> anyhow::Result<()> {
    // Parse command-line arguments
    let args = CommandLineArgs::parse_args();

    // Set up the Tokio runtime; the workflow is sequential, so a small
    // multi-thread runtime is plenty
    let runtime =
        Builder::new_multi_thread().enable_all().build().context("Failed to create Tokio runtime")?;
    runtime.block_on(async_main(args))
}

fn setup_logging(global_args: &GlobalArgs) {
    // Determine log level based on global verbosity
    let (level, all_targets) = if global_args.quiet {
        (LevelFilter::ERROR, false)
    } else {
        let level = match global_args.verbose {
            0 => LevelFilter::INFO,  // Default level if no `-v` is provided
            1 => LevelFilter::DEBUG, // `-v`
            _ => LevelFilter::TRACE, // `-vv` or more
        };
        let all_targets = global_args.verbose > 2; // Enable all targets for `-vvv` or more
        (level, all_targets)
    };
    // Create a filter for logging
    let filter = if all_targets {
        // Enable TRACE for all modules
        tracing_subscriber::filter::Targets::new().with_default(LevelFilter::TRACE)
    } else {
        // Per-target filtering, only chatty for osprey itself
        tracing_subscriber::filter::Targets::new()
            .with_default(LevelFilter::ERROR)
            .with_target("osprey", level)
    };
    // Configure the formatter layer
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr) // Write logs to stderr
        .with_target(true)
        .with_ansi(false)
        .without_time();
    registry().with(fmt_layer).with(filter).init();
}

async fn async_main(args: CommandLineArgs) -> Result<()> {
    setup_logging(&args.global_args);
    match args.command {
        Command::Deploy(deploy_args) => {
            if let Err(err) = run_deploy(deploy_args).await {
                // A decline is a normal way out, not a failure; everything
                // else is fatal and already carries its step in the message.
                match err.downcast_ref::<ProvisionError>() {
                    Some(decline) if decline.is_decline() => {
                        info!("{decline}; exiting");
                        std::process::exit(2);
                    }
                    _ => {
                        error!("{err:#}");
                        std::process::exit(1);
                    }
                }
            }
        }
        Command::Regions(ref regions_args) => {
            run_regions_list(regions_args)?;
        }
    }
    Ok(())
}

async fn run_deploy(args: DeployArgs) -> Result<()> {
    let registry = RegionRegistry::builtin();
    let region = registry.resolve(&args.region).with_context(|| {
        format!("Unknown region {:?}; run `osprey regions` for the list", args.region)
    })?;
    let vpc_id = match &args.vpc_id {
        Some(vpc_id) => vpc_id.clone(),
        // default to deploying into the region's shared VPC
        None => region
            .default_vpc()
            .with_context(|| {
                format!("Region {} has no default VPC; pass --vpc-id", region.aws_name)
            })?
            .to_string(),
    };

    let clients = AwsClients::connect(args.profile.as_deref(), region.aws_name).await;
    let plan = DeployPlan {
        target: ProvisioningTarget::new(&args.customer_name, &args.environment),
        region,
        profile: args.profile,
        vpc_id,
        key_bucket: args.key_bucket,
        solution_stack: args.solution_stack,
    };
    let mut confirm = TerminalConfirm;
    Deployer::new(&clients, &mut confirm, plan).run().await?;
    Ok(())
}

/// Run the regions list command
fn run_regions_list(args: &RegionsArgs) -> Result<()> {
    let registry = RegionRegistry::builtin();
    let mut writer = std::io::stdout().lock();
    match args.format {
        RegionsOutputFormat::Pretty => {
            writeln!(
                writer,
                "{:4} │ {:14} │ {:6} │ {:6} │ {:12} │ Services VPC",
                "Name", "AWS Name", "Part.", "ISO", "DIP VPC"
            )?;
            for region in registry.regions() {
                writeln!(
                    writer,
                    "{:4} │ {:14} │ {:6} │ {:6} │ {:12} │ {}",
                    region.name,
                    region.aws_name,
                    region.partition,
                    region.iso_name,
                    region.dip_vpc.unwrap_or("-"),
                    region.services_vpc.unwrap_or("-"),
                )?;
            }
        }
        RegionsOutputFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, &registry.regions())?;
            writeln!(writer)?;
        }
    }
    Ok(())
}
