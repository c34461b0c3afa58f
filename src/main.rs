use slugship::cli::commands::{CliArgs, Commands};
use slugship::cli::handlers::{handle_apps, handle_deploy, handle_detect, handle_health};
use slugship::util::logging::{self, parse_level, LoggingConfig};
use slugship::{NAME, VERSION};

use clap::Parser;
use std::process;
use tracing::{debug, Level};

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();
    init_logging_from_args(&args);

    debug!("{} v{} starting", NAME, VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match &args.command {
        Commands::Deploy(deploy_args) => handle_deploy(deploy_args).await,
        Commands::Apps(apps_args) => handle_apps(apps_args).await,
        Commands::Health(health_args) => handle_health(health_args).await,
        Commands::Detect(detect_args) => handle_detect(detect_args).await,
    };

    process::exit(exit_code);
}

/// Flags take precedence over `SLUGSHIP_LOG_LEVEL`
fn init_logging_from_args(args: &CliArgs) {
    let from_env = logging::config_from_env();

    let level = if let Some(level_str) = &args.log_level {
        parse_level(level_str)
    } else if args.verbose {
        Level::DEBUG
    } else if args.quiet {
        Level::ERROR
    } else {
        from_env.level
    };

    logging::init_logging(LoggingConfig { level, ..from_env });
}
