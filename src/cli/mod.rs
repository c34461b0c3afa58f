pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{AppsArgs, CliArgs, Commands, DeployArgs, DetectArgs, HealthArgs, ServiceArgs};
pub use output::{OutputFormat, OutputFormatter};
