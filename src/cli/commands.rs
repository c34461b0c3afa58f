use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Detect runtime settings for GitHub repositories and dispatch them to Nomad
#[derive(Parser, Debug)]
#[command(
    name = "slugship",
    about = "Detect runtime settings for GitHub repositories and dispatch them to Nomad",
    version,
    author,
    long_about = "slugship clones owner/repo slugs, works out how each one is built and run, \
                  stores the resulting deployment config in Consul KV and dispatches a \
                  parameterized Nomad job for it. Each slug succeeds or fails on its own."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - only log errors"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Deploy a batch of repositories",
        long_about = "Clones and analyzes each repository, stores its config in Consul and \
                      dispatches a Nomad job. One result is printed per slug, in order.\n\n\
                      Examples:\n  \
                      slugship deploy acme/web acme/api\n  \
                      slugship deploy --request body.json\n  \
                      echo '{\"slugs\":[\"acme/web\"]}' | slugship deploy --request -"
    )]
    Deploy(DeployArgs),

    #[command(
        about = "List deployed apps",
        long_about = "Reads every stored deployment config under apps/ in Consul KV.\n\n\
                      Examples:\n  \
                      slugship apps\n  \
                      slugship apps --format json"
    )]
    Apps(AppsArgs),

    #[command(about = "Report liveness without contacting any service")]
    Health(HealthArgs),

    #[command(
        about = "Analyze a local checkout without deploying it",
        long_about = "Runs app type detection and repository analysis on a directory and \
                      prints the deployment config it would produce.\n\n\
                      Examples:\n  \
                      slugship detect\n  \
                      slugship detect ./my-app --slug acme/my-app --format yaml"
    )]
    Detect(DetectArgs),
}

/// Service endpoint overrides shared by commands that talk to Consul or Nomad
#[derive(Parser, Debug, Clone, Default)]
pub struct ServiceArgs {
    #[arg(long, value_name = "URL", help = "Consul HTTP address (overrides CONSUL_ADDR)")]
    pub consul_addr: Option<String>,

    #[arg(long, value_name = "URL", help = "Nomad HTTP address (overrides NOMAD_ADDR)")]
    pub nomad_addr: Option<String>,

    #[arg(
        long,
        value_name = "SECONDS",
        help = "HTTP request timeout (overrides SLUGSHIP_REQUEST_TIMEOUT)"
    )]
    pub timeout: Option<u64>,
}

#[derive(Parser, Debug, Clone)]
pub struct DeployArgs {
    #[arg(value_name = "SLUGS", help = "Repository slugs in owner/repo form")]
    pub slugs: Vec<String>,

    #[arg(
        short = 'r',
        long,
        value_name = "FILE",
        conflicts_with = "slugs",
        help = "Read a {\"slugs\": [...]} request body from FILE, or stdin with '-'"
    )]
    pub request: Option<PathBuf>,

    #[arg(
        long,
        value_name = "DIR",
        help = "Checkout directory (overrides SLUGSHIP_REPOS_DIR)"
    )]
    pub repos_dir: Option<PathBuf>,

    #[command(flatten)]
    pub service: ServiceArgs,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(Parser, Debug, Clone)]
pub struct AppsArgs {
    #[command(flatten)]
    pub service: ServiceArgs,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(Parser, Debug, Clone)]
pub struct HealthArgs {
    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(Parser, Debug, Clone)]
pub struct DetectArgs {
    #[arg(
        value_name = "PATH",
        help = "Path to repository (defaults to current directory)"
    )]
    pub repository_path: Option<PathBuf>,

    #[arg(
        long,
        value_name = "OWNER/REPO",
        help = "Slug to name the app after (defaults to the directory name)"
    )]
    pub slug: Option<String>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Yaml => super::output::OutputFormat::Yaml,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}
