//! chartkit CLI - Helm chart repository tooling

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod commands;
mod error;
mod exit_codes;

use error::CliError;

/// Crates whose logs are shown by default
const LOG_TARGETS: &[&str] = &[
    "chartkit",
    "chartkit_core",
    "chartkit_kube",
    "chartkit_meili",
    "chartkit_release",
];

#[derive(Parser)]
#[command(name = "chartkit")]
#[command(version)]
#[command(about = "Helm chart repository tooling", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Ensure a valid Meilisearch API key is stored in a Kubernetes secret
    Provision(ProvisionArgs),

    /// Bump chart versions from git history and pull request labels
    Bump(BumpArgs),

    /// Validate every YAML file under a directory
    ValidateYaml {
        /// Directory to scan
        #[arg(default_value = "./tmp")]
        dir: PathBuf,
    },

    /// Validate a single multi-document YAML stream
    LintStream {
        /// File to read; stdin when omitted or `-`
        file: Option<PathBuf>,
    },

    /// Split a rendered manifest stream into one file per template
    Split {
        /// Rendered stream, or `-` for stdin
        input: PathBuf,

        /// Output directory
        out_dir: PathBuf,
    },

    /// Regenerate the charts table of a README
    Readme(ReadmeArgs),

    /// Render a chart with helm and list or split the output
    Render(RenderArgs),
}

#[derive(Args)]
pub struct ProvisionArgs {
    /// Meilisearch URL
    #[arg(long, env = "MEILI_HOST", default_value = "http://meilisearch:7700")]
    pub host: String,

    /// Master key
    #[arg(long, env = "MEILI_MASTER_KEY", hide_env_values = true)]
    pub master_key: String,

    /// Existing API key to keep if still valid
    #[arg(long, env = "MEILI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Namespace of the target secret
    #[arg(short, long, env = "NAMESPACE", default_value = "default")]
    pub namespace: String,

    /// Name of the target secret
    #[arg(long, env = "SECRET_NAME", default_value = "meilisearch-api-key")]
    pub secret_name: String,

    /// Description of the provisioned key
    #[arg(long, env = "API_KEY_DESCRIPTION", default_value = "Provisioned API Key")]
    pub description: String,

    /// Comma-separated indexes, `*` for all
    #[arg(long, env = "API_KEY_INDEXES", default_value = "*")]
    pub indexes: String,

    /// Comma-separated actions, `*` for all
    #[arg(long, env = "API_KEY_ACTIONS", default_value = "*")]
    pub actions: String,

    /// Kubeconfig file (defaults to KUBECONFIG, in-cluster, then ~/.kube/config)
    #[arg(long)]
    pub kubeconfig: Option<PathBuf>,

    /// Resolve the key but do not write the secret
    #[arg(long, env = "DRY_RUN")]
    pub dry_run: bool,

    /// Readiness attempts before giving up
    #[arg(long, default_value_t = 30)]
    pub max_retries: u32,

    /// Seconds between readiness attempts
    #[arg(long, default_value_t = 2)]
    pub retry_delay: u64,
}

#[derive(Args)]
pub struct BumpArgs {
    /// Repository root (defaults to the enclosing git repository)
    #[arg(long)]
    pub repo_root: Option<PathBuf>,

    /// Charts directory, relative to the repository root
    #[arg(long, default_value = "charts")]
    pub charts_dir: PathBuf,

    /// Report bumps without writing (implied by GITHUB_EVENT_NAME=pull_request)
    #[arg(long)]
    pub pr_mode: bool,

    #[arg(long, env = "GITHUB_EVENT_NAME", hide = true)]
    pub event_name: Option<String>,

    /// Step summary file written in pull-request mode
    #[arg(long, env = "GITHUB_STEP_SUMMARY")]
    pub step_summary: Option<PathBuf>,

    /// `owner/name` used for pull request label lookups
    #[arg(long, env = "GITHUB_REPOSITORY")]
    pub repository: Option<String>,

    /// Token for label lookups (GH_TOKEN or GITHUB_TOKEN)
    #[arg(long, env = "GH_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    #[arg(long, env = "GITHUB_REF", hide = true)]
    pub git_ref: Option<String>,

    /// GitHub API base URL
    #[arg(long, env = "GITHUB_API_URL", default_value = "https://api.github.com")]
    pub api_url: String,
}

#[derive(Args)]
pub struct ReadmeArgs {
    /// README containing the CHARTS markers
    pub readme: PathBuf,

    /// Charts directory (defaults to `charts` next to the README's parent)
    #[arg(long)]
    pub charts_dir: Option<PathBuf>,

    /// Repository alias used in install commands
    #[arg(long, default_value = "mbround18")]
    pub repo_alias: String,

    /// Published repository URL
    #[arg(long, default_value = "https://mbround18.github.io/helm-charts/")]
    pub repo_url: String,
}

#[derive(Args)]
pub struct RenderArgs {
    /// Chart directory
    pub chart: PathBuf,

    /// Release name
    #[arg(long, default_value = "demo")]
    pub release: String,

    /// Target namespace
    #[arg(short, long, default_value = "default")]
    pub namespace: String,

    /// Values overlay file
    #[arg(short = 'f', long = "values")]
    pub values: Option<PathBuf>,

    /// Split the rendered stream into this directory
    #[arg(long)]
    pub output_dir: Option<PathBuf>,
}

fn init_tracing(debug: bool) {
    let filter = EnvFilter::try_from_env("CHARTKIT_LOG").unwrap_or_else(|_| {
        let level = if debug { "debug" } else { "info" };
        let directives: Vec<String> = LOG_TARGETS
            .iter()
            .map(|target| format!("{}={}", target, level))
            .collect();
        EnvFilter::new(directives.join(","))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();
}

fn run(cli: Cli) -> error::Result<()> {
    match cli.command {
        Commands::Provision(args) => commands::provision::run(args),
        Commands::Bump(args) => commands::bump::run(args),
        Commands::ValidateYaml { dir } => commands::validate::run(&dir),
        Commands::LintStream { file } => commands::lint_stream::run(file.as_deref()),
        Commands::Split { input, out_dir } => commands::split::run(&input, &out_dir),
        Commands::Readme(args) => commands::readme::run(args),
        Commands::Render(args) => commands::render::run(args),
    }
}

fn main() -> ExitCode {
    // Setup miette for nice error display
    miette::set_panic_hook();

    let cli = Cli::parse();
    init_tracing(cli.debug);

    match run(cli) {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(e) => {
            let code = e.exit_code();
            eprintln!("{:?}", miette::Report::new(e));
            ExitCode::from(code as u8)
        }
    }
}

/// Build the single-threaded runtime used by async commands
pub(crate) fn runtime() -> error::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::internal(format!("failed to start async runtime: {}", e)))
}
