use crate::app_error::AppError;
use crate::cli::{Shell, clap_styles, load_config, load_dotenv, print_completion};
use crate::codebuild::CodeBuildClient;
use crate::credentials::Credentials;
use crate::logging;
use crate::logs::CloudWatchLogsClient;
use crate::output;
use crate::poller::Poller;
use crate::version;
use clap::Parser;
use std::io;
use std::path::PathBuf;
use std::thread;

const BIN_NAME: &str = "cloudops-build";

#[derive(Debug, Parser)]
#[command(
    name = "cloudops-build",
    version = version::VALUE,
    about = "Start a CodeBuild project build, follow its phases, and print its logs",
    styles = clap_styles()
)]
struct Cli {
    /// Name of the CodeBuild project to build
    #[arg(short = 'p', long, required_unless_present = "completion")]
    project: Option<String>,

    /// Wait before the first status poll (e.g. 10s)
    #[arg(long)]
    grace: Option<String>,

    /// Wait between status polls (e.g. 10s)
    #[arg(long)]
    interval: Option<String>,

    /// Exit with status 1 when the build does not succeed
    #[arg(long)]
    strict: bool,

    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long = "env-file")]
    env_file: Option<PathBuf>,

    #[arg(long = "no-dotenv")]
    no_dotenv: bool,

    #[arg(long = "no-color")]
    no_color: bool,

    #[arg(short, long)]
    verbose: bool,

    /// Print a shell completion script and exit
    #[arg(long, value_enum, value_name = "SHELL")]
    completion: Option<Shell>,
}

pub fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();

    if let Some(shell) = cli.completion {
        return print_completion::<Cli>(shell, BIN_NAME);
    }

    output::configure(cli.no_color);
    logging::init(cli.verbose);

    let dotenv = load_dotenv(cli.env_file.as_deref(), cli.no_dotenv)?;
    let credentials = Credentials::from_env(&dotenv)?;

    let cfg = load_config(cli.config.as_deref())?;
    let timing = cfg
        .resolve_poll(
            cli.grace.as_deref().unwrap_or_default(),
            cli.interval.as_deref().unwrap_or_default(),
        )
        .map_err(AppError::usage)?;

    let project = cli
        .project
        .ok_or_else(|| AppError::usage("--project is required"))?;

    let builds = CodeBuildClient::new(&credentials, cfg.endpoints.codebuild())
        .map_err(|e| AppError::internal(e.to_string()))?;
    let logs = CloudWatchLogsClient::new(&credentials, cfg.endpoints.logs())
        .map_err(|e| AppError::internal(e.to_string()))?;
    let poller = Poller::new(builds, logs);

    let state = {
        let mut stdout = io::stdout().lock();
        poller.drive(&project, &timing, &mut stdout, thread::sleep)?
    };

    output::print_summary(io::stderr().lock(), &state)
        .map_err(|e| AppError::internal(format!("write output: {e}")))?;

    if cli.strict && !state.status.is_success() {
        return Err(AppError::runtime(format!(
            "{} build {} finished with status {}",
            output::warning("strict:"),
            state.id,
            state.status
        )));
    }

    Ok(())
}
