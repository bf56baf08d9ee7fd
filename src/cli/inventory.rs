use crate::app_error::AppError;
use crate::cli::{Shell, clap_styles, load_config, load_dotenv, print_completion};
use crate::config::{Config, ResolvedInventory, SourceKind};
use crate::credentials::Credentials;
use crate::inventory::{self, Collaborators, InventoryDocument};
use crate::kvstore::{DynamoDbClient, KeyValueStore};
use crate::logging;
use crate::secrets::{SecretService, SecretsManagerClient};
use crate::version;
use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;

const BIN_NAME: &str = "cloudops-inventory";

#[derive(Debug, Parser)]
#[command(
    name = "cloudops-inventory",
    version = version::VALUE,
    about = "Ansible dynamic inventory",
    styles = clap_styles()
)]
struct Cli {
    /// Print the whole inventory
    #[arg(long)]
    list: bool,

    /// Print variables for one host
    #[arg(long, value_name = "NAME")]
    host: Option<String>,

    /// Indent the JSON document
    #[arg(long)]
    pretty: bool,

    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long = "env-file")]
    env_file: Option<PathBuf>,

    #[arg(long = "no-dotenv")]
    no_dotenv: bool,

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

    logging::init(cli.verbose);

    if cli.list {
        let cfg = load_config(cli.config.as_deref())?;
        let settings = cfg.resolve_inventory();
        let credentials = if settings.needs_credentials() {
            let dotenv = load_dotenv(cli.env_file.as_deref(), cli.no_dotenv)?;
            Some(Credentials::from_env(&dotenv)?)
        } else {
            None
        };

        let document = list_document(&cfg, &settings, credentials.as_ref())?;
        return print_document(&document, cli.pretty);
    }

    if let Some(name) = cli.host.as_deref() {
        return print_document(&inventory::host(name), cli.pretty);
    }

    Ok(())
}

fn list_document(
    cfg: &Config,
    settings: &ResolvedInventory,
    credentials: Option<&Credentials>,
) -> Result<InventoryDocument, AppError> {
    let client_error = |e: crate::aws::ServiceError| AppError::internal(e.to_string());

    let store = match credentials {
        Some(creds) if settings.sources.contains(&SourceKind::Remote) => {
            Some(DynamoDbClient::new(creds, cfg.endpoints.dynamodb()).map_err(client_error)?)
        }
        _ => None,
    };

    let secrets = match (credentials, settings.secret.as_ref()) {
        (Some(creds), Some(secret)) if settings.sources.contains(&SourceKind::Secret) => {
            let creds = if secret.region.trim().is_empty() {
                creds.clone()
            } else {
                creds.with_region(secret.region.trim())
            };
            let endpoint = if secret.endpoint.trim().is_empty() {
                cfg.endpoints.secretsmanager()
            } else {
                Some(secret.endpoint.trim())
            };
            Some(SecretsManagerClient::new(&creds, endpoint).map_err(client_error)?)
        }
        _ => None,
    };

    let collaborators = Collaborators {
        store: store.as_ref().map(|client| client as &dyn KeyValueStore),
        secrets: secrets.as_ref().map(|client| client as &dyn SecretService),
    };

    Ok(inventory::generate(settings, &collaborators)?)
}

fn print_document(document: &InventoryDocument, pretty: bool) -> Result<(), AppError> {
    let text = document
        .to_json(pretty)
        .map_err(|e| AppError::internal(format!("encode inventory json: {e}")))?;

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{text}").map_err(|e| AppError::internal(format!("write output: {e}")))
}
