pub mod build;
pub mod inventory;

use crate::app_error::AppError;
use crate::config::{self, Config};
use crate::envfile::{self, EnvFileError};
use crate::output;
use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::{CommandFactory, ValueEnum};
use clap_complete::{Generator, generate};
use std::collections::HashMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

const DEFAULT_DOTENV_PATH: &str = ".env";

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

pub(crate) fn clap_styles() -> Styles {
    Styles::plain()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .error(AnsiColor::Red.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default())
        .literal(AnsiColor::Cyan.on_default())
        .placeholder(AnsiColor::Cyan.on_default())
        .valid(AnsiColor::Cyan.on_default())
        .invalid(AnsiColor::Cyan.on_default())
        .context(AnsiColor::White.on_default())
        .context_value(AnsiColor::Cyan.on_default())
}

/// Loads the settings file, defaulting to `./cloudops.yml` when present.
pub(crate) fn load_config(path: Option<&Path>) -> Result<Config, AppError> {
    let explicit = path.is_some();
    let path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(config::DEFAULT_PATH));

    Ok(config::load_optional(&path, explicit)?)
}

/// Variables from the dotenv file. The default `.env` is optional; an explicit one is not.
pub(crate) fn load_dotenv(
    path: Option<&Path>,
    disabled: bool,
) -> Result<HashMap<String, String>, AppError> {
    if disabled {
        return Ok(HashMap::new());
    }

    let explicit = path.is_some();
    let path = path.unwrap_or_else(|| Path::new(DEFAULT_DOTENV_PATH));

    match envfile::read(path) {
        Ok(vars) => Ok(vars),
        Err(EnvFileError::NotFound(_)) if !explicit => Ok(HashMap::new()),
        Err(EnvFileError::NotFound(missing)) => Err(AppError::usage(format!(
            "env file {} not found",
            output::command(&missing.display().to_string())
        ))),
        Err(err) => Err(err.into()),
    }
}

pub(crate) fn print_completion<C: CommandFactory>(
    shell: Shell,
    bin_name: &str,
) -> Result<(), AppError> {
    let mut cmd = C::command();
    let mut stdout = io::stdout().lock();

    match shell {
        Shell::Bash => {
            write_completion(clap_complete::shells::Bash, &mut cmd, bin_name, &mut stdout)
        }
        Shell::Zsh => write_completion(clap_complete::shells::Zsh, &mut cmd, bin_name, &mut stdout),
        Shell::Fish => {
            write_completion(clap_complete::shells::Fish, &mut cmd, bin_name, &mut stdout)
        }
        Shell::Powershell => write_completion(
            clap_complete::shells::PowerShell,
            &mut cmd,
            bin_name,
            &mut stdout,
        ),
    }
    .map_err(|e| AppError::internal(format!("generate completion: {e}")))
}

fn write_completion<G: Generator>(
    generator: G,
    cmd: &mut clap::Command,
    bin_name: &str,
    writer: &mut impl Write,
) -> Result<(), io::Error> {
    generate(generator, cmd, bin_name, writer);
    writer.flush()
}
