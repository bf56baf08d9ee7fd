pub mod app_error;
pub mod aws;
pub mod cli;
pub mod codebuild;
pub mod config;
pub mod credentials;
pub mod envfile;
pub mod inventory;
pub mod kvstore;
pub mod logging;
pub mod logs;
pub mod model;
pub mod output;
pub mod poller;
pub mod secrets;
pub mod version;

pub fn run_build() -> i32 {
    exit_code(cli::build::run_cli())
}

pub fn run_inventory() -> i32 {
    exit_code(cli::inventory::run_cli())
}

fn exit_code(result: Result<(), app_error::AppError>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("{err}");
            err.code()
        }
    }
}
