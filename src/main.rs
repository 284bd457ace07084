use anyhow::Result;
use clap::Parser;

mod browser;
mod cli;
mod commands;
mod config;
mod controller;
mod fetch;
mod fragment;
mod layout;
mod loader;
mod models;
mod page;
mod routing;
mod tui;

use cli::{Cli, Commands};
use commands::common;
use config::Config;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config)?;

    match cli.command {
        Commands::View(args) => {
            let _guard = common::init_file_logging(&config.log_filter, &config.log_dir())?;
            commands::view::execute(args, config).await
        }
        Commands::Path(args) => {
            common::init_stderr_logging(&config.log_filter)?;
            commands::path::execute(args)
        }
        Commands::Resolve(args) => {
            common::init_stderr_logging(&config.log_filter)?;
            commands::resolve::execute(args, &config)
        }
    }
}
