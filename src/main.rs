use clap::Parser;

mod api;
mod app;
mod assistant;
mod cli;
mod commands;
mod config;
mod core;
mod display;
mod input;
mod mcp;
mod providers;
mod store;
mod todo;
mod tools;

use crate::app::Application;
use crate::cli::Args;
use crate::commands::create_command_registry;
use crate::config::Config;
use crate::core::error::TodoError;
use crate::core::logging;

async fn run(args: Args) -> Result<(), TodoError> {
    let config = Config::load()?;
    let command_dispatcher = create_command_registry();
    let mut app = Application::new(args, config, command_dispatcher)?;
    app.run().await
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    logging::init(args.default_log_level());

    if let Err(e) = run(args).await {
        tracing::debug!(error = ?e, "exiting with error");
        display::display_error(&e.to_string());
        std::process::exit(1);
    }
}
