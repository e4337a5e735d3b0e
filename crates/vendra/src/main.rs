// SPDX-FileCopyrightText: 2026 Vendra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vendra - conversation inbox and pipeline sync core for a CRM back
//! office.
//!
//! This is the binary entry point. The production deployment embeds the
//! library crates behind its own actions layer and realtime transport;
//! the binary wires the in-memory reference backend for demos and
//! diagnostics.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod demo;
mod doctor;

/// Vendra - conversation inbox and pipeline sync core.
#[derive(Parser, Debug)]
#[command(name = "vendra", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a scripted walkthrough of the core flows against the
    /// in-memory backend.
    Demo,
    /// Validate and print the effective configuration.
    Config,
    /// Health-check the configured adapters.
    Doctor,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup.
    let config = match vendra_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            vendra_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.app.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Some(Commands::Demo) => {
            if let Err(e) = demo::run(&config).await {
                eprintln!("vendra demo failed: {e}");
                std::process::exit(1);
            }
        }
        Some(Commands::Config) => match toml::to_string_pretty(&config) {
            Ok(rendered) => println!("{rendered}"),
            Err(e) => {
                eprintln!("failed to render config: {e}");
                std::process::exit(1);
            }
        },
        Some(Commands::Doctor) => {
            if let Err(e) = doctor::run().await {
                eprintln!("vendra doctor failed: {e}");
                std::process::exit(1);
            }
        }
        None => {
            println!("vendra: use --help for available commands");
        }
    }
}
