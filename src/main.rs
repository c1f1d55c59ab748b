//! Sealbox CLI - settings and key-ring management.

use std::process;

use clap::Parser;
use sealbox::cli::{Cli, Commands, ConfigCommands, KeyCommands};
use sealbox::commands::{self, ConfigSetOptions, Output};
use sealbox::config::ConfigPaths;
use tracing_subscriber::EnvFilter;

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let human = cli.human_readable;
    let paths = ConfigPaths::discover();

    if let Err(e) = run_command(cli.command, &paths, human) {
        if human {
            eprintln!("Error: {}", e);
        } else {
            eprintln!(r#"{{"error": "{}"}}"#, e);
        }
        process::exit(1);
    }
}

/// Log to stderr, filtered by SBX_LOG (default: warnings only).
fn init_tracing() {
    let filter = EnvFilter::try_from_env("SBX_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_command(command: Commands, paths: &ConfigPaths, human: bool) -> Result<(), sealbox::Error> {
    match command {
        Commands::Config { command } => match command {
            ConfigCommands::Show => {
                let result = commands::config_show(paths)?;
                output(&result, human);
            }
            ConfigCommands::Save { mode } => {
                let result = commands::config_save(paths, &mode)?;
                output(&result, human);
            }
            ConfigCommands::Set {
                foreground,
                background,
                window_state,
                font_name,
                font_size,
                font_style,
            } => {
                let options = ConfigSetOptions {
                    foreground,
                    background,
                    window_start_state: window_state,
                    font_name,
                    font_size,
                    font_style,
                };
                let result = commands::config_set(paths, options)?;
                output(&result, human);
            }
        },

        Commands::Keys { command } => match command {
            KeyCommands::List => {
                let result = commands::keys_list(paths)?;
                output(&result, human);
            }
            KeyCommands::Import { files, purge } => {
                let result = commands::keys_import(paths, &files, purge)?;
                output(&result, human);
            }
            KeyCommands::Export {
                fingerprint,
                out,
                private,
            } => {
                let result = commands::keys_export(paths, &fingerprint, out.as_deref(), private)?;
                output(&result, human);
            }
        },
    }

    Ok(())
}

fn output<T: Output>(result: &T, human: bool) {
    if human {
        println!("{}", result.to_human());
    } else {
        println!("{}", result.to_json());
    }
}
