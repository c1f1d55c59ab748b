//! CLI argument definitions for sbx.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Sealbox - settings and key-ring management for the sbx encryption tool.
#[derive(Parser, Debug)]
#[command(name = "sbx")]
#[command(author, version, about = "Settings resolution and key-ring storage for sealbox", long_about = None)]
pub struct Cli {
    /// Output in human-readable format instead of JSON
    #[arg(short = 'H', long = "human", global = true)]
    pub human_readable: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Settings inspection and persistence
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Key-ring operations
    Keys {
        #[command(subcommand)]
        command: KeyCommands,
    },
}

/// Settings commands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Resolve and print the effective settings
    ///
    /// Shows which location won (portable/global/local), the file it was
    /// read from, and the derived key-storage directory.
    Show,

    /// Persist the resolved settings to a location
    ///
    /// Auto picks portable when a portable settings file already exists,
    /// otherwise local. Only a global save keeps the restriction policy.
    Save {
        /// Target location: auto, local, global, or portable
        #[arg(long, default_value = "auto")]
        mode: String,
    },

    /// Change settings fields and save (auto mode)
    Set {
        /// Foreground color: a known color name or #RRGGBB
        #[arg(long)]
        foreground: Option<String>,

        /// Background color: a known color name or #RRGGBB
        #[arg(long)]
        background: Option<String>,

        /// Window start state: normal, minimized, or maximized
        #[arg(long = "window-state")]
        window_state: Option<String>,

        /// Font family name (requires --font-size and --font-style)
        #[arg(long, requires = "font_size", requires = "font_style")]
        font_name: Option<String>,

        /// Font size in points
        #[arg(long, requires = "font_name")]
        font_size: Option<f32>,

        /// Font style: regular, bold, italic, or bold-italic
        #[arg(long, requires = "font_name")]
        font_style: Option<String>,
    },
}

/// Key-ring commands
#[derive(Subcommand, Debug)]
pub enum KeyCommands {
    /// List stored key records
    List,

    /// Merge key record files into the ring
    ///
    /// Records equal to an already-stored key are skipped; invalid records
    /// are rejected. With --purge the ring is emptied first.
    Import {
        /// Key record files to import
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Delete every existing file before writing the new set
        #[arg(long)]
        purge: bool,
    },

    /// Export a stored key record
    Export {
        /// Fingerprint (or unique prefix) of the record
        fingerprint: String,

        /// Write to this file instead of printing
        #[arg(long)]
        out: Option<PathBuf>,

        /// Include private key components
        #[arg(long)]
        private: bool,
    },
}
