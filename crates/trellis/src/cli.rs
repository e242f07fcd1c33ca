//! CLI command structure using clap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "trellis")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log compile and render steps (same as TRELLIS_LOG=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (defaults to ./trellis.toml when present)
    #[arg(short, long, global = true, env = "TRELLIS_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compile a template and render it against a data file
    Render {
        /// Template to render
        template: PathBuf,

        /// Backing data (.json or .toml); empty object when omitted
        #[arg(short, long)]
        data: Option<PathBuf>,

        /// Write output here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compile a template without rendering it
    Check {
        /// Template to check
        template: PathBuf,

        /// Backing shape descriptor (.json or .toml); any shape when omitted
        #[arg(short, long)]
        shape: Option<PathBuf>,
    },

    /// List registered directive keys
    Directives {
        #[arg(long)]
        json: bool,
    },
}
