//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Live preview client for the parametric aircraft backend
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Print debug output (connection transitions, dropped sends)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path (default: aerolink.toml if present)
    #[arg(short = 'C', long, global = true, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Stream a design file to the backend and re-send it on every save
    #[command(visible_alias = "p")]
    Preview {
        /// Design JSON in wire format (snake_case keys)
        #[arg(value_hint = clap::ValueHint::FilePath)]
        design: PathBuf,

        /// Backend WebSocket URL (overrides [connection] url)
        #[arg(short, long)]
        url: Option<String>,
    },

    /// Decode a captured binary frame and print a summary
    #[command(visible_alias = "d")]
    Decode {
        /// Raw frame bytes as received from the backend
        #[arg(value_hint = clap::ValueHint::FilePath)]
        file: PathBuf,
    },
}

impl Cli {
    /// URL given on the command line, if any.
    pub fn url_override(&self) -> Option<&str> {
        match &self.command {
            Commands::Preview { url, .. } => url.as_deref(),
            Commands::Decode { .. } => None,
        }
    }
}
