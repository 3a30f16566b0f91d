use aerolink::cli::{self, Cli, Commands};
use aerolink::config::ClientConfig;
use aerolink::logger;
use anyhow::Result;
use clap::{ColorChoice, Parser};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    match &cli.command {
        Commands::Preview { design, .. } => {
            let config = ClientConfig::load(&cli)?;
            cli::preview::run_preview(design, &config)
        }
        Commands::Decode { file } => cli::decode::decode_file(file),
    }
}
