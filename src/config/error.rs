//! Configuration error types.

use std::path::PathBuf;

use owo_colors::OwoColorize;
use thiserror::Error;

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Config file parsing error")]
    Toml(#[from] toml::de::Error),

    #[error("Config validation error:\n{}", format_problems(.0))]
    Validation(Vec<(&'static str, String)>),
}

fn format_problems(problems: &[(&'static str, String)]) -> String {
    problems
        .iter()
        .map(|(field, message)| {
            format!(
                "{}{}{} {} {}",
                "[".dimmed(),
                field.cyan(),
                "]".dimmed(),
                "→".red(),
                message
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
