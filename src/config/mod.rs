//! Client configuration management for `aerolink.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── connection # [connection]
//! │   ├── history    # [history]
//! │   └── sync       # [sync]
//! ├── error          # ConfigError
//! └── mod.rs         # ClientConfig (this file)
//! ```
//!
//! # Sections
//!
//! | Section        | Purpose                                        |
//! |----------------|------------------------------------------------|
//! | `[connection]` | Backend URL, reconnect budget, error grace     |
//! | `[sync]`       | Slider throttle and text debounce windows      |
//! | `[history]`    | Undo capacity                                  |
//!
//! Every section and field is optional; a missing file means defaults.

mod error;
mod section;

pub use error::ConfigError;
pub use section::{ConnectionConfig, DEFAULT_URL, HistoryConfig, SyncConfig};

use std::{fs, path::Path, time::Duration};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{cli::Cli, log};

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "aerolink.toml";

/// Root configuration structure representing aerolink.toml
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub connection: ConnectionConfig,
    pub sync: SyncConfig,
    pub history: HistoryConfig,
}

impl ClientConfig {
    /// Load configuration for a CLI invocation and apply its overrides.
    ///
    /// An explicit `--config` must exist. Without it, `aerolink.toml` in the
    /// working directory is used when present, defaults otherwise.
    pub fn load(cli: &Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => Self::from_path(path)?,
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::from_path(path)?
                } else {
                    Self::default()
                }
            }
        };

        if let Some(url) = cli.url_override() {
            config.connection.url = url.to_owned();
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from file path with unknown field detection.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    /// Validate every section, reporting all problems at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut problems = Vec::new();
        self.connection.validate(&mut problems);
        self.sync.validate(&mut problems);
        self.history.validate(&mut problems);

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(problems))
        }
    }

    pub const fn error_grace(&self) -> Duration {
        Duration::from_millis(self.connection.error_grace_ms)
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config content.
/// Panics if there are unknown fields (to catch config typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> ClientConfig {
    let (parsed, ignored) = ClientConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    #[test]
    fn test_from_str_invalid_toml() {
        let result = ClientConfig::from_str("[connection\nurl = \"ws://x\"");
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn test_defaults_validate() {
        let config = ClientConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.error_grace(), Duration::from_millis(1500));
    }

    #[test]
    fn test_unknown_fields_detected() {
        let content = "[connection]\nmax_attempts = 2\n[unknown_section]\nfield = \"value\"";
        let (config, ignored) = ClientConfig::parse_with_ignored(content).unwrap();

        assert_eq!(config.connection.max_attempts, 2);
        assert!(ignored.iter().any(|f| f.contains("unknown_section")));
    }

    #[test]
    fn test_unknown_field_inside_section() {
        let (_, ignored) = ClientConfig::parse_with_ignored("[sync]\nthrotle_ms = 5").unwrap();
        assert_eq!(ignored, vec!["sync.throtle_ms".to_string()]);
    }

    #[test]
    fn test_validate_collects_all_problems() {
        let config = test_parse_config(
            "[connection]\nurl = \"http://x\"\n[sync]\ndebounce_ms = 0\n[history]\ncapacity = 0",
        );
        let Err(ConfigError::Validation(problems)) = config.validate() else {
            panic!("expected validation error");
        };
        let fields: Vec<_> = problems.iter().map(|(f, _)| *f).collect();
        assert_eq!(
            fields,
            ["connection.url", "sync.debounce_ms", "history.capacity"]
        );
    }

    #[test]
    fn test_load_explicit_file_with_url_override() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[connection]\nmax_attempts = 7").unwrap();

        let path = file.path().to_string_lossy().into_owned();
        let cli = Cli::parse_from([
            "aerolink",
            "-C",
            &path,
            "preview",
            "design.json",
            "--url",
            "wss://backend.example/ws/preview",
        ]);
        let config = ClientConfig::load(&cli).unwrap();

        assert_eq!(config.connection.max_attempts, 7);
        assert_eq!(config.connection.url, "wss://backend.example/ws/preview");
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");
        let err = ClientConfig::from_path(&path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::Io(..))
        ));
    }

    #[test]
    fn test_load_rejects_bad_override() {
        let cli = Cli::parse_from([
            "aerolink",
            "-C",
            "/nonexistent/aerolink.toml",
            "decode",
            "frame.bin",
        ]);
        assert!(ClientConfig::load(&cli).is_err());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aerolink.toml");
        fs::write(&path, "").unwrap();
        let path = path.to_string_lossy().into_owned();
        let cli = Cli::parse_from([
            "aerolink", "-C", &path, "preview", "d.json", "--url", "ftp://x",
        ]);
        assert!(ClientConfig::load(&cli).is_err());
    }
}
