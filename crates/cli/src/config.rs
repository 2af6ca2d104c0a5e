//! `config.toml` loading.

use std::path::{Path, PathBuf};

use redline_patch::EngineConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error reading a configuration file.
	#[error("I/O error reading {path}: {error}")]
	Io {
		/// Path to the file that failed to read.
		path: PathBuf,
		/// The underlying I/O error.
		error: std::io::Error,
	},

	/// The file is not valid TOML or does not match the schema.
	#[error("invalid config {path}: {error}")]
	Parse {
		path: PathBuf,
		error: toml::de::Error,
	},
}

/// Logging options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
	/// `EnvFilter` directives used when `RUST_LOG` is unset.
	pub filter: String,
}

impl Default for LogConfig {
	fn default() -> Self {
		Self {
			filter: "redline_cli=info,redline_patch=info,warn".into(),
		}
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
	pub log: LogConfig,
	pub engine: EngineConfig,
}

impl Config {
	/// Loads `explicit` if given, else the default location if it exists, else
	/// defaults.
	pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
		match explicit {
			Some(path) => Self::from_file(path),
			None => match default_path().filter(|path| path.is_file()) {
				Some(path) => Self::from_file(&path),
				None => Ok(Self::default()),
			},
		}
	}

	pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
		let text = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
			path: path.to_path_buf(),
			error,
		})?;
		toml::from_str(&text).map_err(|error| ConfigError::Parse {
			path: path.to_path_buf(),
			error,
		})
	}
}

/// `$XDG_CONFIG_HOME/redline/config.toml` or the platform equivalent.
pub fn default_path() -> Option<PathBuf> {
	dirs::config_dir().map(|dir| dir.join("redline").join("config.toml"))
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn empty_file_is_default() {
		let config: Config = toml::from_str("").unwrap();
		assert_eq!(config, Config::default());
	}

	#[test]
	fn default_filter_targets_workspace_crates() {
		let filter = LogConfig::default().filter;
		let this_crate = module_path!().split("::").next().unwrap();
		assert!(filter.split(',').any(|d| d == format!("{this_crate}=info")), "{filter}");
		assert!(filter.split(',').any(|d| d == "redline_patch=info"), "{filter}");
		assert!(tracing_subscriber::EnvFilter::try_new(&filter).is_ok());
	}

	#[test]
	fn partial_sections_keep_defaults() {
		let config: Config = toml::from_str(
			r#"
			[engine]
			placeholder = "~"
			max_edit_cost = 500
			"#,
		)
		.unwrap();
		assert_eq!(config.engine.placeholder, "~");
		assert_eq!(config.engine.max_edit_cost, Some(500));
		assert_eq!(config.engine.retry_interval_ms, 25);
		assert_eq!(config.log, LogConfig::default());
	}

	#[test]
	fn unknown_keys_are_rejected() {
		assert!(toml::from_str::<Config>("[engine]\nplaceholdr = \"x\"").is_err());
	}

	#[test]
	fn explicit_path_must_exist() {
		let dir = tempfile::tempdir().unwrap();
		let missing = dir.path().join("nope.toml");
		assert!(matches!(Config::load(Some(&missing)), Err(ConfigError::Io { .. })));
	}

	#[test]
	fn loads_from_file() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("config.toml");
		std::fs::write(&path, "[log]\nfilter = \"debug\"\n").unwrap();
		let config = Config::load(Some(&path)).unwrap();
		assert_eq!(config.log.filter, "debug");

		std::fs::write(&path, "[log\n").unwrap();
		assert!(matches!(Config::load(Some(&path)), Err(ConfigError::Parse { .. })));
	}
}
