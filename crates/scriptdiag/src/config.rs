// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Layered configuration: defaults, then a TOML file, then `SCRIPTDIAG_*`
//! environment variables.
//!
//! ```toml
//! [scripts]
//! main = "agent.js"
//!
//! [duktape]
//! strip_call_prologue = true
//!
//! [logging]
//! level = "debug"
//! format = "json"
//! ```

use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use scriptdiag_symbolicate::ScriptNames;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::duktape::DuktapeSettings;
use crate::error::ConfigError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticsConfig {
	pub scripts: ScriptNames,
	pub duktape: DuktapeSettings,
	pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
	pub level: LogLevel,
	pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
	Error,
	Warn,
	#[default]
	Info,
	Debug,
	Trace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
	#[default]
	Pretty,
	Json,
	Compact,
}

impl LogLevel {
	pub fn as_str(&self) -> &'static str {
		match self {
			LogLevel::Error => "error",
			LogLevel::Warn => "warn",
			LogLevel::Info => "info",
			LogLevel::Debug => "debug",
			LogLevel::Trace => "trace",
		}
	}
}

impl fmt::Display for LogLevel {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for LogLevel {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"error" => Ok(LogLevel::Error),
			"warn" => Ok(LogLevel::Warn),
			"info" => Ok(LogLevel::Info),
			"debug" => Ok(LogLevel::Debug),
			"trace" => Ok(LogLevel::Trace),
			other => Err(ConfigError::invalid_value(
				"logging.level",
				format!("unknown level '{other}'"),
			)),
		}
	}
}

impl FromStr for LogFormat {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"pretty" => Ok(LogFormat::Pretty),
			"json" => Ok(LogFormat::Json),
			"compact" => Ok(LogFormat::Compact),
			other => Err(ConfigError::invalid_value(
				"logging.format",
				format!("unknown format '{other}'"),
			)),
		}
	}
}

fn parse_bool(field: &str, value: &str) -> Result<bool, ConfigError> {
	match value.to_ascii_lowercase().as_str() {
		"1" | "true" | "yes" | "on" => Ok(true),
		"0" | "false" | "no" | "off" => Ok(false),
		_ => Err(ConfigError::invalid_value(
			field,
			format!("expected a boolean, got '{value}'"),
		)),
	}
}

impl DiagnosticsConfig {
	pub fn from_toml_str(content: &str, path: &Path) -> Result<Self, ConfigError> {
		toml::from_str(content).map_err(|e| ConfigError::TomlParse {
			path: path.to_path_buf(),
			source: e,
		})
	}

	/// Load defaults, the file at `path` if given, then the process
	/// environment, and validate the result.
	pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
		let mut config = match path {
			Some(path) => {
				debug!(path = %path.display(), "loading config file");
				let content = std::fs::read_to_string(path)?;
				Self::from_toml_str(&content, path)?
			}
			None => Self::default(),
		};

		config.apply_env_from(|key| std::env::var(key).ok())?;
		config.validate()?;
		Ok(config)
	}

	/// Apply `SCRIPTDIAG_*` overrides read through `lookup`. Empty values are
	/// ignored.
	pub fn apply_env_from(
		&mut self,
		lookup: impl Fn(&str) -> Option<String>,
	) -> Result<(), ConfigError> {
		let var = |key: &str| {
			lookup(key)
				.map(|value| value.trim().to_string())
				.filter(|value| !value.is_empty())
		};

		if let Some(value) = var("SCRIPTDIAG_MAIN_SCRIPT") {
			trace!(key = "SCRIPTDIAG_MAIN_SCRIPT", "processing env var");
			self.scripts.main = value;
		}
		if let Some(value) = var("SCRIPTDIAG_STRIP_CALL_PROLOGUE") {
			trace!(key = "SCRIPTDIAG_STRIP_CALL_PROLOGUE", "processing env var");
			self.duktape.strip_call_prologue =
				parse_bool("duktape.strip_call_prologue", &value)?;
		}
		if let Some(value) = var("SCRIPTDIAG_LOG_LEVEL") {
			trace!(key = "SCRIPTDIAG_LOG_LEVEL", "processing env var");
			self.logging.level = value.parse()?;
		}
		if let Some(value) = var("SCRIPTDIAG_LOG_FORMAT") {
			trace!(key = "SCRIPTDIAG_LOG_FORMAT", "processing env var");
			self.logging.format = value.parse()?;
		}

		Ok(())
	}

	/// Script identifiers must be non-empty and distinct.
	pub fn validate(&self) -> Result<(), ConfigError> {
		let names = [
			("scripts.main", &self.scripts.main),
			("scripts.runtime", &self.scripts.runtime),
			("scripts.objc", &self.scripts.objc),
			("scripts.java", &self.scripts.java),
		];

		let mut seen = HashSet::new();
		for (field, name) in names {
			if name.trim().is_empty() {
				return Err(ConfigError::validation(format!("{field} must not be empty")));
			}
			if !seen.insert(name.as_str()) {
				return Err(ConfigError::validation(format!(
					"{field} duplicates another script name: {name}"
				)));
			}
		}

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashMap;
	use std::io::Write;

	fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
		let vars: HashMap<String, String> = pairs
			.iter()
			.map(|(k, v)| (k.to_string(), v.to_string()))
			.collect();
		move |key| vars.get(key).cloned()
	}

	#[test]
	fn test_defaults() {
		let config = DiagnosticsConfig::default();
		assert_eq!(config.scripts.main, "script.js");
		assert!(config.duktape.strip_call_prologue);
		assert_eq!(config.logging.level, LogLevel::Info);
		assert_eq!(config.logging.format, LogFormat::Pretty);
		assert!(config.validate().is_ok());
	}

	#[test]
	fn test_partial_toml_keeps_defaults() {
		let config = DiagnosticsConfig::from_toml_str(
			"[scripts]\nmain = \"agent.js\"\n\n[logging]\nlevel = \"debug\"\n",
			Path::new("test.toml"),
		)
		.unwrap();

		assert_eq!(config.scripts.main, "agent.js");
		assert_eq!(config.scripts.runtime, "frida.js");
		assert_eq!(config.logging.level, LogLevel::Debug);
		assert_eq!(config.logging.format, LogFormat::Pretty);
		assert!(config.duktape.strip_call_prologue);
	}

	#[test]
	fn test_invalid_toml_names_path() {
		let err = DiagnosticsConfig::from_toml_str("[logging\n", Path::new("bad.toml")).unwrap_err();
		assert!(matches!(err, ConfigError::TomlParse { .. }));
		assert!(err.to_string().contains("bad.toml"));
	}

	#[test]
	fn test_load_from_file() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "[duktape]\nstrip_call_prologue = false").unwrap();

		let config = DiagnosticsConfig::load(Some(file.path())).unwrap();
		assert!(!config.duktape.strip_call_prologue);
	}

	#[test]
	fn test_load_missing_file_fails() {
		let dir = tempfile::tempdir().unwrap();
		let err = DiagnosticsConfig::load(Some(&dir.path().join("missing.toml"))).unwrap_err();
		assert!(matches!(err, ConfigError::Io(_)));
	}

	#[test]
	fn test_env_overrides() {
		let mut config = DiagnosticsConfig::default();
		config
			.apply_env_from(env(&[
				("SCRIPTDIAG_MAIN_SCRIPT", "main.js"),
				("SCRIPTDIAG_LOG_LEVEL", "TRACE"),
				("SCRIPTDIAG_LOG_FORMAT", "json"),
				("SCRIPTDIAG_STRIP_CALL_PROLOGUE", "off"),
			]))
			.unwrap();

		assert_eq!(config.scripts.main, "main.js");
		assert_eq!(config.logging.level, LogLevel::Trace);
		assert_eq!(config.logging.format, LogFormat::Json);
		assert!(!config.duktape.strip_call_prologue);
	}

	#[test]
	fn test_empty_env_values_ignored() {
		let mut config = DiagnosticsConfig::default();
		config
			.apply_env_from(env(&[("SCRIPTDIAG_MAIN_SCRIPT", "  ")]))
			.unwrap();
		assert_eq!(config.scripts.main, "script.js");
	}

	#[test]
	fn test_invalid_env_value() {
		let mut config = DiagnosticsConfig::default();
		let err = config
			.apply_env_from(env(&[("SCRIPTDIAG_LOG_LEVEL", "loud")]))
			.unwrap_err();
		assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "logging.level"));
	}

	#[test]
	fn test_validate_rejects_duplicates() {
		let mut config = DiagnosticsConfig::default();
		config.scripts.objc = "frida.js".to_string();
		let err = config.validate().unwrap_err();
		assert!(err.to_string().contains("scripts.objc"));
	}

	#[test]
	fn test_validate_rejects_empty() {
		let mut config = DiagnosticsConfig::default();
		config.scripts.main = String::new();
		assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
	}
}
