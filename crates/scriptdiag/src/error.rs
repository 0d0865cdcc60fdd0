// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for exception reporting and configuration.

use std::path::PathBuf;

use scriptdiag_core::CoreError;
use thiserror::Error;

/// Result type alias for reporting operations.
pub type Result<T> = std::result::Result<T, DiagnosticsError>;

/// Errors that can occur while reporting an unhandled exception.
///
/// None of these are surfaced to the script; the reporting hook logs them
/// and gives up on that report.
#[derive(Debug, Error)]
pub enum DiagnosticsError {
	/// Failed to encode the diagnostic record.
	#[error("failed to encode diagnostic: {0}")]
	Encode(#[from] CoreError),

	/// The output channel rejected the message.
	#[error("output channel error: {0}")]
	Channel(String),
}

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// I/O error reading config file
	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	/// TOML parsing error
	#[error("TOML parse error in {path}: {source}")]
	TomlParse {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},

	/// Invalid value
	#[error("Invalid value for {field}: {message}")]
	InvalidValue { field: String, message: String },

	/// Validation error
	#[error("Validation error: {0}")]
	Validation(String),
}

impl ConfigError {
	pub fn validation(msg: impl Into<String>) -> Self {
		Self::Validation(msg.into())
	}

	pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
		Self::InvalidValue {
			field: field.into(),
			message: message.into(),
		}
	}
}
