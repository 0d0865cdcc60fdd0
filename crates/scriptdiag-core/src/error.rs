// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the diagnostics core.

use thiserror::Error;

/// Errors that can occur while reading frames or encoding records.
#[derive(Debug, Error)]
pub enum CoreError {
	/// The engine could not report the receiver type of a call site.
	#[error("type name unavailable: {0}")]
	TypeNameUnavailable(String),

	#[error("serialization error: {0}")]
	Serialization(#[from] serde_json::Error),
}

/// Result type for diagnostics core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
