// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for symbolication operations.

use thiserror::Error;

/// Errors that can occur while loading source maps or wiring the registry.
///
/// Lookups themselves never fail; a position that cannot be mapped is
/// returned unchanged.
#[derive(Debug, Error)]
pub enum SymbolicateError {
	#[error("Invalid source map JSON: {0}")]
	InvalidSourceMapJson(#[from] serde_json::Error),

	#[error("Invalid source map version: expected 3, got {0}")]
	InvalidSourceMapVersion(u32),

	#[error("Invalid VLQ character: {0}")]
	InvalidVlqChar(char),

	#[error("VLQ value out of range in segment: {0}")]
	VlqOverflow(String),

	#[error("Invalid source index: {0}")]
	InvalidSourceIndex(u32),

	#[error("Unknown script identifier: {0}")]
	UnknownScript(String),
}

pub type Result<T> = std::result::Result<T, SymbolicateError>;
