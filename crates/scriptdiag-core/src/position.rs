// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Source positions and the source map lookup contract.

use serde::{Deserialize, Serialize};

/// A location in either generated or original source text.
///
/// Lines are 1-indexed, columns are 0-indexed. Whether a value describes a
/// generated or an original location is tracked by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourcePosition {
	/// Source identifier (file name or URL).
	pub source: String,
	/// Line number (1-indexed).
	pub line: u32,
	/// Column number (0-indexed).
	pub column: u32,
}

impl SourcePosition {
	pub fn new(source: impl Into<String>, line: u32, column: u32) -> Self {
		Self {
			source: source.into(),
			line,
			column,
		}
	}
}

/// A pre-loaded source map that can translate generated positions.
///
/// Implementations are owned outside the diagnostics subsystem and are never
/// mutated by it. A lookup that finds nothing returns `None`; it is not an
/// error.
pub trait SourceMap: Send + Sync {
	/// Resolve a generated position to its original position.
	fn resolve_original_position(&self, generated: &SourcePosition) -> Option<SourcePosition>;
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_new_position() {
		let pos = SourcePosition::new("main.js", 42, 8);
		assert_eq!(pos.source, "main.js");
		assert_eq!(pos.line, 42);
		assert_eq!(pos.column, 8);
	}

	#[test]
	fn test_position_serde_roundtrip() {
		let pos = SourcePosition::new("app.ts", 10, 3);
		let json = serde_json::to_string(&pos).unwrap();
		assert_eq!(json, r#"{"source":"app.ts","line":10,"column":3}"#);
		let parsed: SourcePosition = serde_json::from_str(&json).unwrap();
		assert_eq!(parsed, pos);
	}
}
