// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Diagnostic records sent to the controlling process.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Kind tag of a diagnostic record. Only errors are reported today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
	Error,
}

/// Structured summary of one unhandled exception.
///
/// Built once per exception and consumed right away by the output channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticRecord {
	#[serde(rename = "type")]
	pub kind: RecordKind,
	/// String form of the thrown value, e.g. `ReferenceError: x is not defined`.
	pub description: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub stack: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub file_name: Option<String>,
	/// Line number (1-indexed).
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub line_number: Option<u32>,
	/// Column number (1-indexed).
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub column_number: Option<u32>,
}

impl DiagnosticRecord {
	pub fn error(description: impl Into<String>) -> Self {
		Self {
			kind: RecordKind::Error,
			description: description.into(),
			stack: None,
			file_name: None,
			line_number: None,
			column_number: None,
		}
	}

	pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
		self.stack = Some(stack.into());
		self
	}

	pub fn with_file_name(mut self, file_name: Option<String>) -> Self {
		self.file_name = file_name;
		self
	}

	pub fn with_line_number(mut self, line_number: Option<u32>) -> Self {
		self.line_number = line_number;
		self
	}

	pub fn with_column_number(mut self, column_number: Option<u32>) -> Self {
		self.column_number = column_number;
		self
	}

	/// Serialize to the JSON wire shape.
	pub fn to_json(&self) -> Result<String> {
		Ok(serde_json::to_string(self)?)
	}
}
