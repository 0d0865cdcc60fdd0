// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Stack frame accessor surface.
//!
//! A [`CallSite`] is one entry of a structured stack trace as the V8 engine
//! hands it to the prepare-stack-trace hook. The accessor set is fixed; it
//! mirrors the methods the engine exposes on its call-site objects.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Accessors of one structured stack frame.
pub trait CallSite {
	fn file_name(&self) -> Option<String>;

	/// Script name, or the `//# sourceURL` name for evaluated code.
	fn script_name_or_source_url(&self) -> Option<String>;

	/// Line number (1-indexed).
	fn line_number(&self) -> Option<u32>;

	/// Column number (1-indexed).
	fn column_number(&self) -> Option<u32>;

	fn function_name(&self) -> Option<String>;

	/// Receiver type name. Fails when the receiver cannot be inspected,
	/// e.g. a revoked proxy.
	fn type_name(&self) -> Result<Option<String>>;

	fn method_name(&self) -> Option<String>;

	/// Description of where evaluated code was itself invoked from.
	fn eval_origin(&self) -> Option<String>;

	fn is_native(&self) -> bool;

	fn is_eval(&self) -> bool;

	fn is_constructor(&self) -> bool;

	fn is_toplevel(&self) -> bool;
}

/// Plain-data call site, used by hosts that snapshot frames eagerly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallSiteData {
	#[serde(default)]
	pub file_name: Option<String>,
	#[serde(default)]
	pub script_name_or_source_url: Option<String>,
	#[serde(default)]
	pub line_number: Option<u32>,
	#[serde(default)]
	pub column_number: Option<u32>,
	#[serde(default)]
	pub function_name: Option<String>,
	#[serde(default)]
	pub type_name: Option<String>,
	/// The receiver is a proxy whose type cannot be read.
	#[serde(default)]
	pub proxy_receiver: bool,
	#[serde(default)]
	pub method_name: Option<String>,
	#[serde(default)]
	pub eval_origin: Option<String>,
	#[serde(default)]
	pub is_native: bool,
	#[serde(default)]
	pub is_eval: bool,
	#[serde(default)]
	pub is_constructor: bool,
	// V8 spells it "isToplevel".
	#[serde(default, rename = "isToplevel")]
	pub is_toplevel: bool,
}

impl CallSiteData {
	/// A top-level frame at a script location. `column` is 1-indexed.
	pub fn at(file_name: impl Into<String>, line: u32, column: u32) -> Self {
		let file_name = file_name.into();
		Self {
			script_name_or_source_url: Some(file_name.clone()),
			file_name: Some(file_name),
			line_number: Some(line),
			column_number: Some(column),
			is_toplevel: true,
			..Self::default()
		}
	}

	pub fn with_function(mut self, name: impl Into<String>) -> Self {
		self.function_name = Some(name.into());
		self
	}
}

impl CallSite for CallSiteData {
	fn file_name(&self) -> Option<String> {
		self.file_name.clone()
	}

	fn script_name_or_source_url(&self) -> Option<String> {
		self.script_name_or_source_url.clone()
	}

	fn line_number(&self) -> Option<u32> {
		self.line_number
	}

	fn column_number(&self) -> Option<u32> {
		self.column_number
	}

	fn function_name(&self) -> Option<String> {
		self.function_name.clone()
	}

	fn type_name(&self) -> Result<Option<String>> {
		if self.proxy_receiver {
			return Err(CoreError::TypeNameUnavailable(
				"receiver is a proxy".to_string(),
			));
		}
		Ok(self.type_name.clone())
	}

	fn method_name(&self) -> Option<String> {
		self.method_name.clone()
	}

	fn eval_origin(&self) -> Option<String> {
		self.eval_origin.clone()
	}

	fn is_native(&self) -> bool {
		self.is_native
	}

	fn is_eval(&self) -> bool {
		self.is_eval
	}

	fn is_constructor(&self) -> bool {
		self.is_constructor
	}

	fn is_toplevel(&self) -> bool {
		self.is_toplevel
	}
}
