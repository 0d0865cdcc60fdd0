// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Source-mapped call sites and V8 frame formatting.
//!
//! A [`FrameShim`] snapshots every accessor of an engine call site and
//! overrides the position accessors with remapped values. It renders exactly
//! the way V8 renders its own call sites, so a remapped trace reads like a
//! native one.

use std::fmt;

use scriptdiag_core::{CallSite, CoreError, SourcePosition};
use scriptdiag_symbolicate::{map_eval_origin, SourcePositionResolver};

/// Owned, position-overridden copy of a call site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameShim {
	file_name: Option<String>,
	script_name_or_source_url: Option<String>,
	line_number: Option<u32>,
	column_number: Option<u32>,
	function_name: Option<String>,
	type_name: Result<Option<String>, String>,
	method_name: Option<String>,
	eval_origin: Option<String>,
	is_native: bool,
	is_eval: bool,
	is_constructor: bool,
	is_toplevel: bool,
}

impl FrameShim {
	/// Copy `frame` verbatim.
	pub fn snapshot(frame: &dyn CallSite) -> Self {
		Self {
			file_name: frame.file_name(),
			script_name_or_source_url: frame.script_name_or_source_url(),
			line_number: frame.line_number(),
			column_number: frame.column_number(),
			function_name: frame.function_name(),
			type_name: frame.type_name().map_err(|e| e.to_string()),
			method_name: frame.method_name(),
			eval_origin: frame.eval_origin(),
			is_native: frame.is_native(),
			is_eval: frame.is_eval(),
			is_constructor: frame.is_constructor(),
			is_toplevel: frame.is_toplevel(),
		}
	}

	/// Copy `frame` and remap its position through `resolver`.
	///
	/// Frames with a script name get their file, line and column replaced.
	/// Script-less eval frames get their eval origin rewritten instead.
	pub fn wrap(frame: &dyn CallSite, resolver: &SourcePositionResolver) -> Self {
		let mut shim = Self::snapshot(frame);

		let source = non_empty(shim.file_name.clone())
			.or_else(|| non_empty(shim.script_name_or_source_url.clone()));
		if let Some(source) = source {
			shim.remap_position(source, resolver);
			return shim;
		}

		if shim.is_eval {
			if let Some(origin) = non_empty(shim.eval_origin.take()) {
				shim.eval_origin = Some(map_eval_origin(resolver, &origin));
			}
		}
		shim
	}

	fn remap_position(&mut self, source: String, resolver: &SourcePositionResolver) {
		let Some(line) = self.line_number else {
			self.file_name = Some(source.clone());
			self.script_name_or_source_url = Some(source);
			return;
		};

		let generated = SourcePosition::new(
			source,
			line,
			self.column_number.unwrap_or(0).saturating_sub(1),
		);
		let position = resolver.resolve(generated.clone());

		if self.column_number.is_some() || position != generated {
			self.column_number = Some(position.column.saturating_add(1));
		}
		self.line_number = Some(position.line);
		self.file_name = Some(position.source.clone());
		self.script_name_or_source_url = Some(position.source);
	}
}

impl CallSite for FrameShim {
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

	fn type_name(&self) -> scriptdiag_core::Result<Option<String>> {
		self.type_name
			.clone()
			.map_err(CoreError::TypeNameUnavailable)
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

impl fmt::Display for FrameShim {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&format_call_site(self))
	}
}

fn non_empty(value: Option<String>) -> Option<String> {
	value.filter(|s| !s.is_empty())
}

fn file_location(frame: &dyn CallSite) -> String {
	if frame.is_native() {
		return "native".to_string();
	}

	let mut location = String::new();
	let file_name = non_empty(frame.script_name_or_source_url());
	if file_name.is_none() && frame.is_eval() {
		location.push_str(&frame.eval_origin().unwrap_or_default());
		location.push_str(", ");
	}
	location.push_str(file_name.as_deref().unwrap_or("<anonymous>"));

	if let Some(line) = frame.line_number() {
		location.push_str(&format!(":{line}"));
		if let Some(column) = frame.column_number().filter(|&c| c != 0) {
			location.push_str(&format!(":{column}"));
		}
	}
	location
}

/// V8's own test: the first `.method` occurrence must sit at the tail.
fn method_is_tail_of(function_name: &str, method_name: &str) -> bool {
	let index = function_name
		.find(&format!(".{method_name}"))
		.map_or(-1, |i| i as isize);
	index == function_name.len() as isize - method_name.len() as isize - 1
}

/// Render a call site the way V8 renders `CallSite.prototype.toString`.
pub fn format_call_site(frame: &dyn CallSite) -> String {
	let location = file_location(frame);
	let function_name = non_empty(frame.function_name());
	let is_constructor = frame.is_constructor();
	let is_method_call = !(frame.is_toplevel() || is_constructor);

	let mut line = String::new();
	if is_method_call {
		let type_name = frame
			.type_name()
			.unwrap_or_else(|_| Some("Proxy".to_string()));
		let method_name = non_empty(frame.method_name());

		match &function_name {
			Some(function_name) => {
				if let Some(type_name) = type_name.as_deref().filter(|t| !t.is_empty()) {
					if !function_name.starts_with(type_name) {
						line.push_str(type_name);
						line.push('.');
					}
				}
				line.push_str(function_name);
				if let Some(method_name) = &method_name {
					if !method_is_tail_of(function_name, method_name) {
						line.push_str(&format!(" [as {method_name}]"));
					}
				}
			}
			None => {
				line.push_str(type_name.as_deref().unwrap_or("null"));
				line.push('.');
				line.push_str(method_name.as_deref().unwrap_or("<anonymous>"));
			}
		}
	} else if is_constructor {
		line.push_str("new ");
		line.push_str(function_name.as_deref().unwrap_or("<anonymous>"));
	} else if let Some(function_name) = &function_name {
		line.push_str(function_name);
	} else {
		return location;
	}

	line.push_str(&format!(" ({location})"));
	line
}
