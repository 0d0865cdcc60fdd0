// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Duktape integration: in-place remapping of rendered stack text.
//!
//! Duktape renders the stack as text when the error is created and exposes
//! an error-creation hook that may rewrite it. Frame lines follow
//! `    at <scope> (<file>:<line>) <flags>`; there are no columns.

use std::sync::{Arc, LazyLock};

use regex::{Captures, Regex};
use scriptdiag_core::SourcePosition;
use scriptdiag_symbolicate::SourcePositionResolver;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::channel::OutputChannel;
use crate::strategy::{
	report, ExceptionReportingStrategy, ReportedPosition, UnhandledException,
	UnhandledExceptionCallback,
};

static FRAME_LINE: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"    at (.+) \(((.+):(.+))?\) (internal)?(native)?(.*)").expect("valid frame regex")
});

/// Flag Duktape attaches to a frame line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
	Internal,
	Native,
}

/// Kinds of the frames Duktape pushes before entering user code.
const CALL_PROLOGUE: [Option<FrameKind>; 2] = [Some(FrameKind::Internal), Some(FrameKind::Native)];

/// Error-specific state of a Duktape exception.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DuktapeError {
	pub stack: Option<String>,
	pub file_name: Option<String>,
	pub line_number: Option<u32>,
}

/// Replacement for Duktape's error-creation hook.
pub type ErrorCreateHook = Box<dyn Fn(DuktapeError) -> DuktapeError + Send + Sync>;

/// Hook points of a Duktape engine. Setting a hook replaces the previous one.
pub trait DuktapeEngine: Send + Sync {
	fn set_unhandled_exception_callback(&self, callback: UnhandledExceptionCallback<DuktapeError>);

	fn set_error_create(&self, hook: ErrorCreateHook);
}

/// Duktape stack rewriting options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DuktapeSettings {
	/// Remove the internal/native frames of the engine's call prologue.
	pub strip_call_prologue: bool,
}

impl Default for DuktapeSettings {
	fn default() -> Self {
		Self {
			strip_call_prologue: true,
		}
	}
}

fn leading_number(text: &str) -> Option<u32> {
	let end = text
		.find(|c: char| !c.is_ascii_digit())
		.unwrap_or(text.len());
	text[..end].parse().ok()
}

/// Rewrite the stack of a freshly created error.
///
/// Every resolvable frame line is remapped; the first remapped position also
/// becomes the error's file name and line number.
pub fn rewrite_error(
	resolver: &SourcePositionResolver,
	settings: DuktapeSettings,
	mut error: DuktapeError,
) -> DuktapeError {
	let Some(stack) = error.stack.take().filter(|s| !s.is_empty()) else {
		return error;
	};

	let mut first_position: Option<SourcePosition> = None;
	let mut frame_kinds: Vec<Option<FrameKind>> = Vec::new();

	let rewritten = FRAME_LINE.replace_all(&stack, |caps: &Captures| {
		let scope = &caps[1];
		let location = caps.get(2).map(|m| m.as_str());
		let internal = caps.get(5).is_some();
		let native = caps.get(6).is_some();

		frame_kinds.push(if internal {
			Some(FrameKind::Internal)
		} else if native {
			Some(FrameKind::Native)
		} else {
			None
		});

		let unresolved = || {
			let shown = location.unwrap_or(if native { "native" } else { "" });
			format!("    at {scope} ({shown})")
		};

		let (Some(file_name), Some(line)) = (caps.get(3), caps.get(4)) else {
			return unresolved();
		};
		if internal {
			return unresolved();
		}
		let Some(line) = leading_number(line.as_str()) else {
			return unresolved();
		};

		let position = resolver.resolve(SourcePosition::new(file_name.as_str(), line, 0));
		let location = format!("{}:{}", position.source, position.line);
		first_position.get_or_insert(position);

		match scope {
			"global" | "[anon]" => format!("    at {location}"),
			_ => format!("    at {scope} ({location})"),
		}
	});
	let mut stack = rewritten.into_owned();

	if settings.strip_call_prologue
		&& frame_kinds.len() > CALL_PROLOGUE.len()
		&& frame_kinds[..CALL_PROLOGUE.len()] == CALL_PROLOGUE
	{
		let lines: Vec<&str> = stack.split('\n').collect();
		let skip = CALL_PROLOGUE.len() + 1;
		debug!(frames = CALL_PROLOGUE.len(), "stripping call prologue");
		stack = format!(
			"{}\n{}",
			lines[0],
			lines.get(skip..).unwrap_or_default().join("\n")
		);
	}

	error.stack = Some(stack);

	if let Some(position) = first_position {
		error.file_name = Some(position.source);
		error.line_number = Some(position.line);
	}

	error
}

/// Reporting strategy for Duktape.
#[derive(Debug)]
pub struct DuktapeStrategy {
	resolver: Arc<SourcePositionResolver>,
	settings: DuktapeSettings,
}

impl DuktapeStrategy {
	pub fn new(resolver: Arc<SourcePositionResolver>, settings: DuktapeSettings) -> Self {
		Self { resolver, settings }
	}
}

impl ExceptionReportingStrategy for DuktapeStrategy {
	type Engine = dyn DuktapeEngine;
	type Error = DuktapeError;

	fn install(self: Arc<Self>, engine: &Self::Engine, channel: Arc<dyn OutputChannel>) {
		let strategy = Arc::clone(&self);
		engine.set_unhandled_exception_callback(Box::new(
			move |exception: &UnhandledException<DuktapeError>| {
				report(strategy.as_ref(), exception, channel.as_ref());
			},
		));

		engine.set_error_create(Box::new(move |error: DuktapeError| {
			rewrite_error(&self.resolver, self.settings, error)
		}));
	}

	fn extract_stack(&self, error: &DuktapeError) -> Option<String> {
		error.stack.clone().filter(|s| !s.is_empty())
	}

	fn extract_position(&self, error: &DuktapeError) -> ReportedPosition {
		let line_number = error.line_number.filter(|&line| line != 0);
		ReportedPosition {
			file_name: error.file_name.clone().filter(|s| !s.is_empty()),
			line_number,
			// Duktape reports no columns.
			column_number: line_number.map(|_| 1),
		}
	}
}
