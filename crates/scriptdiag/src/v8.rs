// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! V8 integration: remapped stack synthesis and exception reporting.
//!
//! V8 lets the embedder replace stack-trace synthesis. The replacement
//! receives the error and its structured call sites; it returns the value
//! that becomes the error's `stack`. Here that value is a [`PreparedStack`]:
//! the rendered text plus the remapped frames it was rendered from.

use std::fmt;
use std::sync::Arc;

use scriptdiag_core::CallSite;
use scriptdiag_symbolicate::SourcePositionResolver;
use tracing::debug;

use crate::channel::OutputChannel;
use crate::shim::FrameShim;
use crate::strategy::{
	report, ExceptionReportingStrategy, ReportedPosition, UnhandledException,
	UnhandledExceptionCallback,
};

/// What V8 renders for the frame of the interception point itself.
const INTERCEPTION_FRAME: &str = "Error (native)";

/// Stack value produced by [`prepare_stack_trace`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedStack {
	text: String,
	frames: Vec<FrameShim>,
}

impl PreparedStack {
	/// A stack the script assigned itself; it carries no frames.
	pub fn from_text(text: impl Into<String>) -> Self {
		Self {
			text: text.into(),
			frames: Vec::new(),
		}
	}

	pub fn as_str(&self) -> &str {
		&self.text
	}

	/// Remapped frames, innermost first.
	pub fn frames(&self) -> &[FrameShim] {
		&self.frames
	}
}

impl fmt::Display for PreparedStack {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.text)
	}
}

/// Error-specific state of a V8 exception.
#[derive(Debug, Clone, Default)]
pub struct V8Error {
	pub stack: Option<PreparedStack>,
}

/// Replacement for V8's stack-trace synthesis.
pub type PrepareStackTraceHook = Box<dyn Fn(&str, &[&dyn CallSite]) -> PreparedStack + Send + Sync>;

/// Hook points of a V8 engine. Setting a hook replaces the previous one.
pub trait V8Engine: Send + Sync {
	fn set_unhandled_exception_callback(&self, callback: UnhandledExceptionCallback<V8Error>);

	fn set_prepare_stack_trace(&self, hook: PrepareStackTraceHook);
}

/// Build the stack value for `error` from its call sites.
///
/// `error` is the error's string form. Each frame is wrapped in a
/// [`FrameShim`]; a leading `Error (native)` frame is dropped.
pub fn prepare_stack_trace(
	resolver: &SourcePositionResolver,
	error: &str,
	frames: &[&dyn CallSite],
) -> PreparedStack {
	let mut shims: Vec<FrameShim> = frames
		.iter()
		.map(|frame| FrameShim::wrap(*frame, resolver))
		.collect();

	if shims
		.first()
		.is_some_and(|frame| frame.to_string() == INTERCEPTION_FRAME)
	{
		debug!("dropping interception frame");
		shims.remove(0);
	}

	let mut text = error.to_string();
	for shim in &shims {
		text.push_str("\n    at ");
		text.push_str(&shim.to_string());
	}

	PreparedStack {
		text,
		frames: shims,
	}
}

/// Reporting strategy for V8.
#[derive(Debug)]
pub struct V8Strategy {
	resolver: Arc<SourcePositionResolver>,
}

impl V8Strategy {
	pub fn new(resolver: Arc<SourcePositionResolver>) -> Self {
		Self { resolver }
	}
}

impl ExceptionReportingStrategy for V8Strategy {
	type Engine = dyn V8Engine;
	type Error = V8Error;

	fn install(self: Arc<Self>, engine: &Self::Engine, channel: Arc<dyn OutputChannel>) {
		let strategy = Arc::clone(&self);
		engine.set_unhandled_exception_callback(Box::new(
			move |exception: &UnhandledException<V8Error>| {
				report(strategy.as_ref(), exception, channel.as_ref());
			},
		));

		engine.set_prepare_stack_trace(Box::new(move |error: &str, frames: &[&dyn CallSite]| {
			prepare_stack_trace(&self.resolver, error, frames)
		}));
	}

	fn extract_stack(&self, error: &V8Error) -> Option<String> {
		error
			.stack
			.as_ref()
			.map(|stack| stack.as_str())
			.filter(|text| !text.is_empty())
			.map(str::to_string)
	}

	fn extract_position(&self, error: &V8Error) -> ReportedPosition {
		let Some(frame) = error
			.stack
			.as_ref()
			.filter(|stack| !stack.as_str().is_empty())
			.and_then(|stack| stack.frames().first())
		else {
			return ReportedPosition::default();
		};

		ReportedPosition {
			file_name: frame.file_name(),
			line_number: frame.line_number(),
			column_number: frame.column_number(),
		}
	}
}
