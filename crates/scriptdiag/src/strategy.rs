// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Engine-independent exception reporting.

use std::sync::Arc;

use scriptdiag_core::DiagnosticRecord;
use tracing::{debug, error};

use crate::channel::OutputChannel;
use crate::error::Result;

/// A thrown value that reached the top of the engine's call stack.
#[derive(Debug, Clone)]
pub struct UnhandledException<E> {
	/// String form of the thrown value.
	pub description: String,
	/// Engine-specific error state; `None` when the thrown value is not an
	/// Error object.
	pub error: Option<E>,
}

impl<E> UnhandledException<E> {
	pub fn error(description: impl Into<String>, error: E) -> Self {
		Self {
			description: description.into(),
			error: Some(error),
		}
	}

	/// A thrown value that is not an Error object, e.g. `throw 42`.
	pub fn value(description: impl Into<String>) -> Self {
		Self {
			description: description.into(),
			error: None,
		}
	}
}

/// Callback for exceptions no script code caught.
pub type UnhandledExceptionCallback<E> = Box<dyn Fn(&UnhandledException<E>) + Send + Sync>;

/// Location reported alongside a diagnostic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportedPosition {
	pub file_name: Option<String>,
	/// 1-indexed.
	pub line_number: Option<u32>,
	/// 1-indexed.
	pub column_number: Option<u32>,
}

/// How one engine variant exposes stacks and positions.
pub trait ExceptionReportingStrategy: Send + Sync + 'static {
	type Engine: ?Sized;
	type Error;

	/// Install the unhandled-exception callback and the stack hook on
	/// `engine`, replacing whatever was installed before.
	fn install(self: Arc<Self>, engine: &Self::Engine, channel: Arc<dyn OutputChannel>);

	fn extract_stack(&self, error: &Self::Error) -> Option<String>;

	fn extract_position(&self, error: &Self::Error) -> ReportedPosition;
}

/// Build the diagnostic record for `exception`.
pub fn build_record<S>(strategy: &S, exception: &UnhandledException<S::Error>) -> DiagnosticRecord
where
	S: ExceptionReportingStrategy + ?Sized,
{
	let mut record = DiagnosticRecord::error(exception.description.clone());

	if let Some(error) = &exception.error {
		if let Some(stack) = strategy.extract_stack(error) {
			record = record.with_stack(stack);
		}
		let position = strategy.extract_position(error);
		record = record
			.with_file_name(position.file_name)
			.with_line_number(position.line_number)
			.with_column_number(position.column_number);
	}

	record
}

fn send_record(record: &DiagnosticRecord, channel: &dyn OutputChannel) -> Result<()> {
	let message = record.to_json()?;
	channel.send(&message, None)
}

/// Report `exception` to `channel`.
///
/// Runs on the engine thread as the last thing before the engine gives up on
/// the exception. A failure is logged and the report is dropped; nothing is
/// retried or re-reported.
pub fn report<S>(strategy: &S, exception: &UnhandledException<S::Error>, channel: &dyn OutputChannel)
where
	S: ExceptionReportingStrategy + ?Sized,
{
	let record = build_record(strategy, exception);
	match send_record(&record, channel) {
		Ok(()) => debug!(
			description = %record.description,
			file_name = ?record.file_name,
			line_number = ?record.line_number,
			"reported unhandled exception"
		),
		Err(e) => error!(
			error = %e,
			description = %record.description,
			"failed to report unhandled exception"
		),
	}
}
