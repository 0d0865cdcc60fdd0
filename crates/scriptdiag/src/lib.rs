// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Unhandled script exception reporting with source-mapped stack traces.
//!
//! An [`ExceptionReporter`] installs two hooks on a script engine: one that
//! rewrites stack traces to original source positions as errors are created,
//! and one that reports exceptions no script caught as a JSON diagnostic on
//! the host's [`OutputChannel`].
//!
//! Two engines are supported:
//! - V8, which exposes structured call sites ([`v8`])
//! - Duktape, which only exposes rendered stack text ([`duktape`])

pub mod channel;
pub mod config;
pub mod duktape;
pub mod engine;
pub mod error;
pub mod shim;
pub mod strategy;
pub mod v8;

pub use channel::OutputChannel;
pub use config::{DiagnosticsConfig, LogFormat, LogLevel, LoggingConfig};
pub use duktape::{DuktapeEngine, DuktapeError, DuktapeSettings, DuktapeStrategy};
pub use engine::{ExceptionReporter, Runtime, ScriptEngine};
pub use error::{ConfigError, DiagnosticsError, Result};
pub use shim::{format_call_site, FrameShim};
pub use strategy::{
	build_record, report, ExceptionReportingStrategy, ReportedPosition, UnhandledException,
	UnhandledExceptionCallback,
};
pub use v8::{PreparedStack, V8Engine, V8Error, V8Strategy};
