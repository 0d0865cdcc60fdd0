// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Strategy selection and installation.

use std::fmt;
use std::sync::Arc;

use scriptdiag_symbolicate::SourcePositionResolver;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::channel::OutputChannel;
use crate::duktape::{DuktapeEngine, DuktapeSettings, DuktapeStrategy};
use crate::strategy::ExceptionReportingStrategy;
use crate::v8::{V8Engine, V8Strategy};

/// Script runtime variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Runtime {
	V8,
	Duktape,
}

impl fmt::Display for Runtime {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Runtime::V8 => write!(f, "v8"),
			Runtime::Duktape => write!(f, "duktape"),
		}
	}
}

/// Handle to the engine the scripts run on.
#[derive(Clone)]
pub enum ScriptEngine {
	V8(Arc<dyn V8Engine>),
	Duktape(Arc<dyn DuktapeEngine>),
}

impl ScriptEngine {
	pub fn runtime(&self) -> Runtime {
		match self {
			ScriptEngine::V8(_) => Runtime::V8,
			ScriptEngine::Duktape(_) => Runtime::Duktape,
		}
	}
}

impl fmt::Debug for ScriptEngine {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("ScriptEngine").field(&self.runtime()).finish()
	}
}

/// Installs unhandled-exception reporting on a script engine.
///
/// Both hooks of an engine share one resolver, so a script's source map is
/// looked up at most once however many errors it raises.
pub struct ExceptionReporter {
	resolver: Arc<SourcePositionResolver>,
	channel: Arc<dyn OutputChannel>,
	duktape: DuktapeSettings,
}

impl ExceptionReporter {
	pub fn new(resolver: Arc<SourcePositionResolver>, channel: Arc<dyn OutputChannel>) -> Self {
		Self {
			resolver,
			channel,
			duktape: DuktapeSettings::default(),
		}
	}

	pub fn with_duktape_settings(mut self, settings: DuktapeSettings) -> Self {
		self.duktape = settings;
		self
	}

	pub fn resolver(&self) -> &Arc<SourcePositionResolver> {
		&self.resolver
	}

	/// Install the strategy matching `engine`'s runtime.
	///
	/// Registering again replaces the hooks installed before.
	pub fn register(&self, engine: &ScriptEngine) -> Runtime {
		let runtime = engine.runtime();
		match engine {
			ScriptEngine::V8(engine) => {
				Arc::new(V8Strategy::new(Arc::clone(&self.resolver)))
					.install(engine.as_ref(), Arc::clone(&self.channel));
			}
			ScriptEngine::Duktape(engine) => {
				Arc::new(DuktapeStrategy::new(Arc::clone(&self.resolver), self.duktape))
					.install(engine.as_ref(), Arc::clone(&self.channel));
			}
		}
		info!(runtime = %runtime, "installed unhandled exception reporting");
		runtime
	}
}

impl fmt::Debug for ExceptionReporter {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ExceptionReporter")
			.field("resolver", &self.resolver)
			.field("duktape", &self.duktape)
			.finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_runtime_display() {
		assert_eq!(Runtime::V8.to_string(), "v8");
		assert_eq!(Runtime::Duktape.to_string(), "duktape");
	}

	#[test]
	fn test_runtime_serde() {
		assert_eq!(serde_json::to_string(&Runtime::Duktape).unwrap(), "\"duktape\"");
		let runtime: Runtime = serde_json::from_str("\"v8\"").unwrap();
		assert_eq!(runtime, Runtime::V8);
	}
}
