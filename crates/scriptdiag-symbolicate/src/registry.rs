// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Source map registry keyed by fixed script identifiers.

use std::fmt;
use std::sync::Arc;

use scriptdiag_core::SourceMap;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SymbolicateError};

/// Finds the source map for a script identifier.
pub trait SourceMapRegistry: Send + Sync {
	/// Returns `None` for identifiers without a map, including generated
	/// eval sources.
	fn find(&self, source: &str) -> Option<Arc<dyn SourceMap>>;
}

/// Identifiers of the scripts a host can carry source maps for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptNames {
	/// File name of the main executing script.
	pub main: String,
	/// Bundled runtime library.
	pub runtime: String,
	/// Bundled Objective-C bridge.
	pub objc: String,
	/// Bundled Java bridge.
	pub java: String,
}

impl Default for ScriptNames {
	fn default() -> Self {
		Self {
			main: "script.js".to_string(),
			runtime: "frida.js".to_string(),
			objc: "objc.js".to_string(),
			java: "java.js".to_string(),
		}
	}
}

/// Which of the four known scripts an identifier refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptSlot {
	Main,
	Runtime,
	Objc,
	Java,
}

impl ScriptNames {
	pub fn slot_of(&self, source: &str) -> Option<ScriptSlot> {
		if source == self.main {
			Some(ScriptSlot::Main)
		} else if source == self.runtime {
			Some(ScriptSlot::Runtime)
		} else if source == self.objc {
			Some(ScriptSlot::Objc)
		} else if source == self.java {
			Some(ScriptSlot::Java)
		} else {
			None
		}
	}
}

/// Registry over the main script and the three bundled libraries.
#[derive(Clone, Default)]
pub struct BundledSourceMaps {
	names: ScriptNames,
	main: Option<Arc<dyn SourceMap>>,
	runtime: Option<Arc<dyn SourceMap>>,
	objc: Option<Arc<dyn SourceMap>>,
	java: Option<Arc<dyn SourceMap>>,
}

impl BundledSourceMaps {
	pub fn new(names: ScriptNames) -> Self {
		Self {
			names,
			..Self::default()
		}
	}

	pub fn with_map(mut self, slot: ScriptSlot, map: Arc<dyn SourceMap>) -> Self {
		*self.slot_mut(slot) = Some(map);
		self
	}

	/// Attach a map by script identifier.
	pub fn insert(&mut self, source: &str, map: Arc<dyn SourceMap>) -> Result<ScriptSlot> {
		let slot = self
			.names
			.slot_of(source)
			.ok_or_else(|| SymbolicateError::UnknownScript(source.to_string()))?;
		*self.slot_mut(slot) = Some(map);
		Ok(slot)
	}

	fn slot_mut(&mut self, slot: ScriptSlot) -> &mut Option<Arc<dyn SourceMap>> {
		match slot {
			ScriptSlot::Main => &mut self.main,
			ScriptSlot::Runtime => &mut self.runtime,
			ScriptSlot::Objc => &mut self.objc,
			ScriptSlot::Java => &mut self.java,
		}
	}
}

impl SourceMapRegistry for BundledSourceMaps {
	fn find(&self, source: &str) -> Option<Arc<dyn SourceMap>> {
		let map = match self.names.slot_of(source)? {
			ScriptSlot::Main => &self.main,
			ScriptSlot::Runtime => &self.runtime,
			ScriptSlot::Objc => &self.objc,
			ScriptSlot::Java => &self.java,
		};
		map.clone()
	}
}

impl fmt::Debug for BundledSourceMaps {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("BundledSourceMaps")
			.field("names", &self.names)
			.field("main", &self.main.is_some())
			.field("runtime", &self.runtime.is_some())
			.field("objc", &self.objc.is_some())
			.field("java", &self.java.is_some())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use scriptdiag_core::SourcePosition;

	struct FixedMap(&'static str);

	impl SourceMap for FixedMap {
		fn resolve_original_position(&self, generated: &SourcePosition) -> Option<SourcePosition> {
			Some(SourcePosition::new(self.0, generated.line, generated.column))
		}
	}

	fn resolved_name(registry: &BundledSourceMaps, source: &str) -> Option<String> {
		registry
			.find(source)
			.and_then(|m| m.resolve_original_position(&SourcePosition::new(source, 1, 0)))
			.map(|p| p.source)
	}

	#[test]
	fn test_find_each_known_script() {
		let registry = BundledSourceMaps::new(ScriptNames {
			main: "agent.js".to_string(),
			..ScriptNames::default()
		})
		.with_map(ScriptSlot::Main, Arc::new(FixedMap("agent.ts")))
		.with_map(ScriptSlot::Runtime, Arc::new(FixedMap("runtime.ts")))
		.with_map(ScriptSlot::Objc, Arc::new(FixedMap("objc.ts")))
		.with_map(ScriptSlot::Java, Arc::new(FixedMap("java.ts")));

		assert_eq!(resolved_name(&registry, "agent.js").as_deref(), Some("agent.ts"));
		assert_eq!(resolved_name(&registry, "frida.js").as_deref(), Some("runtime.ts"));
		assert_eq!(resolved_name(&registry, "objc.js").as_deref(), Some("objc.ts"));
		assert_eq!(resolved_name(&registry, "java.js").as_deref(), Some("java.ts"));
	}

	#[test]
	fn test_unknown_and_eval_sources_have_no_map() {
		let registry = BundledSourceMaps::new(ScriptNames::default())
			.with_map(ScriptSlot::Main, Arc::new(FixedMap("app.ts")));

		assert!(registry.find("other.js").is_none());
		assert!(registry.find("eval-1.js").is_none());
		assert!(registry.find("").is_none());
	}

	#[test]
	fn test_known_script_without_map() {
		let registry = BundledSourceMaps::new(ScriptNames::default());
		assert!(registry.find("frida.js").is_none());
	}

	#[test]
	fn test_insert_by_identifier() {
		let mut registry = BundledSourceMaps::new(ScriptNames::default());
		let slot = registry.insert("objc.js", Arc::new(FixedMap("objc.ts"))).unwrap();
		assert_eq!(slot, ScriptSlot::Objc);
		assert!(registry.find("objc.js").is_some());

		assert!(matches!(
			registry.insert("nope.js", Arc::new(FixedMap("x"))),
			Err(SymbolicateError::UnknownScript(name)) if name == "nope.js"
		));
	}
}
