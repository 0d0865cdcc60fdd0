// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Memoizing source position resolver.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use scriptdiag_core::{SourceMap, SourcePosition};
use tracing::debug;

use crate::registry::SourceMapRegistry;

type CacheEntry = Option<Arc<dyn SourceMap>>;

/// Translates generated positions to original positions.
///
/// The registry is consulted at most once per source identifier; whatever it
/// answers (a map, or no map) is kept for the lifetime of the resolver.
/// Entries are never evicted.
pub struct SourcePositionResolver {
	registry: Box<dyn SourceMapRegistry>,
	cache: RwLock<HashMap<String, CacheEntry>>,
}

impl SourcePositionResolver {
	pub fn new(registry: impl SourceMapRegistry + 'static) -> Self {
		Self {
			registry: Box::new(registry),
			cache: RwLock::new(HashMap::new()),
		}
	}

	/// Resolve `position`, falling back to it unchanged when there is no map
	/// or the map has no entry for it.
	pub fn resolve(&self, position: SourcePosition) -> SourcePosition {
		let Some(map) = self.map_for(&position.source) else {
			return position;
		};
		map.resolve_original_position(&position).unwrap_or(position)
	}

	fn map_for(&self, source: &str) -> CacheEntry {
		if let Some(entry) = self
			.cache
			.read()
			.unwrap_or_else(PoisonError::into_inner)
			.get(source)
		{
			return entry.clone();
		}

		let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
		cache
			.entry(source.to_string())
			.or_insert_with(|| {
				let map = self.registry.find(source);
				debug!(source, found = map.is_some(), "source map cache miss");
				map
			})
			.clone()
	}

	/// Number of source identifiers looked up so far.
	pub fn cached_sources(&self) -> usize {
		self.cache.read().unwrap_or_else(PoisonError::into_inner).len()
	}
}

impl std::fmt::Debug for SourcePositionResolver {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SourcePositionResolver")
			.field("cached_sources", &self.cached_sources())
			.finish_non_exhaustive()
	}
}
