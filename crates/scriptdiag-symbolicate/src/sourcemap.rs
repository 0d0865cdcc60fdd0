// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Source map v3 documents.

use scriptdiag_core::{SourceMap, SourcePosition};
use serde::Deserialize;
use tracing::debug;

use crate::error::{Result, SymbolicateError};
use crate::vlq::{decode_vlq_mappings, DecodedMappings};

/// Prefix some servers prepend to JSON to defeat script inclusion.
const XSSI_PREFIX: &[u8] = b")]}'";

/// The parts of a v3 document that lookups need; `names` and
/// `sourcesContent` are ignored.
#[derive(Deserialize)]
struct Document {
	version: u32,
	file: Option<String>,
	#[serde(rename = "sourceRoot")]
	source_root: Option<String>,
	sources: Vec<Option<String>>,
	mappings: String,
}

/// A decoded source map for one generated script.
#[derive(Debug, Clone)]
pub struct ParsedSourceMap {
	file: Option<String>,
	source_root: Option<String>,
	/// Original source names with the source root already applied. `None`
	/// for entries the document lists as `null`.
	sources: Vec<Option<String>>,
	mappings: DecodedMappings,
}

fn strip_xssi_prefix(data: &[u8]) -> &[u8] {
	if !data.starts_with(XSSI_PREFIX) {
		return data;
	}
	match data.iter().position(|&b| b == b'\n') {
		Some(newline) => &data[newline + 1..],
		None => &data[XSSI_PREFIX.len()..],
	}
}

fn with_root(root: Option<&str>, source: String) -> String {
	match root.map(|r| r.trim_end_matches('/')) {
		Some(root) if !root.is_empty() => format!("{root}/{source}"),
		_ => source,
	}
}

impl ParsedSourceMap {
	pub fn from_bytes(data: &[u8]) -> Result<Self> {
		let document: Document = serde_json::from_slice(strip_xssi_prefix(data))?;
		if document.version != 3 {
			return Err(SymbolicateError::InvalidSourceMapVersion(document.version));
		}

		let mappings = decode_vlq_mappings(&document.mappings)?;
		if let Some(index) = mappings
			.max_source_index()
			.filter(|&index| index as usize >= document.sources.len())
		{
			return Err(SymbolicateError::InvalidSourceIndex(index));
		}

		let root = document.source_root.as_deref();
		let sources = document
			.sources
			.into_iter()
			.map(|source| source.map(|s| with_root(root, s)))
			.collect();

		Ok(Self {
			file: document.file,
			source_root: document.source_root,
			sources,
			mappings,
		})
	}

	pub fn from_str(data: &str) -> Result<Self> {
		Self::from_bytes(data.as_bytes())
	}

	/// Generated file name recorded in the map.
	pub fn file(&self) -> Option<&str> {
		self.file.as_deref()
	}

	pub fn source_root(&self) -> Option<&str> {
		self.source_root.as_deref()
	}

	/// Original source names, root applied; `null` entries are skipped.
	pub fn sources(&self) -> impl Iterator<Item = &str> {
		self.sources.iter().filter_map(|s| s.as_deref())
	}

	/// Original position of a generated `line` (1-based) and `column`
	/// (0-based), in the same conventions. Picks the closest mapping at or
	/// before `column` on that line.
	pub fn lookup(&self, line: u32, column: u32) -> Option<SourcePosition> {
		let mapping = self.mappings.find(line.checked_sub(1)?, column)?;
		let source = self.sources.get(mapping.source_index as usize)?.as_deref()?;
		let line = mapping.original_line.checked_add(1)?;
		Some(SourcePosition::new(source, line, mapping.original_column))
	}

	pub fn source_count(&self) -> usize {
		self.sources.len()
	}

	pub fn mapping_count(&self) -> usize {
		self.mappings.len()
	}
}

impl SourceMap for ParsedSourceMap {
	fn resolve_original_position(&self, generated: &SourcePosition) -> Option<SourcePosition> {
		let original = self.lookup(generated.line, generated.column);
		if original.is_none() {
			debug!(
				source = %generated.source,
				line = generated.line,
				column = generated.column,
				"no mapping for generated position"
			);
		}
		original
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	/// main.js 42:8 -> app.ts 10:3, after 41 unmapped lines.
	fn main_js_map() -> String {
		format!(
			r#"{{"version":3,"file":"main.js","sources":["app.ts"],"names":[],"mappings":"{}QASG"}}"#,
			";".repeat(41)
		)
	}

	#[test]
	fn test_document_metadata() {
		let map = ParsedSourceMap::from_str(&main_js_map()).unwrap();
		assert_eq!(map.file(), Some("main.js"));
		assert_eq!(map.sources().collect::<Vec<_>>(), vec!["app.ts"]);
		assert_eq!(map.source_count(), 1);
		assert_eq!(map.mapping_count(), 1);
	}

	#[test]
	fn test_lookup_exact_and_following_columns() {
		let map = ParsedSourceMap::from_str(&main_js_map()).unwrap();
		assert_eq!(map.lookup(42, 8), Some(SourcePosition::new("app.ts", 10, 3)));
		assert_eq!(map.lookup(42, 30), Some(SourcePosition::new("app.ts", 10, 3)));
	}

	#[test]
	fn test_lookup_misses() {
		let map = ParsedSourceMap::from_str(&main_js_map()).unwrap();
		assert_eq!(map.lookup(42, 7), None);
		assert_eq!(map.lookup(41, 8), None);
		assert_eq!(map.lookup(0, 0), None);
	}

	#[test]
	fn test_generated_source_name_not_consulted() {
		let map = ParsedSourceMap::from_str(&main_js_map()).unwrap();
		let resolved = map.resolve_original_position(&SourcePosition::new("whatever.js", 42, 12));
		assert_eq!(resolved, Some(SourcePosition::new("app.ts", 10, 3)));
	}

	#[test]
	fn test_rejects_other_versions() {
		let err = ParsedSourceMap::from_str(r#"{"version": 2, "sources": [], "mappings": ""}"#)
			.unwrap_err();
		assert!(matches!(err, SymbolicateError::InvalidSourceMapVersion(2)));
	}

	#[test]
	fn test_rejects_dangling_source_index() {
		let err = ParsedSourceMap::from_str(r#"{"version": 3, "sources": ["a.ts"], "mappings": "ACAA"}"#)
			.unwrap_err();
		assert!(matches!(err, SymbolicateError::InvalidSourceIndex(1)));
	}

	#[test]
	fn test_unrepresentable_original_line_misses() {
		// Original line delta of u32::MAX: the 1-based line does not fit.
		let map = ParsedSourceMap::from_str(
			r#"{"version": 3, "sources": ["app.ts"], "mappings": "AA+/////HA"}"#,
		)
		.unwrap();
		assert_eq!(map.mapping_count(), 1);
		assert_eq!(map.lookup(1, 0), None);

		let map = ParsedSourceMap::from_str(
			r#"{"version": 3, "sources": ["app.ts"], "mappings": "AAA+/////HA"}"#,
		)
		.unwrap();
		assert_eq!(map.lookup(1, 0), Some(SourcePosition::new("app.ts", 1, u32::MAX)));
	}

	#[test]
	fn test_source_root_applied() {
		let map = ParsedSourceMap::from_str(
			r#"{"version": 3, "sourceRoot": "webpack:///src/", "sources": ["index.ts"], "mappings": "AAAA"}"#,
		)
		.unwrap();
		assert_eq!(map.source_root(), Some("webpack:///src/"));
		assert_eq!(map.lookup(1, 0).unwrap().source, "webpack:///src/index.ts");
	}

	#[test]
	fn test_null_source_does_not_resolve() {
		let map =
			ParsedSourceMap::from_str(r#"{"version": 3, "sources": [null], "mappings": "AAAA"}"#).unwrap();
		assert_eq!(map.source_count(), 1);
		assert_eq!(map.sources().count(), 0);
		assert_eq!(map.lookup(1, 0), None);
	}

	#[test]
	fn test_xssi_prefix_skipped() {
		let data = format!(")]}}'\n{}", main_js_map());
		let map = ParsedSourceMap::from_bytes(data.as_bytes()).unwrap();
		assert_eq!(map.lookup(42, 8), Some(SourcePosition::new("app.ts", 10, 3)));
	}
}
