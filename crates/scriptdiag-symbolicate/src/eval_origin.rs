// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Remapping of V8 eval origins.
//!
//! V8 describes where evaluated code came from as either
//! `eval at <scope> (<source>:<line>:<column>)` or, for code evaluated from
//! within evaluated code, `eval at <scope> (<origin>)` where `<origin>` is
//! again one of the two forms. Only the innermost origin carries a location.

use std::sync::LazyLock;

use regex::Regex;
use scriptdiag_core::SourcePosition;

use crate::resolver::SourcePositionResolver;

static EVAL_AT_LOCATION: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^eval at ([^(]+) \((.+):(\d+):(\d+)\)$").expect("valid eval location regex")
});

static EVAL_AT_ORIGIN: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^eval at ([^(]+) \((.+)\)$").expect("valid nested eval regex"));

/// Rewrite the location inside an eval origin to its original position.
///
/// Columns in the text are 1-indexed; a location with column 0 is left as
/// written. Text matching neither form is returned verbatim.
pub fn map_eval_origin(resolver: &SourcePositionResolver, origin: &str) -> String {
	if let Some(caps) = EVAL_AT_LOCATION.captures(origin) {
		let parsed = (caps[3].parse::<u32>(), caps[4].parse::<u32>());
		if let (Ok(line), Ok(column @ 1..)) = parsed {
			let position = resolver.resolve(SourcePosition::new(&caps[2], line, column - 1));
			return format!(
				"eval at {} ({}:{}:{})",
				&caps[1],
				position.source,
				position.line,
				position.column.saturating_add(1)
			);
		}
	}

	if let Some(caps) = EVAL_AT_ORIGIN.captures(origin) {
		return format!(
			"eval at {} ({})",
			&caps[1],
			map_eval_origin(resolver, &caps[2])
		);
	}

	origin.to_string()
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;
	use scriptdiag_core::SourceMap;
	use std::collections::HashMap;
	use std::sync::Arc;

	use crate::registry::{BundledSourceMaps, ScriptNames, ScriptSlot};

	struct TableMap(HashMap<(u32, u32), SourcePosition>);

	impl SourceMap for TableMap {
		fn resolve_original_position(&self, generated: &SourcePosition) -> Option<SourcePosition> {
			self.0.get(&(generated.line, generated.column)).cloned()
		}
	}

	fn resolver() -> SourcePositionResolver {
		let bar = TableMap(HashMap::from([
			((10, 4), SourcePosition::new("src.js", 7, 0)),
			((3, 11), SourcePosition::new("src.js", 2, 5)),
		]));
		let a = TableMap(HashMap::from([((1, 0), SourcePosition::new("a.ts", 20, 2))]));
		SourcePositionResolver::new(
			BundledSourceMaps::new(ScriptNames {
				main: "bar.js".to_string(),
				runtime: "a.js".to_string(),
				..ScriptNames::default()
			})
			.with_map(ScriptSlot::Main, Arc::new(bar))
			.with_map(ScriptSlot::Runtime, Arc::new(a)),
		)
	}

	#[test]
	fn test_flat_origin_remapped() {
		assert_eq!(
			map_eval_origin(&resolver(), "eval at foo (bar.js:10:5)"),
			"eval at foo (src.js:7:1)"
		);
	}

	#[test]
	fn test_column_zero_left_as_written() {
		assert_eq!(
			map_eval_origin(&resolver(), "eval at f (x.js:3:0)"),
			"eval at f (x.js:3:0)"
		);
		assert_eq!(
			map_eval_origin(&resolver(), "eval at foo (bar.js:10:0)"),
			"eval at foo (bar.js:10:0)"
		);
	}

	#[test]
	fn test_resolved_column_at_limit_does_not_overflow() {
		let edge = TableMap(HashMap::from([((1, 0), SourcePosition::new("edge.ts", 1, u32::MAX))]));
		let resolver = SourcePositionResolver::new(
			BundledSourceMaps::new(ScriptNames::default()).with_map(ScriptSlot::Main, Arc::new(edge)),
		);
		assert_eq!(
			map_eval_origin(&resolver, "eval at g (script.js:1:1)"),
			format!("eval at g (edge.ts:1:{})", u32::MAX)
		);
	}

	#[test]
	fn test_flat_origin_keeps_resolved_column() {
		assert_eq!(
			map_eval_origin(&resolver(), "eval at run (bar.js:3:12)"),
			"eval at run (src.js:2:6)"
		);
	}

	#[test]
	fn test_nested_origin_remaps_innermost_only() {
		assert_eq!(
			map_eval_origin(&resolver(), "eval at outer (eval at inner (a.js:1:1))"),
			"eval at outer (eval at inner (a.ts:20:3))"
		);
	}

	#[test]
	fn test_unmapped_location_round_trips() {
		assert_eq!(
			map_eval_origin(&resolver(), "eval at <anonymous> (other.js:4:9)"),
			"eval at <anonymous> (other.js:4:9)"
		);
	}

	#[test]
	fn test_unrecognized_text_passes_through() {
		let r = resolver();
		assert_eq!(map_eval_origin(&r, "Function"), "Function");
		assert_eq!(map_eval_origin(&r, "eval at foo"), "eval at foo");
		assert_eq!(map_eval_origin(&r, ""), "");
	}

	proptest! {
		#[test]
		fn text_without_eval_prefix_is_verbatim(text in "[^e].{0,40}") {
			prop_assert_eq!(map_eval_origin(&resolver(), &text), text);
		}
	}
}
