// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Source map lookup and position remapping for script diagnostics.
//!
//! This crate provides functionality for:
//! - Parsing source maps (v3) into queryable [`ParsedSourceMap`]s
//! - Finding the map for a script through a [`SourceMapRegistry`]
//! - Resolving generated positions with a memoizing [`SourcePositionResolver`]
//! - Rewriting V8 eval origins with [`map_eval_origin`]
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use scriptdiag_core::SourcePosition;
//! use scriptdiag_symbolicate::{
//! 	BundledSourceMaps, ParsedSourceMap, ScriptNames, ScriptSlot, SourcePositionResolver,
//! };
//!
//! let map = ParsedSourceMap::from_str(
//! 	r#"{"version": 3, "sources": ["src/app.ts"], "names": [], "mappings": "AAAA"}"#,
//! )
//! .unwrap();
//!
//! let registry =
//! 	BundledSourceMaps::new(ScriptNames::default()).with_map(ScriptSlot::Main, Arc::new(map));
//! let resolver = SourcePositionResolver::new(registry);
//!
//! let original = resolver.resolve(SourcePosition::new("script.js", 1, 0));
//! assert_eq!(original, SourcePosition::new("src/app.ts", 1, 0));
//! ```

pub mod error;
pub mod eval_origin;
pub mod registry;
pub mod resolver;
pub mod sourcemap;
pub mod vlq;

pub use error::{Result, SymbolicateError};
pub use eval_origin::map_eval_origin;
pub use registry::{BundledSourceMaps, ScriptNames, ScriptSlot, SourceMapRegistry};
pub use resolver::SourcePositionResolver;
pub use sourcemap::ParsedSourceMap;
pub use vlq::{decode_vlq_mappings, decode_vlq_segment, DecodedMappings, Mapping};
