// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types for script exception diagnostics.
//!
//! This crate provides the types shared by the symbolication layer
//! (`scriptdiag-symbolicate`) and the engine integrations (`scriptdiag`):
//!
//! - [`SourcePosition`]: a `(source, line, column)` triple
//! - [`SourceMap`]: the lookup contract every source map provider fulfils
//! - [`CallSite`]: the accessor surface of one stack frame
//! - [`DiagnosticRecord`]: the serialized summary of an unhandled exception

pub mod error;
pub mod frame;
pub mod position;
pub mod record;

pub use error::{CoreError, Result};
pub use frame::{CallSite, CallSiteData};
pub use position::{SourceMap, SourcePosition};
pub use record::{DiagnosticRecord, RecordKind};
