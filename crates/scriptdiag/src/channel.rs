// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! One-way channel to the controlling process.

use crate::error::Result;

/// Pushes serialized messages to the host.
pub trait OutputChannel: Send + Sync {
	/// Send `message` with an optional binary payload.
	fn send(&self, message: &str, data: Option<&[u8]>) -> Result<()>;
}

impl<F> OutputChannel for F
where
	F: Fn(&str, Option<&[u8]>) -> Result<()> + Send + Sync,
{
	fn send(&self, message: &str, data: Option<&[u8]>) -> Result<()> {
		self(message, data)
	}
}
