// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Base64 VLQ decoding of source map `mappings`.
//!
//! Lines are separated by `;`, segments by `,`. Every field of a segment is a
//! delta against the previous segment carrying that field; the generated
//! column resets at each line.

use crate::error::{Result, SymbolicateError};

/// Continuation bit of a Base64 VLQ digit.
const VLQ_CONTINUATION: i64 = 0b10_0000;
const VLQ_MASK: i64 = 0b01_1111;

fn base64_value(ch: u8) -> Result<i64> {
	let value = match ch {
		b'A'..=b'Z' => ch - b'A',
		b'a'..=b'z' => ch - b'a' + 26,
		b'0'..=b'9' => ch - b'0' + 52,
		b'+' => 62,
		b'/' => 63,
		_ => return Err(SymbolicateError::InvalidVlqChar(ch as char)),
	};
	Ok(i64::from(value))
}

/// Decode one segment into its signed field values.
pub fn decode_vlq_segment(segment: &str) -> Result<Vec<i64>> {
	let mut values = Vec::with_capacity(5);
	let mut accumulator = 0i64;
	let mut shift = 0u32;

	for ch in segment.bytes() {
		let digit = base64_value(ch)?;
		if shift > 32 {
			return Err(SymbolicateError::VlqOverflow(segment.to_string()));
		}
		accumulator += (digit & VLQ_MASK) << shift;

		if digit & VLQ_CONTINUATION != 0 {
			shift += 5;
			continue;
		}

		// Lowest bit carries the sign.
		let magnitude = accumulator >> 1;
		values.push(if accumulator & 1 == 1 { -magnitude } else { magnitude });
		accumulator = 0;
		shift = 0;
	}

	Ok(values)
}

/// One decoded segment with source information.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mapping {
	/// Generated line (0-indexed).
	pub generated_line: u32,
	/// Generated column (0-indexed).
	pub generated_column: u32,
	pub source_index: u32,
	/// Original line (0-indexed).
	pub original_line: u32,
	/// Original column (0-indexed).
	pub original_column: u32,
}

/// Mappings ordered by generated position.
#[derive(Debug, Clone, Default)]
pub struct DecodedMappings {
	mappings: Vec<Mapping>,
}

impl DecodedMappings {
	pub fn from_mappings(mut mappings: Vec<Mapping>) -> Self {
		mappings.sort_by_key(|m| (m.generated_line, m.generated_column));
		Self { mappings }
	}

	/// Closest mapping at or before `column` on the generated `line`.
	///
	/// Never crosses into a previous line.
	pub fn find(&self, line: u32, column: u32) -> Option<&Mapping> {
		let start = self.mappings.partition_point(|m| m.generated_line < line);
		let end = self.mappings.partition_point(|m| m.generated_line <= line);
		let on_line = &self.mappings[start..end];

		match on_line.partition_point(|m| m.generated_column <= column) {
			0 => None,
			idx => Some(&on_line[idx - 1]),
		}
	}

	/// Largest source index referenced by any mapping.
	pub fn max_source_index(&self) -> Option<u32> {
		self.mappings.iter().map(|m| m.source_index).max()
	}

	pub fn len(&self) -> usize {
		self.mappings.len()
	}

	pub fn is_empty(&self) -> bool {
		self.mappings.is_empty()
	}
}

fn to_index(value: i64, segment: &str) -> Result<u32> {
	u32::try_from(value).map_err(|_| SymbolicateError::VlqOverflow(segment.to_string()))
}

/// Decode a full `mappings` string.
///
/// Segments with a single field (generated column only) carry no source
/// information and are skipped.
pub fn decode_vlq_mappings(mappings: &str) -> Result<DecodedMappings> {
	let mut decoded = Vec::new();
	let mut source = 0i64;
	let mut original_line = 0i64;
	let mut original_column = 0i64;

	for (generated_line, line) in mappings.split(';').enumerate() {
		let generated_line = to_index(generated_line as i64, line)?;
		let mut generated_column = 0i64;

		for segment in line.split(',').filter(|s| !s.is_empty()) {
			let fields = decode_vlq_segment(segment)?;
			let Some(column_delta) = fields.first() else {
				continue;
			};
			generated_column += column_delta;

			if fields.len() < 4 {
				continue;
			}
			source += fields[1];
			original_line += fields[2];
			original_column += fields[3];

			decoded.push(Mapping {
				generated_line,
				generated_column: to_index(generated_column, segment)?,
				source_index: to_index(source, segment)?,
				original_line: to_index(original_line, segment)?,
				original_column: to_index(original_column, segment)?,
			});
		}
	}

	Ok(DecodedMappings::from_mappings(decoded))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_decode_single_digits() {
		assert_eq!(decode_vlq_segment("A").unwrap(), vec![0]);
		assert_eq!(decode_vlq_segment("C").unwrap(), vec![1]);
		assert_eq!(decode_vlq_segment("D").unwrap(), vec![-1]);
		assert_eq!(decode_vlq_segment("Q").unwrap(), vec![8]);
	}

	#[test]
	fn test_decode_continuation() {
		// 'g' = 32 | 0, 'B' = 1 -> 1 << 5 = 32 -> 16
		assert_eq!(decode_vlq_segment("gB").unwrap(), vec![16]);
	}

	#[test]
	fn test_decode_four_fields() {
		assert_eq!(decode_vlq_segment("QASG").unwrap(), vec![8, 0, 9, 3]);
	}

	#[test]
	fn test_invalid_char() {
		assert!(matches!(
			decode_vlq_segment("A!"),
			Err(SymbolicateError::InvalidVlqChar('!'))
		));
	}

	#[test]
	fn test_mappings_are_delta_encoded_across_lines() {
		let decoded = decode_vlq_mappings("AAAA;AACA,IAAE").unwrap();
		assert_eq!(decoded.len(), 3);

		let second = decoded.find(1, 0).unwrap();
		assert_eq!(second.original_line, 1);
		assert_eq!(second.original_column, 0);

		let third = decoded.find(1, 4).unwrap();
		assert_eq!(third.generated_column, 4);
		assert_eq!(third.original_line, 1);
		assert_eq!(third.original_column, 2);
	}

	#[test]
	fn test_find_does_not_cross_lines() {
		let decoded = decode_vlq_mappings("AAAA;;IAAA").unwrap();
		assert!(decoded.find(1, 10).is_none());
		assert!(decoded.find(2, 3).is_none());
		assert_eq!(decoded.find(2, 4).unwrap().generated_column, 4);
	}

	#[test]
	fn test_generated_column_only_segments_skipped() {
		let decoded = decode_vlq_mappings("A,CAAA").unwrap();
		assert_eq!(decoded.len(), 1);
		assert_eq!(decoded.find(0, 1).unwrap().generated_column, 1);
		assert!(decoded.find(0, 0).is_none());
	}

	#[test]
	fn test_negative_index_rejected() {
		// Source delta of -1 from 0.
		assert!(matches!(
			decode_vlq_mappings("ADAA"),
			Err(SymbolicateError::VlqOverflow(_))
		));
	}
}
