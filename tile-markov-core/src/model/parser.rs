//! Training text → symbol sequences.
//!
//! Format: sequences are separated by `.` or a line break, symbols inside a
//! sequence by `,`. Whitespace around tokens is ignored.

use serde::Serialize;

use super::{Sequence, Symbol};

/// A token that could not be read as a non-negative integer.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct ParseWarning {
	/// Index of the segment (after splitting, empty segments included).
	pub segment: usize,
	/// The offending token, trimmed.
	pub token: String,
}

/// Result of parsing a training text.
#[derive(Serialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct ParseReport {
	pub sequences: Vec<Sequence>,
	pub warnings: Vec<ParseWarning>,
}

/// Parses `text` into sequences, logging and dropping malformed tokens.
pub fn parse(text: &str) -> Vec<Sequence> {
	parse_report(text).sequences
}

/// Parses `text` and also returns the skipped tokens.
///
/// - `\r\n` and `\r` count as `\n`
/// - empty segments and empty tokens are ignored
/// - a segment without any valid symbol produces no sequence
pub fn parse_report(text: &str) -> ParseReport {
	let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
	let mut report = ParseReport::default();

	for (segment_index, segment) in normalized.split(['.', '\n']).enumerate() {
		let mut sequence = Sequence::new();

		for token in segment.split(',').map(str::trim).filter(|t| !t.is_empty()) {
			match token.parse::<Symbol>() {
				Ok(symbol) => sequence.push(symbol),
				Err(e) => {
					log::warn!("skipping token {token:?} in segment {segment_index}: {e}");
					report.warnings.push(ParseWarning { segment: segment_index, token: token.to_owned() });
				}
			}
		}

		if !sequence.is_empty() {
			report.sequences.push(sequence);
		}
	}

	report
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn splits_on_dot_and_newline() {
		assert_eq!(parse("0,1,2.\n3,4,5"), vec![vec![0, 1, 2], vec![3, 4, 5]]);
	}

	#[test]
	fn normalizes_line_endings() {
		assert_eq!(parse("7,8,9.\r\n10,11"), vec![vec![7, 8, 9], vec![10, 11]]);
		assert_eq!(parse("1,2\r3"), vec![vec![1, 2], vec![3]]);
	}

	#[test]
	fn ignores_whitespace_and_empty_tokens() {
		assert_eq!(parse("  1 , ,2,, 3 ..\n\n4"), vec![vec![1, 2, 3], vec![4]]);
	}

	#[test]
	fn malformed_tokens_are_skipped_not_fatal() {
		let report = parse_report("1,x,2.-3,abc");
		assert_eq!(report.sequences, vec![vec![1, 2]]);
		assert_eq!(
			report.warnings,
			vec![
				ParseWarning { segment: 0, token: "x".to_owned() },
				ParseWarning { segment: 1, token: "-3".to_owned() },
				ParseWarning { segment: 1, token: "abc".to_owned() },
			]
		);
	}

	#[test]
	fn empty_text_has_no_sequences() {
		assert!(parse("").is_empty());
		assert!(parse(" .\n,,").is_empty());
	}
}
