//! Lexical scan for report sequences.
//!
//! A report sequence is `ESC [`, then a run of bytes that are not ASCII
//! letters (the body), then one of the [`Terminator`] tokens. Every other
//! escape sequence is left alone. Scanning never looks past the chunk it is
//! given, so a report split across two reads is not recognized.

use std::ops::Range;

use bytes::{BufMut, Bytes, BytesMut};

use crate::report::{decode, Report, Terminator};
use crate::sequence::ESC;

/// One report sequence located in a chunk. All offsets are half-open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    pub match_start: usize,
    pub match_end: usize,
    pub body_start: usize,
    pub body_end: usize,
    pub terminator_start: usize,
    pub terminator_end: usize,
}

impl Match {
    /// The whole sequence, `ESC` through terminator.
    pub fn range(&self) -> Range<usize> {
        self.match_start..self.match_end
    }

    pub fn body<'a>(&self, chunk: &'a [u8]) -> &'a [u8] {
        &chunk[self.body_start..self.body_end]
    }

    pub fn terminator<'a>(&self, chunk: &'a [u8]) -> &'a [u8] {
        &chunk[self.terminator_start..self.terminator_end]
    }
}

/// Find every report sequence in `chunk`, left to right, non-overlapping.
pub fn scan(chunk: &[u8]) -> Vec<Match> {
    let mut matches = Vec::new();
    let mut pos = 0;
    while pos + 1 < chunk.len() {
        if chunk[pos] == ESC && chunk[pos + 1] == b'[' {
            match match_at(chunk, pos) {
                Ok(m) => {
                    pos = m.match_end;
                    matches.push(m);
                }
                // Every start before this letter ends on it and fails the same way.
                Err(Some(letter)) => pos = letter,
                Err(None) => break,
            }
            continue;
        }
        pos += 1;
    }
    matches
}

/// Try to match a report sequence whose `ESC [` starts at `start`.
///
/// On failure, returns the offset of the first letter after `ESC [`, or
/// `None` when the rest of the chunk has no letter.
fn match_at(chunk: &[u8], start: usize) -> Result<Match, Option<usize>> {
    let body_start = start + 2;
    // The body is greedy over non-letters, so the terminator must end on the
    // first letter after `ESC [`.
    let letter = body_start
        + chunk[body_start..]
            .iter()
            .position(u8::is_ascii_alphabetic)
            .ok_or(None)?;

    let terminator_start = match chunk[letter] {
        b'R' => letter,
        b'c' | b'n' if letter > body_start => letter - 1,
        _ => return Err(Some(letter)),
    };
    let terminator_end = letter + 1;
    Terminator::from_bytes(&chunk[terminator_start..terminator_end]).ok_or(Some(letter))?;

    Ok(Match {
        match_start: start,
        match_end: terminator_end,
        body_start,
        body_end: terminator_start,
        terminator_start,
        terminator_end,
    })
}

/// The result of pulling every report out of one chunk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extracted {
    /// The chunk with every matched sequence removed, order preserved.
    pub clean: Bytes,
    /// Decoded reports in scan order.
    pub reports: Vec<Report>,
}

/// Scan `chunk`, decode each match, and reassemble the residual bytes.
pub fn extract(chunk: &[u8]) -> Extracted {
    let matches = scan(chunk);
    if matches.is_empty() {
        return Extracted {
            clean: Bytes::copy_from_slice(chunk),
            reports: Vec::new(),
        };
    }

    let mut clean = BytesMut::with_capacity(chunk.len());
    let mut reports = Vec::with_capacity(matches.len());
    let mut cursor = 0;
    for m in &matches {
        clean.put_slice(&chunk[cursor..m.match_start]);
        if let Some(report) = decode(m.body(chunk), m.terminator(chunk)) {
            reports.push(report);
        }
        cursor = m.match_end;
    }
    clean.put_slice(&chunk[cursor..]);

    Extracted {
        clean: clean.freeze(),
        reports,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Position;

    #[test]
    fn plain_text_has_no_matches() {
        assert!(scan(b"hello world").is_empty());
        let out = extract(b"hello world");
        assert_eq!(out.clean.as_ref(), b"hello world");
        assert!(out.reports.is_empty());
    }

    #[test]
    fn other_escape_sequences_pass_through() {
        let chunk = b"\x1b[31mred\x1b[0m \x1b[2J\x1b[3;21f\x1b[?25l\x1b[6n";
        assert!(scan(chunk).is_empty());
        assert_eq!(extract(chunk).clean.as_ref(), chunk);
    }

    #[test]
    fn offsets_for_cursor_position() {
        let chunk = b"ab\x1b[4;10Rcd";
        let matches = scan(chunk);
        assert_eq!(
            matches,
            vec![Match {
                match_start: 2,
                match_end: 9,
                body_start: 4,
                body_end: 8,
                terminator_start: 8,
                terminator_end: 9,
            }]
        );
        assert_eq!(matches[0].body(chunk), b"4;10");
        assert_eq!(matches[0].terminator(chunk), b"R");
        assert_eq!(matches[0].range(), 2..9);
    }

    #[test]
    fn two_byte_terminators_split_from_body() {
        let chunk = b"\x1b[120c";
        let m = scan(chunk)[0];
        assert_eq!(m.body(chunk), b"12");
        assert_eq!(m.terminator(chunk), b"0c");

        let chunk = b"\x1b[0n\x1b[3n";
        let matches = scan(chunk);
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].body(chunk), b"");
        assert_eq!(matches[0].terminator(chunk), b"0n");
        assert_eq!(matches[1].terminator(chunk), b"3n");
    }

    #[test]
    fn unrecognized_letter_after_body_is_not_a_match() {
        assert!(scan(b"\x1b[1c").is_empty());
        assert!(scan(b"\x1b[c").is_empty());
        assert!(scan(b"\x1b[5n").is_empty());
        assert!(scan(b"\x1b[").is_empty());
        assert!(scan(b"\x1b[12;4").is_empty());
    }

    #[test]
    fn bracket_without_escape_is_ignored() {
        assert!(scan(b"[4;10R").is_empty());
    }

    #[test]
    fn extract_removes_every_sequence_in_order() {
        let chunk = b"one\x1b[0ntwo\x1b[4;10Rthree\x1b[70cfour";
        let out = extract(chunk);
        assert_eq!(out.clean.as_ref(), b"onetwothreefour");
        assert_eq!(
            out.reports,
            vec![
                Report::DeviceOk,
                Report::CursorPosition(Position { row: 4, column: 10 }),
                Report::DeviceCode { code: 7 },
            ]
        );
    }

    #[test]
    fn adjacent_sequences_leave_nothing_behind() {
        let out = extract(b"\x1b[1;1R\x1b[2;2R");
        assert!(out.clean.is_empty());
        assert_eq!(out.reports.len(), 2);
    }

    #[test]
    fn exact_single_report_chunk() {
        let out = extract(b"\x1b[3n");
        assert!(out.clean.is_empty());
        assert_eq!(out.reports, vec![Report::DeviceFailure]);
    }

    #[test]
    fn failed_start_does_not_hide_a_later_report() {
        let chunk = b"\x1b[1m\x1b[5;6R";
        let out = extract(chunk);
        assert_eq!(out.clean.as_ref(), b"\x1b[1m");
        assert_eq!(
            out.reports,
            vec![Report::CursorPosition(Position { row: 5, column: 6 })]
        );
    }

    #[test]
    fn split_report_is_left_as_plain_bytes() {
        let first = extract(b"abc\x1b[12;");
        let second = extract(b"40Rdef");
        assert_eq!(first.clean.as_ref(), b"abc\x1b[12;");
        assert_eq!(second.clean.as_ref(), b"40Rdef");
        assert!(first.reports.is_empty());
        assert!(second.reports.is_empty());
    }

    #[test]
    fn non_letter_body_is_permissive() {
        let out = extract(b"\x1b[x;yR");
        assert_eq!(out.reports.len(), 0, "x and y are letters, so no match");

        let out = extract(b"\x1b[?;!R");
        assert_eq!(
            out.reports,
            vec![Report::CursorPosition(Position::default())]
        );
    }

    #[test]
    fn body_runs_over_a_nested_escape() {
        let chunk = b"\x1b[5\x1b[6;1R";
        let matches = scan(chunk);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].range(), 0..chunk.len());
        assert_eq!(matches[0].body(chunk), b"5\x1b[6;1");
        assert!(extract(chunk).clean.is_empty());
    }

    #[test]
    fn long_letterless_run_scans_in_one_pass() {
        let chunk = b"\x1b[".repeat(0x8000);
        let started = std::time::Instant::now();
        assert!(scan(&chunk).is_empty());
        assert_eq!(extract(&chunk).clean.len(), chunk.len());

        let mut chunk = b"\x1b[1;".repeat(0x4000);
        chunk.extend_from_slice(b"m\x1b[2;3R");
        let out = extract(&chunk);
        assert_eq!(
            out.reports,
            vec![Report::CursorPosition(Position { row: 2, column: 3 })]
        );
        assert_eq!(out.clean.len(), chunk.len() - b"\x1b[2;3R".len());
        assert!(started.elapsed() < std::time::Duration::from_secs(1));
    }

    #[test]
    fn unknown_letter_skips_ahead_without_losing_a_report() {
        let out = extract(b"\x1b[\x1b[1x\x1b[0n");
        assert_eq!(out.clean.as_ref(), b"\x1b[\x1b[1x");
        assert_eq!(out.reports, vec![Report::DeviceOk]);
    }
}
