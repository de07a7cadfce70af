//! Readable string and OSC path extraction
//!
//! Both extractors are explicit state machines over raw bytes. They report
//! `(offset, text)` pairs in ascending offset order without deduplication.

use serde::Serialize;

/// A string found in a byte buffer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StringMatch {
    /// Byte offset of the first character
    pub offset: usize,
    /// Decoded text
    pub text: String,
}

impl StringMatch {
    fn new(offset: usize, bytes: &[u8]) -> Self {
        Self {
            offset,
            text: String::from_utf8_lossy(bytes).into_owned(),
        }
    }

    /// Byte offset one past the last character
    pub fn end(&self) -> usize {
        self.offset + self.text.len()
    }
}

/// True for bytes allowed inside a readable string
#[inline]
fn is_string_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b' ' | b'.' | b'_' | b'-')
}

/// True for bytes allowed inside a path segment after the first
#[inline]
fn is_segment_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}

/// True for printable ASCII (space through tilde)
#[inline]
pub fn is_printable(byte: u8) -> bool {
    (32..=126).contains(&byte)
}

/// Extract readable strings of at least `min_length` bytes
///
/// A string starts with an ASCII letter or digit and continues over
/// letters, digits, space, `.`, `_` and `-`. Separators leading a run are
/// not part of the string.
pub fn extract_strings(data: &[u8], min_length: usize) -> Vec<StringMatch> {
    let mut matches = Vec::new();
    let mut pos = 0;

    while pos < data.len() {
        if !is_string_byte(data[pos]) {
            pos += 1;
            continue;
        }

        let run_start = pos;
        while pos < data.len() && is_string_byte(data[pos]) {
            pos += 1;
        }

        let Some(first_alnum) = data[run_start..pos]
            .iter()
            .position(|b| b.is_ascii_alphanumeric())
        else {
            continue;
        };
        let start = run_start + first_alnum;

        if pos - start >= min_length.max(1) {
            let found = StringMatch::new(start, &data[start..pos]);
            if !found.text.contains(char::REPLACEMENT_CHARACTER) {
                matches.push(found);
            }
        }
    }

    matches
}

/// Extract slash-delimited control paths such as `/softubeosd/ch1/gain`
///
/// The first segment is alphanumeric; following segments also allow `_`.
/// At least two segments are required.
pub fn extract_osc_paths(data: &[u8]) -> Vec<StringMatch> {
    let mut matches = Vec::new();
    let mut pos = 0;

    while pos < data.len() {
        if data[pos] != b'/' {
            pos += 1;
            continue;
        }

        match match_osc_path(data, pos) {
            Some(end) => {
                matches.push(StringMatch::new(pos, &data[pos..end]));
                pos = end;
            }
            None => pos += 1,
        }
    }

    matches
}

/// Try to match a path at `start`, which must hold a `/`
///
/// Returns the exclusive end offset of the longest match.
fn match_osc_path(data: &[u8], start: usize) -> Option<usize> {
    let first_end = scan_while(data, start + 1, |b| b.is_ascii_alphanumeric());
    if first_end == start + 1 {
        return None;
    }

    let mut end = first_end;
    let mut segments = 0;
    while end < data.len() && data[end] == b'/' {
        let segment_end = scan_while(data, end + 1, is_segment_byte);
        if segment_end == end + 1 {
            break;
        }
        end = segment_end;
        segments += 1;
    }

    (segments > 0).then_some(end)
}

fn scan_while(data: &[u8], from: usize, accept: impl Fn(u8) -> bool) -> usize {
    let mut pos = from;
    while pos < data.len() && accept(data[pos]) {
        pos += 1;
    }
    pos
}

/// Printable ASCII runs inside `data[window_start..window_end]`
///
/// Runs are cut at the window edges, truncated after `max_length` bytes
/// (the rest of a long run is skipped) and dropped when shorter than
/// `min_length`. At most `limit` runs are returned.
pub fn printable_runs(
    data: &[u8],
    window_start: usize,
    window_end: usize,
    min_length: usize,
    max_length: usize,
    limit: usize,
) -> Vec<StringMatch> {
    let window_end = window_end.min(data.len());
    let mut runs = Vec::new();
    if limit == 0 {
        return runs;
    }
    let mut run_start: Option<usize> = None;

    for pos in window_start..=window_end {
        let printable = pos < window_end && is_printable(data[pos]);
        match (run_start, printable) {
            (None, true) => run_start = Some(pos),
            (Some(start), false) => {
                let end = pos.min(start + max_length);
                if end - start >= min_length {
                    runs.push(StringMatch::new(start, &data[start..end]));
                    if runs.len() == limit {
                        break;
                    }
                }
                run_start = None;
            }
            _ => {}
        }
    }

    runs
}
