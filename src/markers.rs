//! Structural marker scanning
//!
//! The `.cs` file is an IFF-like container written byte-reversed: the
//! container starts with `MROF` ("FORM"), a `FCSS  SG` type tag sits at
//! offset 8, and `RGSC` tags recur through the body. Nothing here decodes
//! chunk contents; the scanner only reports where tags are and how far
//! apart they sit.

use serde::Serialize;

/// Marker tags are always four bytes
pub type Tag = [u8; 4];

/// Byte-reversed `FORM` container tag expected at offset 0
pub const FORM_TAG: Tag = *b"MROF";
/// Type tag expected at offset 8
pub const FCSS_TAG: Tag = *b"FCSS";
/// Full type signature expected at offset 8
pub const FCSS_SIGNATURE: &[u8; 8] = b"FCSS  SG";
/// Recurring block tag
pub const RGSC_TAG: Tag = *b"RGSC";

/// Occurrences of one tag in a buffer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkerScan {
    /// Tag text (lossy)
    pub tag: String,
    /// Ascending offsets of every occurrence
    pub offsets: Vec<usize>,
    /// Distances between consecutive occurrences
    pub deltas: Vec<usize>,
}

impl MarkerScan {
    pub fn count(&self) -> usize {
        self.offsets.len()
    }
}

/// Find every occurrence of `tag`, including overlapping ones
pub fn find_tag(data: &[u8], tag: &Tag) -> Vec<usize> {
    data.windows(tag.len())
        .enumerate()
        .filter(|(_, window)| *window == tag.as_slice())
        .map(|(offset, _)| offset)
        .collect()
}

/// Distances between consecutive offsets; empty for fewer than two
pub fn spacing(offsets: &[usize]) -> Vec<usize> {
    offsets.windows(2).map(|pair| pair[1] - pair[0]).collect()
}

/// Scan a buffer for `tag` and compute spacing
pub fn scan_tag(data: &[u8], tag: &Tag) -> MarkerScan {
    let offsets = find_tag(data, tag);
    let deltas = spacing(&offsets);
    log::debug!(
        "tag {:?}: {} occurrences",
        String::from_utf8_lossy(tag),
        offsets.len()
    );
    MarkerScan {
        tag: String::from_utf8_lossy(tag).into_owned(),
        offsets,
        deltas,
    }
}

/// True when `data` holds `expected` at `offset`
pub fn has_bytes_at(data: &[u8], offset: usize, expected: &[u8]) -> bool {
    data.get(offset..offset + expected.len()) == Some(expected)
}

/// Header signature checks
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderMarkers {
    /// `MROF` at offset 0
    #[serde(rename = "FORM")]
    pub form: bool,
    /// `FCSS` at offset 8
    #[serde(rename = "FCSS")]
    pub fcss: bool,
    /// `FCSS  SG` at offset 8
    #[serde(skip)]
    pub fcss_signature: bool,
    /// Number of `RGSC` tags anywhere in the buffer
    #[serde(rename = "RGSC_count")]
    pub rgsc_count: usize,
}

impl HeaderMarkers {
    pub fn detect(data: &[u8]) -> Self {
        Self {
            form: has_bytes_at(data, 0, &FORM_TAG),
            fcss: has_bytes_at(data, 8, &FCSS_TAG),
            fcss_signature: has_bytes_at(data, 8, FCSS_SIGNATURE),
            rgsc_count: find_tag(data, &RGSC_TAG).len(),
        }
    }
}
