//! Exploratory structure analysis
//!
//! A looser companion to the decoder report: it lists marker spacing, the
//! longer readable strings and the OSC paths so that recurring record
//! layouts can be spotted by eye.

use crate::config::ProbeConfig;
use crate::error::ProbeResult;
use crate::hexdump::{escape_bytes, hex_prefix};
use crate::input::read_input;
use crate::markers::{scan_tag, HeaderMarkers, MarkerScan, RGSC_TAG};
use crate::strings::{extract_osc_paths, extract_strings, StringMatch};
use std::fmt;
use std::path::Path;

const HEADER_LEN: usize = 16;
const MARKER_SAMPLE: usize = 5;
const STRING_SAMPLE: usize = 30;
const PATH_SAMPLE: usize = 20;

/// Analysis of a single buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    pub size: usize,
    pub header: Vec<u8>,
    pub markers: HeaderMarkers,
    pub rgsc: MarkerScan,
    /// Strings of at least the strict length, ascending by offset
    pub strings: Vec<StringMatch>,
    pub paths: Vec<StringMatch>,
}

/// Analyze an in-memory buffer
pub fn analyze_bytes(data: &[u8], config: &ProbeConfig) -> Analysis {
    Analysis {
        size: data.len(),
        header: data.iter().take(HEADER_LEN).copied().collect(),
        markers: HeaderMarkers::detect(data),
        rgsc: scan_tag(data, &RGSC_TAG),
        strings: extract_strings(data, config.strict_string_length),
        paths: extract_osc_paths(data),
    }
}

/// Read and analyze a file
pub fn analyze_file(path: &Path, config: &ProbeConfig) -> ProbeResult<Analysis> {
    let data = read_input(path)?;
    Ok(analyze_bytes(&data, config))
}

fn sample(values: &[usize]) -> String {
    let shown: Vec<String> = values
        .iter()
        .take(MARKER_SAMPLE)
        .map(|v| v.to_string())
        .collect();
    format!("[{}]", shown.join(", "))
}

impl fmt::Display for Analysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "File size: {} bytes", self.size)?;
        writeln!(f, "Header: {}", hex_prefix(&self.header, HEADER_LEN))?;
        writeln!(f, "ASCII: b'{}'", escape_bytes(&self.header))?;

        if self.markers.form {
            writeln!(f, "Identified header: 'MROF' (FORM in little-endian)")?;
        }
        if self.markers.fcss_signature {
            writeln!(f, "Identified marker: 'FCSS  SG' at offset 8")?;
        }

        writeln!(f, "Found {} instances of 'RGSC' marker", self.rgsc.count())?;
        if !self.rgsc.offsets.is_empty() {
            writeln!(f, "First few positions: {}", sample(&self.rgsc.offsets))?;
            if !self.rgsc.deltas.is_empty() {
                writeln!(
                    f,
                    "Distances between markers: {} ...",
                    sample(&self.rgsc.deltas)
                )?;
            }
        }

        writeln!(f)?;
        writeln!(f, "Found {} potential string values", self.strings.len())?;
        writeln!(f)?;
        writeln!(f, "Sample strings:")?;
        for s in self.strings.iter().take(STRING_SAMPLE) {
            writeln!(f, "  Offset {}: {}", s.offset, s.text)?;
        }

        writeln!(f)?;
        writeln!(f, "Found {} potential OSC control paths", self.paths.len())?;
        writeln!(f)?;
        writeln!(f, "Sample OSC paths:")?;
        for p in self.paths.iter().take(PATH_SAMPLE) {
            writeln!(f, "  Offset {}: {}", p.offset, p.text)?;
        }

        Ok(())
    }
}
