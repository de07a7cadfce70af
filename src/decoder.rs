//! Controller assignment file decoder report
//!
//! Builds a structural overview of a `.cs` file: header signatures, which
//! controller devices are named in it, and the OSC control paths that most
//! likely correspond to individual assignments. The report is heuristic and
//! can be rendered as text or serialized to JSON.

use crate::config::ProbeConfig;
use crate::error::ProbeResult;
use crate::hexdump::hex_prefix;
use crate::input::read_input;
use crate::markers::HeaderMarkers;
use crate::strings::{extract_osc_paths, extract_strings, StringMatch};
use serde::Serialize;
use std::path::Path;

/// Basic information about the decoded file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileInfo {
    pub filepath: String,
    pub filesize: usize,
    /// Hex of the first 16 bytes
    pub header: String,
}

/// A string naming a known controller device
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControllerMatch {
    pub offset: usize,
    pub name: String,
    /// The configured device pattern that matched
    #[serde(rename = "type")]
    pub device_type: String,
}

/// An OSC path with strings found close to it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mapping {
    pub offset: usize,
    pub path: String,
    pub nearby_context: Vec<String>,
}

/// Complete decoder output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodeReport {
    pub file_info: FileInfo,
    pub markers: HeaderMarkers,
    pub controllers: Vec<ControllerMatch>,
    pub mappings: Vec<Mapping>,
}

/// Strings containing one of `patterns`; the first matching pattern wins
pub fn find_controllers(strings: &[StringMatch], patterns: &[String]) -> Vec<ControllerMatch> {
    strings
        .iter()
        .filter_map(|s| {
            patterns
                .iter()
                .find(|pattern| s.text.contains(pattern.as_str()))
                .map(|pattern| ControllerMatch {
                    offset: s.offset,
                    name: s.text.clone(),
                    device_type: pattern.clone(),
                })
        })
        .collect()
}

/// Strings starting strictly within `radius` bytes of `offset` that are
/// not already part of `path`
pub fn nearby_strings(
    strings: &[StringMatch],
    offset: usize,
    path: &str,
    radius: usize,
    limit: usize,
) -> Vec<String> {
    strings
        .iter()
        .filter(|s| s.offset.abs_diff(offset) < radius && !path.contains(s.text.as_str()))
        .take(limit)
        .map(|s| s.text.clone())
        .collect()
}

/// Build a decode report from an in-memory buffer
pub fn decode_bytes(filepath: &str, data: &[u8], config: &ProbeConfig) -> DecodeReport {
    let strings = extract_strings(data, config.min_string_length);
    let paths = extract_osc_paths(data);
    log::debug!(
        "{}: {} strings, {} OSC paths",
        filepath,
        strings.len(),
        paths.len()
    );

    let controllers = find_controllers(&strings, &config.device_patterns);

    let mappings = paths
        .iter()
        .take(config.mapping_limit)
        .map(|p| Mapping {
            offset: p.offset,
            path: p.text.clone(),
            nearby_context: nearby_strings(
                &strings,
                p.offset,
                &p.text,
                config.context_radius,
                config.nearby_limit,
            ),
        })
        .collect();

    DecodeReport {
        file_info: FileInfo {
            filepath: filepath.to_string(),
            filesize: data.len(),
            header: hex_prefix(data, 16),
        },
        markers: HeaderMarkers::detect(data),
        controllers,
        mappings,
    }
}

/// Read and decode a file
pub fn decode_file(path: &Path, config: &ProbeConfig) -> ProbeResult<DecodeReport> {
    let data = read_input(path)?;
    Ok(decode_bytes(&path.display().to_string(), &data, config))
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

impl DecodeReport {
    /// Pretty-printed JSON
    pub fn to_json(&self) -> ProbeResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Human-readable report showing at most `mapping_limit` mappings
    pub fn to_text(&self, mapping_limit: usize) -> String {
        let mut out = String::new();
        out.push_str(&format!("File: {}\n", self.file_info.filepath));
        out.push_str(&format!("Size: {} bytes\n", self.file_info.filesize));
        out.push_str(&format!("Header: {}\n\n", self.file_info.header));

        out.push_str("File Structure:\n");
        out.push_str(&format!(
            "  FORM marker (little-endian): {}\n",
            yes_no(self.markers.form)
        ));
        out.push_str(&format!("  FCSS marker: {}\n", yes_no(self.markers.fcss)));
        out.push_str(&format!(
            "  RGSC block count: {}\n\n",
            self.markers.rgsc_count
        ));

        out.push_str("Detected Controllers:\n");
        for ctrl in &self.controllers {
            out.push_str(&format!("  {} (at offset 0x{:x})\n", ctrl.name, ctrl.offset));
        }
        out.push('\n');

        out.push_str("Sample OSC Control Paths:");
        for (i, mapping) in self.mappings.iter().take(mapping_limit).enumerate() {
            out.push_str(&format!(
                "\n  {}. {} (at offset 0x{:x})",
                i + 1,
                mapping.path,
                mapping.offset
            ));
            if !mapping.nearby_context.is_empty() {
                out.push_str(&format!(
                    "\n     Context: {}",
                    mapping.nearby_context.join(", ")
                ));
            }
        }

        out
    }
}
