//! Structural binary diff
//!
//! Compares an original buffer against a modified one byte by byte over
//! their common prefix, groups differing offsets into contiguous blocks and
//! annotates each block with printable strings found near it in the
//! original buffer.
//!
//! Bytes past the end of the shorter buffer are never reported as
//! differences; only the size delta is shown for them.

use crate::config::ProbeConfig;
use crate::error::ProbeResult;
use crate::hexdump::hexdump;
use crate::input::read_input;
use crate::strings::{printable_runs, StringMatch};
use std::fmt;
use std::path::Path;

/// A maximal run of consecutive differing offsets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DifferenceBlock {
    /// First differing offset
    pub start: usize,
    /// Last differing offset (inclusive)
    pub end: usize,
    /// Number of differing bytes, `end - start + 1`
    pub length: usize,
}

impl DifferenceBlock {
    fn single(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
            length: 1,
        }
    }

    fn extend_to(&mut self, offset: usize) {
        self.end = offset;
        self.length = self.end - self.start + 1;
    }

    pub fn contains(&self, offset: usize) -> bool {
        (self.start..=self.end).contains(&offset)
    }
}

/// Parameters for annotating and rendering difference blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffOptions {
    /// Bytes of padding shown on each side of a block in the hex dump
    pub context_bytes: usize,
    /// Distance from a block searched for context strings
    pub context_radius: usize,
    /// Context strings kept per block
    pub max_context_strings: usize,
    /// Shortest accepted context string
    pub min_context_length: usize,
    /// Context strings are truncated to this length
    pub max_context_length: usize,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self::from_config(&ProbeConfig::default(), None)
    }
}

impl DiffOptions {
    /// Build options from configuration, with an optional padding override
    pub fn from_config(config: &ProbeConfig, context_bytes: Option<usize>) -> Self {
        Self {
            context_bytes: context_bytes.unwrap_or(config.default_context_bytes),
            context_radius: config.context_radius,
            max_context_strings: config.max_context_strings,
            min_context_length: config.min_context_length,
            max_context_length: config.max_context_length,
        }
    }
}

/// One block with its annotation and dumps of both buffers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockReport {
    pub block: DifferenceBlock,
    /// Printable strings near the block in the original buffer
    pub context: Vec<StringMatch>,
    /// Hex dump of the original bytes around the block
    pub old_dump: String,
    /// Hex dump of the modified bytes around the block
    pub new_dump: String,
}

/// Result of comparing two buffers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffReport {
    pub original_len: usize,
    pub modified_len: usize,
    /// Every differing offset in the common prefix, ascending
    pub differences: Vec<usize>,
    pub blocks: Vec<BlockReport>,
}

impl DiffReport {
    /// `modified_len - original_len`, signed
    pub fn size_delta(&self) -> i64 {
        self.modified_len as i64 - self.original_len as i64
    }

    /// True when the common prefix holds no differences
    pub fn is_identical(&self) -> bool {
        self.differences.is_empty()
    }
}

/// Offsets where `original` and `modified` disagree over their common prefix
pub fn difference_set(original: &[u8], modified: &[u8]) -> Vec<usize> {
    original
        .iter()
        .zip(modified)
        .enumerate()
        .filter(|(_, (a, b))| a != b)
        .map(|(offset, _)| offset)
        .collect()
}

/// Group ascending offsets into maximal contiguous blocks
pub fn group_blocks(offsets: &[usize]) -> Vec<DifferenceBlock> {
    let mut blocks: Vec<DifferenceBlock> = Vec::new();

    for &offset in offsets {
        match blocks.last_mut() {
            Some(current) if offset == current.end + 1 => current.extend_to(offset),
            _ => blocks.push(DifferenceBlock::single(offset)),
        }
    }

    blocks
}

/// Printable strings in `original` within `context_radius` of `block`
pub fn context_strings(
    original: &[u8],
    block: &DifferenceBlock,
    options: &DiffOptions,
) -> Vec<StringMatch> {
    let window_start = block.start.saturating_sub(options.context_radius);
    let window_end = block
        .end
        .saturating_add(options.context_radius)
        .saturating_add(1)
        .min(original.len());

    printable_runs(
        original,
        window_start,
        window_end,
        options.min_context_length,
        options.max_context_length,
        options.max_context_strings,
    )
}

/// Hex dump of `data` around `block`, padded and clamped to the buffer
fn padded_dump(data: &[u8], block: &DifferenceBlock, padding: usize) -> String {
    let start = block.start.saturating_sub(padding).min(data.len());
    let end = block
        .end
        .saturating_add(padding)
        .saturating_add(1)
        .min(data.len());
    hexdump(&data[start..end], start)
}

/// Compare two buffers and build the block-by-block report
pub fn structural_diff(original: &[u8], modified: &[u8], options: &DiffOptions) -> DiffReport {
    let differences = difference_set(original, modified);
    let blocks = group_blocks(&differences);
    log::debug!(
        "{} differing bytes in {} blocks",
        differences.len(),
        blocks.len()
    );

    let blocks = blocks
        .into_iter()
        .map(|block| BlockReport {
            context: context_strings(original, &block, options),
            old_dump: padded_dump(original, &block, options.context_bytes),
            new_dump: padded_dump(modified, &block, options.context_bytes),
            block,
        })
        .collect();

    DiffReport {
        original_len: original.len(),
        modified_len: modified.len(),
        differences,
        blocks,
    }
}

/// Compare two files on disk
pub fn compare_files(
    original: &Path,
    modified: &Path,
    options: &DiffOptions,
) -> ProbeResult<DiffReport> {
    let original_data = read_input(original)?;
    let modified_data = read_input(modified)?;
    log::info!(
        "comparing {} ({} bytes) with {} ({} bytes)",
        original.display(),
        original_data.len(),
        modified.display(),
        modified_data.len()
    );
    Ok(structural_diff(&original_data, &modified_data, options))
}

impl fmt::Display for DiffReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "File 1 size: {} bytes", self.original_len)?;
        writeln!(f, "File 2 size: {} bytes", self.modified_len)?;

        if self.original_len != self.modified_len {
            writeln!(f, "Size difference: {} bytes", self.size_delta())?;
        }

        if self.is_identical() {
            return writeln!(f, "Files are identical");
        }

        writeln!(f, "Found {} byte differences", self.differences.len())?;
        writeln!(f, "Differences grouped into {} blocks", self.blocks.len())?;

        for (i, report) in self.blocks.iter().enumerate() {
            let block = &report.block;
            writeln!(f)?;
            writeln!(f, "=== Difference Block {} ===", i + 1)?;
            writeln!(
                f,
                "Offset range: 0x{:x} - 0x{:x} (Length: {} bytes)",
                block.start, block.end, block.length
            )?;

            if !report.context.is_empty() {
                writeln!(f)?;
                writeln!(f, "Nearby strings:")?;
                for s in &report.context {
                    writeln!(f, "  Offset 0x{:x}: {}", s.offset, s.text)?;
                }
            }

            writeln!(f)?;
            writeln!(f, "Old data:")?;
            writeln!(f, "{}", report.old_dump)?;
            writeln!(f)?;
            writeln!(f, "New data:")?;
            writeln!(f, "{}", report.new_dump)?;
        }

        Ok(())
    }
}
