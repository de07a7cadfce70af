//! Hex dump formatting

use crate::strings::is_printable;

/// Bytes per dump line
pub const BYTES_PER_LINE: usize = 16;

/// Render `data` as hex/ASCII lines labelled from `base_offset`
///
/// ```text
/// 00000010  4d 52 4f 46 00 00 01 20 46 43 53 53 20 20 53 47  |MROF... FCSS  SG|
/// ```
pub fn hexdump(data: &[u8], base_offset: usize) -> String {
    let mut out = String::new();

    for (i, chunk) in data.chunks(BYTES_PER_LINE).enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let hex = chunk
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect::<Vec<_>>()
            .join(" ");
        let ascii: String = chunk
            .iter()
            .map(|&b| if is_printable(b) { b as char } else { '.' })
            .collect();
        out.push_str(&format!(
            "{:08x}  {:<47}  |{}|",
            base_offset + i * BYTES_PER_LINE,
            hex,
            ascii
        ));
    }

    out
}

/// Hex of the first `len` bytes without separators
pub fn hex_prefix(data: &[u8], len: usize) -> String {
    data.iter().take(len).map(|b| format!("{:02x}", b)).collect()
}

/// Escape bytes the way a byte-string literal would show them
pub fn escape_bytes(data: &[u8]) -> String {
    data.iter()
        .flat_map(|&b| std::ascii::escape_default(b))
        .map(char::from)
        .collect()
}
