//! Input file loading

use crate::error::{ProbeError, ProbeResult};
use std::fs;
use std::path::Path;

/// Check that `path` names an existing regular file
pub fn require_file(path: &Path) -> ProbeResult<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(ProbeError::MissingFile(path.to_path_buf()))
    }
}

/// Read a whole file into memory after checking that it exists
pub fn read_input(path: &Path) -> ProbeResult<Vec<u8>> {
    require_file(path)?;
    let data = fs::read(path).map_err(|e| ProbeError::io(path, e))?;
    log::debug!("read {} bytes from {}", data.len(), path.display());
    Ok(data)
}
