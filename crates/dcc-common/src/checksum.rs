//! md5 checksums for file verification
//!
//! The Portal identifies file records by the md5 digest of their content, so
//! that is the only algorithm offered here.

use crate::error::{DccError, Result};
use std::io::Read;
use std::path::Path;

/// Compute the md5 checksum of any readable source
pub fn compute_md5_reader<R: Read>(reader: &mut R) -> std::io::Result<String> {
    let mut context = md5::Context::new();
    let mut buffer = [0u8; 64 * 1024];

    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        context.consume(&buffer[..bytes_read]);
    }

    Ok(format!("{:x}", context.compute()))
}

/// Compute the md5 checksum of a file, streaming its content
pub fn compute_file_md5(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let checksum_error = |source| DccError::Checksum {
        path: path.display().to_string(),
        source,
    };

    let mut file = std::fs::File::open(path).map_err(checksum_error)?;
    compute_md5_reader(&mut file).map_err(checksum_error)
}
