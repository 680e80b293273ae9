//! Opening GraphML input files.

use crate::error::{GraphmlError, Result};
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

/// Default buffer size for reading input files (1MB)
pub const DEFAULT_BUFFER_SIZE: usize = 1024 * 1024;

/// File suffixes that are transparently gzip-decompressed.
pub const COMPRESSED_SUFFIXES: [&str; 2] = [".gz", ".gzip"];

/// Whether the path names a gzip-compressed file.
pub fn is_compressed(path: &Path) -> bool {
    let name = path.to_string_lossy().to_ascii_lowercase();
    COMPRESSED_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
}

/// Open a GraphML file as a buffered reader, decompressing `.gz` input.
pub fn open_input(path: &Path) -> Result<Box<dyn BufRead + Send>> {
    if !path.exists() {
        return Err(GraphmlError::InputNotFound(path.to_path_buf()));
    }
    let file = File::open(path).map_err(|e| GraphmlError::Io {
        source_name: path.display().to_string(),
        error: Arc::new(e),
    })?;
    if is_compressed(path) {
        let decoder = MultiGzDecoder::new(BufReader::with_capacity(DEFAULT_BUFFER_SIZE, file));
        Ok(Box::new(BufReader::with_capacity(DEFAULT_BUFFER_SIZE, decoder)))
    } else {
        Ok(Box::new(BufReader::with_capacity(DEFAULT_BUFFER_SIZE, file)))
    }
}
