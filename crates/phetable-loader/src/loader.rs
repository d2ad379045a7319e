//! Input file opening utilities.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use flate2::read::MultiGzDecoder;

use crate::types::{PheError, PheResult};

/// Returns true if the path names a gzip file (`.gz` extension).
pub fn is_gzip_path<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref()
        .extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("gz"))
}

/// Opens a table for reading, decompressing gzip files transparently.
pub fn open_input<P: AsRef<Path>>(path: P) -> PheResult<Box<dyn Read>> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(PheError::FileNotFound {
            path: path.display().to_string(),
        });
    }

    let reader = BufReader::new(File::open(path)?);
    if is_gzip_path(path) {
        Ok(Box::new(MultiGzDecoder::new(reader)))
    } else {
        Ok(Box::new(reader))
    }
}
