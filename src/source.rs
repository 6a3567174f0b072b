//! Input selection: a named file or standard input.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use log::debug;

use crate::error::ShortenError;

/// Open the input stream.
///
/// `None` or a path of `-` reads standard input.
pub fn open_input(path: Option<&Path>) -> Result<Box<dyn Read>, ShortenError> {
    match path {
        Some(p) if p != Path::new("-") => {
            debug!("reading {}", p.display());
            let file = File::open(p).map_err(|source| ShortenError::Open {
                path: p.to_path_buf(),
                source,
            })?;
            Ok(Box::new(BufReader::new(file)))
        }
        _ => {
            debug!("reading standard input");
            Ok(Box::new(io::stdin().lock()))
        }
    }
}
