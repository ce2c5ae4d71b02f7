pub mod handlers;
mod path_utils;
pub mod precompressed;
pub mod static_files;

use mime_guess::from_path;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::compression::PRECOMPRESSED;
use crate::http::{Request, Response, StatusCode};
use crate::log_error;
use crate::logging::LoggingExt;

/// Targets starting with this are served as plain files.
pub const INFO_PREFIX: &str = "/info";

/// Message of every 404 produced for a missing file.
pub const NOT_FOUND_MESSAGE: &str = "File not found";

/// A file read fully into memory together with its mtime.
#[derive(Debug)]
pub struct FileContents {
    pub path: PathBuf,
    pub content: Vec<u8>,
    pub modified: SystemTime,
}

/// Reads a regular file fully, in binary. Directories are an error.
fn read_file(path: &Path) -> io::Result<FileContents> {
    let mut file = File::open(path)?;
    let metadata = file.metadata()?;
    if metadata.is_dir() {
        return Err(io::Error::other("Is a directory"));
    }

    let mut content = Vec::with_capacity(metadata.len() as usize);
    file.read_to_end(&mut content)?;

    Ok(FileContents {
        path: path.to_path_buf(),
        content,
        modified: metadata.modified()?,
    })
}
