//! The compressed branch: every target outside `/info` names a stored
//! `.gz` file that is sent byte for byte with `Content-Encoding: gzip`.

use super::path_utils::compressed_path;
use super::*;

/// Result of looking up the compressed variant of a target.
#[derive(Debug)]
pub enum CompressedLookup {
    Found(FileContents),
    /// Missing, unreadable or not a regular file.
    NotFound { path: PathBuf, error: io::Error },
}

pub fn load_compressed(base_dir: &Path, target: &str) -> CompressedLookup {
    let path = compressed_path(base_dir, target);
    log::debug!("Looking up compressed file {}", path.display());

    match read_file(&path) {
        Ok(file) => CompressedLookup::Found(file),
        Err(error) => CompressedLookup::NotFound { path, error },
    }
}

pub fn serve_compressed(base_dir: &Path, target: &str) -> Response {
    match load_compressed(base_dir, target) {
        CompressedLookup::Found(file) => {
            log::debug!(
                "Serving {} ({} bytes)",
                file.path.display(),
                file.content.len()
            );
            Response::new(StatusCode::Ok)
                .header("Content-Type", "application/octet-stream")
                .header("Content-Encoding", PRECOMPRESSED.content_encoding())
                .header("Content-Length", file.content.len().to_string())
                .header("Last-Modified", httpdate::fmt_http_date(file.modified))
                .body(file.content)
        }
        CompressedLookup::NotFound { path, error } => {
            log_error!(
                error,
                format!("Failed to open compressed file {}", path.display())
            );
            Response::error(StatusCode::NotFound, Some(NOT_FOUND_MESSAGE))
        }
    }
}
