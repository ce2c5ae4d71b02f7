//! gzcors - local file server for precompressed assets
//!
//! Serves a directory over HTTP/1.1 with `Access-Control-Allow-Origin: *` on
//! every response. Targets outside `/info` are answered from their stored
//! `.gz` variant with `Content-Encoding: gzip`.

pub mod args;
pub mod compression;
pub mod file_serving;
pub mod http;
pub mod logging;
pub mod server;
pub mod shutdown;

#[doc(hidden)]
pub mod test_support;
