use super::precompressed::serve_compressed;
use super::static_files::serve_static;
use super::*;

use crate::args::ServerConfig;
use crate::http::Method;

/// Answers one request. The returned response is finalized, so it already
/// carries the CORS grant.
pub fn handle_request(config: &ServerConfig, request: &Request) -> Response {
    let response = match &request.method {
        Method::Get => handle_get(&config.root, request),
        Method::Head => serve_static(&config.root, request),
        Method::Other(name) => Response::error(
            StatusCode::NotImplemented,
            Some(&format!("Unsupported method ('{}')", name)),
        ),
    };
    response.finalize()
}

fn handle_get(base_dir: &Path, request: &Request) -> Response {
    if request.target.starts_with(INFO_PREFIX) {
        log::debug!("Serving {} uncompressed", request.target);
        serve_static(base_dir, request)
    } else {
        serve_compressed(base_dir, &request.target)
    }
}
