//! Generic static file serving used for `/info` targets and HEAD requests:
//! content types are guessed, directories redirect, fall back to an index
//! file or get listed, and `If-Modified-Since` is honoured.

use std::time::{Duration, UNIX_EPOCH};

use super::path_utils::{split_target, translate_path};
use super::*;
use crate::http::response::escape_html;

const INDEX_FILES: [&str; 2] = ["index.html", "index.htm"];

/// Characters left unescaped in listing links.
const LINK_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

pub fn serve_static(base_dir: &Path, request: &Request) -> Response {
    let mut path = translate_path(base_dir, &request.target);
    let (url_path, rest) = split_target(&request.target);

    if path.is_dir() {
        if !url_path.ends_with('/') {
            let location = format!("{}/{}", url_path, rest);
            log::debug!("Redirecting directory request to {}", location);
            return Response::new(StatusCode::MovedPermanently)
                .header("Location", location)
                .header("Content-Length", "0");
        }

        match INDEX_FILES
            .iter()
            .map(|name| path.join(name))
            .find(|candidate| candidate.is_file())
        {
            Some(index) => path = index,
            None => return list_directory(&path, &request.target),
        }
    } else if url_path.ends_with('/') {
        return Response::error(StatusCode::NotFound, Some(NOT_FOUND_MESSAGE));
    }

    let file = match read_file(&path) {
        Ok(file) => file,
        Err(e) => {
            log::debug!("Cannot serve {}: {}", path.display(), e);
            return Response::error(StatusCode::NotFound, Some(NOT_FOUND_MESSAGE));
        }
    };

    if request.header("If-None-Match").is_none() {
        if let Some(since) = request
            .header("If-Modified-Since")
            .and_then(|v| httpdate::parse_http_date(v).ok())
        {
            if truncate_to_seconds(file.modified) <= since {
                return Response::new(StatusCode::NotModified);
            }
        }
    }

    let mime_type = from_path(&path).first_or_octet_stream().to_string();
    Response::new(StatusCode::Ok)
        .header("Content-Type", mime_type)
        .header("Content-Length", file.content.len().to_string())
        .header("Last-Modified", httpdate::fmt_http_date(file.modified))
        .body(file.content)
}

/// HTTP dates carry whole seconds only.
fn truncate_to_seconds(time: SystemTime) -> SystemTime {
    match time.duration_since(UNIX_EPOCH) {
        Ok(elapsed) => UNIX_EPOCH + Duration::from_secs(elapsed.as_secs()),
        Err(_) => time,
    }
}

fn list_directory(dir: &Path, target: &str) -> Response {
    let entries = match dir.log_operation("list_directory", || fs::read_dir(dir)) {
        Ok(entries) => entries,
        Err(_) => {
            return Response::error(
                StatusCode::NotFound,
                Some("No permission to list directory"),
            )
        }
    };

    let mut names: Vec<(String, bool, bool)> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| {
            let full = entry.path();
            let is_link = fs::symlink_metadata(&full)
                .map(|m| m.file_type().is_symlink())
                .unwrap_or(false);
            (
                entry.file_name().to_string_lossy().into_owned(),
                full.is_dir(),
                is_link,
            )
        })
        .collect();
    names.sort_by_key(|(name, _, _)| name.to_lowercase());

    let display_path = escape_html(&percent_decode_str(target).decode_utf8_lossy());
    let title = format!("Directory listing for {}", display_path);

    let mut lines = vec![
        "<!DOCTYPE HTML>".to_string(),
        "<html lang=\"en\">".to_string(),
        "<head>".to_string(),
        "<meta charset=\"utf-8\">".to_string(),
        format!("<title>{}</title>\n</head>", title),
        format!("<body>\n<h1>{}</h1>", title),
        "<hr>\n<ul>".to_string(),
    ];
    for (name, is_dir, is_link) in &names {
        let mut display_name = name.clone();
        let mut link_name = name.clone();
        if *is_dir {
            display_name.push('/');
            link_name.push('/');
        }
        if *is_link {
            display_name.push('@');
        }
        lines.push(format!(
            "<li><a href=\"{}\">{}</a></li>",
            utf8_percent_encode(&link_name, LINK_ENCODE_SET),
            escape_html(&display_name)
        ));
    }
    lines.push("</ul>\n<hr>\n</body>\n</html>\n".to_string());

    let body = lines.join("\n").into_bytes();
    Response::new(StatusCode::Ok)
        .header("Content-Type", "text/html; charset=utf-8")
        .header("Content-Length", body.len().to_string())
        .body(body)
}
