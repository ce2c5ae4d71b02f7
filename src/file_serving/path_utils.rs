use super::*;

/// Splits a request target into its path and the `?query`/`#fragment`
/// remainder.
pub fn split_target(target: &str) -> (&str, &str) {
    match target.find(['?', '#']) {
        Some(idx) => target.split_at(idx),
        None => (target, ""),
    }
}

/// Maps a request target onto the filesystem under `base_dir` for the
/// plain static branch: percent-decodes, resolves `.` and `..` without
/// climbing above the root, and keeps a trailing slash.
pub fn translate_path(base_dir: &Path, target: &str) -> PathBuf {
    let (path, _) = split_target(target);
    let decoded = percent_decode_str(path).decode_utf8_lossy();
    log::trace!("Decoded request path: {}", decoded);

    let mut segments: Vec<&str> = Vec::new();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }

    let mut resolved = base_dir.to_path_buf();
    for segment in &segments {
        resolved.push(segment);
    }
    if path.ends_with('/') && !segments.is_empty() {
        resolved.as_mut_os_string().push("/");
    }
    log::debug!("Translated {} to {}", target, resolved.display());
    resolved
}

/// Path of the stored compressed variant for a request target. The target
/// is used verbatim; only leading slashes are dropped so the join stays
/// under `base_dir`.
pub fn compressed_path(base_dir: &Path, target: &str) -> PathBuf {
    let relative = target.trim_start_matches('/');
    base_dir.join(format!("{}{}", relative, PRECOMPRESSED.suffix()))
}
