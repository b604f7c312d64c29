//! Project-relative path arithmetic.
//!
//! File identities are `/`-separated paths relative to the project root,
//! without a leading slash. The root itself is the empty string.

/// Directory part of a handle; `""` for files at the root.
pub fn dirname(handle: &str) -> &str {
    handle.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
}

/// Last segment of a handle.
pub fn basename(handle: &str) -> &str {
    handle.rsplit_once('/').map(|(_, name)| name).unwrap_or(handle)
}

/// Extension of the last segment, without the dot.
pub fn extension(handle: &str) -> Option<&str> {
    match basename(handle).rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => Some(ext),
        _ => None,
    }
}

/// Handle with the extension of its last segment removed.
pub fn strip_extension(handle: &str) -> &str {
    match extension(handle) {
        Some(ext) => &handle[..handle.len() - ext.len() - 1],
        None => handle,
    }
}

/// Join a relative path onto a directory, without normalizing.
pub fn join(dir: &str, relative: &str) -> String {
    if dir.is_empty() {
        relative.to_string()
    } else if relative.is_empty() {
        dir.to_string()
    } else {
        format!("{}/{}", dir.trim_end_matches('/'), relative)
    }
}

/// Resolve `.` and `..` segments and drop empty ones.
///
/// Returns `None` when the path climbs above the project root.
///
/// # Examples
///
/// ```
/// # use jsdepend::store::paths::normalize;
/// assert_eq!(normalize("a/./b/../c.js"), Some("a/c.js".to_string()));
/// assert_eq!(normalize("/lib//x.js"), Some("lib/x.js".to_string()));
/// assert_eq!(normalize("../outside.js"), None);
/// ```
pub fn normalize(path: &str) -> Option<String> {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            other => segments.push(other),
        }
    }
    Some(segments.join("/"))
}

/// `dir` and each of its ancestors, nearest first, ending with the root.
pub fn ancestors(dir: &str) -> Vec<&str> {
    let mut result = Vec::new();
    let mut current = dir;
    loop {
        result.push(current);
        if current.is_empty() {
            break;
        }
        current = dirname(current);
    }
    result
}

/// Whether `handle` lies inside directory `dir` (at any depth).
pub fn is_within(handle: &str, dir: &str) -> bool {
    dir.is_empty()
        || handle
            .strip_prefix(dir)
            .map_or(false, |rest| rest.starts_with('/'))
}
