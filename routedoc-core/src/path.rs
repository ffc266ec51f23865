//! Path template handling
//!
//! Backends accept different template syntaxes (`/users/:id`, `/users/{id}`);
//! the document always uses the brace form.

/// Translate colon-style parameters (`/users/:id`) into brace style
/// (`/users/{id}`). Segments without a leading colon are kept as-is, so the
/// translation is idempotent and preserves trailing slashes.
pub fn transform_path_params_with_colon(path: &str) -> String {
    path.split('/')
        .map(|segment| match segment.strip_prefix(':') {
            Some(name) => format!("{{{name}}}"),
            None => segment.to_string(),
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Join a prefix and a route path the way POSIX paths join: empty elements
/// are skipped and the result is cleaned.
pub fn join_paths(prefix: &str, path: &str) -> String {
    let joined = [prefix, path]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("/");
    if joined.is_empty() {
        return joined;
    }
    clean(&joined)
}

/// Lexically clean a slash-separated path: collapse repeated separators,
/// drop `.` segments, resolve `..` against the previous segment and remove
/// the trailing slash.
pub fn clean(path: &str) -> String {
    if path.is_empty() {
        return ".".to_string();
    }
    let rooted = path.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.last().is_some_and(|last| *last != "..") {
                    segments.pop();
                } else if !rooted {
                    segments.push("..");
                }
            }
            other => segments.push(other),
        }
    }
    let body = segments.join("/");
    match (rooted, body.is_empty()) {
        (true, _) => format!("/{body}"),
        (false, true) => ".".to_string(),
        (false, false) => body,
    }
}

/// Names of the `{name}` placeholders in a brace-style template, sorted and
/// without duplicates.
pub fn path_placeholders(path: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    let mut rest = path;
    while let Some(start) = rest.find('{') {
        let after = &rest[start + 1..];
        let Some(end) = after.find('}') else {
            break;
        };
        let name = &after[..end];
        if !name.is_empty() {
            names.push(name.to_string());
        }
        rest = &after[end + 1..];
    }
    names.sort();
    names.dedup();
    names
}
