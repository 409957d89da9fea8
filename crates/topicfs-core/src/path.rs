//! Path and topic naming rules.
//!
//! The remote service offers only a flat list of topics per channel, so the
//! tree is emulated by storing the full canonical path as the topic title
//! and recomputing ancestry with string operations on every query. The
//! canonical form of a path has a leading `/`, no `.`/`..` components, no
//! repeated separators and no trailing `/` (except the root itself).

use std::fmt;

/// Fixed virtual root every mount lives under.
pub const ROOT_PREFIX: &str = "/root";

/// Lexically clean a path into its canonical form.
///
/// The empty path maps to `/`. Cleaning is idempotent:
/// `clean(clean(p)) == clean(p)` for all inputs.
pub fn clean(input: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for component in input.split('/') {
        match component {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            component => parts.push(component),
        }
    }

    if parts.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", parts.join("/"))
    }
}

/// Parent of a canonical path, computed on demand from the string.
///
/// `parent("/root/a/b") == "/root/a"`, `parent("/root") == "/"`,
/// `parent("/") == "/"`. Topic titles never store a parent pointer.
pub fn parent(path: &str) -> String {
    match path.rfind('/') {
        Some(0) => "/".to_string(),
        Some(pos) => path[..pos].to_string(),
        None => "/".to_string(),
    }
}

/// Final component of a canonical path; the root maps to itself.
pub fn base(path: &str) -> &str {
    path.rsplit('/')
        .next()
        .filter(|component| !component.is_empty())
        .unwrap_or("/")
}

/// Append a trailing separator if one is missing.
pub fn trail(path: &str) -> String {
    if path.ends_with('/') {
        path.to_string()
    } else {
        format!("{path}/")
    }
}

/// Join and clean two path fragments.
pub fn join(base: &str, relative: &str) -> String {
    clean(&format!("{base}/{relative}"))
}

/// Absolute mount root for a configured root fragment.
pub fn root_path(configured: &str) -> String {
    join(ROOT_PREFIX, &clean(configured))
}

/// The canonical (absolute, relative, query) naming triple for one entry.
///
/// `query` is the exact string matched against topic titles and message
/// bodies; it is also the name the upload collaborator must give a new
/// message so later searches find it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub absolute: String,
    pub relative: String,
    pub query: String,
}

/// Resolve a relative path against a mount root.
pub fn locate(root: &str, relative: &str) -> Location {
    let absolute = join(root, relative);
    Location {
        query: absolute.clone(),
        absolute,
        relative: relative.to_string(),
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.query)
    }
}
