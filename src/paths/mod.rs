//! Path handling for taxonomy references.
//!
//! Taxonomy documents reference each other with a mix of relative paths,
//! absolute local paths, and `http(s)` URLs that must be remapped onto a
//! local mirror. This module provides the portable path/string helpers and
//! the [`PathResolver`] that performs the remapping.

pub mod resolver;

pub use resolver::PathResolver;

use std::path::{Component, Path, PathBuf, MAIN_SEPARATOR_STR};

/// Render a path as a `/`-separated string. This is the form stored in
/// `sourceFile` fields and compared against XLink href document parts, so it
/// must come out identical no matter which platform produced the path. A
/// root component becomes a leading `/`.
pub fn os_path_to_string<P: AsRef<Path>>(path: P) -> String {
    let segments: Vec<String> = path
        .as_ref()
        .components()
        .map(|component| match component {
            Component::RootDir => String::new(),
            other => other.as_os_str().to_string_lossy().into_owned(),
        })
        .collect();
    segments.join("/")
}

/// Inverse of [`os_path_to_string`]: swap `/` back to the platform
/// separator so reference strings from documents can be joined onto local
/// paths.
pub fn string_to_os_path(path: &str) -> PathBuf {
    PathBuf::from(path.replace('/', MAIN_SEPARATOR_STR))
}

/// Lexically normalize a path: fold `.` components and resolve `..` against
/// preceding components without touching the filesystem.
pub fn normalize<P: AsRef<Path>>(path: P) -> PathBuf {
    let path = path.as_ref();
    let mut parts: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            // Popping past a root keeps the root; past relative components,
            // the `..` is kept so relative inputs stay correct.
            Component::ParentDir => match parts.last().copied() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => parts.push(Component::ParentDir),
            },
            other => parts.push(other),
        }
    }
    if parts.is_empty() {
        return PathBuf::from(".");
    }
    parts.iter().collect()
}

/// Split an XLink `href` into its document part and optional fragment.
///
/// `"us-gaap.xsd#us-gaap_Assets"` → `("us-gaap.xsd", Some("us-gaap_Assets"))`.
pub fn split_fragment(href: &str) -> (&str, Option<&str>) {
    match href.split_once('#') {
        Some((doc, fragment)) => (doc, Some(fragment)),
        None => (href, None),
    }
}
