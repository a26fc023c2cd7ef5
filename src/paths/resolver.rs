//! Reference-to-filesystem resolution.
//!
//! Every `schemaLocation`, `linkbaseRef/@xlink:href`, and locator `href`
//! appearing in a taxonomy document passes through [`PathResolver::resolve`]
//! before any I/O. Resolution never fails: a reference that cannot be mapped
//! is returned unchanged and the caller's existence check decides what to do
//! with it.

use parking_lot::RwLock;
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};
use url::Url;

use super::{normalize, string_to_os_path};

/// Directory name of the mirrored-download layout checked when no prefix
/// mapping matches: `<base>/resources/{http|https}/<authority>/<path>`.
const REPOSITORY_DIR: &str = "resources";

/// Maps reference strings to local filesystem paths.
///
/// Three rules, in precedence order:
///
/// 1. `http(s)://` references consult the ordered prefix table
///    (longest-prefix wins); with no match, the repository mirror layout
///    under `<base>/resources/` is probed, retrying the alternate protocol
///    directory when the primary spelling does not exist on disk.
/// 2. Absolute local paths are normalized and returned.
/// 3. Anything else is joined with the referencing document's directory.
///
/// Resolutions are memoized on `(reference, base_dir)`; large taxonomies
/// repeat the same hrefs thousands of times across linkbases.
pub struct PathResolver {
    base_dir: PathBuf,
    mappings: Vec<(String, PathBuf)>,
    cache: RwLock<HashMap<(String, PathBuf), PathBuf>>,
}

impl std::fmt::Debug for PathResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathResolver")
            .field("base_dir", &self.base_dir)
            .field("mappings", &self.mappings)
            .field("cached", &self.cache.read().len())
            .finish()
    }
}

impl PathResolver {
    /// Create a resolver over `base_dir` with the given URL prefix table.
    /// The table is reordered longest-prefix-first so that more specific
    /// mappings always win.
    pub fn new<P: AsRef<Path>>(base_dir: P, mut mappings: Vec<(String, PathBuf)>) -> Self {
        mappings.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        PathResolver {
            base_dir: normalize(base_dir.as_ref()),
            mappings,
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Resolve `reference` as it appears in a document living in `base_dir`.
    pub fn resolve(&self, reference: &str, base_dir: &Path) -> PathBuf {
        let key = (reference.to_string(), base_dir.to_path_buf());
        if let Some(hit) = self.cache.read().get(&key) {
            return hit.clone();
        }
        let resolved = self.resolve_uncached(reference, base_dir);
        self.cache.write().insert(key, resolved.clone());
        resolved
    }

    fn resolve_uncached(&self, reference: &str, base_dir: &Path) -> PathBuf {
        if reference.starts_with("http://") || reference.starts_with("https://") {
            return match self.map_url(reference) {
                Some(local) => local,
                // Unmapped remote reference: hand it back verbatim so the
                // caller's existence check produces the warning.
                None => PathBuf::from(reference),
            };
        }
        let reference = string_to_os_path(reference);
        if reference.is_absolute() {
            normalize(reference)
        } else {
            normalize(base_dir.join(reference))
        }
    }

    fn map_url(&self, url: &str) -> Option<PathBuf> {
        for (prefix, local_dir) in &self.mappings {
            if let Some(relative) = url.strip_prefix(prefix.as_str()) {
                return Some(normalize(local_dir.join(string_to_os_path(relative))));
            }
        }

        let parsed = Url::parse(url).ok()?;
        let scheme = match parsed.scheme() {
            s @ ("http" | "https") => s,
            _ => return None,
        };

        let repo_dir = self.base_dir.join(REPOSITORY_DIR);
        if !repo_dir.exists() {
            return None;
        }

        // authority + path, query/fragment stripped
        let tail = url.split_once("://").map(|(_, t)| t)?;
        let tail = tail.split(['?', '#']).next().unwrap_or(tail);
        let relative = string_to_os_path(tail);

        let primary = repo_dir.join(scheme).join(&relative);
        if !primary.exists() {
            let alternate_scheme = if scheme == "https" { "http" } else { "https" };
            let alternate = repo_dir.join(alternate_scheme).join(&relative);
            if alternate.exists() {
                return Some(alternate);
            }
        }
        Some(primary)
    }

    #[cfg(test)]
    fn cached_count(&self) -> usize {
        self.cache.read().len()
    }
}
