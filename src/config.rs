use serde::{Deserialize, Serialize};
use std::{
    fs::{read_to_string, write},
    path::{Path, PathBuf},
};

use crate::{error::DtsError, paths::normalize};

/// One entry of the URL prefix table: references starting with `prefix` map
/// into `dir`. Relative `dir` values are joined with the base directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlMapping {
    pub prefix: String,
    pub dir: PathBuf,
}

impl UrlMapping {
    pub fn new(prefix: &str, dir: &str) -> Self {
        UrlMapping {
            prefix: prefix.to_string(),
            dir: PathBuf::from(dir),
        }
    }
}

/// Loader settings: where the taxonomy mirror lives, which schema to start
/// from, and how remote URLs map onto the mirror.
///
/// Serializable as TOML:
///
/// ```toml
/// base_dir = "/data/us-gaap-2024"
/// entry_point = "entire/us-gaap-entryPoint-all-2024.xsd"
///
/// [[url_mappings]]
/// prefix = "http://www.xbrl.org/"
/// dir = "xbrl"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoaderConfig {
    pub base_dir: PathBuf,
    /// Entry-point schema; relative values are joined with `base_dir`.
    pub entry_point: PathBuf,
    #[serde(default = "default_url_mappings")]
    pub url_mappings: Vec<UrlMapping>,
}

/// Prefix table covering the hosts a US-GAAP style mirror is laid out for,
/// under both protocols.
fn default_url_mappings() -> Vec<UrlMapping> {
    vec![
        UrlMapping::new("http://www.xbrl.org/", "xbrl"),
        UrlMapping::new("https://www.xbrl.org/", "xbrl"),
        UrlMapping::new("http://taxonomies.xbrl.us/", "us"),
        UrlMapping::new("https://taxonomies.xbrl.us/", "us"),
        UrlMapping::new("https://xbrl.fasb.org/", "fasb"),
        UrlMapping::new("http://xbrl.fasb.org/", "fasb"),
        UrlMapping::new("https://xbrl.sec.gov/", "sec"),
        UrlMapping::new("http://xbrl.sec.gov/", "sec"),
    ]
}

impl LoaderConfig {
    pub fn new<B: AsRef<Path>, E: AsRef<Path>>(base_dir: B, entry_point: E) -> Self {
        LoaderConfig {
            base_dir: base_dir.as_ref().to_path_buf(),
            entry_point: entry_point.as_ref().to_path_buf(),
            url_mappings: default_url_mappings(),
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, DtsError> {
        tracing::debug!("Reading loader config from: {:?}", path.as_ref());
        let content = read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<(), DtsError> {
        let toml_string = toml::to_string(self)?;
        write(path, toml_string)?;
        Ok(())
    }

    /// The entry point as an absolute, normalized path.
    pub fn entry_point_absolute(&self) -> PathBuf {
        if self.entry_point.is_absolute() {
            normalize(&self.entry_point)
        } else {
            normalize(self.base_dir.join(&self.entry_point))
        }
    }

    /// The prefix table with relative directories anchored at `base_dir`,
    /// ready for [`PathResolver::new`](crate::paths::PathResolver::new).
    pub fn resolver_mappings(&self) -> Vec<(String, PathBuf)> {
        self.url_mappings
            .iter()
            .map(|m| {
                let dir = if m.dir.is_absolute() {
                    m.dir.clone()
                } else {
                    self.base_dir.join(&m.dir)
                };
                (m.prefix.clone(), normalize(dir))
            })
            .collect()
    }

    /// Reject configurations that cannot possibly load anything.
    pub fn validate(&self) -> Result<(), DtsError> {
        if !self.base_dir.is_dir() {
            return Err(DtsError::Config(format!(
                "base_dir is not a directory: {}",
                self.base_dir.display()
            )));
        }
        let entry = self.entry_point_absolute();
        if !entry.is_file() {
            return Err(DtsError::Config(format!(
                "entry point schema not found: {}",
                entry.display()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_mappings_cover_known_hosts() {
        let config = LoaderConfig::new("/mirror", "entry.xsd");
        let prefixes: Vec<_> = config
            .url_mappings
            .iter()
            .map(|m| m.prefix.as_str())
            .collect();
        assert!(prefixes.contains(&"http://www.xbrl.org/"));
        assert!(prefixes.contains(&"https://xbrl.fasb.org/"));
        assert!(prefixes.contains(&"http://xbrl.sec.gov/"));
        assert_eq!(prefixes.len(), 8);
    }

    #[test]
    fn test_resolver_mappings_anchor_relative_dirs() {
        let config = LoaderConfig::new("/mirror", "entry.xsd");
        let mappings = config.resolver_mappings();
        let fasb = mappings
            .iter()
            .find(|(p, _)| p == "https://xbrl.fasb.org/")
            .unwrap();
        assert_eq!(fasb.1, PathBuf::from("/mirror/fasb"));
    }

    #[test]
    fn test_entry_point_joined_with_base() {
        let config = LoaderConfig::new("/mirror", "entire/entry.xsd");
        assert_eq!(
            config.entry_point_absolute(),
            PathBuf::from("/mirror/entire/entry.xsd")
        );
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = LoaderConfig::new("/mirror", "entry.xsd");
        let text = toml::to_string(&config).unwrap();
        let parsed: LoaderConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_missing_mappings_use_defaults() {
        let parsed: LoaderConfig =
            toml::from_str("base_dir = \"/mirror\"\nentry_point = \"entry.xsd\"\n").unwrap();
        assert_eq!(parsed.url_mappings.len(), 8);
    }
}
