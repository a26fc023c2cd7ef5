//! Shared test utilities for integration tests.
//!
//! Builds hermetic taxonomy directories under a tempdir and hands back
//! loader configs pointed at them.

use dts_core::config::LoaderConfig;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub struct TaxonomyFixture {
    root: TempDir,
}

impl TaxonomyFixture {
    pub fn new() -> Self {
        TaxonomyFixture {
            root: TempDir::new().expect("create fixture dir"),
        }
    }

    pub fn base(&self) -> &Path {
        self.root.path()
    }

    /// Write a file under the fixture root, creating parent directories.
    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.root.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create fixture parents");
        }
        fs::write(&path, content).expect("write fixture file");
        path
    }

    pub fn config(&self, entry: &str) -> LoaderConfig {
        LoaderConfig::new(self.base(), entry)
    }
}

/// A schema document with the standard namespace prelude.
pub fn schema(target_namespace: &str, body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
    xmlns:xbrli="http://www.xbrl.org/2003/instance"
    xmlns:link="http://www.xbrl.org/2003/linkbase"
    xmlns:xlink="http://www.w3.org/1999/xlink"
    targetNamespace="{target_namespace}">
{body}
</xs:schema>"#
    )
}

/// A linkbase document with the standard namespace prelude.
pub fn linkbase(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<link:linkbase xmlns:link="http://www.xbrl.org/2003/linkbase"
    xmlns:xlink="http://www.w3.org/1999/xlink"
    xmlns:xml="http://www.w3.org/XML/1998/namespace"
    xmlns:ref="http://www.xbrl.org/2006/ref"
    xmlns:xbrldt="http://xbrl.org/2005/xbrldt">
{body}
</link:linkbase>"#
    )
}

/// Reference a linkbase from inside a schema's annotation block.
pub fn linkbase_ref(href: &str) -> String {
    format!(
        r#"<xs:annotation><xs:appinfo>
            <link:linkbaseRef xlink:type="simple" xlink:href="{href}"/>
        </xs:appinfo></xs:annotation>"#
    )
}
