//! The traversal driver.
//!
//! A [`TaxonomyLoader`] owns the document worklists and the accumulating
//! [`TaxonomyStore`]. Two queues: the schema queue is drained depth-first in
//! discovery order, each schema harvested once and its imports and includes
//! enqueued; linkbase references are collected into the second queue and
//! processed only after every schema is in, so locator resolution always
//! sees the complete concept dictionary. Processed-path sets guarantee one
//! parse per canonical document path; extraction is monotonic, so the order
//! within each phase never changes the frozen result.

use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::{
    codec::{
        diagnostic::{LoadDiagnostic, LoadSummary},
        linkbase::{ConceptResolver, LinkbaseExtractor},
        schema,
    },
    config::LoaderConfig,
    error::DtsError,
    model::{Taxonomy, TaxonomyMetadata},
    paths::{normalize, os_path_to_string, PathResolver},
    store::TaxonomyStore,
    xml,
};

pub struct TaxonomyLoader {
    config: LoaderConfig,
    resolver: PathResolver,
    concepts: ConceptResolver,
    store: TaxonomyStore,
    schema_queue: VecDeque<PathBuf>,
    linkbase_queue: VecDeque<PathBuf>,
    processed_schemas: HashSet<PathBuf>,
    processed_linkbases: HashSet<PathBuf>,
    diagnostics: Vec<LoadDiagnostic>,
    summary: LoadSummary,
}

impl TaxonomyLoader {
    pub fn new(config: LoaderConfig) -> Self {
        let resolver = PathResolver::new(&config.base_dir, config.resolver_mappings());
        let entry = config.entry_point_absolute();
        let entry_dir = entry
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| config.base_dir.clone());
        let mut schema_queue = VecDeque::new();
        schema_queue.push_back(entry);
        TaxonomyLoader {
            config,
            resolver,
            concepts: ConceptResolver::new(entry_dir),
            store: TaxonomyStore::new(),
            schema_queue,
            linkbase_queue: VecDeque::new(),
            processed_schemas: HashSet::new(),
            processed_linkbases: HashSet::new(),
            diagnostics: Vec::new(),
            summary: LoadSummary::default(),
        }
    }

    /// Convenience wrapper: validate, traverse, freeze.
    pub fn load(config: LoaderConfig) -> Result<Taxonomy, DtsError> {
        config.validate()?;
        let mut loader = TaxonomyLoader::new(config);
        loader.run();
        Ok(loader.finish())
    }

    /// Drain the worklist. Never fails: unusable documents and unresolvable
    /// references are recorded as diagnostics and skipped.
    pub fn run(&mut self) {
        tracing::info!(
            "Starting to parse taxonomy from: {}",
            self.config.entry_point_absolute().display()
        );
        while let Some(path) = self.schema_queue.pop_front() {
            self.process_schema(path);
        }
        // With the concept dictionary complete, resolve the linkbases.
        while let Some(path) = self.linkbase_queue.pop_front() {
            self.process_linkbase(path);
        }
        tracing::info!(
            "Traversal complete: {} ({} concepts)",
            self.summary,
            self.store.concept_count()
        );
    }

    pub fn summary(&self) -> &LoadSummary {
        &self.summary
    }

    pub fn diagnostics(&self) -> &[LoadDiagnostic] {
        &self.diagnostics
    }

    pub fn store(&self) -> &TaxonomyStore {
        &self.store
    }

    /// Freeze the accumulated store into the shareable [`Taxonomy`].
    pub fn finish(self) -> Taxonomy {
        let metadata = TaxonomyMetadata {
            entry_point: os_path_to_string(self.config.entry_point_absolute()),
            base_dir: os_path_to_string(normalize(&self.config.base_dir)),
            timestamp: Utc::now().to_rfc3339(),
        };
        self.store.freeze(metadata)
    }

    fn process_schema(&mut self, path: PathBuf) {
        let path = normalize(path);
        if !self.processed_schemas.insert(path.clone()) {
            return;
        }
        tracing::info!("Parsing schema: {}", path.display());

        let text = match xml::read_document(&path) {
            Ok(text) => text,
            Err(error) => return self.parse_failure(path, error.to_string()),
        };
        let doc = match xml::parse(&text) {
            Ok(doc) => doc,
            Err(error) => return self.parse_failure(path, error.to_string()),
        };

        let harvest = schema::extract(&doc, &path, &mut self.store);
        self.summary.schemas_parsed += 1;

        let schema_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.config.base_dir.clone());

        // push discovered schemas to the front, reversed, so the first
        // import's subtree is processed before its siblings
        for location in harvest.schema_locations.iter().rev() {
            let resolved = normalize(self.resolver.resolve(location, &schema_dir));
            if resolved.is_file() {
                if !self.processed_schemas.contains(&resolved) {
                    self.schema_queue.push_front(resolved);
                }
            } else {
                self.resolution_miss(location, resolved);
            }
        }

        for href in &harvest.linkbase_refs {
            let resolved = normalize(self.resolver.resolve(href, &schema_dir));
            if resolved.is_file() {
                self.linkbase_queue.push_back(resolved);
            } else {
                self.resolution_miss(href, resolved);
            }
        }
    }

    fn process_linkbase(&mut self, path: PathBuf) {
        if !self.processed_linkbases.insert(path.clone()) {
            return;
        }
        tracing::info!("Parsing linkbase: {}", path.display());

        let text = match xml::read_document(&path) {
            Ok(text) => text,
            Err(error) => return self.parse_failure(path, error.to_string()),
        };
        let doc = match xml::parse(&text) {
            Ok(doc) => doc,
            Err(error) => return self.parse_failure(path, error.to_string()),
        };

        LinkbaseExtractor::new(&self.resolver, &mut self.concepts).extract(
            &doc,
            &path,
            &mut self.store,
        );
        self.summary.linkbases_parsed += 1;
    }

    fn resolution_miss(&mut self, reference: &str, resolved: PathBuf) {
        let diagnostic = LoadDiagnostic::resolution_miss(reference, resolved);
        tracing::warn!("{diagnostic}");
        self.summary.record(&diagnostic);
        self.diagnostics.push(diagnostic);
    }

    fn parse_failure(&mut self, path: PathBuf, message: String) {
        let diagnostic = LoadDiagnostic::parse_failure(path, message);
        tracing::error!("{diagnostic}");
        self.summary.record(&diagnostic);
        self.diagnostics.push(diagnostic);
    }
}
