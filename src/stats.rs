//! Statistics and analytics over a frozen [`Taxonomy`].

use std::collections::BTreeMap;
use std::fs::{create_dir_all, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::{
    error::DtsError,
    model::{ConceptId, DimensionRelation, NetworkKind, PeriodType, Taxonomy},
};

pub const STATS_FILE: &str = "taxonomy_stats.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicStats {
    pub total_concepts: usize,
    pub abstract_concepts: usize,
    pub non_abstract_concepts: usize,
    pub presentation_networks: usize,
    pub calculation_networks: usize,
    pub definition_networks: usize,
    pub role_types: usize,
    pub arcrole_types: usize,
    pub dimensions: usize,
    pub hypercubes: usize,
    pub explicit_dimensions: usize,
}

/// Per-network concept and role usage maps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageStats {
    /// network kind → concept id → number of roles the concept participates in
    pub concept_usage: BTreeMap<NetworkKind, BTreeMap<ConceptId, usize>>,
    /// network kind → role URI → number of participating concepts
    pub role_usage: BTreeMap<NetworkKind, BTreeMap<String, usize>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsReport {
    pub basic_stats: BasicStats,
    /// concept `type` attribute → declaration count
    pub element_types: BTreeMap<String, usize>,
    #[serde(flatten)]
    pub usage: UsageStats,
    /// namespace → concept count
    pub namespace_stats: BTreeMap<String, usize>,
    /// `instant` / `duration` / `none` → concept count
    pub period_type_stats: BTreeMap<String, usize>,
}

/// Derives the statistics report from a frozen taxonomy.
pub struct TaxonomyStats<'a> {
    taxonomy: &'a Taxonomy,
}

impl<'a> TaxonomyStats<'a> {
    pub fn new(taxonomy: &'a Taxonomy) -> Self {
        TaxonomyStats { taxonomy }
    }

    pub fn basic_stats(&self) -> BasicStats {
        let concepts = &self.taxonomy.concepts;
        let abstract_concepts = concepts.values().filter(|c| c.is_abstract).count();

        let network_count = |kind: NetworkKind| {
            self.taxonomy
                .linkbases
                .get(&kind)
                .map(|roles| roles.len())
                .unwrap_or(0)
        };

        let hypercubes = self
            .taxonomy
            .dimensions
            .values()
            .filter(|node| node.related.contains_key(&DimensionRelation::Hypercube))
            .count();
        let explicit_dimensions = self
            .taxonomy
            .dimensions
            .values()
            .filter(|node| node.related.contains_key(&DimensionRelation::Dimension))
            .count();

        BasicStats {
            total_concepts: concepts.len(),
            abstract_concepts,
            non_abstract_concepts: concepts.len() - abstract_concepts,
            presentation_networks: network_count(NetworkKind::Presentation),
            calculation_networks: network_count(NetworkKind::Calculation),
            definition_networks: network_count(NetworkKind::Definition),
            role_types: self.taxonomy.role_types.len(),
            arcrole_types: self.taxonomy.arcrole_types.len(),
            dimensions: self.taxonomy.dimensions.len(),
            hypercubes,
            explicit_dimensions,
        }
    }

    /// Declaration counts per concept `type` attribute. Concepts without a
    /// type are tallied under `unknown`.
    pub fn element_types(&self) -> BTreeMap<String, usize> {
        let mut types: BTreeMap<String, usize> = BTreeMap::new();
        for concept in self.taxonomy.concepts.values() {
            let key = if concept.concept_type.is_empty() {
                "unknown"
            } else {
                concept.concept_type.as_str()
            };
            *types.entry(key.to_string()).or_default() += 1;
        }
        types
    }

    pub fn usage(&self) -> UsageStats {
        let mut concept_usage: BTreeMap<NetworkKind, BTreeMap<ConceptId, usize>> = BTreeMap::new();
        for kind in NetworkKind::ALL {
            let per_concept = concept_usage.entry(kind).or_default();
            for (id, concept) in &self.taxonomy.concepts {
                let role_count = concept.network(kind).len();
                if role_count > 0 {
                    per_concept.insert(id.clone(), role_count);
                }
            }
        }

        let mut role_usage: BTreeMap<NetworkKind, BTreeMap<String, usize>> = BTreeMap::new();
        for (kind, roles) in &self.taxonomy.linkbases {
            let per_role = role_usage.entry(*kind).or_default();
            for (role, network) in roles {
                per_role.insert(role.clone(), network.concepts.len());
            }
        }

        UsageStats {
            concept_usage,
            role_usage,
        }
    }

    pub fn namespace_stats(&self) -> BTreeMap<String, usize> {
        let mut namespaces: BTreeMap<String, usize> = BTreeMap::new();
        for concept in self.taxonomy.concepts.values() {
            *namespaces.entry(concept.namespace.clone()).or_default() += 1;
        }
        namespaces
    }

    pub fn period_type_stats(&self) -> BTreeMap<String, usize> {
        let mut period_types: BTreeMap<String, usize> = BTreeMap::new();
        for concept in self.taxonomy.concepts.values() {
            let key = match concept.period_type {
                Some(PeriodType::Instant) => "instant",
                Some(PeriodType::Duration) => "duration",
                None => "none",
            };
            *period_types.entry(key.to_string()).or_default() += 1;
        }
        period_types
    }

    pub fn report(&self) -> StatsReport {
        StatsReport {
            basic_stats: self.basic_stats(),
            element_types: self.element_types(),
            usage: self.usage(),
            namespace_stats: self.namespace_stats(),
            period_type_stats: self.period_type_stats(),
        }
    }

    /// Generate the report and save it as `taxonomy_stats.json`.
    pub fn save_report<P: AsRef<Path>>(&self, output_dir: P) -> Result<PathBuf, DtsError> {
        create_dir_all(output_dir.as_ref())?;
        let output_path = output_dir.as_ref().join(STATS_FILE);
        let file = File::create(&output_path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), &self.report())?;
        tracing::info!("Taxonomy statistics report saved to: {}", output_path.display());
        Ok(output_path)
    }
}
