//! JSON artifact generation for a frozen [`Taxonomy`].
//!
//! The writer is a pure sink: it reads the frozen store and emits the
//! artifact files, computing reverse indexes (hierarchy roots) on demand
//! rather than looking them up in the store.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::{create_dir_all, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::{
    error::DtsError,
    model::{ConceptId, NetworkKind, Relationship, Taxonomy},
};

pub const COMPLETE_TAXONOMY_FILE: &str = "complete_taxonomy.json";
pub const CONCEPTS_FILE: &str = "concepts.json";
pub const LINKBASES_FILE: &str = "linkbases.json";
pub const ROLE_TYPES_FILE: &str = "role_types.json";
pub const DIMENSIONS_FILE: &str = "dimensions.json";
pub const CONCEPT_HIERARCHY_FILE: &str = "concept_hierarchy.json";
pub const DIMENSIONAL_STRUCTURE_FILE: &str = "dimensional_structure.json";

/// One node of the presentation-derived concept hierarchy.
#[derive(Debug, Serialize)]
pub struct ConceptTree {
    pub id: ConceptId,
    pub name: String,
    pub labels: BTreeMap<String, String>,
    pub children: Vec<ConceptTree>,
}

/// One presentation role with its root subtrees.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleHierarchy {
    pub role: String,
    pub definition: String,
    pub roots: Vec<ConceptTree>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberView {
    pub id: ConceptId,
    pub name: String,
    pub labels: BTreeMap<String, String>,
    pub children: Vec<MemberView>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainView {
    pub id: ConceptId,
    pub name: String,
    pub labels: BTreeMap<String, String>,
    pub members: Vec<MemberView>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionView {
    pub id: ConceptId,
    pub name: String,
    pub labels: BTreeMap<String, String>,
    pub domains: Vec<DomainView>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HypercubeView {
    pub id: ConceptId,
    pub name: String,
    pub labels: BTreeMap<String, String>,
    pub dimensions: Vec<DimensionView>,
}

/// Writes the artifact files for one frozen taxonomy.
pub struct TaxonomyWriter<'a> {
    taxonomy: &'a Taxonomy,
    output_dir: PathBuf,
}

impl<'a> TaxonomyWriter<'a> {
    pub fn new<P: AsRef<Path>>(taxonomy: &'a Taxonomy, output_dir: P) -> Result<Self, DtsError> {
        create_dir_all(output_dir.as_ref())?;
        Ok(TaxonomyWriter {
            taxonomy,
            output_dir: output_dir.as_ref().to_path_buf(),
        })
    }

    /// Write every artifact and return the paths, keyed by artifact name.
    pub fn write_all(&self) -> Result<BTreeMap<&'static str, PathBuf>, DtsError> {
        let mut outputs = BTreeMap::new();
        outputs.insert("main", self.write_json(COMPLETE_TAXONOMY_FILE)?);
        outputs.insert(
            "concepts",
            self.write_value(CONCEPTS_FILE, &self.taxonomy.concepts)?,
        );
        outputs.insert(
            "linkbases",
            self.write_value(LINKBASES_FILE, &self.taxonomy.linkbases)?,
        );
        outputs.insert(
            "roleTypes",
            self.write_value(ROLE_TYPES_FILE, &self.taxonomy.role_types)?,
        );
        outputs.insert(
            "dimensions",
            self.write_value(DIMENSIONS_FILE, &self.taxonomy.dimensions)?,
        );
        outputs.insert("hierarchy", self.write_concept_hierarchy()?);
        outputs.insert("dimensional", self.write_dimensional_structure()?);
        Ok(outputs)
    }

    /// Write the complete taxonomy to one JSON file.
    pub fn write_json(&self, filename: &str) -> Result<PathBuf, DtsError> {
        self.write_value(filename, self.taxonomy)
    }

    fn write_value<T: Serialize>(&self, filename: &str, value: &T) -> Result<PathBuf, DtsError> {
        let output_path = self.output_dir.join(filename);
        let file = File::create(&output_path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), value)?;
        tracing::info!("Saved: {}", output_path.display());
        Ok(output_path)
    }

    /// Write the hierarchical concept view derived from the presentation
    /// networks: per role, the subtrees under every root concept (a parent
    /// that never appears as a child).
    pub fn write_concept_hierarchy(&self) -> Result<PathBuf, DtsError> {
        let hierarchy = self.build_concept_hierarchy();
        self.write_value(CONCEPT_HIERARCHY_FILE, &hierarchy)
    }

    fn build_concept_hierarchy(&self) -> BTreeMap<String, RoleHierarchy> {
        let mut hierarchy = BTreeMap::new();
        let Some(presentation) = self.taxonomy.linkbases.get(&NetworkKind::Presentation) else {
            return hierarchy;
        };

        for (role, network) in presentation {
            let relationships = &network.relationships;

            let all_children: BTreeSet<&str> = relationships
                .values()
                .flatten()
                .map(|edge| edge.to.as_str())
                .collect();
            let roots: Vec<&ConceptId> = relationships
                .keys()
                .filter(|parent| !all_children.contains(parent.as_str()))
                .collect();

            let mut visited = BTreeSet::new();
            let role_hierarchy = RoleHierarchy {
                role: role.clone(),
                definition: self.role_definition(role),
                roots: roots
                    .into_iter()
                    .map(|root| self.build_subtree(root, relationships, &mut visited))
                    .collect(),
            };
            hierarchy.insert(role.clone(), role_hierarchy);
        }
        hierarchy
    }

    fn build_subtree(
        &self,
        id: &str,
        relationships: &BTreeMap<ConceptId, Vec<Relationship>>,
        visited: &mut BTreeSet<ConceptId>,
    ) -> ConceptTree {
        let mut tree = ConceptTree {
            id: id.to_string(),
            name: self.concept_name(id),
            labels: self.simplified_labels(id),
            children: Vec::new(),
        };
        // Cycle guard: render a repeated concept as a leaf.
        if !visited.insert(id.to_string()) {
            return tree;
        }
        if let Some(children) = relationships.get(id) {
            for child in children {
                tree.children
                    .push(self.build_subtree(&child.to, relationships, visited));
            }
        }
        visited.remove(id);
        tree
    }

    /// Write the nested hypercube → dimension → domain → member view.
    pub fn write_dimensional_structure(&self) -> Result<PathBuf, DtsError> {
        let structure = self.build_dimensional_structure();
        self.write_value(DIMENSIONAL_STRUCTURE_FILE, &structure)
    }

    fn build_dimensional_structure(&self) -> BTreeMap<ConceptId, HypercubeView> {
        use crate::model::DimensionRelation::{Dimension, Domain, Hypercube, Member};

        // The `all` arc points from a primary item *to* its hypercube, so
        // the hypercubes to render are the targets of that relation.
        let hypercube_ids: BTreeSet<&ConceptId> = self
            .taxonomy
            .dimensions
            .values()
            .filter_map(|node| node.related.get(&Hypercube))
            .flatten()
            .collect();

        let mut structure = BTreeMap::new();
        for id in hypercube_ids {
            let dimensions = self
                .related_ids(id, Dimension)
                .map(|dimension_id| DimensionView {
                    id: dimension_id.clone(),
                    name: self.concept_name(dimension_id),
                    labels: self.simplified_labels(dimension_id),
                    domains: self
                        .related_ids(dimension_id, Domain)
                        .map(|domain_id| DomainView {
                            id: domain_id.clone(),
                            name: self.concept_name(domain_id),
                            labels: self.simplified_labels(domain_id),
                            members: self
                                .related_ids(domain_id, Member)
                                .map(|member_id| {
                                    let mut visited = BTreeSet::new();
                                    self.build_member(member_id, &mut visited)
                                })
                                .collect(),
                        })
                        .collect(),
                })
                .collect();
            structure.insert(
                id.clone(),
                HypercubeView {
                    id: id.clone(),
                    name: self.concept_name(id),
                    labels: self.simplified_labels(id),
                    dimensions,
                },
            );
        }
        structure
    }

    fn build_member(&self, id: &ConceptId, visited: &mut BTreeSet<ConceptId>) -> MemberView {
        let mut view = MemberView {
            id: id.clone(),
            name: self.concept_name(id),
            labels: self.simplified_labels(id),
            children: Vec::new(),
        };
        // Cycle guard: domain-member chains may loop in malformed inputs.
        if !visited.insert(id.clone()) {
            return view;
        }
        view.children = self
            .related_ids(id, crate::model::DimensionRelation::Member)
            .map(|child| self.build_member(child, visited))
            .collect();
        visited.remove(id);
        view
    }

    fn related_ids(
        &self,
        id: &str,
        relation: crate::model::DimensionRelation,
    ) -> impl Iterator<Item = &ConceptId> {
        self.taxonomy
            .dimensions
            .get(id)
            .and_then(|node| node.related.get(&relation))
            .into_iter()
            .flatten()
    }

    fn concept_name(&self, id: &str) -> String {
        self.taxonomy
            .concepts
            .get(id)
            .map(|concept| concept.name.clone())
            .unwrap_or_default()
    }

    /// Flatten a concept's labels to one language: English when present,
    /// the first language otherwise.
    fn simplified_labels(&self, id: &str) -> BTreeMap<String, String> {
        let Some(concept) = self.taxonomy.concepts.get(id) else {
            return BTreeMap::new();
        };
        if let Some(english) = concept.labels.get("en") {
            return english.clone();
        }
        concept
            .labels
            .values()
            .next()
            .cloned()
            .unwrap_or_default()
    }

    /// Definition text for a role, the role URI itself when unknown.
    fn role_definition(&self, role: &str) -> String {
        self.taxonomy
            .role_types
            .get(role)
            .and_then(|role_type| role_type.definition.clone())
            .unwrap_or_else(|| role.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        concept_id, Concept, DimensionRelation, Network, RoleType, TaxonomyMetadata,
    };
    use crate::store::TaxonomyStore;
    use tempfile::TempDir;

    fn fixture_taxonomy() -> Taxonomy {
        let mut store = TaxonomyStore::new();
        for name in ["Root", "Mid", "Leaf", "H", "D", "Dom", "M1", "M2"] {
            let mut concept = Concept::new("urn:t", name, "t.xsd".into());
            concept.labels.insert(
                "en".into(),
                BTreeMap::from([(
                    "http://www.xbrl.org/2003/role/label".to_string(),
                    format!("{name} label"),
                )]),
            );
            store.insert_concept(concept);
        }

        let role = "http://example.com/role/R";
        store.insert_role_type(RoleType {
            id: "R".into(),
            role_uri: role.into(),
            namespace: "urn:t".into(),
            definition: Some("100 - Statement".into()),
            used_on: vec!["link:presentationLink".into()],
        });

        let edges = |pairs: &[(&str, &str, f64)]| {
            let mut map: BTreeMap<ConceptId, Vec<Relationship>> = BTreeMap::new();
            for (from, to, order) in pairs {
                map.entry(concept_id("urn:t", from)).or_default().push(
                    Relationship {
                        order: *order,
                        ..Relationship::new(concept_id("urn:t", to))
                    },
                );
            }
            map
        };
        let relationships = edges(&[("Root", "Mid", 1.0), ("Mid", "Leaf", 1.0)]);
        for (parent, batch) in relationships.clone() {
            store.append_relationships(NetworkKind::Presentation, role, &parent, batch);
        }
        store.register_network(
            NetworkKind::Presentation,
            role,
            Network {
                concepts: relationships
                    .iter()
                    .flat_map(|(parent, children)| {
                        std::iter::once(parent.clone())
                            .chain(children.iter().map(|c| c.to.clone()))
                    })
                    .collect(),
                relationships,
                source_file: "t-pre.xml".into(),
            },
        );

        let dims = [
            ("Root", "H", DimensionRelation::Hypercube),
            ("H", "D", DimensionRelation::Dimension),
            ("D", "Dom", DimensionRelation::Domain),
            ("Dom", "M1", DimensionRelation::Member),
            ("M1", "M2", DimensionRelation::Member),
        ];
        for (from, to, relation) in dims {
            store.add_dimension(
                &concept_id("urn:t", from),
                &concept_id("urn:t", to),
                relation,
                "http://example.com/role/R",
                "t-def.xml",
            );
        }

        store.freeze(TaxonomyMetadata {
            entry_point: "t.xsd".into(),
            base_dir: "/mirror".into(),
            timestamp: "2024-01-01T00:00:00+00:00".into(),
        })
    }

    #[test]
    fn test_write_all_artifacts() {
        let taxonomy = fixture_taxonomy();
        let tmp = TempDir::new().unwrap();
        let writer = TaxonomyWriter::new(&taxonomy, tmp.path()).unwrap();
        let outputs = writer.write_all().unwrap();
        assert_eq!(outputs.len(), 7);
        for path in outputs.values() {
            assert!(path.is_file(), "missing artifact {path:?}");
        }
        let complete: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&outputs["main"]).unwrap()).unwrap();
        assert_eq!(complete["metadata"]["baseDir"], "/mirror");
        assert!(complete["concepts"]["urn:t#Root"].is_object());
    }

    #[test]
    fn test_hierarchy_roots_and_nesting() {
        let taxonomy = fixture_taxonomy();
        let tmp = TempDir::new().unwrap();
        let writer = TaxonomyWriter::new(&taxonomy, tmp.path()).unwrap();
        let path = writer.write_concept_hierarchy().unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        let role = &value["http://example.com/role/R"];
        assert_eq!(role["definition"], "100 - Statement");
        let roots = role["roots"].as_array().unwrap();
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0]["id"], "urn:t#Root");
        assert_eq!(roots[0]["children"][0]["id"], "urn:t#Mid");
        assert_eq!(roots[0]["children"][0]["children"][0]["id"], "urn:t#Leaf");
        assert_eq!(
            roots[0]["labels"]["http://www.xbrl.org/2003/role/label"],
            "Root label"
        );
    }

    #[test]
    fn test_dimensional_structure_nesting() {
        let taxonomy = fixture_taxonomy();
        let tmp = TempDir::new().unwrap();
        let writer = TaxonomyWriter::new(&taxonomy, tmp.path()).unwrap();
        let path = writer.write_dimensional_structure().unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        // H is the target of the `all` relation, so it anchors the structure
        assert_eq!(value.as_object().unwrap().len(), 1);
        let hypercube = &value["urn:t#H"];
        assert_eq!(hypercube["dimensions"][0]["id"], "urn:t#D");
        assert_eq!(hypercube["dimensions"][0]["domains"][0]["id"], "urn:t#Dom");
        let members = &hypercube["dimensions"][0]["domains"][0]["members"];
        assert_eq!(members[0]["id"], "urn:t#M1");
        assert_eq!(members[0]["children"][0]["id"], "urn:t#M2");
    }
}
