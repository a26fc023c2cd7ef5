//! The mutable accumulator behind a taxonomy load.
//!
//! A [`TaxonomyStore`] is owned by the loader and handed to extractors by
//! exclusive reference for the duration of one document; extractors never
//! hold entities, only ids. After traversal the store is consumed by
//! [`TaxonomyStore::freeze`] into the immutable [`Taxonomy`].

use std::collections::BTreeMap;

use crate::model::{
    ArcroleType, Concept, ConceptId, DimensionNode, DimensionRelation, Network, NetworkKind,
    Relationship, RoleType, Taxonomy, TaxonomyMetadata,
};

#[derive(Debug, Default)]
pub struct TaxonomyStore {
    concepts: BTreeMap<ConceptId, Concept>,
    linkbases: BTreeMap<NetworkKind, BTreeMap<String, Network>>,
    role_types: BTreeMap<String, RoleType>,
    arcrole_types: BTreeMap<String, ArcroleType>,
    dimensions: BTreeMap<ConceptId, DimensionNode>,
}

impl TaxonomyStore {
    pub fn new() -> Self {
        TaxonomyStore::default()
    }

    /// Insert a concept. The first declaration of an id wins; re-encounters
    /// through overlapping imports are ignored wholesale, inline type info
    /// included. Returns whether the concept was inserted.
    pub fn insert_concept(&mut self, concept: Concept) -> bool {
        match self.concepts.entry(concept.id.clone()) {
            std::collections::btree_map::Entry::Vacant(slot) => {
                slot.insert(concept);
                true
            }
            std::collections::btree_map::Entry::Occupied(_) => false,
        }
    }

    pub fn contains_concept(&self, id: &str) -> bool {
        self.concepts.contains_key(id)
    }

    pub fn concept(&self, id: &str) -> Option<&Concept> {
        self.concepts.get(id)
    }

    pub fn concept_mut(&mut self, id: &str) -> Option<&mut Concept> {
        self.concepts.get_mut(id)
    }

    pub fn concepts(&self) -> &BTreeMap<ConceptId, Concept> {
        &self.concepts
    }

    pub fn concept_count(&self) -> usize {
        self.concepts.len()
    }

    /// Find the namespace of a concept declared by the document whose stored
    /// source path ends with `doc_part` (leading `./` and `../` segments
    /// stripped). Used by the XLink concept resolver before it falls back to
    /// reading the schema itself.
    pub fn namespace_for_source(&self, doc_part: &str) -> Option<&str> {
        let mut suffix = doc_part;
        loop {
            if let Some(rest) = suffix.strip_prefix("../") {
                suffix = rest;
            } else if let Some(rest) = suffix.strip_prefix("./") {
                suffix = rest;
            } else {
                break;
            }
        }
        if suffix.is_empty() {
            return None;
        }
        self.concepts
            .values()
            .find(|c| {
                let source = &c.source_file;
                // suffix must start at a path-component boundary
                source.ends_with(suffix)
                    && (source.len() == suffix.len()
                        || source.as_bytes()[source.len() - suffix.len() - 1] == b'/')
            })
            .map(|c| c.namespace.as_str())
    }

    pub fn insert_role_type(&mut self, role_type: RoleType) {
        self.role_types.insert(role_type.role_uri.clone(), role_type);
    }

    pub fn insert_arcrole_type(&mut self, arcrole_type: ArcroleType) {
        self.arcrole_types
            .insert(arcrole_type.arcrole_uri.clone(), arcrole_type);
    }

    pub fn role_type(&self, uri: &str) -> Option<&RoleType> {
        self.role_types.get(uri)
    }

    pub fn arcrole_type(&self, uri: &str) -> Option<&ArcroleType> {
        self.arcrole_types.get(uri)
    }

    /// Append a batch of edges under `(parent, kind, role)` and restore the
    /// bucket's ordering invariant: non-decreasing by `order`, ties stable by
    /// arrival. The whole bucket is re-sorted because several extended links
    /// may contribute to the same bucket.
    ///
    /// Edges for parents missing from the concept dictionary are dropped.
    pub fn append_relationships(
        &mut self,
        kind: NetworkKind,
        role: &str,
        parent: &str,
        batch: Vec<Relationship>,
    ) {
        let Some(concept) = self.concepts.get_mut(parent) else {
            return;
        };
        let bucket = concept
            .network_mut(kind)
            .entry(role.to_string())
            .or_default();
        bucket.extend(batch);
        sort_bucket(bucket);
    }

    /// Record the network index for `(kind, role)`. The first extended link
    /// registering a pair wins the slot.
    pub fn register_network(&mut self, kind: NetworkKind, role: &str, network: Network) {
        self.linkbases
            .entry(kind)
            .or_default()
            .entry(role.to_string())
            .or_insert(network);
    }

    pub fn network(&self, kind: NetworkKind, role: &str) -> Option<&Network> {
        self.linkbases.get(&kind).and_then(|roles| roles.get(role))
    }

    /// Record one dimensional relation `from --kind--> to` observed in an
    /// extended link with role `role`. Relations are sets, so repeated arcs
    /// deduplicate.
    pub fn add_dimension(
        &mut self,
        from: &str,
        to: &str,
        relation: DimensionRelation,
        role: &str,
        source_file: &str,
    ) {
        let node = self
            .dimensions
            .entry(from.to_string())
            .or_insert_with(|| DimensionNode::new(from.to_string()));
        node.related
            .entry(relation)
            .or_default()
            .insert(to.to_string());
        node.roles.insert(role.to_string());
        node.source_file = source_file.to_string();
    }

    pub fn dimension(&self, id: &str) -> Option<&DimensionNode> {
        self.dimensions.get(id)
    }

    /// Consume the accumulator into the frozen, shareable [`Taxonomy`].
    pub fn freeze(self, metadata: TaxonomyMetadata) -> Taxonomy {
        Taxonomy {
            metadata,
            concepts: self.concepts,
            linkbases: self.linkbases,
            role_types: self.role_types,
            arcrole_types: self.arcrole_types,
            dimensions: self.dimensions,
        }
    }
}

/// Stable sort by `order` with an explicit insertion index as the tie-break,
/// so arrival order is preserved for equal orders.
pub(crate) fn sort_bucket(bucket: &mut Vec<Relationship>) {
    let mut decorated: Vec<(usize, Relationship)> = bucket.drain(..).enumerate().collect();
    decorated.sort_by(|(seq_a, a), (seq_b, b)| {
        a.order
            .partial_cmp(&b.order)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(seq_a.cmp(seq_b))
    });
    bucket.extend(decorated.into_iter().map(|(_, rel)| rel));
}
