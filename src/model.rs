//! The taxonomy data model.
//!
//! Every entity is addressed by a **concept id**, the canonical string
//! `"{namespace}#{localName}"`. No pointer graph is materialized: edges hold
//! ids, and any traversal that needs back-references computes a reverse
//! index on demand. All maps are ordered so serialized artifacts are
//! deterministic across runs.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Canonical concept identifier: `"{namespace}#{localName}"`.
pub type ConceptId = String;

/// Build the canonical id for a concept.
pub fn concept_id(namespace: &str, name: &str) -> ConceptId {
    format!("{namespace}#{name}")
}

/// `xbrli:periodType` on a concept declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodType {
    Instant,
    Duration,
}

impl PeriodType {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "instant" => Some(PeriodType::Instant),
            "duration" => Some(PeriodType::Duration),
            _ => None,
        }
    }
}

/// `xbrli:balance` on a concept declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Balance {
    Debit,
    Credit,
}

impl Balance {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "debit" => Some(Balance::Debit),
            "credit" => Some(Balance::Credit),
            _ => None,
        }
    }
}

/// The three hierarchical relationship networks carried by linkbases.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum NetworkKind {
    Presentation,
    Calculation,
    Definition,
}

impl NetworkKind {
    pub const ALL: [NetworkKind; 3] = [
        NetworkKind::Presentation,
        NetworkKind::Calculation,
        NetworkKind::Definition,
    ];

    /// Local name of the extended link element (`presentationLink`, ...).
    pub fn link_name(&self) -> &'static str {
        match self {
            NetworkKind::Presentation => "presentationLink",
            NetworkKind::Calculation => "calculationLink",
            NetworkKind::Definition => "definitionLink",
        }
    }

    /// Local name of the arc element inside the extended link.
    pub fn arc_name(&self) -> &'static str {
        match self {
            NetworkKind::Presentation => "presentationArc",
            NetworkKind::Calculation => "calculationArc",
            NetworkKind::Definition => "definitionArc",
        }
    }
}

impl fmt::Display for NetworkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NetworkKind::Presentation => "presentation",
            NetworkKind::Calculation => "calculation",
            NetworkKind::Definition => "definition",
        };
        write!(f, "{name}")
    }
}

/// The four tiers of the dimensional subgraph.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum DimensionRelation {
    Hypercube,
    Dimension,
    Domain,
    Member,
}

impl fmt::Display for DimensionRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DimensionRelation::Hypercube => "hypercube",
            DimensionRelation::Dimension => "dimension",
            DimensionRelation::Domain => "domain",
            DimensionRelation::Member => "member",
        };
        write!(f, "{name}")
    }
}

fn default_order() -> f64 {
    1.0
}

/// One outgoing edge in a relationship network.
///
/// `weight` is only populated by calculation arcs; `context_element`,
/// `typed_domain_ref`, and `target_role` only by definition arcs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub to: ConceptId,
    #[serde(default = "default_order")]
    pub order: f64,
    #[serde(default)]
    pub preferred_label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_element: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typed_domain_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_role: Option<String>,
}

impl Relationship {
    pub fn new(to: ConceptId) -> Self {
        Relationship {
            to,
            order: default_order(),
            preferred_label: String::new(),
            weight: None,
            context_element: None,
            typed_domain_ref: None,
            target_role: None,
        }
    }
}

/// One `<ref:*>` part of a reference resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferencePart {
    pub name: String,
    pub value: String,
}

/// One reference resource: its parts in document order.
pub type ReferenceRecord = Vec<ReferencePart>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TypeKind {
    ComplexType,
    SimpleType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeAttribute {
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub attr_type: Option<String>,
    #[serde(rename = "use")]
    pub attr_use: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeElement {
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub element_type: Option<String>,
    pub min_occurs: String,
    pub max_occurs: String,
}

/// An `xs:enumeration` value with its optional documentation text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumValue {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Restriction {
    pub base: String,
    /// Facets keyed by local name (`minLength`, `pattern`, ...). Enumeration
    /// children live in `enumerations`, not here.
    pub facets: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enumerations: Vec<EnumValue>,
}

/// Inline `xs:complexType` / `xs:simpleType` carried by an element
/// declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeInfo {
    pub kind: TypeKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<TypeAttribute>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub elements: Vec<TypeElement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restriction: Option<Restriction>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub union_members: Vec<String>,
}

/// A reporting concept: one named `xs:element` declaration, denormalized
/// with everything the linkbases attach to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Concept {
    pub id: ConceptId,
    pub name: String,
    pub namespace: String,
    pub source_file: String,
    #[serde(rename = "abstract")]
    pub is_abstract: bool,
    pub nillable: bool,
    pub substitution_group: String,
    #[serde(rename = "type")]
    pub concept_type: String,
    /// Schema-level `periodType` attribute; never inferred from linkbases.
    pub period_type: Option<PeriodType>,
    /// Schema-level `balance` attribute; never inferred from linkbases.
    pub balance: Option<Balance>,
    /// language → label role URI → text
    #[serde(default)]
    pub labels: BTreeMap<String, BTreeMap<String, String>>,
    /// reference role URI → reference records in arrival order
    #[serde(default)]
    pub references: BTreeMap<String, Vec<ReferenceRecord>>,
    /// role URI → ordered outgoing edges, one map per network kind
    #[serde(default)]
    pub presentation: BTreeMap<String, Vec<Relationship>>,
    #[serde(default)]
    pub calculation: BTreeMap<String, Vec<Relationship>>,
    #[serde(default)]
    pub definition: BTreeMap<String, Vec<Relationship>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_type: Option<TypeInfo>,
}

impl Concept {
    pub fn new(namespace: &str, name: &str, source_file: String) -> Self {
        Concept {
            id: concept_id(namespace, name),
            name: name.to_string(),
            namespace: namespace.to_string(),
            source_file,
            is_abstract: false,
            nillable: false,
            substitution_group: String::new(),
            concept_type: String::new(),
            period_type: None,
            balance: None,
            labels: BTreeMap::new(),
            references: BTreeMap::new(),
            presentation: BTreeMap::new(),
            calculation: BTreeMap::new(),
            definition: BTreeMap::new(),
            custom_type: None,
        }
    }

    pub fn network(&self, kind: NetworkKind) -> &BTreeMap<String, Vec<Relationship>> {
        match kind {
            NetworkKind::Presentation => &self.presentation,
            NetworkKind::Calculation => &self.calculation,
            NetworkKind::Definition => &self.definition,
        }
    }

    pub fn network_mut(&mut self, kind: NetworkKind) -> &mut BTreeMap<String, Vec<Relationship>> {
        match kind {
            NetworkKind::Presentation => &mut self.presentation,
            NetworkKind::Calculation => &mut self.calculation,
            NetworkKind::Definition => &mut self.definition,
        }
    }
}

/// A `link:roleType` declaration, indexed by its role URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleType {
    pub id: String,
    #[serde(rename = "roleURI")]
    pub role_uri: String,
    pub namespace: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
    #[serde(default)]
    pub used_on: Vec<String>,
}

/// A `link:arcroleType` declaration, indexed by its arcrole URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArcroleType {
    pub id: String,
    #[serde(rename = "arcroleURI")]
    pub arcrole_uri: String,
    pub namespace: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
    #[serde(default)]
    pub used_on: Vec<String>,
    pub cycles_allowed: String,
}

/// One relationship network: everything a single extended-link role
/// contributed, kept alongside the per-concept edge maps for navigation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Network {
    pub concepts: BTreeSet<ConceptId>,
    pub relationships: BTreeMap<ConceptId, Vec<Relationship>>,
    pub source_file: String,
}

/// A node in the dimensional subgraph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionNode {
    pub id: ConceptId,
    /// relation kind → set of related concept ids
    pub related: BTreeMap<DimensionRelation, BTreeSet<ConceptId>>,
    /// extended-link role URIs this node participates in
    pub roles: BTreeSet<String>,
    pub source_file: String,
}

impl DimensionNode {
    pub fn new(id: ConceptId) -> Self {
        DimensionNode {
            id,
            related: BTreeMap::new(),
            roles: BTreeSet::new(),
            source_file: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxonomyMetadata {
    pub entry_point: String,
    pub base_dir: String,
    /// RFC 3339 timestamp of the load.
    pub timestamp: String,
}

/// The frozen result of a load: immutable, owned, freely shareable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Taxonomy {
    pub metadata: TaxonomyMetadata,
    pub concepts: BTreeMap<ConceptId, Concept>,
    pub linkbases: BTreeMap<NetworkKind, BTreeMap<String, Network>>,
    pub role_types: BTreeMap<String, RoleType>,
    pub arcrole_types: BTreeMap<String, ArcroleType>,
    pub dimensions: BTreeMap<ConceptId, DimensionNode>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concept_id_form() {
        let concept = Concept::new("urn:test", "Assets", "a.xsd".into());
        assert_eq!(concept.id, "urn:test#Assets");
        assert_eq!(concept.id, concept_id(&concept.namespace, &concept.name));
    }

    #[test]
    fn test_relationship_defaults() {
        let rel = Relationship::new("urn:test#Assets".into());
        assert_eq!(rel.order, 1.0);
        assert!(rel.preferred_label.is_empty());
        assert!(rel.weight.is_none());
    }

    #[test]
    fn test_network_kind_names() {
        assert_eq!(NetworkKind::Presentation.link_name(), "presentationLink");
        assert_eq!(NetworkKind::Calculation.arc_name(), "calculationArc");
        assert_eq!(NetworkKind::Definition.to_string(), "definition");
    }

    #[test]
    fn test_concept_serde_shape() {
        let mut concept = Concept::new("urn:test", "Assets", "a.xsd".into());
        concept.is_abstract = true;
        concept.period_type = Some(PeriodType::Instant);
        let json = serde_json::to_value(&concept).unwrap();
        assert_eq!(json["abstract"], true);
        assert_eq!(json["periodType"], "instant");
        assert_eq!(json["balance"], serde_json::Value::Null);
        assert_eq!(json["sourceFile"], "a.xsd");
    }

    #[test]
    fn test_network_kind_as_map_key() {
        let mut map: BTreeMap<NetworkKind, u32> = BTreeMap::new();
        map.insert(NetworkKind::Presentation, 1);
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"presentation":1}"#);
    }
}
