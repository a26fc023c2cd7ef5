//! Linkbase resolution: joining XLink `loc`/`arc`/resource triples into
//! labels, references, and typed relationship edges.
//!
//! Each extended link is resolved independently. The locator table and
//! resource index are scratch maps scoped to one link and discarded once its
//! arcs are committed, so no long-lived XLink symbol table exists. Arcs
//! whose endpoints do not resolve are dropped without ceremony; a linkbase
//! is harvested for whatever it yields.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use roxmltree::{Document, Node};

use crate::{
    codec::dimension,
    model::{concept_id, ConceptId, Network, NetworkKind, ReferencePart, Relationship},
    paths::{os_path_to_string, split_fragment, PathResolver},
    store::TaxonomyStore,
    xml::{self, ns},
};

/// Default label resource role when `xlink:role` is absent.
pub const STANDARD_LABEL_ROLE: &str = "http://www.xbrl.org/2003/role/label";
/// Default reference resource role when `xlink:role` is absent.
pub const STANDARD_REFERENCE_ROLE: &str = "http://www.xbrl.org/2003/role/reference";

/// Resolves locator hrefs (`doc#fragment`) to concept ids.
///
/// Two strategies, in order: reuse the namespace of a concept already
/// harvested from the referenced document (suffix match on its stored
/// source path), else resolve the document part relative to the entry
/// point's directory and read its `targetNamespace` directly. The second
/// path is memoized per document part; large linkbases repeat it constantly.
#[derive(Debug)]
pub struct ConceptResolver {
    entry_dir: PathBuf,
    namespace_cache: HashMap<String, Option<String>>,
}

impl ConceptResolver {
    pub fn new(entry_dir: PathBuf) -> Self {
        ConceptResolver {
            entry_dir,
            namespace_cache: HashMap::new(),
        }
    }

    /// Resolve an href to a *known* concept id. An href whose namespace can
    /// be determined but which names no declared concept is a dangling
    /// locator and resolves to `None`.
    pub fn resolve(
        &mut self,
        href: &str,
        store: &TaxonomyStore,
        resolver: &PathResolver,
    ) -> Option<ConceptId> {
        let (doc_part, fragment) = split_fragment(href);
        let fragment = fragment.filter(|f| !f.is_empty())?;
        if doc_part.is_empty() {
            return None;
        }

        let namespace = match store.namespace_for_source(doc_part) {
            Some(known) => Some(known.to_string()),
            None => self.namespace_from_schema(doc_part, resolver),
        }?;

        let id = concept_id(&namespace, fragment);
        store.contains_concept(&id).then_some(id)
    }

    fn namespace_from_schema(
        &mut self,
        doc_part: &str,
        resolver: &PathResolver,
    ) -> Option<String> {
        if let Some(cached) = self.namespace_cache.get(doc_part) {
            return cached.clone();
        }
        let namespace = read_target_namespace(&resolver.resolve(doc_part, &self.entry_dir));
        self.namespace_cache
            .insert(doc_part.to_string(), namespace.clone());
        namespace
    }
}

fn read_target_namespace(path: &Path) -> Option<String> {
    if !path.is_file() {
        return None;
    }
    let text = std::fs::read_to_string(path).ok()?;
    let doc = Document::parse(&text).ok()?;
    doc.root_element()
        .attribute("targetNamespace")
        .map(str::to_string)
}

/// Processes one parsed linkbase document into the store.
pub struct LinkbaseExtractor<'a> {
    resolver: &'a PathResolver,
    concepts: &'a mut ConceptResolver,
}

impl<'a> LinkbaseExtractor<'a> {
    pub fn new(resolver: &'a PathResolver, concepts: &'a mut ConceptResolver) -> Self {
        LinkbaseExtractor { resolver, concepts }
    }

    /// Process every extended link in the document. Label and reference
    /// links attach resources to concepts; the three relationship link
    /// kinds emit network edges, with definition arcs additionally flowing
    /// through the dimensional analyzer.
    pub fn extract(&mut self, doc: &Document<'_>, source_path: &Path, store: &mut TaxonomyStore) {
        let root = doc.root_element();
        let source_file = os_path_to_string(source_path);

        for link in xml::descendants(root, ns::LINK, "labelLink") {
            self.process_label_link(link, store);
        }
        for link in xml::descendants(root, ns::LINK, "referenceLink") {
            self.process_reference_link(link, store);
        }
        for kind in NetworkKind::ALL {
            for link in xml::descendants(root, ns::LINK, kind.link_name()) {
                self.process_relationship_link(link, kind, &source_file, store);
            }
        }
    }

    /// Build the per-link `locatorLabel → conceptId` table.
    fn locator_map(
        &mut self,
        link: Node<'_, '_>,
        store: &TaxonomyStore,
    ) -> HashMap<String, ConceptId> {
        let mut locators = HashMap::new();
        for loc in xml::children(link, ns::LINK, "loc") {
            let (Some(href), Some(label)) = (
                loc.attribute((ns::XLINK, "href")),
                loc.attribute((ns::XLINK, "label")),
            ) else {
                continue;
            };
            match self.concepts.resolve(href, store, self.resolver) {
                Some(id) => {
                    locators.insert(label.to_string(), id);
                }
                None => tracing::debug!("Dropping locator with unresolvable href: {href}"),
            }
        }
        locators
    }

    fn process_label_link(&mut self, link: Node<'_, '_>, store: &mut TaxonomyStore) {
        let locators = self.locator_map(link, store);
        let resources = resource_index(link, "label");

        for arc in xml::children(link, ns::LINK, "labelArc") {
            let Some((concept, targets)) = arc_targets(arc, &locators, &resources) else {
                continue;
            };
            for label in targets {
                let role = label
                    .attribute((ns::XLINK, "role"))
                    .unwrap_or(STANDARD_LABEL_ROLE);
                let lang = label.attribute((ns::XML, "lang")).unwrap_or("en");
                let text = label.text().unwrap_or("").to_string();
                if let Some(concept) = store.concept_mut(&concept) {
                    // document order wins: later resources overwrite
                    concept
                        .labels
                        .entry(lang.to_string())
                        .or_default()
                        .insert(role.to_string(), text);
                }
            }
        }
    }

    fn process_reference_link(&mut self, link: Node<'_, '_>, store: &mut TaxonomyStore) {
        let locators = self.locator_map(link, store);
        let resources = resource_index(link, "reference");

        for arc in xml::children(link, ns::LINK, "referenceArc") {
            let Some((concept, targets)) = arc_targets(arc, &locators, &resources) else {
                continue;
            };
            for reference in targets {
                let role = reference
                    .attribute((ns::XLINK, "role"))
                    .unwrap_or(STANDARD_REFERENCE_ROLE);
                let record: Vec<ReferencePart> = reference
                    .children()
                    .filter(|part| part.is_element() && part.tag_name().namespace() == Some(ns::REF))
                    .map(|part| ReferencePart {
                        name: part.tag_name().name().to_string(),
                        value: part.text().unwrap_or("").to_string(),
                    })
                    .collect();
                if let Some(concept) = store.concept_mut(&concept) {
                    concept
                        .references
                        .entry(role.to_string())
                        .or_default()
                        .push(record);
                }
            }
        }
    }

    fn process_relationship_link(
        &mut self,
        link: Node<'_, '_>,
        kind: NetworkKind,
        source_file: &str,
        store: &mut TaxonomyStore,
    ) {
        let role = link
            .attribute((ns::XLINK, "role"))
            .unwrap_or("")
            .to_string();
        let locators = self.locator_map(link, store);

        let mut grouped: BTreeMap<ConceptId, Vec<Relationship>> = BTreeMap::new();
        for arc in xml::children(link, ns::LINK, kind.arc_name()) {
            let (Some(from), Some(to)) = (
                arc.attribute((ns::XLINK, "from")),
                arc.attribute((ns::XLINK, "to")),
            ) else {
                continue;
            };
            let (Some(parent), Some(child)) = (locators.get(from), locators.get(to)) else {
                tracing::debug!("Dropping {} arc with dangling endpoint", kind.arc_name());
                continue;
            };

            let relationship = build_relationship(arc, kind, child.clone());

            if kind == NetworkKind::Definition {
                if let Some(arcrole) = arc.attribute((ns::XLINK, "arcrole")) {
                    dimension::record(store, parent, child, arcrole, &role, source_file);
                }
            }

            grouped.entry(parent.clone()).or_default().push(relationship);
        }

        // Network index first: it wants the raw per-link batches and the
        // union of every locator target in the link.
        let mut network_relationships = grouped.clone();
        for bucket in network_relationships.values_mut() {
            crate::store::sort_bucket(bucket);
        }
        store.register_network(
            kind,
            &role,
            Network {
                concepts: locators.values().cloned().collect(),
                relationships: network_relationships,
                source_file: source_file.to_string(),
            },
        );

        for (parent, batch) in grouped {
            store.append_relationships(kind, &role, &parent, batch);
        }
    }
}

/// Resolve one arc's `from` to a concept and its `to` to the matching
/// resource nodes, or `None` when either end dangles.
fn arc_targets<'n, 'a, 'input>(
    arc: Node<'_, '_>,
    locators: &HashMap<String, ConceptId>,
    resources: &'n HashMap<String, Vec<Node<'a, 'input>>>,
) -> Option<(ConceptId, &'n [Node<'a, 'input>])> {
    let from = arc.attribute((ns::XLINK, "from"))?;
    let to = arc.attribute((ns::XLINK, "to"))?;
    let concept = locators.get(from)?.clone();
    let targets = resources.get(to)?;
    Some((concept, targets.as_slice()))
}

/// Index a link's resources (`label` / `reference` elements) by their XLink
/// label, preserving document order within each entry.
fn resource_index<'a, 'input>(
    link: Node<'a, 'input>,
    local: &'static str,
) -> HashMap<String, Vec<Node<'a, 'input>>> {
    let mut resources: HashMap<String, Vec<Node<'a, 'input>>> = HashMap::new();
    for resource in xml::children(link, ns::LINK, local) {
        if let Some(label) = resource.attribute((ns::XLINK, "label")) {
            resources.entry(label.to_string()).or_default().push(resource);
        }
    }
    resources
}

fn build_relationship(arc: Node<'_, '_>, kind: NetworkKind, to: ConceptId) -> Relationship {
    let mut relationship = Relationship::new(to);
    if let Some(order) = arc.attribute("order") {
        match order.trim().parse::<f64>() {
            Ok(parsed) => relationship.order = parsed,
            Err(_) => tracing::debug!("Unparseable arc order {order:?}, keeping default"),
        }
    }
    relationship.preferred_label = arc.attribute("preferredLabel").unwrap_or("").to_string();

    match kind {
        NetworkKind::Calculation => {
            relationship.weight = arc.attribute("weight").and_then(|weight| {
                weight
                    .trim()
                    .parse::<f64>()
                    .map_err(|_| tracing::debug!("Unparseable arc weight {weight:?}, dropping"))
                    .ok()
            });
        }
        NetworkKind::Definition => {
            relationship.context_element =
                arc.attribute("contextElement").map(str::to_string);
            // xbrldt attributes may be spelled qualified or plain
            relationship.typed_domain_ref = arc
                .attribute((ns::XBRLDT, "typedDomainRef"))
                .or_else(|| arc.attribute("typedDomainRef"))
                .map(str::to_string);
            relationship.target_role = arc
                .attribute((ns::XBRLDT, "targetRole"))
                .or_else(|| arc.attribute("targetRole"))
                .map(str::to_string);
        }
        NetworkKind::Presentation => {}
    }
    relationship
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Concept, DimensionRelation};

    const LINKBASE_HEADER: &str = r#"xmlns:link="http://www.xbrl.org/2003/linkbase"
        xmlns:xlink="http://www.w3.org/1999/xlink"
        xmlns:xml="http://www.w3.org/XML/1998/namespace""#;

    fn store_with(names: &[&str]) -> TaxonomyStore {
        let mut store = TaxonomyStore::new();
        for name in names {
            store.insert_concept(Concept::new("urn:A", name, "/mirror/a.xsd".into()));
        }
        store
    }

    fn extract_str(linkbase: &str, store: &mut TaxonomyStore) {
        let resolver = PathResolver::new("/mirror", vec![]);
        let mut concepts = ConceptResolver::new(PathBuf::from("/mirror"));
        let doc = Document::parse(linkbase).unwrap();
        LinkbaseExtractor::new(&resolver, &mut concepts).extract(
            &doc,
            Path::new("/mirror/a-linkbase.xml"),
            store,
        );
    }

    #[test]
    fn test_label_attachment_and_defaults() {
        let mut store = store_with(&["X"]);
        let linkbase = format!(
            r#"<link:linkbase {LINKBASE_HEADER}>
                <link:labelLink xlink:role="http://www.xbrl.org/2003/role/link">
                    <link:loc xlink:href="a.xsd#X" xlink:label="lx"/>
                    <link:label xlink:label="ll">Revenue</link:label>
                    <link:labelArc xlink:from="lx" xlink:to="ll"/>
                </link:labelLink>
            </link:linkbase>"#
        );
        extract_str(&linkbase, &mut store);
        let concept = store.concept("urn:A#X").unwrap();
        assert_eq!(concept.labels["en"][STANDARD_LABEL_ROLE], "Revenue");
    }

    #[test]
    fn test_label_last_write_wins() {
        let mut store = store_with(&["X"]);
        let linkbase = format!(
            r#"<link:linkbase {LINKBASE_HEADER}>
                <link:labelLink>
                    <link:loc xlink:href="a.xsd#X" xlink:label="lx"/>
                    <link:label xlink:label="ll" xml:lang="en">First</link:label>
                    <link:label xlink:label="ll" xml:lang="en">Second</link:label>
                    <link:labelArc xlink:from="lx" xlink:to="ll"/>
                </link:labelLink>
            </link:linkbase>"#
        );
        extract_str(&linkbase, &mut store);
        let concept = store.concept("urn:A#X").unwrap();
        assert_eq!(concept.labels["en"][STANDARD_LABEL_ROLE], "Second");
    }

    #[test]
    fn test_label_languages_and_roles_kept_apart() {
        let mut store = store_with(&["X"]);
        let terse = "http://www.xbrl.org/2003/role/terseLabel";
        let linkbase = format!(
            r#"<link:linkbase {LINKBASE_HEADER}>
                <link:labelLink>
                    <link:loc xlink:href="a.xsd#X" xlink:label="lx"/>
                    <link:label xlink:label="ll" xml:lang="en">Revenue</link:label>
                    <link:label xlink:label="ll" xml:lang="de">Umsatz</link:label>
                    <link:label xlink:label="ll" xlink:role="{terse}">Rev</link:label>
                    <link:labelArc xlink:from="lx" xlink:to="ll"/>
                </link:labelLink>
            </link:linkbase>"#
        );
        extract_str(&linkbase, &mut store);
        let labels = &store.concept("urn:A#X").unwrap().labels;
        assert_eq!(labels["en"][STANDARD_LABEL_ROLE], "Revenue");
        assert_eq!(labels["de"][STANDARD_LABEL_ROLE], "Umsatz");
        assert_eq!(labels["en"][terse], "Rev");
    }

    #[test]
    fn test_reference_parts_in_order() {
        let mut store = store_with(&["X"]);
        let linkbase = format!(
            r#"<link:linkbase {LINKBASE_HEADER} xmlns:ref="http://www.xbrl.org/2006/ref">
                <link:referenceLink>
                    <link:loc xlink:href="a.xsd#X" xlink:label="lx"/>
                    <link:reference xlink:label="lr">
                        <ref:Publisher>FASB</ref:Publisher>
                        <ref:Name>Accounting Standards Codification</ref:Name>
                        <ref:Topic>605</ref:Topic>
                    </link:reference>
                    <link:referenceArc xlink:from="lx" xlink:to="lr"/>
                </link:referenceLink>
            </link:linkbase>"#
        );
        extract_str(&linkbase, &mut store);
        let references = &store.concept("urn:A#X").unwrap().references;
        let records = &references[STANDARD_REFERENCE_ROLE];
        assert_eq!(records.len(), 1);
        let names: Vec<_> = records[0].iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Publisher", "Name", "Topic"]);
        assert_eq!(records[0][0].value, "FASB");
    }

    #[test]
    fn test_presentation_children_sorted_by_order() {
        let mut store = store_with(&["P", "C1", "C2", "C3"]);
        let role = "http://example.com/role/R";
        let linkbase = format!(
            r#"<link:linkbase {LINKBASE_HEADER}>
                <link:presentationLink xlink:role="{role}">
                    <link:loc xlink:href="a.xsd#P" xlink:label="p"/>
                    <link:loc xlink:href="a.xsd#C1" xlink:label="c1"/>
                    <link:loc xlink:href="a.xsd#C2" xlink:label="c2"/>
                    <link:loc xlink:href="a.xsd#C3" xlink:label="c3"/>
                    <link:presentationArc xlink:from="p" xlink:to="c3" order="3"/>
                    <link:presentationArc xlink:from="p" xlink:to="c1" order="1"/>
                    <link:presentationArc xlink:from="p" xlink:to="c2" order="2"/>
                </link:presentationLink>
            </link:linkbase>"#
        );
        extract_str(&linkbase, &mut store);
        let bucket = &store.concept("urn:A#P").unwrap().presentation[role];
        let children: Vec<_> = bucket.iter().map(|r| r.to.as_str()).collect();
        assert_eq!(children, ["urn:A#C1", "urn:A#C2", "urn:A#C3"]);

        let network = store.network(NetworkKind::Presentation, role).unwrap();
        assert_eq!(network.concepts.len(), 4);
        assert_eq!(network.source_file, "/mirror/a-linkbase.xml");
    }

    #[test]
    fn test_calculation_weight() {
        let mut store = store_with(&["Total", "Discount"]);
        let linkbase = format!(
            r#"<link:linkbase {LINKBASE_HEADER}>
                <link:calculationLink xlink:role="http://example.com/role/R">
                    <link:loc xlink:href="a.xsd#Total" xlink:label="t"/>
                    <link:loc xlink:href="a.xsd#Discount" xlink:label="d"/>
                    <link:calculationArc xlink:from="t" xlink:to="d" weight="-1"/>
                </link:calculationLink>
            </link:linkbase>"#
        );
        extract_str(&linkbase, &mut store);
        let bucket = &store.concept("urn:A#Total").unwrap().calculation["http://example.com/role/R"];
        assert_eq!(bucket.len(), 1);
        assert_eq!(bucket[0].to, "urn:A#Discount");
        assert_eq!(bucket[0].order, 1.0);
        assert_eq!(bucket[0].weight, Some(-1.0));
    }

    #[test]
    fn test_definition_arc_attributes() {
        let mut store = store_with(&["Item", "Table"]);
        let linkbase = format!(
            r#"<link:linkbase {LINKBASE_HEADER} xmlns:xbrldt="http://xbrl.org/2005/xbrldt">
                <link:definitionLink xlink:role="http://example.com/role/R">
                    <link:loc xlink:href="a.xsd#Item" xlink:label="i"/>
                    <link:loc xlink:href="a.xsd#Table" xlink:label="t"/>
                    <link:definitionArc xlink:from="i" xlink:to="t"
                        xlink:arcrole="http://xbrl.org/int/dim/arcrole/all"
                        contextElement="segment"
                        xbrldt:targetRole="http://example.com/role/Other"/>
                </link:definitionLink>
            </link:linkbase>"#
        );
        extract_str(&linkbase, &mut store);
        let bucket = &store.concept("urn:A#Item").unwrap().definition["http://example.com/role/R"];
        assert_eq!(bucket[0].context_element.as_deref(), Some("segment"));
        assert_eq!(
            bucket[0].target_role.as_deref(),
            Some("http://example.com/role/Other")
        );

        let node = store.dimension("urn:A#Item").unwrap();
        assert!(node.related[&DimensionRelation::Hypercube].contains("urn:A#Table"));
        assert!(node.roles.contains("http://example.com/role/R"));
    }

    #[test]
    fn test_dangling_arc_dropped() {
        let mut store = store_with(&["P"]);
        let linkbase = format!(
            r#"<link:linkbase {LINKBASE_HEADER}>
                <link:presentationLink xlink:role="http://example.com/role/R">
                    <link:loc xlink:href="a.xsd#P" xlink:label="p"/>
                    <link:loc xlink:href="a.xsd#Ghost" xlink:label="g"/>
                    <link:presentationArc xlink:from="p" xlink:to="g"/>
                    <link:presentationArc xlink:from="p" xlink:to="nobody"/>
                </link:presentationLink>
            </link:linkbase>"#
        );
        extract_str(&linkbase, &mut store);
        // Ghost is not a declared concept: its locator and both arcs drop
        let concept = store.concept("urn:A#P").unwrap();
        assert!(concept.presentation.is_empty());
    }

    #[test]
    fn test_unparseable_order_keeps_default() {
        let mut store = store_with(&["P", "C"]);
        let linkbase = format!(
            r#"<link:linkbase {LINKBASE_HEADER}>
                <link:presentationLink xlink:role="http://example.com/role/R">
                    <link:loc xlink:href="a.xsd#P" xlink:label="p"/>
                    <link:loc xlink:href="a.xsd#C" xlink:label="c"/>
                    <link:presentationArc xlink:from="p" xlink:to="c" order="abc"/>
                </link:presentationLink>
            </link:linkbase>"#
        );
        extract_str(&linkbase, &mut store);
        let bucket = &store.concept("urn:A#P").unwrap().presentation["http://example.com/role/R"];
        assert_eq!(bucket[0].order, 1.0);
    }

    #[test]
    fn test_concept_resolver_requires_known_concept() {
        let store = store_with(&["X"]);
        let resolver = PathResolver::new("/mirror", vec![]);
        let mut concepts = ConceptResolver::new(PathBuf::from("/mirror"));
        assert_eq!(
            concepts.resolve("a.xsd#X", &store, &resolver),
            Some("urn:A#X".to_string())
        );
        assert_eq!(concepts.resolve("a.xsd#Missing", &store, &resolver), None);
        assert_eq!(concepts.resolve("a.xsd", &store, &resolver), None);
        assert_eq!(concepts.resolve("#X", &store, &resolver), None);
    }

    #[test]
    fn test_concept_resolver_reads_target_namespace() {
        use std::fs;
        let tmp = tempfile::TempDir::new().unwrap();
        let schema_path = tmp.path().join("b.xsd");
        fs::write(
            &schema_path,
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" targetNamespace="urn:B">
                <xs:element name="Leaf"/>
            </xs:schema>"#,
        )
        .unwrap();

        let mut store = TaxonomyStore::new();
        // the concept is known, but under a source path the suffix match
        // cannot see from this href spelling
        store.insert_concept(Concept::new("urn:B", "Leaf", "elsewhere/renamed.xsd".into()));

        let resolver = PathResolver::new(tmp.path(), vec![]);
        let mut concepts = ConceptResolver::new(tmp.path().to_path_buf());
        assert_eq!(
            concepts.resolve("b.xsd#Leaf", &store, &resolver),
            Some("urn:B#Leaf".to_string())
        );
    }
}
