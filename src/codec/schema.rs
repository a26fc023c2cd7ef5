//! Schema harvesting: concepts, inline types, role catalogs, and the
//! references that drive traversal.

use std::path::Path;

use roxmltree::{Document, Node};

use crate::{
    model::{
        ArcroleType, Balance, Concept, EnumValue, PeriodType, Restriction, RoleType,
        TypeAttribute, TypeElement, TypeInfo, TypeKind,
    },
    paths::os_path_to_string,
    store::TaxonomyStore,
    xml::{self, ns},
};

/// What one schema contributed to traversal: every `schemaLocation` from
/// `xs:import`/`xs:include` and every `linkbaseRef` href, in document order.
#[derive(Debug, Default)]
pub struct SchemaHarvest {
    pub schema_locations: Vec<String>,
    pub linkbase_refs: Vec<String>,
    pub concepts_added: usize,
}

/// Harvest one parsed schema into the store and report the references it
/// declares. Concepts are keyed `{targetNamespace}#{name}`; re-declarations
/// of an existing id are ignored.
pub fn extract(doc: &Document<'_>, source_path: &Path, store: &mut TaxonomyStore) -> SchemaHarvest {
    let root = doc.root_element();
    let target_namespace = root.attribute("targetNamespace").unwrap_or("");
    let source_file = os_path_to_string(source_path);

    let mut harvest = SchemaHarvest::default();

    for element in xml::descendants(root, ns::XS, "element") {
        let Some(name) = element.attribute("name") else {
            continue;
        };
        let concept = build_concept(element, name, target_namespace, &source_file);
        if store.insert_concept(concept) {
            harvest.concepts_added += 1;
        } else {
            tracing::debug!(
                "Ignoring re-declaration of {}#{name} in {source_file}",
                target_namespace
            );
        }
    }

    for role_type in xml::descendants(root, ns::LINK, "roleType") {
        extract_role_type(role_type, target_namespace, store);
    }
    for arcrole_type in xml::descendants(root, ns::LINK, "arcroleType") {
        extract_arcrole_type(arcrole_type, target_namespace, store);
    }

    for import in xml::descendants(root, ns::XS, "import") {
        if let Some(location) = import.attribute("schemaLocation") {
            harvest.schema_locations.push(location.to_string());
        }
    }
    for include in xml::descendants(root, ns::XS, "include") {
        if let Some(location) = include.attribute("schemaLocation") {
            harvest.schema_locations.push(location.to_string());
        }
    }
    for linkbase_ref in xml::descendants(root, ns::LINK, "linkbaseRef") {
        if let Some(href) = linkbase_ref.attribute((ns::XLINK, "href")) {
            harvest.linkbase_refs.push(href.to_string());
        }
    }

    harvest
}

fn build_concept(
    element: Node<'_, '_>,
    name: &str,
    target_namespace: &str,
    source_file: &str,
) -> Concept {
    let mut concept = Concept::new(target_namespace, name, source_file.to_string());
    concept.is_abstract = xml::bool_attr(element, "abstract");
    concept.nillable = xml::bool_attr(element, "nillable");
    concept.substitution_group = element
        .attribute("substitutionGroup")
        .unwrap_or("")
        .to_string();
    concept.concept_type = element.attribute("type").unwrap_or("").to_string();

    // periodType / balance arrive under whatever prefix the document binds
    // for the instance namespace; match on the local name alone.
    if let Some(value) = xml::attr_by_local(element, "periodType") {
        concept.period_type = PeriodType::parse(value);
    }
    if let Some(value) = xml::attr_by_local(element, "balance") {
        concept.balance = Balance::parse(value);
    }

    let inline_type = xml::children(element, ns::XS, "complexType")
        .next()
        .or_else(|| xml::children(element, ns::XS, "simpleType").next());
    if let Some(type_node) = inline_type {
        concept.custom_type = Some(extract_type_info(type_node));
    }

    concept
}

/// Pull an inline `complexType`/`simpleType` apart into the closed
/// [`TypeInfo`] shape.
fn extract_type_info(type_node: Node<'_, '_>) -> TypeInfo {
    let kind = if type_node.tag_name().name() == "complexType" {
        TypeKind::ComplexType
    } else {
        TypeKind::SimpleType
    };

    let attributes = xml::descendants(type_node, ns::XS, "attribute")
        .filter_map(|attribute| {
            attribute.attribute("name").map(|name| TypeAttribute {
                name: name.to_string(),
                attr_type: attribute.attribute("type").map(str::to_string),
                attr_use: attribute.attribute("use").unwrap_or("optional").to_string(),
            })
        })
        .collect();

    let elements = xml::descendants(type_node, ns::XS, "element")
        .filter_map(|child| {
            child.attribute("name").map(|name| TypeElement {
                name: name.to_string(),
                element_type: child.attribute("type").map(str::to_string),
                min_occurs: child.attribute("minOccurs").unwrap_or("1").to_string(),
                max_occurs: child.attribute("maxOccurs").unwrap_or("1").to_string(),
            })
        })
        .collect();

    let restriction = xml::descendants(type_node, ns::XS, "restriction")
        .next()
        .map(extract_restriction);

    let union_members = xml::descendants(type_node, ns::XS, "union")
        .next()
        .and_then(|union| union.attribute("memberTypes"))
        .map(|members| members.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default();

    TypeInfo {
        kind,
        attributes,
        elements,
        restriction,
        union_members,
    }
}

fn extract_restriction(restriction: Node<'_, '_>) -> Restriction {
    let base = restriction.attribute("base").unwrap_or("").to_string();

    let mut facets = std::collections::BTreeMap::new();
    for facet in restriction.children().filter(|c| {
        c.is_element()
            && c.tag_name().namespace() == Some(ns::XS)
            && c.tag_name().name() != "enumeration"
    }) {
        if let Some(value) = facet.attribute("value") {
            facets.insert(facet.tag_name().name().to_string(), value.to_string());
        }
    }

    let enumerations = xml::children(restriction, ns::XS, "enumeration")
        .filter_map(|enumeration| {
            enumeration.attribute("value").map(|value| EnumValue {
                value: value.to_string(),
                documentation: enumeration_documentation(enumeration),
            })
        })
        .collect();

    Restriction {
        base,
        facets,
        enumerations,
    }
}

fn enumeration_documentation(enumeration: Node<'_, '_>) -> Option<String> {
    xml::children(enumeration, ns::XS, "annotation")
        .next()
        .and_then(|annotation| xml::children(annotation, ns::XS, "documentation").next())
        .and_then(|documentation| documentation.text())
        .map(str::to_string)
}

fn extract_role_type(role_type: Node<'_, '_>, namespace: &str, store: &mut TaxonomyStore) {
    let (Some(id), Some(role_uri)) = (role_type.attribute("id"), role_type.attribute("roleURI"))
    else {
        return;
    };
    store.insert_role_type(RoleType {
        id: id.to_string(),
        role_uri: role_uri.to_string(),
        namespace: namespace.to_string(),
        definition: definition_text(role_type),
        used_on: used_on(role_type),
    });
}

fn extract_arcrole_type(arcrole_type: Node<'_, '_>, namespace: &str, store: &mut TaxonomyStore) {
    let (Some(id), Some(arcrole_uri)) = (
        arcrole_type.attribute("id"),
        arcrole_type.attribute("arcroleURI"),
    ) else {
        return;
    };
    store.insert_arcrole_type(ArcroleType {
        id: id.to_string(),
        arcrole_uri: arcrole_uri.to_string(),
        namespace: namespace.to_string(),
        definition: definition_text(arcrole_type),
        used_on: used_on(arcrole_type),
        cycles_allowed: arcrole_type
            .attribute("cyclesAllowed")
            .unwrap_or("none")
            .to_string(),
    });
}

fn definition_text(type_node: Node<'_, '_>) -> Option<String> {
    xml::children(type_node, ns::LINK, "definition")
        .next()
        .and_then(|definition| definition.text())
        .map(str::to_string)
}

fn used_on(type_node: Node<'_, '_>) -> Vec<String> {
    xml::children(type_node, ns::LINK, "usedOn")
        .filter_map(|used_on| used_on.text())
        .map(str::to_string)
        .collect()
}
