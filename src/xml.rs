//! Namespace-aware XML access for taxonomy documents.
//!
//! Thin adapter over [`roxmltree`]: the XBRL namespace table plus the
//! qualified-name lookups the extractors use. A parsed [`Document`] borrows
//! its source text, so both stay scoped to the processing of one file.

use std::path::Path;

use roxmltree::{Document, Node};

use crate::error::DtsError;

/// Namespace URIs used by XBRL taxonomy documents.
pub mod ns {
    /// XML Schema
    pub const XS: &str = "http://www.w3.org/2001/XMLSchema";
    /// XBRL instance (carries `periodType` / `balance`)
    pub const XBRLI: &str = "http://www.xbrl.org/2003/instance";
    /// XBRL linkbase
    pub const LINK: &str = "http://www.xbrl.org/2003/linkbase";
    /// XLink
    pub const XLINK: &str = "http://www.w3.org/1999/xlink";
    /// XBRL reference parts
    pub const REF: &str = "http://www.xbrl.org/2006/ref";
    /// XBRL Dimensions
    pub const XBRLDT: &str = "http://xbrl.org/2005/xbrldt";
    /// The `xml:` namespace (`xml:lang`)
    pub const XML: &str = "http://www.w3.org/XML/1998/namespace";
}

/// Read a document's bytes for parsing.
pub fn read_document<P: AsRef<Path>>(path: P) -> Result<String, DtsError> {
    tracing::debug!("Reading {:?}", path.as_ref());
    Ok(std::fs::read_to_string(path)?)
}

/// Parse a document, mapping syntax errors into [`DtsError::Xml`].
pub fn parse(text: &str) -> Result<Document<'_>, DtsError> {
    Ok(Document::parse(text)?)
}

/// Whether `node` is an element with the given namespace URI and local name.
pub fn is(node: Node<'_, '_>, ns_uri: &str, local: &str) -> bool {
    node.is_element()
        && node.tag_name().name() == local
        && node.tag_name().namespace() == Some(ns_uri)
}

/// Direct element children matching `(ns_uri, local)`.
pub fn children<'a, 'input>(
    node: Node<'a, 'input>,
    ns_uri: &'static str,
    local: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(move |c| is(*c, ns_uri, local))
}

/// All element descendants matching `(ns_uri, local)`, in document order.
pub fn descendants<'a, 'input>(
    node: Node<'a, 'input>,
    ns_uri: &'static str,
    local: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.descendants().filter(move |c| is(*c, ns_uri, local))
}

/// First attribute whose *local* name matches, regardless of prefix.
///
/// XBRL schemas spell `xbrli:periodType` with whatever prefix the document
/// declares; matching on the local name alone mirrors how consumers read it.
pub fn attr_by_local<'a>(node: Node<'a, '_>, local: &str) -> Option<&'a str> {
    node.attributes()
        .find(|a| a.name() == local)
        .map(|a| a.value())
}

/// Schema boolean: `true` or `1`.
pub fn bool_attr(node: Node<'_, '_>, name: &str) -> bool {
    matches!(node.attribute(name), Some("true") | Some("1"))
}
