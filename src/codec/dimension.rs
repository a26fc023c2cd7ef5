//! Classification of definition arcs into the dimensional subgraph.
//!
//! XBRL Dimensions expresses hypercube structure through definition arcs
//! with well-known arcroles. Every definition arc flows through
//! [`record`]; the four standard arcroles additionally land in the
//! dimensional graph, anything else stays a plain definition edge.

use crate::{model::DimensionRelation, store::TaxonomyStore};

pub const ARCROLE_ALL: &str = "http://xbrl.org/int/dim/arcrole/all";
pub const ARCROLE_HYPERCUBE_DIMENSION: &str = "http://xbrl.org/int/dim/arcrole/hypercube-dimension";
pub const ARCROLE_DIMENSION_DOMAIN: &str = "http://xbrl.org/int/dim/arcrole/dimension-domain";
pub const ARCROLE_DOMAIN_MEMBER: &str = "http://xbrl.org/int/dim/arcrole/domain-member";

/// Map a definition arcrole onto the relation it contributes, if any.
pub fn classify(arcrole: &str) -> Option<DimensionRelation> {
    match arcrole {
        ARCROLE_ALL => Some(DimensionRelation::Hypercube),
        ARCROLE_HYPERCUBE_DIMENSION => Some(DimensionRelation::Dimension),
        ARCROLE_DIMENSION_DOMAIN => Some(DimensionRelation::Domain),
        ARCROLE_DOMAIN_MEMBER => Some(DimensionRelation::Member),
        _ => None,
    }
}

/// Record the dimensional relation for one definition arc. Returns whether
/// the arcrole was one of the standard dimensional arcroles.
pub fn record(
    store: &mut TaxonomyStore,
    from: &str,
    to: &str,
    arcrole: &str,
    role: &str,
    source_file: &str,
) -> bool {
    match classify(arcrole) {
        Some(relation) => {
            store.add_dimension(from, to, relation, role, source_file);
            true
        }
        None => false,
    }
}
