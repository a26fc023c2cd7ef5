//! Document extraction and traversal.
//!
//! This module turns parsed taxonomy documents into
//! [`TaxonomyStore`](crate::store::TaxonomyStore) content:
//!
//! - [`TaxonomyLoader`] - orchestrates the traversal from one entry-point
//!   schema over imports, includes, and linkbase references
//! - [`schema`] - harvests concepts, inline types, and role catalogs from
//!   XSD documents
//! - [`linkbase`] - joins XLink `loc`/`arc`/resource triples into labels,
//!   references, and typed relationship edges
//! - [`dimension`] - classifies definition arcs into the hypercube →
//!   dimension → domain → member subgraph
//! - [`LoadDiagnostic`] / [`LoadSummary`] - recoverable-condition reporting
//!
//! Extraction is monotonic (set and map insertions, with edge buckets
//! re-sorted deterministically), so the traversal order the loader happens
//! to use never changes the frozen result.

pub mod diagnostic;
pub mod dimension;
pub mod linkbase;
pub mod loader;
pub mod schema;

pub use diagnostic::{LoadDiagnostic, LoadSummary};
pub use linkbase::{ConceptResolver, LinkbaseExtractor};
pub use loader::TaxonomyLoader;
pub use schema::SchemaHarvest;
