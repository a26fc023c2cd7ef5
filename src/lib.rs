//! # dts-core
//!
//! A Rust library for loading an XBRL taxonomy (a discoverable taxonomy
//! set of XML Schema and XLink linkbase documents) into a consolidated,
//! denormalized concept graph.
//!
//! ## Overview
//!
//! Starting from one entry-point schema, dts-core crawls the transitive
//! closure of `xs:import`, `xs:include`, and `link:linkbaseRef` references,
//! harvesting:
//!
//! - **Concepts**: every named element declaration, with schema attributes
//!   (`abstract`, `periodType`, `balance`, ...) and inline type definitions
//! - **Labels and references**: XLink resources joined to concepts through
//!   locator/arc resolution
//! - **Relationship networks**: presentation, calculation, and definition
//!   hierarchies keyed by extended-link role, ordered by arc `order`
//! - **Dimensional structure**: hypercube → dimension → domain → member
//!   trees classified from definition arcroles
//! - **Role catalogs**: `roleType` / `arcroleType` declarations by URI
//!
//! All remote references resolve to already-local files through a
//! configurable URL prefix table; nothing is fetched over the network.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dts_core::{codec::TaxonomyLoader, config::LoaderConfig, writer::TaxonomyWriter};
//!
//! fn main() -> Result<(), dts_core::DtsError> {
//!     let config = LoaderConfig::new(
//!         "/data/us-gaap-2024",
//!         "entire/us-gaap-entryPoint-all-2024.xsd",
//!     );
//!     let taxonomy = TaxonomyLoader::load(config)?;
//!
//!     // Look up a concept
//!     if let Some(concept) = taxonomy.concepts.get("http://fasb.org/us-gaap/2024#Assets") {
//!         println!("{}: {:?}", concept.name, concept.period_type);
//!     }
//!
//!     // Serialize the artifacts
//!     TaxonomyWriter::new(&taxonomy, "/data/out")?.write_all()?;
//!     Ok(())
//! }
//! ```
//!
//! ## Error Tolerance
//!
//! The loader is a best-effort harvester. Missing files, malformed XML, and
//! dangling XLink references are reported as
//! [`codec::LoadDiagnostic`]s, logged, and skipped; traversal always runs to
//! completion. Callers needing strictness validate the returned
//! [`model::Taxonomy`] themselves:
//!
//! ```rust,no_run
//! # use dts_core::{codec::TaxonomyLoader, config::LoaderConfig};
//! let mut loader = TaxonomyLoader::new(LoaderConfig::new("/data", "entry.xsd"));
//! loader.run();
//! if loader.summary().resolution_misses > 0 {
//!     eprintln!("incomplete DTS: {}", loader.summary());
//! }
//! let taxonomy = loader.finish();
//! ```
//!
//! ## Module Guide
//!
//! Start with [`codec::TaxonomyLoader`] for loading, then [`model`] for the
//! data shapes. [`writer`] and [`stats`] consume the frozen result;
//! [`paths`] holds the URL↔filesystem remapping.

pub mod codec;
pub mod config;
pub mod error;
pub mod model;
pub mod paths;
pub mod stats;
pub mod store;
pub mod writer;
pub mod xml;

pub use error::*;
