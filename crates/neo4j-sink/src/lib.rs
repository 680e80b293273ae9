//! Neo4j sink for GraphML imports.
//!
//! [`GraphSink`] is the seam between the import pipeline and the database.
//! [`Neo4jSink`] implements it over Bolt; Cypher text lives in [`cypher`] and
//! parameter conversion in [`convert`].

pub mod client;
pub mod convert;
pub mod cypher;
pub mod traits;

pub use client::{ConnectionConfig, Neo4jSink};
pub use traits::{CatalogEntry, EdgeRow, GraphSink, NodeRow};
