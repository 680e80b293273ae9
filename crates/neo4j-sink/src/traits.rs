//! GraphSink trait definition.
//!
//! The loader and index provisioner are written against this trait, so the
//! whole import pipeline can run against a live Neo4j server or an in-memory
//! recorder in tests.

use anyhow::Result;
use graphml::Properties;
use neo4j_version::{CatalogLabelField, IndexCreation, ServerInfo};

/// A node queued for creation.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeRow {
    /// File-local id, echoed back with the server id after creation.
    pub id: String,
    pub properties: Properties,
}

/// A relationship queued for creation.
///
/// Endpoints are server-assigned node ids. A `None` endpoint matches no node,
/// so the row creates nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeRow {
    pub source: Option<i64>,
    pub target: Option<i64>,
    pub properties: Properties,
}

/// One row of the server's index catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub labels: Vec<String>,
    pub properties: Vec<String>,
}

/// Trait for writing an imported graph to Neo4j.
///
/// Write operations run inside the transaction opened by
/// [`begin_transaction`](GraphSink::begin_transaction); at most one
/// transaction is open at a time.
///
/// # Usage Pattern
///
/// ```ignore
/// pub async fn load<S: GraphSink>(sink: &mut S, rows: &[NodeRow]) -> Result<()> {
///     sink.begin_transaction().await?;
///     let ids = sink.create_nodes(":Person", rows).await?;
///     sink.commit_transaction().await
/// }
/// ```
#[async_trait::async_trait]
pub trait GraphSink: Send {
    /// Kernel version and edition of the connected server.
    async fn server_info(&mut self) -> Result<ServerInfo>;

    async fn begin_transaction(&mut self) -> Result<()>;

    async fn commit_transaction(&mut self) -> Result<()>;

    /// Roll back the open transaction. A no-op if none is open.
    async fn rollback_transaction(&mut self) -> Result<()>;

    /// Create one node per row, all carrying `labels` (a colon-delimited label
    /// string such as `:A:B`, possibly empty).
    ///
    /// Returns `(file id, server id)` pairs for the created nodes.
    async fn create_nodes(&mut self, labels: &str, nodes: &[NodeRow]) -> Result<Vec<(String, i64)>>;

    /// Create one relationship of `relationship_type` per row whose endpoints
    /// both exist.
    async fn create_edges(&mut self, relationship_type: &str, edges: &[EdgeRow]) -> Result<()>;

    /// Read the index catalog, taking labels from `label_field`.
    async fn list_indexes(&mut self, label_field: CatalogLabelField) -> Result<Vec<CatalogEntry>>;

    /// Create a single-property index using the given dialect.
    async fn create_index(
        &mut self,
        dialect: IndexCreation,
        label: &str,
        property: &str,
    ) -> Result<()>;
}
