//! Batched, transactional loading of nodes and relationships.
//!
//! Each pass re-opens the input, streams one element kind, groups records by
//! their decorated label into batches of [`BATCH_SIZE`] and sends every full
//! batch to the sink as a single bulk statement. The open transaction is
//! committed and reopened every [`TRANSACTION_SIZE`] records so that no
//! transaction grows without bound. Server ids returned by the node pass are
//! kept in an [`IdentityMap`] and used to resolve edge endpoints.

use crate::labels::{relationship_type, LabelOptions};
use anyhow::{Context, Result};
use graphml::{read_edge, read_node, PropertySchema, TagScanner};
use neo4j_sink::{EdgeRow, GraphSink, NodeRow};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Maximum number of records sent in one bulk statement.
pub const BATCH_SIZE: usize = 1000;

/// Records between two progress log lines.
pub const PROGRESS_INTERVAL: u64 = 5000;

/// Records between two transaction commits.
pub const TRANSACTION_SIZE: u64 = 20000;

/// File-local node id to server-assigned node id.
pub type IdentityMap = HashMap<String, i64>;

/// Outcome of the node pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodePassStats {
    /// `<node>` elements read from the input.
    pub read: u64,
    /// Nodes the server reported as created.
    pub created: u64,
}

/// Outcome of the edge pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EdgePassStats {
    /// `<edge>` elements read from the input.
    pub read: u64,
    /// Edges whose source or target did not resolve to a created node.
    pub unresolved: u64,
}

impl EdgePassStats {
    /// Edges sent with both endpoints resolved.
    pub fn resolved(&self) -> u64 {
        self.read - self.unresolved
    }
}

/// Roll back the open transaction after `error`, keeping `error` as the
/// result even if the rollback itself fails.
pub(crate) async fn abort<S: GraphSink>(sink: &mut S, error: anyhow::Error) -> anyhow::Error {
    if let Err(rollback_error) = sink.rollback_transaction().await {
        warn!("Rollback after failure did not succeed: {rollback_error:#}");
    }
    error
}

/// Loads the nodes and edges of one GraphML file into a [`GraphSink`].
pub struct GraphLoader<'a, S: GraphSink> {
    sink: &'a mut S,
    input: PathBuf,
    labels: LabelOptions,
    schema: PropertySchema,
    identities: IdentityMap,
}

impl<'a, S: GraphSink> GraphLoader<'a, S> {
    pub fn new(sink: &'a mut S, input: &Path, labels: LabelOptions, schema: PropertySchema) -> Self {
        Self {
            sink,
            input: input.to_path_buf(),
            labels,
            schema,
            identities: IdentityMap::new(),
        }
    }

    pub fn identities(&self) -> &IdentityMap {
        &self.identities
    }

    pub fn schema(&self) -> &PropertySchema {
        &self.schema
    }

    /// Stream all nodes into the sink. `expected` is only used for progress
    /// reporting.
    pub async fn load_nodes(&mut self, expected: u64) -> Result<NodePassStats> {
        info!("Importing nodes...");
        self.sink.begin_transaction().await?;
        match self.node_pass(expected).await {
            Ok(stats) => {
                info!("Imported {} of {} nodes", stats.created, stats.read);
                Ok(stats)
            }
            Err(e) => Err(abort(&mut *self.sink, e).await),
        }
    }

    async fn node_pass(&mut self, expected: u64) -> Result<NodePassStats> {
        let mut scanner = TagScanner::open(&self.input, "node")?;
        let mut batches: BTreeMap<String, Vec<NodeRow>> = BTreeMap::new();
        let mut stats = NodePassStats::default();

        while let Some(element) = scanner.next_match()? {
            let node = read_node(&mut scanner, &element, &mut self.schema)?;
            let labels = self.labels.transform_node_labels(&node.labels);

            let batch = batches.entry(labels.clone()).or_default();
            batch.push(NodeRow {
                id: node.id,
                properties: node.properties,
            });
            if batch.len() >= BATCH_SIZE {
                let rows = std::mem::take(batch);
                stats.created += self.create_nodes(&labels, &rows).await?;
            }

            stats.read += 1;
            self.checkpoint("Nodes", stats.read, expected).await?;
        }
        drop(scanner);

        for (labels, rows) in &batches {
            if !rows.is_empty() {
                stats.created += self.create_nodes(labels, rows).await?;
            }
        }
        self.sink.commit_transaction().await?;
        Ok(stats)
    }

    async fn create_nodes(&mut self, labels: &str, rows: &[NodeRow]) -> Result<u64> {
        let ids = self
            .sink
            .create_nodes(labels, rows)
            .await
            .with_context(|| format!("Failed to create nodes with labels '{labels}'"))?;
        let created = ids.len() as u64;
        debug!("Created {created} nodes with labels '{labels}'");
        self.identities.extend(ids);
        Ok(created)
    }

    /// Stream all edges into the sink, resolving endpoints through the ids
    /// collected by [`load_nodes`](Self::load_nodes).
    pub async fn load_edges(&mut self, expected: u64) -> Result<EdgePassStats> {
        info!("Importing edges...");
        self.sink.begin_transaction().await?;
        match self.edge_pass(expected).await {
            Ok(stats) => {
                if stats.unresolved > 0 {
                    warn!(
                        "{} of {} edges reference unknown nodes and were not created",
                        stats.unresolved, stats.read
                    );
                }
                info!("Imported {} of {} edges", stats.resolved(), stats.read);
                Ok(stats)
            }
            Err(e) => Err(abort(&mut *self.sink, e).await),
        }
    }

    async fn edge_pass(&mut self, expected: u64) -> Result<EdgePassStats> {
        let mut scanner = TagScanner::open(&self.input, "edge")?;
        let mut batches: BTreeMap<String, Vec<EdgeRow>> = BTreeMap::new();
        let mut stats = EdgePassStats::default();

        while let Some(element) = scanner.next_match()? {
            let edge = read_edge(&mut scanner, &element, &mut self.schema)?;
            let label = self.labels.transform_edge_label(&edge.label);
            let relationship = relationship_type(&label).to_string();

            let source = self.resolve(edge.source.as_deref());
            let target = self.resolve(edge.target.as_deref());
            if source.is_none() || target.is_none() {
                stats.unresolved += 1;
                debug!(
                    "Edge {}-[{relationship}]->{} has an unresolved endpoint",
                    edge.source.as_deref().unwrap_or("?"),
                    edge.target.as_deref().unwrap_or("?")
                );
            }

            let batch = batches.entry(relationship.clone()).or_default();
            batch.push(EdgeRow {
                source,
                target,
                properties: edge.properties,
            });
            if batch.len() >= BATCH_SIZE {
                let rows = std::mem::take(batch);
                self.create_edges(&relationship, &rows).await?;
            }

            stats.read += 1;
            self.checkpoint("Edges", stats.read, expected).await?;
        }
        drop(scanner);

        for (relationship, rows) in &batches {
            if !rows.is_empty() {
                self.create_edges(relationship, rows).await?;
            }
        }
        self.sink.commit_transaction().await?;
        Ok(stats)
    }

    async fn create_edges(&mut self, relationship: &str, rows: &[EdgeRow]) -> Result<()> {
        self.sink
            .create_edges(relationship, rows)
            .await
            .with_context(|| format!("Failed to create relationships of type '{relationship}'"))?;
        debug!("Sent {} relationships of type '{relationship}'", rows.len());
        Ok(())
    }

    fn resolve(&self, id: Option<&str>) -> Option<i64> {
        id.and_then(|id| self.identities.get(id).copied())
    }

    /// Progress logging and periodic commit after `count` records.
    async fn checkpoint(&mut self, kind: &str, count: u64, expected: u64) -> Result<()> {
        if count % PROGRESS_INTERVAL == 0 {
            info!("{kind} progress: {count}/{expected}");
        }
        if count % TRANSACTION_SIZE == 0 {
            self.sink.commit_transaction().await?;
            self.sink.begin_transaction().await?;
        }
        Ok(())
    }
}
