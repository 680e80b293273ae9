//! Neo4j sink backed by the `neo4rs` Bolt driver.

use crate::convert::{edge_batch, node_batch};
use crate::cypher;
use crate::traits::{CatalogEntry, EdgeRow, GraphSink, NodeRow};
use anyhow::{Context, Result};
use neo4j_version::{CatalogLabelField, IndexCreation, ServerInfo};
use neo4rs::{ConfigBuilder, Graph, Query, Txn};

/// Connection settings for [`Neo4jSink::connect`].
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Bolt endpoint, e.g. `bolt://localhost:7687`.
    pub uri: String,
    /// Empty for servers running without authentication.
    pub username: String,
    pub password: String,
    pub database: String,
}

/// [`GraphSink`] writing to a live Neo4j server.
pub struct Neo4jSink {
    graph: Graph,
    txn: Option<Txn>,
}

impl Neo4jSink {
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        tracing::debug!("Connecting to Neo4j at {}", config.uri);

        let config = ConfigBuilder::default()
            .uri(&config.uri)
            .user(config.username.clone())
            .password(config.password.clone())
            .db(config.database.clone())
            .build()
            .context("Invalid Neo4j connection settings")?;

        let graph = Graph::connect(config).context("Failed to connect to Neo4j")?;
        Ok(Self { graph, txn: None })
    }

    fn txn(&mut self) -> Result<&mut Txn> {
        self.txn
            .as_mut()
            .context("No open Neo4j transaction; call begin_transaction first")
    }
}

#[async_trait::async_trait]
impl GraphSink for Neo4jSink {
    async fn server_info(&mut self) -> Result<ServerInfo> {
        let mut result = self
            .graph
            .execute(Query::new(cypher::SERVER_COMPONENTS_QUERY.to_string()))
            .await
            .context("Failed to query Neo4j server components")?;

        let row = result
            .next()
            .await?
            .context("dbms.components() returned no rows")?;
        let version: String = row.get("version")?;
        let edition: String = row.get("edition")?;

        let info = ServerInfo::new(version, edition);
        tracing::info!("Detected Neo4j database version {info}");
        Ok(info)
    }

    async fn begin_transaction(&mut self) -> Result<()> {
        if self.txn.is_some() {
            anyhow::bail!("A Neo4j transaction is already open");
        }
        let txn = self
            .graph
            .start_txn()
            .await
            .context("Failed to start transaction")?;
        self.txn = Some(txn);
        Ok(())
    }

    async fn commit_transaction(&mut self) -> Result<()> {
        let txn = self
            .txn
            .take()
            .context("No open Neo4j transaction to commit")?;
        txn.commit().await.context("Failed to commit transaction")?;
        tracing::debug!("Transaction committed");
        Ok(())
    }

    async fn rollback_transaction(&mut self) -> Result<()> {
        if let Some(txn) = self.txn.take() {
            txn.rollback()
                .await
                .context("Failed to rollback transaction")?;
            tracing::debug!("Transaction rolled back");
        }
        Ok(())
    }

    async fn create_nodes(&mut self, labels: &str, nodes: &[NodeRow]) -> Result<Vec<(String, i64)>> {
        let query = Query::new(cypher::create_nodes_query(labels)).param("batch", node_batch(nodes));
        let txn = self.txn()?;

        let mut stream = txn
            .execute(query)
            .await
            .with_context(|| format!("Failed to create {} nodes with labels '{labels}'", nodes.len()))?;

        let mut ids = Vec::with_capacity(nodes.len());
        while let Some(row) = stream.next(txn.handle()).await? {
            let file_id: String = row.get("file_id")?;
            let node_id: i64 = row.get("node_id")?;
            ids.push((file_id, node_id));
        }

        tracing::debug!("Created {} nodes with labels '{labels}'", ids.len());
        Ok(ids)
    }

    async fn create_edges(&mut self, relationship_type: &str, edges: &[EdgeRow]) -> Result<()> {
        let query = Query::new(cypher::create_edges_query(relationship_type))
            .param("batch", edge_batch(edges));
        self.txn()?.run(query).await.with_context(|| {
            format!(
                "Failed to create {} relationships of type '{relationship_type}'",
                edges.len()
            )
        })?;

        tracing::debug!("Created up to {} relationships of type '{relationship_type}'", edges.len());
        Ok(())
    }

    async fn list_indexes(&mut self, label_field: CatalogLabelField) -> Result<Vec<CatalogEntry>> {
        let query = Query::new(cypher::list_indexes_query(label_field));
        let txn = self.txn()?;

        let mut stream = txn
            .execute(query)
            .await
            .context("Failed to read the index catalog")?;

        let mut entries = Vec::new();
        while let Some(row) = stream.next(txn.handle()).await? {
            let labels: Option<Vec<String>> = row.get("labels")?;
            let properties: Option<Vec<String>> = row.get("properties")?;
            entries.push(CatalogEntry {
                labels: labels.unwrap_or_default(),
                properties: properties.unwrap_or_default(),
            });
        }
        Ok(entries)
    }

    async fn create_index(
        &mut self,
        dialect: IndexCreation,
        label: &str,
        property: &str,
    ) -> Result<()> {
        let statement = cypher::create_index_statement(dialect, label, property);
        tracing::debug!("Neo4j index statement: {statement}");
        self.txn()?
            .run(Query::new(statement))
            .await
            .with_context(|| format!("Failed to create index on :{label}({property})"))
    }
}
