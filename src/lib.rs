//! GraphML to Neo4j importer.
//!
//! Streams a GraphML document (optionally gzip-compressed) into a running
//! Neo4j database without holding the graph in memory.
//!
//! An import runs these passes, each re-reading the input:
//!
//! 1. count `<node>` and `<edge>` elements for progress reporting
//! 2. read `<key>` declarations into the property schema
//! 3. create nodes in per-label batches and remember their server ids
//! 4. create relationships between the recorded nodes
//! 5. create the requested indexes
//!
//! # CLI Usage
//!
//! ```bash
//! graphml-neo4j-importer \
//!   --input graph.graphml.gz \
//!   --endpoint bolt://localhost:7687 \
//!   --username neo4j --password secret \
//!   --label-prefix Src_ \
//!   --indices "Gene.id;Drug.name"
//! ```

use anyhow::Result;
use clap::Parser;
use graphml::{count_elements, load_schema, GraphmlError, PropertySchema};
use neo4j_sink::{ConnectionConfig, GraphSink, Neo4jSink};
use std::path::{Path, PathBuf};

pub mod indexes;
pub mod labels;
pub mod loader;
pub mod update_check;

pub use indexes::{ensure_indexes, parse_index_requests, IndexReport, IndexRequests};
pub use labels::{parse_toggle, relationship_type, LabelOptions};
pub use loader::{GraphLoader, IdentityMap, BATCH_SIZE, PROGRESS_INTERVAL, TRANSACTION_SIZE};

#[derive(Parser, Clone, Debug)]
#[command(name = "graphml-neo4j-importer")]
#[command(about = "Import a GraphML file into a Neo4j database")]
pub struct ImportOpts {
    /// GraphML input file; `.gz` files are decompressed on the fly
    #[arg(short, long)]
    pub input: PathBuf,

    /// Neo4j Bolt endpoint
    #[arg(short, long, env = "NEO4J_ENDPOINT")]
    pub endpoint: String,

    /// Neo4j username; leave empty for servers without authentication
    #[arg(long, env = "NEO4J_USERNAME")]
    pub username: Option<String>,

    /// Neo4j password
    #[arg(long, env = "NEO4J_PASSWORD")]
    pub password: Option<String>,

    /// Target database
    #[arg(long, default_value = "neo4j", env = "NEO4J_DATABASE")]
    pub database: String,

    /// Prefix added to every node label and relationship type
    #[arg(long)]
    pub label_prefix: Option<String>,

    /// Suffix added to every node label and relationship type
    #[arg(long)]
    pub label_suffix: Option<String>,

    /// Apply prefix/suffix to node labels ("false" or "0" to disable)
    #[arg(long, value_name = "BOOL")]
    pub modify_node_labels: Option<String>,

    /// Apply prefix/suffix to relationship types ("false" or "0" to disable)
    #[arg(long, value_name = "BOOL")]
    pub modify_edge_labels: Option<String>,

    /// Indexes to create after the import (format: "Label1.prop1;Label2.prop2")
    #[arg(long)]
    pub indices: Option<String>,

    /// Do not check GitHub for a newer release
    #[arg(long)]
    pub skip_update_check: bool,
}

impl ImportOpts {
    pub fn label_options(&self) -> LabelOptions {
        LabelOptions {
            decorate_node_labels: parse_toggle(self.modify_node_labels.as_deref()),
            decorate_edge_labels: parse_toggle(self.modify_edge_labels.as_deref()),
            prefix: self.label_prefix.clone(),
            suffix: self.label_suffix.clone(),
        }
    }

    pub fn index_requests(&self) -> IndexRequests {
        self.indices
            .as_deref()
            .map(parse_index_requests)
            .unwrap_or_default()
    }

    pub fn connection_config(&self) -> ConnectionConfig {
        let username = self.username.clone().unwrap_or_default();
        // Servers with authentication disabled ignore the credentials.
        let password = if username.is_empty() {
            String::new()
        } else {
            self.password.clone().unwrap_or_default()
        };
        ConnectionConfig {
            uri: self.endpoint.clone(),
            username,
            password,
            database: self.database.clone(),
        }
    }
}

/// Counts and property schema gathered before connecting to the database.
#[derive(Debug)]
pub struct ImportPlan {
    pub input: PathBuf,
    pub nodes_total: u64,
    pub edges_total: u64,
    pub schema: PropertySchema,
}

impl ImportPlan {
    /// Run the counting and schema passes over `input`.
    pub fn scan(input: &Path) -> Result<Self> {
        if !input.exists() {
            return Err(GraphmlError::InputNotFound(input.to_path_buf()).into());
        }

        tracing::info!("Parsing property definitions...");
        let nodes_total = count_elements(input, "node")?;
        let edges_total = count_elements(input, "edge")?;
        tracing::info!("{nodes_total} nodes, {edges_total} edges");

        let schema = load_schema(input)?;
        tracing::info!("Found {} property definitions", schema.len());

        Ok(Self {
            input: input.to_path_buf(),
            nodes_total,
            edges_total,
            schema,
        })
    }
}

/// Totals of a finished import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub nodes_total: u64,
    pub edges_total: u64,
    pub nodes_imported: u64,
    pub edges_imported: u64,
    pub unresolved_endpoints: u64,
    pub undeclared_properties: u64,
    pub indexes_created: u64,
    pub indexes_skipped: u64,
}

impl std::fmt::Display for ImportSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "nodes {}/{}, edges {}/{} ({} unresolved), {} undeclared properties, indexes {} created, {} skipped",
            self.nodes_imported,
            self.nodes_total,
            self.edges_imported,
            self.edges_total,
            self.unresolved_endpoints,
            self.undeclared_properties,
            self.indexes_created,
            self.indexes_skipped
        )
    }
}

/// Load a scanned input into `sink` and create the requested indexes.
pub async fn import_graph<S: GraphSink>(
    sink: &mut S,
    plan: ImportPlan,
    labels: LabelOptions,
    requested_indexes: &IndexRequests,
) -> Result<ImportSummary> {
    let server = sink.server_info().await?;

    let (nodes, edges, undeclared) = {
        let mut loader = GraphLoader::new(sink, &plan.input, labels, plan.schema);
        let nodes = loader.load_nodes(plan.nodes_total).await?;
        let edges = loader.load_edges(plan.edges_total).await?;
        (nodes, edges, loader.schema().fallback_count() as u64)
    };

    let indexes = ensure_indexes(sink, &server, requested_indexes).await?;

    let summary = ImportSummary {
        nodes_total: plan.nodes_total,
        edges_total: plan.edges_total,
        nodes_imported: nodes.created,
        edges_imported: edges.resolved(),
        unresolved_endpoints: edges.unresolved,
        undeclared_properties: undeclared,
        indexes_created: indexes.created,
        indexes_skipped: indexes.skipped,
    };
    tracing::info!("Import finished: {summary}");
    Ok(summary)
}

/// Run a complete import as configured on the command line.
pub async fn run_import(opts: &ImportOpts) -> Result<ImportSummary> {
    let plan = ImportPlan::scan(&opts.input)?;
    let mut sink = Neo4jSink::connect(&opts.connection_config()).await?;
    import_graph(&mut sink, plan, opts.label_options(), &opts.index_requests()).await
}
