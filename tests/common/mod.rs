//! Shared fixtures for import tests: GraphML writers and an in-memory sink.

#![allow(dead_code)]

use anyhow::Result;
use neo4j_sink::{CatalogEntry, EdgeRow, GraphSink, NodeRow};
use neo4j_version::{CatalogLabelField, IndexCreation, ServerInfo};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

pub const KEYS: &str = r#"
  <key id="d0" for="node" attr.name="name" attr.type="string"/>
  <key id="d1" for="node" attr.name="age" attr.type="int"/>
  <key id="d2" for="node" attr.name="tags" attr.type="string" attr.list="string"/>
  <key id="d3" for="node" attr.name="labels" attr.type="string"/>
  <key id="e0" for="edge" attr.name="weight" attr.type="double"/>
  <key id="e1" for="edge" attr.name="label" attr.type="string"/>
"#;

/// Wrap `body` in a GraphML document declaring [`KEYS`].
pub fn graphml(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<graphml xmlns="http://graphml.graphdrawing.org/xmlns">{KEYS}
<graph id="G" edgedefault="directed">
{body}
</graph>
</graphml>
"#
    )
}

pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

/// `count` nodes `n0..` with the given label string and a name property.
pub fn node_elements(count: usize, labels: &str) -> String {
    let mut body = String::new();
    for i in 0..count {
        writeln!(
            body,
            r#"<node id="n{i}" labels="{labels}"><data key="d0">node {i}</data></node>"#
        )
        .unwrap();
    }
    body
}

/// Log lines written by a thread-local subscriber, see [`capture_logs`].
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }

    /// Number of captured lines containing `needle`.
    pub fn count(&self, needle: &str) -> usize {
        self.contents().lines().filter(|line| line.contains(needle)).count()
    }
}

impl std::io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Route logs of the current thread into a [`LogCapture`] until the guard
/// is dropped.
pub fn capture_logs() -> (LogCapture, tracing::subscriber::DefaultGuard) {
    let capture = LogCapture::default();
    let writer = capture.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    (capture, guard)
}

/// Sink that records every call and hands out sequential node ids.
pub struct RecordingSink {
    pub version: String,
    pub next_id: i64,
    pub open: bool,
    pub begins: usize,
    pub commits: usize,
    pub rollbacks: usize,
    pub node_calls: Vec<(String, Vec<NodeRow>)>,
    pub edge_calls: Vec<(String, Vec<EdgeRow>)>,
    pub catalog: Vec<CatalogEntry>,
    pub catalog_reads: Vec<CatalogLabelField>,
    pub index_calls: Vec<(IndexCreation, String, String)>,
}

impl RecordingSink {
    pub fn new(version: &str) -> Self {
        Self {
            version: version.to_string(),
            next_id: 100,
            open: false,
            begins: 0,
            commits: 0,
            rollbacks: 0,
            node_calls: Vec::new(),
            edge_calls: Vec::new(),
            catalog: Vec::new(),
            catalog_reads: Vec::new(),
            index_calls: Vec::new(),
        }
    }

    pub fn node_batch_sizes(&self) -> Vec<usize> {
        self.node_calls.iter().map(|(_, rows)| rows.len()).collect()
    }

    pub fn edges(&self) -> Vec<&EdgeRow> {
        self.edge_calls.iter().flat_map(|(_, rows)| rows).collect()
    }

    fn require_open(&self) -> Result<()> {
        if !self.open {
            anyhow::bail!("no open transaction");
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl GraphSink for RecordingSink {
    async fn server_info(&mut self) -> Result<ServerInfo> {
        Ok(ServerInfo::new(self.version.clone(), "community"))
    }

    async fn begin_transaction(&mut self) -> Result<()> {
        if self.open {
            anyhow::bail!("transaction already open");
        }
        self.open = true;
        self.begins += 1;
        Ok(())
    }

    async fn commit_transaction(&mut self) -> Result<()> {
        self.require_open()?;
        self.open = false;
        self.commits += 1;
        Ok(())
    }

    async fn rollback_transaction(&mut self) -> Result<()> {
        if self.open {
            self.open = false;
            self.rollbacks += 1;
        }
        Ok(())
    }

    async fn create_nodes(&mut self, labels: &str, nodes: &[NodeRow]) -> Result<Vec<(String, i64)>> {
        self.require_open()?;
        let mut ids = Vec::with_capacity(nodes.len());
        for node in nodes {
            ids.push((node.id.clone(), self.next_id));
            self.next_id += 1;
        }
        self.node_calls.push((labels.to_string(), nodes.to_vec()));
        Ok(ids)
    }

    async fn create_edges(&mut self, relationship_type: &str, edges: &[EdgeRow]) -> Result<()> {
        self.require_open()?;
        self.edge_calls
            .push((relationship_type.to_string(), edges.to_vec()));
        Ok(())
    }

    async fn list_indexes(&mut self, label_field: CatalogLabelField) -> Result<Vec<CatalogEntry>> {
        self.require_open()?;
        self.catalog_reads.push(label_field);
        Ok(self.catalog.clone())
    }

    async fn create_index(
        &mut self,
        dialect: IndexCreation,
        label: &str,
        property: &str,
    ) -> Result<()> {
        self.require_open()?;
        self.index_calls
            .push((dialect, label.to_string(), property.to_string()));
        Ok(())
    }
}
