//! Index provisioning after the graph has been loaded.

use crate::loader::abort;
use anyhow::{Context, Result};
use neo4j_sink::GraphSink;
use neo4j_version::{CatalogLabelField, IndexCreation, ServerInfo};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};

/// Requested indexes: label → properties.
pub type IndexRequests = BTreeMap<String, BTreeSet<String>>;

/// What [`ensure_indexes`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexReport {
    /// Index statements issued.
    pub created: u64,
    /// Requests skipped because the catalog already had a matching index.
    pub skipped: u64,
}

/// Parse `--indices` input of the form `Label1.prop1;Label2.prop2`.
///
/// Leading colons on labels are dropped. Entries that are not exactly one
/// label and one property are reported and ignored.
pub fn parse_index_requests(input: &str) -> IndexRequests {
    let mut requests = IndexRequests::new();
    for entry in input.split(';').map(str::trim).filter(|e| !e.is_empty()) {
        let parts: Vec<&str> = entry.split('.').filter(|p| !p.is_empty()).collect();
        match parts.as_slice() {
            [label, property] => {
                let label = label.trim_start_matches(':');
                if label.is_empty() {
                    warn!("Failed to parse index '{entry}', it will be ignored. Expected <label>.<property>");
                    continue;
                }
                requests
                    .entry(label.to_string())
                    .or_default()
                    .insert(property.to_string());
            }
            _ => warn!(
                "Failed to parse index '{entry}', it will be ignored. Expected <label1>.<property1>;<label2>.<property2>;..."
            ),
        }
    }
    requests
}

/// Create the requested indexes using the dialect the server supports.
///
/// Servers that support `IF NOT EXISTS` get every statement unconditionally.
/// Older servers are asked for their index catalog first and requests that
/// already have an index are skipped. All statements share one transaction.
pub async fn ensure_indexes<S: GraphSink>(
    sink: &mut S,
    server: &ServerInfo,
    requested: &IndexRequests,
) -> Result<IndexReport> {
    if requested.is_empty() {
        debug!("No indexes requested");
        return Ok(IndexReport::default());
    }

    let dialect = server.index_creation();
    let existing = match dialect {
        IndexCreation::IfNotExists => IndexRequests::new(),
        IndexCreation::Legacy => existing_indexes(sink, server.catalog_label_field()).await?,
    };

    sink.begin_transaction().await?;
    match create_missing(sink, dialect, requested, &existing).await {
        Ok(report) => {
            sink.commit_transaction()
                .await
                .context("Failed to commit index creation")?;
            Ok(report)
        }
        Err(e) => Err(abort(sink, e).await),
    }
}

async fn create_missing<S: GraphSink>(
    sink: &mut S,
    dialect: IndexCreation,
    requested: &IndexRequests,
    existing: &IndexRequests,
) -> Result<IndexReport> {
    let mut report = IndexReport::default();
    for (label, properties) in requested {
        for property in properties {
            let present = existing
                .get(label)
                .is_some_and(|indexed| indexed.contains(property));
            if present {
                info!("Skipping index creation on :{label}({property}) because a similar index already exists");
                report.skipped += 1;
                continue;
            }
            info!("Create index on label '{label}' and property '{property}'");
            sink.create_index(dialect, label, property).await?;
            report.created += 1;
        }
    }
    Ok(report)
}

/// Read the catalog into label → indexed properties, keyed by each entry's
/// first label.
async fn existing_indexes<S: GraphSink>(
    sink: &mut S,
    label_field: CatalogLabelField,
) -> Result<IndexRequests> {
    sink.begin_transaction().await?;
    let entries = match sink.list_indexes(label_field).await {
        Ok(entries) => entries,
        Err(e) => return Err(abort(sink, e).await),
    };
    sink.commit_transaction().await?;

    let mut existing = IndexRequests::new();
    for entry in entries {
        let Some(label) = entry.labels.first() else {
            debug!("Ignoring index without labels on {:?}", entry.properties);
            continue;
        };
        if entry.labels.len() > 1 {
            warn!(
                "Found multiple labels {:?} for index on {:?}. Ignoring all but first label.",
                entry.labels, entry.properties
            );
        }
        existing
            .entry(label.clone())
            .or_default()
            .extend(entry.properties);
    }
    Ok(existing)
}
