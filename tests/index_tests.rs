mod common;

use common::RecordingSink;
use graphml_neo4j_importer::{ensure_indexes, parse_index_requests, ImportOpts, IndexReport};
use neo4j_sink::{CatalogEntry, GraphSink};
use neo4j_version::{CatalogLabelField, IndexCreation};

fn entry(labels: &[&str], properties: &[&str]) -> CatalogEntry {
    CatalogEntry {
        labels: labels.iter().map(|s| s.to_string()).collect(),
        properties: properties.iter().map(|s| s.to_string()).collect(),
    }
}

#[tokio::test]
async fn test_new_servers_use_if_not_exists_without_catalog() {
    let mut sink = RecordingSink::new("4.1.3");
    let server = sink.server_info().await.unwrap();

    let report = ensure_indexes(&mut sink, &server, &parse_index_requests("Person.name"))
        .await
        .unwrap();

    assert_eq!(report, IndexReport { created: 1, skipped: 0 });
    assert!(sink.catalog_reads.is_empty());
    assert_eq!(
        sink.index_calls,
        vec![(IndexCreation::IfNotExists, "Person".to_string(), "name".to_string())]
    );
    assert_eq!(sink.commits, 1);
}

#[tokio::test]
async fn test_legacy_server_skips_existing_index() {
    let mut sink = RecordingSink::new("3.5.0");
    sink.catalog = vec![entry(&["Person"], &["name"])];
    let server = sink.server_info().await.unwrap();

    let report = ensure_indexes(
        &mut sink,
        &server,
        &parse_index_requests("Person.name;Person.age"),
    )
    .await
    .unwrap();

    assert_eq!(report, IndexReport { created: 1, skipped: 1 });
    assert_eq!(sink.catalog_reads, vec![CatalogLabelField::TokenNames]);
    assert_eq!(
        sink.index_calls,
        vec![(IndexCreation::Legacy, "Person".to_string(), "age".to_string())]
    );
    // One transaction for the catalog, one for the statements.
    assert_eq!(sink.commits, 2);
    assert!(!sink.open);
}

#[tokio::test]
async fn test_four_zero_reads_labels_or_types() {
    let mut sink = RecordingSink::new("4.0.0");
    sink.catalog = vec![
        entry(&["Gene", "Protein"], &["id"]),
        entry(&[], &["orphan"]),
    ];
    let server = sink.server_info().await.unwrap();

    let report = ensure_indexes(
        &mut sink,
        &server,
        &parse_index_requests("Gene.id;Protein.id"),
    )
    .await
    .unwrap();

    assert_eq!(sink.catalog_reads, vec![CatalogLabelField::LabelsOrTypes]);
    // Only the first label of a multi-label catalog entry counts.
    assert_eq!(report, IndexReport { created: 1, skipped: 1 });
    assert_eq!(
        sink.index_calls,
        vec![(IndexCreation::Legacy, "Protein".to_string(), "id".to_string())]
    );
}

#[tokio::test]
async fn test_unknown_version_uses_newest_dialect() {
    let mut sink = RecordingSink::new("nightly");
    let server = sink.server_info().await.unwrap();

    ensure_indexes(&mut sink, &server, &parse_index_requests(":Drug.name"))
        .await
        .unwrap();

    assert!(sink.catalog_reads.is_empty());
    assert_eq!(
        sink.index_calls,
        vec![(IndexCreation::IfNotExists, "Drug".to_string(), "name".to_string())]
    );
}

#[tokio::test]
async fn test_no_requests_touch_nothing() {
    let mut sink = RecordingSink::new("3.5.0");
    let server = sink.server_info().await.unwrap();

    let report = ensure_indexes(&mut sink, &server, &parse_index_requests(""))
        .await
        .unwrap();

    assert_eq!(report, IndexReport::default());
    assert_eq!(sink.begins, 0);
    assert!(sink.catalog_reads.is_empty());
}

#[test]
fn test_cli_options() {
    use clap::Parser;

    let opts = ImportOpts::try_parse_from([
        "graphml-neo4j-importer",
        "-i",
        "graph.graphml",
        "-e",
        "bolt://localhost:7687",
        "--username",
        "neo4j",
        "--password",
        "secret",
        "--label-prefix",
        "p_",
        "--modify-edge-labels",
        "0",
        "--indices",
        "Person.name;bad",
        "--skip-update-check",
    ])
    .unwrap();

    let labels = opts.label_options();
    assert!(labels.decorate_node_labels);
    assert!(!labels.decorate_edge_labels);
    assert_eq!(labels.prefix.as_deref(), Some("p_"));
    assert_eq!(labels.suffix, None);

    let requests = opts.index_requests();
    assert_eq!(requests.len(), 1);
    assert!(requests["Person"].contains("name"));

    let config = opts.connection_config();
    assert_eq!(config.uri, "bolt://localhost:7687");
    assert_eq!(config.username, "neo4j");
    assert_eq!(config.password, "secret");
    assert!(opts.skip_update_check);
}
