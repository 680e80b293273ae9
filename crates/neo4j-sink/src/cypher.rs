//! Cypher statements issued by the sink.
//!
//! Labels, relationship types and property names come from the input file, so
//! they are always backtick-quoted. Values travel as parameters.

use neo4j_version::{CatalogLabelField, IndexCreation};

/// Server version and edition, one row per kernel component.
pub const SERVER_COMPONENTS_QUERY: &str =
    "CALL dbms.components() YIELD versions, edition UNWIND versions AS version RETURN version, edition";

/// Quote a name for use as a Cypher identifier.
pub fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Render a colon-delimited label string (`:A:B`) as a quoted label clause
/// (`` :`A`:`B` ``). Empty segments are dropped.
pub fn label_clause(labels: &str) -> String {
    labels
        .split(':')
        .filter(|label| !label.is_empty())
        .map(|label| format!(":{}", quote_identifier(label)))
        .collect()
}

pub fn create_nodes_query(labels: &str) -> String {
    format!(
        "UNWIND $batch AS row\nCREATE (n{})\nSET n += row.properties\nRETURN row.id AS file_id, id(n) AS node_id",
        label_clause(labels)
    )
}

pub fn create_edges_query(relationship_type: &str) -> String {
    format!(
        "UNWIND $batch AS row\nMATCH (a),(b) WHERE id(a) = row.source AND id(b) = row.target\nCREATE (a)-[e:{}]->(b)\nSET e += row.properties",
        quote_identifier(relationship_type)
    )
}

pub fn list_indexes_query(label_field: CatalogLabelField) -> String {
    let column = label_field.column();
    format!("CALL db.indexes() YIELD {column}, properties RETURN {column} AS labels, properties")
}

pub fn create_index_statement(dialect: IndexCreation, label: &str, property: &str) -> String {
    let label = quote_identifier(label);
    let property = quote_identifier(property);
    match dialect {
        IndexCreation::IfNotExists => {
            format!("CREATE INDEX IF NOT EXISTS FOR (t:{label}) ON (t.{property})")
        }
        IndexCreation::Legacy => format!("CREATE INDEX ON :{label}({property})"),
    }
}
