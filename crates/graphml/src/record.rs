//! Node and edge records assembled from GraphML elements.

use crate::coerce::{coerce, TypedValue};
use crate::error::{GraphmlError, Result};
use crate::scanner::{StartTag, TagScanner};
use crate::schema::{OwnerKind, PropertySchema};
use std::collections::BTreeMap;

/// Property name → value mapping of a node or edge.
pub type Properties = BTreeMap<String, TypedValue>;

/// A `<node>` element.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeRecord {
    /// File-local node id.
    pub id: String,
    /// Colon-delimited label string as written in the file, e.g. `:A:B`.
    pub labels: String,
    pub properties: Properties,
}

/// An `<edge>` element.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeRecord {
    pub label: String,
    /// File-local id of the source node.
    pub source: Option<String>,
    /// File-local id of the target node.
    pub target: Option<String>,
    pub properties: Properties,
}

/// Read a node whose start element was just matched by `scanner`.
pub fn read_node(
    scanner: &mut TagScanner,
    element: &StartTag,
    schema: &mut PropertySchema,
) -> Result<NodeRecord> {
    let id = element
        .attribute("id")
        .ok_or(GraphmlError::MissingAttribute {
            element: "node",
            attribute: "id",
        })?
        .to_string();
    let labels = element.attribute("labels").unwrap_or_default().to_string();
    let properties = read_properties(scanner, element, schema, OwnerKind::Node, &id)?;
    Ok(NodeRecord {
        id,
        labels,
        properties,
    })
}

/// Read an edge whose start element was just matched by `scanner`.
pub fn read_edge(
    scanner: &mut TagScanner,
    element: &StartTag,
    schema: &mut PropertySchema,
) -> Result<EdgeRecord> {
    let label = element
        .attribute("label")
        .ok_or(GraphmlError::MissingAttribute {
            element: "edge",
            attribute: "label",
        })?
        .to_string();
    if label.trim_start_matches(':').is_empty() {
        return Err(GraphmlError::EmptyAttribute {
            element: "edge",
            attribute: "label",
        });
    }
    let source = element.attribute("source").map(str::to_string);
    let target = element.attribute("target").map(str::to_string);
    let owner = element
        .attribute("id")
        .map(str::to_string)
        .unwrap_or_else(|| {
            format!(
                "{}->{}",
                source.as_deref().unwrap_or("?"),
                target.as_deref().unwrap_or("?")
            )
        });
    let properties = read_properties(scanner, element, schema, OwnerKind::Edge, &owner)?;
    Ok(EdgeRecord {
        label,
        source,
        target,
        properties,
    })
}

fn read_properties(
    scanner: &mut TagScanner,
    element: &StartTag,
    schema: &mut PropertySchema,
    kind: OwnerKind,
    owner: &str,
) -> Result<Properties> {
    let mut properties = Properties::new();
    for data in scanner.read_data_children(element)? {
        let key = schema.resolve(kind, &data.key);
        if key.is_label_property() {
            continue;
        }
        let value = coerce(key, data.text.as_deref()).map_err(|error| GraphmlError::Coercion {
            element: kind.as_str(),
            owner: owner.to_string(),
            property: key.name.clone(),
            error,
        })?;
        match value {
            Some(value) => {
                properties.insert(key.name.clone(), value);
            }
            None => tracing::debug!("{kind} '{owner}' property '{}' has no value", key.name),
        }
    }
    Ok(properties)
}
