//! Conversion of imported values into Bolt parameters.

use crate::traits::{EdgeRow, NodeRow};
use graphml::{Properties, TypedList, TypedValue};
use neo4rs::{BoltBoolean, BoltFloat, BoltInteger, BoltList, BoltMap, BoltNull, BoltString, BoltType};

/// Convert a typed property value to its Bolt form.
pub fn typed_to_bolt(value: &TypedValue) -> BoltType {
    match value {
        TypedValue::Bool(b) => BoltType::Boolean(BoltBoolean::new(*b)),
        TypedValue::Int(i) => BoltType::Integer(BoltInteger::new(*i)),
        TypedValue::Float(f) => BoltType::Float(BoltFloat::new(*f)),
        TypedValue::String(s) => BoltType::String(BoltString::new(s)),
        TypedValue::List(list) => BoltType::List(list_to_bolt(list)),
    }
}

fn list_to_bolt(list: &TypedList) -> BoltList {
    let mut bolt = BoltList::new();
    match list {
        TypedList::Bool(values) => {
            for b in values {
                bolt.push(BoltType::Boolean(BoltBoolean::new(*b)));
            }
        }
        TypedList::Int(values) => {
            for i in values {
                bolt.push(BoltType::Integer(BoltInteger::new(*i)));
            }
        }
        TypedList::Float(values) => {
            for f in values {
                bolt.push(BoltType::Float(BoltFloat::new(*f)));
            }
        }
        TypedList::String(values) => {
            for s in values {
                bolt.push(BoltType::String(BoltString::new(s)));
            }
        }
    }
    bolt
}

pub fn properties_to_bolt(properties: &Properties) -> BoltType {
    let mut map = BoltMap::new();
    for (name, value) in properties {
        map.put(BoltString::new(name), typed_to_bolt(value));
    }
    BoltType::Map(map)
}

fn optional_id(id: Option<i64>) -> BoltType {
    match id {
        Some(id) => BoltType::Integer(BoltInteger::new(id)),
        None => BoltType::Null(BoltNull),
    }
}

/// `$batch` parameter for a node creation statement: `[{id, properties}]`.
pub fn node_batch(nodes: &[NodeRow]) -> BoltType {
    let mut batch = BoltList::new();
    for node in nodes {
        let mut row = BoltMap::new();
        row.put(BoltString::new("id"), BoltType::String(BoltString::new(&node.id)));
        row.put(BoltString::new("properties"), properties_to_bolt(&node.properties));
        batch.push(BoltType::Map(row));
    }
    BoltType::List(batch)
}

/// `$batch` parameter for a relationship creation statement:
/// `[{source, target, properties}]`.
pub fn edge_batch(edges: &[EdgeRow]) -> BoltType {
    let mut batch = BoltList::new();
    for edge in edges {
        let mut row = BoltMap::new();
        row.put(BoltString::new("source"), optional_id(edge.source));
        row.put(BoltString::new("target"), optional_id(edge.target));
        row.put(BoltString::new("properties"), properties_to_bolt(&edge.properties));
        batch.push(BoltType::Map(row));
    }
    BoltType::List(batch)
}
