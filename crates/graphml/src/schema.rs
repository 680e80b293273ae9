//! Property key declarations and the per-run schema registry.
//!
//! GraphML declares every property up front with a `<key>` element:
//!
//! ```xml
//! <key id="d0" for="node" attr.name="name" attr.type="string"/>
//! <key id="d1" for="node" attr.name="scores" attr.type="string" attr.list="int"/>
//! ```
//!
//! [`PropertySchema`] indexes those declarations by `(owner, id)` and hands out
//! a string fallback for any key a `<data>` element references without a
//! matching declaration.

use crate::error::Result;
use crate::scanner::{StartTag, TagScanner};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

/// Property names that carry label information rather than data.
pub const RESERVED_LABEL_PROPERTIES: [&str; 2] = ["label", "labels"];

/// Scalar type of a property value, as declared by `attr.type` / `attr.list`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    Bool,
    Int,
    Long,
    Float,
    Double,
    String,
}

impl ScalarType {
    /// Parse a GraphML type name. Unknown names fall back to `String`.
    pub fn from_graphml(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "boolean" | "bool" => Self::Bool,
            "int" | "integer" => Self::Int,
            "long" => Self::Long,
            "float" => Self::Float,
            "double" => Self::Double,
            _ => Self::String,
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bool => "boolean",
            Self::Int => "int",
            Self::Long => "long",
            Self::Float => "float",
            Self::Double => "double",
            Self::String => "string",
        };
        f.write_str(name)
    }
}

/// Element kind a property key applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OwnerKind {
    Node,
    Edge,
}

impl OwnerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Node => "node",
            Self::Edge => "edge",
        }
    }
}

impl fmt::Display for OwnerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A declared (or synthesized) property definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyKey {
    pub id: String,
    pub owner: OwnerKind,
    pub name: String,
    pub scalar_type: ScalarType,
    pub list_element_type: Option<ScalarType>,
}

impl PropertyKey {
    pub fn new(
        owner: OwnerKind,
        id: impl Into<String>,
        name: impl Into<String>,
        scalar_type: ScalarType,
        list_element_type: Option<ScalarType>,
    ) -> Self {
        Self {
            id: id.into(),
            owner,
            name: name.into(),
            scalar_type,
            list_element_type,
        }
    }

    /// String-typed key named after its own id, used for undeclared keys.
    pub fn fallback(owner: OwnerKind, id: &str) -> Self {
        Self::new(owner, id, id, ScalarType::String, None)
    }

    /// Whether this key holds label information instead of a data property.
    pub fn is_label_property(&self) -> bool {
        RESERVED_LABEL_PROPERTIES.contains(&self.name.as_str())
    }
}

/// Build property keys from a `<key>` start element.
///
/// `for="all"` and a missing `for` both apply the declaration to nodes and
/// edges. Keys for other owners (`graph`, `port`, ...) are not relevant to the
/// import and yield nothing. A missing `attr.name` falls back to the id.
pub fn property_keys_from_element(element: &StartTag) -> Vec<PropertyKey> {
    let Some(id) = element.attribute("id") else {
        tracing::warn!("Ignoring <key> declaration without an id");
        return Vec::new();
    };
    let owners: &[OwnerKind] = match element.attribute("for").map(str::trim) {
        Some("node") => &[OwnerKind::Node],
        Some("edge") => &[OwnerKind::Edge],
        None | Some("all") => &[OwnerKind::Node, OwnerKind::Edge],
        Some(other) => {
            tracing::debug!("Ignoring <key id=\"{id}\"> declared for '{other}'");
            return Vec::new();
        }
    };
    let name = element.attribute("attr.name").unwrap_or(id);
    let scalar_type = element
        .attribute("attr.type")
        .map(ScalarType::from_graphml)
        .unwrap_or(ScalarType::String);
    let list_element_type = element.attribute("attr.list").map(ScalarType::from_graphml);

    owners
        .iter()
        .map(|owner| PropertyKey::new(*owner, id, name, scalar_type, list_element_type))
        .collect()
}

/// Registry of property keys for one import run.
#[derive(Debug, Default, Clone)]
pub struct PropertySchema {
    keys: HashMap<(OwnerKind, String), PropertyKey>,
    fallbacks: usize,
}

impl PropertySchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a key, replacing any previous declaration with the same identity.
    pub fn register(&mut self, key: PropertyKey) {
        self.keys.insert((key.owner, key.id.clone()), key);
    }

    /// Look up a key without synthesizing a fallback.
    pub fn get(&self, owner: OwnerKind, id: &str) -> Option<&PropertyKey> {
        self.keys.get(&(owner, id.to_string()))
    }

    /// Look up a key, registering a string fallback if it was never declared.
    pub fn resolve(&mut self, owner: OwnerKind, id: &str) -> &PropertyKey {
        let identity = (owner, id.to_string());
        if !self.keys.contains_key(&identity) {
            tracing::warn!("{owner} property '{id}' wasn't defined, fallback to string property");
            self.fallbacks += 1;
            self.keys
                .insert(identity.clone(), PropertyKey::fallback(owner, id));
        }
        &self.keys[&identity]
    }

    /// Number of registered keys, fallbacks included.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Number of keys synthesized for undeclared references.
    pub fn fallback_count(&self) -> usize {
        self.fallbacks
    }
}

/// Run the schema pass: collect every `<key>` declaration in the document.
pub fn load_schema(path: &Path) -> Result<PropertySchema> {
    let mut scanner = TagScanner::open(path, "key")?;
    let mut schema = PropertySchema::new();
    while let Some(element) = scanner.next_match()? {
        for key in property_keys_from_element(&element) {
            schema.register(key);
        }
    }
    tracing::debug!("Loaded {} property key declarations", schema.len());
    Ok(schema)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_element(attributes: &[(&str, &str)]) -> StartTag {
        StartTag::new(
            "key",
            attributes
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            true,
        )
    }

    #[test]
    fn test_scalar_type_from_graphml() {
        assert_eq!(ScalarType::from_graphml("boolean"), ScalarType::Bool);
        assert_eq!(ScalarType::from_graphml("INT"), ScalarType::Int);
        assert_eq!(ScalarType::from_graphml("long"), ScalarType::Long);
        assert_eq!(ScalarType::from_graphml("Float"), ScalarType::Float);
        assert_eq!(ScalarType::from_graphml("double"), ScalarType::Double);
        assert_eq!(ScalarType::from_graphml("string"), ScalarType::String);
        assert_eq!(ScalarType::from_graphml("date"), ScalarType::String);
    }

    #[test]
    fn test_key_from_element() {
        let element = key_element(&[
            ("id", "d1"),
            ("for", "node"),
            ("attr.name", "scores"),
            ("attr.type", "string"),
            ("attr.list", "int"),
        ]);
        let keys = property_keys_from_element(&element);
        assert_eq!(
            keys,
            vec![PropertyKey::new(
                OwnerKind::Node,
                "d1",
                "scores",
                ScalarType::String,
                Some(ScalarType::Int)
            )]
        );
    }

    #[test]
    fn test_key_for_all_applies_to_both_owners() {
        let element = key_element(&[("id", "w"), ("for", "all"), ("attr.type", "double")]);
        let keys = property_keys_from_element(&element);
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[0].owner, OwnerKind::Node);
        assert_eq!(keys[1].owner, OwnerKind::Edge);
        assert_eq!(keys[0].name, "w");
        assert_eq!(keys[1].scalar_type, ScalarType::Double);
    }

    #[test]
    fn test_key_for_graph_is_ignored() {
        let element = key_element(&[("id", "g"), ("for", "graph"), ("attr.name", "title")]);
        assert!(property_keys_from_element(&element).is_empty());
    }

    #[test]
    fn test_resolve_registers_fallback_once() {
        let mut schema = PropertySchema::new();
        schema.register(PropertyKey::new(
            OwnerKind::Node,
            "d0",
            "name",
            ScalarType::String,
            None,
        ));

        assert_eq!(schema.resolve(OwnerKind::Node, "d0").name, "name");
        assert_eq!(schema.fallback_count(), 0);

        let fallback = schema.resolve(OwnerKind::Node, "x").clone();
        assert_eq!(fallback, PropertyKey::fallback(OwnerKind::Node, "x"));
        assert_eq!(schema.fallback_count(), 1);

        schema.resolve(OwnerKind::Node, "x");
        assert_eq!(schema.fallback_count(), 1);

        // Same id under a different owner is a different key.
        assert!(schema.get(OwnerKind::Edge, "d0").is_none());
        schema.resolve(OwnerKind::Edge, "x");
        assert_eq!(schema.fallback_count(), 2);
        assert_eq!(schema.len(), 3);
    }

    #[test]
    fn test_register_overwrites() {
        let mut schema = PropertySchema::new();
        schema.register(PropertyKey::new(OwnerKind::Edge, "e0", "a", ScalarType::Int, None));
        schema.register(PropertyKey::new(OwnerKind::Edge, "e0", "b", ScalarType::Long, None));
        assert_eq!(schema.len(), 1);
        assert_eq!(schema.get(OwnerKind::Edge, "e0").unwrap().name, "b");
    }

    #[test]
    fn test_label_properties_are_reserved() {
        assert!(PropertyKey::fallback(OwnerKind::Node, "labels").is_label_property());
        assert!(PropertyKey::fallback(OwnerKind::Edge, "label").is_label_property());
        assert!(!PropertyKey::fallback(OwnerKind::Node, "name").is_label_property());
    }
}
