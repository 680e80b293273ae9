//! Streaming GraphML decoding.
//!
//! This crate reads GraphML documents without materializing them: every pass
//! re-opens the input and walks its XML events forward once, stopping at the
//! elements of interest.
//!
//! # Modules
//!
//! - [`scanner`] - Forward-only tag scanner over XML events
//! - [`schema`] - `<key>` declarations and the property registry
//! - [`coerce`] - Raw text → typed property values, including list encodings
//! - [`record`] - Node and edge records assembled from elements
//! - [`source`] - Input opening with transparent gzip decompression
//!
//! # Example
//!
//! ```ignore
//! use graphml::{load_schema, read_node, TagScanner};
//!
//! let mut schema = load_schema(path)?;
//! let mut scanner = TagScanner::open(path, "node")?;
//! while let Some(element) = scanner.next_match()? {
//!     let node = read_node(&mut scanner, &element, &mut schema)?;
//!     println!("{} {}", node.id, node.labels);
//! }
//! ```

pub mod coerce;
pub mod error;
pub mod record;
pub mod scanner;
pub mod schema;
pub mod source;

pub use coerce::{coerce, TypedList, TypedValue};
pub use error::{CoercionError, GraphmlError, Result};
pub use record::{read_edge, read_node, EdgeRecord, NodeRecord, Properties};
pub use scanner::{count_elements, DataElement, StartTag, TagScanner};
pub use schema::{load_schema, OwnerKind, PropertyKey, PropertySchema, ScalarType};
pub use source::{is_compressed, open_input};
