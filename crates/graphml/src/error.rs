//! Error types for GraphML decoding.

use crate::schema::ScalarType;
use std::path::PathBuf;
use thiserror::Error;

/// A raw property value that could not be converted to its declared type.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("cannot parse '{value}' as {target}: {reason}")]
pub struct CoercionError {
    pub value: String,
    pub target: ScalarType,
    pub reason: String,
}

/// Errors that abort a pass over a GraphML document.
#[derive(Debug, Error)]
pub enum GraphmlError {
    /// The input file does not exist.
    #[error("Input file '{}' not found", .0.display())]
    InputNotFound(PathBuf),

    /// Failure opening or reading the underlying byte stream.
    #[error("I/O error reading '{source_name}': {error}")]
    Io {
        source_name: String,
        #[source]
        error: std::sync::Arc<std::io::Error>,
    },

    /// The stream ended while elements were still open.
    #[error("GraphML stream '{source_name}' ended unexpectedly at byte {position}")]
    Truncated { source_name: String, position: usize },

    /// Unrecoverable XML syntax error.
    #[error("Malformed GraphML in '{source_name}' at byte {position}: {message}")]
    Corrupt {
        source_name: String,
        position: usize,
        message: String,
    },

    /// A required attribute is missing from an element.
    #[error("<{element}> element is missing required attribute '{attribute}'")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    /// A required attribute is present but carries no usable value.
    #[error("<{element}> element has an empty '{attribute}' attribute")]
    EmptyAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    /// A property value failed type coercion.
    #[error("{element} '{owner}' property '{property}': {error}")]
    Coercion {
        element: &'static str,
        owner: String,
        property: String,
        #[source]
        error: CoercionError,
    },
}

/// Result type for GraphML decoding.
pub type Result<T> = std::result::Result<T, GraphmlError>;
