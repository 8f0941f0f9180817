#![deny(missing_docs)]

//! # Error Handling
//!
//! Provides the unified `AppError` enum used across the workspace.
//!
//! Document inconsistencies and naming failures are fatal; the compiler stops at the
//! first one. Operation-level failures are wrapped in [`AppError::Operation`] so the
//! single reported message names the offending method and path.

use derive_more::{Display, From};

/// The Global Error Enum.
///
/// `From` is derived for the wrapped library errors and for `String` (→ `General`).
#[derive(Debug, Display, From)]
pub enum AppError {
    /// Wrapper for standard IO errors.
    #[display("IO Error: {_0}")]
    Io(std::io::Error),

    /// The document (or a config file) is not valid YAML.
    #[display("YAML Error: {_0}")]
    Yaml(serde_yaml::Error),

    /// The document is not valid JSON, or the IR failed to serialize.
    #[display("JSON Error: {_0}")]
    Json(serde_json::Error),

    /// A `$ref` points at something the document does not define.
    #[from(ignore)]
    #[display("Unresolved reference '{reference}' at {pointer}")]
    UnresolvedReference {
        /// The raw `$ref` string.
        reference: String,
        /// Where the reference was encountered.
        pointer: String,
    },

    /// The path template and the declared path parameters disagree.
    #[from(ignore)]
    #[display("Path parameter mismatch for '{path}': {detail}")]
    PathParameterMismatch {
        /// The path template.
        path: String,
        /// What is missing or extra.
        detail: String,
    },

    /// A parameter declared `in` something other than path, query, header or cookie.
    #[from(ignore)]
    #[display("Parameter '{name}' has unsupported location '{location}'")]
    UnsupportedParameterLocation {
        /// Wire name of the parameter.
        name: String,
        /// The offending `in` value.
        location: String,
    },

    /// A parameter declared a `style` outside the RFC 6570 set OpenAPI allows.
    #[from(ignore)]
    #[display("Parameter '{name}' has unknown style '{style}'")]
    InvalidStyle {
        /// Wire name of the parameter.
        name: String,
        /// The offending style.
        style: String,
    },

    /// A parameter has neither `schema` nor `content`.
    #[from(ignore)]
    #[display("Parameter '{name}' has neither a schema nor content")]
    MissingParameterSchema {
        /// Wire name of the parameter.
        name: String,
    },

    /// `allOf`/`oneOf`/`anyOf` members that cannot be combined.
    #[from(ignore)]
    #[display("Incompatible composition at {pointer}: {detail}")]
    IncompatibleComposition {
        /// Schema location.
        pointer: String,
        /// Why the members do not combine.
        detail: String,
    },

    /// A name normalized to nothing usable.
    #[from(ignore)]
    #[display("Invalid identifier: {_0}")]
    InvalidIdentifier(String),

    /// No collision-free name could be derived.
    #[from(ignore)]
    #[display("Name collision: {_0}")]
    NameCollision(String),

    /// Two operations ended up with the same identifier.
    #[from(ignore)]
    #[display("Duplicate operationId '{operation_id}'")]
    DuplicateOperationId {
        /// The repeated identifier.
        operation_id: String,
    },

    /// Context wrapper naming the operation being compiled.
    #[from(ignore)]
    #[display("{method} {path}: {source}")]
    Operation {
        /// HTTP method, upper case.
        method: String,
        /// Path template.
        path: String,
        /// The underlying failure.
        source: Box<AppError>,
    },

    /// Generic errors.
    #[display("General Error: {_0}")]
    General(String),
}

impl AppError {
    /// Wraps `self` with the operation it occurred in.
    pub fn in_operation(self, method: &str, path: &str) -> Self {
        AppError::Operation {
            method: method.to_string(),
            path: path.to_string(),
            source: Box::new(self),
        }
    }
}

/// Manual implementation of the standard Error trait.
impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Io(e) => Some(e),
            AppError::Yaml(e) => Some(e),
            AppError::Json(e) => Some(e),
            AppError::Operation { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

/// Helper type alias for Result using AppError.
pub type AppResult<T> = Result<T, AppError>;
