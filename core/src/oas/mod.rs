#![deny(missing_docs)]

//! # OpenAPI Compilation Module
//!
//! - **shims**: serde model of the input document.
//! - **identifiers**: name normalization.
//! - **ref_utils**: `$ref` parsing.
//! - **models**: the Intermediate Representation.
//! - **registry**: named type table.
//! - **resolver**: schema, parameter, body and response resolution.
//! - **routes**: operation assembly and the compile entry points.

pub mod identifiers;
pub mod models;
pub mod ref_utils;
pub mod registry;
pub mod resolver;
pub mod routes;
pub mod shims;

pub use models::{
    CompiledApi, OperationDefinition, ParameterDefinition, RequestBodyDefinition,
    ResponseDefinition, Schema, SchemaKind, TypeDefinition,
};
pub use routes::{compile, compile_json, compile_yaml};
pub use shims::ShimOpenApi;
