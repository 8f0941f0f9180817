#![deny(missing_docs)]

//! # CDD IR Core
//!
//! Compiles an OpenAPI 3 document into a deterministic, name-resolved Intermediate
//! Representation that code generators render from.

/// Shared error types.
pub mod error;

/// Compiler options.
pub mod config;

/// OpenAPI (OAS) compilation.
pub mod oas;

pub use config::CompilerOptions;
pub use error::{AppError, AppResult};
pub use oas::{
    compile, compile_json, compile_yaml, CompiledApi, OperationDefinition, ParameterDefinition,
    RequestBodyDefinition, ResponseDefinition, Schema, SchemaKind, ShimOpenApi, TypeDefinition,
};
