#![deny(missing_docs)]

//! # Routes Module
//!
//! Entry point of a compilation. Walks `paths` in sorted order, and the methods of each
//! path in sorted order, so the output never depends on key order in the document.
//!
//! - **naming**: operation identifier synthesis.
//! - **builder**: assembly of a single operation.

pub mod builder;
pub mod naming;

use crate::config::CompilerOptions;
use crate::error::{AppError, AppResult};
use crate::oas::models::{Boilerplate, CompiledApi, OperationDefinition, ParameterDefinition};
use crate::oas::resolver::{describe_parameters, SchemaResolver};
use crate::oas::routes::builder::{build_operation, OperationSite};
use crate::oas::routes::naming::{default_operation_id, normalize_operation_id};
use crate::oas::shims::ShimOpenApi;
use std::collections::HashSet;
use tracing::info;

/// Compiles a YAML document.
pub fn compile_yaml(text: &str, options: &CompilerOptions) -> AppResult<CompiledApi> {
    compile(&ShimOpenApi::from_yaml(text)?, options)
}

/// Compiles a JSON document.
pub fn compile_json(text: &str, options: &CompilerOptions) -> AppResult<CompiledApi> {
    compile(&ShimOpenApi::from_json(text)?, options)
}

/// Compiles a parsed document into the IR.
///
/// Component schemas and responses are registered first; operations follow in sorted
/// path, then method order. Each operation records the types created while building it.
pub fn compile(doc: &ShimOpenApi, options: &CompilerOptions) -> AppResult<CompiledApi> {
    if let Some(version) = &doc.openapi {
        if !version.starts_with("3.") {
            return Err(AppError::General(format!(
                "Unsupported OpenAPI version: {}. Only 3.x is supported.",
                version
            )));
        }
    }

    let mut resolver = SchemaResolver::new(doc, options);
    resolver.register_components()?;

    let mut operations = Vec::new();
    let mut operation_ids = HashSet::new();
    for (path, item) in &doc.paths {
        let selected: Vec<_> = item
            .operations()
            .into_iter()
            .filter(|(_, op)| options.accepts_tags(&op.tags))
            .collect();
        let path_op_count = selected.len();
        let mut shared: Option<Vec<ParameterDefinition>> = None;

        for (method, operation) in selected {
            let site = OperationSite {
                path,
                method,
                item,
                operation,
            };
            let compiled = compile_operation(&mut resolver, site, path_op_count, &mut shared)
                .map_err(|e| e.in_operation(method, path))?;
            if !operation_ids.insert(compiled.operation_id.clone()) {
                return Err(AppError::DuplicateOperationId {
                    operation_id: compiled.operation_id,
                }
                .in_operation(method, path));
            }
            operations.push(compiled);
        }
    }

    let types = resolver.into_definitions()?;
    let boilerplate: Vec<_> = types
        .iter()
        .filter_map(|t| {
            t.schema.needs_boilerplate().map(|kind| Boilerplate {
                type_name: t.name.clone(),
                kind,
            })
        })
        .collect();

    info!(
        operations = operations.len(),
        types = types.len(),
        boilerplate = boilerplate.len(),
        "compiled document"
    );

    Ok(CompiledApi {
        operations,
        types,
        boilerplate,
    })
}

/// Builds one operation and collects the types it created.
///
/// Path-level parameters are resolved on the first operation of a path, so their
/// synthesized types are attributed to that operation.
fn compile_operation(
    resolver: &mut SchemaResolver<'_>,
    site: OperationSite<'_>,
    path_op_count: usize,
    shared: &mut Option<Vec<ParameterDefinition>>,
) -> AppResult<OperationDefinition> {
    let mark = resolver.mark();
    let operation_id = match &site.operation.operation_id {
        Some(raw) => normalize_operation_id(raw)?,
        None => default_operation_id(site.method, site.path, path_op_count)?,
    };

    if shared.is_none() {
        let described =
            describe_parameters(resolver, &site.item.parameters, &[operation_id.clone()])?;
        *shared = Some(described);
    }
    let shared_params = shared.as_deref().unwrap_or_default();

    let mut operation = build_operation(resolver, site, operation_id, shared_params)?;
    operation.type_definitions = resolver.names_since(mark);
    Ok(operation)
}
