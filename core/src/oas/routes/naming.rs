#![deny(missing_docs)]

//! # Naming Utilities
//!
//! Operation identifiers: normalization of explicit `operationId`s and synthesis of
//! identifiers for operations that have none.
//!
//! Synthesis is an ordered table of rules over the path split on `/`. The first rule
//! that produces a name wins; the last rule always does.

use crate::error::{AppError, AppResult};
use crate::oas::identifiers::{to_camel_case, type_name_prefix};

/// What the rules look at.
struct NamingInput<'a> {
    method: &'a str,
    parts: Vec<&'a str>,
    param_count: usize,
    path_op_count: usize,
}

impl NamingInput<'_> {
    fn lower_method(&self) -> String {
        self.method.to_ascii_lowercase()
    }

    /// `Read-`/`Create-`/`Update-` for GET/POST/PUT, the lower-cased method otherwise.
    fn verb(&self, resource: &str) -> String {
        match self.method {
            "GET" => format!("Read-{resource}"),
            "POST" => format!("Create-{resource}"),
            "PUT" => format!("Update-{resource}"),
            _ => format!("{}-{resource}", self.lower_method()),
        }
    }
}

type NamingRule = fn(&NamingInput<'_>) -> Option<String>;

/// Rules in priority order.
const RULES: &[NamingRule] = &[
    single_resource_with_params,
    multiple_params,
    top_level_resource,
    resource_by_param,
    static_path,
    method_and_parts,
];

fn is_path_param(part: &str) -> bool {
    part.len() >= 2 && part.starts_with('{') && part.ends_with('}')
}

fn join_non_empty(mut head: String, parts: &[&str]) -> String {
    for part in parts.iter().filter(|p| !p.is_empty()) {
        head.push('-');
        head.push_str(part);
    }
    head
}

/// `/pets/{a}/{b}` → `get-pets`.
fn single_resource_with_params(input: &NamingInput<'_>) -> Option<String> {
    if input.param_count <= 1 {
        return None;
    }
    let shaped = input.parts.iter().enumerate().all(|(i, part)| {
        if i <= 1 {
            !is_path_param(part)
        } else {
            is_path_param(part)
        }
    });
    let resource = input.parts.get(1).copied().unwrap_or_default();
    shaped.then(|| format!("{}-{resource}", input.lower_method()))
}

/// Two or more parameters anywhere: method followed by every segment.
fn multiple_params(input: &NamingInput<'_>) -> Option<String> {
    (input.param_count > 1).then(|| method_and_parts(input).unwrap_or_default())
}

/// `/pets` → `Read-pets`, `Read-pets-List`, `Create-pets`, ...
fn top_level_resource(input: &NamingInput<'_>) -> Option<String> {
    if input.parts.len() != 2 {
        return None;
    }
    let resource = input.parts[1];
    let name = match input.method {
        "GET" if resource == "healthz" => "Health-Check".to_string(),
        "GET" if input.path_op_count > 1 => format!("Read-{resource}-List"),
        _ => input.verb(resource),
    };
    Some(name)
}

/// `/pets/{petId}/toys` → `Read-pets-toys-by-{petId}`; `{id}` is left implicit.
fn resource_by_param(input: &NamingInput<'_>) -> Option<String> {
    if input.parts.len() < 3 || !is_path_param(input.parts[2]) {
        return None;
    }
    let mut name = join_non_empty(input.verb(input.parts[1]), &input.parts[3..]);
    if input.parts[2] != "{id}" {
        name.push_str("-by-");
        name.push_str(input.parts[2]);
    }
    Some(name)
}

/// Parameterless nested paths: `/pets/mine` → `Read-pets-mine`.
fn static_path(input: &NamingInput<'_>) -> Option<String> {
    if input.param_count != 0 || input.parts.len() < 2 {
        return None;
    }
    Some(join_non_empty(input.verb(input.parts[1]), &input.parts[2..]))
}

fn method_and_parts(input: &NamingInput<'_>) -> Option<String> {
    Some(join_non_empty(input.lower_method(), &input.parts))
}

/// Synthesizes an identifier for an operation without `operationId`.
///
/// `path_op_count` is the number of operations on `path` that survived tag filtering;
/// it decides between `ReadPets` and `ReadPetsList` for a collection `GET`.
pub fn default_operation_id(method: &str, path: &str, path_op_count: usize) -> AppResult<String> {
    if method.is_empty() {
        return Err(AppError::InvalidIdentifier(
            "operation method cannot be empty".to_string(),
        ));
    }
    if path.is_empty() {
        return Err(AppError::InvalidIdentifier(
            "request path cannot be empty".to_string(),
        ));
    }

    let parts: Vec<&str> = path.split('/').collect();
    let input = NamingInput {
        method,
        param_count: parts.iter().filter(|p| is_path_param(p)).count(),
        parts,
        path_op_count,
    };
    let raw = RULES
        .iter()
        .find_map(|rule| rule(&input))
        .unwrap_or_default();
    normalize_operation_id(&raw)
}

/// Normalizes an identifier into its final `UpperCamelCase` form.
///
/// A leading digit gets an `N` prefix. An identifier with nothing left after
/// camel-casing is an error.
pub fn normalize_operation_id(raw: &str) -> AppResult<String> {
    let prefix = type_name_prefix(raw)?;
    let id = to_camel_case(&format!("{prefix}{raw}"));
    if id.is_empty() {
        return Err(AppError::InvalidIdentifier(format!(
            "operation identifier '{raw}' has no identifier characters"
        )));
    }
    Ok(id)
}
