#![deny(missing_docs)]

//! # Operation Builder
//!
//! Assembles one [`OperationDefinition`] from a path item and one of its operations:
//! merged and ordered parameters, the parameter object, bodies, responses and security.

use crate::error::{AppError, AppResult};
use crate::oas::models::{
    OperationDefinition, ParamLocation, ParamStyle, ParameterDefinition, Property, Schema,
    SchemaKind, SecurityDefinition,
};
use crate::oas::resolver::types::unique_field_name;
use crate::oas::resolver::{
    describe_parameters, describe_request_body, describe_responses, SchemaResolver,
};
use crate::oas::shims::{ShimOperation, ShimPathItem, ShimSecurityRequirement};
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;
use tracing::debug;
use utoipa::openapi::RefOr;

/// One operation and where it lives.
#[derive(Debug, Clone, Copy)]
pub struct OperationSite<'d> {
    /// Path template.
    pub path: &'d str,
    /// Upper-case HTTP method.
    pub method: &'static str,
    /// Enclosing path item.
    pub item: &'d ShimPathItem,
    /// The operation itself.
    pub operation: &'d ShimOperation,
}

/// Builds an operation whose identifier has already been decided.
///
/// `shared` are the path item's parameters, already resolved. `type_definitions` is left
/// empty; the caller knows which registry entries belong to the operation.
pub fn build_operation(
    resolver: &mut SchemaResolver<'_>,
    site: OperationSite<'_>,
    operation_id: String,
    shared: &[ParameterDefinition],
) -> AppResult<OperationDefinition> {
    let op = site.operation;
    let local = describe_parameters(resolver, &op.parameters, &[operation_id.clone()])?;
    let merged = merge_parameters(shared, local);

    let mut path_params = Vec::new();
    let mut query_params = Vec::new();
    let mut header_params = Vec::new();
    let mut cookie_params = Vec::new();
    for param in merged {
        match param.location {
            ParamLocation::Path => path_params.push(param),
            ParamLocation::Query => query_params.push(param),
            ParamLocation::Header => header_params.push(param),
            ParamLocation::Cookie => cookie_params.push(param),
        }
    }
    let path_params = order_path_params(site.path, path_params)?;

    let params_type = describe_params_type(
        resolver,
        &operation_id,
        [&mut query_params, &mut header_params, &mut cookie_params],
    )?;

    let (bodies, body_required) = match &op.request_body {
        Some(body) => {
            let required = match body {
                RefOr::T(b) => b.required,
                RefOr::Ref(r) => resolver.lookup_request_body(&r.ref_location)?.required,
            };
            (describe_request_body(resolver, &operation_id, body)?, required)
        }
        None => (Vec::new(), false),
    };

    let responses = describe_responses(resolver, &operation_id, &op.responses)?;

    let requirements = op
        .security
        .as_deref()
        .or(resolver.document().security.as_deref())
        .unwrap_or_default();

    Ok(OperationDefinition {
        operation_id,
        method: site.method.to_string(),
        path: site.path.to_string(),
        summary: op.summary.clone().or_else(|| site.item.summary.clone()),
        description: op
            .description
            .clone()
            .or_else(|| site.item.description.clone()),
        tags: op.tags.clone(),
        deprecated: op.deprecated,
        path_params,
        query_params,
        header_params,
        cookie_params,
        params_type,
        body_required,
        bodies,
        responses,
        security: flatten_security(requirements),
        type_definitions: Vec::new(),
    })
}

/// `shared ++ local`, dropping later duplicates by `(name, location)`.
///
/// Path-level parameters therefore win over operation-level ones of the same name.
pub fn merge_parameters(
    shared: &[ParameterDefinition],
    local: Vec<ParameterDefinition>,
) -> Vec<ParameterDefinition> {
    let mut seen = HashSet::new();
    let mut merged = Vec::with_capacity(shared.len() + local.len());
    for param in shared.iter().cloned().chain(local) {
        if seen.insert((param.name.clone(), param.location)) {
            merged.push(param);
        } else {
            debug!(
                name = %param.name,
                location = ?param.location,
                "parameter shadowed by an earlier definition"
            );
        }
    }
    merged
}

/// Parameter names in template order. Handles `{name}`, `{.name}`, `{;name}` and `{name*}`.
pub fn path_template_names(path: &str) -> Vec<String> {
    static PARAM_RE: OnceLock<Regex> = OnceLock::new();
    let re = PARAM_RE.get_or_init(|| {
        Regex::new(r"\{[.;?]?([^{}*]+)\*?\}").expect("Invalid regex constant")
    });
    re.captures_iter(path)
        .map(|cap| cap[1].to_string())
        .collect()
}

/// Reorders declared path parameters to match the template.
///
/// Every template name must be declared exactly once and every declared path parameter
/// must appear in the template.
pub fn order_path_params(
    path: &str,
    params: Vec<ParameterDefinition>,
) -> AppResult<Vec<ParameterDefinition>> {
    let mismatch = |detail: String| AppError::PathParameterMismatch {
        path: path.to_string(),
        detail,
    };

    let names = path_template_names(path);
    let mut declared: HashMap<String, ParameterDefinition> =
        params.into_iter().map(|p| (p.name.clone(), p)).collect();
    let mut seen = HashSet::new();
    let mut ordered = Vec::with_capacity(names.len());
    for name in names {
        if !seen.insert(name.clone()) {
            return Err(mismatch(format!("template repeats '{name}'")));
        }
        let param = declared
            .remove(&name)
            .ok_or_else(|| mismatch(format!("'{name}' is not declared as a path parameter")))?;
        ordered.push(param);
    }

    let mut leftover: Vec<_> = declared.into_keys().collect();
    if !leftover.is_empty() {
        leftover.sort();
        return Err(mismatch(format!(
            "declared path parameters not in template: {}",
            leftover.join(", ")
        )));
    }
    Ok(ordered)
}

/// Synthesizes `{OperationId}Params` from the non-path parameters.
///
/// Free-form map parameters get their own named type so the parameter object only holds
/// named or scalar fields.
fn describe_params_type(
    resolver: &mut SchemaResolver<'_>,
    operation_id: &str,
    groups: [&mut Vec<ParameterDefinition>; 3],
) -> AppResult<Option<String>> {
    let type_name = format!("{operation_id}Params");
    let mut taken = HashSet::new();
    let mut properties = Vec::new();
    for group in groups {
        for param in group.iter_mut() {
            if param.schema.kind == SchemaKind::Map {
                let map_type = resolver
                    .define_schema(&[type_name.clone(), param.name.clone()], param.schema.clone())?;
                param.schema = Schema::alias(map_type);
            }
            properties.push(Property {
                field_name: unique_field_name(&param.name, &mut taken)?,
                json_name: param.name.clone(),
                required: param.required,
                description: param.description.clone(),
                schema: param.schema.clone(),
                needs_form_tag: param.style == ParamStyle::Form,
            });
        }
    }

    if properties.is_empty() {
        return Ok(None);
    }
    resolver.define_object(&[type_name], properties).map(Some)
}

/// One entry per `(provider, scopes)`, tagged with the alternative it came from.
///
/// An empty requirement object (`{}`) makes authentication optional and contributes no
/// entries.
pub fn flatten_security(requirements: &[ShimSecurityRequirement]) -> Vec<SecurityDefinition> {
    requirements
        .iter()
        .enumerate()
        .flat_map(|(alternative, requirement)| {
            requirement
                .iter()
                .map(move |(provider, scopes)| SecurityDefinition {
                    provider_name: provider.clone(),
                    scopes: scopes.clone(),
                    alternative,
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CompilerOptions;
    use crate::oas::models::ParamEncoding;
    use crate::oas::shims::ShimOpenApi;
    use std::collections::BTreeMap;

    fn param(name: &str, location: ParamLocation) -> ParameterDefinition {
        let (style, explode) = location.default_style();
        ParameterDefinition {
            name: name.to_string(),
            field_name: name.to_string(),
            location,
            required: location == ParamLocation::Path,
            description: None,
            schema: Schema::primitive("String"),
            style,
            explode,
            encoding: ParamEncoding::Styled,
            content_type: None,
        }
    }

    #[test]
    fn test_template_names() {
        assert_eq!(
            path_template_names("/a/{x}/b/{.y}/{;z}/{w*}"),
            vec!["x", "y", "z", "w"]
        );
        assert!(path_template_names("/pets").is_empty());
    }

    #[test]
    fn test_path_params_follow_template_order() {
        let ordered = order_path_params(
            "/cat/{category}/pet/{id}",
            vec![param("id", ParamLocation::Path), param("category", ParamLocation::Path)],
        )
        .unwrap();
        let names: Vec<_> = ordered.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["category", "id"]);
    }

    #[test]
    fn test_path_param_mismatch() {
        let undeclared = order_path_params("/pets/{id}", vec![]).unwrap_err();
        assert!(matches!(undeclared, AppError::PathParameterMismatch { .. }));

        let extra = order_path_params(
            "/pets",
            vec![param("id", ParamLocation::Path)],
        )
        .unwrap_err();
        assert!(format!("{extra}").contains("id"));

        let repeated = order_path_params(
            "/pets/{id}/{id}",
            vec![param("id", ParamLocation::Path)],
        );
        assert!(repeated.is_err());
    }

    #[test]
    fn test_shared_parameters_take_precedence() {
        let mut shared = param("limit", ParamLocation::Query);
        shared.description = Some("path level".into());
        let mut local = param("limit", ParamLocation::Query);
        local.description = Some("operation level".into());
        let header = param("limit", ParamLocation::Header);

        let merged = merge_parameters(&[shared], vec![local, header]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].description.as_deref(), Some("path level"));
        assert_eq!(merged[1].location, ParamLocation::Header);
    }

    #[test]
    fn test_security_flattening() {
        let mut first = BTreeMap::new();
        first.insert("oauth".to_string(), vec!["read".to_string()]);
        first.insert("apiKey".to_string(), vec![]);
        let second = BTreeMap::new();
        let flat = flatten_security(&[first, second]);
        let providers: Vec<_> = flat
            .iter()
            .map(|s| (s.provider_name.as_str(), s.alternative))
            .collect();
        assert_eq!(providers, vec![("apiKey", 0), ("oauth", 0)]);
        assert_eq!(flat[1].scopes, vec!["read"]);
    }

    #[test]
    fn test_build_operation_params_object() {
        let doc = ShimOpenApi::from_yaml(
            r#"
paths:
  /pets/{petId}:
    get:
      parameters:
        - { name: petId, in: path, schema: { type: string } }
        - { name: limit, in: query, schema: { type: integer } }
        - { name: X-Trace, in: header, schema: { type: string } }
        - name: filter
          in: query
          schema:
            type: object
            additionalProperties: { type: string }
      responses:
        '204': { description: gone }
"#,
        )
        .unwrap();
        let opts = CompilerOptions::default();
        let mut resolver = SchemaResolver::new(&doc, &opts);
        let item = &doc.paths["/pets/{petId}"];
        let site = OperationSite {
            path: "/pets/{petId}",
            method: "GET",
            item,
            operation: item.get.as_ref().unwrap(),
        };

        let op = build_operation(&mut resolver, site, "ReadPets".into(), &[]).unwrap();
        assert_eq!(op.path_params.len(), 1);
        assert_eq!(op.params_type.as_deref(), Some("ReadPetsParams"));
        assert_eq!(op.query_params[1].schema, Schema::alias("ReadPetsParamsFilter"));

        let params = resolver.registry().schema("ReadPetsParams").unwrap();
        let fields: Vec<_> = params
            .properties
            .iter()
            .map(|p| (p.json_name.as_str(), p.needs_form_tag))
            .collect();
        assert_eq!(
            fields,
            vec![("limit", true), ("filter", true), ("X-Trace", false)]
        );
        assert_eq!(
            resolver
                .registry()
                .schema("ReadPetsParamsFilter")
                .map(|s| s.kind),
            Some(SchemaKind::Map)
        );
    }
}
