#![deny(missing_docs)]

//! # Parameter Resolution
//!
//! Resolves OpenAPI parameters into [`ParameterDefinition`]s: location, effective
//! `style`/`explode`, and whether the value is styled, JSON-encoded, or passed through.

use crate::error::{AppError, AppResult};
use crate::oas::identifiers::field_name;
use crate::oas::models::{ParamEncoding, ParamLocation, ParamStyle, ParameterDefinition, Schema};
use crate::oas::resolver::body::is_json_media_type;
use crate::oas::resolver::{child, SchemaResolver};
use crate::oas::shims::ShimParameter;
use utoipa::openapi::RefOr;

/// Resolves a parameter list.
///
/// Inline parameters synthesize their types under `hint_prefix` + name; referenced
/// parameters under their component key, so a shared definition is synthesized once.
pub fn describe_parameters(
    resolver: &mut SchemaResolver<'_>,
    params: &[RefOr<ShimParameter>],
    hint_prefix: &[String],
) -> AppResult<Vec<ParameterDefinition>> {
    let mut result = Vec::with_capacity(params.len());
    for param_or_ref in params {
        let def = match param_or_ref {
            RefOr::T(param) => {
                describe_parameter(resolver, param, &child(hint_prefix, &param.name))?
            }
            RefOr::Ref(r) => {
                let (key, param) = resolver.lookup_parameter(&r.ref_location)?;
                describe_parameter(resolver, param, &[key])?
            }
        };
        result.push(def);
    }
    Ok(result)
}

/// Resolves a single parameter.
pub fn describe_parameter(
    resolver: &mut SchemaResolver<'_>,
    param: &ShimParameter,
    hint: &[String],
) -> AppResult<ParameterDefinition> {
    let location = ParamLocation::parse(&param.location).ok_or_else(|| {
        AppError::UnsupportedParameterLocation {
            name: param.name.clone(),
            location: param.location.clone(),
        }
    })?;
    let (style, explode) = resolve_style(param, location)?;

    let (encoding, schema, content_type) = match param.content.len() {
        0 => {
            let schema = param
                .schema
                .as_ref()
                .ok_or_else(|| AppError::MissingParameterSchema {
                    name: param.name.clone(),
                })?;
            (ParamEncoding::Styled, resolver.resolve(schema, hint)?, None)
        }
        1 => {
            let (content_type, media) = param
                .content
                .iter()
                .next()
                .ok_or_else(|| AppError::MissingParameterSchema {
                    name: param.name.clone(),
                })?;
            if is_json_media_type(content_type) {
                let schema = resolver.resolve_optional(media.schema.as_ref(), hint)?;
                (ParamEncoding::Json, schema, Some(content_type.clone()))
            } else {
                (
                    ParamEncoding::PassThrough,
                    Schema::primitive("String"),
                    Some(content_type.clone()),
                )
            }
        }
        _ => (ParamEncoding::PassThrough, Schema::primitive("String"), None),
    };

    Ok(ParameterDefinition {
        name: param.name.clone(),
        field_name: field_name(&param.name)?,
        location,
        required: param.required || location == ParamLocation::Path,
        description: param.description.clone(),
        schema,
        style,
        explode,
        encoding,
        content_type,
    })
}

/// Effective style and explode.
///
/// A missing style falls back to the location default; a missing explode is `true`
/// exactly when the effective style is `form`.
fn resolve_style(param: &ShimParameter, location: ParamLocation) -> AppResult<(ParamStyle, bool)> {
    let style = match param.style.as_deref() {
        Some(raw) => ParamStyle::parse(raw).ok_or_else(|| AppError::InvalidStyle {
            name: param.name.clone(),
            style: raw.to_string(),
        })?,
        None => location.default_style().0,
    };
    let explode = param.explode.unwrap_or(style == ParamStyle::Form);
    Ok((style, explode))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CompilerOptions;
    use crate::oas::models::SchemaKind;
    use crate::oas::shims::ShimOpenApi;

    fn param(yaml: &str) -> ShimParameter {
        serde_yaml::from_str(yaml).unwrap()
    }

    fn describe(yaml: &str) -> AppResult<ParameterDefinition> {
        let doc = ShimOpenApi::default();
        let opts = CompilerOptions::default();
        let mut resolver = SchemaResolver::new(&doc, &opts);
        describe_parameter(&mut resolver, &param(yaml), &["Op".into(), "Params".into(), "x".into()])
    }

    #[test]
    fn test_style_defaults_by_location() {
        let path = describe("name: id\nin: path\nschema: { type: string }").unwrap();
        assert_eq!((path.style, path.explode), (ParamStyle::Simple, false));
        assert!(path.required);

        let header = describe("name: X-Trace\nin: header\nschema: { type: string }").unwrap();
        assert_eq!((header.style, header.explode), (ParamStyle::Simple, false));
        assert_eq!(header.field_name, "x_trace");

        let query = describe("name: limit\nin: query\nschema: { type: integer }").unwrap();
        assert_eq!((query.style, query.explode), (ParamStyle::Form, true));
        assert!(!query.required);

        let cookie = describe("name: session\nin: cookie\nschema: { type: string }").unwrap();
        assert_eq!((cookie.style, cookie.explode), (ParamStyle::Form, true));
    }

    #[test]
    fn test_explicit_style_wins() {
        let p = describe("name: ids\nin: query\nstyle: pipeDelimited\nschema: { type: array, items: { type: string } }")
            .unwrap();
        assert_eq!((p.style, p.explode), (ParamStyle::PipeDelimited, false));

        let p = describe("name: tags\nin: query\nexplode: false\nschema: { type: string }").unwrap();
        assert_eq!((p.style, p.explode), (ParamStyle::Form, false));
    }

    #[test]
    fn test_unknown_location_and_style_are_errors() {
        assert!(matches!(
            describe("name: x\nin: body\nschema: { type: string }"),
            Err(AppError::UnsupportedParameterLocation { .. })
        ));
        assert!(matches!(
            describe("name: x\nin: query\nstyle: fancy\nschema: { type: string }"),
            Err(AppError::InvalidStyle { .. })
        ));
        assert!(matches!(
            describe("name: x\nin: query"),
            Err(AppError::MissingParameterSchema { .. })
        ));
    }

    #[test]
    fn test_content_classification() {
        let json = describe(
            "name: filter\nin: query\ncontent:\n  application/json:\n    schema: { type: object, properties: { a: { type: string } } }",
        )
        .unwrap();
        assert!(json.is_json());
        assert_eq!(json.content_type.as_deref(), Some("application/json"));
        assert_eq!(json.schema.kind, SchemaKind::Alias);

        let raw = describe("name: blob\nin: query\ncontent:\n  text/csv: {}").unwrap();
        assert!(raw.is_pass_through());

        let many = describe(
            "name: f\nin: query\nschema: { type: string }\ncontent:\n  application/json: {}\n  text/plain: {}",
        )
        .unwrap();
        assert!(many.is_pass_through());
        assert!(many.content_type.is_none());

        let styled = describe("name: q\nin: query\nschema: { type: string }").unwrap();
        assert!(styled.is_styled());
    }
}
