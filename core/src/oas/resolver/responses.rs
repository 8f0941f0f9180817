#![deny(missing_docs)]

//! # Response Resolution
//!
//! Builds [`ResponseDefinition`]s per status code, in sorted status order.
//!
//! A response that references `#/components/responses/X` reuses the named type of `X`,
//! but only once per operation: a second status code referencing the same response
//! would make the response type ambiguous, so it gets fresh per-content types instead.

use crate::error::AppResult;
use crate::oas::identifiers::to_camel_case;
use crate::oas::models::{
    ResponseContentDefinition, ResponseDefinition, ResponseHeaderDefinition, Schema,
};
use crate::oas::resolver::body::{classify_content_type, NameTagger};
use crate::oas::resolver::types::unique_field_name;
use crate::oas::resolver::SchemaResolver;
use crate::oas::shims::{ShimHeader, ShimMediaType, ShimResponse};
use std::collections::{BTreeMap, HashSet};
use tracing::warn;
use utoipa::openapi::RefOr;

/// Builds the response definitions of one operation.
pub fn describe_responses(
    resolver: &mut SchemaResolver<'_>,
    operation_id: &str,
    responses: &BTreeMap<String, RefOr<ShimResponse>>,
) -> AppResult<Vec<ResponseDefinition>> {
    let mut aliased = HashSet::new();
    let mut definitions = Vec::with_capacity(responses.len());

    for (status_code, response_or_ref) in responses {
        let (response, component) = match response_or_ref {
            RefOr::T(r) => (r, None),
            RefOr::Ref(r) => {
                let (key, response) = resolver.lookup_response(&r.ref_location)?;
                (response, Some(key))
            }
        };

        let mut alias = None;
        if let Some(key) = &component {
            if let Some(rt) = resolver.response_type(key).cloned() {
                if aliased.insert(rt.name.clone()) {
                    alias = Some(rt);
                } else {
                    warn!(
                        operation_id,
                        status_code = %status_code,
                        response_type = %rt.name,
                        "response type already used by another status code; synthesizing fresh types"
                    );
                }
            }
        }

        let status_name = to_camel_case(status_code);
        let mut tagger = NameTagger::default();
        let mut contents = Vec::with_capacity(response.content.len());
        for (content_type, media) in &response.content {
            let family = classify_content_type(content_type);
            let Some((tag, _)) = tagger.tag(content_type, family) else {
                contents.push(ResponseContentDefinition {
                    content_type: content_type.clone(),
                    family,
                    name_tag: None,
                    schema: None,
                });
                continue;
            };

            let schema = match &alias {
                Some(rt) if rt.content_type == *content_type => Some(Schema::alias(rt.name.clone())),
                Some(rt) => resolve_content(resolver, media, &[rt.name.clone(), tag.clone()])?,
                None => {
                    let type_name = format!(
                        "{}{}{}{}",
                        operation_id,
                        status_name,
                        tag,
                        resolver.options().response_type_suffix
                    );
                    define_content_type(resolver, media, &type_name)?
                }
            };

            contents.push(ResponseContentDefinition {
                content_type: content_type.clone(),
                family,
                name_tag: Some(tag),
                schema,
            });
        }

        let headers = describe_headers(resolver, operation_id, &status_name, &response.headers)?;

        definitions.push(ResponseDefinition {
            status_code: status_code.clone(),
            description: response.description.clone(),
            contents,
            headers,
            ref_type: alias.map(|rt| rt.name),
        });
    }

    Ok(definitions)
}

/// Use-site schema of a media type, without forcing a named type.
fn resolve_content(
    resolver: &mut SchemaResolver<'_>,
    media: &ShimMediaType,
    path: &[String],
) -> AppResult<Option<Schema>> {
    match &media.schema {
        Some(schema) => resolver.resolve(schema, path).map(Some),
        None => Ok(None),
    }
}

/// Per-content response type `type_name`, aliasing or describing the media schema.
fn define_content_type(
    resolver: &mut SchemaResolver<'_>,
    media: &ShimMediaType,
    type_name: &str,
) -> AppResult<Option<Schema>> {
    let path = [type_name.to_string()];
    match &media.schema {
        None => Ok(None),
        Some(RefOr::T(inline)) => resolver.define_named(inline, &path, |_| {}).map(Some),
        Some(RefOr::Ref(r)) => {
            let target = resolver.resolve_ref(&r.ref_location, type_name)?;
            let name = resolver.define_schema(&path, target)?;
            Ok(Some(Schema::alias(name)))
        }
    }
}

fn describe_headers(
    resolver: &mut SchemaResolver<'_>,
    operation_id: &str,
    status_name: &str,
    headers: &BTreeMap<String, RefOr<ShimHeader>>,
) -> AppResult<Vec<ResponseHeaderDefinition>> {
    let mut taken = HashSet::new();
    let mut result = Vec::with_capacity(headers.len());
    for (name, header_or_ref) in headers {
        let header = match header_or_ref {
            RefOr::T(h) => h,
            RefOr::Ref(r) => resolver.lookup_header(&r.ref_location)?,
        };
        let hint = [
            format!("{operation_id}{status_name}"),
            name.clone(),
            "Header".to_string(),
        ];
        let schema = match &header.schema {
            Some(s) => resolver.resolve(s, &hint)?,
            None => Schema::primitive("String"),
        };
        result.push(ResponseHeaderDefinition {
            name: name.clone(),
            field_name: unique_field_name(name, &mut taken)?,
            required: header.required,
            schema,
        });
    }
    Ok(result)
}
