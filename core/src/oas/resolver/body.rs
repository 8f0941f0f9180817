#![deny(missing_docs)]

//! # Body Resolution
//!
//! Content-type classification and request body modeling.
//!
//! Each media type of a body becomes one [`RequestBodyDefinition`]. The first
//! structured-data (JSON) media type in sorted order is the default body; further JSON
//! media types are tagged with their camel-cased media type. Inline schemas get a named
//! type `{OperationId}{Tag}Body`; form-encoded bodies tag every property for form
//! serialization.

use crate::error::AppResult;
use crate::oas::identifiers::to_camel_case;
use crate::oas::models::{
    ContentFamily, RequestBodyDefinition, RequestBodyEncoding, Schema,
};
use crate::oas::resolver::SchemaResolver;
use crate::oas::shims::{ShimMediaType, ShimRequestBody};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;
use utoipa::openapi::RefOr;

/// Whether `content_type` is `application/json` or an `application/*+json` variant.
///
/// Parameters (`; charset=utf-8`) and case are ignored.
pub fn is_json_media_type(content_type: &str) -> bool {
    static JSON_RE: OnceLock<Regex> = OnceLock::new();
    let re = JSON_RE.get_or_init(|| {
        Regex::new(r"^application/(?:[a-z0-9.+-]+\+)?json$").expect("Invalid regex constant")
    });
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    re.is_match(&essence)
}

/// Classifies a media type.
pub fn classify_content_type(content_type: &str) -> ContentFamily {
    if is_json_media_type(content_type) {
        ContentFamily::Json
    } else if content_type.starts_with("multipart/") {
        ContentFamily::Multipart
    } else if content_type == "application/x-www-form-urlencoded" {
        ContentFamily::Formdata
    } else if content_type == "text/plain" {
        ContentFamily::Text
    } else {
        ContentFamily::Unclassified
    }
}

/// Hands out name tags, making only the first JSON media type the default.
#[derive(Debug, Default)]
pub(crate) struct NameTagger {
    json_default_taken: bool,
}

impl NameTagger {
    /// Tag and default flag for `content_type`; `None` for unclassified content.
    pub(crate) fn tag(&mut self, content_type: &str, family: ContentFamily) -> Option<(String, bool)> {
        match family {
            ContentFamily::Json if !self.json_default_taken => {
                self.json_default_taken = true;
                Some(("JSON".to_string(), true))
            }
            ContentFamily::Json => Some((to_camel_case(&content_type.replace('/', "-")), false)),
            other => other.tag().map(|t| (t.to_string(), false)),
        }
    }
}

/// Builds the body definitions of one operation.
pub fn describe_request_body(
    resolver: &mut SchemaResolver<'_>,
    operation_id: &str,
    body: &RefOr<ShimRequestBody>,
) -> AppResult<Vec<RequestBodyDefinition>> {
    let body = match body {
        RefOr::T(b) => b,
        RefOr::Ref(r) => resolver.lookup_request_body(&r.ref_location)?,
    };

    let mut tagger = NameTagger::default();
    let mut definitions = Vec::with_capacity(body.content.len());
    for (content_type, media) in &body.content {
        let family = classify_content_type(content_type);
        let Some((tag, default)) = tagger.tag(content_type, family) else {
            definitions.push(RequestBodyDefinition {
                required: body.required,
                content_type: content_type.clone(),
                family,
                name_tag: None,
                schema: None,
                default: false,
                encoding: BTreeMap::new(),
            });
            continue;
        };

        let type_name = format!("{operation_id}{tag}Body");
        let schema = body_schema(resolver, media, family, &type_name)?;

        definitions.push(RequestBodyDefinition {
            required: body.required,
            content_type: content_type.clone(),
            family,
            name_tag: Some(tag),
            schema: Some(schema),
            default,
            encoding: encoding_map(media),
        });
    }
    Ok(definitions)
}

fn body_schema(
    resolver: &mut SchemaResolver<'_>,
    media: &ShimMediaType,
    family: ContentFamily,
    type_name: &str,
) -> AppResult<Schema> {
    match &media.schema {
        None if family == ContentFamily::Text => Ok(Schema::primitive("String")),
        None => Ok(Schema::any()),
        Some(RefOr::Ref(r)) => resolver.resolve_ref(&r.ref_location, type_name),
        Some(RefOr::T(inline)) => {
            resolver.define_named(inline, &[type_name.to_string()], |schema| {
                if family == ContentFamily::Formdata {
                    for prop in &mut schema.properties {
                        prop.needs_form_tag = true;
                    }
                }
            })
        }
    }
}

fn encoding_map(media: &ShimMediaType) -> BTreeMap<String, RequestBodyEncoding> {
    media
        .encoding
        .iter()
        .map(|(property, enc)| {
            (
                property.clone(),
                RequestBodyEncoding {
                    content_type: enc.content_type.clone(),
                    style: enc.style.clone(),
                    explode: enc.explode,
                },
            )
        })
        .collect()
}
