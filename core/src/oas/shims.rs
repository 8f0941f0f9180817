#![deny(missing_docs)]

//! # Document Shims
//!
//! Intermediate deserialization layer between the raw YAML/JSON document and the
//! compiler. Only the fields the compiler reads are modeled; unknown keys are ignored.
//!
//! Every map is a `BTreeMap` so iteration is in sorted key order, which is what makes
//! the compiled output independent of the key order in the source document.
//! Reference-or-inline nodes use `utoipa::openapi::RefOr`.

use crate::error::AppResult;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use utoipa::openapi::RefOr;

/// One security requirement object: provider name → scopes.
pub type ShimSecurityRequirement = BTreeMap<String, Vec<String>>;

/// Root document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShimOpenApi {
    /// OpenAPI version (e.g. "3.0.3").
    #[serde(default)]
    pub openapi: Option<String>,
    /// Path templates → path items.
    #[serde(default)]
    pub paths: BTreeMap<String, ShimPathItem>,
    /// Reusable components.
    #[serde(default)]
    pub components: ShimComponents,
    /// Document-level security, applied when an operation declares none.
    #[serde(default)]
    pub security: Option<Vec<ShimSecurityRequirement>>,
}

impl ShimOpenApi {
    /// Parses a YAML (or JSON, which is a YAML subset) document.
    pub fn from_yaml(text: &str) -> AppResult<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Parses a JSON document.
    pub fn from_json(text: &str) -> AppResult<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Reusable definitions under `#/components`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShimComponents {
    /// Named schemas.
    #[serde(default)]
    pub schemas: BTreeMap<String, RefOr<ShimSchema>>,
    /// Named parameters.
    #[serde(default)]
    pub parameters: BTreeMap<String, RefOr<ShimParameter>>,
    /// Named request bodies.
    #[serde(default)]
    pub request_bodies: BTreeMap<String, RefOr<ShimRequestBody>>,
    /// Named responses.
    #[serde(default)]
    pub responses: BTreeMap<String, RefOr<ShimResponse>>,
    /// Named headers.
    #[serde(default)]
    pub headers: BTreeMap<String, RefOr<ShimHeader>>,
}

/// A path item: shared parameters plus one operation per method.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShimPathItem {
    /// Short summary applying to all operations.
    pub summary: Option<String>,
    /// Long description applying to all operations.
    pub description: Option<String>,
    /// Parameters shared by every operation on the path.
    #[serde(default)]
    pub parameters: Vec<RefOr<ShimParameter>>,
    /// `GET` operation.
    pub get: Option<ShimOperation>,
    /// `PUT` operation.
    pub put: Option<ShimOperation>,
    /// `POST` operation.
    pub post: Option<ShimOperation>,
    /// `DELETE` operation.
    pub delete: Option<ShimOperation>,
    /// `OPTIONS` operation.
    pub options: Option<ShimOperation>,
    /// `HEAD` operation.
    pub head: Option<ShimOperation>,
    /// `PATCH` operation.
    pub patch: Option<ShimOperation>,
    /// `TRACE` operation.
    pub trace: Option<ShimOperation>,
}

impl ShimPathItem {
    /// Operations keyed by upper-case method, in sorted method order.
    pub fn operations(&self) -> Vec<(&'static str, &ShimOperation)> {
        [
            ("DELETE", &self.delete),
            ("GET", &self.get),
            ("HEAD", &self.head),
            ("OPTIONS", &self.options),
            ("PATCH", &self.patch),
            ("POST", &self.post),
            ("PUT", &self.put),
            ("TRACE", &self.trace),
        ]
        .into_iter()
        .filter_map(|(method, op)| op.as_ref().map(|o| (method, o)))
        .collect()
    }
}

/// One operation under a path item.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShimOperation {
    /// Explicit identifier, if the document provides one.
    pub operation_id: Option<String>,
    /// Short summary.
    pub summary: Option<String>,
    /// Long description.
    pub description: Option<String>,
    /// Grouping tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Operation-level parameters.
    #[serde(default)]
    pub parameters: Vec<RefOr<ShimParameter>>,
    /// Request body.
    pub request_body: Option<RefOr<ShimRequestBody>>,
    /// Status code → response.
    #[serde(default)]
    pub responses: BTreeMap<String, RefOr<ShimResponse>>,
    /// `None` inherits document security; `Some(vec![])` clears it.
    #[serde(default, deserialize_with = "deserialize_present")]
    pub security: Option<Vec<ShimSecurityRequirement>>,
    /// Deprecation marker.
    #[serde(default)]
    pub deprecated: bool,
}

/// Keeps the distinction between an absent key and an explicit empty list.
fn deserialize_present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// A parameter object.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShimParameter {
    /// Wire name.
    pub name: String,
    /// Location (`path`, `query`, `header`, `cookie`).
    #[serde(rename = "in")]
    pub location: String,
    /// Description.
    pub description: Option<String>,
    /// Whether the parameter must be supplied.
    #[serde(default)]
    pub required: bool,
    /// Schema, for styled parameters.
    pub schema: Option<RefOr<ShimSchema>>,
    /// Media type map, mutually exclusive with `schema`.
    #[serde(default)]
    pub content: BTreeMap<String, ShimMediaType>,
    /// Serialization style.
    pub style: Option<String>,
    /// Explode modifier.
    pub explode: Option<bool>,
}

/// A request body object.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShimRequestBody {
    /// Description.
    pub description: Option<String>,
    /// Media type → content.
    #[serde(default)]
    pub content: BTreeMap<String, ShimMediaType>,
    /// Whether the body must be supplied.
    #[serde(default)]
    pub required: bool,
}

/// A media type object.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShimMediaType {
    /// Payload schema.
    pub schema: Option<RefOr<ShimSchema>>,
    /// Per-property encoding for form and multipart payloads.
    #[serde(default)]
    pub encoding: BTreeMap<String, ShimEncoding>,
}

/// An encoding object.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShimEncoding {
    /// Content type of the encoded property.
    pub content_type: Option<String>,
    /// Serialization style.
    pub style: Option<String>,
    /// Explode modifier.
    pub explode: Option<bool>,
}

/// A response object.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShimResponse {
    /// Description (required by OpenAPI, tolerated when missing).
    #[serde(default)]
    pub description: String,
    /// Media type → content.
    #[serde(default)]
    pub content: BTreeMap<String, ShimMediaType>,
    /// Header name → header.
    #[serde(default)]
    pub headers: BTreeMap<String, RefOr<ShimHeader>>,
}

/// A header object.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShimHeader {
    /// Description.
    pub description: Option<String>,
    /// Whether the header is always present.
    #[serde(default)]
    pub required: bool,
    /// Value schema.
    pub schema: Option<RefOr<ShimSchema>>,
}

/// `type` may be a single name or, in OpenAPI 3.1, a list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ShimSchemaType {
    /// `type: string`
    Single(String),
    /// `type: [string, "null"]`
    Multiple(Vec<String>),
}

/// `additionalProperties` is either a flag or a schema.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ShimAdditionalProperties {
    /// `additionalProperties: true|false`
    Flag(bool),
    /// `additionalProperties: { ... }`
    Schema(Box<RefOr<ShimSchema>>),
}

/// A discriminator object.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShimDiscriminator {
    /// Property holding the variant tag.
    pub property_name: String,
    /// Tag value → `$ref`.
    #[serde(default)]
    pub mapping: BTreeMap<String, String>,
}

/// A schema object.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShimSchema {
    /// JSON type name(s).
    #[serde(rename = "type")]
    pub schema_type: Option<ShimSchemaType>,
    /// Format modifier (`int64`, `date-time`, ...).
    pub format: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Object properties.
    #[serde(default)]
    pub properties: BTreeMap<String, RefOr<ShimSchema>>,
    /// Required property names.
    #[serde(default)]
    pub required: Vec<String>,
    /// Array item schema.
    pub items: Option<Box<RefOr<ShimSchema>>>,
    /// Allowed values.
    #[serde(rename = "enum", default)]
    pub enum_values: Vec<JsonValue>,
    /// Free-form property policy.
    pub additional_properties: Option<ShimAdditionalProperties>,
    /// Members to merge.
    #[serde(default)]
    pub all_of: Vec<RefOr<ShimSchema>>,
    /// Exclusive alternatives.
    #[serde(default)]
    pub one_of: Vec<RefOr<ShimSchema>>,
    /// Inclusive alternatives.
    #[serde(default)]
    pub any_of: Vec<RefOr<ShimSchema>>,
    /// Union tag.
    pub discriminator: Option<ShimDiscriminator>,
    /// OpenAPI 3.0 nullability.
    #[serde(default)]
    pub nullable: bool,
}

impl ShimSchema {
    /// The primary (non-null) type name.
    pub fn primary_type(&self) -> Option<&str> {
        match &self.schema_type {
            Some(ShimSchemaType::Single(t)) => Some(t.as_str()),
            Some(ShimSchemaType::Multiple(ts)) => {
                ts.iter().map(String::as_str).find(|t| *t != "null")
            }
            None => None,
        }
    }

    /// `nullable: true` or a `"null"` member in a type list.
    pub fn is_nullable(&self) -> bool {
        self.nullable
            || matches!(&self.schema_type, Some(ShimSchemaType::Multiple(ts)) if ts.iter().any(|t| t == "null"))
    }

    /// Whether the schema declares an object shape (explicitly or through properties).
    pub fn is_object_like(&self) -> bool {
        self.primary_type() == Some("object")
            || (self.primary_type().is_none()
                && (!self.properties.is_empty() || self.additional_properties.is_some()))
    }
}
