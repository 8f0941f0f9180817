#![deny(missing_docs)]

//! # Intermediate Representation
//!
//! The compiled, fully resolved view of a document. Nothing in here carries a `$ref`:
//! every reference has become either an alias to a named [`TypeDefinition`] or an
//! inline structural descriptor. All types serialize with `serde` so the IR can be
//! handed to an out-of-process renderer as JSON.

use crate::oas::identifiers::schema_name_to_type_name;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

/// Shape of a [`Schema`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaKind {
    /// Scalar (`i32`, `String`, ...) or untyped JSON.
    #[default]
    Primitive,
    /// Struct with named properties.
    Object,
    /// Homogeneous list.
    Array,
    /// Scalar restricted to a fixed value set.
    Enum,
    /// Tagged or untagged union of alternatives.
    Union,
    /// Use of a named type.
    Alias,
    /// String-keyed free-form map.
    Map,
}

/// A resolved type descriptor.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Schema {
    /// Shape.
    pub kind: SchemaKind,
    /// Rust type expression. For enums this is the underlying scalar.
    pub rust_type: String,
    /// Named type this descriptor refers to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ref_type: Option<String>,
    /// Schema description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether `null` is an accepted value.
    pub nullable: bool,
    /// Object properties in sorted wire-name order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<Property>,
    /// Whether keys beyond `properties` are accepted.
    pub has_additional_properties: bool,
    /// Value type of additional properties; `None` means untyped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_properties_type: Option<Box<Schema>>,
    /// Array item type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_type: Option<Box<Schema>>,
    /// Legal values of an enum.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<EnumValue>,
    /// Alternatives of a union.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub union_elements: Vec<UnionElement>,
    /// Union tag, when the document declares one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discriminator: Option<Discriminator>,
}

impl Schema {
    /// A scalar descriptor.
    pub fn primitive(rust_type: impl Into<String>) -> Self {
        Self {
            kind: SchemaKind::Primitive,
            rust_type: rust_type.into(),
            ..Default::default()
        }
    }

    /// A use of the named type `name`.
    pub fn alias(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            kind: SchemaKind::Alias,
            rust_type: name.clone(),
            ref_type: Some(name),
            ..Default::default()
        }
    }

    /// Untyped JSON value.
    pub fn any() -> Self {
        Self::primitive("serde_json::Value")
    }

    /// Whether this descriptor is a use of a named type.
    pub fn is_ref(&self) -> bool {
        self.ref_type.is_some()
    }

    /// Types synthesized for boilerplate helpers carry one of these shapes.
    pub fn needs_boilerplate(&self) -> Option<BoilerplateKind> {
        match self.kind {
            SchemaKind::Object if self.has_additional_properties => {
                Some(BoilerplateKind::AdditionalProperties)
            }
            SchemaKind::Union => Some(BoilerplateKind::Union),
            _ => None,
        }
    }
}

/// One property of an object schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Property {
    /// Rust field identifier.
    pub field_name: String,
    /// Wire name.
    pub json_name: String,
    /// Whether the property is listed in `required`.
    pub required: bool,
    /// Property description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Property type.
    pub schema: Schema,
    /// Set on form-encoded bodies and form-styled parameters.
    pub needs_form_tag: bool,
}

/// One legal value of an enum.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumValue {
    /// Variant identifier.
    pub variant: String,
    /// Wire value.
    pub value: JsonValue,
}

/// One alternative of a union.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnionElement {
    /// Variant identifier.
    pub variant: String,
    /// Alternative type.
    pub schema: Schema,
    /// Discriminator values mapping to this alternative.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub mapping_keys: Vec<String>,
}

/// Discriminator of a union.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Discriminator {
    /// Wire name of the tag property.
    pub property_name: String,
    /// Tag value → type name.
    pub mapping: BTreeMap<String, String>,
}

/// A named type, emitted exactly once.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeDefinition {
    /// Unique type name.
    pub name: String,
    /// Key this type was declared under, for component types.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json_name: Option<String>,
    /// Structural descriptor.
    pub schema: Schema,
}

/// Where a parameter travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamLocation {
    /// Path template segment.
    Path,
    /// Query string.
    Query,
    /// Request header.
    Header,
    /// Cookie.
    Cookie,
}

impl ParamLocation {
    /// Parses an `in` value; anything unknown yields `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "path" => Some(Self::Path),
            "query" => Some(Self::Query),
            "header" => Some(Self::Header),
            "cookie" => Some(Self::Cookie),
            _ => None,
        }
    }

    /// Style and explode used when the document is silent.
    pub fn default_style(self) -> (ParamStyle, bool) {
        match self {
            Self::Path | Self::Header => (ParamStyle::Simple, false),
            Self::Query | Self::Cookie => (ParamStyle::Form, true),
        }
    }
}

/// RFC 6570 serialization style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ParamStyle {
    /// `simple`
    Simple,
    /// `label`
    Label,
    /// `matrix`
    Matrix,
    /// `form`
    Form,
    /// `spaceDelimited`
    SpaceDelimited,
    /// `pipeDelimited`
    PipeDelimited,
    /// `deepObject`
    DeepObject,
}

impl ParamStyle {
    /// Parses a `style` value.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "simple" => Some(Self::Simple),
            "label" => Some(Self::Label),
            "matrix" => Some(Self::Matrix),
            "form" => Some(Self::Form),
            "spaceDelimited" => Some(Self::SpaceDelimited),
            "pipeDelimited" => Some(Self::PipeDelimited),
            "deepObject" => Some(Self::DeepObject),
            _ => None,
        }
    }
}

/// How a parameter value is put on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamEncoding {
    /// Styled per `style`/`explode`.
    Styled,
    /// JSON-encoded value.
    Json,
    /// Raw string handed through untouched.
    PassThrough,
}

/// A parameter of one operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterDefinition {
    /// Wire name.
    pub name: String,
    /// Rust field identifier.
    pub field_name: String,
    /// Location.
    pub location: ParamLocation,
    /// Whether the parameter must be supplied. Path parameters always are.
    pub required: bool,
    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Value type.
    pub schema: Schema,
    /// Effective style.
    pub style: ParamStyle,
    /// Effective explode.
    pub explode: bool,
    /// Encoding classification.
    pub encoding: ParamEncoding,
    /// Declared content type for content-based parameters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

impl ParameterDefinition {
    /// JSON-encoded parameter.
    pub fn is_json(&self) -> bool {
        self.encoding == ParamEncoding::Json
    }

    /// Pass-through parameter.
    pub fn is_pass_through(&self) -> bool {
        self.encoding == ParamEncoding::PassThrough
    }

    /// Styled parameter.
    pub fn is_styled(&self) -> bool {
        self.encoding == ParamEncoding::Styled
    }

    /// Type-level name of the parameter.
    pub fn type_name(&self) -> String {
        schema_name_to_type_name(&self.name)
    }
}

/// Media type families the compiler knows how to model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentFamily {
    /// `application/json`, `application/*+json`.
    Json,
    /// `multipart/*`.
    Multipart,
    /// `application/x-www-form-urlencoded`.
    Formdata,
    /// `text/plain`.
    Text,
    /// Anything else; carried as an opaque stream.
    Unclassified,
}

impl ContentFamily {
    /// Name tag used in synthesized type names; `None` for unclassified content.
    pub fn tag(self) -> Option<&'static str> {
        match self {
            Self::Json => Some("JSON"),
            Self::Multipart => Some("Multipart"),
            Self::Formdata => Some("Formdata"),
            Self::Text => Some("Text"),
            Self::Unclassified => None,
        }
    }
}

/// Per-property encoding of a form or multipart body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestBodyEncoding {
    /// Content type of the property.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// Serialization style.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    /// Explode modifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explode: Option<bool>,
}

/// One content type of a request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestBodyDefinition {
    /// Whether the body must be supplied.
    pub required: bool,
    /// Media type.
    pub content_type: String,
    /// Family of `content_type`.
    pub family: ContentFamily,
    /// Tag used in type and method names; `None` for unclassified content.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_tag: Option<String>,
    /// Body type; `None` for unclassified content.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
    /// The one body that gets the unsuffixed method name.
    pub default: bool,
    /// Property → encoding options.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub encoding: BTreeMap<String, RequestBodyEncoding>,
}

impl RequestBodyDefinition {
    /// Suffix for per-body method names, e.g. `WithFormdataBody`.
    pub fn suffix(&self) -> String {
        match (&self.name_tag, self.default) {
            (_, true) | (None, _) => String::new(),
            (Some(tag), false) => format!("With{tag}Body"),
        }
    }

    /// Whether a typed body can be generated.
    pub fn is_supported(&self) -> bool {
        self.name_tag.is_some()
    }

    /// Whether the media type contains no wildcard.
    pub fn is_fixed_content_type(&self) -> bool {
        !self.content_type.contains('*')
    }
}

/// One content type of a response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseContentDefinition {
    /// Media type.
    pub content_type: String,
    /// Family of `content_type`.
    pub family: ContentFamily,
    /// Tag used in type names; `None` for unclassified content.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_tag: Option<String>,
    /// Payload type; `None` for unclassified content or a missing schema.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
}

impl ResponseContentDefinition {
    /// Whether a typed payload can be generated.
    pub fn is_supported(&self) -> bool {
        self.name_tag.is_some()
    }

    /// Whether the media type contains no wildcard.
    pub fn has_fixed_content_type(&self) -> bool {
        !self.content_type.contains('*')
    }

    /// The name tag, or the camel-cased media type when unclassified.
    pub fn name_tag_or_content_type(&self) -> String {
        match &self.name_tag {
            Some(tag) => tag.clone(),
            None => schema_name_to_type_name(&self.content_type),
        }
    }
}

/// One response header.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseHeaderDefinition {
    /// Wire name.
    pub name: String,
    /// Rust field identifier.
    pub field_name: String,
    /// Whether the header is always present.
    pub required: bool,
    /// Value type.
    pub schema: Schema,
}

/// One status code of an operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseDefinition {
    /// Literal code, range (`2XX`) or `default`.
    pub status_code: String,
    /// Description.
    pub description: String,
    /// Content types in sorted order.
    pub contents: Vec<ResponseContentDefinition>,
    /// Headers in sorted order.
    pub headers: Vec<ResponseHeaderDefinition>,
    /// Named response type this response reuses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ref_type: Option<String>,
}

impl ResponseDefinition {
    /// Whether `status_code` is a literal number.
    pub fn has_fixed_status_code(&self) -> bool {
        self.status_code.parse::<u16>().is_ok()
    }

    /// Type-level spelling of the status code (`200` → `N200`, `default` → `Default`).
    pub fn type_name(&self) -> String {
        schema_name_to_type_name(&self.status_code)
    }

    /// Whether this response aliases a named response type.
    pub fn is_ref(&self) -> bool {
        self.ref_type.is_some()
    }
}

/// One `(provider, scopes)` entry of a security requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecurityDefinition {
    /// Security scheme name.
    pub provider_name: String,
    /// Required scopes.
    pub scopes: Vec<String>,
    /// Index of the requirement object (alternative) this entry belongs to.
    pub alternative: usize,
}

/// A compiled operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationDefinition {
    /// Identifier, explicit or synthesized.
    pub operation_id: String,
    /// Upper-case HTTP method.
    pub method: String,
    /// Path template.
    pub path: String,
    /// Summary.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Tags.
    pub tags: Vec<String>,
    /// Deprecation marker.
    pub deprecated: bool,
    /// Path parameters in template order.
    pub path_params: Vec<ParameterDefinition>,
    /// Query parameters.
    pub query_params: Vec<ParameterDefinition>,
    /// Header parameters.
    pub header_params: Vec<ParameterDefinition>,
    /// Cookie parameters.
    pub cookie_params: Vec<ParameterDefinition>,
    /// Synthesized parameter object, when there are non-path parameters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params_type: Option<String>,
    /// Whether a request body is mandatory.
    pub body_required: bool,
    /// Request body per content type.
    pub bodies: Vec<RequestBodyDefinition>,
    /// Responses in sorted status order.
    pub responses: Vec<ResponseDefinition>,
    /// Flattened security requirements.
    pub security: Vec<SecurityDefinition>,
    /// Names of the types synthesized for this operation.
    pub type_definitions: Vec<String>,
}

impl OperationDefinition {
    /// Every parameter except the path parameters.
    pub fn params(&self) -> Vec<&ParameterDefinition> {
        self.query_params
            .iter()
            .chain(&self.header_params)
            .chain(&self.cookie_params)
            .collect()
    }

    /// Every parameter, path parameters last.
    pub fn all_params(&self) -> Vec<&ParameterDefinition> {
        let mut all = self.params();
        all.extend(&self.path_params);
        all
    }

    /// Whether non-path parameters are bundled into a parameter object.
    pub fn requires_param_object(&self) -> bool {
        !self.params().is_empty()
    }

    /// Whether the operation takes a request body at all.
    pub fn has_body(&self) -> bool {
        !self.bodies.is_empty()
    }

    /// The body that gets the unsuffixed method name.
    pub fn default_body(&self) -> Option<&RequestBodyDefinition> {
        self.bodies.iter().find(|b| b.default)
    }
}

/// Shapes that need hand-written (de)serialization helpers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BoilerplateKind {
    /// Object with both properties and a free-form remainder.
    AdditionalProperties,
    /// Union of alternatives.
    Union,
}

/// A type needing a custom helper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Boilerplate {
    /// Type name.
    pub type_name: String,
    /// Kind of helper.
    pub kind: BoilerplateKind,
}

/// Output of a compilation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CompiledApi {
    /// Operations in sorted path, then method order.
    pub operations: Vec<OperationDefinition>,
    /// Named types in synthesis order.
    pub types: Vec<TypeDefinition>,
    /// Types needing custom helpers, in `types` order.
    pub boilerplate: Vec<Boilerplate>,
}

impl CompiledApi {
    /// Looks up a named type.
    pub fn type_named(&self, name: &str) -> Option<&TypeDefinition> {
        self.types.iter().find(|t| t.name == name)
    }

    /// Looks up an operation by identifier.
    pub fn operation(&self, operation_id: &str) -> Option<&OperationDefinition> {
        self.operations
            .iter()
            .find(|o| o.operation_id == operation_id)
    }
}
