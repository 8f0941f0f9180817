#![deny(missing_docs)]

//! # Schema Resolution
//!
//! [`SchemaResolver`] is the context object threaded through a compilation. It owns the
//! [`TypeRegistry`] and is the only thing that adds named types to it.
//!
//! - **types**: structural description of schemas (objects, arrays, enums, unions, `allOf`).
//! - **params**: parameter location, style and encoding.
//! - **body**: request body content classification.
//! - **responses**: response content, headers and alias deduplication.

pub mod body;
pub mod params;
pub mod responses;
pub mod types;

use crate::config::CompilerOptions;
use crate::error::{AppError, AppResult};
use crate::oas::identifiers::{schema_name_to_type_name, type_name};
use crate::oas::models::{Property, Schema, SchemaKind, TypeDefinition};
use crate::oas::ref_utils::{local_component_name, parse_component_ref};
use crate::oas::registry::{TypeOrigin, TypeRegistry};
use crate::oas::resolver::body::is_json_media_type;
use crate::oas::shims::{ShimHeader, ShimOpenApi, ShimParameter, ShimRequestBody, ShimResponse, ShimSchema};
use std::collections::BTreeMap;
use tracing::debug;
use utoipa::openapi::RefOr;

pub use body::describe_request_body;
pub use params::describe_parameters;
pub use responses::describe_responses;

/// Longest `$ref` → `$ref` chain followed before giving up.
const MAX_REF_DEPTH: usize = 32;

/// Named type generated for a component response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ResponseType {
    /// Type name, including the configured suffix.
    pub name: String,
    /// Media type whose schema the type describes.
    pub content_type: String,
}

/// Resolution context for one document.
pub struct SchemaResolver<'a> {
    doc: &'a ShimOpenApi,
    options: &'a CompilerOptions,
    registry: TypeRegistry,
    response_types: BTreeMap<String, ResponseType>,
    expanding: Vec<String>,
}

impl<'a> SchemaResolver<'a> {
    /// Creates a resolver with an empty registry.
    pub fn new(doc: &'a ShimOpenApi, options: &'a CompilerOptions) -> Self {
        Self {
            doc,
            options,
            registry: TypeRegistry::new(),
            response_types: BTreeMap::new(),
            expanding: Vec::new(),
        }
    }

    /// Options of this compilation.
    pub fn options(&self) -> &'a CompilerOptions {
        self.options
    }

    /// The document being compiled.
    pub fn document(&self) -> &'a ShimOpenApi {
        self.doc
    }

    /// Read access to the registry.
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Current registry position.
    pub fn mark(&self) -> usize {
        self.registry.mark()
    }

    /// Types reserved since `mark`.
    pub fn names_since(&self, mark: usize) -> Vec<String> {
        self.registry.names_since(mark)
    }

    /// Finishes the compilation unit.
    pub fn into_definitions(self) -> AppResult<Vec<TypeDefinition>> {
        self.registry.into_definitions()
    }

    /// Registers and describes every component schema, then every component response.
    ///
    /// All schema names are reserved before any is described, so forward and circular
    /// references between components resolve to aliases.
    pub fn register_components(&mut self) -> AppResult<()> {
        let doc = self.doc;
        let schemas = &doc.components.schemas;
        for key in schemas.keys() {
            let base = type_name(key)?;
            let (name, _) = self
                .registry
                .reserve(&base, TypeOrigin::Component(key.clone()))?;
            if self.options.is_schema_excluded(key) {
                debug!(schema = %key, "schema declared externally");
                self.registry.mark_external(&name);
            }
        }
        for key in schemas.keys() {
            if !self.options.is_schema_excluded(key) {
                self.resolve_component(key)?;
            }
        }
        self.register_responses()
    }

    fn register_responses(&mut self) -> AppResult<()> {
        let doc = self.doc;
        let options = self.options;
        let suffix = &options.response_type_suffix;
        for key in doc.components.responses.keys() {
            let reference = format!("#/components/responses/{key}");
            let (_, response) = self.lookup_response(&reference)?;
            let Some((content_type, schema)) = first_json_schema(response) else {
                continue;
            };

            let base = format!("{}{}", type_name(key)?, suffix);
            let (name, fresh) = self
                .registry
                .reserve(&base, TypeOrigin::Response(key.clone()))?;
            if fresh {
                let described = match schema {
                    RefOr::Ref(r) => self.resolve_ref(&r.ref_location, &reference),
                    RefOr::T(s) => {
                        self.registry.begin(&name);
                        let result = self.describe(s, &[name.clone()], &name);
                        self.registry.end(&name);
                        result
                    }
                };
                self.registry.fill(&name, described?)?;
                debug!(type_name = %name, "described component response");
            }
            self.response_types.insert(
                key.clone(),
                ResponseType {
                    name,
                    content_type: content_type.to_string(),
                },
            );
        }
        Ok(())
    }

    /// Type generated for component response `key`, if it has structured content.
    pub(crate) fn response_type(&self, key: &str) -> Option<&ResponseType> {
        self.response_types.get(key)
    }

    fn component_name(&self, key: &str) -> Option<String> {
        self.registry
            .name_for(&TypeOrigin::Component(key.to_string()))
            .map(str::to_string)
    }

    /// Describes component schema `key` (once) and returns its type name.
    ///
    /// A component already being described further up the stack is returned as-is.
    pub(crate) fn resolve_component(&mut self, key: &str) -> AppResult<String> {
        let name = self
            .component_name(key)
            .ok_or_else(|| AppError::UnresolvedReference {
                reference: format!("#/components/schemas/{key}"),
                pointer: key.to_string(),
            })?;
        if self.registry.is_filled(&name)
            || self.registry.is_external(&name)
            || !self.registry.begin(&name)
        {
            return Ok(name);
        }

        let doc = self.doc;
        let described = match doc.components.schemas.get(key) {
            Some(RefOr::T(schema)) => self.describe(schema, &[name.clone()], &name),
            Some(RefOr::Ref(r)) => self.resolve_ref(&r.ref_location, key),
            None => Err(AppError::UnresolvedReference {
                reference: format!("#/components/schemas/{key}"),
                pointer: key.to_string(),
            }),
        };
        self.registry.end(&name);
        self.registry.fill(&name, described?)?;
        debug!(type_name = %name, "described component schema");
        Ok(name)
    }

    /// Resolves a use site of a schema.
    ///
    /// References become aliases; inline objects, arrays, enums and unions are
    /// synthesized as named types from `path`; primitives and plain maps stay inline.
    pub fn resolve(&mut self, schema: &RefOr<ShimSchema>, path: &[String]) -> AppResult<Schema> {
        match schema {
            RefOr::Ref(r) => self.resolve_ref(&r.ref_location, &path.join(".")),
            RefOr::T(s) => self.resolve_inline(s, path),
        }
    }

    /// Like [`SchemaResolver::resolve`], with untyped JSON for a missing schema.
    pub fn resolve_optional(
        &mut self,
        schema: Option<&RefOr<ShimSchema>>,
        path: &[String],
    ) -> AppResult<Schema> {
        match schema {
            Some(s) => self.resolve(s, path),
            None => Ok(Schema::any()),
        }
    }

    /// Turns a schema `$ref` into an alias.
    ///
    /// Same-document references alias the component's type; references into other
    /// documents are qualified through the import mapping.
    pub fn resolve_ref(&mut self, reference: &str, pointer: &str) -> AppResult<Schema> {
        let unresolved = || AppError::UnresolvedReference {
            reference: reference.to_string(),
            pointer: pointer.to_string(),
        };
        let target = parse_component_ref(reference).ok_or_else(unresolved)?;
        if target.section != "schemas" {
            return Err(unresolved());
        }

        match &target.document {
            None => {
                let name = self.component_name(&target.name).ok_or_else(unresolved)?;
                Ok(Schema::alias(name))
            }
            Some(document) => {
                let module = self
                    .options
                    .import_mapping
                    .get(document)
                    .ok_or_else(unresolved)?;
                Ok(Schema::alias(format!("{}::{}", module, type_name(&target.name)?)))
            }
        }
    }

    fn resolve_inline(&mut self, s: &ShimSchema, path: &[String]) -> AppResult<Schema> {
        if let Some(reference) = types::single_all_of_ref(s) {
            let mut alias = self.resolve_ref(reference, &path.join("."))?;
            alias.description = s.description.clone();
            alias.nullable = s.is_nullable();
            return Ok(alias);
        }
        if types::needs_named_type(s) {
            return self.define_named(s, path, |_| {});
        }
        let mut schema = if s.is_object_like() {
            self.describe_map(s, path)?
        } else {
            Schema::primitive(types::primitive_rust_type(s))
        };
        schema.description = s.description.clone();
        schema.nullable = s.is_nullable();
        Ok(schema)
    }

    /// Synthesizes a named type for `s` at `path` and returns an alias to it.
    ///
    /// `adjust` runs on the fresh descriptor before it is stored.
    pub fn define_named(
        &mut self,
        s: &ShimSchema,
        path: &[String],
        adjust: impl FnOnce(&mut Schema),
    ) -> AppResult<Schema> {
        let base = hint_name(path)?;
        let (name, fresh) = self
            .registry
            .reserve(&base, TypeOrigin::Synthesized(path.to_vec()))?;
        if fresh {
            self.registry.begin(&name);
            let described = self.describe(s, path, &name);
            self.registry.end(&name);
            let mut schema = described?;
            adjust(&mut schema);
            self.registry.fill(&name, schema)?;
            debug!(type_name = %name, "synthesized inline type");
        }
        let mut alias = Schema::alias(name);
        alias.nullable = s.is_nullable();
        Ok(alias)
    }

    /// Stores an already built descriptor under a name derived from `path`.
    pub fn define_schema(&mut self, path: &[String], schema: Schema) -> AppResult<String> {
        let base = hint_name(path)?;
        let (name, fresh) = self
            .registry
            .reserve(&base, TypeOrigin::Synthesized(path.to_vec()))?;
        if fresh {
            self.registry.fill(&name, schema)?;
            debug!(type_name = %name, "synthesized type");
        }
        Ok(name)
    }

    /// Stores an object type made of ready-built `properties`.
    pub fn define_object(&mut self, path: &[String], properties: Vec<Property>) -> AppResult<String> {
        let base = hint_name(path)?;
        let (name, fresh) = self
            .registry
            .reserve(&base, TypeOrigin::Synthesized(path.to_vec()))?;
        if fresh {
            let schema = Schema {
                kind: SchemaKind::Object,
                rust_type: name.clone(),
                properties,
                ..Default::default()
            };
            self.registry.fill(&name, schema)?;
            debug!(type_name = %name, "synthesized object type");
        }
        Ok(name)
    }

    /// Raw component schema behind a reference; `None` for external documents.
    pub(crate) fn raw_schema(&self, reference: &str) -> AppResult<Option<&'a ShimSchema>> {
        match parse_component_ref(reference) {
            Some(target) if !target.is_local() => Ok(None),
            _ => follow_ref(reference, "schemas", &self.doc.components.schemas)
                .map(|(_, s)| Some(s)),
        }
    }

    /// Follows a parameter reference; returns the referenced key and the parameter.
    pub(crate) fn lookup_parameter(&self, reference: &str) -> AppResult<(String, &'a ShimParameter)> {
        follow_ref(reference, "parameters", &self.doc.components.parameters)
    }

    /// Follows a request body reference.
    pub(crate) fn lookup_request_body(&self, reference: &str) -> AppResult<&'a ShimRequestBody> {
        follow_ref(reference, "requestBodies", &self.doc.components.request_bodies).map(|(_, b)| b)
    }

    /// Follows a response reference; returns the referenced key and the response.
    pub(crate) fn lookup_response(&self, reference: &str) -> AppResult<(String, &'a ShimResponse)> {
        follow_ref(reference, "responses", &self.doc.components.responses)
    }

    /// Follows a header reference.
    pub(crate) fn lookup_header(&self, reference: &str) -> AppResult<&'a ShimHeader> {
        follow_ref(reference, "headers", &self.doc.components.headers).map(|(_, h)| h)
    }
}

/// Type name for a synthesis hint path: each element camel-cased, concatenated.
pub(crate) fn hint_name(path: &[String]) -> AppResult<String> {
    let name: String = path.iter().map(|p| schema_name_to_type_name(p)).collect();
    if name.is_empty() {
        return Err(AppError::InvalidIdentifier(format!(
            "hint path {:?} yields an empty type name",
            path
        )));
    }
    Ok(name)
}

/// `path` extended by one element.
pub(crate) fn child(path: &[String], element: &str) -> Vec<String> {
    let mut next = path.to_vec();
    next.push(element.to_string());
    next
}

fn first_json_schema(response: &ShimResponse) -> Option<(&str, &RefOr<ShimSchema>)> {
    response
        .content
        .iter()
        .filter(|(ct, _)| is_json_media_type(ct))
        .find_map(|(ct, media)| media.schema.as_ref().map(|s| (ct.as_str(), s)))
}

/// Follows `$ref` chains within one components section.
///
/// Returns the key the first reference named, and the inline value at the end.
fn follow_ref<'m, T>(
    reference: &str,
    section: &str,
    map: &'m BTreeMap<String, RefOr<T>>,
) -> AppResult<(String, &'m T)> {
    let unresolved = |pointer: &str| AppError::UnresolvedReference {
        reference: reference.to_string(),
        pointer: pointer.to_string(),
    };

    let mut first_key = None;
    let mut current = reference.to_string();
    for _ in 0..MAX_REF_DEPTH {
        let key = local_component_name(&current, section)
            .ok_or_else(|| unresolved(&format!("#/components/{section}")))?;
        let entry = map.get(&key).ok_or_else(|| unresolved(&current))?;
        let first = first_key.get_or_insert_with(|| key.clone()).clone();
        match entry {
            RefOr::T(value) => return Ok((first, value)),
            RefOr::Ref(next) => current = next.ref_location.clone(),
        }
    }
    Err(unresolved("reference chain too deep"))
}
