#![deny(missing_docs)]

//! # Type Mapping
//!
//! Structural description of schema nodes into [`Schema`] descriptors.
//!
//! Scalars follow the usual Rust mapping:
//! - `integer` → `i32` (`int64` → `i64`)
//! - `number` → `f64` (`float` → `f32`)
//! - `string` → `String`, with `uuid`, `date-time`, `date`, `password` and binary formats
//!   mapped to dedicated types
//! - anything untyped → `serde_json::Value`

use crate::error::{AppError, AppResult};
use crate::oas::identifiers::{escape_keyword, field_name, schema_name_to_type_name};
use crate::oas::models::{
    Discriminator, EnumValue, Property, Schema, SchemaKind, UnionElement,
};
use crate::oas::ref_utils::{local_component_name, parse_component_ref};
use crate::oas::resolver::{child, SchemaResolver};
use crate::oas::shims::{
    ShimAdditionalProperties, ShimDiscriminator, ShimSchema, ShimSchemaType,
};
use serde_json::Value as JsonValue;
use std::collections::{BTreeMap, HashSet};
use utoipa::openapi::RefOr;

/// Maps a scalar schema to a Rust type expression.
pub(crate) fn primitive_rust_type(s: &ShimSchema) -> String {
    let format = s.format.as_deref();
    let ty = match s.primary_type() {
        Some("integer") => match format {
            Some("int64") => "i64",
            _ => "i32",
        },
        Some("number") => match format {
            Some("float") => "f32",
            _ => "f64",
        },
        Some("boolean") => "bool",
        Some("string") => match format {
            Some("uuid") => "Uuid",
            Some("date-time") => "DateTime",
            Some("date") => "NaiveDate",
            Some("password") => "Secret<String>",
            Some("binary") | Some("byte") => "Vec<u8>",
            _ => "String",
        },
        _ => "serde_json::Value",
    };
    ty.to_string()
}

/// Whether an inline schema gets its own named type at the use site.
pub(crate) fn needs_named_type(s: &ShimSchema) -> bool {
    !s.all_of.is_empty()
        || !s.one_of.is_empty()
        || !s.any_of.is_empty()
        || !s.enum_values.is_empty()
        || s.primary_type() == Some("array")
        || (s.is_object_like()
            && (!s.properties.is_empty()
                || matches!(s.additional_properties, Some(ShimAdditionalProperties::Flag(false)))))
}

/// Target of an `allOf` that wraps a single reference and adds nothing structural.
///
/// This is the usual way to attach `nullable` or a description to a `$ref`.
pub(crate) fn single_all_of_ref(s: &ShimSchema) -> Option<&str> {
    match s.all_of.as_slice() {
        [RefOr::Ref(r)]
            if s.properties.is_empty()
                && s.additional_properties.is_none()
                && s.one_of.is_empty()
                && s.any_of.is_empty()
                && s.enum_values.is_empty()
                && s.items.is_none()
                && s.discriminator.is_none()
                && matches!(s.primary_type(), None | Some("object")) =>
        {
            Some(r.ref_location.as_str())
        }
        _ => None,
    }
}

/// Object shapes that may take part in `allOf` or a discriminated union.
fn is_object_shape(s: &ShimSchema) -> bool {
    s.is_object_like() || !s.all_of.is_empty()
}

/// How far nested named types are followed when comparing `allOf` member shapes.
const MAX_SHAPE_DEPTH: usize = 16;

/// Accumulator for `allOf` members.
#[derive(Default)]
struct MergedObject {
    properties: BTreeMap<String, Property>,
    has_additional_properties: bool,
    additional_properties_type: Option<Box<Schema>>,
}

impl MergedObject {
    fn absorb(
        &mut self,
        part: Schema,
        pointer: &str,
        same_shape: impl Fn(&Schema, &Schema) -> bool,
    ) -> AppResult<()> {
        match part.kind {
            SchemaKind::Object => {}
            SchemaKind::Map => {
                self.has_additional_properties = true;
                if self.additional_properties_type.is_none() {
                    self.additional_properties_type = part.additional_properties_type;
                }
                return Ok(());
            }
            other => {
                return Err(AppError::IncompatibleComposition {
                    pointer: pointer.to_string(),
                    detail: format!("allOf member of kind {:?} is not an object", other),
                })
            }
        }

        for prop in part.properties {
            match self.properties.get_mut(&prop.json_name) {
                Some(existing) => {
                    if !same_shape(&existing.schema, &prop.schema) {
                        return Err(AppError::IncompatibleComposition {
                            pointer: pointer.to_string(),
                            detail: format!(
                                "property '{}' is both {} and {}",
                                prop.json_name, existing.schema.rust_type, prop.schema.rust_type
                            ),
                        });
                    }
                    existing.required |= prop.required;
                }
                None => {
                    self.properties.insert(prop.json_name.clone(), prop);
                }
            }
        }
        self.has_additional_properties |= part.has_additional_properties;
        if self.additional_properties_type.is_none() {
            self.additional_properties_type = part.additional_properties_type;
        }
        Ok(())
    }
}

impl SchemaResolver<'_> {
    /// Describes the structure of `s`, which is (or will be) stored as type `name`.
    pub(crate) fn describe(
        &mut self,
        s: &ShimSchema,
        path: &[String],
        name: &str,
    ) -> AppResult<Schema> {
        let mut schema = if !s.all_of.is_empty() {
            self.merge_all_of(s, path, name)?
        } else if !s.one_of.is_empty() || !s.any_of.is_empty() {
            self.describe_union(s, path, name)?
        } else if !s.enum_values.is_empty() {
            describe_enum(s)
        } else if s.primary_type() == Some("array") {
            self.describe_array(s, path)?
        } else if s.is_object_like() {
            self.describe_object(s, path, name)?
        } else {
            Schema::primitive(primitive_rust_type(s))
        };
        schema.description = s.description.clone();
        schema.nullable = s.is_nullable();
        Ok(schema)
    }

    /// A string-keyed map: `additionalProperties` with no fixed properties.
    pub(crate) fn describe_map(&mut self, s: &ShimSchema, path: &[String]) -> AppResult<Schema> {
        let value_type = match &s.additional_properties {
            Some(ShimAdditionalProperties::Schema(inner)) => {
                Some(Box::new(self.resolve(inner, &child(path, "AdditionalProperties"))?))
            }
            _ => None,
        };
        let value_rust_type = value_type
            .as_ref()
            .map_or("serde_json::Value", |v| v.rust_type.as_str());
        Ok(Schema {
            kind: SchemaKind::Map,
            rust_type: format!("HashMap<String, {}>", value_rust_type),
            has_additional_properties: true,
            additional_properties_type: value_type,
            ..Default::default()
        })
    }

    fn describe_object(&mut self, s: &ShimSchema, path: &[String], name: &str) -> AppResult<Schema> {
        let closed_empty = matches!(
            s.additional_properties,
            Some(ShimAdditionalProperties::Flag(false))
        );
        if s.properties.is_empty() && !closed_empty {
            return self.describe_map(s, path);
        }

        let mut taken = HashSet::new();
        let mut properties = Vec::with_capacity(s.properties.len());
        for (json_name, prop) in &s.properties {
            let schema = self.resolve(prop, &child(path, json_name))?;
            properties.push(Property {
                field_name: unique_field_name(json_name, &mut taken)?,
                json_name: json_name.clone(),
                required: s.required.contains(json_name),
                description: inline_description(prop),
                schema,
                needs_form_tag: false,
            });
        }

        let (has_additional_properties, additional_properties_type) =
            match &s.additional_properties {
                Some(ShimAdditionalProperties::Schema(inner)) => (
                    true,
                    Some(Box::new(
                        self.resolve(inner, &child(path, "AdditionalProperties"))?,
                    )),
                ),
                Some(ShimAdditionalProperties::Flag(flag)) => (*flag, None),
                None => (false, None),
            };

        Ok(Schema {
            kind: SchemaKind::Object,
            rust_type: name.to_string(),
            properties,
            has_additional_properties,
            additional_properties_type,
            ..Default::default()
        })
    }

    fn describe_array(&mut self, s: &ShimSchema, path: &[String]) -> AppResult<Schema> {
        let item = match &s.items {
            Some(items) => self.resolve(items, &child(path, "Item"))?,
            None => Schema::any(),
        };
        Ok(Schema {
            kind: SchemaKind::Array,
            rust_type: format!("Vec<{}>", item.rust_type),
            item_type: Some(Box::new(item)),
            ..Default::default()
        })
    }

    fn merge_all_of(&mut self, s: &ShimSchema, path: &[String], name: &str) -> AppResult<Schema> {
        let pointer = path.join(".");
        let mut merged = MergedObject::default();

        for (index, member) in s.all_of.iter().enumerate() {
            let part = match member {
                RefOr::Ref(r) => self.all_of_ref_member(&r.ref_location, &pointer)?,
                RefOr::T(inner) => {
                    self.describe(inner, &child(path, &format!("AllOf{index}")), name)?
                }
            };
            merged.absorb(part, &pointer, |a, b| self.same_shape(a, b, MAX_SHAPE_DEPTH))?;
        }

        if !s.properties.is_empty() || s.additional_properties.is_some() {
            let own = ShimSchema {
                schema_type: Some(ShimSchemaType::Single("object".to_string())),
                properties: s.properties.clone(),
                required: s.required.clone(),
                additional_properties: s.additional_properties.clone(),
                ..Default::default()
            };
            let part = self.describe_object(&own, path, name)?;
            merged.absorb(part, &pointer, |a, b| self.same_shape(a, b, MAX_SHAPE_DEPTH))?;
        }

        let mut properties: Vec<Property> = merged.properties.into_values().collect();
        for prop in &mut properties {
            if s.required.contains(&prop.json_name) {
                prop.required = true;
            }
        }

        Ok(Schema {
            kind: SchemaKind::Object,
            rust_type: name.to_string(),
            properties,
            has_additional_properties: merged.has_additional_properties,
            additional_properties_type: merged.additional_properties_type,
            ..Default::default()
        })
    }

    /// Structural descriptor of a component referenced from `allOf`.
    fn all_of_ref_member(&mut self, reference: &str, pointer: &str) -> AppResult<Schema> {
        let incompatible = |detail: String| AppError::IncompatibleComposition {
            pointer: pointer.to_string(),
            detail,
        };
        let target = parse_component_ref(reference).ok_or_else(|| AppError::UnresolvedReference {
            reference: reference.to_string(),
            pointer: pointer.to_string(),
        })?;
        if !target.is_local() {
            return Err(incompatible(format!(
                "external reference '{}' cannot be merged",
                reference
            )));
        }

        let name = self.resolve_component(&target.name)?;
        if self.registry.is_external(&name) {
            return Err(incompatible(format!(
                "externally declared schema '{}' cannot be merged",
                target.name
            )));
        }
        if let Some(schema) = self.registry.schema(&name) {
            return Ok(schema.clone());
        }

        // Still being described further up the stack: expand its raw schema once more.
        // Nested types are keyed by hint path, so they are shared with the outer pass.
        if self.expanding.contains(&name) {
            return Err(incompatible(format!(
                "circular allOf through '{}'",
                target.name
            )));
        }
        let raw = self
            .raw_schema(reference)?
            .ok_or_else(|| AppError::UnresolvedReference {
                reference: reference.to_string(),
                pointer: pointer.to_string(),
            })?;
        self.expanding.push(name.clone());
        let described = self.describe(raw, &[name.clone()], &name);
        self.expanding.pop();
        described
    }

    /// Whether two descriptors have the same shape, looking through synthesized names.
    fn same_shape(&self, a: &Schema, b: &Schema, depth: usize) -> bool {
        if a.rust_type == b.rust_type && a.ref_type == b.ref_type {
            return true;
        }
        if depth == 0 {
            return false;
        }
        match (&a.ref_type, &b.ref_type) {
            (Some(x), Some(y)) => match (self.registry.schema(x), self.registry.schema(y)) {
                (Some(sx), Some(sy)) => self.same_structure(sx, sy, depth - 1),
                _ => false,
            },
            (None, None) => self.same_structure(a, b, depth - 1),
            _ => false,
        }
    }

    fn same_structure(&self, a: &Schema, b: &Schema, depth: usize) -> bool {
        let same_optional = |x: &Option<Box<Schema>>, y: &Option<Box<Schema>>| match (x, y) {
            (Some(x), Some(y)) => self.same_shape(x, y, depth),
            (None, None) => true,
            _ => false,
        };
        if a.kind != b.kind || a.nullable != b.nullable {
            return false;
        }
        if matches!(
            a.kind,
            SchemaKind::Primitive | SchemaKind::Enum | SchemaKind::Alias
        ) && a.rust_type != b.rust_type
        {
            return false;
        }
        a.has_additional_properties == b.has_additional_properties
            && a.enum_values == b.enum_values
            && a.properties.len() == b.properties.len()
            && a.properties.iter().zip(&b.properties).all(|(p, q)| {
                p.json_name == q.json_name
                    && p.required == q.required
                    && self.same_shape(&p.schema, &q.schema, depth)
            })
            && a.union_elements.len() == b.union_elements.len()
            && a.union_elements
                .iter()
                .zip(&b.union_elements)
                .all(|(x, y)| self.same_shape(&x.schema, &y.schema, depth))
            && same_optional(&a.item_type, &b.item_type)
            && same_optional(&a.additional_properties_type, &b.additional_properties_type)
    }

    fn describe_union(&mut self, s: &ShimSchema, path: &[String], name: &str) -> AppResult<Schema> {
        let members = if !s.one_of.is_empty() {
            &s.one_of
        } else {
            &s.any_of
        };

        let mut taken = HashSet::new();
        let mut elements = Vec::with_capacity(members.len());
        for (index, member) in members.iter().enumerate() {
            if s.discriminator.is_some() && !self.is_object_member(member)? {
                return Err(AppError::IncompatibleComposition {
                    pointer: path.join("."),
                    detail: format!(
                        "member {} is not an object but the union has a discriminator",
                        index
                    ),
                });
            }
            let schema = self.resolve(member, &child(path, &format!("Variant{index}")))?;
            let variant = unique_type_name(union_variant_name(&schema, index), &mut taken);
            elements.push(UnionElement {
                variant,
                schema,
                mapping_keys: Vec::new(),
            });
        }

        let discriminator = match &s.discriminator {
            Some(d) => Some(self.describe_discriminator(d, members, &mut elements, path)?),
            None => None,
        };

        Ok(Schema {
            kind: SchemaKind::Union,
            rust_type: name.to_string(),
            union_elements: elements,
            discriminator,
            ..Default::default()
        })
    }

    fn is_object_member(&self, member: &RefOr<ShimSchema>) -> AppResult<bool> {
        match member {
            RefOr::T(s) => Ok(is_object_shape(s)),
            RefOr::Ref(r) => Ok(self.raw_schema(&r.ref_location)?.map_or(true, is_object_shape)),
        }
    }

    fn describe_discriminator(
        &mut self,
        d: &ShimDiscriminator,
        members: &[RefOr<ShimSchema>],
        elements: &mut [UnionElement],
        path: &[String],
    ) -> AppResult<Discriminator> {
        let pointer = path.join(".");
        let mut mapping = BTreeMap::new();
        if d.mapping.is_empty() {
            // Implicit mapping: the component key is the tag value.
            for (member, element) in members.iter().zip(elements.iter()) {
                if let RefOr::Ref(r) = member {
                    if let Some(key) = local_component_name(&r.ref_location, "schemas") {
                        mapping.insert(key, element.schema.rust_type.clone());
                    }
                }
            }
        } else {
            for (tag, target) in &d.mapping {
                let reference = if target.contains('#') {
                    target.clone()
                } else {
                    format!("#/components/schemas/{target}")
                };
                let alias = self.resolve_ref(&reference, &pointer)?;
                mapping.insert(tag.clone(), alias.rust_type);
            }
        }

        for element in elements.iter_mut() {
            element.mapping_keys = mapping
                .iter()
                .filter(|(_, ty)| **ty == element.schema.rust_type)
                .map(|(tag, _)| tag.clone())
                .collect();
        }

        Ok(Discriminator {
            property_name: d.property_name.clone(),
            mapping,
        })
    }
}

fn describe_enum(s: &ShimSchema) -> Schema {
    let scalar = if s.primary_type().is_some() {
        primitive_rust_type(s)
    } else {
        infer_enum_scalar(&s.enum_values).to_string()
    };

    let mut taken = HashSet::new();
    let enum_values = s
        .enum_values
        .iter()
        .enumerate()
        .map(|(index, value)| EnumValue {
            variant: unique_type_name(enum_variant_name(value, index), &mut taken),
            value: value.clone(),
        })
        .collect();

    Schema {
        kind: SchemaKind::Enum,
        rust_type: scalar,
        enum_values,
        ..Default::default()
    }
}

fn infer_enum_scalar(values: &[JsonValue]) -> &'static str {
    match values.iter().find(|v| !v.is_null()) {
        Some(JsonValue::Bool(_)) => "bool",
        Some(JsonValue::Number(n)) if n.is_i64() || n.is_u64() => "i64",
        Some(JsonValue::Number(_)) => "f64",
        Some(JsonValue::String(_)) => "String",
        _ => "serde_json::Value",
    }
}

fn enum_variant_name(value: &JsonValue, index: usize) -> String {
    let raw = match value {
        JsonValue::String(s) => s.clone(),
        JsonValue::Number(n) => n.to_string(),
        JsonValue::Bool(b) => b.to_string(),
        JsonValue::Null => "null".to_string(),
        _ => String::new(),
    };
    let name = schema_name_to_type_name(&raw);
    if name.is_empty() {
        format!("Value{index}")
    } else {
        escape_keyword(name)
    }
}

/// Variant name for a union member: the aliased type, or a name for the scalar kind.
fn union_variant_name(schema: &Schema, index: usize) -> String {
    if let Some(name) = &schema.ref_type {
        return name
            .rsplit("::")
            .next()
            .map_or_else(|| format!("Variant{index}"), str::to_string);
    }
    let derived = match schema.rust_type.as_str() {
        "String" => Some("String"),
        "i32" | "i64" => Some("Integer"),
        "f32" | "f64" => Some("Number"),
        "bool" => Some("Boolean"),
        "Uuid" => Some("Uuid"),
        "NaiveDate" => Some("Date"),
        "DateTime" => Some("DateTime"),
        ty if ty.starts_with("Vec<") => Some("Array"),
        ty if ty.starts_with("HashMap<") => Some("Map"),
        _ => None,
    };
    derived.map_or_else(|| format!("Variant{index}"), str::to_string)
}

fn unique_type_name(base: String, taken: &mut HashSet<String>) -> String {
    if taken.insert(base.clone()) {
        return base;
    }
    let mut n = 2;
    loop {
        let candidate = format!("{base}{n}");
        if taken.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

/// Field identifier for `json_name` that does not clash with earlier fields.
pub(crate) fn unique_field_name(json_name: &str, taken: &mut HashSet<String>) -> AppResult<String> {
    let base = field_name(json_name)?;
    if taken.insert(base.clone()) {
        return Ok(base);
    }
    let mut n = 2;
    loop {
        let candidate = field_name(&format!("{json_name}_{n}"))?;
        if taken.insert(candidate.clone()) {
            return Ok(candidate);
        }
        n += 1;
    }
}

fn inline_description(schema: &RefOr<ShimSchema>) -> Option<String> {
    match schema {
        RefOr::T(s) => s.description.clone(),
        RefOr::Ref(r) if !r.description.is_empty() => Some(r.description.clone()),
        RefOr::Ref(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CompilerOptions;
    use crate::oas::shims::ShimOpenApi;

    fn compile_components(yaml: &str) -> AppResult<Vec<crate::oas::models::TypeDefinition>> {
        let doc = ShimOpenApi::from_yaml(yaml)?;
        let opts = CompilerOptions::default();
        let mut resolver = SchemaResolver::new(&doc, &opts);
        resolver.register_components()?;
        resolver.into_definitions()
    }

    #[test]
    fn test_primitive_mapping() {
        let parse = |y: &str| serde_yaml::from_str::<ShimSchema>(y).unwrap();
        assert_eq!(primitive_rust_type(&parse("type: integer\nformat: int64")), "i64");
        assert_eq!(primitive_rust_type(&parse("type: integer")), "i32");
        assert_eq!(primitive_rust_type(&parse("type: number\nformat: float")), "f32");
        assert_eq!(primitive_rust_type(&parse("type: string\nformat: uuid")), "Uuid");
        assert_eq!(primitive_rust_type(&parse("type: string\nformat: binary")), "Vec<u8>");
        assert_eq!(primitive_rust_type(&parse("{}")), "serde_json::Value");
    }

    #[test]
    fn test_enum_sidecar_values() {
        let defs = compile_components(
            r#"
components:
  schemas:
    Status:
      type: string
      enum: [available, pending, sold-out]
"#,
        )
        .unwrap();
        let status = &defs[0].schema;
        assert_eq!(status.kind, SchemaKind::Enum);
        assert_eq!(status.rust_type, "String");
        let variants: Vec<_> = status.enum_values.iter().map(|v| v.variant.as_str()).collect();
        assert_eq!(variants, vec!["Available", "Pending", "SoldOut"]);
    }

    #[test]
    fn test_all_of_merges_properties() {
        let defs = compile_components(
            r#"
components:
  schemas:
    Base:
      type: object
      required: [id]
      properties:
        id: { type: integer, format: int64 }
    Dog:
      allOf:
        - $ref: '#/components/schemas/Base'
        - type: object
          properties:
            bark: { type: boolean }
      required: [bark]
"#,
        )
        .unwrap();
        let dog = defs.iter().find(|d| d.name == "Dog").unwrap();
        let names: Vec<_> = dog.schema.properties.iter().map(|p| p.json_name.as_str()).collect();
        assert_eq!(names, vec!["bark", "id"]);
        assert!(dog.schema.properties.iter().all(|p| p.required));
    }

    #[test]
    fn test_all_of_conflicting_property_is_error() {
        let err = compile_components(
            r#"
components:
  schemas:
    A:
      type: object
      properties:
        id: { type: integer }
    B:
      allOf:
        - $ref: '#/components/schemas/A'
        - type: object
          properties:
            id: { type: string }
"#,
        )
        .unwrap_err();
        assert!(matches!(err, AppError::IncompatibleComposition { .. }));
    }

    #[test]
    fn test_all_of_non_object_member_is_error() {
        let err = compile_components(
            r#"
components:
  schemas:
    Name:
      type: string
    Person:
      allOf:
        - $ref: '#/components/schemas/Name'
"#,
        )
        .unwrap_err();
        assert!(matches!(err, AppError::IncompatibleComposition { .. }));
    }

    #[test]
    fn test_circular_all_of_is_error() {
        let err = compile_components(
            r#"
components:
  schemas:
    A:
      allOf:
        - $ref: '#/components/schemas/B'
    B:
      allOf:
        - $ref: '#/components/schemas/A'
"#,
        )
        .unwrap_err();
        assert!(matches!(err, AppError::IncompatibleComposition { .. }));
    }

    #[test]
    fn test_all_of_nested_objects_with_different_shapes_is_error() {
        let err = compile_components(
            r#"
components:
  schemas:
    Combo:
      allOf:
        - properties:
            meta:
              type: object
              properties:
                a: { type: string }
        - properties:
            meta:
              type: object
              properties:
                b: { type: integer }
"#,
        )
        .unwrap_err();
        match err {
            AppError::IncompatibleComposition { pointer, detail } => {
                assert_eq!(pointer, "Combo");
                assert!(detail.contains("'meta'"), "{detail}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_all_of_nested_objects_with_same_shape_merge() {
        let defs = compile_components(
            r#"
components:
  schemas:
    Combo:
      allOf:
        - properties:
            meta:
              type: object
              properties:
                a: { type: string }
            id: { type: integer }
        - properties:
            meta:
              type: object
              properties:
                a: { type: string }
"#,
        )
        .unwrap();
        let combo = defs.iter().find(|d| d.name == "Combo").unwrap();
        let names: Vec<_> = combo.schema.properties.iter().map(|p| p.json_name.as_str()).collect();
        assert_eq!(names, vec!["id", "meta"]);
        assert_eq!(
            combo.schema.properties[1].schema,
            Schema::alias("ComboAllOf0Meta")
        );
    }

    #[test]
    fn test_union_with_discriminator() {
        let defs = compile_components(
            r#"
components:
  schemas:
    Cat:
      type: object
      properties:
        meow: { type: boolean }
    Dog:
      type: object
      properties:
        bark: { type: boolean }
    Pet:
      oneOf:
        - $ref: '#/components/schemas/Cat'
        - $ref: '#/components/schemas/Dog'
      discriminator:
        propertyName: kind
        mapping:
          cat: '#/components/schemas/Cat'
          kitty: Cat
"#,
        )
        .unwrap();
        let pet = defs.iter().find(|d| d.name == "Pet").unwrap();
        assert_eq!(pet.schema.kind, SchemaKind::Union);
        let cat = &pet.schema.union_elements[0];
        assert_eq!(cat.variant, "Cat");
        assert_eq!(cat.mapping_keys, vec!["cat".to_string(), "kitty".to_string()]);
        assert!(pet.schema.union_elements[1].mapping_keys.is_empty());
        assert_eq!(pet.schema.discriminator.as_ref().unwrap().property_name, "kind");
    }

    #[test]
    fn test_discriminator_with_scalar_member_is_error() {
        let err = compile_components(
            r#"
components:
  schemas:
    Value:
      oneOf:
        - type: string
        - type: object
          properties:
            a: { type: string }
      discriminator:
        propertyName: kind
"#,
        )
        .unwrap_err();
        assert!(matches!(err, AppError::IncompatibleComposition { .. }));
    }

    #[test]
    fn test_inline_union_members_are_named() {
        let defs = compile_components(
            r#"
components:
  schemas:
    Id:
      anyOf:
        - type: string
        - type: integer
        - type: object
          properties:
            raw: { type: string }
"#,
        )
        .unwrap();
        let id = &defs[0].schema;
        let variants: Vec<_> = id.union_elements.iter().map(|e| e.variant.as_str()).collect();
        assert_eq!(variants, vec!["String", "Integer", "IdVariant2"]);
        assert!(defs.iter().any(|d| d.name == "IdVariant2"));
    }

    #[test]
    fn test_maps_stay_structural() {
        let defs = compile_components(
            r#"
components:
  schemas:
    Labels:
      type: object
      additionalProperties:
        type: string
    Item:
      type: object
      properties:
        meta:
          type: object
        labels:
          type: object
          additionalProperties: { type: integer }
"#,
        )
        .unwrap();
        let labels = defs.iter().find(|d| d.name == "Labels").unwrap();
        assert_eq!(labels.schema.kind, SchemaKind::Map);
        assert_eq!(labels.schema.rust_type, "HashMap<String, String>");

        let item = defs.iter().find(|d| d.name == "Item").unwrap();
        assert_eq!(item.schema.properties[0].schema.rust_type, "HashMap<String, i32>");
        assert_eq!(
            item.schema.properties[1].schema.rust_type,
            "HashMap<String, serde_json::Value>"
        );
        assert!(item.schema.properties[1].schema.has_additional_properties);
        assert_eq!(defs.len(), 2);
    }

    #[test]
    fn test_field_name_collisions_are_suffixed() {
        let mut taken = HashSet::new();
        assert_eq!(unique_field_name("userId", &mut taken).unwrap(), "user_id");
        assert_eq!(unique_field_name("user-id", &mut taken).unwrap(), "user_id_2");
    }
}
