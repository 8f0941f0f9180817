use cdd_ir_core::oas::models::{ParamLocation, ParamStyle, SecurityDefinition};
use cdd_ir_core::{compile_yaml, AppError, CompiledApi, CompilerOptions, Schema};
use pretty_assertions::assert_eq;
use std::collections::HashSet;

fn compile(yaml: &str) -> CompiledApi {
    compile_yaml(yaml, &CompilerOptions::default()).unwrap()
}

fn collect_refs(schema: &Schema, out: &mut Vec<String>) {
    if let Some(r) = &schema.ref_type {
        out.push(r.clone());
    }
    for prop in &schema.properties {
        collect_refs(&prop.schema, out);
    }
    for elem in &schema.union_elements {
        collect_refs(&elem.schema, out);
    }
    if let Some(item) = &schema.item_type {
        collect_refs(item, out);
    }
    if let Some(ap) = &schema.additional_properties_type {
        collect_refs(ap, out);
    }
}

const ORDERED: &str = r#"
openapi: 3.0.3
paths:
  /pets:
    get:
      parameters:
        - { name: limit, in: query, schema: { type: integer } }
        - { name: X-Request-Id, in: header, schema: { type: string } }
      responses:
        '200':
          description: ok
          content:
            application/json:
              schema:
                type: array
                items: { $ref: '#/components/schemas/Pet' }
        default: { $ref: '#/components/responses/Error' }
    post:
      requestBody:
        content:
          application/json:
            schema:
              type: object
              properties:
                name: { type: string }
                kind: { type: string, enum: [cat, dog] }
      responses:
        '201': { description: created }
  /owners/{ownerId}:
    get:
      parameters:
        - { name: ownerId, in: path, required: true, schema: { type: string } }
      responses:
        '200':
          description: ok
          content:
            application/json:
              schema: { $ref: '#/components/schemas/Owner' }
components:
  schemas:
    Pet:
      type: object
      properties:
        owner: { $ref: '#/components/schemas/Owner' }
        tags: { type: array, items: { type: string } }
    Owner:
      type: object
      properties:
        pets:
          type: array
          items: { $ref: '#/components/schemas/Pet' }
  responses:
    Error:
      description: failure
      content:
        application/json:
          schema:
            type: object
            properties:
              message: { type: string }
"#;

const REORDERED: &str = r#"
components:
  responses:
    Error:
      content:
        application/json:
          schema:
            properties:
              message: { type: string }
            type: object
      description: failure
  schemas:
    Owner:
      properties:
        pets:
          items: { $ref: '#/components/schemas/Pet' }
          type: array
      type: object
    Pet:
      properties:
        tags: { items: { type: string }, type: array }
        owner: { $ref: '#/components/schemas/Owner' }
      type: object
paths:
  /owners/{ownerId}:
    get:
      responses:
        '200':
          content:
            application/json:
              schema: { $ref: '#/components/schemas/Owner' }
          description: ok
      parameters:
        - { in: path, name: ownerId, required: true, schema: { type: string } }
  /pets:
    post:
      responses:
        '201': { description: created }
      requestBody:
        content:
          application/json:
            schema:
              properties:
                kind: { enum: [cat, dog], type: string }
                name: { type: string }
              type: object
    get:
      responses:
        default: { $ref: '#/components/responses/Error' }
        '200':
          content:
            application/json:
              schema:
                items: { $ref: '#/components/schemas/Pet' }
                type: array
          description: ok
      parameters:
        - { name: limit, in: query, schema: { type: integer } }
        - { name: X-Request-Id, in: header, schema: { type: string } }
openapi: 3.0.3
"#;

#[test]
fn test_output_is_independent_of_key_order() {
    let a = serde_json::to_string_pretty(&compile(ORDERED)).unwrap();
    let b = serde_json::to_string_pretty(&compile(REORDERED)).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_every_reference_names_an_emitted_type() {
    let api = compile(ORDERED);
    let names: HashSet<_> = api.types.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names.len(), api.types.len(), "type names must be unique");

    let mut refs = Vec::new();
    for t in &api.types {
        collect_refs(&t.schema, &mut refs);
    }
    for op in &api.operations {
        for p in op.all_params() {
            collect_refs(&p.schema, &mut refs);
        }
        for body in &op.bodies {
            if let Some(s) = &body.schema {
                collect_refs(s, &mut refs);
            }
        }
        for resp in &op.responses {
            for content in &resp.contents {
                if let Some(s) = &content.schema {
                    collect_refs(s, &mut refs);
                }
            }
        }
        for name in &op.type_definitions {
            refs.push(name.clone());
        }
    }
    assert!(!refs.is_empty());
    for r in refs {
        assert!(names.contains(r.as_str()), "dangling reference {r}");
    }
}

#[test]
fn test_operation_ids_and_synthesized_names() {
    let api = compile(ORDERED);
    let ids: Vec<_> = api.operations.iter().map(|o| o.operation_id.as_str()).collect();
    assert_eq!(ids, vec!["ReadOwnersByOwnerId", "ReadPetsList", "CreatePets"]);

    let create = api.operation("CreatePets").unwrap();
    assert_eq!(create.bodies[0].schema, Some(Schema::alias("CreatePetsJSONBody")));
    assert_eq!(
        create.type_definitions,
        vec!["CreatePetsJSONBody".to_string(), "CreatePetsJSONBodyKind".to_string()]
    );
}

#[test]
fn test_parameter_style_defaults() {
    let api = compile(ORDERED);
    let list = api.operation("ReadPetsList").unwrap();
    let limit = &list.query_params[0];
    assert_eq!((limit.style, limit.explode), (ParamStyle::Form, true));
    let request_id = &list.header_params[0];
    assert_eq!((request_id.style, request_id.explode), (ParamStyle::Simple, false));
    assert_eq!(request_id.field_name, "x_request_id");

    let owner = api.operation("ReadOwnersByOwnerId").unwrap();
    assert_eq!(owner.path_params[0].location, ParamLocation::Path);
    assert_eq!(
        (owner.path_params[0].style, owner.path_params[0].explode),
        (ParamStyle::Simple, false)
    );
}

#[test]
fn test_spec_scenario_operation_ids() {
    let api = compile(
        r#"
paths:
  /pets:
    post: { responses: {} }
  /pets/{id}:
    get:
      parameters: [{ name: id, in: path, schema: { type: integer } }]
      responses: {}
  /healthz:
    get: { responses: {} }
"#,
    );
    let ids: Vec<_> = api.operations.iter().map(|o| o.operation_id.as_str()).collect();
    assert_eq!(ids, vec!["HealthCheck", "CreatePets", "ReadPets"]);
}

#[test]
fn test_shared_response_alias_is_used_once() {
    let api = compile(
        r#"
paths:
  /pets:
    get:
      responses:
        '200': { $ref: '#/components/responses/PetList' }
        default: { $ref: '#/components/responses/PetList' }
components:
  responses:
    PetList:
      description: pets
      content:
        application/json:
          schema:
            type: array
            items: { type: string }
"#,
    );
    let op = &api.operations[0];
    assert_eq!(op.responses[0].ref_type.as_deref(), Some("PetListResponse"));
    assert_eq!(op.responses[1].ref_type, None);
    assert_eq!(
        op.responses[1].contents[0].schema,
        Some(Schema::alias("ReadPetsDefaultJSONResponse"))
    );
    let aliased: Vec<_> = op.responses.iter().filter(|r| r.is_ref()).collect();
    assert_eq!(aliased.len(), 1);
}

#[test]
fn test_unclassified_body_gets_no_type() {
    let api = compile(
        r#"
paths:
  /upload:
    post:
      operationId: upload
      requestBody:
        content:
          application/vnd.custom+octet-stream:
            schema: { type: object, properties: { a: { type: string } } }
      responses: {}
"#,
    );
    let op = api.operation("Upload").unwrap();
    assert_eq!(op.bodies.len(), 1);
    assert!(!op.bodies[0].is_supported());
    assert!(op.bodies[0].schema.is_none());
    assert!(op.default_body().is_none());
    assert!(op.type_definitions.is_empty());
    assert!(api.types.is_empty());
}

#[test]
fn test_json_and_text_bodies() {
    let api = compile(
        r#"
paths:
  /notes:
    put:
      operationId: saveNote
      requestBody:
        required: true
        content:
          text/plain: {}
          application/json:
            schema: { type: object, properties: { text: { type: string } } }
      responses: {}
"#,
    );
    let op = api.operation("SaveNote").unwrap();
    let bodies: Vec<_> = op
        .bodies
        .iter()
        .map(|b| (b.content_type.as_str(), b.name_tag.as_deref(), b.default))
        .collect();
    assert_eq!(
        bodies,
        vec![
            ("application/json", Some("JSON"), true),
            ("text/plain", Some("Text"), false),
        ]
    );
    assert_eq!(op.bodies[1].schema, Some(Schema::primitive("String")));
    assert!(op.body_required);
}

#[test]
fn test_path_parameters_follow_template_order() {
    let api = compile(
        r#"
paths:
  /cat/{category}/pet/{id}:
    get:
      operationId: findPet
      parameters:
        - { name: id, in: path, schema: { type: integer } }
        - { name: category, in: path, schema: { type: string } }
      responses: {}
"#,
    );
    let names: Vec<_> = api.operations[0]
        .path_params
        .iter()
        .map(|p| p.name.as_str())
        .collect();
    assert_eq!(names, vec!["category", "id"]);
}

#[test]
fn test_undeclared_path_parameter_is_an_error() {
    let err = compile_yaml(
        r#"
paths:
  /pets/{petId}:
    get:
      operationId: getPet
      parameters:
        - { name: id, in: path, schema: { type: integer } }
      responses: {}
"#,
        &CompilerOptions::default(),
    )
    .unwrap_err();
    match err {
        AppError::Operation { method, path, source } => {
            assert_eq!(method, "GET");
            assert_eq!(path, "/pets/{petId}");
            assert!(matches!(*source, AppError::PathParameterMismatch { .. }));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_operation_security_overrides_document_security() {
    let api = compile(
        r#"
security:
  - apiKey: []
paths:
  /private:
    get: { operationId: private, responses: {} }
  /public:
    get: { operationId: public, security: [], responses: {} }
  /scoped:
    get:
      operationId: scoped
      security:
        - oauth: [read, write]
        - apiKey: []
      responses: {}
"#,
    );
    assert_eq!(
        api.operation("Private").unwrap().security,
        vec![SecurityDefinition {
            provider_name: "apiKey".into(),
            scopes: vec![],
            alternative: 0,
        }]
    );
    assert!(api.operation("Public").unwrap().security.is_empty());
    let scoped: Vec<_> = api
        .operation("Scoped")
        .unwrap()
        .security
        .iter()
        .map(|s| (s.provider_name.as_str(), s.alternative))
        .collect();
    assert_eq!(scoped, vec![("oauth", 0), ("apiKey", 1)]);
}

#[test]
fn test_shared_path_parameters_win() {
    let api = compile(
        r#"
paths:
  /search:
    parameters:
      - { name: q, in: query, description: shared, schema: { type: string } }
    get:
      operationId: search
      parameters:
        - { name: q, in: query, description: local, schema: { type: integer } }
      responses: {}
"#,
    );
    let q = &api.operations[0].query_params;
    assert_eq!(q.len(), 1);
    assert_eq!(q[0].description.as_deref(), Some("shared"));
    assert_eq!(q[0].schema.rust_type, "String");
}

#[test]
fn test_all_of_in_self_referential_schemas() {
    let api = compile(
        r#"
paths:
  /nodes/{id}:
    get:
      parameters: [{ name: id, in: path, schema: { type: string } }]
      responses:
        '200':
          description: ok
          content:
            application/json:
              schema: { $ref: '#/components/schemas/Node' }
components:
  schemas:
    Audit:
      type: object
      properties:
        by: { type: string }
    Node:
      allOf:
        - $ref: '#/components/schemas/Audit'
        - properties:
            meta:
              type: object
              properties:
                created: { type: string, format: date-time }
      properties:
        parent:
          nullable: true
          allOf:
            - $ref: '#/components/schemas/Node'
"#,
    );
    let node = api.types.iter().find(|t| t.name == "Node").unwrap();
    let fields: Vec<_> = node
        .schema
        .properties
        .iter()
        .map(|p| (p.json_name.as_str(), p.schema.rust_type.as_str(), p.schema.nullable))
        .collect();
    assert_eq!(
        fields,
        vec![
            ("by", "String", false),
            ("meta", "NodeAllOf1Meta", false),
            ("parent", "Node", true),
        ]
    );

    let names: HashSet<_> = api.types.iter().map(|t| t.name.as_str()).collect();
    let mut refs = Vec::new();
    for t in &api.types {
        collect_refs(&t.schema, &mut refs);
    }
    for r in refs {
        assert!(names.contains(r.as_str()), "dangling reference {r}");
    }
}

#[test]
fn test_all_of_members_with_conflicting_nested_objects_fail() {
    let err = compile_yaml(
        r#"
paths: {}
components:
  schemas:
    Combo:
      allOf:
        - properties:
            meta: { type: object, properties: { a: { type: string } } }
        - properties:
            meta: { type: object, properties: { b: { type: integer } } }
"#,
        &CompilerOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, AppError::IncompatibleComposition { .. }));
}
