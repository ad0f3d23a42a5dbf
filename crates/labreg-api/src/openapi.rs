//! # OpenAPI Specification Assembly
//!
//! Assembles all utoipa-documented routes into a single OpenAPI spec served
//! at `/openapi.json`.
//!
//! Request bodies validated by a [`SchemaNode`] are documented from that
//! schema, not from the Rust struct: [`SchemaDocs`] replaces the component
//! and attaches synthesized validation-error examples to every 422 response
//! of the operations that accept it.

use axum::routing::get;
use axum::{Json, Router};
use labreg_schema::{error_examples, NumberCheck, SchemaNode, StringCheck};
use serde_json::json;
use utoipa::openapi::schema::{
    AdditionalProperties, ArrayBuilder, KnownFormat, ObjectBuilder, OneOfBuilder, Schema,
    SchemaFormat, SchemaType,
};
use utoipa::openapi::{Components, RefOr};
use utoipa::{Modify, OpenApi};

use crate::state::AppState;

/// Request-body components generated from validation schemas.
const VALIDATED_BODIES: &[(&str, fn() -> &'static SchemaNode)] = &[(
    "CreateUserRequest",
    crate::routes::users::create_user_schema,
)];

/// Documents schema-validated request bodies and their 422 examples.
struct SchemaDocs;

impl Modify for SchemaDocs {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Components::new);
        for (name, schema) in VALIDATED_BODIES {
            components
                .schemas
                .insert((*name).to_string(), to_openapi_schema(schema()));
        }

        for path_item in openapi.paths.paths.values_mut() {
            for operation in path_item.operations.values_mut() {
                let Some(component) = operation.request_body.as_ref().and_then(|body| {
                    body.content.values().find_map(|content| match &content.schema {
                        RefOr::Ref(r) => r.ref_location.rsplit('/').next().map(str::to_string),
                        RefOr::T(_) => None,
                    })
                }) else {
                    continue;
                };
                let Some((_, schema)) = VALIDATED_BODIES.iter().find(|(n, _)| *n == component)
                else {
                    continue;
                };
                let Some(RefOr::T(response)) = operation.responses.responses.get_mut("422") else {
                    continue;
                };

                let example = json!({
                    "error": {
                        "code": "VALIDATION_ERROR",
                        "message": "Request body failed validation",
                        "issues": error_examples(schema()),
                    }
                });
                for content in response.content.values_mut() {
                    content.example = Some(example.clone());
                }
            }
        }
    }
}

/// Assembled OpenAPI spec for the registry API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Laboratory Registry API",
        version = "0.1.0",
        description = "User registration for the laboratory-management system. Request bodies are validated against declarative schemas; every 422 response carries an `error.issues` list with stable codes and paths.",
        license(name = "AGPL-3.0-or-later")
    ),
    paths(
        crate::routes::users::create_user,
        crate::routes::users::get_user,
    ),
    components(schemas(
        crate::state::UserResponse,
        crate::routes::users::CreateUserRequest,
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
        crate::error::IssueBody,
    )),
    modifiers(&SchemaDocs),
    tags(
        (name = "users", description = "User registration"),
    )
)]
pub struct ApiDoc;

/// Build the OpenAPI router.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json - Return the generated OpenAPI specification.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Translate a validation schema into an OpenAPI schema.
pub fn to_openapi_schema(node: &SchemaNode) -> RefOr<Schema> {
    match node {
        SchemaNode::String(s) => {
            let mut builder = ObjectBuilder::new().schema_type(SchemaType::String);
            for check in &s.checks {
                builder = match check {
                    StringCheck::MinLength(n) => builder.min_length(Some(*n)),
                    StringCheck::MaxLength(n) => builder.max_length(Some(*n)),
                    StringCheck::Email => {
                        builder.format(Some(SchemaFormat::Custom("email".to_string())))
                    }
                    StringCheck::Url => builder.format(Some(SchemaFormat::Custom("uri".to_string()))),
                    StringCheck::Uuid => builder.format(Some(SchemaFormat::KnownFormat(KnownFormat::Uuid))),
                };
            }
            builder.into()
        }
        SchemaNode::Number(n) => {
            let integer = n.checks.iter().any(|c| matches!(c, NumberCheck::Integer));
            let mut builder = ObjectBuilder::new().schema_type(if integer {
                SchemaType::Integer
            } else {
                SchemaType::Number
            });
            for check in &n.checks {
                builder = match check {
                    NumberCheck::Min(m) => builder.minimum(Some(*m)),
                    NumberCheck::Max(m) => builder.maximum(Some(*m)),
                    NumberCheck::Integer => builder,
                };
            }
            builder.into()
        }
        SchemaNode::Boolean => ObjectBuilder::new().schema_type(SchemaType::Boolean).into(),
        SchemaNode::Enum { values } => ObjectBuilder::new()
            .schema_type(SchemaType::String)
            .enum_values(Some(values.iter().cloned()))
            .into(),
        SchemaNode::Array { element } => ArrayBuilder::new().items(to_openapi_schema(element)).into(),
        SchemaNode::Object(obj) => {
            let mut builder = ObjectBuilder::new().schema_type(SchemaType::Object);
            for field in &obj.fields {
                builder = builder.property(&field.name, to_openapi_schema(&field.schema));
                if !field.schema.accepts_missing() {
                    builder = builder.required(&field.name);
                }
            }
            if obj.strict {
                builder = builder.additional_properties(Some(AdditionalProperties::FreeForm(false)));
            }
            builder.into()
        }
        SchemaNode::Optional { inner } => to_openapi_schema(inner),
        SchemaNode::Nullable { inner } => {
            let mut schema = to_openapi_schema(inner);
            match &mut schema {
                RefOr::T(Schema::Object(o)) => o.nullable = true,
                RefOr::T(Schema::Array(a)) => a.nullable = true,
                _ => {}
            }
            schema
        }
        SchemaNode::Union { members } => members
            .iter()
            .fold(OneOfBuilder::new(), |b, m| b.item(to_openapi_schema(m)))
            .into(),
        SchemaNode::Other { name } => ObjectBuilder::new()
            .schema_type(SchemaType::Value)
            .description(Some(name.clone()))
            .into(),
    }
}
