//! # User Registration API
//!
//! Creates and fetches registered users. Request bodies are validated
//! against [`create_user_schema`], the same schema the OpenAPI document is
//! generated from.

use std::sync::OnceLock;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use labreg_core::{Email, LaboratoryId, Role, UserId};
use labreg_schema::{enumeration, object, string, Issue, IssueCode, PathSegment, SchemaNode};
use serde::Deserialize;
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AppError;
use crate::extractors::{extract_validated_json, ValidatedBody};
use crate::password::hash_password;
use crate::state::{AppState, UserRecord, UserResponse};

/// Validation schema for [`CreateUserRequest`].
pub fn create_user_schema() -> &'static SchemaNode {
    static SCHEMA: OnceLock<SchemaNode> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        object()
            .field("name", string().min_length(1).max_length(100))
            .field("email", string().email())
            .field("password", string().min_length(8).max_length(128))
            .field("role", enumeration(Role::ALL.iter().map(Role::as_str)))
            .field("laboratory_id", string().uuid().optional())
            .into()
    })
}

/// Request to register a user.
#[derive(Deserialize, ToSchema)]
pub struct CreateUserRequest {
    #[schema(example = "Ada Lovelace")]
    pub name: String,
    #[schema(value_type = String, example = "ada@example.edu")]
    pub email: Email,
    #[schema(value_type = String, format = Password)]
    pub password: String,
    #[schema(value_type = String, example = "technical_staff")]
    pub role: Role,
    /// Laboratory the technician is assigned to. Technical staff only.
    #[serde(default)]
    #[schema(value_type = Option<String>, format = Uuid)]
    pub laboratory_id: Option<LaboratoryId>,
}

impl ValidatedBody for CreateUserRequest {
    fn schema() -> &'static SchemaNode {
        create_user_schema()
    }

    fn check(&self) -> Result<(), Vec<Issue>> {
        if self.laboratory_id.is_some() && self.role != Role::TechnicalStaff {
            return Err(vec![Issue {
                code: IssueCode::Custom("custom".to_string()),
                path: vec![PathSegment::Key("laboratory_id".to_string())],
                message: "laboratory_id is only allowed for technical_staff".to_string(),
            }]);
        }
        Ok(())
    }
}

/// Build the users router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/users", post(create_user))
        .route("/v1/users/:id", get(get_user))
}

/// POST /v1/users - Register a user.
#[utoipa::path(
    post,
    path = "/v1/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Body is not JSON", body = crate::error::ErrorBody),
        (status = 409, description = "Email already registered", body = crate::error::ErrorBody),
        (status = 422, description = "Validation failed", body = crate::error::ErrorBody),
    ),
    tag = "users"
)]
pub(crate) async fn create_user(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let req: CreateUserRequest = extract_validated_json(body)?;

    if state.users.find(|u| u.email == req.email).is_some() {
        return Err(email_taken(&req.email));
    }

    let password = req.password;
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AppError::Internal(format!("password hashing task failed: {e}")))??;

    let record = UserRecord {
        id: UserId::new(),
        name: req.name,
        email: req.email,
        role: req.role,
        laboratory_id: req.laboratory_id,
        password_hash,
        created_at: Utc::now(),
    };

    // Persist first: the database owns the uniqueness and laboratory
    // constraints when it is configured.
    if let Some(pool) = &state.db_pool {
        if let Err(e) = crate::db::users::insert(pool, &record).await {
            tracing::warn!(user_id = %record.id, error = %e, "failed to persist user");
            return Err(match AppError::from(e) {
                AppError::Conflict(_) => email_taken(&record.email),
                AppError::Unprocessable(_) => AppError::Unprocessable(format!(
                    "laboratory {} does not exist",
                    record
                        .laboratory_id
                        .map(|lab| lab.to_string())
                        .unwrap_or_default()
                )),
                other => other,
            });
        }
    }

    let response = UserResponse::from(&record);
    let id = record.id;
    let role = record.role;
    state
        .users
        .insert_unique(id.0, record, |existing, new| existing.email == new.email)
        .map_err(|rejected| email_taken(&rejected.email))?;

    tracing::info!(user_id = %id, role = %role, "user registered");
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /v1/users/:id - Fetch a user.
#[utoipa::path(
    get,
    path = "/v1/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 400, description = "Malformed ID", body = crate::error::ErrorBody),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "users"
)]
pub(crate) async fn get_user(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<UserResponse>, AppError> {
    let Path(id) = id.map_err(|e| AppError::BadRequest(e.body_text()))?;

    if let Some(user) = state.users.get(&id) {
        return Ok(Json(UserResponse::from(&user)));
    }

    // Another replica may have registered the user since hydration.
    if let Some(pool) = &state.db_pool {
        if let Some(user) = crate::db::users::get_by_id(pool, UserId(id)).await? {
            let response = UserResponse::from(&user);
            state.users.insert(id, user);
            return Ok(Json(response));
        }
    }

    Err(AppError::NotFound(format!("user {id} not found")))
}

fn email_taken(email: &Email) -> AppError {
    AppError::Conflict(format!("a user with email {email} already exists"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::validate_value;
    use serde_json::json;

    fn valid_body() -> Value {
        json!({
            "name": "Ada Lovelace",
            "email": "Ada@Example.edu",
            "password": "analytical-engine",
            "role": "teacher"
        })
    }

    fn issues_of(body: Value) -> Vec<Issue> {
        match validate_value::<CreateUserRequest>(&body) {
            Err(AppError::Validation(issues)) => issues,
            Err(other) => panic!("expected Validation, got {other:?}"),
            Ok(_) => panic!("expected validation failure"),
        }
    }

    #[test]
    fn valid_body_parses_and_normalizes_email() {
        let req: CreateUserRequest = validate_value(&valid_body()).unwrap();
        assert_eq!(req.email.as_str(), "ada@example.edu");
        assert_eq!(req.role, Role::Teacher);
        assert!(req.laboratory_id.is_none());
    }

    #[test]
    fn technical_staff_may_name_a_laboratory() {
        let mut body = valid_body();
        body["role"] = json!("technical_staff");
        body["laboratory_id"] = json!("6f1c2a8e-3b4d-4e5f-9a0b-1c2d3e4f5a6b");
        let req: CreateUserRequest = validate_value(&body).unwrap();
        assert_eq!(
            req.laboratory_id.map(|l| l.to_string()).as_deref(),
            Some("6f1c2a8e-3b4d-4e5f-9a0b-1c2d3e4f5a6b")
        );
    }

    #[test]
    fn laboratory_rejected_for_other_roles() {
        let mut body = valid_body();
        body["laboratory_id"] = json!("6f1c2a8e-3b4d-4e5f-9a0b-1c2d3e4f5a6b");
        let issues = issues_of(body);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].path, vec![PathSegment::Key("laboratory_id".into())]);
    }

    #[test]
    fn every_bad_field_is_reported() {
        let issues = issues_of(json!({
            "name": "",
            "email": "nope",
            "password": "short",
            "role": "janitor",
            "laboratory_id": "lab-1"
        }));
        let fields: Vec<String> = issues.iter().map(|i| i.path[0].to_string()).collect();
        assert_eq!(fields, ["name", "email", "password", "role", "laboratory_id"]);
        assert_eq!(
            issues[3].message,
            "Invalid enum value. Expected 'teacher' | 'technical_staff' | 'admin', received 'janitor'"
        );
    }

    #[test]
    fn missing_fields_are_required() {
        let issues = issues_of(json!({}));
        assert_eq!(issues.len(), 4);
        assert!(issues.iter().all(|i| i.message == "Required"));
    }
}
