//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor.
//!
//! Registered users live in an in-memory [`Store`] that is written through
//! to Postgres when a pool is configured, and hydrated from it on startup.
//! Without `DATABASE_URL` the service runs in-memory only.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use labreg_core::{Email, LaboratoryId, Role, UserId};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use utoipa::ToSchema;
use uuid::Uuid;

// -- Generic In-Memory Store --------------------------------------------------

/// Thread-safe, cloneable in-memory key-value store.
///
/// All operations are synchronous (the RwLock is `parking_lot`, not `tokio::sync`)
/// because we never hold the lock across `.await` points.
#[derive(Debug)]
pub struct Store<T: Clone + Send + Sync> {
    data: Arc<RwLock<HashMap<Uuid, T>>>,
}

impl<T: Clone + Send + Sync> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
        }
    }
}

impl<T: Clone + Send + Sync> Store<T> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Insert a record, returning the previous value if the key existed.
    pub fn insert(&self, id: Uuid, value: T) -> Option<T> {
        self.data.write().insert(id, value)
    }

    /// Insert a record unless an existing one `conflicts` with it.
    ///
    /// The check and the insert happen under one write lock. On conflict the
    /// rejected value is handed back.
    pub fn insert_unique(
        &self,
        id: Uuid,
        value: T,
        conflicts: impl Fn(&T, &T) -> bool,
    ) -> Result<(), T> {
        let mut guard = self.data.write();
        if guard.contains_key(&id) || guard.values().any(|existing| conflicts(existing, &value)) {
            return Err(value);
        }
        guard.insert(id, value);
        Ok(())
    }

    /// Retrieve a record by ID.
    pub fn get(&self, id: &Uuid) -> Option<T> {
        self.data.read().get(id).cloned()
    }

    /// Find the first record matching `predicate`.
    pub fn find(&self, predicate: impl Fn(&T) -> bool) -> Option<T> {
        self.data.read().values().find(|v| predicate(v)).cloned()
    }

    /// Return the number of records.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Clone + Send + Sync> Default for Store<T> {
    fn default() -> Self {
        Self::new()
    }
}

// -- Records --------------------------------------------------------------------

/// A registered user, including the password hash.
///
/// Never serialized to clients; see [`UserResponse`].
#[derive(Clone)]
pub struct UserRecord {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub role: Role,
    /// Set only for technical staff.
    pub laboratory_id: Option<LaboratoryId>,
    /// Argon2id PHC string.
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl std::fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserRecord")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("role", &self.role)
            .field("laboratory_id", &self.laboratory_id)
            .field("password_hash", &"[REDACTED]")
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Public view of a user.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    #[schema(value_type = String, format = Uuid)]
    pub id: UserId,
    #[schema(example = "Ada Lovelace")]
    pub name: String,
    #[schema(value_type = String, example = "ada@example.edu")]
    pub email: Email,
    /// One of `teacher`, `technical_staff`, `admin`.
    #[schema(value_type = String, example = "teacher")]
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, format = Uuid)]
    pub laboratory_id: Option<LaboratoryId>,
    pub created_at: DateTime<Utc>,
}

impl From<&UserRecord> for UserResponse {
    fn from(record: &UserRecord) -> Self {
        Self {
            id: record.id,
            name: record.name.clone(),
            email: record.email.clone(),
            role: record.role,
            laboratory_id: record.laboratory_id,
            created_at: record.created_at,
        }
    }
}

// -- Application State --------------------------------------------------------

/// Log output format for the server binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

/// Application configuration.
///
/// Custom `Debug` redacts the database URL, which may embed credentials.
#[derive(Clone)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Postgres connection string. `None` means in-memory only.
    pub database_url: Option<String>,
    /// Maximum pooled database connections.
    pub db_max_connections: u32,
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// Unparsable numbers fall back to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let port = lookup("PORT")
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or(defaults.port);
        let db_max_connections = lookup("DB_MAX_CONNECTIONS")
            .and_then(|n| n.trim().parse().ok())
            .filter(|n| *n > 0)
            .unwrap_or(defaults.db_max_connections);
        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());
        let log_format = match lookup("LOG_FORMAT").as_deref().map(str::trim) {
            Some(f) if f.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Text,
        };
        Self {
            port,
            database_url,
            db_max_connections,
            log_format,
        }
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "[REDACTED]"),
            )
            .field("db_max_connections", &self.db_max_connections)
            .field("log_format", &self.log_format)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            database_url: None,
            db_max_connections: 10,
            log_format: LogFormat::Text,
        }
    }
}

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub users: Store<UserRecord>,
    /// When `None`, the API operates in in-memory-only mode.
    pub db_pool: Option<PgPool>,
    pub config: AppConfig,
}

impl AppState {
    /// Create an in-memory state with default configuration.
    pub fn new() -> Self {
        Self::with_config(AppConfig::default(), None)
    }

    /// Create a state with the given configuration and optional pool.
    pub fn with_config(config: AppConfig, db_pool: Option<PgPool>) -> Self {
        Self {
            users: Store::new(),
            db_pool,
            config,
        }
    }

    /// Hydrate the in-memory user store from the database.
    ///
    /// Called once on startup when a database pool is available.
    pub async fn hydrate_from_db(&self) -> Result<(), sqlx::Error> {
        let Some(pool) = &self.db_pool else {
            return Ok(());
        };

        let users = crate::db::users::load_all(pool).await?;
        let user_count = users.len();
        for record in users {
            self.users.insert(record.id.0, record);
        }

        tracing::info!(users = user_count, "hydrated in-memory stores from database");
        Ok(())
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user(email: &str) -> UserRecord {
        UserRecord {
            id: UserId::new(),
            name: "Grace Hopper".to_string(),
            email: Email::parse(email).unwrap(),
            role: Role::Teacher,
            laboratory_id: None,
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string(),
            created_at: Utc::now(),
        }
    }

    // -- Store tests ----------------------------------------------------------

    #[test]
    fn store_new_creates_empty_store() {
        let store: Store<UserRecord> = Store::new();
        assert!(store.is_empty());
    }

    #[test]
    fn store_insert_and_get_roundtrip() {
        let store = Store::new();
        let user = sample_user("grace@navy.mil");
        let id = user.id.0;

        assert!(store.insert(id, user).is_none());
        let retrieved = store.get(&id).expect("inserted user");
        assert_eq!(retrieved.id.0, id);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn store_insert_unique_rejects_conflicts() {
        let store = Store::new();
        let same_email = |a: &UserRecord, b: &UserRecord| a.email == b.email;

        let first = sample_user("grace@navy.mil");
        assert!(store.insert_unique(first.id.0, first, same_email).is_ok());

        let dup = sample_user("GRACE@navy.mil");
        let rejected = store
            .insert_unique(dup.id.0, dup, same_email)
            .unwrap_err();
        assert_eq!(rejected.email.as_str(), "grace@navy.mil");
        assert_eq!(store.len(), 1);

        let other = sample_user("ada@example.edu");
        assert!(store.insert_unique(other.id.0, other, same_email).is_ok());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn store_find_by_predicate() {
        let store = Store::new();
        let user = sample_user("grace@navy.mil");
        store.insert(user.id.0, user);
        assert!(store.find(|u| u.email.as_str() == "grace@navy.mil").is_some());
        assert!(store.find(|u| u.email.as_str() == "nobody@navy.mil").is_none());
    }

    #[test]
    fn store_clone_shares_data() {
        let store = Store::new();
        let clone = store.clone();
        let user = sample_user("grace@navy.mil");
        store.insert(user.id.0, user);
        assert_eq!(clone.len(), 1);
    }

    // -- Record tests ---------------------------------------------------------

    #[test]
    fn user_record_debug_redacts_hash() {
        let debug = format!("{:?}", sample_user("grace@navy.mil"));
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("argon2id"));
    }

    #[test]
    fn user_response_never_has_password_hash() {
        let response = UserResponse::from(&sample_user("grace@navy.mil"));
        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("password_hash").is_none());
        assert!(json.get("laboratory_id").is_none());
        assert_eq!(json["role"], "teacher");
        assert_eq!(json["email"], "grace@navy.mil");
    }

    // -- Config tests ---------------------------------------------------------

    fn lookup(vars: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |key| {
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn config_defaults_when_unset() {
        let config = AppConfig::from_lookup(lookup(&[]));
        assert_eq!(config.port, 8080);
        assert_eq!(config.db_max_connections, 10);
        assert!(config.database_url.is_none());
        assert_eq!(config.log_format, LogFormat::Text);
    }

    #[test]
    fn config_reads_variables() {
        let config = AppConfig::from_lookup(lookup(&[
            ("PORT", "3000"),
            ("DATABASE_URL", "postgres://u:p@localhost/labreg"),
            ("DB_MAX_CONNECTIONS", "4"),
            ("LOG_FORMAT", "JSON"),
        ]));
        assert_eq!(config.port, 3000);
        assert_eq!(config.db_max_connections, 4);
        assert_eq!(
            config.database_url.as_deref(),
            Some("postgres://u:p@localhost/labreg")
        );
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn config_ignores_garbage_numbers() {
        let config = AppConfig::from_lookup(lookup(&[
            ("PORT", "eighty"),
            ("DB_MAX_CONNECTIONS", "0"),
            ("DATABASE_URL", "  "),
        ]));
        assert_eq!(config.port, 8080);
        assert_eq!(config.db_max_connections, 10);
        assert!(config.database_url.is_none());
    }

    #[test]
    fn config_debug_redacts_database_url() {
        let config = AppConfig::from_lookup(lookup(&[(
            "DATABASE_URL",
            "postgres://admin:hunter2@db/labreg",
        )]));
        let debug = format!("{config:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("[REDACTED]"));
    }

    // -- AppState tests -------------------------------------------------------

    #[test]
    fn app_state_new_is_in_memory() {
        let state = AppState::new();
        assert!(state.users.is_empty());
        assert!(state.db_pool.is_none());
        assert_eq!(state.config.port, 8080);
    }

    #[tokio::test]
    async fn hydrate_without_pool_is_a_no_op() {
        let state = AppState::new();
        state.hydrate_from_db().await.unwrap();
        assert!(state.users.is_empty());
    }
}
