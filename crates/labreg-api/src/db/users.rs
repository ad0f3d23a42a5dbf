//! User persistence operations.
//!
//! A user is one row in `users` plus one row in the table owned by its role
//! (`teachers`, `technical_staff`, `admins`). Both are written in a single
//! transaction.

use chrono::{DateTime, Utc};
use labreg_core::{Email, LaboratoryId, Role, UserId};
use sqlx::PgPool;
use uuid::Uuid;

use crate::state::UserRecord;

const SELECT_USERS: &str = "SELECT u.id, u.name, u.email, u.password_hash, u.role,
     ts.laboratory_id, u.created_at
     FROM users u
     LEFT JOIN technical_staff ts ON ts.user_id = u.id";

/// Insert a user and its role row atomically.
///
/// A duplicate email surfaces as a unique violation, an unknown laboratory
/// as a foreign-key violation.
pub async fn insert(pool: &PgPool, record: &UserRecord) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        "INSERT INTO users (id, name, email, password_hash, role, created_at)
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(record.id.0)
    .bind(&record.name)
    .bind(record.email.as_str())
    .bind(&record.password_hash)
    .bind(record.role.as_str())
    .bind(record.created_at)
    .execute(&mut *tx)
    .await?;

    let role_row = match record.role {
        Role::Teacher => sqlx::query("INSERT INTO teachers (user_id) VALUES ($1)").bind(record.id.0),
        Role::TechnicalStaff => sqlx::query(
            "INSERT INTO technical_staff (user_id, laboratory_id) VALUES ($1, $2)",
        )
        .bind(record.id.0)
        .bind(record.laboratory_id.map(|lab| lab.0)),
        Role::Admin => sqlx::query("INSERT INTO admins (user_id) VALUES ($1)").bind(record.id.0),
    };
    role_row.execute(&mut *tx).await?;

    tx.commit().await?;
    Ok(())
}

/// Fetch a user by ID.
pub async fn get_by_id(pool: &PgPool, id: UserId) -> Result<Option<UserRecord>, sqlx::Error> {
    let row = sqlx::query_as::<_, UserRow>(&format!("{SELECT_USERS} WHERE u.id = $1"))
        .bind(id.0)
        .fetch_optional(pool)
        .await?;

    row.map(UserRow::into_record).transpose()
}

/// Load all users into the in-memory store on startup.
pub async fn load_all(pool: &PgPool) -> Result<Vec<UserRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, UserRow>(&format!("{SELECT_USERS} ORDER BY u.created_at"))
        .fetch_all(pool)
        .await?;

    rows.into_iter().map(UserRow::into_record).collect()
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    role: String,
    laboratory_id: Option<Uuid>,
    created_at: DateTime<Utc>,
}

impl UserRow {
    /// Rows that no longer parse (a role or email edited by hand) are
    /// reported as decode errors rather than silently skipped.
    fn into_record(self) -> Result<UserRecord, sqlx::Error> {
        let role: Role = self
            .role
            .parse()
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
        let email = Email::parse(&self.email).map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
        Ok(UserRecord {
            id: UserId(self.id),
            name: self.name,
            email,
            role,
            laboratory_id: self.laboratory_id.map(LaboratoryId),
            password_hash: self.password_hash,
            created_at: self.created_at,
        })
    }
}
