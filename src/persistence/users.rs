use sqlx::{Pool, Row, Sqlite, sqlite::SqliteRow};

use crate::{
    app::{ServiceError, ServiceResult},
    auth::User,
    session::Role,
};

pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

#[async_trait::async_trait]
pub trait UserRepository {
    /// Inserts the user and returns the assigned id. A duplicate email is a
    /// conflict.
    async fn create_user(&self, user: &NewUser) -> ServiceResult<i64>;
    async fn find_by_email_and_role(&self, email: &str, role: Role)
    -> ServiceResult<Option<User>>;
}

pub struct SqliteUserRepository {
    pool: Pool<Sqlite>,
}

impl SqliteUserRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    fn user_from_row(row: &SqliteRow) -> sqlx::Result<User> {
        let role: String = row.try_get("role")?;
        let role = Role::parse(&role)
            .ok_or_else(|| sqlx::Error::Decode(format!("unknown role '{}'", role).into()))?;
        Ok(User {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            role,
        })
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[async_trait::async_trait]
impl UserRepository for SqliteUserRepository {
    async fn create_user(&self, user: &NewUser) -> ServiceResult<i64> {
        let result = sqlx::query(
            "INSERT INTO users (name, email, password_hash, role) VALUES (?, ?, ?, ?)",
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ServiceError::Conflict("Email already registered".to_string())
            } else {
                ServiceError::Database(e)
            }
        })?;
        Ok(result.last_insert_rowid())
    }

    async fn find_by_email_and_role(
        &self,
        email: &str,
        role: Role,
    ) -> ServiceResult<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE email = ? AND role = ?")
            .bind(email)
            .bind(role.as_str())
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(row) => Ok(Some(Self::user_from_row(&row)?)),
            None => Ok(None),
        }
    }
}
