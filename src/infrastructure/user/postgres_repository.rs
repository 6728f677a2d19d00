//! PostgreSQL user repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use tracing::info;

use crate::domain::user::{
    NewUser, User, UserChanges, UserId, UserRepository, UserRole, UserStats, EMAIL_TAKEN,
};
use crate::domain::{DomainError, Page, PageRequest};

const USER_COLUMNS: &str = "id, name, email, role, password_hash, created_at, updated_at";

/// Idempotent schema for the users table. Email uniqueness is a table
/// constraint so concurrent updates cannot both claim the same address.
const CREATE_USERS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS users (
        id BIGSERIAL PRIMARY KEY,
        name VARCHAR(255) NOT NULL,
        email VARCHAR(255) NOT NULL,
        role VARCHAR(16) NOT NULL DEFAULT 'client',
        password_hash TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        CONSTRAINT users_email_unique UNIQUE (email),
        CONSTRAINT users_role_check CHECK (role IN ('client', 'admin'))
    )
"#;

/// PostgreSQL implementation of UserRepository
#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the users table if it does not exist yet
    pub async fn migrate(&self) -> Result<(), DomainError> {
        sqlx::query(CREATE_USERS_TABLE)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to create users table: {}", e)))?;

        info!("Users table ready");
        Ok(())
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn get(&self, id: UserId) -> Result<Option<User>, DomainError> {
        let Some(db_id) = to_db_id(id) else {
            return Ok(None);
        };

        let row = sqlx::query(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(db_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get user: {}", e)))?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn create(&self, user: NewUser) -> Result<User, DomainError> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO users (name, email, role, password_hash, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(&user.name)
        .bind(&user.email)
        .bind(user.role.as_str())
        .bind(&user.password_hash)
        .bind(user.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "create"))?;

        row_to_user(&row)
    }

    async fn update(&self, id: UserId, changes: &UserChanges) -> Result<User, DomainError> {
        let not_found = || DomainError::not_found(format!("User {} not found", id));
        let db_id = to_db_id(id).ok_or_else(not_found)?;

        // Absent fields bind NULL and keep the stored value
        let row = sqlx::query(&format!(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                email = COALESCE($3, email),
                role = COALESCE($4, role),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(db_id)
        .bind(changes.name.as_deref())
        .bind(changes.email.as_deref())
        .bind(changes.role.map(|r| r.as_str()))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "update"))?;

        match row {
            Some(row) => row_to_user(&row),
            None => Err(not_found()),
        }
    }

    async fn delete(&self, id: UserId) -> Result<bool, DomainError> {
        let Some(db_id) = to_db_id(id) else {
            return Ok(false);
        };

        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(db_id)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete user: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn page(&self, request: PageRequest) -> Result<Page<User>, DomainError> {
        let total = self.count(None).await?;

        let rows = sqlx::query(&format!(
            "SELECT {} FROM users ORDER BY id LIMIT $1 OFFSET $2",
            USER_COLUMNS
        ))
        .bind(to_db_count(request.per_page()))
        .bind(to_db_count(request.offset()))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to list users: {}", e)))?;

        let users = rows.iter().map(row_to_user).collect::<Result<Vec<_>, _>>()?;

        Ok(Page::new(users, total, request))
    }

    async fn count(&self, role: Option<UserRole>) -> Result<usize, DomainError> {
        let count: i64 = match role {
            Some(r) => {
                sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = $1")
                    .bind(r.as_str())
                    .fetch_one(&self.pool)
                    .await
            }
            None => {
                sqlx::query_scalar("SELECT COUNT(*) FROM users")
                    .fetch_one(&self.pool)
                    .await
            }
        }
        .map_err(|e| DomainError::storage(format!("Failed to count users: {}", e)))?;

        Ok(usize::try_from(count).unwrap_or_default())
    }

    async fn stats(&self, recent_limit: usize) -> Result<UserStats, DomainError> {
        let storage = |e: sqlx::Error| DomainError::storage(format!("Failed to compute stats: {}", e));

        let mut tx = self.pool.begin().await.map_err(storage)?;

        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
            .execute(&mut *tx)
            .await
            .map_err(storage)?;

        let (admin_users, client_users): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FILTER (WHERE role = 'admin'),
                   COUNT(*) FILTER (WHERE role = 'client')
            FROM users
            "#,
        )
        .fetch_one(&mut *tx)
        .await
        .map_err(storage)?;

        let rows = sqlx::query(&format!(
            "SELECT {} FROM users ORDER BY created_at DESC, id DESC LIMIT $1",
            USER_COLUMNS
        ))
        .bind(to_db_count(recent_limit))
        .fetch_all(&mut *tx)
        .await
        .map_err(storage)?;

        tx.commit().await.map_err(storage)?;

        let admin_users = usize::try_from(admin_users).unwrap_or_default();
        let client_users = usize::try_from(client_users).unwrap_or_default();

        Ok(UserStats {
            total_users: admin_users + client_users,
            admin_users,
            client_users,
            recent_users: rows.iter().map(row_to_user).collect::<Result<_, _>>()?,
        })
    }

    async fn ping(&self) -> Result<(), DomainError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Database unreachable: {}", e)))?;

        Ok(())
    }
}

fn to_db_id(id: UserId) -> Option<i64> {
    i64::try_from(id.value()).ok()
}

fn to_db_count(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn map_write_error(error: sqlx::Error, operation: &str) -> DomainError {
    if let sqlx::Error::Database(db_error) = &error {
        if db_error.is_unique_violation() {
            return DomainError::conflict("email", EMAIL_TAKEN);
        }
    }

    DomainError::storage(format!("Failed to {} user: {}", operation, error))
}

fn row_to_user(row: &sqlx::postgres::PgRow) -> Result<User, DomainError> {
    let id: i64 = row.get("id");
    let role: String = row.get("role");
    let created_at: DateTime<Utc> = row.get("created_at");
    let updated_at: DateTime<Utc> = row.get("updated_at");

    let id = u64::try_from(id)
        .map(UserId::new)
        .map_err(|_| DomainError::storage(format!("Invalid user ID in database: {}", id)))?;
    let role = role
        .parse::<UserRole>()
        .map_err(|e| DomainError::storage(format!("Invalid role in database: {}", e)))?;

    let parts = NewUser::new(
        row.get::<String, _>("name"),
        row.get::<String, _>("email"),
        role,
        row.get::<String, _>("password_hash"),
    )
    .with_created_at(created_at);

    Ok(User::from_parts(id, parts, updated_at))
}
