use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::password::{ensure_strong_password, hash_password};
use crate::features::users::dtos::{CreateUserDto, UserQueryParams, UserResponseDto};
use crate::features::users::models::{Role, User, UserContact};

const USER_COLUMNS: &str = "id, email, full_name, password_hash, role, manager_limit, \
     supervisor_id, is_deleted, created_at";

/// Unique index guarding case-insensitive email uniqueness
const EMAIL_UNIQUE_INDEX: &str = "idx_users_email_lower";

/// A create that loses the race against another one with the same email
/// reports the conflict instead of a database failure
fn map_create_error(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() && db_err.constraint() == Some(EMAIL_UNIQUE_INDEX) {
            return AppError::Conflict("Email is already registered".to_string());
        }
    }

    tracing::error!("Failed to create user: {:?}", e);
    AppError::Database(e)
}

/// Service for user accounts
pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find an account by email (case-insensitive), including soft-deleted ones
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE LOWER(email) = LOWER($1)",
            USER_COLUMNS
        ))
        .bind(email.trim())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to find user by email: {:?}", e);
            AppError::Database(e)
        })
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to find user by id: {:?}", e);
                AppError::Database(e)
            })
    }

    pub async fn update_password_hash(&self, id: Uuid, password_hash: &str) -> Result<()> {
        sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update password: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(())
    }

    /// Active admins and managers, the audience for note notifications
    pub async fn list_staff_contacts(&self) -> Result<Vec<UserContact>> {
        sqlx::query_as::<_, UserContact>(
            r#"
            SELECT id, email, full_name, role
            FROM users
            WHERE is_deleted = FALSE AND role IN ('admin', 'manager')
            ORDER BY full_name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list staff contacts: {:?}", e);
            AppError::Database(e)
        })
    }

    pub async fn find_contact(&self, id: Uuid) -> Result<Option<UserContact>> {
        sqlx::query_as::<_, UserContact>(
            "SELECT id, email, full_name, role FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to find user contact: {:?}", e);
            AppError::Database(e)
        })
    }

    /// List active users with pagination
    pub async fn list(&self, params: &UserQueryParams) -> Result<(Vec<UserResponseDto>, i64)> {
        let mut count_query: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM users WHERE is_deleted = FALSE");
        let mut query: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT {} FROM users WHERE is_deleted = FALSE",
            USER_COLUMNS
        ));

        if let Some(role) = params.role {
            count_query.push(" AND role = ").push_bind(role);
            query.push(" AND role = ").push_bind(role);
        }

        let window = params.window();
        query
            .push(" ORDER BY full_name, id OFFSET ")
            .push_bind(window.offset)
            .push(" LIMIT ")
            .push_bind(window.limit);

        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count users: {:?}", e);
                AppError::Database(e)
            })?;

        let users = query
            .build_query_as::<User>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list users: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((users.into_iter().map(UserResponseDto::from).collect(), total))
    }

    /// Create a user account (admin action)
    pub async fn create(&self, dto: CreateUserDto) -> Result<User> {
        ensure_strong_password(&dto.password)?;
        validate_manager_limit(dto.role, dto.manager_limit)?;

        if let Some(supervisor_id) = dto.supervisor_id {
            let supervisor = self
                .find_by_id(supervisor_id)
                .await?
                .filter(|u| !u.is_deleted)
                .ok_or_else(|| AppError::Validation("Supervisor not found".to_string()))?;

            if supervisor.role != Role::Manager {
                return Err(AppError::Validation(
                    "Supervisor must be a manager".to_string(),
                ));
            }
        }

        if self.find_by_email(&dto.email).await?.is_some() {
            return Err(AppError::Conflict("Email is already registered".to_string()));
        }

        let password_hash = hash_password(&dto.password)?;

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (id, email, full_name, password_hash, role, manager_limit, supervisor_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(Uuid::now_v7())
        .bind(dto.email.trim())
        .bind(dto.full_name.trim())
        .bind(password_hash)
        .bind(dto.role)
        .bind(dto.manager_limit)
        .bind(dto.supervisor_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_create_error)?;

        tracing::info!("User created: id={}, role={}", user.id, user.role);

        Ok(user)
    }

    /// Soft delete: the row stays so requests and notes keep their references
    pub async fn soft_delete(&self, id: Uuid, actor_id: Uuid) -> Result<()> {
        if id == actor_id {
            return Err(AppError::BadRequest(
                "You cannot delete your own account".to_string(),
            ));
        }

        let affected =
            sqlx::query("UPDATE users SET is_deleted = TRUE WHERE id = $1 AND is_deleted = FALSE")
                .bind(id)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to delete user: {:?}", e);
                    AppError::Database(e)
                })?
                .rows_affected();

        if affected == 0 {
            return Err(AppError::NotFound(format!("User {} not found", id)));
        }

        tracing::info!("User soft-deleted: id={}, by={}", id, actor_id);
        Ok(())
    }

    /// Seed the first admin account when none exists
    pub async fn ensure_bootstrap_admin(&self, email: &str, password: &str) -> Result<bool> {
        let admins: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM users WHERE role = 'admin' AND is_deleted = FALSE",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)?;

        if admins > 0 {
            return Ok(false);
        }

        self.create(CreateUserDto {
            email: email.to_string(),
            full_name: "Administrator".to_string(),
            password: password.to_string(),
            role: Role::Admin,
            manager_limit: None,
            supervisor_id: None,
        })
        .await?;

        Ok(true)
    }
}

/// Spend limits belong to managers only and cannot be negative
pub fn validate_manager_limit(role: Role, manager_limit: Option<Decimal>) -> Result<()> {
    match (role, manager_limit) {
        (Role::Manager, Some(limit)) if limit < Decimal::ZERO => Err(AppError::Validation(
            "Manager limit cannot be negative".to_string(),
        )),
        (Role::Admin | Role::Employee, Some(_)) => Err(AppError::Validation(
            "Only managers can have a spend limit".to_string(),
        )),
        _ => Ok(()),
    }
}
