//! Users, profiles and permission grants

use std::collections::BTreeSet;

use sqlx::Row;

use super::Repository;
use crate::{
    error::{AppError, AppResult},
    models::{
        permission::Permission,
        user::{NewUser, Role, User, UserProfile, UserWithRole},
    },
};

const USER_COLUMNS: &str = r#"
    id, username, email, password, first_name, last_name, date_of_birth,
    profile_photo, is_active, is_staff, is_superuser, date_joined, last_login
"#;

impl Repository {
    /// Get user by ID
    pub async fn users_get_by_id(&self, id: i32) -> AppResult<User> {
        let query = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// Get user by email (case-insensitive)
    pub async fn users_get_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let query = format!("SELECT {} FROM users WHERE LOWER(email) = LOWER($1)", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn users_get_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let query = format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&query)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Check if email already exists
    pub async fn users_email_exists(&self, email: &str) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(email) = LOWER($1))")
                .bind(email)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    /// Check if username already exists
    pub async fn users_username_exists(&self, username: &str) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
            .bind(username)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    pub async fn users_create(&self, data: &NewUser) -> AppResult<User> {
        let query = format!(
            r#"
            INSERT INTO users (username, email, password, first_name, last_name,
                               date_of_birth, profile_photo, is_staff, is_superuser)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&data.username)
            .bind(&data.email)
            .bind(&data.password_hash)
            .bind(&data.first_name)
            .bind(&data.last_name)
            .bind(data.date_of_birth)
            .bind(&data.profile_photo)
            .bind(data.is_staff)
            .bind(data.is_superuser)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                    AppError::Conflict("A user with that username or email already exists".to_string())
                }
                other => AppError::Database(other),
            })
    }

    /// Record a successful login
    pub async fn users_touch_last_login(&self, id: i32) -> AppResult<User> {
        let query = format!(
            "UPDATE users SET last_login = NOW() WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// Every user with their profile role, ordered by username
    pub async fn users_list_with_roles(&self) -> AppResult<Vec<UserWithRole>> {
        let rows = sqlx::query_as::<_, UserWithRole>(
            r#"
            SELECT u.id, u.username, u.email, u.is_active, p.role
            FROM users u
            LEFT JOIN user_profiles p ON p.user_id = u.id
            ORDER BY u.username
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn profiles_get(&self, user_id: i32) -> AppResult<Option<UserProfile>> {
        let row = sqlx::query_as::<_, UserProfile>(
            "SELECT id, user_id, role, updated_at FROM user_profiles WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Create the profile of a new user
    pub async fn profiles_create(&self, user_id: i32, role: Role) -> AppResult<UserProfile> {
        let row = sqlx::query_as::<_, UserProfile>(
            r#"
            INSERT INTO user_profiles (user_id, role)
            VALUES ($1, $2)
            RETURNING id, user_id, role, updated_at
            "#,
        )
        .bind(user_id)
        .bind(role)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Re-save a user's profile, creating a Member profile when missing
    pub async fn profiles_save(&self, user_id: i32) -> AppResult<UserProfile> {
        let row = sqlx::query_as::<_, UserProfile>(
            r#"
            INSERT INTO user_profiles (user_id, role)
            VALUES ($1, $2)
            ON CONFLICT (user_id) DO UPDATE SET updated_at = NOW()
            RETURNING id, user_id, role, updated_at
            "#,
        )
        .bind(user_id)
        .bind(Role::default())
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn profiles_set_role(&self, user_id: i32, role: Role) -> AppResult<UserProfile> {
        let row = sqlx::query_as::<_, UserProfile>(
            r#"
            INSERT INTO user_profiles (user_id, role)
            VALUES ($1, $2)
            ON CONFLICT (user_id) DO UPDATE SET role = EXCLUDED.role, updated_at = NOW()
            RETURNING id, user_id, role, updated_at
            "#,
        )
        .bind(user_id)
        .bind(role)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Permissions granted directly to a user
    pub async fn permissions_for_user(&self, user_id: i32) -> AppResult<BTreeSet<Permission>> {
        let rows = sqlx::query("SELECT codename FROM user_permissions WHERE user_id = $1")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        let mut permissions = BTreeSet::new();
        for row in rows {
            let codename: String = row.get("codename");
            match codename.parse::<Permission>() {
                Ok(permission) => {
                    permissions.insert(permission);
                }
                Err(e) => tracing::warn!("Ignoring grant for user {}: {}", user_id, e),
            }
        }
        Ok(permissions)
    }

    pub async fn permissions_grant(&self, user_id: i32, permission: Permission) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO user_permissions (user_id, codename)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(permission.qualified())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Revoke a grant; returns whether the user held it
    pub async fn permissions_revoke(&self, user_id: i32, permission: Permission) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM user_permissions WHERE user_id = $1 AND codename = $2")
            .bind(user_id)
            .bind(permission.qualified())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
