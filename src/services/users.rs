//! Authentication, registration and user administration service

use std::collections::BTreeSet;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use chrono::Utc;
use validator::Validate;

use crate::{
    config::{AuthConfig, BootstrapConfig, LoginField},
    error::{AppError, AppResult},
    models::{
        permission::Permission,
        user::{
            NewUser, RegisterUser, Role, User, UserClaims, UserProfile, UserWithRole, USERNAME_RE,
        },
    },
    repository::Repository,
};

use super::{hooks::UserHooks, redis::RedisService};

const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Current role and grants of a user, as stored
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccessStore: Send + Sync {
    async fn role_of(&self, user_id: i32) -> AppResult<Option<Role>>;
    async fn permissions_of(&self, user_id: i32) -> AppResult<BTreeSet<Permission>>;
}

#[async_trait]
impl AccessStore for Repository {
    async fn role_of(&self, user_id: i32) -> AppResult<Option<Role>> {
        Ok(self.profiles_get(user_id).await?.map(|p| p.role))
    }

    async fn permissions_of(&self, user_id: i32) -> AppResult<BTreeSet<Permission>> {
        self.permissions_for_user(user_id).await
    }
}

/// Replace the role and permissions signed into a token with the stored ones
pub async fn refresh_claims(store: &dyn AccessStore, mut claims: UserClaims) -> AppResult<UserClaims> {
    claims.role = store.role_of(claims.user_id).await?;
    claims.permissions = store.permissions_of(claims.user_id).await?;
    Ok(claims)
}

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    config: AuthConfig,
    hooks: UserHooks,
    redis: RedisService,
}

/// Lowercase the domain part of an email address
pub fn normalize_email(email: &str) -> String {
    let email = email.trim();
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{}@{}", local, domain.to_lowercase()),
        None => email.to_string(),
    }
}

/// Checks a registration form beyond its field-level validation
pub fn check_registration(form: &RegisterUser) -> AppResult<()> {
    form.validate()?;
    if !USERNAME_RE.is_match(&form.username) {
        return Err(AppError::Validation(
            "Username may contain only letters, numbers, and @/./+/-/_ characters".to_string(),
        ));
    }
    if form.password1 != form.password2 {
        return Err(AppError::Validation(
            "The two password fields didn't match".to_string(),
        ));
    }
    Ok(())
}

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

pub fn verify_password(hash: &str, password: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

impl UsersService {
    pub fn new(repository: Repository, config: AuthConfig, hooks: UserHooks, redis: RedisService) -> Self {
        Self {
            repository,
            config,
            hooks,
            redis,
        }
    }

    /// Register a new account; the profile is attached by the user hooks
    pub async fn register(&self, form: RegisterUser) -> AppResult<User> {
        check_registration(&form)?;

        let user = self
            .create_user(NewUser {
                username: form.username.trim().to_string(),
                email: normalize_email(&form.email),
                password_hash: hash_password(&form.password1)?,
                first_name: form.first_name.unwrap_or_default(),
                last_name: form.last_name.unwrap_or_default(),
                date_of_birth: form.date_of_birth,
                profile_photo: form.profile_photo,
                is_staff: false,
                is_superuser: false,
            })
            .await?;

        tracing::info!("Registered user {}", user);
        Ok(user)
    }

    /// Create a staff superuser. The email is mandatory.
    pub async fn create_superuser(&self, username: &str, email: &str, password: &str) -> AppResult<User> {
        if email.trim().is_empty() {
            return Err(AppError::Validation("The Email field must be set".to_string()));
        }
        self.create_user(NewUser {
            username: username.trim().to_string(),
            email: normalize_email(email),
            password_hash: hash_password(password)?,
            first_name: String::new(),
            last_name: String::new(),
            date_of_birth: None,
            profile_photo: None,
            is_staff: true,
            is_superuser: true,
        })
        .await
    }

    /// Create the configured bootstrap superuser unless its email is taken
    pub async fn ensure_superuser(&self, bootstrap: &BootstrapConfig) -> AppResult<Option<User>> {
        let (Some(username), Some(email), Some(password)) = (
            bootstrap.admin_username.as_deref(),
            bootstrap.admin_email.as_deref(),
            bootstrap.admin_password.as_deref(),
        ) else {
            return Ok(None);
        };

        if self.repository.users_email_exists(email).await? {
            tracing::debug!("Bootstrap superuser {} already exists", email);
            return Ok(None);
        }

        let user = self.create_superuser(username, email, password).await?;
        self.repository.profiles_set_role(user.id, Role::Admin).await?;
        tracing::info!("Created bootstrap superuser {}", user);
        Ok(Some(user))
    }

    async fn create_user(&self, data: NewUser) -> AppResult<User> {
        if self.repository.users_username_exists(&data.username).await? {
            return Err(AppError::Conflict("A user with that username already exists".to_string()));
        }
        if self.repository.users_email_exists(&data.email).await? {
            return Err(AppError::Conflict("A user with that email already exists".to_string()));
        }

        let user = self.repository.users_create(&data).await?;
        self.hooks.user_created(&user).await?;
        Ok(user)
    }

    async fn find_login_user(&self, identifier: &str) -> AppResult<Option<User>> {
        match self.config.login_field {
            LoginField::Email => self.repository.users_get_by_email(identifier).await,
            LoginField::Username => self.repository.users_get_by_username(identifier).await,
        }
    }

    /// Check credentials and open a session; returns the token and its claims
    pub async fn authenticate(&self, identifier: &str, password: &str) -> AppResult<(String, UserClaims)> {
        let user = self
            .find_login_user(identifier.trim())
            .await?
            .ok_or_else(|| AppError::Authentication(INVALID_CREDENTIALS.to_string()))?;

        if !user.is_active || !verify_password(&user.password, password)? {
            tracing::info!("Rejected login for {}", identifier);
            return Err(AppError::Authentication(INVALID_CREDENTIALS.to_string()));
        }

        let user = self.repository.users_touch_last_login(user.id).await?;
        self.hooks.user_saved(&user).await?;

        self.issue_token(&user).await
    }

    /// Sign session claims for a user from its current profile and grants
    pub async fn issue_token(&self, user: &User) -> AppResult<(String, UserClaims)> {
        let role = self.repository.role_of(user.id).await?;
        let permissions = self.repository.permissions_of(user.id).await?;

        let now = Utc::now().timestamp();
        let exp = now + (self.config.jwt_expiration_hours as i64 * 3600);

        let claims = UserClaims {
            sub: user.username.clone(),
            user_id: user.id,
            email: user.email.clone(),
            full_name: user.full_name(),
            role,
            permissions,
            is_superuser: user.is_superuser,
            jti: uuid::Uuid::new_v4().to_string(),
            exp,
            iat: now,
        };

        let token = claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))?;

        Ok((token, claims))
    }

    /// Validate a session token; revoked tokens are rejected.
    ///
    /// Role and permissions come from the database, not from the token, so
    /// role changes and grants apply to sessions already open.
    pub async fn session_claims(&self, token: &str) -> AppResult<UserClaims> {
        let claims = UserClaims::from_token(token, &self.config.jwt_secret)
            .map_err(|e| AppError::Authentication(e.to_string()))?;
        if self.redis.is_session_revoked(&claims.jti).await? {
            return Err(AppError::Authentication("Session has been logged out".to_string()));
        }
        refresh_claims(&self.repository, claims).await
    }

    pub async fn logout(&self, claims: &UserClaims) -> AppResult<()> {
        let remaining = (claims.exp - Utc::now().timestamp()).max(0) as u64;
        self.redis.revoke_session(&claims.jti, remaining).await?;
        tracing::info!("User {} logged out", claims.sub);
        Ok(())
    }

    pub async fn list_with_roles(&self) -> AppResult<Vec<UserWithRole>> {
        self.repository.users_list_with_roles().await
    }

    pub async fn set_role(&self, user_id: i32, role: Role) -> AppResult<UserProfile> {
        let user = self.repository.users_get_by_id(user_id).await?;
        let profile = self.repository.profiles_set_role(user.id, role).await?;
        tracing::info!("User {} now has role {}", user.username, role);
        Ok(profile)
    }

    pub async fn grant_permission(&self, user_id: i32, codename: &str) -> AppResult<Permission> {
        let permission: Permission = codename.parse().map_err(AppError::Validation)?;
        let user = self.repository.users_get_by_id(user_id).await?;
        self.repository.permissions_grant(user.id, permission).await?;
        tracing::info!("Granted {} to {}", permission, user.username);
        Ok(permission)
    }

    pub async fn revoke_permission(&self, user_id: i32, codename: &str) -> AppResult<()> {
        let permission: Permission = codename.parse().map_err(AppError::Validation)?;
        if !self.repository.permissions_revoke(user_id, permission).await? {
            return Err(AppError::NotFound(format!(
                "User {} does not hold {}",
                user_id, permission
            )));
        }
        Ok(())
    }
}
