//! Keeps exactly one role-bearing profile attached to every user

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    error::AppResult,
    models::user::{Role, UserProfile},
    repository::Repository,
};

use super::hooks::{UserEvent, UserListener};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn create_profile(&self, user_id: i32, role: Role) -> AppResult<UserProfile>;
    /// Re-save, creating a default profile when missing
    async fn save_profile(&self, user_id: i32) -> AppResult<UserProfile>;
}

#[async_trait]
impl ProfileStore for Repository {
    async fn create_profile(&self, user_id: i32, role: Role) -> AppResult<UserProfile> {
        self.profiles_create(user_id, role).await
    }

    async fn save_profile(&self, user_id: i32) -> AppResult<UserProfile> {
        self.profiles_save(user_id).await
    }
}

/// Creates a Member profile for new users and re-saves it on every user save
pub struct ProfileBinding {
    store: Arc<dyn ProfileStore>,
}

impl ProfileBinding {
    pub fn new(store: Arc<dyn ProfileStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl UserListener for ProfileBinding {
    fn name(&self) -> &'static str {
        "profile-binding"
    }

    async fn on_event(&self, event: &UserEvent) -> AppResult<()> {
        match event {
            UserEvent::Created(user) => {
                let profile = self.store.create_profile(user.id, Role::default()).await?;
                tracing::info!("Created {} profile for user {}", profile.role, user.username);
            }
            UserEvent::Saved(user) => {
                self.store.save_profile(user.id).await?;
            }
        }
        Ok(())
    }
}
