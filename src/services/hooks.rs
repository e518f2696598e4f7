//! User lifecycle hooks.
//!
//! Listeners are registered once at startup and run in registration order
//! after a user row has been persisted. The first listener error aborts
//! the dispatch and is returned to the caller.

use std::sync::Arc;

use async_trait::async_trait;

use crate::{error::AppResult, models::user::User};

/// Persistence event on a user row
#[derive(Debug, Clone)]
pub enum UserEvent {
    /// The user was inserted
    Created(User),
    /// The user was updated; also fired right after `Created`
    Saved(User),
}

impl UserEvent {
    pub fn user(&self) -> &User {
        match self {
            UserEvent::Created(user) | UserEvent::Saved(user) => user,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            UserEvent::Created(_) => "created",
            UserEvent::Saved(_) => "saved",
        }
    }
}

#[async_trait]
pub trait UserListener: Send + Sync {
    fn name(&self) -> &'static str;

    async fn on_event(&self, event: &UserEvent) -> AppResult<()>;
}

#[derive(Clone, Default)]
pub struct UserHooks {
    listeners: Vec<Arc<dyn UserListener>>,
}

impl UserHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, listener: Arc<dyn UserListener>) {
        tracing::debug!("Registered user listener {}", listener.name());
        self.listeners.push(listener);
    }

    pub async fn dispatch(&self, event: &UserEvent) -> AppResult<()> {
        for listener in &self.listeners {
            tracing::debug!(
                "Dispatching user {} event for user {} to {}",
                event.kind(),
                event.user().id,
                listener.name()
            );
            if let Err(e) = listener.on_event(event).await {
                tracing::error!(
                    "User listener {} failed on {} event for user {}: {}",
                    listener.name(),
                    event.kind(),
                    event.user().id,
                    e
                );
                return Err(e);
            }
        }
        Ok(())
    }

    /// Fire `Created` then `Saved` for a freshly inserted user
    pub async fn user_created(&self, user: &User) -> AppResult<()> {
        self.dispatch(&UserEvent::Created(user.clone())).await?;
        self.dispatch(&UserEvent::Saved(user.clone())).await
    }

    pub async fn user_saved(&self, user: &User) -> AppResult<()> {
        self.dispatch(&UserEvent::Saved(user.clone())).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::Utc;

    use super::*;
    use crate::error::AppError;

    struct Recorder {
        name: &'static str,
        seen: Arc<Mutex<Vec<String>>>,
        fail: bool,
    }

    #[async_trait]
    impl UserListener for Recorder {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn on_event(&self, event: &UserEvent) -> AppResult<()> {
            self.seen
                .lock()
                .unwrap()
                .push(format!("{}:{}:{}", self.name, event.kind(), event.user().id));
            if self.fail {
                return Err(AppError::Internal("listener failed".to_string()));
            }
            Ok(())
        }
    }

    fn user(id: i32) -> User {
        User {
            id,
            username: format!("user{}", id),
            email: format!("user{}@example.org", id),
            password: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            date_of_birth: None,
            profile_photo: None,
            is_active: true,
            is_staff: false,
            is_superuser: false,
            date_joined: Utc::now(),
            last_login: None,
        }
    }

    fn recorder(name: &'static str, seen: &Arc<Mutex<Vec<String>>>, fail: bool) -> Arc<dyn UserListener> {
        Arc::new(Recorder {
            name,
            seen: seen.clone(),
            fail,
        })
    }

    #[tokio::test]
    async fn created_user_fires_created_then_saved_in_registration_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut hooks = UserHooks::new();
        hooks.register(recorder("first", &seen, false));
        hooks.register(recorder("second", &seen, false));

        hooks.user_created(&user(4)).await.unwrap();

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                "first:created:4",
                "second:created:4",
                "first:saved:4",
                "second:saved:4",
            ]
        );
    }

    #[tokio::test]
    async fn failing_listener_stops_dispatch() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut hooks = UserHooks::new();
        hooks.register(recorder("broken", &seen, true));
        hooks.register(recorder("after", &seen, false));

        assert!(hooks.user_saved(&user(1)).await.is_err());
        assert_eq!(*seen.lock().unwrap(), vec!["broken:saved:1"]);
    }

    #[tokio::test]
    async fn no_listeners_is_a_no_op() {
        let hooks = UserHooks::new();
        hooks.user_created(&user(2)).await.unwrap();
    }
}
