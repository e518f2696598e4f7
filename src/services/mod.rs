//! Business logic services

pub mod catalog;
pub mod hooks;
pub mod profiles;
pub mod queries;
pub mod redis;
pub mod users;

use std::sync::Arc;

use crate::{config::AuthConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub repository: Repository,
    pub catalog: catalog::CatalogService,
    pub queries: queries::QueryService,
    pub users: users::UsersService,
}

impl Services {
    /// Create all services with the given repository; registers the user hooks
    pub fn new(repository: Repository, auth_config: AuthConfig, redis_service: redis::RedisService) -> Self {
        let mut hooks = hooks::UserHooks::new();
        hooks.register(Arc::new(profiles::ProfileBinding::new(Arc::new(repository.clone()))));

        Self {
            catalog: catalog::CatalogService::new(repository.clone()),
            queries: queries::QueryService::new(Arc::new(repository.clone())),
            users: users::UsersService::new(repository.clone(), auth_config, hooks, redis_service),
            repository,
        }
    }
}
