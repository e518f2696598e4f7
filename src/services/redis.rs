//! Redis service holding the session revocation list

use redis::{AsyncCommands, Client};

use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct RedisService {
    client: Client,
}

fn revoked_key(jti: &str) -> String {
    format!("session:revoked:{}", jti)
}

impl RedisService {
    /// Create a Redis service and check the server answers
    pub async fn new(url: &str) -> AppResult<Self> {
        let service = Self::open(url)?;

        // Test connection
        let mut conn = service.connection().await?;
        redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await
            .map_err(|e| AppError::Internal(format!("Redis connection test failed: {}", e)))?;

        Ok(service)
    }

    /// Create a Redis service without connecting
    pub fn open(url: &str) -> AppResult<Self> {
        let client = Client::open(url)
            .map_err(|e| AppError::Internal(format!("Failed to create Redis client: {}", e)))?;
        Ok(Self { client })
    }

    async fn connection(&self) -> AppResult<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to get Redis connection: {}", e)))
    }

    /// Revoke a session token until it would have expired anyway
    pub async fn revoke_session(&self, jti: &str, ttl_seconds: u64) -> AppResult<()> {
        if ttl_seconds == 0 {
            return Ok(());
        }
        let mut conn = self.connection().await?;
        conn.set_ex::<_, _, ()>(revoked_key(jti), "1", ttl_seconds)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to revoke session in Redis: {}", e)))?;
        Ok(())
    }

    pub async fn is_session_revoked(&self, jti: &str) -> AppResult<bool> {
        let mut conn = self.connection().await?;
        let exists: bool = conn
            .exists(revoked_key(jti))
            .await
            .map_err(|e| AppError::Internal(format!("Failed to check session in Redis: {}", e)))?;
        Ok(exists)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn revoked_sessions_are_keyed_by_token_id() {
        assert_eq!(revoked_key("abc"), "session:revoked:abc");
    }

    #[test]
    fn open_rejects_a_malformed_url() {
        assert!(RedisService::open("not a url").is_err());
        assert!(RedisService::open("redis://127.0.0.1:6379").is_ok());
    }
}
