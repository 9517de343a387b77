use crate::domain::errors::CacheError;
use crate::domain::ports::RemoteCache;
use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::info;

/// Remote cache tier backed by Redis.
///
/// The connection is opened lazily on first use, so the service starts even
/// when Redis is down; a failed connect is retried on the next call.
pub struct RedisRemoteCache {
    client: redis::Client,
    connection: OnceCell<ConnectionManager>,
}

impl RedisRemoteCache {
    pub fn new(url: &str) -> anyhow::Result<Self> {
        let client = redis::Client::open(url)?;
        Ok(Self {
            client,
            connection: OnceCell::new(),
        })
    }

    async fn connection(&self) -> Result<ConnectionManager, CacheError> {
        let manager = self
            .connection
            .get_or_try_init(|| async {
                let manager = self.client.get_connection_manager().await?;
                info!("RedisRemoteCache: connected");
                Ok::<_, redis::RedisError>(manager)
            })
            .await
            .map_err(unavailable)?;
        Ok(manager.clone())
    }
}

fn unavailable(e: redis::RedisError) -> CacheError {
    CacheError::Unavailable {
        reason: e.to_string(),
    }
}

/// Redis expiry is whole seconds; sub-second TTLs round up to one.
fn ttl_seconds(ttl: Duration) -> u64 {
    let secs = ttl.as_secs() + u64::from(ttl.subsec_nanos() > 0);
    secs.max(1)
}

#[async_trait]
impl RemoteCache for RedisRemoteCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let mut conn = self.connection().await?;
        conn.get::<_, Option<Vec<u8>>>(key)
            .await
            .map_err(unavailable)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        conn.set_ex::<_, _, ()>(key, value, ttl_seconds(ttl))
            .await
            .map_err(unavailable)
    }
}
