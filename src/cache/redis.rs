use redis::AsyncCommands;
use redis::Client;
use std::fmt::Display;
use tokio::sync::mpsc;

use crate::error::AppResult;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Candidate set for a user's watchlist under a resolved genre filter
    Watchlist { username: String, genres: String },
    /// Watchmode title listing used by the random movie endpoint
    RandomTitles,
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::Watchlist { username, genres } => {
                write!(f, "watchlist:{}:{}", username.to_lowercase(), genres)
            }
            CacheKey::RandomTitles => write!(f, "random:movie"),
        }
    }
}

/// Creates a Redis client for caching
///
/// Opening the client does not connect; connections are made per operation.
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

/// Serialized value waiting to be written
struct PendingWrite {
    key: String,
    json: String,
    ttl_secs: u64,
}

/// Best-effort JSON cache over Redis
///
/// Reads go straight to Redis and degrade to a miss on any failure. Writes
/// are handed to a single background task over a channel, and the caller
/// never waits on Redis. Cloning is cheap; clones share the writer.
#[derive(Clone)]
pub struct Cache {
    redis_client: Client,
    writes: mpsc::UnboundedSender<PendingWrite>,
}

/// Stops the background writer after it has flushed queued writes
pub struct CacheWriterHandle {
    shutdown_tx: mpsc::Sender<()>,
}

impl CacheWriterHandle {
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        tracing::info!("Cache writer shutdown requested");
    }
}

impl Cache {
    /// Creates the cache and spawns its writer task
    ///
    /// Must be called inside a Tokio runtime. Keep the returned handle and
    /// call `shutdown` before exit so queued writes reach Redis.
    pub fn new(redis_client: Client) -> (Self, CacheWriterHandle) {
        let (writes, queue) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        tokio::spawn(run_writer(redis_client.clone(), queue, shutdown_rx));

        (
            Self {
                redis_client,
                writes,
            },
            CacheWriterHandle { shutdown_tx },
        )
    }

    /// Cached value for `key`, or `None` on a miss
    ///
    /// Connection, command and decoding failures are logged and read as a
    /// miss, so callers fall through to the live source.
    pub async fn get_or_miss<T: serde::de::DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        let key = key.to_string();

        let json = match read_raw(&self.redis_client, &key).await {
            Ok(json) => json?,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Cache read failed, treating as miss");
                return None;
            }
        };

        serde_json::from_str(&json)
            .map_err(|e| tracing::warn!(key = %key, error = %e, "Discarding undecodable cache entry"))
            .ok()
    }

    /// Queues `value` for storage under `key` with a TTL in seconds
    pub fn set_in_background<T: serde::Serialize>(&self, key: &CacheKey, value: &T, ttl_secs: u64) {
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(key = %key, error = %e, "Cache serialization error");
                return;
            }
        };

        let write = PendingWrite {
            key: key.to_string(),
            json,
            ttl_secs,
        };
        if self.writes.send(write).is_err() {
            tracing::error!(key = %key, "Cache writer is gone, dropping write");
        }
    }
}

/// Applies queued writes until shutdown, then flushes what is left
async fn run_writer(
    client: Client,
    mut queue: mpsc::UnboundedReceiver<PendingWrite>,
    mut shutdown_rx: mpsc::Receiver<()>,
) {
    tracing::info!("Cache writer task started");

    loop {
        tokio::select! {
            Some(write) = queue.recv() => apply_write(&client, write).await,
            _ = shutdown_rx.recv() => break,
        }
    }

    // No new writes after this point; drain the backlog
    queue.close();
    while let Some(write) = queue.recv().await {
        apply_write(&client, write).await;
    }

    tracing::info!("Cache writer task stopped");
}

async fn read_raw(client: &Client, key: &str) -> AppResult<Option<String>> {
    let mut conn = client.get_multiplexed_async_connection().await?;
    let json: Option<String> = conn.get(key).await?;
    Ok(json)
}

async fn write_raw(client: &Client, write: &PendingWrite) -> AppResult<()> {
    let mut conn = client.get_multiplexed_async_connection().await?;
    let _: () = conn.set_ex(&write.key, &write.json, write.ttl_secs).await?;
    Ok(())
}

async fn apply_write(client: &Client, write: PendingWrite) {
    match write_raw(client, &write).await {
        Ok(()) => tracing::debug!(key = %write.key, ttl = write.ttl_secs, "Cached value"),
        Err(e) => tracing::error!(key = %write.key, error = %e, "Failed to write to Redis cache"),
    }
}
