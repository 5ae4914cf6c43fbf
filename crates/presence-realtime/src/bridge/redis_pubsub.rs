//! Redis pub/sub bridge for multi-node deployments.

#[cfg(feature = "redis-pubsub")]
pub mod implementation {
    use async_trait::async_trait;
    use futures::StreamExt;
    use redis::AsyncCommands;
    use redis::Client;
    use redis::aio::ConnectionManager;
    use tokio::sync::{OnceCell, broadcast};
    use tracing::{debug, info, warn};

    use presence_core::error::{AppError, ErrorKind};
    use presence_core::result::AppResult;
    use presence_core::traits::EventBus;

    /// Redis-backed event bus.
    ///
    /// Publishing goes through a shared reconnecting connection manager,
    /// opened on first use. Each subscription holds its own pub/sub
    /// connection, forwarded into a broadcast channel by a background task
    /// that ends when the connection drops or every receiver is gone.
    #[derive(Debug)]
    pub struct RedisPubSub {
        /// Redis client.
        client: Client,
        /// Publishing connection.
        conn: OnceCell<ConnectionManager>,
        /// Buffer size of forwarded subscriptions.
        buffer_size: usize,
    }

    impl RedisPubSub {
        /// Creates a bridge for the given Redis URL. No connection is made
        /// until the first publish or subscribe.
        pub fn new(url: &str, buffer_size: usize) -> AppResult<Self> {
            let client = Client::open(url).map_err(|e| {
                AppError::with_source(ErrorKind::Configuration, "Invalid Redis URL", e)
            })?;
            info!(url = %mask_redis_url(url), "Redis pub/sub bridge configured");
            Ok(Self {
                client,
                conn: OnceCell::new(),
                buffer_size: buffer_size.max(1),
            })
        }

        async fn connection(&self) -> AppResult<ConnectionManager> {
            let conn = self
                .conn
                .get_or_try_init(|| async {
                    ConnectionManager::new(self.client.clone()).await.map_err(|e| {
                        AppError::with_source(ErrorKind::Transport, "Failed to connect to Redis", e)
                    })
                })
                .await?;
            Ok(conn.clone())
        }
    }

    #[async_trait]
    impl EventBus for RedisPubSub {
        async fn publish(&self, channel: &str, payload: String) -> AppResult<()> {
            let mut conn = self.connection().await?;
            let _receivers: i64 = conn.publish(channel, payload).await.map_err(|e| {
                AppError::with_source(ErrorKind::Transport, "Redis PUBLISH failed", e)
            })?;
            Ok(())
        }

        async fn subscribe(&self, channel: &str) -> AppResult<broadcast::Receiver<String>> {
            let mut pubsub = self.client.get_async_pubsub().await.map_err(|e| {
                AppError::with_source(ErrorKind::Transport, "Failed to open Redis pub/sub", e)
            })?;
            pubsub.subscribe(channel).await.map_err(|e| {
                AppError::with_source(ErrorKind::Transport, "Redis SUBSCRIBE failed", e)
            })?;

            let (tx, rx) = broadcast::channel(self.buffer_size);
            let channel = channel.to_string();
            tokio::spawn(async move {
                let mut messages = pubsub.into_on_message();
                while let Some(msg) = messages.next().await {
                    let payload: String = match msg.get_payload() {
                        Ok(payload) => payload,
                        Err(e) => {
                            warn!(channel = %channel, error = %e, "Dropping non-text Redis payload");
                            continue;
                        }
                    };
                    if tx.send(payload).is_err() {
                        break;
                    }
                }
                debug!(channel = %channel, "Redis subscription forwarder ended");
            });

            Ok(rx)
        }
    }

    /// Mask password in Redis URL for safe logging.
    fn mask_redis_url(url: &str) -> String {
        if let Some(at_pos) = url.find('@') {
            if let Some(colon_pos) = url[..at_pos].rfind(':') {
                let scheme_end = url.find("://").map(|p| p + 3).unwrap_or(0);
                if colon_pos > scheme_end {
                    return format!("{}:****@{}", &url[..colon_pos], &url[at_pos + 1..]);
                }
            }
        }
        url.to_string()
    }

}

#[cfg(feature = "redis-pubsub")]
pub use implementation::RedisPubSub;
