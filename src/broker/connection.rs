//! The single shared broker connection.

use std::time::Duration;

use bb8::{Pool, PooledConnection, RunError};
use redis::aio::MultiplexedConnection;
use redis::{Client, RedisError};
use tokio::sync::Mutex;

use crate::broker::BrokerError;

type RedisPool = Pool<Client>;

/// Owned handle to one Redis connection.
///
/// Opened once at startup and injected into the publisher. The connection
/// lives in a bb8 pool of size one: it is pinged on checkout and replaced
/// when the broker dropped it, so a Redis restart costs the publishes made
/// while it is down and nothing after. Every command runs under the mutex,
/// so concurrent publishes are serialised. `close` drops the pool; commands
/// issued afterwards fail with `BrokerError::Unavailable`.
pub struct BrokerConnection {
    inner: Mutex<Option<RedisPool>>,
    timeout: Duration,
}

impl BrokerConnection {
    /// Open the pool and check that the broker answers.
    pub async fn connect(url: &str, timeout: Duration) -> Result<Self, BrokerError> {
        let client = Client::open(url).map_err(|e| BrokerError::Connection(e.to_string()))?;

        let pool = Pool::builder()
            .max_size(1)
            .connection_timeout(timeout)
            .test_on_check_out(true)
            .build(client)
            .await
            .map_err(|e| BrokerError::Connection(e.to_string()))?;

        checkout(&pool, timeout).await?;

        Ok(Self {
            inner: Mutex::new(Some(pool)),
            timeout,
        })
    }

    /// Run one command with exclusive use of the connection.
    ///
    /// The outer error is about getting a live connection; the inner result
    /// is the broker's reply.
    pub async fn query<T>(&self, cmd: &redis::Cmd) -> Result<redis::RedisResult<T>, BrokerError>
    where
        T: redis::FromRedisValue,
    {
        let guard = self.inner.lock().await;
        let pool = guard.as_ref().ok_or(BrokerError::Unavailable)?;
        let mut conn = checkout(pool, self.timeout).await?;

        let conn: &mut MultiplexedConnection = &mut conn;
        Ok(cmd.query_async::<T>(conn).await)
    }

    pub async fn close(&self) {
        self.inner.lock().await.take();
    }
}

async fn checkout(
    pool: &RedisPool,
    timeout: Duration,
) -> Result<PooledConnection<'_, Client>, BrokerError> {
    pool.get().await.map_err(|e| checkout_error(e, timeout))
}

fn checkout_error(error: RunError<RedisError>, timeout: Duration) -> BrokerError {
    match error {
        RunError::TimedOut => BrokerError::Timeout(timeout),
        RunError::User(e) => BrokerError::Connection(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkout_errors() {
        let timeout = Duration::from_secs(2);
        assert!(matches!(
            checkout_error(RunError::TimedOut, timeout),
            BrokerError::Timeout(t) if t == timeout
        ));

        let refused = RedisError::from(std::io::Error::from(std::io::ErrorKind::ConnectionRefused));
        assert!(matches!(
            checkout_error(RunError::User(refused), timeout),
            BrokerError::Connection(_)
        ));
    }

    #[tokio::test]
    async fn test_unreachable_broker_fails_to_connect() {
        let result = BrokerConnection::connect("redis://127.0.0.1:1", Duration::from_millis(300)).await;
        assert!(matches!(
            result,
            Err(BrokerError::Connection(_) | BrokerError::Timeout(_))
        ));
    }
}
