//! Rate-limited, retrying request gateway.
//!
//! Every remote call goes through [`Gateway::call`]: a semaphore bounds the
//! number of in-flight calls, the connection is checked and repaired before
//! each attempt, and flood-wait statuses are retried with backoff up to the
//! configured budget. Any other error returns immediately.
//!
//! The gateway owns the connection state explicitly: it starts
//! `Disconnected`, opens both session handles on first use, and can be torn
//! down with [`Gateway::disconnect`] on any exit path of the filesystem's
//! lifetime.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use log::{info, warn};
use tokio::sync::{Mutex, Semaphore};

use super::remote::{RemoteService, SessionFactory};
use crate::config::Options;
use crate::error::RemoteError;

enum SessionState {
    Disconnected,
    Connected {
        primary: Arc<dyn RemoteService>,
        elevated: Arc<dyn RemoteService>,
    },
}

/// Owns the two session handles and paces every call through them.
pub struct Gateway {
    factory: Box<dyn SessionFactory>,
    state: Mutex<SessionState>,
    permits: Semaphore,
    max_retries: u32,
    retry_base_delay: Duration,
    test_mode: bool,
}

impl Gateway {
    pub fn new(factory: Box<dyn SessionFactory>, options: &Options) -> Self {
        Self {
            factory,
            state: Mutex::new(SessionState::Disconnected),
            permits: Semaphore::new(options.max_connections),
            max_retries: options.max_retries,
            retry_base_delay: Duration::from_millis(options.retry_base_delay_ms),
            test_mode: options.test_server,
        }
    }

    /// Open or repair both sessions and hand out live handles.
    async fn ensure_connected(
        &self,
    ) -> Result<(Arc<dyn RemoteService>, Arc<dyn RemoteService>), RemoteError> {
        let mut state = self.state.lock().await;
        match &*state {
            SessionState::Connected { primary, elevated } => {
                if !primary.is_connected() {
                    primary.reconnect().await?;
                }
                // In test mode the handles alias, one repair covers both.
                if !self.test_mode && !elevated.is_connected() {
                    elevated.reconnect().await?;
                }
                Ok((primary.clone(), elevated.clone()))
            }
            SessionState::Disconnected => {
                if self.test_mode {
                    info!("opening remote session (test server: one shared handle)");
                } else {
                    info!("opening remote sessions");
                }
                let primary = self.factory.open_primary().await?;
                let elevated = if self.test_mode {
                    primary.clone()
                } else {
                    self.factory.open_elevated().await?
                };
                *state = SessionState::Connected {
                    primary: primary.clone(),
                    elevated: elevated.clone(),
                };
                Ok((primary, elevated))
            }
        }
    }

    /// The primary session, (re)connected on demand.
    pub async fn primary(&self) -> Result<Arc<dyn RemoteService>, RemoteError> {
        Ok(self.ensure_connected().await?.0)
    }

    /// The elevated session, (re)connected on demand. In test-server mode
    /// this is the primary session.
    pub async fn elevated(&self) -> Result<Arc<dyn RemoteService>, RemoteError> {
        Ok(self.ensure_connected().await?.1)
    }

    /// Drop both session handles; the next call reopens them.
    pub async fn disconnect(&self) {
        *self.state.lock().await = SessionState::Disconnected;
        info!("remote sessions released");
    }

    /// Run one remote operation with pacing, liveness repair and
    /// throttle retries.
    ///
    /// `op` receives the primary session and is re-invoked on every retry.
    /// Throttle errors beyond the retry budget surface verbatim.
    pub async fn call<T, F, Fut>(&self, op: F) -> Result<T, RemoteError>
    where
        F: Fn(Arc<dyn RemoteService>) -> Fut,
        Fut: Future<Output = Result<T, RemoteError>>,
    {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| RemoteError::new(0, "gateway is shut down"))?;

        let mut attempt: u32 = 0;
        loop {
            let session = self.primary().await?;
            match op(session).await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_throttled() && attempt < self.max_retries => {
                    warn!(
                        "remote throttled (attempt {}/{}): {err}",
                        attempt + 1,
                        self.max_retries
                    );
                    tokio::time::sleep(self.backoff(attempt)).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn backoff(&self, attempt: u32) -> Duration {
        self.retry_base_delay * (1u32 << attempt.min(6))
    }
}
