//! Capacity-bounded registry of active sessions.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use flowrunner_core_types::ExecutionId;
use page_driver::{PageDriver, PoolError, PoolSettings, PoolStatus, SessionProvider};
use tokio::sync::{Mutex, OwnedSemaphorePermit, Semaphore};
use tracing::{debug, info, warn};

use crate::host::BrowserHost;
use crate::session::PooledSession;

struct ActiveSession {
    driver: Arc<PooledSession>,
    // Held for the lifetime of the registration; dropping it frees capacity.
    _permit: OwnedSemaphorePermit,
}

/// Shared browser host plus a bounded set of exclusive sessions.
pub struct BrowserPool {
    settings: PoolSettings,
    permits: Arc<Semaphore>,
    host: Mutex<Option<BrowserHost>>,
    sessions: DashMap<ExecutionId, ActiveSession>,
}

impl BrowserPool {
    pub fn new(settings: PoolSettings) -> Self {
        let permits = Arc::new(Semaphore::new(settings.capacity));
        Self {
            settings,
            permits,
            host: Mutex::new(None),
            sessions: DashMap::new(),
        }
    }

    /// Synchronous capacity gate. Fails fast; nothing queues behind it.
    fn try_reserve(&self) -> Result<OwnedSemaphorePermit, PoolError> {
        Arc::clone(&self.permits)
            .try_acquire_owned()
            .map_err(|_| PoolError::Exhausted {
                capacity: self.settings.capacity,
            })
    }

    /// Open a page on the shared host, launching or relaunching it first
    /// when the event loop is gone.
    async fn host_page(&self) -> Result<chromiumoxide::Page, PoolError> {
        let mut guard = self.host.lock().await;

        let healthy = guard.as_ref().map(BrowserHost::is_connected).unwrap_or(false);
        if !healthy {
            if let Some(stale) = guard.take() {
                warn!("browser host disconnected, relaunching");
                stale.shutdown().await;
            } else {
                info!("launching shared browser host");
            }
            *guard = Some(BrowserHost::launch(&self.settings).await?);
        }

        let host = guard
            .as_ref()
            .ok_or_else(|| PoolError::Host("host not running".to_string()))?;
        host.new_page().await
    }

    /// Close every session and stop the host.
    pub async fn shutdown(&self) {
        let ids: Vec<ExecutionId> = self.sessions.iter().map(|e| e.key().clone()).collect();
        for id in ids {
            self.release(&id).await;
        }
        if let Some(host) = self.host.lock().await.take() {
            host.shutdown().await;
        }
    }
}

#[async_trait]
impl SessionProvider for BrowserPool {
    async fn acquire(
        &self,
        execution_id: &ExecutionId,
    ) -> Result<Arc<dyn PageDriver>, PoolError> {
        let permit = self.try_reserve()?;

        if self.sessions.contains_key(execution_id) {
            return Err(PoolError::AlreadyActive(execution_id.clone()));
        }

        let page = self.host_page().await?;
        page.set_user_agent(self.settings.user_agent.clone())
            .await
            .map_err(|err| PoolError::Session(err.to_string()))?;

        let driver = Arc::new(PooledSession::new(execution_id.clone(), page));
        self.sessions.insert(
            execution_id.clone(),
            ActiveSession {
                driver: Arc::clone(&driver),
                _permit: permit,
            },
        );
        debug!(execution = %execution_id, active = self.sessions.len(), "session acquired");
        Ok(driver)
    }

    async fn release(&self, execution_id: &ExecutionId) {
        if let Some((_, active)) = self.sessions.remove(execution_id) {
            if let Err(err) = active.driver.close().await {
                // Best-effort close; the page dies with the host anyway.
                debug!(execution = %execution_id, %err, "session close failed");
            }
            debug!(execution = %execution_id, active = self.sessions.len(), "session released");
        }
    }

    async fn status(&self) -> PoolStatus {
        let connected = self
            .host
            .lock()
            .await
            .as_ref()
            .map(BrowserHost::is_connected)
            .unwrap_or(false);
        PoolStatus {
            active_sessions: self.sessions.len(),
            max_sessions: self.settings.capacity,
            browser_connected: connected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(capacity: usize) -> BrowserPool {
        BrowserPool::new(PoolSettings {
            capacity,
            ..PoolSettings::default()
        })
    }

    #[tokio::test]
    async fn capacity_gate_rejects_without_queueing() {
        let pool = pool(3);
        let first = pool.try_reserve().expect("slot 1");
        let _second = pool.try_reserve().expect("slot 2");
        let _third = pool.try_reserve().expect("slot 3");

        match pool.try_reserve() {
            Err(PoolError::Exhausted { capacity }) => assert_eq!(capacity, 3),
            other => panic!("expected exhaustion, got {other:?}"),
        }

        // Freeing one slot makes acquisition possible again.
        drop(first);
        assert!(pool.try_reserve().is_ok());
    }

    #[tokio::test]
    async fn status_reports_idle_pool_without_launching() {
        let pool = pool(3);
        let status = pool.status().await;
        assert_eq!(status.active_sessions, 0);
        assert_eq!(status.max_sessions, 3);
        assert!(!status.browser_connected);
    }

    #[tokio::test]
    async fn release_of_unknown_execution_is_a_no_op() {
        let pool = pool(1);
        pool.release(&ExecutionId::from("never-acquired")).await;
        assert_eq!(pool.status().await.active_sessions, 0);
    }
}
