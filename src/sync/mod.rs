//! Sync Coordinator
//!
//! Decides when the in-memory state goes to the remote row and when the
//! remote row is pulled. Per identity session the phase runs
//! `Hydrating -> Ready -> Syncing <-> Ready`.
//!
//! Pushes are debounced through one explicit timer handle: every schedule
//! cancels the pending timer and arms a new one carrying the latest
//! snapshot. A single-flight lock keeps at most one save on the wire. An
//! epoch counter, bumped on every identity change, makes a push armed for
//! an old identity discard itself.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;

use crate::domain::{Identity, PersistedAppState, UserIdentity};
use crate::repository::{RemoteError, RemoteStateGateway};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncPhase {
    Hydrating,
    Ready,
    Syncing,
}

/// Outcome of the most recent remote call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "camelCase")]
pub enum SyncHealth {
    /// Guest session or no remote configured
    Offline,
    Healthy,
    /// Remote table or policy is missing; running local-only until the next sign-in
    LocalOnly,
    /// Last remote call failed; the next mutation retries
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatus {
    pub phase: SyncPhase,
    pub health: SyncHealth,
    pub pushes: u64,
    pub last_pushed_at: Option<DateTime<Utc>>,
}

impl Default for SyncStatus {
    fn default() -> Self {
        Self {
            phase: SyncPhase::Hydrating,
            health: SyncHealth::Offline,
            pushes: 0,
            last_pushed_at: None,
        }
    }
}

const TIMER_ARMED: u8 = 0;
const TIMER_FIRED: u8 = 1;
const TIMER_CANCELLED: u8 = 2;

/// State shared between the coordinator and its push tasks
struct Shared {
    epoch: AtomicU64,
    hydrating: AtomicBool,
    remote_disabled: AtomicBool,
    in_flight: Mutex<()>,
    status: watch::Sender<SyncStatus>,
}

impl Shared {
    fn update(&self, f: impl FnOnce(&mut SyncStatus)) {
        self.status.send_modify(f);
    }

    fn record_failure(&self, err: &RemoteError) {
        if err.is_schema_absent() {
            if !self.remote_disabled.swap(true, Ordering::SeqCst) {
                log::info!("remote state unavailable, continuing local-only: {}", err);
            }
            self.update(|s| s.health = SyncHealth::LocalOnly);
        } else {
            log::error!("{}", err);
            let message = err.to_string();
            self.update(|s| s.health = SyncHealth::Failed(message));
        }
    }
}

/// The one armed debounce timer
struct PendingPush {
    handle: JoinHandle<()>,
    timer: Arc<AtomicU8>,
    push: Arc<PushTask>,
}

impl PendingPush {
    /// Stop the timer if it has not fired. A push already on the wire runs to completion.
    fn cancel(&self) -> bool {
        let cancelled = self
            .timer
            .compare_exchange(TIMER_ARMED, TIMER_CANCELLED, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok();
        if cancelled {
            self.handle.abort();
        }
        cancelled
    }
}

struct PushTask {
    shared: Arc<Shared>,
    gateway: Arc<dyn RemoteStateGateway>,
    user: UserIdentity,
    epoch: u64,
    snapshot: PersistedAppState,
}

impl PushTask {
    fn is_current(&self) -> bool {
        self.shared.epoch.load(Ordering::SeqCst) == self.epoch
            && !self.shared.hydrating.load(Ordering::SeqCst)
            && !self.shared.remote_disabled.load(Ordering::SeqCst)
    }

    async fn run(&self) {
        if !self.is_current() {
            log::debug!("discarding push armed for a previous session");
            return;
        }

        let _flight = self.shared.in_flight.lock().await;
        // Re-check: the identity may have changed while waiting for the lock.
        if !self.is_current() {
            log::debug!("discarding push armed for a previous session");
            return;
        }

        self.shared.update(|s| s.phase = SyncPhase::Syncing);
        let result = self.gateway.save(&self.user, &self.snapshot).await;

        let current = self.shared.epoch.load(Ordering::SeqCst) == self.epoch;
        match result {
            Ok(()) => {
                if current {
                    self.shared.update(|s| {
                        s.health = SyncHealth::Healthy;
                        s.pushes += 1;
                        s.last_pushed_at = Some(Utc::now());
                    });
                }
            }
            Err(e) if current => self.shared.record_failure(&e),
            Err(e) => log::warn!("push for a previous session failed: {}", e),
        }

        if current {
            self.shared.update(|s| {
                if s.phase == SyncPhase::Syncing {
                    s.phase = SyncPhase::Ready;
                }
            });
        }
    }
}

pub struct SyncCoordinator {
    gateway: Option<Arc<dyn RemoteStateGateway>>,
    debounce: Duration,
    identity: Identity,
    shared: Arc<Shared>,
    pending: Option<PendingPush>,
}

impl SyncCoordinator {
    pub fn new(gateway: Option<Arc<dyn RemoteStateGateway>>, debounce: Duration) -> Self {
        let (status, _) = watch::channel(SyncStatus::default());
        Self {
            gateway,
            debounce,
            identity: Identity::Guest,
            shared: Arc::new(Shared {
                epoch: AtomicU64::new(0),
                hydrating: AtomicBool::new(true),
                remote_disabled: AtomicBool::new(false),
                in_flight: Mutex::new(()),
                status,
            }),
            pending: None,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SyncStatus> {
        self.shared.status.subscribe()
    }

    pub fn status(&self) -> SyncStatus {
        self.shared.status.borrow().clone()
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn is_hydrating(&self) -> bool {
        self.shared.hydrating.load(Ordering::SeqCst)
    }

    pub fn is_remote_disabled(&self) -> bool {
        self.shared.remote_disabled.load(Ordering::SeqCst)
    }

    pub fn has_pending_push(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|p| p.timer.load(Ordering::SeqCst) == TIMER_ARMED)
    }

    /// A remote is configured and the session belongs to a signed-in user
    pub fn has_remote_user(&self) -> bool {
        self.gateway.is_some() && self.identity.as_user().is_some()
    }

    fn remote_user(&self) -> Option<(Arc<dyn RemoteStateGateway>, UserIdentity)> {
        let gateway = self.gateway.clone()?;
        let user = self.identity.as_user()?.clone();
        Some((gateway, user))
    }

    /// Start a new identity session: drop the pending timer, arm the
    /// hydration guard and forget any earlier schema-absent verdict.
    pub fn begin_hydration(&mut self, identity: &Identity) {
        self.shared.hydrating.store(true, Ordering::SeqCst);
        self.shared.epoch.fetch_add(1, Ordering::SeqCst);
        self.shared.remote_disabled.store(false, Ordering::SeqCst);
        if let Some(pending) = self.pending.take() {
            if pending.cancel() {
                log::debug!("dropped pending push on identity change");
            }
        }

        self.identity = identity.clone();
        let health = if self.remote_user().is_some() {
            SyncHealth::Healthy
        } else {
            SyncHealth::Offline
        };
        self.shared.update(|s| {
            *s = SyncStatus {
                phase: SyncPhase::Hydrating,
                health,
                ..SyncStatus::default()
            }
        });
    }

    /// Pick up a refreshed token for the same user without a new session.
    pub fn refresh_identity(&mut self, identity: &Identity) {
        if self.identity.same_namespace(identity) {
            self.identity = identity.clone();
        }
    }

    /// Fetch the remote payload for the current identity. `Ok(None)` for
    /// guests, when no remote is configured, or when the user has no row.
    pub async fn pull(&self) -> Result<Option<Value>, RemoteError> {
        let Some((gateway, user)) = self.remote_user() else {
            return Ok(None);
        };
        if self.is_remote_disabled() {
            return Ok(None);
        }

        match gateway.load(&user).await {
            Ok(payload) => Ok(payload),
            Err(e) => {
                self.shared.record_failure(&e);
                Err(e)
            }
        }
    }

    /// Lift the hydration guard; pushes may be scheduled from here on.
    pub fn finish_hydration(&mut self) {
        self.shared.hydrating.store(false, Ordering::SeqCst);
        self.shared.update(|s| s.phase = SyncPhase::Ready);
    }

    /// Arm (or re-arm) the debounce timer with `snapshot`. Returns whether a
    /// push was scheduled; guests, hydration and local-only mode skip it.
    pub fn schedule_push(&mut self, snapshot: PersistedAppState) -> bool {
        if self.is_hydrating() || self.is_remote_disabled() {
            return false;
        }
        let Some((gateway, user)) = self.remote_user() else {
            return false;
        };

        if let Some(previous) = self.pending.take() {
            previous.cancel();
        }

        let push = Arc::new(PushTask {
            shared: Arc::clone(&self.shared),
            gateway,
            user,
            epoch: self.shared.epoch.load(Ordering::SeqCst),
            snapshot,
        });
        let timer = Arc::new(AtomicU8::new(TIMER_ARMED));

        let handle = {
            let push = Arc::clone(&push);
            let timer = Arc::clone(&timer);
            let debounce = self.debounce;
            tokio::spawn(async move {
                tokio::time::sleep(debounce).await;
                if timer
                    .compare_exchange(TIMER_ARMED, TIMER_FIRED, Ordering::SeqCst, Ordering::SeqCst)
                    .is_err()
                {
                    return;
                }
                push.run().await;
            })
        };

        self.pending = Some(PendingPush {
            handle,
            timer,
            push,
        });
        true
    }

    /// Send any armed push now and wait for the in-flight one. Used before
    /// shutdown so the last edit is not lost to the debounce window.
    pub async fn flush(&mut self) {
        let Some(pending) = self.pending.take() else {
            return;
        };

        if pending.cancel() {
            pending.push.run().await;
        } else if let Err(e) = pending.handle.await {
            if !e.is_cancelled() {
                log::error!("push task failed: {}", e);
            }
        }
    }
}

impl Drop for SyncCoordinator {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MemoryGateway;
    use serde_json::json;

    const WINDOW: Duration = Duration::from_millis(250);

    fn state_with_essentials(names: &[&str]) -> PersistedAppState {
        PersistedAppState {
            essential_names: names.iter().map(|s| s.to_string()).collect(),
            ..PersistedAppState::default()
        }
    }

    fn ready_coordinator(gateway: &MemoryGateway, user: &str) -> SyncCoordinator {
        let mut sync = SyncCoordinator::new(Some(Arc::new(gateway.clone())), WINDOW);
        sync.begin_hydration(&Identity::user(user));
        sync.finish_hydration();
        sync
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_of_mutations_sends_one_save_with_last_state() {
        let gateway = MemoryGateway::new();
        let mut sync = ready_coordinator(&gateway, "u-1");

        for i in 0..5 {
            let name = format!("item-{}", i);
            assert!(sync.schedule_push(state_with_essentials(&[&name])));
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        assert!(gateway.saves().is_empty());

        tokio::time::sleep(WINDOW * 2).await;

        let saves = gateway.saves();
        assert_eq!(saves.len(), 1);
        assert_eq!(saves[0].0, "u-1");
        assert_eq!(saves[0].1.essential_names, vec!["item-4".to_string()]);
        assert_eq!(sync.status().pushes, 1);
        assert_eq!(sync.status().phase, SyncPhase::Ready);
    }

    #[tokio::test(start_paused = true)]
    async fn test_identity_switch_discards_pending_push() {
        let gateway = MemoryGateway::new();
        let mut sync = ready_coordinator(&gateway, "u-1");

        assert!(sync.schedule_push(state_with_essentials(&["두부"])));
        tokio::time::sleep(Duration::from_millis(100)).await;
        sync.begin_hydration(&Identity::user("u-2"));
        assert!(!sync.has_pending_push());

        tokio::time::sleep(WINDOW * 4).await;
        assert!(gateway.saves().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_push_while_hydrating_or_for_guest() {
        let gateway = MemoryGateway::new();
        let mut sync = SyncCoordinator::new(Some(Arc::new(gateway.clone())), WINDOW);

        sync.begin_hydration(&Identity::user("u-1"));
        assert!(!sync.schedule_push(PersistedAppState::default()));

        sync.begin_hydration(&Identity::Guest);
        sync.finish_hydration();
        assert!(!sync.schedule_push(PersistedAppState::default()));
        assert_eq!(sync.status().health, SyncHealth::Offline);

        tokio::time::sleep(WINDOW * 2).await;
        assert!(gateway.saves().is_empty());
    }

    #[tokio::test]
    async fn test_schema_absent_pull_switches_to_local_only() {
        let gateway = MemoryGateway::new();
        gateway.set_failure(Some(RemoteError::SchemaAbsent("relation does not exist".into())));
        let mut sync = SyncCoordinator::new(Some(Arc::new(gateway.clone())), WINDOW);

        sync.begin_hydration(&Identity::user("u-1"));
        assert!(sync.pull().await.unwrap_err().is_schema_absent());
        sync.finish_hydration();

        assert!(sync.is_remote_disabled());
        assert_eq!(sync.status().health, SyncHealth::LocalOnly);
        assert!(!sync.schedule_push(PersistedAppState::default()));

        // A new identity session tries the remote again
        gateway.set_failure(None);
        sync.begin_hydration(&Identity::user("u-1"));
        assert!(!sync.is_remote_disabled());
        assert_eq!(sync.pull().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_pull_returns_stored_row() {
        let gateway = MemoryGateway::new().with_row("u-1", json!({ "measurementMode": "precise" }));
        let mut sync = SyncCoordinator::new(Some(Arc::new(gateway)), WINDOW);
        sync.begin_hydration(&Identity::user("u-1"));

        let payload = sync.pull().await.unwrap();
        assert_eq!(payload, Some(json!({ "measurementMode": "precise" })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_failure_keeps_pushing_later() {
        let gateway = MemoryGateway::new();
        let mut sync = ready_coordinator(&gateway, "u-1");

        gateway.set_failure(Some(RemoteError::Transient("offline".into())));
        sync.schedule_push(state_with_essentials(&["a"]));
        tokio::time::sleep(WINDOW * 2).await;
        assert!(matches!(sync.status().health, SyncHealth::Failed(_)));
        assert_eq!(sync.status().phase, SyncPhase::Ready);

        gateway.set_failure(None);
        assert!(sync.schedule_push(state_with_essentials(&["b"])));
        tokio::time::sleep(WINDOW * 2).await;
        assert_eq!(gateway.saves().len(), 1);
        assert_eq!(sync.status().health, SyncHealth::Healthy);
    }

    #[tokio::test]
    async fn test_flush_sends_armed_push_immediately() {
        let gateway = MemoryGateway::new();
        let mut sync = SyncCoordinator::new(Some(Arc::new(gateway.clone())), Duration::from_secs(60));
        sync.begin_hydration(&Identity::user("u-1"));
        sync.finish_hydration();

        sync.schedule_push(state_with_essentials(&["김치"]));
        sync.flush().await;

        assert_eq!(gateway.saves().len(), 1);
        assert!(!sync.has_pending_push());
    }
}
