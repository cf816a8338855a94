mod registration;
mod state;
mod token;

pub use registration::validate_registration;
pub use state::{SessionListener, SessionState};
pub use token::decode_credential;

use crate::api::MovieApi;
use crate::error::{Result, SyncError};
use crate::models::{Credential, Severity, TokenPair, User};
use crate::notifications::NotificationQueue;
use crate::storage::{load_json, save_json, DurableStore, CREDENTIAL_KEY};
use futures::future::{BoxFuture, FutureExt, Shared};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Window after a refresh starts during which further refresh calls reuse its outcome.
pub const REFRESH_DEBOUNCE: Duration = Duration::from_millis(100);
/// Period of the background refresh loop.
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(60);

type RefreshFuture = Shared<BoxFuture<'static, Result<Credential>>>;

/// In-flight refresh guard. A call that finds `Pending` for the current session
/// attaches to `handle` instead of issuing its own request.
enum RefreshSlot {
    Idle,
    Pending {
        generation: u64,
        started_at: Instant,
        handle: RefreshFuture,
    },
}

struct SessionCore {
    credential: Option<Credential>,
    /// Bumped whenever the credential is replaced or cleared by login, restore or
    /// logout. Responses issued under an older generation are discarded.
    generation: u64,
    refresh: RefreshSlot,
}

struct SessionInner {
    api: Arc<dyn MovieApi>,
    store: Arc<dyn DurableStore>,
    notifications: NotificationQueue,
    debounce: Duration,
    core: Mutex<SessionCore>,
    listeners: Mutex<Vec<Weak<dyn SessionListener>>>,
    state_tx: watch::Sender<SessionState>,
}

/// Owner of the credential and the only writer of it.
///
/// Cloning yields another handle onto the same session.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<SessionInner>,
}

impl SessionManager {
    pub fn new(
        api: Arc<dyn MovieApi>,
        store: Arc<dyn DurableStore>,
        notifications: NotificationQueue,
    ) -> Self {
        Self::with_debounce(api, store, notifications, REFRESH_DEBOUNCE)
    }

    pub fn with_debounce(
        api: Arc<dyn MovieApi>,
        store: Arc<dyn DurableStore>,
        notifications: NotificationQueue,
        debounce: Duration,
    ) -> Self {
        let (state_tx, _) = watch::channel(SessionState::Anonymous);
        Self {
            inner: Arc::new(SessionInner {
                api,
                store,
                notifications,
                debounce,
                core: Mutex::new(SessionCore {
                    credential: None,
                    generation: 0,
                    refresh: RefreshSlot::Idle,
                }),
                listeners: Mutex::new(Vec::new()),
                state_tx,
            }),
        }
    }

    /// Register state that must be wiped whenever the session ends.
    ///
    /// Only a weak reference is kept; dropping the listener unregisters it.
    pub fn add_listener<L: SessionListener + 'static>(&self, listener: &Arc<L>) {
        let weak: Weak<L> = Arc::downgrade(listener);
        let weak: Weak<dyn SessionListener> = weak;
        if let Ok(mut listeners) = self.inner.listeners.lock() {
            listeners.push(weak);
        }
    }

    /// Load the persisted credential, if any. A corrupt entry is removed.
    pub fn restore(&self) -> Option<User> {
        let pair: TokenPair = match load_json(self.inner.store.as_ref(), CREDENTIAL_KEY) {
            Ok(Some(pair)) => pair,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(error = %e, "discarding unreadable stored credential");
                let _ = self.inner.store.remove(CREDENTIAL_KEY);
                return None;
            }
        };

        match decode_credential(pair) {
            Ok(credential) => {
                let user = credential.user.clone();
                self.install(credential);
                tracing::info!(user = %user.username, "restored stored session");
                Some(user)
            }
            Err(e) => {
                tracing::warn!(error = %e, "discarding stored credential");
                let _ = self.inner.store.remove(CREDENTIAL_KEY);
                None
            }
        }
    }

    /// Exchange username and password for a credential.
    ///
    /// On any failure the previous session, if there was one, is left untouched.
    pub async fn login(&self, username: &str, password: &str) -> Result<User> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(SyncError::Validation(
                "username and password are required".to_string(),
            ));
        }

        let pair = self.inner.api.login(username, password).await?;
        let credential = decode_credential(pair)?;
        let user = credential.user.clone();
        self.install(credential);
        tracing::info!(user = %user.username, "logged in");
        Ok(user)
    }

    /// End the session. Safe to call when already anonymous.
    pub fn logout(&self) {
        self.inner.end_session(None);
        tracing::info!("logged out");
    }

    /// Mint a new credential from the refresh token.
    ///
    /// Overlapping calls, and calls within the debounce window of the last refresh,
    /// share one request and observe the same outcome. Failure ends the session.
    pub async fn refresh(&self) -> Result<Credential> {
        let (handle, started) = {
            let mut core = self.inner.lock_core()?;
            let generation = core.generation;
            let attachable = match &core.refresh {
                RefreshSlot::Pending {
                    generation: pending_generation,
                    started_at,
                    handle,
                } if *pending_generation == generation
                    && (handle.peek().is_none()
                        || started_at.elapsed() < self.inner.debounce) =>
                {
                    Some(handle.clone())
                }
                _ => None,
            };

            match attachable {
                Some(handle) => (handle, false),
                None => {
                    let refresh_token = core
                        .credential
                        .as_ref()
                        .map(|c| c.refresh_token.clone())
                        .ok_or(SyncError::Unauthenticated)?;
                    let handle = run_refresh(self.inner.clone(), generation, refresh_token)
                        .boxed()
                        .shared();
                    core.refresh = RefreshSlot::Pending {
                        generation,
                        started_at: Instant::now(),
                        handle: handle.clone(),
                    };
                    (handle, true)
                }
            }
        };

        if started {
            tracing::debug!("token refresh started");
            self.inner.publish_state();
        } else {
            tracing::debug!("joining in-flight token refresh");
        }
        handle.await
    }

    /// Refresh on a fixed period for as long as the returned task lives.
    ///
    /// The first refresh happens one full period after spawning; startup performs
    /// its own eager refresh.
    pub fn spawn_refresh_loop(&self, period: Duration) -> JoinHandle<()> {
        let session = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if !session.is_authenticated() {
                    continue;
                }
                if let Err(e) = session.refresh().await {
                    tracing::debug!(error = %e, "periodic token refresh did not succeed");
                }
            }
        })
    }

    pub fn state(&self) -> SessionState {
        match self.inner.lock_core() {
            Ok(core) => derive_state(&core),
            Err(_) => SessionState::Anonymous,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.state_tx.subscribe()
    }

    pub fn current_user(&self) -> Option<User> {
        self.credential().map(|c| c.user)
    }

    pub fn is_authenticated(&self) -> bool {
        self.credential().is_some()
    }

    pub fn credential(&self) -> Option<Credential> {
        self.inner
            .lock_core()
            .ok()
            .and_then(|core| core.credential.clone())
    }

    /// The bearer token together with the generation it belongs to.
    pub fn access(&self) -> Option<(String, u64)> {
        let core = self.inner.lock_core().ok()?;
        let token = core.credential.as_ref()?.access_token.clone();
        Some((token, core.generation))
    }

    /// Whether a response issued under `generation` may still be applied.
    pub fn is_current(&self, generation: u64) -> bool {
        self.inner
            .lock_core()
            .map(|core| core.generation == generation && core.credential.is_some())
            .unwrap_or(false)
    }

    fn install(&self, credential: Credential) {
        let Ok(mut core) = self.inner.lock_core() else {
            return;
        };
        self.inner.persist(&credential.token_pair());
        core.credential = Some(credential);
        core.generation += 1;
        core.refresh = RefreshSlot::Idle;
        self.inner.state_tx.send_replace(derive_state(&core));
    }
}

impl SessionInner {
    fn lock_core(&self) -> Result<MutexGuard<'_, SessionCore>> {
        self.core
            .lock()
            .map_err(|_| SyncError::Storage("session state lock poisoned".to_string()))
    }

    fn persist(&self, pair: &TokenPair) {
        if let Err(e) = save_json(self.store.as_ref(), CREDENTIAL_KEY, pair) {
            tracing::warn!(error = %e, "failed to persist credential");
        }
    }

    fn publish_state(&self) {
        if let Ok(core) = self.lock_core() {
            self.state_tx.send_replace(derive_state(&core));
        }
    }

    /// Clear the credential in memory and storage, then notify listeners.
    ///
    /// With `expected` set, nothing happens unless that generation is still the live
    /// session. Returns whether the session was ended.
    fn end_session(&self, expected: Option<u64>) -> bool {
        {
            let Ok(mut core) = self.lock_core() else {
                return false;
            };
            if let Some(generation) = expected {
                if core.generation != generation || core.credential.is_none() {
                    return false;
                }
            }
            // Storage is cleared under the lock so a concurrent refresh cannot write
            // the credential back after it.
            if let Err(e) = self.store.remove(CREDENTIAL_KEY) {
                tracing::warn!(error = %e, "failed to remove stored credential");
            }
            core.credential = None;
            core.generation += 1;
            core.refresh = RefreshSlot::Idle;
            self.state_tx.send_replace(SessionState::Anonymous);
        }

        let listeners: Vec<Arc<dyn SessionListener>> = match self.listeners.lock() {
            Ok(mut listeners) => {
                listeners.retain(|l| l.strong_count() > 0);
                listeners.iter().filter_map(Weak::upgrade).collect()
            }
            Err(_) => Vec::new(),
        };
        for listener in listeners {
            listener.session_cleared();
        }
        true
    }
}

async fn run_refresh(
    inner: Arc<SessionInner>,
    generation: u64,
    refresh_token: String,
) -> Result<Credential> {
    let outcome = match inner.api.refresh(&refresh_token).await {
        Ok(pair) => decode_credential(pair),
        Err(e) => Err(e),
    };

    let credential = match outcome {
        Ok(credential) => credential,
        Err(e) => {
            if !inner.end_session(Some(generation)) {
                tracing::debug!(error = %e, "ignoring refresh failure for an ended session");
                return Err(SyncError::StaleSession);
            }
            tracing::warn!(error = %e, "token refresh failed; session ended");
            inner
                .notifications
                .push("Your session has expired. Please log in again.", Severity::Warning);
            return Err(e);
        }
    };

    {
        // Check, write and persist as one step; logout takes the same lock.
        let mut core = inner.lock_core()?;
        if core.generation != generation || core.credential.is_none() {
            tracing::debug!("discarding refresh response for an ended session");
            return Err(SyncError::StaleSession);
        }
        inner.persist(&credential.token_pair());
        core.credential = Some(credential.clone());
        inner
            .state_tx
            .send_replace(SessionState::Authenticated(credential.user.clone()));
    }
    tracing::debug!(user = %credential.user.username, "token refreshed");
    Ok(credential)
}

fn derive_state(core: &SessionCore) -> SessionState {
    let Some(credential) = core.credential.as_ref() else {
        return SessionState::Anonymous;
    };
    let refreshing = matches!(
        &core.refresh,
        RefreshSlot::Pending { generation, handle, .. }
            if *generation == core.generation && handle.peek().is_none()
    );
    if refreshing {
        SessionState::Refreshing(credential.user.clone())
    } else {
        SessionState::Authenticated(credential.user.clone())
    }
}
