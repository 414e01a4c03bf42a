use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::config::REISEKLAR_SESSION_CHECK_TIMEOUT;
use crate::service::{AuthService, AuthServiceError, Credentials};
use crate::session::errors::SessionError;
use crate::session::types::{SessionState, UserIdentity};

/// Observable view of the session store
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub state: SessionState,
    /// Error of the most recent failed check, cleared by the next resolution
    pub last_error: Option<AuthServiceError>,
    /// Number of state transitions since the store was created
    pub transitions: u64,
    /// When the state last became `Authenticated` or `Unauthenticated`
    pub resolved_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
struct Tracker {
    snapshot: SessionSnapshot,
    in_flight: bool,
    // Bumped by every check start and explicit transition; a check whose
    // generation is stale when it completes is discarded
    generation: u64,
    // Generation of the last check whose result was applied
    settled: u64,
}

impl Tracker {
    fn enter(&mut self, state: SessionState) {
        tracing::debug!(
            "Session state {} -> {}",
            self.snapshot.state.label(),
            state.label()
        );
        self.snapshot.state = state;
        self.snapshot.transitions += 1;
    }

    fn resolve(&mut self, state: SessionState, error: Option<AuthServiceError>) {
        self.enter(state);
        self.snapshot.last_error = error;
        self.snapshot.resolved_at = Some(Utc::now());
    }
}

struct Inner {
    service: Arc<dyn AuthService>,
    tx: watch::Sender<Tracker>,
    check_timeout: Duration,
}

/// Single process-wide holder of the authentication state
///
/// Cloning the store yields another handle to the same state. Writers go
/// through the transition methods; readers call [`SessionStore::state`] or
/// [`SessionStore::subscribe`]. Protected surfaces never create their own
/// session state.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("snapshot", &self.snapshot())
            .field("check_timeout", &self.inner.check_timeout)
            .finish()
    }
}

impl SessionStore {
    pub fn new(service: Arc<dyn AuthService>) -> Self {
        Self::with_check_timeout(
            service,
            Duration::from_secs(*REISEKLAR_SESSION_CHECK_TIMEOUT),
        )
    }

    pub fn with_check_timeout(service: Arc<dyn AuthService>, check_timeout: Duration) -> Self {
        let (tx, _rx) = watch::channel(Tracker::default());
        Self {
            inner: Arc::new(Inner {
                service,
                tx,
                check_timeout,
            }),
        }
    }

    pub fn state(&self) -> SessionState {
        self.inner.tx.borrow().snapshot.state.clone()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner.tx.borrow().snapshot.clone()
    }

    pub fn subscribe(&self) -> SessionSubscription {
        SessionSubscription {
            rx: self.inner.tx.subscribe(),
        }
    }

    /// Start a session check unless one is already in flight.
    ///
    /// The state moves to `Checking` before this returns. The validation call
    /// runs on its own task, so dropping the returned handle does not cancel
    /// it. Returns `None` while the state is already `Checking`.
    ///
    /// If an explicit transition superseded the running check, the new check
    /// is queued and goes out as soon as the superseded call returns.
    pub fn check_session(&self) -> Option<CheckHandle> {
        let mut started = None;
        self.inner.tx.send_if_modified(|tracker| {
            if tracker.in_flight && tracker.snapshot.state == SessionState::Checking {
                return false;
            }
            let spawn = !tracker.in_flight;
            tracker.in_flight = true;
            tracker.generation += 1;
            started = Some((tracker.generation, spawn));
            tracker.enter(SessionState::Checking);
            true
        });

        let Some((generation, spawn)) = started else {
            tracing::debug!("Session check already in flight, ignoring request");
            return None;
        };

        if spawn {
            let store = self.clone();
            tokio::spawn(async move { store.run_check(generation).await });
        } else {
            tracing::debug!("Session check queued behind a superseded one");
        }
        Some(CheckHandle {
            generation,
            store: self.clone(),
        })
    }

    async fn run_check(&self, mut generation: u64) {
        loop {
            let outcome = self.validate_with_timeout().await;

            match &outcome {
                Ok(user) => tracing::info!("Session valid for user {}", user.id()),
                Err(err @ AuthServiceError::NetworkFailure(_)) => {
                    tracing::error!("Session check failed: {}", err)
                }
                Err(err) => tracing::debug!("Session rejected: {}", err),
            }

            let mut queued = None;
            self.inner.tx.send_if_modified(|tracker| {
                if tracker.generation == generation {
                    tracker.in_flight = false;
                    tracker.settled = generation;
                    match outcome {
                        Ok(user) => tracker.resolve(SessionState::Authenticated { user }, None),
                        Err(err) => tracker.resolve(SessionState::Unauthenticated, Some(err)),
                    }
                    return true;
                }
                tracing::debug!("Discarding superseded session check result");
                // Checking under a newer generation means a re-check was queued
                if tracker.snapshot.state == SessionState::Checking {
                    queued = Some(tracker.generation);
                } else {
                    tracker.in_flight = false;
                }
                false
            });

            match queued {
                Some(next) => generation = next,
                None => return,
            }
        }
    }

    async fn validate_with_timeout(&self) -> Result<UserIdentity, AuthServiceError> {
        let service = Arc::clone(&self.inner.service);
        // A panicking or hanging collaborator must not leave the state in `Checking`
        let mut call = tokio::spawn(async move { service.validate_session().await });
        match tokio::time::timeout(self.inner.check_timeout, &mut call).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => Err(AuthServiceError::NetworkFailure(format!(
                "Session check aborted: {join_error}"
            ))),
            Err(_) => {
                call.abort();
                Err(AuthServiceError::NetworkFailure(format!(
                    "Session check timed out after {:?}",
                    self.inner.check_timeout
                )))
            }
        }
    }

    /// Enter `Authenticated` directly, after an explicit sign-in or sign-up
    pub fn set_authenticated(&self, user: UserIdentity) -> Result<(), SessionError> {
        tracing::info!("Session authenticated for user {}", user.id());
        self.transition(SessionState::Authenticated { user })
    }

    /// Enter `Unauthenticated`, after an explicit sign-out
    pub fn clear_session(&self) -> Result<(), SessionError> {
        tracing::info!("Clearing session");
        self.transition(SessionState::Unauthenticated)
    }

    fn transition(&self, next: SessionState) -> Result<(), SessionError> {
        let mut refused = false;
        self.inner.tx.send_if_modified(|tracker| {
            if tracker.snapshot.state == SessionState::Unknown {
                refused = true;
                return false;
            }
            tracker.generation += 1;
            tracker.resolve(next, None);
            true
        });

        if refused {
            return Err(SessionError::NotBootstrapped.log());
        }
        Ok(())
    }

    /// Sign in through the auth service and adopt the returned identity
    pub async fn sign_in(&self, credentials: &Credentials) -> Result<UserIdentity, SessionError> {
        let user = self
            .inner
            .service
            .sign_in(credentials)
            .await
            .map_err(|e| SessionError::from(e).log())?;
        self.set_authenticated(user.clone())?;
        Ok(user)
    }

    /// Sign out through the auth service and clear the local session.
    ///
    /// The local session is cleared even when the service call fails.
    pub async fn sign_out(&self) -> Result<(), SessionError> {
        if let Err(err) = self.inner.service.sign_out().await {
            tracing::warn!("Sign-out request failed, clearing local session anyway: {}", err);
        }
        self.clear_session()
    }
}

/// Handle to an in-flight session check
///
/// Dropping it detaches from the check without cancelling it.
#[derive(Debug)]
pub struct CheckHandle {
    generation: u64,
    store: SessionStore,
}

impl CheckHandle {
    /// Wait for the check to resolve and return the resulting state.
    ///
    /// A check superseded by an explicit transition resolves to the state
    /// that transition set.
    pub async fn resolved(self) -> SessionState {
        let generation = self.generation;
        let mut rx = self.store.inner.tx.subscribe();
        let state = match rx
            .wait_for(|tracker| {
                tracker.snapshot.state.is_resolved()
                    && (tracker.settled == generation || tracker.generation != generation)
            })
            .await
        {
            Ok(tracker) => tracker.snapshot.state.clone(),
            Err(_) => self.store.state(),
        };
        state
    }
}

/// Receiver side of the session store
#[derive(Debug)]
pub struct SessionSubscription {
    rx: watch::Receiver<Tracker>,
}

impl SessionSubscription {
    pub fn current(&self) -> SessionState {
        self.rx.borrow().snapshot.state.clone()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.rx.borrow().snapshot.clone()
    }

    /// Wait for the next transition and return the latest state.
    /// Transitions in quick succession may be observed as one.
    /// `None` once the store is gone.
    pub async fn changed(&mut self) -> Option<SessionState> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().snapshot.state.clone())
    }

    /// Wait until the state is resolved, returning immediately if it already is
    pub async fn resolved(&mut self) -> Option<SessionState> {
        let tracker = self
            .rx
            .wait_for(|tracker| tracker.snapshot.state.is_resolved())
            .await
            .ok()?;
        Some(tracker.snapshot.state.clone())
    }

    /// Wait until the store has resolved at least once
    pub async fn first_resolution(&mut self) -> Option<SessionSnapshot> {
        let tracker = self
            .rx
            .wait_for(|tracker| tracker.snapshot.resolved_at.is_some())
            .await
            .ok()?;
        Some(tracker.snapshot.clone())
    }
}
