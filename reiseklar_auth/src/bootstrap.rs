use std::sync::atomic::{AtomicBool, Ordering};

use crate::session::{SessionSnapshot, SessionState, SessionStore};

/// What the application root should render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapView {
    /// Placeholder while the very first session check is unresolved
    Loading,
    /// The application subtree; gates below decide for themselves
    Ready,
}

/// Runs the initial session check exactly once per application lifetime
#[derive(Debug)]
pub struct BootstrapInitializer {
    store: SessionStore,
    triggered: AtomicBool,
}

impl BootstrapInitializer {
    pub fn new(store: SessionStore) -> Self {
        Self {
            store,
            triggered: AtomicBool::new(false),
        }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Mount (or re-render) the application root.
    ///
    /// The first call starts the session check if the store is still
    /// `Unknown`; later calls never trigger another one.
    pub fn mount(&self) -> BootstrapView {
        if !self.triggered.swap(true, Ordering::AcqRel) {
            if self.store.state() == SessionState::Unknown {
                tracing::info!("Bootstrapping session");
                // Detached: the check outlives any particular render
                drop(self.store.check_session());
            } else {
                tracing::debug!("Session already past Unknown, skipping bootstrap check");
            }
        }
        self.view()
    }

    /// Current render decision, without side effects
    pub fn view(&self) -> BootstrapView {
        view_for(&self.store.snapshot())
    }

    /// Mount and wait until the initial check has resolved
    pub async fn ready(&self) -> SessionState {
        let mut subscription = self.store.subscribe();
        self.mount();
        match subscription.first_resolution().await {
            Some(snapshot) => snapshot.state,
            None => self.store.state(),
        }
    }
}

fn view_for(snapshot: &SessionSnapshot) -> BootstrapView {
    match snapshot.state {
        SessionState::Unknown => BootstrapView::Loading,
        // Only the initial check withholds the subtree
        SessionState::Checking if snapshot.resolved_at.is_none() => BootstrapView::Loading,
        _ => BootstrapView::Ready,
    }
}
