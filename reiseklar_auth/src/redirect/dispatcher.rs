use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::config::REISEKLAR_REDIRECT_DELAY_MS;

/// Host routing collaborator
pub trait Navigator: Send + Sync + 'static {
    /// Navigate to a path, possibly locale-prefixed and carrying a query
    fn navigate(&self, path: &str);
}

const PENDING: u8 = 0;
const CANCELLED: u8 = 1;
const FIRED: u8 = 2;

#[derive(Debug)]
struct Ticket {
    id: Uuid,
    target: String,
    phase: AtomicU8,
    wake: CancellationToken,
}

impl Ticket {
    // Pending -> Fired, at most once and never after a cancel
    fn try_fire(&self) -> bool {
        self.phase
            .compare_exchange(PENDING, FIRED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn try_cancel(&self) -> bool {
        let cancelled = self
            .phase
            .compare_exchange(PENDING, CANCELLED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if cancelled {
            self.wake.cancel();
        }
        cancelled
    }
}

/// Token of a scheduled redirect
///
/// Cancelling it before the redirect effect runs prevents the navigation.
/// Clones refer to the same redirect.
#[derive(Debug, Clone)]
pub struct CancelToken {
    ticket: Arc<Ticket>,
}

impl CancelToken {
    /// Cancel the redirect. Returns false if it already fired or was cancelled.
    pub fn cancel(&self) -> bool {
        let cancelled = self.ticket.try_cancel();
        if cancelled {
            tracing::debug!(
                "Redirect {} to {} cancelled",
                self.ticket.id,
                self.ticket.target
            );
        }
        cancelled
    }

    pub fn is_pending(&self) -> bool {
        self.ticket.phase.load(Ordering::Acquire) == PENDING
    }

    pub fn is_cancelled(&self) -> bool {
        self.ticket.phase.load(Ordering::Acquire) == CANCELLED
    }

    pub fn has_fired(&self) -> bool {
        self.ticket.phase.load(Ordering::Acquire) == FIRED
    }

    pub fn target(&self) -> &str {
        &self.ticket.target
    }
}

/// Performs the navigation of one gate instance, outside its evaluation path
///
/// At most one redirect is pending at a time; dropping the dispatcher
/// cancels it.
pub struct RedirectDispatcher {
    navigator: Arc<dyn Navigator>,
    delay: Duration,
    pending: Option<CancelToken>,
}

impl std::fmt::Debug for RedirectDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedirectDispatcher")
            .field("delay", &self.delay)
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}

impl RedirectDispatcher {
    pub fn new(navigator: Arc<dyn Navigator>) -> Self {
        Self::with_delay(
            navigator,
            Duration::from_millis(*REISEKLAR_REDIRECT_DELAY_MS),
        )
    }

    pub fn with_delay(navigator: Arc<dyn Navigator>, delay: Duration) -> Self {
        Self {
            navigator,
            delay,
            pending: None,
        }
    }

    /// Schedule navigation to `target` on a separate task.
    ///
    /// While an earlier redirect of this dispatcher is still pending this is
    /// a no-op returning that redirect's token.
    pub fn schedule_redirect(&mut self, target: impl Into<String>) -> CancelToken {
        if let Some(token) = self.pending.as_ref().filter(|t| t.is_pending()) {
            tracing::trace!("Redirect to {} already pending", token.target());
            return token.clone();
        }

        let ticket = Arc::new(Ticket {
            id: Uuid::new_v4(),
            target: target.into(),
            phase: AtomicU8::new(PENDING),
            wake: CancellationToken::new(),
        });
        let token = CancelToken {
            ticket: Arc::clone(&ticket),
        };
        tracing::debug!(
            "Redirect {} to {} scheduled in {:?}",
            ticket.id,
            ticket.target,
            self.delay
        );

        let navigator = Arc::clone(&self.navigator);
        let delay = self.delay;
        tokio::spawn(async move {
            tokio::select! {
                _ = ticket.wake.cancelled() => return,
                _ = tokio::time::sleep(delay) => {}
            }
            if ticket.try_fire() {
                tracing::info!("Redirecting to {}", ticket.target);
                navigator.navigate(&ticket.target);
            }
        });

        self.pending = Some(token.clone());
        token
    }

    /// Cancel the pending redirect, if any. Returns true if one was cancelled.
    pub fn cancel_pending(&mut self) -> bool {
        self.pending.take().is_some_and(|token| token.cancel())
    }

    pub fn pending(&self) -> Option<&CancelToken> {
        self.pending.as_ref().filter(|t| t.is_pending())
    }
}

impl Drop for RedirectDispatcher {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}
