use std::sync::Arc;

use crate::config::RouteConfig;
use crate::gate::decision::{GateDecision, decide};
use crate::gate::requirement::GatePolicy;
use crate::redirect::{CancelToken, Location, Navigator, RedirectDispatcher};
use crate::session::{SessionState, SessionSubscription};

/// Per-instance phase of a mounted gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatePhase {
    Pending,
    Denied,
    Granted,
}

/// What the guarded surface should render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateView {
    /// Loading indicator while the session is unresolved
    Loading,
    /// Nothing, while a redirect is on its way
    Nothing,
    Children,
}

/// Guard wrapping one mounted protected surface
///
/// The gate re-evaluates on every session state it is given. Entering
/// `Denied` schedules exactly one redirect per target; a denial with a
/// different target replaces it. Leaving `Denied`, or unmounting the gate,
/// cancels a redirect that has not fired yet.
#[derive(Debug)]
pub struct AuthGate {
    policy: GatePolicy,
    location: Location,
    config: Arc<RouteConfig>,
    dispatcher: RedirectDispatcher,
    phase: GatePhase,
    // Target of the redirect issued for the current denial
    denied_target: Option<String>,
}

impl AuthGate {
    pub fn new(
        policy: impl Into<GatePolicy>,
        location: Location,
        config: Arc<RouteConfig>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self::with_dispatcher(policy, location, config, RedirectDispatcher::new(navigator))
    }

    pub fn with_dispatcher(
        policy: impl Into<GatePolicy>,
        location: Location,
        config: Arc<RouteConfig>,
        dispatcher: RedirectDispatcher,
    ) -> Self {
        Self {
            policy: policy.into(),
            location,
            config,
            dispatcher,
            phase: GatePhase::Pending,
            denied_target: None,
        }
    }

    pub fn phase(&self) -> GatePhase {
        self.phase
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn pending_redirect(&self) -> Option<&CancelToken> {
        self.dispatcher.pending()
    }

    /// Evaluate the gate against `state` and return what to render
    pub fn evaluate(&mut self, state: &SessionState) -> GateView {
        let decision = decide(self.policy, state, &self.location, &self.config);
        match decision {
            GateDecision::Pending => {
                self.leave_denied();
                self.phase = GatePhase::Pending;
                GateView::Loading
            }
            GateDecision::Granted => {
                self.leave_denied();
                self.phase = GatePhase::Granted;
                GateView::Children
            }
            GateDecision::Denied { target, reason } => {
                if self.denied_target.as_deref() != Some(target.as_str()) {
                    if self.dispatcher.cancel_pending() {
                        tracing::debug!(
                            "Gate at {} redirect target changed, previous redirect cancelled",
                            self.location.path()
                        );
                    }
                    tracing::debug!(
                        "Gate at {} denied ({:?}), redirecting to {}",
                        self.location.path(),
                        reason,
                        target
                    );
                    self.dispatcher.schedule_redirect(target.clone());
                    self.denied_target = Some(target);
                }
                self.phase = GatePhase::Denied;
                GateView::Nothing
            }
        }
    }

    fn leave_denied(&mut self) {
        self.denied_target = None;
        if self.phase == GatePhase::Denied && self.dispatcher.cancel_pending() {
            tracing::debug!(
                "Gate at {} no longer denied, redirect cancelled",
                self.location.path()
            );
        }
    }

    /// Wait for the next session transition and re-evaluate.
    /// `None` once the session store is gone.
    pub async fn next_view(&mut self, subscription: &mut SessionSubscription) -> Option<GateView> {
        let state = subscription.changed().await?;
        Some(self.evaluate(&state))
    }

    /// Tear the gate down, cancelling any redirect that has not fired
    pub fn unmount(mut self) {
        if self.dispatcher.cancel_pending() {
            tracing::debug!(
                "Gate at {} unmounted, pending redirect cancelled",
                self.location.path()
            );
        }
    }
}
