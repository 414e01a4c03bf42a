//! End-to-end gate scenarios: a bootstrapped store drives mounted gates,
//! whose redirects land on a recording navigator

use std::sync::Arc;
use std::time::Duration;

use reiseklar_auth::{
    BootstrapInitializer, BootstrapView, GatePhase, GatePolicy, GateView, SessionState,
};

use crate::common::{
    Answer, RecordingNavigator, ScriptedAuthService, admin, init_test_environment, mount_gate,
    store, user,
};

/// Drive `gate` with session transitions until it stops rendering a loader
async fn settle(
    gate: &mut reiseklar_auth::AuthGate,
    subscription: &mut reiseklar_auth::SessionSubscription,
) -> GateView {
    let mut view = gate.evaluate(&subscription.current());
    while view == GateView::Loading {
        view = gate
            .next_view(subscription)
            .await
            .expect("session store dropped");
    }
    view
}

#[tokio::test]
async fn test_unauthenticated_visitor_is_sent_to_sign_in() {
    init_test_environment();
    let service = ScriptedAuthService::held(Answer::Reject);
    let bootstrap = BootstrapInitializer::new(store(&service));
    let navigator = Arc::new(RecordingNavigator::default());

    let mut subscription = bootstrap.store().subscribe();
    assert_eq!(bootstrap.mount(), BootstrapView::Loading);
    let mut gate = mount_gate(GatePolicy::user_area(), "/user", &navigator, 5);
    assert_eq!(gate.evaluate(&subscription.current()), GateView::Loading);

    service.release();
    assert_eq!(settle(&mut gate, &mut subscription).await, GateView::Nothing);
    assert_eq!(gate.phase(), GatePhase::Denied);

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(navigator.paths(), vec!["/nb/signIn?callback=/user"]);

    // The redirect only happened after the session resolved
    let resolved_at = bootstrap.store().snapshot().resolved_at.unwrap();
    assert!(navigator.times().iter().all(|at| *at >= resolved_at));
    assert_eq!(service.calls(), 1);
}

#[tokio::test]
async fn test_user_on_admin_area_is_sent_home() {
    init_test_environment();
    let service = ScriptedAuthService::new(Answer::Accept(user()));
    let bootstrap = BootstrapInitializer::new(store(&service));
    let navigator = Arc::new(RecordingNavigator::default());

    let mut subscription = bootstrap.store().subscribe();
    bootstrap.mount();
    let mut gate = mount_gate(GatePolicy::admin_area(), "/nb/admin", &navigator, 5);

    assert_eq!(settle(&mut gate, &mut subscription).await, GateView::Nothing);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(navigator.paths(), vec!["/"]);
}

#[tokio::test]
async fn test_admin_on_sign_in_is_sent_to_admin_dashboard() {
    init_test_environment();
    let service = ScriptedAuthService::new(Answer::Accept(admin()));
    let bootstrap = BootstrapInitializer::new(store(&service));
    let navigator = Arc::new(RecordingNavigator::default());

    assert_eq!(
        bootstrap.ready().await,
        SessionState::Authenticated { user: admin() }
    );
    let mut gate = mount_gate(GatePolicy::GuestOnly, "/signIn", &navigator, 5);
    assert_eq!(gate.evaluate(&bootstrap.store().state()), GateView::Nothing);

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(navigator.paths(), vec!["/nb/admin"]);
}

#[tokio::test]
async fn test_admin_passes_both_protected_areas() {
    init_test_environment();
    let service = ScriptedAuthService::new(Answer::Accept(admin()));
    let bootstrap = BootstrapInitializer::new(store(&service));
    let navigator = Arc::new(RecordingNavigator::default());
    let state = bootstrap.ready().await;

    let mut admin_gate = mount_gate(GatePolicy::admin_area(), "/en/admin", &navigator, 5);
    let mut user_gate = mount_gate(GatePolicy::user_area(), "/en/user", &navigator, 5);
    assert_eq!(admin_gate.evaluate(&state), GateView::Children);
    assert_eq!(user_gate.evaluate(&state), GateView::Children);

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(navigator.paths().is_empty());
}

/// Leaving the surface 1ms after denial must not navigate
#[tokio::test(start_paused = true)]
async fn test_unmount_right_after_denial_cancels_redirect() {
    init_test_environment();
    let service = ScriptedAuthService::new(Answer::Reject);
    let bootstrap = BootstrapInitializer::new(store(&service));
    let navigator = Arc::new(RecordingNavigator::default());
    let state = bootstrap.ready().await;

    let mut gate = mount_gate(GatePolicy::user_area(), "/nb/user/trips", &navigator, 10);
    assert_eq!(gate.evaluate(&state), GateView::Nothing);
    let token = gate.pending_redirect().cloned().unwrap();

    tokio::time::sleep(Duration::from_millis(1)).await;
    gate.unmount();

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(token.is_cancelled());
    assert!(!token.has_fired());
    assert!(navigator.paths().is_empty());
}

/// Signing in while the sign-in page is mounted sends the visitor on to
/// the callback they originally asked for
#[tokio::test]
async fn test_sign_in_on_guest_surface_follows_callback() {
    init_test_environment();
    let service = ScriptedAuthService::new(Answer::Reject);
    let bootstrap = BootstrapInitializer::new(store(&service));
    let navigator = Arc::new(RecordingNavigator::default());
    let mut subscription = bootstrap.store().subscribe();
    bootstrap.ready().await;

    let mut gate = mount_gate(
        GatePolicy::GuestOnly,
        "/en/signIn?callback=/user/trips",
        &navigator,
        5,
    );
    assert_eq!(
        gate.evaluate(&subscription.current()),
        GateView::Children
    );

    // The visitor signs in elsewhere; the next check picks it up
    service.answer_with(Answer::Accept(user()));
    bootstrap.store().check_session().unwrap();
    let mut view = gate.next_view(&mut subscription).await.unwrap();
    while view == GateView::Loading {
        view = gate.next_view(&mut subscription).await.unwrap();
    }
    assert_eq!(view, GateView::Nothing);

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(navigator.paths(), vec!["/en/user/trips"]);
    assert_eq!(service.calls(), 2);
}
