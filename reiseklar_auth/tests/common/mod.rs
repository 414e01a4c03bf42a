//! Shared fixtures for the integration tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::watch;

use reiseklar_auth::{
    AuthGate, AuthService, AuthServiceError, Credentials, GatePolicy, Location, Navigator,
    RedirectDispatcher, Role, RouteConfig, SessionStore, UserIdentity,
};

/// Load `.env_test` (falling back to `.env`) once per test binary
pub fn init_test_environment() {
    static ENV_INIT: Once = Once::new();
    ENV_INIT.call_once(|| {
        if dotenvy::from_filename(".env_test").is_err() {
            dotenvy::dotenv().ok();
        }
    });
}

pub fn user() -> UserIdentity {
    UserIdentity::new("user-1", "kari@example.no", Role::User)
        .unwrap()
        .with_language("nb")
}

pub fn admin() -> UserIdentity {
    UserIdentity::new("admin-1", "admin@reiseklar.no", Role::Admin).unwrap()
}

#[derive(Debug, Clone)]
pub enum Answer {
    Accept(UserIdentity),
    Reject,
    Unreachable,
}

/// Auth service answering every validation the same way, optionally only
/// after `release()` has been called
pub struct ScriptedAuthService {
    answer: Mutex<Answer>,
    gate: watch::Sender<bool>,
    calls: AtomicUsize,
}

impl ScriptedAuthService {
    pub fn new(answer: Answer) -> Arc<Self> {
        let (gate, _) = watch::channel(true);
        Arc::new(Self {
            answer: Mutex::new(answer),
            gate,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn held(answer: Answer) -> Arc<Self> {
        let service = Self::new(answer);
        service.hold();
        service
    }

    pub fn hold(&self) {
        self.gate.send_replace(false);
    }

    pub fn release(&self) {
        self.gate.send_replace(true);
    }

    pub fn answer_with(&self, answer: Answer) {
        *self.answer.lock().unwrap() = answer;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthService for ScriptedAuthService {
    async fn validate_session(&self) -> Result<UserIdentity, AuthServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut gate = self.gate.subscribe();
        let _ = gate.wait_for(|released| *released).await;

        let answer = self.answer.lock().unwrap().clone();
        match answer {
            Answer::Accept(user) => Ok(user),
            Answer::Reject => Err(AuthServiceError::Rejected("401 Unauthorized".to_string())),
            Answer::Unreachable => Err(AuthServiceError::NetworkFailure(
                "connection refused".to_string(),
            )),
        }
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<UserIdentity, AuthServiceError> {
        if credentials.password == "correct horse" {
            Ok(user())
        } else {
            Err(AuthServiceError::Rejected("invalid credentials".to_string()))
        }
    }

    async fn sign_out(&self) -> Result<(), AuthServiceError> {
        Ok(())
    }
}

/// Navigator recording each navigation with the time it happened
#[derive(Default)]
pub struct RecordingNavigator {
    visits: Mutex<Vec<(String, DateTime<Utc>)>>,
}

impl RecordingNavigator {
    pub fn paths(&self) -> Vec<String> {
        self.visits
            .lock()
            .unwrap()
            .iter()
            .map(|(path, _)| path.clone())
            .collect()
    }

    pub fn times(&self) -> Vec<DateTime<Utc>> {
        self.visits.lock().unwrap().iter().map(|(_, at)| *at).collect()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, path: &str) {
        self.visits
            .lock()
            .unwrap()
            .push((path.to_string(), Utc::now()));
    }
}

pub fn store(service: &Arc<ScriptedAuthService>) -> SessionStore {
    SessionStore::with_check_timeout(service.clone(), Duration::from_secs(5))
}

/// Mount a gate at `path` whose redirects fire `delay_ms` after denial
pub fn mount_gate(
    policy: GatePolicy,
    path: &str,
    navigator: &Arc<RecordingNavigator>,
    delay_ms: u64,
) -> AuthGate {
    let config = Arc::new(RouteConfig::default());
    let location = Location::parse(path, &config);
    let dispatcher =
        RedirectDispatcher::with_delay(navigator.clone(), Duration::from_millis(delay_ms));
    AuthGate::with_dispatcher(policy, location, config, dispatcher)
}
