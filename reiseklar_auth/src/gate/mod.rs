//! Auth gate: render-or-redirect decisions for protected surfaces
//!
//! - `requirement`: declarative role constraints and gate policies
//! - `decision`: the pure decision table shared by client and server side
//! - `guard`: the stateful per-instance gate driving the redirect dispatcher

mod decision;
mod guard;
mod requirement;

pub use decision::{DenyReason, GateDecision, decide};
pub use guard::{AuthGate, GatePhase, GateView};
pub use requirement::{GatePolicy, GateRequirement};
