//! Request orchestrator.
//!
//! Drives a request through an explicit state machine:
//! - **Received**: the resolver runs; failures end the session in **Failed**
//! - **Presenting**: the outcome is shown and the gate is asked (or skipped
//!   for non-interactive sessions)
//! - **Ticketing**: an accepted escalation is filed with the tracker
//! - **Resolved**: terminal, with or without success

mod gate;
mod report;
mod runner;
mod session;

pub use gate::{AutoApprove, ConfirmationGate, Presentation, PresetGate};
pub use report::{OutcomeReport, ReportError};
pub use runner::RequestOrchestrator;
pub use session::{ResolutionSession, SessionError, SessionState};
