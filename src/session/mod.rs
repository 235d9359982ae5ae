//! Analysis session store.
//!
//! [`SessionController`] owns a [`SessionState`] and is driven from a single
//! owner thread. Service calls run on worker threads and report back through a
//! channel; [`SessionController::poll_jobs`] applies their results. Each call
//! category carries a generation counter so a late response never overwrites
//! newer state, and at most one prediction is on the wire at a time.

mod background_jobs;
mod controller;
mod jobs;
mod state;

pub use controller::{SessionController, SubmitOutcome};
pub use state::{ConnectionStatus, SessionState, StatsSnapshot, StatsSource, ViewMode};
