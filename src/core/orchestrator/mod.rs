//! Streaming task orchestration
//!
//! Turns an admitted [`TaskRequest`](crate::core::types::TaskRequest) into a
//! stream of [`TaskEvent`]s: incremental text deltas followed by exactly one
//! terminal `done` or `error` event.

mod budget;
mod events;
#[allow(clippy::module_inception)]
mod orchestrator;
mod prepare;
mod retry;
mod state;

pub use budget::{TokenBudget, enforce_token_budget, estimate_cost, preflight_cost};
pub use events::{DonePayload, ErrorPayload, TaskEvent};
pub use orchestrator::{TaskOrchestrator, TaskStream};
pub use prepare::resolve_client_id;
pub use retry::{NextStep, RetrySettings};
