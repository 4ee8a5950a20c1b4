//! Attempt state machine states

use crate::core::classifier::{ErrorDetail, TaskFailure};
use crate::core::types::{ModelSpec, Usage};

/// State of one orchestration run after cache lookup missed
#[derive(Debug)]
pub(super) enum AttemptState {
    /// Call the provider for `spec`; `attempt` is 1-based
    Attempt { spec: ModelSpec, attempt: u32 },
    /// The attempt ended with an error
    Failed {
        spec: ModelSpec,
        attempt: u32,
        failure: TaskFailure,
    },
    /// The attempt reached a clean terminal chunk
    Succeeded {
        spec: ModelSpec,
        attempt: u32,
        text: String,
        usage: Option<Usage>,
    },
    /// No retry or fallback left
    Exhausted {
        spec: ModelSpec,
        attempt: u32,
        failure: TaskFailure,
        detail: ErrorDetail,
    },
}

/// Result of draining one provider stream
#[derive(Debug)]
pub(super) enum AttemptEnd {
    Completed(Option<Usage>),
    Failed(TaskFailure),
}
