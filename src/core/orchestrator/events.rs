//! Outbound task events and their SSE encoding

use crate::core::classifier::FailureKind;
use crate::core::types::{Citation, ProviderKind, Usage};
use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Payload of the terminal `done` event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonePayload {
    pub latency_ms: u64,
    pub provider: ProviderKind,
    pub model: String,
    pub text: String,
    pub usage: Option<Usage>,
    pub citations: Vec<Citation>,
    pub estimated_cost_usd: Option<f64>,
    pub cached: bool,
}

/// Payload of the terminal `error` event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorPayload {
    /// Sanitized, user-facing message
    pub message: String,
    #[serde(rename = "type")]
    pub kind: FailureKind,
    pub retryable: bool,
    pub provider: ProviderKind,
    pub model: String,
}

/// One event of a task stream; exactly one terminal event ends every stream
#[derive(Debug, Clone, PartialEq)]
pub enum TaskEvent {
    Delta(String),
    Done(Box<DonePayload>),
    Error(ErrorPayload),
}

impl TaskEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TaskEvent::Delta(_))
    }

    /// Server-sent event frame
    pub fn to_sse(&self) -> String {
        match self {
            TaskEvent::Delta(text) => {
                // Embedded newlines become continuation data lines
                let mut frame = String::with_capacity(text.len() + 8);
                for line in text.split('\n') {
                    frame.push_str("data: ");
                    frame.push_str(line);
                    frame.push('\n');
                }
                frame.push('\n');
                frame
            }
            TaskEvent::Done(payload) => named_frame("done", payload.as_ref()),
            TaskEvent::Error(payload) => named_frame("error", payload),
        }
    }

    pub fn to_sse_bytes(&self) -> Bytes {
        Bytes::from(self.to_sse())
    }
}

fn named_frame<T: Serialize>(event: &str, payload: &T) -> String {
    let data = serde_json::to_string(payload).unwrap_or_else(|_| "{}".to_string());
    format!("event: {}\ndata: {}\n\n", event, data)
}
