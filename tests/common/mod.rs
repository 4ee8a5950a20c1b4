//! Common test utilities for ai-task-gateway
//!
//! Scripted providers stand in for real backends so the orchestrator can be
//! driven through exact failure sequences without network access.

pub mod fixtures;
pub mod limiter;
pub mod logs;

pub use fixtures::{TestGateway, collect_events, delta_text, terminal_event, test_config};
pub use limiter::{LimiterCall, RecordingRateLimiter};
pub use logs::CapturedLogs;
pub use providers::{ScriptedProvider, Step};
