//! # ai-task-gateway
//!
//! Streaming gateway that routes one "AI task" to interchangeable LLM
//! backends and keeps transient backend failures away from the caller.
//!
//! ## Features
//!
//! - **Streaming**: incremental text deltas followed by one terminal `done` or `error` event
//! - **Retry and fallback**: exponential backoff for transient failures, model fallback for fatal ones
//! - **Response cache**: time-boxed replay of informational tasks
//! - **Multi-provider**: OpenAI-compatible, Anthropic and Ollama streaming clients
//! - **Telemetry**: one structured outcome record per task
//!
//! ## Embedding the orchestrator
//!
//! ```rust,no_run
//! use ai_task_gateway::{Config, ProviderRegistry, TaskEvent, TaskOrchestrator, TaskRequest};
//! use futures::StreamExt;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let registry = ProviderRegistry::from_configs(config.providers())?;
//!     let orchestrator = TaskOrchestrator::new(Arc::new(registry), &config.gateway);
//!
//!     let mut events = orchestrator
//!         .submit(TaskRequest::new("chat", "What is the capital of France?"), None)
//!         .await?;
//!     while let Some(event) = events.next().await {
//!         match event {
//!             TaskEvent::Delta(text) => print!("{}", text),
//!             TaskEvent::Done(done) => println!("\n[{} via {}]", done.model, done.provider),
//!             TaskEvent::Error(error) => eprintln!("\n{}", error.message),
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Gateway Mode
//!
//! ```rust,no_run
//! use ai_task_gateway::{Config, server::run_server};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_file("config/gateway.yaml").await?;
//!     run_server(config).await?;
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]

pub mod config;
pub mod core;
pub mod server;
pub mod utils;

pub use config::Config;
pub use utils::error::{GatewayError, Result};

pub use core::cache_manager::{CacheKey, CachePolicy, ResponseCache};
pub use core::classifier::{ErrorDetail, FailureKind, TaskFailure};
pub use core::orchestrator::{DonePayload, ErrorPayload, TaskEvent, TaskOrchestrator, TaskStream};
pub use core::policy::{CostTier, PolicyEngine, StaticPolicy};
pub use core::providers::{
    ChunkStream, Provider, ProviderError, ProviderRegistry, ProviderRequest, StreamingProvider,
};
pub use core::types::{ModelSpec, ProviderKind, StreamChunk, TaskRequest, Usage};

/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");
