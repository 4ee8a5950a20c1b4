//! Core type definition module
//!
//! Contains the data structures shared by the orchestrator, the provider
//! clients and the response cache.

pub mod message;
pub mod model;
pub mod requests;
pub mod responses;

// Re-export all public types
pub use message::*;
pub use model::*;
pub use requests::*;
pub use responses::*;
