//! Core types and traits for the Nexus orchestration engine.
//!
//! This crate provides the request/response data model, error handling, the
//! provider adapter trait, and the clock abstraction shared by the provider
//! and routing crates.

/// Time source abstraction.
pub mod clock;
/// Error types and result definitions.
pub mod error;
/// Flat request/response field mappings used at the entry point.
pub mod fields;
/// Synchronization helpers.
pub mod sync;
/// Trait definitions for completion providers.
pub mod traits;
/// Core data types for requests, responses, and provider identity.
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{Error, Result};
pub use fields::{RequestFields, ResponseFields};
pub use sync::IgnoreLock;
pub use traits::{CompletionProvider, PerformanceMetrics};
pub use types::{Complexity, Metadata, ProviderKind, Request, Response};
