//! Provider adapters that run without a vendor backend.

/// Always-available local fallback provider.
pub mod local;
/// Scripted provider for tests and demos.
pub mod mock;

pub use local::LocalProvider;
pub use mock::{FailureMode, MockProvider};
