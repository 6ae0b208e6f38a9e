//! Response caching keyed by request fingerprint.
//!
//! Repeated requests with the same prompt, task type, and complexity are
//! served from memory until the global TTL elapses.

/// Request fingerprinting
pub mod fingerprint;
/// In-memory cache storage
pub mod storage;

use crate::Result;
use nexus_core::{Request, Response};

pub use fingerprint::fingerprint;
pub use storage::{CacheStats, CachedResponse, ResponseCache};

/// Backend that stores responses between requests.
///
/// Every method may fail; callers treat a failed lookup as a miss and ignore
/// failed writes.
pub trait ResponseStore: Send + Sync {
    /// Returns the stored response for `request` if present and unexpired.
    ///
    /// # Errors
    /// Returns [`RoutingError::Cache`](crate::RoutingError::Cache) if the backend is unreadable.
    fn lookup(&self, request: &Request) -> Result<Option<Response>>;

    /// Stores `response` under `request`'s fingerprint.
    ///
    /// # Errors
    /// Returns [`RoutingError::Cache`](crate::RoutingError::Cache) if the backend is unwritable.
    fn store(&self, request: &Request, response: &Response) -> Result<()>;

    /// Removes expired entries and returns how many were dropped.
    ///
    /// # Errors
    /// Returns [`RoutingError::Cache`](crate::RoutingError::Cache) if the backend is unwritable.
    fn sweep(&self) -> Result<usize>;

    /// Number of stored entries, expired ones included until swept.
    ///
    /// # Errors
    /// Returns [`RoutingError::Cache`](crate::RoutingError::Cache) if the backend is unreadable.
    fn len(&self) -> Result<usize>;

    /// Entry count and hit/miss tallies.
    ///
    /// # Errors
    /// Returns [`RoutingError::Cache`](crate::RoutingError::Cache) if the backend is unreadable.
    fn stats(&self) -> Result<CacheStats>;
}
