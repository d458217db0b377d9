//! # payvo - Payvo payment API client
//!
//! An async Rust client for the Payvo payment-processing HTTP API: create
//! and fetch payments, issue and fetch refunds, and start recurring
//! ("autopayment") charges for saved customers. The client authenticates
//! every call with the merchant credential headers, returns decoded JSON
//! responses verbatim, and leaves retry and backoff policy to the caller.

pub mod client;
pub mod error;
pub mod types;

// Re-exports for convenience
pub use client::PayvoClient;
pub use error::{PayvoError, Result};
pub use types::*;

/// Current version of the payvo library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_constants() {
        assert!(!VERSION.is_empty());
        assert!(PRODUCTION_URL.ends_with('/'));
    }
}
