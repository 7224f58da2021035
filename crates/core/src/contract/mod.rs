//! Contract types shared by every layer
//!
//! Two rules hold for every document in the system:
//!
//! 1. **Versioned**: every read returns `Versioned<T>` (value + version token),
//!    every successful write returns the new `VersionToken`
//! 2. **Conditional**: every mutating write names the token it was derived
//!    from, and the store rejects it if that token is no longer current
//!
//! ## Module Structure
//!
//! - `version`: Opaque version token (ETag)
//! - `versioned`: Generic versioned wrapper

pub mod version;
pub mod versioned;

// Re-exports
pub use version::VersionToken;
pub use versioned::Versioned;
