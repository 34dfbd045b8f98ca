//! Domain types for the inspector.
//!
//! - Content: documents as stored and records as verified
//! - Verdict: outcome of verifying one identifier

pub mod content;
pub mod verdict;

// Re-export commonly used types
pub use content::{ContentDocument, ContentKind, ContentRecord, ContentType, MemberRef};
pub use verdict::{BrokenReason, FailureCause, Verdict};
