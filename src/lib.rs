//! imgset-inspector - structural audit of published image sets
//!
//! Resolves content identifiers against the document store, walks the
//! references each item embeds, and flags content that cannot be rendered
//! or was not produced by the expected publishing pipeline.
//!
//! # Verification
//!
//! - Images and graphics are leaves
//! - Image sets recurse into their members; an image set whose sole member
//!   is itself is broken
//! - Articles recurse into the image sets embedded in their body markup and
//!   into their main image
//! - The first failure found below an item becomes that item's verdict
//!
//! # Modules
//!
//! - `adapters`: Document store access behind the `ContentResolver` trait
//! - `core`: Markup extraction, Verifier, Driver
//! - `domain`: Data structures (ContentRecord, Verdict)
//! - `config`: Layered configuration
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Verify the identifiers in uuids.json, writing failures to broken-images
//! imgset-inspector run --auth <base64> --uuidfile uuids.json
//!
//! # Only list what the walk reaches
//! imgset-inspector run --auth <base64> --printOnly
//!
//! # Inspect markup offline
//! imgset-inspector extract --input body.html
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;

// Re-export main types at crate root for convenience
pub use crate::adapters::{ContentResolver, DocumentStoreClient, ResolveError};
pub use crate::core::{Driver, Mode, RunReport, Verification, Verifier, VerifyOptions};
pub use crate::domain::{BrokenReason, ContentKind, ContentRecord, ContentType, FailureCause, Verdict};
