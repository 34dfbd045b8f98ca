//! Core verification logic.
//!
//! This module contains:
//! - Markup: image-set reference extraction from article bodies
//! - References: deduplicated identifier sets
//! - Verifier: recursive content-graph verification
//! - Driver: sequential, throttled runs over a seed list

pub mod driver;
pub mod markup;
pub mod references;
pub mod verifier;

// Re-export commonly used types
pub use driver::{load_seeds, write_report, Driver, RunReport, SeedOutcome};
pub use markup::{extract_image_set_refs, MarkupError, IMAGE_SET_TYPE};
pub use references::{dedup_ids, ReferenceSet};
pub use verifier::{Mode, Verification, Verifier, VerifyOptions, DEFAULT_PROVENANCE_MARKER};
