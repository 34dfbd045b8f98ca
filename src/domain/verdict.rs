//! Verification verdicts.

use serde::{Deserialize, Serialize};

/// Structural anomaly found in an image set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrokenReason {
    /// Image set whose sole member is itself
    Cycle,

    /// Content reached again while it was still being verified
    ReferenceCycle,
}

impl std::fmt::Display for BrokenReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BrokenReason::Cycle => write!(f, "cycle"),
            BrokenReason::ReferenceCycle => write!(f, "reference cycle"),
        }
    }
}

/// Why a content item could not be resolved or interpreted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "detail")]
pub enum FailureCause {
    NotFound,
    Status(u16),
    Transport(String),
    Decode(String),
    /// Article markup that could not be tokenized
    Markup(String),
}

impl std::fmt::Display for FailureCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureCause::NotFound => write!(f, "not found"),
            FailureCause::Status(code) => write!(f, "error {}", code),
            FailureCause::Transport(msg) => write!(f, "transport error: {}", msg),
            FailureCause::Decode(msg) => write!(f, "invalid content document: {}", msg),
            FailureCause::Markup(msg) => write!(f, "unparseable body markup: {}", msg),
        }
    }
}

/// Outcome of verifying one identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "verdict")]
pub enum Verdict {
    Safe,

    Broken {
        reason: BrokenReason,
        offending_id: String,
    },

    WrongProvenance {
        id: String,
    },

    UnresolvedType {
        id: String,
        actual_type: String,
    },

    ResolutionFailed {
        id: String,
        cause: FailureCause,
    },
}

impl Verdict {
    pub fn is_safe(&self) -> bool {
        matches!(self, Verdict::Safe)
    }

    /// Identifier the failure is attributed to (`None` for `Safe`)
    pub fn offending_id(&self) -> Option<&str> {
        match self {
            Verdict::Safe => None,
            Verdict::Broken { offending_id, .. } => Some(offending_id),
            Verdict::WrongProvenance { id }
            | Verdict::UnresolvedType { id, .. }
            | Verdict::ResolutionFailed { id, .. } => Some(id),
        }
    }

    /// Short label used in console output and summaries
    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Safe => "safe",
            Verdict::Broken { .. } => "broken",
            Verdict::WrongProvenance { .. } => "wrong-provenance",
            Verdict::UnresolvedType { .. } => "unresolved-type",
            Verdict::ResolutionFailed { .. } => "error",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Safe => write!(f, "safe"),
            Verdict::Broken {
                reason,
                offending_id,
            } => write!(f, "broken ({}) at {}", reason, offending_id),
            Verdict::WrongProvenance { id } => {
                write!(f, "{} was not produced by the expected publisher", id)
            }
            Verdict::UnresolvedType { id, actual_type } => {
                write!(f, "{} has unexpected type '{}'", id, actual_type)
            }
            Verdict::ResolutionFailed { id, cause } => {
                write!(f, "failed to resolve {}: {}", id, cause)
            }
        }
    }
}
