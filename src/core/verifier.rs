//! Recursive content-graph verification.
//!
//! `verify` resolves an identifier, checks its provenance, and dispatches on
//! its type. Image sets recurse into their members, articles into the image
//! sets referenced from their body markup and their main image. The first
//! failing child decides the verdict of its parent.
//!
//! Every top-level call carries a trail of identifiers that are still being
//! verified. Reaching one of them again is reported as a reference cycle
//! instead of recursing forever. The single-member self reference is checked
//! before that, without resolving the member, and keeps its own reason.

use std::future::Future;
use std::pin::Pin;

use tracing::{debug, instrument, warn};

use crate::adapters::ContentResolver;
use crate::domain::{BrokenReason, ContentKind, ContentRecord, FailureCause, Verdict};

use super::markup::extract_image_set_refs;
use super::references::ReferenceSet;

/// Marker expected in the provenance tag of every checked record
pub const DEFAULT_PROVENANCE_MARKER: &str = "tid_";

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// What a verification run checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Run provenance, structural and type checks
    #[default]
    Verify,

    /// Walk the graph and record identifiers without judging them
    PrintOnly,
}

/// Verifier settings
#[derive(Debug, Clone)]
pub struct VerifyOptions {
    /// Substring the provenance tag must contain
    pub provenance_marker: String,

    pub mode: Mode,
}

impl Default for VerifyOptions {
    fn default() -> Self {
        Self {
            provenance_marker: DEFAULT_PROVENANCE_MARKER.to_string(),
            mode: Mode::Verify,
        }
    }
}

/// Result of verifying one top-level identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verification {
    pub verdict: Verdict,

    /// Identifiers reached, in visit order (may repeat)
    pub encountered: Vec<String>,
}

/// Per-call walk state
#[derive(Debug, Default)]
struct Trail {
    in_progress: Vec<String>,
    encountered: Vec<String>,
}

impl Trail {
    fn is_in_progress(&self, id: &str) -> bool {
        self.in_progress.iter().any(|p| p == id)
    }
}

/// Content verifier
pub struct Verifier<R> {
    resolver: R,
    options: VerifyOptions,
}

impl<R: ContentResolver> Verifier<R> {
    /// Create a new verifier
    pub fn new(resolver: R, options: VerifyOptions) -> Self {
        Self { resolver, options }
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    pub fn options(&self) -> &VerifyOptions {
        &self.options
    }

    fn checks_enabled(&self) -> bool {
        self.options.mode == Mode::Verify
    }

    /// Verify an identifier and everything reachable from it
    #[instrument(skip(self), fields(resolver = self.resolver.name()))]
    pub async fn verify(&self, id: &str) -> Verification {
        let mut trail = Trail::default();
        let verdict = self.visit(id, &mut trail).await;
        debug!(%verdict, visited = trail.encountered.len(), "Verification finished");

        Verification {
            verdict,
            encountered: trail.encountered,
        }
    }

    fn visit<'a>(&'a self, id: &'a str, trail: &'a mut Trail) -> BoxFuture<'a, Verdict> {
        Box::pin(async move {
            if trail.is_in_progress(id) {
                debug!(id, "Reached content already being verified");
                return if self.checks_enabled() {
                    Verdict::Broken {
                        reason: BrokenReason::ReferenceCycle,
                        offending_id: id.to_string(),
                    }
                } else {
                    Verdict::Safe
                };
            }
            trail.encountered.push(id.to_string());

            let record = match self.resolver.resolve(id).await {
                Ok(record) => record,
                Err(e) => {
                    warn!(id, error = %e, "Failed to resolve content");
                    return Verdict::ResolutionFailed {
                        id: id.to_string(),
                        cause: e.into(),
                    };
                }
            };

            if self.checks_enabled()
                && !record
                    .provenance_tag
                    .contains(self.options.provenance_marker.as_str())
            {
                debug!(id, tag = %record.provenance_tag, "Unexpected provenance");
                return Verdict::WrongProvenance { id: id.to_string() };
            }

            trail.in_progress.push(id.to_string());
            let verdict = self.dispatch(id, &record, trail).await;
            trail.in_progress.pop();

            verdict
        })
    }

    async fn dispatch(&self, id: &str, record: &ContentRecord, trail: &mut Trail) -> Verdict {
        match &record.kind {
            ContentKind::Image | ContentKind::Graphic => Verdict::Safe,

            ContentKind::ImageSet { members } => {
                if let [only] = members.as_slice() {
                    if *only == record.id && self.checks_enabled() {
                        debug!(id, "Image set is its own sole member");
                        return Verdict::Broken {
                            reason: BrokenReason::Cycle,
                            offending_id: record.id.clone(),
                        };
                    }
                }
                self.visit_all(members, trail).await
            }

            ContentKind::Article { body_markup } => {
                let refs = match body_markup.as_deref().map(extract_image_set_refs) {
                    Some(Ok(refs)) => refs,
                    Some(Err(e)) => {
                        warn!(id, error = %e, "Failed to parse body markup");
                        return Verdict::ResolutionFailed {
                            id: id.to_string(),
                            cause: FailureCause::Markup(e.to_string()),
                        };
                    }
                    None => Vec::new(),
                };

                let mut images: ReferenceSet = refs.into_iter().collect();
                images.extend(record.main_image_id.iter().cloned());
                debug!(id, count = images.len(), "Article references");

                let images: Vec<String> = images.into_iter().collect();
                self.visit_all(&images, trail).await
            }

            ContentKind::Other { type_name } => {
                if self.checks_enabled() {
                    Verdict::UnresolvedType {
                        id: id.to_string(),
                        actual_type: type_name.clone(),
                    }
                } else {
                    Verdict::Safe
                }
            }
        }
    }

    /// Visit children in order; the first failure wins
    async fn visit_all(&self, ids: &[String], trail: &mut Trail) -> Verdict {
        for child in ids {
            let verdict = self.visit(child, trail).await;
            if !verdict.is_safe() {
                return verdict;
            }
        }
        Verdict::Safe
    }
}
