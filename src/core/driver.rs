//! Verification driver.
//!
//! Runs the verifier over a seed list one identifier at a time, pausing
//! between seeds so the store never sees more than one request in flight,
//! and collects the offending identifier of every failure into a report.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::adapters::ContentResolver;
use crate::domain::Verdict;

use super::references::{dedup_ids, ReferenceSet};
use super::verifier::{Mode, Verifier};

/// Verdict for one seed identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedOutcome {
    pub id: String,
    pub verdict: Verdict,
}

/// Everything a driver run produced
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub mode: Mode,
    pub outcomes: Vec<SeedOutcome>,
    /// Offending identifiers of failed seeds, deduplicated
    pub broken: Vec<String>,
    /// Every identifier reached, deduplicated
    pub encountered: Vec<String>,
}

impl RunReport {
    pub fn safe_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.verdict.is_safe()).count()
    }

    /// Count outcomes with the given verdict label
    pub fn count(&self, label: &str) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.verdict.label() == label)
            .count()
    }

    /// One-line summary for the console
    pub fn summary(&self) -> String {
        let elapsed = self.finished_at - self.started_at;
        format!(
            "{} seeds: {} safe, {} broken, {} wrong-provenance, {} unresolved-type, {} errors ({}s)",
            self.outcomes.len(),
            self.safe_count(),
            self.count("broken"),
            self.count("wrong-provenance"),
            self.count("unresolved-type"),
            self.count("error"),
            elapsed.num_seconds()
        )
    }
}

/// Sequential driver over a seed list
pub struct Driver<R> {
    verifier: Verifier<R>,
    delay: Duration,
}

impl<R: ContentResolver> Driver<R> {
    /// Create a driver that waits `delay` between seeds
    pub fn new(verifier: Verifier<R>, delay: Duration) -> Self {
        Self { verifier, delay }
    }

    pub fn verifier(&self) -> &Verifier<R> {
        &self.verifier
    }

    /// Verify every seed in order
    #[instrument(skip(self, seeds), fields(seeds = seeds.len()))]
    pub async fn run(&self, seeds: &[String]) -> RunReport {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let mode = self.verifier.options().mode;
        info!(%run_id, ?mode, "Starting verification run");

        let mut outcomes = Vec::with_capacity(seeds.len());
        let mut broken = ReferenceSet::new();
        let mut encountered = ReferenceSet::new();

        for (idx, id) in seeds.iter().enumerate() {
            if idx > 0 && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            let verification = self.verifier.verify(id).await;
            let verdict = verification.verdict;

            match mode {
                Mode::PrintOnly => {
                    for seen in &verification.encountered {
                        println!("{}", seen);
                    }
                }
                Mode::Verify if verdict.is_safe() => println!("safe: {}", id),
                Mode::Verify => println!("{}: {} ({})", verdict.label(), id, verdict),
            }

            if let Some(offending) = verdict.offending_id() {
                warn!(id = %id, %verdict, "Seed failed verification");
                broken.insert(offending.to_string());
            }
            encountered.extend(verification.encountered);
            outcomes.push(SeedOutcome {
                id: id.clone(),
                verdict,
            });
        }

        let report = RunReport {
            run_id,
            started_at,
            finished_at: Utc::now(),
            mode,
            outcomes,
            broken: broken.into_iter().collect(),
            encountered: encountered.into_iter().collect(),
        };
        info!(%run_id, summary = %report.summary(), "Verification run finished");

        report
    }
}

/// Load seed identifiers from a JSON array of strings
pub fn load_seeds(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read uuid file: {}", path.display()))?;

    serde_json::from_str(&content).with_context(|| {
        format!(
            "Failed to parse uuid file (expected a JSON array of strings): {}",
            path.display()
        )
    })
}

/// Write failing identifiers, newline-joined
pub fn write_report(path: &Path, broken: &[String]) -> Result<()> {
    let broken = dedup_ids(broken.iter().cloned());
    std::fs::write(path, broken.join("\n"))
        .with_context(|| format!("Failed to write broken file: {}", path.display()))
}
