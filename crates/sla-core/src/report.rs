use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{EscalationDecision, ItemOutcome, Urgency};

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UrgencyCounts {
    pub medium: usize,
    pub high: usize,
    pub critical: usize,
}

impl UrgencyCounts {
    fn bump(&mut self, urgency: Urgency) {
        match urgency {
            // Nothing ever escalates *to* low.
            Urgency::Low => {}
            Urgency::Medium => self.medium += 1,
            Urgency::High => self.high += 1,
            Urgency::Critical => self.critical += 1,
        }
    }
}

/// Aggregate view of one run, returned to whatever triggered it. Downstream
/// delivery (mail, archival) is somebody else's job.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_at: DateTime<Utc>,
    /// Parseable incidents evaluated this run; malformed ones are excluded
    /// and reported under `malformed`.
    pub considered: usize,
    pub escalated: Vec<EscalationDecision>,
    pub by_urgency: UrgencyCounts,
    pub malformed: usize,
    pub conflicts: usize,
    pub write_failures: usize,
}

impl RunSummary {
    pub fn escalated_total(&self) -> usize {
        self.escalated.len()
    }

    /// Considered but left untouched this run.
    pub fn skipped(&self) -> usize {
        self.considered - self.escalated.len()
    }
}

/// Project a run's per-item outcomes into a summary. Pure; an empty slice
/// yields a zero summary, never an error.
pub fn summarize(run_at: DateTime<Utc>, outcomes: &[ItemOutcome]) -> RunSummary {
    let mut summary = RunSummary {
        run_at,
        considered: 0,
        escalated: Vec::new(),
        by_urgency: UrgencyCounts::default(),
        malformed: 0,
        conflicts: 0,
        write_failures: 0,
    };
    for outcome in outcomes {
        match outcome {
            ItemOutcome::Escalated(decision) => {
                summary.considered += 1;
                summary.by_urgency.bump(decision.target);
                summary.escalated.push(decision.clone());
            }
            ItemOutcome::NotDue { .. } => summary.considered += 1,
            ItemOutcome::SkippedMalformed { .. } => summary.malformed += 1,
            ItemOutcome::Conflict { .. } => {
                summary.considered += 1;
                summary.conflicts += 1;
            }
            ItemOutcome::WriteFailed { .. } => {
                summary.considered += 1;
                summary.write_failures += 1;
            }
        }
    }
    summary
}
