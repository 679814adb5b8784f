use std::cmp::Ordering;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use sla_core::{
    evaluate, summarize, EscalationDecision, HistoryEvent, Incident, ItemOutcome, PolicyConfig,
    RunSummary,
};
use sla_store::IncidentRepository;

use crate::clock::ClockSource;

/// One fetch → decide → apply → summarize cycle over the open incidents.
///
/// The engine holds no state between runs: elapsed time is derived fresh
/// from `created_at` every run, so an aborted run simply leaves work for
/// the next one.
pub struct EscalationEngine {
    repo: Arc<dyn IncidentRepository>,
    clock: Box<dyn ClockSource>,
    policy: PolicyConfig,
}

impl EscalationEngine {
    pub fn new(
        repo: Arc<dyn IncidentRepository>,
        clock: Box<dyn ClockSource>,
        policy: PolicyConfig,
    ) -> Self {
        Self { repo, clock, policy }
    }

    /// Execute one complete run. Returns `Err` only when the fetch itself
    /// fails; per-incident problems become counts in the summary.
    pub fn run_once(&self) -> Result<RunSummary> {
        let (now, aged, mut outcomes) = self.fetch_and_rank()?;

        let mut decisions = Vec::new();
        for (incident, elapsed) in &aged {
            match evaluate(&self.policy, incident.urgency, *elapsed) {
                Some((target, reason)) => decisions.push(EscalationDecision {
                    id: incident.id.clone(),
                    prior: incident.urgency,
                    target,
                    elapsed_min: *elapsed,
                    reason,
                }),
                None => outcomes.push(ItemOutcome::NotDue { id: incident.id.clone() }),
            }
        }
        info!(due = decisions.len(), "escalations identified");

        for decision in &decisions {
            let outcome = self.apply(now, decision);
            match &outcome {
                ItemOutcome::Escalated(d) => {
                    info!(id = %d.id, prior = d.prior.as_str(), new = d.target.as_str(), "escalated")
                }
                ItemOutcome::Conflict { id } => {
                    debug!(id = %id, "already handled elsewhere, skipping")
                }
                ItemOutcome::WriteFailed { id, error } => {
                    warn!(id = %id, error = %error, "escalation write failed")
                }
                _ => {}
            }
            outcomes.push(outcome);
        }

        let summary = summarize(now, &outcomes);
        info!(
            considered = summary.considered,
            escalated = summary.escalated_total(),
            malformed = summary.malformed,
            write_failures = summary.write_failures,
            "run complete"
        );
        Ok(summary)
    }

    /// Decision phase only: what `run_once` would do, without writing.
    pub fn preview(&self) -> Result<Vec<EscalationDecision>> {
        let (_, aged, _) = self.fetch_and_rank()?;
        Ok(aged
            .iter()
            .filter_map(|(incident, elapsed)| {
                evaluate(&self.policy, incident.urgency, *elapsed).map(|(target, reason)| {
                    EscalationDecision {
                        id: incident.id.clone(),
                        prior: incident.urgency,
                        target,
                        elapsed_min: *elapsed,
                        reason,
                    }
                })
            })
            .collect())
    }

    /// Fetch open incidents, take the run's single `now`, parse each record
    /// and compute its age. Malformed records become outcomes here.
    fn fetch_and_rank(&self) -> Result<(DateTime<Utc>, Vec<(Incident, f64)>, Vec<ItemOutcome>)> {
        let rows = self.repo.list_open().context("list open incidents")?;
        let now = self.clock.now();
        info!(open = rows.len(), "fetched unresolved incidents");

        let mut outcomes = Vec::new();
        let mut aged = Vec::new();
        for row in &rows {
            match Incident::parse(row) {
                Ok(incident) => {
                    let elapsed = incident.elapsed_minutes(now);
                    aged.push((incident, elapsed));
                }
                Err(err) => {
                    warn!(id = %row.id, error = %err, "skipping malformed incident");
                    outcomes.push(ItemOutcome::SkippedMalformed {
                        id: row.id.clone(),
                        error: err.to_string(),
                    });
                }
            }
        }

        // Oldest first, for log readability only; nothing downstream depends
        // on this order.
        aged.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        for (incident, elapsed) in aged.iter().take(5) {
            debug!(id = %incident.id, urgency = incident.urgency.as_str(), elapsed_min = *elapsed, "oldest open incident");
        }

        Ok((now, aged, outcomes))
    }

    /// Per-incident read-modify-write. The fresh read keeps concurrent
    /// history appends, and the urgency guard drops decisions another run
    /// or a manual edit already acted on.
    fn apply(&self, now: DateTime<Utc>, decision: &EscalationDecision) -> ItemOutcome {
        let row = match self.repo.get(&decision.id) {
            Ok(Some(row)) => row,
            Ok(None) => return ItemOutcome::Conflict { id: decision.id.clone() },
            Err(err) => {
                return ItemOutcome::WriteFailed {
                    id: decision.id.clone(),
                    error: err.to_string(),
                }
            }
        };
        let fresh = match Incident::parse(&row) {
            Ok(incident) => incident,
            Err(err) => {
                return ItemOutcome::SkippedMalformed {
                    id: decision.id.as_str().to_string(),
                    error: err.to_string(),
                }
            }
        };
        if fresh.urgency != decision.prior {
            return ItemOutcome::Conflict { id: decision.id.clone() };
        }

        let mut history = fresh.history;
        history.push(HistoryEvent::automatic_escalation(
            now,
            decision.prior,
            decision.target,
            &decision.reason,
        ));
        match self.repo.update_escalation(&decision.id, decision.target, &history) {
            Ok(()) => ItemOutcome::Escalated(decision.clone()),
            Err(err) => ItemOutcome::WriteFailed {
                id: decision.id.clone(),
                error: err.to_string(),
            },
        }
    }
}
