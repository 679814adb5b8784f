use crate::{EscalationDecision, IncidentId};

/// Per-incident result of one run. Every fetched record resolves to exactly
/// one of these, so failure visibility is part of the return value rather
/// than a log side effect.
#[derive(Clone, Debug, PartialEq)]
pub enum ItemOutcome {
    /// Decision applied and written back.
    Escalated(EscalationDecision),
    /// Parsed fine, but below every applicable threshold (or already critical).
    NotDue { id: IncidentId },
    /// Record rejected at the boundary; the raw id is all we may have.
    SkippedMalformed { id: String, error: String },
    /// Re-read urgency no longer matched the decision; another actor got
    /// there first. Skipped, not an error.
    Conflict { id: IncidentId },
    /// Store rejected or timed out on the write.
    WriteFailed { id: IncidentId, error: String },
}
