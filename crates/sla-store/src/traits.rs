use sla_core::{HistoryEvent, IncidentId, IncidentStatus, Urgency, WireIncident};

/// Read/write access to the shared incident store. The engine is only one
/// of several writers, so records come back loosely typed and parsing is
/// the caller's problem.
pub trait IncidentRepository: Send + Sync {
    /// Every incident whose status is neither resolved nor cancelled.
    /// Order is arbitrary; callers must not rely on it.
    fn list_open(&self) -> anyhow::Result<Vec<WireIncident>>;

    fn get(&self, id: &IncidentId) -> anyhow::Result<Option<WireIncident>>;

    /// Write a new urgency together with the full replacement history.
    /// Callers re-read immediately before calling this so concurrent
    /// appends are not clobbered.
    fn update_escalation(
        &self,
        id: &IncidentId,
        urgency: Urgency,
        history: &[HistoryEvent],
    ) -> anyhow::Result<()>;

    fn insert(&self, incident: WireIncident) -> anyhow::Result<()>;

    fn set_status(&self, id: &IncidentId, status: IncidentStatus) -> anyhow::Result<()>;
}
