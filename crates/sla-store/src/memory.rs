use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use anyhow::{anyhow, bail};
use sla_core::{HistoryEvent, IncidentId, IncidentStatus, Urgency, WireIncident};

use crate::traits::IncidentRepository;

/// In-memory repository for tests. Not durable, but enough for engine and
/// scenario tests, including injected store failures.
#[derive(Default)]
pub struct MemoryRepository {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    incidents: HashMap<String, WireIncident>,
    fail_writes_for: HashSet<String>,
    fail_listing: bool,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `update_escalation` fail for the given incident.
    pub fn fail_writes_for(&self, id: &str) {
        self.inner.lock().unwrap().fail_writes_for.insert(id.to_string());
    }

    /// Make `list_open` fail, simulating an unreachable store.
    pub fn fail_listing(&self) {
        self.inner.lock().unwrap().fail_listing = true;
    }
}

impl IncidentRepository for MemoryRepository {
    fn list_open(&self) -> anyhow::Result<Vec<WireIncident>> {
        let inner = self.inner.lock().unwrap();
        if inner.fail_listing {
            bail!("incident store unreachable");
        }
        Ok(inner
            .incidents
            .values()
            .filter(|w| w.status != "resolved" && w.status != "cancelled")
            .cloned()
            .collect())
    }

    fn get(&self, id: &IncidentId) -> anyhow::Result<Option<WireIncident>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.incidents.get(id.as_str()).cloned())
    }

    fn update_escalation(
        &self,
        id: &IncidentId,
        urgency: Urgency,
        history: &[HistoryEvent],
    ) -> anyhow::Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_writes_for.contains(id.as_str()) {
            bail!("write rejected for {}", id.as_str());
        }
        let wire = inner
            .incidents
            .get_mut(id.as_str())
            .ok_or_else(|| anyhow!("incident {} not found", id.as_str()))?;
        wire.urgency = urgency.as_str().to_string();
        wire.history = history.to_vec();
        Ok(())
    }

    fn insert(&self, incident: WireIncident) -> anyhow::Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.incidents.insert(incident.id.clone(), incident);
        Ok(())
    }

    fn set_status(&self, id: &IncidentId, status: IncidentStatus) -> anyhow::Result<()> {
        let mut inner = self.inner.lock().unwrap();
        let wire = inner
            .incidents
            .get_mut(id.as_str())
            .ok_or_else(|| anyhow!("incident {} not found", id.as_str()))?;
        wire.status = status.as_str().to_string();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wire(id: &str, urgency: &str, status: &str) -> WireIncident {
        WireIncident {
            id: id.to_string(),
            created_at: "2025-11-20T10:00:00Z".to_string(),
            urgency: urgency.to_string(),
            status: status.to_string(),
            area: None,
            kind: None,
            location: None,
            history: vec![],
        }
    }

    #[test]
    fn list_open_excludes_resolved_and_cancelled() {
        let repo = MemoryRepository::new();
        repo.insert(wire("INC_1", "low", "pending")).unwrap();
        repo.insert(wire("INC_2", "high", "in_progress")).unwrap();
        repo.insert(wire("INC_3", "low", "resolved")).unwrap();
        repo.insert(wire("INC_4", "low", "cancelled")).unwrap();

        let open = repo.list_open().unwrap();
        let mut ids: Vec<_> = open.iter().map(|w| w.id.as_str()).collect();
        ids.sort();
        assert_eq!(ids, vec!["INC_1", "INC_2"]);
    }

    #[test]
    fn update_escalation_replaces_urgency_and_history() {
        let repo = MemoryRepository::new();
        repo.insert(wire("INC_1", "low", "pending")).unwrap();

        let id = IncidentId::from_str("INC_1");
        let history = vec![HistoryEvent {
            action: "created".to_string(),
            at: "2025-11-20T10:00:00Z".to_string(),
            detail: Default::default(),
        }];
        repo.update_escalation(&id, Urgency::Medium, &history).unwrap();

        let got = repo.get(&id).unwrap().unwrap();
        assert_eq!(got.urgency, "medium");
        assert_eq!(got.history.len(), 1);
    }

    #[test]
    fn update_escalation_on_missing_incident_errors() {
        let repo = MemoryRepository::new();
        let id = IncidentId::from_str("INC_missing");
        assert!(repo.update_escalation(&id, Urgency::Medium, &[]).is_err());
    }

    #[test]
    fn injected_write_failure() {
        let repo = MemoryRepository::new();
        repo.insert(wire("INC_1", "low", "pending")).unwrap();
        repo.fail_writes_for("INC_1");
        let id = IncidentId::from_str("INC_1");
        assert!(repo.update_escalation(&id, Urgency::Medium, &[]).is_err());
    }

    #[test]
    fn injected_listing_failure() {
        let repo = MemoryRepository::new();
        repo.fail_listing();
        assert!(repo.list_open().is_err());
    }

    #[test]
    fn set_status_closes_incident() {
        let repo = MemoryRepository::new();
        repo.insert(wire("INC_1", "low", "pending")).unwrap();
        repo.set_status(&IncidentId::from_str("INC_1"), IncidentStatus::Resolved)
            .unwrap();
        assert!(repo.list_open().unwrap().is_empty());
    }
}
