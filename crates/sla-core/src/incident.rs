use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{HistoryEvent, IncidentId, IncidentStatus, Urgency};

/// Incident record exactly as the store holds it: stringly typed, because
/// the store is shared with other writers and makes no schema promises.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WireIncident {
    pub id: String,
    pub created_at: String,
    pub urgency: String,
    pub status: String,
    #[serde(default)]
    pub area: Option<String>,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub history: Vec<HistoryEvent>,
}

/// Rejection raised by [`Incident::parse`] at the repository boundary.
/// One malformed record never aborts a run; the engine skips it.
#[derive(Debug, Error)]
pub enum MalformedIncident {
    #[error("incident {id}: unparseable created_at {value:?}")]
    BadTimestamp { id: String, value: String },
    #[error("incident {id}: unknown urgency {value:?}")]
    UnknownUrgency { id: String, value: String },
    #[error("incident {id}: unknown status {value:?}")]
    UnknownStatus { id: String, value: String },
}

/// Typed, read-only snapshot of an incident for one run.
#[derive(Clone, Debug)]
pub struct Incident {
    pub id: IncidentId,
    pub created_at: DateTime<Utc>,
    pub urgency: Urgency,
    pub status: IncidentStatus,
    pub area: Option<String>,
    pub kind: Option<String>,
    pub location: Option<String>,
    pub history: Vec<HistoryEvent>,
}

impl Incident {
    /// Rejecting constructor: malformed input becomes a typed error here
    /// instead of a surprise deep inside the policy.
    pub fn parse(wire: &WireIncident) -> Result<Self, MalformedIncident> {
        let created_at = DateTime::parse_from_rfc3339(&wire.created_at)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|_| MalformedIncident::BadTimestamp {
                id: wire.id.clone(),
                value: wire.created_at.clone(),
            })?;
        let urgency =
            Urgency::parse(&wire.urgency).ok_or_else(|| MalformedIncident::UnknownUrgency {
                id: wire.id.clone(),
                value: wire.urgency.clone(),
            })?;
        let status =
            IncidentStatus::parse(&wire.status).ok_or_else(|| MalformedIncident::UnknownStatus {
                id: wire.id.clone(),
                value: wire.status.clone(),
            })?;
        Ok(Self {
            id: IncidentId::from_str(wire.id.clone()),
            created_at,
            urgency,
            status,
            area: wire.area.clone(),
            kind: wire.kind.clone(),
            location: wire.location.clone(),
            history: wire.history.clone(),
        })
    }

    /// Minutes since creation at `now`, clamped at zero for rows dated in
    /// the future (clock skew between writers).
    pub fn elapsed_minutes(&self, now: DateTime<Utc>) -> f64 {
        let secs = (now - self.created_at).num_milliseconds() as f64 / 1000.0;
        (secs / 60.0).max(0.0)
    }
}
