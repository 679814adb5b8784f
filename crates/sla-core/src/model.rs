use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Severity classification of an incident. The ordering is load-bearing:
/// the engine only ever moves urgency forward along it.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Low,
    Medium,
    High,
    Critical,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Low => "low",
            Urgency::Medium => "medium",
            Urgency::High => "high",
            Urgency::Critical => "critical",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "low" => Some(Urgency::Low),
            "medium" => Some(Urgency::Medium),
            "high" => Some(Urgency::High),
            "critical" => Some(Urgency::Critical),
            _ => None,
        }
    }

    /// Next level up, or `None` at `Critical` (terminal).
    pub fn next(&self) -> Option<Self> {
        match self {
            Urgency::Low => Some(Urgency::Medium),
            Urgency::Medium => Some(Urgency::High),
            Urgency::High => Some(Urgency::Critical),
            Urgency::Critical => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IncidentStatus {
    Pending,
    InProgress,
    Resolved,
    Cancelled,
}

impl IncidentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            IncidentStatus::Pending => "pending",
            IncidentStatus::InProgress => "in_progress",
            IncidentStatus::Resolved => "resolved",
            IncidentStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(IncidentStatus::Pending),
            "in_progress" => Some(IncidentStatus::InProgress),
            "resolved" => Some(IncidentStatus::Resolved),
            "cancelled" => Some(IncidentStatus::Cancelled),
            _ => None,
        }
    }

    /// Resolved and cancelled incidents are out of the engine's scope.
    pub fn is_open(&self) -> bool {
        !matches!(self, IncidentStatus::Resolved | IncidentStatus::Cancelled)
    }
}

/// One append-only audit record on an incident.
///
/// `detail` is a flattened map so that action-specific fields written by
/// other actors (manual status changes, reporter info, ...) survive a
/// read-modify-write of the history intact.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct HistoryEvent {
    pub action: String,
    pub at: String,
    #[serde(flatten)]
    pub detail: serde_json::Map<String, serde_json::Value>,
}

pub const ACTION_AUTOMATIC_ESCALATION: &str = "automatic_escalation";

impl HistoryEvent {
    /// Audit record for one automatic escalation. The `automatic` flag
    /// distinguishes these from manual urgency changes.
    pub fn automatic_escalation(
        at: DateTime<Utc>,
        prior: Urgency,
        new: Urgency,
        reason: &str,
    ) -> Self {
        let mut detail = serde_json::Map::new();
        detail.insert("prior_urgency".into(), prior.as_str().into());
        detail.insert("new_urgency".into(), new.as_str().into());
        detail.insert("reason".into(), reason.into());
        detail.insert("automatic".into(), true.into());
        Self {
            action: ACTION_AUTOMATIC_ESCALATION.to_string(),
            at: at.to_rfc3339(),
            detail,
        }
    }

    pub fn is_automatic_escalation(&self) -> bool {
        self.action == ACTION_AUTOMATIC_ESCALATION
    }
}
