use serde::{Deserialize, Serialize};

use crate::{IncidentId, Urgency};

/// One escalation the engine has decided to apply. Transient: only its
/// effect (the urgency write plus one history event) persists.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct EscalationDecision {
    pub id: IncidentId,
    pub prior: Urgency,
    pub target: Urgency,
    pub elapsed_min: f64,
    pub reason: String,
}
