use serde::{Deserialize, Serialize};

use crate::Urgency;

/// SLA thresholds in minutes, one per forward transition. Passed in
/// explicitly; there is no process-global configuration.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct PolicyConfig {
    pub low_to_medium_min: f64,
    pub medium_to_high_min: f64,
    pub high_to_critical_min: f64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            low_to_medium_min: 240.0,
            medium_to_high_min: 120.0,
            high_to_critical_min: 60.0,
        }
    }
}

impl PolicyConfig {
    fn threshold_for(&self, urgency: Urgency) -> Option<f64> {
        match urgency {
            Urgency::Low => Some(self.low_to_medium_min),
            Urgency::Medium => Some(self.medium_to_high_min),
            Urgency::High => Some(self.high_to_critical_min),
            Urgency::Critical => None,
        }
    }
}

/// Decide whether an incident at `urgency`, unresolved for `elapsed_min`
/// minutes, must escalate. Pure; evaluates a single step only — an incident
/// far past several thresholds still moves one level and is picked up again
/// by the next run. Critical never escalates further.
pub fn evaluate(cfg: &PolicyConfig, urgency: Urgency, elapsed_min: f64) -> Option<(Urgency, String)> {
    let threshold = cfg.threshold_for(urgency)?;
    if elapsed_min < threshold {
        return None;
    }
    let target = urgency.next()?;
    let reason = match target {
        Urgency::Critical => format!(
            "Escalado a CRÍTICO: >{} sin resolver (tiempo: {:.0} min)",
            spanish_duration(threshold),
            elapsed_min
        ),
        _ => format!(
            "Escalado: >{} sin resolver (tiempo: {:.0} min)",
            spanish_duration(threshold),
            elapsed_min
        ),
    };
    Some((target, reason))
}

/// Operator-facing duration text, hours when the threshold is whole hours.
fn spanish_duration(minutes: f64) -> String {
    let m = minutes.round() as i64;
    if m % 60 == 0 && m >= 60 {
        let h = m / 60;
        if h == 1 {
            "1 hora".to_string()
        } else {
            format!("{} horas", h)
        }
    } else {
        format!("{} min", m)
    }
}
