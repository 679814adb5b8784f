use chrono::{TimeZone, Utc};
use sla_core::{
    evaluate, summarize, EscalationDecision, HistoryEvent, Incident, IncidentId, ItemOutcome,
    PolicyConfig, Urgency, WireIncident,
};

fn wire(id: &str, created_at: &str, urgency: &str, status: &str) -> WireIncident {
    WireIncident {
        id: id.to_string(),
        created_at: created_at.to_string(),
        urgency: urgency.to_string(),
        status: status.to_string(),
        area: Some("general".to_string()),
        kind: Some("infraestructura".to_string()),
        location: Some("pabellon A".to_string()),
        history: vec![],
    }
}

#[test]
fn parse_then_evaluate_full_path() {
    let now = Utc.with_ymd_and_hms(2025, 11, 20, 13, 15, 0).unwrap();
    let inc = Incident::parse(&wire("INC_1", "2025-11-20T12:00:00Z", "high", "pending")).unwrap();
    let elapsed = inc.elapsed_minutes(now);
    assert!((elapsed - 75.0).abs() < 1e-9);

    let (target, reason) = evaluate(&PolicyConfig::default(), inc.urgency, elapsed).unwrap();
    assert_eq!(target, Urgency::Critical);
    assert!(reason.contains(">1 hora sin resolver"));
}

#[test]
fn decision_serializes_for_reports() {
    let d = EscalationDecision {
        id: IncidentId::from_str("INC_1"),
        prior: Urgency::Low,
        target: Urgency::Medium,
        elapsed_min: 250.0,
        reason: "Escalado: >4 horas sin resolver (tiempo: 250 min)".to_string(),
    };
    let v = serde_json::to_value(&d).unwrap();
    assert_eq!(v["id"], "INC_1");
    assert_eq!(v["prior"], "low");
    assert_eq!(v["target"], "medium");
}

#[test]
fn summary_of_mixed_outcomes() {
    let run_at = Utc.with_ymd_and_hms(2025, 11, 20, 13, 15, 0).unwrap();
    let outcomes = vec![
        ItemOutcome::Escalated(EscalationDecision {
            id: IncidentId::from_str("INC_1"),
            prior: Urgency::High,
            target: Urgency::Critical,
            elapsed_min: 75.0,
            reason: "r".to_string(),
        }),
        ItemOutcome::NotDue { id: IncidentId::from_str("INC_2") },
        ItemOutcome::SkippedMalformed { id: "INC_3".to_string(), error: "bad".to_string() },
    ];
    let s = summarize(run_at, &outcomes);
    assert_eq!(s.considered, 2);
    assert_eq!(s.escalated_total(), 1);
    assert_eq!(s.by_urgency.critical, 1);
    assert_eq!(s.malformed, 1);
}

#[test]
fn wire_record_round_trips_history_through_json() {
    let mut w = wire("INC_9", "2025-11-20T12:00:00Z", "low", "pending");
    let manual: HistoryEvent = serde_json::from_str(
        r#"{"action":"created","at":"2025-11-20T12:00:00Z","user":"ops@utec.edu.pe"}"#,
    )
    .unwrap();
    w.history.push(manual);
    let json = serde_json::to_string(&w).unwrap();
    let back: WireIncident = serde_json::from_str(&json).unwrap();
    assert_eq!(back.history.len(), 1);
    assert_eq!(back.history[0].detail["user"], "ops@utec.edu.pe");
}
