use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use sla_core::{HistoryEvent, Incident, IncidentId, IncidentStatus, Urgency, WireIncident};
use sla_engine::{ClockSource, Config, EscalationEngine, SystemClock};
use sla_store::IncidentRepository;
use sla_store_sqlite::SqliteRepository;

#[derive(Parser)]
#[command(name = "sla", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Initialize the SLA engine in the current directory (creates .sla/, config, db)
    Init,

    /// Seed an incident into the store
    IncidentAdd {
        #[arg(long)]
        id: Option<String>,
        #[arg(long, default_value = "low")]
        urgency: String,
        #[arg(long, default_value = "pending")]
        status: String,
        /// Back-date the incident by this many minutes
        #[arg(long, default_value_t = 0)]
        age_min: i64,
        #[arg(long)]
        area: Option<String>,
        #[arg(long)]
        kind: Option<String>,
        #[arg(long)]
        location: Option<String>,
    },

    /// List open incidents with age and urgency
    Status,

    /// Execute one escalation run (what the scheduler invokes on a cadence)
    Run {
        /// Print would-be decisions without writing anything
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let cli = Cli::parse();
    let root = std::env::current_dir()?;

    match cli.cmd {
        Command::Init => {
            let cfg_path = Config::config_path(&root);
            if !cfg_path.exists() {
                Config::default().save_to(&cfg_path)?;
            }
            let _ = SqliteRepository::open(&Config::db_path(&root))?;
            println!("Initialized SLA engine in {}", root.display());
        }
        Command::IncidentAdd { id, urgency, status, age_min, area, kind, location } => {
            Urgency::parse(&urgency).ok_or_else(|| anyhow!("unknown urgency {urgency:?}"))?;
            IncidentStatus::parse(&status).ok_or_else(|| anyhow!("unknown status {status:?}"))?;

            let repo = open_repo(&root)?;
            let id = id.unwrap_or_else(|| IncidentId::new().0);
            let created_at = (Utc::now() - Duration::minutes(age_min)).to_rfc3339();
            let mut detail = serde_json::Map::new();
            detail.insert("user".into(), "cli".into());
            repo.insert(WireIncident {
                id: id.clone(),
                created_at: created_at.clone(),
                urgency,
                status,
                area,
                kind,
                location,
                history: vec![HistoryEvent {
                    action: "created".to_string(),
                    at: created_at,
                    detail,
                }],
            })?;
            println!("Added incident {id}");
        }
        Command::Status => {
            let repo = open_repo(&root)?;
            let now = SystemClock.now();
            let rows = repo.list_open()?;
            println!("Open incidents: {}", rows.len());
            for row in rows {
                match Incident::parse(&row) {
                    Ok(inc) => println!(
                        "- {} [{}] {} ({:.0} min, {} events)",
                        inc.id.as_str(),
                        inc.urgency.as_str(),
                        inc.status.as_str(),
                        inc.elapsed_minutes(now),
                        inc.history.len()
                    ),
                    Err(err) => println!("- {} MALFORMED: {err}", row.id),
                }
            }
        }
        Command::Run { dry_run } => {
            let cfg_path = Config::config_path(&root);
            let cfg = if cfg_path.exists() { Config::load_from(&cfg_path)? } else { Config::default() };
            let repo = open_repo(&root)?;
            let engine = EscalationEngine::new(repo, Box::new(SystemClock), cfg.thresholds);

            if dry_run {
                let decisions = engine.preview()?;
                println!("DRY RUN: {} incident(s) would escalate", decisions.len());
                for d in decisions {
                    println!("- {}: {} -> {} ({})", d.id.as_str(), d.prior.as_str(), d.target.as_str(), d.reason);
                }
                return Ok(());
            }

            let summary = engine.run_once()?;
            println!("Run at {}", summary.run_at.to_rfc3339());
            println!("Considered: {}", summary.considered);
            println!("Escalated:  {}", summary.escalated_total());
            println!("  -> medium:   {}", summary.by_urgency.medium);
            println!("  -> high:     {}", summary.by_urgency.high);
            println!("  -> critical: {}", summary.by_urgency.critical);
            if summary.malformed > 0 {
                println!("Malformed (skipped): {}", summary.malformed);
            }
            if summary.conflicts > 0 {
                println!("Conflicts (already handled): {}", summary.conflicts);
            }
            if summary.write_failures > 0 {
                println!("Write failures: {}", summary.write_failures);
            }
            for d in &summary.escalated {
                println!("- {}: {} -> {} | {}", d.id.as_str(), d.prior.as_str(), d.target.as_str(), d.reason);
            }
        }
    }

    Ok(())
}

fn open_repo(root: &Path) -> Result<Arc<dyn IncidentRepository>> {
    Ok(Arc::new(SqliteRepository::open(&Config::db_path(root))?))
}
