use std::path::PathBuf;

use clap::Args;
use toastline_core::{Config, Position, Scenario, ScenarioReport, ToastEvent};

#[derive(Args)]
pub struct SimulateArgs {
    /// Scenario file (TOML, one `[[step]]` table per action)
    file: PathBuf,
    /// Keep running until this engine time in ms, overriding the script
    #[arg(long)]
    until: Option<u64>,
    /// Print the full report as JSON
    #[arg(long)]
    json: bool,
    /// Pretty-print JSON output
    #[arg(long, requires = "json")]
    pretty: bool,
}

pub fn run(args: SimulateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let source = std::fs::read_to_string(&args.file)
        .map_err(|e| format!("cannot read {}: {e}", args.file.display()))?;
    let scenario = Scenario::parse(&source)?;
    let config = Config::load()?;
    tracing::debug!(steps = scenario.steps.len(), file = %args.file.display(), "running scenario");

    let report = scenario.run(&config, args.until)?;

    if args.json {
        let json = if args.pretty {
            serde_json::to_string_pretty(&report)?
        } else {
            serde_json::to_string(&report)?
        };
        println!("{json}");
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &ScenarioReport) {
    let name = report.name.as_deref().unwrap_or("scenario");
    println!(
        "{name} ({} steps, ran to {}ms, {})",
        report.steps.len(),
        report.ended_at,
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    for event in &report.events {
        let id = event
            .toast_id()
            .map(|id| id.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("{:>8}ms  {id:<4} {}", event.at(), describe(event));
    }
    for position in Position::ALL {
        let views = report.final_views(position);
        if views.is_empty() {
            println!("{position}: empty");
            continue;
        }
        for view in views {
            let state = if view.removed {
                "removed"
            } else if !view.visible {
                "suspended"
            } else if view.paused {
                "paused"
            } else {
                "visible"
            };
            println!(
                "{position}: {} [{}] {state}, {}ms left \"{}\"",
                view.id,
                view.kind,
                view.remaining,
                view.label()
            );
        }
    }
}

fn describe(event: &ToastEvent) -> String {
    match event {
        ToastEvent::Created {
            position,
            kind,
            duration,
            ..
        } => format!("created {kind} at {position}, {duration}ms"),
        ToastEvent::Merged {
            update_count,
            duration,
            ..
        } => format!("merged, update {update_count}, {duration}ms"),
        ToastEvent::Updated { .. } => "updated".to_string(),
        ToastEvent::Suspended { by, remaining, .. } => {
            format!("suspended by {by}, {remaining}ms left")
        }
        ToastEvent::Revived { remaining, .. } => format!("revived, {remaining}ms left"),
        ToastEvent::Paused {
            reason, remaining, ..
        } => format!("paused ({reason:?}), {remaining}ms left").to_lowercase(),
        ToastEvent::Resumed { remaining, .. } => format!("resumed, {remaining}ms left"),
        ToastEvent::Dismissed { reason, .. } => format!("dismissed ({reason:?})").to_lowercase(),
        ToastEvent::Cleared { count, .. } => format!("cleared {count}"),
        ToastEvent::Deleted { .. } => "deleted".to_string(),
        ToastEvent::StaleTimerIgnored { .. } => "stale timer ignored".to_string(),
        ToastEvent::DocumentVisibility { visible, .. } => {
            if *visible {
                "document visible".to_string()
            } else {
                "document hidden".to_string()
            }
        }
    }
}
