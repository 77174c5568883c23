//! Scripted replay of toast traffic against a manual clock.
//!
//! A scenario is a TOML file of timed steps:
//!
//! ```toml
//! name = "double save"
//! until = 3000
//!
//! [[step]]
//! at = 0
//! action = "request"
//! label = "saved"
//! message = "Saved"
//! position = "top"
//! duration = 2000
//!
//! [[step]]
//! at = 500
//! action = "pause"
//! toast = "saved"
//! ```
//!
//! Steps run in order at their `at` time; every wakeup due in between fires
//! at its own deadline. The report lists what each step returned, every
//! engine event and the final records per position.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::ToastEngine;
use crate::error::ScenarioError;
use crate::events::ToastEvent;
use crate::storage::Config;
use crate::timer::ManualClock;
use crate::toast::{Position, ToastId, ToastKind, ToastPatch, ToastRequest, ToastView};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepAction {
    Request,
    Update,
    Dismiss,
    UserDismiss,
    Pause,
    Resume,
    /// Document went to the background.
    Hide,
    /// Document came back to the foreground.
    Show,
    ClearAll,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    pub at: u64,
    pub action: StepAction,
    /// Target of non-request steps: a request label or a raw id like `t1`.
    #[serde(default)]
    pub toast: Option<String>,
    /// Name later steps use to refer to the toast a request returned.
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub kind: Option<ToastKind>,
    #[serde(default)]
    pub position: Option<Position>,
    #[serde(default)]
    pub duration: Option<u64>,
    #[serde(default)]
    pub variant: Option<String>,
    #[serde(default)]
    pub dismissible: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: Option<String>,
    /// Engine configuration for this run; the caller's is used when absent.
    #[serde(default)]
    pub config: Option<Config>,
    /// Keep running until this time after the last step.
    #[serde(default)]
    pub until: Option<u64>,
    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepOutcome {
    pub index: usize,
    pub at: u64,
    pub action: StepAction,
    pub toast: Option<ToastId>,
    /// What the operation returned: `false` for refused or no-op calls.
    pub accepted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioReport {
    pub name: Option<String>,
    pub generated_at: DateTime<Utc>,
    pub ended_at: u64,
    pub steps: Vec<StepOutcome>,
    pub events: Vec<ToastEvent>,
    pub top: Vec<ToastView>,
    pub bottom: Vec<ToastView>,
}

impl ScenarioReport {
    pub fn final_views(&self, position: Position) -> &[ToastView] {
        match position {
            Position::Top => &self.top,
            Position::Bottom => &self.bottom,
        }
    }
}

impl Scenario {
    /// # Errors
    ///
    /// Returns `ScenarioError::ParseFailed` for invalid TOML or unknown
    /// actions, kinds or positions.
    pub fn parse(source: &str) -> Result<Self, ScenarioError> {
        Ok(toml::from_str(source)?)
    }

    /// Replays the steps against a fresh engine on a manual clock.
    ///
    /// `until`, when given, overrides the scenario's own end time.
    ///
    /// # Errors
    ///
    /// Returns `ScenarioError::InvalidConfig` if the configuration in effect
    /// fails validation, `ScenarioError::OutOfOrder` if step times decrease and
    /// `ScenarioError::UnknownLabel` if a step targets a label no earlier
    /// request defined and that is not a toast id either.
    pub fn run(&self, config: &Config, until: Option<u64>) -> Result<ScenarioReport, ScenarioError> {
        let config = self.config.clone().unwrap_or_else(|| config.clone());
        config.validate()?;
        let mut engine = ToastEngine::with_clock(config, ManualClock::new());
        let mut labels: HashMap<String, ToastId> = HashMap::new();
        let mut outcomes = Vec::with_capacity(self.steps.len());
        let mut previous = 0;

        for (index, step) in self.steps.iter().enumerate() {
            if step.at < previous {
                return Err(ScenarioError::OutOfOrder {
                    index,
                    at: step.at,
                    previous,
                });
            }
            previous = step.at;
            engine.advance_to(step.at);
            outcomes.push(apply_step(&mut engine, &mut labels, index, step)?);
        }

        let ended_at = until.or(self.until).unwrap_or(previous).max(previous);
        engine.advance_to(ended_at);

        Ok(ScenarioReport {
            name: self.name.clone(),
            generated_at: Utc::now(),
            ended_at,
            steps: outcomes,
            events: engine.drain_events(),
            top: engine.snapshot(Position::Top),
            bottom: engine.snapshot(Position::Bottom),
        })
    }
}

fn apply_step(
    engine: &mut ToastEngine<ManualClock>,
    labels: &mut HashMap<String, ToastId>,
    index: usize,
    step: &Step,
) -> Result<StepOutcome, ScenarioError> {
    let target = |labels: &HashMap<String, ToastId>| resolve(labels, index, step.toast.as_deref());

    let (toast, accepted) = match step.action {
        StepAction::Request => {
            let id = engine.request(ToastRequest {
                message: step.message.clone(),
                kind: step.kind.unwrap_or_default(),
                position: step.position,
                duration: step.duration,
                variant_id: step.variant.clone(),
                dismissible: step.dismissible,
                ..ToastRequest::default()
            });
            if let Some(label) = &step.label {
                labels.insert(label.clone(), id);
            }
            (Some(id), true)
        }
        StepAction::Update => {
            let id = target(labels)?;
            let patch = ToastPatch {
                message: step.message.clone(),
                kind: step.kind,
                duration: step.duration,
                dismissible: step.dismissible,
            };
            (Some(id), engine.update(id, patch))
        }
        StepAction::Dismiss => {
            let id = target(labels)?;
            (Some(id), engine.dismiss(id))
        }
        StepAction::UserDismiss => {
            let id = target(labels)?;
            (Some(id), engine.dismiss_by_user(id))
        }
        StepAction::Pause => {
            let id = target(labels)?;
            (Some(id), engine.pause(id))
        }
        StepAction::Resume => {
            let id = target(labels)?;
            (Some(id), engine.resume(id))
        }
        StepAction::Hide => {
            engine.set_document_visible(false);
            (None, true)
        }
        StepAction::Show => {
            engine.set_document_visible(true);
            (None, true)
        }
        StepAction::ClearAll => (None, engine.clear_all() > 0),
    };

    Ok(StepOutcome {
        index,
        at: step.at,
        action: step.action,
        toast,
        accepted,
    })
}

fn resolve(
    labels: &HashMap<String, ToastId>,
    index: usize,
    target: Option<&str>,
) -> Result<ToastId, ScenarioError> {
    let target = target.unwrap_or_default();
    labels
        .get(target)
        .copied()
        .or_else(|| target.parse().ok())
        .ok_or_else(|| ScenarioError::UnknownLabel {
            index,
            label: target.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;

    const DOUBLE_SAVE: &str = r#"
name = "double save"
until = 3000

[[step]]
at = 0
action = "request"
label = "saved"
message = "Saved"
kind = "success"
position = "top"
duration = 2000

[[step]]
at = 0
action = "request"
message = "Saved"
kind = "success"
position = "top"
duration = 2000
"#;

    #[test]
    fn replays_merge_scenario() {
        let scenario = Scenario::parse(DOUBLE_SAVE).unwrap();
        let report = scenario.run(&Config::default(), None).unwrap();

        assert_eq!(report.name.as_deref(), Some("double save"));
        assert_eq!(report.steps[0].toast, report.steps[1].toast);
        assert_eq!(report.ended_at, 3000);
        assert!(report.top.is_empty());
        assert!(report.events.iter().any(|e| matches!(
            e,
            ToastEvent::Merged {
                update_count: 1,
                ..
            }
        )));
    }

    #[test]
    fn until_override_stops_early() {
        let scenario = Scenario::parse(DOUBLE_SAVE).unwrap();
        let report = scenario.run(&Config::default(), Some(1000)).unwrap();
        assert_eq!(report.top.len(), 1);
        assert_eq!(report.top[0].remaining, 1000);
        assert_eq!(report.final_views(Position::Top)[0].update_count, 1);
    }

    #[test]
    fn labels_and_raw_ids_resolve() {
        let scenario = Scenario::parse(
            r#"
[[step]]
at = 0
action = "request"
label = "a"
message = "A"

[[step]]
at = 10
action = "pause"
toast = "a"

[[step]]
at = 20
action = "dismiss"
toast = "t1"
"#,
        )
        .unwrap();
        let report = scenario.run(&Config::default(), None).unwrap();
        assert!(report.steps.iter().all(|s| s.accepted));
        assert_eq!(report.bottom.len(), 1);
        assert!(report.bottom[0].removed);
    }

    #[test]
    fn unknown_label_is_an_error() {
        let scenario = Scenario::parse(
            r#"
[[step]]
at = 0
action = "dismiss"
toast = "nope"
"#,
        )
        .unwrap();
        assert!(matches!(
            scenario.run(&Config::default(), None),
            Err(ScenarioError::UnknownLabel { index: 0, .. })
        ));
    }

    #[test]
    fn steps_must_be_chronological() {
        let scenario = Scenario::parse(
            r#"
[[step]]
at = 100
action = "hide"

[[step]]
at = 50
action = "show"
"#,
        )
        .unwrap();
        assert!(matches!(
            scenario.run(&Config::default(), None),
            Err(ScenarioError::OutOfOrder { index: 1, .. })
        ));
    }

    #[test]
    fn unknown_action_fails_to_parse() {
        assert!(Scenario::parse("[[step]]\nat = 0\naction = \"explode\"\n").is_err());
    }

    #[test]
    fn invalid_scenario_config_is_rejected() {
        for table in [
            "[config.timing]\ndefault_duration_ms = 0\n",
            "[config.timing]\ngrace_delay_ms = 259200000\n",
        ] {
            let scenario = Scenario::parse(&format!(
                "{table}\n[[step]]\nat = 0\naction = \"request\"\nmessage = \"x\"\n"
            ))
            .unwrap();
            assert!(matches!(
                scenario.run(&Config::default(), None),
                Err(ScenarioError::InvalidConfig(ConfigError::InvalidValue { .. }))
            ));
        }
    }

    #[test]
    fn scenario_config_overrides_caller_config() {
        let scenario = Scenario::parse(
            r#"
[config.timing]
default_duration_ms = 100

[[step]]
at = 0
action = "request"
message = "quick"
"#,
        )
        .unwrap();
        let report = scenario.run(&Config::default(), Some(100)).unwrap();
        assert!(report.bottom[0].removed);
    }
}
