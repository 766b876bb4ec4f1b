//! Scenario runner – execute scripted conversion checks from YAML files.

use crate::commands::CommandRegistry;
use crate::engine::ConversionEngine;
use crate::types::*;

/// Load a scenario from a YAML string.
pub fn load_scenario(yaml: &str) -> Result<Scenario, String> {
    serde_yaml::from_str(yaml).map_err(|e| format!("failed to parse scenario YAML: {}", e))
}

/// Execute a scenario step by step and return the overall result.
///
/// A step fails when its status differs from `expect_status`, or when
/// `expect_value` is set and `data.value` is missing or off by more than
/// `tolerance`.
pub async fn run_scenario(
    scenario: &Scenario,
    engine: &ConversionEngine,
    registry: &CommandRegistry,
) -> ScenarioResult {
    let mut step_results = Vec::with_capacity(scenario.steps.len());
    let mut overall = Status::Pass;

    for (i, step) in scenario.steps.iter().enumerate() {
        let r = registry.execute(&step.call, step.args.clone(), engine).await;

        if r.status != step.expect_status {
            tracing::warn!(
                step = i,
                call = %step.call,
                expected = step.expect_status.as_str(),
                actual = r.status.as_str(),
                "scenario step status mismatch"
            );
            overall = Status::Fail;
        } else if let Some(expected) = step.expect_value {
            let actual = r
                .data
                .as_ref()
                .and_then(|d| d.get("value"))
                .and_then(|v| v.as_f64());
            let within = actual.is_some_and(|a| (a - expected).abs() <= step.tolerance);
            if !within {
                tracing::warn!(
                    step = i,
                    call = %step.call,
                    expected,
                    actual = ?actual,
                    tolerance = step.tolerance,
                    "scenario step value mismatch"
                );
                overall = Status::Fail;
            }
        }
        step_results.push(r);
    }

    ScenarioResult {
        name: scenario.name.clone(),
        overall_status: overall,
        step_results,
    }
}
