use aoshell_core::{Crossing, SamplingWindow};
use aoshell_coverage::CoverageEstimator;
use serde::{Deserialize, Serialize};

/// Absolute tolerance when comparing a scenario's expected visible length.
pub const SCENARIO_TOLERANCE: f32 = 1e-5;

/// How a scenario spells its sampling window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ScenarioWindow {
    /// `[ray_length - radius, ray_length]`.
    Ray { ray_length: f32, radius: f32 },
    Span { start: f32, end: f32 },
}

impl From<ScenarioWindow> for SamplingWindow {
    fn from(window: ScenarioWindow) -> Self {
        match window {
            ScenarioWindow::Ray { ray_length, radius } => {
                SamplingWindow::from_ray(ray_length, radius)
            }
            ScenarioWindow::Span { start, end } => SamplingWindow::new(start, end),
        }
    }
}

/// One crossing sequence with its known visible length.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub crossings: Vec<Crossing>,
    pub window: ScenarioWindow,
    /// Expected visible length of the window.
    pub expected: f32,
}

#[derive(Debug, Clone, Default)]
pub struct ScenarioSet {
    pub scenarios: Vec<Scenario>,
}

impl ScenarioSet {
    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }
}

/// Outcome of running one scenario through an estimator.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioOutcome {
    pub name: String,
    pub expected: f32,
    pub actual: f32,
}

impl ScenarioOutcome {
    pub fn passed(&self) -> bool {
        (self.actual - self.expected).abs() <= SCENARIO_TOLERANCE
    }
}

/// Evaluate every scenario and report expected vs. actual visible length.
pub fn check_scenarios(estimator: &CoverageEstimator, set: &ScenarioSet) -> Vec<ScenarioOutcome> {
    set.scenarios
        .iter()
        .map(|s| {
            let sample = estimator.evaluate(&s.crossings, s.window.into());
            ScenarioOutcome {
                name: s.name.clone(),
                expected: s.expected,
                actual: sample.visible,
            }
        })
        .collect()
}

/// Number of failed outcomes, each logged at error level.
pub fn report_failures(outcomes: &[ScenarioOutcome]) -> usize {
    let mut failures = 0;
    for outcome in outcomes.iter().filter(|o| !o.passed()) {
        log::error!(
            "Scenario '{}': expected {}, got {}",
            outcome.name,
            outcome.expected,
            outcome.actual
        );
        failures += 1;
    }
    failures
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::{load_all_scenarios, load_scenarios_from_str};
    use aoshell_coverage::EstimatorConfig;

    #[test]
    fn test_window_spec_forms_agree() {
        let a: SamplingWindow = ScenarioWindow::Ray {
            ray_length: 4.0,
            radius: 2.0,
        }
        .into();
        let b: SamplingWindow = ScenarioWindow::Span { start: 2.0, end: 4.0 }.into();
        assert_eq!(a, b);
    }

    #[test]
    fn test_reference_scenarios_pass() {
        let reference = include_str!("../../../data/scenarios/reference.ron");
        let set = load_scenarios_from_str(reference).expect("should parse reference.ron");
        assert_eq!(set.len(), 9);

        let outcomes = check_scenarios(&CoverageEstimator::default(), &set);
        for outcome in &outcomes {
            assert!(
                outcome.passed(),
                "scenario '{}': expected {}, got {}",
                outcome.name,
                outcome.expected,
                outcome.actual
            );
        }
        assert_eq!(report_failures(&outcomes), 0);
    }

    #[test]
    fn test_edge_case_scenarios_pass() {
        let reference = include_str!("../../../data/scenarios/reference.ron");
        let edge = include_str!("../../../data/scenarios/edge_cases.ron");
        let set = load_all_scenarios(&[reference, edge]).expect("should merge");
        assert!(set.len() > 9);

        // A bound larger than any scenario must not change results
        let estimator = CoverageEstimator::new(EstimatorConfig {
            max_crossings: Some(16),
        });
        let outcomes = check_scenarios(&estimator, &set);
        assert_eq!(report_failures(&outcomes), 0);
    }

    #[test]
    fn test_failure_reported() {
        let set = load_scenarios_from_str(
            r#"[(name: "wrong", crossings: [], window: Span(start: 0.0, end: 1.0), expected: 0.5)]"#,
        )
        .expect("should parse");
        let outcomes = check_scenarios(&CoverageEstimator::default(), &set);
        assert!(!outcomes[0].passed());
        assert_eq!(report_failures(&outcomes), 1);
    }
}
