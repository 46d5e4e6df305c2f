use std::path::Path;

use aoshell_coverage::EstimatorConfig;
use aoshell_kernel::KernelConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::scenario::{Scenario, ScenarioSet};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to parse config RON: {0}")]
    ConfigParseError(String),
    #[error("Failed to parse scenarios RON: {0}")]
    ScenarioParseError(String),
    #[error("Failed to read {path}: {message}")]
    ReadError { path: String, message: String },
}

/// Top-level settings file: estimator bounds plus kernel generation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AoShellConfig {
    #[serde(default)]
    pub estimator: EstimatorConfig,
    #[serde(default)]
    pub kernel: KernelConfig,
}

/// Settings bundled with the crate, used when no file is given.
pub const DEFAULT_CONFIG_RON: &str = include_str!("../../../data/config/default.ron");

/// Reference scenarios bundled with the crate.
pub const REFERENCE_SCENARIOS_RON: &str = include_str!("../../../data/scenarios/reference.ron");

/// Edge-case scenarios bundled with the crate.
pub const EDGE_CASE_SCENARIOS_RON: &str = include_str!("../../../data/scenarios/edge_cases.ron");

/// Parse a settings RON string.
pub fn load_config_from_str(ron_str: &str) -> Result<AoShellConfig, LoadError> {
    let options = ron::Options::default();
    options
        .from_str(ron_str)
        .map_err(|e| LoadError::ConfigParseError(e.to_string()))
}

/// Parse the bundled default settings.
pub fn load_default_config() -> Result<AoShellConfig, LoadError> {
    load_config_from_str(DEFAULT_CONFIG_RON)
}

/// Parse a single scenarios RON string into a ScenarioSet.
pub fn load_scenarios_from_str(ron_str: &str) -> Result<ScenarioSet, LoadError> {
    let options = ron::Options::default();
    let scenarios: Vec<Scenario> = options
        .from_str(ron_str)
        .map_err(|e| LoadError::ScenarioParseError(e.to_string()))?;
    Ok(ScenarioSet { scenarios })
}

/// Load and merge multiple scenario sources into a single ScenarioSet.
pub fn load_all_scenarios(sources: &[&str]) -> Result<ScenarioSet, LoadError> {
    let mut all_scenarios = Vec::new();
    for source in sources {
        let set = load_scenarios_from_str(source)?;
        all_scenarios.extend(set.scenarios);
    }
    Ok(ScenarioSet {
        scenarios: all_scenarios,
    })
}

/// Parse every bundled scenario file.
pub fn load_bundled_scenarios() -> Result<ScenarioSet, LoadError> {
    load_all_scenarios(&[REFERENCE_SCENARIOS_RON, EDGE_CASE_SCENARIOS_RON])
}

fn read_file(path: &Path) -> Result<String, LoadError> {
    std::fs::read_to_string(path).map_err(|e| LoadError::ReadError {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Read and parse a settings file.
pub fn load_config_file(path: &Path) -> Result<AoShellConfig, LoadError> {
    let contents = read_file(path)?;
    let config = load_config_from_str(&contents)?;
    log::info!("Loaded config from {}", path.display());
    Ok(config)
}

/// Read and parse a scenarios file.
pub fn load_scenario_file(path: &Path) -> Result<ScenarioSet, LoadError> {
    let contents = read_file(path)?;
    let set = load_scenarios_from_str(&contents)?;
    log::info!("Loaded {} scenarios from {}", set.len(), path.display());
    Ok(set)
}
