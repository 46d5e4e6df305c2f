//! RON settings and scenario loading for the coverage estimator and AO kernel.

pub mod loader;
pub mod scenario;
pub mod validator;

pub use loader::{
    load_all_scenarios, load_bundled_scenarios, load_config_file, load_config_from_str,
    load_default_config, load_scenario_file, load_scenarios_from_str, AoShellConfig, LoadError,
};
pub use scenario::{
    check_scenarios, report_failures, Scenario, ScenarioOutcome, ScenarioSet, ScenarioWindow,
};
pub use validator::{validate_config, validate_scenarios, ValidationError};
