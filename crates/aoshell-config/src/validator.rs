use std::collections::HashSet;

use aoshell_core::constants::{COVERAGE_EPSILON, MAX_BUFFER_CROSSINGS, MAX_KERNEL_SIZE};
use aoshell_core::SamplingWindow;
use thiserror::Error;

use crate::loader::AoShellConfig;
use crate::scenario::ScenarioSet;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("max_crossings {value} outside 1..={max}")]
    MaxCrossingsOutOfRange { value: u32, max: u32 },
    #[error("Kernel size {value} outside 1..={max}")]
    KernelSizeOutOfRange { value: u32, max: u32 },
    #[error("Noise texture size {width}x{height} has a zero dimension")]
    EmptyNoiseTexture { width: u32, height: u32 },
    #[error("Duplicate scenario name '{0}'")]
    DuplicateScenario(String),
    #[error("Scenario '{name}' has an empty or inverted window [{start}, {end}]")]
    InvalidWindow { name: String, start: f32, end: f32 },
    #[error("Scenario '{name}' expects {expected}, outside [0, {length}]")]
    ExpectedOutOfRange {
        name: String,
        expected: f32,
        length: f32,
    },
}

/// Validate estimator and kernel settings.
pub fn validate_config(config: &AoShellConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Some(value) = config.estimator.max_crossings {
        if value == 0 || value > MAX_BUFFER_CROSSINGS {
            errors.push(ValidationError::MaxCrossingsOutOfRange {
                value,
                max: MAX_BUFFER_CROSSINGS,
            });
        }
    }

    let kernel = &config.kernel;
    if kernel.size == 0 || kernel.size > MAX_KERNEL_SIZE {
        errors.push(ValidationError::KernelSizeOutOfRange {
            value: kernel.size,
            max: MAX_KERNEL_SIZE,
        });
    }
    let (width, height) = kernel.noise_size;
    if width == 0 || height == 0 {
        errors.push(ValidationError::EmptyNoiseTexture { width, height });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate a scenario set: unique names, usable windows, and expectations
/// that a visible length could actually take.
pub fn validate_scenarios(set: &ScenarioSet) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let mut seen_names = HashSet::new();
    for scenario in &set.scenarios {
        if !seen_names.insert(scenario.name.as_str()) {
            errors.push(ValidationError::DuplicateScenario(scenario.name.clone()));
        }
    }

    for scenario in &set.scenarios {
        let window: SamplingWindow = scenario.window.into();
        if !window.is_valid() {
            errors.push(ValidationError::InvalidWindow {
                name: scenario.name.clone(),
                start: window.start,
                end: window.end,
            });
            continue;
        }

        let length = window.length();
        if !(-COVERAGE_EPSILON..=length + COVERAGE_EPSILON).contains(&scenario.expected) {
            errors.push(ValidationError::ExpectedOutOfRange {
                name: scenario.name.clone(),
                expected: scenario.expected,
                length,
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
