use std::path::PathBuf;
use std::process;
use std::time::{SystemTime, UNIX_EPOCH};

use aoshell_bench::report;
use aoshell_bench::runner::BenchmarkRunner;
use aoshell_bench::scenes;
use aoshell_config::{
    check_scenarios, load_bundled_scenarios, load_config_file, load_default_config,
    load_scenario_file, report_failures, validate_config, validate_scenarios,
};
use aoshell_core::constants::DEFAULT_MAX_CROSSINGS;
use aoshell_coverage::CoverageEstimator;
use aoshell_kernel::{generate_kernel, generate_rotation_noise, pack_kernel};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();

    let mut config_path: Option<PathBuf> = None;
    let mut scenarios_path: Option<PathBuf> = None;
    let mut baseline_path: Option<PathBuf> = None;
    let mut output_path: Option<PathBuf> = None;
    let mut regression_threshold = 10.0f64;
    let mut sample_count = 65_536usize;
    let mut frame_count = 60u32;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                i += 1;
                config_path = Some(PathBuf::from(arg_value(&args, i, "--config")));
            }
            "--scenarios" => {
                i += 1;
                scenarios_path = Some(PathBuf::from(arg_value(&args, i, "--scenarios")));
            }
            "--baseline" => {
                i += 1;
                baseline_path = Some(PathBuf::from(arg_value(&args, i, "--baseline")));
            }
            "--output" => {
                i += 1;
                output_path = Some(PathBuf::from(arg_value(&args, i, "--output")));
            }
            "--regression-threshold" => {
                i += 1;
                regression_threshold = parse_arg(&args, i, "--regression-threshold");
            }
            "--samples" => {
                i += 1;
                sample_count = parse_arg(&args, i, "--samples");
            }
            "--frames" => {
                i += 1;
                frame_count = parse_arg(&args, i, "--frames");
            }
            "--help" | "-h" => {
                eprintln!("Usage: bench-runner [OPTIONS]");
                eprintln!("  --config <path>                Estimator/kernel settings RON (default: bundled)");
                eprintln!("  --scenarios <path>             Scenario RON to check (default: bundled)");
                eprintln!("  --samples <n>                  Samples per frame (default: 65536)");
                eprintln!("  --frames <n>                   Frames per scene (default: 60)");
                eprintln!("  --baseline <path>              Load baseline JSON for comparison");
                eprintln!("  --output <path>                Save current results as JSON baseline");
                eprintln!(
                    "  --regression-threshold <pct>   Regression threshold percentage (default: 10)"
                );
                process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                process::exit(1);
            }
        }
        i += 1;
    }

    let config = match &config_path {
        Some(path) => load_config_file(path),
        None => load_default_config(),
    }
    .unwrap_or_else(|e| fail(&format!("Config error: {e}")));

    if let Err(errors) = validate_config(&config) {
        for e in &errors {
            log::error!("Config validation error: {e}");
        }
        fail(&format!("Config validation failed with {} errors", errors.len()));
    }

    let scenario_set = match &scenarios_path {
        Some(path) => load_scenario_file(path),
        None => load_bundled_scenarios(),
    }
    .unwrap_or_else(|e| fail(&format!("Scenario error: {e}")));

    if let Err(errors) = validate_scenarios(&scenario_set) {
        for e in &errors {
            log::error!("Scenario validation error: {e}");
        }
        fail(&format!("Scenario validation failed with {} errors", errors.len()));
    }

    let estimator = CoverageEstimator::new(config.estimator);

    // Conformance check before any timing
    let outcomes = check_scenarios(&estimator, &scenario_set);
    println!("\n## Scenario Conformance\n");
    println!("{}", report::format_conformance(&outcomes));
    let failures = report_failures(&outcomes);
    if failures > 0 {
        fail(&format!(
            "{} of {} scenarios failed, exiting with code 1",
            failures,
            outcomes.len()
        ));
    }

    let kernel = generate_kernel(&config.kernel)
        .unwrap_or_else(|e| fail(&format!("Kernel generation failed: {e}")));
    let (noise_width, noise_height) = config.kernel.noise_size;
    let noise = generate_rotation_noise(noise_width, noise_height, config.kernel.noise_seed)
        .unwrap_or_else(|e| fail(&format!("Noise generation failed: {e}")));
    log::info!(
        "Kernel: {} samples ({} bytes packed), rotation noise {}x{} ({} bytes)",
        kernel.len(),
        std::mem::size_of_val(pack_kernel(&kernel).as_slice()),
        noise.width,
        noise.height,
        noise.bytes().len()
    );

    let stride = config
        .estimator
        .max_crossings
        .unwrap_or(DEFAULT_MAX_CROSSINGS);
    let runner = BenchmarkRunner::new(estimator, kernel, stride, sample_count, frame_count);

    let results: Vec<_> = scenes::standard_scenes()
        .iter()
        .map(|scene| runner.run_scene(scene))
        .collect();

    // Print markdown summary
    println!("\n## Benchmark Results\n");
    println!("{}", report::format_markdown(&results));

    // Save output baseline
    if let Some(ref path) = output_path {
        let baseline = report::Baseline {
            timestamp: timestamp(),
            results: results.clone(),
        };
        match baseline.save(path) {
            Ok(()) => log::info!("Saved baseline to {}", path.display()),
            Err(e) => fail(&format!("Failed to save baseline {}: {e}", path.display())),
        }
    }

    // Compare against baseline
    if let Some(ref path) = baseline_path {
        match report::Baseline::load(path) {
            Ok(baseline) => {
                let regressions = baseline.regressions(&results, regression_threshold);
                println!(
                    "{}",
                    report::format_regressions(&regressions, regression_threshold)
                );
                if !regressions.is_empty() {
                    fail(&format!(
                        "{} regressions detected, exiting with code 1",
                        regressions.len()
                    ));
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::warn!("Baseline file not found: {}", path.display());
            }
            Err(e) => fail(&format!("Failed to read baseline {}: {e}", path.display())),
        }
    }

    log::info!("Benchmark complete.");
}

fn fail(message: &str) -> ! {
    log::error!("{message}");
    process::exit(1);
}

fn arg_value<'a>(args: &'a [String], i: usize, flag: &str) -> &'a str {
    match args.get(i) {
        Some(value) => value,
        None => fail(&format!("Missing value for {flag}")),
    }
}

fn parse_arg<T: std::str::FromStr>(args: &[String], i: usize, flag: &str) -> T {
    let value = arg_value(args, i, flag);
    value
        .parse()
        .unwrap_or_else(|_| fail(&format!("Invalid {flag} value: {value}")))
}

fn timestamp() -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    format!("bench-{secs}")
}
