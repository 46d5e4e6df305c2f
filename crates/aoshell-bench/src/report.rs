use std::path::Path;

use aoshell_config::ScenarioOutcome;

use crate::runner::BenchmarkResult;

/// Saved results of a previous run, keyed by scene name.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Baseline {
    pub timestamp: String,
    pub results: Vec<BenchmarkResult>,
}

/// A scene whose mean frame time grew past the allowed threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct Regression {
    pub scene_name: String,
    pub baseline_ms: f64,
    pub current_ms: f64,
}

impl Regression {
    pub fn pct_change(&self) -> f64 {
        (self.current_ms - self.baseline_ms) / self.baseline_ms * 100.0
    }
}

impl Baseline {
    /// Read a baseline written by `save`. A missing file is `ErrorKind::NotFound`;
    /// malformed JSON is `ErrorKind::InvalidData`.
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        serde_json::from_str(&contents)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    fn find(&self, scene_name: &str) -> Option<&BenchmarkResult> {
        self.results.iter().find(|b| b.scene_name == scene_name)
    }

    /// Scenes in `current` that slowed by more than `threshold_pct` relative
    /// to this baseline. Scenes absent from the baseline, or with a
    /// non-positive baseline mean, are skipped.
    pub fn regressions(&self, current: &[BenchmarkResult], threshold_pct: f64) -> Vec<Regression> {
        current
            .iter()
            .filter_map(|result| {
                let base = self.find(&result.scene_name)?;
                let regression = Regression {
                    scene_name: result.scene_name.clone(),
                    baseline_ms: base.timings.mean_ms,
                    current_ms: result.timings.mean_ms,
                };
                (regression.baseline_ms > 0.0 && regression.pct_change() > threshold_pct)
                    .then_some(regression)
            })
            .collect()
    }
}

/// Format results as a markdown summary table.
pub fn format_markdown(results: &[BenchmarkResult]) -> String {
    let mut out = String::new();
    out.push_str("| Scene | Samples | Crossings | Visibility | Approx | Orphans | Mean (ms) | Median (ms) | P95 (ms) | P99 (ms) | Min (ms) | Max (ms) |\n");
    out.push_str("|-------|---------|-----------|------------|--------|---------|-----------|-------------|----------|----------|----------|----------|\n");

    for r in results {
        out.push_str(&format!(
            "| {} | {} | {} | {:.3} | {} | {} | {:.3} | {:.3} | {:.3} | {:.3} | {:.3} | {:.3} |\n",
            r.scene_name,
            r.samples,
            r.crossings_per_sample,
            r.stats.mean_visibility(),
            r.stats.approximate,
            r.stats.orphan_backs,
            r.timings.mean_ms,
            r.timings.median_ms,
            r.timings.p95_ms,
            r.timings.p99_ms,
            r.timings.min_ms,
            r.timings.max_ms,
        ));
    }

    out
}

/// Format scenario outcomes as a markdown table.
pub fn format_conformance(outcomes: &[ScenarioOutcome]) -> String {
    let mut out = String::new();
    out.push_str("| Scenario | Expected | Actual | Result |\n");
    out.push_str("|----------|----------|--------|--------|\n");

    for o in outcomes {
        out.push_str(&format!(
            "| {} | {:.4} | {:.4} | {} |\n",
            o.name,
            o.expected,
            o.actual,
            if o.passed() { "pass" } else { "FAIL" }
        ));
    }

    out
}

/// Format the baseline comparison as a markdown table, or a one-line
/// all-clear when nothing regressed.
pub fn format_regressions(regressions: &[Regression], threshold_pct: f64) -> String {
    if regressions.is_empty() {
        return format!("No scene slowed by more than {threshold_pct:.0}%.\n");
    }

    let mut out = format!("### Regressions (>{threshold_pct:.0}%)\n\n");
    out.push_str("| Scene | Baseline (ms) | Current (ms) | Change |\n");
    out.push_str("|-------|---------------|--------------|--------|\n");
    for r in regressions {
        out.push_str(&format!(
            "| {} | {:.3} | {:.3} | +{:.1}% |\n",
            r.scene_name,
            r.baseline_ms,
            r.current_ms,
            r.pct_change()
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::TimingSeries;
    use aoshell_coverage::CoverageStats;

    fn result(name: &str, mean_ms: f64) -> BenchmarkResult {
        BenchmarkResult {
            scene_name: name.to_string(),
            samples: 16,
            crossings_per_sample: 4,
            frame_count: 1,
            stats: CoverageStats::default(),
            timings: TimingSeries {
                mean_ms,
                median_ms: mean_ms,
                p95_ms: mean_ms,
                p99_ms: mean_ms,
                min_ms: mean_ms,
                max_ms: mean_ms,
            },
        }
    }

    #[test]
    fn test_regressions_over_threshold() {
        let baseline = Baseline {
            timestamp: "t".to_string(),
            results: vec![result("sparse", 1.0), result("dense", 2.0), result("idle", 0.0)],
        };
        let current = vec![
            result("sparse", 1.05),
            result("dense", 3.0),
            result("idle", 1.0),
            result("new", 9.0),
        ];
        let regressions = baseline.regressions(&current, 10.0);
        assert_eq!(regressions.len(), 1);
        assert_eq!(regressions[0].scene_name, "dense");
        assert!((regressions[0].pct_change() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_baseline_saved_and_reloaded() {
        let dir = std::env::temp_dir().join(format!("aoshell-bench-{}", std::process::id()));
        let path = dir.join("baseline.json");
        let baseline = Baseline {
            timestamp: "t".to_string(),
            results: vec![result("sparse", 1.5)],
        };
        baseline.save(&path).expect("save");
        let loaded = Baseline::load(&path).expect("load");
        assert_eq!(loaded.results.len(), 1);
        assert_eq!(loaded.results[0].scene_name, "sparse");

        std::fs::write(&path, "{ not json").expect("overwrite");
        let err = Baseline::load(&path).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_baseline_not_found() {
        let err = Baseline::load(Path::new("/nonexistent/baseline.json")).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }

    #[test]
    fn test_conformance_table_marks_failures() {
        let outcomes = vec![
            ScenarioOutcome {
                name: "ok".to_string(),
                expected: 1.0,
                actual: 1.0,
            },
            ScenarioOutcome {
                name: "bad".to_string(),
                expected: 1.0,
                actual: 0.5,
            },
        ];
        let table = format_conformance(&outcomes);
        assert!(table.contains("| ok | 1.0000 | 1.0000 | pass |"));
        assert!(table.contains("| bad | 1.0000 | 0.5000 | FAIL |"));
    }

    #[test]
    fn test_regression_table() {
        assert!(format_regressions(&[], 10.0).contains("No scene slowed"));
        let table = format_regressions(
            &[Regression {
                scene_name: "dense".to_string(),
                baseline_ms: 2.0,
                current_ms: 2.5,
            }],
            10.0,
        );
        assert!(table.contains("| dense | 2.000 | 2.500 | +25.0% |"));
    }
}
