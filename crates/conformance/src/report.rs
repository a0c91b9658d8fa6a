use crate::matrix::{Matrix, Scenario};
use crate::CaseResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::io;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConformanceReport {
    pub compiler: String,
    pub total_cases: usize,
    pub failures: usize,
    pub coverage: CoverageSummary,
    pub failed_cases: Vec<String>,
}

impl ConformanceReport {
    /// An empty report for a run of `selected` cases, measured against the full matrix.
    pub fn new(compiler: &str, selected: usize) -> Self {
        Self {
            compiler: compiler.to_string(),
            total_cases: selected,
            failures: 0,
            coverage: CoverageSummary::for_matrix(&Matrix::all()),
            failed_cases: Vec::new(),
        }
    }

    pub fn record(&mut self, result: &CaseResult) {
        let passed = result.passed();
        self.coverage.record(result.case.scenario(), passed);
        if !passed {
            self.failures += 1;
            self.failed_cases.push(result.name.clone());
        }
    }

    pub fn passed(&self) -> bool {
        self.failures == 0
    }

    pub fn print_summary(&self) {
        eprintln!(
            "binding conformance ({}): {} cases, {} failures",
            self.compiler, self.total_cases, self.failures
        );
        eprintln!(
            "matrix coverage: {:.1}% ({} / {} cases)",
            self.coverage.percent(),
            self.coverage.run(),
            self.coverage.declared()
        );

        let skipped = self.coverage.skipped();
        if !skipped.is_empty() {
            eprintln!("skipped scenarios:");
            for name in skipped {
                eprintln!("  - {name}");
            }
        }
        for (name, scenario) in &self.coverage.scenarios {
            if scenario.run > 0 && scenario.run < scenario.declared {
                eprintln!("partial: {name} ({} / {})", scenario.run, scenario.declared);
            }
        }
    }

    pub fn write_json(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self).map_err(io::Error::other)?;
        std::fs::write(path, contents)
    }
}

/// Case counts for one scenario.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioCoverage {
    /// Cases the full matrix declares.
    pub declared: usize,
    pub run: usize,
    pub failed: usize,
}

/// Which part of the matrix a run exercised, keyed by scenario name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageSummary {
    pub scenarios: BTreeMap<String, ScenarioCoverage>,
}

impl CoverageSummary {
    pub fn for_matrix(matrix: &Matrix) -> Self {
        let mut scenarios: BTreeMap<String, ScenarioCoverage> = Scenario::ALL
            .iter()
            .map(|s| (s.name().to_string(), ScenarioCoverage::default()))
            .collect();
        for case in matrix.cases() {
            scenarios
                .entry(case.scenario().name().to_string())
                .or_default()
                .declared += 1;
        }
        Self { scenarios }
    }

    pub fn record(&mut self, scenario: Scenario, passed: bool) {
        let entry = self.scenarios.entry(scenario.name().to_string()).or_default();
        entry.run += 1;
        if !passed {
            entry.failed += 1;
        }
    }

    pub fn declared(&self) -> usize {
        self.scenarios.values().map(|s| s.declared).sum()
    }

    pub fn run(&self) -> usize {
        self.scenarios.values().map(|s| s.run).sum()
    }

    /// Share of declared cases that ran.
    pub fn percent(&self) -> f64 {
        let declared = self.declared();
        if declared == 0 {
            return 100.0;
        }
        (self.run() as f64) * 100.0 / (declared as f64)
    }

    /// Scenarios with at least one case run.
    pub fn covered(&self) -> usize {
        self.scenarios.values().filter(|s| s.run > 0).count()
    }

    /// Scenarios of which no case ran.
    pub fn skipped(&self) -> Vec<&str> {
        self.scenarios
            .iter()
            .filter(|(_, s)| s.run == 0)
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

pub fn format_failure(result: &CaseResult) -> String {
    let mut out = String::new();
    let scenario = result.case.scenario();

    let _ = writeln!(&mut out, "conformance mismatch: {}", result.name);
    let _ = writeln!(
        &mut out,
        "scenario: {} ({})",
        scenario.name(),
        scenario.description()
    );
    let _ = writeln!(&mut out, "expected: {}", result.expected);
    let _ = writeln!(&mut out, "actual: {}", result.actual);
    if let Some(diagnostic) = result.actual.diagnostic() {
        let _ = writeln!(&mut out, "compiler diagnostic:");
        for line in diagnostic.lines() {
            let _ = writeln!(&mut out, "  {line}");
        }
    }

    let _ = writeln!(&mut out, "source:");
    let width = result.source.lines().count().to_string().len();
    for (idx, line) in result.source.lines().enumerate() {
        let _ = writeln!(&mut out, "  {:>width$} | {line}", idx + 1);
    }

    let _ = writeln!(
        &mut out,
        "FAIL scenario={} expected={} actual={} name=\"{}\"",
        scenario.name(),
        if result.expected.accepts() { "accept" } else { "reject" },
        result.actual,
        result.name
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::CompileOutcome;
    use crate::matrix::{CaseParams, TestCase};

    fn result_for(case: TestCase, actual: CompileOutcome) -> CaseResult {
        let source = crate::synth::synthesize(&case.program());
        CaseResult {
            name: case.name(),
            expected: case.expected(),
            case,
            actual,
            source,
        }
    }

    fn rejected() -> CompileOutcome {
        CompileOutcome::Rejected {
            diagnostic: String::new(),
        }
    }

    #[test]
    fn filtered_run_reports_what_it_skipped() {
        let mut report = ConformanceReport::new("test", 1);
        assert_eq!(report.coverage.declared(), Matrix::all().len());
        assert_eq!(report.coverage.skipped().len(), Scenario::ALL.len());
        assert_eq!(report.coverage.percent(), 0.0);

        report.record(&result_for(TestCase::new(CaseParams::FunctionScope), rejected()));
        assert_eq!(report.coverage.covered(), 1);
        assert_eq!(report.coverage.run(), 1);
        assert!(!report.coverage.skipped().contains(&"function_scope"));
        assert!(report.coverage.skipped().contains(&"single_entry_point"));
        assert!(report.coverage.percent() < 1.0);
        assert!(report.passed());
    }

    #[test]
    fn full_matrix_run_is_fully_covered() {
        let matrix = Matrix::all();
        let mut report = ConformanceReport::new("test", matrix.len());
        for case in matrix.cases() {
            let actual = if case.expected().accepts() {
                CompileOutcome::Accepted
            } else {
                rejected()
            };
            report.record(&result_for(case.clone(), actual));
        }
        assert!(report.coverage.skipped().is_empty());
        assert_eq!(report.coverage.percent(), 100.0);
        assert_eq!(
            report.coverage.scenarios["single_entry_point"],
            ScenarioCoverage {
                declared: Scenario::SingleEntryPoint.cases().len(),
                run: Scenario::SingleEntryPoint.cases().len(),
                failed: 0,
            }
        );
    }

    #[test]
    fn mismatches_are_recorded_by_name_and_scenario() {
        let case = TestCase::new(CaseParams::FunctionScope);
        let mut report = ConformanceReport::new("test", 1);
        report.record(&result_for(case.clone(), CompileOutcome::Accepted));
        assert_eq!(report.failures, 1);
        assert_eq!(report.failed_cases, [case.name()]);
        assert_eq!(report.coverage.scenarios["function_scope"].failed, 1);
        assert!(!report.passed());
    }

    #[test]
    fn failure_text_carries_source_and_verdicts() {
        let case = TestCase::new(CaseParams::PrivateModuleScope);
        let text = format_failure(&result_for(case, CompileOutcome::Accepted));

        assert!(text.starts_with("conformance mismatch: private_module_scope:\n"), "{text}");
        assert!(
            text.contains("expected: reject (non-resource variable `a` has @group/@binding)"),
            "{text}"
        );
        assert!(text.contains("actual: accept\n"), "{text}");
        assert!(
            text.contains("1 | @group(1) @binding(1) var<private> a : i32;"),
            "{text}"
        );
        assert!(
            text.ends_with(
                "FAIL scenario=private_module_scope expected=reject actual=accept name=\"private_module_scope:\"\n"
            ),
            "{text}"
        );
    }

    #[test]
    fn report_round_trips_through_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("report.json");
        let mut report = ConformanceReport::new("naga", 1);
        report.record(&result_for(
            TestCase::new(CaseParams::FunctionScopeTexture),
            rejected(),
        ));
        report.write_json(&path).unwrap();

        let parsed: ConformanceReport =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed.total_cases, 1);
        assert_eq!(parsed.coverage, report.coverage);
    }
}
