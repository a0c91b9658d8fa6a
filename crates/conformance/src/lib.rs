//! Conformance suite for WGSL `@group`/`@binding` validation.
//!
//! Each case of the [`Matrix`] is turned into a [`wgsl_binding_model::ShaderProgram`], which is
//! both rendered to WGSL (fed to the compiler under test) and evaluated by the model's oracle
//! (the expected verdict). A case fails when the two disagree.
//!
//! ## Environment variables
//!
//! When running via [`run_from_env`], the following environment variables are recognised:
//!
//! - `BINDING_CONFORMANCE_FILTER` (optional): only run cases matching this filter (see [`Filter`]).
//! - `BINDING_CONFORMANCE_REPORT_PATH` (optional): write a JSON conformance report to this path.
//! - `BINDING_CONFORMANCE_JOBS` (optional): number of worker threads (`1` runs serially).

mod compiler;
mod config;
mod emit;
mod filter;
mod matrix;
mod report;
mod synth;

pub use compiler::{CompileOutcome, NagaCompiler, ShaderCompiler};
pub use config::{ConfigError, ConformanceConfig};
pub use emit::{declare_entry_point, declare_function, declare_resource, declare_variable};
pub use filter::{Filter, FilterError};
pub use matrix::{
    BindingAttributesParams, CaseParams, DifferentEntryPointsParams, Matrix, Scenario,
    SingleEntryPointParams, TestCase, INDEX_VALUES,
};
pub use report::{format_failure, ConformanceReport, CoverageSummary, ScenarioCoverage};
pub use synth::{attach_entry_point, helper_name, synthesize, Usage};

use std::path::PathBuf;

use rayon::prelude::*;
use thiserror::Error;
use wgsl_binding_model::Verdict;

#[derive(Debug, Error)]
pub enum ConformanceError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Filter(#[from] FilterError),
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error("failed to write report to {}: {source}", path.display())]
    Report {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{failures} of {total} cases disagree with the expected verdict\n{details}")]
    Mismatches {
        failures: usize,
        total: usize,
        details: String,
    },
}

/// Outcome of one case: what the oracle predicted and what the compiler did.
#[derive(Debug, Clone)]
pub struct CaseResult {
    pub case: TestCase,
    pub name: String,
    pub expected: Verdict,
    pub actual: CompileOutcome,
    pub source: String,
}

impl CaseResult {
    pub fn passed(&self) -> bool {
        self.expected.accepts() == self.actual.accepted()
    }
}

/// Synthesizes `case`, predicts its verdict and submits it to `compiler` once.
pub fn check_case<C: ShaderCompiler + ?Sized>(case: &TestCase, compiler: &C) -> CaseResult {
    let program = case.program();
    let source = synthesize(&program);
    let expected = wgsl_binding_model::evaluate(&program);
    let actual = compiler.compile(&source);

    let name = case.name();
    tracing::debug!(case = %name, %expected, %actual, "checked case");
    CaseResult {
        case: case.clone(),
        name,
        expected,
        actual,
        source,
    }
}

pub fn run_from_env() -> Result<ConformanceReport, ConformanceError> {
    let config = ConformanceConfig::from_env()?;
    run(&config, &NagaCompiler::default())
}

/// Matrix cases selected by `config.filter`.
pub fn cases_for_run(config: &ConformanceConfig) -> Result<Vec<TestCase>, FilterError> {
    let cases = Matrix::all().into_cases();
    match config.filter.as_deref() {
        Some(filter) => Filter::parse(filter).select(cases),
        None => Ok(cases),
    }
}

/// Runs every selected case. A mismatch fails only its own case; all remaining cases still run and
/// every mismatch is reported.
pub fn run<C: ShaderCompiler>(
    config: &ConformanceConfig,
    compiler: &C,
) -> Result<ConformanceReport, ConformanceError> {
    let cases = cases_for_run(config)?;
    tracing::info!(
        cases = cases.len(),
        compiler = compiler.name(),
        "starting binding conformance run"
    );

    let results = execute(&cases, compiler, config.jobs)?;

    let mut report = ConformanceReport::new(compiler.name(), cases.len());
    let mut details = String::new();
    for result in &results {
        report.record(result);
        if !result.passed() {
            tracing::warn!(
                case = %result.name,
                expected = %result.expected,
                actual = %result.actual,
                "conformance mismatch"
            );
            details.push_str(&format_failure(result));
            details.push('\n');
        }
    }

    if let Some(path) = config.report_path.as_deref() {
        if let Err(source) = report.write_json(path) {
            if report.passed() {
                return Err(ConformanceError::Report {
                    path: path.to_path_buf(),
                    source,
                });
            }
            tracing::warn!(path = %path.display(), "failed to write report: {source}");
        }
    }

    report.print_summary();
    tracing::info!(
        cases = report.total_cases,
        failures = report.failures,
        "binding conformance run finished"
    );

    if !report.passed() {
        return Err(ConformanceError::Mismatches {
            failures: report.failures,
            total: report.total_cases,
            details,
        });
    }
    Ok(report)
}

/// Results come back in `cases` order regardless of how many workers ran them.
fn execute<C: ShaderCompiler>(
    cases: &[TestCase],
    compiler: &C,
    jobs: Option<usize>,
) -> Result<Vec<CaseResult>, ConformanceError> {
    if jobs == Some(1) {
        return Ok(cases.iter().map(|case| check_case(case, compiler)).collect());
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(jobs) = jobs {
        builder = builder.num_threads(jobs);
    }
    let pool = builder.build()?;
    Ok(pool.install(|| {
        cases
            .par_iter()
            .map(|case| check_case(case, compiler))
            .collect()
    }))
}
