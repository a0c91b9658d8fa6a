use std::io::Write;
use std::path::PathBuf;

use anyhow::{anyhow, Context};
use binding_conformance::{synthesize, ConformanceConfig, Matrix, NagaCompiler, ShaderCompiler};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "binding-conformance",
    about = "Check a WGSL compiler's @group/@binding validation against the expected verdicts."
)]
struct Args {
    /// Only run cases matching this filter (`scenario:<name>`, `name:<substring>` or a bare term)
    #[arg(long, value_name = "FILTER")]
    filter: Option<String>,

    /// Write a JSON conformance report to this path
    #[arg(long, value_name = "PATH")]
    report: Option<PathBuf>,

    /// Worker threads (1 runs serially)
    #[arg(long, value_name = "N")]
    jobs: Option<usize>,

    /// Print the selected cases with their expected verdict instead of running them
    #[arg(long, action = clap::ArgAction::SetTrue)]
    list: bool,

    /// Print the WGSL source and expected verdict of one case
    #[arg(long, value_name = "NAME", conflicts_with = "list")]
    show: Option<String>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = merge(ConformanceConfig::from_env()?, &args)?;

    if let Some(name) = args.show.as_deref() {
        let matrix = Matrix::all();
        let case = matrix
            .find(name)
            .ok_or_else(|| anyhow!("no case named {name:?} (use --list to see case names)"))?;
        let program = case.program();
        let mut out = std::io::stdout().lock();
        writeln!(out, "// {}", case.name())?;
        writeln!(out, "// expected: {}", case.expected())?;
        write!(out, "{}", synthesize(&program))?;
        return Ok(());
    }

    if args.list {
        let cases = binding_conformance::cases_for_run(&config)?;
        let mut out = std::io::stdout().lock();
        for case in &cases {
            let verdict = if case.expected().accepts() {
                "accept"
            } else {
                "reject"
            };
            writeln!(out, "{verdict} {}", case.name())?;
        }
        return Ok(());
    }

    let compiler = NagaCompiler::default();
    let report = binding_conformance::run(&config, &compiler)
        .with_context(|| format!("binding conformance run against {}", compiler.name()))?;
    println!("{} cases passed against {}", report.total_cases, report.compiler);
    Ok(())
}

/// Command-line flags win over the environment.
fn merge(mut config: ConformanceConfig, args: &Args) -> anyhow::Result<ConformanceConfig> {
    if let Some(filter) = &args.filter {
        config.filter = Some(filter.clone());
    }
    if let Some(report) = &args.report {
        config.report_path = Some(report.clone());
    }
    if let Some(jobs) = args.jobs {
        if jobs == 0 {
            anyhow::bail!("--jobs must be at least 1");
        }
        config.jobs = Some(jobs);
    }
    Ok(config)
}
