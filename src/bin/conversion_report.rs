//! conversion-report: run the built-in conversion cases and print one verdict per line.
//!
//! ```bash
//! conversion-report
//! conversion-report --json
//! conversion-report --vector '[[1, 2, 3], [4]]' --kind numeric
//! RUST_LOG=matbridge=debug conversion-report
//! ```

use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use matbridge::{
    ElementKind, HostValue, consts,
    harness::{self, Case},
};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "conversion-report")]
#[command(version, about = "Round-trip host arrays and nested sequences through native storage")]
struct Args {
    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Also run a nested sequence given as JSON, e.g. '[[true], [false, true]]'
    #[arg(long, value_name = "JSON")]
    vector: Option<String>,

    /// Leaf kind requested for --vector
    #[arg(long, value_enum, default_value_t = Kind::Numeric)]
    kind: Kind,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Kind {
    Boolean,
    Numeric,
}

impl From<Kind> for ElementKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Boolean => ElementKind::Boolean,
            Kind::Numeric => ElementKind::Numeric,
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!(version = consts::VERSION, "running conversion report");

    let mut cases = harness::standard_cases();
    if let Some(json) = args.vector {
        // simd-json parses in place.
        let mut raw = json.into_bytes();
        match simd_json::from_slice::<HostValue>(&mut raw) {
            Ok(value) => cases.push(Case::vector("custom", value, args.kind.into())),
            Err(e) => {
                eprintln!("invalid --vector JSON: {}", e);
                return ExitCode::from(2);
            }
        }
    }

    let report = harness::run(&cases);
    tracing::info!(
        results = report.results.len(),
        failures = report.failures().count(),
        "conversion report complete"
    );

    if args.json {
        match simd_json::to_string_pretty(&report) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("failed to serialize report: {}", e);
                return ExitCode::from(2);
            }
        }
    } else {
        print!("{}", report);
    }

    if report.all_succeeded() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
