use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use svm_predict::{load_model, predict};

/// Predicts a sparse-format test set with a linear model and reports
/// accuracy, mean squared error and squared correlation coefficient.
#[derive(Parser, Debug)]
#[command(
    name = "svm-predict",
    override_usage = "svm-predict [options] test_file model_file output_file"
)]
struct Args {
    /// Quiet mode: no report, errors only in the log
    #[arg(short)]
    quiet: bool,

    test_file: PathBuf,
    model_file: PathBuf,
    output_file: PathBuf,
}

fn init_tracing(quiet: bool) {
    let default = if quiet {
        "svm_predict=error"
    } else {
        "svm_predict=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.quiet);

    let input = File::open(&args.test_file)
        .with_context(|| format!("can't open input file {}", args.test_file.display()))?;
    let model = load_model(&args.model_file)?;
    let output = File::create(&args.output_file)
        .with_context(|| format!("can't open output file {}", args.output_file.display()))?;

    let metrics = predict(&model, BufReader::new(input), BufWriter::new(output))?;

    if !args.quiet {
        let mut stdout = io::stdout().lock();
        write!(stdout, "{}", metrics)?;
        stdout.flush()?;
    }
    Ok(())
}
