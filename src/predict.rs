use std::io::{BufRead, Write};

use tracing::{info, trace};

use crate::error::Result;
use crate::format::G;
use crate::model::Predict;
use crate::problem::SampleReader;
use crate::stats::{Metrics, RunningStats};

/// Predicts every sample of `input`, writing one value per line to `output`
/// in input order, and returns the metrics of the whole pass.
///
/// The first malformed line aborts the run; nothing is written for it.
pub fn predict<P, R, W>(model: &P, input: R, mut output: W) -> Result<Metrics>
where
    P: Predict + ?Sized,
    R: BufRead,
    W: Write,
{
    let mut stats = RunningStats::new();
    for sample in SampleReader::new(input) {
        let sample = sample?;
        let v = model.predict(&sample.features);
        writeln!(output, "{}", G(v))?;
        trace!(label = sample.target, predicted = v, "sample");
        stats.update(v, sample.target);
    }
    output.flush()?;

    info!(samples = stats.count(), "prediction finished");
    Ok(stats.finalize())
}
