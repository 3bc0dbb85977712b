mod error;
mod format;
mod model;
mod predict;
mod problem;
mod stats;

pub use crate::error::{Error, FormatError, ModelError, Result};
pub use crate::format::G;
pub use crate::model::{load_model, LinearModel, Predict, SolverType};
pub use crate::predict::predict;
pub use crate::problem::{parse_line, Feature, FeatureVector, Sample, SampleReader};
pub use crate::stats::{evaluations, Metrics, RunningStats};
