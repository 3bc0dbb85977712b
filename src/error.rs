use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("can't open model file {}: {source}", path.display())]
    ModelLoad {
        path: PathBuf,
        #[source]
        source: ModelError,
    },

    #[error("wrong input format at line {line}: {source}")]
    Format {
        line: usize,
        #[source]
        source: FormatError,
    },

    #[error("can't read input at line {line}: {source}")]
    Read {
        line: usize,
        #[source]
        source: io::Error,
    },

    #[error("len(targets) = {targets} must be equal to len(predictions) = {predictions}")]
    LengthMismatch { targets: usize, predictions: usize },

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// A token of a data line that could not be read as the number it must be.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("missing target")]
    MissingTarget,

    #[error("invalid target {0:?}")]
    InvalidTarget(String),

    #[error("invalid feature index {0:?}")]
    InvalidIndex(String),

    #[error("invalid feature value {0:?}")]
    InvalidValue(String),
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("unknown header entry {0:?}")]
    UnknownEntry(String),

    #[error("unknown solver type {0:?}")]
    UnknownSolver(String),

    #[error("invalid value {value:?} for {key}")]
    InvalidField { key: &'static str, value: String },

    #[error("missing {0}")]
    Missing(&'static str),

    #[error("expected {expected} weights, found {found}")]
    TruncatedWeights { expected: usize, found: usize },
}
