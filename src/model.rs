use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use tracing::debug;

use crate::error::{Error, ModelError, Result};
use crate::problem::Feature;

/// Anything that scores a feature vector.
///
/// The evaluation loop only needs this; it never looks inside the model.
pub trait Predict {
    fn predict(&self, x: &[Feature]) -> f64;
}

impl<F> Predict for F
where
    F: Fn(&[Feature]) -> f64,
{
    fn predict(&self, x: &[Feature]) -> f64 {
        self(x)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SolverType {
    L2rLr,
    L2rL2lossSvcDual,
    L2rL2lossSvc,
    L2rL1lossSvcDual,
    McsvmCs,
    L1rL2lossSvc,
    L1rLr,
    L2rLrDual,
    L2rL2lossSvr,
    L2rL2lossSvrDual,
    L2rL1lossSvrDual,
}

impl SolverType {
    pub fn from_name(name: &str) -> Option<Self> {
        let solver = match name {
            "L2R_LR" => Self::L2rLr,
            "L2R_L2LOSS_SVC_DUAL" => Self::L2rL2lossSvcDual,
            "L2R_L2LOSS_SVC" => Self::L2rL2lossSvc,
            "L2R_L1LOSS_SVC_DUAL" => Self::L2rL1lossSvcDual,
            "MCSVM_CS" => Self::McsvmCs,
            "L1R_L2LOSS_SVC" => Self::L1rL2lossSvc,
            "L1R_LR" => Self::L1rLr,
            "L2R_LR_DUAL" => Self::L2rLrDual,
            "L2R_L2LOSS_SVR" => Self::L2rL2lossSvr,
            "L2R_L2LOSS_SVR_DUAL" => Self::L2rL2lossSvrDual,
            "L2R_L1LOSS_SVR_DUAL" => Self::L2rL1lossSvrDual,
            _ => return None,
        };
        Some(solver)
    }

    pub fn is_regression(self) -> bool {
        matches!(
            self,
            Self::L2rL2lossSvr | Self::L2rL2lossSvrDual | Self::L2rL1lossSvrDual
        )
    }
}

/// A linear model in the liblinear text format.
///
/// Weights are stored feature-major: the `nr_w` decision weights of feature
/// `i` (1-based) live at `ws[(i - 1) * nr_w..i * nr_w]`, and the bias
/// weights follow the last feature.
#[derive(Clone, Debug)]
pub struct LinearModel {
    pub(crate) solver: SolverType,
    pub(crate) labels: Vec<f64>,
    pub(crate) n_features: usize,
    pub(crate) bias: f64,
    pub(crate) nr_w: usize,
    pub(crate) ws: Vec<f64>,
}

/// Loads a linear model file.
pub fn load_model(path: impl AsRef<Path>) -> Result<LinearModel> {
    let path = path.as_ref();
    let model = File::open(path)
        .map_err(ModelError::from)
        .and_then(|file| LinearModel::from_reader(BufReader::new(file)))
        .map_err(|source| Error::ModelLoad {
            path: path.to_path_buf(),
            source,
        })?;
    debug!(
        path = %path.display(),
        solver = ?model.solver,
        nr_class = model.nr_class(),
        nr_feature = model.n_features,
        bias = model.bias,
        "loaded model"
    );
    Ok(model)
}

fn parse_field<T: std::str::FromStr>(key: &'static str, value: Option<&str>) -> Result<T, ModelError> {
    let value = value.ok_or(ModelError::Missing(key))?;
    value.parse().map_err(|_| ModelError::InvalidField {
        key,
        value: value.to_string(),
    })
}

impl LinearModel {
    pub fn from_reader<R: BufRead>(mut reader: R) -> Result<Self, ModelError> {
        let mut solver = None;
        let mut nr_class = None;
        let mut labels = None;
        let mut n_features = None;
        let mut bias = None;

        let mut line = String::new();
        loop {
            line.clear();
            if reader.read_line(&mut line)? == 0 {
                return Err(ModelError::Missing("w"));
            }
            let mut fields = line.split_ascii_whitespace();
            let key = match fields.next() {
                Some(key) => key,
                None => continue,
            };
            match key {
                "solver_type" => {
                    let name = fields.next().ok_or(ModelError::Missing("solver_type"))?;
                    let parsed = SolverType::from_name(name)
                        .ok_or_else(|| ModelError::UnknownSolver(name.to_string()))?;
                    solver = Some(parsed);
                }
                "nr_class" => nr_class = Some(parse_field::<usize>("nr_class", fields.next())?),
                "label" => {
                    labels = Some(
                        fields
                            .map(|l| parse_field::<f64>("label", Some(l)))
                            .collect::<Result<Vec<_>, _>>()?,
                    );
                }
                "nr_feature" => {
                    n_features = Some(parse_field::<usize>("nr_feature", fields.next())?)
                }
                "bias" => bias = Some(parse_field::<f64>("bias", fields.next())?),
                "w" => break,
                other => return Err(ModelError::UnknownEntry(other.to_string())),
            }
        }

        let solver = solver.ok_or(ModelError::Missing("solver_type"))?;
        let nr_class = nr_class.ok_or(ModelError::Missing("nr_class"))?;
        let n_features = n_features.ok_or(ModelError::Missing("nr_feature"))?;
        let bias = bias.ok_or(ModelError::Missing("bias"))?;

        let labels = match labels {
            Some(labels) => labels,
            None if solver.is_regression() => Vec::new(),
            None => return Err(ModelError::Missing("label")),
        };
        if !solver.is_regression() && (nr_class == 0 || labels.len() != nr_class) {
            return Err(ModelError::InvalidField {
                key: "label",
                value: format!("{} labels for {} classes", labels.len(), nr_class),
            });
        }

        let nr_w = if solver.is_regression() || (nr_class == 2 && solver != SolverType::McsvmCs) {
            1
        } else {
            nr_class
        };
        let expected = n_features
            .checked_add(usize::from(bias >= 0.0))
            .and_then(|n| n.checked_mul(nr_w))
            .ok_or_else(|| ModelError::InvalidField {
                key: "nr_feature",
                value: n_features.to_string(),
            })?;

        let mut rest = String::new();
        reader.read_to_string(&mut rest)?;
        let ws = rest
            .split_ascii_whitespace()
            .take(expected)
            .map(|w| parse_field::<f64>("w", Some(w)))
            .collect::<Result<Vec<_>, _>>()?;
        if ws.len() < expected {
            return Err(ModelError::TruncatedWeights {
                expected,
                found: ws.len(),
            });
        }

        Ok(Self {
            solver,
            labels,
            n_features,
            bias,
            nr_w,
            ws,
        })
    }

    pub fn solver(&self) -> SolverType {
        self.solver
    }

    pub fn labels(&self) -> &[f64] {
        &self.labels
    }

    pub fn nr_class(&self) -> usize {
        if self.solver.is_regression() {
            2
        } else {
            self.labels.len()
        }
    }

    /// Weight of a 1-based feature index for one decision function.
    pub fn get_weight(&self, index: i32, class: usize) -> Option<f64> {
        if index < 1 || index as usize > self.n_features || class >= self.nr_w {
            return None;
        }
        self.ws.get((index as usize - 1) * self.nr_w + class).cloned()
    }

    pub fn decision_values(&self, x: &[Feature]) -> Vec<f64> {
        let mut dec = vec![0.0; self.nr_w];
        for feat in x {
            for (j, d) in dec.iter_mut().enumerate() {
                if let Some(w) = self.get_weight(feat.index, j) {
                    *d += w * feat.value;
                }
            }
        }
        if self.bias >= 0.0 {
            let offset = self.n_features * self.nr_w;
            for (d, w) in dec.iter_mut().zip(&self.ws[offset..offset + self.nr_w]) {
                *d += w * self.bias;
            }
        }
        dec
    }
}

impl Predict for LinearModel {
    fn predict(&self, x: &[Feature]) -> f64 {
        let dec = self.decision_values(x);
        if self.solver.is_regression() {
            return dec[0];
        }
        if self.labels.len() == 2 {
            return if dec[0] > 0.0 {
                self.labels[0]
            } else {
                self.labels[1]
            };
        }
        let mut best = 0;
        for (i, &d) in dec.iter().enumerate().skip(1) {
            if d > dec[best] {
                best = i;
            }
        }
        self.labels[best]
    }
}
