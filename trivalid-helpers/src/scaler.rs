use ndarray::{Array1, ArrayView1, Zip};
use std::error::Error;
use std::fmt::{Display, Formatter};

use crate::Float;

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

/// Errors raised while building or applying a [`StandardScaler`].
#[derive(Debug, Clone, PartialEq)]
pub enum ScalerError {
    /// `mean` and `scale` have no entries.
    Empty,
    /// `mean` and `scale` have different lengths.
    LengthMismatch { mean: usize, scale: usize },
    /// A fitted parameter is NaN or infinite.
    NonFinite,
    /// The input does not have the fitted number of features.
    DimensionMismatch { expected: usize, actual: usize },
}

impl Display for ScalerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ScalerError::Empty => write!(f, "scaler has no fitted features"),
            ScalerError::LengthMismatch { mean, scale } => write!(
                f,
                "scaler mean has {} entries but scale has {}",
                mean, scale
            ),
            ScalerError::NonFinite => write!(f, "scaler parameters must be finite"),
            ScalerError::DimensionMismatch { expected, actual } => write!(
                f,
                "scaler expects {} features, got {}",
                expected, actual
            ),
        }
    }
}

impl Error for ScalerError {}

/// Standardizes features as `(x - mean) / scale`, with parameters fitted at
/// training time.
///
/// A zero entry in `scale` marks a constant feature and is replaced by one,
/// so the transform never divides by zero.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(
        crate = "serde_crate",
        try_from = "ScalerParams<F>",
        into = "ScalerParams<F>",
        bound = "F: Float + Serialize + for<'a> Deserialize<'a>"
    )
)]
pub struct StandardScaler<F: Float> {
    mean: Array1<F>,
    scale: Array1<F>,
}

/// Plain-list form of the fitted parameters, as written to scaler files.
#[derive(Debug, Clone)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
pub struct ScalerParams<F> {
    pub mean: Vec<F>,
    pub scale: Vec<F>,
}

impl<F: Float> StandardScaler<F> {
    pub fn new(mean: Array1<F>, scale: Array1<F>) -> Result<Self, ScalerError> {
        if mean.len() != scale.len() {
            return Err(ScalerError::LengthMismatch {
                mean: mean.len(),
                scale: scale.len(),
            });
        }
        if mean.is_empty() {
            return Err(ScalerError::Empty);
        }
        if mean.iter().chain(scale.iter()).any(|v| !v.is_finite()) {
            return Err(ScalerError::NonFinite);
        }
        let scale = scale.mapv(|s| if s == F::zero() { F::one() } else { s });
        Ok(Self { mean, scale })
    }

    /// A scaler that leaves `n_features` features untouched.
    pub fn identity(n_features: usize) -> Self {
        Self {
            mean: Array1::zeros(n_features),
            scale: Array1::ones(n_features),
        }
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    pub fn mean(&self) -> ArrayView1<'_, F> {
        self.mean.view()
    }

    pub fn scale(&self) -> ArrayView1<'_, F> {
        self.scale.view()
    }

    pub fn transform(&self, features: ArrayView1<F>) -> Result<Array1<F>, ScalerError> {
        if features.len() != self.n_features() {
            return Err(ScalerError::DimensionMismatch {
                expected: self.n_features(),
                actual: features.len(),
            });
        }
        Ok(Zip::from(&features)
            .and(&self.mean)
            .and(&self.scale)
            .map_collect(|&x, &m, &s| (x - m) / s))
    }
}

impl<F: Float> TryFrom<ScalerParams<F>> for StandardScaler<F> {
    type Error = ScalerError;

    fn try_from(params: ScalerParams<F>) -> Result<Self, Self::Error> {
        Self::new(Array1::from(params.mean), Array1::from(params.scale))
    }
}

impl<F: Float> From<StandardScaler<F>> for ScalerParams<F> {
    fn from(scaler: StandardScaler<F>) -> Self {
        ScalerParams {
            mean: scaler.mean.to_vec(),
            scale: scaler.scale.to_vec(),
        }
    }
}
