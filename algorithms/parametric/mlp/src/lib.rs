use ndarray::{Array1, Array2, ArrayView1};
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
// Core components from shared library
use trivalid_helpers::Float;

/// Errors that can occur while building or evaluating a dense network.
#[derive(Debug, Clone, PartialEq)]
pub enum MlpError {
    /// A network needs at least one layer.
    EmptyNetwork,
    /// Layer widths do not line up, or the input has the wrong width.
    ShapeMismatch { expected: usize, actual: usize },
    /// A weight or bias is NaN or infinite.
    NonFinite,
}

impl Display for MlpError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            MlpError::EmptyNetwork => write!(f, "network has no layers"),
            MlpError::ShapeMismatch { expected, actual } => {
                write!(f, "shape mismatch: expected width {}, got {}", expected, actual)
            }
            MlpError::NonFinite => write!(f, "network parameters must be finite"),
        }
    }
}

impl Error for MlpError {}

/// Element-wise activation applied after a layer's affine map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Relu,
    Sigmoid,
    Identity,
}

impl Activation {
    fn apply<F: Float>(self, x: F) -> F {
        match self {
            // NaN passes through so callers can detect it
            Activation::Relu => {
                if x > F::zero() || x.is_nan() {
                    x
                } else {
                    F::zero()
                }
            }
            Activation::Sigmoid => F::one() / (F::one() + (-x).exp()),
            Activation::Identity => x,
        }
    }
}

/// A fully connected layer computing `activation(x · W + b)`.
///
/// `weights` has one row per input and one column per output.
#[derive(Debug, Clone)]
pub struct DenseLayer<F: Float> {
    weights: Array2<F>,
    bias: Array1<F>,
    activation: Activation,
}

impl<F: Float> DenseLayer<F> {
    pub fn new(weights: Array2<F>, bias: Array1<F>, activation: Activation) -> Result<Self, MlpError> {
        if bias.len() != weights.ncols() {
            return Err(MlpError::ShapeMismatch {
                expected: weights.ncols(),
                actual: bias.len(),
            });
        }
        if weights.iter().chain(bias.iter()).any(|v| !v.is_finite()) {
            return Err(MlpError::NonFinite);
        }
        Ok(Self { weights, bias, activation })
    }

    pub fn inputs(&self) -> usize {
        self.weights.nrows()
    }

    pub fn outputs(&self) -> usize {
        self.weights.ncols()
    }

    pub fn activation(&self) -> Activation {
        self.activation
    }

    fn forward(&self, x: ArrayView1<F>) -> Array1<F> {
        let z = x.dot(&self.weights) + &self.bias;
        z.mapv(|v| self.activation.apply(v))
    }
}

/// A feed-forward network of dense layers. Only inference is supported;
/// parameters come from a model trained elsewhere.
#[derive(Debug, Clone)]
pub struct Mlp<F: Float> {
    layers: Vec<DenseLayer<F>>,
}

impl<F: Float> Mlp<F> {
    pub fn new(layers: Vec<DenseLayer<F>>) -> Result<Self, MlpError> {
        if layers.is_empty() {
            return Err(MlpError::EmptyNetwork);
        }
        for pair in layers.windows(2) {
            if pair[0].outputs() != pair[1].inputs() {
                return Err(MlpError::ShapeMismatch {
                    expected: pair[0].outputs(),
                    actual: pair[1].inputs(),
                });
            }
        }
        Ok(Self { layers })
    }

    pub fn layers(&self) -> &[DenseLayer<F>] {
        &self.layers
    }

    pub fn input_width(&self) -> usize {
        self.layers[0].inputs()
    }

    pub fn output_width(&self) -> usize {
        self.layers[self.layers.len() - 1].outputs()
    }

    /// Runs `x` through every layer in order.
    pub fn forward(&self, x: ArrayView1<F>) -> Result<Array1<F>, MlpError> {
        if x.len() != self.input_width() {
            return Err(MlpError::ShapeMismatch {
                expected: self.input_width(),
                actual: x.len(),
            });
        }
        let mut activations = x.to_owned();
        for layer in &self.layers {
            activations = layer.forward(activations.view());
        }
        Ok(activations)
    }
}
