//! Dense-network backend: a feed-forward pass ending in one sigmoid unit.

use std::path::Path;

use mlp::{Activation, DenseLayer, Mlp};
use ndarray::{Array1, Array2, ArrayView1};
use serde::Deserialize;
use trivalid_helpers::StandardScaler;

use super::{InferenceAdapter, N_FEATURES, load_standard_scaler, read_model_json, scale};
use crate::error::{InferenceError, ModelLoadError, ScalerLoadError};

#[derive(Debug, Clone, Copy, Default)]
pub struct MlpAdapter;

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ActivationName {
    Relu,
    Sigmoid,
    #[serde(alias = "linear")]
    Identity,
}

impl From<ActivationName> for Activation {
    fn from(name: ActivationName) -> Self {
        match name {
            ActivationName::Relu => Activation::Relu,
            ActivationName::Sigmoid => Activation::Sigmoid,
            ActivationName::Identity => Activation::Identity,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ModelFile {
    layers: Vec<LayerRecord>,
}

/// `weights[i][j]` connects input `i` to output `j`.
#[derive(Debug, Deserialize)]
struct LayerRecord {
    weights: Vec<Vec<f64>>,
    bias: Vec<f64>,
    activation: ActivationName,
}

fn build_layer(index: usize, record: LayerRecord) -> Result<DenseLayer<f64>, String> {
    let rows = record.weights.len();
    let cols = record.weights.first().map_or(0, Vec::len);
    if rows == 0 || cols == 0 {
        return Err(format!("layer {} has an empty weight matrix", index));
    }
    if record.weights.iter().any(|row| row.len() != cols) {
        return Err(format!("layer {} has ragged weight rows", index));
    }
    let flat: Vec<f64> = record.weights.into_iter().flatten().collect();
    let weights = Array2::from_shape_vec((rows, cols), flat).map_err(|e| e.to_string())?;
    DenseLayer::new(weights, Array1::from(record.bias), record.activation.into())
        .map_err(|e| format!("layer {}: {}", index, e))
}

fn build_network(file: ModelFile) -> Result<Mlp<f64>, String> {
    let layers = file
        .layers
        .into_iter()
        .enumerate()
        .map(|(i, record)| build_layer(i, record))
        .collect::<Result<Vec<_>, _>>()?;
    let net = Mlp::new(layers).map_err(|e| e.to_string())?;
    if net.input_width() != N_FEATURES {
        return Err(format!(
            "network takes {} inputs, expected {}",
            net.input_width(),
            N_FEATURES
        ));
    }
    if net.output_width() != 1 {
        return Err(format!(
            "network produces {} outputs, expected a single score",
            net.output_width()
        ));
    }
    Ok(net)
}

impl InferenceAdapter for MlpAdapter {
    type Model = Mlp<f64>;
    type Scaler = StandardScaler<f64>;

    fn name(&self) -> &'static str {
        "mlp"
    }

    fn load_model(&self, path: &Path) -> Result<Mlp<f64>, ModelLoadError> {
        let file: ModelFile = read_model_json(path)?;
        build_network(file).map_err(|message| ModelLoadError::Corrupt {
            path: path.to_path_buf(),
            message,
        })
    }

    fn load_scaler(&self, path: &Path) -> Result<StandardScaler<f64>, ScalerLoadError> {
        load_standard_scaler(path)
    }

    fn predict(
        &self,
        model: &Mlp<f64>,
        scaler: &StandardScaler<f64>,
        sides: ArrayView1<f64>,
    ) -> Result<f64, InferenceError> {
        let scaled = scale(scaler, sides)?;
        let output = model
            .forward(scaled.view())
            .map_err(|e| InferenceError::Shape(e.to_string()))?;
        let score = output
            .first()
            .copied()
            .ok_or_else(|| InferenceError::Backend("network produced no output".to_string()))?;
        if !score.is_finite() {
            return Err(InferenceError::Backend(format!("non-finite score {}", score)));
        }
        Ok(score)
    }
}
