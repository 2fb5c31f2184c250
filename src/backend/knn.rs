//! Nearest-neighbour backend: the score is the share of valid reference
//! triples among the `k` closest ones.

use std::path::Path;

use k_nn::{KnnClassifier, KnnError};
use ndarray::{ArrayView1, arr1};
use serde::Deserialize;
use trivalid_helpers::{DataPoint, Distance, L1Dist, L2Dist, LInfDist, StandardScaler};

use super::{InferenceAdapter, N_FEATURES, load_standard_scaler, read_model_json, scale};
use crate::error::{InferenceError, ModelLoadError, ScalerLoadError};

#[derive(Debug, Clone, Copy, Default)]
pub struct KnnAdapter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Metric {
    L1,
    #[default]
    L2,
    #[serde(alias = "l-infinity")]
    Linf,
}

#[derive(Debug, Deserialize)]
struct ModelFile {
    k: usize,
    #[serde(default)]
    metric: Metric,
    samples: Vec<SampleRecord>,
}

#[derive(Debug, Deserialize)]
struct SampleRecord {
    features: Vec<f64>,
    label: bool,
}

// Helper trait to erase the distance type of the generic classifier
trait VoteShare: Send + Sync {
    fn valid_share(&self, features: ArrayView1<f64>) -> Result<f64, KnnError>;
}

impl<D: 'static + Distance<f64> + Send + Sync> VoteShare for KnnClassifier<bool, f64, D> {
    fn valid_share(&self, features: ArrayView1<f64>) -> Result<f64, KnnError> {
        self.vote_share(features, |&label| label)
    }
}

/// Reference triples in scaled feature space, labelled by whether they form
/// a triangle.
pub struct KnnModel {
    classifier: Box<dyn VoteShare>,
    k: usize,
    n_samples: usize,
}

impl KnnModel {
    pub fn k(&self) -> usize {
        self.k
    }

    pub fn n_samples(&self) -> usize {
        self.n_samples
    }
}

impl std::fmt::Debug for KnnModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KnnModel")
            .field("k", &self.k)
            .field("n_samples", &self.n_samples)
            .finish()
    }
}

fn build_model(file: ModelFile) -> Result<KnnModel, String> {
    if file.samples.is_empty() {
        return Err("model has no reference samples".to_string());
    }
    let mut data = Vec::with_capacity(file.samples.len());
    for (i, sample) in file.samples.into_iter().enumerate() {
        if sample.features.len() != N_FEATURES {
            return Err(format!(
                "sample {} has {} features, expected {}",
                i,
                sample.features.len(),
                N_FEATURES
            ));
        }
        if sample.features.iter().any(|v| !v.is_finite()) {
            return Err(format!("sample {} has a non-finite feature", i));
        }
        data.push(DataPoint::new(arr1(&sample.features), sample.label));
    }

    let k = file.k;
    let n_samples = data.len();
    let classifier: Box<dyn VoteShare> = match file.metric {
        Metric::L1 => Box::new(KnnClassifier::new(k, data, L1Dist).map_err(|e| e.to_string())?),
        Metric::L2 => Box::new(KnnClassifier::new(k, data, L2Dist).map_err(|e| e.to_string())?),
        Metric::Linf => Box::new(KnnClassifier::new(k, data, LInfDist).map_err(|e| e.to_string())?),
    };
    Ok(KnnModel {
        classifier,
        k,
        n_samples,
    })
}

impl InferenceAdapter for KnnAdapter {
    type Model = KnnModel;
    type Scaler = StandardScaler<f64>;

    fn name(&self) -> &'static str {
        "knn"
    }

    fn load_model(&self, path: &Path) -> Result<KnnModel, ModelLoadError> {
        let file: ModelFile = read_model_json(path)?;
        build_model(file).map_err(|message| ModelLoadError::Corrupt {
            path: path.to_path_buf(),
            message,
        })
    }

    fn load_scaler(&self, path: &Path) -> Result<StandardScaler<f64>, ScalerLoadError> {
        load_standard_scaler(path)
    }

    fn predict(
        &self,
        model: &KnnModel,
        scaler: &StandardScaler<f64>,
        sides: ArrayView1<f64>,
    ) -> Result<f64, InferenceError> {
        let scaled = scale(scaler, sides)?;
        model
            .classifier
            .valid_share(scaled.view())
            .map_err(|e| match e {
                KnnError::DimensionMismatch { .. } => InferenceError::Shape(e.to_string()),
                other => InferenceError::Backend(other.to_string()),
            })
    }
}
