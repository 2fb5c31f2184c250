//! Inference backends.
//!
//! [`InferenceAdapter`] is the three-operation contract a model family has to
//! provide. A loaded adapter together with its model and scaler becomes a
//! [`Predictor`], which is what the validator holds on to.

mod dense;
mod knn;

use std::fmt::{Display, Formatter};
use std::fs;
use std::path::Path;
use std::str::FromStr;

use ndarray::ArrayView1;
use serde::de::DeserializeOwned;
use tracing::{error, info};
use trivalid_helpers::StandardScaler;

use crate::error::{ConfigError, InferenceError, ModelLoadError, ScalerLoadError};
use crate::sides::SideTriple;

pub use self::dense::MlpAdapter;
pub use self::knn::{KnnAdapter, KnnModel};

/// Number of features every backend consumes: the three sides.
pub const N_FEATURES: usize = 3;

/// The operations the validator needs from a model family.
pub trait InferenceAdapter: Send + Sync {
    type Model: Send + Sync;
    type Scaler: Send + Sync;

    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    fn load_model(&self, path: &Path) -> Result<Self::Model, ModelLoadError>;

    fn load_scaler(&self, path: &Path) -> Result<Self::Scaler, ScalerLoadError>;

    /// Scales `sides` and runs the model, returning the confidence that the
    /// sides form a triangle.
    fn predict(
        &self,
        model: &Self::Model,
        scaler: &Self::Scaler,
        sides: ArrayView1<f64>,
    ) -> Result<f64, InferenceError>;
}

/// A ready-to-use model. Implementations must be safe to share across threads
/// and must not mutate state in `predict`.
pub trait Predictor: Send + Sync {
    fn name(&self) -> &str;

    fn predict(&self, sides: &SideTriple) -> Result<f64, InferenceError>;
}

/// An adapter bundled with the artifacts it loaded.
pub struct Loaded<A: InferenceAdapter> {
    adapter: A,
    model: A::Model,
    scaler: A::Scaler,
}

impl<A: InferenceAdapter> Loaded<A> {
    /// Loads both artifacts. Both loads are attempted so that every problem is
    /// logged, even when the first one already failed.
    pub fn load(adapter: A, model_path: &Path, scaler_path: &Path) -> Result<Self, String> {
        let model = adapter.load_model(model_path).inspect_err(|e| {
            error!(backend = adapter.name(), error = %e, "failed to load model");
        });
        if model.is_ok() {
            info!(backend = adapter.name(), path = %model_path.display(), "model loaded");
        }
        let scaler = adapter.load_scaler(scaler_path).inspect_err(|e| {
            error!(backend = adapter.name(), error = %e, "failed to load scaler");
        });
        if scaler.is_ok() {
            info!(backend = adapter.name(), path = %scaler_path.display(), "scaler loaded");
        }

        match (model, scaler) {
            (Ok(model), Ok(scaler)) => Ok(Self {
                adapter,
                model,
                scaler,
            }),
            (Err(m), Err(s)) => Err(format!("{m}; {s}")),
            (Err(m), Ok(_)) => Err(m.to_string()),
            (Ok(_), Err(s)) => Err(s.to_string()),
        }
    }
}

impl<A: InferenceAdapter> Predictor for Loaded<A> {
    fn name(&self) -> &str {
        self.adapter.name()
    }

    fn predict(&self, sides: &SideTriple) -> Result<f64, InferenceError> {
        let features = sides.features();
        let score = self
            .adapter
            .predict(&self.model, &self.scaler, features.view())?;
        if !(0.0..=1.0).contains(&score) {
            return Err(InferenceError::ScoreOutOfRange(score));
        }
        Ok(score)
    }
}

/// The closed set of supported model families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    #[default]
    Mlp,
    Knn,
}

impl BackendKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BackendKind::Mlp => "mlp",
            BackendKind::Knn => "knn",
        }
    }

    /// Model file shipped for this backend, relative to the install root.
    pub fn default_model_path(self) -> &'static str {
        match self {
            BackendKind::Mlp => "models/model.json",
            BackendKind::Knn => "models/knn.json",
        }
    }
}

impl Display for BackendKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mlp" | "dense" => Ok(BackendKind::Mlp),
            "knn" | "k-nn" => Ok(BackendKind::Knn),
            _ => Err(ConfigError::UnsupportedBackend(s.to_string())),
        }
    }
}

/// The inference side of a validator, fixed at construction.
///
/// There is no transition out of either state.
pub enum BackendHandle {
    Loaded(Box<dyn Predictor>),
    Degraded { reason: String },
}

impl BackendHandle {
    /// Loads the artifacts for `kind`. Failures are logged and produce a
    /// degraded handle rather than an error.
    pub fn acquire(kind: BackendKind, model_path: &Path, scaler_path: &Path) -> Self {
        match kind {
            BackendKind::Mlp => Self::from_adapter(MlpAdapter, model_path, scaler_path),
            BackendKind::Knn => Self::from_adapter(KnnAdapter, model_path, scaler_path),
        }
    }

    pub fn from_adapter<A>(adapter: A, model_path: &Path, scaler_path: &Path) -> Self
    where
        A: InferenceAdapter + 'static,
    {
        match Loaded::load(adapter, model_path, scaler_path) {
            Ok(loaded) => BackendHandle::Loaded(Box::new(loaded)),
            Err(reason) => {
                error!(%reason, "inference unavailable, continuing with geometric checks only");
                BackendHandle::Degraded { reason }
            }
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, BackendHandle::Degraded { .. })
    }
}

impl std::fmt::Debug for BackendHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendHandle::Loaded(p) => f.debug_tuple("Loaded").field(&p.name()).finish(),
            BackendHandle::Degraded { reason } => {
                f.debug_struct("Degraded").field("reason", reason).finish()
            }
        }
    }
}

enum ReadError {
    Io(std::io::Error),
    Parse(String),
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ReadError> {
    let content = fs::read_to_string(path).map_err(ReadError::Io)?;
    serde_json::from_str(&content).map_err(|e| ReadError::Parse(e.to_string()))
}

fn read_model_json<T: DeserializeOwned>(path: &Path) -> Result<T, ModelLoadError> {
    read_json(path).map_err(|e| match e {
        ReadError::Io(source) => ModelLoadError::Io {
            path: path.to_path_buf(),
            source,
        },
        ReadError::Parse(message) => ModelLoadError::Corrupt {
            path: path.to_path_buf(),
            message,
        },
    })
}

/// Reads a fitted standard scaler (`{"mean": [..], "scale": [..]}`) for the
/// three side features. Shared by every backend.
pub(crate) fn load_standard_scaler(path: &Path) -> Result<StandardScaler<f64>, ScalerLoadError> {
    let scaler: StandardScaler<f64> = read_json(path).map_err(|e| match e {
        ReadError::Io(source) => ScalerLoadError::Io {
            path: path.to_path_buf(),
            source,
        },
        ReadError::Parse(message) => ScalerLoadError::Corrupt {
            path: path.to_path_buf(),
            message,
        },
    })?;
    if scaler.n_features() != N_FEATURES {
        return Err(ScalerLoadError::Corrupt {
            path: path.to_path_buf(),
            message: format!(
                "expected {} features, found {}",
                N_FEATURES,
                scaler.n_features()
            ),
        });
    }
    Ok(scaler)
}

/// Scales a feature vector, reporting a width problem as an inference error.
pub(crate) fn scale(
    scaler: &StandardScaler<f64>,
    sides: ArrayView1<f64>,
) -> Result<ndarray::Array1<f64>, InferenceError> {
    scaler
        .transform(sides)
        .map_err(|e| InferenceError::Shape(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_backend_kind_parsing() {
        assert_eq!("mlp".parse::<BackendKind>().unwrap(), BackendKind::Mlp);
        assert_eq!(" KNN ".parse::<BackendKind>().unwrap(), BackendKind::Knn);
        assert_eq!("Dense".parse::<BackendKind>().unwrap(), BackendKind::Mlp);
        assert_eq!(
            "tensorflow".parse::<BackendKind>().unwrap_err(),
            ConfigError::UnsupportedBackend("tensorflow".to_string())
        );
    }

    #[test]
    fn test_backend_kind_display_roundtrip() {
        for kind in [BackendKind::Mlp, BackendKind::Knn] {
            assert_eq!(kind.to_string().parse::<BackendKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_default_model_path_follows_backend() {
        assert_eq!(BackendKind::Mlp.default_model_path(), "models/model.json");
        assert_eq!(BackendKind::Knn.default_model_path(), "models/knn.json");
    }

    #[test]
    fn test_scaler_file_must_have_three_features() {
        let file = write_temp(r#"{"mean":[0.0,0.0],"scale":[1.0,1.0]}"#);
        let err = load_standard_scaler(file.path()).unwrap_err();
        assert!(matches!(err, ScalerLoadError::Corrupt { .. }));
    }

    #[test]
    fn test_scaler_file_missing() {
        let err = load_standard_scaler(Path::new("/nonexistent/scaler.json")).unwrap_err();
        assert!(matches!(err, ScalerLoadError::Io { .. }));
    }

    #[test]
    fn test_scaler_file_corrupt() {
        let file = write_temp("not json at all");
        let err = load_standard_scaler(file.path()).unwrap_err();
        assert!(matches!(err, ScalerLoadError::Corrupt { .. }));
    }

    #[test]
    fn test_acquire_degrades_on_missing_artifacts() {
        let handle = BackendHandle::acquire(
            BackendKind::Mlp,
            Path::new("/nonexistent/model.json"),
            Path::new("/nonexistent/scaler.json"),
        );
        match handle {
            BackendHandle::Degraded { reason } => {
                assert!(reason.contains("model.json"));
                assert!(reason.contains("scaler.json"));
            }
            BackendHandle::Loaded(_) => panic!("expected a degraded handle"),
        }
    }

    const IDENTITY_SCALER: &str = r#"{"mean":[0.0,0.0,0.0],"scale":[1.0,1.0,1.0]}"#;

    fn linear_validator(weight: f64) -> crate::TriangleValidator {
        let model = write_temp(&format!(
            r#"{{"layers":[{{"weights":[[{w}],[{w}],[{w}]],"bias":[0.0],"activation":"identity"}}]}}"#,
            w = weight
        ));
        let scaler = write_temp(IDENTITY_SCALER);
        let loaded = Loaded::load(MlpAdapter, model.path(), scaler.path()).unwrap();
        crate::TriangleValidator::with_predictor(Box::new(loaded), 0.5).unwrap()
    }

    #[test]
    fn test_score_above_one_drops_ai_fields() {
        let validator = linear_validator(1.0);
        let verdict = validator.validate(3.0, 4.0, 5.0).unwrap();
        assert!(verdict.math_result());
        assert!(verdict.ai().is_none());
        assert_eq!(verdict.ai_prediction_value(), None);
        assert_eq!(verdict.is_valid_by_ai(), None);
        assert_eq!(verdict.is_consistent(), None);
    }

    #[test]
    fn test_score_below_zero_drops_ai_fields() {
        let validator = linear_validator(-1.0);
        let verdict = validator.validate(1.0, 1.0, 1.0).unwrap();
        assert!(verdict.math_result());
        assert!(verdict.ai().is_none());
    }

    #[test]
    fn test_score_in_range_keeps_ai_fields() {
        let validator = linear_validator(1.0);
        let verdict = validator.validate(0.1, 0.2, 0.25).unwrap();
        let ai = verdict.ai().expect("score 0.55 is in range");
        approx::assert_abs_diff_eq!(ai.score(), 0.55, epsilon = 1e-12);
        assert!(ai.is_valid());
        assert!(ai.is_consistent());
    }

    struct ConstantAdapter(f64);

    impl InferenceAdapter for ConstantAdapter {
        type Model = ();
        type Scaler = ();

        fn name(&self) -> &'static str {
            "constant"
        }

        fn load_model(&self, _path: &Path) -> Result<(), ModelLoadError> {
            Ok(())
        }

        fn load_scaler(&self, _path: &Path) -> Result<(), ScalerLoadError> {
            Ok(())
        }

        fn predict(&self, _: &(), _: &(), _: ArrayView1<f64>) -> Result<f64, InferenceError> {
            Ok(self.0)
        }
    }

    #[test]
    fn test_loaded_rejects_scores_outside_unit_interval() {
        let sides = SideTriple::new(3.0, 4.0, 5.0).unwrap();
        for bad in [f64::NAN, -0.1, 1.5, f64::INFINITY] {
            let loaded = Loaded::load(ConstantAdapter(bad), Path::new("m"), Path::new("s")).unwrap();
            let err = loaded.predict(&sides).unwrap_err();
            assert!(matches!(err, InferenceError::ScoreOutOfRange(_)), "score {bad}");
        }
        for good in [0.0, 0.5, 1.0] {
            let loaded = Loaded::load(ConstantAdapter(good), Path::new("m"), Path::new("s")).unwrap();
            assert_eq!(loaded.predict(&sides).unwrap(), good);
        }
    }

    #[test]
    fn test_nan_score_drops_ai_fields() {
        let loaded = Loaded::load(ConstantAdapter(f64::NAN), Path::new("m"), Path::new("s")).unwrap();
        let validator = crate::TriangleValidator::with_predictor(Box::new(loaded), 0.5).unwrap();
        let verdict = validator.validate(3.0, 4.0, 5.0).unwrap();
        assert!(verdict.math_result());
        assert!(verdict.ai().is_none());
    }
}
