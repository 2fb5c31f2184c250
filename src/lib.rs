//! # trivalid
//!
//! Decides whether three side lengths form a triangle, twice: once with the
//! triangle inequality and once with a trained classifier, and reports
//! whether the two agree.
//!
//! ```no_run
//! use trivalid::{TriangleValidator, ValidatorConfig};
//!
//! let validator = TriangleValidator::from_config(&ValidatorConfig::default())?;
//! let verdict = validator.validate(3.0, 4.0, 5.0)?;
//! assert!(verdict.math_result());
//! if let Some(score) = verdict.ai_prediction_value() {
//!     println!("model score {score:.2}, consistent: {:?}", verdict.is_consistent());
//! }
//! # Ok::<(), trivalid::Error>(())
//! ```
//!
//! The geometric answer is always available. When the model or scaler cannot
//! be loaded, or a single prediction fails, the model fields of the
//! [`Verdict`] are absent instead.

pub mod backend;
pub mod config;
pub mod error;
pub mod geometry;
pub mod sides;
pub mod validator;
pub mod verdict;

pub use backend::{BackendHandle, BackendKind, InferenceAdapter, Predictor};
pub use config::{ThresholdProfile, ValidatorConfig};
pub use error::{
    ConfigError, Error, InferenceError, InputFormatError, ModelLoadError, Result, ScalerLoadError,
};
pub use geometry::{Feasibility, is_triangle};
pub use sides::SideTriple;
pub use validator::TriangleValidator;
pub use verdict::{AiAssessment, Verdict};

// Re-export the shared numeric helpers
pub use trivalid_helpers::{DataPoint, Float, StandardScaler};
