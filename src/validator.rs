//! Combines the geometric check with a model prediction.

use tracing::{debug, warn};

use crate::backend::{BackendHandle, Predictor};
use crate::config::{ThresholdProfile, ValidatorConfig};
use crate::error::{ConfigError, InputFormatError};
use crate::geometry;
use crate::sides::SideTriple;
use crate::verdict::{AiAssessment, Verdict};

/// Validates side triples.
///
/// The backend handle is decided once, in the constructor, and never changes
/// afterwards. `validate` only reads it, so a validator can be shared between
/// threads behind an `Arc` without locking.
#[derive(Debug)]
pub struct TriangleValidator {
    backend: BackendHandle,
    threshold: f64,
}

impl TriangleValidator {
    /// Builds a validator from configuration.
    ///
    /// A bad backend name or threshold is an error. Missing or corrupt
    /// artifacts are not: the validator falls back to geometric checks only.
    pub fn from_config(config: &ValidatorConfig) -> Result<Self, ConfigError> {
        let kind = config.validate()?;
        let backend = BackendHandle::acquire(kind, &config.model_path, &config.scaler_path);
        Ok(Self {
            backend,
            threshold: config.threshold,
        })
    }

    /// Uses an already loaded predictor.
    pub fn with_predictor(predictor: Box<dyn Predictor>, threshold: f64) -> Result<Self, ConfigError> {
        check_threshold(threshold)?;
        Ok(Self {
            backend: BackendHandle::Loaded(predictor),
            threshold,
        })
    }

    /// A validator that never consults a model.
    pub fn degraded(reason: impl Into<String>) -> Self {
        Self {
            backend: BackendHandle::Degraded {
                reason: reason.into(),
            },
            threshold: ThresholdProfile::Standard.threshold(),
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn is_degraded(&self) -> bool {
        self.backend.is_degraded()
    }

    pub fn degraded_reason(&self) -> Option<&str> {
        match &self.backend {
            BackendHandle::Degraded { reason } => Some(reason),
            BackendHandle::Loaded(_) => None,
        }
    }

    pub fn backend_name(&self) -> Option<&str> {
        match &self.backend {
            BackendHandle::Loaded(predictor) => Some(predictor.name()),
            BackendHandle::Degraded { .. } => None,
        }
    }

    /// Validates raw numbers. Only NaN or infinite sides are rejected.
    pub fn validate(&self, a: f64, b: f64, c: f64) -> Result<Verdict, InputFormatError> {
        let sides = SideTriple::new(a, b, c)?;
        Ok(self.validate_sides(&sides))
    }

    /// Validates text fields, as typed into a form.
    pub fn validate_str(&self, a: &str, b: &str, c: &str) -> Result<Verdict, InputFormatError> {
        let sides = SideTriple::parse(a, b, c)?;
        Ok(self.validate_sides(&sides))
    }

    /// Produces a verdict. The geometric result is always present; the model
    /// fields are filled in only when a prediction succeeded.
    pub fn validate_sides(&self, sides: &SideTriple) -> Verdict {
        let sides = sides.normalized();
        let math_result = geometry::is_triangle(sides.a(), sides.b(), sides.c());

        let ai = self
            .predict(&sides)
            .map(|score| AiAssessment::new(score, self.threshold, math_result));

        debug!(
            %sides,
            math_result,
            score = ai.map(|ai| ai.score()),
            consistent = ai.map(|ai| ai.is_consistent()),
            "validated"
        );
        Verdict::new(sides, math_result, ai)
    }

    fn predict(&self, sides: &SideTriple) -> Option<f64> {
        let predictor = match &self.backend {
            BackendHandle::Loaded(predictor) => predictor,
            BackendHandle::Degraded { .. } => return None,
        };
        if sides.has_non_positive() {
            debug!(%sides, "skipping inference for non-positive side");
            return None;
        }
        match predictor.predict(sides) {
            Ok(score) => Some(score),
            Err(e) => {
                warn!(%sides, backend = predictor.name(), error = %e, "inference failed, reporting geometric result only");
                None
            }
        }
    }
}

fn check_threshold(threshold: f64) -> Result<(), ConfigError> {
    if threshold.is_finite() && (0.0..1.0).contains(&threshold) {
        Ok(())
    } else {
        Err(ConfigError::InvalidThreshold(threshold))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InferenceError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Fixed(f64);

    impl Predictor for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        fn predict(&self, _sides: &SideTriple) -> Result<f64, InferenceError> {
            Ok(self.0)
        }
    }

    struct Counting(Arc<AtomicUsize>);

    impl Predictor for Counting {
        fn name(&self) -> &str {
            "counting"
        }

        fn predict(&self, _sides: &SideTriple) -> Result<f64, InferenceError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(0.8)
        }
    }

    #[test]
    fn test_sides_are_normalized() {
        let validator = TriangleValidator::with_predictor(Box::new(Fixed(0.9)), 0.5).unwrap();
        let verdict = validator.validate(5.0, 3.0, 4.0).unwrap();
        assert_eq!(verdict.sides().as_array(), [3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_non_positive_side_skips_inference() {
        let calls = Arc::new(AtomicUsize::new(0));
        let validator =
            TriangleValidator::with_predictor(Box::new(Counting(calls.clone())), 0.5).unwrap();

        let verdict = validator.validate(0.0, 4.0, 5.0).unwrap();
        assert!(!verdict.math_result());
        assert!(!verdict.has_ai());
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        validator.validate(3.0, 4.0, 5.0).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_validate_str_reports_format_errors() {
        let validator = TriangleValidator::degraded("no model");
        assert!(matches!(
            validator.validate_str("3", "x", "5"),
            Err(InputFormatError::NotANumber { field: 'b', .. })
        ));
        assert!(validator.validate_str("3", "4", "5").unwrap().math_result());
    }

    #[test]
    fn test_validate_rejects_non_finite() {
        let validator = TriangleValidator::degraded("no model");
        assert!(validator.validate(f64::NAN, 1.0, 1.0).is_err());
    }

    #[test]
    fn test_with_predictor_checks_threshold() {
        assert!(TriangleValidator::with_predictor(Box::new(Fixed(0.5)), 1.2).is_err());
        let validator = TriangleValidator::with_predictor(Box::new(Fixed(0.5)), 0.9).unwrap();
        assert_eq!(validator.threshold(), 0.9);
        assert_eq!(validator.backend_name(), Some("fixed"));
        assert!(!validator.is_degraded());
    }

    #[test]
    fn test_degraded_reason() {
        let validator = TriangleValidator::degraded("model file missing");
        assert!(validator.is_degraded());
        assert_eq!(validator.degraded_reason(), Some("model file missing"));
        assert_eq!(validator.backend_name(), None);
    }

    #[test]
    fn test_from_config_rejects_unknown_backend() {
        let config = ValidatorConfig {
            backend: "tensorflow".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            TriangleValidator::from_config(&config),
            Err(ConfigError::UnsupportedBackend(_))
        ));
    }
}
