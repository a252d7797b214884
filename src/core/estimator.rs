use crate::core::encoder::encode;
use crate::domain::model::{Estimate, ModelWarning, PricePrediction, PropertyInput};
use crate::domain::ports::{PriceModel, SuccessNotifier};
use crate::utils::error::EstimationError;

/// Encodes `input`, submits it as a single row and takes the first output.
pub fn estimate<M: PriceModel>(
    input: &PropertyInput,
    model: &M,
) -> Result<PricePrediction, EstimationError> {
    let features = encode(input);
    tracing::debug!("Encoded features: {:?}", features.0);

    let outputs = model
        .predict(&[features])
        .map_err(|e| EstimationError::PredictionFailed {
            message: e.to_string(),
        })?;

    let raw = *outputs.first().ok_or(EstimationError::EmptyPrediction)?;
    if !raw.is_finite() {
        return Err(EstimationError::NonFinite { value: raw });
    }
    if raw < 0.0 {
        tracing::warn!("Model {} predicted a negative price ({}), clamping to 0", model.name(), raw);
    }

    // raw 已確認為有限值
    PricePrediction::new(raw.max(0.0)).ok_or(EstimationError::NonFinite { value: raw })
}

/// Holds the injected model for the lifetime of the process.
pub struct EstimationService<M: PriceModel, N: SuccessNotifier> {
    model: M,
    warning: Option<ModelWarning>,
    notifier: N,
}

impl<M: PriceModel, N: SuccessNotifier> EstimationService<M, N> {
    pub fn new(model: M, notifier: N) -> Self {
        Self {
            model,
            warning: None,
            notifier,
        }
    }

    /// Every estimate from this service carries `warning`.
    pub fn with_warning(mut self, warning: Option<ModelWarning>) -> Self {
        self.warning = warning;
        self
    }

    pub fn warning(&self) -> Option<&ModelWarning> {
        self.warning.as_ref()
    }

    pub fn estimate(&self, input: &PropertyInput) -> Result<Estimate, EstimationError> {
        match estimate(input, &self.model) {
            Ok(price) => {
                let result = Estimate {
                    price,
                    model_name: self.model.name().to_string(),
                    warning: self.warning.clone(),
                };
                tracing::info!(
                    "💰 Estimated price {} using {}",
                    result.price,
                    result.model_name
                );
                self.notifier.on_success(&result);
                Ok(result)
            }
            Err(e) => {
                tracing::error!("❌ Prediction failed: {}", e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fallback::FallbackEstimator;
    use crate::domain::model::{Estimate, FeatureVector};
    use crate::utils::error::ModelError;
    use std::cell::{Cell, RefCell};

    struct FixedModel(Vec<f64>);

    impl PriceModel for FixedModel {
        fn predict(&self, _rows: &[FeatureVector]) -> Result<Vec<f64>, ModelError> {
            Ok(self.0.clone())
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    struct FailingModel;

    impl PriceModel for FailingModel {
        fn predict(&self, _rows: &[FeatureVector]) -> Result<Vec<f64>, ModelError> {
            Err(ModelError::Internal("feature_names mismatch: missing 'area'".to_string()))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    #[derive(Default)]
    struct RecordingModel {
        seen: RefCell<Vec<Vec<FeatureVector>>>,
    }

    impl PriceModel for RecordingModel {
        fn predict(&self, rows: &[FeatureVector]) -> Result<Vec<f64>, ModelError> {
            self.seen.borrow_mut().push(rows.to_vec());
            Ok(vec![42.0])
        }

        fn name(&self) -> &str {
            "recording"
        }
    }

    #[derive(Default)]
    struct CountingNotifier {
        calls: Cell<usize>,
    }

    impl SuccessNotifier for &CountingNotifier {
        fn on_success(&self, _estimate: &Estimate) {
            self.calls.set(self.calls.get() + 1);
        }
    }

    #[test]
    fn test_estimate_formats_first_output() {
        let price = estimate(&PropertyInput::default(), &FixedModel(vec![1_250_000.0])).unwrap();
        assert_eq!(price.formatted(), "1,250,000");

        let price = estimate(&PropertyInput::default(), &FixedModel(vec![7.0, 99.0])).unwrap();
        assert_eq!(price.amount(), 7.0);
    }

    #[test]
    fn test_estimate_submits_exactly_one_encoded_row() {
        let model = RecordingModel::default();
        let input = PropertyInput {
            guestroom: "No".into(),
            ..PropertyInput::default()
        };
        estimate(&input, &model).unwrap();

        let seen = model.seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0], vec![encode(&input)]);
    }

    #[test]
    fn test_estimate_surfaces_model_error_text() {
        let err = estimate(&PropertyInput::default(), &FailingModel).unwrap_err();
        assert!(matches!(err, EstimationError::PredictionFailed { .. }));
        assert!(err.to_string().contains("feature_names mismatch: missing 'area'"));
    }

    #[test]
    fn test_estimate_rejects_empty_and_non_finite_outputs() {
        assert_eq!(
            estimate(&PropertyInput::default(), &FixedModel(vec![])),
            Err(EstimationError::EmptyPrediction)
        );
        assert!(matches!(
            estimate(&PropertyInput::default(), &FixedModel(vec![f64::NAN])),
            Err(EstimationError::NonFinite { .. })
        ));
    }

    #[test]
    fn test_negative_prediction_is_clamped() {
        let price = estimate(&PropertyInput::default(), &FixedModel(vec![-500.0])).unwrap();
        assert_eq!(price.amount(), 0.0);
    }

    #[test]
    fn test_service_notifies_only_on_success() {
        let notifier = CountingNotifier::default();
        let service = EstimationService::new(FixedModel(vec![1_000.0]), &notifier);
        service.estimate(&PropertyInput::default()).unwrap();
        service.estimate(&PropertyInput::default()).unwrap();
        assert_eq!(notifier.calls.get(), 2);

        let failing = EstimationService::new(FailingModel, &notifier);
        assert!(failing.estimate(&PropertyInput::default()).is_err());
        assert_eq!(notifier.calls.get(), 2);
    }

    #[test]
    fn test_service_stays_usable_after_failure() {
        let notifier = CountingNotifier::default();
        let service = EstimationService::new(FixedModel(vec![]), &notifier);
        assert!(service.estimate(&PropertyInput::default()).is_err());
        assert!(service.estimate(&PropertyInput::default()).is_err());
    }

    #[test]
    fn test_service_attaches_warning() {
        let warning = ModelWarning::new("fallback in use");
        let service = EstimationService::new(FallbackEstimator::default(), crate::domain::ports::NoopNotifier)
            .with_warning(Some(warning.clone()));
        assert_eq!(service.warning(), Some(&warning));

        let result = service.estimate(&PropertyInput::default()).unwrap();
        assert_eq!(result.warning, Some(warning));
        assert!(!result.is_authoritative());
        assert_eq!(result.price.formatted(), "1,250,000");
        assert_eq!(result.model_name, "fallback-linear-area");
    }
}
