//! Gradient-boosted regression trees backed by the `gbdt` crate.
//!
//! The booster is stored inside the model artifact together with the feature
//! names it was fit on, so a model trained on another column layout is
//! rejected at load time.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use chrono::{DateTime, Utc};
use gbdt::config::Config;
use gbdt::decision_tree::{Data, DataVec, ValueType};
use gbdt::gradient_boost::GBDT;
use serde::{Deserialize, Serialize};

use crate::domain::model::{FeatureVector, FEATURE_COUNT, FEATURE_NAMES};
use crate::domain::ports::PriceModel;
use crate::utils::error::{EstimatorError, ModelError, Result};
use crate::utils::validation::{validate_range, Validate};

pub const MAX_ESTIMATORS: usize = 10_000;
pub const MAX_DEPTH_LIMIT: usize = 32;
pub const MAX_MIN_SAMPLES_LEAF: usize = 100_000;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingParams {
    pub n_estimators: usize,
    pub learning_rate: f64,
    pub max_depth: usize,
    pub min_samples_leaf: usize,
}

impl Default for TrainingParams {
    fn default() -> Self {
        Self {
            n_estimators: 200,
            learning_rate: 0.1,
            max_depth: 4,
            min_samples_leaf: 1,
        }
    }
}

impl Validate for TrainingParams {
    fn validate(&self) -> Result<()> {
        validate_range("training.n_estimators", self.n_estimators, 1, MAX_ESTIMATORS)?;
        validate_range("training.max_depth", self.max_depth, 1, MAX_DEPTH_LIMIT)?;
        validate_range(
            "training.min_samples_leaf",
            self.min_samples_leaf,
            1,
            MAX_MIN_SAMPLES_LEAF,
        )?;

        if !(self.learning_rate > 0.0 && self.learning_rate <= 1.0) {
            return Err(EstimatorError::InvalidConfigValueError {
                field: "training.learning_rate".to_string(),
                value: self.learning_rate.to_string(),
                reason: "Value must be greater than 0 and at most 1".to_string(),
            });
        }
        Ok(())
    }
}

impl TrainingParams {
    /// Booster configuration for squared-error regression over the encoded columns.
    fn booster_config(&self) -> Config {
        let mut cfg = Config::new();
        cfg.set_feature_size(FEATURE_COUNT);
        // validate() 已限制在 MAX_DEPTH_LIMIT 之內
        cfg.set_max_depth(self.max_depth as u32);
        cfg.set_iterations(self.n_estimators);
        cfg.set_shrinkage(self.learning_rate as ValueType);
        cfg.set_min_leaf_size(self.min_samples_leaf);
        cfg.set_loss("SquaredError");
        // 不抽樣，訓練結果可重現
        cfg.set_data_sample_ratio(1.0);
        cfg.set_feature_sample_ratio(1.0);
        cfg.set_training_optimization_level(2);
        cfg.set_debug(false);
        cfg
    }
}

/// The persisted model: booster plus the metadata needed to trust it.
#[derive(Serialize, Deserialize)]
pub struct GradientBoostedModel {
    pub feature_names: Vec<String>,
    pub params: TrainingParams,
    pub n_samples: usize,
    pub trained_at: DateTime<Utc>,
    booster: GBDT,
}

impl fmt::Debug for GradientBoostedModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GradientBoostedModel")
            .field("feature_names", &self.feature_names)
            .field("params", &self.params)
            .field("n_samples", &self.n_samples)
            .field("trained_at", &self.trained_at)
            .finish_non_exhaustive()
    }
}

impl GradientBoostedModel {
    pub fn fit(rows: &[FeatureVector], targets: &[f64], params: &TrainingParams) -> Result<Self> {
        params.validate()?;

        if rows.is_empty() {
            return Err(EstimatorError::TrainingError {
                message: "no training rows".to_string(),
            });
        }
        if rows.len() != targets.len() {
            return Err(EstimatorError::TrainingError {
                message: format!(
                    "{} feature rows but {} targets",
                    rows.len(),
                    targets.len()
                ),
            });
        }

        let mut data: DataVec = Vec::with_capacity(rows.len());
        for (pos, (row, target)) in rows.iter().zip(targets).enumerate() {
            let label = *target as ValueType;
            if !label.is_finite() {
                return Err(EstimatorError::TrainingError {
                    message: format!("target at row {} is not a finite number", pos),
                });
            }
            let feature = to_values(row);
            if feature.iter().any(|v| !v.is_finite()) {
                return Err(EstimatorError::TrainingError {
                    message: format!("features at row {} contain a non-finite value", pos),
                });
            }
            data.push(Data::new_training_data(feature, 1.0, label, None));
        }

        tracing::debug!(
            "Fitting {} trees (depth {}, learning rate {}) on {} rows",
            params.n_estimators,
            params.max_depth,
            params.learning_rate,
            data.len()
        );

        let mut booster = GBDT::new(&params.booster_config());
        booster.fit(&mut data);

        Ok(Self {
            feature_names: FEATURE_NAMES.iter().map(|n| n.to_string()).collect(),
            params: *params,
            n_samples: rows.len(),
            trained_at: Utc::now(),
            booster,
        })
    }

    /// One tree per boosting round.
    pub fn n_trees(&self) -> usize {
        self.params.n_estimators
    }

    /// Checks that a deserialized model matches the encoder's column layout.
    pub fn check_schema(&self) -> std::result::Result<(), String> {
        let expected: Vec<&str> = FEATURE_NAMES.to_vec();
        let actual: Vec<&str> = self.feature_names.iter().map(String::as_str).collect();
        if actual != expected {
            return Err(format!(
                "feature schema mismatch: expected [{}], artifact has [{}]",
                expected.join(", "),
                actual.join(", ")
            ));
        }
        self.params
            .validate()
            .map_err(|e| format!("invalid training parameters: {}", e))
    }
}

fn to_values(row: &FeatureVector) -> Vec<ValueType> {
    row.as_slice().iter().map(|&v| v as ValueType).collect()
}

impl PriceModel for GradientBoostedModel {
    fn predict(&self, rows: &[FeatureVector]) -> std::result::Result<Vec<f64>, ModelError> {
        if rows.is_empty() {
            return Err(ModelError::EmptyBatch);
        }
        if self.feature_names.len() != FEATURE_COUNT {
            return Err(ModelError::ShapeMismatch {
                expected: self.feature_names.len(),
                actual: FEATURE_COUNT,
            });
        }

        let data: DataVec = rows
            .iter()
            .map(|row| Data::new_test_data(to_values(row), None))
            .collect();

        // booster 以 assert 檢查樹結構，損壞的模型會 panic
        let predicted = panic::catch_unwind(AssertUnwindSafe(|| self.booster.predict(&data)))
            .map_err(|_| ModelError::Internal("booster failed while scoring".to_string()))?;

        Ok(predicted.into_iter().map(f64::from).collect())
    }

    fn name(&self) -> &str {
        "gradient-boosted-trees"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::encoder::encode;
    use crate::domain::model::{PropertyInput, TrainingMetrics};

    fn dataset() -> (Vec<FeatureVector>, Vec<f64>) {
        let mut rows = Vec::new();
        let mut targets = Vec::new();
        for area in (1000..=8000).step_by(500) {
            for prefarea in [true, false] {
                let input = PropertyInput {
                    area: area as f64,
                    prefarea: prefarea.into(),
                    ..PropertyInput::default()
                };
                rows.push(encode(&input));
                let bonus = if prefarea { 500_000.0 } else { 0.0 };
                targets.push(area as f64 * 400.0 + bonus);
            }
        }
        (rows, targets)
    }

    #[test]
    fn test_boosting_fits_training_data() {
        let (rows, targets) = dataset();
        let model = GradientBoostedModel::fit(&rows, &targets, &TrainingParams::default()).unwrap();

        assert_eq!(model.n_trees(), 200);
        assert_eq!(model.n_samples, rows.len());

        let predictions = model.predict(&rows).unwrap();
        assert_eq!(predictions.len(), rows.len());
        let metrics = TrainingMetrics::compute(&predictions, &targets);
        assert!(metrics.r_squared > 0.95, "r2 = {}", metrics.r_squared);
    }

    #[test]
    fn test_fit_is_deterministic() {
        let (rows, targets) = dataset();
        let params = TrainingParams {
            n_estimators: 20,
            ..TrainingParams::default()
        };
        let a = GradientBoostedModel::fit(&rows, &targets, &params).unwrap();
        let b = GradientBoostedModel::fit(&rows, &targets, &params).unwrap();
        assert_eq!(a.predict(&rows).unwrap(), b.predict(&rows).unwrap());
    }

    #[test]
    fn test_fit_rejects_bad_input() {
        let (rows, targets) = dataset();
        assert!(GradientBoostedModel::fit(&[], &[], &TrainingParams::default()).is_err());
        assert!(GradientBoostedModel::fit(&rows, &targets[1..], &TrainingParams::default()).is_err());

        let mut bad_targets = targets.clone();
        bad_targets[3] = f64::NAN;
        assert!(GradientBoostedModel::fit(&rows, &bad_targets, &TrainingParams::default()).is_err());

        let bad_params = TrainingParams {
            learning_rate: 0.0,
            ..TrainingParams::default()
        };
        assert!(matches!(
            GradientBoostedModel::fit(&rows, &targets, &bad_params),
            Err(EstimatorError::InvalidConfigValueError { .. })
        ));
    }

    #[test]
    fn test_params_have_upper_bounds() {
        let too_many_trees = TrainingParams {
            n_estimators: usize::MAX,
            ..TrainingParams::default()
        };
        assert!(matches!(
            too_many_trees.validate(),
            Err(EstimatorError::InvalidConfigValueError { ref field, .. }) if field == "training.n_estimators"
        ));

        let huge_leaf = TrainingParams {
            min_samples_leaf: usize::MAX,
            ..TrainingParams::default()
        };
        assert!(matches!(
            huge_leaf.validate(),
            Err(EstimatorError::InvalidConfigValueError { ref field, .. }) if field == "training.min_samples_leaf"
        ));

        let at_limit = TrainingParams {
            n_estimators: MAX_ESTIMATORS,
            max_depth: MAX_DEPTH_LIMIT,
            min_samples_leaf: MAX_MIN_SAMPLES_LEAF,
            ..TrainingParams::default()
        };
        assert!(at_limit.validate().is_ok());
    }

    #[test]
    fn test_fit_with_huge_estimator_count_is_rejected_not_attempted() {
        let (rows, targets) = dataset();
        let params = TrainingParams {
            n_estimators: usize::MAX,
            ..TrainingParams::default()
        };
        assert!(matches!(
            GradientBoostedModel::fit(&rows[..2], &targets[..2], &params),
            Err(EstimatorError::InvalidConfigValueError { .. })
        ));
    }

    #[test]
    fn test_check_schema_detects_reordered_columns() {
        let (rows, targets) = dataset();
        let params = TrainingParams {
            n_estimators: 2,
            ..TrainingParams::default()
        };
        let mut model = GradientBoostedModel::fit(&rows, &targets, &params).unwrap();
        assert!(model.check_schema().is_ok());

        model.feature_names.swap(1, 2);
        let err = model.check_schema().unwrap_err();
        assert!(err.contains("feature schema mismatch"));
    }

    #[test]
    fn test_check_schema_rejects_out_of_range_params() {
        let (rows, targets) = dataset();
        let params = TrainingParams {
            n_estimators: 2,
            ..TrainingParams::default()
        };
        let mut model = GradientBoostedModel::fit(&rows, &targets, &params).unwrap();
        model.params.max_depth = 0;
        assert!(model
            .check_schema()
            .unwrap_err()
            .contains("invalid training parameters"));
    }

    #[test]
    fn test_predict_rejects_wrong_width_and_empty_batch() {
        let (rows, targets) = dataset();
        let params = TrainingParams {
            n_estimators: 2,
            ..TrainingParams::default()
        };
        let mut model = GradientBoostedModel::fit(&rows, &targets, &params).unwrap();
        assert_eq!(model.predict(&[]), Err(ModelError::EmptyBatch));

        model.feature_names.push("furnishingstatus".to_string());
        assert_eq!(
            model.predict(&rows[..1]),
            Err(ModelError::ShapeMismatch {
                expected: 12,
                actual: 11
            })
        );
    }

    #[test]
    fn test_metrics() {
        let metrics = TrainingMetrics::compute(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]);
        assert_eq!(metrics.rmse, 0.0);
        assert_eq!(metrics.r_squared, 1.0);

        let metrics = TrainingMetrics::compute(&[2.0, 2.0], &[1.0, 3.0]);
        assert_eq!(metrics.rmse, 1.0);
        assert_eq!(metrics.r_squared, 0.0);
    }
}
