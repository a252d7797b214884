use serde::{Deserialize, Serialize};

use crate::domain::model::FeatureVector;
use crate::domain::ports::PriceModel;
use crate::utils::error::ModelError;

pub const DEFAULT_PRICE_PER_SQFT: f64 = 50.0;
pub const DEFAULT_BASE_PRICE: f64 = 1_000_000.0;

/// Non-authoritative stand-in used when no trained model could be loaded:
/// `area * price_per_sqft + base_price`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FallbackEstimator {
    pub price_per_sqft: f64,
    pub base_price: f64,
}

impl FallbackEstimator {
    pub fn new(price_per_sqft: f64, base_price: f64) -> Self {
        Self {
            price_per_sqft,
            base_price,
        }
    }

    pub fn predict_row(&self, row: &FeatureVector) -> f64 {
        // area 固定在第 0 欄
        row.0[0] * self.price_per_sqft + self.base_price
    }
}

impl Default for FallbackEstimator {
    fn default() -> Self {
        Self::new(DEFAULT_PRICE_PER_SQFT, DEFAULT_BASE_PRICE)
    }
}

impl PriceModel for FallbackEstimator {
    fn predict(&self, rows: &[FeatureVector]) -> Result<Vec<f64>, ModelError> {
        if rows.is_empty() {
            return Err(ModelError::EmptyBatch);
        }
        Ok(rows.iter().map(|row| self.predict_row(row)).collect())
    }

    fn name(&self) -> &str {
        "fallback-linear-area"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::encoder::encode;
    use crate::domain::model::PropertyInput;

    #[test]
    fn test_default_fallback_uses_area_only() {
        let fallback = FallbackEstimator::default();
        let row = encode(&PropertyInput::default());
        assert_eq!(fallback.predict(&[row]).unwrap(), vec![1_250_000.0]);

        let other = encode(&PropertyInput {
            bedrooms: 9,
            prefarea: "No".into(),
            ..PropertyInput::default()
        });
        assert_eq!(fallback.predict_row(&other), 1_250_000.0);
    }

    #[test]
    fn test_fallback_keeps_row_order() {
        let fallback = FallbackEstimator::new(100.0, 0.0);
        let rows: Vec<_> = [1000.0, 2000.0, 3000.0]
            .iter()
            .map(|area| {
                encode(&PropertyInput {
                    area: *area,
                    ..PropertyInput::default()
                })
            })
            .collect();
        assert_eq!(
            fallback.predict(&rows).unwrap(),
            vec![100_000.0, 200_000.0, 300_000.0]
        );
        assert_eq!(fallback.predict(&[]), Err(ModelError::EmptyBatch));
    }
}
