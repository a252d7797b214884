use crate::domain::model::{Estimate, ModelWarning};
use crate::domain::ports::SuccessNotifier;
use crate::utils::error::EstimationError;

pub fn render_estimate(estimate: &Estimate, currency_symbol: &str) -> String {
    let mut text = format!(
        "Estimated House Price: {}",
        estimate.price.with_currency(currency_symbol)
    );
    if let Some(warning) = &estimate.warning {
        text.push('\n');
        text.push_str(&render_warning(warning));
    }
    text
}

pub fn render_warning(warning: &ModelWarning) -> String {
    format!("⚠️ {}", warning)
}

pub fn render_error(error: &EstimationError) -> String {
    format!("❌ {}", error)
}

/// Prints a short celebration line after each successful estimate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier;

impl SuccessNotifier for ConsoleNotifier {
    fn on_success(&self, estimate: &Estimate) {
        if estimate.is_authoritative() {
            println!("🎉 Estimate ready!");
        } else {
            println!("🎈 Estimate ready (fallback model)");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::PricePrediction;

    fn estimate(warning: Option<ModelWarning>) -> Estimate {
        Estimate {
            price: PricePrediction::new(1_250_000.0).unwrap(),
            model_name: "gradient-boosted-trees".to_string(),
            warning,
        }
    }

    #[test]
    fn test_render_estimate() {
        assert_eq!(
            render_estimate(&estimate(None), "₹"),
            "Estimated House Price: ₹1,250,000"
        );
    }

    #[test]
    fn test_render_estimate_with_warning() {
        let text = render_estimate(&estimate(Some(ModelWarning::new("not authoritative"))), "$");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["Estimated House Price: $1,250,000", "⚠️ not authoritative"]);
    }

    #[test]
    fn test_render_error_includes_cause() {
        let error = EstimationError::PredictionFailed {
            message: "booster crashed".to_string(),
        };
        assert_eq!(
            render_error(&error),
            "❌ An error occurred during prediction: booster crashed"
        );
    }
}
