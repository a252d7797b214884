use serde::{Deserialize, Serialize};
use std::fmt;

use crate::utils::format::format_thousands;

/// Column order the regression model was trained on. Reordering corrupts predictions.
pub const FEATURE_NAMES: [&str; 11] = [
    "area",
    "bedrooms",
    "bathrooms",
    "stories",
    "mainroad",
    "guestroom",
    "basement",
    "hotwaterheating",
    "airconditioning",
    "parking",
    "prefarea",
];

pub const FEATURE_COUNT: usize = FEATURE_NAMES.len();

pub const DEFAULT_CURRENCY_SYMBOL: &str = "₹";

/// 表單欄位的範圍與預設值
pub mod limits {
    use std::ops::RangeInclusive;

    pub const AREA: RangeInclusive<f64> = 500.0..=20_000.0;
    pub const BEDROOMS: RangeInclusive<u32> = 1..=10;
    pub const BATHROOMS: RangeInclusive<u32> = 1..=5;
    pub const STORIES: RangeInclusive<u32> = 1..=5;
    pub const PARKING: RangeInclusive<u32> = 0..=4;

    pub const DEFAULT_AREA: f64 = 5000.0;
    pub const DEFAULT_BEDROOMS: u32 = 3;
    pub const DEFAULT_BATHROOMS: u32 = 2;
    pub const DEFAULT_STORIES: u32 = 2;
    pub const DEFAULT_PARKING: u32 = 2;
    pub const DEFAULT_ANSWER: &str = "Yes";
}

/// A raw categorical answer as it arrived from the form.
///
/// Anything other than the exact string `"Yes"` counts as "no", including a
/// missing answer.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Answer(Option<String>);

impl Answer {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(Some(raw.into()))
    }

    pub fn missing() -> Self {
        Self(None)
    }

    pub fn is_yes(&self) -> bool {
        self.0.as_deref() == Some("Yes")
    }

    pub fn as_str(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl From<&str> for Answer {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for Answer {
    fn from(raw: String) -> Self {
        Self(Some(raw))
    }
}

impl From<bool> for Answer {
    fn from(yes: bool) -> Self {
        Self::new(if yes { "Yes" } else { "No" })
    }
}

impl From<Option<String>> for Answer {
    fn from(raw: Option<String>) -> Self {
        Self(raw)
    }
}

/// One property query, created fresh per interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyInput {
    pub area: f64,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub stories: u32,
    pub mainroad: Answer,
    pub guestroom: Answer,
    pub basement: Answer,
    pub hotwaterheating: Answer,
    pub airconditioning: Answer,
    pub parking: u32,
    pub prefarea: Answer,
}

impl Default for PropertyInput {
    fn default() -> Self {
        Self {
            area: limits::DEFAULT_AREA,
            bedrooms: limits::DEFAULT_BEDROOMS,
            bathrooms: limits::DEFAULT_BATHROOMS,
            stories: limits::DEFAULT_STORIES,
            mainroad: Answer::from(limits::DEFAULT_ANSWER),
            guestroom: Answer::from(limits::DEFAULT_ANSWER),
            basement: Answer::from(limits::DEFAULT_ANSWER),
            hotwaterheating: Answer::from(limits::DEFAULT_ANSWER),
            airconditioning: Answer::from(limits::DEFAULT_ANSWER),
            parking: limits::DEFAULT_PARKING,
            prefarea: Answer::from(limits::DEFAULT_ANSWER),
        }
    }
}

impl PropertyInput {
    /// Copy with every numeric field clamped into its declared range.
    pub fn clamped(&self) -> Self {
        Self {
            area: clamp_area(self.area),
            bedrooms: clamp_count(self.bedrooms, &limits::BEDROOMS),
            bathrooms: clamp_count(self.bathrooms, &limits::BATHROOMS),
            stories: clamp_count(self.stories, &limits::STORIES),
            parking: clamp_count(self.parking, &limits::PARKING),
            ..self.clone()
        }
    }
}

pub(crate) fn clamp_area(area: f64) -> f64 {
    if area.is_nan() {
        return limits::DEFAULT_AREA;
    }
    area.clamp(*limits::AREA.start(), *limits::AREA.end())
}

pub(crate) fn clamp_count(value: u32, range: &std::ops::RangeInclusive<u32>) -> u32 {
    value.clamp(*range.start(), *range.end())
}

/// Fixed-order numeric encoding consumed by the regression model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector(pub [f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        FEATURE_NAMES
            .iter()
            .position(|n| *n == name)
            .map(|idx| self.0[idx])
    }
}

/// A non-negative, finite price.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct PricePrediction(f64);

impl PricePrediction {
    /// Returns `None` for negative or non-finite amounts.
    pub fn new(amount: f64) -> Option<Self> {
        if amount.is_finite() && amount >= 0.0 {
            Some(Self(amount))
        } else {
            None
        }
    }

    pub fn amount(&self) -> f64 {
        self.0
    }

    /// `1250000.0` -> `"1,250,000"`
    pub fn formatted(&self) -> String {
        format_thousands(self.0)
    }

    pub fn with_currency(&self, symbol: &str) -> String {
        format!("{}{}", symbol, self.formatted())
    }
}

impl fmt::Display for PricePrediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.formatted())
    }
}

/// Why the estimate is not authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelWarning {
    pub message: String,
}

impl ModelWarning {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for ModelWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Estimate {
    pub price: PricePrediction,
    pub model_name: String,
    pub warning: Option<ModelWarning>,
}

impl Estimate {
    pub fn is_authoritative(&self) -> bool {
        self.warning.is_none()
    }
}

/// One labelled row of the housing dataset. Extra columns such as
/// `furnishingstatus` are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HousingRecord {
    pub price: f64,
    pub area: f64,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub stories: u32,
    pub mainroad: Answer,
    pub guestroom: Answer,
    pub basement: Answer,
    pub hotwaterheating: Answer,
    pub airconditioning: Answer,
    pub parking: u32,
    pub prefarea: Answer,
}

impl HousingRecord {
    pub fn to_input(&self) -> PropertyInput {
        PropertyInput {
            area: self.area,
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            stories: self.stories,
            mainroad: self.mainroad.clone(),
            guestroom: self.guestroom.clone(),
            basement: self.basement.clone(),
            hotwaterheating: self.hotwaterheating.clone(),
            airconditioning: self.airconditioning.clone(),
            parking: self.parking,
            prefarea: self.prefarea.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSet {
    pub features: Vec<FeatureVector>,
    pub targets: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingMetrics {
    pub rmse: f64,
    pub r_squared: f64,
}

impl TrainingMetrics {
    pub fn compute(predictions: &[f64], targets: &[f64]) -> Self {
        let n = targets.len().max(1) as f64;
        let mean = targets.iter().sum::<f64>() / n;
        let ss_res: f64 = predictions
            .iter()
            .zip(targets)
            .map(|(p, t)| (t - p).powi(2))
            .sum();
        let ss_tot: f64 = targets.iter().map(|t| (t - mean).powi(2)).sum();

        Self {
            rmse: (ss_res / n).sqrt(),
            r_squared: if ss_tot > 0.0 { 1.0 - ss_res / ss_tot } else { 0.0 },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub rows: usize,
    pub trees: usize,
    pub metrics: TrainingMetrics,
    pub model_path: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answer_only_exact_yes() {
        assert!(Answer::from("Yes").is_yes());
        assert!(Answer::from(true).is_yes());
        assert!(!Answer::from("yes").is_yes());
        assert!(!Answer::from("YES").is_yes());
        assert!(!Answer::from("").is_yes());
        assert!(!Answer::from(" Yes").is_yes());
        assert!(!Answer::missing().is_yes());
    }

    #[test]
    fn test_answer_deserializes_null() {
        let answer: Answer = serde_json::from_str("null").unwrap();
        assert_eq!(answer, Answer::missing());
        let answer: Answer = serde_json::from_str("\"Yes\"").unwrap();
        assert!(answer.is_yes());
    }

    #[test]
    fn test_default_matches_form_defaults() {
        let input = PropertyInput::default();
        assert_eq!(input.area, 5000.0);
        assert_eq!(input.bedrooms, 3);
        assert_eq!(input.bathrooms, 2);
        assert_eq!(input.stories, 2);
        assert_eq!(input.parking, 2);
        assert!(input.prefarea.is_yes());
    }

    #[test]
    fn test_clamped() {
        let input = PropertyInput {
            area: 50.0,
            bedrooms: 0,
            bathrooms: 9,
            stories: 7,
            parking: 12,
            ..PropertyInput::default()
        };
        let clamped = input.clamped();
        assert_eq!(clamped.area, 500.0);
        assert_eq!(clamped.bedrooms, 1);
        assert_eq!(clamped.bathrooms, 5);
        assert_eq!(clamped.stories, 5);
        assert_eq!(clamped.parking, 4);
        assert_eq!(clamped.mainroad, input.mainroad);

        let huge = PropertyInput {
            area: 1e9,
            ..PropertyInput::default()
        };
        assert_eq!(huge.clamped().area, 20_000.0);
    }

    #[test]
    fn test_price_prediction_rejects_invalid() {
        assert!(PricePrediction::new(-1.0).is_none());
        assert!(PricePrediction::new(f64::NAN).is_none());
        assert!(PricePrediction::new(f64::INFINITY).is_none());
        assert_eq!(PricePrediction::new(0.0).unwrap().formatted(), "0");
    }

    #[test]
    fn test_price_prediction_formatting() {
        let price = PricePrediction::new(1_250_000.0).unwrap();
        assert_eq!(price.formatted(), "1,250,000");
        assert_eq!(price.to_string(), "1,250,000");
        assert_eq!(price.with_currency(DEFAULT_CURRENCY_SYMBOL), "₹1,250,000");
    }

    #[test]
    fn test_feature_vector_lookup() {
        let vector = FeatureVector([5000.0, 3.0, 2.0, 2.0, 1.0, 0.0, 1.0, 0.0, 1.0, 2.0, 1.0]);
        assert_eq!(vector.get("area"), Some(5000.0));
        assert_eq!(vector.get("parking"), Some(2.0));
        assert_eq!(vector.get("price"), None);
    }
}
