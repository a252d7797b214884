use thiserror::Error;

#[derive(Error, Debug)]
pub enum EstimatorError {
    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlParseError(#[from] toml::de::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Model error: {message}")]
    ModelError { message: String },

    #[error("Training error: {message}")]
    TrainingError { message: String },

    #[error(transparent)]
    Estimation(#[from] EstimationError),
}

/// 單次估價互動的失敗，不會終止程序
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EstimationError {
    #[error("An error occurred during prediction: {message}")]
    PredictionFailed { message: String },

    #[error("An error occurred during prediction: model returned no predictions")]
    EmptyPrediction,

    #[error("An error occurred during prediction: model returned a non-finite value ({value})")]
    NonFinite { value: f64 },
}

/// What a `PriceModel` raises from `predict`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("feature shape mismatch: expected {expected} features, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("no rows submitted for prediction")]
    EmptyBatch,

    #[error("{0}")]
    Internal(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Data,
    Model,
    Prediction,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EstimatorError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EstimatorError::ConfigError { .. }
            | EstimatorError::InvalidConfigValueError { .. }
            | EstimatorError::TomlParseError(_) => ErrorCategory::Configuration,
            EstimatorError::CsvError(_)
            | EstimatorError::SerializationError(_)
            | EstimatorError::TrainingError { .. } => ErrorCategory::Data,
            EstimatorError::ModelError { .. } => ErrorCategory::Model,
            EstimatorError::Estimation(_) => ErrorCategory::Prediction,
            EstimatorError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 估價失敗只影響當次互動
            ErrorCategory::Prediction => ErrorSeverity::Low,
            ErrorCategory::Model => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EstimatorError::CsvError(e) => format!("Could not read the dataset: {}", e),
            EstimatorError::IoError(e) => format!("File access failed: {}", e),
            EstimatorError::SerializationError(e) => {
                format!("Could not encode or decode the model artifact: {}", e)
            }
            EstimatorError::TomlParseError(e) => format!("The config file is not valid TOML: {}", e),
            EstimatorError::ConfigError { message } => format!("Configuration problem: {}", message),
            EstimatorError::InvalidConfigValueError { field, reason, .. } => {
                format!("Setting '{}' is invalid: {}", field, reason)
            }
            EstimatorError::ModelError { message } => format!("Model problem: {}", message),
            EstimatorError::TrainingError { message } => format!("Training failed: {}", message),
            EstimatorError::Estimation(e) => e.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => {
                "Check the config file and command-line flags against estimator.toml"
            }
            ErrorCategory::Data => "Check that the dataset has the expected housing columns",
            ErrorCategory::Model => "Retrain the model with train-model and try again",
            ErrorCategory::Prediction => "Adjust the property details and try again",
            ErrorCategory::System => "Check file permissions and available disk space",
        }
    }
}

pub type Result<T> = std::result::Result<T, EstimatorError>;
