use crate::core::fallback::{FallbackEstimator, DEFAULT_BASE_PRICE, DEFAULT_PRICE_PER_SQFT};
use crate::core::gbdt::TrainingParams;
use crate::core::ConfigProvider;
use crate::domain::model::DEFAULT_CURRENCY_SYMBOL;
use crate::utils::error::{EstimatorError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_MODEL_PATH: &str = "house_price_model.json";
pub const DEFAULT_DATASET_PATH: &str = "Housing.csv";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub model: ModelConfig,
    pub display: DisplayConfig,
    pub fallback: FallbackConfig,
    pub training: TrainingConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub path: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_MODEL_PATH.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub currency_symbol: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            currency_symbol: DEFAULT_CURRENCY_SYMBOL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackConfig {
    pub price_per_sqft: f64,
    pub base_price: f64,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            price_per_sqft: DEFAULT_PRICE_PER_SQFT,
            base_price: DEFAULT_BASE_PRICE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub dataset_path: String,
    pub n_estimators: Option<usize>,
    pub learning_rate: Option<f64>,
    pub max_depth: Option<usize>,
    pub min_samples_leaf: Option<usize>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            dataset_path: DEFAULT_DATASET_PATH.to_string(),
            n_estimators: None,
            learning_rate: None,
            max_depth: None,
            min_samples_leaf: None,
        }
    }
}

impl TrainingConfig {
    /// 未設定的超參數使用預設值
    pub fn params(&self) -> TrainingParams {
        let defaults = TrainingParams::default();
        TrainingParams {
            n_estimators: self.n_estimators.unwrap_or(defaults.n_estimators),
            learning_rate: self.learning_rate.unwrap_or(defaults.learning_rate),
            max_depth: self.max_depth.unwrap_or(defaults.max_depth),
            min_samples_leaf: self.min_samples_leaf.unwrap_or(defaults.min_samples_leaf),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub verbose: bool,
    pub json: bool,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;
        Ok(toml::from_str(&processed_content)?)
    }

    /// 替換環境變數 (例如 ${MODEL_DIR})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EstimatorError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn fallback_estimator(&self) -> FallbackEstimator {
        FallbackEstimator::new(self.price_per_sqft(), self.base_price())
    }

    /// 估價程式需要的設定：模型路徑、顯示與 fallback
    pub fn validate_estimator(&self) -> Result<()> {
        self.validate_model_path()?;
        validation::validate_non_empty_string("display.currency_symbol", &self.display.currency_symbol)?;

        for (field, value) in [
            ("fallback.price_per_sqft", self.price_per_sqft()),
            ("fallback.base_price", self.base_price()),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(EstimatorError::InvalidConfigValueError {
                    field: field.to_string(),
                    value: value.to_string(),
                    reason: "Value must be a non-negative number".to_string(),
                });
            }
        }
        Ok(())
    }

    /// 訓練程式需要的設定：資料集、輸出路徑與超參數
    pub fn validate_training(&self) -> Result<()> {
        self.validate_model_path()?;
        validation::validate_path("training.dataset_path", &self.training.dataset_path)?;
        validation::validate_file_extension("training.dataset_path", &self.training.dataset_path, &["csv"])?;
        self.training.params().validate()
    }

    fn validate_model_path(&self) -> Result<()> {
        validation::validate_path("model.path", &self.model.path)?;
        validation::validate_file_extension("model.path", &self.model.path, &["json"])
    }
}

impl ConfigProvider for TomlConfig {
    fn model_path(&self) -> &str {
        &self.model.path
    }

    fn currency_symbol(&self) -> &str {
        &self.display.currency_symbol
    }

    fn price_per_sqft(&self) -> f64 {
        self.fallback.price_per_sqft
    }

    fn base_price(&self) -> f64 {
        self.fallback.base_price
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_estimator()?;
        self.validate_training()
    }
}
