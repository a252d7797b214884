pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use crate::app::pipelines::training_pipeline::TrainingPipeline;
pub use crate::config::{cli::LocalStorage, toml_config::TomlConfig};
pub use crate::core::{
    engine::TrainingEngine,
    estimator::{estimate, EstimationService},
    model_store::{load_model, save_model, LoadedModel, ModelHandle},
};
pub use crate::domain::model::{Answer, Estimate, FeatureVector, PricePrediction, PropertyInput};
pub use crate::utils::error::{EstimationError, EstimatorError, Result};
