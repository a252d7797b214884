pub mod encoder;
pub mod engine;
pub mod estimator;
pub mod fallback;
pub mod gbdt;
pub mod model_store;

pub use crate::domain::model::{
    Estimate, FeatureVector, HousingRecord, PricePrediction, PropertyInput, TrainingReport,
    TrainingSet,
};
pub use crate::domain::ports::{ArtifactStore, ConfigProvider, Pipeline, PriceModel, SuccessNotifier};
pub use crate::utils::error::Result;
