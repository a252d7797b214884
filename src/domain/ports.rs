use crate::domain::model::{Estimate, FeatureVector, HousingRecord, TrainingReport, TrainingSet};
use crate::utils::error::{ModelError, Result};

/// Anything that turns encoded rows into prices, one output per input row.
pub trait PriceModel {
    fn predict(&self, rows: &[FeatureVector]) -> std::result::Result<Vec<f64>, ModelError>;

    fn name(&self) -> &str;
}

impl<M: PriceModel + ?Sized> PriceModel for &M {
    fn predict(&self, rows: &[FeatureVector]) -> std::result::Result<Vec<f64>, ModelError> {
        (**self).predict(rows)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Fired after a successful estimate.
pub trait SuccessNotifier {
    fn on_success(&self, estimate: &Estimate);
}

/// Notifier that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl SuccessNotifier for NoopNotifier {
    fn on_success(&self, _estimate: &Estimate) {}
}

pub trait ArtifactStore {
    fn read_file(&self, path: &str) -> Result<Vec<u8>>;
    fn write_file(&self, path: &str, data: &[u8]) -> Result<()>;
    fn exists(&self, path: &str) -> bool;
}

pub trait ConfigProvider {
    fn model_path(&self) -> &str;
    fn currency_symbol(&self) -> &str;
    fn price_per_sqft(&self) -> f64;
    fn base_price(&self) -> f64;
}

/// Extract/transform/load phases of model training.
pub trait Pipeline {
    fn extract(&self) -> Result<Vec<HousingRecord>>;
    fn transform(&self, records: Vec<HousingRecord>) -> Result<TrainingSet>;
    fn load(&self, set: TrainingSet) -> Result<TrainingReport>;
}
