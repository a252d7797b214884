use crate::core::fallback::FallbackEstimator;
use crate::core::gbdt::GradientBoostedModel;
use crate::domain::model::{FeatureVector, ModelWarning};
use crate::domain::ports::{ArtifactStore, PriceModel};
use crate::utils::error::{ModelError, Result};

/// The model the service runs with: the trained artifact or the fallback.
#[derive(Debug)]
pub enum ModelHandle {
    Trained(GradientBoostedModel),
    Fallback(FallbackEstimator),
}

impl ModelHandle {
    pub fn is_authoritative(&self) -> bool {
        matches!(self, ModelHandle::Trained(_))
    }
}

impl PriceModel for ModelHandle {
    fn predict(&self, rows: &[FeatureVector]) -> std::result::Result<Vec<f64>, ModelError> {
        match self {
            ModelHandle::Trained(model) => model.predict(rows),
            ModelHandle::Fallback(fallback) => fallback.predict(rows),
        }
    }

    fn name(&self) -> &str {
        match self {
            ModelHandle::Trained(model) => model.name(),
            ModelHandle::Fallback(fallback) => fallback.name(),
        }
    }
}

#[derive(Debug)]
pub struct LoadedModel {
    pub handle: ModelHandle,
    /// Set whenever `handle` is the fallback.
    pub warning: Option<ModelWarning>,
}

/// Loads the trained artifact, substituting `fallback` if it cannot be used.
///
/// Never fails: a missing, unreadable or mismatched artifact is reported
/// through `LoadedModel::warning` instead.
pub fn load_model<S: ArtifactStore>(store: &S, path: &str, fallback: FallbackEstimator) -> LoadedModel {
    match try_load(store, path) {
        Ok(model) => {
            tracing::info!(
                "✅ Loaded trained model from {} ({} trees, trained {})",
                path,
                model.n_trees(),
                model.trained_at.format("%Y-%m-%d %H:%M:%S UTC")
            );
            LoadedModel {
                handle: ModelHandle::Trained(model),
                warning: None,
            }
        }
        Err(reason) => {
            tracing::warn!("⚠️ Model unavailable ({}), using fallback estimator", reason);
            LoadedModel {
                handle: ModelHandle::Fallback(fallback),
                warning: Some(ModelWarning::new(format!(
                    "Model file not found or unusable ({}). Using a fallback estimate of \
                     {} per sq. ft. plus {}; results are not authoritative. \
                     Run train-model to produce {}.",
                    reason, fallback.price_per_sqft, fallback.base_price, path
                ))),
            }
        }
    }
}

fn try_load<S: ArtifactStore>(store: &S, path: &str) -> std::result::Result<GradientBoostedModel, String> {
    if !store.exists(path) {
        return Err(format!("{} does not exist", path));
    }
    let bytes = store.read_file(path).map_err(|e| e.to_string())?;
    let model: GradientBoostedModel =
        serde_json::from_slice(&bytes).map_err(|e| format!("invalid model artifact: {}", e))?;
    model.check_schema()?;
    Ok(model)
}

pub fn save_model<S: ArtifactStore>(store: &S, path: &str, model: &GradientBoostedModel) -> Result<()> {
    let json = serde_json::to_vec_pretty(model)?;
    tracing::debug!("Writing model artifact ({} bytes) to {}", json.len(), path);
    store.write_file(path, &json)
}
