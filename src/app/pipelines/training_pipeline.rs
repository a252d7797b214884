use crate::core::encoder::encode;
use crate::core::gbdt::{GradientBoostedModel, TrainingParams};
use crate::core::model_store::save_model;
use crate::core::{ArtifactStore, HousingRecord, Pipeline, PriceModel, TrainingReport, TrainingSet};
use crate::domain::model::{Answer, TrainingMetrics, FEATURE_NAMES};
use crate::utils::error::{EstimatorError, Result};

const TARGET_COLUMN: &str = "price";

/// Trains the price model from a labelled housing CSV.
pub struct TrainingPipeline<S: ArtifactStore> {
    pub(crate) storage: S,
    pub(crate) dataset_path: String,
    pub(crate) model_path: String,
    pub(crate) params: TrainingParams,
}

impl<S: ArtifactStore> TrainingPipeline<S> {
    pub fn new(
        storage: S,
        dataset_path: impl Into<String>,
        model_path: impl Into<String>,
        params: TrainingParams,
    ) -> Self {
        Self {
            storage,
            dataset_path: dataset_path.into(),
            model_path: model_path.into(),
            params,
        }
    }
}

impl<S: ArtifactStore> Pipeline for TrainingPipeline<S> {
    fn extract(&self) -> Result<Vec<HousingRecord>> {
        tracing::debug!("Reading dataset from: {}", self.dataset_path);
        let bytes = self.storage.read_file(&self.dataset_path)?;

        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(bytes.as_slice());

        // 先檢查欄位，缺欄位時給出清楚的訊息
        let headers = reader.headers()?.clone();
        let missing: Vec<&str> = std::iter::once(TARGET_COLUMN)
            .chain(FEATURE_NAMES)
            .filter(|column| !headers.iter().any(|h| h == *column))
            .collect();
        if !missing.is_empty() {
            return Err(EstimatorError::TrainingError {
                message: format!("dataset is missing columns: {}", missing.join(", ")),
            });
        }

        let extra: Vec<&str> = headers
            .iter()
            .filter(|h| *h != TARGET_COLUMN && !FEATURE_NAMES.contains(h))
            .collect();
        if !extra.is_empty() {
            tracing::debug!("Ignoring columns: {}", extra.join(", "));
        }

        let mut records = Vec::new();
        for result in reader.deserialize() {
            let record: HousingRecord = result?;
            records.push(record);
        }
        Ok(records)
    }

    fn transform(&self, records: Vec<HousingRecord>) -> Result<TrainingSet> {
        if records.is_empty() {
            return Err(EstimatorError::TrainingError {
                message: format!("dataset {} has no rows", self.dataset_path),
            });
        }

        warn_on_unencodable_answers(&records);

        // 與估價服務使用同一個 encoder
        let features = records.iter().map(|r| encode(&r.to_input())).collect();
        let targets = records.iter().map(|r| r.price).collect();

        Ok(TrainingSet { features, targets })
    }

    fn load(&self, set: TrainingSet) -> Result<TrainingReport> {
        let model = GradientBoostedModel::fit(&set.features, &set.targets, &self.params)?;

        let predictions = model
            .predict(&set.features)
            .map_err(|e| EstimatorError::ModelError {
                message: e.to_string(),
            })?;
        let metrics = TrainingMetrics::compute(&predictions, &set.targets);

        save_model(&self.storage, &self.model_path, &model)?;

        Ok(TrainingReport {
            rows: set.targets.len(),
            trees: model.n_trees(),
            metrics,
            model_path: self.model_path.clone(),
        })
    }
}

const ANSWER_COLUMNS: [&str; 6] = [
    "mainroad",
    "guestroom",
    "basement",
    "hotwaterheating",
    "airconditioning",
    "prefarea",
];

fn answers(record: &HousingRecord) -> [&Answer; 6] {
    [
        &record.mainroad,
        &record.guestroom,
        &record.basement,
        &record.hotwaterheating,
        &record.airconditioning,
        &record.prefarea,
    ]
}

/// Yes/no columns only encode the exact string "Yes"; flag columns that look
/// like they use another spelling.
fn warn_on_unencodable_answers(records: &[HousingRecord]) {
    let mut has_yes = [false; 6];
    let mut other_spelling: [Option<&str>; 6] = [None; 6];

    for record in records {
        for (idx, answer) in answers(record).into_iter().enumerate() {
            if answer.is_yes() {
                has_yes[idx] = true;
            } else if let Some(raw) = answer.as_str() {
                if raw.eq_ignore_ascii_case("yes") {
                    other_spelling[idx] = Some(raw);
                }
            }
        }
    }

    for (idx, name) in ANSWER_COLUMNS.iter().enumerate() {
        if let (false, Some(raw)) = (has_yes[idx], other_spelling[idx]) {
            tracing::warn!(
                "⚠️ Column '{}' uses '{}' rather than 'Yes'; every row will encode as 0",
                name,
                raw
            );
        }
    }
}
