use crate::core::{Pipeline, TrainingReport};
use crate::utils::error::Result;
use std::time::Instant;

pub struct TrainingEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> TrainingEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub fn run(&self) -> Result<TrainingReport> {
        let started = Instant::now();
        tracing::info!("🚀 Starting training run");

        // Extract
        tracing::info!("📥 Reading dataset...");
        let records = self.pipeline.extract()?;
        tracing::info!("Read {} records", records.len());

        // Transform
        tracing::info!("🔄 Encoding features...");
        let set = self.pipeline.transform(records)?;
        tracing::info!("Encoded {} rows", set.features.len());

        // Load
        tracing::info!("🌲 Fitting model...");
        let report = self.pipeline.load(set)?;
        tracing::info!(
            "✅ Trained {} trees on {} rows in {:?} (RMSE {:.2}, R² {:.4})",
            report.trees,
            report.rows,
            started.elapsed(),
            report.metrics.rmse,
            report.metrics.r_squared
        );
        tracing::info!("📁 Model saved to: {}", report.model_path);

        Ok(report)
    }
}
