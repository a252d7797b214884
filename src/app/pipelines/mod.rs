pub mod training_pipeline;
