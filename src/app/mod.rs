pub mod form;
pub mod pipelines;
pub mod render;
