//! Salary normalization and prediction engine
//!
//! This crate provides the core functionality for:
//! - Parsing free-form compensation text into numeric labels
//! - Encoding categorical job attributes into stable feature vectors
//! - Training and persisting a two-tier salary model
//! - Total, bounded salary inference with graceful degradation

pub mod encoder;
pub mod engine;
pub mod forest;
pub mod heuristic;
pub mod models;
pub mod parser;
pub mod store;
pub mod synthetic;

pub use engine::{
    EngineConfig, OutputFormatter, PredictionEngine, SalaryModel, Tier, TrainingReport,
};
pub use models::{JobQuery, JobRecord, SalaryPrediction};
pub use parser::SalaryTextParser;
