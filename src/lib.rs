pub mod analysis;
pub mod config;
pub mod dataset;
pub mod embeddings;
pub mod error;
pub mod eval;
pub mod models;
pub mod report;

pub use config::Config;
pub use error::{KgevalError, Result};
pub use models::ModelKind;
