use std::path::PathBuf;

use lpkit_model::ModelError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid model file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unknown variable: {0}")]
    UnknownVariable(String),
    #[error("Model error: {0}")]
    Model(#[from] ModelError),
    #[error("Solver error: {0}")]
    Solver(#[from] lpkit_solver::Error),
}
