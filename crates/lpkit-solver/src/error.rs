use lpkit_model::ModelError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("Solution has no optimal assignment to analyse")]
    NoOptimum,
}
