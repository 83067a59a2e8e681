use thiserror::Error;

/// Precondition violations detected before any algorithm runs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("There is already a variable named {0}")]
    DuplicateVariable(String),
    #[error("Can't solve a model without any variables")]
    NoVariables,
    #[error("Can't solve a model without an objective")]
    NoObjective,
    #[error("Duals of models with equality constraints are not supported")]
    DualWithEquality,
    #[error("Variable {name} (index {index}) does not belong to this model")]
    ForeignVariable { name: String, index: usize },
}
