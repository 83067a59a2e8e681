mod constraint;
mod error;
mod expression;
mod model;
mod objective;
mod variable;

pub use constraint::{Constraint, Relation};
pub use error::ModelError;
pub use expression::{Atom, Expression};
pub use model::Model;
pub use objective::{Objective, ObjectiveKind};
pub use variable::Variable;
