use std::fmt;
use std::sync::Arc;

use crate::expression::{Atom, Expression};

/// A non-negative decision variable owned by a [`crate::Model`].
///
/// The index is the variable's position in the model's variable list and also
/// its column in every tableau built from that model.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Variable {
    name: Arc<str>,
    index: usize,
}

impl Variable {
    pub(crate) fn new(name: &str, index: usize) -> Self {
        Self {
            name: Arc::from(name),
            index,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// The term `factor * self`.
    pub fn times(&self, factor: f64) -> Atom {
        Atom::new(self.clone(), factor)
    }

    pub fn leq(&self, bound: f64) -> crate::Constraint {
        Expression::from(self).leq(bound)
    }

    pub fn geq(&self, bound: f64) -> crate::Constraint {
        Expression::from(self).geq(bound)
    }

    pub fn equals(&self, bound: f64) -> crate::Constraint {
        Expression::from(self).equals(bound)
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
