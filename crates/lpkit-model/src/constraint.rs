use std::fmt;

use crate::expression::Expression;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    /// Less than or equal (<=)
    Le,
    /// Equal (=)
    Eq,
    /// Greater than or equal (>=)
    Ge,
}

impl Relation {
    /// The relation obtained by multiplying both sides by -1.
    pub fn inverted(self) -> Self {
        match self {
            Relation::Le => Relation::Ge,
            Relation::Eq => Relation::Eq,
            Relation::Ge => Relation::Le,
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Relation::Le => "<=",
            Relation::Eq => "=",
            Relation::Ge => ">=",
        })
    }
}

/// `expression <relation> bound`
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    expression: Expression,
    bound: f64,
    relation: Relation,
}

impl Constraint {
    pub fn new(expression: Expression, bound: f64, relation: Relation) -> Self {
        Self {
            expression,
            bound,
            relation,
        }
    }

    pub fn expression(&self) -> &Expression {
        &self.expression
    }

    pub fn bound(&self) -> f64 {
        self.bound
    }

    pub fn relation(&self) -> Relation {
        self.relation
    }

    pub fn simplify(&self) -> Self {
        Self::new(self.expression.simplify(), self.bound, self.relation)
    }

    /// Multiplies the constraint by -1 in place.
    pub fn invert(&mut self) {
        self.relation = self.relation.inverted();
        self.expression = self.expression.negated();
        self.bound = -self.bound;
    }

    pub fn inverted(&self) -> Self {
        let mut inverted = self.clone();
        inverted.invert();
        inverted
    }

    /// Appends `atom` to the left-hand side under a new relation, e.g. to turn
    /// an inequality into an equality with a slack column.
    pub fn with_term(&self, atom: crate::Atom, relation: Relation) -> Self {
        Self::new(self.expression.plus(&atom.into()), self.bound, relation)
    }

    pub fn is_satisfied_by(&self, assignment: &[f64], tolerance: f64) -> bool {
        let lhs = self.expression.evaluate(assignment);
        match self.relation {
            Relation::Le => lhs <= self.bound + tolerance,
            Relation::Eq => (lhs - self.bound).abs() <= tolerance,
            Relation::Ge => lhs >= self.bound - tolerance,
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.expression, self.relation, self.bound)
    }
}
