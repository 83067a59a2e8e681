use std::fmt;

use crate::expression::Expression;
use crate::variable::Variable;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectiveKind {
    Min,
    Max,
}

impl fmt::Display for ObjectiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ObjectiveKind::Min => "min",
            ObjectiveKind::Max => "max",
        })
    }
}

/// The function being optimized.
///
/// `factor` tracks the sign of the objective variable `z`: inverting a MIN
/// objective into a MAX one negates both the expression and the factor, so
/// `factor * z` keeps the value of the client's objective.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Objective {
    expression: Expression,
    kind: ObjectiveKind,
    factor: f64,
}

impl Objective {
    pub fn new(expression: Expression, kind: ObjectiveKind) -> Self {
        Self {
            expression,
            kind,
            factor: 1.0,
        }
    }

    pub fn expression(&self) -> &Expression {
        &self.expression
    }

    pub fn kind(&self) -> ObjectiveKind {
        self.kind
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }

    pub fn invert(&mut self) {
        self.kind = match self.kind {
            ObjectiveKind::Min => ObjectiveKind::Max,
            ObjectiveKind::Max => ObjectiveKind::Min,
        };
        self.expression = self.expression.negated();
        self.factor = -self.factor;
    }

    pub fn simplify(&self) -> Self {
        Self {
            expression: self.expression.simplify(),
            kind: self.kind,
            factor: self.factor,
        }
    }

    pub fn evaluate(&self, assignment: &[f64]) -> f64 {
        self.expression.evaluate(assignment)
    }

    pub fn depends_on_variable(&self, variable: &Variable) -> bool {
        self.expression.depends_on(variable.index())
    }

    /// `z`, or `-z` once the objective has been inverted.
    pub fn name(&self) -> &'static str {
        if self.factor < 0.0 { "-z" } else { "z" }
    }
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} = {}", self.kind, self.name(), self.expression)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invert_keeps_value_up_to_factor() {
        let x = Variable::new("x", 0);
        let y = Variable::new("y", 1);
        let mut objective = Objective::new(Expression::from_vectors(&[x, y], &[-8.0, -10.0]), ObjectiveKind::Min);
        let before = objective.evaluate(&[1.0, 2.0]);

        objective.invert();

        assert_eq!(objective.kind(), ObjectiveKind::Max);
        assert_eq!(objective.factor(), -1.0);
        assert_eq!(objective.factor() * objective.evaluate(&[1.0, 2.0]), before);
        assert_eq!(objective.to_string(), "max: -z = 8*x + 10*y");
    }
}
