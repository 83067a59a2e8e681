use std::fmt;

use lpkit_model::{Model, Variable};

use crate::tableau::Tableau;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolutionStatus {
    /// An optimal solution was found
    Optimal,
    /// The problem is infeasible (no solution exists)
    Infeasible,
    /// The problem is unbounded
    Unbounded,
}

/// The result of solving a [`Model`] with the simplex method.
///
/// Carries the client's model, the normal model (with slack and surplus
/// columns) the tableaux were built from, and both the first feasible and the
/// final tableau for later analysis.
#[derive(Debug, Clone)]
pub struct Solution {
    model: Model,
    assignment: Option<Vec<f64>>,
    initial_tableau: Tableau,
    tableau: Tableau,
    normal_model: Model,
    is_feasible: bool,
    is_bounded: bool,
}

impl Solution {
    pub fn optimal(model: Model, assignment: Vec<f64>, initial_tableau: Tableau, tableau: Tableau, normal_model: Model) -> Self {
        Self {
            model,
            assignment: Some(assignment),
            initial_tableau,
            tableau,
            normal_model,
            is_feasible: true,
            is_bounded: true,
        }
    }

    pub fn infeasible(model: Model, initial_tableau: Tableau, tableau: Tableau, normal_model: Model) -> Self {
        Self {
            model,
            assignment: None,
            initial_tableau,
            tableau,
            normal_model,
            is_feasible: false,
            is_bounded: true,
        }
    }

    pub fn unbounded(model: Model, initial_tableau: Tableau, tableau: Tableau, normal_model: Model) -> Self {
        Self {
            model,
            assignment: None,
            initial_tableau,
            tableau,
            normal_model,
            is_feasible: true,
            is_bounded: false,
        }
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn normal_model(&self) -> &Model {
        &self.normal_model
    }

    pub fn initial_tableau(&self) -> &Tableau {
        &self.initial_tableau
    }

    pub fn tableau(&self) -> &Tableau {
        &self.tableau
    }

    /// Values of the model's variables, ordered by variable index.
    pub fn assignment(&self) -> Option<&[f64]> {
        self.assignment.as_deref()
    }

    pub fn has_assignment(&self) -> bool {
        self.assignment.is_some()
    }

    pub fn is_feasible(&self) -> bool {
        self.is_feasible
    }

    pub fn is_bounded(&self) -> bool {
        self.is_bounded
    }

    pub fn status(&self) -> SolutionStatus {
        if !self.is_feasible {
            SolutionStatus::Infeasible
        } else if !self.is_bounded {
            SolutionStatus::Unbounded
        } else {
            SolutionStatus::Optimal
        }
    }

    pub fn value(&self, variable: &Variable) -> Option<f64> {
        self.assignment.as_ref()?.get(variable.index()).copied()
    }

    /// The client's objective evaluated at the assignment.
    pub fn objective_value(&self) -> Option<f64> {
        let assignment = self.assignment.as_ref()?;
        self.model.objective().map(|o| o.evaluate(assignment))
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_bounded {
            return write!(f, "There is no optimal solution, the model is unbounded");
        }
        let (Some(assignment), Some(objective)) = (&self.assignment, self.objective_value()) else {
            return write!(f, "There is no solution, the model is infeasible");
        };

        writeln!(f, "- objective value: {}", objective)?;
        write!(f, "- assignment:")?;
        for (variable, value) in self.model.variables().iter().zip(assignment) {
            write!(f, "\n\t- {} = {:.3}", variable, value)?;
        }
        Ok(())
    }
}
