use std::fmt;
use std::ops::{Deref, DerefMut};
use std::time::{Duration, Instant};

use lpkit_model::{Model, Variable};

use crate::error::Error;
use crate::simplex::Solver;
use crate::solution::Solution;

/// A linear model whose variables must all take integer values.
#[derive(Debug, Clone)]
pub struct IntegerModel {
    model: Model,
}

impl IntegerModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self { model: Model::new(name) }
    }

    pub fn into_inner(self) -> Model {
        self.model
    }

    /// Solves with branch and bound. `None` means no time limit.
    pub fn solve(&self, timelimit: Option<Duration>) -> Result<IntegerSolution, Error> {
        let mut solver = IntegerSolver::new();
        if let Some(limit) = timelimit {
            solver = solver.with_timelimit(limit);
        }
        solver.solve(&self.model)
    }
}

impl From<Model> for IntegerModel {
    fn from(model: Model) -> Self {
        Self { model }
    }
}

impl Deref for IntegerModel {
    type Target = Model;

    fn deref(&self) -> &Model {
        &self.model
    }
}

impl DerefMut for IntegerModel {
    fn deref_mut(&mut self) -> &mut Model {
        &mut self.model
    }
}

impl fmt::Display for IntegerModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "- name: {}", self.model.name())?;
        writeln!(f, "- variables:")?;
        for v in self.model.variables() {
            writeln!(f, "\t{} ∈ ℕ", v)?;
        }
        writeln!(f, "- constraints:")?;
        for c in self.model.constraints() {
            writeln!(f, "\t{}", c)?;
        }
        writeln!(f, "- objective:")?;
        match self.model.objective() {
            Some(objective) => writeln!(f, "\t{}", objective),
            None => writeln!(f, "\tnone"),
        }
    }
}

/// Depth-first branch and bound over LP relaxations.
#[derive(Debug, Clone, Copy)]
pub struct IntegerSolver {
    lp: Solver,
    timelimit: Option<Duration>,
    /// Distance from the nearest integer below which a value counts as integral
    epsilon: f64,
}

impl Default for IntegerSolver {
    fn default() -> Self {
        Self {
            lp: Solver::new(),
            timelimit: None,
            epsilon: 1e-7,
        }
    }
}

impl IntegerSolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timelimit(mut self, timelimit: Duration) -> Self {
        self.timelimit = Some(timelimit);
        self
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn timelimit(&self) -> Option<Duration> {
        self.timelimit
    }

    /// Solver used for every relaxation.
    pub fn with_lp_solver(mut self, lp: Solver) -> Self {
        self.lp = lp;
        self
    }

    pub fn solve(&self, model: &Model) -> Result<IntegerSolution, Error> {
        model.validate()?;
        let standard = model.translate_to_standard_form();

        let mut search = Search {
            solver: self,
            start: Instant::now(),
            lower_bound: f64::NEG_INFINITY,
            best: None,
            interrupted: false,
            nodes: 0,
        };
        search.branch_and_bound(&standard)?;
        let total_time = search.start.elapsed();

        tracing::info!(
            model = model.name(),
            nodes = search.nodes,
            interrupted = search.interrupted,
            bound = search.lower_bound,
            ?total_time,
            "branch and bound finished"
        );

        Ok(IntegerSolution {
            model: model.clone(),
            solution: search.best,
            interrupted: search.interrupted,
            nodes: search.nodes,
            total_time,
        })
    }

    /// The last variable whose relaxed value is not integral.
    fn fractional_variable<'m>(&self, model: &'m Model, solution: &Solution) -> Option<(&'m Variable, f64)> {
        model.variables().iter().rev().find_map(|v| {
            let value = solution.value(v)?;
            ((value - value.round()).abs() > self.epsilon).then_some((v, value))
        })
    }
}

/// State shared by every node of one search.
struct Search<'s> {
    solver: &'s IntegerSolver,
    start: Instant,
    /// Objective of the incumbent, in maximization form
    lower_bound: f64,
    best: Option<Solution>,
    interrupted: bool,
    nodes: usize,
}

impl Search<'_> {
    fn timed_out(&self) -> bool {
        self.solver.timelimit.is_some_and(|limit| self.start.elapsed() >= limit)
    }

    fn branch_and_bound(&mut self, model: &Model) -> Result<(), Error> {
        self.nodes += 1;
        let relaxed = self.solver.lp.solve(model)?;

        let Some(upper_bound) = relaxed.objective_value() else {
            tracing::trace!(node = self.nodes, status = ?relaxed.status(), "relaxation has no assignment");
            if self.best.is_none() {
                self.best = Some(relaxed);
            }
            return Ok(());
        };

        if upper_bound <= self.lower_bound {
            tracing::trace!(node = self.nodes, upper_bound, lower_bound = self.lower_bound, "pruned");
            return Ok(());
        }

        let Some((variable, value)) = self.solver.fractional_variable(model, &relaxed) else {
            tracing::debug!(node = self.nodes, objective = upper_bound, "new incumbent");
            self.lower_bound = upper_bound;
            self.best = Some(relaxed);
            return Ok(());
        };

        if self.timed_out() {
            tracing::warn!(node = self.nodes, elapsed = ?self.start.elapsed(), "time limit reached, branching stopped");
            self.interrupted = true;
            return Ok(());
        }

        tracing::trace!(node = self.nodes, variable = variable.name(), value, "branching");
        self.branch_and_bound(&model.with_constraint(variable.geq(value.ceil())))?;
        self.branch_and_bound(&model.with_constraint(variable.leq(value.floor())))
    }
}

/// Outcome of a branch and bound search.
#[derive(Debug, Clone)]
pub struct IntegerSolution {
    model: Model,
    /// Incumbent, or the infeasible root relaxation when nothing better was found
    solution: Option<Solution>,
    interrupted: bool,
    nodes: usize,
    total_time: Duration,
}

impl IntegerSolution {
    /// The client's model.
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// The relaxation solution of the incumbent node, built on the standard
    /// form of the client's model. Its objective is the MAX form, so for a
    /// minimized model its `objective_value` is the negation of
    /// [`IntegerSolution::objective_value`].
    pub fn solution(&self) -> Option<&Solution> {
        self.solution.as_ref()
    }

    pub fn assignment(&self) -> Option<&[f64]> {
        self.solution.as_ref()?.assignment()
    }

    pub fn has_assignment(&self) -> bool {
        self.assignment().is_some()
    }

    pub fn value(&self, variable: &Variable) -> Option<f64> {
        self.assignment()?.get(variable.index()).copied()
    }

    /// The client's objective evaluated at the incumbent.
    pub fn objective_value(&self) -> Option<f64> {
        let assignment = self.assignment()?;
        self.model.objective().map(|o| o.evaluate(assignment))
    }

    /// Whether the search ran to completion.
    pub fn is_optimal(&self) -> bool {
        !self.interrupted
    }

    pub fn is_interrupted(&self) -> bool {
        self.interrupted
    }

    /// Number of relaxations solved.
    pub fn nodes(&self) -> usize {
        self.nodes
    }

    pub fn total_time(&self) -> Duration {
        self.total_time
    }
}

impl fmt::Display for IntegerSolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.assignment(), self.objective_value()) {
            (Some(assignment), Some(objective)) => {
                writeln!(f, "- objective value: {}", objective)?;
                write!(f, "- assignment:")?;
                for (variable, value) in self.model.variables().iter().zip(assignment) {
                    write!(f, "\n\t- {} = {:.0}", variable, value)?;
                }
            }
            _ => write!(f, "There is no integer solution")?,
        }
        if self.interrupted {
            write!(f, "\n(interrupted after {} nodes, the solution may not be optimal)", self.nodes)?;
        }
        Ok(())
    }
}
