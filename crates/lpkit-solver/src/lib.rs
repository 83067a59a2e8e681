mod analysis;
mod error;
mod integer;
mod simplex;
mod solution;
mod tableau;

pub use analysis::{
    Analyser, AnalysisResult, AnalysisResults, AnalysisTool, CoefficientRange, ObjectiveSensitivityAnalyser,
};
pub use error::Error;
pub use integer::{IntegerModel, IntegerSolution, IntegerSolver};
pub use simplex::{Optimization, Solver};
pub use solution::{Solution, SolutionStatus};
pub use tableau::Tableau;

use lpkit_model::Model;

/// Solving a [`Model`] with the default [`Solver`].
pub trait Solve {
    fn solve(&self) -> Result<Solution, Error>;
}

impl Solve for Model {
    fn solve(&self) -> Result<Solution, Error> {
        Solver::new().solve(self)
    }
}
