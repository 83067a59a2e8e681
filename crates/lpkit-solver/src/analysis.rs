use std::collections::BTreeMap;

use lpkit_model::{ObjectiveKind, Variable};

use crate::error::Error;
use crate::solution::Solution;

const EPSILON: f64 = 1e-12;

/// Range in which an objective coefficient may move without changing the
/// optimal basis.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct CoefficientRange {
    pub variable: Variable,
    /// Coefficient in the client's objective
    pub coefficient: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisResult {
    ObjectiveSensitivity(Vec<CoefficientRange>),
}

/// Results of every tool, keyed by tool name.
pub type AnalysisResults = BTreeMap<&'static str, AnalysisResult>;

/// A post-optimality analysis run on a solved model.
pub trait AnalysisTool {
    fn name(&self) -> &'static str;

    fn analyse(&self, solution: &Solution) -> Result<AnalysisResult, Error>;

    /// Writes a human readable interpretation of `result`, one line per call.
    fn interpret_results(&self, solution: &Solution, result: &AnalysisResult, sink: &mut dyn FnMut(&str));
}

/// Runs a set of [`AnalysisTool`]s over a solution.
pub struct Analyser {
    tools: Vec<Box<dyn AnalysisTool>>,
}

impl Default for Analyser {
    fn default() -> Self {
        Self {
            tools: vec![Box::new(ObjectiveSensitivityAnalyser)],
        }
    }
}

impl Analyser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tool(mut self, tool: impl AnalysisTool + 'static) -> Self {
        self.tools.push(Box::new(tool));
        self
    }

    pub fn analyse(&self, solution: &Solution) -> Result<AnalysisResults, Error> {
        self.tools
            .iter()
            .map(|tool| tool.analyse(solution).map(|result| (tool.name(), result)))
            .collect()
    }

    pub fn interpret_results(&self, solution: &Solution, results: &AnalysisResults, sink: &mut dyn FnMut(&str)) {
        for tool in self.tools.iter() {
            if let Some(result) = results.get(tool.name()) {
                tool.interpret_results(solution, result, sink);
            }
        }
    }
}

/// Sensitivity of the optimum to changes of the cost coefficients.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjectiveSensitivityAnalyser;

impl ObjectiveSensitivityAnalyser {
    pub const NAME: &'static str = "Cost Coefficient Sensitivity Analysis";

    /// Ranges for every variable the objective depends on, in variable order.
    ///
    /// Computed on the maximization form the tableau was built from and
    /// mapped back to the client's objective sense.
    pub fn coefficient_ranges(&self, solution: &Solution) -> Result<Vec<CoefficientRange>, Error> {
        if !solution.has_assignment() {
            return Err(Error::NoOptimum);
        }
        let model = solution.model();
        let objective = model.objective().ok_or(Error::NoOptimum)?;
        let minimize = objective.kind() == ObjectiveKind::Min;

        let tableau = solution.tableau();
        let n = tableau.num_columns();
        let coefficients = match solution.normal_model().objective() {
            Some(o) => o.expression().factors(model.num_variables()),
            None => return Err(Error::NoOptimum),
        };
        let final_coefficients = &tableau.objective_row()[..n];
        let basis = tableau.extract_basis();

        let mut ranges = Vec::new();
        for variable in model.variables() {
            if !objective.depends_on_variable(variable) {
                continue;
            }
            let i = variable.index();
            let coefficient = coefficients[i];

            let (lower_bound, upper_bound) = match basis.iter().position(|&b| b == Some(i)) {
                Some(row) => {
                    let mut lower_ratios = Vec::new();
                    let mut upper_ratios = Vec::new();
                    for (j, &a) in tableau.table()[row + 1][..n].iter().enumerate() {
                        if j == i {
                            continue;
                        }
                        if a > EPSILON {
                            lower_ratios.push(final_coefficients[j] / a);
                        } else if a < -EPSILON {
                            upper_ratios.push(final_coefficients[j] / a);
                        }
                    }
                    let lower = lower_ratios
                        .into_iter()
                        .min_by(f64::total_cmp)
                        .map_or(f64::NEG_INFINITY, |r| coefficient - r);
                    let upper = upper_ratios
                        .into_iter()
                        .max_by(f64::total_cmp)
                        .map_or(f64::INFINITY, |r| coefficient - r);
                    (lower, upper)
                }
                None => (f64::NEG_INFINITY, coefficient + final_coefficients[i]),
            };

            ranges.push(if minimize {
                CoefficientRange {
                    variable: variable.clone(),
                    coefficient: -coefficient,
                    lower_bound: -upper_bound,
                    upper_bound: -lower_bound,
                }
            } else {
                CoefficientRange {
                    variable: variable.clone(),
                    coefficient,
                    lower_bound,
                    upper_bound,
                }
            });
        }

        tracing::debug!(model = model.name(), ranges = ranges.len(), "objective sensitivity");
        Ok(ranges)
    }
}

impl AnalysisTool for ObjectiveSensitivityAnalyser {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn analyse(&self, solution: &Solution) -> Result<AnalysisResult, Error> {
        self.coefficient_ranges(solution).map(AnalysisResult::ObjectiveSensitivity)
    }

    fn interpret_results(&self, _solution: &Solution, result: &AnalysisResult, sink: &mut dyn FnMut(&str)) {
        let AnalysisResult::ObjectiveSensitivity(ranges) = result;

        sink("* Cost Coefficients Sensitivity Analysis:");
        sink("-> To keep the current optimum, the cost coefficients should stay in following ranges:");
        let width = ranges
            .iter()
            .flat_map(|r| [format!("{:.3}", r.lower_bound).len(), format!("{:.3}", r.upper_bound).len()])
            .max()
            .unwrap_or(0);
        for r in ranges {
            sink(&format!(
                "\t {:>width$.3} <= c({}) <= {:>width$.3}, (originally: {:.3})",
                r.lower_bound, r.variable, r.upper_bound, r.coefficient
            ));
        }
    }
}
