use lpkit_model::{Model, Relation, Variable};

use crate::error::Error;
use crate::solution::Solution;
use crate::tableau::Tableau;

/// Two-phase tableau simplex solver.
#[derive(Debug, Clone, Copy)]
pub struct Solver {
    /// Maximum pivots per phase before giving up
    max_iterations: usize,
    /// Tolerance for floating point sign tests
    tolerance: f64,
}

impl Default for Solver {
    fn default() -> Self {
        Self {
            max_iterations: 10000,
            tolerance: 1e-9,
        }
    }
}

/// How a run of [`Solver::optimize`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Optimization {
    Optimal { pivots: usize },
    Unbounded { pivots: usize },
}

/// The model after standardization with one slack or surplus column per
/// inequality. The column maps live only for the duration of one solve.
struct NormalForm {
    model: Model,
    /// (column, constraint) of each slack variable
    slack: Vec<(usize, usize)>,
    /// (column, constraint) of each surplus variable
    surplus: Vec<(usize, usize)>,
}

enum Presolve {
    Feasible(Tableau),
    Infeasible(Tableau),
}

impl Solver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Solve the model using the two-phase simplex method.
    ///
    /// Fails only on configuration errors; infeasible and unbounded models
    /// are reported through the returned [`Solution`].
    pub fn solve(&self, model: &Model) -> Result<Solution, Error> {
        model.validate()?;

        let normal = self.normalize(model)?;
        tracing::debug!(
            model = model.name(),
            constraints = normal.model.num_constraints(),
            slack = normal.slack.len(),
            surplus = normal.surplus.len(),
            "normalized model"
        );

        let mut tableau = if normal.slack.len() < normal.model.num_constraints() {
            match self.presolve(&normal)? {
                Presolve::Feasible(tableau) => tableau,
                Presolve::Infeasible(tableau) => {
                    tracing::debug!(model = model.name(), "model is infeasible");
                    return Ok(Solution::infeasible(model.clone(), tableau.clone(), tableau, normal.model));
                }
            }
        } else {
            self.basic_initial_tableau(&normal)
        };

        let initial_tableau = tableau.clone();
        match self.optimize(&mut tableau) {
            Optimization::Optimal { pivots } => {
                tracing::debug!(model = model.name(), pivots, objective = tableau.objective_value(), "phase two optimal");
            }
            Optimization::Unbounded { pivots } => {
                tracing::debug!(model = model.name(), pivots, "model is unbounded");
                return Ok(Solution::unbounded(model.clone(), initial_tableau, tableau, normal.model));
            }
        }

        let mut assignment = tableau.extract_assignment();
        assignment.truncate(model.num_variables());
        Ok(Solution::optimal(model.clone(), assignment, initial_tableau, tableau, normal.model))
    }

    /// Pivots until the tableau is optimal or an entering column has no
    /// leaving row. An already optimal tableau is left untouched.
    pub fn optimize(&self, tableau: &mut Tableau) -> Optimization {
        let mut pivots = 0;
        while let Some(col) = tableau.choose_entering_variable() {
            if tableau.is_unbounded(col) {
                return Optimization::Unbounded { pivots };
            }
            let Some(row) = tableau.choose_leaving_variable(col) else {
                return Optimization::Unbounded { pivots };
            };
            if pivots == self.max_iterations {
                tracing::warn!(pivots, "iteration limit reached, stopping at the current basis");
                break;
            }
            tableau.pivot(row, col);
            pivots += 1;
        }
        Optimization::Optimal { pivots }
    }

    /// Standard form, non-negative bounds, then a slack column (+1) for every
    /// `<=` row and a surplus column (-1) for every `>=` row. All rows become
    /// equalities.
    fn normalize(&self, original: &Model) -> Result<NormalForm, Error> {
        let standard = original.translate_to_standard_form();
        let constraints: Vec<_> = standard
            .constraints()
            .map(|c| if c.bound() < 0.0 { c.inverted() } else { c.clone() })
            .collect();

        let mut model = standard.without_constraints();
        let mut extra: Vec<Option<(Variable, f64)>> = vec![None; constraints.len()];

        let mut slack = Vec::new();
        for (i, c) in constraints.iter().enumerate() {
            if c.relation() == Relation::Le {
                let var = model.create_variable(fresh_name(&model, "s", i))?;
                slack.push((var.index(), i));
                extra[i] = Some((var, 1.0));
            }
        }

        let mut surplus = Vec::new();
        for (i, c) in constraints.iter().enumerate() {
            if c.relation() == Relation::Ge {
                let var = model.create_variable(fresh_name(&model, "s", i))?;
                surplus.push((var.index(), i));
                extra[i] = Some((var, -1.0));
            }
        }

        for (c, column) in constraints.into_iter().zip(extra) {
            match column {
                Some((var, factor)) => model.add_constraint(c.with_term(var.times(factor), Relation::Eq)),
                None => model.add_constraint(c),
            }
        }

        Ok(NormalForm { model, slack, surplus })
    }

    /// Phase one: minimize the sum of artificial variables added to every row
    /// without a slack column. On success returns a phase-two tableau whose
    /// objective row is the true objective expressed against the basis found.
    fn presolve(&self, normal: &NormalForm) -> Result<Presolve, Error> {
        let has_slack = |row: usize| normal.slack.iter().any(|&(_, r)| r == row);

        let mut model = normal.model.without_constraints();
        let mut artificial = Vec::new();
        for (i, c) in normal.model.constraints().enumerate() {
            if has_slack(i) {
                model.add_constraint(c.clone());
            } else {
                let var = model.create_variable(fresh_name(&model, "R", i))?;
                artificial.push((var.index(), i));
                model.add_constraint(c.with_term(var.times(1.0), Relation::Eq));
            }
        }

        let n = model.num_variables();
        let rows = constraint_rows(&model);

        let mut objective_row = vec![0.0; n + 1];
        for &(col, _) in artificial.iter() {
            objective_row[col] = 1.0;
        }
        for &(_, row) in artificial.iter() {
            for (v, a) in objective_row.iter_mut().zip(&rows[row]) {
                *v -= a;
            }
        }

        let basis = (0..rows.len())
            .map(|i| {
                normal
                    .slack
                    .iter()
                    .chain(artificial.iter())
                    .find(|&&(_, row)| row == i)
                    .map(|&(col, _)| col)
            })
            .collect();

        let mut table = vec![objective_row];
        table.extend(rows);
        let mut tableau = Tableau::new(column_names(&model), table, basis, self.tolerance);

        tracing::debug!(artificial = artificial.len(), "phase one");
        self.optimize(&mut tableau);

        let assignment = tableau.extract_assignment();
        if artificial.iter().any(|&(col, _)| assignment[col] > self.tolerance) {
            return Ok(Presolve::Infeasible(tableau));
        }

        self.drive_out_artificial(&mut tableau, &artificial);

        let removed: Vec<usize> = artificial.iter().map(|&(col, _)| col).collect();
        let mut tableau = tableau.remove_columns(&removed);
        tableau.set_objective_row(negated_objective_row(&normal.model));
        tableau.fix_objective_row_to_basis();
        Ok(Presolve::Feasible(tableau))
    }

    /// Artificial variables left in the basis at zero level are exchanged for
    /// any non-artificial column with a non-zero entry in their row. Rows
    /// without such a column are redundant and keep no basic column once the
    /// artificial columns are removed.
    fn drive_out_artificial(&self, tableau: &mut Tableau, artificial: &[(usize, usize)]) {
        let is_artificial = |col: usize| artificial.iter().any(|&(c, _)| c == col);

        for (i, basic) in tableau.extract_basis().into_iter().enumerate() {
            let Some(col) = basic else { continue };
            if !is_artificial(col) {
                continue;
            }
            let row = i + 1;
            let entering = (0..tableau.num_columns())
                .find(|&j| !is_artificial(j) && tableau.table()[row][j].abs() > self.tolerance);
            if let Some(j) = entering {
                tableau.pivot(row, j);
            }
        }
    }

    fn basic_initial_tableau(&self, normal: &NormalForm) -> Tableau {
        let rows = constraint_rows(&normal.model);
        let basis = (0..rows.len())
            .map(|i| normal.slack.iter().find(|&&(_, row)| row == i).map(|&(col, _)| col))
            .collect();

        let mut table = vec![negated_objective_row(&normal.model)];
        table.extend(rows);
        Tableau::new(column_names(&normal.model), table, basis, self.tolerance)
    }
}

fn fresh_name(model: &Model, prefix: &str, index: usize) -> String {
    let mut name = format!("{prefix}{index}");
    while model.has_variable(&name) {
        name.push('\'');
    }
    name
}

fn column_names(model: &Model) -> Vec<String> {
    model.variables().iter().map(|v| v.name().to_string()).collect()
}

/// Constraint factors followed by the bound, one row per constraint.
fn constraint_rows(model: &Model) -> Vec<Vec<f64>> {
    let n = model.num_variables();
    model
        .constraints()
        .map(|c| {
            let mut row = c.expression().factors(n);
            row.push(c.bound());
            row
        })
        .collect()
}

/// Row 0 of a fresh tableau: negated objective factors and a zero value.
fn negated_objective_row(model: &Model) -> Vec<f64> {
    let n = model.num_variables();
    let mut row = match model.objective() {
        Some(objective) => objective.expression().negated().factors(n),
        None => vec![0.0; n],
    };
    row.push(0.0);
    row
}
