use std::fmt;

/// Dense simplex tableau.
///
/// Row 0 holds the negated reduced costs of a maximization objective followed
/// by the current objective value; row `i + 1` holds constraint `i`. The last
/// column is the right-hand side. The basic column of every constraint row is
/// tracked alongside the matrix and kept in sync by [`Tableau::pivot`]; a row
/// whose basic column was removed (a redundant constraint after phase one) has
/// no basic column.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Tableau {
    columns: Vec<String>,
    table: Vec<Vec<f64>>,
    basis: Vec<Option<usize>>,
    tolerance: f64,
}

impl Tableau {
    /// `table` must have `basis.len() + 1` rows of `columns.len() + 1` entries.
    pub fn new(columns: Vec<String>, table: Vec<Vec<f64>>, basis: Vec<Option<usize>>, tolerance: f64) -> Self {
        debug_assert_eq!(table.len(), basis.len() + 1);
        debug_assert!(table.iter().all(|row| row.len() == columns.len() + 1));
        Self {
            columns,
            table,
            basis,
            tolerance,
        }
    }

    pub fn table(&self) -> &[Vec<f64>] {
        &self.table
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn objective_row(&self) -> &[f64] {
        &self.table[0]
    }

    /// Number of variable columns, excluding the right-hand side.
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Number of constraint rows, excluding the objective row.
    pub fn num_constraints(&self) -> usize {
        self.basis.len()
    }

    fn rhs(&self) -> usize {
        self.columns.len()
    }

    pub fn objective_value(&self) -> f64 {
        self.table[0][self.rhs()]
    }

    pub fn is_optimal(&self) -> bool {
        self.table[0][..self.rhs()].iter().all(|&v| v >= -self.tolerance)
    }

    /// Column with the most negative reduced cost, lowest index on ties.
    /// `None` once the tableau is optimal.
    pub fn choose_entering_variable(&self) -> Option<usize> {
        let mut best = None;
        let mut min = -self.tolerance;
        for (j, &v) in self.table[0][..self.rhs()].iter().enumerate() {
            if v < min {
                min = v;
                best = Some(j);
            }
        }
        best
    }

    pub fn is_unbounded(&self, col: usize) -> bool {
        self.table[1..].iter().all(|row| row[col] <= self.tolerance)
    }

    /// Minimum ratio test over rows with a positive entry in `col`, lowest row
    /// on ties. Returns the tableau row (constraint index + 1).
    ///
    /// The first-row tie-break is not an anti-cycling rule; degenerate
    /// problems may cycle.
    pub fn choose_leaving_variable(&self, col: usize) -> Option<usize> {
        let rhs = self.rhs();
        let mut best = None;
        let mut min_ratio = f64::INFINITY;
        for (i, row) in self.table.iter().enumerate().skip(1) {
            if row[col] > self.tolerance {
                let ratio = row[rhs] / row[col];
                if ratio < min_ratio {
                    min_ratio = ratio;
                    best = Some(i);
                }
            }
        }
        best
    }

    /// Makes `col` basic in tableau row `row`.
    pub fn pivot(&mut self, row: usize, col: usize) {
        let pivot = self.table[row][col];
        for v in self.table[row].iter_mut() {
            *v /= pivot;
        }
        self.table[row][col] = 1.0;

        let pivot_row = self.table[row].clone();
        for (i, other) in self.table.iter_mut().enumerate() {
            if i == row {
                continue;
            }
            let factor = other[col];
            if factor != 0.0 {
                for (v, p) in other.iter_mut().zip(&pivot_row) {
                    *v -= factor * p;
                }
            }
            other[col] = 0.0;
        }

        self.basis[row - 1] = Some(col);
        tracing::trace!(row, col, objective = self.objective_value(), "pivot");
    }

    /// Basic column of each constraint row, in row order.
    pub fn extract_basis(&self) -> Vec<Option<usize>> {
        self.basis.clone()
    }

    /// Value of every column: the right-hand side of its row for basic
    /// columns, zero otherwise.
    pub fn extract_assignment(&self) -> Vec<f64> {
        let rhs = self.rhs();
        let mut assignment = vec![0.0; self.columns.len()];
        for (i, basic) in self.basis.iter().enumerate() {
            if let Some(col) = *basic {
                assignment[col] = self.table[i + 1][rhs];
            }
        }
        assignment
    }

    /// A tableau without the given columns. Rows basic in a removed column
    /// lose their basic column. The right-hand side is always kept.
    pub fn remove_columns(&self, removed: &[usize]) -> Self {
        let rhs = self.rhs();
        let keep: Vec<usize> = (0..=rhs).filter(|&j| j == rhs || !removed.contains(&j)).collect();
        let remap = |col: usize| keep.iter().position(|&k| k == col);

        Self {
            columns: keep[..keep.len() - 1].iter().map(|&j| self.columns[j].clone()).collect(),
            table: self
                .table
                .iter()
                .map(|row| keep.iter().map(|&j| row[j]).collect())
                .collect(),
            basis: self.basis.iter().map(|b| b.and_then(remap)).collect(),
            tolerance: self.tolerance,
        }
    }

    pub(crate) fn set_objective_row(&mut self, row: Vec<f64>) {
        debug_assert_eq!(row.len(), self.columns.len() + 1);
        self.table[0] = row;
    }

    /// Subtracts multiples of the constraint rows from row 0 so that every
    /// basic column has a zero reduced cost.
    pub(crate) fn fix_objective_row_to_basis(&mut self) {
        for (i, basic) in self.basis.iter().enumerate() {
            let Some(col) = *basic else { continue };
            let factor = self.table[0][col];
            if factor == 0.0 {
                continue;
            }
            let (objective, rows) = self.table.split_at_mut(1);
            for (v, r) in objective[0].iter_mut().zip(&rows[i]) {
                *v -= factor * r;
            }
            objective[0][col] = 0.0;
        }
    }
}

impl fmt::Display for Tableau {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = |i: usize| -> String {
            if i == 0 {
                "z".to_string()
            } else {
                match self.basis[i - 1] {
                    Some(col) => self.columns[col].clone(),
                    None => "-".to_string(),
                }
            }
        };

        let cells: Vec<Vec<String>> = self
            .table
            .iter()
            .map(|row| row.iter().map(|v| format!("{:.3}", v)).collect())
            .collect();

        let mut widths: Vec<usize> = self.columns.iter().map(|c| c.len()).collect();
        widths.push(3);
        for row in cells.iter() {
            for (w, cell) in widths.iter_mut().zip(row) {
                *w = (*w).max(cell.len());
            }
        }
        let label_width = (0..self.table.len()).map(|i| label(i).len()).max().unwrap_or(1);

        write!(f, "{:label_width$} |", "")?;
        for (name, &w) in self.columns.iter().zip(&widths) {
            write!(f, " {:>w$}", name)?;
        }
        writeln!(f, " | {:>w$}", "rhs", w = widths[widths.len() - 1])?;

        for (i, row) in cells.iter().enumerate() {
            write!(f, "{:label_width$} |", label(i))?;
            let (values, rhs) = row.split_at(row.len() - 1);
            for (cell, &w) in values.iter().zip(&widths) {
                write!(f, " {:>w$}", cell)?;
            }
            writeln!(f, " | {:>w$}", rhs[0], w = widths[widths.len() - 1])?;
        }
        Ok(())
    }
}
