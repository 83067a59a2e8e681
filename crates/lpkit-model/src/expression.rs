use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use crate::constraint::{Constraint, Relation};
use crate::variable::Variable;

/// A single linear term, e.g. `4*x` or `-0.5*y`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    variable: Variable,
    factor: f64,
}

impl Atom {
    pub fn new(variable: Variable, factor: f64) -> Self {
        Self { variable, factor }
    }

    pub fn variable(&self) -> &Variable {
        &self.variable
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }

    pub fn evaluate_with_value(&self, value: f64) -> f64 {
        self.factor * value
    }

    pub fn scale(&self, factor: f64) -> Self {
        Self::new(self.variable.clone(), self.factor * factor)
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.factor == 1.0 {
            write!(f, "{}", self.variable)
        } else if self.factor == -1.0 {
            write!(f, "-{}", self.variable)
        } else {
            write!(f, "{}*{}", self.factor, self.variable)
        }
    }
}

/// A linear polynomial: an ordered sum of atoms.
///
/// Atoms are kept as written; the same variable may occur several times until
/// [`Expression::simplify`] merges them.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Expression {
    atoms: Vec<Atom>,
}

impl Expression {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_atoms(atoms: Vec<Atom>) -> Self {
        Self { atoms }
    }

    /// Pairs each variable with the factor at the same position.
    pub fn from_vectors(variables: &[Variable], factors: &[f64]) -> Self {
        debug_assert_eq!(
            variables.len(),
            factors.len(),
            "number of factors should correspond to variables in the expression"
        );
        let atoms = variables
            .iter()
            .zip(factors)
            .map(|(v, &f)| Atom::new(v.clone(), f))
            .collect();
        Self { atoms }
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.atoms.iter().map(Atom::variable)
    }

    pub fn plus(&self, other: &Expression) -> Self {
        let mut atoms = self.atoms.clone();
        atoms.extend(other.atoms.iter().cloned());
        Self { atoms }
    }

    pub fn minus(&self, other: &Expression) -> Self {
        self.plus(&other.negated())
    }

    pub fn scale(&self, factor: f64) -> Self {
        Self {
            atoms: self.atoms.iter().map(|a| a.scale(factor)).collect(),
        }
    }

    pub fn negated(&self) -> Self {
        self.scale(-1.0)
    }

    /// Merges atoms that share a variable and sorts them by variable index.
    pub fn simplify(&self) -> Self {
        let mut sorted = self.atoms.clone();
        sorted.sort_by_key(|a| a.variable.index());

        let mut atoms: Vec<Atom> = Vec::with_capacity(sorted.len());
        for atom in sorted {
            match atoms.last_mut() {
                Some(last) if last.variable.index() == atom.variable.index() => {
                    last.factor += atom.factor;
                }
                _ => atoms.push(atom),
            }
        }
        Self { atoms }
    }

    /// Dense coefficient vector over the first `len` variables of a model.
    pub fn factors(&self, len: usize) -> Vec<f64> {
        let mut factors = vec![0.0; len];
        for atom in self.atoms.iter() {
            if let Some(slot) = factors.get_mut(atom.variable.index()) {
                *slot += atom.factor;
            }
        }
        factors
    }

    /// Value of the expression; `assignment` is indexed by variable index.
    pub fn evaluate(&self, assignment: &[f64]) -> f64 {
        self.atoms
            .iter()
            .map(|a| a.evaluate_with_value(assignment[a.variable.index()]))
            .sum()
    }

    pub fn depends_on(&self, index: usize) -> bool {
        self.factors(index + 1)[index] != 0.0
    }

    pub fn leq(&self, bound: f64) -> Constraint {
        Constraint::new(self.clone(), bound, Relation::Le)
    }

    pub fn geq(&self, bound: f64) -> Constraint {
        Constraint::new(self.clone(), bound, Relation::Ge)
    }

    pub fn equals(&self, bound: f64) -> Constraint {
        Constraint::new(self.clone(), bound, Relation::Eq)
    }
}

impl From<&Variable> for Expression {
    fn from(variable: &Variable) -> Self {
        Self::from_atoms(vec![variable.times(1.0)])
    }
}

impl From<Atom> for Expression {
    fn from(atom: Atom) -> Self {
        Self::from_atoms(vec![atom])
    }
}

impl FromIterator<Atom> for Expression {
    fn from_iter<I: IntoIterator<Item = Atom>>(iter: I) -> Self {
        Self::from_atoms(iter.into_iter().collect())
    }
}

impl Add for Expression {
    type Output = Expression;

    fn add(mut self, rhs: Expression) -> Self::Output {
        self.atoms.extend(rhs.atoms);
        self
    }
}

impl Sub for Expression {
    type Output = Expression;

    fn sub(self, rhs: Expression) -> Self::Output {
        self + (-rhs)
    }
}

impl Neg for Expression {
    type Output = Expression;

    fn neg(self) -> Self::Output {
        self.negated()
    }
}

impl Mul<f64> for Expression {
    type Output = Expression;

    fn mul(self, rhs: f64) -> Self::Output {
        self.scale(rhs)
    }
}

impl Add<Atom> for Expression {
    type Output = Expression;

    fn add(mut self, rhs: Atom) -> Self::Output {
        self.atoms.push(rhs);
        self
    }
}

impl Add for Atom {
    type Output = Expression;

    fn add(self, rhs: Atom) -> Self::Output {
        Expression::from_atoms(vec![self, rhs])
    }
}

impl Sub for Atom {
    type Output = Expression;

    fn sub(self, rhs: Atom) -> Self::Output {
        let negated = rhs.scale(-1.0);
        self + negated
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some((first, rest)) = self.atoms.split_first() else {
            return f.write_str("0");
        };
        write!(f, "{}", first)?;
        for atom in rest {
            f.write_str(if atom.factor >= 0.0 { " + " } else { " - " })?;
            let factor = atom.factor.abs();
            if factor == 1.0 {
                write!(f, "{}", atom.variable)?;
            } else {
                write!(f, "{}*{}", factor, atom.variable)?;
            }
        }
        Ok(())
    }
}
