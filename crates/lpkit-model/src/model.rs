use std::fmt;
use std::sync::Arc;

use crate::constraint::{Constraint, Relation};
use crate::error::ModelError;
use crate::expression::Expression;
use crate::objective::{Objective, ObjectiveKind};
use crate::variable::Variable;

/// A linear programming problem over non-negative variables.
///
/// Variables and constraints sit behind `Arc`s, so cloning a model (or deriving
/// a child with [`Model::with_constraint`]) shares every existing part and only
/// allocates the list of pointers.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct Model {
    name: String,
    variables: Arc<Vec<Variable>>,
    constraints: Vec<Arc<Constraint>>,
    objective: Option<Objective>,
}

impl Model {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variables: Arc::new(Vec::new()),
            constraints: Vec::new(),
            objective: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.iter().find(|v| v.name() == name)
    }

    pub fn has_variable(&self, name: &str) -> bool {
        self.variable(name).is_some()
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn constraints(&self) -> impl ExactSizeIterator<Item = &Constraint> {
        self.constraints.iter().map(|c| c.as_ref())
    }

    pub fn constraint(&self, index: usize) -> Option<&Constraint> {
        self.constraints.get(index).map(|c| c.as_ref())
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    pub fn objective(&self) -> Option<&Objective> {
        self.objective.as_ref()
    }

    /// Creates a new variable indexed after all existing ones.
    pub fn create_variable(&mut self, name: impl AsRef<str>) -> Result<Variable, ModelError> {
        let name = name.as_ref();
        if self.has_variable(name) {
            return Err(ModelError::DuplicateVariable(name.to_string()));
        }

        let variable = Variable::new(name, self.variables.len());
        Arc::make_mut(&mut self.variables).push(variable.clone());

        tracing::debug!(
            model = %self.name,
            variable = name,
            index = variable.index(),
            "created variable"
        );
        Ok(variable)
    }

    pub fn add_constraint(&mut self, constraint: Constraint) {
        tracing::debug!(model = %self.name, constraint = %constraint, "added constraint");
        self.constraints.push(Arc::new(constraint));
    }

    /// A copy of this model with one more constraint appended.
    pub fn with_constraint(&self, constraint: Constraint) -> Self {
        let mut child = self.clone();
        child.constraints.push(Arc::new(constraint));
        child
    }

    /// A copy sharing variables and objective, but without any constraint.
    pub fn without_constraints(&self) -> Self {
        Self {
            name: self.name.clone(),
            variables: Arc::clone(&self.variables),
            constraints: Vec::new(),
            objective: self.objective.clone(),
        }
    }

    pub fn maximize(&mut self, expression: Expression) {
        self.objective = Some(Objective::new(expression, ObjectiveKind::Max));
    }

    pub fn minimize(&mut self, expression: Expression) {
        self.objective = Some(Objective::new(expression, ObjectiveKind::Min));
    }

    /// Checks the preconditions of solving: at least one variable, an
    /// objective, and no expression referring to another model's variables.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.variables.is_empty() {
            return Err(ModelError::NoVariables);
        }
        let objective = self.objective.as_ref().ok_or(ModelError::NoObjective)?;

        let expressions = self
            .constraints()
            .map(Constraint::expression)
            .chain(std::iter::once(objective.expression()));
        for expression in expressions {
            for variable in expression.variables() {
                if self.variables.get(variable.index()) != Some(variable) {
                    return Err(ModelError::ForeignVariable {
                        name: variable.name().to_string(),
                        index: variable.index(),
                    });
                }
            }
        }
        Ok(())
    }

    /// An equivalent model with a MAX objective and only `<=` / `=`
    /// constraints, every expression simplified.
    pub fn translate_to_standard_form(&self) -> Self {
        let constraints = self
            .constraints()
            .map(|c| {
                let mut c = c.simplify();
                if c.relation() == Relation::Ge {
                    c.invert();
                }
                Arc::new(c)
            })
            .collect();

        let objective = self.objective.as_ref().map(|o| {
            let mut o = o.simplify();
            if o.kind() == ObjectiveKind::Min {
                o.invert();
            }
            o
        });

        Self {
            name: self.name.clone(),
            variables: Arc::clone(&self.variables),
            constraints,
            objective,
        }
    }

    /// Structural comparison of the standard forms of two models, ignoring
    /// names.
    pub fn is_equivalent(&self, other: &Model) -> bool {
        let m1 = self.translate_to_standard_form();
        let m2 = other.translate_to_standard_form();

        if m1.num_variables() != m2.num_variables() || m1.num_constraints() != m2.num_constraints() {
            return false;
        }

        let n = m1.num_variables();
        match (m1.objective(), m2.objective()) {
            (Some(o1), Some(o2)) => {
                if o1.kind() != o2.kind() || o1.expression().factors(n) != o2.expression().factors(n) {
                    return false;
                }
            }
            (None, None) => {}
            _ => return false,
        }

        m1.constraints().zip(m2.constraints()).all(|(c1, c2)| {
            c1.bound() == c2.bound()
                && c1.relation() == c2.relation()
                && c1.expression().factors(n) == c2.expression().factors(n)
        })
    }

    /// Builds the dual problem of the standard form of this model.
    ///
    /// Each primal constraint becomes a dual variable `y{i}` weighted by its
    /// bound in a minimized objective, and each primal variable becomes a `>=`
    /// constraint over the transposed coefficient column.
    pub fn dual(&self) -> Result<Model, ModelError> {
        if self.constraints().any(|c| c.relation() == Relation::Eq) {
            return Err(ModelError::DualWithEquality);
        }
        let primal = self.translate_to_standard_form();
        let primal_objective = primal.objective().ok_or(ModelError::NoObjective)?;

        let mut dual = Model::new(format!("{} (dual)", primal.name));
        let dual_variables = (0..primal.num_constraints())
            .map(|i| dual.create_variable(format!("y{i}")))
            .collect::<Result<Vec<_>, _>>()?;

        let n = primal.num_variables();
        let matrix: Vec<Vec<f64>> = primal.constraints().map(|c| c.expression().factors(n)).collect();

        let bounds: Vec<f64> = primal.constraints().map(Constraint::bound).collect();
        dual.minimize(Expression::from_vectors(&dual_variables, &bounds));

        for (j, cost) in primal_objective.expression().factors(n).into_iter().enumerate() {
            let column: Vec<f64> = matrix.iter().map(|row| row[j]).collect();
            dual.add_constraint(Expression::from_vectors(&dual_variables, &column).geq(cost));
        }

        tracing::debug!(
            primal = %self.name,
            variables = dual.num_variables(),
            constraints = dual.num_constraints(),
            "built dual model"
        );
        Ok(dual)
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "- name: {}", self.name)?;
        writeln!(f, "- variables:")?;
        for v in self.variables.iter() {
            writeln!(f, "\t{} >= 0", v)?;
        }
        writeln!(f, "- constraints:")?;
        for c in self.constraints() {
            writeln!(f, "\t{}", c)?;
        }
        writeln!(f, "- objective:")?;
        match &self.objective {
            Some(objective) => writeln!(f, "\t{}", objective),
            None => writeln!(f, "\tnone"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dual_example() -> Model {
        let mut primal = Model::new("example_dual");
        let x0 = primal.create_variable("x0").unwrap();
        let x1 = primal.create_variable("x1").unwrap();
        let x2 = primal.create_variable("x2").unwrap();
        let xs = [x0, x1, x2];

        primal.add_constraint(Expression::from_vectors(&xs, &[4.0, 8.0, -1.0]).leq(5.0));
        primal.add_constraint(Expression::from_vectors(&xs, &[7.0, -2.0, 2.0]).geq(4.0));
        primal.maximize(Expression::from_vectors(&xs, &[3.0, 2.0, -6.0]));
        primal
    }

    #[test]
    fn test_duplicate_variable() {
        let mut model = Model::new("dup");
        model.create_variable("x").unwrap();
        assert_eq!(
            model.create_variable("x"),
            Err(ModelError::DuplicateVariable("x".to_string()))
        );
        assert_eq!(model.num_variables(), 1);
    }

    #[test]
    fn test_validate() {
        let mut model = Model::new("empty");
        assert_eq!(model.validate(), Err(ModelError::NoVariables));

        let x = model.create_variable("x").unwrap();
        assert_eq!(model.validate(), Err(ModelError::NoObjective));

        model.maximize(Expression::from(&x));
        assert_eq!(model.validate(), Ok(()));

        let mut other = Model::new("other");
        other.create_variable("a").unwrap();
        let b = other.create_variable("b").unwrap();
        model.add_constraint(b.leq(1.0));
        assert_eq!(
            model.validate(),
            Err(ModelError::ForeignVariable { name: "b".to_string(), index: 1 })
        );
    }

    #[test]
    fn test_standard_form() {
        let mut model = Model::new("standard");
        let x = model.create_variable("x").unwrap();
        let y = model.create_variable("y").unwrap();
        model.add_constraint(Expression::from_vectors(&[x.clone(), y.clone(), x.clone()], &[1.0, 5.0, 1.0]).geq(-8.0));
        model.add_constraint(Expression::from_vectors(&[x.clone(), y.clone()], &[1.0, 1.0]).equals(3.0));
        model.minimize(Expression::from_vectors(&[x, y], &[-8.0, -10.0]));

        let standard = model.translate_to_standard_form();
        let c0 = standard.constraint(0).unwrap();
        assert_eq!(c0.relation(), Relation::Le);
        assert_eq!(c0.bound(), 8.0);
        assert_eq!(c0.expression().atoms().len(), 2);
        assert_eq!(c0.expression().factors(2), vec![-2.0, -5.0]);
        assert_eq!(standard.constraint(1).unwrap().relation(), Relation::Eq);

        let objective = standard.objective().unwrap();
        assert_eq!(objective.kind(), ObjectiveKind::Max);
        assert_eq!(objective.expression().factors(2), vec![8.0, 10.0]);

        // The client's model is untouched.
        assert_eq!(model.constraint(0).unwrap().relation(), Relation::Ge);
        assert_eq!(model.objective().unwrap().kind(), ObjectiveKind::Min);
    }

    #[test]
    fn test_dual() {
        let primal = dual_example();

        let mut expected = Model::new("expected dual");
        let y0 = expected.create_variable("y0").unwrap();
        let y1 = expected.create_variable("y1").unwrap();
        let ys = [y0, y1];
        expected.add_constraint(Expression::from_vectors(&ys, &[4.0, -7.0]).geq(3.0));
        expected.add_constraint(Expression::from_vectors(&ys, &[8.0, 2.0]).geq(2.0));
        expected.add_constraint(Expression::from_vectors(&ys, &[-1.0, -2.0]).geq(-6.0));
        expected.minimize(Expression::from_vectors(&ys, &[5.0, -4.0]));

        let dual = primal.dual().unwrap();
        assert_eq!(dual.name(), "example_dual (dual)");
        assert!(dual.is_equivalent(&expected), "dual wasn't calculated as expected");
        assert!(primal.is_equivalent(&dual.dual().unwrap()), "double dual should equal the primal");
    }

    #[test]
    fn test_dual_rejects_equality() {
        let mut model = Model::new("eq");
        let x = model.create_variable("x").unwrap();
        model.add_constraint(x.equals(1.0));
        model.maximize(Expression::from(&x));
        assert_eq!(model.dual().unwrap_err(), ModelError::DualWithEquality);
    }

    #[test]
    fn test_is_equivalent_detects_differences() {
        let primal = dual_example();
        let mut changed = primal.without_constraints();
        for c in primal.constraints() {
            changed.add_constraint(c.clone());
        }
        assert!(primal.is_equivalent(&changed));

        let x0 = primal.variables()[0].clone();
        assert!(!primal.is_equivalent(&changed.with_constraint(x0.leq(1.0))));
    }

    #[test]
    fn test_with_constraint_shares_parent() {
        let parent = dual_example();
        let x0 = parent.variables()[0].clone();
        let child = parent.with_constraint(x0.geq(2.0));

        assert_eq!(parent.num_constraints(), 2);
        assert_eq!(child.num_constraints(), 3);
        assert!(Arc::ptr_eq(&parent.variables, &child.variables));
        assert!(Arc::ptr_eq(&parent.constraints[0], &child.constraints[0]));
    }

    #[test]
    fn test_display() {
        let model = dual_example();
        let text = model.to_string();
        assert!(text.starts_with("- name: example_dual\n"));
        assert!(text.contains("\tx1 >= 0\n"));
        assert!(text.contains("\t4*x0 + 8*x1 - x2 <= 5\n"));
        assert!(text.contains("\tmax: z = 3*x0 + 2*x1 - 6*x2\n"));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_round_trip() {
        let model = dual_example();
        let json = serde_json::to_string(&model).unwrap();
        let restored: Model = serde_json::from_str(&json).unwrap();
        assert!(model.is_equivalent(&restored));
        assert_eq!(restored.variables()[2].name(), "x2");
    }
}
