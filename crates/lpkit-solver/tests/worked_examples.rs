use lpkit_model::{Expression, Model};
use lpkit_solver::{Analyser, IntegerModel, ObjectiveSensitivityAnalyser, Solve, SolutionStatus};

fn assert_close(actual: f64, expected: f64) {
    assert!((actual - expected).abs() < 1e-6, "got {}, expected {}", actual, expected);
}

fn assert_assignment(assignment: Option<&[f64]>, expected: &[f64]) {
    let assignment = assignment.expect("expected an assignment");
    assert_eq!(assignment.len(), expected.len());
    for (&value, &expected) in assignment.iter().zip(expected) {
        assert_close(value, expected);
    }
}

#[test]
fn maximize() {
    let mut model = Model::new("example_01_solvable");
    let x1 = model.create_variable("x1").unwrap();
    let x2 = model.create_variable("x2").unwrap();
    model.add_constraint(x1.leq(150.0));
    model.add_constraint(x2.leq(250.0));
    model.add_constraint(Expression::from_vectors(&[x1.clone(), x2.clone()], &[2.0, 1.0]).leq(500.0));
    model.maximize(x1.times(8.0) + x2.times(5.0));

    let solution = model.solve().unwrap();
    assert_eq!(solution.status(), SolutionStatus::Optimal);
    assert_assignment(solution.assignment(), &[125.0, 250.0]);
    assert_close(solution.objective_value().unwrap(), 2250.0);
    assert_close(solution.value(&x2).unwrap(), 250.0);
}

#[test]
fn minimize() {
    let mut model = Model::new("example_02_solvable");
    let x1 = model.create_variable("x1").unwrap();
    let x2 = model.create_variable("x2").unwrap();
    let x3 = model.create_variable("x3").unwrap();
    let xs = [x1, x2, x3];
    model.add_constraint(Expression::from_vectors(&xs, &[1.0, 3.0, 2.0]).leq(10.0));
    model.add_constraint(Expression::from_vectors(&xs, &[-1.0, -5.0, -1.0]).geq(-8.0));
    model.minimize(Expression::from_vectors(&xs, &[-8.0, -10.0, -7.0]));

    let solution = model.solve().unwrap();
    assert_assignment(solution.assignment(), &[8.0, 0.0, 0.0]);
    assert_close(solution.objective_value().unwrap(), -64.0);
}

#[test]
fn artificial_variables() {
    let mut model = Model::new("example_03_artificial_vars");
    let x1 = model.create_variable("x1").unwrap();
    let x2 = model.create_variable("x2").unwrap();
    model.add_constraint((x1.times(2.0) - x2.times(1.0)).leq(-1.0));
    model.add_constraint((Expression::from(&x1) + Expression::from(&x2)).equals(3.0));
    model.maximize(Expression::from(&x1) + x2.times(3.0));

    let solution = model.solve().unwrap();
    assert_assignment(solution.assignment(), &[0.0, 3.0]);
    assert_close(solution.objective_value().unwrap(), 9.0);
}

#[test]
fn infeasible() {
    let mut model = Model::new("example_04_infeasible");
    let x1 = model.create_variable("x1").unwrap();
    let x2 = model.create_variable("x2").unwrap();
    let xs = [x1, x2];
    model.add_constraint(Expression::from_vectors(&xs, &[2.0, -1.0]).leq(-1.0));
    model.add_constraint(Expression::from_vectors(&xs, &[1.0, 1.0]).equals(3.0));
    model.add_constraint(Expression::from_vectors(&xs, &[1.0, 1.0]).geq(4.0));
    model.maximize(Expression::from_vectors(&xs, &[1.0, 3.0]));

    let solution = model.solve().unwrap();
    assert!(!solution.is_feasible());
    assert_eq!(solution.status(), SolutionStatus::Infeasible);
    assert!(solution.assignment().is_none());
    assert_eq!(solution.to_string(), "There is no solution, the model is infeasible");
}

#[test]
fn unbounded() {
    let mut model = Model::new("example_05_unbounded");
    let x1 = model.create_variable("x1").unwrap();
    let x2 = model.create_variable("x2").unwrap();
    let x3 = model.create_variable("x3").unwrap();
    let xs = [x1.clone(), x2.clone(), x3];
    model.add_constraint(Expression::from_vectors(&xs, &[1.0, 3.0, 2.0]).geq(10.0));
    model.add_constraint(Expression::from_vectors(&xs, &[1.0, 5.0, 1.0]).geq(-7.0));
    model.maximize(Expression::from_vectors(&[x1, x2], &[5.0, 8.0]));

    let solution = model.solve().unwrap();
    assert!(solution.is_feasible());
    assert!(!solution.is_bounded());
    assert_eq!(solution.status(), SolutionStatus::Unbounded);
    assert!(solution.objective_value().is_none());
}

#[test]
fn integer_relaxation_already_integral() {
    let mut model = IntegerModel::new("example_integer");
    let x1 = model.create_variable("x1").unwrap();
    let x2 = model.create_variable("x2").unwrap();
    model.add_constraint(x1.leq(150.0));
    model.add_constraint(x2.leq(250.0));
    model.add_constraint(Expression::from_vectors(&[x1.clone(), x2.clone()], &[2.0, 1.0]).leq(500.0));
    model.maximize(Expression::from_vectors(&[x1.clone(), x2], &[8.0, 5.0]));

    let solution = model.solve(None).unwrap();
    assert_assignment(solution.assignment(), &[125.0, 250.0]);
    assert_eq!(solution.nodes(), 1);
    assert!(solution.is_optimal());
    assert_close(solution.value(&x1).unwrap(), 125.0);
}

#[test]
fn strong_duality() {
    let mut primal = Model::new("example_dual");
    let x0 = primal.create_variable("x0").unwrap();
    let x1 = primal.create_variable("x1").unwrap();
    let x2 = primal.create_variable("x2").unwrap();
    let xs = [x0, x1, x2];
    primal.add_constraint(Expression::from_vectors(&xs, &[4.0, 8.0, -1.0]).leq(5.0));
    primal.add_constraint(Expression::from_vectors(&xs, &[7.0, -2.0, 2.0]).geq(4.0));
    primal.maximize(Expression::from_vectors(&xs, &[3.0, 2.0, -6.0]));

    let dual = primal.dual().unwrap();
    let primal_value = primal.solve().unwrap().objective_value().unwrap();
    let dual_value = dual.solve().unwrap().objective_value().unwrap();
    assert_close(primal_value, dual_value);
}

#[test]
fn cost_sensitivity() {
    let mut model = Model::new("cost_sensitivity");
    let x1 = model.create_variable("x1").unwrap();
    let x2 = model.create_variable("x2").unwrap();
    let x3 = model.create_variable("x3").unwrap();
    let xs = [x1.clone(), x2, x3];
    model.add_constraint(Expression::from_vectors(&xs, &[6.0, 5.0, 8.0]).leq(60.0));
    model.add_constraint(Expression::from_vectors(&xs, &[10.0, 20.0, 10.0]).leq(150.0));
    model.add_constraint(x1.leq(8.0));
    model.maximize(Expression::from_vectors(&xs, &[5.0, 4.5, 6.0]));

    let solution = model.solve().unwrap();
    let results = Analyser::new().analyse(&solution).unwrap();
    let lpkit_solver::AnalysisResult::ObjectiveSensitivity(ranges) = &results[ObjectiveSensitivityAnalyser::NAME];

    let expected = [(4.636, 5.4), (4.167, 6.5), (f64::NEG_INFINITY, 6.571)];
    for (range, (lower, upper)) in ranges.iter().zip(expected) {
        if lower.is_infinite() {
            assert_eq!(range.lower_bound, lower);
        } else {
            assert!((range.lower_bound - lower).abs() < 1e-3);
        }
        assert!((range.upper_bound - upper).abs() < 1e-3);
    }
}
