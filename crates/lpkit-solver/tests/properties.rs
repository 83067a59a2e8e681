//! Property-based tests for standardization, duality and the simplex loop.

use lpkit_model::{Constraint, Expression, Model, ObjectiveKind, Relation};
use lpkit_solver::{Solve, Solver, Optimization};
use proptest::prelude::*;

/// Dimensions and small integer data of a random model
#[derive(Debug, Clone)]
struct Shape {
    matrix: Vec<Vec<f64>>,
    bounds: Vec<f64>,
    costs: Vec<f64>,
    relations: Vec<Relation>,
    minimize: bool,
}

fn relation_strategy() -> impl Strategy<Value = Relation> {
    prop_oneof![Just(Relation::Le), Just(Relation::Ge), Just(Relation::Eq)]
}

fn shape_strategy(coefficients: std::ops::Range<i32>, relation: BoxedStrategy<Relation>) -> impl Strategy<Value = Shape> {
    (1usize..=3, 1usize..=3).prop_flat_map(move |(n, k)| {
        (
            prop::collection::vec(prop::collection::vec(coefficients.clone(), n), k),
            prop::collection::vec(coefficients.clone(), k),
            prop::collection::vec(coefficients.clone(), n),
            prop::collection::vec(relation.clone(), k),
            any::<bool>(),
        )
            .prop_map(|(matrix, bounds, costs, relations, minimize)| Shape {
                matrix: matrix.into_iter().map(|row| row.into_iter().map(f64::from).collect()).collect(),
                bounds: bounds.into_iter().map(f64::from).collect(),
                costs: costs.into_iter().map(f64::from).collect(),
                relations,
                minimize,
            })
    })
}

fn build(shape: &Shape) -> Model {
    let mut model = Model::new("random");
    let xs: Vec<_> = (0..shape.costs.len())
        .map(|j| model.create_variable(format!("x{j}")).unwrap())
        .collect();
    for ((row, &bound), &relation) in shape.matrix.iter().zip(&shape.bounds).zip(&shape.relations) {
        model.add_constraint(Constraint::new(Expression::from_vectors(&xs, row), bound, relation));
    }
    let objective = Expression::from_vectors(&xs, &shape.costs);
    if shape.minimize {
        model.minimize(objective);
    } else {
        model.maximize(objective);
    }
    model
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Standardization leaves only `<=` and `=` rows under a MAX objective,
    /// and normalization makes every row an equality with a non-negative bound.
    #[test]
    fn standard_form_shape(shape in shape_strategy(-9..10, relation_strategy().boxed())) {
        let model = build(&shape);
        let standard = model.translate_to_standard_form();

        prop_assert!(standard.constraints().all(|c| c.relation() != Relation::Ge));
        prop_assert_eq!(standard.objective().unwrap().kind(), ObjectiveKind::Max);
        prop_assert!(model.is_equivalent(&standard));

        let solution = model.solve().unwrap();
        prop_assert!(solution.normal_model().constraints().all(|c| c.relation() == Relation::Eq && c.bound() >= 0.0));
    }

    /// The dual of the dual is the primal.
    #[test]
    fn double_dual(shape in shape_strategy(-9..10, prop_oneof![Just(Relation::Le), Just(Relation::Ge)].boxed())) {
        let primal = build(&shape);
        let double_dual = primal.dual().unwrap().dual().unwrap();
        prop_assert!(primal.is_equivalent(&double_dual));
    }

    /// Positive data makes both the primal and its dual feasible and bounded,
    /// so their optima coincide.
    #[test]
    fn strong_duality(shape in shape_strategy(1..10, Just(Relation::Le).boxed())) {
        let mut primal = build(&shape);
        primal.maximize(primal.objective().unwrap().expression().clone());

        let primal_solution = primal.solve().unwrap();
        let dual_solution = primal.dual().unwrap().solve().unwrap();
        let primal_value = primal_solution.objective_value().unwrap();
        let dual_value = dual_solution.objective_value().unwrap();
        prop_assert!((primal_value - dual_value).abs() < 1e-6, "primal {} != dual {}", primal_value, dual_value);
    }

    /// Optimizing an optimal tableau again performs no pivot.
    #[test]
    fn optimize_is_idempotent(shape in shape_strategy(1..10, Just(Relation::Le).boxed())) {
        let solver = Solver::new();
        let solution = solver.solve(&build(&shape)).unwrap();
        prop_assume!(solution.has_assignment());

        let mut tableau = solution.tableau().clone();
        prop_assert_eq!(solver.optimize(&mut tableau), Optimization::Optimal { pivots: 0 });
        prop_assert_eq!(tableau.extract_assignment(), solution.tableau().extract_assignment());
    }
}
