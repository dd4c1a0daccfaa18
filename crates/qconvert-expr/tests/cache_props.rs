//! Property tests for the compile cache.
//!
//! A cached compile must be indistinguishable from a cold one: the same
//! expression text evaluated under different bindings gives the same
//! values whether or not the cache already holds it.

use proptest::prelude::*;
use qconvert_expr::{Bindings, Evaluator};

const CELLS: &[&str] = &[
    "cos(theta / 2)",
    "-exp(i * lambda) * sin(theta / 2)",
    "exp(i * phi) * sin(theta / 2)",
    "exp(i * lambda + i * phi) * cos(theta / 2)",
    "1 / sqrt(2)",
    "-2i * sin(phi) ^ 2",
];

fn bindings(theta: f64, phi: f64, lambda: f64) -> Bindings {
    Bindings::new()
        .with("theta", theta)
        .with("phi", phi)
        .with("lambda", lambda)
}

proptest! {
    #[test]
    fn cached_evaluation_matches_cold_evaluation(
        theta in -10.0_f64..10.0,
        phi in -10.0_f64..10.0,
        lambda in -10.0_f64..10.0,
        cell in 0..CELLS.len(),
    ) {
        let source = CELLS[cell];
        let params = bindings(theta, phi, lambda);

        let warm = Evaluator::new();
        warm.evaluate(source, &bindings(0.0, 0.0, 0.0)).unwrap();
        let warm_value = warm.evaluate(source, &params).unwrap();

        let cold_value = Evaluator::new().evaluate(source, &params).unwrap();

        prop_assert_eq!(warm_value, cold_value);
        let stats = warm.stats();
        prop_assert_eq!(stats.misses, 1);
        prop_assert_eq!(stats.hits, 1);
    }

    #[test]
    fn cache_size_is_bounded_by_distinct_texts(order in prop::collection::vec(0..CELLS.len(), 1..40)) {
        let evaluator = Evaluator::new();
        let params = bindings(0.1, 0.2, 0.3);
        for &k in &order {
            evaluator.evaluate(CELLS[k], &params).unwrap();
        }
        let mut distinct = order.clone();
        distinct.sort_unstable();
        distinct.dedup();
        prop_assert_eq!(evaluator.stats().entries, distinct.len());
    }
}
