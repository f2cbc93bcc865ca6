//! Property-based tests for dense Prim's MST.
//!
//! Points are generated under several coordinate distributions, core
//! distances are computed for a random `min_samples`, and the resulting tree
//! is checked against a sequential Kruskal oracle, for structural
//! invariants, and for run-to-run determinism.

mod oracle;

use proptest::prelude::*;
use proptest::test_runner::{TestCaseError, TestCaseResult};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use test_strategy::Arbitrary;

use crate::{
    CoreDistances, VectorMetric, VectorSource, reachability::MutualReachability,
    test_utils::{nz, suite_proptest_config},
};

use super::prim_mst;
use oracle::sequential_kruskal;

/// Coordinate distribution for generated point clouds.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Arbitrary)]
enum PointDistribution {
    /// Continuous coordinates; ties are rare.
    Continuous,
    /// Small integer grid; many equal weights stress tie-breaking.
    Lattice,
    /// Heavy duplication, many zero-distance pairs.
    Duplicated,
}

#[derive(Clone, Debug)]
struct PointFixture {
    points: Vec<Vec<f32>>,
    min_samples: usize,
    distribution: PointDistribution,
}

fn generate_fixture(distribution: PointDistribution, rng: &mut SmallRng) -> PointFixture {
    let count = rng.gen_range(2..=40);
    let points = (0..count)
        .map(|_| match distribution {
            PointDistribution::Continuous => {
                vec![rng.gen_range(-50.0_f32..50.0), rng.gen_range(-50.0_f32..50.0)]
            }
            PointDistribution::Lattice => {
                vec![f32::from(rng.gen_range(0_u8..4)), f32::from(rng.gen_range(0_u8..4))]
            }
            PointDistribution::Duplicated => vec![f32::from(rng.gen_range(0_u8..2)), 0.0],
        })
        .collect();
    let min_samples = rng.gen_range(1..count);
    PointFixture {
        points,
        min_samples,
        distribution,
    }
}

fn fixture_strategy() -> impl Strategy<Value = PointFixture> {
    (any::<PointDistribution>(), any::<u64>()).prop_map(|(distribution, seed)| {
        let mut rng = SmallRng::seed_from_u64(seed);
        generate_fixture(distribution, &mut rng)
    })
}

fn run_prim_properties(fixture: &PointFixture) -> TestCaseResult {
    let source = VectorSource::try_new("pbt", fixture.points.clone(), VectorMetric::Euclidean)
        .map_err(|e| TestCaseError::fail(format!("invalid fixture: {e}")))?;
    let core = CoreDistances::compute(&source, nz(fixture.min_samples), false)
        .map_err(|e| TestCaseError::fail(format!("core distances failed: {e}")))?;
    let graph = MutualReachability::new(&source, &core);

    let tree = prim_mst(&graph).map_err(|e| TestCaseError::fail(format!("prim failed: {e}")))?;
    let oracle = sequential_kruskal(&graph);

    prop_assert_eq!(tree.edges().len(), oracle.edge_count);
    prop_assert!(
        (tree.total_weight() - oracle.total_weight).abs() <= 1e-4 * oracle.total_weight.max(1.0),
        "total weight mismatch: prim={}, oracle={} ({:?}, n={})",
        tree.total_weight(),
        oracle.total_weight,
        fixture.distribution,
        fixture.points.len(),
    );
    prop_assert!(tree.edges().windows(2).all(|pair| pair[0] <= pair[1]));

    let again = prim_mst(&graph).map_err(|e| TestCaseError::fail(format!("prim failed: {e}")))?;
    prop_assert_eq!(tree, again);
    Ok(())
}

proptest! {
    #![proptest_config(suite_proptest_config(128))]

    #[test]
    fn prim_matches_kruskal_oracle(fixture in fixture_strategy()) {
        run_prim_properties(&fixture)?;
    }
}

#[rstest::rstest]
#[case::continuous_42(PointDistribution::Continuous, 42)]
#[case::continuous_999(PointDistribution::Continuous, 999)]
#[case::lattice_42(PointDistribution::Lattice, 42)]
#[case::lattice_7777(PointDistribution::Lattice, 7777)]
#[case::duplicated_42(PointDistribution::Duplicated, 42)]
#[case::duplicated_999(PointDistribution::Duplicated, 999)]
fn prim_matches_kruskal_oracle_rstest(#[case] distribution: PointDistribution, #[case] seed: u64) {
    let mut rng = SmallRng::seed_from_u64(seed);
    let fixture = generate_fixture(distribution, &mut rng);
    run_prim_properties(&fixture).expect("prim must agree with the oracle");
}
