//! Property tests over whole clustering requests.

use std::collections::HashSet;

use proptest::prelude::*;
use proptest::test_runner::Config as ProptestConfig;
use strata_core::{ClusterRequest, ExecutionStrategy, Metric, Point, PointId, Strata};
use strata_test_support::ci::property_test_profile::ProptestRunProfile;
use test_strategy::Arbitrary;

/// Random 2-D cloud with parameters valid for its size.
#[derive(Clone, Debug, Arbitrary)]
struct Cloud {
    #[strategy(2_usize..=32)]
    count: usize,
    #[strategy(proptest::collection::vec(proptest::collection::vec(-8_i8..=8, 2), #count))]
    coords: Vec<Vec<i8>>,
    #[strategy(2_usize..=#count)]
    min_cluster_size: usize,
    #[strategy(1_usize..#count)]
    min_samples: usize,
    metric: CloudMetric,
}

#[derive(Clone, Copy, Debug, Arbitrary)]
enum CloudMetric {
    Euclidean,
    Manhattan,
    Cosine,
}

impl Cloud {
    fn request(&self) -> ClusterRequest {
        let points = self
            .coords
            .iter()
            .enumerate()
            .map(|(index, coords)| {
                let values = coords.iter().map(|&c| f32::from(c) * 0.5).collect();
                Point::vector(i64::try_from(index).expect("small index"), values)
            })
            .collect();
        let metric = match self.metric {
            CloudMetric::Euclidean => Metric::Euclidean,
            CloudMetric::Manhattan => Metric::Manhattan,
            CloudMetric::Cosine => Metric::Cosine,
        };
        ClusterRequest::new(points, self.min_cluster_size)
            .with_min_samples(self.min_samples)
            .with_metric(metric)
    }
}

/// Points along a line whose gaps vary by less than a factor of two,
/// followed by one point far past the end.
#[derive(Clone, Debug, Arbitrary)]
struct UnevenLine {
    #[strategy(8_usize..40)]
    count: usize,
    #[strategy(proptest::collection::vec(0.1_f32..0.19, #count))]
    gaps: Vec<f32>,
    #[strategy(50.0_f32..500.0)]
    far: f32,
    #[strategy(2_usize..=#count / 2)]
    min_cluster_size: usize,
}

impl UnevenLine {
    fn request(&self) -> ClusterRequest {
        let mut position = 0.0_f32;
        let mut coords: Vec<f32> = self
            .gaps
            .iter()
            .map(|gap| {
                position += gap;
                position
            })
            .collect();
        coords.push(position + self.far);
        let points = coords
            .into_iter()
            .enumerate()
            .map(|(index, x)| Point::vector(i64::try_from(index).expect("small index"), vec![x]))
            .collect();
        ClusterRequest::new(points, self.min_cluster_size).with_min_samples(2)
    }
}

fn config() -> ProptestConfig {
    let profile = ProptestRunProfile::load(64, false);
    ProptestConfig {
        cases: profile.cases(),
        fork: profile.fork(),
        ..ProptestConfig::default()
    }
}

proptest! {
    #![proptest_config(config())]

    #[test]
    fn every_point_is_reported_exactly_once(cloud: Cloud) {
        let partition = Strata::cluster(&cloud.request())
            .map_err(|e| TestCaseError::fail(format!("cluster failed: {e}")))?;

        prop_assert_eq!(partition.len(), cloud.count);
        let mut seen = HashSet::new();
        for (id, _) in partition.memberships() {
            prop_assert!(seen.insert(id.clone()), "{} reported twice", id);
        }
        let expected: HashSet<PointId> = (0..cloud.count)
            .map(|index| PointId::Int(i64::try_from(index).expect("small index")))
            .collect();
        prop_assert_eq!(seen, expected);
        prop_assert!(partition.clusters().iter().all(|members| !members.is_empty()));
    }

    #[test]
    fn clustering_is_deterministic(cloud: Cloud) {
        let request = cloud.request();
        let first = Strata::cluster_with(&request, ExecutionStrategy::Sequential)
            .map_err(|e| TestCaseError::fail(format!("first run failed: {e}")))?;
        let second = Strata::cluster_with(&request, ExecutionStrategy::Sequential)
            .map_err(|e| TestCaseError::fail(format!("second run failed: {e}")))?;
        let auto = Strata::cluster(&request)
            .map_err(|e| TestCaseError::fail(format!("auto run failed: {e}")))?;

        prop_assert_eq!(&first, &second);
        prop_assert_eq!(&first, &auto);
    }

    #[test]
    fn clusters_list_members_in_input_order(cloud: Cloud) {
        let partition = Strata::cluster(&cloud.request())
            .map_err(|e| TestCaseError::fail(format!("cluster failed: {e}")))?;

        let position = |id: &PointId| match id {
            PointId::Int(value) => *value,
            PointId::Str(_) => i64::MAX,
        };
        for members in partition.clusters() {
            prop_assert!(members.windows(2).all(|pair| position(&pair[0]) < position(&pair[1])));
        }
        prop_assert!(
            partition
                .outliers()
                .windows(2)
                .all(|pair| position(&pair[0]) < position(&pair[1]))
        );
        let firsts: Vec<i64> = partition
            .clusters()
            .iter()
            .filter_map(|members| members.first().map(position))
            .collect();
        prop_assert!(firsts.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn far_point_is_the_only_outlier_of_an_uneven_line(line: UnevenLine) {
        let partition = Strata::cluster(&line.request())
            .map_err(|e| TestCaseError::fail(format!("cluster failed: {e}")))?;

        let members: Vec<PointId> = (0..line.count)
            .map(|index| PointId::Int(i64::try_from(index).expect("small index")))
            .collect();
        let far = PointId::Int(i64::try_from(line.count).expect("small index"));
        let expected_clusters = [members];
        let expected_outliers = [far];
        prop_assert_eq!(partition.clusters(), expected_clusters.as_slice());
        prop_assert_eq!(partition.outliers(), expected_outliers.as_slice());
    }

    #[test]
    fn raising_min_cluster_size_never_adds_clusters(cloud: Cloud) {
        let mut previous = usize::MAX;
        for size in 2..=cloud.count {
            let mut request = cloud.request();
            request.min_cluster_size = size;
            let clusters = Strata::cluster(&request)
                .map_err(|e| TestCaseError::fail(format!("cluster failed at {size}: {e}")))?
                .cluster_count();
            prop_assert!(
                clusters <= previous,
                "min_cluster_size {} gave {} clusters after {}",
                size,
                clusters,
                previous
            );
            previous = clusters;
        }
    }
}
