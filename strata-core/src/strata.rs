//! Core clustering orchestration for the Strata library.
//!
//! Provides the [`Strata`] entry point that runs the stages in order:
//! core distances, mutual reachability spanning tree, condensed hierarchy and
//! stability extraction. [`Strata::cluster`] additionally turns a
//! [`ClusterRequest`] into a data source and groups the labels by point id.

use std::{collections::HashMap, num::NonZeroUsize, sync::Arc};

use tracing::{info, instrument, warn};

use crate::{
    Result,
    builder::{ExecutionStrategy, StrataBuilder},
    core_distance::CoreDistances,
    datasource::DataSource,
    error::StrataError,
    hierarchy::{HierarchyError, extract_clusters},
    mst::{MstError, prim_mst},
    partition::ClusterPartition,
    provider::{DistanceMatrix, RowSelection, VectorMetric, VectorSource},
    reachability::MutualReachability,
    request::{ClusterRequest, Features, Metric, PointId},
    result::ClusteringResult,
};

/// Name given to data sources built from a [`ClusterRequest`].
const REQUEST_SOURCE: &str = "request";

/// Entry point for running the clustering pipeline.
///
/// Time is quadratic in the number of points: every pair is measured once
/// while estimating core distances and once while growing the spanning tree.
/// Memory stays linear for vector sources.
///
/// # Examples
/// ```
/// use strata_core::{DataSource, DataSourceError, StrataBuilder};
///
/// struct Line(Vec<f32>);
///
/// impl DataSource for Line {
///     fn len(&self) -> usize { self.0.len() }
///     fn name(&self) -> &str { "line" }
///     fn distance(&self, i: usize, j: usize) -> Result<f32, DataSourceError> {
///         let a = self.0.get(i).ok_or(DataSourceError::OutOfBounds { index: i })?;
///         let b = self.0.get(j).ok_or(DataSourceError::OutOfBounds { index: j })?;
///         Ok((a - b).abs())
///     }
/// }
///
/// let strata = StrataBuilder::new()
///     .with_min_cluster_size(3)
///     .with_min_samples(2)
///     .build()?;
/// let result = strata.run(&Line(vec![0.0, 0.1, 0.2, 10.0, 10.1, 10.2]))?;
/// assert_eq!(result.labels().len(), 6);
/// assert_eq!(result.cluster_count(), 2);
/// # Ok::<(), strata_core::StrataError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Strata {
    min_cluster_size: NonZeroUsize,
    min_samples: NonZeroUsize,
    execution_strategy: ExecutionStrategy,
}

impl Strata {
    pub(crate) fn new(
        min_cluster_size: NonZeroUsize,
        min_samples: NonZeroUsize,
        execution_strategy: ExecutionStrategy,
    ) -> Self {
        Self {
            min_cluster_size,
            min_samples,
            execution_strategy,
        }
    }

    /// Returns the minimum cluster size configured for this instance.
    #[must_use]
    #[rustfmt::skip]
    pub fn min_cluster_size(&self) -> NonZeroUsize { self.min_cluster_size }

    /// Returns the neighbour rank used for core distances.
    #[must_use]
    #[rustfmt::skip]
    pub fn min_samples(&self) -> NonZeroUsize { self.min_samples }

    /// Returns the execution strategy that will be used when running.
    #[must_use]
    #[rustfmt::skip]
    pub fn execution_strategy(&self) -> ExecutionStrategy { self.execution_strategy }

    /// Executes the clustering pipeline against the provided [`DataSource`].
    ///
    /// Input whose spanning tree has only zero-weight edges (every point
    /// coincides) is reported as a single cluster with a warning.
    ///
    /// # Errors
    /// Returns [`StrataError::EmptySource`] when the source is empty,
    /// [`StrataError::InsufficientItems`] when it holds fewer than
    /// `min_cluster_size` items, [`StrataError::MinSamplesTooLarge`] when
    /// `min_samples` leaves no neighbour, [`StrataError::BackendUnavailable`]
    /// when the strategy needs a backend that is not compiled in and
    /// [`StrataError::DataSource`] when a distance lookup fails. Stage defects
    /// surface as [`StrataError::MstFailure`],
    /// [`StrataError::HierarchyFailure`] or [`StrataError::LabelCoverage`].
    #[instrument(
        name = "core.run",
        err,
        skip(self, source),
        fields(
            data_source = %source.name(),
            items = source.len(),
            min_cluster_size = %self.min_cluster_size,
            min_samples = %self.min_samples,
            strategy = ?self.execution_strategy,
        ),
    )]
    pub fn run<D: DataSource + Sync>(&self, source: &D) -> Result<ClusteringResult> {
        let items = source.len();
        if items == 0 {
            warn!(
                data_source = source.name(),
                "data source is empty, returning error"
            );
            return Err(StrataError::EmptySource {
                data_source: Arc::from(source.name()),
            });
        }
        if items < self.min_cluster_size.get() {
            return Err(StrataError::InsufficientItems {
                data_source: Arc::from(source.name()),
                items,
                min_cluster_size: self.min_cluster_size,
            });
        }
        let parallel = self.execution_strategy.resolve()?;
        telemetry::record_run(items);

        let clock = telemetry::StageClock::start();
        let core = CoreDistances::compute(source, self.min_samples, parallel)?;
        clock.finish("core_distances");

        let clock = telemetry::StageClock::start();
        let tree = prim_mst(&MutualReachability::new(source, &core))
            .map_err(|error| mst_failure(source.name(), error))?;
        clock.finish("mst");

        let result = if tree.is_degenerate() {
            warn!(
                code = "NUMERIC_DEGENERATE",
                data_source = source.name(),
                items,
                "every mutual reachability distance is zero; reporting a single cluster"
            );
            ClusteringResult::single_cluster(items)
        } else {
            let clock = telemetry::StageClock::start();
            let result =
                extract_clusters(&tree, self.min_cluster_size).map_err(hierarchy_failure)?;
            clock.finish("hierarchy");
            result
        };

        if result.labels().len() != items {
            return Err(StrataError::LabelCoverage {
                expected: items,
                found: result.labels().len(),
            });
        }
        telemetry::record_result(&result);
        info!(
            clusters = result.cluster_count(),
            noise = result.noise_count(),
            "clustering completed"
        );
        Ok(result)
    }

    /// Clusters a request with [`ExecutionStrategy::Auto`].
    ///
    /// # Errors
    /// See [`Strata::cluster_with`].
    ///
    /// # Examples
    /// ```
    /// use strata_core::{ClusterRequest, Point, PointId, Strata};
    ///
    /// let points = [0.0, 0.1, 0.2, 9.0, 9.1, 9.2]
    ///     .into_iter()
    ///     .enumerate()
    ///     .map(|(i, x)| Point::vector(i as i64, vec![x, 0.0]))
    ///     .collect();
    /// let partition = Strata::cluster(&ClusterRequest::new(points, 3).with_min_samples(2))?;
    /// assert_eq!(partition.cluster_count(), 2);
    /// assert_eq!(partition.clusters()[0], [PointId::Int(0), PointId::Int(1), PointId::Int(2)]);
    /// assert!(partition.outliers().is_empty());
    /// # Ok::<(), strata_core::StrataError>(())
    /// ```
    pub fn cluster(request: &ClusterRequest) -> Result<ClusterPartition<PointId>> {
        Self::cluster_with(request, ExecutionStrategy::Auto)
    }

    /// Validates a request, builds its distance provider and clusters it.
    ///
    /// # Errors
    /// Returns [`StrataError::InvalidMinClusterSize`] or
    /// [`StrataError::InvalidMinSamples`] for bad parameters,
    /// [`StrataError::EmptySource`] when there are no points,
    /// [`StrataError::DuplicatePointId`] when ids repeat,
    /// [`StrataError::MissingDistanceMatrix`] or
    /// [`StrataError::UnexpectedDistanceMatrix`] when the matrix does not fit
    /// the metric, [`StrataError::FeatureMismatch`] when a point carries the
    /// wrong kind of features, [`StrataError::DataSource`] when vectors or the
    /// matrix fail validation, and any error of [`Strata::run`].
    #[instrument(
        name = "core.cluster",
        err,
        skip(request),
        fields(
            points = request.points.len(),
            metric = %request.metric,
            min_cluster_size = request.min_cluster_size,
        ),
    )]
    pub fn cluster_with(
        request: &ClusterRequest,
        strategy: ExecutionStrategy,
    ) -> Result<ClusterPartition<PointId>> {
        let mut builder = StrataBuilder::new()
            .with_min_cluster_size(request.min_cluster_size)
            .with_execution_strategy(strategy);
        if let Some(min_samples) = request.min_samples {
            builder = builder.with_min_samples(min_samples);
        }
        let strata = builder.build()?;

        if request.points.is_empty() {
            warn!("request contains no points, returning error");
            return Err(StrataError::EmptySource {
                data_source: Arc::from(REQUEST_SOURCE),
            });
        }
        check_unique_ids(request)?;
        check_features(request)?;

        let result = match request.metric {
            Metric::Euclidean => strata.run(&vector_source(request, VectorMetric::Euclidean)?),
            Metric::Manhattan => strata.run(&vector_source(request, VectorMetric::Manhattan)?),
            Metric::Cosine => {
                let matrix = DistanceMatrix::from_cosine_with(
                    REQUEST_SOURCE,
                    request_vectors(request),
                    strategy.resolve()?,
                )
                .map_err(wrap_request_error)?;
                strata.run(&matrix)
            }
            Metric::Precomputed => {
                let rows = request
                    .distance_matrix
                    .clone()
                    .ok_or(StrataError::MissingDistanceMatrix)?;
                let matrix =
                    DistanceMatrix::try_new(REQUEST_SOURCE, rows).map_err(wrap_request_error)?;
                let selection = RowSelection::try_new(&matrix, request_rows(request))
                    .map_err(wrap_request_error)?;
                strata.run(&selection)
            }
        }?;

        let ids = request.points.iter().map(|point| point.id.clone()).collect();
        ClusterPartition::from_labels(ids, &result)
    }
}

fn check_unique_ids(request: &ClusterRequest) -> Result<()> {
    let mut seen: HashMap<&PointId, usize> = HashMap::with_capacity(request.points.len());
    for (position, point) in request.points.iter().enumerate() {
        if let Some(&first) = seen.get(&point.id) {
            return Err(StrataError::DuplicatePointId {
                id: Arc::from(point.id.to_string()),
                first,
                second: position,
            });
        }
        seen.insert(&point.id, position);
    }
    Ok(())
}

fn check_features(request: &ClusterRequest) -> Result<()> {
    match (request.metric, request.distance_matrix.is_some()) {
        (Metric::Precomputed, false) => return Err(StrataError::MissingDistanceMatrix),
        (metric @ (Metric::Euclidean | Metric::Manhattan | Metric::Cosine), true) => {
            return Err(StrataError::UnexpectedDistanceMatrix { metric });
        }
        _ => {}
    }

    let expected = request.metric.feature_kind();
    if let Some((index, point)) = request
        .points
        .iter()
        .enumerate()
        .find(|(_, point)| point.features.kind() != expected)
    {
        return Err(StrataError::FeatureMismatch {
            index,
            expected,
            found: point.features.kind(),
        });
    }
    Ok(())
}

fn request_vectors(request: &ClusterRequest) -> Vec<Vec<f32>> {
    request
        .points
        .iter()
        .filter_map(|point| match &point.features {
            Features::Vector(values) => Some(values.clone()),
            Features::Row(_) => None,
        })
        .collect()
}

fn request_rows(request: &ClusterRequest) -> Vec<usize> {
    request
        .points
        .iter()
        .filter_map(|point| match point.features {
            Features::Row(row) => Some(row),
            Features::Vector(_) => None,
        })
        .collect()
}

fn vector_source(request: &ClusterRequest, metric: VectorMetric) -> Result<VectorSource> {
    VectorSource::try_new(REQUEST_SOURCE, request_vectors(request), metric)
        .map_err(wrap_request_error)
}

fn wrap_request_error(error: crate::error::DataSourceError) -> StrataError {
    StrataError::DataSource {
        data_source: Arc::from(REQUEST_SOURCE),
        error,
    }
}

fn mst_failure(data_source: &str, error: MstError) -> StrataError {
    match error {
        MstError::DataSource(error) => StrataError::DataSource {
            data_source: Arc::from(data_source),
            error,
        },
        other => StrataError::MstFailure {
            code: Arc::from(other.code().as_str()),
            message: Arc::from(other.to_string()),
        },
    }
}

fn hierarchy_failure(error: HierarchyError) -> StrataError {
    StrataError::HierarchyFailure {
        code: Arc::from(error.code().as_str()),
        message: Arc::from(error.to_string()),
    }
}

mod telemetry {
    //! Run counters and stage timings, recorded only with the `metrics`
    //! feature.

    use crate::result::ClusteringResult;

    #[cfg(feature = "metrics")]
    pub(super) struct StageClock(std::time::Instant);

    #[cfg(feature = "metrics")]
    impl StageClock {
        pub(super) fn start() -> Self {
            Self(std::time::Instant::now())
        }

        pub(super) fn finish(self, stage: &'static str) {
            metrics::histogram!("strata_stage_seconds", "stage" => stage)
                .record(self.0.elapsed().as_secs_f64());
        }
    }

    #[cfg(feature = "metrics")]
    pub(super) fn record_run(items: usize) {
        metrics::counter!("strata_runs_total").increment(1);
        metrics::counter!("strata_points_clustered_total").increment(items as u64);
    }

    #[cfg(feature = "metrics")]
    pub(super) fn record_result(result: &ClusteringResult) {
        metrics::counter!("strata_noise_points_total").increment(result.noise_count() as u64);
    }

    #[cfg(not(feature = "metrics"))]
    pub(super) struct StageClock;

    #[cfg(not(feature = "metrics"))]
    impl StageClock {
        pub(super) fn start() -> Self {
            Self
        }

        pub(super) fn finish(self, _stage: &'static str) {}
    }

    #[cfg(not(feature = "metrics"))]
    pub(super) fn record_run(_items: usize) {}

    #[cfg(not(feature = "metrics"))]
    pub(super) fn record_result(_result: &ClusteringResult) {}
}
