//! Request types accepted by [`Strata::cluster`](crate::Strata::cluster).
//!
//! With the `serde` feature the types read and write the camelCase payload
//! used by clustering services:
//!
//! ```json
//! {
//!   "points": [{ "id": "a", "vector": [0.0, 1.0] }, { "id": 7, "vector": [2.0, 1.0] }],
//!   "minClusterSize": 5,
//!   "minSamples": 3,
//!   "distanceMetric": "euclidean"
//! }
//! ```

use std::fmt;

/// Caller-defined point identifier; unique within one request.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum PointId {
    /// Signed integer identifier.
    Int(i64),
    /// String identifier.
    Str(String),
}

impl fmt::Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{value}"),
            Self::Str(value) => f.write_str(value),
        }
    }
}

impl From<i64> for PointId {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for PointId {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<String> for PointId {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

/// The representation carried by a point.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Features {
    /// Dense feature vector.
    Vector(Vec<f32>),
    /// Row of the request's distance matrix.
    Row(usize),
}

impl Features {
    /// Returns which representation this is.
    #[must_use]
    pub const fn kind(&self) -> FeatureKind {
        match self {
            Self::Vector(_) => FeatureKind::Vector,
            Self::Row(_) => FeatureKind::Row,
        }
    }
}

/// Discriminant of [`Features`], used in error reports.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum FeatureKind {
    /// A dense vector.
    Vector,
    /// A matrix row index.
    Row,
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Vector => "vector",
            Self::Row => "row",
        })
    }
}

/// A single point to cluster.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    /// Identifier reported back in the partition.
    pub id: PointId,
    /// Features of the point.
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub features: Features,
}

impl Point {
    /// Creates a point carrying a feature vector.
    #[must_use]
    pub fn vector(id: impl Into<PointId>, values: Vec<f32>) -> Self {
        Self {
            id: id.into(),
            features: Features::Vector(values),
        }
    }

    /// Creates a point referring to a matrix row.
    #[must_use]
    pub fn row(id: impl Into<PointId>, row: usize) -> Self {
        Self {
            id: id.into(),
            features: Features::Row(row),
        }
    }
}

/// Dissimilarity used between points.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Metric {
    /// Straight-line distance between vectors.
    #[default]
    Euclidean,
    /// Sum of absolute component differences.
    Manhattan,
    /// One minus cosine similarity, precomputed as a matrix.
    Cosine,
    /// Distances supplied by the caller as a matrix.
    Precomputed,
}

impl Metric {
    /// Returns the feature kind points must carry under this metric.
    #[must_use]
    pub const fn feature_kind(self) -> FeatureKind {
        match self {
            Self::Precomputed => FeatureKind::Row,
            Self::Euclidean | Self::Manhattan | Self::Cosine => FeatureKind::Vector,
        }
    }

    /// Returns the lowercase name of the metric.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Euclidean => "euclidean",
            Self::Manhattan => "manhattan",
            Self::Cosine => "cosine",
            Self::Precomputed => "precomputed",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A complete clustering request.
///
/// # Examples
/// ```
/// use strata_core::{ClusterRequest, Metric, Point};
///
/// let request = ClusterRequest::new(
///     vec![Point::vector("a", vec![0.0]), Point::vector("b", vec![1.0])],
///     2,
/// )
/// .with_min_samples(1)
/// .with_metric(Metric::Manhattan);
/// assert_eq!(request.effective_min_samples(), 1);
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ClusterRequest {
    /// Points to cluster, in input order.
    pub points: Vec<Point>,
    /// Smallest group reported as a cluster; at least two.
    #[cfg_attr(feature = "serde", serde(alias = "minPoints"))]
    pub min_cluster_size: usize,
    /// Neighbour rank of the core distance; defaults to `min_cluster_size`.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub min_samples: Option<usize>,
    /// Dissimilarity between points.
    #[cfg_attr(feature = "serde", serde(default, rename = "distanceMetric"))]
    pub metric: Metric,
    /// Square distance matrix for [`Metric::Precomputed`].
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub distance_matrix: Option<Vec<Vec<f32>>>,
}

impl ClusterRequest {
    /// Creates a Euclidean request without a matrix.
    #[must_use]
    pub fn new(points: Vec<Point>, min_cluster_size: usize) -> Self {
        Self {
            points,
            min_cluster_size,
            min_samples: None,
            metric: Metric::default(),
            distance_matrix: None,
        }
    }

    /// Sets `min_samples`.
    #[must_use]
    pub fn with_min_samples(mut self, min_samples: usize) -> Self {
        self.min_samples = Some(min_samples);
        self
    }

    /// Sets the metric.
    #[must_use]
    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }

    /// Attaches a distance matrix for [`Metric::Precomputed`].
    #[must_use]
    pub fn with_distance_matrix(mut self, matrix: Vec<Vec<f32>>) -> Self {
        self.distance_matrix = Some(matrix);
        self
    }

    /// Returns `min_samples`, falling back to `min_cluster_size`.
    #[must_use]
    pub fn effective_min_samples(&self) -> usize {
        self.min_samples.unwrap_or(self.min_cluster_size)
    }
}
