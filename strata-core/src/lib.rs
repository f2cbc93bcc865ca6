//! Strata core library.
//!
//! Density-based hierarchical clustering in the HDBSCAN family. A request
//! flows through these stages:
//!
//! 1. a [`DataSource`] answers pairwise distances ([`VectorSource`],
//!    [`DistanceMatrix`], [`RowSelection`]);
//! 2. [`CoreDistances`] records each point's `min_samples`-th neighbour
//!    distance;
//! 3. [`prim_mst`] spans the implicit [`MutualReachability`] graph;
//! 4. [`CondensedTree`] condenses the single-linkage hierarchy under
//!    `min_cluster_size`;
//! 5. stability selection yields a [`ClusteringResult`], grouped by caller
//!    ids into a [`ClusterPartition`].
//!
//! [`Strata::run`] drives stages 2 to 5 over any source and
//! [`Strata::cluster`] accepts a whole [`ClusterRequest`].
#![cfg_attr(docsrs, feature(doc_cfg))]

mod builder;
mod core_distance;
mod datasource;
mod distance;
mod error;
mod hierarchy;
mod mst;
mod partition;
mod provider;
pub mod quality;
mod reachability;
mod request;
mod result;
mod strata;

#[cfg(test)]
pub(crate) mod test_utils;

pub use crate::{
    builder::{ExecutionStrategy, StrataBuilder},
    core_distance::CoreDistances,
    datasource::DataSource,
    distance::{
        CosineNorms, Distance, DistanceError, Norm, Vector, VectorKind, cosine_distance,
        euclidean_distance, manhattan_distance,
    },
    error::{
        DataSourceError, DataSourceErrorCode, ErrorCategory, Result, StrataError, StrataErrorCode,
    },
    hierarchy::{
        CondensedNode, CondensedTree, Departure, HierarchyError, HierarchyErrorCode, LAMBDA_CAP,
        ROOT_OUTLIER_RATIO, extract_clusters,
    },
    mst::{MstEdge, MstError, MstErrorCode, SpanningTree, prim_mst},
    partition::ClusterPartition,
    provider::{ABS_TOL, DistanceMatrix, REL_TOL, RowSelection, VectorMetric, VectorSource},
    quality::{
        ClusteringQualityError, ClusteringQualityScore, adjusted_rand_index,
        clustering_quality_score, compare_partitions, normalized_mutual_information,
    },
    reachability::MutualReachability,
    request::{ClusterRequest, FeatureKind, Features, Metric, Point, PointId},
    result::{ClusterId, ClusteringResult, Label, NonContiguousClusterIds},
    strata::Strata,
};
