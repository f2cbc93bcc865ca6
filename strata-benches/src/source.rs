//! Seeded synthetic data for benchmarks.
//!
//! Points are drawn from isotropic Gaussian blobs whose centroids sit evenly
//! on a circle in the first two dimensions. Generation is deterministic for a
//! given [`SyntheticConfig`], so repeated runs measure identical inputs.

use std::f32::consts::PI;

use rand::{Rng, SeedableRng, rngs::SmallRng};
use strata_core::{DataSourceError, VectorMetric, VectorSource};

/// Errors that may occur while generating benchmark data.
#[derive(Debug, thiserror::Error)]
pub enum SyntheticError {
    /// The requested point count was zero.
    #[error("point count must be greater than zero")]
    ZeroPoints,
    /// The requested dimension count was zero.
    #[error("dimension count must be greater than zero")]
    ZeroDimensions,
    /// The requested cluster count was zero.
    #[error("cluster count must be greater than zero")]
    ZeroClusters,
    /// The configured cluster count exceeded the available points.
    #[error("cluster count ({cluster_count}) must not exceed point count ({point_count})")]
    ClusterCountExceedsPointCount {
        /// Number of clusters requested.
        cluster_count: usize,
        /// Number of points requested.
        point_count: usize,
    },
    /// A floating-point generator parameter was invalid.
    #[error("invalid floating-point parameter `{parameter}`")]
    InvalidFloatParameter {
        /// Name of the invalid parameter.
        parameter: &'static str,
    },
    /// The generated rows were rejected by the vector source.
    #[error("generated rows were rejected: {0}")]
    Source(#[from] DataSourceError),
}

/// Configuration for Gaussian blob data.
#[derive(Clone, Debug)]
pub struct SyntheticConfig {
    /// Number of points to generate.
    pub point_count: usize,
    /// Dimensionality of each vector.
    pub dimensions: usize,
    /// Number of Gaussian blobs.
    pub cluster_count: usize,
    /// Radius of the circle carrying the blob centroids.
    pub separation: f32,
    /// Standard deviation of every blob along every axis.
    pub spread: f32,
    /// RNG seed for reproducibility.
    pub seed: u64,
}

impl SyntheticConfig {
    /// Well-separated blobs suitable for timing the whole pipeline.
    #[must_use]
    pub const fn blobs(point_count: usize, dimensions: usize, seed: u64) -> Self {
        Self {
            point_count,
            dimensions,
            cluster_count: 8,
            separation: 40.0,
            spread: 1.0,
            seed,
        }
    }
}

/// A generated data set with its ground-truth blob labels.
#[derive(Clone, Debug)]
pub struct SyntheticBlobs {
    source: VectorSource,
    labels: Vec<usize>,
}

impl SyntheticBlobs {
    /// Generates Gaussian blobs, assigning points to blobs round-robin.
    ///
    /// # Errors
    /// Returns [`SyntheticError`] when the configuration is invalid.
    #[expect(
        clippy::float_arithmetic,
        reason = "Gaussian sampling requires floating-point arithmetic"
    )]
    pub fn generate(config: &SyntheticConfig) -> Result<Self, SyntheticError> {
        validate(config)?;
        let centroids = centroids(config);
        let mut rng = SmallRng::seed_from_u64(config.seed);
        let mut rows = Vec::with_capacity(config.point_count);
        let mut labels = Vec::with_capacity(config.point_count);

        for (label, centroid) in centroids
            .iter()
            .enumerate()
            .cycle()
            .take(config.point_count)
        {
            let row = centroid
                .iter()
                .map(|&centre| Ok(centre + standard_normal_sample(&mut rng)? * config.spread))
                .collect::<Result<Vec<f32>, SyntheticError>>()?;
            rows.push(row);
            labels.push(label);
        }

        let source = VectorSource::try_new("synthetic-blobs", rows, VectorMetric::Euclidean)?;
        Ok(Self { source, labels })
    }

    /// Returns the generated points.
    #[must_use]
    #[rustfmt::skip]
    pub const fn source(&self) -> &VectorSource { &self.source }

    /// Returns the blob each point was drawn from.
    #[must_use]
    #[rustfmt::skip]
    pub fn labels(&self) -> &[usize] { &self.labels }
}

fn validate(config: &SyntheticConfig) -> Result<(), SyntheticError> {
    if config.point_count == 0 {
        return Err(SyntheticError::ZeroPoints);
    }
    if config.dimensions == 0 {
        return Err(SyntheticError::ZeroDimensions);
    }
    if config.cluster_count == 0 {
        return Err(SyntheticError::ZeroClusters);
    }
    if config.cluster_count > config.point_count {
        return Err(SyntheticError::ClusterCountExceedsPointCount {
            cluster_count: config.cluster_count,
            point_count: config.point_count,
        });
    }
    if !config.separation.is_finite() || config.separation <= 0.0 {
        return Err(SyntheticError::InvalidFloatParameter {
            parameter: "separation",
        });
    }
    if !config.spread.is_finite() || config.spread <= 0.0 {
        return Err(SyntheticError::InvalidFloatParameter {
            parameter: "spread",
        });
    }
    Ok(())
}

#[expect(
    clippy::cast_precision_loss,
    reason = "centroid placement uses index-derived floating-point angles"
)]
#[expect(
    clippy::float_arithmetic,
    reason = "centroid placement uses trigonometric expressions"
)]
fn centroids(config: &SyntheticConfig) -> Vec<Vec<f32>> {
    (0..config.cluster_count)
        .map(|index| {
            let angle = (index as f32 / config.cluster_count as f32) * (2.0 * PI);
            let mut centroid = vec![0.0_f32; config.dimensions];
            if let Some(value) = centroid.get_mut(0) {
                *value = config.separation * angle.cos();
            }
            if let Some(value) = centroid.get_mut(1) {
                *value = config.separation * angle.sin();
            }
            centroid
        })
        .collect()
}

#[expect(
    clippy::float_arithmetic,
    reason = "Box-Muller sampling requires floating-point arithmetic"
)]
fn standard_normal_sample(rng: &mut SmallRng) -> Result<f32, SyntheticError> {
    let u1 = rng.gen_range(0.0_f32..1.0_f32).max(f32::EPSILON);
    let u2 = rng.gen_range(0.0_f32..1.0_f32);
    let sample = (-2.0_f32 * u1.ln()).sqrt() * (2.0_f32 * PI * u2).cos();
    if sample.is_finite() {
        Ok(sample)
    } else {
        Err(SyntheticError::InvalidFloatParameter {
            parameter: "standard_normal_sample",
        })
    }
}
