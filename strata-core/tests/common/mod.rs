//! Fixtures shared by the `strata-core` integration tests.
#![allow(dead_code, reason = "each test binary uses a different subset")]

use strata_core::{
    ClusterRequest, DataSource, DataSourceError, ExecutionStrategy, Point, Strata, StrataBuilder,
};

/// Points on a line measured by absolute difference.
#[derive(Clone, Debug)]
pub struct Line {
    name: &'static str,
    coords: Vec<f32>,
}

impl Line {
    pub fn new(coords: Vec<f32>) -> Self {
        Self {
            name: "line",
            coords,
        }
    }
}

impl DataSource for Line {
    fn len(&self) -> usize {
        self.coords.len()
    }

    fn name(&self) -> &str {
        self.name
    }

    fn distance(&self, left: usize, right: usize) -> Result<f32, DataSourceError> {
        let a = self
            .coords
            .get(left)
            .ok_or(DataSourceError::OutOfBounds { index: left })?;
        let b = self
            .coords
            .get(right)
            .ok_or(DataSourceError::OutOfBounds { index: right })?;
        Ok((a - b).abs())
    }
}

/// Evenly spaced runs of `per_group` points starting at each origin.
pub fn line_groups(origins: &[f32], per_group: usize, spacing: f32) -> Vec<f32> {
    origins
        .iter()
        .flat_map(|&origin| (0..per_group).map(move |step| origin + spacing * step as f32))
        .collect()
}

/// Square `side × side` grids with the given spacing, one per corner.
pub fn grids(corners: &[[f32; 2]], side: usize, spacing: f32) -> Vec<Vec<f32>> {
    let mut points = Vec::new();
    for corner in corners {
        for row in 0..side {
            for col in 0..side {
                points.push(vec![
                    corner[0] + spacing * col as f32,
                    corner[1] + spacing * row as f32,
                ]);
            }
        }
    }
    points
}

/// Builds a configuration pinned to sequential execution.
pub fn strata(min_cluster_size: usize, min_samples: usize) -> Strata {
    StrataBuilder::new()
        .with_min_cluster_size(min_cluster_size)
        .with_min_samples(min_samples)
        .with_execution_strategy(ExecutionStrategy::Sequential)
        .build()
        .expect("configuration must be valid")
}

/// Wraps vectors in a request whose ids are their positions.
pub fn vector_request(vectors: Vec<Vec<f32>>, min_cluster_size: usize) -> ClusterRequest {
    let points = vectors
        .into_iter()
        .enumerate()
        .map(|(index, values)| Point::vector(i64::try_from(index).expect("small index"), values))
        .collect();
    ClusterRequest::new(points, min_cluster_size)
}
