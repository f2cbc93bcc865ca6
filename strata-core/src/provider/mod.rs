//! Distance providers turning raw request input into a [`crate::DataSource`].
//!
//! - [`VectorSource`]: feature vectors with Euclidean or Manhattan distance,
//!   evaluated on demand.
//! - [`DistanceMatrix`]: validated precomputed matrix, or the cosine matrix
//!   derived once from vectors.
//! - [`RowSelection`]: request points referencing rows of a matrix.

mod matrix;
mod rows;
mod vector;

pub use self::matrix::{ABS_TOL, DistanceMatrix, REL_TOL};
pub use self::rows::RowSelection;
pub use self::vector::{VectorMetric, VectorSource};
