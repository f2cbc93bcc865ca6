//! Square pairwise distance matrices, supplied by callers or derived from
//! vectors under the cosine metric.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::{
    datasource::DataSource,
    distance::{CosineNorms, Norm, cosine_kernel},
    error::DataSourceError,
    provider::vector::validated_rows,
};

/// Absolute tolerance applied to diagonal and symmetry checks.
pub const ABS_TOL: f32 = 1e-6;
/// Relative tolerance applied to symmetry checks.
pub const REL_TOL: f32 = 1e-5;

/// Validated square distance matrix stored row-major.
///
/// Entries are finite and non-negative, the diagonal is zero and the matrix is
/// symmetric within `ABS_TOL + REL_TOL * max(|a|, |b|)`. Lookups read the
/// upper-triangle value so `distance(i, j) == distance(j, i)` exactly.
///
/// Memory is quadratic in the number of rows.
///
/// # Examples
/// ```
/// use strata_core::{DataSource, DistanceMatrix};
///
/// let matrix = DistanceMatrix::try_new(
///     "demo",
///     vec![
///         vec![0.0, 1.0, 2.0],
///         vec![1.0, 0.0, 1.5],
///         vec![2.0, 1.5, 0.0],
///     ],
/// )?;
/// assert_eq!(matrix.len(), 3);
/// assert_eq!(matrix.distance(2, 1)?, 1.5);
/// # Ok::<(), strata_core::DataSourceError>(())
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct DistanceMatrix {
    name: String,
    size: usize,
    data: Vec<f32>,
}

impl DistanceMatrix {
    /// Validates a caller-supplied matrix.
    ///
    /// # Errors
    /// Returns [`DataSourceError::EmptyData`] for an empty matrix,
    /// [`DataSourceError::MatrixNotSquare`] when a row has the wrong length,
    /// [`DataSourceError::NonFiniteEntry`] or [`DataSourceError::NegativeEntry`]
    /// for unusable entries, [`DataSourceError::NonZeroDiagonal`] when a
    /// diagonal entry exceeds [`ABS_TOL`], and [`DataSourceError::Asymmetric`]
    /// when mirrored entries disagree beyond tolerance.
    pub fn try_new(name: impl Into<String>, rows: Vec<Vec<f32>>) -> Result<Self, DataSourceError> {
        let size = rows.len();
        if size == 0 {
            return Err(DataSourceError::EmptyData);
        }
        for (row, values) in rows.iter().enumerate() {
            if values.len() != size {
                return Err(DataSourceError::MatrixNotSquare {
                    row,
                    expected: size,
                    found: values.len(),
                });
            }
            for (column, &value) in values.iter().enumerate() {
                check_entry(row, column, value)?;
            }
        }

        let mut data: Vec<f32> = rows.into_iter().flatten().collect();
        for row in 0..size {
            let diagonal = data[row * size + row];
            if diagonal > ABS_TOL {
                return Err(DataSourceError::NonZeroDiagonal {
                    index: row,
                    value: diagonal,
                });
            }
            data[row * size + row] = 0.0;
            for column in row + 1..size {
                let upper = data[row * size + column];
                let lower = data[column * size + row];
                if !within_tolerance(upper, lower) {
                    return Err(DataSourceError::Asymmetric {
                        row,
                        column,
                        upper,
                        lower,
                    });
                }
                data[column * size + row] = upper;
            }
        }

        Ok(Self {
            name: name.into(),
            size,
            data,
        })
    }

    /// Derives the cosine distance matrix `1 - cos(i, j)` from feature
    /// vectors.
    ///
    /// Norms are computed once per vector. Entries lie in `[0, 2]`, the
    /// diagonal is zero and a zero-magnitude vector sits at distance 1 from
    /// every other vector. Rows are computed in parallel when the `parallel`
    /// feature is enabled.
    ///
    /// # Errors
    /// Returns the same validation errors as
    /// [`VectorSource::try_new`](crate::VectorSource::try_new).
    ///
    /// # Examples
    /// ```
    /// use strata_core::{DataSource, DistanceMatrix};
    ///
    /// let matrix = DistanceMatrix::from_cosine(
    ///     "cosine",
    ///     vec![vec![1.0, 0.0], vec![0.0, 2.0], vec![-3.0, 0.0]],
    /// )?;
    /// assert!((matrix.distance(0, 1)? - 1.0).abs() < 1e-6);
    /// assert!((matrix.distance(0, 2)? - 2.0).abs() < 1e-6);
    /// # Ok::<(), strata_core::DataSourceError>(())
    /// ```
    pub fn from_cosine(
        name: impl Into<String>,
        rows: Vec<Vec<f32>>,
    ) -> Result<Self, DataSourceError> {
        Self::from_cosine_with(name, rows, cfg!(feature = "parallel"))
    }

    pub(crate) fn from_cosine_with(
        name: impl Into<String>,
        rows: Vec<Vec<f32>>,
        parallel: bool,
    ) -> Result<Self, DataSourceError> {
        let vectors = validated_rows(&rows)?;
        let norms: Vec<Norm> = vectors.iter().map(Norm::of).collect();

        let size = vectors.len();
        let row_of = |i: usize| -> Vec<f32> {
            (0..size)
                .map(|j| {
                    if i == j {
                        0.0
                    } else {
                        let norms = CosineNorms::from_norms(norms[i], norms[j]);
                        cosine_kernel(&vectors[i], &vectors[j], norms).clamp(0.0, 2.0)
                    }
                })
                .collect()
        };

        let computed: Vec<Vec<f32>> = if parallel {
            par_rows(size, &row_of)
        } else {
            (0..size).map(&row_of).collect()
        };

        Ok(Self {
            name: name.into(),
            size,
            data: computed.into_iter().flatten().collect(),
        })
    }

    /// Returns the stored entry for `(row, column)`, reading the upper
    /// triangle.
    fn entry(&self, row: usize, column: usize) -> Result<f32, DataSourceError> {
        if row >= self.size {
            return Err(DataSourceError::OutOfBounds { index: row });
        }
        if column >= self.size {
            return Err(DataSourceError::OutOfBounds { index: column });
        }
        let (low, high) = if row <= column { (row, column) } else { (column, row) };
        Ok(self.data[low * self.size + high])
    }
}

#[cfg(feature = "parallel")]
fn par_rows<F>(size: usize, row_of: &F) -> Vec<Vec<f32>>
where
    F: Fn(usize) -> Vec<f32> + Sync,
{
    (0..size).into_par_iter().map(row_of).collect()
}

#[cfg(not(feature = "parallel"))]
fn par_rows<F>(size: usize, row_of: &F) -> Vec<Vec<f32>>
where
    F: Fn(usize) -> Vec<f32>,
{
    (0..size).map(row_of).collect()
}

fn check_entry(row: usize, column: usize, value: f32) -> Result<(), DataSourceError> {
    if !value.is_finite() {
        return Err(DataSourceError::NonFiniteEntry { row, column, value });
    }
    if value < 0.0 {
        return Err(DataSourceError::NegativeEntry { row, column, value });
    }
    Ok(())
}

fn within_tolerance(a: f32, b: f32) -> bool {
    (a - b).abs() <= ABS_TOL + REL_TOL * a.abs().max(b.abs())
}

impl DataSource for DistanceMatrix {
    fn len(&self) -> usize {
        self.size
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn distance(&self, i: usize, j: usize) -> Result<f32, DataSourceError> {
        self.entry(i, j)
    }
}
