//! Maps request points onto rows of a shared distance matrix.

use crate::{datasource::DataSource, error::DataSourceError, provider::matrix::DistanceMatrix};

/// A [`DataSource`] whose item `i` is row `rows[i]` of a borrowed
/// [`DistanceMatrix`].
///
/// Several points may reference the same row; they are then at distance zero
/// from each other.
///
/// # Examples
/// ```
/// use strata_core::{DataSource, DistanceMatrix, RowSelection};
///
/// let matrix = DistanceMatrix::try_new("m", vec![vec![0.0, 2.0], vec![2.0, 0.0]])?;
/// let selection = RowSelection::try_new(&matrix, vec![1, 0, 1])?;
/// assert_eq!(selection.len(), 3);
/// assert_eq!(selection.distance(0, 1)?, 2.0);
/// assert_eq!(selection.distance(0, 2)?, 0.0);
/// # Ok::<(), strata_core::DataSourceError>(())
/// ```
#[derive(Clone, Debug)]
pub struct RowSelection<'a> {
    matrix: &'a DistanceMatrix,
    rows: Vec<usize>,
}

impl<'a> RowSelection<'a> {
    /// Validates that every selected row exists in `matrix`.
    ///
    /// # Errors
    /// Returns [`DataSourceError::RowOutOfRange`] naming the first point whose
    /// row is outside the matrix.
    pub fn try_new(matrix: &'a DistanceMatrix, rows: Vec<usize>) -> Result<Self, DataSourceError> {
        let available = matrix.len();
        if let Some((point, &row)) = rows.iter().enumerate().find(|(_, r)| **r >= available) {
            return Err(DataSourceError::RowOutOfRange {
                point,
                row,
                rows: available,
            });
        }
        Ok(Self { matrix, rows })
    }

    fn row(&self, index: usize) -> Result<usize, DataSourceError> {
        self.rows
            .get(index)
            .copied()
            .ok_or(DataSourceError::OutOfBounds { index })
    }
}

impl DataSource for RowSelection<'_> {
    fn len(&self) -> usize {
        self.rows.len()
    }

    fn name(&self) -> &str {
        self.matrix.name()
    }

    fn distance(&self, i: usize, j: usize) -> Result<f32, DataSourceError> {
        self.matrix.distance(self.row(i)?, self.row(j)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_rows_outside_the_matrix() {
        let matrix = DistanceMatrix::try_new("m", vec![vec![0.0]]).expect("valid");
        let err = RowSelection::try_new(&matrix, vec![0, 4]).expect_err("row 4 is missing");
        assert_eq!(
            err,
            DataSourceError::RowOutOfRange {
                point: 1,
                row: 4,
                rows: 1,
            }
        );
    }

    #[test]
    fn point_indices_are_bounds_checked() {
        let matrix = DistanceMatrix::try_new("m", vec![vec![0.0]]).expect("valid");
        let selection = RowSelection::try_new(&matrix, vec![0]).expect("valid");
        assert_eq!(
            selection.distance(0, 1),
            Err(DataSourceError::OutOfBounds { index: 1 })
        );
    }
}
