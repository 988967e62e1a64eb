use nalgebra::DMatrix;
use nalgebra_sparse::CsrMatrix;

use crate::error::{PoissonError, Result};

/// Square matrix in diagonal-ordered storage.
///
/// Entry `A[row, col]` with `-ku <= row - col <= kl` is kept at
/// `data[(ku + row - col, col)]`; the storage has `kl + ku + 1` rows and one
/// column per matrix column. Slots that do not map to a matrix entry are zero.
/// This is the layout expected by LAPACK-style banded solvers called with
/// `(kl, ku)`.
#[derive(Debug, Clone, PartialEq)]
pub struct BandedMatrix {
    kl: usize,
    ku: usize,
    data: DMatrix<f64>,
}

impl BandedMatrix {
    /// Zero matrix of size `n x n` with equal lower and upper bandwidth
    pub fn zeros(n: usize, bandwidth: usize) -> BandedMatrix {
        BandedMatrix {
            kl: bandwidth,
            ku: bandwidth,
            data: DMatrix::zeros(2 * bandwidth + 1, n),
        }
    }

    /// Converts a sparse matrix whose nonzeros lie within `bandwidth` of the diagonal
    pub fn from_csr(matrix: &CsrMatrix<f64>, bandwidth: usize) -> Result<BandedMatrix> {
        check_square(matrix.nrows(), matrix.ncols())?;

        let mut banded = BandedMatrix::zeros(matrix.ncols(), bandwidth);
        for (row, col, &value) in matrix.triplet_iter() {
            banded.insert(row, col, value)?;
        }
        Ok(banded)
    }

    /// Converts a dense matrix whose nonzeros lie within `bandwidth` of the diagonal
    pub fn from_dense(matrix: &DMatrix<f64>, bandwidth: usize) -> Result<BandedMatrix> {
        check_square(matrix.nrows(), matrix.ncols())?;

        let mut banded = BandedMatrix::zeros(matrix.ncols(), bandwidth);
        for col in 0..matrix.ncols() {
            for row in 0..matrix.nrows() {
                banded.insert(row, col, matrix[(row, col)])?;
            }
        }
        Ok(banded)
    }

    /// Stores `value` at `(row, col)`, accumulating onto what is already there.
    /// Zeros outside of the band are skipped.
    fn insert(&mut self, row: usize, col: usize, value: f64) -> Result<()> {
        match self.storage_row(row, col) {
            Some(srow) => {
                self.data[(srow, col)] += value;
                Ok(())
            }
            None if value == 0.0 => Ok(()),
            None => Err(PoissonError::BandwidthViolation {
                row,
                col,
                bandwidth: self.kl.max(self.ku),
            }),
        }
    }

    fn storage_row(&self, row: usize, col: usize) -> Option<usize> {
        if row > col + self.kl || col > row + self.ku {
            return None;
        }
        Some(self.ku + row - col)
    }
}

// getters
impl BandedMatrix {
    /// Number of subdiagonals
    pub fn kl(&self) -> usize {
        self.kl
    }
    /// Number of superdiagonals
    pub fn ku(&self) -> usize {
        self.ku
    }
    /// Order of the represented square matrix
    pub fn n(&self) -> usize {
        self.data.ncols()
    }
    pub fn data(&self) -> &DMatrix<f64> {
        &self.data
    }

    /// Entry `A[row, col]` of the represented matrix
    pub fn get(&self, row: usize, col: usize) -> f64 {
        match self.storage_row(row, col) {
            Some(srow) => self.data[(srow, col)],
            None => 0.0,
        }
    }

    /// Rebuilds the full `n x n` matrix
    pub fn to_dense(&self) -> DMatrix<f64> {
        let n = self.n();
        let mut dense = DMatrix::zeros(n, n);
        for col in 0..n {
            let first = col.saturating_sub(self.ku);
            let last = (col + self.kl).min(n - 1);
            for row in first..=last {
                dense[(row, col)] = self.data[(self.ku + row - col, col)];
            }
        }
        dense
    }
}

fn check_square(nrows: usize, ncols: usize) -> Result<()> {
    if nrows != ncols {
        return Err(PoissonError::InvalidParameter(format!(
            "banded storage needs a square matrix, got {nrows}x{ncols}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::BandedMatrix;
    use crate::error::PoissonError;
    use nalgebra::{dmatrix, DMatrix};
    use nalgebra_sparse::{CooMatrix, CsrMatrix};

    fn pentadiagonal(n: usize) -> DMatrix<f64> {
        DMatrix::from_fn(n, n, |r, c| {
            let d = r.abs_diff(c);
            if d <= 2 {
                (10 * r + c) as f64 + 1.0
            } else {
                0.0
            }
        })
    }

    #[test]
    fn storage_layout_is_diagonal_ordered() {
        let a = dmatrix![
            4.0, -1.0, 0.0;
            -2.0, 4.0, -1.0;
            0.0, -2.0, 4.0;
        ];
        let banded = BandedMatrix::from_dense(&a, 1).unwrap();
        let expected = dmatrix![
            0.0, -1.0, -1.0;
            4.0, 4.0, 4.0;
            -2.0, -2.0, 0.0;
        ];
        assert_eq!(banded.data(), &expected);
        assert_eq!(banded.kl(), 1);
        assert_eq!(banded.ku(), 1);
        assert_eq!(banded.n(), 3);
    }

    #[test]
    fn dense_roundtrip_is_exact() {
        let a = pentadiagonal(7);
        let banded = BandedMatrix::from_dense(&a, 2).unwrap();
        assert_eq!(banded.data().nrows(), 5);
        assert_eq!(banded.to_dense(), a);
        for r in 0..7 {
            for c in 0..7 {
                assert_eq!(banded.get(r, c), a[(r, c)]);
            }
        }
    }

    #[test]
    fn wider_band_than_needed_is_fine() {
        let a = pentadiagonal(4);
        let banded = BandedMatrix::from_dense(&a, 5).unwrap();
        assert_eq!(banded.data().nrows(), 11);
        assert_eq!(banded.to_dense(), a);
    }

    #[test]
    fn csr_matches_dense() {
        let a = pentadiagonal(6);
        let mut coo = CooMatrix::new(6, 6);
        for c in 0..6 {
            for r in 0..6 {
                if a[(r, c)] != 0.0 {
                    coo.push(r, c, a[(r, c)]);
                }
            }
        }
        // explicit zero far from the diagonal
        coo.push(5, 0, 0.0);
        let csr = CsrMatrix::from(&coo);
        assert_eq!(
            BandedMatrix::from_csr(&csr, 2).unwrap(),
            BandedMatrix::from_dense(&a, 2).unwrap()
        );
    }

    #[test]
    fn nonzero_outside_band_is_rejected() {
        let mut a = pentadiagonal(5);
        a[(4, 0)] = 1.0;
        match BandedMatrix::from_dense(&a, 2) {
            Err(PoissonError::BandwidthViolation {
                row,
                col,
                bandwidth,
            }) => {
                assert_eq!((row, col, bandwidth), (4, 0, 2));
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn non_square_is_rejected() {
        let a = DMatrix::<f64>::zeros(2, 3);
        assert!(matches!(
            BandedMatrix::from_dense(&a, 1),
            Err(PoissonError::InvalidParameter(_))
        ));
    }
}
