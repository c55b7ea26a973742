use super::check_dims;
use crate::element::Element;
use crate::error::MatrixError;
use crate::matrix::Matrix;

/// Cache-friendly matrix multiplication using i-k-j loop order.
///
/// By swapping the j and k loops, the innermost loop streams a row of `b`
/// into a row of `dest`, both with stride 1, so it auto-vectorizes. `dest`
/// is zeroed in a separate pass first because every cell is accumulated
/// over k iterations.
///
/// The inner loop runs over the full padded row: `dest` and `b` have the
/// same width and therefore the same `width_aligned`, and whatever lands in
/// the padding columns is never read as logical data.
///
/// # Errors
///
/// [`MatrixError::DimensionMismatch`] if the shapes do not chain; `dest` is
/// left untouched in that case.
pub fn matmul_naive_ikj<T: Element, const ALIGN: usize>(
    dest: &mut Matrix<T, ALIGN>,
    a: &Matrix<T, ALIGN>,
    b: &Matrix<T, ALIGN>,
) -> Result<(), MatrixError> {
    check_dims(dest, a, b)?;

    dest.as_mut_slice().fill(T::zero());
    for (i, c_row) in dest.rows_mut().enumerate() {
        accumulate_row(c_row, a.row(i), b);
    }
    Ok(())
}

/// `c_row += a_row × b`, one broadcast of `a_row[p]` per row `p` of `b`.
#[inline]
pub(crate) fn accumulate_row<T: Element, const ALIGN: usize>(
    c_row: &mut [T],
    a_row: &[T],
    b: &Matrix<T, ALIGN>,
) {
    for (&a_ip, b_row) in a_row.iter().zip(b.rows()) {
        for (c, &b_pj) in c_row.iter_mut().zip(b_row) {
            *c += a_ip * b_pj;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernels::naive_ijk::matmul_naive_ijk;

    #[test]
    fn test_matches_ijk_on_odd_shape() {
        let a = Matrix::<f64>::from_fn(7, 13, |i, j| ((i * 13 + j) % 10) as f64).unwrap();
        let b = Matrix::<f64>::from_fn(13, 5, |i, j| ((i * 5 + j) % 7) as f64).unwrap();
        let mut expected = Matrix::<f64>::new(7, 5).unwrap();
        let mut actual = Matrix::<f64>::new(7, 5).unwrap();

        matmul_naive_ijk(&mut expected, &a, &b).unwrap();
        matmul_naive_ikj(&mut actual, &a, &b).unwrap();

        // Small integers: every partial sum is exact.
        for i in 0..7 {
            assert_eq!(&expected[i][..5], &actual[i][..5]);
        }
    }

    #[test]
    fn test_resets_dest_before_accumulating() {
        let a = Matrix::<f32>::from_rows(&[[1.0, 1.0]]).unwrap();
        let b = Matrix::<f32>::from_rows(&[[1.0], [2.0]]).unwrap();
        let mut c = Matrix::<f32>::new(1, 1).unwrap();
        c.fill(100.0);

        matmul_naive_ikj(&mut c, &a, &b).unwrap();
        assert_eq!(c.get(0, 0), Some(3.0));

        // Running twice must not double up.
        matmul_naive_ikj(&mut c, &a, &b).unwrap();
        assert_eq!(c.get(0, 0), Some(3.0));
    }
}
