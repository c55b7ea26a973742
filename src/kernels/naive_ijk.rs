use super::check_dims;
use crate::element::Element;
use crate::error::MatrixError;
use crate::matrix::Matrix;

/// Naive matrix multiplication using i-j-k loop order.
///
/// This is the textbook triple loop: each output cell is a dot product of a
/// row of `a` and a column of `b`. The inner loop walks `b` with a stride of
/// `width_aligned`, touching a new cache line on every iteration.
///
/// Use this as a correctness baseline, not for performance.
///
/// # Errors
///
/// [`MatrixError::DimensionMismatch`] if the shapes do not chain; `dest` is
/// left untouched in that case.
pub fn matmul_naive_ijk<T: Element, const ALIGN: usize>(
    dest: &mut Matrix<T, ALIGN>,
    a: &Matrix<T, ALIGN>,
    b: &Matrix<T, ALIGN>,
) -> Result<(), MatrixError> {
    check_dims(dest, a, b)?;
    let n = dest.width();

    for (i, c_row) in dest.rows_mut().enumerate() {
        let a_row = a.row(i);
        for (j, cell) in c_row[..n].iter_mut().enumerate() {
            *cell = dot_column(a_row, b, j);
        }
    }
    Ok(())
}

/// `sum(a_row[p] * b[p][j])` over the `b.height()` logical columns of `a_row`.
#[inline]
pub(crate) fn dot_column<T: Element, const ALIGN: usize>(
    a_row: &[T],
    b: &Matrix<T, ALIGN>,
    j: usize,
) -> T {
    let mut sum = T::zero();
    for (&a_ip, b_row) in a_row.iter().zip(b.rows()) {
        sum += a_ip * b_row[j];
    }
    sum
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_2x3_times_3x2() {
        let a = Matrix::<f64>::from_rows(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]).unwrap();
        let b = Matrix::<f64>::from_rows(&[[7.0, 8.0], [9.0, 10.0], [11.0, 12.0]]).unwrap();
        let mut c = Matrix::<f64>::new(2, 2).unwrap();

        matmul_naive_ijk(&mut c, &a, &b).unwrap();

        assert_eq!(&c[0][..2], &[58.0, 64.0]);
        assert_eq!(&c[1][..2], &[139.0, 154.0]);
    }

    #[test]
    fn test_overwrites_previous_contents() {
        let a = Matrix::<f32>::from_fn(4, 4, |i, j| (i == j) as u8 as f32).unwrap();
        let b = Matrix::<f32>::from_fn(4, 4, |i, j| (i * 4 + j) as f32).unwrap();
        let mut c = Matrix::<f32>::new(4, 4).unwrap();
        c.fill(5.0);

        matmul_naive_ijk(&mut c, &a, &b).unwrap();

        for i in 0..4 {
            assert_eq!(&c[i][..4], &b[i][..4]);
        }
    }

    #[test]
    fn test_mismatch_leaves_dest_untouched() {
        let a = Matrix::<f32>::new(2, 3).unwrap();
        let b = Matrix::<f32>::new(2, 2).unwrap();
        let mut c = Matrix::<f32>::new(2, 2).unwrap();
        c.fill(7.0);

        assert!(matmul_naive_ijk(&mut c, &a, &b).is_err());
        assert_eq!(c.get(1, 1), Some(7.0));
    }
}
