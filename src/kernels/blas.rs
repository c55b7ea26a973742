//! Multiplication delegated to an optimized GEMM routine.
//!
//! The padded layout maps directly onto the strided GEMM interface of
//! `matrixmultiply`: each matrix is passed as its raw buffer with row stride
//! `width_aligned` (the leading dimension) and column stride 1. Passing
//! `width` instead would make the routine walk into the wrong rows.

use super::check_dims;
use crate::element::Element;
use crate::error::MatrixError;
use crate::matrix::Matrix;

/// Computes `dest = 1 · (a × b) + 0 · dest` with the external GEMM kernel.
///
/// The routine may parallelize internally when the `blas-threading`
/// feature is enabled.
///
/// # Errors
///
/// [`MatrixError::DimensionMismatch`] if the shapes do not chain; `dest` is
/// left untouched in that case.
pub fn matmul_blas<T: Element, const ALIGN: usize>(
    dest: &mut Matrix<T, ALIGN>,
    a: &Matrix<T, ALIGN>,
    b: &Matrix<T, ALIGN>,
) -> Result<(), MatrixError> {
    check_dims(dest, a, b)?;

    let (m, n, k) = (dest.height(), dest.width(), a.width());
    // Buffers never exceed isize::MAX bytes, so the strides fit.
    let lda = a.leading_dimension() as isize;
    let ldb = b.leading_dimension() as isize;
    let ldc = dest.leading_dimension() as isize;

    // SAFETY: the shapes were checked above, every row has `width_aligned`
    // allocated elements, and `dest` is borrowed mutably so it cannot alias
    // `a` or `b`.
    unsafe {
        T::gemm(
            m,
            k,
            n,
            a.as_ptr(),
            lda,
            b.as_ptr(),
            ldb,
            dest.as_mut_ptr(),
            ldc,
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uses_padded_leading_dimension() {
        // width 3 pads to 16 for f32; a wrong stride would mix rows up.
        let a = Matrix::<f32>::from_rows(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]).unwrap();
        let b = Matrix::<f32>::from_rows(&[[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]])
            .unwrap();
        let mut c = Matrix::<f32>::new(2, 3).unwrap();

        matmul_blas(&mut c, &a, &b).unwrap();

        assert_eq!(&c[0][..3], &[1.0, 2.0, 3.0]);
        assert_eq!(&c[1][..3], &[4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_ignores_previous_dest_contents() {
        let a = Matrix::<f64>::from_rows(&[[2.0]]).unwrap();
        let b = Matrix::<f64>::from_rows(&[[3.0, 4.0]]).unwrap();
        let mut c = Matrix::<f64>::new(1, 2).unwrap();
        c.fill(f64::NAN);

        matmul_blas(&mut c, &a, &b).unwrap();

        assert_eq!(&c[0][..2], &[6.0, 8.0]);
    }
}
