//! Multi-threaded i-k-j multiplication.

use rayon::prelude::*;

use super::choose_thread_count;
use crate::element::Element;
use crate::error::MatrixError;
use crate::kernels::check_dims;
use crate::kernels::naive_ikj::{accumulate_row, matmul_naive_ikj};
use crate::matrix::Matrix;

/// Parallel version of [`matmul_naive_ikj`].
///
/// Runs two fork-join passes: a parallel zero pass over `dest`, then the
/// accumulation. Every k iteration for output row `i` writes the whole of
/// `dest[i]`, so the accumulation is split strictly by output row: each
/// row belongs to exactly one task and is accumulated in k order by it.
/// Splitting over `(i, k)` pairs instead would let two tasks add into the
/// same row at once.
///
/// Falls back to the single-threaded kernel when the product is too small
/// to be worth forking.
///
/// # Errors
///
/// [`MatrixError::DimensionMismatch`] if the shapes do not chain.
pub fn matmul_naive_ikj_mt<T: Element, const ALIGN: usize>(
    dest: &mut Matrix<T, ALIGN>,
    a: &Matrix<T, ALIGN>,
    b: &Matrix<T, ALIGN>,
) -> Result<(), MatrixError> {
    check_dims(dest, a, b)?;

    let (m, n, k) = (dest.height(), dest.width(), a.width());
    let effective_threads = choose_thread_count(m, n, k, rayon::current_num_threads());
    if effective_threads == 1 {
        return matmul_naive_ikj(dest, a, b);
    }

    let rows_per_task = m.div_ceil(effective_threads);
    let wa = dest.width_aligned();

    dest.as_mut_slice()
        .par_chunks_mut(wa)
        .with_min_len(rows_per_task)
        .for_each(|c_row| c_row.fill(T::zero()));

    dest.as_mut_slice()
        .par_chunks_mut(wa)
        .with_min_len(rows_per_task)
        .enumerate()
        .for_each(|(i, c_row)| accumulate_row(c_row, a.row(i), b));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernels::KernelKind;
    use crate::threaded::KernelPool;

    #[test]
    fn test_matches_single_threaded() {
        let pool = KernelPool::new(4).unwrap();
        let (m, n, k) = (130, 70, 90);

        let a = Matrix::<f32>::from_fn(m, k, |i, j| ((i * 7 + j * 3) % 11) as f32).unwrap();
        let b = Matrix::<f32>::from_fn(k, n, |i, j| ((i * 5 + j) % 13) as f32).unwrap();
        let mut expected = Matrix::<f32>::new(m, n).unwrap();
        let mut actual = Matrix::<f32>::new(m, n).unwrap();
        actual.fill(-1.0);

        matmul_naive_ikj(&mut expected, &a, &b).unwrap();
        pool.multiply(KernelKind::IkjMt, &mut actual, &a, &b).unwrap();

        // Each row is accumulated by one task in k order: bit-identical.
        for i in 0..m {
            assert_eq!(&expected[i][..n], &actual[i][..n], "row {}", i);
        }
    }
}
