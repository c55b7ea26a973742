//! Multi-threaded i-j-k multiplication.

use rayon::prelude::*;

use super::choose_thread_count;
use crate::element::Element;
use crate::error::MatrixError;
use crate::kernels::check_dims;
use crate::kernels::naive_ijk::{dot_column, matmul_naive_ijk};
use crate::matrix::Matrix;

/// Fewest output cells of one row handed to a task.
const MIN_CELLS_PER_TASK: usize = 32;

/// Parallel version of [`matmul_naive_ijk`].
///
/// The `(i, j)` space is collapsed: rows are split across tasks and, within
/// a row, cells are split further, so short-and-wide products still spread
/// out. Each task owns disjoint cells of `dest` and reads `a` and `b` only.
///
/// Falls back to the single-threaded kernel when the product is too small
/// to be worth forking.
///
/// # Errors
///
/// [`MatrixError::DimensionMismatch`] if the shapes do not chain.
pub fn matmul_naive_ijk_mt<T: Element, const ALIGN: usize>(
    dest: &mut Matrix<T, ALIGN>,
    a: &Matrix<T, ALIGN>,
    b: &Matrix<T, ALIGN>,
) -> Result<(), MatrixError> {
    check_dims(dest, a, b)?;

    let (m, n, k) = (dest.height(), dest.width(), a.width());
    let effective_threads = choose_thread_count(m, n, k, rayon::current_num_threads());
    if effective_threads == 1 {
        return matmul_naive_ijk(dest, a, b);
    }

    let rows_per_task = m.div_ceil(effective_threads);
    let wa = dest.width_aligned();

    dest.as_mut_slice()
        .par_chunks_mut(wa)
        .with_min_len(rows_per_task)
        .enumerate()
        .for_each(|(i, c_row)| {
            let a_row = a.row(i);
            c_row[..n]
                .par_iter_mut()
                .with_min_len(MIN_CELLS_PER_TASK)
                .enumerate()
                .for_each(|(j, cell)| *cell = dot_column(a_row, b, j));
        });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::threaded::KernelPool;

    #[test]
    fn test_matches_single_threaded() {
        let pool = KernelPool::new(4).unwrap();
        let (m, n, k) = (96, 80, 128);

        let a = Matrix::<f64>::from_fn(m, k, |i, j| ((i * k + j) % 10) as f64).unwrap();
        let b = Matrix::<f64>::from_fn(k, n, |i, j| ((i * n + j) % 10) as f64).unwrap();
        let mut expected = Matrix::<f64>::new(m, n).unwrap();
        let mut actual = Matrix::<f64>::new(m, n).unwrap();

        matmul_naive_ijk(&mut expected, &a, &b).unwrap();
        pool.install(|| matmul_naive_ijk_mt(&mut actual, &a, &b)).unwrap();

        // Same summation order per cell, so the results are bit-identical.
        for i in 0..m {
            assert_eq!(&expected[i][..n], &actual[i][..n], "row {}", i);
        }
    }
}
