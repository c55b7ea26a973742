//! Errors shared by the matrix container, the kernels and the worker pool.

use thiserror::Error;

/// Shape of a matrix as `(height, width)`.
pub type Shape = (usize, usize);

/// Errors reported by matrix construction, kernel dispatch and pool setup.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MatrixError {
    /// The aligned buffer could not be allocated.
    ///
    /// Raised for zero-sized matrices, for sizes that overflow the address
    /// space, and when the allocator refuses the request.
    #[error(
        "cannot allocate a {height}×{width} matrix ({bytes} bytes aligned to {align})"
    )]
    Allocation {
        height: usize,
        width: usize,
        bytes: usize,
        align: usize,
    },

    /// Operand shapes do not describe `dest (m×n) = a (m×k) · b (k×n)`.
    #[error(
        "dimension mismatch: dest is {}×{}, a is {}×{}, b is {}×{}",
        dest.0, dest.1, a.0, a.1, b.0, b.1
    )]
    DimensionMismatch { dest: Shape, a: Shape, b: Shape },

    /// A kernel selector did not name any known kernel.
    #[error("unknown kernel `{0}` (expected one of: basic, ikj, basic_mt, ikj_mt, blas)")]
    UnknownKernel(String),

    /// The worker pool for the parallel kernels could not be built.
    #[error("failed to build kernel thread pool")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
