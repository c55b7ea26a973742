use tracing::debug;

use crate::element::Element;
use crate::error::MatrixError;
use crate::kernels::{self, KernelKind};
use crate::matrix::Matrix;

/// A fixed-size worker pool for the parallel kernels.
pub struct KernelPool(rayon::ThreadPool);

impl KernelPool {
    /// Builds a pool with `num_threads` workers.
    ///
    /// If `num_threads` is 0, rayon picks the count: `RAYON_NUM_THREADS` if
    /// set, the number of logical CPUs otherwise.
    pub fn new(num_threads: usize) -> Result<Self, MatrixError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .thread_name(|i| format!("matmul-worker-{i}"))
            .build()?;
        debug!(threads = pool.current_num_threads(), "built kernel thread pool");
        Ok(Self(pool))
    }

    pub fn num_threads(&self) -> usize {
        self.0.current_num_threads()
    }

    /// Runs `op` with this pool as the current rayon pool.
    pub fn install<OP, R>(&self, op: OP) -> R
    where
        OP: FnOnce() -> R + Send,
        R: Send,
    {
        self.0.install(op)
    }

    /// [`kernels::multiply`] on this pool.
    pub fn multiply<T: Element, const ALIGN: usize>(
        &self,
        kind: KernelKind,
        dest: &mut Matrix<T, ALIGN>,
        a: &Matrix<T, ALIGN>,
        b: &Matrix<T, ALIGN>,
    ) -> Result<(), MatrixError> {
        self.install(|| kernels::multiply(kind, dest, a, b))
    }
}
