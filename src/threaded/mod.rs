//! Multi-threaded multiplication kernels.
//!
//! These fan the single-threaded loops out over a rayon pool and join
//! before returning. Work is split so that no two tasks ever write the same
//! output cell, so no synchronization is needed beyond the final join.
//! Task count adapts to the matrix size: small products run as a single
//! task because the fork overhead isn't worth it.
//!
//! Available implementations:
//! - `naive_ijk_mt`: i-j-k order, parallel over output cells
//! - `naive_ikj_mt`: i-k-j order, parallel over output rows

pub mod naive_ijk_mt;
pub mod naive_ikj_mt;
mod pool;

pub use pool::KernelPool;

/// Below this many FLOPs a product runs as one task.
const SINGLE_TASK_THRESHOLD: f64 = 1_000_000.0;
/// Below this many FLOPs a product is split in two.
const TWO_TASK_THRESHOLD: f64 = 4_000_000.0;
/// Fewest output rows a task is given.
const MIN_ROWS_PER_TASK: usize = 4;

/// Number of tasks to split an `m×k · k×n` product into.
///
/// - < 1M FLOPs: 1 task
/// - < 4M FLOPs: 2 tasks
/// - otherwise: up to `max_threads`
///
/// Never more than one task per `MIN_ROWS_PER_TASK` rows.
pub(crate) fn choose_thread_count(m: usize, n: usize, k: usize, max_threads: usize) -> usize {
    let flops = 2.0 * m as f64 * n as f64 * k as f64;

    let optimal_threads = if flops < SINGLE_TASK_THRESHOLD {
        1
    } else if flops < TWO_TASK_THRESHOLD {
        2
    } else {
        max_threads
    };

    let threads_by_rows = (m / MIN_ROWS_PER_TASK).max(1);

    optimal_threads.min(threads_by_rows).min(max_threads).max(1)
}
