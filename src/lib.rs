//! Cache-line aligned dense matrices and interchangeable multiplication
//! kernels.
//!
//! I built this to see how much loop order, threading and a tuned GEMM
//! each buy on the same data structure. Every [`Matrix`] row starts on a
//! 64-byte boundary and is padded to a whole number of cache lines, so the
//! same buffers feed naive loops, vectorizable loops, fork-join loops and
//! a strided GEMM routine without any repacking.
//!
//! ## Usage
//!
//! ```
//! use aligned_matmul::{KernelKind, Matrix, compare, multiply};
//!
//! let a = Matrix::<f32>::from_rows(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]).unwrap();
//! let b = Matrix::<f32>::from_rows(&[[7.0, 8.0], [9.0, 10.0], [11.0, 12.0]]).unwrap();
//!
//! let mut basic = Matrix::<f32>::new(2, 2).unwrap();
//! let mut blas = Matrix::<f32>::new(2, 2).unwrap();
//! multiply(KernelKind::Basic, &mut basic, &a, &b).unwrap();
//! multiply(KernelKind::Blas, &mut blas, &a, &b).unwrap();
//!
//! assert_eq!(&basic[1][..2], &[139.0, 154.0]);
//! assert!(compare(&basic, &blas, 1e-2).is_ok());
//! ```
//!
//! The parallel kernels run on rayon's global pool unless you install a
//! [`KernelPool`]:
//!
//! ```
//! use aligned_matmul::{KernelKind, KernelPool, Matrix};
//! use aligned_matmul::matrix::random::init_random;
//!
//! let mut a = Matrix::<f32>::new(256, 256).unwrap();
//! let mut b = Matrix::<f32>::new(256, 256).unwrap();
//! init_random(&mut a);
//! init_random(&mut b);
//!
//! let pool = KernelPool::new(4).unwrap();
//! let mut c = Matrix::<f32>::new(256, 256).unwrap();
//! pool.multiply(KernelKind::IkjMt, &mut c, &a, &b).unwrap();
//! ```
//!
//! ## What's inside
//!
//! - [`Matrix`]: aligned, padded, single-owner row-major storage
//! - i-j-k and i-k-j kernels, single- and multi-threaded
//! - a GEMM delegate that passes `width_aligned` as the leading dimension
//! - [`compare`] and [`compare_relative`] for cross-checking kernels within
//!   an absolute or a magnitude-scaled tolerance

pub mod compare;
pub mod element;
pub mod error;
pub mod kernels;
pub mod matrix;
pub mod threaded;

pub use compare::{DEFAULT_TOLERANCE, Mismatch, compare, compare_relative};
pub use element::Element;
pub use error::MatrixError;
pub use kernels::blas::matmul_blas;
pub use kernels::naive_ijk::matmul_naive_ijk;
pub use kernels::naive_ikj::matmul_naive_ikj;
pub use kernels::{KernelFn, KernelKind, multiply};
pub use matrix::{DEFAULT_ALIGNMENT, Matrix};
pub use threaded::KernelPool;
pub use threaded::naive_ijk_mt::matmul_naive_ijk_mt;
pub use threaded::naive_ikj_mt::matmul_naive_ikj_mt;
