//! Single-threaded multiplication kernels and kernel selection.
//!
//! Every kernel computes `dest = a × b` for `dest (m×n)`, `a (m×k)` and
//! `b (k×n)`, overwriting the logical part of `dest`. They differ only in
//! loop order, parallel decomposition and whether the work is handed off:
//!
//! | Kind | Loop order | Parallelism | Zeroing |
//! |------|-----------|-------------|---------|
//! | [`KernelKind::Basic`] | i, j, k | none | per cell |
//! | [`KernelKind::Ikj`] | i, k, j | none | whole `dest` up front |
//! | [`KernelKind::BasicMt`] | (i, j) cells, k inner | over cells | per cell |
//! | [`KernelKind::IkjMt`] | i, k, j | over output rows | parallel pass up front |
//! | [`KernelKind::Blas`] | delegated | delegated | delegated |
//!
//! Summation order differs between kernels, so results agree only within a
//! floating-point tolerance (see [`compare`](crate::compare())).

pub mod blas;
pub mod naive_ijk;
pub mod naive_ikj;

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::element::Element;
use crate::error::MatrixError;
use crate::matrix::Matrix;
use crate::threaded;

/// Signature shared by all kernels: `(dest, a, b)`.
pub type KernelFn<T, const ALIGN: usize> =
    fn(&mut Matrix<T, ALIGN>, &Matrix<T, ALIGN>, &Matrix<T, ALIGN>) -> Result<(), MatrixError>;

/// The closed set of multiplication kernels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KernelKind {
    Basic,
    Ikj,
    BasicMt,
    IkjMt,
    Blas,
}

impl KernelKind {
    pub const ALL: [KernelKind; 5] = [
        KernelKind::Basic,
        KernelKind::Ikj,
        KernelKind::BasicMt,
        KernelKind::IkjMt,
        KernelKind::Blas,
    ];

    /// Canonical selector name.
    pub const fn name(self) -> &'static str {
        match self {
            KernelKind::Basic => "basic",
            KernelKind::Ikj => "ikj",
            KernelKind::BasicMt => "basic_mt",
            KernelKind::IkjMt => "ikj_mt",
            KernelKind::Blas => "blas",
        }
    }

    /// Whether the kernel fans out over the current rayon pool.
    pub const fn is_parallel(self) -> bool {
        matches!(self, KernelKind::BasicMt | KernelKind::IkjMt)
    }

    /// Looks up the implementation for this kind.
    pub fn kernel<T: Element, const ALIGN: usize>(self) -> KernelFn<T, ALIGN> {
        match self {
            KernelKind::Basic => naive_ijk::matmul_naive_ijk::<T, ALIGN>,
            KernelKind::Ikj => naive_ikj::matmul_naive_ikj::<T, ALIGN>,
            KernelKind::BasicMt => threaded::naive_ijk_mt::matmul_naive_ijk_mt::<T, ALIGN>,
            KernelKind::IkjMt => threaded::naive_ikj_mt::matmul_naive_ikj_mt::<T, ALIGN>,
            KernelKind::Blas => blas::matmul_blas::<T, ALIGN>,
        }
    }
}

impl FromStr for KernelKind {
    type Err = MatrixError;

    /// Accepts the canonical names plus the `_omp` spellings used by older
    /// benchmark scripts.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "basic" => Ok(KernelKind::Basic),
            "ikj" => Ok(KernelKind::Ikj),
            "basic_mt" | "basic_omp" => Ok(KernelKind::BasicMt),
            "ikj_mt" | "ikj_omp" => Ok(KernelKind::IkjMt),
            "blas" => Ok(KernelKind::Blas),
            other => Err(MatrixError::UnknownKernel(other.to_owned())),
        }
    }
}

impl fmt::Display for KernelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Runs the kernel selected by `kind`.
///
/// Parallel kernels run on the rayon pool current at the call site; wrap
/// the call in [`KernelPool::install`](crate::KernelPool::install) to pick
/// a specific pool.
pub fn multiply<T: Element, const ALIGN: usize>(
    kind: KernelKind,
    dest: &mut Matrix<T, ALIGN>,
    a: &Matrix<T, ALIGN>,
    b: &Matrix<T, ALIGN>,
) -> Result<(), MatrixError> {
    debug!(
        kernel = %kind,
        m = dest.height(),
        n = dest.width(),
        k = a.width(),
        "multiply"
    );
    (kind.kernel::<T, ALIGN>())(dest, a, b)
}

/// Checks `dest (m×n) = a (m×k) · b (k×n)`.
#[inline]
pub(crate) fn check_dims<T: Element, const ALIGN: usize>(
    dest: &Matrix<T, ALIGN>,
    a: &Matrix<T, ALIGN>,
    b: &Matrix<T, ALIGN>,
) -> Result<(), MatrixError> {
    if a.height() == dest.height() && b.width() == dest.width() && a.width() == b.height() {
        Ok(())
    } else {
        Err(MatrixError::DimensionMismatch {
            dest: dest.shape(),
            a: a.shape(),
            b: b.shape(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_round_trip() {
        for kind in KernelKind::ALL {
            assert_eq!(kind.name().parse::<KernelKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_omp_aliases() {
        assert_eq!("basic_omp".parse::<KernelKind>().unwrap(), KernelKind::BasicMt);
        assert_eq!("ikj_omp".parse::<KernelKind>().unwrap(), KernelKind::IkjMt);
    }

    #[test]
    fn test_unknown_selector() {
        let err = "strassen".parse::<KernelKind>().unwrap_err();
        assert!(matches!(&err, MatrixError::UnknownKernel(name) if name == "strassen"));
        assert!(err.to_string().contains("strassen"));
    }

    #[test]
    fn test_check_dims() {
        let dest = Matrix::<f32>::new(3, 4).unwrap();
        let a = Matrix::<f32>::new(3, 2).unwrap();
        let b = Matrix::<f32>::new(2, 4).unwrap();
        assert!(check_dims(&dest, &a, &b).is_ok());

        let bad_b = Matrix::<f32>::new(5, 4).unwrap();
        let err = check_dims(&dest, &a, &bad_b).unwrap_err();
        assert!(matches!(
            err,
            MatrixError::DimensionMismatch {
                dest: (3, 4),
                a: (3, 2),
                b: (5, 4)
            }
        ));
    }
}
