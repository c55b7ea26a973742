//! Element types a [`Matrix`](crate::Matrix) can hold.
//!
//! Precision is a type parameter rather than a build switch: every kernel
//! is generic over [`Element`], and the crate instantiates it for `f32`
//! (the reference precision) and `f64`.

use std::fmt::{Debug, Display};
use std::ops::AddAssign;

use num_traits::Float;
use rand::distr::uniform::SampleUniform;

mod sealed {
    pub trait Sealed {}

    impl Sealed for f32 {}
    impl Sealed for f64 {}
}

/// A floating-point scalar usable as a matrix element.
///
/// Besides ordinary arithmetic, each element type knows how to hand a
/// strided row-major product to the optimized GEMM routine of
/// `matrixmultiply`.
///
/// The trait is sealed: matrix buffers start out zero-filled, which is only
/// a valid value for the primitive floats implemented here.
pub trait Element:
    sealed::Sealed
    + Float
    + AddAssign
    + Default
    + Debug
    + Display
    + Send
    + Sync
    + SampleUniform
    + 'static
{
    /// Converts a literal, rounding to the nearest representable value.
    fn from_f64(value: f64) -> Self;

    /// Computes `c = a × b` for row-major operands with the given row strides.
    ///
    /// `a` is `m × k`, `b` is `k × n` and `c` is `m × n`. Columns are
    /// contiguous (column stride 1). The previous contents of `c` are
    /// ignored.
    ///
    /// # Safety
    ///
    /// Caller must ensure:
    /// - `a.add(i * rsa + p)` is readable for `i < m`, `p < k`
    /// - `b.add(p * rsb + j)` is readable for `p < k`, `j < n`
    /// - `c.add(i * rsc + j)` is writable for `i < m`, `j < n`
    /// - `c` does not overlap `a` or `b`
    #[allow(clippy::too_many_arguments)]
    unsafe fn gemm(
        m: usize,
        k: usize,
        n: usize,
        a: *const Self,
        rsa: isize,
        b: *const Self,
        rsb: isize,
        c: *mut Self,
        rsc: isize,
    );
}

impl Element for f32 {
    #[inline]
    fn from_f64(value: f64) -> Self {
        value as f32
    }

    #[inline]
    unsafe fn gemm(
        m: usize,
        k: usize,
        n: usize,
        a: *const f32,
        rsa: isize,
        b: *const f32,
        rsb: isize,
        c: *mut f32,
        rsc: isize,
    ) {
        // With beta == 0 the routine never reads `c`.
        unsafe { matrixmultiply::sgemm(m, k, n, 1.0, a, rsa, 1, b, rsb, 1, 0.0, c, rsc, 1) }
    }
}

impl Element for f64 {
    #[inline]
    fn from_f64(value: f64) -> Self {
        value
    }

    #[inline]
    unsafe fn gemm(
        m: usize,
        k: usize,
        n: usize,
        a: *const f64,
        rsa: isize,
        b: *const f64,
        rsb: isize,
        c: *mut f64,
        rsc: isize,
    ) {
        unsafe { matrixmultiply::dgemm(m, k, n, 1.0, a, rsa, 1, b, rsb, 1, 0.0, c, rsc, 1) }
    }
}
