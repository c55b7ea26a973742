//! Dense row-major matrices with cache-line aligned, padded rows.
//!
//! Every row is padded up to a whole number of alignment units, so that:
//! - the first element of every row sits on an `ALIGN`-byte boundary
//! - vectorized loops can run over the full padded row without a scalar tail
//! - the row stride can be handed to a GEMM routine as its leading dimension
//!
//! ```text
//!            width = 5           padding
//!        ┌───────────────────┬───────────────────────────┐
//! row 0  │ x  x  x  x  x     │ .  .  .  .  .  .  .  .  . │  width_aligned = 16 (f32, 64 B)
//! row 1  │ x  x  x  x  x     │ .  .  .  .  .  .  .  .  . │
//!        └───────────────────┴───────────────────────────┘
//! ```
//!
//! The padding columns are allocated memory and safe to touch, but nothing
//! ever reads them back as logical data.

pub mod display;
pub mod random;

use std::alloc::{self, Layout};
use std::fmt;
use std::marker::PhantomData;
use std::ops::{Index, IndexMut};
use std::ptr::NonNull;
use std::slice::{self, ChunksExact, ChunksExactMut};

use tracing::trace;

use crate::element::Element;
use crate::error::{MatrixError, Shape};

/// Default buffer alignment in bytes: one cache line, one AVX-512 register.
pub const DEFAULT_ALIGNMENT: usize = 64;

/// Rounds `width` up to a multiple of `ALIGN / size_of::<T>()` elements.
///
/// # Example
///
/// ```
/// use aligned_matmul::matrix::round_up_aligned;
///
/// assert_eq!(round_up_aligned::<f32, 64>(5), 16);
/// assert_eq!(round_up_aligned::<f64, 64>(8), 8);
/// assert_eq!(round_up_aligned::<f64, 64>(9), 16);
/// ```
pub const fn round_up_aligned<T, const ALIGN: usize>(width: usize) -> usize {
    let unit = ALIGN / size_of::<T>();
    width.div_ceil(unit) * unit
}

/// A `height × width` matrix whose rows start on `ALIGN`-byte boundaries.
///
/// The matrix owns exactly one buffer of `height * width_aligned` elements,
/// allocated eagerly in [`Matrix::new`] and released when the matrix is
/// dropped.
pub struct Matrix<T: Element, const ALIGN: usize = DEFAULT_ALIGNMENT> {
    height: usize,
    width: usize,
    width_aligned: usize,
    data: NonNull<T>,
    _owns: PhantomData<T>,
}

// SAFETY: the buffer is uniquely owned; sharing follows the rules of `[T]`.
unsafe impl<T: Element, const ALIGN: usize> Send for Matrix<T, ALIGN> {}
// SAFETY: see above, `&Matrix` only hands out `&[T]`.
unsafe impl<T: Element, const ALIGN: usize> Sync for Matrix<T, ALIGN> {}

impl<T: Element, const ALIGN: usize> Matrix<T, ALIGN> {
    const VALID_ALIGNMENT: () = assert!(
        ALIGN.is_power_of_two() && ALIGN % size_of::<T>() == 0,
        "matrix alignment must be a power of two and a multiple of the element size"
    );

    /// Allocates a zero-filled `height × width` matrix.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::Allocation`] if either dimension is zero, if
    /// the buffer size overflows, or if the allocator cannot satisfy the
    /// aligned request.
    pub fn new(height: usize, width: usize) -> Result<Self, MatrixError> {
        let () = Self::VALID_ALIGNMENT;

        let unit = Self::alignment_elements();
        let width_aligned = width.div_ceil(unit).checked_mul(unit);
        let len = width_aligned.and_then(|wa| wa.checked_mul(height));

        let error = || MatrixError::Allocation {
            height,
            width,
            bytes: height
                .saturating_mul(width_aligned.unwrap_or(usize::MAX))
                .saturating_mul(size_of::<T>()),
            align: ALIGN,
        };

        let (Some(width_aligned), Some(len)) = (width_aligned, len) else {
            return Err(error());
        };
        let data = Self::allocate(len).ok_or_else(error)?;

        debug_assert!(width_aligned >= width);
        debug_assert_eq!(width_aligned % unit, 0);

        Ok(Self {
            height,
            width,
            width_aligned,
            data,
            _owns: PhantomData,
        })
    }

    /// Builds a matrix from equally long rows.
    ///
    /// # Panics
    ///
    /// Panics if the rows do not all have the same length.
    pub fn from_rows<R: AsRef<[T]>>(rows: &[R]) -> Result<Self, MatrixError> {
        let width = rows.first().map_or(0, |r| r.as_ref().len());
        let mut m = Self::new(rows.len(), width)?;
        for (dst, src) in m.rows_mut().zip(rows) {
            let src = src.as_ref();
            assert_eq!(src.len(), width, "all rows must have the same length");
            dst[..width].copy_from_slice(src);
        }
        Ok(m)
    }

    /// Builds a matrix by evaluating `f(i, j)` for every logical element.
    pub fn from_fn<F>(height: usize, width: usize, mut f: F) -> Result<Self, MatrixError>
    where
        F: FnMut(usize, usize) -> T,
    {
        let mut m = Self::new(height, width)?;
        for (i, row) in m.rows_mut().enumerate() {
            for (j, x) in row[..width].iter_mut().enumerate() {
                *x = f(i, j);
            }
        }
        Ok(m)
    }

    /// Deep copy, reporting allocation failure instead of aborting.
    pub fn try_clone(&self) -> Result<Self, MatrixError> {
        let mut m = Self::new(self.height, self.width)?;
        assert_eq!(m.width_aligned, self.width_aligned);
        m.as_mut_slice().copy_from_slice(self.as_slice());
        Ok(m)
    }

    /// Number of rows.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of logical columns.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of allocated columns per row, padding included.
    #[inline]
    pub fn width_aligned(&self) -> usize {
        self.width_aligned
    }

    /// Row stride in elements, as expected by BLAS-style routines.
    #[inline]
    pub fn leading_dimension(&self) -> usize {
        self.width_aligned
    }

    #[inline]
    pub fn shape(&self) -> Shape {
        (self.height, self.width)
    }

    /// Alignment of the buffer and of every row, in bytes.
    #[inline]
    pub const fn alignment() -> usize {
        ALIGN
    }

    /// Number of elements in one alignment unit.
    #[inline]
    pub const fn alignment_elements() -> usize {
        ALIGN / size_of::<T>()
    }

    /// Total number of allocated elements, padding included.
    #[inline]
    pub fn len(&self) -> usize {
        self.height * self.width_aligned
    }

    /// Always `false`: zero-sized matrices cannot be constructed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.data.as_ptr()
    }

    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.data.as_ptr()
    }

    /// The whole buffer, padding included.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: `data` points to `len()` initialized elements owned by `self`.
        unsafe { slice::from_raw_parts(self.data.as_ptr(), self.len()) }
    }

    /// The whole buffer, padding included.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: as above, and `&mut self` guarantees exclusive access.
        unsafe { slice::from_raw_parts_mut(self.data.as_ptr(), self.len()) }
    }

    /// Row `i`, `width_aligned` elements long. Only the first `width` are
    /// logical.
    ///
    /// # Panics
    ///
    /// Panics if `i >= height`.
    #[inline]
    pub fn row(&self, i: usize) -> &[T] {
        assert!(i < self.height, "row {i} out of range for height {}", self.height);
        let start = i * self.width_aligned;
        &self.as_slice()[start..start + self.width_aligned]
    }

    /// Mutable row `i`, `width_aligned` elements long.
    ///
    /// # Panics
    ///
    /// Panics if `i >= height`.
    #[inline]
    pub fn row_mut(&mut self, i: usize) -> &mut [T] {
        assert!(i < self.height, "row {i} out of range for height {}", self.height);
        let start = i * self.width_aligned;
        let wa = self.width_aligned;
        &mut self.as_mut_slice()[start..start + wa]
    }

    /// Iterates over padded rows.
    #[inline]
    pub fn rows(&self) -> ChunksExact<'_, T> {
        self.as_slice().chunks_exact(self.width_aligned)
    }

    /// Iterates mutably over padded rows.
    #[inline]
    pub fn rows_mut(&mut self) -> ChunksExactMut<'_, T> {
        let wa = self.width_aligned;
        self.as_mut_slice().chunks_exact_mut(wa)
    }

    /// Logical element `(i, j)`, or `None` outside `height × width`.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> Option<T> {
        (i < self.height && j < self.width).then(|| self.as_slice()[i * self.width_aligned + j])
    }

    /// Sets logical element `(i, j)`.
    ///
    /// # Panics
    ///
    /// Panics if `(i, j)` is outside `height × width`.
    #[inline]
    pub fn set(&mut self, i: usize, j: usize, value: T) {
        assert!(
            i < self.height && j < self.width,
            "({i}, {j}) out of range for a {}×{} matrix",
            self.height,
            self.width
        );
        let wa = self.width_aligned;
        self.as_mut_slice()[i * wa + j] = value;
    }

    /// Sets every logical element to `value`. Padding is left alone.
    pub fn fill(&mut self, value: T) {
        let width = self.width;
        for row in self.rows_mut() {
            row[..width].fill(value);
        }
    }

    /// Exchanges the buffers of two equally shaped matrices without copying.
    ///
    /// # Panics
    ///
    /// Panics if `width`, `height` or `width_aligned` differ.
    pub fn swap_data(&mut self, other: &mut Self) {
        assert_eq!(self.width, other.width, "swap_data: width differs");
        assert_eq!(self.height, other.height, "swap_data: height differs");
        assert_eq!(
            self.width_aligned, other.width_aligned,
            "swap_data: width_aligned differs"
        );
        std::mem::swap(&mut self.data, &mut other.data);
    }

    fn layout(len: usize) -> Option<Layout> {
        let bytes = len.checked_mul(size_of::<T>())?;
        Layout::from_size_align(bytes, ALIGN).ok()
    }

    fn allocate(len: usize) -> Option<NonNull<T>> {
        let layout = Self::layout(len).filter(|l| l.size() > 0)?;
        // SAFETY: `layout` has a non-zero size. All-zero bits are a valid
        // `T` for every (sealed) `Element`.
        let ptr = unsafe { alloc::alloc_zeroed(layout) };
        NonNull::new(ptr.cast::<T>())
    }

    /// Layout of the live buffer. Already validated in `new`.
    fn buffer_layout(&self) -> Layout {
        // SAFETY: the same size and alignment passed `Layout::from_size_align`
        // when the buffer was allocated.
        unsafe { Layout::from_size_align_unchecked(self.len() * size_of::<T>(), ALIGN) }
    }
}

impl<T: Element, const ALIGN: usize> Drop for Matrix<T, ALIGN> {
    fn drop(&mut self) {
        // SAFETY: `data` was allocated with exactly this layout and is
        // released only here.
        unsafe { alloc::dealloc(self.data.as_ptr().cast(), self.buffer_layout()) }
    }
}

impl<T: Element, const ALIGN: usize> Clone for Matrix<T, ALIGN> {
    fn clone(&self) -> Self {
        match self.try_clone() {
            Ok(m) => m,
            Err(_) => alloc::handle_alloc_error(self.buffer_layout()),
        }
    }

    /// Assignment: the existing buffer is reused unless the total element
    /// count changes.
    fn clone_from(&mut self, source: &Self) {
        if self.len() != source.len() {
            trace!(
                from = self.len(),
                to = source.len(),
                "reallocating matrix buffer"
            );
            let Some(data) = Self::allocate(source.len()) else {
                alloc::handle_alloc_error(source.buffer_layout());
            };
            // SAFETY: the old buffer is released with its own layout before
            // the pointer is replaced.
            unsafe { alloc::dealloc(self.data.as_ptr().cast(), self.buffer_layout()) };
            self.data = data;
        }
        self.height = source.height;
        self.width = source.width;
        self.width_aligned = source.width_aligned;
        self.as_mut_slice().copy_from_slice(source.as_slice());
    }
}

impl<T: Element, const ALIGN: usize> Index<usize> for Matrix<T, ALIGN> {
    type Output = [T];

    #[inline]
    fn index(&self, row: usize) -> &[T] {
        self.row(row)
    }
}

impl<T: Element, const ALIGN: usize> IndexMut<usize> for Matrix<T, ALIGN> {
    #[inline]
    fn index_mut(&mut self, row: usize) -> &mut [T] {
        self.row_mut(row)
    }
}

impl<T: Element, const ALIGN: usize> fmt::Debug for Matrix<T, ALIGN> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Matrix")
            .field("height", &self.height)
            .field("width", &self.width)
            .field("width_aligned", &self.width_aligned)
            .field("align", &ALIGN)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width_aligned_invariant() {
        for width in 1..70 {
            let m = Matrix::<f32>::new(3, width).unwrap();
            assert!(m.width_aligned() >= width);
            assert_eq!(m.width_aligned() % 16, 0, "width {}", width);

            let m = Matrix::<f64>::new(3, width).unwrap();
            assert!(m.width_aligned() >= width);
            assert_eq!(m.width_aligned() % 8, 0, "width {}", width);
        }
    }

    #[test]
    fn test_buffer_and_rows_are_aligned() {
        let m = Matrix::<f32>::new(7, 5).unwrap();
        assert_eq!(m.as_ptr() as usize % DEFAULT_ALIGNMENT, 0);
        for i in 0..m.height() {
            assert_eq!(m.row(i).as_ptr() as usize % DEFAULT_ALIGNMENT, 0);
        }

        let m = Matrix::<f64, 128>::new(3, 3).unwrap();
        assert_eq!(m.width_aligned(), 16);
        assert_eq!(m.as_ptr() as usize % 128, 0);
    }

    #[test]
    fn test_width_five_pads_to_sixteen() {
        let m = Matrix::<f32>::new(2, 5).unwrap();
        assert_eq!(m.width_aligned(), 16);
        assert_eq!(m.len(), 32);
        assert_eq!(m.row(1).len(), 16);
    }

    #[test]
    fn test_new_is_zero_filled() {
        let m = Matrix::<f64>::new(4, 3).unwrap();
        assert!(m.as_slice().iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_zero_size_is_allocation_error() {
        assert!(matches!(
            Matrix::<f32>::new(0, 4),
            Err(MatrixError::Allocation { .. })
        ));
        assert!(matches!(
            Matrix::<f32>::new(4, 0),
            Err(MatrixError::Allocation { .. })
        ));
    }

    #[test]
    fn test_overflowing_size_is_allocation_error() {
        let err = Matrix::<f64>::new(usize::MAX / 4, usize::MAX / 4).unwrap_err();
        assert!(matches!(err, MatrixError::Allocation { align: 64, .. }));
    }

    #[test]
    fn test_index_and_get() {
        let mut m = Matrix::<f32>::new(2, 3).unwrap();
        m[1][2] = 4.5;
        m.set(0, 1, -1.0);
        assert_eq!(m.get(1, 2), Some(4.5));
        assert_eq!(m.get(0, 1), Some(-1.0));
        assert_eq!(m.get(2, 0), None);
        assert_eq!(m.get(0, 3), None);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_row_out_of_range_panics() {
        let m = Matrix::<f32>::new(2, 3).unwrap();
        let _ = m.row(2);
    }

    #[test]
    fn test_fill_leaves_padding() {
        let mut m = Matrix::<f32>::new(2, 3).unwrap();
        m.fill(2.0);
        for row in m.rows() {
            assert_eq!(&row[..3], &[2.0, 2.0, 2.0]);
            assert!(row[3..].iter().all(|&x| x == 0.0));
        }
    }

    #[test]
    fn test_clone_from_reuses_buffer_for_same_size() {
        let src = Matrix::<f32>::from_fn(4, 20, |i, j| (i * 20 + j) as f32).unwrap();
        let mut dst = Matrix::<f32>::new(4, 17).unwrap();
        let before = dst.as_ptr();
        dst.clone_from(&src);
        assert_eq!(dst.as_ptr(), before);
        assert_eq!(dst.shape(), (4, 20));
        assert_eq!(dst.get(3, 19), Some(79.0));
    }

    #[test]
    fn test_clone_from_reallocates_on_size_change() {
        let src = Matrix::<f32>::from_fn(9, 2, |i, j| (i + j) as f32).unwrap();
        let mut dst = Matrix::<f32>::new(2, 2).unwrap();
        dst.clone_from(&src);
        assert_eq!(dst.shape(), (9, 2));
        assert_eq!(dst.width_aligned(), src.width_aligned());
        assert_eq!(dst.get(8, 1), Some(9.0));
        assert_eq!(dst.as_ptr() as usize % DEFAULT_ALIGNMENT, 0);
    }

    #[test]
    fn test_swap_data_exchanges_buffers() {
        let mut a = Matrix::<f64>::from_fn(3, 3, |_, _| 1.0).unwrap();
        let mut b = Matrix::<f64>::from_fn(3, 3, |_, _| 2.0).unwrap();
        let (pa, pb) = (a.as_ptr(), b.as_ptr());
        a.swap_data(&mut b);
        assert_eq!(a.as_ptr(), pb);
        assert_eq!(b.as_ptr(), pa);
        assert_eq!(a.get(2, 2), Some(2.0));
        assert_eq!(b.get(0, 0), Some(1.0));
    }

    #[test]
    #[should_panic(expected = "swap_data")]
    fn test_swap_data_rejects_shape_mismatch() {
        let mut a = Matrix::<f32>::new(3, 3).unwrap();
        let mut b = Matrix::<f32>::new(3, 4).unwrap();
        a.swap_data(&mut b);
    }

    #[test]
    #[should_panic(expected = "same length")]
    fn test_from_rows_rejects_ragged_rows() {
        let _ = Matrix::<f32>::from_rows(&[vec![1.0, 2.0], vec![3.0]]);
    }
}
