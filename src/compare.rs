//! Element-wise equivalence check between two matrices.
//!
//! Kernels sum in different orders, so their results are compared within
//! a tolerance rather than bit for bit: [`compare`] takes it as absolute,
//! [`compare_relative`] scales it by the magnitude of the values. A failed
//! check is a diagnostic: the caller decides whether it is fatal.

use thiserror::Error;

use crate::element::Element;
use crate::error::Shape;
use crate::matrix::Matrix;

/// Tolerance used when cross-checking kernels.
pub const DEFAULT_TOLERANCE: f64 = 1e-2;

/// The first difference found by [`compare`] or [`compare_relative`].
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum Mismatch<T: Element> {
    #[error("shape mismatch: {}×{} vs {}×{}", left.0, left.1, right.0, right.1)]
    Shape { left: Shape, right: Shape },

    #[error("element ({row}, {col}) differs: {left} vs {right}")]
    Element { row: usize, col: usize, left: T, right: T },
}

/// Checks `|a[i][j] - b[i][j]| <= tolerance` for every logical element.
///
/// Elements are visited in row-major order and the first violation is
/// returned. A NaN on either side counts as a violation. Padding is ignored.
pub fn compare<T: Element, const ALIGN: usize>(
    a: &Matrix<T, ALIGN>,
    b: &Matrix<T, ALIGN>,
    tolerance: T,
) -> Result<(), Mismatch<T>> {
    compare_by(a, b, |left, right| (left - right).abs() <= tolerance)
}

/// Like [`compare`], but the tolerance scales with the magnitude of the
/// values: `|a - b| <= tolerance * max(1, |a|, |b|)`.
///
/// This is the check to use between kernels. Their absolute disagreement
/// grows with the inner dimension while the relative one stays put.
pub fn compare_relative<T: Element, const ALIGN: usize>(
    a: &Matrix<T, ALIGN>,
    b: &Matrix<T, ALIGN>,
    tolerance: T,
) -> Result<(), Mismatch<T>> {
    compare_by(a, b, |left, right| {
        let scale = T::one().max(left.abs()).max(right.abs());
        (left - right).abs() <= tolerance * scale
    })
}

fn compare_by<T, const ALIGN: usize, F>(
    a: &Matrix<T, ALIGN>,
    b: &Matrix<T, ALIGN>,
    within: F,
) -> Result<(), Mismatch<T>>
where
    T: Element,
    F: Fn(T, T) -> bool,
{
    if a.shape() != b.shape() {
        return Err(Mismatch::Shape {
            left: a.shape(),
            right: b.shape(),
        });
    }

    let width = a.width();
    for (row, (a_row, b_row)) in a.rows().zip(b.rows()).enumerate() {
        for (col, (&left, &right)) in a_row[..width].iter().zip(&b_row[..width]).enumerate() {
            // Comparisons with NaN are false, so NaN never passes.
            if !within(left, right) {
                return Err(Mismatch::Element {
                    row,
                    col,
                    left,
                    right,
                });
            }
        }
    }
    Ok(())
}
