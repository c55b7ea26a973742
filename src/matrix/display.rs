//! Diagnostic printing of matrices.
//!
//! Width and precision given to the formatter apply to every element, so
//! `format!("{:7.3}", m)` prints each value as `{:7.3}` followed by a space,
//! one row per line. Padding columns are never printed.

use std::fmt::{self, Write};

use super::Matrix;
use crate::element::Element;

impl<T: Element, const ALIGN: usize> fmt::Display for Matrix<T, ALIGN> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.width();
        for row in self.rows() {
            for value in &row[..width] {
                match (f.width(), f.precision()) {
                    (Some(w), Some(p)) => write!(f, "{value:w$.p$}")?,
                    (Some(w), None) => write!(f, "{value:w$}")?,
                    (None, Some(p)) => write!(f, "{value:.p$}")?,
                    (None, None) => write!(f, "{value}")?,
                }
                f.write_char(' ')?;
            }
            f.write_char('\n')?;
        }
        Ok(())
    }
}
