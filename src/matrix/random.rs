//! Deterministic random initialization for benchmark operands.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use super::Matrix;
use crate::element::Element;

/// Lower bound (inclusive) of generated values.
pub const RANDOM_LOW: f64 = -5.0;
/// Upper bound (exclusive) of generated values.
pub const RANDOM_HIGH: f64 = 5.0;

/// Fills the logical elements of `m` with values uniform in
/// `[RANDOM_LOW, RANDOM_HIGH)`.
///
/// Row `i` is drawn from a generator seeded with `i`, so the result does not
/// depend on how rows are spread over threads.
pub fn init_random<T: Element, const ALIGN: usize>(m: &mut Matrix<T, ALIGN>) {
    init_random_with_seed(m, 0);
}

/// Like [`init_random`], but row `i` uses seed `seed + i`.
pub fn init_random_with_seed<T: Element, const ALIGN: usize>(
    m: &mut Matrix<T, ALIGN>,
    seed: u64,
) {
    let width = m.width();
    let wa = m.width_aligned();
    let low = T::from_f64(RANDOM_LOW);
    let high = T::from_f64(RANDOM_HIGH);

    m.as_mut_slice()
        .par_chunks_mut(wa)
        .enumerate()
        .for_each(|(i, row)| {
            let mut rng = StdRng::seed_from_u64(seed.wrapping_add(i as u64));
            for x in &mut row[..width] {
                *x = rng.random_range(low..high);
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_in_range_and_padding_untouched() {
        let mut m = Matrix::<f32>::new(17, 5).unwrap();
        init_random(&mut m);
        for row in m.rows() {
            assert!(row[..5].iter().all(|&x| (-5.0..5.0).contains(&x)));
            assert!(row[5..].iter().all(|&x| x == 0.0));
        }
    }

    #[test]
    fn test_deterministic_per_row() {
        let mut a = Matrix::<f64>::new(8, 9).unwrap();
        let mut b = Matrix::<f64>::new(3, 9).unwrap();
        init_random(&mut a);
        init_random(&mut b);
        for i in 0..3 {
            assert_eq!(&a.row(i)[..9], &b.row(i)[..9]);
        }

        let mut c = Matrix::<f64>::new(8, 9).unwrap();
        init_random_with_seed(&mut c, 1);
        assert_eq!(&a.row(1)[..9], &c.row(0)[..9]);
        assert_ne!(&a.row(0)[..9], &c.row(0)[..9]);
    }
}
