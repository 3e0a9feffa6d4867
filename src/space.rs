//! Small capability traits describing what an accessor can do. Concrete accessors compose the
//! ones that apply to them (a cursor is `Localizable + Sampler` but not `Positionable`, a random
//! access is `Localizable + Positionable + Sampler`, an out-of-bounds wrapper is the same but
//! read-only, the rounding transform is `RealPositionable` over any `Positionable`).
//!
//! Integer coordinates are `i64` so that positions outside of an interval (including negative
//! ones) can always be expressed. Extents are `usize`.

mod interval;
mod point;

pub use interval::{FinalInterval, Interval};
pub use point::{Point, RealPoint};

use crate::Result;

pub trait EuclideanSpace {
    fn num_dimensions(&self) -> usize;
}

/// Read back an integer position.
pub trait Localizable: EuclideanSpace {
    fn long_position(&self, d: usize) -> i64;

    /// Write the current position into `out`, which must have at least `num_dimensions()`
    /// entries.
    fn localize(&self, out: &mut [i64]) {
        for (d, v) in out.iter_mut().take(self.num_dimensions()).enumerate() {
            *v = self.long_position(d);
        }
    }

    fn position_vec(&self) -> Vec<i64> {
        let mut out = vec![0; self.num_dimensions()];
        self.localize(&mut out);
        out
    }
}

/// Absolute and relative integer repositioning. No bounds are validated at this level, any
/// position in ℤⁿ may be set.
pub trait Positionable: EuclideanSpace {
    fn set_position_dim(&mut self, value: i64, d: usize);

    fn move_dim(&mut self, distance: i64, d: usize);

    fn set_position(&mut self, position: &[i64]) {
        for (d, &v) in position.iter().enumerate().take(self.num_dimensions()) {
            self.set_position_dim(v, d);
        }
    }

    fn set_position_from(&mut self, other: &impl Localizable) {
        for d in 0..self.num_dimensions() {
            self.set_position_dim(other.long_position(d), d);
        }
    }

    fn move_by(&mut self, distance: &[i64]) {
        for (d, &v) in distance.iter().enumerate().take(self.num_dimensions()) {
            if v != 0 {
                self.move_dim(v, d);
            }
        }
    }

    fn fwd(&mut self, d: usize) {
        self.move_dim(1, d);
    }

    fn bck(&mut self, d: usize) {
        self.move_dim(-1, d);
    }
}

pub trait RealLocalizable: EuclideanSpace {
    fn double_position(&self, d: usize) -> f64;

    fn float_position(&self, d: usize) -> f32 {
        self.double_position(d) as f32
    }

    fn localize_real(&self, out: &mut [f64]) {
        for (d, v) in out.iter_mut().take(self.num_dimensions()).enumerate() {
            *v = self.double_position(d);
        }
    }
}

pub trait RealPositionable: EuclideanSpace {
    fn set_real_position_dim(&mut self, value: f64, d: usize);

    fn move_real_dim(&mut self, distance: f64, d: usize);

    fn set_real_position(&mut self, position: &[f64]) {
        for (d, &v) in position.iter().enumerate().take(self.num_dimensions()) {
            self.set_real_position_dim(v, d);
        }
    }

    fn move_real_by(&mut self, distance: &[f64]) {
        for (d, &v) in distance.iter().enumerate().take(self.num_dimensions()) {
            self.move_real_dim(v, d);
        }
    }
}

/// Read access to the element the accessor currently points at. The returned reference borrows
/// the accessor, so it can never outlive a move.
pub trait Sampler {
    type Element;

    fn get(&self) -> &Self::Element;
}

pub trait SamplerMut: Sampler {
    fn get_mut(&mut self) -> &mut Self::Element;
}

/// A sequential accessor. A fresh (or reset) cursor sits before its first element; each `fwd`
/// binds it to the next element of the container's iteration order.
pub trait Cursor: Sampler + Localizable {
    /// True if one more `fwd()` stays within the elements of this cursor.
    fn has_next(&self) -> bool;

    /// Advance to the next element, failing with `OutOfRange` if there is none.
    fn fwd(&mut self) -> Result<()>;

    /// Advance `steps` elements at once, with the same range check as `steps` calls to `fwd()`
    /// but without visiting the intermediate elements.
    fn jump_fwd(&mut self, steps: usize) -> Result<()>;

    /// Return to the state before the first element.
    fn reset(&mut self);

    /// Exhaust the cursor. `has_next()` is false and `fwd()` fails until the next `reset()`.
    fn close(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_move_by_skips_zero_entries() {
        let mut p = Point::new(vec![1, 2, 3]);
        p.move_by(&[0, -4, 2]);
        assert_eq!(p.position_vec(), vec![1, -2, 5]);
    }

    #[test]
    fn fwd_and_bck() {
        let mut p = Point::origin(2);
        p.fwd(1);
        p.fwd(1);
        p.bck(0);
        assert_eq!(p.position_vec(), vec![-1, 2]);
    }

    #[test]
    fn set_position_from_other_localizable() {
        let src = Point::new(vec![7, -3]);
        let mut dst = Point::origin(2);
        dst.set_position_from(&src);
        assert_eq!(dst, src);
    }
}
