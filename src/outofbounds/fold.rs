//! Coordinate mappings for the extension strategies. All functions take a coordinate relative to
//! the interval minimum and the extent of the interval in that dimension, and return a relative
//! coordinate in `[0, extent)`. The extent must be positive.

use serde::{Deserialize, Serialize};

/// Where a mirror folds at the interval boundary.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Boundary {
    /// Fold on the boundary line between the edge element and the first outside position. The
    /// edge element is seen twice at every fold, the period is `2 * extent`:
    /// `-1 -> 0`, `-2 -> 1`, `extent -> extent - 1`.
    Single,

    /// Fold through the center of the edge element. The edge element is seen once per fold,
    /// the period is `2 * (extent - 1)`: `-1 -> 1`, `extent -> extent - 2`.
    Double,
}

pub fn mirror(x: i64, extent: usize, boundary: Boundary) -> i64 {
    match boundary {
        Boundary::Single => mirror_single(x, extent),
        Boundary::Double => mirror_double(x, extent),
    }
}

pub fn mirror_single(x: i64, extent: usize) -> i64 {
    let n = extent as i64;
    let m = x.rem_euclid(2 * n);
    if m < n { m } else { 2 * n - 1 - m }
}

pub fn mirror_double(x: i64, extent: usize) -> i64 {
    if extent == 1 {
        return 0;
    }
    let n = extent as i64;
    let period = 2 * n - 2;
    let m = x.rem_euclid(period);
    if m < n { m } else { period - m }
}

pub fn periodic(x: i64, extent: usize) -> i64 {
    x.rem_euclid(extent as i64)
}

/// How many elements `x` lies beyond `[0, extent)`, zero if it is inside.
pub fn distance_outside(x: i64, extent: usize) -> u64 {
    if x < 0 {
        x.unsigned_abs()
    } else if x >= extent as i64 {
        (x - extent as i64 + 1) as u64
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(-1, 0)]
    #[test_case(-2, 1)]
    #[test_case(5, 4)]
    #[test_case(6, 3)]
    #[test_case(0, 0)]
    #[test_case(4, 4)]
    #[test_case(-5, 4)]
    #[test_case(-6, 4)]
    #[test_case(10, 0)]
    #[test_case(-11, 0)]
    fn mirror_single_extent_5(x: i64, expected: i64) {
        assert_eq!(mirror_single(x, 5), expected);
    }

    #[test_case(-1, 1)]
    #[test_case(-2, 2)]
    #[test_case(-4, 4)]
    #[test_case(-5, 3)]
    #[test_case(5, 3)]
    #[test_case(6, 2)]
    #[test_case(8, 0)]
    #[test_case(9, 1)]
    fn mirror_double_extent_5(x: i64, expected: i64) {
        assert_eq!(mirror_double(x, 5), expected);
    }

    #[test_case(-1, 4)]
    #[test_case(5, 0)]
    #[test_case(7, 2)]
    #[test_case(-6, 4)]
    #[test_case(12, 2)]
    fn periodic_extent_5(x: i64, expected: i64) {
        assert_eq!(periodic(x, 5), expected);
    }

    #[test]
    fn extent_one_everything_maps_to_zero() {
        for x in -4..=4 {
            assert_eq!(mirror_single(x, 1), 0);
            assert_eq!(mirror_double(x, 1), 0);
            assert_eq!(periodic(x, 1), 0);
        }
    }

    #[test]
    fn even_extent_folds() {
        let single = (-4..8).map(|x| mirror_single(x, 4)).collect::<Vec<_>>();
        assert_eq!(single, vec![3, 2, 1, 0, 0, 1, 2, 3, 3, 2, 1, 0]);

        let double = (-4..8).map(|x| mirror_double(x, 4)).collect::<Vec<_>>();
        assert_eq!(double, vec![2, 3, 2, 1, 0, 1, 2, 3, 2, 1, 0, 1]);
    }

    #[test]
    fn distances() {
        assert_eq!(distance_outside(-3, 5), 3);
        assert_eq!(distance_outside(0, 5), 0);
        assert_eq!(distance_outside(4, 5), 0);
        assert_eq!(distance_outside(5, 5), 1);
        assert_eq!(distance_outside(9, 5), 5);
    }
}
