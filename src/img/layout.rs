//! The addressing contract shared by all storage strategies. A layout maps every in-bounds
//! position to a linear index in `[0, num_elements())` and back. The linear index is both the
//! container's iteration order and the offset into its flat storage buffer.

use crate::{ImgError, Result};
use std::fmt::Debug;

pub trait Layout: Clone + Debug + Send + Sync {
    fn dimensions(&self) -> &[usize];

    fn num_dimensions(&self) -> usize {
        self.dimensions().len()
    }

    fn num_elements(&self) -> usize {
        self.dimensions().iter().product()
    }

    /// The linear index of a position. The position must lie inside `[0, dimensions)` in every
    /// dimension; use `checked_index` when that is not known.
    fn index_of(&self, position: &[i64]) -> usize;

    /// Write the position of the element at `index` into `out`. This is the exact inverse of
    /// `index_of`.
    fn localize_index(&self, index: usize, out: &mut [i64]);

    /// A single coordinate of the element at `index`.
    fn position_of(&self, index: usize, d: usize) -> i64 {
        let mut out = vec![0; self.num_dimensions()];
        self.localize_index(index, &mut out);
        out[d]
    }

    /// Update `position` from the element at `index - 1` to the element at `index`. Layouts
    /// whose iteration order allows it override this with an incremental update.
    fn step_position(&self, index: usize, position: &mut [i64]) {
        self.localize_index(index, position);
    }

    fn contains(&self, position: &[i64]) -> bool {
        position.len() == self.num_dimensions()
            && position
                .iter()
                .zip(self.dimensions())
                .all(|(&p, &s)| p >= 0 && (p as usize) < s)
    }

    fn checked_index(&self, position: &[i64]) -> Option<usize> {
        if self.contains(position) {
            Some(self.index_of(position))
        } else {
            None
        }
    }
}

/// Validate a dimension vector for storage: at least one dimension, every extent positive and
/// a total element count which fits in memory addressing.
pub fn validate_dimensions(dimensions: &[usize]) -> Result<usize> {
    if dimensions.is_empty() {
        return Err(ImgError::InvalidDimension(
            "storage needs at least one dimension".into(),
        ));
    }
    if let Some(d) = dimensions.iter().position(|&s| s == 0) {
        return Err(ImgError::InvalidDimension(format!(
            "extent of dimension {d} must be positive, got 0"
        )));
    }

    dimensions
        .iter()
        .try_fold(1usize, |acc, &s| acc.checked_mul(s))
        .ok_or_else(|| {
            ImgError::InvalidDimension(format!("element count of {dimensions:?} overflows"))
        })
}

/// A single contiguous block, dimension 0 varying fastest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayLayout {
    dimensions: Vec<usize>,
    strides: Vec<usize>,
}

impl ArrayLayout {
    pub fn new(dimensions: &[usize]) -> Result<Self> {
        validate_dimensions(dimensions)?;
        Ok(Self {
            dimensions: dimensions.to_vec(),
            strides: strides_for(dimensions),
        })
    }

    pub fn strides(&self) -> &[usize] {
        &self.strides
    }
}

pub(crate) fn strides_for(dimensions: &[usize]) -> Vec<usize> {
    let mut strides = Vec::with_capacity(dimensions.len());
    let mut s = 1;
    for &extent in dimensions {
        strides.push(s);
        s *= extent;
    }
    strides
}

impl Layout for ArrayLayout {
    fn dimensions(&self) -> &[usize] {
        &self.dimensions
    }

    fn index_of(&self, position: &[i64]) -> usize {
        position
            .iter()
            .zip(self.strides.iter())
            .map(|(&p, &s)| p as usize * s)
            .sum()
    }

    fn localize_index(&self, index: usize, out: &mut [i64]) {
        let mut rest = index;
        for (o, &extent) in out.iter_mut().zip(self.dimensions.iter()) {
            *o = (rest % extent) as i64;
            rest /= extent;
        }
    }

    fn position_of(&self, index: usize, d: usize) -> i64 {
        ((index / self.strides[d]) % self.dimensions[d]) as i64
    }

    fn step_position(&self, _index: usize, position: &mut [i64]) {
        for (p, &extent) in position.iter_mut().zip(self.dimensions.iter()) {
            *p += 1;
            if (*p as usize) < extent {
                return;
            }
            *p = 0;
        }
    }
}
