//! Dynamic storage keeps the array addressing (dimension 0 fastest) but places no requirement on
//! the element type beyond `Clone`, and can grow along its last dimension. Because the last
//! dimension varies slowest, growing only appends to the buffer and never moves or re-addresses
//! existing elements.

use crate::Result;
use crate::img::layout::{ArrayLayout, Layout};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynamicLayout {
    inner: ArrayLayout,
}

impl DynamicLayout {
    pub fn new(dimensions: &[usize]) -> Result<Self> {
        Ok(Self {
            inner: ArrayLayout::new(dimensions)?,
        })
    }

    /// The number of elements in one slice orthogonal to the last dimension.
    pub fn slice_len(&self) -> usize {
        let dims = self.inner.dimensions();
        dims[..dims.len() - 1].iter().product()
    }

    pub(crate) fn grow(&mut self, extra: usize) -> Result<()> {
        let mut dims = self.inner.dimensions().to_vec();
        let last = dims.len() - 1;
        dims[last] += extra;
        self.inner = ArrayLayout::new(&dims)?;
        Ok(())
    }
}

impl Layout for DynamicLayout {
    fn dimensions(&self) -> &[usize] {
        self.inner.dimensions()
    }

    fn index_of(&self, position: &[i64]) -> usize {
        self.inner.index_of(position)
    }

    fn localize_index(&self, index: usize, out: &mut [i64]) {
        self.inner.localize_index(index, out);
    }

    fn position_of(&self, index: usize, d: usize) -> i64 {
        self.inner.position_of(index, d)
    }

    fn step_position(&self, index: usize, position: &mut [i64]) {
        self.inner.step_position(index, position);
    }
}
