//! Sequential accessors over a container's flat storage. Both cursor flavors are generic over
//! the data handle `D`: a shared slice gives a read-only cursor and a mutable slice gives a
//! cursor whose current element can be written. The slice may be a sub-range of the container
//! (a chunk), in which case `offset` is the linear index of its first element and positions are
//! still reported in the coordinates of the whole container.

use crate::img::layout::Layout;
use crate::space::{Cursor, EuclideanSpace, Localizable, Sampler, SamplerMut};
use crate::{ImgError, Result};
use std::ops::{Deref, DerefMut};

/// A cursor which only tracks its linear index. Coordinates are computed from the index on
/// request, which is cheap to advance but costs a division chain per `localize`.
#[derive(Debug, Clone)]
pub struct FlatCursor<'a, L, D> {
    layout: &'a L,
    data: D,
    offset: usize,

    /// Index into `data`, -1 before the first element
    index: isize,
    closed: bool,
}

impl<'a, L: Layout, D> FlatCursor<'a, L, D> {
    pub(crate) fn new(layout: &'a L, data: D, offset: usize) -> Self {
        Self {
            layout,
            data,
            offset,
            index: -1,
            closed: false,
        }
    }

    /// The linear index of the current element within the whole container, or `None` if the
    /// cursor is not bound to an element.
    pub fn linear_index(&self) -> Option<usize> {
        if self.index < 0 || self.closed {
            None
        } else {
            Some(self.offset + self.index as usize)
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl<L: Layout, D, T> FlatCursor<'_, L, D>
where
    D: Deref<Target = [T]>,
{
    /// The number of elements this cursor visits.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn bound_index(&self) -> usize {
        assert!(
            self.index >= 0 && !self.closed && (self.index as usize) < self.data.len(),
            "cursor is not bound to an element, call fwd() first"
        );
        self.index as usize
    }
}

impl<L: Layout, D> EuclideanSpace for FlatCursor<'_, L, D> {
    fn num_dimensions(&self) -> usize {
        self.layout.num_dimensions()
    }
}

impl<L: Layout, D, T> Localizable for FlatCursor<'_, L, D>
where
    D: Deref<Target = [T]>,
{
    fn long_position(&self, d: usize) -> i64 {
        self.layout.position_of(self.offset + self.bound_index(), d)
    }

    fn localize(&self, out: &mut [i64]) {
        self.layout
            .localize_index(self.offset + self.bound_index(), out);
    }
}

impl<L: Layout, D, T> Sampler for FlatCursor<'_, L, D>
where
    D: Deref<Target = [T]>,
{
    type Element = T;

    fn get(&self) -> &T {
        &self.data[self.bound_index()]
    }
}

impl<L: Layout, D, T> SamplerMut for FlatCursor<'_, L, D>
where
    D: DerefMut<Target = [T]>,
{
    fn get_mut(&mut self) -> &mut T {
        let i = self.bound_index();
        &mut self.data[i]
    }
}

impl<L: Layout, D, T> Cursor for FlatCursor<'_, L, D>
where
    D: Deref<Target = [T]>,
{
    fn has_next(&self) -> bool {
        !self.closed && self.index + 1 < self.data.len() as isize
    }

    fn fwd(&mut self) -> Result<()> {
        if !self.has_next() {
            return Err(ImgError::OutOfRange(format!(
                "cursor over {} elements is exhausted",
                self.data.len()
            )));
        }
        self.index += 1;
        Ok(())
    }

    fn jump_fwd(&mut self, steps: usize) -> Result<()> {
        let target = isize::try_from(steps)
            .ok()
            .and_then(|s| self.index.checked_add(s))
            .filter(|&t| !self.closed && t < self.data.len() as isize);

        match target {
            Some(t) => {
                self.index = t;
                Ok(())
            }
            None => Err(ImgError::OutOfRange(format!(
                "cannot jump {steps} steps from index {} in a cursor over {} elements",
                self.index,
                self.data.len()
            ))),
        }
    }

    fn reset(&mut self) {
        self.index = -1;
        self.closed = false;
    }

    fn close(&mut self) {
        self.closed = true;
        self.index = isize::MAX;
    }
}

/// A cursor which keeps its coordinates up to date as it moves, so reading the position is
/// free. Advancing costs a little more than a `FlatCursor`.
#[derive(Debug, Clone)]
pub struct LocalizingCursor<'a, L, D> {
    flat: FlatCursor<'a, L, D>,
    position: Vec<i64>,
}

impl<'a, L: Layout, D> LocalizingCursor<'a, L, D> {
    pub(crate) fn new(layout: &'a L, data: D, offset: usize) -> Self {
        Self {
            position: vec![0; layout.num_dimensions()],
            flat: FlatCursor::new(layout, data, offset),
        }
    }

    pub fn linear_index(&self) -> Option<usize> {
        self.flat.linear_index()
    }

    /// The current position, valid once the cursor has been advanced.
    pub fn position(&self) -> &[i64] {
        &self.position
    }
}

impl<L: Layout, D> EuclideanSpace for LocalizingCursor<'_, L, D> {
    fn num_dimensions(&self) -> usize {
        self.position.len()
    }
}

impl<L: Layout, D, T> Localizable for LocalizingCursor<'_, L, D>
where
    D: Deref<Target = [T]>,
{
    fn long_position(&self, d: usize) -> i64 {
        self.position[d]
    }

    fn localize(&self, out: &mut [i64]) {
        let n = self.position.len();
        out[..n].copy_from_slice(&self.position);
    }
}

impl<L: Layout, D, T> Sampler for LocalizingCursor<'_, L, D>
where
    D: Deref<Target = [T]>,
{
    type Element = T;

    fn get(&self) -> &T {
        self.flat.get()
    }
}

impl<L: Layout, D, T> SamplerMut for LocalizingCursor<'_, L, D>
where
    D: DerefMut<Target = [T]>,
{
    fn get_mut(&mut self) -> &mut T {
        self.flat.get_mut()
    }
}

impl<L: Layout, D, T> Cursor for LocalizingCursor<'_, L, D>
where
    D: Deref<Target = [T]>,
{
    fn has_next(&self) -> bool {
        self.flat.has_next()
    }

    fn fwd(&mut self) -> Result<()> {
        let first = self.flat.index < 0;
        self.flat.fwd()?;
        let index = self.flat.offset + self.flat.index as usize;
        if first {
            self.flat.layout.localize_index(index, &mut self.position);
        } else {
            self.flat.layout.step_position(index, &mut self.position);
        }
        Ok(())
    }

    fn jump_fwd(&mut self, steps: usize) -> Result<()> {
        self.flat.jump_fwd(steps)?;
        if self.flat.index >= 0 {
            let index = self.flat.offset + self.flat.index as usize;
            self.flat.layout.localize_index(index, &mut self.position);
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.flat.reset();
    }

    fn close(&mut self) {
        self.flat.close();
    }
}
