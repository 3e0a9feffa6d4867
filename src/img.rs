//! This module contains the storage containers. An `Img` owns a flat buffer of elements and a
//! `Layout` which defines how n-dimensional positions map onto that buffer. Three layouts are
//! provided:
//!
//! - `ArrayLayout`: one contiguous block, dimension 0 varying fastest
//! - `CellLayout`: a grid of smaller blocks stored one after another
//! - `DynamicLayout`: array addressing for arbitrary element types, growable along the last
//!   dimension
//!
//! Accessors (cursors and random accesses) borrow the container and address elements by
//! linear index, so a reference obtained from an accessor is only valid until the accessor moves.

mod cell;
mod cursor;
mod dynamic;
mod factory;
mod layout;
mod random_access;

pub use cell::CellLayout;
pub use cursor::{FlatCursor, LocalizingCursor};
pub use dynamic::DynamicLayout;
pub use factory::{AnyImg, AnyLayout, ImgFactory, StorageStrategy};
pub use layout::{ArrayLayout, Layout, validate_dimensions};
pub use random_access::FlatRandomAccess;

use crate::multithreading::Chunk;
use crate::space::{EuclideanSpace, FinalInterval, Interval};
use crate::types::NativeType;
use crate::{ImgError, Result};

pub type ArrayImg<T> = Img<T, ArrayLayout>;
pub type CellImg<T> = Img<T, CellLayout>;
pub type DynamicImg<T> = Img<T, DynamicLayout>;

pub type ImgCursor<'a, T, L> = FlatCursor<'a, L, &'a [T]>;
pub type ImgCursorMut<'a, T, L> = FlatCursor<'a, L, &'a mut [T]>;
pub type ImgLocalizingCursor<'a, T, L> = LocalizingCursor<'a, L, &'a [T]>;
pub type ImgLocalizingCursorMut<'a, T, L> = LocalizingCursor<'a, L, &'a mut [T]>;
pub type ImgRandomAccess<'a, T, L> = FlatRandomAccess<'a, L, &'a [T]>;
pub type ImgRandomAccessMut<'a, T, L> = FlatRandomAccess<'a, L, &'a mut [T]>;

#[derive(Debug, Clone, PartialEq)]
pub struct Img<T, L> {
    layout: L,
    data: Vec<T>,
}

impl<T: NativeType> ArrayImg<T> {
    /// Create a zero-filled array image.
    ///
    /// # Arguments
    ///
    /// * `dimensions`: the extent of each dimension, all must be positive
    ///
    /// returns: Result<Img<T, ArrayLayout>, ImgError>
    pub fn new(dimensions: &[usize]) -> Result<Self> {
        Ok(Self::filled(ArrayLayout::new(dimensions)?, T::default()))
    }

    /// Wrap an existing buffer, which must be ordered with dimension 0 fastest.
    pub fn from_vec(dimensions: &[usize], data: Vec<T>) -> Result<Self> {
        let layout = ArrayLayout::new(dimensions)?;
        if data.len() != layout.num_elements() {
            return Err(ImgError::InvalidDimension(format!(
                "buffer of {} elements does not match dimensions {dimensions:?}",
                data.len()
            )));
        }
        Ok(Self { layout, data })
    }
}

impl<T: NativeType> CellImg<T> {
    /// Create a zero-filled cell image with cells of `cell_size` (one entry per dimension, or a
    /// single entry used for all of them).
    pub fn new(dimensions: &[usize], cell_size: &[usize]) -> Result<Self> {
        Ok(Self::filled(
            CellLayout::new(dimensions, cell_size)?,
            T::default(),
        ))
    }
}

impl<T: Clone> DynamicImg<T> {
    pub fn new(dimensions: &[usize], fill: T) -> Result<Self> {
        Ok(Self::filled(DynamicLayout::new(dimensions)?, fill))
    }

    /// Extend the last dimension by `extra` positions, each new element set to `fill`. Existing
    /// elements keep their positions and linear indices.
    pub fn grow(&mut self, extra: usize, fill: T) -> Result<()> {
        self.layout.grow(extra)?;
        self.data.resize(self.layout.num_elements(), fill);
        log::debug!(
            "dynamic image grown to {:?}",
            self.layout.dimensions()
        );
        Ok(())
    }
}

impl<T: Clone, L: Layout> Img<T, L> {
    pub fn filled(layout: L, value: T) -> Self {
        let data = vec![value; layout.num_elements()];
        Self { layout, data }
    }

    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }
}

impl<T, L: Layout> Img<T, L> {
    pub fn layout(&self) -> &L {
        &self.layout
    }

    pub fn dimensions(&self) -> &[usize] {
        self.layout.dimensions()
    }

    pub fn num_elements(&self) -> usize {
        self.data.len()
    }

    /// The elements in iteration order.
    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.data.iter_mut()
    }

    pub fn first_element(&self) -> &T {
        &self.data[0]
    }

    /// The linear index of `position`, checking dimensionality and bounds.
    pub fn linear_index(&self, position: &[i64]) -> Result<usize> {
        if position.len() != self.layout.num_dimensions() {
            return Err(ImgError::dimension_mismatch(
                "position",
                self.layout.num_dimensions(),
                position.len(),
            ));
        }
        self.layout.checked_index(position).ok_or_else(|| {
            ImgError::OutOfRange(format!(
                "position {position:?} is outside of {:?}",
                self.layout.dimensions()
            ))
        })
    }

    /// Inverse of `linear_index`.
    pub fn localize_index(&self, index: usize) -> Result<Vec<i64>> {
        if index >= self.data.len() {
            return Err(ImgError::OutOfRange(format!(
                "index {index} is beyond {} elements",
                self.data.len()
            )));
        }
        let mut out = vec![0; self.layout.num_dimensions()];
        self.layout.localize_index(index, &mut out);
        Ok(out)
    }

    pub fn at(&self, position: &[i64]) -> Result<&T> {
        let i = self.linear_index(position)?;
        Ok(&self.data[i])
    }

    pub fn at_mut(&mut self, position: &[i64]) -> Result<&mut T> {
        let i = self.linear_index(position)?;
        Ok(&mut self.data[i])
    }

    pub fn interval(&self) -> FinalInterval {
        FinalInterval::from_interval(self)
    }

    pub fn cursor(&self) -> ImgCursor<'_, T, L> {
        FlatCursor::new(&self.layout, self.data.as_slice(), 0)
    }

    pub fn cursor_mut(&mut self) -> ImgCursorMut<'_, T, L> {
        FlatCursor::new(&self.layout, self.data.as_mut_slice(), 0)
    }

    pub fn localizing_cursor(&self) -> ImgLocalizingCursor<'_, T, L> {
        LocalizingCursor::new(&self.layout, self.data.as_slice(), 0)
    }

    pub fn localizing_cursor_mut(&mut self) -> ImgLocalizingCursorMut<'_, T, L> {
        LocalizingCursor::new(&self.layout, self.data.as_mut_slice(), 0)
    }

    pub fn random_access(&self) -> ImgRandomAccess<'_, T, L> {
        FlatRandomAccess::new(&self.layout, self.data.as_slice())
    }

    pub fn random_access_mut(&mut self) -> ImgRandomAccessMut<'_, T, L> {
        FlatRandomAccess::new(&self.layout, self.data.as_mut_slice())
    }

    /// Split the storage into one mutable localizing cursor per chunk. The chunks must be in
    /// ascending order, must not overlap, and must lie within the container; gaps are allowed.
    /// Each cursor visits exactly the elements of its chunk and reports positions in the
    /// coordinates of the whole container, so the cursors can be handed to separate threads.
    pub fn chunk_cursors_mut(
        &mut self,
        chunks: &[Chunk],
    ) -> Result<Vec<ImgLocalizingCursorMut<'_, T, L>>> {
        let total = self.data.len();
        let mut rest: &mut [T] = self.data.as_mut_slice();
        let mut consumed = 0;
        let mut cursors = Vec::with_capacity(chunks.len());

        for chunk in chunks {
            if chunk.start < consumed || chunk.end() > total {
                return Err(ImgError::OutOfRange(format!(
                    "chunk {chunk:?} overlaps a previous chunk or exceeds {total} elements"
                )));
            }
            let (_, tail) = std::mem::take(&mut rest).split_at_mut(chunk.start - consumed);
            let (head, tail) = tail.split_at_mut(chunk.len);
            cursors.push(LocalizingCursor::new(&self.layout, head, chunk.start));
            rest = tail;
            consumed = chunk.end();
        }

        Ok(cursors)
    }
}

impl<T, L: Layout> EuclideanSpace for Img<T, L> {
    fn num_dimensions(&self) -> usize {
        self.layout.num_dimensions()
    }
}

impl<T, L: Layout> Interval for Img<T, L> {
    fn min(&self, _d: usize) -> i64 {
        0
    }

    fn max(&self, d: usize) -> i64 {
        self.layout.dimensions()[d] as i64 - 1
    }

    fn dimension(&self, d: usize) -> usize {
        self.layout.dimensions()[d]
    }
}
