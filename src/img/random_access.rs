use crate::img::layout::Layout;
use crate::space::{EuclideanSpace, Localizable, Positionable, Sampler, SamplerMut};
use crate::{ImgError, Result};
use std::ops::{Deref, DerefMut};

/// A positionable accessor over a container's flat storage. It can be moved anywhere in ℤⁿ; the
/// storage index is recomputed on every move and is only defined while the position lies inside
/// the container. Reading outside is an error (`try_get`) or a panic (`get`); wrap the access in
/// an `OutOfBounds` to give outside positions a value.
#[derive(Debug, Clone)]
pub struct FlatRandomAccess<'a, L, D> {
    layout: &'a L,
    data: D,
    position: Vec<i64>,
    index: Option<usize>,
}

impl<'a, L: Layout, D> FlatRandomAccess<'a, L, D> {
    pub(crate) fn new(layout: &'a L, data: D) -> Self {
        let position = vec![0; layout.num_dimensions()];
        let index = layout.checked_index(&position);
        Self {
            layout,
            data,
            position,
            index,
        }
    }

    /// True if the current position is backed by storage.
    pub fn is_inside(&self) -> bool {
        self.index.is_some()
    }

    /// The linear index of the current position, if it lies inside the container.
    pub fn linear_index(&self) -> Option<usize> {
        self.index
    }

    fn update_index(&mut self) {
        self.index = self.layout.checked_index(&self.position);
    }

    fn outside_error(&self) -> ImgError {
        ImgError::OutOfRange(format!(
            "position {:?} is outside of the storage dimensions {:?}",
            self.position,
            self.layout.dimensions()
        ))
    }
}

impl<L: Layout, D, T> FlatRandomAccess<'_, L, D>
where
    D: Deref<Target = [T]>,
{
    pub fn try_get(&self) -> Result<&T> {
        match self.index {
            Some(i) => Ok(&self.data[i]),
            None => Err(self.outside_error()),
        }
    }
}

impl<L: Layout, D, T> FlatRandomAccess<'_, L, D>
where
    D: DerefMut<Target = [T]>,
{
    pub fn try_get_mut(&mut self) -> Result<&mut T> {
        match self.index {
            Some(i) => Ok(&mut self.data[i]),
            None => Err(self.outside_error()),
        }
    }
}

impl<L: Layout, D> EuclideanSpace for FlatRandomAccess<'_, L, D> {
    fn num_dimensions(&self) -> usize {
        self.position.len()
    }
}

impl<L: Layout, D> Localizable for FlatRandomAccess<'_, L, D> {
    fn long_position(&self, d: usize) -> i64 {
        self.position[d]
    }

    fn localize(&self, out: &mut [i64]) {
        let n = self.position.len();
        out[..n].copy_from_slice(&self.position);
    }
}

impl<L: Layout, D> Positionable for FlatRandomAccess<'_, L, D> {
    fn set_position_dim(&mut self, value: i64, d: usize) {
        self.position[d] = value;
        self.update_index();
    }

    fn move_dim(&mut self, distance: i64, d: usize) {
        self.position[d] += distance;
        self.update_index();
    }

    fn set_position(&mut self, position: &[i64]) {
        let n = self.position.len();
        self.position.copy_from_slice(&position[..n]);
        self.update_index();
    }

    fn move_by(&mut self, distance: &[i64]) {
        for (p, &v) in self.position.iter_mut().zip(distance) {
            *p += v;
        }
        self.update_index();
    }
}

impl<L: Layout, D, T> Sampler for FlatRandomAccess<'_, L, D>
where
    D: Deref<Target = [T]>,
{
    type Element = T;

    /// # Panics
    ///
    /// Panics if the current position lies outside of the container.
    fn get(&self) -> &T {
        match self.index {
            Some(i) => &self.data[i],
            None => panic!("{}", self.outside_error()),
        }
    }
}

impl<L: Layout, D, T> SamplerMut for FlatRandomAccess<'_, L, D>
where
    D: DerefMut<Target = [T]>,
{
    /// # Panics
    ///
    /// Panics if the current position lies outside of the container.
    fn get_mut(&mut self) -> &mut T {
        match self.index {
            Some(i) => &mut self.data[i],
            None => panic!("{}", self.outside_error()),
        }
    }
}
