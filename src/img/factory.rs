//! Creating containers from a storage strategy chosen at runtime. The factory produces an
//! `AnyImg`, whose layout dispatches to the concrete layout of the chosen strategy, so code which
//! receives images from configuration does not need to be generic over the storage.

use crate::img::{ArrayLayout, CellLayout, DynamicLayout, Img, Layout};
use crate::types::{NativeKind, NativeType};
use crate::{ImgError, Result};
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StorageStrategy {
    /// A single contiguous buffer
    #[default]
    Array,

    /// A grid of cells, `cell_size` holds one extent per dimension or a single extent used for
    /// every dimension
    Cell { cell_size: Vec<usize> },

    /// Array addressing which can grow along the last dimension
    Dynamic,
}

impl StorageStrategy {
    /// Whether this strategy has a specialization for elements of `kind`. Cell storage does
    /// not pack bits.
    pub fn supports(&self, kind: NativeKind) -> bool {
        match self {
            StorageStrategy::Cell { .. } => kind != NativeKind::Bit,
            StorageStrategy::Array | StorageStrategy::Dynamic => true,
        }
    }

    pub fn layout(&self, dimensions: &[usize]) -> Result<AnyLayout> {
        Ok(match self {
            StorageStrategy::Array => AnyLayout::Array(ArrayLayout::new(dimensions)?),
            StorageStrategy::Cell { cell_size } => {
                AnyLayout::Cell(CellLayout::new(dimensions, cell_size)?)
            }
            StorageStrategy::Dynamic => AnyLayout::Dynamic(DynamicLayout::new(dimensions)?),
        })
    }
}

/// A layout chosen at runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnyLayout {
    Array(ArrayLayout),
    Cell(CellLayout),
    Dynamic(DynamicLayout),
}

macro_rules! dispatch {
    ($self:ident, $l:ident => $e:expr) => {
        match $self {
            AnyLayout::Array($l) => $e,
            AnyLayout::Cell($l) => $e,
            AnyLayout::Dynamic($l) => $e,
        }
    };
}

impl Layout for AnyLayout {
    fn dimensions(&self) -> &[usize] {
        dispatch!(self, l => l.dimensions())
    }

    fn num_elements(&self) -> usize {
        dispatch!(self, l => l.num_elements())
    }

    fn index_of(&self, position: &[i64]) -> usize {
        dispatch!(self, l => l.index_of(position))
    }

    fn localize_index(&self, index: usize, out: &mut [i64]) {
        dispatch!(self, l => l.localize_index(index, out))
    }

    fn position_of(&self, index: usize, d: usize) -> i64 {
        dispatch!(self, l => l.position_of(index, d))
    }

    fn step_position(&self, index: usize, position: &mut [i64]) {
        dispatch!(self, l => l.step_position(index, position))
    }
}

pub type AnyImg<T> = Img<T, AnyLayout>;

impl<T: Clone> AnyImg<T> {
    /// Extend the last dimension by `extra` positions, each new element set to `fill`. Only
    /// images created with dynamic storage can grow; others fail with `IncompatibleType`.
    pub fn grow(&mut self, extra: usize, fill: T) -> Result<()> {
        match &mut self.layout {
            AnyLayout::Dynamic(layout) => layout.grow(extra)?,
            other => {
                return Err(ImgError::IncompatibleType(format!(
                    "only dynamic storage can grow, image of {:?} is not dynamic",
                    other.dimensions()
                )));
            }
        }
        self.data.resize(self.layout.num_elements(), fill);
        log::debug!("dynamic image grown to {:?}", self.layout.dimensions());
        Ok(())
    }
}

/// Creates images of element type `T` with a fixed storage strategy.
#[derive(Debug, Clone)]
pub struct ImgFactory<T> {
    strategy: StorageStrategy,
    _marker: PhantomData<fn() -> T>,
}

impl<T: NativeType> ImgFactory<T> {
    /// Create a factory, failing with `IncompatibleType` if the strategy cannot hold `T`.
    pub fn new(strategy: StorageStrategy) -> Result<Self> {
        if !strategy.supports(T::KIND) {
            return Err(ImgError::IncompatibleType(format!(
                "{strategy:?} storage has no specialization for {:?}",
                T::KIND
            )));
        }
        Ok(Self {
            strategy,
            _marker: PhantomData,
        })
    }

    pub fn strategy(&self) -> &StorageStrategy {
        &self.strategy
    }

    /// Create a zero-filled image.
    pub fn create(&self, dimensions: &[usize]) -> Result<AnyImg<T>> {
        let layout = self.strategy.layout(dimensions)?;
        log::debug!(
            "creating {:?} image of {dimensions:?} with {:?} storage",
            T::KIND,
            self.strategy
        );
        Ok(Img::filled(layout, T::default()))
    }

    /// Create an image with the same dimensions as `other`.
    pub fn create_like<U, L: Layout>(&self, other: &Img<U, L>) -> Result<AnyImg<T>> {
        self.create(other.dimensions())
    }

    /// A factory for a different element type using the same storage strategy.
    pub fn companion<U: NativeType>(&self) -> Result<ImgFactory<U>> {
        ImgFactory::new(self.strategy.clone())
    }
}

impl<T: NativeType> Default for ImgFactory<T> {
    fn default() -> Self {
        Self {
            strategy: StorageStrategy::Array,
            _marker: PhantomData,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::space::{Cursor, Localizable, Sampler};

    #[test]
    fn create_each_strategy() -> Result<()> {
        let strategies = [
            StorageStrategy::Array,
            StorageStrategy::Cell {
                cell_size: vec![2, 3],
            },
            StorageStrategy::Dynamic,
        ];

        for strategy in strategies {
            let factory = ImgFactory::<u16>::new(strategy)?;
            let img = factory.create(&[5, 4])?;
            assert_eq!(img.num_elements(), 20);

            let mut c = img.localizing_cursor();
            let mut count = 0;
            while c.has_next() {
                c.fwd()?;
                let p = c.position_vec();
                assert_eq!(img.linear_index(&p)?, count);
                assert_eq!(*c.get(), 0);
                count += 1;
            }
            assert_eq!(count, 20);
        }
        Ok(())
    }

    #[test]
    fn invalid_dimensions_fail() -> Result<()> {
        let factory = ImgFactory::<f32>::new(StorageStrategy::Array)?;
        assert!(matches!(
            factory.create(&[3, 0]),
            Err(ImgError::InvalidDimension(_))
        ));
        Ok(())
    }

    #[test]
    fn companion_keeps_strategy() -> Result<()> {
        let factory = ImgFactory::<u8>::new(StorageStrategy::Cell { cell_size: vec![4] })?;
        let other = factory.companion::<f64>()?;
        assert_eq!(other.strategy(), factory.strategy());
        Ok(())
    }

    #[test]
    fn cell_has_no_bit_specialization() -> Result<()> {
        let factory = ImgFactory::<f32>::new(StorageStrategy::Cell { cell_size: vec![4] })?;
        assert!(matches!(
            factory.companion::<bool>(),
            Err(ImgError::IncompatibleType(_))
        ));

        let array = ImgFactory::<f32>::new(StorageStrategy::Array)?;
        let bits = array.companion::<bool>()?.create(&[8])?;
        assert_eq!(bits.iter().filter(|b| **b).count(), 0);
        Ok(())
    }

    #[test]
    fn dynamic_strategy_grows() -> Result<()> {
        let mut img = ImgFactory::<i32>::new(StorageStrategy::Dynamic)?.create(&[3, 2])?;
        *img.at_mut(&[2, 1])? = 7;
        img.grow(2, -1)?;
        assert_eq!(img.dimensions(), &[3, 4]);
        assert_eq!(*img.at(&[2, 1])?, 7);
        assert_eq!(*img.at(&[0, 3])?, -1);
        Ok(())
    }

    #[test]
    fn fixed_strategies_do_not_grow() -> Result<()> {
        for strategy in [StorageStrategy::Array, StorageStrategy::Cell { cell_size: vec![2] }] {
            let mut img = ImgFactory::<u8>::new(strategy)?.create(&[3, 2])?;
            assert!(matches!(img.grow(1, 0), Err(ImgError::IncompatibleType(_))));
            assert_eq!(img.dimensions(), &[3, 2]);
        }
        Ok(())
    }

    #[test]
    fn strategy_from_json() -> Result<()> {
        let s: StorageStrategy = serde_json::from_str(r#"{"type": "cell", "cell_size": [16]}"#)?;
        assert_eq!(s, StorageStrategy::Cell { cell_size: vec![16] });
        let a: StorageStrategy = serde_json::from_str(r#"{"type": "array"}"#)?;
        assert_eq!(a, StorageStrategy::Array);
        Ok(())
    }
}
