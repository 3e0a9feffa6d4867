//! This module extends bounded accessors to all of ℤⁿ. An `OutOfBounds` wraps a random access
//! and an interval; while its position lies inside the interval it reads through to the wrapped
//! access, outside it resolves the position with an `OutOfBoundsPolicy`.
//!
//! The outside test is done per dimension on every move and cached, so a read only checks a
//! counter. Strategies which redirect (mirror, periodic) keep the wrapped access positioned on
//! the redirected coordinate, so reads outside are as cheap as reads inside.

mod fold;
mod policy;

pub use fold::{Boundary, distance_outside, mirror, mirror_double, mirror_single, periodic};
pub use policy::{OutOfBoundsFactory, OutOfBoundsPolicy, exp_window_weight};

use crate::img::{Img, ImgRandomAccess, Layout};
use crate::space::{EuclideanSpace, Interval, Localizable, Positionable, Sampler, SamplerMut};
use crate::types::RealType;
use crate::{ImgError, Result};
use num_traits::Zero;

/// An accessor over ℤⁿ backed by a bounded random access.
pub struct OutOfBounds<A: Sampler> {
    source: A,
    policy: OutOfBoundsPolicy<A::Element>,
    min: Vec<i64>,
    extents: Vec<usize>,
    position: Vec<i64>,
    dim_is_out: Vec<bool>,
    num_out: usize,

    /// The value returned outside by the policies that do not redirect to a source element
    value: A::Element,
}

impl<A> OutOfBounds<A>
where
    A: Positionable + Localizable + Sampler,
    A::Element: RealType,
{
    /// Wrap `source`, treating `interval` as the region where it holds data. The wrapper starts
    /// at the origin.
    ///
    /// # Arguments
    ///
    /// * `source`: a random access which is valid everywhere inside `interval`
    /// * `interval`: the defined region, which must have the dimensionality of `source` and a
    ///   positive extent in every dimension
    /// * `policy`: how positions outside of `interval` are resolved
    ///
    /// returns: Result<OutOfBounds<A>, ImgError>
    pub fn new(
        source: A,
        interval: &impl Interval,
        policy: OutOfBoundsPolicy<A::Element>,
    ) -> Result<Self> {
        let n = source.num_dimensions();
        if interval.num_dimensions() != n {
            return Err(ImgError::dimension_mismatch(
                "interval",
                n,
                interval.num_dimensions(),
            ));
        }

        let extents = interval.dimensions();
        if let Some(d) = extents.iter().position(|&e| e == 0) {
            return Err(ImgError::InvalidDimension(format!(
                "cannot extend an interval with zero extent in dimension {d}"
            )));
        }
        policy.validate()?;

        let value = match policy {
            OutOfBoundsPolicy::Value(v) => v,
            _ => <A::Element as Zero>::zero(),
        };

        let mut oob = Self {
            source,
            policy,
            min: interval.min_vec(),
            extents,
            position: vec![0; n],
            dim_is_out: vec![false; n],
            num_out: 0,
            value,
        };
        for d in 0..n {
            oob.update_dim(d);
        }
        oob.refresh();
        Ok(oob)
    }

    pub fn policy(&self) -> &OutOfBoundsPolicy<A::Element> {
        &self.policy
    }

    /// True if the current position lies outside of the interval in any dimension.
    pub fn is_out_of_bounds(&self) -> bool {
        self.num_out > 0
    }

    /// True if the current position lies outside of the interval in dimension `d`.
    pub fn is_out_dim(&self, d: usize) -> bool {
        self.dim_is_out[d]
    }

    pub fn source(&self) -> &A {
        &self.source
    }

    pub fn into_source(self) -> A {
        self.source
    }

    /// The offset of the current position from the interval minimum. It is computed wide, since
    /// the difference of two `i64` coordinates does not always fit in an `i64`.
    fn relative(&self, d: usize) -> i128 {
        i128::from(self.position[d]) - i128::from(self.min[d])
    }

    fn update_dim(&mut self, d: usize) {
        let extent = self.extents[d];
        let relative = self.relative(d);
        let out = relative < 0 || relative >= extent as i128;

        if out != self.dim_is_out[d] {
            self.dim_is_out[d] = out;
            if out {
                self.num_out += 1;
            } else {
                self.num_out -= 1;
            }
        }

        let mapped = if out {
            let n = extent as i128;
            match self.policy {
                OutOfBoundsPolicy::Value(_) => return,
                OutOfBoundsPolicy::Mirror(Boundary::Single)
                | OutOfBoundsPolicy::MirrorExpWindow { .. } => {
                    mirror_single(reduce(relative, 2 * n), extent)
                }
                OutOfBoundsPolicy::Mirror(Boundary::Double) => {
                    mirror_double(reduce(relative, (2 * n - 2).max(1)), extent)
                }
                OutOfBoundsPolicy::Periodic => periodic(reduce(relative, n), extent),
            }
        } else {
            relative as i64
        };

        let target = self.min[d] + mapped;
        if self.source.long_position(d) != target {
            self.source.set_position_dim(target, d);
        }
    }

    /// Recompute the value returned outside after the position has changed.
    fn refresh(&mut self) {
        if self.num_out == 0 {
            return;
        }
        match self.policy {
            OutOfBoundsPolicy::Value(v) => self.value = v,
            OutOfBoundsPolicy::MirrorExpWindow { decay_rate } => {
                let distances = (0..self.position.len()).map(|d| {
                    let r = self.relative(d);
                    let beyond = if r < 0 {
                        -r
                    } else {
                        (r - self.extents[d] as i128 + 1).max(0)
                    };
                    u64::try_from(beyond).unwrap_or(u64::MAX)
                });
                let weight = exp_window_weight(decay_rate, distances);
                let v = self.source.get().real_double();
                self.value = <A::Element as RealType>::from_real(v * weight);
            }
            OutOfBoundsPolicy::Mirror(_) | OutOfBoundsPolicy::Periodic => {}
        }
    }
}

/// Reduce a wide offset into `[0, period)`, keeping its residue.
fn reduce(relative: i128, period: i128) -> i64 {
    relative.rem_euclid(period) as i64
}

impl<A> Clone for OutOfBounds<A>
where
    A: Sampler + Clone,
    A::Element: Clone,
{
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            policy: self.policy.clone(),
            min: self.min.clone(),
            extents: self.extents.clone(),
            position: self.position.clone(),
            dim_is_out: self.dim_is_out.clone(),
            num_out: self.num_out,
            value: self.value.clone(),
        }
    }
}

impl<A> EuclideanSpace for OutOfBounds<A>
where
    A: Sampler,
{
    fn num_dimensions(&self) -> usize {
        self.position.len()
    }
}

impl<A> Localizable for OutOfBounds<A>
where
    A: Sampler,
{
    fn long_position(&self, d: usize) -> i64 {
        self.position[d]
    }

    fn localize(&self, out: &mut [i64]) {
        let n = self.position.len();
        out[..n].copy_from_slice(&self.position);
    }
}

impl<A> Positionable for OutOfBounds<A>
where
    A: Positionable + Localizable + Sampler,
    A::Element: RealType,
{
    fn set_position_dim(&mut self, value: i64, d: usize) {
        self.position[d] = value;
        self.update_dim(d);
        self.refresh();
    }

    fn move_dim(&mut self, distance: i64, d: usize) {
        self.position[d] = self.position[d].saturating_add(distance);
        self.update_dim(d);
        self.refresh();
    }

    fn set_position(&mut self, position: &[i64]) {
        for d in 0..self.position.len() {
            self.position[d] = position[d];
            self.update_dim(d);
        }
        self.refresh();
    }

    fn move_by(&mut self, distance: &[i64]) {
        for d in 0..self.position.len() {
            if distance[d] != 0 {
                self.position[d] = self.position[d].saturating_add(distance[d]);
                self.update_dim(d);
            }
        }
        self.refresh();
    }
}

impl<A> Sampler for OutOfBounds<A>
where
    A: Sampler,
{
    type Element = A::Element;

    fn get(&self) -> &A::Element {
        if self.num_out == 0 {
            return self.source.get();
        }
        match self.policy {
            OutOfBoundsPolicy::Value(_) | OutOfBoundsPolicy::MirrorExpWindow { .. } => &self.value,
            OutOfBoundsPolicy::Mirror(_) | OutOfBoundsPolicy::Periodic => self.source.get(),
        }
    }
}

/// Writes go to the source element the position resolves to, inside the interval and for the
/// redirecting strategies outside of it. Outside with the constant or exponential window strategy
/// there is no source element, and writes land in a scratch value which the next move discards.
impl<A> SamplerMut for OutOfBounds<A>
where
    A: SamplerMut,
{
    fn get_mut(&mut self) -> &mut A::Element {
        if self.num_out == 0 {
            return self.source.get_mut();
        }
        match self.policy {
            OutOfBoundsPolicy::Value(_) | OutOfBoundsPolicy::MirrorExpWindow { .. } => {
                &mut self.value
            }
            OutOfBoundsPolicy::Mirror(_) | OutOfBoundsPolicy::Periodic => self.source.get_mut(),
        }
    }
}

impl OutOfBoundsFactory {
    /// Wrap `source` over `interval` with the strategy this factory selects.
    pub fn create<A>(&self, source: A, interval: &impl Interval) -> Result<OutOfBounds<A>>
    where
        A: Positionable + Localizable + Sampler,
        A::Element: RealType,
    {
        OutOfBounds::new(source, interval, self.policy()?)
    }
}

/// Extend a whole image with the strategy selected by `factory`.
pub fn extend<'a, T: RealType, L: Layout>(
    img: &'a Img<T, L>,
    factory: &OutOfBoundsFactory,
) -> Result<OutOfBounds<ImgRandomAccess<'a, T, L>>> {
    factory.create(img.random_access(), img)
}

/// Extend a whole image with a constant.
pub fn extend_value<'a, T: RealType, L: Layout>(
    img: &'a Img<T, L>,
    value: T,
) -> Result<OutOfBounds<ImgRandomAccess<'a, T, L>>> {
    OutOfBounds::new(img.random_access(), img, OutOfBoundsPolicy::Value(value))
}
