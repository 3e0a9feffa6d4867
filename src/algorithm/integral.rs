use crate::algorithm::{Algorithm, OutputAlgorithm, RunState, impl_run_state_traits};
use crate::img::{AnyImg, Img, ImgFactory, Layout};
use crate::space::{Cursor, EuclideanSpace, Positionable, Sampler, SamplerMut};
use crate::types::RealType;
use crate::{ImgError, Result};
use itertools::Itertools;

const NAME: &str = "IntegralImage";

/// Summed area table. The output is one element larger than the input in every dimension; the
/// element at `p` holds the sum of all input elements at positions strictly below `p` in every
/// dimension, so the first row (plane, ...) in each dimension is zero.
pub struct IntegralImage<'a, T, L> {
    input: &'a Img<T, L>,
    factory: ImgFactory<f64>,
    output: Option<AnyImg<f64>>,
    state: RunState,
}

impl<'a, T: RealType, L: Layout> IntegralImage<'a, T, L> {
    pub fn new(input: &'a Img<T, L>) -> Self {
        Self {
            input,
            factory: ImgFactory::default(),
            output: None,
            state: RunState::new(),
        }
    }

    pub fn with_factory(mut self, factory: ImgFactory<f64>) -> Self {
        self.factory = factory;
        self
    }
}

impl<T: RealType, L: Layout> Algorithm for IntegralImage<'_, T, L> {
    fn check_input(&mut self) -> bool {
        self.state.check(NAME, Ok(()))
    }

    fn process(&mut self) -> bool {
        self.output = self
            .state
            .run(NAME, |_| compute(self.input, &self.factory));
        self.output.is_some()
    }

    fn error_message(&self) -> &str {
        &self.state.error
    }
}

impl<T: RealType, L: Layout> OutputAlgorithm<AnyImg<f64>> for IntegralImage<'_, T, L> {
    fn result(&self) -> Option<&AnyImg<f64>> {
        self.output.as_ref()
    }

    fn into_result(self) -> Option<AnyImg<f64>> {
        self.output
    }
}

impl_run_state_traits!(['a, T, L] IntegralImage<'a, T, L>);

fn compute<T: RealType, L: Layout>(
    input: &Img<T, L>,
    factory: &ImgFactory<f64>,
) -> Result<AnyImg<f64>> {
    let dimensions = input.dimensions().iter().map(|e| e + 1).collect::<Vec<_>>();
    let mut output = factory.create(&dimensions)?;

    {
        let ones = vec![1; dimensions.len()];
        let mut ra = output.random_access_mut();
        let mut cursor = input.localizing_cursor();
        while cursor.has_next() {
            cursor.fwd()?;
            ra.set_position(cursor.position());
            ra.move_by(&ones);
            *ra.try_get_mut()? = cursor.get().real_double();
        }
    }

    for d in 0..dimensions.len() {
        let extent = dimensions[d];
        let mut ra = output.random_access_mut();
        let starts = dimensions
            .iter()
            .enumerate()
            .map(|(k, &e)| if k == d { 0..1 } else { 0..e as i64 })
            .multi_cartesian_product();

        for start in starts {
            ra.set_position(&start);
            let mut sum = 0.0;
            for _ in 1..extent {
                ra.fwd(d);
                let v = ra.get_mut();
                sum += *v;
                *v = sum;
            }
        }
    }

    Ok(output)
}

/// The sum of the input elements in the box starting at `min` with extent `size`, read from an
/// integral image with four (in 2D, `2ⁿ` in general) lookups.
pub fn box_sum<L: Layout>(integral: &Img<f64, L>, min: &[i64], size: &[usize]) -> Result<f64> {
    let n = integral.num_dimensions();
    if min.len() != n || size.len() != n {
        return Err(ImgError::dimension_mismatch(
            "box",
            n,
            min.len().min(size.len()),
        ));
    }

    let mut ra = integral.random_access();
    let mut total = 0.0;
    for corner in 0..(1usize << n) {
        let mut lows = 0;
        for d in 0..n {
            if corner & (1 << d) != 0 {
                ra.set_position_dim(min[d] + size[d] as i64, d);
            } else {
                ra.set_position_dim(min[d], d);
                lows += 1;
            }
        }
        let v = *ra.try_get()?;
        if lows % 2 == 0 {
            total += v;
        } else {
            total -= v;
        }
    }
    Ok(total)
}
