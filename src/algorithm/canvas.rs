use crate::algorithm::{Algorithm, OutputAlgorithm, RunState, impl_run_state_traits};
use crate::img::{AnyImg, Img, ImgFactory, Layout, validate_dimensions};
use crate::multithreading::{divide_into_chunks, run_chunks};
use crate::outofbounds::OutOfBoundsFactory;
use crate::space::{Cursor, EuclideanSpace, Positionable, Sampler, SamplerMut};
use crate::types::RealType;
use crate::{ImgError, Result};

const NAME: &str = "CanvasImage";

/// Places an image centered on a canvas of a different size. Canvas positions which do not
/// fall on the input are filled through an out-of-bounds strategy; a smaller canvas crops.
pub struct CanvasImage<'a, T, L> {
    input: &'a Img<T, L>,
    new_size: Vec<usize>,
    out_of_bounds: OutOfBoundsFactory,
    factory: ImgFactory<T>,
    output: Option<AnyImg<T>>,
    state: RunState,
}

impl<'a, T: RealType, L: Layout> CanvasImage<'a, T, L> {
    /// By default the margin is filled with zero.
    pub fn new(input: &'a Img<T, L>, new_size: &[usize]) -> Self {
        Self {
            input,
            new_size: new_size.to_vec(),
            out_of_bounds: OutOfBoundsFactory::default(),
            factory: ImgFactory::default(),
            output: None,
            state: RunState::new(),
        }
    }

    pub fn with_out_of_bounds(mut self, out_of_bounds: OutOfBoundsFactory) -> Self {
        self.out_of_bounds = out_of_bounds;
        self
    }

    pub fn with_factory(mut self, factory: ImgFactory<T>) -> Self {
        self.factory = factory;
        self
    }

    /// The canvas position of the input's origin, `(new - old) / 2` rounded towards zero in
    /// every dimension.
    pub fn offset(&self) -> Vec<i64> {
        canvas_offset(self.input.dimensions(), &self.new_size)
    }
}

impl<T: RealType, L: Layout> Algorithm for CanvasImage<'_, T, L> {
    fn check_input(&mut self) -> bool {
        let result = validate(self.input, &self.new_size, &self.out_of_bounds);
        self.state.check(NAME, result)
    }

    fn process(&mut self) -> bool {
        self.output = self.state.run(NAME, |threads| {
            compute(
                self.input,
                &self.new_size,
                &self.out_of_bounds,
                &self.factory,
                threads,
            )
        });
        self.output.is_some()
    }

    fn error_message(&self) -> &str {
        &self.state.error
    }
}

impl<T: RealType, L: Layout> OutputAlgorithm<AnyImg<T>> for CanvasImage<'_, T, L> {
    fn result(&self) -> Option<&AnyImg<T>> {
        self.output.as_ref()
    }

    fn into_result(self) -> Option<AnyImg<T>> {
        self.output
    }
}

impl_run_state_traits!(['a, T, L] CanvasImage<'a, T, L>);

fn canvas_offset(old: &[usize], new: &[usize]) -> Vec<i64> {
    old.iter()
        .zip(new)
        .map(|(&o, &n)| (n as i64 - o as i64) / 2)
        .collect()
}

fn validate<T, L: Layout>(
    input: &Img<T, L>,
    new_size: &[usize],
    out_of_bounds: &OutOfBoundsFactory,
) -> Result<()> {
    let n = input.num_dimensions();
    if new_size.len() != n {
        return Err(ImgError::dimension_mismatch("canvas size", n, new_size.len()));
    }
    validate_dimensions(new_size)?;
    out_of_bounds.policy::<f64>().map(|_| ())
}

fn compute<T: RealType, L: Layout>(
    input: &Img<T, L>,
    new_size: &[usize],
    out_of_bounds: &OutOfBoundsFactory,
    factory: &ImgFactory<T>,
    num_threads: usize,
) -> Result<AnyImg<T>> {
    validate(input, new_size, out_of_bounds)?;
    let offset = canvas_offset(input.dimensions(), new_size);

    let mut output = factory.create(new_size)?;
    let chunks = divide_into_chunks(output.num_elements(), num_threads);
    let cursors = output.chunk_cursors_mut(&chunks)?;

    run_chunks(num_threads, cursors, |_, mut cursor| {
        let mut ra = out_of_bounds.create(input.random_access(), input)?;
        let mut p = vec![0; offset.len()];
        while cursor.has_next() {
            cursor.fwd()?;
            for (d, v) in p.iter_mut().enumerate() {
                *v = cursor.position()[d] - offset[d];
            }
            ra.set_position(&p);
            *cursor.get_mut() = *ra.get();
        }
        Ok(())
    })?;

    Ok(output)
}
