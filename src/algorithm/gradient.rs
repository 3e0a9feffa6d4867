use crate::algorithm::{Algorithm, OutputAlgorithm, RunState, impl_run_state_traits};
use crate::img::{AnyImg, Img, ImgFactory, Layout};
use crate::multithreading::{divide_into_chunks, run_chunks};
use crate::outofbounds::extend_value;
use crate::space::{Cursor, EuclideanSpace, Localizable, Positionable, Sampler, SamplerMut};
use crate::types::RealType;
use crate::{ImgError, Result};

const NAME: &str = "Gradient";

/// Forward difference gradient, `value(x) - value(x + e_d)` for every selected dimension `d`,
/// reading zero beyond the image edge.
///
/// The output has one more dimension than the input, of extent `n`. Along it the components are
/// stored in order of the selected dimensions; slots past the last selected dimension stay zero.
pub struct Gradient<'a, T, L> {
    input: &'a Img<T, L>,
    do_dimension: Vec<bool>,
    factory: ImgFactory<f32>,
    output: Option<AnyImg<f32>>,
    state: RunState,
}

impl<'a, T: RealType, L: Layout> Gradient<'a, T, L> {
    /// # Arguments
    ///
    /// * `input`: the image to differentiate
    /// * `do_dimension`: one flag per input dimension, true to compute that component
    pub fn new(input: &'a Img<T, L>, do_dimension: Vec<bool>) -> Self {
        Self {
            input,
            do_dimension,
            factory: ImgFactory::default(),
            output: None,
            state: RunState::new(),
        }
    }

    /// Use `factory` to create the output image.
    pub fn with_factory(mut self, factory: ImgFactory<f32>) -> Self {
        self.factory = factory;
        self
    }
}

impl<T: RealType, L: Layout> Algorithm for Gradient<'_, T, L> {
    fn check_input(&mut self) -> bool {
        let result = validate(self.input, &self.do_dimension);
        self.state.check(NAME, result)
    }

    fn process(&mut self) -> bool {
        self.output = self.state.run(NAME, |threads| {
            compute(self.input, &self.do_dimension, &self.factory, threads)
        });
        self.output.is_some()
    }

    fn error_message(&self) -> &str {
        &self.state.error
    }
}

impl<T: RealType, L: Layout> OutputAlgorithm<AnyImg<f32>> for Gradient<'_, T, L> {
    fn result(&self) -> Option<&AnyImg<f32>> {
        self.output.as_ref()
    }

    fn into_result(self) -> Option<AnyImg<f32>> {
        self.output
    }
}

impl_run_state_traits!(['a, T, L] Gradient<'a, T, L>);

fn validate<T, L: Layout>(input: &Img<T, L>, do_dimension: &[bool]) -> Result<()> {
    let n = input.num_dimensions();
    if do_dimension.len() != n {
        return Err(ImgError::dimension_mismatch(
            "dimension selection",
            n,
            do_dimension.len(),
        ));
    }
    Ok(())
}

fn compute<T: RealType, L: Layout>(
    input: &Img<T, L>,
    do_dimension: &[bool],
    factory: &ImgFactory<f32>,
    num_threads: usize,
) -> Result<AnyImg<f32>> {
    validate(input, do_dimension)?;

    let n = input.num_dimensions();
    let enabled = (0..n).filter(|&d| do_dimension[d]).collect::<Vec<_>>();
    let mut dimensions = input.dimensions().to_vec();
    dimensions.push(n);

    let mut output = factory.create(&dimensions)?;
    let chunks = divide_into_chunks(output.num_elements(), num_threads);
    let cursors = output.chunk_cursors_mut(&chunks)?;

    run_chunks(num_threads, cursors, |_, mut cursor| {
        let mut neighbor = extend_value(input, T::zero())?;
        while cursor.has_next() {
            cursor.fwd()?;
            let component = cursor.long_position(n) as usize;
            let value = match enabled.get(component) {
                Some(&d) => {
                    neighbor.set_position(&cursor.position()[..n]);
                    let central = neighbor.get().real_float();
                    neighbor.fwd(d);
                    central - neighbor.get().real_float()
                }
                None => 0.0,
            };
            *cursor.get_mut() = value;
        }
        Ok(())
    })?;

    Ok(output)
}
