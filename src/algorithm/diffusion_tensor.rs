use crate::algorithm::{Algorithm, OutputAlgorithm, RunState, impl_run_state_traits};
use crate::img::{AnyImg, ImgFactory, validate_dimensions};
use crate::multithreading::{divide_into_chunks, run_chunks};
use crate::space::{Cursor, Localizable, SamplerMut};
use crate::Result;

const NAME: &str = "IsotropicDiffusionTensor";

/// The number of independent components of a symmetric tensor in `n` dimensions.
pub fn tensor_components(n: usize) -> usize {
    n * (n + 1) / 2
}

/// A diffusion tensor field which is the same scalar multiple of the identity everywhere. The
/// output has the requested dimensions plus one of extent `tensor_components(n)`; the first `n`
/// components along it are the diagonal.
pub struct IsotropicDiffusionTensor {
    dimensions: Vec<usize>,
    value: f32,
    factory: ImgFactory<f32>,
    output: Option<AnyImg<f32>>,
    state: RunState,
}

impl IsotropicDiffusionTensor {
    pub fn new(dimensions: &[usize], value: f32) -> Self {
        Self {
            dimensions: dimensions.to_vec(),
            value,
            factory: ImgFactory::default(),
            output: None,
            state: RunState::new(),
        }
    }

    pub fn with_factory(mut self, factory: ImgFactory<f32>) -> Self {
        self.factory = factory;
        self
    }
}

impl Algorithm for IsotropicDiffusionTensor {
    fn check_input(&mut self) -> bool {
        let result = validate_dimensions(&self.dimensions).map(|_| ());
        self.state.check(NAME, result)
    }

    fn process(&mut self) -> bool {
        self.output = self.state.run(NAME, |threads| {
            compute(&self.dimensions, self.value, &self.factory, threads)
        });
        self.output.is_some()
    }

    fn error_message(&self) -> &str {
        &self.state.error
    }
}

impl OutputAlgorithm<AnyImg<f32>> for IsotropicDiffusionTensor {
    fn result(&self) -> Option<&AnyImg<f32>> {
        self.output.as_ref()
    }

    fn into_result(self) -> Option<AnyImg<f32>> {
        self.output
    }
}

impl_run_state_traits!([] IsotropicDiffusionTensor);

fn compute(
    dimensions: &[usize],
    value: f32,
    factory: &ImgFactory<f32>,
    num_threads: usize,
) -> Result<AnyImg<f32>> {
    validate_dimensions(dimensions)?;
    let n = dimensions.len();
    let mut tensor_dims = dimensions.to_vec();
    tensor_dims.push(tensor_components(n));

    let mut output = factory.create(&tensor_dims)?;
    let chunks = divide_into_chunks(output.num_elements(), num_threads);
    let cursors = output.chunk_cursors_mut(&chunks)?;

    run_chunks(num_threads, cursors, |_, mut cursor| {
        while cursor.has_next() {
            cursor.fwd()?;
            let diagonal = (cursor.long_position(n) as usize) < n;
            *cursor.get_mut() = if diagonal { value } else { 0.0 };
        }
        Ok(())
    })?;

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::MultiThreaded;
    use test_case::test_case;

    #[test_case(1, 1)]
    #[test_case(2, 3)]
    #[test_case(3, 6)]
    fn component_count(n: usize, expected: usize) {
        assert_eq!(tensor_components(n), expected);
    }

    #[test_case(1)]
    #[test_case(4)]
    #[test_case(7)]
    fn diagonal_filled(threads: usize) {
        let mut t = IsotropicDiffusionTensor::new(&[5, 3, 2], 2.5);
        t.set_num_threads(threads);
        assert!(t.check_input());
        assert!(t.process(), "{}", t.error_message());

        let out = t.into_result().unwrap();
        assert_eq!(out.dimensions(), &[5, 3, 2, 6]);
        for (i, v) in out.iter().enumerate() {
            let p = out.localize_index(i).unwrap();
            let expected = if p[3] < 3 { 2.5 } else { 0.0 };
            assert_eq!(*v, expected);
        }
    }

    #[test]
    fn zero_extent_rejected() {
        let mut t = IsotropicDiffusionTensor::new(&[4, 0], 1.0);
        assert!(!t.check_input());
        assert!(!t.process());
        assert!(t.error_message().contains("invalid dimension"));
    }
}
