use crate::algorithm::{Algorithm, OutputAlgorithm, RunState, impl_run_state_traits};
use crate::img::{AnyImg, ArrayImg, Img, ImgFactory, Layout};
use crate::multithreading::{divide_into_chunks, run_chunks};
use crate::outofbounds::OutOfBoundsFactory;
use crate::space::{Cursor, EuclideanSpace, Positionable, Sampler, SamplerMut};
use crate::types::RealType;
use crate::{ImgError, Result};

const NAME: &str = "DirectConvolution";

/// A grid of weights. The element at `extent / 2` in every dimension is aligned with the output
/// position, so an output element is `Σ input(x + k - radius) * weight(k)` over all kernel
/// positions `k`.
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    weights: ArrayImg<f64>,
}

#[derive(Debug, Clone)]
struct Tap {
    offset: Vec<i64>,
    weight: f64,
}

impl Kernel {
    pub fn new(weights: ArrayImg<f64>) -> Self {
        Self { weights }
    }

    /// Build a kernel from weights ordered with dimension 0 fastest.
    pub fn from_vec(dimensions: &[usize], weights: Vec<f64>) -> Result<Self> {
        Ok(Self::new(ArrayImg::from_vec(dimensions, weights)?))
    }

    /// A kernel of extent 1 in every dimension except `d`, for separable filters.
    ///
    /// # Arguments
    ///
    /// * `weights`: the weights along dimension `d`
    /// * `d`: the dimension the kernel runs along
    /// * `num_dimensions`: the dimensionality of the images it will be applied to
    ///
    /// returns: Result<Kernel, ImgError>
    pub fn line(weights: Vec<f64>, d: usize, num_dimensions: usize) -> Result<Self> {
        if d >= num_dimensions {
            return Err(ImgError::InvalidDimension(format!(
                "line kernel along dimension {d} of a {num_dimensions}-dimensional space"
            )));
        }
        let mut dimensions = vec![1; num_dimensions];
        dimensions[d] = weights.len();
        Self::from_vec(&dimensions, weights)
    }

    pub fn weights(&self) -> &ArrayImg<f64> {
        &self.weights
    }

    pub fn radii(&self) -> Vec<i64> {
        self.weights
            .dimensions()
            .iter()
            .map(|&e| (e / 2) as i64)
            .collect()
    }

    pub fn sum(&self) -> f64 {
        self.weights.iter().sum()
    }

    /// A copy scaled to sum to one. A kernel summing to zero is returned unchanged.
    pub fn normalized(&self) -> Kernel {
        let mut k = self.clone();
        let sum = self.sum();
        if sum.abs() > f64::EPSILON {
            k.weights.iter_mut().for_each(|w| *w /= sum);
        }
        k
    }

    fn taps(&self) -> Result<Vec<Tap>> {
        let radii = self.radii();
        let mut cursor = self.weights.localizing_cursor();
        let mut taps = Vec::new();
        while cursor.has_next() {
            cursor.fwd()?;
            let weight = *cursor.get();
            if weight != 0.0 {
                let offset = cursor
                    .position()
                    .iter()
                    .zip(&radii)
                    .map(|(p, r)| p - r)
                    .collect();
                taps.push(Tap { offset, weight });
            }
        }
        Ok(taps)
    }
}

impl EuclideanSpace for Kernel {
    fn num_dimensions(&self) -> usize {
        self.weights.num_dimensions()
    }
}

/// Direct (spatial domain) convolution of an image with one or more kernels applied one after
/// another, reading beyond the image edges through an out-of-bounds strategy.
pub struct DirectConvolution<'a, T, L, O> {
    input: &'a Img<T, L>,
    kernels: Vec<Kernel>,
    normalize: bool,
    out_of_bounds: OutOfBoundsFactory,
    factory: ImgFactory<O>,
    output: Option<AnyImg<O>>,
    state: RunState,
}

impl<'a, T: RealType, L: Layout, O: RealType> DirectConvolution<'a, T, L, O> {
    /// Convolve `input` with every kernel of `kernels` in turn. By default the kernels are used
    /// as given and the image is extended by single mirroring.
    pub fn new(input: &'a Img<T, L>, kernels: Vec<Kernel>) -> Self {
        Self {
            input,
            kernels,
            normalize: false,
            out_of_bounds: OutOfBoundsFactory::MirrorSingle,
            factory: ImgFactory::default(),
            output: None,
            state: RunState::new(),
        }
    }

    /// Scale each kernel to sum to one before use.
    pub fn with_normalization(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    pub fn with_out_of_bounds(mut self, out_of_bounds: OutOfBoundsFactory) -> Self {
        self.out_of_bounds = out_of_bounds;
        self
    }

    pub fn with_factory(mut self, factory: ImgFactory<O>) -> Self {
        self.factory = factory;
        self
    }
}

impl<T: RealType, L: Layout, O: RealType> Algorithm for DirectConvolution<'_, T, L, O> {
    fn check_input(&mut self) -> bool {
        let result = validate(self.input, &self.kernels, &self.out_of_bounds);
        self.state.check(NAME, result)
    }

    fn process(&mut self) -> bool {
        self.output = self.state.run(NAME, |threads| {
            validate(self.input, &self.kernels, &self.out_of_bounds)?;
            let taps = self
                .kernels
                .iter()
                .map(|k| if self.normalize { k.normalized().taps() } else { k.taps() })
                .collect::<Result<Vec<_>>>()?;

            let mut current = apply(
                self.input,
                &taps[0],
                &self.out_of_bounds,
                &self.factory,
                threads,
            )?;
            for t in &taps[1..] {
                current = apply(&current, t, &self.out_of_bounds, &self.factory, threads)?;
            }
            Ok(current)
        });
        self.output.is_some()
    }

    fn error_message(&self) -> &str {
        &self.state.error
    }
}

impl<T: RealType, L: Layout, O: RealType> OutputAlgorithm<AnyImg<O>>
    for DirectConvolution<'_, T, L, O>
{
    fn result(&self) -> Option<&AnyImg<O>> {
        self.output.as_ref()
    }

    fn into_result(self) -> Option<AnyImg<O>> {
        self.output
    }
}

impl_run_state_traits!(['a, T, L, O] DirectConvolution<'a, T, L, O>);

fn validate<T, L: Layout>(
    input: &Img<T, L>,
    kernels: &[Kernel],
    out_of_bounds: &OutOfBoundsFactory,
) -> Result<()> {
    if kernels.is_empty() {
        return Err(ImgError::ComputationFailure("no kernel is set".into()));
    }
    let n = input.num_dimensions();
    for k in kernels {
        if k.num_dimensions() != n {
            return Err(ImgError::dimension_mismatch("kernel", n, k.num_dimensions()));
        }
    }
    out_of_bounds.policy::<f64>().map(|_| ())
}

/// One pass of a single kernel from `source` into a new image.
fn apply<S: RealType, L: Layout, O: RealType>(
    source: &Img<S, L>,
    taps: &[Tap],
    out_of_bounds: &OutOfBoundsFactory,
    factory: &ImgFactory<O>,
    num_threads: usize,
) -> Result<AnyImg<O>> {
    let n = source.num_dimensions();
    let mut output = factory.create(source.dimensions())?;
    let chunks = divide_into_chunks(output.num_elements(), num_threads);
    let cursors = output.chunk_cursors_mut(&chunks)?;

    run_chunks(num_threads, cursors, |_, mut cursor| {
        let mut ra = out_of_bounds.create(source.random_access(), source)?;
        let mut p = vec![0; n];
        while cursor.has_next() {
            cursor.fwd()?;
            let mut sum = 0.0;
            for tap in taps {
                for (d, v) in p.iter_mut().enumerate() {
                    *v = cursor.position()[d] + tap.offset[d];
                }
                ra.set_position(&p);
                sum += ra.get().real_double() * tap.weight;
            }
            cursor.get_mut().set_real(sum);
        }
        Ok(())
    })?;

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::MultiThreaded;
    use approx::assert_relative_eq;

    fn convolve<T: RealType>(
        img: &ArrayImg<T>,
        kernels: Vec<Kernel>,
        oob: OutOfBoundsFactory,
    ) -> AnyImg<f64> {
        let mut c = DirectConvolution::new(img, kernels).with_out_of_bounds(oob);
        assert!(c.check_input(), "{}", c.error_message());
        assert!(c.process(), "{}", c.error_message());
        c.into_result().unwrap()
    }

    #[test]
    fn box_filter_with_zero_extension() -> Result<()> {
        let img = ArrayImg::from_vec(&[5], vec![0.0, 0.0, 3.0, 0.0, 0.0])?;
        let k = Kernel::from_vec(&[3], vec![1.0, 1.0, 1.0])?.normalized();
        let out = convolve(&img, vec![k], OutOfBoundsFactory::default());
        let expected = [0.0, 1.0, 1.0, 1.0, 0.0];
        for (v, e) in out.iter().zip(expected) {
            assert_relative_eq!(*v, e, epsilon = 1e-12);
        }
        Ok(())
    }

    #[test]
    fn kernel_orientation() -> Result<()> {
        let img = ArrayImg::from_vec(&[4], vec![1.0f32, 2.0, 3.0, 4.0])?;
        let k = Kernel::from_vec(&[3], vec![0.0, 0.0, 1.0])?;
        let out = convolve(&img, vec![k], OutOfBoundsFactory::default());
        assert_eq!(out.data(), &[2.0, 3.0, 4.0, 0.0]);
        Ok(())
    }

    #[test]
    fn mirror_keeps_constant_images_constant() -> Result<()> {
        let img = ArrayImg::from_vec(&[4, 3], vec![7u8; 12])?;
        let k = Kernel::from_vec(&[3, 3], vec![1.0; 9])?;
        let mut c = DirectConvolution::<_, _, u8>::new(&img, vec![k]).with_normalization(true);
        c.set_num_threads(2);
        assert!(c.process());
        assert!(c.result().unwrap().iter().all(|&v| v == 7));
        Ok(())
    }

    #[test]
    fn separable_matches_full_kernel() -> Result<()> {
        let data = (0..30).map(|i| ((i * 7) % 11) as f64).collect();
        let img = ArrayImg::from_vec(&[6, 5], data)?;

        let full = Kernel::from_vec(&[3, 3], vec![1.0, 2.0, 1.0, 2.0, 4.0, 2.0, 1.0, 2.0, 1.0])?;
        let rows = Kernel::line(vec![1.0, 2.0, 1.0], 0, 2)?;
        let cols = Kernel::line(vec![1.0, 2.0, 1.0], 1, 2)?;

        let a = convolve(&img, vec![full], OutOfBoundsFactory::Periodic);
        let b = convolve(&img, vec![rows, cols], OutOfBoundsFactory::Periodic);
        for (x, y) in a.iter().zip(b.iter()) {
            assert_relative_eq!(*x, *y, epsilon = 1e-9);
        }
        Ok(())
    }

    #[test]
    fn dimensionality_mismatch() -> Result<()> {
        let img = ArrayImg::<f32>::new(&[4, 4])?;
        let k = Kernel::from_vec(&[3], vec![1.0; 3])?;
        let mut c = DirectConvolution::<_, _, f32>::new(&img, vec![k]);
        assert!(!c.check_input());
        assert!(c.error_message().contains("kernel has 1 dimensions, expected 2"));
        assert!(!c.process());
        Ok(())
    }

    #[test]
    fn no_kernel() -> Result<()> {
        let img = ArrayImg::<f32>::new(&[4])?;
        let mut c = DirectConvolution::<_, _, f32>::new(&img, Vec::new());
        assert!(!c.check_input());
        Ok(())
    }

    #[test]
    fn line_kernel_dimension_checked() {
        assert!(Kernel::line(vec![1.0], 2, 2).is_err());
    }

    #[test]
    fn normalization() -> Result<()> {
        let k = Kernel::from_vec(&[2, 2], vec![1.0, 1.0, 1.0, 1.0])?.normalized();
        assert_relative_eq!(k.sum(), 1.0);
        assert_eq!(k.radii(), vec![1, 1]);

        let zero = Kernel::from_vec(&[3], vec![-1.0, 0.0, 1.0])?;
        assert_eq!(zero.normalized(), zero);
        Ok(())
    }
}
