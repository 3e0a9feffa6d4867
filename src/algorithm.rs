//! Algorithms built on the accessor layer. They follow a check-then-run pattern: a driver calls
//! `check_input()` before committing any threads, then `process()`, and inspects
//! `error_message()` if either returned false. Internally each step is a `Result` and the
//! message is the display of the first error.
//!
//! Parallel algorithms split their output's linear index range with `divide_into_chunks` and
//! write each chunk through its own chunk cursor, so workers never share a mutable element.

mod canvas;
mod convolution;
mod diffusion_tensor;
mod gradient;
mod integral;

pub use canvas::CanvasImage;
pub use convolution::{DirectConvolution, Kernel};
pub use diffusion_tensor::{IsotropicDiffusionTensor, tensor_components};
pub use gradient::Gradient;
pub use integral::{IntegralImage, box_sum};

use crate::Result;
use crate::multithreading::default_num_threads;
use std::time::{Duration, Instant};

pub trait Algorithm {
    /// Validate the configuration without doing any work.
    fn check_input(&mut self) -> bool;

    /// Run the algorithm. Returns false on failure, with the reason in `error_message()`.
    fn process(&mut self) -> bool;

    /// The reason for the last failure, empty if nothing failed.
    fn error_message(&self) -> &str;
}

pub trait MultiThreaded {
    fn set_num_threads(&mut self, num_threads: usize);

    fn num_threads(&self) -> usize;
}

pub trait Benchmark {
    /// Wall time of the last successful `process()`.
    fn processing_time(&self) -> Duration;
}

pub trait OutputAlgorithm<O>: Algorithm {
    /// The output of the last `process()`, if it succeeded.
    fn result(&self) -> Option<&O>;

    fn into_result(self) -> Option<O>;
}

/// Thread count, timing and error bookkeeping shared by the algorithms.
#[derive(Debug, Clone)]
pub(crate) struct RunState {
    pub(crate) num_threads: usize,
    pub(crate) processing_time: Duration,
    pub(crate) error: String,
}

impl RunState {
    pub(crate) fn new() -> Self {
        Self {
            num_threads: default_num_threads(),
            processing_time: Duration::ZERO,
            error: String::new(),
        }
    }

    /// Record the outcome of an input check.
    pub(crate) fn check(&mut self, name: &str, result: Result<()>) -> bool {
        match result {
            Ok(()) => {
                self.error.clear();
                true
            }
            Err(e) => {
                log::debug!("{name}: input rejected: {e}");
                self.error = format!("[{name}] {e}");
                false
            }
        }
    }

    /// Time `f`, recording the outcome. Returns the output of `f` if it succeeded.
    pub(crate) fn run<R, F>(&mut self, name: &str, f: F) -> Option<R>
    where
        F: FnOnce(usize) -> Result<R>,
    {
        let start = Instant::now();
        log::debug!("{name}: starting on {} thread(s)", self.num_threads);
        match f(self.num_threads) {
            Ok(output) => {
                self.processing_time = start.elapsed();
                self.error.clear();
                log::debug!("{name}: finished in {:?}", self.processing_time);
                Some(output)
            }
            Err(e) => {
                log::warn!("{name}: failed: {e}");
                self.error = format!("[{name}] {e}");
                None
            }
        }
    }
}

/// `MultiThreaded` and `Benchmark` for an algorithm holding a `RunState` in `self.state`.
macro_rules! impl_run_state_traits {
    ([$($generics:tt)*] $t:ty) => {
        impl<$($generics)*> $crate::algorithm::MultiThreaded for $t {
            fn set_num_threads(&mut self, num_threads: usize) {
                self.state.num_threads = num_threads.max(1);
            }

            fn num_threads(&self) -> usize {
                self.state.num_threads
            }
        }

        impl<$($generics)*> $crate::algorithm::Benchmark for $t {
            fn processing_time(&self) -> std::time::Duration {
                self.state.processing_time
            }
        }
    };
}

pub(crate) use impl_run_state_traits;
