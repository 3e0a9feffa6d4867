//! Tools for splitting a container's linear index range into disjoint chunks and running one
//! worker per chunk. Workers are run on a dedicated `rayon` pool sized to the requested thread
//! count. The call returns once every worker has finished; a failure (an `Err` or a panic) in
//! any worker is reported to the caller, choosing the lowest chunk if several failed.

use crate::{ImgError, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::panic::{AssertUnwindSafe, catch_unwind};

/// A contiguous range of linear indices assigned to a single worker.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// The first linear index of the chunk
    pub start: usize,

    /// The number of elements in the chunk
    pub len: usize,
}

impl Chunk {
    pub fn new(start: usize, len: usize) -> Self {
        Self { start, len }
    }

    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

/// The number of threads used when an algorithm is not told otherwise.
pub fn default_num_threads() -> usize {
    rayon::current_num_threads()
}

/// Divide `total` elements into at most `num_threads` contiguous chunks which cover the full
/// range without gaps or overlaps. When `total` does not divide evenly the first chunks are one
/// element longer than the rest. Empty chunks are never produced, so fewer chunks than threads
/// are returned when there are fewer elements than threads.
///
/// # Arguments
///
/// * `total`: the number of elements to divide
/// * `num_threads`: the desired number of chunks, zero is treated as one
///
/// returns: Vec<Chunk>
///
/// # Examples
///
/// ```
/// use ndimg::multithreading::{divide_into_chunks, Chunk};
/// let chunks = divide_into_chunks(10, 3);
/// assert_eq!(chunks, vec![Chunk::new(0, 4), Chunk::new(4, 3), Chunk::new(7, 3)]);
/// ```
pub fn divide_into_chunks(total: usize, num_threads: usize) -> Vec<Chunk> {
    let n = num_threads.max(1).min(total);
    if n == 0 {
        return Vec::new();
    }

    let base = total / n;
    let extra = total % n;
    let mut chunks = Vec::with_capacity(n);
    let mut start = 0;
    for i in 0..n {
        let len = base + usize::from(i < extra);
        chunks.push(Chunk::new(start, len));
        start += len;
    }

    log::debug!("divided {total} elements into {n} chunks of ~{base}");
    chunks
}

/// Run one worker per item of `work` on a pool of `num_threads` threads and wait for all of
/// them. `f` receives the item's position in `work` along with the item itself.
///
/// A worker which returns an error or panics does not stop the others; once all have joined,
/// the failure of the lowest numbered worker is returned. Panics are converted into
/// `ImgError::ComputationFailure`.
pub fn run_chunks<W, F>(num_threads: usize, work: Vec<W>, f: F) -> Result<()>
where
    W: Send,
    F: Fn(usize, W) -> Result<()> + Sync,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads.max(1))
        .build()
        .map_err(|e| ImgError::ComputationFailure(format!("could not start workers: {e}")))?;

    let results: Vec<Result<()>> = pool.install(|| {
        work.into_par_iter()
            .enumerate()
            .map(|(i, w)| {
                catch_unwind(AssertUnwindSafe(|| f(i, w))).unwrap_or_else(|payload| {
                    Err(ImgError::ComputationFailure(format!(
                        "worker {i} panicked: {}",
                        panic_message(payload.as_ref())
                    )))
                })
            })
            .collect()
    });

    let failures = results.iter().filter(|r| r.is_err()).count();
    match results.into_iter().find_map(|r| r.err()) {
        Some(e) => {
            log::warn!("{failures} worker(s) failed, first failure: {e}");
            Err(e)
        }
        None => Ok(()),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use test_case::test_case;

    #[test_case(100, 4)]
    #[test_case(101, 4)]
    #[test_case(7, 3)]
    #[test_case(3, 8)]
    #[test_case(1, 1)]
    #[test_case(64, 0)]
    fn chunks_cover_without_overlap(total: usize, threads: usize) {
        let chunks = divide_into_chunks(total, threads);
        assert!(chunks.len() <= threads.max(1));
        assert!(chunks.iter().all(|c| c.len > 0));

        let mut next = 0;
        for c in &chunks {
            assert_eq!(c.start, next);
            next = c.end();
        }
        assert_eq!(next, total);

        let longest = chunks.iter().map(|c| c.len).max().unwrap_or(0);
        let shortest = chunks.iter().map(|c| c.len).min().unwrap_or(0);
        assert!(longest - shortest <= 1);
    }

    #[test]
    fn no_chunks_for_nothing() {
        assert!(divide_into_chunks(0, 4).is_empty());
    }

    #[test]
    fn all_workers_run() -> Result<()> {
        let counter = AtomicUsize::new(0);
        run_chunks(3, divide_into_chunks(1000, 7), |_, c| {
            counter.fetch_add(c.len, Ordering::Relaxed);
            Ok(())
        })?;
        assert_eq!(counter.load(Ordering::Relaxed), 1000);
        Ok(())
    }

    #[test]
    fn first_failure_is_surfaced() {
        let result = run_chunks(4, (0..6).collect(), |i, _: i32| {
            if i == 2 || i == 4 {
                Err(ImgError::OutOfRange(format!("worker {i}")))
            } else {
                Ok(())
            }
        });

        match result {
            Err(ImgError::OutOfRange(msg)) => assert_eq!(msg, "worker 2"),
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn panics_become_failures() {
        let result = run_chunks(2, vec![0, 1], |i, _: i32| {
            if i == 1 {
                panic!("boom");
            }
            Ok(())
        });

        match result {
            Err(ImgError::ComputationFailure(msg)) => assert!(msg.contains("boom")),
            other => panic!("unexpected result {other:?}"),
        }
    }
}
