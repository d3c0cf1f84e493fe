//! Worker pool used to fan split search out over features.
//!
//! A [`WorkerPool`] runs a batch of independent closures to completion and
//! returns control to the caller only once every one of them has finished.
//! Workers typically pull their work from a shared [`WorkQueue`] and push
//! results into a [`ResultBag`], so the thread count never has to divide the
//! amount of work evenly.

use crate::core::error::{GbmError, Result};
use std::collections::VecDeque;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

/// A unit of work handed to [`WorkerPool::run`].
pub type Worker<'a> = Box<dyn FnOnce() + Send + 'a>;

/// Fixed-size pool that runs batches of workers and blocks until all return.
///
/// A pool with a single thread runs workers inline on the calling thread in
/// submission order, which keeps single-threaded training free of any
/// scheduling effects.
pub struct WorkerPool {
    num_threads: usize,
    pool: Option<rayon::ThreadPool>,
}

impl WorkerPool {
    /// Creates a pool with `num_threads` worker threads.
    pub fn new(num_threads: usize) -> Result<Self> {
        if num_threads == 0 {
            return Err(GbmError::invalid_parameter(
                "num_threads",
                num_threads.to_string(),
                "must be at least 1",
            ));
        }

        if num_threads == 1 {
            return Ok(Self::single_threaded());
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .thread_name(|index| format!("gbm-worker-{}", index))
            .build()
            .map_err(|e| GbmError::threading(format!("failed to build worker pool: {}", e)))?;

        log::debug!("Created worker pool with {} threads", num_threads);

        Ok(WorkerPool {
            num_threads,
            pool: Some(pool),
        })
    }

    /// Creates a pool that executes workers on the calling thread.
    pub fn single_threaded() -> Self {
        WorkerPool {
            num_threads: 1,
            pool: None,
        }
    }

    /// Number of threads workers are spread over.
    pub fn num_threads(&self) -> usize {
        self.num_threads
    }

    /// Runs every worker to completion.
    ///
    /// Blocks until all workers have returned. When panics unwind, a
    /// panicking worker does not take the other workers down; once the batch
    /// has joined, the panic is reported as [`GbmError::Threading`]. Builds
    /// with `panic = "abort"` (the release profile) abort the process instead.
    pub fn run<'a>(&self, workers: Vec<Worker<'a>>) -> Result<()> {
        let failures = AtomicUsize::new(0);
        let total = workers.len();

        match &self.pool {
            None => {
                for worker in workers {
                    if panic::catch_unwind(AssertUnwindSafe(worker)).is_err() {
                        failures.fetch_add(1, Ordering::SeqCst);
                    }
                }
            }
            Some(pool) => {
                let failures = &failures;
                pool.scope(move |scope| {
                    for worker in workers {
                        scope.spawn(move |_| {
                            if panic::catch_unwind(AssertUnwindSafe(worker)).is_err() {
                                failures.fetch_add(1, Ordering::SeqCst);
                            }
                        });
                    }
                });
            }
        }

        match failures.into_inner() {
            0 => Ok(()),
            failed => Err(GbmError::threading(format!(
                "{} of {} workers panicked",
                failed, total
            ))),
        }
    }
}

impl fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerPool")
            .field("num_threads", &self.num_threads)
            .field("inline", &self.pool.is_none())
            .finish()
    }
}

/// Shared FIFO that workers drain until it is empty.
#[derive(Debug)]
pub struct WorkQueue<T> {
    items: Mutex<VecDeque<T>>,
}

impl<T> WorkQueue<T> {
    /// Creates a queue holding `items` in iteration order.
    pub fn new<I: IntoIterator<Item = T>>(items: I) -> Self {
        WorkQueue {
            items: Mutex::new(items.into_iter().collect()),
        }
    }

    /// Takes the next item, or `None` once the queue is drained.
    pub fn pop(&self) -> Option<T> {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
    }

    /// Number of items still waiting.
    pub fn len(&self) -> usize {
        self.items.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// True when no items are waiting.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Append-only, thread-safe result collection.
#[derive(Debug)]
pub struct ResultBag<T> {
    items: Mutex<Vec<T>>,
}

impl<T> ResultBag<T> {
    /// Creates an empty bag.
    pub fn new() -> Self {
        ResultBag {
            items: Mutex::new(Vec::new()),
        }
    }

    /// Appends one result.
    pub fn push(&self, item: T) {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(item);
    }

    /// Consumes the bag and returns everything pushed, in arrival order.
    pub fn into_vec(self) -> Vec<T> {
        self.items.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> Default for ResultBag<T> {
    fn default() -> Self {
        Self::new()
    }
}
