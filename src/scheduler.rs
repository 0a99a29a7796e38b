//! Bounded fan-out of independent fetch-and-persist tasks.
//!
//! A [`WorkerPool`] is built per run and keeps at most `concurrency` tasks in
//! flight. Slots are refilled as soon as any task settles, so one slow request
//! only occupies its own slot.

use std::future::Future;
use std::num::NonZeroUsize;

use futures::{stream, StreamExt};
use log::warn;

use crate::error::{BuildStatsError, Result};

/// Receives progress after every successfully settled task.
///
/// Called synchronously from the scheduling loop, so implementations must
/// return quickly.
pub trait DownloadObserver: Send + Sync {
    fn on_progress(&self, completed: usize, total: usize);
}

/// Observer used when the caller is not interested in progress.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl DownloadObserver for NoopObserver {
    fn on_progress(&self, _completed: usize, _total: usize) {}
}

#[derive(Debug, Clone, Copy)]
pub struct WorkerPool {
    concurrency: NonZeroUsize,
}

impl WorkerPool {
    pub fn new(concurrency: NonZeroUsize) -> Self {
        Self { concurrency }
    }

    /// Drives every task to completion and returns their outputs in
    /// completion order. Tasks are pulled from the iterator only as slots
    /// free up.
    ///
    /// A failing task does not stop the pool: remaining tasks are still
    /// dispatched and in-flight ones settle. The first failure is then
    /// returned as [`BuildStatsError::Aborted`].
    pub async fn run<I, F, T>(&self, tasks: I, observer: &dyn DownloadObserver) -> Result<Vec<T>>
    where
        I: IntoIterator<Item = F>,
        I::IntoIter: ExactSizeIterator,
        F: Future<Output = Result<T>>,
    {
        let tasks = tasks.into_iter();
        let total = tasks.len();

        let mut outputs = Vec::new();
        let mut first_error = None;
        let mut settled = stream::iter(tasks).buffer_unordered(self.concurrency.get());

        while let Some(result) = settled.next().await {
            match result {
                Ok(output) => {
                    outputs.push(output);
                    observer.on_progress(outputs.len(), total);
                }
                Err(e) => {
                    warn!("Task failed: {e}");
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(source) => Err(BuildStatsError::Aborted {
                completed: outputs.len(),
                total,
                source: Box::new(source),
            }),
            None => Ok(outputs),
        }
    }
}
