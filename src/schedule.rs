use std::num::NonZeroUsize;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use rayon::{ThreadPool, ThreadPoolBuilder, prelude::*};
use tracing::debug;

use crate::error::ScanError;
use crate::types::{RepositoryStatus, StatusMap};

/// Runs repository inspections on a pool of exactly `limit` threads, so at
/// most `limit` inspections are ever in flight. Inspections must not use
/// rayon themselves: a blocked join could steal a second inspection onto
/// the same worker.
pub struct Scheduler {
    pool: ThreadPool,
    limit: NonZeroUsize,
    progress: bool,
}

impl Scheduler {
    /// # Errors
    /// Returns an error when the worker pool cannot be created.
    pub fn new(limit: NonZeroUsize) -> Result<Self, ScanError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(limit.get())
            .thread_name(|i| format!("repostatus-{i}"))
            .build()?;
        Ok(Self {
            pool,
            limit,
            progress: false,
        })
    }

    #[must_use]
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    /// Inspect every descriptor and fold the results by `status.name`.
    ///
    /// The first error stops new inspections from starting and becomes the
    /// result of the whole scan; work already running is left to finish.
    /// Duplicate names keep the status of the later descriptor.
    ///
    /// # Errors
    /// Returns the error of a failed inspection.
    pub fn reconcile<D, F>(&self, descriptors: Vec<D>, inspect: F) -> Result<StatusMap, ScanError>
    where
        D: Send,
        F: Fn(D) -> Result<RepositoryStatus, ScanError> + Sync,
    {
        if descriptors.is_empty() {
            return Ok(StatusMap::new());
        }

        let progress = self.progress_bar(descriptors.len());
        debug!(
            repos = descriptors.len(),
            limit = self.limit.get(),
            "starting inspections"
        );

        let result = self.pool.install(|| {
            descriptors
                .into_par_iter()
                .map(|descriptor| {
                    let status = inspect(descriptor);
                    progress.inc(1);
                    status
                })
                .collect::<Result<Vec<_>, ScanError>>()
        });

        match result {
            Ok(statuses) => {
                progress.finish_with_message("scan complete");
                let mut map = StatusMap::new();
                for status in statuses {
                    map.insert(status.name.clone(), status);
                }
                Ok(map)
            }
            Err(err) => {
                progress.abandon_with_message("scan failed");
                Err(err)
            }
        }
    }

    /// Bounded parallel map with the same fail-fast policy as [`Self::reconcile`].
    ///
    /// # Errors
    /// Returns the first error produced by `f`.
    pub fn try_map<T, U, F>(&self, items: Vec<T>, f: F) -> Result<Vec<U>, ScanError>
    where
        T: Send,
        U: Send,
        F: Fn(T) -> Result<U, ScanError> + Sync,
    {
        self.pool
            .install(|| items.into_par_iter().map(|item| f(item)).collect::<Result<Vec<_>, _>>())
    }

    /// Bounded parallel filter preserving input order.
    pub fn filter<T, P>(&self, items: Vec<T>, keep: P) -> Vec<T>
    where
        T: Send,
        P: Fn(&T) -> bool + Sync,
    {
        self.pool
            .install(|| items.into_par_iter().filter(|item| keep(item)).collect())
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.progress {
            return ProgressBar::hidden();
        }
        let progress = ProgressBar::new(len as u64);
        let style =
            ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress.set_style(style);
        progress.enable_steady_tick(Duration::from_millis(100));
        progress.set_message("inspecting repositories");
        progress
    }
}
