use crate::foundation::error::{ArgandError, ArgandResult};

/// Worker that owns row `y` when rows are dealt round-robin over `workers`.
///
/// Worker `k` owns rows `k, k + workers, k + 2·workers, …`.
pub fn worker_for_row(y: u32, workers: usize) -> usize {
    y as usize % workers
}

/// Row sets of every worker for a frame of `height` rows.
///
/// The sets are pairwise disjoint and their union is `0..height`. Empty when `workers == 0`.
pub fn partition_rows(height: u32, workers: usize) -> Vec<Vec<u32>> {
    let mut out = vec![Vec::new(); workers];
    if workers == 0 {
        return out;
    }
    for y in 0..height {
        out[worker_for_row(y, workers)].push(y);
    }
    out
}

/// Fixed-size fork/join pool: dispatch a batch of disjoint jobs, block until all complete.
///
/// Jobs borrow their data for the duration of one [`WorkerPool::fork_join`] call only; nothing
/// survives between batches.
pub struct WorkerPool {
    pool: rayon::ThreadPool,
    workers: usize,
}

impl WorkerPool {
    /// Build a pool with exactly `workers` threads.
    pub fn new(workers: usize) -> ArgandResult<Self> {
        if workers == 0 {
            return Err(ArgandError::validation("worker count must be >= 1"));
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("argand-render-{i}"))
            .build()
            .map_err(|e| {
                ArgandError::resource_exhausted(format!("failed to build render thread pool: {e}"))
            })?;
        Ok(Self { pool, workers })
    }

    /// Number of worker threads.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Run `run` once per job on the pool. Returns only after every job has finished.
    pub fn fork_join<J, F>(&self, jobs: Vec<J>, run: F)
    where
        J: Send,
        F: Fn(J) + Sync,
    {
        let run = &run;
        self.pool.scope(|s| {
            for job in jobs {
                s.spawn(move |_| run(job));
            }
        });
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("workers", &self.workers)
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/pool.rs"]
mod tests;
