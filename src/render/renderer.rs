use crate::foundation::core::FrameIndex;
use crate::foundation::error::{ArgandError, ArgandResult};
use crate::render::color::hue_color;
use crate::render::formula::{Formula, Viewport};
use crate::render::frame::{BYTES_PER_PIXEL, FrameBuffer};
use crate::render::pool::{WorkerPool, worker_for_row};
use std::sync::Arc;

/// Complex units per pixel used by the reference animation.
pub const DEFAULT_SCALE: f64 = 1.0 / 130.0;

/// Work handed to one worker for one render pass: its rows of the target frame.
///
/// Built fresh for every pass and consumed by the worker that runs it.
pub struct RenderJob<'a> {
    /// Worker identifier, `0..workers`.
    pub worker: usize,
    /// Frame being rendered.
    pub frame: FrameIndex,
    rows: Vec<(u32, &'a mut [u8])>,
}

impl RenderJob<'_> {
    /// Number of rows owned by this job.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn fill(self, width: u32, viewport: &Viewport, formula: &dyn Formula) {
        let rows = self.rows.len();
        for (y, row) in self.rows {
            for x in 0..width {
                let c = hue_color(formula.eval(viewport.to_plane(x, y), self.frame));
                let o = BYTES_PER_PIXEL * x as usize;
                row[o] = c.r;
                row[o + 1] = c.g;
                row[o + 2] = c.b;
            }
        }
        tracing::trace!(worker = self.worker, rows, "render job finished");
    }
}

/// Fills frame buffers by evaluating a [`Formula`] per pixel on a fixed worker pool.
///
/// Rows are dealt round-robin, so every worker writes a disjoint set of rows and the fill loop
/// needs no locking. Output is independent of the worker count.
pub struct FrameRenderer {
    pool: WorkerPool,
    formula: Arc<dyn Formula>,
    scale: f64,
}

impl FrameRenderer {
    /// Create a renderer with `workers` threads.
    pub fn new(workers: usize, formula: Arc<dyn Formula>, scale: f64) -> ArgandResult<Self> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(ArgandError::validation(
                "render scale must be finite and > 0",
            ));
        }
        Ok(Self {
            pool: WorkerPool::new(workers)?,
            formula,
            scale,
        })
    }

    /// Number of render workers.
    pub fn workers(&self) -> usize {
        self.pool.workers()
    }

    /// Render frame `frame` into `buffer`.
    ///
    /// The buffer is made writable first (copied if an encoder still holds it). Returns after
    /// every worker has finished; the caller never observes a partial frame.
    #[tracing::instrument(level = "debug", skip(self, buffer), fields(workers = self.pool.workers()))]
    pub fn render(&self, frame: FrameIndex, buffer: &mut FrameBuffer) -> ArgandResult<()> {
        if buffer.make_writable()? {
            tracing::debug!("frame buffer was still referenced by the encoder; copied");
        }

        let viewport = Viewport::centered(buffer.canvas(), self.scale);
        let width = buffer.width();
        let height = buffer.height() as usize;
        let stride = buffer.stride();
        let data = buffer
            .data_mut()
            .ok_or_else(|| ArgandError::validation("frame buffer is shared after make_writable"))?;

        let jobs = build_jobs(frame, data, stride, height, self.pool.workers())?;
        let formula = self.formula.as_ref();
        self.pool.fork_join(jobs, |job: RenderJob<'_>| {
            job.fill(width, &viewport, formula)
        });
        Ok(())
    }
}

fn build_jobs(
    frame: FrameIndex,
    data: &mut [u8],
    stride: usize,
    height: usize,
    workers: usize,
) -> ArgandResult<Vec<RenderJob<'_>>> {
    let mut jobs = Vec::new();
    jobs.try_reserve_exact(workers).map_err(|e| {
        ArgandError::resource_exhausted(format!("failed to allocate render jobs: {e}"))
    })?;

    let rows_per_worker = height.div_ceil(workers);
    for worker in 0..workers {
        let mut rows = Vec::new();
        rows.try_reserve_exact(rows_per_worker).map_err(|e| {
            ArgandError::resource_exhausted(format!("failed to allocate render job rows: {e}"))
        })?;
        jobs.push(RenderJob {
            worker,
            frame,
            rows,
        });
    }

    for (y, row) in data.chunks_exact_mut(stride).take(height).enumerate() {
        let y = y as u32;
        jobs[worker_for_row(y, workers)].rows.push((y, row));
    }
    jobs.retain(|job| !job.rows.is_empty());
    Ok(jobs)
}

#[cfg(test)]
#[path = "../../tests/unit/render/renderer.rs"]
mod tests;
