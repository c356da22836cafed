//! Parallel frame rendering.
//!
//! A [`renderer::FrameRenderer`] maps every pixel of a [`frame::FrameBuffer`] through a
//! [`formula::Formula`] and colors it by argument. Rows are dealt round-robin to a fixed
//! [`pool::WorkerPool`] and the frame is complete once every worker has joined.

/// Argument to hue mapping.
pub mod color;
/// Complex-plane formulas and the pixel viewport.
pub mod formula;
/// Copy-on-write RGB0 frame buffers.
pub mod frame;
/// Fixed-size worker pool and row partitioning.
pub mod pool;
/// Frame renderer driving the pool.
pub mod renderer;
