//! Argand renders domain-coloring animations of time-varying complex functions and streams them
//! through a video encoder.
//!
//! - Describe the animation with an [`AnimationConfig`]
//! - Create an [`Animator`], which owns the render worker pool
//! - Connect a [`VideoEncoder`] to a [`Muxer`] with an [`EncodePipeline`] and [`Animator::run`] it
//!
//! Every pixel is mapped to the complex plane, pushed through a [`Formula`] and colored by the
//! argument of the result. Rows are rendered in parallel; output is byte-identical for any worker
//! count.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Configuration knobs and JSON loading.
pub mod config;
/// Video encoding and muxing.
pub mod encode;
/// Parallel frame rendering.
pub mod render;
/// Animation driver.
pub mod session;

pub use crate::foundation::complex::Complex;
pub use crate::foundation::core::{Canvas, FrameIndex, Rational};
pub use crate::foundation::error::{ArgandError, ArgandResult};

pub use crate::config::{AnimationConfig, PixelFormat};
pub use crate::encode::codec::{
    CodecKind, Packet, Received, StreamParams, Submission, VideoEncoder,
};
pub use crate::encode::ffmpeg::{
    FfmpegEncoder, FfmpegEncoderOpts, FfmpegMuxer, FfmpegMuxerOpts, is_ffmpeg_on_path,
};
pub use crate::encode::mux::{ElementaryStreamMuxer, InMemoryMuxer, MuxEvent, MuxSession, Muxer};
pub use crate::encode::pipeline::{
    DrainReport, DrainStatus, EncodePipeline, EncodeStats, PipelineState,
};
pub use crate::encode::raw::RawVideoEncoder;
pub use crate::render::color::{Rgb8, hue_color};
pub use crate::render::formula::{Formula, FormulaKind, PolynomialBlend, RationalPower, Viewport};
pub use crate::render::frame::FrameBuffer;
pub use crate::render::pool::{WorkerPool, partition_rows};
pub use crate::render::renderer::FrameRenderer;
pub use crate::session::{Animator, RenderStats};
