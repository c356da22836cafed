//! Video encoding and muxing.
//!
//! Frames are submitted to a [`codec::VideoEncoder`], which returns packets through a
//! send/receive protocol; [`pipeline::EncodePipeline`] drains those packets into a
//! [`mux::MuxSession`] that enforces header, packets, trailer ordering.

/// H.264/HEVC Annex-B helpers.
pub mod bitstream;
/// Encoder trait and stream types.
pub mod codec;
/// `ffmpeg`-based encoder and container muxer (via system `ffmpeg`).
pub mod ffmpeg;
/// Muxer trait, session and built-in muxers.
pub mod mux;
/// Submit/drain/flush state machine.
pub mod pipeline;
/// Uncompressed in-process encoder.
pub mod raw;
