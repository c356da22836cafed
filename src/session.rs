use crate::config::AnimationConfig;
use crate::encode::codec::VideoEncoder;
use crate::encode::mux::Muxer;
use crate::encode::pipeline::EncodePipeline;
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{ArgandError, ArgandResult};
use crate::render::formula::Formula;
use crate::render::frame::FrameBuffer;
use crate::render::renderer::FrameRenderer;
use std::sync::Arc;

/// Animation run statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Frames rendered by the worker pool.
    pub frames_rendered: u64,
    /// Frames accepted by the encoder.
    pub frames_submitted: u64,
    /// Packets written to the muxer.
    pub packets_written: u64,
    /// Packet payload bytes written to the muxer.
    pub bytes_written: u64,
}

/// Renders an animation frame by frame and streams it through an [`EncodePipeline`].
///
/// Construction validates the configuration and starts the render workers once; every
/// [`Animator::run`] and [`Animator::render_frame`] call reuses them.
pub struct Animator {
    config: AnimationConfig,
    renderer: FrameRenderer,
}

impl Animator {
    /// Create an animator using the formula named by `config.formula`.
    pub fn new(config: AnimationConfig) -> ArgandResult<Self> {
        let formula = config.formula.build(config.frame_count);
        Self::with_formula(config, formula)
    }

    /// Create an animator with a caller-supplied formula.
    pub fn with_formula(config: AnimationConfig, formula: Arc<dyn Formula>) -> ArgandResult<Self> {
        config.validate()?;
        let renderer = FrameRenderer::new(config.threads, formula, config.scale)?;
        Ok(Self { config, renderer })
    }

    /// Configuration this animator was built with.
    pub fn config(&self) -> &AnimationConfig {
        &self.config
    }

    /// Render a single frame into a fresh buffer.
    pub fn render_frame(&self, frame: FrameIndex) -> ArgandResult<FrameBuffer> {
        if frame.0 >= self.config.frame_count {
            return Err(ArgandError::validation(format!(
                "frame {} is outside the animation (frame_count = {})",
                frame.0, self.config.frame_count
            )));
        }
        let mut buffer = FrameBuffer::new(self.config.width, self.config.height)?;
        self.renderer.render(frame, &mut buffer)?;
        Ok(buffer)
    }

    /// Render every frame, submit each with `pts = frame index` and drain after every
    /// submission, then flush the encoder and write the trailer.
    ///
    /// One buffer is reused across frames; it is copied before drawing only when the encoder
    /// still holds the previous frame.
    pub fn run<E, M>(&self, pipeline: &mut EncodePipeline<E, M>) -> ArgandResult<RenderStats>
    where
        E: VideoEncoder,
        M: Muxer,
    {
        let params = pipeline.encoder().params();
        if params.width != self.config.width || params.height != self.config.height {
            return Err(ArgandError::validation(format!(
                "encoder is configured for {}x{}, animation is {}x{}",
                params.width, params.height, self.config.width, self.config.height
            )));
        }

        tracing::info!(
            frames = self.config.frame_count,
            width = self.config.width,
            height = self.config.height,
            workers = self.renderer.workers(),
            "animation started"
        );

        let mut buffer = FrameBuffer::new(self.config.width, self.config.height)?;
        let mut frames_rendered = 0u64;
        for i in 0..self.config.frame_count {
            self.renderer.render(FrameIndex(i), &mut buffer)?;
            frames_rendered += 1;

            let pts = i64::try_from(i)
                .map_err(|_| ArgandError::validation("frame index overflows pts"))?;
            pipeline.submit_frame(&buffer, pts)?;
            pipeline.drain()?;
        }
        let encoded = pipeline.finish()?;

        let stats = RenderStats {
            frames_rendered,
            frames_submitted: encoded.frames_submitted,
            packets_written: encoded.packets_written,
            bytes_written: encoded.bytes_written,
        };
        tracing::info!(
            frames = stats.frames_submitted,
            packets = stats.packets_written,
            bytes = stats.bytes_written,
            "animation finished"
        );
        Ok(stats)
    }
}

impl std::fmt::Debug for Animator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Animator")
            .field("config", &self.config)
            .field("workers", &self.renderer.workers())
            .finish()
    }
}

#[cfg(test)]
#[path = "../tests/unit/session.rs"]
mod tests;
