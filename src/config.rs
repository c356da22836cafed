use crate::encode::ffmpeg::FfmpegEncoderOpts;
use crate::encode::raw::RawVideoEncoder;
use crate::foundation::core::{Canvas, Rational};
use crate::foundation::error::{ArgandError, ArgandResult};
use crate::render::formula::FormulaKind;
use crate::render::renderer::DEFAULT_SCALE;
use anyhow::Context as _;
use std::path::Path;

/// Pixel layout of rendered frames.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PixelFormat {
    /// 32-bit packed `R, G, B, unused`.
    #[default]
    Rgb0,
}

/// Everything fixed at pipeline construction.
///
/// Missing JSON fields fall back to [`AnimationConfig::default`], which reproduces the reference
/// animation: 3000 frames of 2560×1440 at 60 fps through `h264_nvenc`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnimationConfig {
    /// Frame width in pixels (even, non-zero).
    pub width: u32,
    /// Frame height in pixels (even, non-zero).
    pub height: u32,
    /// Frame pixel layout.
    pub pixel_format: PixelFormat,
    /// Target bit rate in bits per second.
    pub bit_rate: u64,
    /// Group-of-pictures size.
    pub gop_size: u32,
    /// Frames per second; the encoder time base is its inverse.
    pub fps: Rational,
    /// Encoder preset / quality hint.
    pub preset: Option<String>,
    /// ffmpeg encoder name.
    pub codec: String,
    /// Number of frames to render.
    pub frame_count: u64,
    /// Render worker count.
    pub threads: usize,
    /// Animation formula.
    pub formula: FormulaKind,
    /// Complex units per pixel.
    pub scale: f64,
    /// Frames the raw encoder holds back before emitting.
    pub lookahead: usize,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            width: 2560,
            height: 1440,
            pixel_format: PixelFormat::Rgb0,
            bit_rate: 24_000_000,
            gop_size: 30,
            fps: Rational { num: 60, den: 1 },
            preset: Some("slow".to_string()),
            codec: "h264_nvenc".to_string(),
            frame_count: 3000,
            threads: 12,
            formula: FormulaKind::RationalPower,
            scale: DEFAULT_SCALE,
            lookahead: 0,
        }
    }
}

impl AnimationConfig {
    /// Parse a configuration from JSON text. Does not validate.
    pub fn from_json_str(s: &str) -> ArgandResult<Self> {
        serde_json::from_str(s).map_err(|e| ArgandError::serde(format!("parse config JSON: {e}")))
    }

    /// Load a configuration from a JSON file and validate it.
    pub fn from_json_file(path: impl AsRef<Path>) -> ArgandResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        let cfg = Self::from_json_str(&text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check every knob.
    pub fn validate(&self) -> ArgandResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ArgandError::validation("width/height must be non-zero"));
        }
        if !self.width.is_multiple_of(2) || !self.height.is_multiple_of(2) {
            return Err(ArgandError::validation(format!(
                "width/height must be even, got {}x{}",
                self.width, self.height
            )));
        }
        Rational::new(self.fps.num, self.fps.den)?;
        if self.frame_count == 0 {
            return Err(ArgandError::validation("frame_count must be >= 1"));
        }
        if self.gop_size == 0 {
            return Err(ArgandError::validation("gop_size must be >= 1"));
        }
        if self.threads == 0 {
            return Err(ArgandError::validation("threads must be >= 1"));
        }
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(ArgandError::validation("scale must be finite and > 0"));
        }
        if self.codec.trim().is_empty() {
            return Err(ArgandError::validation("codec must be non-empty"));
        }
        Ok(())
    }

    /// Frame dimensions.
    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }

    /// Encoder time base (`1/fps`).
    pub fn time_base(&self) -> Rational {
        self.fps.invert()
    }

    /// Options for an ffmpeg-backed encoder matching this configuration.
    pub fn ffmpeg_encoder_opts(&self) -> FfmpegEncoderOpts {
        FfmpegEncoderOpts {
            codec_name: self.codec.clone(),
            preset: self.preset.clone(),
            bit_rate: self.bit_rate,
            gop_size: self.gop_size,
            width: self.width,
            height: self.height,
            frame_rate: self.fps,
        }
    }

    /// In-process raw encoder matching this configuration.
    pub fn raw_encoder(&self) -> ArgandResult<RawVideoEncoder> {
        RawVideoEncoder::new(self.width, self.height, self.fps, self.lookahead)
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
