use crate::encode::codec::{CodecKind, Packet, Received, StreamParams, Submission, VideoEncoder};
use crate::foundation::core::Rational;
use crate::foundation::error::{ArgandError, ArgandResult};
use crate::render::frame::FrameBuffer;
use std::collections::VecDeque;

/// In-process `rawvideo` encoder: one packed RGB24 packet per frame.
///
/// Frames are held back behind a `lookahead` queue before being emitted, the way real encoders
/// delay output. Queued frames share storage with the caller's buffer, so the caller has to
/// make its buffer writable before drawing the next frame.
pub struct RawVideoEncoder {
    params: StreamParams,
    lookahead: usize,
    queue: VecDeque<(i64, FrameBuffer)>,
    last_pts: Option<i64>,
    eof: bool,
}

impl RawVideoEncoder {
    /// Open an encoder for `width × height` frames at `frame_rate` (time base `1/frame_rate`).
    pub fn new(
        width: u32,
        height: u32,
        frame_rate: Rational,
        lookahead: usize,
    ) -> ArgandResult<Self> {
        if width == 0 || height == 0 {
            return Err(ArgandError::validation(
                "raw encoder width/height must be non-zero",
            ));
        }
        let frame_rate = Rational::new(frame_rate.num, frame_rate.den)?;
        Ok(Self {
            params: StreamParams {
                width,
                height,
                time_base: frame_rate.invert(),
                frame_rate,
                codec: CodecKind::RawVideo,
                bit_rate: 0,
                gop_size: 1,
            },
            lookahead,
            queue: VecDeque::new(),
            last_pts: None,
            eof: false,
        })
    }

    /// Frames submitted but not yet returned as packets.
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    fn emit(&mut self) -> Option<Packet> {
        let (pts, frame) = self.queue.pop_front()?;
        Some(Packet {
            pts,
            data: frame.to_packed_rgb(),
            keyframe: true,
        })
    }
}

impl VideoEncoder for RawVideoEncoder {
    fn params(&self) -> &StreamParams {
        &self.params
    }

    fn send(&mut self, submission: Submission<'_>) -> ArgandResult<()> {
        if self.eof {
            return Err(ArgandError::encoder(
                "raw encoder received input after end of stream",
            ));
        }
        match submission {
            Submission::Frame { buffer, pts } => {
                if buffer.width() != self.params.width || buffer.height() != self.params.height {
                    return Err(ArgandError::encoder(format!(
                        "frame size mismatch: got {}x{}, expected {}x{}",
                        buffer.width(),
                        buffer.height(),
                        self.params.width,
                        self.params.height
                    )));
                }
                if let Some(last) = self.last_pts
                    && pts <= last
                {
                    return Err(ArgandError::encoder(format!(
                        "non-increasing pts {pts} (previous {last})"
                    )));
                }
                self.queue.try_reserve(1).map_err(|e| {
                    ArgandError::resource_exhausted(format!("raw encoder queue: {e}"))
                })?;
                self.last_pts = Some(pts);
                self.queue.push_back((pts, buffer.clone()));
            }
            Submission::EndOfStream => self.eof = true,
        }
        Ok(())
    }

    fn receive(&mut self) -> ArgandResult<Received> {
        if (self.queue.len() > self.lookahead || self.eof)
            && let Some(packet) = self.emit()
        {
            return Ok(Received::Packet(packet));
        }
        if self.eof {
            Ok(Received::Eof)
        } else {
            Ok(Received::Again)
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/raw.rs"]
mod tests;
