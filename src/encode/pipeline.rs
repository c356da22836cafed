use crate::encode::codec::{Received, Submission, VideoEncoder};
use crate::encode::mux::{MuxSession, Muxer};
use crate::foundation::error::{ArgandError, ArgandResult};
use crate::render::frame::FrameBuffer;

/// Lifecycle of an [`EncodePipeline`].
///
/// `Idle → FrameSubmitted → Draining → ReadyForNext → FrameSubmitted → …`, and after the
/// end-of-stream marker `Flushing → Drained` (terminal).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineState {
    /// Header written, nothing submitted yet.
    Idle,
    /// A frame was accepted by the encoder and has not been drained yet.
    FrameSubmitted,
    /// Packets are being pulled from the encoder.
    Draining,
    /// The encoder wants more input.
    ReadyForNext,
    /// End of stream was submitted; buffered packets are still coming out.
    Flushing,
    /// The encoder reported end of stream. Terminal.
    Drained,
}

/// Why a [`EncodePipeline::drain`] call stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrainStatus {
    /// The encoder needs more input before it can emit again.
    NotReady,
    /// The encoder is done; no further packets exist.
    EndOfStream,
}

/// Outcome of one [`EncodePipeline::drain`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DrainReport {
    /// Packets forwarded to the muxer by this call.
    pub packets: usize,
    /// Why draining stopped.
    pub status: DrainStatus,
}

/// Encode-side counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EncodeStats {
    /// Real frames accepted by the encoder.
    pub frames_submitted: u64,
    /// Packets written to the muxer.
    pub packets_written: u64,
    /// Packet payload bytes written to the muxer.
    pub bytes_written: u64,
}

/// Drives a [`VideoEncoder`] through submit/drain/flush and forwards its packets to a muxer.
///
/// Construction writes the container header; [`EncodePipeline::finish`] flushes the encoder,
/// drains it to end of stream and writes the trailer.
pub struct EncodePipeline<E: VideoEncoder, M: Muxer> {
    encoder: E,
    output: MuxSession<M>,
    state: PipelineState,
    frames_submitted: u64,
    last_pts: Option<i64>,
}

impl<E: VideoEncoder, M: Muxer> EncodePipeline<E, M> {
    /// Connect `encoder` to `muxer` and write the container header.
    pub fn new(encoder: E, muxer: M) -> ArgandResult<Self> {
        let mut output = MuxSession::new(muxer);
        output.write_header(encoder.params())?;
        Ok(Self {
            encoder,
            output,
            state: PipelineState::Idle,
            frames_submitted: 0,
            last_pts: None,
        })
    }

    /// Current lifecycle state.
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Counters so far.
    pub fn stats(&self) -> EncodeStats {
        EncodeStats {
            frames_submitted: self.frames_submitted,
            packets_written: self.output.packets_written(),
            bytes_written: self.output.bytes_written(),
        }
    }

    /// Borrow the encoder.
    pub fn encoder(&self) -> &E {
        &self.encoder
    }

    /// Push a frame or the end-of-stream marker to the encoder.
    ///
    /// A frame must be drained before the next one is submitted, and nothing may follow the
    /// end-of-stream marker. Encoder rejections are returned as [`ArgandError::Encoder`].
    pub fn submit(&mut self, submission: Submission<'_>) -> ArgandResult<()> {
        match submission {
            Submission::Frame { pts, .. } => {
                match self.state {
                    PipelineState::Idle | PipelineState::ReadyForNext => {}
                    PipelineState::Flushing | PipelineState::Drained => {
                        return Err(ArgandError::validation(
                            "frame submitted after end of stream",
                        ));
                    }
                    PipelineState::FrameSubmitted | PipelineState::Draining => {
                        return Err(ArgandError::validation(
                            "previous frame must be drained before submitting the next one",
                        ));
                    }
                }
                if let Some(last) = self.last_pts
                    && pts <= last
                {
                    return Err(ArgandError::validation(format!(
                        "frame pts must increase: got {pts} after {last}"
                    )));
                }

                tracing::debug!(pts, "send frame");
                self.encoder.send(submission)?;
                self.last_pts = Some(pts);
                self.frames_submitted += 1;
                self.state = PipelineState::FrameSubmitted;
            }
            Submission::EndOfStream => {
                match self.state {
                    PipelineState::Idle
                    | PipelineState::FrameSubmitted
                    | PipelineState::ReadyForNext => {}
                    PipelineState::Draining => {
                        return Err(ArgandError::validation(
                            "cannot flush while a drain is in progress",
                        ));
                    }
                    PipelineState::Flushing | PipelineState::Drained => {
                        return Err(ArgandError::validation(
                            "end of stream already submitted",
                        ));
                    }
                }

                tracing::debug!(frames = self.frames_submitted, "flush encoder");
                self.encoder.send(Submission::EndOfStream)?;
                self.state = PipelineState::Flushing;
            }
        }
        Ok(())
    }

    /// Submit one frame with presentation timestamp `pts` (encoder time base).
    pub fn submit_frame(&mut self, buffer: &FrameBuffer, pts: i64) -> ArgandResult<()> {
        self.submit(Submission::Frame { buffer, pts })
    }

    /// Submit the end-of-stream marker.
    pub fn flush(&mut self) -> ArgandResult<()> {
        self.submit(Submission::EndOfStream)
    }

    /// Forward every packet the encoder is ready to emit.
    ///
    /// Stops when the encoder needs more input ([`DrainStatus::NotReady`]) or reports end of
    /// stream ([`DrainStatus::EndOfStream`], terminal). Once end of stream has been submitted
    /// this always runs to [`DrainStatus::EndOfStream`]; an encoder answering
    /// [`Received::Again`] at that point is an [`ArgandError::Encoder`].
    pub fn drain(&mut self) -> ArgandResult<DrainReport> {
        if self.state == PipelineState::Drained {
            return Ok(DrainReport {
                packets: 0,
                status: DrainStatus::EndOfStream,
            });
        }

        let flushing = self.state == PipelineState::Flushing;
        if !flushing {
            self.state = PipelineState::Draining;
        }

        let mut packets = 0usize;
        loop {
            match self.encoder.receive()? {
                Received::Packet(packet) => {
                    self.output.write_packet(packet)?;
                    packets += 1;
                }
                Received::Again => {
                    if flushing {
                        return Err(ArgandError::encoder(
                            "encoder asked for more input after end of stream",
                        ));
                    }
                    self.state = PipelineState::ReadyForNext;
                    return Ok(DrainReport {
                        packets,
                        status: DrainStatus::NotReady,
                    });
                }
                Received::Eof => {
                    self.state = PipelineState::Drained;
                    return Ok(DrainReport {
                        packets,
                        status: DrainStatus::EndOfStream,
                    });
                }
            }
        }
    }

    /// Flush the encoder (if not done yet), drain to end of stream and write the trailer.
    pub fn finish(&mut self) -> ArgandResult<EncodeStats> {
        if !matches!(
            self.state,
            PipelineState::Flushing | PipelineState::Drained
        ) {
            self.flush()?;
        }
        self.drain()?;
        self.output.write_trailer()?;

        let stats = self.stats();
        tracing::debug!(
            frames = stats.frames_submitted,
            packets = stats.packets_written,
            bytes = stats.bytes_written,
            "encoder drained"
        );
        Ok(stats)
    }

    /// Split into encoder and muxer.
    pub fn into_parts(self) -> (E, M) {
        (self.encoder, self.output.into_inner())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/pipeline.rs"]
mod tests;
