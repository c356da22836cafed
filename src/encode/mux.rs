use crate::encode::bitstream::end_of_stream_nal;
use crate::encode::codec::{CodecKind, Packet, StreamParams};
use crate::foundation::core::Rational;
use crate::foundation::error::{ArgandError, ArgandResult};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Container writer receiving packets whose timestamps are already in its stream time base.
///
/// Callers go through [`MuxSession`], which enforces header → packets → trailer ordering.
pub trait Muxer: Send {
    /// Time base of the container stream. Defaults to the encoder time base.
    fn stream_time_base(&self, params: &StreamParams) -> Rational {
        params.time_base
    }

    /// Write the container header. Called exactly once, before any packet.
    fn write_header(&mut self, params: &StreamParams) -> ArgandResult<()>;

    /// Persist one packet.
    fn write_packet(&mut self, packet: &Packet) -> ArgandResult<()>;

    /// Write the container trailer. Called exactly once, after the last packet.
    fn write_trailer(&mut self) -> ArgandResult<()>;
}

impl<T: Muxer + ?Sized> Muxer for Box<T> {
    fn stream_time_base(&self, params: &StreamParams) -> Rational {
        (**self).stream_time_base(params)
    }

    fn write_header(&mut self, params: &StreamParams) -> ArgandResult<()> {
        (**self).write_header(params)
    }

    fn write_packet(&mut self, packet: &Packet) -> ArgandResult<()> {
        (**self).write_packet(packet)
    }

    fn write_trailer(&mut self) -> ArgandResult<()> {
        (**self).write_trailer()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum MuxState {
    AwaitingHeader,
    Writing,
    Finished,
}

/// Order-enforcing front end of a [`Muxer`].
///
/// Writes the header once, rescales every packet from the encoder time base to the stream time
/// base, rejects timestamps that go backwards and writes the trailer once.
pub struct MuxSession<M: Muxer> {
    muxer: M,
    state: MuxState,
    encoder_time_base: Rational,
    stream_time_base: Rational,
    last_pts: Option<i64>,
    packets: u64,
    bytes: u64,
}

impl<M: Muxer> MuxSession<M> {
    /// Wrap `muxer`. Nothing is written until [`MuxSession::write_header`].
    pub fn new(muxer: M) -> Self {
        Self {
            muxer,
            state: MuxState::AwaitingHeader,
            encoder_time_base: Rational { num: 1, den: 1 },
            stream_time_base: Rational { num: 1, den: 1 },
            last_pts: None,
            packets: 0,
            bytes: 0,
        }
    }

    /// Write the header describing `params`.
    pub fn write_header(&mut self, params: &StreamParams) -> ArgandResult<()> {
        if self.state != MuxState::AwaitingHeader {
            return Err(ArgandError::mux("container header already written"));
        }
        self.encoder_time_base = params.time_base;
        self.stream_time_base = self.muxer.stream_time_base(params);
        self.muxer.write_header(params)?;
        self.state = MuxState::Writing;
        tracing::debug!(
            width = params.width,
            height = params.height,
            codec = ?params.codec,
            stream_time_base = %self.stream_time_base,
            "wrote container header"
        );
        Ok(())
    }

    /// Rescale `packet` into the stream time base and write it.
    pub fn write_packet(&mut self, mut packet: Packet) -> ArgandResult<()> {
        match self.state {
            MuxState::AwaitingHeader => {
                return Err(ArgandError::mux("packet written before container header"));
            }
            MuxState::Finished => {
                return Err(ArgandError::mux("packet written after container trailer"));
            }
            MuxState::Writing => {}
        }

        let encoder_pts = packet.pts;
        packet.pts = self
            .encoder_time_base
            .rescale(packet.pts, self.stream_time_base);
        if let Some(last) = self.last_pts
            && packet.pts < last
        {
            return Err(ArgandError::mux(format!(
                "packet timestamps went backwards: {} after {last}",
                packet.pts
            )));
        }

        self.muxer.write_packet(&packet)?;
        self.last_pts = Some(packet.pts);
        self.packets += 1;
        self.bytes += packet.size() as u64;
        tracing::debug!(
            pts = encoder_pts,
            stream_pts = packet.pts,
            size = packet.size(),
            "write packet"
        );
        Ok(())
    }

    /// Write the trailer. The session accepts nothing afterwards.
    pub fn write_trailer(&mut self) -> ArgandResult<()> {
        match self.state {
            MuxState::AwaitingHeader => {
                return Err(ArgandError::mux("trailer written before container header"));
            }
            MuxState::Finished => {
                return Err(ArgandError::mux("container trailer already written"));
            }
            MuxState::Writing => {}
        }
        self.muxer.write_trailer()?;
        self.state = MuxState::Finished;
        tracing::debug!(packets = self.packets, bytes = self.bytes, "wrote container trailer");
        Ok(())
    }

    /// Packets written so far.
    pub fn packets_written(&self) -> u64 {
        self.packets
    }

    /// Payload bytes written so far.
    pub fn bytes_written(&self) -> u64 {
        self.bytes
    }

    /// Return `true` once the trailer has been written.
    pub fn is_finished(&self) -> bool {
        self.state == MuxState::Finished
    }

    /// Borrow the wrapped muxer.
    pub fn muxer(&self) -> &M {
        &self.muxer
    }

    /// Unwrap the muxer.
    pub fn into_inner(self) -> M {
        self.muxer
    }
}

/// Writes packets back to back as an elementary stream (`.h264`, `.hevc`, `.rgb`).
///
/// Elementary streams carry their parameters in-band, so the header is empty. The trailer
/// appends the codec's end-of-stream NAL unit when it has one.
pub struct ElementaryStreamMuxer<W: Write + Send> {
    writer: W,
    codec: Option<CodecKind>,
}

impl<W: Write + Send> ElementaryStreamMuxer<W> {
    /// Write into `writer`.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            codec: None,
        }
    }

    /// Unwrap the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl ElementaryStreamMuxer<BufWriter<File>> {
    /// Create (or truncate) `path`, creating missing parent directories.
    pub fn create(path: &Path) -> ArgandResult<Self> {
        use anyhow::Context as _;
        ensure_parent_dir(path)?;
        let file = File::create(path)
            .with_context(|| format!("failed to create output file '{}'", path.display()))?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write + Send> Muxer for ElementaryStreamMuxer<W> {
    fn write_header(&mut self, params: &StreamParams) -> ArgandResult<()> {
        self.codec = Some(params.codec);
        Ok(())
    }

    fn write_packet(&mut self, packet: &Packet) -> ArgandResult<()> {
        self.writer
            .write_all(&packet.data)
            .map_err(|e| ArgandError::mux(format!("failed to write packet: {e}")))
    }

    fn write_trailer(&mut self) -> ArgandResult<()> {
        if let Some(eos) = self.codec.and_then(end_of_stream_nal) {
            self.writer
                .write_all(eos)
                .map_err(|e| ArgandError::mux(format!("failed to write end of stream: {e}")))?;
        }
        self.writer
            .flush()
            .map_err(|e| ArgandError::mux(format!("failed to flush output: {e}")))
    }
}

/// Event recorded by [`InMemoryMuxer`].
#[derive(Clone, Debug, PartialEq)]
pub enum MuxEvent {
    /// Header with the stream parameters.
    Header(StreamParams),
    /// One packet, timestamp already rescaled.
    Packet(Packet),
    /// Trailer.
    Trailer,
}

/// In-memory muxer for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemoryMuxer {
    time_base: Option<Rational>,
    events: Vec<MuxEvent>,
}

impl InMemoryMuxer {
    /// Create a muxer whose stream time base equals the encoder time base.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a muxer with its own stream time base.
    pub fn with_time_base(time_base: Rational) -> Self {
        Self {
            time_base: Some(time_base),
            events: Vec::new(),
        }
    }

    /// Borrow the recorded events in write order.
    pub fn events(&self) -> &[MuxEvent] {
        &self.events
    }

    /// Recorded packets in write order.
    pub fn packets(&self) -> impl Iterator<Item = &Packet> + '_ {
        self.events.iter().filter_map(|e| match e {
            MuxEvent::Packet(p) => Some(p),
            _ => None,
        })
    }
}

impl Muxer for InMemoryMuxer {
    fn stream_time_base(&self, params: &StreamParams) -> Rational {
        self.time_base.unwrap_or(params.time_base)
    }

    fn write_header(&mut self, params: &StreamParams) -> ArgandResult<()> {
        self.events.push(MuxEvent::Header(params.clone()));
        Ok(())
    }

    fn write_packet(&mut self, packet: &Packet) -> ArgandResult<()> {
        self.events.push(MuxEvent::Packet(packet.clone()));
        Ok(())
    }

    fn write_trailer(&mut self) -> ArgandResult<()> {
        self.events.push(MuxEvent::Trailer);
        Ok(())
    }
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> ArgandResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/mux.rs"]
mod tests;
