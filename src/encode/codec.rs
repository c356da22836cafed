use crate::foundation::core::Rational;
use crate::foundation::error::{ArgandError, ArgandResult};
use crate::render::frame::FrameBuffer;

/// Codec of the elementary stream produced by an encoder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodecKind {
    /// H.264 / AVC, Annex-B byte stream.
    H264,
    /// H.265 / HEVC, Annex-B byte stream.
    Hevc,
    /// Uncompressed packed RGB24, one packet per frame.
    RawVideo,
}

impl CodecKind {
    /// Classify an encoder by its ffmpeg name (`h264_nvenc`, `libx264`, `hevc_qsv`, ...).
    pub fn from_encoder_name(name: &str) -> ArgandResult<Self> {
        match name {
            "libx264" | "libopenh264" => Ok(Self::H264),
            "libx265" => Ok(Self::Hevc),
            "rawvideo" => Ok(Self::RawVideo),
            n if n.starts_with("h264_") => Ok(Self::H264),
            n if n.starts_with("hevc_") => Ok(Self::Hevc),
            other => Err(ArgandError::validation(format!(
                "unsupported encoder '{other}' (expected an h264/hevc encoder or 'rawvideo')"
            ))),
        }
    }

    /// Name of the matching ffmpeg raw elementary-stream format.
    pub fn ffmpeg_format(self) -> &'static str {
        match self {
            Self::H264 => "h264",
            Self::Hevc => "hevc",
            Self::RawVideo => "rawvideo",
        }
    }
}

/// Stream parameters an encoder was configured with. Written once into the container header.
#[derive(Clone, Debug, PartialEq)]
pub struct StreamParams {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Unit of encoder timestamps.
    pub time_base: Rational,
    /// Nominal frame rate.
    pub frame_rate: Rational,
    /// Elementary stream codec.
    pub codec: CodecKind,
    /// Target bit rate in bits per second (0 when not applicable).
    pub bit_rate: u64,
    /// Distance between intra frames.
    pub gop_size: u32,
}

/// One encoded bitstream unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Packet {
    /// Presentation timestamp, in the encoder time base until the muxer rescales it.
    pub pts: i64,
    /// Encoded bytes.
    pub data: Vec<u8>,
    /// Whether the packet starts a decodable sequence.
    pub keyframe: bool,
}

impl Packet {
    /// Payload size in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Input to [`VideoEncoder::send`].
#[derive(Clone, Copy, Debug)]
pub enum Submission<'a> {
    /// A finished frame with its presentation timestamp (encoder time base).
    Frame {
        /// Pixels to encode. The encoder may keep a shared handle to them.
        buffer: &'a FrameBuffer,
        /// Presentation timestamp.
        pts: i64,
    },
    /// No more frames follow; the encoder should emit everything it still buffers.
    EndOfStream,
}

/// Result of asking an encoder for output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Received {
    /// A packet is ready.
    Packet(Packet),
    /// Nothing ready yet; submit more input first.
    Again,
    /// End of stream was submitted and every packet has been returned.
    Eof,
}

/// Stateful encoder capability driven through a submit/receive protocol.
///
/// Packets come out in non-decreasing encode order, possibly delayed with respect to
/// submissions: one submission may yield zero, one or several packets.
pub trait VideoEncoder: Send {
    /// Parameters the encoder was opened with.
    fn params(&self) -> &StreamParams;

    /// Submit a frame or the end-of-stream marker.
    ///
    /// Errors are terminal ([`ArgandError::Encoder`]); nothing is retried.
    fn send(&mut self, submission: Submission<'_>) -> ArgandResult<()>;

    /// Request the next ready packet.
    ///
    /// After [`Submission::EndOfStream`] this must not return [`Received::Again`]: it blocks
    /// until the next packet is ready or returns [`Received::Eof`].
    fn receive(&mut self) -> ArgandResult<Received>;
}

impl<T: VideoEncoder + ?Sized> VideoEncoder for Box<T> {
    fn params(&self) -> &StreamParams {
        (**self).params()
    }

    fn send(&mut self, submission: Submission<'_>) -> ArgandResult<()> {
        (**self).send(submission)
    }

    fn receive(&mut self) -> ArgandResult<Received> {
        (**self).receive()
    }
}
