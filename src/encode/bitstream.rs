//! Annex-B byte stream helpers.
//!
//! ffmpeg writes H.264/HEVC elementary streams as one continuous byte stream. With access unit
//! delimiters inserted, every access unit (one coded picture) starts with an AUD NAL unit, so
//! the stream can be cut back into per-picture packets.

use crate::encode::codec::CodecKind;

const H264_NAL_AUD: u8 = 9;
const H264_NAL_IDR: u8 = 5;
const HEVC_NAL_AUD: u8 = 35;

fn nal_type(codec: CodecKind, header: u8) -> Option<u8> {
    match codec {
        CodecKind::H264 => Some(header & 0x1f),
        CodecKind::Hevc => Some((header >> 1) & 0x3f),
        CodecKind::RawVideo => None,
    }
}

fn is_access_unit_delimiter(codec: CodecKind, header: u8) -> bool {
    match codec {
        CodecKind::H264 => nal_type(codec, header) == Some(H264_NAL_AUD),
        CodecKind::Hevc => nal_type(codec, header) == Some(HEVC_NAL_AUD),
        CodecKind::RawVideo => false,
    }
}

fn is_random_access_point(codec: CodecKind, header: u8) -> bool {
    match (codec, nal_type(codec, header)) {
        (CodecKind::H264, Some(t)) => t == H264_NAL_IDR,
        // BLA, IDR and CRA pictures (IRAP range 16..=21).
        (CodecKind::Hevc, Some(t)) => (16..=21).contains(&t),
        _ => false,
    }
}

/// Header bytes of every NAL unit in `data` (the byte right after each `00 00 01`).
fn nal_headers(data: &[u8]) -> impl Iterator<Item = u8> + '_ {
    data.windows(4)
        .filter(|w| w[0] == 0 && w[1] == 0 && w[2] == 1)
        .map(|w| w[3])
}

/// Return `true` when the access unit contains an intra random access picture.
pub fn contains_keyframe(codec: CodecKind, access_unit: &[u8]) -> bool {
    nal_headers(access_unit).any(|h| is_random_access_point(codec, h))
}

/// End-of-stream NAL unit appended after the last access unit, if the codec has one.
pub fn end_of_stream_nal(codec: CodecKind) -> Option<&'static [u8]> {
    match codec {
        CodecKind::H264 => Some(&[0, 0, 0, 1, 0x0b]),
        CodecKind::Hevc => Some(&[0, 0, 0, 1, 0x4a, 0x01]),
        CodecKind::RawVideo => None,
    }
}

/// Incremental splitter from an AUD-delimited Annex-B byte stream into access units.
///
/// Bytes may arrive in arbitrary chunks; start codes split across chunks are handled.
#[derive(Debug)]
pub struct AccessUnitSplitter {
    codec: CodecKind,
    buf: Vec<u8>,
    scan: usize,
}

impl AccessUnitSplitter {
    /// Create a splitter for `codec`.
    pub fn new(codec: CodecKind) -> Self {
        Self {
            codec,
            buf: Vec::new(),
            scan: 0,
        }
    }

    /// Feed bytes; returns every access unit completed by them, in stream order.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<Vec<u8>> {
        self.buf.extend_from_slice(bytes);
        let mut out = Vec::new();
        while let Some(at) = self.next_boundary() {
            out.push(self.buf.drain(..at).collect());
            self.scan = 0;
        }
        out
    }

    /// Return the trailing access unit once the stream has ended.
    pub fn finish(&mut self) -> Option<Vec<u8>> {
        self.scan = 0;
        if self.buf.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.buf))
        }
    }

    // Offset of the first AUD start code after offset 0, including a leading zero byte of a
    // four-byte start code.
    fn next_boundary(&mut self) -> Option<usize> {
        let buf = &self.buf;
        let mut i = self.scan.max(1);
        while i + 3 < buf.len() {
            if buf[i] == 0 && buf[i + 1] == 0 && buf[i + 2] == 1 {
                if is_access_unit_delimiter(self.codec, buf[i + 3]) {
                    let start = if buf[i - 1] == 0 { i - 1 } else { i };
                    if start > 0 {
                        return Some(start);
                    }
                }
                i += 3;
            } else {
                i += 1;
            }
        }
        self.scan = i;
        None
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/bitstream.rs"]
mod tests;
