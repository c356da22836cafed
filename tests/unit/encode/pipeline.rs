use super::*;
use crate::encode::codec::{CodecKind, Packet, StreamParams};
use crate::encode::mux::{InMemoryMuxer, MuxEvent};
use crate::encode::raw::RawVideoEncoder;
use crate::foundation::core::Rational;
use std::collections::VecDeque;

fn params() -> StreamParams {
    StreamParams {
        width: 2,
        height: 2,
        time_base: Rational::new(1, 30).unwrap(),
        frame_rate: Rational::new(30, 1).unwrap(),
        codec: CodecKind::H264,
        bit_rate: 1_000_000,
        gop_size: 10,
    }
}

/// Emits, per submission, as many packets as scripted; everything buffered comes out on flush.
struct ScriptedEncoder {
    params: StreamParams,
    per_submit: VecDeque<usize>,
    held: VecDeque<i64>,
    ready: VecDeque<i64>,
    eof: bool,
    fail_send_at: Option<u64>,
    stall_after_flush: bool,
    sent: u64,
}

impl ScriptedEncoder {
    fn new(per_submit: &[usize]) -> Self {
        Self {
            params: params(),
            per_submit: per_submit.iter().copied().collect(),
            held: VecDeque::new(),
            ready: VecDeque::new(),
            eof: false,
            fail_send_at: None,
            stall_after_flush: false,
            sent: 0,
        }
    }
}

impl VideoEncoder for ScriptedEncoder {
    fn params(&self) -> &StreamParams {
        &self.params
    }

    fn send(&mut self, submission: Submission<'_>) -> ArgandResult<()> {
        if self.fail_send_at == Some(self.sent) {
            return Err(ArgandError::encoder("scripted rejection"));
        }
        self.sent += 1;
        match submission {
            Submission::Frame { pts, .. } => {
                self.held.push_back(pts);
                let n = self.per_submit.pop_front().unwrap_or(1);
                for _ in 0..n {
                    if let Some(p) = self.held.pop_front() {
                        self.ready.push_back(p);
                    }
                }
            }
            Submission::EndOfStream => {
                self.eof = true;
                self.ready.extend(self.held.drain(..));
            }
        }
        Ok(())
    }

    fn receive(&mut self) -> ArgandResult<Received> {
        if let Some(pts) = self.ready.pop_front() {
            return Ok(Received::Packet(Packet {
                pts,
                data: vec![pts as u8; 3],
                keyframe: pts == 0,
            }));
        }
        Ok(if self.eof && !self.stall_after_flush {
            Received::Eof
        } else {
            Received::Again
        })
    }
}

fn frame() -> FrameBuffer {
    FrameBuffer::new(2, 2).unwrap()
}

#[test]
fn header_is_written_on_construction() {
    let p = EncodePipeline::new(ScriptedEncoder::new(&[]), InMemoryMuxer::new()).unwrap();
    assert_eq!(p.state(), PipelineState::Idle);
    let (_, mux) = p.into_parts();
    assert_eq!(mux.events(), &[MuxEvent::Header(params())]);
}

#[test]
fn submissions_may_yield_zero_or_many_packets() {
    let mut p =
        EncodePipeline::new(ScriptedEncoder::new(&[0, 0, 3, 1]), InMemoryMuxer::new()).unwrap();
    let buf = frame();
    let mut per_drain = Vec::new();
    for pts in 0..4 {
        p.submit_frame(&buf, pts).unwrap();
        assert_eq!(p.state(), PipelineState::FrameSubmitted);
        let report = p.drain().unwrap();
        assert_eq!(report.status, DrainStatus::NotReady);
        assert_eq!(p.state(), PipelineState::ReadyForNext);
        per_drain.push(report.packets);
    }
    assert_eq!(per_drain, vec![0, 0, 3, 1]);

    let stats = p.finish().unwrap();
    assert_eq!(stats.frames_submitted, 4);
    assert_eq!(stats.packets_written, 4);
    assert_eq!(p.state(), PipelineState::Drained);
}

#[test]
fn flush_emits_buffered_packets_once_in_order() {
    let mut p =
        EncodePipeline::new(ScriptedEncoder::new(&[0, 0, 0, 0, 0]), InMemoryMuxer::new())
            .unwrap();
    let buf = frame();
    for pts in 0..5 {
        p.submit_frame(&buf, pts).unwrap();
        assert_eq!(p.drain().unwrap().packets, 0);
    }
    p.flush().unwrap();
    assert_eq!(p.state(), PipelineState::Flushing);
    let report = p.drain().unwrap();
    assert_eq!(
        report,
        DrainReport {
            packets: 5,
            status: DrainStatus::EndOfStream
        }
    );
    // Drained is terminal.
    assert_eq!(p.drain().unwrap().packets, 0);
    p.finish().unwrap();

    let (_, mux) = p.into_parts();
    let pts: Vec<i64> = mux.packets().map(|pk| pk.pts).collect();
    assert_eq!(pts, vec![0, 1, 2, 3, 4]);
    assert_eq!(mux.events().last(), Some(&MuxEvent::Trailer));
}

#[test]
fn misuse_is_rejected() {
    let mut p = EncodePipeline::new(ScriptedEncoder::new(&[]), InMemoryMuxer::new()).unwrap();
    let buf = frame();
    p.submit_frame(&buf, 0).unwrap();
    assert!(matches!(
        p.submit_frame(&buf, 1),
        Err(ArgandError::Validation(_))
    ));
    p.drain().unwrap();
    assert!(p.submit_frame(&buf, 0).is_err());

    p.flush().unwrap();
    assert!(p.flush().is_err());
    assert!(matches!(
        p.submit_frame(&buf, 5),
        Err(ArgandError::Validation(_))
    ));
    p.finish().unwrap();
    // The trailer is written exactly once.
    assert!(matches!(p.finish(), Err(ArgandError::Mux(_))));
}

#[test]
fn encoder_rejection_propagates_as_encoder_error() {
    let mut enc = ScriptedEncoder::new(&[]);
    enc.fail_send_at = Some(1);
    let mut p = EncodePipeline::new(enc, InMemoryMuxer::new()).unwrap();
    let buf = frame();
    p.submit_frame(&buf, 0).unwrap();
    p.drain().unwrap();
    let err = p.submit_frame(&buf, 1).unwrap_err();
    assert!(err.is_encoder());
    assert_eq!(p.stats().frames_submitted, 1);
}

#[test]
fn raw_encoder_with_lookahead_end_to_end() {
    let enc = RawVideoEncoder::new(2, 2, Rational::new(30, 1).unwrap(), 3).unwrap();
    let mux = InMemoryMuxer::with_time_base(Rational::new(1, 90_000).unwrap());
    let mut p = EncodePipeline::new(enc, mux).unwrap();
    let mut buf = frame();
    for pts in 0..6 {
        buf.make_writable().unwrap();
        buf.data_mut().unwrap().fill(pts as u8);
        p.submit_frame(&buf, pts).unwrap();
        p.drain().unwrap();
    }
    let stats = p.finish().unwrap();
    assert_eq!(stats.packets_written, 6);

    let (_, mux) = p.into_parts();
    let packets: Vec<&Packet> = mux.packets().collect();
    for (i, pk) in packets.iter().enumerate() {
        assert_eq!(pk.pts, i as i64 * 3000);
        assert!(pk.data.iter().all(|&b| b == i as u8));
    }
}

#[test]
fn encoder_stalling_after_flush_is_an_error() {
    let mut enc = ScriptedEncoder::new(&[0]);
    enc.stall_after_flush = true;
    let mut p = EncodePipeline::new(enc, InMemoryMuxer::new()).unwrap();
    p.submit_frame(&frame(), 0).unwrap();
    p.drain().unwrap();

    let err = p.finish().unwrap_err();
    assert!(err.is_encoder(), "{err}");
    assert_eq!(p.state(), PipelineState::Flushing);
    let (_, mux) = p.into_parts();
    assert!(!mux.events().contains(&MuxEvent::Trailer));
}
