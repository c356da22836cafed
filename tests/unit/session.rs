use super::*;
use crate::encode::mux::{InMemoryMuxer, MuxEvent};
use crate::foundation::complex::Complex;
use crate::render::color::Rgb8;

fn small(frames: u64) -> AnimationConfig {
    AnimationConfig {
        width: 16,
        height: 8,
        frame_count: frames,
        threads: 3,
        ..AnimationConfig::default()
    }
}

#[test]
fn render_frame_rejects_out_of_range_index() {
    let a = Animator::new(small(2)).unwrap();
    a.render_frame(FrameIndex(1)).unwrap();
    assert!(a.render_frame(FrameIndex(2)).is_err());
}

#[test]
fn custom_formula_drives_every_pixel() {
    let formula: Arc<dyn Formula> = Arc::new(|_z: Complex, _f: FrameIndex| Complex::I);
    let a = Animator::with_formula(small(1), formula).unwrap();
    let frame = a.render_frame(FrameIndex(0)).unwrap();
    for y in 0..8 {
        for x in 0..16 {
            // arg = π/2 sits in the middle of sector 1.
            assert_eq!(frame.pixel(x, y), Some(Rgb8::new(127, 255, 0)));
        }
    }
}

#[test]
fn run_streams_every_frame_with_lookahead() {
    let cfg = AnimationConfig {
        lookahead: 2,
        ..small(5)
    };
    let a = Animator::new(cfg.clone()).unwrap();
    let mut p = EncodePipeline::new(cfg.raw_encoder().unwrap(), InMemoryMuxer::new()).unwrap();

    let stats = a.run(&mut p).unwrap();
    assert_eq!(
        stats,
        RenderStats {
            frames_rendered: 5,
            frames_submitted: 5,
            packets_written: 5,
            bytes_written: 5 * 16 * 8 * 3,
        }
    );

    let (_, mux) = p.into_parts();
    let pts: Vec<i64> = mux.packets().map(|p| p.pts).collect();
    assert_eq!(pts, vec![0, 1, 2, 3, 4]);
    assert!(matches!(mux.events().last(), Some(MuxEvent::Trailer)));
}

#[test]
fn run_rejects_mismatched_encoder() {
    let a = Animator::new(small(1)).unwrap();
    let other = AnimationConfig {
        width: 32,
        ..small(1)
    };
    let mut p = EncodePipeline::new(other.raw_encoder().unwrap(), InMemoryMuxer::new()).unwrap();
    assert!(matches!(a.run(&mut p), Err(ArgandError::Validation(_))));
}

#[test]
fn retained_frames_keep_their_pixels() {
    // PolynomialBlend changes every frame, so a frame held by the encoder must not be
    // overwritten by the next render pass.
    let cfg = AnimationConfig {
        formula: crate::render::formula::FormulaKind::PolynomialBlend,
        lookahead: 4,
        ..small(3)
    };
    let a = Animator::new(cfg.clone()).unwrap();
    let mut p = EncodePipeline::new(cfg.raw_encoder().unwrap(), InMemoryMuxer::new()).unwrap();
    a.run(&mut p).unwrap();

    let (_, mux) = p.into_parts();
    let packets: Vec<_> = mux.packets().collect();
    assert_eq!(packets.len(), 3);
    for (i, packet) in packets.iter().enumerate() {
        let expected = a.render_frame(FrameIndex(i as u64)).unwrap().to_packed_rgb();
        assert_eq!(packet.data, expected, "frame {i}");
    }
}
