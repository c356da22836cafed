use super::*;

const AUD: [u8; 6] = [0, 0, 0, 1, 0x09, 0xf0];
const SPS: [u8; 6] = [0, 0, 0, 1, 0x67, 0x42];
const IDR: [u8; 6] = [0, 0, 1, 0x65, 0x88, 0x84];
const SLICE: [u8; 6] = [0, 0, 1, 0x41, 0x9a, 0x02];

fn stream() -> (Vec<u8>, Vec<Vec<u8>>) {
    let units = vec![
        [&AUD[..], &SPS[..], &IDR[..]].concat(),
        [&AUD[..], &SLICE[..]].concat(),
        [&AUD[..], &SLICE[..], &[0xde, 0xad][..]].concat(),
    ];
    (units.concat(), units)
}

#[test]
fn splits_whole_stream_into_access_units() {
    let (bytes, units) = stream();
    let mut s = AccessUnitSplitter::new(CodecKind::H264);
    let mut got = s.push(&bytes);
    got.extend(s.finish());
    assert_eq!(got, units);
    assert_eq!(s.finish(), None);
}

#[test]
fn split_is_independent_of_chunking() {
    let (bytes, units) = stream();
    for chunk in [1usize, 2, 3, 5, 7] {
        let mut s = AccessUnitSplitter::new(CodecKind::H264);
        let mut got = Vec::new();
        for c in bytes.chunks(chunk) {
            got.extend(s.push(c));
        }
        got.extend(s.finish());
        assert_eq!(got, units, "chunk size {chunk}");
    }
}

#[test]
fn keyframes_are_detected() {
    let (_, units) = stream();
    assert!(contains_keyframe(CodecKind::H264, &units[0]));
    assert!(!contains_keyframe(CodecKind::H264, &units[1]));

    // HEVC IDR_W_RADL (type 19): header byte 19 << 1 = 0x26.
    let hevc = [0, 0, 0, 1, 0x46, 0x01, 0, 0, 1, 0x26, 0x01, 0xaf];
    assert!(contains_keyframe(CodecKind::Hevc, &hevc));
    assert!(!contains_keyframe(CodecKind::RawVideo, &hevc));
}

#[test]
fn hevc_delimiters_split() {
    let aud = [0u8, 0, 0, 1, 0x46, 0x01, 0x50];
    let trail = [0u8, 0, 1, 0x02, 0x01, 0xd0];
    let stream = [&aud[..], &trail[..], &aud[..], &trail[..]].concat();
    let mut s = AccessUnitSplitter::new(CodecKind::Hevc);
    let mut got = s.push(&stream);
    got.extend(s.finish());
    assert_eq!(got.len(), 2);
    assert_eq!(got[0], [&aud[..], &trail[..]].concat());
}

#[test]
fn end_of_stream_units() {
    assert_eq!(end_of_stream_nal(CodecKind::H264), Some(&[0u8, 0, 0, 1, 0x0b][..]));
    assert!(end_of_stream_nal(CodecKind::RawVideo).is_none());
}
