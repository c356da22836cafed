use super::*;

#[test]
fn stride_is_padded_and_aligned() {
    let f = FrameBuffer::new(10, 3).unwrap();
    assert_eq!(f.stride(), 64);
    assert_eq!(f.data().len(), 64 * 3);
    assert_eq!(f.offset(2, 1), 64 + 8);

    let tight = FrameBuffer::new(8, 2).unwrap();
    assert_eq!(tight.stride(), 32);
}

#[test]
fn rejects_bad_geometry() {
    assert!(FrameBuffer::new(0, 4).is_err());
    assert!(FrameBuffer::with_stride(4, 4, 15).is_err());
    assert!(matches!(
        FrameBuffer::with_stride(1, u32::MAX, usize::MAX),
        Err(ArgandError::ResourceExhausted(_))
    ));
}

#[test]
fn make_writable_copies_only_when_shared() {
    let mut f = FrameBuffer::new(4, 4).unwrap();
    assert!(f.is_writable());
    assert!(!f.make_writable().unwrap());

    f.data_mut().unwrap()[0] = 7;
    let retained = f.clone();
    assert!(!f.is_writable());
    assert!(f.data_mut().is_none());

    assert!(f.make_writable().unwrap());
    assert!(f.is_writable());
    f.data_mut().unwrap()[0] = 9;

    // The retained handle still sees the bytes from before the copy.
    assert_eq!(retained.data()[0], 7);
    assert_eq!(f.data()[0], 9);
}

#[test]
fn packed_rgb_drops_padding_and_unused_byte() {
    let mut f = FrameBuffer::with_stride(2, 2, 12).unwrap();
    let stride = f.stride();
    let data = f.data_mut().unwrap();
    for y in 0..2 {
        for x in 0..2 {
            let o = stride * y + 4 * x;
            data[o..o + 4].copy_from_slice(&[(10 * y + x) as u8, 1, 2, 99]);
        }
        data[stride * y + 8..stride * (y + 1)].fill(0xEE);
    }
    assert_eq!(
        f.to_packed_rgb(),
        vec![0, 1, 2, 1, 1, 2, 10, 1, 2, 11, 1, 2]
    );
    assert_eq!(f.pixel(1, 1), Some(Rgb8::new(11, 1, 2)));
    assert_eq!(f.pixel(2, 0), None);
    assert_eq!(f.rows().count(), 2);
    assert!(f.rows().all(|r| r.len() == 8));
}
