use super::*;

#[test]
fn transparent_frame_is_zeroed() {
    let f = FrameRGBA::transparent(3, 2);
    assert_eq!(f.data.len(), 3 * 2 * 4);
    assert!(f.data.iter().all(|&b| b == 0));
    assert!(f.is_fully_transparent());
    assert_eq!(f.shape(), (2, 3));
}

#[test]
fn from_premul_rejects_bad_length() {
    assert!(FrameRGBA::from_premul(2, 2, vec![0u8; 15]).is_err());
    assert!(FrameRGBA::from_premul(2, 2, vec![0u8; 16]).is_ok());
}

#[test]
fn pixel_lookup_is_bounds_checked() {
    let f = FrameRGBA::filled(2, 2, Rgba8Premul::from_straight_rgba(0, 255, 0, 255));
    assert_eq!(f.pixel(1, 1), Some([0, 255, 0, 255]));
    assert_eq!(f.pixel(2, 0), None);
    assert_eq!(f.pixel(-1, 0), None);
}

#[test]
fn straight_roundtrip_for_opaque_pixels_is_exact() {
    let raw = vec![10u8, 20, 30, 255, 40, 50, 60, 255];
    let f = FrameRGBA::from_straight(2, 1, raw.clone()).unwrap();
    assert_eq!(f.data, raw);
    assert_eq!(f.to_straight(), raw);
}

#[test]
fn inconsistent_buffer_is_reported_not_sliced() {
    let f = FrameRGBA {
        width: 2,
        height: 2,
        data: vec![0; 8],
    };
    assert!(matches!(f.check_len(), Err(StratumError::Evaluation(_))));
    assert_eq!(f.pixel(0, 0), Some([0, 0, 0, 0]));
    assert_eq!(f.pixel(1, 1), None);
    assert!(FrameRGBA::transparent(2, 2).check_len().is_ok());
}
