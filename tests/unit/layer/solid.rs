use super::*;

#[test]
fn renders_filled_patch() {
    let l = SolidLayer::new(3, 2, [255, 0, 0, 255], 1.0).unwrap();
    let f = l.render(0.5).unwrap().unwrap();
    assert_eq!((f.width, f.height), (3, 2));
    assert!(f.data.chunks_exact(4).all(|px| px == [255, 0, 0, 255]));
}

#[test]
fn key_is_time_invariant_and_color_sensitive() {
    let red = SolidLayer::new(3, 2, [255, 0, 0, 255], 1.0).unwrap();
    let blue = SolidLayer::new(3, 2, [0, 0, 255, 255], 1.0).unwrap();
    assert_eq!(red.content_key(0.0), red.content_key(0.9));
    assert_ne!(red.content_key(0.0), blue.content_key(0.0));
}

#[test]
fn rejects_invalid_parameters() {
    assert!(SolidLayer::new(0, 2, [0; 4], 1.0).is_err());
    assert!(SolidLayer::new(2, 2, [0; 4], 0.0).is_err());
    assert!(SolidLayer::new(2, 2, [0; 4], f64::NAN).is_err());
}
