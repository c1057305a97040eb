use super::*;
use crate::foundation::core::{Rgba8Premul, Vec2};

fn checker(w: u32, h: u32) -> FrameRGBA {
    let mut data = Vec::with_capacity((w * h * 4) as usize);
    for y in 0..h {
        for x in 0..w {
            let v = if (x + y) % 2 == 0 { 255 } else { 40 };
            data.extend_from_slice(&[v, 0, 0, 255]);
        }
    }
    FrameRGBA::from_premul(w, h, data).unwrap()
}

#[test]
fn identity_reproduces_patch() {
    let patch = checker(4, 3);
    let mut canvas = FrameRGBA::transparent(4, 3);
    place_patch(&mut canvas, &patch, Affine::IDENTITY, 1.0).unwrap();
    assert_eq!(canvas, patch);
}

#[test]
fn integer_translation_clips_at_edges() {
    let patch = FrameRGBA::filled(2, 2, Rgba8Premul::from_straight_rgba(0, 0, 255, 255));
    let mut canvas = FrameRGBA::transparent(3, 3);
    place_patch(
        &mut canvas,
        &patch,
        Affine::translate(Vec2::new(2.0, -1.0)),
        1.0,
    )
    .unwrap();
    assert_eq!(canvas.pixel(2, 0), Some([0, 0, 255, 255]));
    assert_eq!(canvas.pixel(1, 0), Some([0, 0, 0, 0]));
    assert_eq!(canvas.pixel(2, 1), Some([0, 0, 0, 0]));
}

#[test]
fn half_opacity_halves_premultiplied_channels() {
    let patch = FrameRGBA::filled(2, 2, Rgba8Premul::from_straight_rgba(200, 100, 0, 255));
    let mut canvas = FrameRGBA::transparent(2, 2);
    place_patch(&mut canvas, &patch, Affine::IDENTITY, 0.5).unwrap();
    assert_eq!(canvas.pixel(0, 0), Some([100, 50, 0, 128]));
}

#[test]
fn downscale_keeps_solid_color() {
    let patch = FrameRGBA::filled(8, 8, Rgba8Premul::from_straight_rgba(255, 0, 0, 255));
    let mut canvas = FrameRGBA::transparent(2, 2);
    place_patch(&mut canvas, &patch, Affine::scale(0.25), 1.0).unwrap();
    assert_eq!(canvas, FrameRGBA::filled(2, 2, Rgba8Premul::from_straight_rgba(255, 0, 0, 255)));
}

#[test]
fn degenerate_scale_draws_nothing() {
    let patch = checker(4, 4);
    let mut canvas = FrameRGBA::transparent(4, 4);
    place_patch(&mut canvas, &patch, Affine::scale(0.0), 1.0).unwrap();
    assert!(canvas.is_fully_transparent());
}

#[test]
fn fractional_offset_spreads_coverage() {
    let patch = FrameRGBA::filled(1, 1, Rgba8Premul::from_straight_rgba(255, 255, 255, 255));
    let mut canvas = FrameRGBA::transparent(3, 1);
    place_patch(
        &mut canvas,
        &patch,
        Affine::translate(Vec2::new(0.5, 0.0)),
        1.0,
    )
    .unwrap();
    let a0 = canvas.pixel(0, 0).unwrap()[3];
    let a1 = canvas.pixel(1, 0).unwrap()[3];
    assert!(a0 > 0 && a0 < 255);
    assert!(a1 > 0 && a1 < 255);
    assert_eq!(canvas.pixel(2, 0), Some([0, 0, 0, 0]));
}

#[test]
fn far_integer_offsets_draw_nothing() {
    let patch = checker(2, 2);
    for offset in [Vec2::new(1e19, 0.0), Vec2::new(0.0, -1e19), Vec2::new(4e9, 4e9)] {
        let mut canvas = FrameRGBA::transparent(4, 4);
        place_patch(&mut canvas, &patch, Affine::translate(offset), 1.0).unwrap();
        assert!(canvas.is_fully_transparent());
    }
}

#[test]
fn short_patch_buffer_is_an_error() {
    let patch = FrameRGBA {
        width: 4,
        height: 4,
        data: vec![0; 8],
    };
    let mut canvas = FrameRGBA::transparent(4, 4);
    for affine in [Affine::IDENTITY, Affine::scale(0.5)] {
        assert!(matches!(
            place_patch(&mut canvas, &patch, affine, 1.0),
            Err(crate::foundation::error::StratumError::Evaluation(_))
        ));
    }
    assert!(canvas.is_fully_transparent());
}
