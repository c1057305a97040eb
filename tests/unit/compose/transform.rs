use super::*;
use crate::foundation::core::Point;

fn approx(a: Point, b: Point) -> bool {
    (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
}

#[test]
fn centered_origin_places_patch_center_on_position() {
    let t = Transform::at(Vec2::new(50.0, 40.0));
    let a = t.layer_to_canvas(20, 10, Origin::Center, 1);
    assert!(approx(a * Point::new(10.0, 5.0), Point::new(50.0, 40.0)));
    assert!(approx(a * Point::new(0.0, 0.0), Point::new(40.0, 35.0)));
}

#[test]
fn top_left_origin_places_corner_on_position() {
    let t = Transform::at(Vec2::new(3.0, 4.0));
    let a = t.layer_to_canvas(20, 10, Origin::TopLeft, 1);
    assert!(approx(a * Point::ORIGIN, Point::new(3.0, 4.0)));
}

#[test]
fn preview_level_scales_everything() {
    let t = Transform::at(Vec2::new(50.0, 50.0));
    let a = t.layer_to_canvas(100, 100, Origin::Center, 4);
    assert!(approx(a * Point::ORIGIN, Point::ORIGIN));
    assert!(approx(a * Point::new(100.0, 100.0), Point::new(25.0, 25.0)));
}

#[test]
fn rotation_pivots_around_origin_point() {
    let t = Transform {
        position: Vec2::new(10.0, 10.0),
        rotation: 90.0,
        ..Transform::default()
    };
    let a = t.layer_to_canvas(4, 4, Origin::Center, 1);
    assert!(approx(a * Point::new(2.0, 2.0), Point::new(10.0, 10.0)));
    // Clockwise on a y-down grid: +x maps to +y.
    assert!(approx(a * Point::new(3.0, 2.0), Point::new(10.0, 11.0)));
}

#[test]
fn anchor_point_shifts_pivot() {
    let t = Transform {
        position: Vec2::new(0.0, 0.0),
        anchor_point: Vec2::new(-5.0, 0.0),
        ..Transform::default()
    };
    let a = t.layer_to_canvas(10, 10, Origin::Center, 1);
    assert!(approx(a * Point::new(0.0, 5.0), Point::ORIGIN));
}

#[test]
fn key_ignores_signed_zero_and_tracks_fields() {
    let a = Transform::at(Vec2::new(0.0, 0.0));
    let b = Transform::at(Vec2::new(-0.0, 0.0));
    assert_eq!(a.key(), b.key());

    let c = Transform {
        opacity: 0.5,
        ..a
    };
    assert_ne!(a.key(), c.key());
}

#[test]
fn effective_opacity_clamps() {
    let mut t = Transform::default();
    t.opacity = 2.0;
    assert_eq!(t.effective_opacity(), 1.0);
    t.opacity = f64::NAN;
    assert_eq!(t.effective_opacity(), 0.0);
}
