use crate::geom;
use std::f64::consts::PI;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn degree_radian_conversions_round_trip() {
    assert!(close(geom::to_radians(180.0), PI));
    assert!(close(geom::to_degrees(PI / 2.0), 90.0));
    assert!(close(geom::to_degrees(geom::to_radians(123.4)), 123.4));
}

#[test]
fn angle_zero_points_straight_up() {
    assert!(close(geom::polar_x(0.0, 100.0), 0.0));
    assert!(close(geom::polar_y(0.0, 100.0), -100.0));
}

#[test]
fn angles_grow_clockwise_with_y_down() {
    // 90 degrees is 3 o'clock.
    assert!(close(geom::polar_x(PI / 2.0, 100.0), 100.0));
    assert!(close(geom::polar_y(PI / 2.0, 100.0), 0.0));
    // 180 degrees is 6 o'clock, below the center.
    assert!(close(geom::polar_x(PI, 100.0), 0.0));
    assert!(close(geom::polar_y(PI, 100.0), 100.0));
}

#[test]
fn arc_length_scales_with_radius() {
    assert!(close(geom::arc_length(0.0, PI, 2.0), 2.0 * PI));
    assert!(close(geom::arc_length(PI, 0.0, 2.0), 2.0 * PI));
    assert!(close(geom::arc_length(0.25, 0.25, 10.0), 0.0));
}

#[test]
fn lower_quadrant_test_uses_open_interval() {
    let deg = geom::to_radians;
    assert!(geom::is_arc_in_lower_quadrants(deg(100.0), deg(200.0)));
    assert!(!geom::is_arc_in_lower_quadrants(deg(90.0), deg(200.0)));
    assert!(!geom::is_arc_in_lower_quadrants(deg(100.0), deg(270.0)));
    assert!(!geom::is_arc_in_lower_quadrants(deg(0.0), deg(45.0)));
}
