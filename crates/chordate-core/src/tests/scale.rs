use crate::scale::{LinearScale, radius_from_dimensions};
use std::f64::consts::PI;

#[test]
fn linear_scale_maps_domain_onto_range() {
    let scale = LinearScale::new(0.0, 10.0, 0.0, 2.0 * PI);
    assert_eq!(scale.map(0.0), 0.0);
    assert_eq!(scale.map(10.0), 2.0 * PI);
    assert!((scale.map(5.0) - PI).abs() < 1e-12);
}

#[test]
fn linear_scale_extrapolates_outside_the_domain() {
    let scale = LinearScale::new(0.0, 10.0, 0.0, 100.0);
    assert_eq!(scale.map(-5.0), -50.0);
    assert_eq!(scale.map(20.0), 200.0);
}

#[test]
fn linear_scale_supports_inverted_ranges() {
    let scale = LinearScale::new(0.0, 1.0, 100.0, 0.0);
    assert_eq!(scale.map(0.25), 75.0);
}

#[test]
fn degenerate_domain_maps_to_range_midpoint() {
    let scale = LinearScale::new(3.0, 3.0, 0.0, 10.0);
    assert_eq!(scale.map(3.0), 5.0);
    assert_eq!(scale.map(-100.0), 5.0);
}

#[test]
fn radius_uses_the_smaller_half_extent_minus_offset() {
    assert_eq!(radius_from_dimensions(200.0, 100.0, 10.0), 40.0);
    assert_eq!(radius_from_dimensions(100.0, 200.0, 10.0), 40.0);
    assert_eq!(radius_from_dimensions(600.0, 800.0, 120.0), 180.0);
}
