#![forbid(unsafe_code)]

pub type Unit = euclid::UnknownUnit;

pub type Point = euclid::Point2D<f64, Unit>;
pub type Vector = euclid::Vector2D<f64, Unit>;
pub type Size = euclid::Size2D<f64, Unit>;
pub type Rect = euclid::Rect<f64, Unit>;
pub type Transform = euclid::Transform2D<f64, Unit, Unit>;

pub fn point(x: f64, y: f64) -> Point {
    euclid::point2(x, y)
}

pub fn vector(x: f64, y: f64) -> Vector {
    euclid::vec2(x, y)
}

pub fn to_radians(degrees: f64) -> f64 {
    degrees * std::f64::consts::PI / 180.0
}

pub fn to_degrees(radians: f64) -> f64 {
    radians * 180.0 / std::f64::consts::PI
}

/// Converts a polar position to Cartesian coordinates.
///
/// Chord charts use a "12 o'clock is zero" convention with angles growing
/// clockwise and y increasing downwards, so `x = sin(a) * r` and
/// `y = -cos(a) * r`.
pub fn polar_x(angle: f64, radius: f64) -> f64 {
    angle.sin() * radius
}

pub fn polar_y(angle: f64, radius: f64) -> f64 {
    -angle.cos() * radius
}

pub fn polar_point(angle: f64, radius: f64) -> Point {
    point(polar_x(angle, radius), polar_y(angle, radius))
}

/// Arc length swept between two angles (radians) at the given radius.
pub fn arc_length(start_angle: f64, end_angle: f64, radius: f64) -> f64 {
    (end_angle - start_angle).abs() * radius
}

/// True when the arc lies strictly inside the lower half of the chart
/// (between 90 and 270 degrees).
pub fn is_arc_in_lower_quadrants(start_angle: f64, end_angle: f64) -> bool {
    let quarter = std::f64::consts::FRAC_PI_2;
    start_angle > quarter && end_angle < 3.0 * quarter
}
