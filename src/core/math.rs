// Math utilities and helper functions

use glam::Vec2;

/// Linear interpolation
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Sign that treats zero as positive (1.0 or -1.0, never 0.0)
pub fn sign(value: f32) -> f32 {
    if value >= 0.0 {
        1.0
    } else {
        -1.0
    }
}

/// Snap an angle in degrees to the nearest multiple of 90
pub fn quantize_right_angle(degrees: f32) -> f32 {
    (degrees / 90.0).round() * 90.0
}

/// Rotate `point` around `pivot` by `degrees` (counter-clockwise)
pub fn rotate_about(point: Vec2, pivot: Vec2, degrees: f32) -> Vec2 {
    let rotation = Vec2::from_angle(degrees.to_radians());
    pivot + rotation.rotate(point - pivot)
}

/// Quadratic ease-in used by the walk step
pub fn ease_in_quad(t: f32) -> f32 {
    t * t
}
