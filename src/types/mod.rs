//! Basic value types shared by the object model and the codec

pub mod color;
pub mod handle;
pub mod line_weight;
pub mod transparency;
pub mod vector;
pub mod version;

pub use color::Color;
pub use handle::Handle;
pub use line_weight::LineWeight;
pub use transparency::Transparency;
pub use vector::{Vector2, Vector3};
pub use version::DxfVersion;

/// Bring an angle in degrees into `[0, 360)`.
///
/// The result is a fixed point: normalizing twice gives the same bits.
pub fn normalize_angle(degrees: f64) -> f64 {
    if !degrees.is_finite() {
        return degrees;
    }
    let mut a = degrees % 360.0;
    if a < 0.0 {
        a += 360.0;
    }
    if a >= 360.0 || a == 0.0 {
        0.0
    } else {
        a
    }
}
