//! Floating point helpers shared by the position and autoplay layers.

/// Tolerance used by [`approx_eq`].
pub const EPSILON: f64 = 1e-6;

/// Compares two values with a tolerance scaled by their magnitude.
///
/// Values below 1.0 in magnitude are compared with an absolute tolerance of [`EPSILON`],
/// larger ones with a relative tolerance of the same size. Non-finite values only equal themselves.
#[must_use]
#[allow(clippy::float_cmp)]
pub fn approx_eq(a: f64, b: f64) -> bool {
    if a == b {
        return true;
    }
    if !a.is_finite() || !b.is_finite() {
        return false;
    }
    let scale = a.abs().max(b.abs()).max(1.0);
    (a - b).abs() <= EPSILON * scale
}
