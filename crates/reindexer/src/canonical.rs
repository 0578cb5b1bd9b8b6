//! Normalisation applied to every parsed scalar.
//!
//! Exporters tend to write values like `0.999999` or `-0.000000`. Snapping them keeps
//! otherwise identical attribute tuples bitwise equal, which the reindexer relies on.

pub const DEFAULT_EPSILON: f32 = 1e-5;

pub fn canonicalize(value: f32) -> f32 {
    canonicalize_with(value, DEFAULT_EPSILON)
}

/// Snaps `value` to the nearest integer if it is within `epsilon` of it, then drops the sign of zero.
pub fn canonicalize_with(value: f32, epsilon: f32) -> f32 {
    let rounded = value.round();
    let value = if (value - rounded).abs() <= epsilon {
        rounded
    } else {
        value
    };

    if value == 0.0 {
        0.0
    } else {
        value
    }
}
