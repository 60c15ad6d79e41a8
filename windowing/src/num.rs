//! Float helpers that work without `std` (no `f64::floor`/`ceil` in `core`).

/// Comparisons below this are treated as equal.
pub(crate) const TOLERANCE: f64 = 1e-3;

pub(crate) fn non_negative(x: f64) -> f64 {
    if x > 0.0 { x } else { 0.0 }
}

pub(crate) fn abs(x: f64) -> f64 {
    if x < 0.0 { -x } else { x }
}

pub(crate) fn approx_eq(a: f64, b: f64) -> bool {
    abs(a - b) <= TOLERANCE
}

/// `floor(x)` as an item count; negative and NaN inputs give `0`.
pub(crate) fn floor_count(x: f64) -> usize {
    if x > 0.0 { x as usize } else { 0 }
}

/// `ceil(x)` as an item count; negative and NaN inputs give `0`.
pub(crate) fn ceil_count(x: f64) -> usize {
    if !(x > 0.0) {
        return 0;
    }
    let t = x as usize;
    if (t as f64) < x { t.saturating_add(1) } else { t }
}
