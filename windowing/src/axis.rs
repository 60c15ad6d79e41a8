use crate::{Axis, ItemBounds};

/// Detects the axis along which rendered items stack.
///
/// Uses the *last* two bounds so items already relocated off-canvas at the front of
/// the window do not confuse the check. Returns `None` with fewer than two items or
/// when items neither stack vertically nor horizontally (grid/flow layouts).
pub fn detect_stacking_axis(items: &[ItemBounds]) -> Option<Axis> {
    let [.., a, b] = items else {
        return None;
    };

    if b.top >= a.bottom {
        Some(Axis::Vertical)
    } else if b.left >= a.right {
        Some(Axis::Horizontal)
    } else {
        None
    }
}
