//! Landmark flattening

use super::HandLandmarks;

/// Flatten the first detected hand into `[x0, y0, z0, x1, y1, z1, ...]`
///
/// Returns `None` when no hand was detected. Extra hands are ignored.
#[must_use]
pub fn feature_vector(hands: &[HandLandmarks]) -> Option<Vec<f32>> {
    let hand = hands.first()?;
    Some(
        hand.points
            .iter()
            .flat_map(|p| [p.x, p.y, p.z])
            .collect(),
    )
}
