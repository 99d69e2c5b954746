//! Geometric landmark normalization.
//!
//! Turns one [`Landmarks`] set into the flat feature vector the classifier consumes. The
//! transform makes the feature space invariant to the hand's position and apparent size in the
//! source image, which is the property the classifier relies on instead of pixel appearance:
//!
//! 1. every point is translated so the wrist becomes the origin,
//! 2. all coordinates are divided by the distance from the wrist to the middle finger's MCP,
//! 3. the 21 points are flattened row-major into 63 values.
//!
//! Step 2 is skipped when that distance is at most [`SCALE_EPSILON`] (for example when all
//! points coincide). In that case the translated-but-unscaled coordinates are returned as-is;
//! degenerate input does not fail.

use crate::landmark::{Landmarks, NUM_LANDMARKS};

/// Length of the feature vector produced by [`normalize`].
pub const FEATURE_DIM: usize = NUM_LANDMARKS * 3;

/// Scale values at or below this threshold disable the scaling step.
///
/// Hard constant; both the training pipeline and the serving path rely on reproducing the same
/// transform bit-for-bit.
pub const SCALE_EPSILON: f32 = 1e-6;

/// Normalizes a landmark set into a translation- and scale-invariant feature vector.
///
/// Pure function: same landmarks in, same 63 values out.
pub fn normalize(landmarks: &Landmarks) -> [f32; FEATURE_DIM] {
    let wrist = landmarks.wrist();
    let scale = (landmarks.middle_finger_mcp() - wrist).norm();

    let mut features = [0.0; FEATURE_DIM];
    for (chunk, pos) in features.chunks_exact_mut(3).zip(landmarks.positions()) {
        let mut rel = pos - wrist;
        if scale > SCALE_EPSILON {
            rel /= scale;
        }
        chunk.copy_from_slice(&[rel.x, rel.y, rel.z]);
    }
    features
}
