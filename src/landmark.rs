//! Hand landmark data.

use nalgebra::Point3;

/// The number of landmarks reported per detected hand.
pub const NUM_LANDMARKS: usize = 21;

/// An ordered set of the 21 hand landmarks of one detected hand.
///
/// Coordinates are typically in the source image's normalized `[0,1]` range, but [`Landmarks`]
/// itself does not require that. Landmark order is fixed and carries meaning: index 0 is the
/// wrist, index 9 the middle finger's MCP (see [`LandmarkIdx`]).
#[derive(Debug, Clone, PartialEq)]
pub struct Landmarks {
    positions: [Point3<f32>; NUM_LANDMARKS],
}

impl Landmarks {
    /// Creates a landmark set with all positions at the origin.
    pub fn new() -> Self {
        Self {
            positions: [Point3::origin(); NUM_LANDMARKS],
        }
    }

    pub fn from_positions(positions: [Point3<f32>; NUM_LANDMARKS]) -> Self {
        Self { positions }
    }

    /// Creates a landmark set from a slice of raw coordinate triples.
    ///
    /// Returns [`None`] if `coords` does not contain exactly 21 entries; callers are expected to
    /// reject such input at their own boundary.
    pub fn from_coords(coords: &[[f32; 3]]) -> Option<Self> {
        if coords.len() != NUM_LANDMARKS {
            return None;
        }
        let mut landmarks = Self::new();
        for (pos, &[x, y, z]) in landmarks.positions.iter_mut().zip(coords) {
            *pos = Point3::new(x, y, z);
        }
        Some(landmarks)
    }

    /// Returns a landmark's position by index.
    pub fn position(&self, index: LandmarkIdx) -> Point3<f32> {
        self.positions[index as usize]
    }

    pub fn positions(&self) -> &[Point3<f32>; NUM_LANDMARKS] {
        &self.positions
    }

    pub fn positions_mut(&mut self) -> &mut [Point3<f32>; NUM_LANDMARKS] {
        &mut self.positions
    }

    /// The translation reference point of the hand.
    pub fn wrist(&self) -> Point3<f32> {
        self.position(LandmarkIdx::Wrist)
    }

    /// The scale reference point: the middle finger's base knuckle.
    pub fn middle_finger_mcp(&self) -> Point3<f32> {
        self.position(LandmarkIdx::MiddleFingerMcp)
    }
}

impl Default for Landmarks {
    fn default() -> Self {
        Self::new()
    }
}

/// Names for the hand pose landmarks.
///
/// # Terminology
///
/// - **CMC**: Carpometacarpal joint, the lowest joint of the thumb, located near the wrist.
/// - **MCP**: Metacarpophalangeal joint, the lower joint forming the knuckles near the palm of
///   the hand.
/// - **PIP**: Proximal Interphalangeal joint, the joint between the MCP and DIP.
/// - **DIP**: Distal Interphalangeal joint, the highest joint of a finger.
/// - **Tip**: This landmark is just placed on the tip of the finger, above the DIP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LandmarkIdx {
    Wrist,
    ThumbCmc,
    ThumbMcp,
    ThumbIp,
    ThumbTip,
    IndexFingerMcp,
    IndexFingerPip,
    IndexFingerDip,
    IndexFingerTip,
    MiddleFingerMcp,
    MiddleFingerPip,
    MiddleFingerDip,
    MiddleFingerTip,
    RingFingerMcp,
    RingFingerPip,
    RingFingerDip,
    RingFingerTip,
    PinkyMcp,
    PinkyPip,
    PinkyDip,
    PinkyTip,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_coords_rejects_wrong_count() {
        assert!(Landmarks::from_coords(&[[0.0; 3]; 20]).is_none());
        assert!(Landmarks::from_coords(&[[0.0; 3]; 22]).is_none());
        assert!(Landmarks::from_coords(&[[0.0; 3]; 21]).is_some());
    }

    #[test]
    fn index_identity() {
        let mut coords = [[0.0; 3]; NUM_LANDMARKS];
        coords[9] = [0.25, 0.5, 0.75];
        let landmarks = Landmarks::from_coords(&coords).unwrap();
        assert_eq!(
            landmarks.middle_finger_mcp(),
            Point3::new(0.25, 0.5, 0.75)
        );
        assert_eq!(landmarks.wrist(), Point3::origin());
        assert_eq!(LandmarkIdx::MiddleFingerMcp as usize, 9);
        assert_eq!(LandmarkIdx::PinkyTip as usize, 20);
    }
}
