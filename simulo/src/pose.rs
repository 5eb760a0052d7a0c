use glam::Vec2;

use crate::raw::PoseData;

/// Number of keypoints in a [`Pose`].
pub const KEYPOINTS: usize = 17;

/// A tracked human pose.
///
/// Keypoints follow the COCO layout and are given in window coordinates.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pose(PoseData);

impl Pose {
    pub const NOSE: usize = 0;
    pub const LEFT_EYE: usize = 1;
    pub const RIGHT_EYE: usize = 2;
    pub const LEFT_EAR: usize = 3;
    pub const RIGHT_EAR: usize = 4;
    pub const LEFT_SHOULDER: usize = 5;
    pub const RIGHT_SHOULDER: usize = 6;
    pub const LEFT_ELBOW: usize = 7;
    pub const RIGHT_ELBOW: usize = 8;
    pub const LEFT_WRIST: usize = 9;
    pub const RIGHT_WRIST: usize = 10;
    pub const LEFT_HIP: usize = 11;
    pub const RIGHT_HIP: usize = 12;
    pub const LEFT_KNEE: usize = 13;
    pub const RIGHT_KNEE: usize = 14;
    pub const LEFT_ANKLE: usize = 15;
    pub const RIGHT_ANKLE: usize = 16;

    #[inline]
    pub const fn new(data: PoseData) -> Self {
        Self(data)
    }

    pub fn nose(&self) -> Vec2 {
        self.keypoint(Self::NOSE)
    }

    pub fn left_eye(&self) -> Vec2 {
        self.keypoint(Self::LEFT_EYE)
    }

    pub fn right_eye(&self) -> Vec2 {
        self.keypoint(Self::RIGHT_EYE)
    }

    pub fn left_ear(&self) -> Vec2 {
        self.keypoint(Self::LEFT_EAR)
    }

    pub fn right_ear(&self) -> Vec2 {
        self.keypoint(Self::RIGHT_EAR)
    }

    pub fn left_shoulder(&self) -> Vec2 {
        self.keypoint(Self::LEFT_SHOULDER)
    }

    pub fn right_shoulder(&self) -> Vec2 {
        self.keypoint(Self::RIGHT_SHOULDER)
    }

    pub fn left_elbow(&self) -> Vec2 {
        self.keypoint(Self::LEFT_ELBOW)
    }

    pub fn right_elbow(&self) -> Vec2 {
        self.keypoint(Self::RIGHT_ELBOW)
    }

    pub fn left_wrist(&self) -> Vec2 {
        self.keypoint(Self::LEFT_WRIST)
    }

    pub fn right_wrist(&self) -> Vec2 {
        self.keypoint(Self::RIGHT_WRIST)
    }

    pub fn left_hip(&self) -> Vec2 {
        self.keypoint(Self::LEFT_HIP)
    }

    pub fn right_hip(&self) -> Vec2 {
        self.keypoint(Self::RIGHT_HIP)
    }

    pub fn left_knee(&self) -> Vec2 {
        self.keypoint(Self::LEFT_KNEE)
    }

    pub fn right_knee(&self) -> Vec2 {
        self.keypoint(Self::RIGHT_KNEE)
    }

    pub fn left_ankle(&self) -> Vec2 {
        self.keypoint(Self::LEFT_ANKLE)
    }

    pub fn right_ankle(&self) -> Vec2 {
        self.keypoint(Self::RIGHT_ANKLE)
    }

    /// Returns the keypoint at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= KEYPOINTS`.
    #[track_caller]
    pub fn keypoint(&self, index: usize) -> Vec2 {
        match self.get(index) {
            Some(point) => point,
            None => panic!("keypoint index {} out of range", index),
        }
    }

    pub fn get(&self, index: usize) -> Option<Vec2> {
        if index >= KEYPOINTS {
            return None;
        }

        Some(Vec2::new(self.0[index * 2], self.0[index * 2 + 1]))
    }

    pub fn keypoints(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.0
            .chunks_exact(2)
            .map(|point| Vec2::new(point[0], point[1]))
    }

    /// Returns the average of all keypoints.
    pub fn centroid(&self) -> Vec2 {
        self.keypoints().sum::<Vec2>() / KEYPOINTS as f32
    }

    /// Returns the minimum and maximum corner of the box enclosing all
    /// keypoints.
    pub fn bounding_box(&self) -> (Vec2, Vec2) {
        self.keypoints().fold(
            (Vec2::splat(f32::INFINITY), Vec2::splat(f32::NEG_INFINITY)),
            |(min, max), point| (min.min(point), max.max(point)),
        )
    }

    pub fn as_array(&self) -> &PoseData {
        &self.0
    }
}

impl From<PoseData> for Pose {
    fn from(data: PoseData) -> Self {
        Self(data)
    }
}
