//! Transform helpers for objects in the 2D window plane.
//!
//! All matrices are composed as `translation * rotation * scale * skew`.
//! Rotations are around the z axis and given in radians.

use core::ops::{Mul, MulAssign};

use glam::{Mat4, Vec2, Vec3, Vec4};

pub fn from_2d_pos(position: Vec2) -> Mat4 {
    Mat4::from_translation(position.extend(0.0))
}

pub fn from_2d_pos_scale(position: Vec2, scale: Vec2) -> Mat4 {
    from_2d_pos(position) * Mat4::from_scale(scale.extend(1.0))
}

pub fn from_2d_pos_rotation(position: Vec2, rotation: f32) -> Mat4 {
    from_2d_pos(position) * Mat4::from_rotation_z(rotation)
}

pub fn from_2d_pos_rotation_scale(position: Vec2, rotation: f32, scale: Vec2) -> Mat4 {
    from_2d_pos_rotation(position, rotation) * Mat4::from_scale(scale.extend(1.0))
}

/// `skew.x` shears x along y and `skew.y` shears y along x.
pub fn from_2d_pos_rotation_scale_skew(
    position: Vec2,
    rotation: f32,
    scale: Vec2,
    skew: Vec2,
) -> Mat4 {
    from_2d_pos_rotation_scale(position, rotation, scale)
        * Mat4::from_cols(
            Vec4::new(1.0, skew.y, 0.0, 0.0),
            Vec4::new(skew.x, 1.0, 0.0, 0.0),
            Vec4::Z,
            Vec4::W,
        )
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Transform2d {
    pub position: Vec2,
    pub rotation: f32,
    pub scale: Vec2,
}

impl Transform2d {
    pub const IDENTITY: Self = Self {
        position: Vec2::ZERO,
        rotation: 0.0,
        scale: Vec2::ONE,
    };

    pub const fn from_position(position: Vec2) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    pub const fn from_rotation(rotation: f32) -> Self {
        Self {
            rotation,
            ..Self::IDENTITY
        }
    }

    pub const fn from_scale(scale: Vec2) -> Self {
        Self {
            scale,
            ..Self::IDENTITY
        }
    }

    pub fn compute_matrix(self) -> Mat4 {
        from_2d_pos_rotation_scale(self.position, self.rotation, self.scale)
    }

    /// Returns the transform of `transform` placed in the space of `self`.
    ///
    /// The result is only exact when `self.scale` is uniform, since a 2D
    /// rotation followed by a non-uniform scale cannot be expressed without
    /// skew.
    pub fn mul_transform(self, transform: Transform2d) -> Self {
        if cfg!(debug_assertions) {
            assert_transform(self);
            assert_transform(transform);
        }

        Self {
            position: self.transform_point(transform.position),
            rotation: self.rotation + transform.rotation,
            scale: self.scale * transform.scale,
        }
    }

    pub fn transform_point(self, point: Vec2) -> Vec2 {
        let point = self.compute_matrix().transform_point3(point.extend(0.0));
        Vec2::new(point.x, point.y)
    }

    /// Moves the transform at `velocity` units per second for `delta` seconds.
    pub fn integrate(&mut self, velocity: Vec2, delta: f32) {
        self.position += velocity * delta;
    }

    pub fn is_valid(self) -> bool {
        self.position.is_finite() && self.rotation.is_finite() && self.scale.is_finite()
    }
}

impl Default for Transform2d {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl From<Transform2d> for Mat4 {
    fn from(transform: Transform2d) -> Self {
        transform.compute_matrix()
    }
}

impl Mul for Transform2d {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        self.mul_transform(rhs)
    }
}

impl MulAssign for Transform2d {
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

#[track_caller]
fn assert_transform(transform: Transform2d) {
    assert!(
        transform.position.is_finite(),
        "invalid position value: {:?}",
        transform.position,
    );
    assert!(
        transform.rotation.is_finite(),
        "invalid rotation value: {:?}",
        transform.rotation,
    );
    assert!(
        transform.scale.is_finite(),
        "invalid scale value: {:?}",
        transform.scale,
    );
}

/// Returns the translation of `matrix` in the window plane.
#[inline]
pub fn translation_2d(matrix: &Mat4) -> Vec2 {
    let translation: Vec3 = matrix.w_axis.truncate();
    Vec2::new(translation.x, translation.y)
}
