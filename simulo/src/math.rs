pub use glam::{IVec2, Mat4, Quat, Vec2, Vec3, Vec4};
