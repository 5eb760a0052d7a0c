//! Raw host imports.
//!
//! Ids handed out by the host are opaque `u32`s. [`INVALID_ID`] is returned
//! whenever the host refuses to create a resource.

#[cfg(not(target_arch = "wasm32"))]
pub mod native;

use core::ffi::c_void;

use simulo_macros::guest_only;

/// Number of floats in the pose buffer: 17 keypoints, `x` and `y` each.
pub const POSE_DATA_LEN: usize = 17 * 2;

/// Number of floats in the transform buffer: a column-major 4x4 matrix.
pub const TRANSFORM_DATA_LEN: usize = 16;

pub const INVALID_ID: u32 = u32::MAX;

pub type PoseData = [f32; POSE_DATA_LEN];
pub type TransformData = [f32; TRANSFORM_DATA_LEN];

/// Returns a uniformly distributed float in `[0, 1)`.
#[guest_only]
pub fn simulo_random() -> f32;

#[guest_only]
pub fn simulo_window_width() -> i32;

#[guest_only]
pub fn simulo_window_height() -> i32;

/// Registers the pose and transform buffers.
///
/// Both pointers must stay valid for the lifetime of the guest. The host
/// writes the pose buffer before calling `simulo__pose` and reads the
/// transform buffer after `simulo__recalculate_transform` returns.
#[guest_only]
pub fn simulo_set_buffers(pose: *mut f32, transform: *mut f32);

#[guest_only]
pub fn simulo_set_root(id: u32, this: *mut c_void);

/// Registers a guest object. `this` is passed back to every lifecycle export
/// for this object.
#[guest_only]
pub fn simulo_create_object(this: *mut c_void) -> u32;

#[guest_only]
pub fn simulo_add_object_child(parent: u32, child: u32);

#[guest_only]
pub fn simulo_mark_transform_outdated(id: u32);

/// Removes the object and all of its children from the scene. The host calls
/// `simulo__drop` for every removed object once it is no longer in use.
#[guest_only]
pub fn simulo_delete_object(id: u32);

/// Creates a material. A null `name` creates a solid color material.
#[guest_only]
pub fn simulo_create_material(name: *const u8, name_len: usize, r: f32, g: f32, b: f32) -> u32;

#[guest_only]
pub fn simulo_update_material(material: u32, r: f32, g: f32, b: f32);

#[guest_only]
pub fn simulo_drop_material(material: u32);

#[guest_only]
pub fn simulo_create_rendered_object(material: u32) -> u32;

#[guest_only]
pub fn simulo_set_rendered_object_material(id: u32, material: u32);

/// `matrix` points to [`TRANSFORM_DATA_LEN`] floats in column-major order.
#[guest_only]
pub fn simulo_set_rendered_object_transform(id: u32, matrix: *const f32);

/// Binds the rendered object to `object`. From then on the host sets the
/// transform of the rendered object to the global transform of `object`
/// whenever the transforms are recalculated.
#[guest_only]
pub fn simulo_attach_rendered_object(id: u32, object: u32);

#[guest_only]
pub fn simulo_drop_rendered_object(id: u32);

#[guest_only]
pub fn simulo_log(level: u32, ptr: *const u8, len: usize);
