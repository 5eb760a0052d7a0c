//! Materials and rendered objects.
//!
//! Both are host resources released when the guest handle is dropped.

use glam::Mat4;

use crate::object::ObjectId;
use crate::raw::{self, INVALID_ID};
use crate::Error;

#[derive(Debug, PartialEq, Eq, Hash)]
pub struct Material(u32);

impl Material {
    /// Creates a material from the texture `name`, tinted by the given color.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownTexture`] if the host has no texture called
    /// `name`.
    pub fn texture(name: &str, r: f32, g: f32, b: f32) -> Result<Self, Error> {
        let id = unsafe { raw::simulo_create_material(name.as_ptr(), name.len(), r, g, b) };
        if id == INVALID_ID {
            Err(Error::UnknownTexture)
        } else {
            Ok(Self(id))
        }
    }

    pub fn solid_color(r: f32, g: f32, b: f32) -> Self {
        Self(unsafe { raw::simulo_create_material(core::ptr::null(), 0, r, g, b) })
    }

    pub fn set_tint(&self, r: f32, g: f32, b: f32) {
        unsafe {
            raw::simulo_update_material(self.0, r, g, b);
        }
    }

    #[inline]
    pub const fn id(&self) -> u32 {
        self.0
    }
}

impl Drop for Material {
    fn drop(&mut self) {
        unsafe {
            raw::simulo_drop_material(self.0);
        }
    }
}

/// An object drawn by the host.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct Rendered(u32);

impl Rendered {
    pub fn new(material: &Material) -> Self {
        Self(unsafe { raw::simulo_create_rendered_object(material.0) })
    }

    pub fn set_material(&self, material: &Material) {
        unsafe {
            raw::simulo_set_rendered_object_material(self.0, material.0);
        }
    }

    /// Binds the transform of this object to the global transform of
    /// `object`.
    ///
    /// The host updates the transform whenever `object` or one of its
    /// parents has its transform recalculated. Objects returning this from
    /// [`Object::rendered`] are attached when they are spawned.
    ///
    /// [`Object::rendered`]: crate::Object::rendered
    pub fn attach(&self, object: ObjectId) {
        unsafe {
            raw::simulo_attach_rendered_object(self.0, object.into_raw());
        }
    }

    /// Sets the transform of the object in window space.
    ///
    /// Attached objects are overwritten by the host with the global transform
    /// of their object.
    pub fn set_transform(&self, transform: &Mat4) {
        let cols = transform.to_cols_array();
        unsafe {
            raw::simulo_set_rendered_object_transform(self.0, cols.as_ptr());
        }
    }

    #[inline]
    pub const fn id(&self) -> u32 {
        self.0
    }
}

impl Drop for Rendered {
    fn drop(&mut self) {
        unsafe {
            raw::simulo_drop_rendered_object(self.0);
        }
    }
}
