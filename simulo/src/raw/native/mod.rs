//! An in-process stand-in for the Simulo host.
//!
//! Every host import resolves to this module when the guest is not built for
//! `wasm32`. The host state is thread-local, so every test thread gets its own
//! host. [`run_frame`], [`send_pose`] and [`shutdown`] play the host side of
//! the object lifecycle.

mod driver;
mod imports;

use core::cell::RefCell;
use core::ffi::c_void;

use alloc::collections::{BTreeMap, BTreeSet};
use alloc::string::String;
use alloc::vec::Vec;
use glam::{IVec2, Mat4};
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::log::Level;

pub use driver::{run_frame, send_pose, shutdown};
pub(super) use imports::*;

const DEFAULT_WINDOW_SIZE: IVec2 = IVec2::new(1920, 1080);
const DEFAULT_SEED: u64 = 0x5349_4d55_4c4f;

std::thread_local! {
    static HOST: RefCell<NativeHost> = RefCell::new(NativeHost::new());
}

/// Runs `f` with the host of the current thread.
///
/// # Panics
///
/// Panics if called from within `f`.
pub fn with_host<F, R>(f: F) -> R
where
    F: FnOnce(&mut NativeHost) -> R,
{
    HOST.with(|host| f(&mut host.borrow_mut()))
}

/// Replaces the host of the current thread with a fresh one and forgets the
/// registered game.
///
/// Objects still owned by the old host are leaked; call [`shutdown`] first to
/// drop them.
pub fn reset() {
    with_host(|host| *host = NativeHost::new());
    crate::runtime::reset();
}

#[derive(Debug)]
pub struct NativeHost {
    pub window_size: IVec2,
    /// Refuse every `simulo_create_object` call.
    pub reject_objects: bool,
    rng: SmallRng,
    buffers: Option<Buffers>,
    root: Option<u32>,
    next_id: u32,
    objects: BTreeMap<u32, HostObject>,
    textures: BTreeSet<String>,
    materials: BTreeMap<u32, HostMaterial>,
    rendered: BTreeMap<u32, HostRendered>,
    logs: Vec<(Level, String)>,
}

impl NativeHost {
    fn new() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            reject_objects: false,
            rng: SmallRng::seed_from_u64(DEFAULT_SEED),
            buffers: None,
            root: None,
            next_id: 0,
            objects: BTreeMap::new(),
            textures: BTreeSet::new(),
            materials: BTreeMap::new(),
            rendered: BTreeMap::new(),
            logs: Vec::new(),
        }
    }

    pub fn seed(&mut self, seed: u64) {
        self.rng = SmallRng::seed_from_u64(seed);
    }

    /// Makes `name` known to `simulo_create_material`.
    pub fn add_texture(&mut self, name: &str) {
        self.textures.insert(name.into());
    }

    pub fn has_buffers(&self) -> bool {
        self.buffers.is_some()
    }

    pub fn root(&self) -> Option<u32> {
        self.root
    }

    pub fn object(&self, id: u32) -> Option<&HostObject> {
        self.objects.get(&id)
    }

    pub fn objects(&self) -> impl Iterator<Item = (u32, &HostObject)> + '_ {
        self.objects.iter().map(|(id, object)| (*id, object))
    }

    pub fn material(&self, id: u32) -> Option<&HostMaterial> {
        self.materials.get(&id)
    }

    pub fn materials(&self) -> impl Iterator<Item = (u32, &HostMaterial)> + '_ {
        self.materials.iter().map(|(id, material)| (*id, material))
    }

    pub fn rendered(&self, id: u32) -> Option<&HostRendered> {
        self.rendered.get(&id)
    }

    pub fn rendered_objects(&self) -> impl Iterator<Item = (u32, &HostRendered)> + '_ {
        self.rendered.iter().map(|(id, rendered)| (*id, rendered))
    }

    /// Returns every line logged by the guest, oldest first.
    pub fn logs(&self) -> &[(Level, String)] {
        &self.logs
    }

    fn next_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Returns the ids of all objects ordered so that every parent comes
    /// before its children. Objects without a live parent come first, ordered
    /// by id.
    fn tree_order(&self) -> Vec<u32> {
        let mut order: Vec<u32> = self
            .objects
            .iter()
            .filter(|(_, object)| {
                object
                    .parent
                    .map_or(true, |parent| !self.objects.contains_key(&parent))
            })
            .map(|(id, _)| *id)
            .collect();

        let mut index = 0;
        while let Some(id) = order.get(index).copied() {
            order.extend_from_slice(&self.objects[&id].children);
            index += 1;
        }

        order
    }

    /// Returns `true` if `ancestor` is `id` or one of its parents.
    fn is_ancestor(&self, ancestor: u32, id: u32) -> bool {
        let mut next = Some(id);
        while let Some(id) = next {
            if id == ancestor {
                return true;
            }

            next = self.objects.get(&id).and_then(|object| object.parent);
        }

        false
    }

    fn mark_deleted(&mut self, id: u32) {
        let mut stack = alloc::vec![id];
        while let Some(id) = stack.pop() {
            if let Some(object) = self.objects.get_mut(&id) {
                object.deleted = true;
                stack.extend_from_slice(&object.children);
            }
        }
    }

    /// Removes `id` from the object table and returns its guest pointer.
    fn remove_object(&mut self, id: u32) -> Option<*mut c_void> {
        let object = self.objects.remove(&id)?;

        if let Some(parent) = object.parent.and_then(|parent| self.objects.get_mut(&parent)) {
            parent.children.retain(|child| *child != id);
        }

        if self.root == Some(id) {
            self.root = None;
        }

        for rendered in self.rendered.values_mut() {
            if rendered.object == Some(id) {
                rendered.object = None;
            }
        }

        Some(object.this)
    }
}

#[derive(Copy, Clone, Debug)]
struct Buffers {
    pose: *mut f32,
    transform: *mut f32,
}

#[derive(Clone, Debug)]
pub struct HostObject {
    pub this: *mut c_void,
    pub parent: Option<u32>,
    pub children: Vec<u32>,
    /// Deleted by the guest and waiting for `simulo__drop`.
    pub deleted: bool,
    pub transform_outdated: bool,
    /// Transform relative to the parent, as last reported by the guest.
    pub local: Mat4,
    pub global: Mat4,
}

impl HostObject {
    fn new(this: *mut c_void) -> Self {
        Self {
            this,
            parent: None,
            children: Vec::new(),
            deleted: false,
            transform_outdated: false,
            local: Mat4::IDENTITY,
            global: Mat4::IDENTITY,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct HostMaterial {
    /// `None` for solid color materials.
    pub texture: Option<String>,
    pub tint: [f32; 3],
}

#[derive(Clone, Debug, PartialEq)]
pub struct HostRendered {
    pub material: u32,
    /// The object whose global transform drives this one.
    pub object: Option<u32>,
    pub transform: Mat4,
}
