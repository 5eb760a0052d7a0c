//! Guest objects.
//!
//! Every object lives in a heap allocated [`Slot`] whose address is handed to
//! the host as the object's `this` pointer. From then on the host owns the
//! slot: it calls back into the object through the lifecycle exports and
//! releases it with `simulo__drop`.

use core::ffi::c_void;

use alloc::boxed::Box;
use bytemuck::{Pod, Zeroable};
use glam::Mat4;

use crate::pose::Pose;
use crate::raw::{self, INVALID_ID};
use crate::render::Rendered;
use crate::Error;

pub trait Object: 'static {
    /// Advances the object by `delta` seconds.
    fn update(&mut self, delta: f32) {
        let _ = delta;
    }

    /// Returns the transform of the object relative to its parent.
    ///
    /// Called by the host after [`ObjectId::mark_transform_outdated`].
    fn recalculate_transform(&mut self) -> Mat4 {
        Mat4::IDENTITY
    }

    /// Returns the rendered object drawn at the global transform of this
    /// object.
    ///
    /// Queried once when the object is spawned.
    fn rendered(&self) -> Option<&Rendered> {
        None
    }
}

pub trait PoseHandler {
    /// Called whenever the pose with the given `id` changes. `None` means the
    /// pose was lost and `id` will not be reported again unless it reappears.
    fn on_pose(&mut self, id: u32, pose: Option<&Pose>);
}

/// The root object of a game.
pub trait Game: Object + PoseHandler {}

impl<T> Game for T where T: Object + PoseHandler {}

/// A handle to an object registered with the host.
///
/// The handle does not keep the object alive. Once the object is deleted all
/// copies of the handle are dangling and may refer to a different object.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Zeroable, Pod)]
#[repr(transparent)]
pub struct ObjectId(u32);

impl ObjectId {
    #[inline]
    pub const fn from_raw(id: u32) -> Self {
        Self(id)
    }

    #[inline]
    pub const fn into_raw(self) -> u32 {
        self.0
    }

    /// Attaches `child` to this object. The transform of `child` becomes
    /// relative to this object.
    pub fn add_child(self, child: ObjectId) {
        unsafe {
            raw::simulo_add_object_child(self.0, child.0);
        }
    }

    /// Requests the host to call [`Object::recalculate_transform`] before the
    /// next frame is rendered.
    pub fn mark_transform_outdated(self) {
        unsafe {
            raw::simulo_mark_transform_outdated(self.0);
        }
    }

    /// Removes the object and all of its children from the scene.
    pub fn delete(self) {
        unsafe {
            raw::simulo_delete_object(self.0);
        }
    }
}

/// Registers `object` with the host.
///
/// # Errors
///
/// Returns [`Error::ObjectRejected`] if the host refused the object. The
/// object is dropped in that case.
pub fn spawn<T>(object: T) -> Result<ObjectId, Error>
where
    T: Object,
{
    Slot::new(SlotKind::Child(Box::new(object)))
        .register()
        .map(|(id, _)| id)
}

/// Registers `object` with the host and attaches it to `parent`.
///
/// # Errors
///
/// Returns [`Error::ObjectRejected`] if the host refused the object. The
/// object is dropped in that case.
pub fn spawn_child<T>(parent: ObjectId, object: T) -> Result<ObjectId, Error>
where
    T: Object,
{
    let id = spawn(object)?;
    parent.add_child(id);
    Ok(id)
}

pub(crate) struct Slot {
    pub(crate) id: ObjectId,
    kind: SlotKind,
}

pub(crate) enum SlotKind {
    Root(Box<dyn Game>),
    Child(Box<dyn Object>),
}

impl Slot {
    pub(crate) fn new(kind: SlotKind) -> Box<Self> {
        Box::new(Self {
            id: ObjectId(INVALID_ID),
            kind,
        })
    }

    /// Hands the slot over to the host. Returns the id and the `this` pointer
    /// the host now owns.
    pub(crate) fn register(self: Box<Self>) -> Result<(ObjectId, *mut c_void), Error> {
        let this = Box::into_raw(self);

        let id = unsafe { raw::simulo_create_object(this.cast::<c_void>()) };
        if id == INVALID_ID {
            // SAFETY: The host did not accept the pointer so we still own it.
            drop(unsafe { Box::from_raw(this) });
            return Err(Error::ObjectRejected);
        }

        // SAFETY: `this` came from `Box::into_raw` and the host does not call
        // back into the object before `simulo_create_object` returns.
        let slot = unsafe { &mut *this };
        slot.id = ObjectId(id);

        if let Some(rendered) = slot.rendered() {
            rendered.attach(slot.id);
        }

        Ok((ObjectId(id), this.cast::<c_void>()))
    }

    /// # Safety
    ///
    /// `this` must be a pointer previously passed to the host by
    /// [`Slot::register`] that was not yet dropped, and no other reference to
    /// the slot may be live.
    pub(crate) unsafe fn from_ptr<'a>(this: *mut c_void) -> &'a mut Self {
        unsafe { &mut *this.cast::<Self>() }
    }

    /// # Safety
    ///
    /// Same as [`Slot::from_ptr`]. The pointer is invalid afterwards.
    pub(crate) unsafe fn reclaim(this: *mut c_void) -> Box<Self> {
        unsafe { Box::from_raw(this.cast::<Self>()) }
    }

    fn rendered(&self) -> Option<&Rendered> {
        match &self.kind {
            SlotKind::Root(game) => game.rendered(),
            SlotKind::Child(object) => object.rendered(),
        }
    }

    pub(crate) fn is_root(&self) -> bool {
        matches!(self.kind, SlotKind::Root(_))
    }

    pub(crate) fn update(&mut self, delta: f32) {
        match &mut self.kind {
            SlotKind::Root(game) => game.update(delta),
            SlotKind::Child(object) => object.update(delta),
        }
    }

    pub(crate) fn recalculate_transform(&mut self) -> Mat4 {
        match &mut self.kind {
            SlotKind::Root(game) => game.recalculate_transform(),
            SlotKind::Child(object) => object.recalculate_transform(),
        }
    }

    /// Forwards a pose change to the object. Returns `false` if the object
    /// is not the root and cannot handle poses.
    pub(crate) fn on_pose(&mut self, id: u32, pose: Option<&Pose>) -> bool {
        match &mut self.kind {
            SlotKind::Root(game) => {
                game.on_pose(id, pose);
                true
            }
            SlotKind::Child(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::boxed::Box;
    use std::cell::Cell;
    use std::rc::Rc;

    use glam::{Mat4, Vec3};

    use crate::native;
    use crate::pose::Pose;
    use crate::render::{Material, Rendered};

    use super::{spawn, spawn_child, Object, ObjectId, PoseHandler};

    struct Counter(Rc<Cell<u32>>);

    impl Object for Counter {
        fn update(&mut self, _delta: f32) {
            self.0.set(self.0.get() + 1);
        }
    }

    struct DropFlag(Rc<Cell<bool>>);

    impl Object for DropFlag {}

    impl Drop for DropFlag {
        fn drop(&mut self) {
            self.0.set(true);
        }
    }

    struct Offset(Vec3);

    impl Object for Offset {
        fn recalculate_transform(&mut self) -> Mat4 {
            Mat4::from_translation(self.0)
        }
    }

    #[test]
    fn spawn_registers_object() {
        native::reset();

        let id = spawn(Offset(Vec3::ONE)).unwrap();
        native::with_host(|host| {
            let object = host.object(id.into_raw()).unwrap();
            assert_eq!(object.parent, None);
            assert!(!object.deleted);
        });
        native::shutdown();
    }

    #[test]
    fn spawn_rejected_drops_object() {
        native::reset();
        native::with_host(|host| host.reject_objects = true);

        let dropped = Rc::new(Cell::new(false));
        let res = spawn(DropFlag(dropped.clone()));

        assert_eq!(res, Err(crate::Error::ObjectRejected));
        assert!(dropped.get());
    }

    #[test]
    fn spawn_child_attaches_to_parent() {
        native::reset();

        let parent = spawn(Offset(Vec3::X)).unwrap();
        let child = spawn_child(parent, Offset(Vec3::Y)).unwrap();

        native::with_host(|host| {
            assert_eq!(host.object(child.into_raw()).unwrap().parent, Some(parent.into_raw()));
            assert_eq!(host.object(parent.into_raw()).unwrap().children, [child.into_raw()]);
        });
        native::shutdown();
    }

    #[test]
    fn update_reaches_object() {
        native::reset();

        let count = Rc::new(Cell::new(0));
        spawn(Counter(count.clone())).unwrap();

        native::run_frame(0.016);
        native::run_frame(0.016);

        assert_eq!(count.get(), 2);
        native::shutdown();
    }

    #[test]
    fn delete_drops_object_and_children() {
        native::reset();

        let parent_dropped = Rc::new(Cell::new(false));
        let child_dropped = Rc::new(Cell::new(false));

        let parent = spawn(DropFlag(parent_dropped.clone())).unwrap();
        spawn_child(parent, DropFlag(child_dropped.clone())).unwrap();

        parent.delete();
        assert!(!parent_dropped.get());

        native::run_frame(0.016);
        assert!(parent_dropped.get());
        assert!(child_dropped.get());
        native::with_host(|host| assert_eq!(host.objects().count(), 0));
    }

    struct Root;

    impl Object for Root {}

    impl PoseHandler for Root {
        fn on_pose(&mut self, _id: u32, _pose: Option<&Pose>) {}
    }

    #[test]
    fn transform_outdated_recalculates_global() {
        native::reset();
        // The transform buffer is registered on start.
        crate::start(Box::new(Root)).unwrap();

        let parent = spawn(Offset(Vec3::new(1.0, 0.0, 0.0))).unwrap();
        let child = spawn_child(parent, Offset(Vec3::new(0.0, 2.0, 0.0))).unwrap();

        parent.mark_transform_outdated();
        child.mark_transform_outdated();
        native::run_frame(0.016);

        native::with_host(|host| {
            let child = host.object(child.into_raw()).unwrap();
            assert_eq!(child.local, Mat4::from_translation(Vec3::new(0.0, 2.0, 0.0)));
            assert_eq!(child.global, Mat4::from_translation(Vec3::new(1.0, 2.0, 0.0)));
            assert!(!child.transform_outdated);
        });
        native::shutdown();
    }

    struct Sprite {
        offset: Vec3,
        rendered: Rendered,
    }

    impl Object for Sprite {
        fn recalculate_transform(&mut self) -> Mat4 {
            Mat4::from_translation(self.offset)
        }

        fn rendered(&self) -> Option<&Rendered> {
            Some(&self.rendered)
        }
    }

    #[test]
    fn rendered_follows_global_transform() {
        native::reset();
        crate::start(Box::new(Root)).unwrap();

        let material = Material::solid_color(1.0, 1.0, 1.0);
        let parent = spawn(Sprite {
            offset: Vec3::new(1.0, 0.0, 0.0),
            rendered: Rendered::new(&material),
        })
        .unwrap();
        let child = spawn_child(
            parent,
            Sprite {
                offset: Vec3::new(0.0, 2.0, 0.0),
                rendered: Rendered::new(&material),
            },
        )
        .unwrap();

        parent.mark_transform_outdated();
        child.mark_transform_outdated();
        native::run_frame(0.0);

        native::with_host(|host| {
            let (_, rendered) = host
                .rendered_objects()
                .find(|(_, rendered)| rendered.object == Some(child.into_raw()))
                .unwrap();
            assert_eq!(rendered.transform, Mat4::from_translation(Vec3::new(1.0, 2.0, 0.0)));
        });

        // Dropping the objects releases their rendered objects.
        native::shutdown();
        native::with_host(|host| assert_eq!(host.rendered_objects().count(), 0));
    }

    #[test]
    fn object_id_raw() {
        let id = ObjectId::from_raw(7);
        assert_eq!(id.into_raw(), 7);
    }
}
