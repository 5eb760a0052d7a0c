//! Lifecycle functions called by the host.
//!
//! None of these may unwind into the host. Invalid calls are logged and
//! ignored.

use core::ffi::c_void;

use crate::object::Slot;
use crate::pose::Pose;
use crate::runtime::with_state;

/// # Safety
///
/// `this` must be null or a live object pointer handed out by the guest.
#[no_mangle]
pub unsafe extern "C" fn simulo__update(this: *mut c_void, delta: f32) {
    if this.is_null() {
        crate::warn!("simulo__update called with null object");
        return;
    }

    let slot = unsafe { Slot::from_ptr(this) };
    slot.update(delta);
}

/// # Safety
///
/// `this` must be null or a live object pointer handed out by the guest.
#[no_mangle]
pub unsafe extern "C" fn simulo__recalculate_transform(this: *mut c_void) {
    if this.is_null() {
        crate::warn!("simulo__recalculate_transform called with null object");
        return;
    }

    let slot = unsafe { Slot::from_ptr(this) };
    let transform = slot.recalculate_transform();

    with_state(|state| state.transform = transform.to_cols_array());
}

#[no_mangle]
pub extern "C" fn simulo__pose(id: u32, alive: bool) {
    let res = with_state(|state| {
        let root = state.root?;

        let pose = if alive {
            state.poses.insert(id);
            Some(Pose::new(state.pose))
        } else if state.poses.remove(&id) {
            None
        } else {
            return Some(Err(()));
        };

        Some(Ok((root, pose)))
    });

    let (root, pose) = match res {
        Some(Ok(res)) => res,
        Some(Err(())) => {
            crate::warn!("lost pose {} was never reported", id);
            return;
        }
        None => {
            crate::error!("received pose {} before the game was started", id);
            return;
        }
    };

    // SAFETY: The root stays valid until the host drops it, which clears
    // `state.root`.
    let slot = unsafe { Slot::from_ptr(root.this) };
    if !slot.on_pose(id, pose.as_ref()) {
        crate::error!("root {} cannot handle poses", root.id.into_raw());
    }
}

/// # Safety
///
/// `this` must be null or a live object pointer handed out by the guest. It
/// is invalid after this call.
#[no_mangle]
pub unsafe extern "C" fn simulo__drop(this: *mut c_void) {
    if this.is_null() {
        crate::warn!("simulo__drop called with null object");
        return;
    }

    let slot = unsafe { Slot::reclaim(this) };
    crate::trace!("dropping object {}", slot.id.into_raw());

    if slot.is_root() {
        with_state(|state| {
            state.root = None;
            state.poses.clear();
        });
    }

    drop(slot);
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::vec::Vec;

    use glam::{Mat4, Vec2, Vec3};

    use std::string::ToString;

    use crate::log::Level;
    use crate::native;
    use crate::object::{spawn, spawn_child, Object, ObjectId, PoseHandler};
    use crate::pose::Pose;
    use crate::raw::PoseData;
    use crate::runtime::{root, start};
    use crate::Error;

    use super::simulo__pose;

    #[derive(Default)]
    struct Recorder {
        poses: Rc<RefCell<Vec<(u32, Option<Vec2>)>>>,
    }

    impl Object for Recorder {
        fn recalculate_transform(&mut self) -> Mat4 {
            Mat4::from_scale(Vec3::splat(2.0))
        }
    }

    impl PoseHandler for Recorder {
        fn on_pose(&mut self, id: u32, pose: Option<&Pose>) {
            self.poses.borrow_mut().push((id, pose.map(Pose::nose)));
        }
    }

    fn pose_data(nose: Vec2) -> PoseData {
        let mut data = [0.0; 34];
        data[0] = nose.x;
        data[1] = nose.y;
        data
    }

    #[test]
    fn start_registers_buffers_and_root() {
        native::reset();

        let id = start(std::boxed::Box::new(Recorder::default())).unwrap();

        assert_eq!(root(), Some(id));
        native::with_host(|host| {
            assert!(host.has_buffers());
            assert_eq!(host.root(), Some(id.into_raw()));
        });
        native::shutdown();
    }

    #[test]
    fn start_twice_fails() {
        native::reset();

        start(std::boxed::Box::new(Recorder::default())).unwrap();
        let res = start(std::boxed::Box::new(Recorder::default()));
        assert_eq!(res, Err(Error::AlreadyStarted));
        native::shutdown();
    }

    #[test]
    fn pose_forwarded_to_root() {
        native::reset();

        let recorder = Recorder::default();
        let poses = recorder.poses.clone();
        start(std::boxed::Box::new(recorder)).unwrap();

        native::send_pose(3, Some(&pose_data(Vec2::new(10.0, 20.0))));
        native::send_pose(3, Some(&pose_data(Vec2::new(11.0, 21.0))));
        native::send_pose(3, None);

        assert_eq!(
            *poses.borrow(),
            [
                (3, Some(Vec2::new(10.0, 20.0))),
                (3, Some(Vec2::new(11.0, 21.0))),
                (3, None),
            ]
        );
        native::shutdown();
    }

    #[test]
    fn unknown_pose_lost_is_ignored() {
        native::reset();

        let recorder = Recorder::default();
        let poses = recorder.poses.clone();
        start(std::boxed::Box::new(recorder)).unwrap();

        native::send_pose(9, None);

        assert!(poses.borrow().is_empty());
        native::with_host(|host| {
            assert!(host.logs().iter().any(|(level, _)| *level == Level::WARN));
        });
        native::shutdown();
    }

    #[test]
    fn pose_before_start_is_ignored() {
        native::reset();

        simulo__pose(1, true);

        native::with_host(|host| {
            assert!(host.logs().iter().any(|(level, _)| *level == Level::ERROR));
        });
    }

    #[test]
    fn recalculate_transform_fills_buffer() {
        native::reset();

        let id = start(std::boxed::Box::new(Recorder::default())).unwrap();
        id.mark_transform_outdated();
        native::run_frame(0.0);

        native::with_host(|host| {
            let root = host.object(id.into_raw()).unwrap();
            assert_eq!(root.local, Mat4::from_scale(Vec3::splat(2.0)));
        });
        native::shutdown();
    }

    #[test]
    fn dropping_root_clears_registration() {
        native::reset();

        let id = start(std::boxed::Box::new(Recorder::default())).unwrap();
        id.delete();
        native::run_frame(0.0);

        assert_eq!(root(), None);

        // A new game can be started once the old one is gone.
        assert!(start(std::boxed::Box::new(Recorder::default())).is_ok());
        native::shutdown();
    }

    #[test]
    fn start_rejected_leaves_no_root() {
        native::reset();
        native::with_host(|host| host.reject_objects = true);

        let res = start(std::boxed::Box::new(Recorder::default()));
        assert_eq!(res, Err(Error::ObjectRejected));
        assert_eq!(root(), None);

        native::with_host(|host| {
            assert_eq!(host.root(), None);
            host.reject_objects = false;
        });

        let id = start(std::boxed::Box::new(Recorder::default())).unwrap();
        assert_eq!(root(), Some(id));
        native::shutdown();
    }

    struct Marker(Rc<RefCell<bool>>);

    impl Object for Marker {}

    impl Drop for Marker {
        fn drop(&mut self) {
            *self.0.borrow_mut() = true;
        }
    }

    /// Spawns a child of the root while a pose is alive.
    #[derive(Default)]
    struct Follower {
        child: Option<ObjectId>,
        dropped: Rc<RefCell<bool>>,
    }

    impl Object for Follower {}

    impl PoseHandler for Follower {
        fn on_pose(&mut self, id: u32, pose: Option<&Pose>) {
            crate::info!("pose {}", id);

            match pose {
                Some(_) if self.child.is_none() => {
                    let child = spawn_child(root().unwrap(), Marker(self.dropped.clone()));
                    self.child = Some(child.unwrap());
                }
                Some(_) => (),
                None => {
                    if let Some(child) = self.child.take() {
                        child.delete();
                    }
                }
            }
        }
    }

    #[test]
    fn on_pose_can_use_sdk() {
        native::reset();

        let follower = Follower::default();
        let dropped = follower.dropped.clone();
        let root = start(std::boxed::Box::new(follower)).unwrap();

        native::send_pose(5, Some(&pose_data(Vec2::ZERO)));
        native::send_pose(5, Some(&pose_data(Vec2::ONE)));

        native::with_host(|host| {
            assert_eq!(host.object(root.into_raw()).unwrap().children.len(), 1);
            assert!(host
                .logs()
                .contains(&(Level::INFO, "pose 5".to_string())));
        });

        native::send_pose(5, None);
        native::run_frame(0.0);

        assert!(*dropped.borrow());
        native::with_host(|host| assert_eq!(host.objects().count(), 1));
        native::shutdown();
    }

    /// Spawns and deletes a short-lived object on every recalculation.
    struct Sprouting(Rc<RefCell<bool>>);

    impl Object for Sprouting {
        fn recalculate_transform(&mut self) -> Mat4 {
            crate::debug!("recalculating");

            let sprout = spawn(Marker(self.0.clone())).unwrap();
            sprout.delete();

            Mat4::from_translation(Vec3::X)
        }
    }

    #[test]
    fn recalculate_transform_can_use_sdk() {
        native::reset();
        start(std::boxed::Box::new(Recorder::default())).unwrap();

        let dropped = Rc::new(RefCell::new(false));
        let id = spawn(Sprouting(dropped.clone())).unwrap();
        id.mark_transform_outdated();

        native::run_frame(0.0);

        assert!(*dropped.borrow());
        native::with_host(|host| {
            assert_eq!(host.objects().count(), 2);
            assert_eq!(
                host.object(id.into_raw()).unwrap().local,
                Mat4::from_translation(Vec3::X)
            );
            assert!(host
                .logs()
                .contains(&(Level::DEBUG, "recalculating".to_string())));
        });
        native::shutdown();
    }

    #[test]
    fn null_pointers_are_ignored() {
        native::reset();

        unsafe {
            super::simulo__update(core::ptr::null_mut(), 1.0);
            super::simulo__recalculate_transform(core::ptr::null_mut());
            super::simulo__drop(core::ptr::null_mut());
        }

        native::with_host(|host| {
            assert_eq!(
                host.logs()
                    .iter()
                    .filter(|(level, _)| *level == Level::WARN)
                    .count(),
                3
            );
        });
    }
}
