use core::ptr;

use alloc::vec::Vec;
use glam::Mat4;

use super::{with_host, NativeHost};
use crate::exports;
use crate::raw::{PoseData, TransformData};

/// Plays one frame of the host loop.
///
/// Every live object is updated (the root first, the rest by ascending id),
/// outdated transforms are recalculated parents first, and deleted objects are
/// dropped. Attached rendered objects take the global transform of their
/// object. Objects spawned during the frame are first updated in the next
/// frame.
pub fn run_frame(delta: f32) {
    let order = with_host(|host| {
        let mut ids: Vec<u32> = host.objects.keys().copied().collect();
        if let Some(root) = host.root {
            ids.retain(|id| *id != root);
            ids.insert(0, root);
        }
        ids
    });

    for id in order {
        // An earlier update may have deleted this object.
        let this = with_host(|host| {
            host.objects
                .get(&id)
                .filter(|object| !object.deleted)
                .map(|object| object.this)
        });

        if let Some(this) = this {
            unsafe {
                exports::simulo__update(this, delta);
            }
        }
    }

    recalculate_transforms();
    drop_deleted();
}

/// Reports a pose to the guest. `None` reports the pose as lost.
pub fn send_pose(id: u32, pose: Option<&PoseData>) {
    if let Some(pose) = pose {
        let Some(buffers) = with_host(|host| host.buffers) else {
            tracing::error!("cannot send pose {}: no buffers registered", id);
            return;
        };

        // SAFETY: The guest keeps the registered buffer alive and does not
        // hold a reference to it outside of its exports.
        unsafe {
            ptr::write(buffers.pose.cast::<PoseData>(), *pose);
        }
    }

    exports::simulo__pose(id, pose.is_some());
}

/// Deletes every object and drops them, children first.
pub fn shutdown() {
    with_host(|host| {
        for object in host.objects.values_mut() {
            object.deleted = true;
        }
    });

    drop_deleted();
}

fn recalculate_transforms() {
    let (order, buffers) = with_host(|host| (host.tree_order(), host.buffers));

    for &id in &order {
        let this = with_host(|host| {
            host.objects
                .get(&id)
                .filter(|object| object.transform_outdated && !object.deleted)
                .map(|object| object.this)
        });

        let Some(this) = this else {
            continue;
        };

        let Some(buffers) = buffers else {
            tracing::error!("cannot recalculate transform of {}: no buffers registered", id);
            continue;
        };

        unsafe {
            exports::simulo__recalculate_transform(this);
        }

        // SAFETY: See `send_pose`.
        let cols = unsafe { ptr::read(buffers.transform.cast::<TransformData>()) };

        with_host(|host| {
            if let Some(object) = host.objects.get_mut(&id) {
                object.local = Mat4::from_cols_array(&cols);
                object.transform_outdated = false;
            }
        });
    }

    with_host(|host| {
        for id in order {
            let parent = host
                .objects
                .get(&id)
                .and_then(|object| object.parent)
                .and_then(|parent| host.objects.get(&parent))
                .map_or(Mat4::IDENTITY, |parent| parent.global);

            if let Some(object) = host.objects.get_mut(&id) {
                object.global = parent * object.local;
            }
        }

        let NativeHost {
            objects, rendered, ..
        } = host;

        for rendered in rendered.values_mut() {
            if let Some(object) = rendered.object.and_then(|id| objects.get(&id)) {
                rendered.transform = object.global;
            }
        }
    });
}

fn drop_deleted() {
    let deleted: Vec<u32> = with_host(|host| {
        host.tree_order()
            .into_iter()
            .rev()
            .filter(|id| host.objects[id].deleted)
            .collect()
    });

    for id in deleted {
        let Some(this) = with_host(|host| host.remove_object(id)) else {
            continue;
        };

        unsafe {
            exports::simulo__drop(this);
        }
    }
}
