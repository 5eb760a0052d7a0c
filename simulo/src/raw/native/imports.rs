use core::ffi::c_void;
use core::slice;

use alloc::string::String;
use glam::Mat4;
use rand::Rng;

use super::{with_host, Buffers, HostMaterial, HostObject, HostRendered};
use crate::log::Level;
use crate::raw::{INVALID_ID, TRANSFORM_DATA_LEN};

pub(in crate::raw) fn simulo_random() -> f32 {
    with_host(|host| host.rng.gen::<f32>())
}

pub(in crate::raw) fn simulo_window_width() -> i32 {
    with_host(|host| host.window_size.x)
}

pub(in crate::raw) fn simulo_window_height() -> i32 {
    with_host(|host| host.window_size.y)
}

pub(in crate::raw) fn simulo_set_buffers(pose: *mut f32, transform: *mut f32) {
    tracing::trace!("simulo_set_buffers(pose = {:p}, transform = {:p})", pose, transform);

    with_host(|host| host.buffers = Some(Buffers { pose, transform }));
}

pub(in crate::raw) fn simulo_set_root(id: u32, this: *mut c_void) {
    tracing::trace!("simulo_set_root(id = {}, this = {:p})", id, this);

    with_host(|host| match host.objects.get(&id) {
        Some(object) if object.this == this => host.root = Some(id),
        Some(_) => tracing::error!("root {} does not match its registered pointer", id),
        None => tracing::error!("root {} is not a registered object", id),
    });
}

pub(in crate::raw) fn simulo_create_object(this: *mut c_void) -> u32 {
    with_host(|host| {
        if host.reject_objects {
            return INVALID_ID;
        }

        let id = host.next_id();
        host.objects.insert(id, HostObject::new(this));

        tracing::trace!("simulo_create_object(this = {:p}) = {}", this, id);
        id
    })
}

pub(in crate::raw) fn simulo_add_object_child(parent: u32, child: u32) {
    with_host(|host| {
        if parent == child
            || !host.objects.contains_key(&parent)
            || !host.objects.contains_key(&child)
        {
            tracing::warn!("cannot attach object {} to {}", child, parent);
            return;
        }

        if host.is_ancestor(child, parent) {
            tracing::warn!("cannot attach object {} to its descendant {}", child, parent);
            return;
        }

        if let Some(old) = host.objects[&child].parent {
            if let Some(old) = host.objects.get_mut(&old) {
                old.children.retain(|id| *id != child);
            }
        }

        host.objects.get_mut(&child).unwrap().parent = Some(parent);
        host.objects.get_mut(&parent).unwrap().children.push(child);

        // The subtree of a deleted object goes with it.
        if host.objects[&parent].deleted {
            host.mark_deleted(child);
        }
    });
}

pub(in crate::raw) fn simulo_mark_transform_outdated(id: u32) {
    with_host(|host| match host.objects.get_mut(&id) {
        Some(object) => object.transform_outdated = true,
        None => tracing::warn!("cannot mark unknown object {} outdated", id),
    });
}

pub(in crate::raw) fn simulo_delete_object(id: u32) {
    with_host(|host| {
        if host.objects.contains_key(&id) {
            host.mark_deleted(id);
        } else {
            tracing::warn!("cannot delete unknown object {}", id);
        }
    });
}

pub(in crate::raw) fn simulo_create_material(
    name: *const u8,
    name_len: usize,
    r: f32,
    g: f32,
    b: f32,
) -> u32 {
    let texture = if name.is_null() {
        None
    } else {
        // SAFETY: The guest passes a valid `&str`.
        let bytes = unsafe { slice::from_raw_parts(name, name_len) };
        match core::str::from_utf8(bytes) {
            Ok(name) => Some(String::from(name)),
            Err(err) => {
                tracing::error!("invalid texture name: {}", err);
                return INVALID_ID;
            }
        }
    };

    with_host(|host| {
        if let Some(texture) = &texture {
            if !host.textures.contains(texture) {
                tracing::warn!("unknown texture {:?}", texture);
                return INVALID_ID;
            }
        }

        let id = host.next_id();
        host.materials.insert(
            id,
            HostMaterial {
                texture,
                tint: [r, g, b],
            },
        );
        id
    })
}

pub(in crate::raw) fn simulo_update_material(material: u32, r: f32, g: f32, b: f32) {
    with_host(|host| match host.materials.get_mut(&material) {
        Some(material) => material.tint = [r, g, b],
        None => tracing::warn!("cannot update unknown material {}", material),
    });
}

pub(in crate::raw) fn simulo_drop_material(material: u32) {
    with_host(|host| {
        if host.materials.remove(&material).is_none() {
            tracing::warn!("cannot drop unknown material {}", material);
        }
    });
}

pub(in crate::raw) fn simulo_create_rendered_object(material: u32) -> u32 {
    with_host(|host| {
        if !host.materials.contains_key(&material) {
            tracing::warn!("rendered object uses unknown material {}", material);
        }

        let id = host.next_id();
        host.rendered.insert(
            id,
            HostRendered {
                material,
                object: None,
                transform: Mat4::IDENTITY,
            },
        );
        id
    })
}

pub(in crate::raw) fn simulo_set_rendered_object_material(id: u32, material: u32) {
    with_host(|host| match host.rendered.get_mut(&id) {
        Some(rendered) => rendered.material = material,
        None => tracing::warn!("cannot set material of unknown rendered object {}", id),
    });
}

pub(in crate::raw) fn simulo_set_rendered_object_transform(id: u32, matrix: *const f32) {
    // SAFETY: The guest passes a pointer to a full matrix.
    let cols = unsafe { slice::from_raw_parts(matrix, TRANSFORM_DATA_LEN) };
    let transform = Mat4::from_cols_slice(cols);

    with_host(|host| match host.rendered.get_mut(&id) {
        Some(rendered) => rendered.transform = transform,
        None => tracing::warn!("cannot set transform of unknown rendered object {}", id),
    });
}

pub(in crate::raw) fn simulo_attach_rendered_object(id: u32, object: u32) {
    with_host(|host| {
        if !host.objects.contains_key(&object) {
            tracing::warn!("cannot attach rendered object {} to unknown object {}", id, object);
            return;
        }

        match host.rendered.get_mut(&id) {
            Some(rendered) => rendered.object = Some(object),
            None => tracing::warn!("cannot attach unknown rendered object {}", id),
        }
    });
}

pub(in crate::raw) fn simulo_drop_rendered_object(id: u32) {
    with_host(|host| {
        if host.rendered.remove(&id).is_none() {
            tracing::warn!("cannot drop unknown rendered object {}", id);
        }
    });
}

pub(in crate::raw) fn simulo_log(level: u32, ptr: *const u8, len: usize) {
    // SAFETY: The guest passes a valid `&str`.
    let bytes = unsafe { slice::from_raw_parts(ptr, len) };
    let content = String::from_utf8_lossy(bytes).into_owned();

    let level = Level::from_raw(level);
    match level {
        Level::ERROR => tracing::error!("{}", content),
        Level::WARN => tracing::warn!("{}", content),
        Level::INFO => tracing::info!("{}", content),
        Level::DEBUG => tracing::debug!("{}", content),
        Level::TRACE => tracing::trace!("{}", content),
        _ => {
            tracing::error!("invalid log level {}: {}", level.into_raw(), content);
            return;
        }
    }

    with_host(|host| host.logs.push((level, content)));
}
