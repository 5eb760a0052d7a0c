use core::ffi::c_void;
use core::ptr;

use alloc::boxed::Box;
use alloc::collections::BTreeSet;

use crate::cell::GuestCell;
use crate::object::{Game, ObjectId, Slot, SlotKind};
use crate::raw::{self, PoseData, TransformData, POSE_DATA_LEN, TRANSFORM_DATA_LEN};
use crate::Error;

pub(crate) struct State {
    pub(crate) pose: PoseData,
    pub(crate) transform: TransformData,
    pub(crate) root: Option<Root>,
    /// Poses reported alive and not yet lost.
    pub(crate) poses: BTreeSet<u32>,
}

#[derive(Copy, Clone, Debug)]
pub(crate) struct Root {
    pub(crate) id: ObjectId,
    pub(crate) this: *mut c_void,
}

// The root pointer is only dereferenced on the thread the host calls the
// guest from.
unsafe impl Send for State {}

impl State {
    const fn new() -> Self {
        Self {
            pose: [0.0; POSE_DATA_LEN],
            transform: [0.0; TRANSFORM_DATA_LEN],
            root: None,
            poses: BTreeSet::new(),
        }
    }
}

#[cfg(target_arch = "wasm32")]
static STATE: GuestCell<State> = GuestCell::new(State::new());

#[cfg(not(target_arch = "wasm32"))]
std::thread_local! {
    static STATE: GuestCell<State> = const { GuestCell::new(State::new()) };
}

pub(crate) fn with_state<F, R>(f: F) -> R
where
    F: FnOnce(&mut State) -> R,
{
    #[cfg(target_arch = "wasm32")]
    {
        STATE.with(f)
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        STATE.with(|state| state.with(f))
    }
}

/// Returns the addresses of the pose and transform buffers.
fn buffers() -> (*mut f32, *mut f32) {
    let state = {
        #[cfg(target_arch = "wasm32")]
        {
            STATE.as_ptr()
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            STATE.with(|state| state.as_ptr())
        }
    };

    // SAFETY: Only field addresses are taken, no reference is created.
    unsafe {
        (
            ptr::addr_of_mut!((*state).pose).cast::<f32>(),
            ptr::addr_of_mut!((*state).transform).cast::<f32>(),
        )
    }
}

/// Registers `root` as the root object of the game.
///
/// # Errors
///
/// Returns [`Error::AlreadyStarted`] if a root is already registered and
/// [`Error::ObjectRejected`] if the host refused the root.
pub fn start(root: Box<dyn Game>) -> Result<ObjectId, Error> {
    if with_state(|state| state.root.is_some()) {
        return Err(Error::AlreadyStarted);
    }

    let (pose, transform) = buffers();
    unsafe {
        raw::simulo_set_buffers(pose, transform);
    }

    let slot = Slot::new(SlotKind::Root(root));
    let (id, this) = slot.register()?;

    with_state(|state| state.root = Some(Root { id, this }));

    unsafe {
        raw::simulo_set_root(id.into_raw(), this);
    }

    crate::debug!("started game with root {}", id.into_raw());
    Ok(id)
}

/// Returns the root object of the game, if one is registered.
pub fn root() -> Option<ObjectId> {
    with_state(|state| state.root.map(|root| root.id))
}

#[cfg(not(target_arch = "wasm32"))]
pub(crate) fn reset() {
    with_state(|state| *state = State::new());
}
