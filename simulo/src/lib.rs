//! Guest bindings for the Simulo host.
//!
//! A game is a tree of [`Object`]s owned by the host. The root of the tree is
//! created by the function marked with [`game`]:
//!
//! ```ignore
//! use simulo::{Game, Object, Pose, PoseHandler};
//!
//! struct MyGame;
//!
//! impl Object for MyGame {
//!     fn update(&mut self, delta: f32) {
//!         // `delta` is in seconds
//!     }
//! }
//!
//! impl PoseHandler for MyGame {
//!     fn on_pose(&mut self, id: u32, pose: Option<&Pose>) {}
//! }
//!
//! #[simulo::game]
//! fn new() -> MyGame {
//!     MyGame
//! }
//! ```
#![no_std]

extern crate alloc;
#[cfg(not(target_arch = "wasm32"))]
extern crate std;

#[cfg(feature = "raw")]
pub mod raw;
#[cfg(not(feature = "raw"))]
mod raw;

#[cfg(all(feature = "panic_handler", target_arch = "wasm32"))]
mod panic;

#[cfg(all(feature = "global_alloc", target_family = "wasm"))]
#[global_allocator]
static ALLOCATOR: dlmalloc::GlobalDlmalloc = dlmalloc::GlobalDlmalloc;

mod cell;
mod exports;
mod runtime;

pub mod env;
pub mod log;
pub mod math;
pub mod object;
pub mod pose;
pub mod render;
pub mod transform;

/// The emulated host used when the crate is not built for `wasm32`.
#[cfg(not(target_arch = "wasm32"))]
pub use raw::native;

pub use env::{random_float, random_range, window_size};
pub use object::{Game, Object, ObjectId, PoseHandler};
pub use pose::Pose;
pub use render::{Material, Rendered};
pub use runtime::{root, start};
pub use simulo_macros::game;

#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("a root object is already registered")]
    AlreadyStarted,
    #[error("the host rejected the object")]
    ObjectRejected,
    #[error("unknown texture")]
    UnknownTexture,
}

#[doc(hidden)]
pub mod __private {
    pub use alloc::format;

    use alloc::boxed::Box;

    use crate::object::Game;

    /// Entry point used by `simulo__start`.
    pub fn start_with<F, G>(f: F)
    where
        F: FnOnce() -> G,
        G: Game,
    {
        if let Err(err) = crate::runtime::start(Box::new(f())) {
            crate::error!("failed to start game: {}", err);
        }
    }
}
