//! Bubbles rise from the bottom of the window and pop when a tracked person
//! touches them with either wrist.
#![no_std]

extern crate alloc;
#[cfg(test)]
extern crate std;

use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::Cell;

use simulo::math::{Mat4, Vec2};
use simulo::object::{spawn, spawn_child};
use simulo::transform::Transform2d;
use simulo::{Material, Object, ObjectId, Pose, PoseHandler, Rendered};

const TEXTURE: &str = "bubble.png";

/// Seconds between two bubbles.
const SPAWN_INTERVAL: f32 = 0.5;
/// Pixels per second.
const RISE_SPEED: f32 = 120.0;
const MIN_RADIUS: f32 = 16.0;
const MAX_RADIUS: f32 = 48.0;
/// Extra reach of a wrist beyond the bubble radius.
const HAND_RADIUS: f32 = 24.0;

#[simulo::game]
fn new() -> PoseBubbles {
    PoseBubbles::new()
}

pub struct PoseBubbles {
    material: Material,
    bubbles: Vec<BubbleHandle>,
    /// Wrists of every tracked person.
    hands: BTreeMap<u32, [Vec2; 2]>,
    spawn_timer: f32,
    popped: u32,
}

impl PoseBubbles {
    fn new() -> Self {
        let material = Material::texture(TEXTURE, 1.0, 1.0, 1.0).unwrap_or_else(|err| {
            simulo::warn!("cannot load {}: {}", TEXTURE, err);
            Material::solid_color(0.6, 0.8, 1.0)
        });

        Self {
            material,
            bubbles: Vec::new(),
            hands: BTreeMap::new(),
            spawn_timer: 0.0,
            popped: 0,
        }
    }

    fn spawn_bubble(&mut self) {
        let window = simulo::window_size().as_vec2();
        let radius = simulo::random_range(MIN_RADIUS, MAX_RADIUS);
        let transform = Rc::new(Cell::new(Transform2d {
            position: Vec2::new(simulo::random_range(0.0, window.x), window.y + radius),
            rotation: 0.0,
            scale: Vec2::splat(radius),
        }));

        let bubble = Bubble {
            transform: transform.clone(),
            rendered: Rendered::new(&self.material),
        };

        let res = match simulo::root() {
            Some(root) => spawn_child(root, bubble),
            None => spawn(bubble),
        };

        match res {
            Ok(id) => {
                id.mark_transform_outdated();
                self.bubbles.push(BubbleHandle {
                    id,
                    transform,
                    radius,
                });
            }
            Err(err) => simulo::error!("failed to spawn bubble: {}", err),
        }
    }
}

impl Object for PoseBubbles {
    fn update(&mut self, delta: f32) {
        let hands: Vec<Vec2> = self.hands.values().flatten().copied().collect();

        let mut popped = 0;
        self.bubbles.retain(|bubble| {
            let mut transform = bubble.transform.get();
            transform.integrate(Vec2::new(0.0, -RISE_SPEED), delta);
            bubble.transform.set(transform);

            let position = transform.position;

            let reach = bubble.radius + HAND_RADIUS;
            if hands.iter().any(|hand| hand.distance(position) < reach) {
                popped += 1;
                bubble.id.delete();
                return false;
            }

            if position.y < -bubble.radius {
                bubble.id.delete();
                return false;
            }

            bubble.id.mark_transform_outdated();
            true
        });

        if popped != 0 {
            self.popped += popped;
            simulo::debug!("popped {} bubbles", self.popped);
        }

        self.spawn_timer -= delta;
        if self.spawn_timer <= 0.0 {
            self.spawn_timer = SPAWN_INTERVAL;
            self.spawn_bubble();
        }
    }
}

impl PoseHandler for PoseBubbles {
    fn on_pose(&mut self, id: u32, pose: Option<&Pose>) {
        match pose {
            Some(pose) => {
                self.hands.insert(id, [pose.left_wrist(), pose.right_wrist()]);
            }
            None => {
                self.hands.remove(&id);
            }
        }
    }
}

struct BubbleHandle {
    id: ObjectId,
    transform: Rc<Cell<Transform2d>>,
    radius: f32,
}

/// Placed relative to the root, which the host draws at its global transform.
struct Bubble {
    transform: Rc<Cell<Transform2d>>,
    rendered: Rendered,
}

impl Object for Bubble {
    fn recalculate_transform(&mut self) -> Mat4 {
        self.transform.get().compute_matrix()
    }

    fn rendered(&self) -> Option<&Rendered> {
        Some(&self.rendered)
    }
}
