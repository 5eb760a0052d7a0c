//! Queries about the environment the game runs in.

use glam::IVec2;

use crate::raw;

/// Returns a uniformly distributed float in `[0, 1)`.
pub fn random_float() -> f32 {
    unsafe { raw::simulo_random() }
}

/// Returns a uniformly distributed float in `[min, max)`.
pub fn random_range(min: f32, max: f32) -> f32 {
    debug_assert!(min <= max, "invalid range: {}..{}", min, max);
    min + random_float() * (max - min)
}

/// Returns the size of the window in pixels.
pub fn window_size() -> IVec2 {
    IVec2::new(window_width(), window_height())
}

pub fn window_width() -> i32 {
    unsafe { raw::simulo_window_width() }
}

pub fn window_height() -> i32 {
    unsafe { raw::simulo_window_height() }
}

#[cfg(test)]
mod tests {
    use glam::IVec2;

    use crate::native;

    use super::{random_float, random_range, window_size};

    #[test]
    fn window_size_from_host() {
        native::reset();
        native::with_host(|host| host.window_size = IVec2::new(640, 480));

        assert_eq!(window_size(), IVec2::new(640, 480));
    }

    #[test]
    fn random_in_range() {
        native::reset();

        for _ in 0..256 {
            let value = random_float();
            assert!((0.0..1.0).contains(&value));

            let value = random_range(-4.0, 4.0);
            assert!((-4.0..4.0).contains(&value));
        }
    }
}
