use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicBool, Ordering};

/// A cell for guest global state.
///
/// The host only ever calls into the guest from a single thread, so the lock
/// is never contended. Finding it taken means the state was accessed
/// re-entrantly, which is a bug and panics instead of deadlocking.
pub(crate) struct GuestCell<T> {
    value: UnsafeCell<T>,
    locked: AtomicBool,
}

impl<T> GuestCell<T> {
    pub(crate) const fn new(value: T) -> Self {
        Self {
            value: UnsafeCell::new(value),
            locked: AtomicBool::new(false),
        }
    }

    /// Runs `f` with exclusive access to the value.
    ///
    /// # Panics
    ///
    /// Panics if called from within `f`.
    pub(crate) fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut T) -> R,
    {
        if self
            .locked
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            panic!("guest state accessed re-entrantly");
        }

        let _guard = Unlock(&self.locked);

        // SAFETY: The flag was acquired above and is only released when
        // `_guard` is dropped, so this is the only reference.
        let value = unsafe { &mut *self.value.get() };
        f(value)
    }

    /// Returns a pointer to the value without taking the lock.
    pub(crate) fn as_ptr(&self) -> *mut T {
        self.value.get()
    }
}

unsafe impl<T> Send for GuestCell<T> where T: Send {}
unsafe impl<T> Sync for GuestCell<T> where T: Send {}

struct Unlock<'a>(&'a AtomicBool);

impl Drop for Unlock<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
