//! A process-wide filesystem instance.
//!
//! The arena has no internal locking. Every access through [`SharedVfs`] holds a spin lock
//! with interrupt delivery deferred, so an interrupt handler never observes a half-applied
//! mutation and never spins on a lock held by the code it interrupted.

use spin::Mutex;

use crate::fs::Vfs;

/// Control over interrupt delivery on the current CPU.
pub trait InterruptControl {
    /// Defers interrupt delivery, returning whether interrupts were enabled before.
    fn disable(&self) -> bool;

    /// Restores interrupt delivery to the state returned by `disable`.
    fn restore(&self, was_enabled: bool);
}

/// Interrupt control for hosted environments, where no interrupts reach the filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoInterrupts;

impl InterruptControl for NoInterrupts {
    fn disable(&self) -> bool {
        false
    }

    fn restore(&self, _was_enabled: bool) {}
}

/// A filesystem shared between the kernel's foreground loop and its collaborators.
pub struct SharedVfs<I> {
    vfs: Mutex<Option<Vfs>>,
    interrupts: I,
}

impl<I: InterruptControl> SharedVfs<I> {
    pub const fn new(interrupts: I) -> Self {
        Self {
            vfs: Mutex::new(None),
            interrupts,
        }
    }

    /// Initializes the filesystem, discarding any previous state.
    pub fn init(&self) {
        self.without_interrupts(|| {
            let mut vfs = self.vfs.lock();
            match vfs.as_mut() {
                Some(vfs) => vfs.reset(),
                None => *vfs = Some(Vfs::new()),
            }
        });
    }

    /// Checks whether `init` has been called.
    pub fn is_initialized(&self) -> bool {
        self.without_interrupts(|| self.vfs.lock().is_some())
    }

    /// Runs `f` with exclusive access to the filesystem.
    /// Returns `None` if the filesystem has not been initialized.
    ///
    /// The lock is not reentrant: calling `with` or `with_ref` from inside `f` deadlocks.
    /// If `f` panics, the lock is released and interrupt delivery is restored while unwinding.
    pub fn with<F, R>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&mut Vfs) -> R,
    {
        self.without_interrupts(|| self.vfs.lock().as_mut().map(f))
    }

    /// Runs `f` with shared access to the filesystem.
    /// Returns `None` if the filesystem has not been initialized.
    /// The same locking rules as for `with` apply.
    pub fn with_ref<F, R>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&Vfs) -> R,
    {
        self.without_interrupts(|| self.vfs.lock().as_ref().map(f))
    }

    fn without_interrupts<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let _guard = InterruptGuard {
            was_enabled: self.interrupts.disable(),
            interrupts: &self.interrupts,
        };
        f()
    }
}

/// Restores interrupt delivery when dropped.
struct InterruptGuard<'a, I: InterruptControl> {
    interrupts: &'a I,
    was_enabled: bool,
}

impl<I: InterruptControl> Drop for InterruptGuard<'_, I> {
    fn drop(&mut self) {
        self.interrupts.restore(self.was_enabled);
    }
}

#[cfg(test)]
mod tests {
    use std::panic::{self, AssertUnwindSafe};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use super::*;

    /// Records interrupt state transitions.
    #[derive(Default)]
    struct FakeInterrupts {
        enabled: AtomicBool,
        disables: AtomicUsize,
    }

    impl InterruptControl for &FakeInterrupts {
        fn disable(&self) -> bool {
            self.disables.fetch_add(1, Ordering::SeqCst);
            self.enabled.swap(false, Ordering::SeqCst)
        }

        fn restore(&self, was_enabled: bool) {
            self.enabled.store(was_enabled, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_uninitialized() {
        let shared = SharedVfs::new(NoInterrupts);
        assert!(!shared.is_initialized());
        assert_eq!(shared.with(|vfs| vfs.count()), None);
    }

    #[test]
    fn test_with() {
        let shared = SharedVfs::new(NoInterrupts);
        shared.init();

        shared
            .with(|vfs| vfs.write("a.txt", b"hello"))
            .unwrap()
            .unwrap();
        let data = shared.with_ref(|vfs| vfs.read("a.txt").map(<[u8]>::to_vec));
        assert_eq!(data, Some(Ok(b"hello".to_vec())));
    }

    #[test]
    fn test_init_resets() {
        let shared = SharedVfs::new(NoInterrupts);
        shared.init();
        shared.with(|vfs| vfs.write("a.txt", b"hello")).unwrap().unwrap();

        shared.init();
        assert_eq!(shared.with_ref(Vfs::count), Some(1));
    }

    #[test]
    fn test_interrupts_masked() {
        let interrupts = FakeInterrupts::default();
        interrupts.enabled.store(true, Ordering::SeqCst);
        let shared = SharedVfs::new(&interrupts);
        shared.init();

        let enabled_inside = shared
            .with(|_| interrupts.enabled.load(Ordering::SeqCst))
            .unwrap();
        assert!(!enabled_inside);
        assert!(interrupts.enabled.load(Ordering::SeqCst));
        assert_eq!(interrupts.disables.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_panic_restores_interrupts() {
        let interrupts = FakeInterrupts::default();
        interrupts.enabled.store(true, Ordering::SeqCst);
        let shared = SharedVfs::new(&interrupts);
        shared.init();

        let res = panic::catch_unwind(AssertUnwindSafe(|| {
            shared.with(|vfs| {
                vfs.write("a.txt", b"partial").unwrap();
                panic!("failed mid-session");
            })
        }));
        assert!(res.is_err());
        assert!(interrupts.enabled.load(Ordering::SeqCst));

        // The lock was released while unwinding.
        assert_eq!(shared.with_ref(|vfs| vfs.size("a.txt").is_ok()), Some(true));
    }

    #[test]
    fn test_static_instance() {
        static VFS: SharedVfs<NoInterrupts> = SharedVfs::new(NoInterrupts);
        VFS.init();
        assert!(VFS.is_initialized());
        assert_eq!(VFS.with_ref(|vfs| vfs.size("readme.txt").is_ok()), Some(true));
    }
}
