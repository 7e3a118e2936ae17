//! `critical-section` 1.x provider for ESP-IDF builds.
//!
//! The request bridge uses `embassy-sync` channels guarded by
//! `CriticalSectionRawMutex`.  On the device both the HTTP task and the
//! control loop are ordinary FreeRTOS threads, so a process-wide mutex is
//! enough; nesting on the same thread only bumps a depth counter.

#[cfg(target_os = "espidf")]
mod esp {
    use core::cell::{Cell, RefCell};
    use std::sync::{Mutex, MutexGuard, PoisonError};

    static LOCK: Mutex<()> = Mutex::new(());

    thread_local! {
        static DEPTH: Cell<u8> = const { Cell::new(0) };
        static HELD: RefCell<Option<MutexGuard<'static, ()>>> = const { RefCell::new(None) };
    }

    #[unsafe(no_mangle)]
    pub extern "C" fn _critical_section_1_0_acquire() -> u8 {
        let depth = DEPTH.get();
        if depth == 0 {
            let guard = LOCK.lock().unwrap_or_else(PoisonError::into_inner);
            HELD.with_borrow_mut(|held| *held = Some(guard));
        }
        DEPTH.set(depth.saturating_add(1));
        depth
    }

    #[unsafe(no_mangle)]
    pub extern "C" fn _critical_section_1_0_release(_restore: u8) {
        match DEPTH.get() {
            0 => {}
            1 => {
                DEPTH.set(0);
                HELD.with_borrow_mut(|held| *held = None);
            }
            depth => DEPTH.set(depth - 1),
        }
    }
}
