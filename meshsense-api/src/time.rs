use core::cell::Cell;

/// Monotonic millisecond clock a node reads its timers from.
pub trait TimeProvider {
    fn uptime_ms(&self) -> u64;
}

/// Clock that only moves when told to. Drives nodes in simulated time.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_ms: Cell<u64>,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now_ms: Cell::new(start_ms),
        }
    }

    pub fn advance(&self, delta_ms: u64) {
        self.now_ms.set(self.now_ms.get().saturating_add(delta_ms));
    }

    /// Moves the clock to `target_ms`; earlier targets are ignored.
    pub fn set(&self, target_ms: u64) {
        if target_ms > self.now_ms.get() {
            self.now_ms.set(target_ms);
        }
    }
}

impl TimeProvider for ManualClock {
    fn uptime_ms(&self) -> u64 {
        self.now_ms.get()
    }
}

impl<T: TimeProvider + ?Sized> TimeProvider for &T {
    fn uptime_ms(&self) -> u64 {
        (**self).uptime_ms()
    }
}
