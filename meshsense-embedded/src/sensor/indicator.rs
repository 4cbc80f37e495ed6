use embedded_hal::digital::OutputPin;

/// Status LED. Pin errors are logged and otherwise ignored.
pub struct Indicator<P: OutputPin> {
    pin: P,
    lit: bool,
}

impl<P: OutputPin> Indicator<P> {
    pub fn new(pin: P) -> Self {
        Self { pin, lit: false }
    }

    pub fn set(&mut self, lit: bool) {
        let result = if lit {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };

        match result {
            Ok(()) => self.lit = lit,
            Err(_) => log::warn!("Failed to drive indicator"),
        }
    }

    pub fn on(&mut self) {
        self.set(true);
    }

    pub fn off(&mut self) {
        self.set(false);
    }

    pub fn is_lit(&self) -> bool {
        self.lit
    }
}

/// Non-blocking on/off blink sequence with equal phases.
#[derive(Debug, Clone)]
pub struct BlinkPattern {
    repeats: u32,
    phase_ms: u64,
    started_at: Option<u64>,
}

impl BlinkPattern {
    pub fn new(repeats: u32, phase_ms: u64) -> Self {
        Self {
            repeats,
            phase_ms,
            started_at: None,
        }
    }

    /// Starts the sequence unless one is already running.
    pub fn start(&mut self, now_ms: u64) -> bool {
        if self.is_running() {
            return false;
        }
        self.started_at = Some(now_ms);
        true
    }

    pub fn cancel(&mut self) {
        self.started_at = None;
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    /// Desired LED level at `now_ms`, or `None` once the sequence is over.
    pub fn level_at(&mut self, now_ms: u64) -> Option<bool> {
        let started_at = self.started_at?;
        let phase = now_ms.saturating_sub(started_at) / self.phase_ms.max(1);

        if phase >= u64::from(self.repeats) * 2 {
            self.started_at = None;
            return None;
        }

        Some(phase % 2 == 0)
    }
}
