/// Accepts a new input level only after the raw input held it for longer than
/// the configured delay.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay_ms: u64,
    stable: bool,
    last_raw: bool,
    last_change_ms: u64,
}

impl Debouncer {
    pub fn new(delay_ms: u64, initial: bool) -> Self {
        Self {
            delay_ms,
            stable: initial,
            last_raw: initial,
            last_change_ms: 0,
        }
    }

    /// Feeds one raw reading. Returns the new stable level when it changes.
    pub fn update(&mut self, raw: bool, now_ms: u64) -> Option<bool> {
        if raw != self.last_raw {
            self.last_raw = raw;
            self.last_change_ms = now_ms;
        }

        if now_ms.saturating_sub(self.last_change_ms) > self.delay_ms && raw != self.stable {
            self.stable = raw;
            return Some(raw);
        }

        None
    }

    pub fn stable(&self) -> bool {
        self.stable
    }

    /// Last raw level seen, regardless of whether it has settled.
    pub fn raw(&self) -> bool {
        self.last_raw
    }
}
