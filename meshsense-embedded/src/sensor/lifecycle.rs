use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lifecycle {
    Active,
    /// Soft stop; the node keeps running and may be re-enabled.
    Disabled,
    /// Deep halt. Nothing leaves this state short of a power cycle.
    Halted,
}

impl Lifecycle {
    pub fn is_halted(&self) -> bool {
        matches!(self, Lifecycle::Halted)
    }
}

/// Rate limit on `turn on` commands.
#[derive(Debug, Clone)]
pub struct ReenableGuard {
    cooldown_ms: u64,
    last_activation: Option<u64>,
}

impl ReenableGuard {
    pub fn new(cooldown_ms: u64) -> Self {
        Self {
            cooldown_ms,
            last_activation: None,
        }
    }

    /// Records an activation at `now_ms` if the cooldown since the previous
    /// accepted one has elapsed. The first activation is always accepted.
    pub fn try_activate(&mut self, now_ms: u64) -> bool {
        let allowed = match self.last_activation {
            None => true,
            Some(last) => now_ms.saturating_sub(last) >= self.cooldown_ms,
        };

        if allowed {
            self.last_activation = Some(now_ms);
        }
        allowed
    }

    pub fn last_activation(&self) -> Option<u64> {
        self.last_activation
    }
}
