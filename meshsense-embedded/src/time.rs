use embassy_time::Instant;
use meshsense_api::TimeProvider;

/// Uptime measured from node boot.
#[derive(Debug, Clone)]
pub struct EmbeddedTimeProvider {
    boot_instant: Instant,
}

impl EmbeddedTimeProvider {
    pub fn new() -> Self {
        Self {
            boot_instant: Instant::now(),
        }
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.boot_instant.elapsed().as_millis()
    }
}

impl TimeProvider for EmbeddedTimeProvider {
    fn uptime_ms(&self) -> u64 {
        self.elapsed_ms()
    }
}

impl Default for EmbeddedTimeProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_monotonic() {
        let provider = EmbeddedTimeProvider::new();
        let first = provider.uptime_ms();

        for _ in 0..1000 {
            core::hint::spin_loop();
        }

        assert!(provider.uptime_ms() >= first);
    }
}
