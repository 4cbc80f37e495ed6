use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::settings::Scenario;

/// What the sensors observe at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Readings {
    pub motion: bool,
    pub button_pressed: bool,
    pub smoke: u16,
    pub sound: u16,
    pub ambient: u16,
}

pub struct Environment {
    scenario: Scenario,
    rng: StdRng,
}

impl Environment {
    pub fn new(scenario: Scenario) -> Self {
        let rng = match scenario.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Self { scenario, rng }
    }

    pub fn sample(&mut self, now_ms: u64) -> Readings {
        let scenario = &self.scenario;

        let motion = scenario.motion.iter().any(|w| w.contains(now_ms));
        let button_pressed = scenario.button_press.is_some_and(|w| w.contains(now_ms));
        let smoke = if scenario.smoke_spike.is_some_and(|w| w.contains(now_ms)) {
            scenario.smoke_spike_level
        } else {
            scenario.smoke_baseline
        };
        let sound = if scenario.sound_bursts.iter().any(|w| w.contains(now_ms)) {
            scenario.sound_burst_level
        } else {
            scenario.sound_baseline
        };
        let day_fraction =
            (now_ms % scenario.day_length_ms.max(1)) as f64 / scenario.day_length_ms.max(1) as f64;
        let ambient = simulation_ambient(day_fraction) as u16;

        Readings {
            motion,
            button_pressed,
            smoke: self.jitter(smoke),
            sound: self.jitter(sound),
            ambient: self.jitter(ambient),
        }
    }

    fn jitter(&mut self, value: u16) -> u16 {
        let noise = i32::from(self.scenario.noise);
        if noise == 0 {
            return value;
        }
        let offset = self.rng.random_range(-noise..=noise);
        (i32::from(value) + offset).clamp(0, 4095) as u16
    }
}

/// Ambient light reading over one day, in ADC counts.
pub fn simulation_ambient(day_fraction: f64) -> f64 {
    let radians = day_fraction * 2.0 * std::f64::consts::PI;

    const MAX_DAYLIGHT: f64 = 3000.0;
    const MAX_NIGHT: f64 = 40.0;

    const SUNRISE_START: f64 = 0.23;
    const SUNRISE_END: f64 = 0.25;
    const SUNSET_START: f64 = 0.73;
    const SUNSET_END: f64 = 0.75;

    if (SUNRISE_START..=SUNSET_END).contains(&day_fraction) {
        if day_fraction <= SUNRISE_END {
            let progress = (day_fraction - SUNRISE_START) / (SUNRISE_END - SUNRISE_START);
            (progress * std::f64::consts::FRAC_PI_2).sin() * MAX_DAYLIGHT
        } else if day_fraction >= SUNSET_START {
            let progress = (day_fraction - SUNSET_START) / (SUNSET_END - SUNSET_START);
            (progress * std::f64::consts::FRAC_PI_2).cos() * MAX_DAYLIGHT
        } else {
            MAX_DAYLIGHT
        }
    } else {
        // Peaks at midnight
        radians.cos().max(0.0) * MAX_NIGHT
    }
}
