use alloc::format;
use alloc::string::{String, ToString};

use meshsense_api::{LightReport, MotionReport, Role, SmokeReport, SoundReport, StatusDatagram};
use serde::{Deserialize, Serialize};

/// Last accepted report per sensor role. Entries are replaced whole and never
/// expire; a role that never reported stays `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FusedState {
    pub motion: Option<MotionReport>,
    pub smoke: Option<SmokeReport>,
    pub sound: Option<SoundReport>,
    pub light: Option<LightReport>,
}

impl FusedState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, datagram: StatusDatagram) {
        match datagram {
            StatusDatagram::Motion(report) => self.motion = Some(report),
            StatusDatagram::Smoke(report) => self.smoke = Some(report),
            StatusDatagram::Sound(report) => self.sound = Some(report),
            StatusDatagram::Light(report) => self.light = Some(report),
        }
    }

    pub fn get(&self, role: Role) -> Option<StatusDatagram> {
        match role {
            Role::Motion => self.motion.map(StatusDatagram::Motion),
            Role::Smoke => self.smoke.map(StatusDatagram::Smoke),
            Role::Sound => self.sound.map(StatusDatagram::Sound),
            Role::Light => self.light.map(StatusDatagram::Light),
            Role::Aggregator => None,
        }
    }

    /// Text shown for a role on the status page: the status label, or the
    /// brightness percentage for the light node. Empty until the role reports.
    pub fn status_label(&self, role: Role) -> String {
        match role {
            Role::Motion => self
                .motion
                .map(|r| r.status.label().to_string())
                .unwrap_or_default(),
            Role::Smoke => self
                .smoke
                .map(|r| r.status.label().to_string())
                .unwrap_or_default(),
            Role::Sound => self
                .sound
                .map(|r| r.status.label().to_string())
                .unwrap_or_default(),
            Role::Light => self
                .light
                .and_then(|r| r.brightness_percent)
                .map(|percent| format!("{percent}%"))
                .unwrap_or_default(),
            Role::Aggregator => String::new(),
        }
    }

    pub fn reported_roles(&self) -> usize {
        Role::SENSORS
            .iter()
            .filter(|role| self.get(**role).is_some())
            .count()
    }
}
