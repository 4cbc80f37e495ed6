use meshsense_api::{
    CodecError, Command, MotionSignal, PeerAddress, Role, SoundStatus, StatusDatagram,
};

use super::FusedState;
use crate::error::{Error, Result};
use crate::radio::PeerRegistry;

/// Smoke percentage above which sensing nodes are shut down.
pub const SMOKE_SHUTDOWN_PERCENTAGE: i32 = 100;

/// Most roles a single directive addresses. Bounds the dispatcher's outcome
/// list.
pub const MAX_TARGETS: usize = 4;

/// Command the aggregator should send, and to whom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Directive {
    command: Command,
    targets: &'static [Role],
}

impl Directive {
    pub const TURN_ON: Directive = Directive::new(Command::TurnOn, &[Role::Sound, Role::Light]);

    pub const DISABLE: Directive = Directive::new(Command::Disable, &[Role::Sound, Role::Light]);

    pub const SHUTDOWN: Directive =
        Directive::new(Command::Disable1, &[Role::Sound, Role::Light, Role::Motion]);

    /// Fails to compile when used in a const with more than [`MAX_TARGETS`]
    /// targets.
    pub const fn new(command: Command, targets: &'static [Role]) -> Self {
        assert!(targets.len() <= MAX_TARGETS, "too many directive targets");
        Self { command, targets }
    }

    pub fn command(&self) -> Command {
        self.command
    }

    pub fn targets(&self) -> &'static [Role] {
        self.targets
    }
}

/// Result of one accepted datagram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ingested {
    pub role: Role,
    pub datagram: StatusDatagram,
    pub directive: Option<Directive>,
}

/// Validates inbound reports, folds them into the fused state and decides
/// which command, if any, each one triggers.
///
/// Rules look at the single datagram just received. There is no priority
/// between them: a `turn on` caused by motion that arrives after a smoke
/// shutdown is still issued.
#[derive(Debug, Default)]
pub struct DecisionEngine {
    state: FusedState,
}

impl DecisionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &FusedState {
        &self.state
    }

    /// Accepts `payload` iff `sender` is a registered sensor and the payload
    /// has exactly that role's layout size. Rejected datagrams leave the
    /// state untouched.
    pub fn ingest(
        &mut self,
        registry: &PeerRegistry,
        sender: PeerAddress,
        payload: &[u8],
    ) -> Result<Ingested> {
        let role = registry
            .role_of(sender)
            .filter(Role::is_sensor)
            .ok_or(Error::UnknownSender(sender))?;

        let mut datagram = StatusDatagram::decode(role, payload).map_err(|err| match err {
            CodecError::LengthMismatch { expected, actual } => Error::PayloadLengthMismatch {
                role,
                expected,
                actual,
            },
            other => Error::Codec(other),
        })?;

        if let StatusDatagram::Sound(report) = &mut datagram {
            if report.level == 0 {
                report.status = SoundStatus::Disabled;
            }
        }

        self.state.update(datagram);

        Ok(Ingested {
            role,
            datagram,
            directive: Self::evaluate(&datagram),
        })
    }

    /// Fusion rules, applied to one datagram.
    pub fn evaluate(datagram: &StatusDatagram) -> Option<Directive> {
        match datagram {
            StatusDatagram::Motion(report) => match report.signal {
                MotionSignal::Detected => Some(Directive::TURN_ON),
                MotionSignal::TurnOff => Some(Directive::DISABLE),
                _ => None,
            },
            StatusDatagram::Smoke(report) if report.percentage > SMOKE_SHUTDOWN_PERCENTAGE => {
                Some(Directive::SHUTDOWN)
            }
            _ => None,
        }
    }
}
