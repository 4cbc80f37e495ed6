mod dispatcher;
mod engine;
mod fused;

pub use dispatcher::{CommandDispatcher, DeliveryStats, DispatchOutcome};
pub use engine::{DecisionEngine, Directive, Ingested, MAX_TARGETS};
pub use fused::FusedState;
