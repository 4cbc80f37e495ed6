use meshsense_api::PeerAddress;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("Failed to read settings: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid settings file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid setting: {0}")]
    InvalidSetting(&'static str),

    #[error("Address {0} is assigned to more than one role")]
    DuplicateAddress(PeerAddress),

    #[error("Node setup failed: {0}")]
    Node(#[from] meshsense_embedded::Error),

    #[error("Snapshot encoding failed: {0}")]
    Snapshot(#[from] serde_json::Error),
}
