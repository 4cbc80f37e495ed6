mod brightness;
mod smoother;

pub use brightness::*;
pub use smoother::*;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SmoothingParams {
    /// Fraction of the remaining error closed per update.
    pub factor: f32,
    pub min_output: f32,
    pub max_output: f32,
}

impl Default for SmoothingParams {
    fn default() -> Self {
        Self {
            factor: 0.05,
            min_output: 0.0,
            max_output: 255.0,
        }
    }
}
