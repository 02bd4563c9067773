use serde::{Deserialize, Serialize};

use crate::board::MAX_GRID_SIZE;

/// Game settings the page may override with a JSON document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EscapeConfig {
    /// Side length of the sliding puzzle.
    pub grid_size: usize,
    /// Fixed random seed. `None` keeps whatever the runner seeded.
    pub seed: Option<u64>,
    /// Honour the developer skip command.
    pub allow_skip: bool,
    /// Frame analyzed by the transmission step.
    pub transmission_image_url: String,
    /// Image shown on the reward view.
    pub reward_qr_url: String,
}

impl Default for EscapeConfig {
    fn default() -> Self {
        Self {
            grid_size: 3,
            seed: None,
            allow_skip: cfg!(debug_assertions),
            transmission_image_url: "/frissi.png".to_string(),
            reward_qr_url:
                "https://api.qrserver.com/v1/create-qr-code/?size=200x200&data=https://ibb.co/7JPPvb4Z"
                    .to_string(),
        }
    }
}

impl EscapeConfig {
    /// Parse a config document. Missing fields take their defaults; the grid
    /// is clamped to 2..=`MAX_GRID_SIZE`.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut config: Self = serde_json::from_str(json)?;
        config.grid_size = config.grid_size.clamp(2, MAX_GRID_SIZE);
        Ok(config)
    }
}
