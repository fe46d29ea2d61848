//! Model configuration.
//!
//! Everything that selects a game variant or sizes the network lives here and
//! is handed to [`build_model`](crate::neural::model::build_model) explicitly,
//! so several variants can be built side by side in one process.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tch::Device;

use crate::game::GameVariant;
use crate::{PolicyNetError, Result};

/// Residual depth of the tower. Fixed, not part of [`ModelConfig`].
pub const RESIDUAL_BLOCKS: usize = 10;

/// Channels divided by this ratio give the channels of the policy-head convolution.
pub const POLICY_HEAD_REDUCTION: i64 = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Game the network is built for (input shape and action space)
    pub variant: GameVariant,
    /// Convolution channels in the stem and residual tower
    pub filters: i64,
    /// Square kernel size of the stem and residual convolutions
    pub kernel_size: i64,
    /// Squeeze-excite reduction ratio
    pub se_ratio: i64,
    /// SGD learning rate
    pub learning_rate: f64,
    /// Device to use for computation (CPU/GPU)
    #[serde(skip, default = "default_device")]
    pub device: Device,
}

fn default_device() -> Device {
    Device::Cpu
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            variant: GameVariant::ConnectFour,
            filters: 128,
            kernel_size: 3,
            se_ratio: 16,
            learning_rate: 0.01,
            device: default_device(),
        }
    }
}

impl ModelConfig {
    pub fn for_variant(variant: GameVariant) -> Self {
        Self {
            variant,
            ..Default::default()
        }
    }

    /// Read a JSON config; missing fields fall back to the defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: ModelConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Channels-last input shape (height, width, channels).
    pub fn input_dim(&self) -> (i64, i64, i64) {
        self.variant.input_dim()
    }

    pub fn action_space(&self) -> i64 {
        self.variant.action_space()
    }

    /// Hidden width of the squeeze-excite bottleneck.
    pub fn se_channels(&self) -> i64 {
        self.filters / self.se_ratio
    }

    /// Channels of the 1×1 policy-head convolution.
    pub fn head_channels(&self) -> i64 {
        self.filters / POLICY_HEAD_REDUCTION
    }

    /// Padding that keeps spatial dimensions unchanged for an odd kernel.
    pub fn same_padding(&self) -> i64 {
        self.kernel_size / 2
    }

    pub fn validate(&self) -> Result<()> {
        if self.filters <= 0 {
            return Err(PolicyNetError::Config(format!(
                "filters must be positive, got {}",
                self.filters
            )));
        }
        if self.se_ratio <= 0 || self.filters % self.se_ratio != 0 {
            return Err(PolicyNetError::Config(format!(
                "filters ({}) must be a multiple of se_ratio ({})",
                self.filters, self.se_ratio
            )));
        }
        if self.filters % POLICY_HEAD_REDUCTION != 0 {
            return Err(PolicyNetError::Config(format!(
                "filters ({}) must be a multiple of {}",
                self.filters, POLICY_HEAD_REDUCTION
            )));
        }
        if self.kernel_size <= 0 || self.kernel_size % 2 == 0 {
            return Err(PolicyNetError::Config(format!(
                "kernel_size must be a positive odd number, got {}",
                self.kernel_size
            )));
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(PolicyNetError::Config(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }
        Ok(())
    }
}
