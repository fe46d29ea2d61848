use tch::{nn, Kind, Tensor};

/// Squeeze-and-Excitation block.
///
/// Pools each channel to a single value, passes the result through a
/// bias-free bottleneck (ReLU then sigmoid) and rescales the input channels
/// by the resulting weights.
#[derive(Debug)]
pub struct SqueezeExcitation {
    fc1: nn::Linear,
    fc2: nn::Linear,
    channels: i64,
}

impl SqueezeExcitation {
    /// # Arguments
    /// * `path` - Variable store path for the block parameters.
    /// * `channels` - Number of input/output channels.
    /// * `ratio` - Reduction ratio of the bottleneck.
    pub fn new(path: &nn::Path, channels: i64, ratio: i64) -> Self {
        let reduced_channels = channels / ratio;
        let config = nn::LinearConfig {
            ws_init: nn::init::DEFAULT_KAIMING_NORMAL,
            bias: false,
            ..Default::default()
        };

        let fc1 = nn::linear(path / "fc1", channels, reduced_channels, config);
        let fc2 = nn::linear(path / "fc2", reduced_channels, channels, config);

        Self { fc1, fc2, channels }
    }

    /// Per-channel weights in (0, 1), shape [batch, channels].
    pub fn scale(&self, x: &Tensor) -> Tensor {
        x.mean_dim(&[-2_i64, -1_i64][..], false, Kind::Float)
            .apply(&self.fc1)
            .relu()
            .apply(&self.fc2)
            .sigmoid()
    }

    /// Input of shape [batch, channels, height, width] rescaled channel-wise.
    pub fn forward(&self, x: &Tensor) -> Tensor {
        let s = self.scale(x);
        x * s.view([-1, self.channels, 1, 1])
    }

    pub fn param_count(&self) -> i64 {
        (self.fc1.ws.numel() + self.fc2.ws.numel()) as i64
    }
}
