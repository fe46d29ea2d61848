use tch::{nn, Tensor};

use crate::neural::squeeze_excite::SqueezeExcitation;

/// Residual block: two ReLU convolutions, squeeze-excite, then the skip add.
///
/// Channel count and spatial size are preserved, so blocks stack freely.
#[derive(Debug)]
pub struct ResNetBlock {
    pub(crate) conv1: nn::Conv2D,
    pub(crate) conv2: nn::Conv2D,
    se: SqueezeExcitation,
}

impl ResNetBlock {
    pub fn new(path: &nn::Path, channels: i64, kernel_size: i64, se_ratio: i64) -> Self {
        let same = nn::ConvConfig {
            padding: kernel_size / 2,
            stride: 1,
            ..Default::default()
        };
        let conv1 = nn::conv2d(path / "conv1", channels, channels, kernel_size, same);
        let conv2 = nn::conv2d(path / "conv2", channels, channels, kernel_size, same);
        let se = SqueezeExcitation::new(&(path / "se"), channels, se_ratio);

        Self { conv1, conv2, se }
    }

    pub fn forward(&self, x: &Tensor) -> Tensor {
        let out = x.apply(&self.conv1).relu().apply(&self.conv2).relu();
        // No activation after the add
        self.se.forward(&out) + x
    }

    pub fn param_count(&self) -> i64 {
        let conv = |c: &nn::Conv2D| {
            (c.ws.numel() + c.bs.as_ref().map_or(0, |b| b.numel())) as i64
        };
        conv(&self.conv1) + conv(&self.conv2) + self.se.param_count()
    }
}
