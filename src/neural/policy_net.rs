//! Policy network topology.
//!
//! ```text
//! Input:   [batch, H, W, 2]  (channels-last, permuted to NCHW)
//! Stem:    2 -> F channels, KxK, same padding, ReLU
//! Tower:   10 x ResNetBlock(F)
//! Head:    F -> F/4 channels, 1x1, ReLU
//! Flatten: F/4 * H * W
//! Dense:   -> ACTION_SPACE, softmax
//! ```

use tch::{nn, Kind, Tensor};

use crate::neural::config::{ModelConfig, RESIDUAL_BLOCKS};
use crate::neural::res_net_block::ResNetBlock;

/// Output shape and parameter count of one layer, excluding the batch dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerSummary {
    pub name: String,
    pub output_shape: Vec<i64>,
    pub params: i64,
}

#[derive(Debug)]
pub struct PolicyNet {
    stem: nn::Conv2D,
    res_blocks: Vec<ResNetBlock>,
    policy_conv: nn::Conv2D,
    policy_head: nn::Linear,
    input_dim: (i64, i64, i64),
    filters: i64,
    head_channels: i64,
    action_space: i64,
}

impl PolicyNet {
    pub fn new(vs: &nn::VarStore, config: &ModelConfig) -> Self {
        let p = vs.root();
        let (height, width, channels) = config.input_dim();

        let stem = nn::conv2d(
            &p / "stem",
            channels,
            config.filters,
            config.kernel_size,
            nn::ConvConfig {
                padding: config.same_padding(),
                stride: 1,
                ..Default::default()
            },
        );

        let res_blocks = (0..RESIDUAL_BLOCKS)
            .map(|idx| {
                ResNetBlock::new(
                    &(&p / format!("block_{idx}")),
                    config.filters,
                    config.kernel_size,
                    config.se_ratio,
                )
            })
            .collect();

        let head_channels = config.head_channels();
        let policy_conv = nn::conv2d(
            &p / "policy_conv",
            config.filters,
            head_channels,
            1,
            Default::default(),
        );

        let flatten_size = head_channels * height * width;
        log::debug!(
            "PolicyNet flatten_size: {} (channels={}, height={}, width={})",
            flatten_size,
            head_channels,
            height,
            width
        );
        let policy_head = nn::linear(
            &p / "policy_head",
            flatten_size,
            config.action_space(),
            Default::default(),
        );

        initialize_weights(vs);

        Self {
            stem,
            res_blocks,
            policy_conv,
            policy_head,
            input_dim: config.input_dim(),
            filters: config.filters,
            head_channels,
            action_space: config.action_space(),
        }
    }

    /// Residual tower output in NCHW layout, before the policy head.
    pub fn features(&self, x: &Tensor) -> Tensor {
        let mut h = x.permute([0, 3, 1, 2]).apply(&self.stem).relu();
        for block in &self.res_blocks {
            h = block.forward(&h);
        }
        h
    }

    /// Maps [batch, H, W, C] to action probabilities [batch, ACTION_SPACE].
    pub fn forward(&self, x: &Tensor) -> Tensor {
        self.features(x)
            .apply(&self.policy_conv)
            .relu()
            .flatten(1, -1)
            .apply(&self.policy_head)
            .softmax(-1, Kind::Float)
    }

    pub fn res_blocks(&self) -> &[ResNetBlock] {
        &self.res_blocks
    }

    pub fn input_dim(&self) -> (i64, i64, i64) {
        self.input_dim
    }

    pub fn action_space(&self) -> i64 {
        self.action_space
    }

    /// Layer-by-layer topology, computed from the configuration.
    pub fn layers(&self) -> Vec<LayerSummary> {
        let (height, width, channels) = self.input_dim;
        let tower_shape = vec![height, width, self.filters];

        let mut layers = Vec::with_capacity(self.res_blocks.len() + 5);
        layers.push(LayerSummary {
            name: "input".to_string(),
            output_shape: vec![height, width, channels],
            params: 0,
        });
        layers.push(LayerSummary {
            name: "stem".to_string(),
            output_shape: tower_shape.clone(),
            params: conv_params(&self.stem),
        });
        for (idx, block) in self.res_blocks.iter().enumerate() {
            layers.push(LayerSummary {
                name: format!("block_{idx}"),
                output_shape: tower_shape.clone(),
                params: block.param_count(),
            });
        }
        layers.push(LayerSummary {
            name: "policy_conv".to_string(),
            output_shape: vec![height, width, self.head_channels],
            params: conv_params(&self.policy_conv),
        });
        layers.push(LayerSummary {
            name: "flatten".to_string(),
            output_shape: vec![height * width * self.head_channels],
            params: 0,
        });
        layers.push(LayerSummary {
            name: "policy_head".to_string(),
            output_shape: vec![self.action_space],
            params: (self.policy_head.ws.numel()
                + self.policy_head.bs.as_ref().map_or(0, |b| b.numel())) as i64,
        });
        layers
    }
}

fn conv_params(conv: &nn::Conv2D) -> i64 {
    (conv.ws.numel() + conv.bs.as_ref().map_or(0, |b| b.numel())) as i64
}

/// Glorot-uniform kernels and zero biases for every convolution and dense
/// layer. Squeeze-excite kernels keep their He-normal initialisation.
pub fn initialize_weights(vs: &nn::VarStore) {
    for (name, mut param) in vs.variables() {
        if name.contains(".se.") {
            continue;
        }
        let size = param.size();

        if size.len() == 4 {
            let receptive = (size[2] * size[3]) as f64;
            let fan_in = size[1] as f64 * receptive;
            let fan_out = size[0] as f64 * receptive;
            let bound = (6.0 / (fan_in + fan_out)).sqrt();
            tch::no_grad(|| {
                let _ = param.uniform_(-bound, bound);
            });
        } else if size.len() == 2 {
            let fan_in = size[1] as f64;
            let fan_out = size[0] as f64;
            let bound = (6.0 / (fan_in + fan_out)).sqrt();
            tch::no_grad(|| {
                let _ = param.uniform_(-bound, bound);
            });
        } else if size.len() == 1 {
            tch::no_grad(|| {
                let _ = param.zero_();
            });
        }
    }
}
