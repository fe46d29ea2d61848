//! Compiled policy model
//!
//! Couples the [`PolicyNet`] graph with its loss (categorical cross-entropy on
//! probabilities), optimizer (plain SGD) and accuracy metric, and exposes the
//! predict / evaluate / train operations an external harness drives.

use tch::nn::OptimizerConfig;
use tch::{nn, Kind, Tensor};

use crate::neural::config::ModelConfig;
use crate::neural::loss::{categorical_accuracy, categorical_cross_entropy};
use crate::neural::policy_net::{LayerSummary, PolicyNet};
use crate::{PolicyNetError, Result};

/// Inference-only view of a policy model.
pub trait PolicyEvaluator {
    /// Action probabilities [batch, action_space] for a [batch, H, W, C] input
    fn predict(&self, input: &Tensor) -> Result<Tensor>;
    /// Number of actions in the output distribution
    fn action_space(&self) -> i64;
}

/// Loss and accuracy over a batch or a whole evaluation set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchMetrics {
    pub loss: f64,
    pub accuracy: f64,
}

#[derive(Debug)]
pub struct PolicyModel {
    config: ModelConfig,
    vs: nn::VarStore,
    net: PolicyNet,
    optimizer: nn::Optimizer,
}

/// Build and compile a policy model for `config`.
///
/// Every call creates fresh parameters; two models built from the same
/// configuration share their topology but not their weights.
pub fn build_model(config: &ModelConfig) -> Result<PolicyModel> {
    config.validate()?;
    log::info!(
        "🧠 Building policy model for {} (input {:?}, {} actions)",
        config.variant,
        config.input_dim(),
        config.action_space()
    );
    log::debug!("Model config: {:?}", config);

    let vs = nn::VarStore::new(config.device);
    let net = PolicyNet::new(&vs, config);

    let optimizer = nn::Sgd::default().build(&vs, config.learning_rate)?;

    let model = PolicyModel {
        config: config.clone(),
        vs,
        net,
        optimizer,
    };
    log::info!(
        "✅ Policy model compiled: {} parameters, SGD lr={}",
        model.param_count(),
        config.learning_rate
    );
    Ok(model)
}

impl PolicyModel {
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn net(&self) -> &PolicyNet {
        &self.net
    }

    pub fn varstore(&self) -> &nn::VarStore {
        &self.vs
    }

    /// Per-sample input shape (H, W, C).
    pub fn input_shape(&self) -> Vec<i64> {
        let (h, w, c) = self.config.input_dim();
        vec![h, w, c]
    }

    /// Per-sample output shape (ACTION_SPACE,).
    pub fn output_shape(&self) -> Vec<i64> {
        vec![self.config.action_space()]
    }

    pub fn layers(&self) -> Vec<LayerSummary> {
        self.net.layers()
    }

    pub fn param_count(&self) -> i64 {
        self.vs.variables().values().map(|t| t.numel() as i64).sum()
    }

    /// Ensure `input` is a non-empty [batch, H, W, C] tensor.
    pub fn check_input(&self, input: &Tensor) -> Result<i64> {
        let found = input.size();
        let expected = self.input_shape();
        if found.len() != 4 || found[0] < 1 || found[1..] != expected[..] {
            let mut shape = vec![-1];
            shape.extend(expected);
            return Err(PolicyNetError::ShapeMismatch {
                expected: shape,
                found,
            });
        }
        Ok(found[0])
    }

    /// Ensure `target` is [batch, ACTION_SPACE] for a batch of `batch` inputs.
    pub fn check_target(&self, target: &Tensor, batch: i64) -> Result<()> {
        let found = target.size();
        let expected = vec![batch, self.config.action_space()];
        if found != expected {
            return Err(PolicyNetError::ShapeMismatch { expected, found });
        }
        Ok(())
    }

    fn prepare(&self, t: &Tensor) -> Tensor {
        t.to_kind(Kind::Float).to_device(self.vs.device())
    }

    pub fn predict(&self, input: &Tensor) -> Result<Tensor> {
        self.check_input(input)?;
        let input = self.prepare(input);
        Ok(tch::no_grad(|| self.net.forward(&input)))
    }

    /// One SGD step on a single batch. Returns the metrics of the forward
    /// pass that produced the gradients.
    pub fn train_on_batch(&mut self, input: &Tensor, target: &Tensor) -> Result<BatchMetrics> {
        let batch = self.check_input(input)?;
        self.check_target(target, batch)?;
        let input = self.prepare(input);
        let target = self.prepare(target);

        let pred = self.net.forward(&input);
        let loss = categorical_cross_entropy(&pred, &target);
        let accuracy = tch::no_grad(|| categorical_accuracy(&pred, &target));

        self.optimizer.backward_step(&loss);

        let metrics = BatchMetrics {
            loss: f64::try_from(&loss)?,
            accuracy: f64::try_from(&accuracy)?,
        };
        log::trace!("batch of {}: loss={:.4} acc={:.4}", batch, metrics.loss, metrics.accuracy);
        Ok(metrics)
    }

    /// Sample-weighted mean loss and accuracy over `input`/`target`,
    /// evaluated `batch_size` rows at a time.
    pub fn evaluate(&self, input: &Tensor, target: &Tensor, batch_size: usize) -> Result<BatchMetrics> {
        if batch_size == 0 {
            return Err(PolicyNetError::Config("batch_size must be positive".to_string()));
        }
        let total = self.check_input(input)?;
        self.check_target(target, total)?;

        let mut loss_sum = 0.0;
        let mut correct = 0.0;
        let mut start = 0;
        while start < total {
            let len = (batch_size as i64).min(total - start);
            let x = self.prepare(&input.narrow(0, start, len));
            let y = self.prepare(&target.narrow(0, start, len));

            let (loss, accuracy) = tch::no_grad(|| {
                let pred = self.net.forward(&x);
                (
                    categorical_cross_entropy(&pred, &y),
                    categorical_accuracy(&pred, &y),
                )
            });
            loss_sum += f64::try_from(&loss)? * len as f64;
            correct += f64::try_from(&accuracy)? * len as f64;
            start += len;
        }

        Ok(BatchMetrics {
            loss: loss_sum / total as f64,
            accuracy: correct / total as f64,
        })
    }

    pub fn summary(&self) -> ModelSummary {
        ModelSummary {
            variant: self.config.variant.to_string(),
            device: format!("{:?}", self.vs.device()),
            learning_rate: self.config.learning_rate,
            layers: self.layers(),
            total_params: self.param_count(),
        }
    }
}

impl PolicyEvaluator for PolicyModel {
    fn predict(&self, input: &Tensor) -> Result<Tensor> {
        PolicyModel::predict(self, input)
    }

    fn action_space(&self) -> i64 {
        self.config.action_space()
    }
}

/// Summary information about a compiled model
#[derive(Debug, Clone)]
pub struct ModelSummary {
    pub variant: String,
    pub device: String,
    pub learning_rate: f64,
    pub layers: Vec<LayerSummary>,
    pub total_params: i64,
}

impl std::fmt::Display for ModelSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Policy Model Summary ({})", self.variant)?;
        writeln!(f, "💻 Device: {}", self.device)?;
        writeln!(
            f,
            "🎯 Loss: categorical cross-entropy, Optimizer: SGD (lr {:.2e})",
            self.learning_rate
        )?;
        writeln!(f, "{:<14} {:<16} {:>10}", "layer", "output shape", "params")?;
        for layer in &self.layers {
            writeln!(
                f,
                "{:<14} {:<16} {:>10}",
                layer.name,
                format!("{:?}", layer.output_shape),
                layer.params
            )?;
        }
        write!(f, "🔢 Total Params: {}", self.total_params)
    }
}
