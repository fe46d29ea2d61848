use std::time::Instant;

use rand::prelude::*;
use rand::rngs::StdRng;

use crate::neural::model::PolicyModel;
use crate::training::dataset::Dataset;
use crate::{PolicyNetError, Result};

/// Options for [`PolicyModel::fit`]. Defaults: one epoch, batches of 32,
/// shuffled, no validation split, unseeded shuffling.
#[derive(Debug, Clone, PartialEq)]
pub struct FitOptions {
    pub epochs: usize,
    pub batch_size: usize,
    pub shuffle: bool,
    /// Trailing fraction of the dataset held out for validation
    pub validation_split: f64,
    /// Seed for the shuffle order
    pub seed: Option<u64>,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            epochs: 1,
            batch_size: 32,
            shuffle: true,
            validation_split: 0.0,
            seed: None,
        }
    }
}

impl FitOptions {
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(PolicyNetError::Config("batch_size must be positive".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EpochMetrics {
    /// 1-based epoch number
    pub epoch: usize,
    pub loss: f64,
    pub accuracy: f64,
    pub val_loss: Option<f64>,
    pub val_accuracy: Option<f64>,
}

impl std::fmt::Display for EpochMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Epoch {:3} | Loss: {:.4}, Acc: {:.2}%",
            self.epoch,
            self.loss,
            self.accuracy * 100.0
        )?;
        if let (Some(val_loss), Some(val_accuracy)) = (self.val_loss, self.val_accuracy) {
            write!(f, " | Val Loss: {:.4}, Acc: {:.2}%", val_loss, val_accuracy * 100.0)?;
        }
        Ok(())
    }
}

/// Per-epoch metrics returned by [`PolicyModel::fit`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct History {
    pub epochs: Vec<EpochMetrics>,
}

impl History {
    pub fn len(&self) -> usize {
        self.epochs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.epochs.is_empty()
    }

    pub fn last(&self) -> Option<&EpochMetrics> {
        self.epochs.last()
    }

    pub fn losses(&self) -> Vec<f64> {
        self.epochs.iter().map(|e| e.loss).collect()
    }
}

impl PolicyModel {
    /// Train on `dataset` with mini-batch SGD.
    ///
    /// The validation set is the trailing `validation_split` fraction, taken
    /// before shuffling. Partial final batches are used. Epoch metrics are
    /// sample-weighted means over the batches.
    pub fn fit(&mut self, dataset: &Dataset, options: &FitOptions) -> Result<History> {
        options.validate()?;
        let (train, validation) = dataset.split(options.validation_split)?;
        let samples = train.len();

        log::info!(
            "🏋️ Training on {} samples ({} validation), {} epochs, batch size {}",
            samples,
            validation.as_ref().map_or(0, |v| v.len()),
            options.epochs,
            options.batch_size
        );

        let mut order: Vec<i64> = (0..samples as i64).collect();
        let mut seeded = options.seed.map(StdRng::seed_from_u64);
        let mut history = History::default();

        for epoch in 0..options.epochs {
            let epoch_start = Instant::now();

            if options.shuffle {
                match seeded.as_mut() {
                    Some(rng) => order.shuffle(rng),
                    None => order.shuffle(&mut rand::rng()),
                }
            }

            let mut loss_sum = 0.0;
            let mut correct = 0.0;
            for batch in order.chunks(options.batch_size) {
                let (inputs, targets) = train.select(batch);
                let metrics = self.train_on_batch(&inputs, &targets)?;
                loss_sum += metrics.loss * batch.len() as f64;
                correct += metrics.accuracy * batch.len() as f64;
            }

            let (val_loss, val_accuracy) = match &validation {
                Some(validation) => {
                    let metrics = self.evaluate(
                        validation.inputs(),
                        validation.targets(),
                        options.batch_size,
                    )?;
                    (Some(metrics.loss), Some(metrics.accuracy))
                }
                None => (None, None),
            };

            let metrics = EpochMetrics {
                epoch: epoch + 1,
                loss: loss_sum / samples as f64,
                accuracy: correct / samples as f64,
                val_loss,
                val_accuracy,
            };
            if !metrics.loss.is_finite() {
                log::error!("⚠️ Non-finite training loss at epoch {}", metrics.epoch);
            }
            log::info!(
                "{} | {:.1}s",
                metrics,
                epoch_start.elapsed().as_secs_f32()
            );
            history.epochs.push(metrics);
        }

        Ok(history)
    }
}
