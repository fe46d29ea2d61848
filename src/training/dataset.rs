//! Supervised-learning datasets.
//!
//! The game engine's data generator writes one sample per line into a pair of
//! files, `{id}-x.txt` (board planes, channels-last, row-major) and
//! `{id}-y.txt` (the search policy over the action space). Both are plain
//! comma-separated values without a header.

use std::path::{Path, PathBuf};

use tch::{Kind, Tensor};

use crate::neural::config::ModelConfig;
use crate::{PolicyNetError, Result};

/// Rows whose target deviates from a unit sum by more than this are reported.
const TARGET_SUM_TOLERANCE: f64 = 1e-2;

/// Inputs [N, H, W, C] paired with target distributions [N, ACTION_SPACE], kept on the CPU.
#[derive(Debug)]
pub struct Dataset {
    inputs: Tensor,
    targets: Tensor,
}

impl Dataset {
    pub fn new(inputs: Tensor, targets: Tensor) -> Result<Self> {
        let x_size = inputs.size();
        let y_size = targets.size();
        if x_size.len() != 4 || y_size.len() != 2 {
            return Err(PolicyNetError::Dataset(format!(
                "expected inputs [N, H, W, C] and targets [N, A], got {:?} and {:?}",
                x_size, y_size
            )));
        }
        if x_size[0] != y_size[0] {
            return Err(PolicyNetError::Dataset(format!(
                "{} inputs but {} targets",
                x_size[0], y_size[0]
            )));
        }
        if x_size[0] == 0 {
            return Err(PolicyNetError::Dataset("dataset is empty".to_string()));
        }

        Ok(Self {
            inputs: inputs.to_kind(Kind::Float).to_device(tch::Device::Cpu),
            targets: targets.to_kind(Kind::Float).to_device(tch::Device::Cpu),
        })
    }

    /// Paths of the input and target files for dataset `id` in `dir`.
    pub fn paths(dir: impl AsRef<Path>, id: &str) -> (PathBuf, PathBuf) {
        let dir = dir.as_ref();
        (dir.join(format!("{id}-x.txt")), dir.join(format!("{id}-y.txt")))
    }

    /// Load dataset `id` from `dir`, checking row widths against `config`.
    pub fn load(dir: impl AsRef<Path>, id: &str, config: &ModelConfig) -> Result<Self> {
        let (x_path, y_path) = Self::paths(dir, id);
        Self::from_files(x_path, y_path, config)
    }

    pub fn from_files(
        x_path: impl AsRef<Path>,
        y_path: impl AsRef<Path>,
        config: &ModelConfig,
    ) -> Result<Self> {
        let (height, width, channels) = config.input_dim();
        let action_space = config.action_space();
        log::info!(
            "📂 Loading dataset {} / {}",
            x_path.as_ref().display(),
            y_path.as_ref().display()
        );

        let xs = read_rows(x_path.as_ref(), (height * width * channels) as usize)?;
        let ys = read_rows(y_path.as_ref(), action_space as usize)?;
        let rows = xs.len() / (height * width * channels) as usize;
        let target_rows = ys.len() / action_space as usize;
        if rows != target_rows {
            return Err(PolicyNetError::Dataset(format!(
                "{} has {} rows but {} has {}",
                x_path.as_ref().display(),
                rows,
                y_path.as_ref().display(),
                target_rows
            )));
        }

        let off_simplex = ys
            .chunks(action_space as usize)
            .filter(|row| (row.iter().map(|&p| p as f64).sum::<f64>() - 1.0).abs() > TARGET_SUM_TOLERANCE)
            .count();
        if off_simplex > 0 {
            log::warn!(
                "⚠️ {} of {} target rows do not sum to 1",
                off_simplex,
                target_rows
            );
        }

        let inputs = Tensor::from_slice(&xs).view([rows as i64, height, width, channels]);
        let targets = Tensor::from_slice(&ys).view([rows as i64, action_space]);
        let dataset = Self::new(inputs, targets)?;
        log::info!("✅ Loaded {} samples", dataset.len());
        Ok(dataset)
    }

    pub fn len(&self) -> usize {
        self.inputs.size()[0] as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn inputs(&self) -> &Tensor {
        &self.inputs
    }

    pub fn targets(&self) -> &Tensor {
        &self.targets
    }

    /// Rows at `indices`, in that order.
    pub fn select(&self, indices: &[i64]) -> (Tensor, Tensor) {
        let idx = Tensor::from_slice(indices);
        (
            self.inputs.index_select(0, &idx),
            self.targets.index_select(0, &idx),
        )
    }

    /// Split off the trailing `validation_split` fraction of the samples,
    /// without shuffling. A split of 0 returns no validation set.
    pub fn split(&self, validation_split: f64) -> Result<(Dataset, Option<Dataset>)> {
        if !(0.0..1.0).contains(&validation_split) {
            return Err(PolicyNetError::Config(format!(
                "validation_split must be in [0, 1), got {}",
                validation_split
            )));
        }
        let total = self.len() as i64;
        let split_at = (total as f64 * (1.0 - validation_split)) as i64;
        if validation_split == 0.0 || split_at == total {
            let train = Dataset {
                inputs: self.inputs.shallow_clone(),
                targets: self.targets.shallow_clone(),
            };
            return Ok((train, None));
        }
        if split_at == 0 {
            return Err(PolicyNetError::Dataset(format!(
                "validation_split {} leaves no training samples out of {}",
                validation_split, total
            )));
        }

        let train = Dataset {
            inputs: self.inputs.narrow(0, 0, split_at),
            targets: self.targets.narrow(0, 0, split_at),
        };
        let validation = Dataset {
            inputs: self.inputs.narrow(0, split_at, total - split_at),
            targets: self.targets.narrow(0, split_at, total - split_at),
        };
        Ok((train, Some(validation)))
    }
}

/// Read a header-less CSV file whose rows all hold `width` numbers.
fn read_rows(path: &Path, width: usize) -> Result<Vec<f32>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let mut values = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record?;
        if record.len() != width {
            return Err(PolicyNetError::Dataset(format!(
                "{}:{}: expected {} values, found {}",
                path.display(),
                line + 1,
                width,
                record.len()
            )));
        }
        for field in record.iter() {
            let value = field.parse::<f32>().map_err(|e| {
                PolicyNetError::Dataset(format!(
                    "{}:{}: invalid number {:?}: {}",
                    path.display(),
                    line + 1,
                    field,
                    e
                ))
            })?;
            values.push(value);
        }
    }
    log::debug!("{}: {} rows of {}", path.display(), values.len() / width, width);
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GameVariant;
    use assert_matches::assert_matches;
    use std::fs;

    fn tictactoe() -> ModelConfig {
        ModelConfig::for_variant(GameVariant::TicTacToe)
    }

    fn board_row(occupied: usize) -> String {
        let mut v = vec!["0"; 18];
        v[occupied] = "1";
        v.join(",")
    }

    #[test]
    fn test_load_generated_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("ttt-x.txt"),
            format!("{}\n{}\n{}\n", board_row(0), board_row(1), board_row(17)),
        )
        .unwrap();
        fs::write(
            dir.path().join("ttt-y.txt"),
            "0.000,0.500,0.500,0.000,0.000,0.000,0.000,0.000,0.000\n\
             0.111,0.111,0.111,0.111,0.112,0.111,0.111,0.111,0.111\n\
             1.000,0.000,0.000,0.000,0.000,0.000,0.000,0.000,0.000\n",
        )
        .unwrap();

        let dataset = Dataset::load(dir.path(), "ttt", &tictactoe()).unwrap();
        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.inputs().size(), vec![3, 3, 3, 2]);
        assert_eq!(dataset.targets().size(), vec![3, 9]);

        // row-major, channels-last: value 1 at flat index 17 is cell (2, 2), plane 1
        assert_eq!(dataset.inputs().double_value(&[2, 2, 2, 1]), 1.0);
        assert_eq!(dataset.inputs().double_value(&[1, 0, 0, 1]), 1.0);
        assert!((dataset.targets().double_value(&[0, 1]) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_load_rejects_wrong_width() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("c4-x.txt"), format!("{}\n", board_row(0))).unwrap();
        fs::write(dir.path().join("c4-y.txt"), "1,0,0,0,0,0,0\n").unwrap();

        let config = ModelConfig::for_variant(GameVariant::ConnectFour);
        assert_matches!(
            Dataset::load(dir.path(), "c4", &config),
            Err(PolicyNetError::Dataset(msg)) if msg.contains("expected 84 values, found 18")
        );
    }

    #[test]
    fn test_load_rejects_row_count_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("ttt-x.txt"),
            format!("{}\n{}\n", board_row(0), board_row(1)),
        )
        .unwrap();
        fs::write(dir.path().join("ttt-y.txt"), "1,0,0,0,0,0,0,0,0\n").unwrap();

        assert_matches!(
            Dataset::load(dir.path(), "ttt", &tictactoe()),
            Err(PolicyNetError::Dataset(_))
        );
    }

    #[test]
    fn test_load_rejects_non_numeric_field() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("ttt-x.txt"), format!("{}\n", board_row(0))).unwrap();
        fs::write(dir.path().join("ttt-y.txt"), "1,0,0,0,x,0,0,0,0\n").unwrap();

        assert_matches!(
            Dataset::load(dir.path(), "ttt", &tictactoe()),
            Err(PolicyNetError::Dataset(msg)) if msg.contains("invalid number")
        );
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Dataset::load(dir.path(), "absent", &tictactoe()).is_err());
    }

    #[test]
    fn test_new_validates_shapes() {
        let x = Tensor::zeros([4, 3, 3, 2], tch::kind::FLOAT_CPU);
        assert_matches!(
            Dataset::new(x.shallow_clone(), Tensor::zeros([3, 9], tch::kind::FLOAT_CPU)),
            Err(PolicyNetError::Dataset(_))
        );
        assert_matches!(
            Dataset::new(x.view([4, 18]), Tensor::zeros([4, 9], tch::kind::FLOAT_CPU)),
            Err(PolicyNetError::Dataset(_))
        );
        assert!(Dataset::new(x, Tensor::zeros([4, 9], tch::kind::FLOAT_CPU)).is_ok());
    }

    #[test]
    fn test_split_takes_trailing_samples() {
        let x = Tensor::arange(10, tch::kind::FLOAT_CPU).view([10, 1, 1, 1]);
        let y = Tensor::zeros([10, 9], tch::kind::FLOAT_CPU);
        let dataset = Dataset::new(x, y).unwrap();

        let (train, validation) = dataset.split(0.2).unwrap();
        let validation = validation.unwrap();
        assert_eq!(train.len(), 8);
        assert_eq!(validation.len(), 2);
        assert_eq!(validation.inputs().double_value(&[0, 0, 0, 0]), 8.0);

        let (train, validation) = dataset.split(0.0).unwrap();
        assert_eq!(train.len(), 10);
        assert!(validation.is_none());

        assert_matches!(dataset.split(1.0), Err(PolicyNetError::Config(_)));
    }

    #[test]
    fn test_select_preserves_order() {
        let x = Tensor::arange(4, tch::kind::FLOAT_CPU).view([4, 1, 1, 1]);
        let y = Tensor::arange(4, tch::kind::FLOAT_CPU).view([4, 1]);
        let dataset = Dataset::new(x, y).unwrap();

        let (xs, ys) = dataset.select(&[3, 0]);
        assert_eq!(xs.size(), vec![2, 1, 1, 1]);
        assert_eq!(xs.double_value(&[0, 0, 0, 0]), 3.0);
        assert_eq!(ys.double_value(&[1, 0]), 0.0);
    }
}
