//! Load dataset files in the generator's format and train on them.

use std::fs;

use grid_policy_net::{build_model, Dataset, FitOptions, GameVariant, ModelConfig};

fn write_tictactoe_dataset(dir: &std::path::Path, samples: usize) {
    let mut xs = String::new();
    let mut ys = String::new();
    for i in 0..samples {
        let board: Vec<String> = (0..18)
            .map(|j| if (i + j) % 5 == 0 { "1" } else { "0" }.to_string())
            .collect();
        xs.push_str(&board.join(","));
        xs.push('\n');

        let policy: Vec<String> = (0..9)
            .map(|a| if a == i % 9 { "1.000" } else { "0.000" }.to_string())
            .collect();
        ys.push_str(&policy.join(","));
        ys.push('\n');
    }
    fs::write(dir.join("tictactoe-x.txt"), xs).unwrap();
    fs::write(dir.join("tictactoe-y.txt"), ys).unwrap();
}

#[test]
fn fit_and_evaluate_on_loaded_dataset() {
    let dir = tempfile::tempdir().unwrap();
    write_tictactoe_dataset(dir.path(), 20);

    let config = ModelConfig {
        filters: 32,
        ..ModelConfig::for_variant(GameVariant::TicTacToe)
    };
    let dataset = Dataset::load(dir.path(), "tictactoe", &config).unwrap();
    assert_eq!(dataset.len(), 20);

    let mut model = build_model(&config).unwrap();
    let options = FitOptions {
        epochs: 2,
        batch_size: 8,
        validation_split: 0.25,
        seed: Some(1),
        ..Default::default()
    };
    let history = model.fit(&dataset, &options).unwrap();
    assert_eq!(history.len(), 2);
    assert!(history.epochs.iter().all(|e| e.val_loss.is_some()));

    let metrics = model
        .evaluate(dataset.inputs(), dataset.targets(), 16)
        .unwrap();
    assert!(metrics.loss.is_finite());
    assert!((0.0..=1.0).contains(&metrics.accuracy));
}

#[test]
fn dataset_for_other_variant_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    write_tictactoe_dataset(dir.path(), 3);

    let config = ModelConfig::for_variant(GameVariant::ConnectFour);
    assert!(Dataset::load(dir.path(), "tictactoe", &config).is_err());
}
