use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use grid_policy_net::logging::setup_logging;
use grid_policy_net::{build_model, Dataset, FitOptions, GameVariant, ModelConfig};

#[derive(clap::ValueEnum, Clone, Debug, PartialEq, Eq)]
enum Mode {
    /// Build the model and print its layer summary
    Summary,
    /// Fit the model on a generated dataset
    Train,
}

#[derive(Parser, Debug)]
#[command(name = "grid_policy_net")]
struct Config {
    /// Game variant the network is built for
    #[arg(long, value_enum, default_value = "connect4")]
    game: GameVariant,

    /// JSON model configuration; --game overrides its variant
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, value_enum, default_value = "summary")]
    mode: Mode,

    /// Directory holding {id}-x.txt and {id}-y.txt
    #[arg(long, default_value = "datasets")]
    data_dir: PathBuf,

    /// Dataset id (defaults to the game name)
    #[arg(long)]
    dataset_id: Option<String>,

    #[arg(short = 'e', long, default_value_t = 1)]
    epochs: usize,

    #[arg(short = 'b', long, default_value_t = 32)]
    batch_size: usize,

    /// Trailing fraction of the dataset used for validation
    #[arg(long, default_value_t = 0.1)]
    validation_split: f64,

    /// Seed for weight initialisation and shuffling
    #[arg(long)]
    seed: Option<u64>,

    /// Log level, overridden by RUST_LOG
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Write rotating log files to this directory instead of stderr
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

fn run(args: &Config) -> grid_policy_net::Result<()> {
    let mut model_config = match &args.config {
        Some(path) => ModelConfig::from_json_file(path)?,
        None => ModelConfig::default(),
    };
    model_config.variant = args.game;

    if let Some(seed) = args.seed {
        tch::manual_seed(seed as i64);
    }
    let mut model = build_model(&model_config)?;

    match args.mode {
        Mode::Summary => {
            println!("{}", model.summary());
        }
        Mode::Train => {
            let id = args
                .dataset_id
                .clone()
                .unwrap_or_else(|| args.game.name().to_string());
            let dataset = Dataset::load(&args.data_dir, &id, &model_config)?;

            let options = FitOptions {
                epochs: args.epochs,
                batch_size: args.batch_size,
                shuffle: true,
                validation_split: args.validation_split,
                seed: args.seed,
            };
            let history = model.fit(&dataset, &options)?;
            if let Some(last) = history.last() {
                log::info!("🏁 Final {}", last);
            }

            let metrics = model.evaluate(dataset.inputs(), dataset.targets(), args.batch_size)?;
            println!(
                "Full dataset: loss {:.4}, accuracy {:.2}%",
                metrics.loss,
                metrics.accuracy * 100.0
            );
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Config::parse();

    let _logger = match setup_logging(&args.log_level, args.log_dir.as_deref()) {
        Ok(handle) => handle,
        Err(e) => {
            eprintln!("failed to start logger: {e}");
            return ExitCode::FAILURE;
        }
    };

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("❌ {e}");
            ExitCode::FAILURE
        }
    }
}
