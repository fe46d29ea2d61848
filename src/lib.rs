//! # Grid Policy Net
//!
//! Policy network for two-player grid games (Tic-Tac-Toe, Connect-4) used in a
//! supervised-learning pipeline.
//!
//! ## Features
//!
//! - **Game variants**: board dimensions and action-space sizes per game
//! - **Network**: residual tower with squeeze-excite channel attention and a policy head
//! - **Compiled model**: categorical cross-entropy + SGD, with predict/evaluate/fit
//! - **Training data**: reader for the `{id}-x.txt` / `{id}-y.txt` dataset files
//!
//! ## Usage
//!
//! ```no_run
//! use grid_policy_net::{build_model, GameVariant, ModelConfig};
//!
//! let config = ModelConfig::for_variant(GameVariant::ConnectFour);
//! let model = build_model(&config)?;
//! println!("{}", model.summary());
//! # Ok::<(), grid_policy_net::PolicyNetError>(())
//! ```

// ============================================================================
// PUBLIC API MODULES
// ============================================================================

/// Game variants and their board geometry
pub mod game;

/// Network topology, loss and the compiled model
pub mod neural;

/// Datasets and the fit loop
pub mod training;

/// Logger initialisation
pub mod logging;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

pub use game::GameVariant;

pub use neural::{build_model, ModelConfig, PolicyEvaluator, PolicyModel, RESIDUAL_BLOCKS};

pub use training::{Dataset, FitOptions, History};

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Main error type for the library
#[derive(Debug, thiserror::Error)]
pub enum PolicyNetError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Shape mismatch: expected {expected:?}, found {found:?}")]
    ShapeMismatch { expected: Vec<i64>, found: Vec<i64> },

    #[error("Dataset error: {0}")]
    Dataset(String),

    #[error("Torch error: {0}")]
    Tch(#[from] tch::TchError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Logger error: {0}")]
    Logger(#[from] flexi_logger::FlexiLoggerError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, PolicyNetError>;

// ============================================================================
// LIBRARY VERSION INFO
// ============================================================================

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Library description
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
