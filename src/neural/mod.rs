pub mod config;
pub mod loss;
pub mod model;
pub mod policy_net;
pub mod res_net_block;
pub mod squeeze_excite;

// Re-export key components for convenience
pub use config::{ModelConfig, RESIDUAL_BLOCKS};
pub use model::{build_model, BatchMetrics, ModelSummary, PolicyEvaluator, PolicyModel};
pub use policy_net::{LayerSummary, PolicyNet};
