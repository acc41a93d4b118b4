use thiserror::Error;

use crate::config::ConfigError;

/// Errors raised while assembling a [`ProductHost`](super::ProductHost) or feeding it configuration.
///
/// Product failures are never surfaced here; they are reported per product.
#[derive(Debug, Error)]
pub enum HostError {
	#[error("Config error: {0}")]
	Config(#[from] ConfigError),

	#[error("Duplicate product id: {0}")]
	DuplicateProduct(String),

	#[error("Builder error: {0}")]
	Builder(String),
}
