use crate::config::ConfigError;
use crate::registry::RegistryError;

/// Failure of a single product's load, initialization or teardown.
#[derive(Debug, thiserror::Error)]
pub enum ProductError {
	#[error("failed to load module: {0}")]
	Load(String),

	#[error("failed to load manifest: {0}")]
	Manifest(String),

	#[error("initialization failed: {0}")]
	Initialize(String),

	#[error("uninitialization failed: {0}")]
	Uninitialize(String),

	#[error("panicked: {0}")]
	Panicked(String),

	#[error(transparent)]
	Registry(#[from] RegistryError),

	#[error(transparent)]
	Config(#[from] ConfigError),
}
