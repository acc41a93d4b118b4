//!
//! Client configuration: format-agnostic loading from pluggable sources.
//!
//! The host reads a flat [`ClientConfig`] (e.g. `FeatureFlagBoardsProduct = "true"`)
//! which drives product feature flags. The same [`Format`] layer parses product manifests.

mod client;
mod error;
pub mod format;
mod loader;
pub mod source;

pub use client::{ClientConfig, ENABLED};
pub use error::ConfigError;
pub use loader::{ConfigLoader, ConfigLoaderBuilder};
pub use source::MemorySource;

#[cfg(feature = "fs")]
pub use source::FileSource;

use std::path::PathBuf;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

/// Where a loaded value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadInfo {
	/// Key or path the value was read from.
	pub path: PathBuf,
	/// Primary extension of the format that parsed it.
	pub format: &'static str,
}

/// Result of a loading operation.
#[derive(Debug)]
pub enum LoadResult<T> {
	/// Successfully loaded and parsed.
	Ok { value: T, info: LoadInfo },
	/// Resource not found at the given key.
	NotFound,
	/// Resource exists but is invalid.
	Invalid(ConfigError),
}

impl<T> LoadResult<T> {
	/// Collapses the outcome into a `Result`, mapping `NotFound` to [`ConfigError::NotFound`].
	pub fn into_result(self) -> Result<(T, LoadInfo), ConfigError> {
		match self {
			LoadResult::Ok { value, info } => Ok((value, info)),
			LoadResult::NotFound => Err(ConfigError::NotFound),
			LoadResult::Invalid(e) => Err(e),
		}
	}
}

/// Abstract format parser that converts bytes into a structured object.
pub trait Format: Send + Sync {
	/// List of supported extensions or identifiers.
	fn extensions(&self) -> &'static [&'static str];

	/// Parse the raw bytes into the target type.
	fn parse<T: DeserializeOwned>(&self, input: &[u8]) -> Result<T, ConfigError>;
}

/// Abstract data source that retrieves raw bytes by key.
#[async_trait]
pub trait Source: Send + Sync {
	/// Read raw data as a vector of bytes.
	async fn read(&self, key: &str) -> Result<Vec<u8>, ConfigError>;

	/// Check if the resource exists at the given key.
	async fn exists(&self, key: &str) -> bool;
}
