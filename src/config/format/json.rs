use super::super::{ConfigError, Format};
use serde::de::DeserializeOwned;

/// JSON format parser using `serde_json`.
pub struct Json;

impl Format for Json {
	fn extensions(&self) -> &'static [&'static str] {
		&["json"]
	}

	fn parse<T: DeserializeOwned>(&self, input: &[u8]) -> Result<T, ConfigError> {
		serde_json::from_slice(input).map_err(|e| ConfigError::Parse(e.to_string()))
	}
}
