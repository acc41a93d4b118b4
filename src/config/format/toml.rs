use super::super::{ConfigError, Format};
use serde::de::DeserializeOwned;

/// TOML format parser using `toml`.
pub struct Toml;

impl Format for Toml {
	fn extensions(&self) -> &'static [&'static str] {
		&["toml"]
	}

	fn parse<T: DeserializeOwned>(&self, input: &[u8]) -> Result<T, ConfigError> {
		let s = std::str::from_utf8(input).map_err(|e| ConfigError::Parse(e.to_string()))?;
		toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))
	}
}
