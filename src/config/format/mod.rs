use super::{ConfigError, Format};
use serde::de::DeserializeOwned;

#[cfg(feature = "json")]
mod json;
#[cfg(feature = "json")]
pub use json::Json;

#[cfg(feature = "toml")]
mod toml;
#[cfg(feature = "toml")]
pub use toml::Toml;

#[cfg(feature = "yaml")]
mod yaml;
#[cfg(feature = "yaml")]
pub use yaml::Yaml;

/// An enum wrapper for all compiled-in formats, enabling dynamic dispatch-like behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnyFormat {
	#[cfg(feature = "json")]
	Json,
	#[cfg(feature = "toml")]
	Toml,
	#[cfg(feature = "yaml")]
	Yaml,
}

impl AnyFormat {
	/// Every format compiled into this build, in probing order.
	pub const ALL: &'static [AnyFormat] = &[
		#[cfg(feature = "json")]
		Self::Json,
		#[cfg(feature = "toml")]
		Self::Toml,
		#[cfg(feature = "yaml")]
		Self::Yaml,
	];

	/// Finds the compiled-in format handling `ext`.
	pub fn for_extension(ext: &str) -> Option<Self> {
		Self::ALL
			.iter()
			.copied()
			.find(|f| f.extensions().contains(&ext))
	}
}

impl Format for AnyFormat {
	fn extensions(&self) -> &'static [&'static str] {
		match self {
			#[cfg(feature = "json")]
			Self::Json => Json.extensions(),
			#[cfg(feature = "toml")]
			Self::Toml => Toml.extensions(),
			#[cfg(feature = "yaml")]
			Self::Yaml => Yaml.extensions(),
			#[cfg(not(any(feature = "json", feature = "toml", feature = "yaml")))]
			_ => unreachable!(),
		}
	}

	fn parse<T: DeserializeOwned>(&self, _input: &[u8]) -> Result<T, ConfigError> {
		match self {
			#[cfg(feature = "json")]
			Self::Json => Json.parse(_input),
			#[cfg(feature = "toml")]
			Self::Toml => Toml.parse(_input),
			#[cfg(feature = "yaml")]
			Self::Yaml => Yaml.parse(_input),
			#[cfg(not(any(feature = "json", feature = "toml", feature = "yaml")))]
			_ => unreachable!(),
		}
	}
}
