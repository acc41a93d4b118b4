use std::path::PathBuf;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::format::AnyFormat;
use super::{ConfigError, Format, LoadInfo, LoadResult, Source};

/// Loads structured values from a [`Source`], probing registered formats by extension.
pub struct ConfigLoader {
	source: Box<dyn Source>,
	formats: Vec<AnyFormat>,
}

pub struct ConfigLoaderBuilder {
	source: Option<Box<dyn Source>>,
	formats: Vec<AnyFormat>,
}

impl ConfigLoaderBuilder {
	pub fn new() -> Self {
		Self {
			source: None,
			formats: Vec::new(),
		}
	}

	pub fn source(mut self, source: impl Source + 'static) -> Self {
		self.source = Some(Box::new(source));
		self
	}

	pub fn format(mut self, format: AnyFormat) -> Self {
		if !self.formats.contains(&format) {
			self.formats.push(format);
		}
		self
	}

	/// Registers every compiled-in format in default order.
	pub fn all_formats(mut self) -> Self {
		for format in AnyFormat::ALL {
			self = self.format(*format);
		}
		self
	}

	pub fn build(self) -> Result<ConfigLoader, &'static str> {
		let source = self.source.ok_or("source is required")?;
		if self.formats.is_empty() {
			return Err("at least one format is required");
		}
		Ok(ConfigLoader {
			source,
			formats: self.formats,
		})
	}
}

impl Default for ConfigLoaderBuilder {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfigLoader {
	pub fn builder() -> ConfigLoaderBuilder {
		ConfigLoaderBuilder::new()
	}

	/// Resolves `base_name` against every registered format, in registration order.
	///
	/// The first existing `<base_name>.<ext>` wins; any later match is reported as a conflict.
	pub async fn load<T: DeserializeOwned>(&self, base_name: &str) -> LoadResult<T> {
		let mut found: Option<(String, AnyFormat)> = None;

		for format in &self.formats {
			for ext in format.extensions() {
				let key = format!("{base_name}.{ext}");
				if !self.source.exists(&key).await {
					continue;
				}
				if let Some((first, _)) = &found {
					warn!(
						base = base_name,
						using = %first,
						ignoring = %key,
						"multiple configuration files found"
					);
					continue;
				}
				found = Some((key, *format));
			}
		}

		match found {
			Some((key, format)) => self.load_explicit(&key, &format).await,
			None => LoadResult::NotFound,
		}
	}

	/// Directly loads a specific path, selecting the parser by extension.
	pub async fn load_file<T: DeserializeOwned>(&self, path: &str) -> LoadResult<T> {
		let Some((_, ext)) = path.rsplit_once('.') else {
			return LoadResult::Invalid(ConfigError::Parse("missing extension".to_string()));
		};

		match AnyFormat::for_extension(ext).filter(|f| self.formats.contains(f)) {
			Some(format) => self.load_explicit(path, &format).await,
			None => LoadResult::Invalid(ConfigError::UnsupportedFormat(ext.to_string())),
		}
	}

	async fn load_explicit<T: DeserializeOwned>(&self, key: &str, format: &AnyFormat) -> LoadResult<T> {
		let bytes = match self.source.read(key).await {
			Ok(b) => b,
			Err(ConfigError::NotFound) => return LoadResult::NotFound,
			Err(e) => return LoadResult::Invalid(e),
		};

		match format.parse::<T>(&bytes) {
			Ok(value) => {
				let format_name = format.extensions().first().copied().unwrap_or("unknown");
				debug!(key, format = format_name, "loaded");
				LoadResult::Ok {
					value,
					info: LoadInfo {
						path: PathBuf::from(key),
						format: format_name,
					},
				}
			}
			Err(e) => LoadResult::Invalid(e),
		}
	}
}

impl std::fmt::Debug for ConfigLoader {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ConfigLoader")
			.field("formats", &self.formats)
			.finish_non_exhaustive()
	}
}
