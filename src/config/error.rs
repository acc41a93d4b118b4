/// Errors raised while reading or parsing configuration and manifests.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	/// Parsing error from format implementation.
	#[error("parse error: {0}")]
	Parse(String),

	/// Resource not found.
	#[error("not found")]
	NotFound,

	/// No registered format handles the given extension.
	#[error("unsupported format: {0}")]
	UnsupportedFormat(String),

	/// IO error from source.
	#[error("io error: {0}")]
	Io(#[from] std::io::Error),

	/// Sandbox violation in file system source.
	#[cfg(feature = "fs")]
	#[error("sandbox violation")]
	SandboxViolation,
}
