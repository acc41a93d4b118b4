use super::super::{ConfigError, Source};
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

/// A file system source rooted at a directory, backed by tokio::fs.
#[derive(Debug)]
pub struct FileSource {
	root: PathBuf,
}

impl FileSource {
	/// Create a new FileSource rooted at the given path.
	pub fn new(root: impl Into<PathBuf>) -> Self {
		Self { root: root.into() }
	}

	pub fn root(&self) -> &Path {
		&self.root
	}

	/// Resolves the key inside the root, refusing anything that escapes it.
	async fn resolve_secure(&self, key: &str) -> Result<PathBuf, ConfigError> {
		if Path::new(key)
			.components()
			.any(|c| matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_)))
		{
			return Err(ConfigError::SandboxViolation);
		}

		let canonical_root = fs::canonicalize(&self.root).await?;

		// Symlinks are resolved before the containment check.
		match fs::canonicalize(self.root.join(key)).await {
			Ok(canonical) if canonical.starts_with(&canonical_root) => Ok(canonical),
			Ok(_) => Err(ConfigError::SandboxViolation),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(ConfigError::NotFound),
			Err(e) => Err(ConfigError::Io(e)),
		}
	}
}

#[async_trait]
impl Source for FileSource {
	async fn read(&self, key: &str) -> Result<Vec<u8>, ConfigError> {
		let path = self.resolve_secure(key).await?;
		Ok(fs::read(path).await?)
	}

	async fn exists(&self, key: &str) -> bool {
		self.resolve_secure(key).await.is_ok()
	}
}
