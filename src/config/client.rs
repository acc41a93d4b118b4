use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Sentinel value a flag must hold to count as enabled.
pub const ENABLED: &str = "true";

/// Flat client configuration as exposed to the browser-facing host.
///
/// Every value is kept as a string. Scalar values in source documents
/// (`true`, `42`, `1.5`) are normalized to their string form on load, so a
/// TOML `FeatureFlagBoardsProduct = true` and a JSON `"true"` are equivalent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ClientConfig {
	values: BTreeMap<String, String>,
}

impl ClientConfig {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn get(&self, key: &str) -> Option<&str> {
		self.values.get(key).map(String::as_str)
	}

	pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
		self.values.insert(key.into(), value.into())
	}

	/// Builder-style [`insert`](Self::insert).
	pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.insert(key, value);
		self
	}

	/// Returns true only if `key` is present and equals [`ENABLED`].
	pub fn is_enabled(&self, key: &str) -> bool {
		self.get(key) == Some(ENABLED)
	}

	pub fn len(&self) -> usize {
		self.values.len()
	}

	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
	}
}

impl<K, V> FromIterator<(K, V)> for ClientConfig
where
	K: Into<String>,
	V: Into<String>,
{
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		Self {
			values: iter
				.into_iter()
				.map(|(k, v)| (k.into(), v.into()))
				.collect(),
		}
	}
}

/// Any scalar a source document may hold for a config key.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Scalar {
	Bool(bool),
	Int(i64),
	Float(f64),
	Str(String),
}

impl fmt::Display for Scalar {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Bool(b) => write!(f, "{b}"),
			Self::Int(i) => write!(f, "{i}"),
			Self::Float(x) => write!(f, "{x}"),
			Self::Str(s) => f.write_str(s),
		}
	}
}

impl<'de> Deserialize<'de> for ClientConfig {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let raw = BTreeMap::<String, Scalar>::deserialize(deserializer)?;
		Ok(raw.into_iter().map(|(k, v)| (k, v.to_string())).collect())
	}
}
