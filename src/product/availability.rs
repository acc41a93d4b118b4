use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Which products' code is actually present in this build or deployment.
///
/// Presence is boolean: an id mapped to `false` counts as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemoteModules {
	modules: BTreeMap<String, bool>,
}

impl RemoteModules {
	/// An empty table: no product is available.
	pub fn new() -> Self {
		Self::default()
	}

	/// Products compiled into this build through cargo features.
	pub fn compiled() -> Self {
		let ids: &[&str] = &[
			#[cfg(feature = "boards")]
			super::boards::ID,
		];
		ids.iter().copied().collect()
	}

	pub fn insert(&mut self, id: impl Into<String>) {
		self.set(id, true);
	}

	pub fn set(&mut self, id: impl Into<String>, present: bool) {
		self.modules.insert(id.into(), present);
	}

	/// Builder-style [`insert`](Self::insert).
	pub fn with(mut self, id: impl Into<String>) -> Self {
		self.insert(id);
		self
	}

	pub fn contains(&self, id: &str) -> bool {
		self.modules.get(id).copied().unwrap_or(false)
	}

	/// Ids of every present product.
	pub fn ids(&self) -> impl Iterator<Item = &str> {
		self.modules
			.iter()
			.filter(|(_, present)| **present)
			.map(|(id, _)| id.as_str())
	}
}

impl<S: Into<String>> FromIterator<S> for RemoteModules {
	fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
		Self {
			modules: iter.into_iter().map(|id| (id.into(), true)).collect(),
		}
	}
}
