//!
//! The shared application store handed to every product.
//!
//! Holds the current [`ClientConfig`] snapshot and the table of extension
//! points products have registered through their registries.

mod component;
mod error;
#[cfg(feature = "events")]
mod event;
mod read;
mod write;

pub use component::{Component, ComponentId, ExtensionKind, ExtensionPoint};
pub use error::StoreError;
#[cfg(feature = "events")]
pub use event::StoreEvent;

use std::collections::HashMap;
use std::sync::atomic::AtomicU64;

use arc_swap::ArcSwap;

use crate::config::ClientConfig;

/// Default event channel capacity.
#[cfg(feature = "events")]
pub const DEFAULT_EVENT_CAPACITY: usize = 100;

/// Thread-safe application store with atomic replacement support.
///
/// Uses RCU (Read-Copy-Update) for lock-free reads and atomic updates of both
/// the configuration snapshot and the component table.
pub struct Store {
	pub(crate) config: ArcSwap<ClientConfig>,
	pub(crate) components: ArcSwap<HashMap<ComponentId, Component>>,
	pub(crate) next_id: AtomicU64,
	#[cfg(feature = "events")]
	pub(crate) events: tokio::sync::broadcast::Sender<StoreEvent>,
}

impl Store {
	/// Creates an empty store with an empty configuration.
	pub fn new() -> Self {
		Self::with_config(ClientConfig::default())
	}

	/// Creates an empty store holding `config`.
	pub fn with_config(config: ClientConfig) -> Self {
		Self {
			config: ArcSwap::from_pointee(config),
			components: ArcSwap::from_pointee(HashMap::new()),
			next_id: AtomicU64::new(0),
			#[cfg(feature = "events")]
			events: tokio::sync::broadcast::channel(DEFAULT_EVENT_CAPACITY).0,
		}
	}

	/// Creates a new store with custom event channel capacity.
	///
	/// Note: Events may be dropped if subscribers process slower than
	/// the write rate and the channel fills up.
	#[cfg(feature = "events")]
	pub fn with_event_capacity(config: ClientConfig, capacity: usize) -> Self {
		Self {
			events: tokio::sync::broadcast::channel(capacity).0,
			..Self::with_config(config)
		}
	}
}

impl Default for Store {
	fn default() -> Self {
		Self::new()
	}
}

impl std::fmt::Debug for Store {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Store")
			.field("config", &self.config.load())
			.field("components", &self.components.load().len())
			.finish_non_exhaustive()
	}
}
