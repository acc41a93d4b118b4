use std::collections::HashMap;
use std::sync::Arc;

#[cfg(feature = "events")]
use super::StoreEvent;
use super::{Component, ComponentId, ExtensionKind, Store};
use crate::config::ClientConfig;

impl Store {
	/// Current configuration snapshot. This is a wait-free operation.
	pub fn config(&self) -> Arc<ClientConfig> {
		self.config.load_full()
	}

	/// Gets a component by id.
	pub fn get(&self, id: ComponentId) -> Option<Component> {
		self.components.load().get(&id).cloned()
	}

	/// Returns an atomic snapshot of the component table.
	pub fn components(&self) -> Arc<HashMap<ComponentId, Component>> {
		self.components.load_full()
	}

	/// Components registered by one product, in registration order.
	pub fn components_for(&self, plugin_id: &str) -> Vec<Component> {
		self.collect(|c| c.plugin_id == plugin_id)
	}

	/// Components of one kind across all products, in registration order.
	pub fn components_of(&self, kind: ExtensionKind) -> Vec<Component> {
		self.collect(|c| c.point.kind() == kind)
	}

	/// Product currently serving `path`.
	pub fn route_owner(&self, path: &str) -> Option<String> {
		self.components
			.load()
			.values()
			.find(|c| c.point.route() == Some(path))
			.map(|c| c.plugin_id.clone())
	}

	/// Returns the number of registered components.
	pub fn len(&self) -> usize {
		self.components.load().len()
	}

	pub fn is_empty(&self) -> bool {
		self.components.load().is_empty()
	}

	/// Subscribes to store change events.
	#[cfg(feature = "events")]
	pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<StoreEvent> {
		self.events.subscribe()
	}

	fn collect(&self, keep: impl Fn(&Component) -> bool) -> Vec<Component> {
		let mut found: Vec<Component> = self
			.components
			.load()
			.values()
			.filter(|c| keep(c))
			.cloned()
			.collect();
		found.sort_by_key(|c| c.id);
		found
	}
}
