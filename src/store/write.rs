use std::cell::RefCell;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Instant;

use tracing::debug;

#[cfg(feature = "events")]
use super::StoreEvent;
use super::{Component, ComponentId, ExtensionPoint, Store, StoreError};
use crate::config::ClientConfig;

impl Store {
	/// Installs a new configuration snapshot.
	///
	/// Readers holding the previous snapshot keep it until they drop it.
	pub fn set_config(&self, config: ClientConfig) -> Arc<ClientConfig> {
		let config = Arc::new(config);
		self.config.store(Arc::clone(&config));

		#[cfg(feature = "events")]
		{
			let _ = self.events.send(StoreEvent::ConfigChanged {
				config: Arc::clone(&config),
			});
		}

		config
	}

	/// Records an extension point on behalf of `plugin_id`.
	///
	/// Fails if the point claims a route already served by a different product.
	pub fn register(&self, plugin_id: &str, point: ExtensionPoint) -> Result<ComponentId, StoreError> {
		let id = ComponentId(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
		let component = Component {
			id,
			plugin_id: plugin_id.to_string(),
			point,
			registered_at: Instant::now(),
		};

		// Conflict is decided inside rcu so concurrent registrations cannot both win a route.
		let conflict: RefCell<Option<StoreError>> = RefCell::new(None);

		self.components.rcu(|map| {
			let taken = component.point.route().and_then(|path| {
				map.values()
					.find(|c| c.plugin_id != plugin_id && c.point.route() == Some(path))
					.map(|c| StoreError::RouteTaken {
						path: path.to_string(),
						owner: c.plugin_id.clone(),
					})
			});

			match taken {
				Some(error) => {
					*conflict.borrow_mut() = Some(error);
					Arc::clone(map)
				}
				None => {
					*conflict.borrow_mut() = None;
					let mut new_map = (**map).clone();
					new_map.insert(id, component.clone());
					Arc::new(new_map)
				}
			}
		});

		if let Some(error) = conflict.into_inner() {
			return Err(error);
		}

		debug!(product = plugin_id, %id, kind = ?component.point.kind(), "component registered");

		#[cfg(feature = "events")]
		{
			let _ = self.events.send(StoreEvent::Registered { component });
		}

		Ok(id)
	}

	/// Removes a component by id.
	pub fn unregister(&self, id: ComponentId) -> Result<Component, StoreError> {
		// Pre-check to avoid unnecessary clone in rcu.
		if !self.components.load().contains_key(&id) {
			return Err(StoreError::NotFound { id });
		}

		let removed: RefCell<Option<Component>> = RefCell::new(None);

		self.components.rcu(|map| {
			let mut new_map = (**map).clone();
			*removed.borrow_mut() = new_map.remove(&id);
			new_map
		});

		match removed.into_inner() {
			Some(component) => {
				#[cfg(feature = "events")]
				{
					let _ = self.events.send(StoreEvent::Unregistered {
						component: component.clone(),
					});
				}
				Ok(component)
			}
			// Removed by another thread between pre-check and rcu.
			None => Err(StoreError::ConcurrentlyRemoved { id }),
		}
	}

	/// Removes every component registered by `plugin_id`, returning them in registration order.
	pub fn unregister_all(&self, plugin_id: &str) -> Vec<Component> {
		let removed: RefCell<Vec<Component>> = RefCell::new(Vec::new());

		self.components.rcu(|map| {
			let (gone, kept): (Vec<_>, Vec<_>) = map
				.iter()
				.map(|(id, c)| (*id, c.clone()))
				.partition(|(_, c)| c.plugin_id == plugin_id);
			*removed.borrow_mut() = gone.into_iter().map(|(_, c)| c).collect();
			kept.into_iter().collect::<std::collections::HashMap<_, _>>()
		});

		let mut removed = removed.into_inner();
		removed.sort_by_key(|c| c.id);

		#[cfg(feature = "events")]
		for component in &removed {
			let _ = self.events.send(StoreEvent::Unregistered {
				component: component.clone(),
			});
		}

		removed
	}
}
