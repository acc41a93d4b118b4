//!
//! Per-product capability object for registering extension points with the host.

use std::sync::Arc;

use crate::store::{Component, ComponentId, ExtensionPoint, Store, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
	#[error("{field} must not be empty")]
	Empty { field: &'static str },

	#[error("route must start with '/': {0}")]
	InvalidRoute(String),

	#[error("{id} belongs to {owner}, not {requested_by}")]
	NotOwned {
		id: ComponentId,
		owner: String,
		requested_by: String,
	},

	#[error(transparent)]
	Store(#[from] StoreError),
}

/// Registration surface handed to a single product's `initialize`.
///
/// Scoped to one product id: every component it registers is owned by that
/// product, and it can only unregister its own components. Constructing a
/// registry has no side effects; nothing reaches the store until a
/// `register_*` call is made.
pub struct PluginRegistry {
	id: String,
	store: Arc<Store>,
}

impl PluginRegistry {
	pub fn new(id: impl Into<String>, store: Arc<Store>) -> Self {
		Self {
			id: id.into(),
			store,
		}
	}

	/// Id of the product this registry is scoped to.
	pub fn id(&self) -> &str {
		&self.id
	}

	pub fn register_root_component(&self, name: &str) -> Result<ComponentId, RegistryError> {
		let name = non_empty("name", name)?;
		self.register(ExtensionPoint::RootComponent { name })
	}

	pub fn register_channel_header_button(
		&self,
		label: &str,
		tooltip: Option<&str>,
	) -> Result<ComponentId, RegistryError> {
		let label = non_empty("label", label)?;
		self.register(ExtensionPoint::ChannelHeaderButton {
			label,
			tooltip: tooltip.map(str::to_string),
		})
	}

	pub fn register_channel_header_menu_action(&self, label: &str) -> Result<ComponentId, RegistryError> {
		let label = non_empty("label", label)?;
		self.register(ExtensionPoint::ChannelHeaderMenuAction { label })
	}

	pub fn register_main_menu_action(&self, label: &str) -> Result<ComponentId, RegistryError> {
		let label = non_empty("label", label)?;
		self.register(ExtensionPoint::MainMenuAction { label })
	}

	pub fn register_post_type_component(&self, post_type: &str) -> Result<ComponentId, RegistryError> {
		let post_type = non_empty("post_type", post_type)?;
		self.register(ExtensionPoint::PostType { post_type })
	}

	/// Claims a top-level route. Routes are unique across products.
	pub fn register_route(&self, path: &str) -> Result<ComponentId, RegistryError> {
		let path = route("path", path)?;
		self.register(ExtensionPoint::Route { path })
	}

	/// Adds the product to the product switcher, claiming `base_url`.
	pub fn register_product(&self, base_url: &str, switcher_text: &str) -> Result<ComponentId, RegistryError> {
		let base_url = route("base_url", base_url)?;
		let switcher_text = non_empty("switcher_text", switcher_text)?;
		self.register(ExtensionPoint::Product {
			base_url,
			switcher_text,
		})
	}

	/// Removes a component previously registered through this registry.
	pub fn unregister_component(&self, id: ComponentId) -> Result<(), RegistryError> {
		let component = self.store.get(id).ok_or(StoreError::NotFound { id })?;
		if component.plugin_id != self.id {
			return Err(RegistryError::NotOwned {
				id,
				owner: component.plugin_id,
				requested_by: self.id.clone(),
			});
		}
		self.store.unregister(id)?;
		Ok(())
	}

	/// Components currently registered by this product.
	pub fn registered(&self) -> Vec<Component> {
		self.store.components_for(&self.id)
	}

	fn register(&self, point: ExtensionPoint) -> Result<ComponentId, RegistryError> {
		Ok(self.store.register(&self.id, point)?)
	}
}

impl std::fmt::Debug for PluginRegistry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("PluginRegistry")
			.field("id", &self.id)
			.finish_non_exhaustive()
	}
}

fn non_empty(field: &'static str, value: &str) -> Result<String, RegistryError> {
	let value = value.trim();
	if value.is_empty() {
		return Err(RegistryError::Empty { field });
	}
	Ok(value.to_string())
}

fn route(field: &'static str, value: &str) -> Result<String, RegistryError> {
	let value = non_empty(field, value)?;
	if !value.starts_with('/') {
		return Err(RegistryError::InvalidRoute(value));
	}
	Ok(value)
}
