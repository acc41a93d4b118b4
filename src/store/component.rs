use std::fmt;
use std::time::Instant;

/// Store-assigned identifier of a registered component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(pub(crate) u64);

impl ComponentId {
	pub fn get(self) -> u64 {
		self.0
	}
}

impl fmt::Display for ComponentId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "component-{}", self.0)
	}
}

/// A host extension point a product can plug into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtensionPoint {
	/// Rendered once at the application root.
	RootComponent { name: String },
	/// Button in the channel header.
	ChannelHeaderButton {
		label: String,
		tooltip: Option<String>,
	},
	/// Entry in the channel header dropdown.
	ChannelHeaderMenuAction { label: String },
	/// Entry in the main menu.
	MainMenuAction { label: String },
	/// Renderer for posts of a custom type.
	PostType { post_type: String },
	/// Top-level route served by the product.
	Route { path: String },
	/// Entry in the product switcher.
	Product {
		base_url: String,
		switcher_text: String,
	},
}

impl ExtensionPoint {
	pub fn kind(&self) -> ExtensionKind {
		match self {
			Self::RootComponent { .. } => ExtensionKind::RootComponent,
			Self::ChannelHeaderButton { .. } => ExtensionKind::ChannelHeaderButton,
			Self::ChannelHeaderMenuAction { .. } => ExtensionKind::ChannelHeaderMenuAction,
			Self::MainMenuAction { .. } => ExtensionKind::MainMenuAction,
			Self::PostType { .. } => ExtensionKind::PostType,
			Self::Route { .. } => ExtensionKind::Route,
			Self::Product { .. } => ExtensionKind::Product,
		}
	}

	/// Route claimed by this extension point, if any.
	///
	/// Both plain routes and product switcher entries claim their path.
	pub fn route(&self) -> Option<&str> {
		match self {
			Self::Route { path } => Some(path),
			Self::Product { base_url, .. } => Some(base_url),
			_ => None,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtensionKind {
	RootComponent,
	ChannelHeaderButton,
	ChannelHeaderMenuAction,
	MainMenuAction,
	PostType,
	Route,
	Product,
}

/// An extension point registered by a product.
#[derive(Debug, Clone)]
pub struct Component {
	pub id: ComponentId,
	/// Id of the product that registered it.
	pub plugin_id: String,
	pub point: ExtensionPoint,
	pub registered_at: Instant,
}
