use std::sync::Arc;

use super::Component;
use crate::config::ClientConfig;

/// Events emitted by the store on changes.
#[derive(Debug, Clone)]
pub enum StoreEvent {
	/// A new configuration snapshot was installed.
	ConfigChanged { config: Arc<ClientConfig> },
	/// A product registered an extension point.
	Registered { component: Component },
	/// An extension point was removed.
	Unregistered { component: Component },
}
