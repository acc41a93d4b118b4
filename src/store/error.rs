use super::ComponentId;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
	/// The requested component is not registered.
	#[error("component not found: {id}")]
	NotFound { id: ComponentId },
	/// The component was removed by another thread between check and removal.
	#[error("component was concurrently removed: {id}")]
	ConcurrentlyRemoved { id: ComponentId },
	/// Another product already serves this route.
	#[error("route {path} is already registered by {owner}")]
	RouteTaken { path: String, owner: String },
}
