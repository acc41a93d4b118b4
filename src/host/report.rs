//!
//! Per-product states and aggregate outcomes.

use std::fmt;

/// Lifecycle of one product within a session.
///
/// `NotAttempted -> SkippedByFlag | SkippedUnavailable | Loading -> Initialized | Failed`,
/// and `Loading | Initialized -> ShutDown` through an explicit shutdown. Once a product
/// leaves `NotAttempted` it is never attempted again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductState {
	NotAttempted,
	SkippedByFlag,
	SkippedUnavailable,
	Loading,
	Initialized,
	Failed(String),
	ShutDown,
}

impl ProductState {
	pub fn is_terminal(&self) -> bool {
		!matches!(self, Self::NotAttempted | Self::Loading)
	}
}

/// Why a product was not loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
	/// Its feature flag is declared and not enabled.
	FlagDisabled,
	/// Its code is not in the availability table.
	Unavailable,
}

impl fmt::Display for SkipReason {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::FlagDisabled => f.write_str("feature flag not enabled"),
			Self::Unavailable => f.write_str("product not found"),
		}
	}
}

/// Outcome of one `initialize_products` call.
#[derive(Debug, Clone, Default)]
pub struct InitReport {
	/// Products initialized by this call.
	pub initialized: Vec<String>,
	/// Products gated off, with the reason.
	pub skipped: Vec<(String, SkipReason)>,
	/// Products whose load or initialization failed, with the error message.
	pub failed: Vec<(String, String)>,
	/// Products left untouched because an earlier or concurrent call already
	/// claimed them. Some of them may still be loading.
	pub already_attempted: Vec<String>,
}

impl InitReport {
	/// True when no product failed in this call.
	pub fn is_clean(&self) -> bool {
		self.failed.is_empty()
	}

	/// Products skipped for `reason`.
	pub fn skipped_for(&self, reason: SkipReason) -> impl Iterator<Item = &String> {
		self.skipped
			.iter()
			.filter(move |(_, r)| *r == reason)
			.map(|(id, _)| id)
	}
}

/// Outcome of a `shutdown` call.
#[derive(Debug, Clone, Default)]
pub struct ShutdownReport {
	/// Products whose `uninitialize` succeeded.
	pub uninitialized: Vec<String>,
	/// Products whose `uninitialize` failed, with the error message.
	pub failed: Vec<(String, String)>,
	/// Products still loading when shutdown began; their load tears them down.
	pub interrupted: Vec<String>,
	/// Components swept from the store after teardown.
	pub removed_components: usize,
}
