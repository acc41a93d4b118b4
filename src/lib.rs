//!
//! Loads optional *products* (separately bundled feature modules) into a host
//! application at startup.
//!
//! This crate integrates four components:
//!
//! - **config**: Format-agnostic loading of the client configuration that drives feature flags.
//! - **store**: The shared application store every product receives.
//! - **registry**: Per-product capability object for registering extension points.
//! - **product** / **host**: The product contract, the static descriptor table and
//!   the [`ProductHost`] orchestrator that gates, loads and initializes products.
//!
//! ## Feature Flags
//!
//! - `full`: Enables all features.
//! - `json`, `toml`, `yaml`: Configuration formats (`json` is on by default).
//! - `fs`: Sandboxed filesystem configuration source.
//! - `events`: Change-event broadcasting from the [`Store`].
//! - `boards`: Compiles in the built-in boards product.
//!
//! ## Basic Usage
//!
//! See `demos/boot.rs` for a complete example.

pub mod config;
pub mod host;
pub mod product;
pub mod registry;
pub mod store;

pub use config::{ClientConfig, ConfigError, ConfigLoader};
pub use host::{HostError, InitReport, ProductHost, ProductState, ShutdownReport, SkipReason};
pub use product::{
	ProductDescriptor, ProductError, ProductImports, ProductManifest, ProductModule, ProductPlugin,
	RemoteModules,
};
pub use registry::{PluginRegistry, RegistryError};
pub use store::{Component, ComponentId, ExtensionKind, ExtensionPoint, Store, StoreError};
