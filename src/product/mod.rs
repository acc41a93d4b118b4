//!
//! Product contract and descriptor types.
//!
//! - [`ProductPlugin`] - lifecycle implemented by every product
//! - [`ProductDescriptor`] - static table entry: id, flag gate, loader
//! - [`RemoteModules`] - availability table
//! - [`catalog`] - descriptors compiled into this build

mod availability;
#[cfg(feature = "boards")]
pub mod boards;
pub mod catalog;
mod error;

pub use availability::RemoteModules;
pub use error::ProductError;

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};

use crate::config::format::AnyFormat;
use crate::config::{ClientConfig, Format};
use crate::registry::PluginRegistry;
use crate::store::Store;

/// Lifecycle of an optional product.
#[async_trait]
pub trait ProductPlugin: Send + Sync {
	/// Called once, with a registry scoped to this product and the shared store.
	async fn initialize(&mut self, registry: PluginRegistry, store: Arc<Store>) -> Result<(), ProductError>;

	/// Called once on host shutdown if `initialize` succeeded.
	async fn uninitialize(&mut self) -> Result<(), ProductError>;
}

/// Constructs a fresh plugin instance.
pub type PluginFactory = Arc<dyn Fn() -> Box<dyn ProductPlugin> + Send + Sync>;

/// The resolved code module of a product: its no-argument plugin constructor.
#[derive(Clone)]
pub struct ProductModule {
	factory: PluginFactory,
}

impl ProductModule {
	pub fn new<F>(factory: F) -> Self
	where
		F: Fn() -> Box<dyn ProductPlugin> + Send + Sync + 'static,
	{
		Self {
			factory: Arc::new(factory),
		}
	}

	/// Module whose plugin is `P::default()`.
	pub fn of<P>() -> Self
	where
		P: ProductPlugin + Default + 'static,
	{
		Self::new(|| Box::new(P::default()))
	}

	pub fn instantiate(&self) -> Box<dyn ProductPlugin> {
		(self.factory)()
	}
}

impl std::fmt::Debug for ProductModule {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str("ProductModule(<fn>)")
	}
}

/// Descriptive metadata shipped alongside a product's code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductManifest {
	pub id: String,
	pub name: String,
	pub version: String,
	#[serde(default)]
	pub description: Option<String>,
}

impl ProductManifest {
	pub fn parse(format: AnyFormat, input: &[u8]) -> Result<Self, ProductError> {
		format
			.parse(input)
			.map_err(|e| ProductError::Manifest(e.to_string()))
	}
}

/// In-flight loads of a product's parts.
pub struct ProductImports {
	/// Resolves to the plugin constructor. Required.
	pub index: BoxFuture<'static, Result<ProductModule, ProductError>>,
	/// Resolves to the product manifest. Retained, not needed for initialization.
	pub manifest: BoxFuture<'static, Result<ProductManifest, ProductError>>,
}

impl ProductImports {
	pub fn new<I, M>(index: I, manifest: M) -> Self
	where
		I: Future<Output = Result<ProductModule, ProductError>> + Send + 'static,
		M: Future<Output = Result<ProductManifest, ProductError>> + Send + 'static,
	{
		Self {
			index: index.boxed(),
			manifest: manifest.boxed(),
		}
	}

	/// Both parts already resolved.
	pub fn ready(module: ProductModule, manifest: ProductManifest) -> Self {
		Self::new(async move { Ok(module) }, async move { Ok(manifest) })
	}
}

/// Starts loading every part of a product.
pub type LoadFn = Arc<dyn Fn() -> ProductImports + Send + Sync>;

/// A statically declared optional product.
#[derive(Clone)]
pub struct ProductDescriptor {
	id: &'static str,
	feature_flag: Option<&'static str>,
	load: LoadFn,
}

impl ProductDescriptor {
	/// Declares an ungated product.
	pub fn new<F>(id: &'static str, load: F) -> Self
	where
		F: Fn() -> ProductImports + Send + Sync + 'static,
	{
		Self {
			id,
			feature_flag: None,
			load: Arc::new(load),
		}
	}

	/// Gates the product behind the configuration key `key`.
	pub fn feature_flag(mut self, key: &'static str) -> Self {
		self.feature_flag = Some(key);
		self
	}

	pub fn id(&self) -> &'static str {
		self.id
	}

	pub fn flag(&self) -> Option<&'static str> {
		self.feature_flag
	}

	/// Ungated products are always enabled; gated ones need their key set to `"true"`.
	pub fn is_flag_enabled(&self, config: &ClientConfig) -> bool {
		self.feature_flag.is_none_or(|key| config.is_enabled(key))
	}

	/// Kicks off the product's loads.
	pub fn load(&self) -> ProductImports {
		(self.load)()
	}
}

impl std::fmt::Debug for ProductDescriptor {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ProductDescriptor")
			.field("id", &self.id)
			.field("feature_flag", &self.feature_flag)
			.finish_non_exhaustive()
	}
}
