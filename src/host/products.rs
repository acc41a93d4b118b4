//!
//! Feature-flagged, failure-isolated product initialization.

use std::any::Any;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Either, join_all, select};
use tokio::runtime::Handle;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, warn};

use super::HostError;
use super::report::{InitReport, ProductState, ShutdownReport, SkipReason};
use crate::config::{ClientConfig, ConfigLoader};
use crate::product::{
	ProductDescriptor, ProductError, ProductImports, ProductManifest, ProductPlugin, RemoteModules, catalog,
};
use crate::registry::PluginRegistry;
use crate::store::Store;

type Plugins = HashMap<&'static str, Box<dyn ProductPlugin>>;

const INTERRUPTED: &str = "host shut down before the product finished initializing";

/// Brings optional products up against a shared store.
///
/// # Clone Semantics
///
/// Clones share the same store, product states and live plugin instances, so
/// the at-most-once guarantee holds across every clone.
#[derive(Clone)]
pub struct ProductHost {
	store: Arc<Store>,
	remote_modules: Arc<RemoteModules>,
	products: Arc<[ProductDescriptor]>,
	states: Arc<RwLock<HashMap<&'static str, ProductState>>>,
	/// Initialized plugins, owned until shutdown.
	plugins: Arc<Mutex<Plugins>>,
	manifests: Arc<RwLock<HashMap<&'static str, ProductManifest>>>,
}

/// Builder for ProductHost.
pub struct ProductHostBuilder {
	store: Option<Arc<Store>>,
	remote_modules: Option<RemoteModules>,
	products: Option<Vec<ProductDescriptor>>,
}

impl ProductHostBuilder {
	pub fn new() -> Self {
		Self {
			store: None,
			remote_modules: None,
			products: None,
		}
	}

	/// Shared store handed to every product. Defaults to an empty store.
	pub fn store(mut self, store: Arc<Store>) -> Self {
		self.store = Some(store);
		self
	}

	/// Availability table. Defaults to [`RemoteModules::compiled`].
	pub fn remote_modules(mut self, modules: RemoteModules) -> Self {
		self.remote_modules = Some(modules);
		self
	}

	/// Replaces the descriptor table. Defaults to [`catalog::products`].
	pub fn products(mut self, products: impl IntoIterator<Item = ProductDescriptor>) -> Self {
		self.products = Some(products.into_iter().collect());
		self
	}

	/// Adds one descriptor. The first call replaces the default catalog.
	pub fn product(mut self, product: ProductDescriptor) -> Self {
		self.products.get_or_insert_with(Vec::new).push(product);
		self
	}

	pub fn build(self) -> Result<ProductHost, HostError> {
		let products = self.products.unwrap_or_else(catalog::products);

		let mut seen = HashSet::new();
		for product in &products {
			if product.id().is_empty() {
				return Err(HostError::Builder("product id must not be empty".to_string()));
			}
			if !seen.insert(product.id()) {
				return Err(HostError::DuplicateProduct(product.id().to_string()));
			}
		}

		let states = products
			.iter()
			.map(|p| (p.id(), ProductState::NotAttempted))
			.collect();

		Ok(ProductHost {
			store: self.store.unwrap_or_default(),
			remote_modules: Arc::new(self.remote_modules.unwrap_or_else(RemoteModules::compiled)),
			products: products.into(),
			states: Arc::new(RwLock::new(states)),
			plugins: Arc::new(Mutex::new(HashMap::new())),
			manifests: Arc::new(RwLock::new(HashMap::new())),
		})
	}
}

impl Default for ProductHostBuilder {
	fn default() -> Self {
		Self::new()
	}
}

impl ProductHost {
	pub fn builder() -> ProductHostBuilder {
		ProductHostBuilder::new()
	}

	pub fn store(&self) -> &Arc<Store> {
		&self.store
	}

	pub fn remote_modules(&self) -> &RemoteModules {
		&self.remote_modules
	}

	pub fn products(&self) -> &[ProductDescriptor] {
		&self.products
	}

	/// Loads a [`ClientConfig`] through `loader` and installs it in the store.
	pub async fn load_config(&self, loader: &ConfigLoader, base_name: &str) -> Result<Arc<ClientConfig>, HostError> {
		let (config, info) = loader.load::<ClientConfig>(base_name).await.into_result()?;
		info!(path = %info.path.display(), format = info.format, keys = config.len(), "loaded client config");
		Ok(self.store.set_config(config))
	}

	/// Attempts to bring every declared product to an initialized state.
	///
	/// Reads the configuration once, gates each product on its feature flag and
	/// then on availability, and loads every eligible product concurrently. A
	/// failure (error or panic) is contained to its product. Always resolves;
	/// per-product outcomes are in the returned report.
	pub async fn initialize_products(&self) -> InitReport {
		let config = self.store.config();
		let mut report = InitReport::default();
		let mut eligible = Vec::new();

		// Claim every untouched product under one lock so concurrent calls never double-load.
		{
			let mut states = self.states.write().await;
			for product in self.products.iter() {
				let id = product.id();
				let state = states.entry(id).or_insert(ProductState::NotAttempted);

				if *state != ProductState::NotAttempted {
					report.already_attempted.push(id.to_string());
					continue;
				}

				if !product.is_flag_enabled(&config) {
					info!(product = id, "Feature flag for product not enabled. Not loading it.");
					*state = ProductState::SkippedByFlag;
					report.skipped.push((id.to_string(), SkipReason::FlagDisabled));
					continue;
				}

				if !self.remote_modules.contains(id) {
					info!(product = id, "Product not found. Not loading it.");
					*state = ProductState::SkippedUnavailable;
					report.skipped.push((id.to_string(), SkipReason::Unavailable));
					continue;
				}

				info!(product = id, "Loading product...");
				*state = ProductState::Loading;
				eligible.push(product);
			}
		}

		let outcomes = join_all(eligible.into_iter().map(|product| self.attempt(product))).await;

		for (id, outcome) in outcomes {
			match outcome {
				Ok(()) => report.initialized.push(id.to_string()),
				Err(e) => report.failed.push((id.to_string(), e)),
			}
		}

		report
	}

	/// Calls `uninitialize` on every initialized product and sweeps their components.
	///
	/// Teardowns run concurrently and fail independently. Products still loading
	/// are marked [`ProductState::ShutDown`] up front and torn down by their own
	/// load once it finishes. Products end in `ShutDown` and are never reloaded.
	pub async fn shutdown(&self) -> ShutdownReport {
		let mut report = ShutdownReport::default();

		// Same lock order as `attempt`: states, then plugins.
		let mut plugins: Vec<_> = {
			let mut states = self.states.write().await;
			for (id, state) in states.iter_mut() {
				if *state == ProductState::Loading {
					info!(product = *id, "Product still loading. Tearing it down once loaded.");
					*state = ProductState::ShutDown;
					report.interrupted.push(id.to_string());
				}
			}
			self.plugins.lock().await.drain().collect()
		};
		report.interrupted.sort();
		plugins.sort_by_key(|(id, _)| *id);

		let outcomes = join_all(
			plugins
				.into_iter()
				.map(|(id, plugin)| async move { (id, teardown(plugin).await) }),
		)
		.await;

		let mut states = self.states.write().await;

		for (id, result) in outcomes {
			match result {
				Ok(()) => {
					info!(product = id, "Product uninitialized");
					report.uninitialized.push(id.to_string());
				}
				Err(e) => {
					error!(product = id, error = %e, "Error uninitializing product");
					report.failed.push((id.to_string(), e.to_string()));
				}
			}
			report.removed_components += self.store.unregister_all(id).len();
			states.insert(id, ProductState::ShutDown);
		}

		report
	}

	/// Current state of a declared product; `None` for unknown ids.
	pub async fn state(&self, id: &str) -> Option<ProductState> {
		self.states.read().await.get(id).cloned()
	}

	/// States of every declared product.
	pub async fn states(&self) -> BTreeMap<String, ProductState> {
		self.states
			.read()
			.await
			.iter()
			.map(|(id, state)| (id.to_string(), state.clone()))
			.collect()
	}

	pub async fn is_initialized(&self, id: &str) -> bool {
		self.state(id).await == Some(ProductState::Initialized)
	}

	/// Manifest retained for a loaded product, if it resolved.
	pub async fn manifest(&self, id: &str) -> Option<ProductManifest> {
		self.manifests.read().await.get(id).cloned()
	}

	/// Loads and initializes one product, then settles its state.
	async fn attempt(&self, product: &ProductDescriptor) -> (&'static str, Result<(), String>) {
		let id = product.id();

		let outcome = AssertUnwindSafe(self.load_and_initialize(product))
			.catch_unwind()
			.await
			.unwrap_or_else(|payload| Err(ProductError::Panicked(panic_message(&*payload))));

		let mut states = self.states.write().await;
		if states.get(id) == Some(&ProductState::ShutDown) {
			drop(states);
			return (id, self.discard(id, outcome).await);
		}

		let result = match outcome {
			Ok(plugin) => {
				info!(product = id, "Product initialized!");
				self.plugins.lock().await.insert(id, plugin);
				states.insert(id, ProductState::Initialized);
				Ok(())
			}
			Err(e) => {
				error!(product = id, error = %e, "Error loading and initializing product");
				let message = e.to_string();
				states.insert(id, ProductState::Failed(message.clone()));
				Err(message)
			}
		};
		(id, result)
	}

	/// Tears down a product whose load outlived a shutdown.
	async fn discard(&self, id: &'static str, outcome: Result<Box<dyn ProductPlugin>, ProductError>) -> Result<(), String> {
		match outcome {
			Ok(plugin) => {
				warn!(product = id, "Host shut down while product was loading. Uninitializing it.");
				if let Err(e) = teardown(plugin).await {
					error!(product = id, error = %e, "Error uninitializing product");
				}
			}
			Err(e) => error!(product = id, error = %e, "Error loading and initializing product"),
		}
		self.store.unregister_all(id);
		Err(INTERRUPTED.to_string())
	}

	async fn load_and_initialize(&self, product: &ProductDescriptor) -> Result<Box<dyn ProductPlugin>, ProductError> {
		let id = product.id();
		let ProductImports { index, manifest } = product.load();

		// Initialization waits on the index alone.
		let module = match select(index, manifest).await {
			Either::Left((index, manifest)) => {
				let module = index?;
				self.retain_manifest(id, manifest).await;
				module
			}
			Either::Right((manifest, index)) => {
				record_manifest(&self.manifests, id, manifest).await;
				index.await?
			}
		};

		info!(product = id, "Initializing product...");
		let mut plugin = module.instantiate();
		let registry = PluginRegistry::new(id, Arc::clone(&self.store));
		plugin.initialize(registry, Arc::clone(&self.store)).await?;

		Ok(plugin)
	}

	/// Records the manifest now if it is ready, otherwise whenever it resolves.
	async fn retain_manifest(&self, id: &'static str, mut manifest: BoxFuture<'static, Result<ProductManifest, ProductError>>) {
		if let Some(result) = (&mut manifest).now_or_never() {
			record_manifest(&self.manifests, id, result).await;
			return;
		}

		let Ok(runtime) = Handle::try_current() else {
			debug!(product = id, "No runtime to finish the product manifest. Dropping it.");
			return;
		};
		let manifests = Arc::clone(&self.manifests);
		runtime.spawn(async move {
			let result = manifest.await;
			record_manifest(&manifests, id, result).await;
		});
	}
}

impl std::fmt::Debug for ProductHost {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ProductHost")
			.field("store", &self.store)
			.field("remote_modules", &self.remote_modules)
			.field("products", &self.products)
			.finish_non_exhaustive()
	}
}

async fn record_manifest(
	manifests: &RwLock<HashMap<&'static str, ProductManifest>>,
	id: &'static str,
	result: Result<ProductManifest, ProductError>,
) {
	match result {
		Ok(manifest) => {
			manifests.write().await.insert(id, manifest);
		}
		Err(e) => warn!(product = id, error = %e, "Product manifest unavailable"),
	}
}

async fn teardown(mut plugin: Box<dyn ProductPlugin>) -> Result<(), ProductError> {
	AssertUnwindSafe(plugin.uninitialize())
		.catch_unwind()
		.await
		.unwrap_or_else(|payload| Err(ProductError::Panicked(panic_message(&*payload))))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
	if let Some(s) = payload.downcast_ref::<&str>() {
		(*s).to_string()
	} else if let Some(s) = payload.downcast_ref::<String>() {
		s.clone()
	} else {
		"unknown panic".to_string()
	}
}
