use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;
use productkit::{
	ClientConfig, HostError, PluginRegistry, ProductDescriptor, ProductError, ProductHost, ProductImports,
	ProductManifest, ProductModule, ProductPlugin, ProductState, RemoteModules, SkipReason, Store,
};

const BOARDS_FLAG: &str = "FeatureFlagBoardsProduct";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Behavior {
	Ok,
	FailLoad,
	FailInit,
	PanicInit,
	FailManifest,
}

#[derive(Default)]
struct Counters {
	loads: AtomicUsize,
	constructed: AtomicUsize,
	initialized: AtomicUsize,
	uninitialized: AtomicUsize,
	/// Registry id and store received by each `initialize` call.
	seen: Mutex<Vec<(String, Arc<Store>)>>,
}

impl Counters {
	fn loads(&self) -> usize {
		self.loads.load(Ordering::SeqCst)
	}

	fn constructed(&self) -> usize {
		self.constructed.load(Ordering::SeqCst)
	}

	fn initialized(&self) -> usize {
		self.initialized.load(Ordering::SeqCst)
	}

	fn uninitialized(&self) -> usize {
		self.uninitialized.load(Ordering::SeqCst)
	}
}

struct Probe {
	counters: Arc<Counters>,
	behavior: Behavior,
	registry: Option<PluginRegistry>,
}

#[async_trait]
impl ProductPlugin for Probe {
	async fn initialize(&mut self, registry: PluginRegistry, store: Arc<Store>) -> Result<(), ProductError> {
		self.counters.initialized.fetch_add(1, Ordering::SeqCst);
		self.counters
			.seen
			.lock()
			.unwrap()
			.push((registry.id().to_string(), store));

		match self.behavior {
			Behavior::FailInit => return Err(ProductError::Initialize("boom".to_string())),
			Behavior::PanicInit => panic!("initializer exploded"),
			_ => {}
		}

		registry.register_main_menu_action(&format!("Open {}", registry.id()))?;
		self.registry = Some(registry);
		Ok(())
	}

	async fn uninitialize(&mut self) -> Result<(), ProductError> {
		self.counters.uninitialized.fetch_add(1, Ordering::SeqCst);
		self.registry = None;
		Ok(())
	}
}

fn probe(id: &'static str, counters: &Arc<Counters>, behavior: Behavior) -> ProductDescriptor {
	let counters = Arc::clone(counters);
	ProductDescriptor::new(id, move || {
		counters.loads.fetch_add(1, Ordering::SeqCst);
		let counters = Arc::clone(&counters);
		ProductImports::new(
			async move {
				if behavior == Behavior::FailLoad {
					return Err(ProductError::Load("chunk failed to load".to_string()));
				}
				Ok(ProductModule::new(move || {
					counters.constructed.fetch_add(1, Ordering::SeqCst);
					Box::new(Probe {
						counters: Arc::clone(&counters),
						behavior,
						registry: None,
					})
				}))
			},
			async move {
				if behavior == Behavior::FailManifest {
					return Err(ProductError::Manifest("manifest missing".to_string()));
				}
				Ok(manifest(id))
			},
		)
	})
}

fn manifest(id: &str) -> ProductManifest {
	ProductManifest {
		id: id.to_string(),
		name: id.to_uppercase(),
		version: "1.0.0".to_string(),
		description: None,
	}
}

fn host(config: ClientConfig, modules: RemoteModules, products: Vec<ProductDescriptor>) -> ProductHost {
	ProductHost::builder()
		.store(Arc::new(Store::with_config(config)))
		.remote_modules(modules)
		.products(products)
		.build()
		.unwrap()
}

fn boards_enabled() -> ClientConfig {
	ClientConfig::new().with(BOARDS_FLAG, "true")
}

#[tokio::test]
async fn test_enabled_and_available_is_initialized_once() {
	let counters = Arc::new(Counters::default());
	let host = host(
		boards_enabled(),
		RemoteModules::new().with("boards"),
		vec![probe("boards", &counters, Behavior::Ok).feature_flag(BOARDS_FLAG)],
	);

	let report = host.initialize_products().await;

	assert_eq!(report.initialized, vec!["boards".to_string()]);
	assert!(report.skipped.is_empty());
	assert!(report.is_clean());
	assert_eq!(counters.loads(), 1);
	assert_eq!(counters.constructed(), 1);
	assert_eq!(counters.initialized(), 1);

	let seen = counters.seen.lock().unwrap();
	assert_eq!(seen.len(), 1);
	assert_eq!(seen[0].0, "boards");
	assert!(Arc::ptr_eq(&seen[0].1, host.store()));
	drop(seen);

	assert_eq!(host.state("boards").await, Some(ProductState::Initialized));
	assert_eq!(host.store().components_for("boards").len(), 1);
	assert_eq!(host.manifest("boards").await, Some(manifest("boards")));
}

#[tokio::test]
async fn test_flag_disabled_is_never_loaded() {
	let counters = Arc::new(Counters::default());
	let host = host(
		ClientConfig::new().with(BOARDS_FLAG, "false"),
		RemoteModules::new().with("boards"),
		vec![probe("boards", &counters, Behavior::Ok).feature_flag(BOARDS_FLAG)],
	);

	let report = host.initialize_products().await;

	assert!(report.initialized.is_empty());
	assert_eq!(report.skipped, vec![("boards".to_string(), SkipReason::FlagDisabled)]);
	assert_eq!(counters.loads(), 0);
	assert_eq!(counters.constructed(), 0);
	assert_eq!(counters.initialized(), 0);
	assert_eq!(host.state("boards").await, Some(ProductState::SkippedByFlag));
	assert!(host.store().is_empty());
}

#[tokio::test]
async fn test_missing_flag_counts_as_disabled() {
	let counters = Arc::new(Counters::default());
	let host = host(
		ClientConfig::new(),
		RemoteModules::new().with("boards"),
		vec![probe("boards", &counters, Behavior::Ok).feature_flag(BOARDS_FLAG)],
	);

	let report = host.initialize_products().await;

	assert_eq!(report.skipped_for(SkipReason::FlagDisabled).count(), 1);
	assert_eq!(counters.loads(), 0);
}

#[tokio::test]
async fn test_unavailable_is_never_loaded_regardless_of_flag() {
	let counters = Arc::new(Counters::default());
	let host = host(
		boards_enabled(),
		RemoteModules::new(),
		vec![
			probe("boards", &counters, Behavior::Ok).feature_flag(BOARDS_FLAG),
			probe("playbooks", &counters, Behavior::Ok),
		],
	);

	let report = host.initialize_products().await;

	assert_eq!(
		report.skipped,
		vec![
			("boards".to_string(), SkipReason::Unavailable),
			("playbooks".to_string(), SkipReason::Unavailable),
		]
	);
	assert_eq!(counters.loads(), 0);
	assert_eq!(counters.constructed(), 0);
	assert_eq!(host.state("boards").await, Some(ProductState::SkippedUnavailable));
}

#[tokio::test]
async fn test_flag_is_checked_before_availability() {
	let counters = Arc::new(Counters::default());
	let host = host(
		ClientConfig::new(),
		RemoteModules::new(),
		vec![probe("boards", &counters, Behavior::Ok).feature_flag(BOARDS_FLAG)],
	);

	let report = host.initialize_products().await;

	assert_eq!(report.skipped, vec![("boards".to_string(), SkipReason::FlagDisabled)]);
}

#[tokio::test]
async fn test_availability_entry_set_to_false_is_absent() {
	let counters = Arc::new(Counters::default());
	let mut modules = RemoteModules::new();
	modules.set("boards", false);
	let host = host(
		boards_enabled(),
		modules,
		vec![probe("boards", &counters, Behavior::Ok).feature_flag(BOARDS_FLAG)],
	);

	let report = host.initialize_products().await;

	assert_eq!(report.skipped_for(SkipReason::Unavailable).count(), 1);
	assert_eq!(counters.constructed(), 0);
}

#[tokio::test]
async fn test_load_failure_does_not_affect_siblings() {
	let broken = Arc::new(Counters::default());
	let healthy = Arc::new(Counters::default());
	let host = host(
		ClientConfig::new(),
		RemoteModules::from_iter(["broken", "healthy"]),
		vec![
			probe("broken", &broken, Behavior::FailLoad),
			probe("healthy", &healthy, Behavior::Ok),
		],
	);

	let report = host.initialize_products().await;

	assert_eq!(report.initialized, vec!["healthy".to_string()]);
	assert_eq!(report.failed.len(), 1);
	assert_eq!(report.failed[0].0, "broken");
	assert!(report.failed[0].1.contains("chunk failed to load"));
	assert!(!report.is_clean());

	assert_eq!(broken.loads(), 1);
	assert_eq!(broken.constructed(), 0);
	assert_eq!(healthy.initialized(), 1);
	assert!(matches!(host.state("broken").await, Some(ProductState::Failed(_))));
	assert!(host.is_initialized("healthy").await);
}

#[tokio::test]
async fn test_initialize_error_is_contained() {
	let counters = Arc::new(Counters::default());
	let host = host(
		ClientConfig::new(),
		RemoteModules::from_iter(["boards"]),
		vec![probe("boards", &counters, Behavior::FailInit)],
	);

	let report = host.initialize_products().await;

	assert!(report.initialized.is_empty());
	assert_eq!(report.failed.len(), 1);
	assert!(report.failed[0].1.contains("boom"));
	assert_eq!(counters.constructed(), 1);
	assert_eq!(counters.initialized(), 1);
	assert_eq!(
		host.state("boards").await,
		Some(ProductState::Failed("initialization failed: boom".to_string()))
	);
}

#[tokio::test]
async fn test_panic_in_initialize_is_contained() {
	let panicking = Arc::new(Counters::default());
	let healthy = Arc::new(Counters::default());
	let host = host(
		ClientConfig::new(),
		RemoteModules::from_iter(["panicking", "healthy"]),
		vec![
			probe("panicking", &panicking, Behavior::PanicInit),
			probe("healthy", &healthy, Behavior::Ok),
		],
	);

	let report = host.initialize_products().await;

	assert_eq!(report.initialized, vec!["healthy".to_string()]);
	assert_eq!(report.failed.len(), 1);
	assert!(report.failed[0].1.contains("initializer exploded"));
	assert!(matches!(host.state("panicking").await, Some(ProductState::Failed(_))));
}

#[tokio::test]
async fn test_manifest_failure_is_not_fatal() {
	let counters = Arc::new(Counters::default());
	let host = host(
		ClientConfig::new(),
		RemoteModules::from_iter(["boards"]),
		vec![probe("boards", &counters, Behavior::FailManifest)],
	);

	let report = host.initialize_products().await;

	assert_eq!(report.initialized, vec!["boards".to_string()]);
	assert_eq!(host.manifest("boards").await, None);
}

#[derive(Default)]
struct Quiet;

#[async_trait]
impl ProductPlugin for Quiet {
	async fn initialize(&mut self, _registry: PluginRegistry, _store: Arc<Store>) -> Result<(), ProductError> {
		Ok(())
	}

	async fn uninitialize(&mut self) -> Result<(), ProductError> {
		Ok(())
	}
}

#[tokio::test]
async fn test_pending_manifest_does_not_block_initialization() {
	let host = host(
		ClientConfig::new(),
		RemoteModules::from_iter(["boards"]),
		vec![ProductDescriptor::new("boards", || {
			ProductImports::new(async { Ok(ProductModule::of::<Quiet>()) }, std::future::pending())
		})],
	);

	let report = tokio::time::timeout(Duration::from_secs(2), host.initialize_products())
		.await
		.expect("initialization waited on the manifest");

	assert_eq!(report.initialized, vec!["boards".to_string()]);
	assert_eq!(host.state("boards").await, Some(ProductState::Initialized));
	assert_eq!(host.manifest("boards").await, None);
}

#[tokio::test]
async fn test_late_manifest_is_retained_once_resolved() {
	let (tx, rx) = tokio::sync::oneshot::channel::<ProductManifest>();
	let rx = Mutex::new(Some(rx));
	let host = host(
		ClientConfig::new(),
		RemoteModules::from_iter(["boards"]),
		vec![ProductDescriptor::new("boards", move || {
			let rx = rx.lock().unwrap().take();
			ProductImports::new(async { Ok(ProductModule::of::<Quiet>()) }, async move {
				match rx {
					Some(rx) => rx.await.map_err(|e| ProductError::Manifest(e.to_string())),
					None => Err(ProductError::Manifest("loaded twice".to_string())),
				}
			})
		})],
	);

	let report = host.initialize_products().await;
	assert_eq!(report.initialized, vec!["boards".to_string()]);
	assert_eq!(host.manifest("boards").await, None);

	tx.send(manifest("boards")).unwrap();

	let retained = tokio::time::timeout(Duration::from_secs(2), async {
		loop {
			if let Some(manifest) = host.manifest("boards").await {
				return manifest;
			}
			tokio::task::yield_now().await;
		}
	})
	.await
	.expect("manifest was never retained");
	assert_eq!(retained.name, "BOARDS");
}

#[tokio::test]
async fn test_zero_eligible_products() {
	let host = host(ClientConfig::new(), RemoteModules::new(), Vec::new());

	let report = host.initialize_products().await;

	assert!(report.initialized.is_empty());
	assert!(report.skipped.is_empty());
	assert!(report.failed.is_empty());
	assert!(host.store().is_empty());
}

#[tokio::test]
async fn test_second_invocation_does_not_reinitialize() {
	let counters = Arc::new(Counters::default());
	let host = host(
		boards_enabled(),
		RemoteModules::from_iter(["boards", "broken"]),
		vec![
			probe("boards", &counters, Behavior::Ok).feature_flag(BOARDS_FLAG),
			probe("broken", &counters, Behavior::FailLoad),
		],
	);

	host.initialize_products().await;
	let report = host.initialize_products().await;

	assert!(report.initialized.is_empty());
	assert!(report.failed.is_empty());
	assert_eq!(report.already_attempted, vec!["boards".to_string(), "broken".to_string()]);
	assert_eq!(counters.loads(), 2);
	assert_eq!(counters.constructed(), 1);
	assert_eq!(counters.initialized(), 1);
}

#[tokio::test]
async fn test_concurrent_invocations_initialize_once() {
	let counters = Arc::new(Counters::default());
	let host = host(
		ClientConfig::new(),
		RemoteModules::from_iter(["boards"]),
		vec![probe("boards", &counters, Behavior::Ok)],
	);
	let other = host.clone();

	let (a, b) = tokio::join!(host.initialize_products(), other.initialize_products());

	assert_eq!(a.initialized.len() + b.initialized.len(), 1);
	assert_eq!(a.already_attempted.len() + b.already_attempted.len(), 1);
	assert_eq!(counters.constructed(), 1);
	assert_eq!(counters.initialized(), 1);
}

#[tokio::test]
async fn test_products_load_concurrently() {
	// Each index only resolves once both products are loading at the same time.
	let barrier = Arc::new(tokio::sync::Barrier::new(2));
	let counters = Arc::new(Counters::default());

	let gated = |id: &'static str| {
		let barrier = Arc::clone(&barrier);
		let counters = Arc::clone(&counters);
		ProductDescriptor::new(id, move || {
			let barrier = Arc::clone(&barrier);
			let counters = Arc::clone(&counters);
			ProductImports::new(
				async move {
					barrier.wait().await;
					Ok(ProductModule::new(move || {
						Box::new(Probe {
							counters: Arc::clone(&counters),
							behavior: Behavior::Ok,
							registry: None,
						})
					}))
				},
				async move { Ok(manifest(id)) },
			)
		})
	};

	let host = host(
		ClientConfig::new(),
		RemoteModules::from_iter(["first", "second"]),
		vec![gated("first"), gated("second")],
	);

	let report = tokio::time::timeout(Duration::from_secs(5), host.initialize_products())
		.await
		.expect("products were loaded one after another");

	assert_eq!(report.initialized.len(), 2);
	assert_eq!(counters.initialized(), 2);
}

#[tokio::test]
async fn test_each_product_gets_its_own_registry() {
	let counters = Arc::new(Counters::default());
	let host = host(
		ClientConfig::new(),
		RemoteModules::from_iter(["alpha", "beta"]),
		vec![
			probe("alpha", &counters, Behavior::Ok),
			probe("beta", &counters, Behavior::Ok),
		],
	);

	host.initialize_products().await;

	let mut ids: Vec<String> = counters
		.seen
		.lock()
		.unwrap()
		.iter()
		.map(|(id, _)| id.clone())
		.collect();
	ids.sort();
	assert_eq!(ids, vec!["alpha".to_string(), "beta".to_string()]);
	assert_eq!(host.store().components_for("alpha").len(), 1);
	assert_eq!(host.store().components_for("beta").len(), 1);
}

#[tokio::test]
async fn test_shutdown_uninitializes_initialized_products() {
	let initialized = Arc::new(Counters::default());
	let skipped = Arc::new(Counters::default());
	let host = host(
		ClientConfig::new(),
		RemoteModules::from_iter(["boards"]),
		vec![
			probe("boards", &initialized, Behavior::Ok),
			probe("calls", &skipped, Behavior::Ok),
		],
	);

	host.initialize_products().await;
	assert_eq!(host.store().len(), 1);

	let report = host.shutdown().await;

	assert_eq!(report.uninitialized, vec!["boards".to_string()]);
	assert!(report.failed.is_empty());
	assert_eq!(report.removed_components, 1);
	assert_eq!(initialized.uninitialized(), 1);
	assert_eq!(skipped.uninitialized(), 0);
	assert!(host.store().is_empty());
	assert_eq!(host.state("boards").await, Some(ProductState::ShutDown));
	assert_eq!(host.state("calls").await, Some(ProductState::SkippedUnavailable));

	// Shut down products are terminal.
	let report = host.initialize_products().await;
	assert!(report.initialized.is_empty());
	assert_eq!(initialized.constructed(), 1);

	// Nothing left to tear down.
	let report = host.shutdown().await;
	assert!(report.uninitialized.is_empty());
	assert_eq!(initialized.uninitialized(), 1);
}

struct Gated {
	counters: Arc<Counters>,
	entered: Arc<Notify>,
	release: Arc<Notify>,
	registry: Option<PluginRegistry>,
}

#[async_trait]
impl ProductPlugin for Gated {
	async fn initialize(&mut self, registry: PluginRegistry, _store: Arc<Store>) -> Result<(), ProductError> {
		self.counters.initialized.fetch_add(1, Ordering::SeqCst);
		registry.register_main_menu_action("Open gated")?;
		self.entered.notify_one();
		self.release.notified().await;
		self.registry = Some(registry);
		Ok(())
	}

	async fn uninitialize(&mut self) -> Result<(), ProductError> {
		self.counters.uninitialized.fetch_add(1, Ordering::SeqCst);
		self.registry = None;
		Ok(())
	}
}

#[tokio::test]
async fn test_shutdown_during_load_tears_product_down_once_loaded() {
	let counters = Arc::new(Counters::default());
	let entered = Arc::new(Notify::new());
	let release = Arc::new(Notify::new());

	let descriptor = {
		let (counters, entered, release) = (Arc::clone(&counters), Arc::clone(&entered), Arc::clone(&release));
		ProductDescriptor::new("gated", move || {
			let (counters, entered, release) = (Arc::clone(&counters), Arc::clone(&entered), Arc::clone(&release));
			let module = ProductModule::new(move || {
				Box::new(Gated {
					counters: Arc::clone(&counters),
					entered: Arc::clone(&entered),
					release: Arc::clone(&release),
					registry: None,
				})
			});
			ProductImports::ready(module, manifest("gated"))
		})
	};
	let host = host(ClientConfig::new(), RemoteModules::from_iter(["gated"]), vec![descriptor]);

	let loading = tokio::spawn({
		let host = host.clone();
		async move { host.initialize_products().await }
	});
	entered.notified().await;

	let state = host.state("gated").await.unwrap();
	assert_eq!(state, ProductState::Loading);
	assert!(!state.is_terminal());

	let report = host.shutdown().await;
	assert_eq!(report.interrupted, vec!["gated".to_string()]);
	assert!(report.uninitialized.is_empty());
	assert_eq!(counters.uninitialized(), 0);

	release.notify_one();
	let init = loading.await.unwrap();

	assert!(init.initialized.is_empty());
	assert_eq!(init.failed.len(), 1);
	assert_eq!(counters.initialized(), 1);
	assert_eq!(counters.uninitialized(), 1);
	assert!(host.store().is_empty());

	let state = host.state("gated").await.unwrap();
	assert_eq!(state, ProductState::ShutDown);
	assert!(state.is_terminal());

	// Nothing was handed over for a second teardown.
	let report = host.shutdown().await;
	assert!(report.uninitialized.is_empty());
	assert_eq!(counters.uninitialized(), 1);
}

#[test]
fn test_remote_modules_lists_present_ids() {
	let mut modules = RemoteModules::from_iter(["boards", "calls"]);
	modules.set("calls", false);
	modules.insert("playbooks");

	let ids: Vec<&str> = modules.ids().collect();
	assert_eq!(ids, vec!["boards", "playbooks"]);
}

#[tokio::test]
async fn test_unknown_product_has_no_state() {
	let host = host(ClientConfig::new(), RemoteModules::new(), Vec::new());
	assert_eq!(host.state("nope").await, None);
}

#[test]
fn test_duplicate_product_ids_are_rejected() {
	let counters = Arc::new(Counters::default());
	let result = ProductHost::builder()
		.product(probe("boards", &counters, Behavior::Ok))
		.product(probe("boards", &counters, Behavior::Ok))
		.build();

	match result {
		Err(HostError::DuplicateProduct(id)) => assert_eq!(id, "boards"),
		other => panic!("Expected DuplicateProduct, got {:?}", other.map(|_| ())),
	}
}

#[cfg(feature = "json")]
#[tokio::test]
async fn test_flags_come_from_loaded_config() {
	use productkit::config::MemorySource;
	use productkit::config::format::AnyFormat;

	let source = MemorySource::new().with("client.json", br#"{"FeatureFlagBoardsProduct": true}"#.to_vec());
	let loader = productkit::ConfigLoader::builder()
		.source(source)
		.format(AnyFormat::Json)
		.build()
		.unwrap();

	let counters = Arc::new(Counters::default());
	let host = host(
		ClientConfig::new(),
		RemoteModules::from_iter(["boards"]),
		vec![probe("boards", &counters, Behavior::Ok).feature_flag(BOARDS_FLAG)],
	);

	let config = host.load_config(&loader, "client").await.unwrap();
	assert_eq!(config.get(BOARDS_FLAG), Some("true"));

	let report = host.initialize_products().await;
	assert_eq!(report.initialized, vec!["boards".to_string()]);
}
