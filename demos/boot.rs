use std::sync::Arc;

use productkit::config::format::AnyFormat;
use productkit::config::{ConfigLoader, FileSource};
use productkit::{ProductHost, Store};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
		.init();

	// 0. Prepare a client config on disk
	let dir = tempfile::tempdir()?;
	std::fs::write(
		dir.path().join("client.toml"),
		b"FeatureFlagBoardsProduct = true\nSiteName = \"demo\"\n",
	)?;

	// 1. Shared store and host over the compiled-in catalog
	let store = Arc::new(Store::new());
	let host = ProductHost::builder().store(Arc::clone(&store)).build()?;

	// 2. Load configuration (drives feature flags)
	let loader = ConfigLoader::builder()
		.source(FileSource::new(dir.path()))
		.format(AnyFormat::Toml)
		.format(AnyFormat::Json)
		.build()?;
	host.load_config(&loader, "client").await?;

	// 3. Bring products up
	let report = host.initialize_products().await;
	println!("Initialized: {:?}", report.initialized);
	println!("Skipped: {:?}", report.skipped);
	println!("Failed: {:?}", report.failed);

	for component in store.components().values() {
		println!("  {} [{}] {:?}", component.id, component.plugin_id, component.point);
	}

	// 4. Tear down
	let report = host.shutdown().await;
	println!("Uninitialized: {:?}", report.uninitialized);
	println!("Components left: {}", store.len());

	Ok(())
}
