//!
//! Built-in boards product.

use std::sync::Arc;

use async_trait::async_trait;

use super::{ProductDescriptor, ProductError, ProductImports, ProductManifest, ProductModule, ProductPlugin};
use crate::config::format::AnyFormat;
use crate::registry::PluginRegistry;
use crate::store::Store;

pub const ID: &str = "boards";

/// Configuration key gating the product.
pub const FEATURE_FLAG: &str = "FeatureFlagBoardsProduct";

pub const BASE_URL: &str = "/boards";

const MANIFEST: &str = r#"{
	"id": "boards",
	"name": "Boards",
	"version": "0.1.0",
	"description": "Project boards for planning and tracking team work."
}"#;

pub fn descriptor() -> ProductDescriptor {
	ProductDescriptor::new(ID, || {
		ProductImports::new(async { Ok(ProductModule::of::<Boards>()) }, async {
			ProductManifest::parse(AnyFormat::Json, MANIFEST.as_bytes())
		})
	})
	.feature_flag(FEATURE_FLAG)
}

#[derive(Debug, Default)]
pub struct Boards {
	registry: Option<PluginRegistry>,
}

#[async_trait]
impl ProductPlugin for Boards {
	async fn initialize(&mut self, registry: PluginRegistry, _store: Arc<Store>) -> Result<(), ProductError> {
		registry.register_product(BASE_URL, "Boards")?;
		registry.register_channel_header_button("Boards", Some("Open the channel's boards"))?;
		registry.register_main_menu_action("Create a board")?;
		registry.register_post_type_component("custom_board_link")?;
		self.registry = Some(registry);
		Ok(())
	}

	async fn uninitialize(&mut self) -> Result<(), ProductError> {
		let Some(registry) = self.registry.take() else {
			return Ok(());
		};
		for component in registry.registered() {
			registry.unregister_component(component.id)?;
		}
		Ok(())
	}
}
