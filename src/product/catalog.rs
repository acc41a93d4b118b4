//!
//! The static table of optional products known to this build.
//!
//! Entries reference product code directly, so a product is added by editing
//! this table and enabling its cargo feature, never through runtime configuration.

use super::ProductDescriptor;

/// Descriptor constructors, one per compiled-in product.
const PRODUCTS: &[fn() -> ProductDescriptor] = &[
	#[cfg(feature = "boards")]
	super::boards::descriptor,
];

/// Every optional product compiled into this build.
pub fn products() -> Vec<ProductDescriptor> {
	PRODUCTS.iter().map(|descriptor| descriptor()).collect()
}
