//!
//! Orchestration of optional products.
//!
//! - [`ProductHost`] - gates, loads and initializes products, and tears them down
//! - [`InitReport`] / [`ShutdownReport`] - aggregate per-product outcomes

mod error;
mod products;
mod report;

pub use error::HostError;
pub use products::{ProductHost, ProductHostBuilder};
pub use report::{InitReport, ProductState, ShutdownReport, SkipReason};
