//! Catalog Client - HTTP client for the catalog admin backend
//!
//! Provides the REST calls behind the dashboard's reorderable lists and a
//! [`HttpOrderStore`] that plugs them into `catalog-order`.

pub mod config;
pub mod error;
pub mod http;
pub mod logger;
pub mod order_store;

pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::HttpClient;
pub use order_store::{HttpOrderStore, OrderResource};

// Re-export shared types for convenience
pub use shared::{ApiResponse, OrderAssignment};
