//! Shared types for the catalog admin workspace
//!
//! Wire models, ordering DTOs, the API response envelope and notification
//! payloads. These types are shared between the ordering core and the
//! HTTP client.

pub mod models;
pub mod notification;
pub mod response;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use models::{OrderAssignment, Orderable};
pub use notification::{NotificationLevel, NotificationPayload};
pub use response::ApiResponse;
