//! Key-value persistence for the orchestration core (§3, §6).
//!
//! `ItemStore` is the backend-agnostic capability; `MemoryStore` and
//! `DynamoDbStore` (behind the `dynamodb` feature) implement it, and the
//! `repositories` module adapts it to each entity in §3.

pub mod memory;
pub mod repositories;
pub mod repository;
pub mod traits;

#[cfg(feature = "dynamodb")]
pub mod dynamodb;

pub use memory::MemoryStore;
pub use repositories::{DocumentRepository, QueryRepository, ResponseRepository, UploadSessionRepository};
pub use repository::Repository;
pub use traits::{Item, ItemStore, ScanFilter, StoreError, StoreResult};

#[cfg(feature = "dynamodb")]
pub use dynamodb::DynamoDbStore;
