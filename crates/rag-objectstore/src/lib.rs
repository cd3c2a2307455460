//! Object store capability (§6): presigned PUT, HEAD, ranged GET, prefix
//! listing, and chunked batch-delete, fronting whichever backend is
//! configured.

pub mod memory;
pub mod traits;

#[cfg(feature = "s3")]
pub mod s3;

pub use memory::MemoryObjectStore;
pub use traits::{ListPage, ObjectStore, ObjectStoreError, ObjectStoreResult};

#[cfg(feature = "s3")]
pub use s3::S3ObjectStore;
