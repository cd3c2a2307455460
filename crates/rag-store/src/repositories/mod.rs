//! Per-entity repositories built on top of `ItemStore` (§3, §4).

mod document;
mod query;
mod response;
mod upload_session;

pub use document::DocumentRepository;
pub use query::QueryRepository;
pub use response::ResponseRepository;
pub use upload_session::UploadSessionRepository;
