//! Entity model (§3): value types, status enums, validators, and the
//! serializable "view" shapes returned at the API boundary.

pub mod document;
pub mod page;
pub mod query;
pub mod response;
pub mod upload_session;

pub use document::{CreateDocumentRequest, Document, DocumentStatus, DocumentView, ObjectLocator};
pub use page::Page;
pub use query::{CreateQueryRequest, Query, QueryStatus};
pub use response::{Response, Source};
pub use upload_session::{deterministic_object_key, SessionStatus, UploadSession};
