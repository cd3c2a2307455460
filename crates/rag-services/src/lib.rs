//! Orchestration services (§4): the document service, upload coordinator,
//! query orchestrator, and response service built on top of `rag-store`,
//! `rag-objectstore`, and `rag-knowledge`.

pub mod document_service;
pub mod errors;
pub mod query_orchestrator;
pub mod response_service;
pub mod upload_coordinator;

pub use document_service::DocumentService;
pub use query_orchestrator::{QueryOrchestrator, QueryWithResponse};
pub use response_service::ResponseService;
pub use upload_coordinator::UploadCoordinator;
