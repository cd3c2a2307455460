//! Entity model, validators, configuration, and the unified error taxonomy
//! for the RAG orchestration core. See `SPEC_FULL.md` for the component
//! breakdown this workspace implements.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod sanitize;

pub use config::{Config, KnowledgeBaseMode};
pub use error::{AppError, ErrorMetadata, LogLevel};
