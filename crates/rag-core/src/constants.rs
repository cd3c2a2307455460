//! Shared size/length limits from the data model (§3) and testable
//! properties (§8). Centralized so every crate checks the same numbers.

/// I1: `0 < fileSize <= 52_428_800` (50 MiB).
pub const MAX_DOCUMENT_SIZE_BYTES: u64 = 50 * 1024 * 1024;

/// I2: allowed document file-type tags.
pub const ALLOWED_FILE_TYPES: &[&str] = &["txt", "md"];

/// Query question length bound (§3), counted after trimming.
pub const MAX_QUESTION_CHARS: usize = 1000;

/// Session id length bounds (§3).
pub const MIN_SESSION_ID_CHARS: usize = 10;
pub const MAX_SESSION_ID_CHARS: usize = 50;

/// Response answer length bound (§3).
pub const MAX_ANSWER_CHARS: usize = 2000;

/// I4: max sources per response.
pub const MAX_SOURCES: usize = 5;

/// I3: max excerpt length, counted in Unicode scalars.
pub const MAX_EXCERPT_SCALARS: usize = 500;

/// Default presigned-PUT TTL for an upload session (§4.2).
pub const DEFAULT_PRESIGN_TTL_SECS: i64 = 15 * 60;

/// Preview extraction bounds (§4.2.1).
pub const PREVIEW_MAX_READ_BYTES: usize = 100 * 1024;
pub const PREVIEW_MAX_LINES: usize = 30;
pub const PREVIEW_MAX_BYTES: usize = 50_000;
pub const PREVIEW_SNIP_MARKER: &str = "\n...(snip)";

/// Staleness thresholds (§3).
pub const PENDING_STALE_AFTER_SECS: i64 = 10 * 60;
pub const PROCESSING_STALE_AFTER_SECS: i64 = 15 * 60;

/// Background sync job bounds (§4.2, §4.3.4).
pub const SYNC_BACKGROUND_TIMEOUT_SECS: u64 = 10 * 60;
pub const INGESTION_POLL_INTERVAL_SECS: u64 = 10;
pub const INGESTION_POLL_MAX_ITERATIONS: u32 = 30;

/// Delete-reindex background task bounds (§5).
pub const DELETE_REINDEX_TIMEOUT_SECS: u64 = 2;

/// Object store batch-delete chunk size (§4.2).
pub const BATCH_DELETE_CHUNK_SIZE: usize = 1000;

/// Retrieval top-k (§4.3).
pub const RETRIEVE_TOP_K: i32 = 5;

/// Pagination defaults/bounds (§4.1, §4.4).
pub const DOCUMENTS_LIST_DEFAULT_LIMIT: u32 = 20;
pub const DOCUMENTS_LIST_MAX_LIMIT: u32 = 100;
pub const HISTORY_DEFAULT_LIMIT: u32 = 10;
pub const HISTORY_MAX_LIMIT: u32 = 50;

/// Recognized unset-or-placeholder values for `KNOWLEDGE_BASE_ID` /
/// `DATA_SOURCE_ID` (§6). The empty string is also always treated as unset.
pub const KB_ID_PLACEHOLDERS: &[&str] = &["CHANGE_ME_KNOWLEDGE_BASE_ID", "EXAMPLE_KB_ID"];
pub const DATA_SOURCE_ID_PLACEHOLDERS: &[&str] =
    &["CHANGE_ME_DATA_SOURCE_ID", "EXAMPLE_DS_ID"];

/// Default model identifier (§6) when `MODEL_ID` is unset.
pub const DEFAULT_MODEL_ID: &str = "amazon.titan-embed-text-v2:0";
