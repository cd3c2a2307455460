//! Application state: the orchestration services, generic over whichever
//! store/object-store/knowledge-provider backend `main.rs` wires up. Tests
//! and the production binary both build this same struct, just with
//! different type parameters (in-memory/mock vs. DynamoDB/S3/Bedrock).

use std::sync::Arc;
use std::time::Instant;

use rag_core::config::Config;
use rag_knowledge::traits::KnowledgeBaseProvider;
use rag_objectstore::traits::ObjectStore;
use rag_services::{DocumentService, QueryOrchestrator, ResponseService, UploadCoordinator};
use rag_store::traits::ItemStore;
use rag_store::{DocumentRepository, QueryRepository, ResponseRepository, UploadSessionRepository};

pub struct AppState<S: ItemStore + ?Sized, O: ObjectStore + ?Sized, P: KnowledgeBaseProvider + ?Sized> {
    pub config: Arc<Config>,
    pub documents: DocumentService<S>,
    pub uploads: UploadCoordinator<S, O, P>,
    pub queries: QueryOrchestrator<S, P>,
    pub started_at: Instant,
}

impl<S, O, P> AppState<S, O, P>
where
    S: ItemStore + ?Sized + 'static,
    O: ObjectStore + ?Sized + 'static,
    P: KnowledgeBaseProvider + ?Sized + 'static,
{
    /// Wires every repository and service off a single store/object-store/
    /// knowledge-provider triple, per the table names in `Config` (§6).
    pub fn new(config: Arc<Config>, store: Arc<S>, objects: Arc<O>, knowledge_provider: Arc<P>) -> Self {
        let document_repo = DocumentRepository::new(store.clone(), config.documents_table_name.clone());
        let session_repo = UploadSessionRepository::new(store.clone(), config.upload_sessions_table_name.clone());
        let query_repo = QueryRepository::new(store.clone(), config.queries_table_name.clone());
        let response_repo = ResponseRepository::new(store.clone(), config.responses_table_name.clone());

        let documents = DocumentService::new(document_repo);
        let responses = ResponseService::new(response_repo);
        let knowledge = Arc::new(rag_knowledge::KnowledgeService::new(knowledge_provider, config.clone()));

        let uploads = UploadCoordinator::new(session_repo, documents.clone(), objects, knowledge.clone(), config.clone());
        let queries = QueryOrchestrator::new(query_repo, responses, knowledge);

        AppState {
            config,
            documents,
            uploads,
            queries,
            started_at: Instant::now(),
        }
    }
}
