//! Question-answering engine over the document index.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use docqa_answer::{AnswerProvider, OpenAIChatProvider};
use docqa_embeddings::{Embedding, EmbeddingProvider, EmbeddingRequest, OpenAIProvider};
use docqa_vector_index::{
    Document, FileStore, MemoryStore, VectorIndex, VectorStore, format_matches,
};

use crate::config::{AnswerConfig, EmbeddingConfig, QueryConfig, RetrievalConfig, StoreConfig};
use crate::error::{Result, RetrievalError};
use crate::schema::{
    AddDocumentRequest, AddDocumentResponse, AskRequest, AskResponse, BatchAddResponse,
    BatchItemFailure, HealthResponse, SearchRequest, SearchResponse,
};

/// Retrieval-augmented question answering.
///
/// Coordinates three collaborators:
/// - the [`VectorIndex`] holding embedded documents
/// - an [`EmbeddingProvider`] turning document and query text into vectors
/// - an [`AnswerProvider`] composing an answer from retrieved texts
///
/// Every operation takes `&self`; share the engine behind an `Arc`.
pub struct RetrievalQa {
    query: QueryConfig,
    index: Arc<VectorIndex>,
    embedder: Arc<dyn EmbeddingProvider>,
    answerer: Arc<dyn AnswerProvider>,
}

impl RetrievalQa {
    /// Create a new engine builder.
    pub fn builder() -> RetrievalQaBuilder {
        RetrievalQaBuilder::new()
    }

    /// Initialize the engine with the given configuration, using the
    /// OpenAI-compatible providers it describes.
    pub async fn new(config: RetrievalConfig) -> Result<Self> {
        Self::builder().with_config(config).build().await
    }

    /// The underlying index.
    pub fn index(&self) -> &Arc<VectorIndex> {
        &self.index
    }

    /// Query settings in effect.
    pub fn query_config(&self) -> &QueryConfig {
        &self.query
    }

    /// Embed and store one document, replacing any document with the same id.
    pub async fn add_document(&self, request: AddDocumentRequest) -> Result<AddDocumentResponse> {
        request.validate()?;

        let embedding = self.embed(&request.text).await?;
        let metadata = request.metadata_or_source();
        let AddDocumentRequest { id, text, .. } = request;
        let text_len = text.chars().count();

        self.index
            .upsert(Document::new(id.clone(), text, embedding).with_metadata(metadata))
            .await?;

        info!("Document added/updated: id={id}, length={text_len} chars");
        Ok(AddDocumentResponse {
            message: "Document added".to_string(),
            id,
        })
    }

    /// Embed and store many documents.
    ///
    /// The whole call is rejected if any request is malformed or if the
    /// embedding provider fails; in both cases nothing is stored. After
    /// embedding, documents are stored independently and per-item failures
    /// are reported in the response.
    pub async fn add_documents_batch(
        &self,
        requests: Vec<AddDocumentRequest>,
    ) -> Result<BatchAddResponse> {
        for (index, request) in requests.iter().enumerate() {
            request.validate().map_err(|e| match e {
                RetrievalError::InvalidArgument(reason) => {
                    RetrievalError::InvalidArgument(format!("document at index {index}: {reason}"))
                }
                other => other,
            })?;
        }

        let embeddings = self.embed_all(&requests).await?;
        let documents: Vec<Document> = requests
            .into_iter()
            .zip(embeddings)
            .map(|(request, embedding)| {
                let metadata = request.metadata_or_source();
                Document::new(request.id, request.text, embedding).with_metadata(metadata)
            })
            .collect();

        let outcome = self.index.add_documents_batch(documents).await;
        let errors: Vec<BatchItemFailure> = outcome
            .errors
            .into_iter()
            .map(|failure| BatchItemFailure {
                index: failure.index,
                id: failure.id,
                error: failure.error.to_string(),
            })
            .collect();

        info!("Batch added {} documents", outcome.added);
        Ok(BatchAddResponse {
            message: format!("Added {} documents", outcome.added),
            added: outcome.added,
            errors,
        })
    }

    /// Rank stored documents against a free-text query.
    ///
    /// An empty index yields an empty result list without calling the
    /// embedding provider.
    pub async fn search(&self, request: SearchRequest) -> Result<SearchResponse> {
        request.validate()?;
        let top_k = request.top_k(self.query.default_top_k);

        if self.index.is_empty().await {
            debug!("Search query='{}' against an empty index", request.query);
            return Ok(SearchResponse {
                query: request.query,
                results: Vec::new(),
            });
        }

        let query_vector = self.embed(&request.query).await?;
        let matches = self.index.search(&query_vector, top_k).await?;
        let results = format_matches(&matches, self.query.snippet_max_chars);

        info!(
            "Search query='{}' - returning {} results",
            request.query,
            results.len()
        );
        Ok(SearchResponse {
            query: request.query,
            results,
        })
    }

    /// Answer a question from the most relevant stored documents.
    pub async fn ask(&self, request: AskRequest) -> Result<AskResponse> {
        request.validate()?;

        if self.index.is_empty().await {
            warn!("Question asked with no documents indexed");
            return Err(RetrievalError::EmptyIndex);
        }

        let query_vector = self.embed(&request.question).await?;
        let contexts: Vec<String> = self
            .index
            .search(&query_vector, self.query.ask_top_k)
            .await?
            .into_iter()
            .map(|m| m.text)
            .collect();

        debug!("Answering with {} context documents", contexts.len());
        let answer = self
            .answerer
            .answer(&request.question, &contexts)
            .await
            .map_err(|e| {
                error!("Error generating answer: {e}");
                RetrievalError::from(e)
            })?;

        info!(
            "Question asked: '{}' - answer length: {} chars",
            request.question,
            answer.chars().count()
        );
        Ok(AskResponse {
            question: request.question,
            answer,
        })
    }

    /// Remove a stored document.
    pub async fn delete_document(&self, id: &str) -> Result<()> {
        self.index.delete(id).await?;
        info!("Document deleted: id={id}");
        Ok(())
    }

    /// Service status and document count.
    pub async fn health(&self) -> HealthResponse {
        HealthResponse {
            status: "ok".to_string(),
            documents_indexed: self.index.count().await,
        }
    }

    /// Flush the index so every acknowledged write is durable.
    pub async fn shutdown(&self) -> Result<()> {
        self.index.flush().await?;
        info!("Retrieval engine shut down ({} backend)", self.index.backend());
        Ok(())
    }

    async fn embed(&self, text: &str) -> Result<Embedding> {
        self.embedder.embed_text(text).await.map_err(|e| {
            error!("Error generating embedding: {e}");
            RetrievalError::from(e)
        })
    }

    async fn embed_all(&self, requests: &[AddDocumentRequest]) -> Result<Vec<Embedding>> {
        if requests.is_empty() {
            return Ok(Vec::new());
        }

        let batch = requests
            .iter()
            .map(|r| EmbeddingRequest::new(r.text.clone()))
            .collect();
        let responses = self.embedder.embed_batch(batch).await.map_err(|e| {
            error!("Error generating batch embeddings: {e}");
            RetrievalError::from(e)
        })?;

        if responses.len() != requests.len() {
            error!(
                "Embedding provider returned {} embeddings for {} documents",
                responses.len(),
                requests.len()
            );
            return Err(RetrievalError::Embedding(
                docqa_embeddings::EmbeddingError::InvalidResponse(format!(
                    "expected {} embeddings, got {}",
                    requests.len(),
                    responses.len()
                )),
            ));
        }

        Ok(responses.into_iter().map(|r| r.embedding).collect())
    }
}

/// Builder for [`RetrievalQa`].
///
/// Components that are not injected are created from the configuration.
pub struct RetrievalQaBuilder {
    config: RetrievalConfig,
    index: Option<Arc<VectorIndex>>,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    answerer: Option<Arc<dyn AnswerProvider>>,
}

impl RetrievalQaBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            config: RetrievalConfig::default(),
            index: None,
            embedder: None,
            answerer: None,
        }
    }

    /// Set the configuration.
    pub fn with_config(mut self, config: RetrievalConfig) -> Self {
        self.config = config;
        self
    }

    /// Use an existing index instead of opening one from the store config.
    pub fn with_index(mut self, index: Arc<VectorIndex>) -> Self {
        self.index = Some(index);
        self
    }

    /// Set the embedding provider.
    pub fn with_embedder(mut self, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Set the answer provider.
    pub fn with_answerer(mut self, answerer: Arc<dyn AnswerProvider>) -> Self {
        self.answerer = Some(answerer);
        self
    }

    /// Build the engine.
    pub async fn build(self) -> Result<RetrievalQa> {
        let RetrievalConfig {
            store,
            embedding,
            answer,
            query,
        } = self.config;

        let index = match self.index {
            Some(index) => index,
            None => Arc::new(open_index(&store).await?),
        };
        let embedder: Arc<dyn EmbeddingProvider> = match self.embedder {
            Some(embedder) => embedder,
            None => Arc::new(openai_embedder(&embedding)?),
        };
        let answerer: Arc<dyn AnswerProvider> = match self.answerer {
            Some(answerer) => answerer,
            None => Arc::new(openai_answerer(&answer)?),
        };

        if !embedder.is_available() {
            warn!("Embedding provider {} is not configured", embedder.name());
        }
        if !answerer.is_available() {
            warn!("Answer provider {} is not configured", answerer.name());
        }

        info!(
            "Retrieval engine ready: {} backend, {} documents",
            index.backend(),
            index.count().await
        );

        Ok(RetrievalQa {
            query,
            index,
            embedder,
            answerer,
        })
    }
}

impl Default for RetrievalQaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

async fn open_index(config: &StoreConfig) -> Result<VectorIndex> {
    let store: Arc<dyn VectorStore> = match (&config.path, config.dimension) {
        (Some(path), Some(dimension)) => {
            Arc::new(FileStore::open_with_dimension(path, dimension).await?)
        }
        (Some(path), None) => Arc::new(FileStore::open(path).await?),
        (None, Some(dimension)) => Arc::new(MemoryStore::with_dimension(dimension)?),
        (None, None) => Arc::new(MemoryStore::new()),
    };
    Ok(VectorIndex::with_store(store))
}

fn openai_embedder(config: &EmbeddingConfig) -> Result<OpenAIProvider> {
    let mut provider = OpenAIProvider::new()
        .with_base_url(config.base_url.as_str())
        .with_model(config.model.as_str())
        .with_timeout(Duration::from_secs(config.timeout_secs))
        .map_err(|e| RetrievalError::Config(format!("embedding client: {e}")))?;
    if let Some(key) = &config.api_key {
        provider = provider.with_api_key(key.as_str());
    }
    Ok(provider)
}

fn openai_answerer(config: &AnswerConfig) -> Result<OpenAIChatProvider> {
    let mut provider = OpenAIChatProvider::new()
        .with_base_url(config.base_url.as_str())
        .with_model(config.model.as_str())
        .with_temperature(config.temperature)
        .with_max_tokens(config.max_tokens)
        .with_timeout(Duration::from_secs(config.timeout_secs))
        .map_err(|e| RetrievalError::Config(format!("answer client: {e}")))?;
    if let Some(key) = &config.api_key {
        provider = provider.with_api_key(key.as_str());
    }
    Ok(provider)
}
