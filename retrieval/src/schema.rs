//! Request and response types for the service operations.
//!
//! Requests are validated here, before anything reaches the embedding
//! provider or the index.

use docqa_vector_index::SearchHit;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, RetrievalError};

/// Add or replace one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddDocumentRequest {
    pub id: String,
    pub text: String,

    /// Defaults to `{"source": id}` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl AddDocumentRequest {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            metadata: None,
        }
    }

    /// Attach caller metadata.
    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(RetrievalError::InvalidArgument(
                "document id must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// The metadata to store, falling back to the document's source id.
    pub(crate) fn metadata_or_source(&self) -> Value {
        self.metadata
            .clone()
            .unwrap_or_else(|| serde_json::json!({ "source": self.id }))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddDocumentResponse {
    pub message: String,
    pub id: String,
}

/// One rejected item of a batch add.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchItemFailure {
    /// Position in the submitted batch.
    pub index: usize,
    pub id: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchAddResponse {
    pub message: String,
    pub added: usize,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<BatchItemFailure>,
}

/// Rank stored documents against a free-text query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,

    /// Number of results; the configured default when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub k: Option<i64>,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            k: None,
        }
    }

    pub fn with_k(mut self, k: i64) -> Self {
        self.k = Some(k);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.query.trim().is_empty() {
            return Err(RetrievalError::InvalidArgument(
                "query must not be empty".to_string(),
            ));
        }
        if let Some(k) = self.k.filter(|k| *k <= 0) {
            return Err(RetrievalError::InvalidArgument(format!(
                "k must be positive, got {k}"
            )));
        }
        Ok(())
    }

    /// Effective result count after validation.
    pub(crate) fn top_k(&self, default_top_k: usize) -> usize {
        self.k
            .and_then(|k| usize::try_from(k).ok())
            .unwrap_or(default_top_k)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub query: String,
    pub results: Vec<SearchHit>,
}

/// Answer a question from the indexed documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

impl AskRequest {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.question.trim().is_empty() {
            return Err(RetrievalError::InvalidArgument(
                "question must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskResponse {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub documents_indexed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_add_request_defaults_metadata_to_source() {
        let request: AddDocumentRequest =
            serde_json::from_str(r#"{"id": "doc-1", "text": "hello"}"#).unwrap();

        assert_eq!(request.metadata, None);
        assert_eq!(
            request.metadata_or_source(),
            serde_json::json!({"source": "doc-1"})
        );

        let request = request.with_metadata(serde_json::json!({"title": "Greeting"}));
        assert_eq!(
            request.metadata_or_source(),
            serde_json::json!({"title": "Greeting"})
        );
    }

    #[test]
    fn test_add_request_requires_id() {
        assert!(AddDocumentRequest::new("", "text").validate().is_err());
        assert!(AddDocumentRequest::new("  ", "text").validate().is_err());
        assert!(AddDocumentRequest::new("id", "").validate().is_ok());
    }

    #[test]
    fn test_add_request_missing_field_fails_to_parse() {
        assert!(serde_json::from_str::<AddDocumentRequest>(r#"{"id": "x"}"#).is_err());
    }

    #[test]
    fn test_search_request_k() {
        assert_eq!(SearchRequest::new("q").top_k(5), 5);
        assert_eq!(SearchRequest::new("q").with_k(2).top_k(5), 2);

        for k in [0, -3] {
            let err = SearchRequest::new("q").with_k(k).validate().unwrap_err();
            assert!(matches!(err, RetrievalError::InvalidArgument(_)));
        }
        assert!(SearchRequest::new("").validate().is_err());
    }

    #[test]
    fn test_search_request_wire_format() {
        let request: SearchRequest = serde_json::from_str(r#"{"query": "rust"}"#).unwrap();
        assert_eq!(request, SearchRequest::new("rust"));

        let json = serde_json::to_value(SearchRequest::new("rust").with_k(3)).unwrap();
        assert_eq!(json, serde_json::json!({"query": "rust", "k": 3}));
    }

    #[test]
    fn test_ask_request_requires_question() {
        assert!(AskRequest::new(" ").validate().is_err());
        assert!(AskRequest::new("why?").validate().is_ok());
    }

    #[test]
    fn test_batch_response_omits_empty_errors() {
        let response = BatchAddResponse {
            message: "Added 2 documents".to_string(),
            added: 2,
            errors: Vec::new(),
        };
        assert_eq!(
            serde_json::to_value(response).unwrap(),
            serde_json::json!({"message": "Added 2 documents", "added": 2})
        );
    }
}
