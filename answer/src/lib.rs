//! # Answer
//!
//! Answers a question from retrieved document texts with a chat-completion
//! model.
//!
//! The [`AnswerProvider`] trait is what the retrieval service calls.
//! [`OpenAIChatProvider`] implements it against an OpenAI-compatible
//! `/chat/completions` endpoint using the prompt built by
//! [`prompt::build_messages`], which instructs the model to stay within the
//! supplied context.

pub mod error;
pub mod prompt;
pub mod provider;

pub use error::{AnswerError, Result};
pub use prompt::{ChatMessage, build_messages};
pub use provider::{AnswerProvider, OpenAIChatProvider};

/// Default chat model.
pub const DEFAULT_MODEL: &str = "gpt-4";

/// Default OpenAI API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
