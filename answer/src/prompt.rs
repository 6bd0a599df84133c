//! Prompt construction for grounded answers.

use serde::{Deserialize, Serialize};

/// Instruction sent as the system message.
pub const SYSTEM_PROMPT: &str =
    "You are a helpful assistant that answers questions based only on the provided context.";

/// Reply the model is told to give when the context is insufficient.
pub const NO_ANSWER_REPLY: &str = "I don't have enough information to answer this question.";

/// Separator placed between context documents.
pub const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

/// One chat message in the OpenAI wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Build the user prompt: the contexts, the question, and the fallback rule.
pub fn build_prompt<S: AsRef<str>>(question: &str, contexts: &[S]) -> String {
    let combined = contexts
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<&str>>()
        .join(CONTEXT_SEPARATOR);

    format!(
        "Answer the following question based only on the provided context.\n\
         If you cannot answer from the context, say \"{NO_ANSWER_REPLY}\"\n\
         \n\
         Context:\n\
         {combined}\n\
         \n\
         Question: {question}\n\
         \n\
         Answer:"
    )
}

/// Build the full message list for a chat-completion request.
pub fn build_messages<S: AsRef<str>>(question: &str, contexts: &[S]) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(SYSTEM_PROMPT),
        ChatMessage::user(build_prompt(question, contexts)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_prompt_layout() {
        let prompt = build_prompt("Who wrote it?", &["First doc.", "Second doc."]);

        assert_eq!(
            prompt,
            "Answer the following question based only on the provided context.\n\
             If you cannot answer from the context, say \"I don't have enough information to answer this question.\"\n\
             \n\
             Context:\n\
             First doc.\n\n---\n\nSecond doc.\n\
             \n\
             Question: Who wrote it?\n\
             \n\
             Answer:"
        );
    }

    #[test]
    fn test_messages() {
        let contexts = vec!["only".to_string()];
        let messages = build_messages("q", &contexts);

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0], ChatMessage::system(SYSTEM_PROMPT));
        assert_eq!(messages[1].role, "user");
        assert!(messages[1].content.contains("Context:\nonly\n"));
    }
}
