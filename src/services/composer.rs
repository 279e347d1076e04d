//! Answer composer boundary.
//!
//! The core's responsibility ends at the ranked context block and citation
//! labels; this client hands them to an OpenAI-compatible chat-completions
//! endpoint and returns the answer text opaque, checked only for
//! non-emptiness.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::AnswerError;
use crate::models::{AnswerConfig, RetrievalResult};
use crate::utils::retry::{RetryConfig, with_retry};

const SYSTEM_PROMPT: &str = "Using ONLY the provided context, give a concise answer. \
If the question is broad, give a 3-5 bullet summary. \
Always include short citations like [source pX]. \
If the context is empty, say the source may be a scanned or empty document.";

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

pub struct AnswerComposer {
    client: Client,
    api_base: String,
    api_key: String,
    default_model: String,
    temperature: f32,
}

impl AnswerComposer {
    pub fn new(config: &AnswerConfig) -> Result<Self, AnswerError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| AnswerError::MissingApiKey(config.api_key_env.clone()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key,
            default_model: config.default_model.clone(),
            temperature: config.temperature,
        })
    }

    /// Compose an answer grounded in the retrieval result. Transient API
    /// failures are retried with backoff; this is the only place the
    /// application retries anything.
    pub async fn compose(
        &self,
        retrieval: &RetrievalResult,
        model: Option<&str>,
    ) -> Result<String, AnswerError> {
        let request = ChatRequest {
            model: model.unwrap_or(&self.default_model).to_string(),
            messages: build_messages(&retrieval.query, &retrieval.context_block()),
            temperature: self.temperature,
        };

        let answer = with_retry(&RetryConfig::new(3), || self.send(&request))
            .await
            .into_result()?;

        if answer.trim().is_empty() {
            return Err(AnswerError::EmptyAnswer);
        }
        Ok(answer)
    }

    async fn send(&self, request: &ChatRequest) -> Result<String, AnswerError> {
        let url = format!("{}/chat/completions", self.api_base);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AnswerError::Timeout
                } else {
                    AnswerError::RequestError(e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AnswerError::ApiError(format!("status {}: {}", status, body)));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| AnswerError::ApiError(format!("unparseable response: {}", e)))?;

        first_content(chat).ok_or(AnswerError::EmptyAnswer)
    }
}

fn build_messages(query: &str, context: &str) -> Vec<ChatMessage> {
    let context = if context.is_empty() {
        "(no relevant context found)"
    } else {
        context
    };
    vec![
        ChatMessage {
            role: "system".to_string(),
            content: SYSTEM_PROMPT.to_string(),
        },
        ChatMessage {
            role: "user".to_string(),
            content: format!("Question: {}\n\nContext:\n{}", query, context),
        },
    ]
}

fn first_content(response: ChatResponse) -> Option<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_query_and_context() {
        let messages = build_messages("what is ownership?", "[Source: book.pdf p2]\nOwnership...");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[1].role, "user");
        assert!(messages[1].content.contains("Question: what is ownership?"));
        assert!(messages[1].content.contains("[Source: book.pdf p2]"));
    }

    #[test]
    fn test_empty_context_gets_placeholder() {
        let messages = build_messages("q", "");
        assert!(messages[1].content.contains("(no relevant context found)"));
    }

    #[test]
    fn test_response_parsing() {
        let json = r#"{"choices":[{"message":{"role":"assistant","content":"Answer [a.pdf p1]"}}]}"#;
        let response: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(first_content(response).as_deref(), Some("Answer [a.pdf p1]"));
    }

    #[test]
    fn test_response_without_content() {
        let json = r#"{"choices":[{"message":{"role":"assistant"}}]}"#;
        let response: ChatResponse = serde_json::from_str(json).unwrap();
        assert!(first_content(response).is_none());

        let json = r#"{"choices":[]}"#;
        let response: ChatResponse = serde_json::from_str(json).unwrap();
        assert!(first_content(response).is_none());
    }
}
