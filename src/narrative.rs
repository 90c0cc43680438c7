use crate::error::NarrativeServiceError;
use crate::models::{NarrativeConfig, NarrativeSummary};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// A text-completion backend. One call, one attempt.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, NarrativeServiceError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatContent,
}

#[derive(Debug, Deserialize)]
struct ChatContent {
    content: Option<String>,
}

/// Chat-completions client for OpenAI-compatible endpoints.
pub struct OpenAiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(api_key: String, config: &NarrativeConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        }
    }

    /// Reads the key once; a missing key only shows up when a request fails.
    pub fn from_env(config: &NarrativeConfig) -> Self {
        let api_key = std::env::var(&config.api_key_env).unwrap_or_default();
        if api_key.is_empty() {
            warn!("{} is not set, AI insights will fail", config.api_key_env);
        }
        Self::new(api_key, config)
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, prompt: &str) -> Result<String, NarrativeServiceError> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NarrativeServiceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text().await?;
        let parsed: ChatResponse = serde_json::from_str(&text)
            .map_err(|e| NarrativeServiceError::MalformedResponse(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| NarrativeServiceError::MalformedResponse("no content in response".to_string()))
    }
}

pub fn build_prompt(summary: &NarrativeSummary) -> String {
    format!(
        "Analyze this university data and provide strategic insights:\n\
         - Total students: {}\n\
         - Average student-faculty ratio: {}\n\
         - Total budget: {}\n\
         What are the key challenges and opportunities?",
        summary.total_students, summary.mean_ratio, summary.total_budget
    )
}

pub struct NarrativeRequester<C: CompletionClient> {
    client: C,
}

impl<C: CompletionClient> NarrativeRequester<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    #[cfg(test)]
    pub(crate) fn client(&self) -> &C {
        &self.client
    }

    /// Never fails: service errors come back as display text.
    pub async fn request_narrative(&self, summary: &NarrativeSummary) -> String {
        let prompt = build_prompt(summary);
        info!("requesting AI insights");

        match self.client.complete(&prompt).await {
            Ok(text) => text,
            Err(e) => {
                warn!("AI request failed: {}", e);
                format!("Error getting AI response: {}", e)
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records prompts and replays a fixed outcome.
    pub(crate) struct FakeClient {
        pub reply: Result<String, String>,
        pub prompts: Mutex<Vec<String>>,
    }

    impl FakeClient {
        pub fn ok(text: &str) -> Self {
            Self {
                reply: Ok(text.to_string()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn failing(reason: &str) -> Self {
            Self {
                reply: Err(reason.to_string()),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl CompletionClient for FakeClient {
        async fn complete(&self, prompt: &str) -> Result<String, NarrativeServiceError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply
                .clone()
                .map_err(NarrativeServiceError::MalformedResponse)
        }
    }

    fn summary() -> NarrativeSummary {
        NarrativeSummary {
            total_students: "1300".to_string(),
            mean_ratio: "31.0".to_string(),
            total_budget: "$600,000.00".to_string(),
        }
    }

    #[test]
    fn prompt_embeds_all_three_figures() {
        let prompt = build_prompt(&summary());
        assert_eq!(
            prompt,
            "Analyze this university data and provide strategic insights:\n\
             - Total students: 1300\n\
             - Average student-faculty ratio: 31.0\n\
             - Total budget: $600,000.00\n\
             What are the key challenges and opportunities?"
        );
    }

    #[tokio::test]
    async fn returns_completion_verbatim() {
        let requester = NarrativeRequester::new(FakeClient::ok("  Hire more faculty.\n"));
        let text = requester.request_narrative(&summary()).await;
        assert_eq!(text, "  Hire more faculty.\n");
    }

    #[tokio::test]
    async fn every_call_hits_the_service() {
        let requester = NarrativeRequester::new(FakeClient::ok("ok"));
        requester.request_narrative(&summary()).await;
        requester.request_narrative(&summary()).await;
        assert_eq!(requester.client.prompts.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn service_failure_becomes_error_text() {
        let requester = NarrativeRequester::new(FakeClient::failing("quota exceeded"));
        let text = requester.request_narrative(&summary()).await;
        assert_eq!(text, "Error getting AI response: malformed response: quota exceeded");
    }

    #[tokio::test]
    async fn unreachable_endpoint_becomes_error_text() {
        let config = NarrativeConfig {
            base_url: "http://127.0.0.1:9/v1".to_string(),
            ..NarrativeConfig::default()
        };
        let requester = NarrativeRequester::new(OpenAiClient::new(String::new(), &config));
        let text = requester.request_narrative(&summary()).await;
        assert!(text.starts_with("Error getting AI response: "), "{text}");
    }

    #[test]
    fn parses_chat_response_shape() {
        let json = r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"Insight"}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.choices[0].message.content.as_deref(), Some("Insight"));
    }

    #[test]
    fn request_body_has_single_user_message() {
        let body = ChatRequest {
            model: "gpt-3.5-turbo",
            messages: vec![ChatMessage {
                role: "user",
                content: "hello",
            }],
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "model": "gpt-3.5-turbo",
                "messages": [{"role": "user", "content": "hello"}]
            })
        );
    }
}
