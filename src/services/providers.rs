//! LLM provider clients
//!
//! Thin, opaque request/response forwarding to the third-party providers
//! backing the catalog's agents. Each client speaks its provider's wire
//! shape and extracts the reply text; the router maps an agent slug to the
//! provider route serving it.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use thiserror::Error;
use tracing::warn;

use crate::config::Config;

const TOKENOMICS_SYSTEM_PROMPT: &str =
    "You are a tokenomics analysis expert. Analyze token supply, distribution, and incentive design.";
const AUDIT_SYSTEM_PROMPT: &str =
    "You are a security auditor for smart contracts. Identify vulnerabilities and risky patterns.";

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider {provider} is not configured")]
    NotConfigured { provider: &'static str },

    #[error("unknown agent route: {0}")]
    UnknownRoute(String),

    #[error("{provider} request failed: {message}")]
    Upstream {
        provider: &'static str,
        message: String,
    },

    #[error("{provider} returned no content")]
    EmptyResponse { provider: &'static str },
}

/// Provider reply: the text (or markdown image) to persist as the bot
/// message
#[derive(Debug, Clone)]
pub struct ProviderReply {
    pub content: String,
    pub markdown: bool,
}

/// Gemini `generateContent` client
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
}

impl GeminiClient {
    const PROVIDER: &'static str = "gemini";

    pub fn new(api_url: String, api_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url,
            api_key,
        }
    }

    pub async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
    ) -> Result<String, ProviderError> {
        let api_key = self.api_key.as_deref().ok_or(ProviderError::NotConfigured {
            provider: Self::PROVIDER,
        })?;

        let mut parts = Vec::new();
        if let Some(system) = system_prompt {
            parts.push(serde_json::json!({ "text": format!("[SYSTEM]: {system}") }));
        }
        parts.push(serde_json::json!({ "text": prompt }));

        let body = serde_json::json!({ "contents": [{ "parts": parts }] });

        let response = self
            .http
            .post(&self.api_url)
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Upstream {
                provider: Self::PROVIDER,
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(ProviderError::Upstream {
                provider: Self::PROVIDER,
                message: format!("status {}", response.status()),
            });
        }

        let payload: serde_json::Value =
            response.json().await.map_err(|e| ProviderError::Upstream {
                provider: Self::PROVIDER,
                message: e.to_string(),
            })?;

        payload
            .pointer("/candidates/0/content/parts/0/text")
            .and_then(|t| t.as_str())
            .map(str::to_string)
            .ok_or(ProviderError::EmptyResponse {
                provider: Self::PROVIDER,
            })
    }
}

/// OpenAI-style `chat/completions` client, shared by DeepSeek and Grok-2
#[derive(Debug, Clone)]
pub struct ChatCompletionsClient {
    provider: &'static str,
    http: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
    model: &'static str,
    system_prompt: &'static str,
}

impl ChatCompletionsClient {
    pub fn deepseek(api_url: String, api_key: Option<String>) -> Self {
        Self {
            provider: "deepseek",
            http: reqwest::Client::new(),
            api_url,
            api_key,
            model: "deepseek-chat",
            system_prompt: "You are a helpful assistant.",
        }
    }

    pub fn grok2(api_url: String, api_key: Option<String>) -> Self {
        Self {
            provider: "grok2",
            http: reqwest::Client::new(),
            api_url,
            api_key,
            model: "grok-2-1212",
            system_prompt: "You are Grok-2, a helpful assistant.",
        }
    }

    pub async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        let api_key = self.api_key.as_deref().ok_or(ProviderError::NotConfigured {
            provider: self.provider,
        })?;

        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": self.system_prompt },
                { "role": "user", "content": prompt },
            ],
            "stream": false,
        });

        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Upstream {
                provider: self.provider,
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(ProviderError::Upstream {
                provider: self.provider,
                message: format!("status {}", response.status()),
            });
        }

        let payload: serde_json::Value =
            response.json().await.map_err(|e| ProviderError::Upstream {
                provider: self.provider,
                message: e.to_string(),
            })?;

        payload
            .pointer("/choices/0/message/content")
            .and_then(|t| t.as_str())
            .map(str::to_string)
            .ok_or(ProviderError::EmptyResponse {
                provider: self.provider,
            })
    }
}

/// Stability image generation client. The returned image is inlined as a
/// markdown data URL so the chat layer can store it like any other
/// message.
#[derive(Debug, Clone)]
pub struct StabilityClient {
    http: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
}

impl StabilityClient {
    const PROVIDER: &'static str = "stability";

    pub fn new(api_url: String, api_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url,
            api_key,
        }
    }

    pub async fn generate_image(&self, prompt: &str) -> Result<String, ProviderError> {
        let api_key = self.api_key.as_deref().ok_or(ProviderError::NotConfigured {
            provider: Self::PROVIDER,
        })?;

        let form = reqwest::multipart::Form::new()
            .text("prompt", prompt.to_string())
            .text("output_format", "png");

        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(api_key)
            .header("Accept", "image/*")
            .multipart(form)
            .send()
            .await
            .map_err(|e| ProviderError::Upstream {
                provider: Self::PROVIDER,
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(ProviderError::Upstream {
                provider: Self::PROVIDER,
                message: format!("status {}", response.status()),
            });
        }

        let bytes = response.bytes().await.map_err(|e| ProviderError::Upstream {
            provider: Self::PROVIDER,
            message: e.to_string(),
        })?;

        if bytes.is_empty() {
            return Err(ProviderError::EmptyResponse {
                provider: Self::PROVIDER,
            });
        }

        Ok(format!("data:image/png;base64,{}", BASE64.encode(&bytes)))
    }
}

/// Maps an agent slug to the provider route serving it. Route names feed
/// the usage log's `tool` column.
pub fn tool_for_slug(slug: &str) -> Option<&'static str> {
    match slug {
        "gemini-1-5-pro" | "gemini-2-0-flash" | "app-creators" | "tokenomics-analys-agent"
        | "audit-analys-agent" => Some("gemini"),
        "deepseek-v3-fw" => Some("deepseek"),
        "grok-2" => Some("grok2"),
        "agent" => Some("stability"),
        _ => None,
    }
}

/// Dispatches a prompt to the provider behind an agent slug
pub struct LlmRouter {
    gemini: GeminiClient,
    deepseek: ChatCompletionsClient,
    grok2: ChatCompletionsClient,
    stability: StabilityClient,
}

impl LlmRouter {
    pub fn from_config(config: &Config) -> Self {
        Self {
            gemini: GeminiClient::new(
                config.gemini_api_url.clone(),
                config.gemini_api_key.clone(),
            ),
            deepseek: ChatCompletionsClient::deepseek(
                config.deepseek_api_url.clone(),
                config.deepseek_api_key.clone(),
            ),
            grok2: ChatCompletionsClient::grok2(
                config.grok2_api_url.clone(),
                config.grok2_api_key.clone(),
            ),
            stability: StabilityClient::new(
                config.stability_api_url.clone(),
                config.stability_api_key.clone(),
            ),
        }
    }

    pub async fn generate(&self, slug: &str, prompt: &str) -> Result<ProviderReply, ProviderError> {
        let reply = match slug {
            "gemini-1-5-pro" | "gemini-2-0-flash" | "app-creators" => ProviderReply {
                content: self.gemini.generate(prompt, None).await?,
                markdown: false,
            },
            "tokenomics-analys-agent" => ProviderReply {
                content: self
                    .gemini
                    .generate(prompt, Some(TOKENOMICS_SYSTEM_PROMPT))
                    .await?,
                markdown: false,
            },
            "audit-analys-agent" => ProviderReply {
                content: self
                    .gemini
                    .generate(prompt, Some(AUDIT_SYSTEM_PROMPT))
                    .await?,
                markdown: false,
            },
            "deepseek-v3-fw" => ProviderReply {
                content: self.deepseek.generate(prompt).await?,
                markdown: false,
            },
            "grok-2" => ProviderReply {
                content: self.grok2.generate(prompt).await?,
                markdown: false,
            },
            "agent" => {
                let image_url = self.stability.generate_image(prompt).await?;
                ProviderReply {
                    content: format!("![Generated Image]({image_url})"),
                    markdown: true,
                }
            }
            other => {
                warn!("No provider route for agent slug {other}");
                return Err(ProviderError::UnknownRoute(other.to_string()));
            }
        };

        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn gemini_extracts_candidate_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(query_param("key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [
                    { "content": { "parts": [ { "text": "hello from gemini" } ] } }
                ]
            })))
            .mount(&server)
            .await;

        let client = GeminiClient::new(server.uri(), Some("test-key".to_string()));
        let text = client.generate("hi", None).await.unwrap();
        assert_eq!(text, "hello from gemini");
    }

    #[tokio::test]
    async fn gemini_prefixes_system_prompt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({
                "contents": [ { "parts": [ { "text": "[SYSTEM]: be terse" } ] } ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [
                    { "content": { "parts": [ { "text": "ok" } ] } }
                ]
            })))
            .mount(&server)
            .await;

        let client = GeminiClient::new(server.uri(), Some("k".to_string()));
        assert_eq!(client.generate("hi", Some("be terse")).await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn chat_completions_extracts_message_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [ { "message": { "content": "grok says hi" } } ]
            })))
            .mount(&server)
            .await;

        let client = ChatCompletionsClient::grok2(server.uri(), Some("k".to_string()));
        assert_eq!(client.generate("hi").await.unwrap(), "grok says hi");
    }

    #[tokio::test]
    async fn empty_choices_is_an_empty_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "choices": [] })),
            )
            .mount(&server)
            .await;

        let client = ChatCompletionsClient::deepseek(server.uri(), Some("k".to_string()));
        let err = client.generate("hi").await.unwrap_err();
        assert!(matches!(err, ProviderError::EmptyResponse { .. }));
    }

    #[tokio::test]
    async fn stability_inlines_image_as_data_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0x89, 0x50, 0x4e, 0x47]))
            .mount(&server)
            .await;

        let client = StabilityClient::new(server.uri(), Some("k".to_string()));
        let url = client.generate_image("a cat").await.unwrap();
        assert!(url.starts_with("data:image/png;base64,"));
    }

    #[tokio::test]
    async fn missing_api_key_is_not_configured() {
        let client = ChatCompletionsClient::deepseek("http://127.0.0.1:1".to_string(), None);
        let err = client.generate("hi").await.unwrap_err();
        assert!(matches!(err, ProviderError::NotConfigured { .. }));
    }

    #[test]
    fn slug_routing_table() {
        assert_eq!(tool_for_slug("gemini-2-0-flash"), Some("gemini"));
        assert_eq!(tool_for_slug("tokenomics-analys-agent"), Some("gemini"));
        assert_eq!(tool_for_slug("deepseek-v3-fw"), Some("deepseek"));
        assert_eq!(tool_for_slug("grok-2"), Some("grok2"));
        assert_eq!(tool_for_slug("agent"), Some("stability"));
        assert_eq!(tool_for_slug("unknown-bot"), None);
    }
}
