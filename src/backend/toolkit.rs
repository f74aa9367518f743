//! Toolkit backend: OpenAI-compatible chat-completions agent service.
//!
//! Direct transport talks to the public endpoint with a bearer key;
//! hosted-proxy transport talks to a managed gateway, optionally
//! authenticated, with the region override forwarded as a request header.

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::HeaderValue;
use serde::Deserialize;
use tracing::debug;

use crate::config::{SessionConfig, TransportMode, ENV_OPENAI_API_KEY, ENV_TOOLKIT_GATEWAY_URL};
use crate::error::{HowdahError, Result};
use crate::types::TokenUsage;

use super::http::{bearer_headers, parse_sse_data, shared_client, status_to_error};
use super::{AgentBackend, BackendEvent, EventStream};

pub const BACKEND_ID: &str = "toolkit";

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const REGION_HEADER: &str = "x-gateway-region";

/// Backend adapter over an OpenAI-compatible agent endpoint.
pub struct ToolkitBackend {
    model: String,
    transport: TransportMode,
    api_key: Option<String>,
    base_url: String,
    region: Option<String>,
    max_tokens: u32,
    temperature: f64,
}

impl ToolkitBackend {
    pub fn new(config: &SessionConfig) -> Result<Self> {
        let (api_key, base_url, region) = match config.transport {
            TransportMode::Direct => {
                let key = config
                    .api_key
                    .clone()
                    .or_else(|| std::env::var(ENV_OPENAI_API_KEY).ok())
                    .ok_or_else(|| {
                        HowdahError::Credential(format!(
                            "{ENV_OPENAI_API_KEY} must be set or api_key supplied for direct access"
                        ))
                    })?;
                let base_url = config
                    .base_url
                    .clone()
                    .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
                (Some(key), base_url, None)
            }
            TransportMode::HostedProxy => {
                let base_url = config
                    .base_url
                    .clone()
                    .or_else(|| std::env::var(ENV_TOOLKIT_GATEWAY_URL).ok())
                    .ok_or_else(|| {
                        HowdahError::Configuration(format!(
                            "hosted-proxy access requires a gateway URL (base_url or {ENV_TOOLKIT_GATEWAY_URL})"
                        ))
                    })?;
                let key = config
                    .api_key
                    .clone()
                    .or_else(|| std::env::var(ENV_OPENAI_API_KEY).ok());
                (key, base_url, config.region.clone())
            }
        };

        Ok(Self {
            model: config.model.clone(),
            transport: config.transport,
            api_key,
            base_url,
            region,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }
}

#[async_trait]
impl AgentBackend for ToolkitBackend {
    fn backend_id(&self) -> &str {
        BACKEND_ID
    }

    fn model_id(&self) -> &str {
        &self.model
    }

    fn transport(&self) -> TransportMode {
        self.transport
    }

    async fn run(&self, prompt: &str) -> Result<EventStream> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [{"role": "user", "content": prompt}],
            "max_tokens": self.max_tokens,
            "temperature": self.temperature,
            "stream": true,
            "stream_options": {"include_usage": true},
        });
        let url = format!(
            "{}/chat/completions",
            self.base_url.trim_end_matches('/')
        );

        let mut headers = bearer_headers(self.api_key.as_deref());
        if let Some(ref region) = self.region {
            if let Ok(val) = HeaderValue::from_str(region) {
                headers.insert(REGION_HEADER, val);
            }
        }

        debug!(model = %self.model, %url, "toolkit turn");

        let resp = shared_client()
            .post(&url)
            .headers(headers)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                HowdahError::connection_with_source(BACKEND_ID, "request failed", e)
            })?;

        let status = resp.status().as_u16();
        if status != 200 {
            let body_text = resp.text().await.unwrap_or_default();
            return Err(status_to_error(BACKEND_ID, status, &body_text));
        }

        let byte_stream = resp.bytes_stream();

        let stream = async_stream::stream! {
            let mut buffer = String::new();
            let mut accumulated = String::new();
            let mut started = false;
            futures::pin_mut!(byte_stream);

            while let Some(chunk_result) = byte_stream.next().await {
                let chunk = match chunk_result {
                    Ok(c) => c,
                    Err(e) => {
                        yield Err(HowdahError::connection_with_source(
                            BACKEND_ID,
                            "stream interrupted",
                            e,
                        ));
                        break;
                    }
                };

                buffer.push_str(&String::from_utf8_lossy(&chunk));

                while let Some(line_end) = buffer.find('\n') {
                    let line = buffer[..line_end].trim().to_string();
                    buffer = buffer[line_end + 1..].to_string();

                    if line.is_empty() || line.starts_with(':') {
                        continue;
                    }

                    let Some(data) = parse_sse_data(&line) else {
                        continue;
                    };

                    match serde_json::from_str::<ChatChunk>(data) {
                        Ok(chunk) => {
                            if !started {
                                started = true;
                                yield Ok(BackendEvent::Started {
                                    session_id: chunk.id.clone(),
                                });
                            }
                            if let Some(choice) = chunk.choices.into_iter().next() {
                                if let Some(delta) = choice.delta.content {
                                    if !delta.is_empty() {
                                        accumulated.push_str(&delta);
                                        yield Ok(BackendEvent::Content {
                                            text: accumulated.clone(),
                                        });
                                    }
                                }
                            }
                            if let Some(usage) = chunk.usage {
                                yield Ok(BackendEvent::Usage(TokenUsage::new(
                                    usage.prompt_tokens,
                                    usage.completion_tokens,
                                )));
                            }
                        }
                        Err(e) => {
                            yield Err(HowdahError::sdk(
                                BACKEND_ID,
                                format!("undecodable stream chunk: {e}"),
                            ));
                            return;
                        }
                    }
                }
            }
        };

        Ok(Box::pin(stream))
    }
}

#[derive(Deserialize)]
struct ChatChunk {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    #[serde(default)]
    delta: ChatDelta,
}

#[derive(Deserialize, Default)]
struct ChatDelta {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}
