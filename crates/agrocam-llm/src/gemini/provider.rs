//! Gemini provider implementation

use super::config::{downgrade_model, GeminiConfig, MODELS};
use super::convert::{convert_messages, convert_tool_choice, convert_tools};
use super::security::sanitize_api_error;
use super::types::*;
use crate::completion::{
    CompletionRequest, CompletionResponse, TokenUsage, ToolCompletionRequest,
    ToolCompletionResponse,
};
use crate::error::{Error, Result};
use crate::provider::LlmProvider;
use crate::tools::ToolCall;
use reqwest::Client;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Gemini provider
pub struct GeminiProvider {
    client: Client,
    config: GeminiConfig,
    /// Last server-suggested retry delay (seconds)
    last_retry_after: AtomicU64,
}

impl GeminiProvider {
    /// Create a new Gemini provider
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self {
            client,
            config,
            last_retry_after: AtomicU64::new(0),
        })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(GeminiConfig::from_env()?)
    }

    fn build_request(&self, request: &CompletionRequest) -> GeminiRequest {
        let (system_instruction, contents) = convert_messages(&request.messages);
        GeminiRequest {
            contents,
            system_instruction,
            generation_config: Some(GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_tokens.or(Some(self.config.default_max_tokens)),
                stop_sequences: request.stop.clone(),
            }),
            tools: None,
            tool_config: None,
        }
    }

    fn model_for<'a>(&'a self, request: &'a CompletionRequest) -> &'a str {
        if request.model.is_empty() {
            &self.config.default_model
        } else {
            &request.model
        }
    }

    /// Send with retries; returns the response and the model actually used,
    /// which differs from `model` after a rate-limit downgrade
    async fn send_request(
        &self,
        model: &str,
        request: GeminiRequest,
    ) -> Result<(GeminiResponse, String)> {
        let mut current_model = model.to_string();
        let max_retries = self.config.max_retries;

        loop {
            for attempt in 0..=max_retries {
                match self.send_request_once(&current_model, &request).await {
                    Ok(resp) => return Ok((resp, current_model)),
                    Err(Error::RateLimit) if attempt < max_retries => {
                        let hint = self.last_retry_after.swap(0, Ordering::Relaxed);
                        let delay_secs = if hint > 0 {
                            hint.clamp(1, 15)
                        } else {
                            2 + u64::from(attempt) * 2
                        };
                        tracing::info!(
                            attempt = attempt + 1,
                            model = %current_model,
                            delay_secs,
                            "Gemini rate limited, retrying same model"
                        );
                        tokio::time::sleep(Duration::from_secs(delay_secs)).await;
                    }
                    Err(Error::RateLimit) => break,
                    Err(Error::ServerError(ref msg)) if attempt < max_retries => {
                        let delay_secs = 2 + u64::from(attempt) * 3;
                        warn!(
                            attempt = attempt + 1,
                            model = %current_model,
                            delay_secs,
                            error = %msg,
                            "Gemini server error, retrying"
                        );
                        tokio::time::sleep(Duration::from_secs(delay_secs)).await;
                    }
                    Err(e) => return Err(e),
                }
            }

            // A hint from the exhausted model does not apply to the next one
            self.last_retry_after.store(0, Ordering::Relaxed);
            match downgrade_model(&current_model) {
                Some(cheaper) => {
                    warn!(from = %current_model, to = %cheaper, "Gemini rate limited, downgrading model");
                    current_model = cheaper.to_string();
                }
                None => return Err(Error::RateLimit),
            }
        }
    }

    #[cfg(test)]
    pub(super) fn pending_retry_hint(&self) -> u64 {
        self.last_retry_after.load(Ordering::Relaxed)
    }

    async fn send_request_once(&self, model: &str, request: &GeminiRequest) -> Result<GeminiResponse> {
        // The URL carries the key; log the model only
        debug!(model = %model, "Sending request to Gemini");

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.config.base_url, model, self.config.api_key
        );
        let response = self
            .client
            .post(&url)
            .header("content-type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::Timeout(self.config.timeout.as_millis() as u64)
                } else {
                    Error::Network(sanitize_api_error(&e.without_url().to_string()))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Network(e.without_url().to_string()))?;

        if status.is_success() {
            return serde_json::from_str(&body)
                .map_err(|e| Error::InvalidResponse(format!("{e}: {}", crate::util::truncate_safe(&body, 300))));
        }

        warn!(status = %status, "Gemini API error response");
        let Ok(error) = serde_json::from_str::<GeminiError>(&body) else {
            let message = sanitize_api_error(&format!("HTTP {status}"));
            return Err(if status.is_server_error() {
                Error::ServerError(message)
            } else if status.as_u16() == 429 {
                Error::RateLimit
            } else {
                Error::Api(message)
            });
        };

        warn!(
            error_status = %error.error.status,
            error_code = error.error.code,
            "Gemini API error detail"
        );

        if status.as_u16() == 429 {
            let retry_secs = error.error.retry_after_secs();
            if retry_secs > 0 {
                self.last_retry_after.store(retry_secs, Ordering::Relaxed);
            }
            return Err(Error::RateLimit);
        }

        let message = sanitize_api_error(&format!("{}: {}", error.error.status, error.error.message));
        if status.is_server_error() {
            Err(Error::ServerError(message))
        } else {
            Err(Error::Api(message))
        }
    }
}

fn usage_from(meta: Option<UsageMetadata>) -> Option<TokenUsage> {
    meta.map(|u| TokenUsage {
        prompt_tokens: u.prompt_token_count,
        completion_tokens: u.candidates_token_count.unwrap_or(0),
        total_tokens: u.total_token_count,
    })
}

#[async_trait::async_trait]
impl LlmProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn supports_tools(&self) -> bool {
        true
    }

    fn available_models(&self) -> Vec<String> {
        MODELS.iter().map(|s| (*s).to_string()).collect()
    }

    fn default_model(&self) -> &str {
        &self.config.default_model
    }

    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let model = self.model_for(&request).to_string();
        let gemini_request = self.build_request(&request);
        let (response, actual_model) = self.send_request(&model, gemini_request).await?;

        let candidate = response
            .candidates
            .first()
            .ok_or_else(|| Error::InvalidResponse("No candidates in response".to_string()))?;

        let content: String = candidate
            .content
            .parts
            .iter()
            .filter_map(|part| match part {
                GeminiPart::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        if content.trim().is_empty() {
            warn!(finish_reason = ?candidate.finish_reason, "Gemini returned no text");
        }

        Ok(CompletionResponse {
            content,
            finish_reason: candidate.finish_reason.clone(),
            usage: usage_from(response.usage_metadata),
            model: actual_model,
        })
    }

    #[instrument(skip(self, request), fields(model = %request.request.model, tools = request.tools.len()))]
    async fn complete_with_tools(
        &self,
        request: ToolCompletionRequest,
    ) -> Result<ToolCompletionResponse> {
        let model = self.model_for(&request.request).to_string();
        let mut gemini_request = self.build_request(&request.request);
        if !request.tools.is_empty() {
            gemini_request.tools = Some(convert_tools(&request.tools));
            gemini_request.tool_config = Some(convert_tool_choice(&request.tool_choice));
        }

        let (response, actual_model) = self.send_request(&model, gemini_request).await?;

        let candidate = response
            .candidates
            .first()
            .ok_or_else(|| Error::InvalidResponse("No candidates in response".to_string()))?;

        let mut texts = Vec::new();
        let mut tool_calls = Vec::new();
        for part in &candidate.content.parts {
            match part {
                GeminiPart::Text { text } => texts.push(text.as_str()),
                GeminiPart::FunctionCall { function_call } => {
                    // Gemini does not issue call ids
                    tool_calls.push(ToolCall::new(
                        uuid::Uuid::new_v4().to_string(),
                        function_call.name.clone(),
                        if function_call.args.is_null() {
                            serde_json::json!({})
                        } else {
                            function_call.args.clone()
                        },
                    ));
                }
                GeminiPart::FunctionResponse { .. } => {}
            }
        }

        let content = Some(texts.concat()).filter(|t| !t.trim().is_empty());
        if content.is_none() && tool_calls.is_empty() {
            warn!(finish_reason = ?candidate.finish_reason, "Gemini returned neither text nor calls");
        }

        Ok(ToolCompletionResponse {
            content,
            tool_calls,
            finish_reason: candidate.finish_reason.clone(),
            usage: usage_from(response.usage_metadata),
            model: actual_model,
        })
    }
}
