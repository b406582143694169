use crate::config::ServiceConfig;
use crate::models::*;
use anyhow::Result;
use base64::{engine::general_purpose, Engine as _};
use reqwest::Client;
use std::future::Future;

pub const NO_TEXT_RESPONSE: &str = "No textual response received from the API.";
const API_KEY_HEADER: &str = "x-goog-api-key";

/// A remote text/vision model: ordered parts in, reply text out.
pub trait GenerationClient: Send + Sync {
    fn generate(&self, parts: &[ContentPart]) -> impl Future<Output = Result<String>> + Send;
}

pub struct GeminiService {
    client: Client,
    config: ServiceConfig,
}

impl GeminiService {
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn from_env() -> Self {
        Self::new(ServiceConfig::from_env())
    }

    pub fn build_request(&self, parts: &[ContentPart]) -> GeminiRequest {
        GeminiRequest {
            contents: vec![GeminiContent {
                parts: parts.iter().map(to_gemini_part).collect(),
            }],
            generation_config: Some(GeminiGenerationConfig {
                temperature: self.config.temperature,
                max_output_tokens: self.config.max_output_tokens,
            }),
        }
    }

    /// The key travels in a header so it never appears in the URL, and
    /// therefore never in a transport error message.
    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.api_base, self.config.model
        )
    }
}

impl GenerationClient for GeminiService {
    async fn generate(&self, parts: &[ContentPart]) -> Result<String> {
        let request = self.build_request(parts);

        log::info!(
            "Sending {} part(s) to {}",
            parts.len(),
            self.config.model
        );

        let response = self.client
            .post(self.endpoint())
            .header(API_KEY_HEADER, self.config.api_key.as_deref().unwrap_or_default())
            .json(&request)
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.map_err(reqwest::Error::without_url)?;
            return Err(anyhow::anyhow!("Gemini API error ({}): {}", status, error_text));
        }

        let gemini_response: GeminiResponse = response
            .json()
            .await
            .map_err(reqwest::Error::without_url)?;
        response_text(&gemini_response)
    }
}

fn to_gemini_part(part: &ContentPart) -> GeminiPart {
    match part {
        ContentPart::Text(text) | ContentPart::Payload(ContentPayload::Text(text)) => {
            GeminiPart::Text { text: text.clone() }
        }
        ContentPart::Payload(ContentPayload::Image { mime_type, data }) => GeminiPart::InlineData {
            inline_data: GeminiInlineData {
                mime_type: mime_type.clone(),
                data: general_purpose::STANDARD.encode(data),
            },
        },
    }
}

/// Concatenated text of the first candidate.
pub fn response_text(response: &GeminiResponse) -> Result<String> {
    let text: String = response
        .candidates
        .first()
        .and_then(|c| c.content.as_ref())
        .map(|content| {
            content
                .parts
                .iter()
                .filter_map(|p| p.text.as_deref())
                .collect()
        })
        .unwrap_or_default();

    if !text.is_empty() {
        return Ok(text);
    }

    let reason = response
        .prompt_feedback
        .as_ref()
        .and_then(|f| f.block_reason.clone())
        .or_else(|| response.candidates.first().and_then(|c| c.finish_reason.clone()));

    match reason {
        Some(reason) => Err(anyhow::anyhow!("{} (reason: {})", NO_TEXT_RESPONSE, reason)),
        None => Err(anyhow::anyhow!(NO_TEXT_RESPONSE)),
    }
}
