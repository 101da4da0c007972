use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, error, info};
use url::Url;

use crate::config::Config;
use crate::error::BrainError;
use crate::types::InteractiveElement;

const PROMPT_TEMPLATE: &str = r##"You are given a JSON object listing the interactive elements of a webpage. Decide which of them are worth tagging for analytics.

Output requirements:
- Return ONLY a JSON array. No prose before or after it.
- One object per recommended element, with these keys:
  - "element": a short, capitalized label naming the element kind and its action, e.g. "Button - Log In", "Link - Sign Up", "Form - Contact Us".
  - "reason": why tagging it helps analytics, e.g. what engagement or conversion it measures.
  - "selector_code": the element's "selector" value from the input.
- Focus on buttons, links, form fields and other clickable areas; skip purely decorative elements.
- Rank by importance, most significant first. Every entry must have a distinct purpose.

Example:
[
  {"element": "Button - Log In", "reason": "Tracks engagement with the primary login call-to-action", "selector_code": "#login"},
  {"element": "Form - Contact Us", "reason": "Measures lead generation through contact submissions", "selector_code": "form.contact"}
]

Input:
{input}"##;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    role: String,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Asks Gemini which elements to tag. Returns the model's raw text; making
/// sense of it is the recovery parser's job.
#[derive(Clone)]
pub struct Brain {
    client: Client,
    config: Config,
}

impl Brain {
    pub fn new(config: Config) -> Result<Self, BrainError> {
        let client = Client::builder()
            .timeout(config.model_timeout())
            .build()
            .map_err(|e| BrainError::Network(e.to_string()))?;
        Ok(Self { client, config })
    }

    /// Recommend tags for an extracted inventory.
    pub async fn recommend(
        &self,
        elements: &[InteractiveElement],
        use_flash: bool,
    ) -> Result<String, BrainError> {
        self.generate(&inventory_payload(elements), use_flash).await
    }

    /// Send the instruction template filled with `input` and return the reply text.
    pub async fn generate(&self, input: &str, use_flash: bool) -> Result<String, BrainError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(BrainError::MissingApiKey)?;
        let model = self.config.model_for(use_flash);

        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: Some(build_prompt(input)),
                }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: self.config.max_output_tokens,
                temperature: self.config.temperature,
            },
        };

        let mut url = Url::parse(&format!(
            "{}/models/{}:generateContent",
            self.config.gemini_base_url.trim_end_matches('/'),
            model
        ))
        .map_err(|e| BrainError::Network(format!("invalid Gemini endpoint: {}", e)))?;
        url.query_pairs_mut().append_pair("key", api_key);
        info!("Requesting recommendations from {}", model);

        let response = self
            .client
            .post(url)
            .json(&request)
            .send()
            .await
            .map_err(|e| BrainError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| BrainError::Network(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            error!("Gemini API error ({}): {}", status, message);
            return Err(BrainError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateContentResponse =
            serde_json::from_str(&body).map_err(|e| BrainError::Decode(e.to_string()))?;

        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(BrainError::EmptyResponse);
        }

        debug!("Model says: {}", text);
        Ok(text)
    }
}

/// Inventory as sent to the model.
pub fn inventory_payload(elements: &[InteractiveElement]) -> String {
    json!({ "success": true, "elements": elements }).to_string()
}

pub fn build_prompt(input: &str) -> String {
    PROMPT_TEMPLATE.replace("{input}", input)
}
