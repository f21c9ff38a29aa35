use std::time::Duration;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

/// Connection settings for the Responses API.
#[derive(Debug, Clone)]
pub struct OpenaiConfig {
    pub client: reqwest::Client,
    pub endpoint: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
}

impl OpenaiConfig {
    /// Reads `OPENAI_API_KEY` and builds a client whose every request is
    /// bounded by `timeout`.
    pub fn from_env(
        base_url: &str,
        model: &str,
        temperature: f32,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| anyhow::anyhow!("OPENAI_API_KEY is not set"))?;
        if api_key.trim().is_empty() {
            anyhow::bail!("OPENAI_API_KEY is empty");
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("build http client")?;

        Ok(Self {
            client,
            endpoint: responses_endpoint(base_url),
            api_key,
            model: model.to_owned(),
            temperature,
        })
    }

    /// Sends one Responses API request and returns the concatenated
    /// `output_text` parts of the assistant messages.
    pub async fn complete(&self, instructions: &str, input: &str) -> anyhow::Result<String> {
        let request = self.request(instructions, input);
        tracing::debug!(
            endpoint = %self.endpoint,
            model = %self.model,
            input_chars = input.len(),
            "openai request"
        );
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .with_context(|| format!("POST {}", self.endpoint))?;

        let status = response.status();
        let raw = response.text().await.context("read OpenAI response body")?;
        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorBody>(&raw)
                .map(|body| body.error.message)
                .unwrap_or(raw);
            anyhow::bail!("OpenAI API error ({status}): {message}");
        }

        let reply: ResponsesReply =
            serde_json::from_str(&raw).context("parse OpenAI response")?;
        reply.output_text()
    }

    fn request<'a>(&'a self, instructions: &'a str, input: &'a str) -> ResponsesRequest<'a> {
        ResponsesRequest {
            model: &self.model,
            instructions,
            input,
            text: TextOptions {
                format: TextFormat { kind: "text" },
            },
            store: false,
            // gpt-5 models reject sampling parameters
            temperature: (!self.model.starts_with("gpt-5")).then_some(self.temperature),
        }
    }
}

pub fn responses_endpoint(base_url: &str) -> String {
    let base_url = base_url.trim_end_matches('/');
    format!("{base_url}/responses")
}

#[derive(Debug, Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    instructions: &'a str,
    input: &'a str,
    text: TextOptions,
    store: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct TextOptions {
    format: TextFormat,
}

#[derive(Debug, Serialize)]
struct TextFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct ResponsesReply {
    output: Vec<OutputItem>,
}

#[derive(Debug, Deserialize)]
struct OutputItem {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    content: Vec<ContentPart>,
}

#[derive(Debug, Deserialize)]
struct ContentPart {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

impl ResponsesReply {
    /// Reasoning items and refusal parts are skipped.
    fn output_text(&self) -> anyhow::Result<String> {
        let mut text = String::new();
        for item in self.output.iter().filter(|item| item.kind == "message") {
            for part in &item.content {
                if part.kind == "output_text"
                    && let Some(chunk) = &part.text
                {
                    text.push_str(chunk);
                }
            }
        }
        if text.trim().is_empty() {
            anyhow::bail!("OpenAI output text is empty");
        }
        Ok(text)
    }
}
