use super::{InferParams, LlmBackend, PromptParts};
use anyhow::{anyhow, Context, Result};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

#[derive(Serialize, Debug)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize, Debug)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: i32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "no_stops")]
    stop: &'a [String],
}

fn no_stops(stop: &&[String]) -> bool {
    stop.is_empty()
}

#[derive(Deserialize, Debug)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize, Debug)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize, Debug)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Hosted chat-completion API. The instruction goes out as the system
/// message and the input as the user message, so slot order does not apply.
pub struct OpenAiBackend {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiBackend {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .context("build http client")?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
        })
    }

    fn request_body<'a>(&'a self, prompt: &'a PromptParts, p: &'a InferParams) -> ChatRequest<'a> {
        let mut messages = Vec::with_capacity(2);
        if !prompt.system.is_empty() {
            messages.push(ChatMessage { role: "system", content: &prompt.system });
        }
        messages.push(ChatMessage { role: "user", content: &prompt.user });
        ChatRequest {
            model: &self.model,
            messages,
            max_tokens: p.max_tokens,
            temperature: p.temp,
            top_p: p.top_p,
            // the API accepts at most four stop sequences
            stop: &p.stop[..p.stop.len().min(4)],
        }
    }
}

impl LlmBackend for OpenAiBackend {
    fn generate(&self, prompt: &PromptParts, p: &InferParams) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = self.request_body(prompt, p);
        debug!(%url, model = %self.model, "chat completion request");

        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .with_context(|| format!("POST {}", url))?;

        let status = res.status();
        if !status.is_success() {
            let text = res.text().unwrap_or_default();
            return Err(anyhow!("chat completion returned {}: {}", status, text));
        }

        let parsed: ChatResponse = res.json().context("decode chat completion response")?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content.unwrap_or_default())
            .ok_or_else(|| anyhow!("chat completion returned no choices"))
    }

    fn warms_up(&self) -> bool {
        false
    }
}
