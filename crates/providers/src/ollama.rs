use crate::backend::{GenerationParams, ModelBackend, ModelSession};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:11434";

static SHARED_HTTP: LazyLock<Client> = LazyLock::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(120))
        .pool_max_idle_per_host(2)
        .build()
        .expect("failed to build HTTP client")
});

#[derive(Debug, Serialize)]
struct ShowRequest<'a> {
    model: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct ShowResponse {
    #[serde(default)]
    details: ModelDetails,
}

#[derive(Debug, Default, Clone, Deserialize)]
struct ModelDetails {
    #[serde(default)]
    family: Option<String>,
    #[serde(default)]
    parameter_size: Option<String>,
    #[serde(default)]
    quantization_level: Option<String>,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    /// Skip the model's own chat template; the prompt is already fully formatted
    raw: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize, PartialEq)]
struct GenerateOptions {
    temperature: f32,
    top_p: f32,
    repeat_penalty: f32,
    num_predict: usize,
}

impl From<&GenerationParams> for GenerateOptions {
    fn from(params: &GenerationParams) -> Self {
        Self {
            // Greedy decoding when sampling is off
            temperature: if params.do_sample { params.temperature } else { 0.0 },
            top_p: params.top_p,
            repeat_penalty: params.repetition_penalty,
            num_predict: params.max_new_tokens,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Local model served by an Ollama daemon
pub struct OllamaBackend {
    http: Client,
    base: String,
    model: String,
}

impl OllamaBackend {
    /// Without an explicit `base` the daemon is expected on loopback
    pub fn new(model: impl Into<String>, base: Option<String>) -> Self {
        let base = base.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self {
            http: SHARED_HTTP.clone(),
            base: base.trim_end_matches('/').to_string(),
            model: model.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ModelBackend for OllamaBackend {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn load(&self) -> Result<Box<dyn ModelSession>> {
        let url = format!("{}/api/show", self.base);
        let req = ShowRequest { model: &self.model };
        let resp = self.http.post(url).json(&req).send().await?;
        if !resp.status().is_success() {
            return Err(anyhow!(
                "ollama has no model '{}': {}",
                self.model,
                resp.status()
            ));
        }
        let body: ShowResponse = resp.json().await.unwrap_or_default();
        tracing::info!(
            model = %self.model,
            family = ?body.details.family,
            "local model available"
        );
        Ok(Box::new(OllamaSession {
            http: self.http.clone(),
            base: self.base.clone(),
            model: self.model.clone(),
            details: body.details,
        }))
    }
}

struct OllamaSession {
    http: Client,
    base: String,
    model: String,
    details: ModelDetails,
}

#[async_trait]
impl ModelSession for OllamaSession {
    fn describe(&self) -> String {
        let mut parts = vec![self.model.clone()];
        if let Some(size) = &self.details.parameter_size {
            parts.push(size.clone());
        }
        if let Some(quant) = &self.details.quantization_level {
            parts.push(quant.clone());
        }
        parts.join(" ")
    }

    async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String> {
        let url = format!("{}/api/generate", self.base);
        let req = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            raw: true,
            options: GenerateOptions::from(params),
        };
        let resp = self.http.post(url).json(&req).send().await?;
        if !resp.status().is_success() {
            return Err(anyhow!("ollama error: {}", resp.status()));
        }
        let body: GenerateResponse = resp.json().await?;
        Ok(body.response)
    }
}
