use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::blocking::{Client as HttpClient, RequestBuilder, Response as HttpResponse};
use serde_json::Value;

use crate::config::ScoutConfig;
use crate::error::truncate_text;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// The two remote call shapes the query service needs.
pub trait ModelTransport: Send + Sync {
    fn generate_content(&self, model: &str, payload: &Value) -> Result<Value>;
    fn predict(&self, model: &str, payload: &Value) -> Result<Value>;
}

/// Blocking client for the Generative Language API. The key travels in a
/// header so it never appears in a request URL or an error message.
pub struct GeminiTransport {
    api_base: String,
    api_key: String,
    http: HttpClient,
}

impl GeminiTransport {
    pub fn new(config: &ScoutConfig) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs_f64(config.request_timeout_s))
            .build()
            .context("failed to build Gemini HTTP client")?;
        Ok(Self {
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            http,
        })
    }

    fn endpoint(&self, model: &str, method: &str) -> String {
        let trimmed = model.trim();
        let model_path = if trimmed.starts_with("models/") {
            trimmed.to_string()
        } else {
            format!("models/{trimmed}")
        };
        format!("{}/{}:{}", self.api_base, model_path, method)
    }

    fn request(&self, endpoint: &str, payload: &Value) -> RequestBuilder {
        self.http
            .post(endpoint)
            .header(API_KEY_HEADER, self.api_key.as_str())
            .json(payload)
    }

    fn post(&self, provider: &str, endpoint: &str, payload: &Value) -> Result<Value> {
        let response = self
            .request(endpoint, payload)
            .send()
            .map_err(reqwest::Error::without_url)
            .with_context(|| format!("{provider} request failed ({endpoint})"))?;
        response_json_or_error(provider, response)
    }
}

impl ModelTransport for GeminiTransport {
    fn generate_content(&self, model: &str, payload: &Value) -> Result<Value> {
        let endpoint = self.endpoint(model, "generateContent");
        self.post("Gemini", &endpoint, payload)
    }

    fn predict(&self, model: &str, payload: &Value) -> Result<Value> {
        let endpoint = self.endpoint(model, "predict");
        self.post("Imagen", &endpoint, payload)
    }
}

fn response_json_or_error(provider: &str, response: HttpResponse) -> Result<Value> {
    let status = response.status();
    let code = status.as_u16();
    let body = response
        .text()
        .map_err(reqwest::Error::without_url)
        .with_context(|| format!("{provider} response body read failed"))?;
    if !status.is_success() {
        bail!(
            "{provider} request failed ({code}): {}",
            truncate_text(&remote_error_message(&body), 512)
        );
    }
    let parsed: Value = serde_json::from_str(&body)
        .with_context(|| format!("{provider} returned invalid JSON payload"))?;
    Ok(parsed)
}

/// Google APIs wrap failures as `{"error": {"message": ...}}`; fall back to the raw body.
fn remote_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("error")
                .and_then(|error| error.get("message"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}
