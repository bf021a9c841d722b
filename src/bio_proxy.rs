//! Biography proxy: validates the request, builds the prompt and relays it to
//! the upstream generative model. The upstream credential stays server-side.

use crate::config::ProxyConfig;
use crate::errors::BioGenerationError;
use async_trait::async_trait;
use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header::CONTENT_TYPE, Method, Response as HttpResponse, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

pub const BIO_ROUTE: &str = "/.netlify/functions/generate-bios";
pub const BIO_ROUTE_SHORT: &str = "/generate-bios";

pub const CORS_HEADERS: [(&str, &str); 3] = [
    ("Access-Control-Allow-Origin", "*"),
    ("Access-Control-Allow-Methods", "POST, OPTIONS"),
    ("Access-Control-Allow-Headers", "Content-Type, Authorization"),
];

pub const MSG_METHOD_NOT_ALLOWED: &str = "Method Not Allowed";
pub const MSG_MISSING_BODY: &str = "Missing body";
pub const MSG_MISSING_NAME: &str = "Missing name";
pub const MSG_CONFIGURATION: &str = "Error de configuración del servidor";
pub const MSG_GENERATION_FAILED: &str = "Error al generar la biografía del Pokémon";

const DEFAULT_MAX_WORDS: u32 = 40;

/// Incoming request body. Only `name` is required.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BioPayload {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub abilities: Vec<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default, rename = "maxWords")]
    pub max_words: Option<u32>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub temperature: Option<f32>,
}

/// Knobs forwarded to the generator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationOptions {
    pub model: Option<String>,
    pub temperature: Option<f32>,
}

pub fn build_prompt(name: &str, payload: &BioPayload) -> String {
    let max_words = payload.max_words.unwrap_or(DEFAULT_MAX_WORDS);
    let language = match payload.language.as_deref() {
        Some("en") => "English",
        _ => "Spanish",
    };

    format!(
        "Write a creative, short biography for a Pokémon named {}. \
         It is of type {}. Its abilities are {}. \
         Write it in {}. The biography must have at most {} words \
         and must not repeat the types or the abilities in the description.",
        name,
        payload.types.join(" and "),
        payload.abilities.join(", "),
        language,
        max_words
    )
}

/// The upstream text generator.
#[async_trait]
pub trait BioGenerator: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, BioGenerationError>;
}

/// Calls the Gemini `generateContent` REST endpoint.
pub struct GeminiGenerator {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl GeminiGenerator {
    pub fn new(client: Client, config: &ProxyConfig) -> Self {
        Self {
            client,
            base_url: config.upstream_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
        }
    }
}

/// Concatenated text parts of the first candidate.
pub fn extract_candidate_text(response: &Value) -> Option<String> {
    let parts = response
        .get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .as_array()?;
    let text: String = parts
        .iter()
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect();
    let text = text.trim().to_string();
    (!text.is_empty()).then_some(text)
}

#[async_trait]
impl BioGenerator for GeminiGenerator {
    async fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, BioGenerationError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(BioGenerationError::MissingCredential)?;
        // The model is fixed server-side; the client's choice is advisory only.
        if let Some(requested) = options.model.as_deref() {
            if requested != self.model {
                log::debug!("Ignoring requested model '{}'", requested);
            }
        }

        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let mut body = json!({ "contents": [{ "parts": [{ "text": prompt }] }] });
        if let Some(temperature) = options.temperature {
            body["generationConfig"] = json!({ "temperature": temperature });
        }

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let details = response.text().await.unwrap_or_default();
            return Err(BioGenerationError::Upstream(format!(
                "HTTP {}: {}",
                status.as_u16(),
                details
            )));
        }

        let value: Value = response.json().await?;
        extract_candidate_text(&value)
            .ok_or_else(|| BioGenerationError::Upstream("response had no text".to_string()))
    }
}

pub struct ProxyState {
    pub generator: Arc<dyn BioGenerator>,
}

fn json_response(status: StatusCode, body: Option<Value>) -> Response {
    let mut builder = HttpResponse::builder().status(status);
    for (name, value) in CORS_HEADERS {
        builder = builder.header(name, value);
    }

    let body = match body {
        Some(value) => {
            builder = builder.header(CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    match builder.body(body) {
        Ok(response) => response,
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

fn message(status: StatusCode, text: &str) -> Response {
    json_response(status, Some(json!({ "message": text })))
}

/// Handle one request to the biography endpoint.
pub async fn handle_bio_request(state: &ProxyState, method: &Method, body: &[u8]) -> Response {
    if method == Method::OPTIONS {
        return json_response(StatusCode::NO_CONTENT, None);
    }
    if method != Method::POST {
        return message(StatusCode::METHOD_NOT_ALLOWED, MSG_METHOD_NOT_ALLOWED);
    }
    if body.is_empty() {
        return message(StatusCode::BAD_REQUEST, MSG_MISSING_BODY);
    }

    let payload: BioPayload = match serde_json::from_slice(body) {
        Ok(payload) => payload,
        Err(e) => {
            log::error!("Error generating biography: invalid JSON body: {}", e);
            return message(StatusCode::INTERNAL_SERVER_ERROR, MSG_GENERATION_FAILED);
        }
    };
    let Some(name) = payload.name.as_deref().filter(|n| !n.is_empty()) else {
        return message(StatusCode::BAD_REQUEST, MSG_MISSING_NAME);
    };

    let prompt = build_prompt(name, &payload);
    let options = GenerationOptions {
        model: payload.model.clone(),
        temperature: payload.temperature,
    };

    match state.generator.generate(&prompt, &options).await {
        Ok(bio) => json_response(StatusCode::OK, Some(json!({ "bio": bio }))),
        Err(BioGenerationError::MissingCredential) => {
            log::error!("GEMINI_API_KEY is not configured");
            message(StatusCode::INTERNAL_SERVER_ERROR, MSG_CONFIGURATION)
        }
        Err(e) => {
            log::error!("Error generating biography for '{}': {}", name, e);
            message(StatusCode::INTERNAL_SERVER_ERROR, MSG_GENERATION_FAILED)
        }
    }
}

async fn bio_endpoint(
    State(state): State<Arc<ProxyState>>,
    method: Method,
    body: Bytes,
) -> Response {
    handle_bio_request(&state, &method, &body).await
}

pub fn router(state: Arc<ProxyState>) -> Router {
    Router::new()
        .route(BIO_ROUTE, any(bio_endpoint))
        .route(BIO_ROUTE_SHORT, any(bio_endpoint))
        .with_state(state)
}
