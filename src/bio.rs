//! Client side of the biography service.

use crate::config::BioSettings;
use crate::errors::BioError;
use async_trait::async_trait;
use reqwest::Client;
use schema::Pokemon;
use serde::{Deserialize, Serialize};

/// Body posted to the biography proxy. Everything past `abilities` is
/// advisory and may be ignored by the proxy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BioRequest {
    pub name: String,
    pub types: Vec<String>,
    pub abilities: Vec<String>,
    pub language: String,
    pub max_words: u32,
    pub model: String,
    pub temperature: f32,
}

impl BioRequest {
    pub fn for_pokemon(pokemon: &Pokemon, settings: &BioSettings) -> Self {
        Self {
            name: pokemon.name.clone(),
            types: pokemon.type_names(),
            abilities: pokemon.ability_names(),
            language: settings.language.clone(),
            max_words: settings.max_words,
            model: settings.model.clone(),
            temperature: settings.temperature,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BioResponse {
    #[serde(default)]
    pub ok: Option<bool>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[async_trait]
pub trait BioService: Send + Sync {
    /// The generated text, or an empty string when the service sent none.
    async fn create_bio(&self, pokemon: &Pokemon) -> Result<String, BioError>;
}

pub struct HttpBioClient {
    client: Client,
    settings: BioSettings,
}

impl HttpBioClient {
    pub fn new(client: Client, settings: BioSettings) -> Self {
        Self { client, settings }
    }
}

#[async_trait]
impl BioService for HttpBioClient {
    async fn create_bio(&self, pokemon: &Pokemon) -> Result<String, BioError> {
        let request = BioRequest::for_pokemon(pokemon, &self.settings);
        log::debug!("POST {} for '{}'", self.settings.endpoint, request.name);

        let response = self
            .client
            .post(&self.settings.endpoint)
            .json(&request)
            .send()
            .await?;
        let status = response.status();
        let body: BioResponse = response.json().await.unwrap_or_default();

        if !status.is_success() {
            return Err(BioError::Service {
                status: status.as_u16(),
                message: body.message.unwrap_or_default(),
            });
        }
        Ok(body.bio.unwrap_or_default())
    }
}
