//! Pokedex MCP Server
//!
//! A Model Context Protocol server (rmcp) that exposes catalog lookups,
//! evolution lineages and biography generation for LLM interaction.

use std::borrow::Cow;
use std::sync::Arc;

use anyhow::{Context, Result};
use pokedex_gallery::bio::{BioService, HttpBioClient};
use pokedex_gallery::catalog::{CatalogApi, HttpCatalog};
use pokedex_gallery::config::AppConfig;
use pokedex_gallery::evolution::EvolutionResolver;
use pokedex_gallery::mcp_interface::*;
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{ErrorData as McpError, *},
    schemars, tool, tool_handler, tool_router, ServerHandler, ServiceExt,
};
use serde::Deserialize;
use tokio::io::{stdin, stdout};

const MAX_RANDOM: usize = 10;

#[derive(Clone)]
pub struct PokedexService {
    tool_router: ToolRouter<PokedexService>,
    catalog: Arc<dyn CatalogApi>,
    resolver: EvolutionResolver,
    bio: Arc<dyn BioService>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PokemonNameRequest {
    #[schemars(description = "Pokemon name or National Pokedex number")]
    pub name: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RandomPokemonRequest {
    #[schemars(description = "How many random Pokemon to list (1-10)")]
    pub count: Option<usize>,
}

fn internal_error(message: String) -> McpError {
    McpError {
        code: ErrorCode(-32603),
        message: Cow::from(message),
        data: None,
    }
}

#[tool_router]
impl PokedexService {
    pub fn new(catalog: Arc<dyn CatalogApi>, bio: Arc<dyn BioService>) -> Self {
        Self {
            tool_router: Self::tool_router(),
            resolver: EvolutionResolver::new(Arc::clone(&catalog)),
            catalog,
            bio,
        }
    }

    #[tool(description = "Look up a Pokemon: types, abilities, base stats and Pokedex entry")]
    async fn lookup_pokemon(
        &self,
        Parameters(request): Parameters<PokemonNameRequest>,
    ) -> Result<CallToolResult, McpError> {
        let text = handle_lookup_pokemon_command(self.catalog.as_ref(), &request.name).await;
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    #[tool(description = "List random Pokemon from the catalog")]
    async fn random_pokemon(
        &self,
        Parameters(request): Parameters<RandomPokemonRequest>,
    ) -> Result<CallToolResult, McpError> {
        let count = request.count.unwrap_or(5).clamp(1, MAX_RANDOM);
        match self.catalog.get_random_records(count).await {
            Ok(records) => {
                let text = display_list(&records, |_| false);
                Ok(CallToolResult::success(vec![Content::text(text)]))
            }
            Err(e) => Err(internal_error(format!("Error loading random Pokemon: {}", e))),
        }
    }

    #[tool(description = "Show the evolution line of a Pokemon, first form first")]
    async fn get_evolutions(
        &self,
        Parameters(request): Parameters<PokemonNameRequest>,
    ) -> Result<CallToolResult, McpError> {
        let text = handle_evolutions_command(&self.resolver, &request.name).await;
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    #[tool(description = "Generate a short creative biography for a Pokemon")]
    async fn generate_bio(
        &self,
        Parameters(request): Parameters<PokemonNameRequest>,
    ) -> Result<CallToolResult, McpError> {
        let record = match self.catalog.get_record(&request.name).await {
            Ok(record) => record,
            Err(e) if e.is_not_found() => {
                let text = format!("Pokemon '{}' not found.", request.name);
                return Ok(CallToolResult::success(vec![Content::text(text)]));
            }
            Err(e) => return Err(internal_error(format!("Error looking up Pokemon: {}", e))),
        };

        match self.bio.create_bio(&record).await {
            Ok(bio) if !bio.trim().is_empty() => {
                Ok(CallToolResult::success(vec![Content::text(bio)]))
            }
            Ok(_) => Err(internal_error("The biography service returned no text".to_string())),
            Err(e) => Err(internal_error(format!("Error generating biography: {}", e))),
        }
    }
}

#[tool_handler]
impl ServerHandler for PokedexService {}

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries the MCP protocol; logs go to stderr.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();

    let config_path = std::env::args_os().nth(1).map(std::path::PathBuf::from);
    let config = AppConfig::load(config_path.as_deref()).context("loading configuration")?;

    let client = reqwest::Client::builder()
        .build()
        .context("building HTTP client")?;
    let catalog = Arc::new(HttpCatalog::with_client(
        client.clone(),
        config.catalog_url.clone(),
        config.catalog_limit,
    ));
    let bio = Arc::new(HttpBioClient::new(client, config.bio.clone()));

    log::info!("Starting Pokedex MCP server against {}", catalog.base_url());
    let service = PokedexService::new(catalog, bio);
    let server = service.serve((stdin(), stdout())).await?;

    let quit_reason = server.waiting().await?;
    log::info!("Pokedex MCP server exiting: {:?}", quit_reason);
    Ok(())
}
