// Pokedex Gallery Schema - Shared catalog type definitions
// This crate mirrors the fixed JSON contract of the external catalog API so the
// client, the MCP server and the tests all decode the same shapes.

// Re-export the main types
pub use pokemon::*;
pub use pokemon_types::*;
pub use species_data::*;
pub use stats::*;

pub mod pokemon;
pub mod pokemon_types;
pub mod species_data;
pub mod stats;
