//! API request and response types.

use serde::{Deserialize, Serialize};

/// Request to store a credential for the current session.
#[derive(Debug, Clone, Deserialize)]
pub struct SetKeyRequest {
    /// OpenAI API key
    pub api_key: String,
}

/// Whether the current session holds a credential.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionResponse {
    pub has_key: bool,
}

/// Request to generate a recipe.
#[derive(Debug, Clone, Deserialize)]
pub struct RecipeRequest {
    /// Free text, usually a city
    pub text: String,
}

/// Generated recipe, or an `Error: ...` string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeResponse {
    pub response: String,
}

/// Error body for rejected requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,
}
