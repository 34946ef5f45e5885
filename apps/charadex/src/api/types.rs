//! # API Request/Response Types
//!
//! This module defines the JSON structures for the HTTP API.

use charadex_core::{Character, CharacterId, FilterSelection, PageInfo};
use serde::{Deserialize, Serialize};

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// ERROR RESPONSE
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

// =============================================================================
// CHARACTER RESPONSES
// =============================================================================

/// A record plus its relation to the favorite set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterView {
    #[serde(flatten)]
    pub character: Character,
    pub starred: bool,
}

/// `GET /characters` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharactersResponse {
    /// Canonical query string for this view, empty for the default view.
    pub link: String,
    pub filters: FilterSelection,
    pub page: u32,
    pub info: PageInfo,
    pub characters: Vec<CharacterView>,
}

/// `GET /characters/{name}` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterDetail {
    pub character: Character,
    pub starred: bool,
    pub comment: Option<String>,
}

// =============================================================================
// FAVORITES
// =============================================================================

/// A starred record with its comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteEntry {
    pub character: Character,
    pub comment: Option<String>,
}

/// `GET /favorites` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FavoritesResponse {
    pub count: usize,
    pub favorites: Vec<FavoriteEntry>,
}

/// Body of `POST /favorites` and `POST /favorites/toggle`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StarRequest {
    pub id: CharacterId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StarResponse {
    pub id: CharacterId,
    pub starred: bool,
    /// Whether the favorite set changed.
    pub changed: bool,
}

/// Body of `PUT /favorites/{id}/comment`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentRequest {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentResponse {
    pub id: CharacterId,
    /// The stored text; `None` once deleted.
    pub comment: Option<String>,
}
