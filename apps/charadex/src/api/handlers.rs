//! # API Endpoint Handlers
//!
//! This module implements the actual HTTP endpoint handlers.

use super::{
    AppState,
    types::{
        CharacterDetail, CharacterView, CharactersResponse, CommentRequest, CommentResponse,
        ErrorResponse, FavoriteEntry, FavoritesResponse, HealthResponse, StarRequest, StarResponse,
    },
};
use crate::catalog::Listing;
use crate::error::AppError;
use axum::{
    Json,
    extract::{Path, RawQuery, State},
    http::StatusCode,
    response::IntoResponse,
};
use charadex_core::{CharacterId, CharadexError, FavoritesStore, UrlState};

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;

/// Map an application error onto a status code and JSON body.
fn fail(error: impl Into<AppError>) -> (StatusCode, Json<ErrorResponse>) {
    let error = error.into();
    let status = match &error {
        AppError::Core(CharadexError::CharacterNotFound(_)) => StatusCode::NOT_FOUND,
        AppError::Core(CharadexError::NotStarred(_)) => StatusCode::CONFLICT,
        AppError::Core(CharadexError::InvalidParam { .. }) => StatusCode::BAD_REQUEST,
        AppError::Fetch(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        tracing::error!(%error, "request failed");
    }
    (status, Json(ErrorResponse::new(error.to_string())))
}

fn favorite_entry(store: &FavoritesStore, id: CharacterId) -> Option<FavoriteEntry> {
    store.get(id).map(|character| FavoriteEntry {
        character: character.clone(),
        comment: store.comment(id).map(str::to_string),
    })
}

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

// =============================================================================
// CHARACTER HANDLERS
// =============================================================================

/// List characters. The query string uses the same parameters as a
/// shareable link.
pub async fn characters_handler(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> ApiResult<CharactersResponse> {
    let url = UrlState::from_query(query.as_deref().unwrap_or(""));
    let filters = url.filters();
    let page = url.page();

    // Fetch before locking so a slow catalog never holds up store writers.
    let fetched = state
        .catalog
        .candidates(&filters, page)
        .await
        .map_err(fail)?;
    let favorites = state.favorites.read().await;
    let listing = Listing::build(&filters, fetched, &favorites);

    let characters = listing
        .characters
        .into_iter()
        .map(|character| CharacterView {
            starred: favorites.is_starred(character.id),
            character,
        })
        .collect();

    // Re-serialize so the link is canonical: defaults dropped, values normalized.
    let mut canonical = UrlState::default();
    canonical.set_filters(&filters);
    canonical.set_page(Some(page));
    canonical.select(url.selected().as_deref());

    Ok(Json(CharactersResponse {
        link: canonical.to_query_string(),
        filters,
        page,
        info: listing.info,
        characters,
    }))
}

/// Exact-name detail lookup.
pub async fn character_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<CharacterDetail> {
    let character = state.catalog.find_by_name(&name).await.map_err(fail)?;
    let favorites = state.favorites.read().await;
    Ok(Json(CharacterDetail {
        starred: favorites.is_starred(character.id),
        comment: favorites.comment(character.id).map(str::to_string),
        character,
    }))
}

// =============================================================================
// FAVORITES HANDLERS
// =============================================================================

/// Starred characters with their comments, filtered like `/characters`
/// but always over the favorite set.
pub async fn favorites_handler(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> impl IntoResponse {
    let mut filters = UrlState::from_query(query.as_deref().unwrap_or("")).filters();
    filters.relation = charadex_core::RelationFilter::Starred;

    let store = state.favorites.read().await;
    let favorites: Vec<FavoriteEntry> = filters
        .apply(store.starred(), &*store)
        .into_iter()
        .filter_map(|c| favorite_entry(&store, c.id))
        .collect();
    Json(FavoritesResponse {
        count: favorites.len(),
        favorites,
    })
}

/// Star a character by id, fetching its record from the catalog.
pub async fn star_handler(
    State(state): State<AppState>,
    Json(request): Json<StarRequest>,
) -> ApiResult<StarResponse> {
    let id = request.id;
    if state.favorites.read().await.is_starred(id) {
        return Ok(Json(StarResponse {
            id,
            starred: true,
            changed: false,
        }));
    }
    let character = state.catalog.by_id(id).await.map_err(fail)?;
    let changed = state.favorites.write().await.add(character).map_err(fail)?;
    tracing::info!(%id, "character starred");
    Ok(Json(StarResponse {
        id,
        starred: true,
        changed,
    }))
}

/// Unstar a character, deleting its comment.
pub async fn unstar_handler(
    State(state): State<AppState>,
    Path(id): Path<CharacterId>,
) -> ApiResult<StarResponse> {
    let changed = state.favorites.write().await.remove(id).map_err(fail)?;
    if changed {
        tracing::info!(%id, "character unstarred");
    }
    Ok(Json(StarResponse {
        id,
        starred: false,
        changed,
    }))
}

pub async fn toggle_handler(
    State(state): State<AppState>,
    Json(request): Json<StarRequest>,
) -> ApiResult<StarResponse> {
    let id = request.id;
    let known = state.favorites.read().await.get(id).cloned();
    let character = match known {
        Some(c) => c,
        None => state.catalog.by_id(id).await.map_err(fail)?,
    };
    let starred = state
        .favorites
        .write()
        .await
        .toggle(character)
        .map_err(fail)?;
    tracing::info!(%id, starred, "character toggled");
    Ok(Json(StarResponse {
        id,
        starred,
        changed: true,
    }))
}

/// Save a comment. Blank text deletes it.
pub async fn comment_handler(
    State(state): State<AppState>,
    Path(id): Path<CharacterId>,
    Json(request): Json<CommentRequest>,
) -> ApiResult<CommentResponse> {
    let comment = state
        .favorites
        .write()
        .await
        .set_comment(id, &request.text)
        .map_err(fail)?;
    Ok(Json(CommentResponse { id, comment }))
}

pub async fn delete_comment_handler(
    State(state): State<AppState>,
    Path(id): Path<CharacterId>,
) -> ApiResult<CommentResponse> {
    state
        .favorites
        .write()
        .await
        .delete_comment(id)
        .map_err(fail)?;
    Ok(Json(CommentResponse { id, comment: None }))
}
