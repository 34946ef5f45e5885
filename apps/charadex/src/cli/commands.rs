//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use super::render;
use crate::api::{self, FavoriteEntry};
use crate::catalog::{Catalog, CharacterSource, Snapshot};
use crate::client::CatalogClient;
use crate::config::AppConfig;
use crate::error::AppError;
use charadex_core::{
    Character, CharacterId, CharadexError, FavoritesStore, RelationFilter, StorageBackend,
    UrlState,
};
use serde::Serialize;
use std::path::PathBuf;

// =============================================================================
// CONTEXT
// =============================================================================

/// Resolved settings shared by every command.
#[derive(Debug, Clone)]
pub struct Context {
    pub config: AppConfig,
    /// Offline record file; replaces the remote catalog when set.
    pub snapshot: Option<PathBuf>,
    pub json_mode: bool,
    pub quiet: bool,
}

impl Context {
    /// Build the configured record source.
    pub fn catalog(&self) -> Result<Catalog, AppError> {
        let source = match &self.snapshot {
            Some(path) => CharacterSource::Snapshot(Snapshot::load(path)?),
            None => CharacterSource::Remote(CatalogClient::new(
                self.config.endpoint.clone(),
                self.config.request_timeout(),
                self.config.cache_ttl(),
            )?),
        };
        Ok(Catalog::new(source, self.config.max_pages))
    }

    /// Open the favorites store on the configured backend.
    pub fn favorites(&self) -> Result<FavoritesStore, AppError> {
        let backend = StorageBackend::open(&self.config.backend, &self.config.store_path)?;
        let store = FavoritesStore::open(backend)?;
        tracing::debug!(
            backend = %self.config.backend,
            path = %self.config.store_path.display(),
            starred = store.len(),
            "favorites loaded"
        );
        Ok(store)
    }

    /// Print `text`, or `value` as JSON in JSON mode.
    fn emit<T: Serialize>(&self, text: &str, value: &T) -> Result<(), AppError> {
        if self.json_mode {
            let json = serde_json::to_string_pretty(value)
                .map_err(|e| CharadexError::SerializationError(e.to_string()))?;
            println!("{}", json);
        } else {
            println!("{}", text);
        }
        Ok(())
    }

    /// Print `value` as JSON in JSON mode; nothing otherwise.
    fn report<T: Serialize>(&self, value: &T) -> Result<(), AppError> {
        if self.json_mode {
            self.emit("", value)?;
        }
        Ok(())
    }

    /// Print a confirmation line unless quiet. Silent in JSON mode.
    fn note(&self, text: &str) {
        if !self.quiet && !self.json_mode {
            println!("{}", text);
        }
    }
}

fn favorite_entry(store: &FavoritesStore, character: Character) -> FavoriteEntry {
    let comment = store.comment(character.id).map(str::to_string);
    FavoriteEntry { character, comment }
}

// =============================================================================
// LIST COMMANDS
// =============================================================================

/// List characters for a view, plus the selected character's detail if the
/// view names one.
pub async fn cmd_list(ctx: &Context, state: &UrlState) -> Result<(), AppError> {
    let catalog = ctx.catalog()?;
    let favorites = ctx.favorites()?;
    let filters = state.filters();

    let listing = catalog.list(&filters, state.page(), &favorites).await?;
    ctx.emit(&render::listing(&listing, &favorites), &listing)?;

    if let Some(name) = state.selected() {
        let character = catalog.find_by_name(&name).await?;
        let comment = favorites.comment(character.id);
        if !ctx.json_mode {
            println!();
        }
        ctx.emit(
            &render::character_detail(&character, comment),
            &favorite_entry(&favorites, character),
        )?;
    }
    Ok(())
}

/// Detail view for an exact name.
pub async fn cmd_show(ctx: &Context, name: &str) -> Result<(), AppError> {
    let catalog = ctx.catalog()?;
    let favorites = ctx.favorites()?;
    let character = catalog.find_by_name(name).await?;
    let text = render::character_detail(&character, favorites.comment(character.id));
    ctx.emit(&text, &favorite_entry(&favorites, character))
}

/// Starred characters with their comments, through the same filter engine.
pub fn cmd_favorites(ctx: &Context, state: &UrlState) -> Result<(), AppError> {
    let favorites = ctx.favorites()?;
    let mut filters = state.filters();
    filters.relation = RelationFilter::Starred;

    let visible = filters.apply(favorites.starred(), &favorites);
    let text = render::favorites(&visible, &favorites);
    let entries: Vec<FavoriteEntry> = visible
        .into_iter()
        .map(|c| favorite_entry(&favorites, c))
        .collect();
    ctx.emit(&text, &entries)
}

/// Print the shareable query string for a view.
pub fn cmd_link(ctx: &Context, state: &UrlState) -> Result<(), AppError> {
    let query = state.to_query_string();
    let text = if query.is_empty() {
        "(default view)".to_string()
    } else {
        query.clone()
    };
    ctx.emit(&text, &serde_json::json!({ "query": query }))
}

// =============================================================================
// FAVORITES COMMANDS
// =============================================================================

pub async fn cmd_star(ctx: &Context, id: CharacterId) -> Result<(), AppError> {
    let mut favorites = ctx.favorites()?;
    if favorites.is_starred(id) {
        ctx.note(&format!("Character {} is already starred", id));
        return ctx.report(&serde_json::json!({ "id": id, "starred": true }));
    }
    let character = ctx.catalog()?.by_id(id).await?;
    let name = character.name.clone();
    favorites.add(character)?;
    tracing::info!(%id, "character starred");
    ctx.note(&format!("Starred {} ({})", name, id));
    ctx.report(&serde_json::json!({ "id": id, "starred": true }))
}

pub fn cmd_unstar(ctx: &Context, id: CharacterId) -> Result<(), AppError> {
    let mut favorites = ctx.favorites()?;
    let removed = favorites.remove(id)?;
    if removed {
        tracing::info!(%id, "character unstarred");
        ctx.note(&format!("Unstarred {}", id));
    } else {
        ctx.note(&format!("Character {} was not starred", id));
    }
    ctx.report(&serde_json::json!({ "id": id, "starred": false, "changed": removed }))
}

pub async fn cmd_toggle(ctx: &Context, id: CharacterId) -> Result<(), AppError> {
    let mut favorites = ctx.favorites()?;
    let character = match favorites.get(id) {
        Some(c) => c.clone(),
        None => ctx.catalog()?.by_id(id).await?,
    };
    let starred = favorites.toggle(character)?;
    tracing::info!(%id, starred, "character toggled");
    ctx.note(&format!(
        "{} {}",
        if starred { "Starred" } else { "Unstarred" },
        id
    ));
    ctx.report(&serde_json::json!({ "id": id, "starred": starred }))
}

pub fn cmd_comment(ctx: &Context, id: CharacterId, text: &str) -> Result<(), AppError> {
    let mut favorites = ctx.favorites()?;
    let saved = favorites.set_comment(id, text)?;
    match &saved {
        Some(_) => ctx.note(&format!("Comment saved for {}", id)),
        None => ctx.note(&format!("Comment deleted for {}", id)),
    }
    ctx.report(&serde_json::json!({ "id": id, "comment": saved }))
}

pub fn cmd_uncomment(ctx: &Context, id: CharacterId) -> Result<(), AppError> {
    let mut favorites = ctx.favorites()?;
    let deleted = favorites.delete_comment(id)?;
    ctx.note(&if deleted {
        format!("Comment deleted for {}", id)
    } else {
        format!("No comment for {}", id)
    });
    ctx.report(&serde_json::json!({ "id": id, "deleted": deleted }))
}

// =============================================================================
// SERVER COMMAND
// =============================================================================

/// Start the HTTP server.
pub async fn cmd_serve(ctx: &Context, host: &str, port: u16) -> Result<(), AppError> {
    let catalog = ctx.catalog()?;
    let favorites = ctx.favorites()?;

    if !ctx.quiet {
        println!("Charadex API Server Starting...");
        println!();
        println!("Configuration:");
        println!("  Host:     {}", host);
        println!("  Port:     {}", port);
        println!("  Backend:  {}", ctx.config.backend);
        println!("  Store:    {}", ctx.config.store_path.display());
        match &ctx.snapshot {
            Some(path) => println!("  Source:   snapshot {}", path.display()),
            None => println!("  Source:   {}", ctx.config.endpoint),
        }
        println!();
        println!("Press Ctrl+C to stop");
        println!();
    }

    let addr = format!("{}:{}", host, port);
    api::run_server(&addr, catalog, favorites).await
}
