//! # Charadex CLI Module
//!
//! This module implements the CLI interface for Charadex.
//!
//! ## Available Commands
//!
//! - `list` - List characters for a view (default command)
//! - `search` - List characters whose name starts with some text
//! - `species` - List characters of the human or alien species group
//! - `show` - Detail view for an exact character name
//! - `star` / `unstar` / `toggle` - Edit the favorite set
//! - `comment` / `uncomment` - Edit a starred character's comment
//! - `favorites` - List starred characters with their comments
//! - `link` - Print the shareable query string for a view
//! - `browse` - Interactive session
//! - `serve` - Start the HTTP API server
//!
//! Every view command accepts `--url <query>` to restore a shared view;
//! explicit facet flags override what the query string says.

mod browse;
mod commands;
mod render;

use crate::config::AppConfig;
use crate::error::AppError;
use charadex_core::{
    CharacterId, GenderFilter, RelationFilter, SortOrder, SpeciesFilter, UrlState,
};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Charadex - browse, filter and star characters from a GraphQL catalog.
#[derive(Parser, Debug)]
#[command(name = "charadex")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Suppress confirmation messages
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to a TOML config file (default: ./charadex.toml if present)
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to the favorites store
    #[arg(short = 'S', long, global = true)]
    pub store: Option<PathBuf>,

    /// Storage backend: "file" (JSON document), "redb" (ACID database) or "memory"
    #[arg(short = 'B', long, global = true)]
    pub backend: Option<String>,

    /// GraphQL endpoint
    #[arg(short = 'E', long, global = true)]
    pub endpoint: Option<String>,

    /// Serve records from a JSON file instead of the remote catalog
    #[arg(long, global = true)]
    pub snapshot: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Facet flags shared by every view command.
#[derive(Args, Debug, Clone, Default)]
pub struct ViewArgs {
    /// Restore a view from a shared query string
    #[arg(long)]
    pub url: Option<String>,

    /// Relation to the favorite set (all, starred, others)
    #[arg(short = 'r', long)]
    pub relation: Option<RelationFilter>,

    /// Species group (all, human, alien)
    #[arg(short = 's', long)]
    pub species: Option<SpeciesFilter>,

    /// Gender (all, male, female, genderless, unknown)
    #[arg(short = 'g', long)]
    pub gender: Option<GenderFilter>,

    /// Name prefix
    #[arg(long)]
    pub search: Option<String>,

    /// Name order (asc, desc)
    #[arg(long)]
    pub sort: Option<SortOrder>,

    /// First page to fetch
    #[arg(short = 'p', long)]
    pub page: Option<u32>,

    /// Open a character's detail by exact name
    #[arg(short = 'o', long)]
    pub open: Option<String>,
}

impl ViewArgs {
    /// The view these flags describe: `--url` first, flags on top.
    #[must_use]
    pub fn url_state(&self) -> UrlState {
        let mut state = UrlState::from_query(self.url.as_deref().unwrap_or(""));
        let mut filters = state.filters();
        if let Some(relation) = self.relation {
            filters.relation = relation;
        }
        if let Some(species) = self.species {
            filters.species = species;
        }
        if let Some(gender) = self.gender {
            filters.gender = gender;
        }
        if let Some(search) = &self.search {
            filters.search = search.trim().to_string();
        }
        if let Some(sort) = self.sort {
            filters.sort = sort;
        }
        state.set_filters(&filters);
        if let Some(page) = self.page {
            state.set_page(Some(page));
        }
        if let Some(name) = &self.open {
            state.select(Some(name));
        }
        state
    }
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List characters for a view
    List(ViewArgs),

    /// List characters whose name starts with TEXT
    Search {
        text: String,

        #[command(flatten)]
        view: ViewArgs,
    },

    /// List characters of a species group
    Species {
        /// human or alien
        group: SpeciesFilter,

        #[command(flatten)]
        view: ViewArgs,
    },

    /// Show one character by exact name
    Show { name: String },

    /// Star a character by id
    Star { id: CharacterId },

    /// Unstar a character, deleting its comment
    Unstar { id: CharacterId },

    /// Star if not starred, unstar otherwise
    Toggle { id: CharacterId },

    /// Save a comment on a starred character (blank text deletes it)
    Comment {
        id: CharacterId,

        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Delete a starred character's comment
    Uncomment { id: CharacterId },

    /// List starred characters with their comments
    Favorites(ViewArgs),

    /// Print the shareable query string for a view
    Link(ViewArgs),

    /// Interactive browse session
    Browse(ViewArgs),

    /// Start HTTP server
    Serve {
        /// Host to bind to (default from config)
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to (default from config)
        #[arg(short = 'P', long)]
        port: Option<u16>,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

impl Cli {
    /// Resolve configuration: file, then environment, then these flags.
    pub fn context(&self) -> Result<Context, AppError> {
        let mut config = AppConfig::load(self.config.as_deref())?;
        if let Some(endpoint) = &self.endpoint {
            config.endpoint = endpoint.clone();
        }
        if let Some(store) = &self.store {
            config.store_path = store.clone();
        }
        if let Some(backend) = &self.backend {
            config.backend = backend.clone();
        }
        config.validate()?;
        Ok(Context {
            config,
            snapshot: self.snapshot.clone(),
            json_mode: self.json_mode,
            quiet: self.quiet,
        })
    }
}

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), AppError> {
    let ctx = cli.context()?;

    match cli.command {
        Some(Commands::List(view)) => cmd_list(&ctx, &view.url_state()).await,
        Some(Commands::Search { text, view }) => {
            let view = ViewArgs {
                search: Some(text),
                ..view
            };
            cmd_list(&ctx, &view.url_state()).await
        }
        Some(Commands::Species { group, view }) => {
            let view = ViewArgs {
                species: Some(group),
                ..view
            };
            cmd_list(&ctx, &view.url_state()).await
        }
        Some(Commands::Show { name }) => cmd_show(&ctx, &name).await,
        Some(Commands::Star { id }) => cmd_star(&ctx, id).await,
        Some(Commands::Unstar { id }) => cmd_unstar(&ctx, id),
        Some(Commands::Toggle { id }) => cmd_toggle(&ctx, id).await,
        Some(Commands::Comment { id, text }) => cmd_comment(&ctx, id, &text.join(" ")),
        Some(Commands::Uncomment { id }) => cmd_uncomment(&ctx, id),
        Some(Commands::Favorites(view)) => cmd_favorites(&ctx, &view.url_state()),
        Some(Commands::Link(view)) => cmd_link(&ctx, &view.url_state()),
        Some(Commands::Browse(view)) => browse::run(&ctx, view.url_state()).await,
        Some(Commands::Serve { host, port }) => {
            let host = host.unwrap_or_else(|| ctx.config.server.host.clone());
            let port = port.unwrap_or(ctx.config.server.port);
            cmd_serve(&ctx, &host, port).await
        }
        None => {
            // No subcommand - list the default view
            cmd_list(&ctx, &UrlState::default()).await
        }
    }
}
