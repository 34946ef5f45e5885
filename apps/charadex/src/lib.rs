//! # charadex
//!
//! The Charadex application crate - THE BINARY'S LIBRARY.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    apps/charadex (THE BINARY)                   │
//! │                                                                 │
//! │  ┌─────────────┐    ┌──────────────┐    ┌──────────────────┐    │
//! │  │   CLI       │    │   HTTP API   │    │  Browse session  │    │
//! │  │  (clap)     │    │   (axum)     │    │  (tokio stdin)   │    │
//! │  └──────┬──────┘    └──────┬───────┘    └────────┬─────────┘    │
//! │         └──────────────────┼─────────────────────┘              │
//! │                            ▼                                    │
//! │            ┌──────────────────────────────┐                     │
//! │            │  catalog  ──►  client        │                     │
//! │            │  (source)      (reqwest)     │                     │
//! │            └──────────────┬───────────────┘                     │
//! │                           ▼                                     │
//! │                   ┌───────────────┐                             │
//! │                   │ charadex-core │                             │
//! │                   │  (THE LOGIC)  │                             │
//! │                   └───────────────┘                             │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Modules are public so the integration tests can drive the router and
//! the catalog directly.

pub mod api;
pub mod catalog;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;

pub use catalog::{Catalog, CharacterSource, Listing, Snapshot};
pub use client::{CatalogClient, FetchError};
pub use config::AppConfig;
pub use error::AppError;
