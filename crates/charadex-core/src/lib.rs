//! # charadex-core
//!
//! The catalog logic for Charadex - THE LOGIC.
//!
//! This crate owns everything that can be decided without a network:
//! - Character records and vocabularies (`types`, `field`)
//! - The multi-facet filter/sort engine (`filter`)
//! - Applied vs. draft filter state and the selected character (`view`)
//! - Starred characters and comments with durable backends (`favorites`, `storage`)
//! - Query-string view state (`url_state`)
//! - Anchored popover geometry (`popover`)
//!
//! ## Architectural Constraints
//!
//! - Has NO async, NO network dependencies (pure Rust)
//! - Filters are pure and recomputed from scratch on every call
//! - State is held in explicit owned stores, never in globals

// =============================================================================
// MODULES
// =============================================================================

pub mod favorites;
pub mod field;
pub mod filter;
pub mod popover;
pub mod storage;
pub mod types;
pub mod url_state;
pub mod view;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{Character, CharacterId, CharacterPage, CharadexError, Gender, PageInfo, Status};

// =============================================================================
// RE-EXPORTS: Engine & Stores
// =============================================================================

pub use favorites::{FavoritesEvent, FavoritesStore};
pub use field::CharacterField;
pub use filter::{
    Facet, FilterSelection, GenderFilter, RelationFilter, RemoteQuery, SortOrder, SpeciesFilter,
    StarredIds, name_has_prefix, sort_by_name,
};
pub use popover::{Align, Point, Popover, PopoverOptions, Rect, Side, Size, compute_position};
pub use storage::{KeyValueStore, StorageBackend};
pub use url_state::{QueryParams, UrlBinding, UrlParam, UrlState};
pub use view::{FilterPanel, ViewState};
