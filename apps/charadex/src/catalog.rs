//! # Catalog
//!
//! Where character records come from, and the list/detail operations built
//! on top of the core filter engine.
//!
//! Two sources answer the same three list query shapes:
//! - [`CharacterSource::Remote`]: the GraphQL catalog over HTTP
//! - [`CharacterSource::Snapshot`]: a JSON array of records on disk, for
//!   offline use and tests
//!
//! The starred view is served from the favorites store itself, which holds
//! full records; every other view is fetched and then filtered locally.

use crate::client::{CatalogClient, FetchError};
use crate::error::AppError;
use charadex_core::{
    Character, CharacterId, CharacterPage, CharadexError, FavoritesStore, FilterSelection,
    PageInfo, RelationFilter, RemoteQuery,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Page size used when paging through a snapshot, matching the remote catalog.
pub const SNAPSHOT_PAGE_SIZE: usize = 20;

// =============================================================================
// SNAPSHOT SOURCE
// =============================================================================

/// An in-memory record set loaded from a JSON file.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    records: Vec<Character>,
}

impl Snapshot {
    #[must_use]
    pub fn new(records: Vec<Character>) -> Self {
        Self { records }
    }

    /// Load a JSON array of character records.
    pub fn load(path: &Path) -> Result<Self, CharadexError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| CharadexError::IoError(format!("{}: {}", path.display(), e)))?;
        let records: Vec<Character> = serde_json::from_str(&text)
            .map_err(|e| CharadexError::DeserializationError(e.to_string()))?;
        tracing::info!(path = %path.display(), records = records.len(), "snapshot loaded");
        Ok(Self { records })
    }

    fn matches(character: &Character, query: &RemoteQuery) -> bool {
        match query {
            RemoteQuery::All => true,
            RemoteQuery::ByName(name) => character
                .name
                .to_lowercase()
                .contains(&name.trim().to_lowercase()),
            RemoteQuery::BySpecies(species) => character.species_is(species),
        }
    }

    /// One page of matches. A page past the end is empty, like the catalog's
    /// "not found" answer.
    #[must_use]
    pub fn query(&self, query: &RemoteQuery, page: u32) -> CharacterPage {
        let matching: Vec<&Character> =
            self.records.iter().filter(|c| Self::matches(c, query)).collect();
        let count = matching.len();
        let pages = count.div_ceil(SNAPSHOT_PAGE_SIZE) as u32;
        let page = page.max(1);
        if page > pages {
            return CharacterPage::default();
        }

        let start = (page as usize - 1) * SNAPSHOT_PAGE_SIZE;
        let results = matching
            .into_iter()
            .skip(start)
            .take(SNAPSHOT_PAGE_SIZE)
            .cloned()
            .collect();
        CharacterPage {
            info: PageInfo {
                count: count as u32,
                pages,
                next: (page < pages).then_some(page + 1),
                prev: (page > 1).then(|| page - 1),
            },
            results,
        }
    }

    #[must_use]
    pub fn character(&self, id: CharacterId) -> Option<Character> {
        self.records.iter().find(|c| c.id == id).cloned()
    }
}

// =============================================================================
// SOURCE
// =============================================================================

#[derive(Debug)]
pub enum CharacterSource {
    Remote(CatalogClient),
    Snapshot(Snapshot),
}

impl CharacterSource {
    pub async fn characters(
        &self,
        query: &RemoteQuery,
        page: u32,
    ) -> Result<CharacterPage, FetchError> {
        match self {
            Self::Remote(client) => client.characters(query, page).await,
            Self::Snapshot(snapshot) => Ok(snapshot.query(query, page)),
        }
    }

    pub async fn character(&self, id: CharacterId) -> Result<Option<Character>, FetchError> {
        match self {
            Self::Remote(client) => client.character(id).await,
            Self::Snapshot(snapshot) => Ok(snapshot.character(id)),
        }
    }
}

// =============================================================================
// CATALOG
// =============================================================================

/// A filtered, sorted list ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Listing {
    pub info: PageInfo,
    pub characters: Vec<Character>,
}

impl Listing {
    /// Apply the local filter step to fetched candidates. `None` lists the
    /// starred records themselves.
    pub fn build(
        filters: &FilterSelection,
        fetched: Option<CharacterPage>,
        favorites: &FavoritesStore,
    ) -> Self {
        let Some(fetched) = fetched else {
            let characters = filters.apply(favorites.starred(), favorites);
            let info = CharacterPage::single(characters.clone()).info;
            return Self { info, characters };
        };
        let characters = filters.apply(&fetched.results, favorites);
        tracing::debug!(
            fetched = fetched.results.len(),
            visible = characters.len(),
            "list computed"
        );
        Self {
            info: fetched.info,
            characters,
        }
    }
}

#[derive(Debug)]
pub struct Catalog {
    source: CharacterSource,
    max_pages: u32,
}

impl Catalog {
    #[must_use]
    pub fn new(source: CharacterSource, max_pages: u32) -> Self {
        Self {
            source,
            max_pages: max_pages.max(1),
        }
    }

    /// Fetch `page` and follow `info.next` for up to `max_pages` pages.
    ///
    /// The returned info is the first page's, with `next` pointing past the
    /// last page actually fetched.
    pub async fn fetch(&self, query: &RemoteQuery, page: u32) -> Result<CharacterPage, FetchError> {
        let mut combined = self.source.characters(query, page).await?;
        let mut fetched = 1;
        while fetched < self.max_pages {
            let Some(next) = combined.info.next else {
                break;
            };
            let more = self.source.characters(query, next).await?;
            combined.results.extend(more.results);
            combined.info.next = more.info.next;
            fetched += 1;
        }
        Ok(combined)
    }

    /// The remote page a selection is filtered from, or `None` when the
    /// selection is answered from the favorites store alone.
    ///
    /// Needs no favorites access, so callers sharing a store can fetch first
    /// and lock only for [`Listing::build`].
    pub async fn candidates(
        &self,
        filters: &FilterSelection,
        page: u32,
    ) -> Result<Option<CharacterPage>, FetchError> {
        if filters.relation == RelationFilter::Starred {
            return Ok(None);
        }
        let query = filters.remote_query();
        self.fetch(&query, page).await.map(Some)
    }

    /// The visible list for a selection.
    pub async fn list(
        &self,
        filters: &FilterSelection,
        page: u32,
        favorites: &FavoritesStore,
    ) -> Result<Listing, FetchError> {
        let fetched = self.candidates(filters, page).await?;
        Ok(Listing::build(filters, fetched, favorites))
    }

    /// Exact, case-insensitive name lookup through a name search.
    pub async fn find_by_name(&self, name: &str) -> Result<Character, AppError> {
        let wanted = name.trim();
        if wanted.is_empty() {
            return Err(CharadexError::CharacterNotFound(name.to_string()).into());
        }
        let lowered = wanted.to_lowercase();
        let page = self
            .fetch(&RemoteQuery::ByName(wanted.to_string()), 1)
            .await?;
        page.results
            .into_iter()
            .find(|c| c.name.to_lowercase() == lowered)
            .ok_or_else(|| CharadexError::CharacterNotFound(wanted.to_string()).into())
    }

    pub async fn by_id(&self, id: CharacterId) -> Result<Character, AppError> {
        self.source
            .character(id)
            .await?
            .ok_or_else(|| CharadexError::CharacterNotFound(id.to_string()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use charadex_core::{Gender, SortOrder, SpeciesFilter};

    fn rick_and_co() -> Snapshot {
        Snapshot::new(vec![
            Character::new(1, "Rick Sanchez", "Human").with_gender(Gender::Male),
            Character::new(2, "Morty Smith", "Human").with_gender(Gender::Male),
            Character::new(3, "Summer Smith", "Human").with_gender(Gender::Female),
            Character::new(4, "Birdperson", "Alien").with_gender(Gender::Male),
            Character::new(5, "Mr. Poopybutthole", "Poopybutthole"),
        ])
    }

    fn many(count: u64) -> Snapshot {
        Snapshot::new(
            (1..=count)
                .map(|i| Character::new(i, format!("Clone {i:03}"), "Human"))
                .collect(),
        )
    }

    #[test]
    fn snapshot_name_query_is_contains() {
        let page = rick_and_co().query(&RemoteQuery::ByName("smith".to_string()), 1);
        let names: Vec<&str> = page.results.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Morty Smith", "Summer Smith"]);
        assert_eq!(page.info.count, 2);
        assert_eq!(page.info.next, None);
    }

    #[test]
    fn snapshot_species_query_is_case_insensitive() {
        let page = rick_and_co().query(&RemoteQuery::BySpecies("human".to_string()), 1);
        assert_eq!(page.results.len(), 3);
    }

    #[test]
    fn snapshot_pages_by_twenty() {
        let snapshot = many(45);
        let first = snapshot.query(&RemoteQuery::All, 1);
        assert_eq!(first.results.len(), 20);
        assert_eq!(first.info.pages, 3);
        assert_eq!(first.info.next, Some(2));
        assert_eq!(first.info.prev, None);

        let last = snapshot.query(&RemoteQuery::All, 3);
        assert_eq!(last.results.len(), 5);
        assert_eq!(last.info.next, None);
        assert_eq!(last.info.prev, Some(2));

        assert_eq!(snapshot.query(&RemoteQuery::All, 4), CharacterPage::default());
    }

    #[tokio::test]
    async fn fetch_follows_next_up_to_max_pages() {
        let catalog = Catalog::new(CharacterSource::Snapshot(many(45)), 2);
        let page = catalog.fetch(&RemoteQuery::All, 1).await.expect("fetch");
        assert_eq!(page.results.len(), 40);
        assert_eq!(page.info.next, Some(3));

        let single = Catalog::new(CharacterSource::Snapshot(many(45)), 1);
        let page = single.fetch(&RemoteQuery::All, 1).await.expect("fetch");
        assert_eq!(page.results.len(), 20);
    }

    #[tokio::test]
    async fn list_excludes_starred_by_default() {
        let catalog = Catalog::new(CharacterSource::Snapshot(rick_and_co()), 1);
        let mut favorites = FavoritesStore::new();
        favorites
            .add(Character::new(1, "Rick Sanchez", "Human"))
            .expect("add");

        let listing = catalog
            .list(&FilterSelection::default(), 1, &favorites)
            .await
            .expect("list");
        assert!(listing.characters.iter().all(|c| c.id != CharacterId(1)));
        assert_eq!(listing.characters.len(), 4);
    }

    #[tokio::test]
    async fn starred_view_reads_from_store() {
        let catalog = Catalog::new(CharacterSource::Snapshot(Snapshot::default()), 1);
        let mut favorites = FavoritesStore::new();
        favorites
            .add(Character::new(7, "Squanchy", "Cat-Person"))
            .expect("add");
        favorites
            .add(Character::new(8, "Abradolf Lincler", "Human"))
            .expect("add");

        let filters = FilterSelection {
            relation: RelationFilter::Starred,
            sort: SortOrder::Asc,
            ..FilterSelection::default()
        };
        let listing = catalog.list(&filters, 1, &favorites).await.expect("list");
        let names: Vec<&str> = listing.characters.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Abradolf Lincler", "Squanchy"]);
        assert_eq!(listing.info.count, 2);
    }

    #[tokio::test]
    async fn starred_view_needs_no_fetch() {
        let catalog = Catalog::new(CharacterSource::Snapshot(rick_and_co()), 1);
        let starred = FilterSelection {
            relation: RelationFilter::Starred,
            ..FilterSelection::default()
        };
        let none = catalog.candidates(&starred, 1).await.expect("candidates");
        assert!(none.is_none());

        let fetched = catalog
            .candidates(&FilterSelection::default(), 1)
            .await
            .expect("candidates")
            .expect("remote page");
        let mut favorites = FavoritesStore::new();
        favorites
            .add(Character::new(1, "Rick Sanchez", "Human"))
            .expect("add");
        let listing = Listing::build(&FilterSelection::default(), Some(fetched), &favorites);
        assert!(listing.characters.iter().all(|c| c.id != CharacterId(1)));
    }

    #[tokio::test]
    async fn alien_filter_applies_locally() {
        let catalog = Catalog::new(CharacterSource::Snapshot(rick_and_co()), 1);
        let filters = FilterSelection {
            relation: RelationFilter::All,
            species: SpeciesFilter::Alien,
            ..FilterSelection::default()
        };
        let listing = catalog
            .list(&filters, 1, &FavoritesStore::new())
            .await
            .expect("list");
        let names: Vec<&str> = listing.characters.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Birdperson", "Mr. Poopybutthole"]);
    }

    #[tokio::test]
    async fn find_by_name_is_exact() {
        let catalog = Catalog::new(CharacterSource::Snapshot(rick_and_co()), 1);
        let found = catalog.find_by_name("morty smith").await.expect("found");
        assert_eq!(found.id, CharacterId(2));

        let partial = catalog.find_by_name("Morty").await;
        assert!(partial.is_err_and(|e| e.is_not_found()));
    }

    #[tokio::test]
    async fn by_id_missing_is_not_found() {
        let catalog = Catalog::new(CharacterSource::Snapshot(rick_and_co()), 1);
        assert_eq!(catalog.by_id(CharacterId(4)).await.expect("found").name, "Birdperson");
        assert!(catalog.by_id(CharacterId(99)).await.is_err_and(|e| e.is_not_found()));
    }
}
