//! # Catalog HTTP Client
//!
//! Wrapper around the remote GraphQL character catalog.
//!
//! Every network or parsing failure collapses into one [`FetchError`] whose
//! user-facing message is fixed; the underlying cause is logged and kept in
//! [`FetchError::detail`] for diagnostics. There is no retry.

pub mod cache;
pub mod queries;

use cache::{QueryCache, QueryKey};
use charadex_core::{Character, CharacterId, CharacterPage, RemoteQuery};
use queries::{CHARACTER_QUERY, CHARACTERS_QUERY, CharacterData, CharactersData, GraphQlResponse};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::time::Duration;
use thiserror::Error;

/// The only message a fetch failure ever shows to the user.
pub const FETCH_ERROR_MESSAGE: &str = "Something went wrong while fetching characters";

/// Generic fetch failure.
#[derive(Debug, Error)]
#[error("{}", FETCH_ERROR_MESSAGE)]
pub struct FetchError {
    detail: String,
}

impl FetchError {
    pub fn new(detail: impl Into<String>) -> Self {
        let detail = detail.into();
        tracing::warn!(%detail, "catalog fetch failed");
        Self { detail }
    }

    /// Underlying cause, for logs only.
    #[must_use]
    pub fn detail(&self) -> &str {
        &self.detail
    }
}

/// HTTP client for the GraphQL catalog.
#[derive(Debug)]
pub struct CatalogClient {
    http: reqwest::Client,
    endpoint: String,
    cache: QueryCache,
}

impl CatalogClient {
    /// Create a new client pointing at the given GraphQL endpoint.
    pub fn new(
        endpoint: impl Into<String>,
        timeout: Duration,
        cache_ttl: Duration,
    ) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("charadex/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::new(format!("client build failed: {e}")))?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
            cache: QueryCache::new(cache_ttl),
        })
    }

    /// POST a GraphQL document and decode `data`.
    ///
    /// Returns `Ok(None)` when the catalog answers with its "404" error,
    /// which is how it reports an empty result.
    async fn post<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Value,
    ) -> Result<Option<T>, FetchError> {
        let body = json!({ "query": query, "variables": variables });
        let resp = self
            .http
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| FetchError::new(format!("{}: {e}", self.endpoint)))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(FetchError::new(format!("HTTP {}: {text}", status.as_u16())));
        }

        let envelope: GraphQlResponse<T> = resp
            .json()
            .await
            .map_err(|e| FetchError::new(format!("invalid response body: {e}")))?;

        if let Some(first) = envelope.errors.first() {
            if envelope.errors.iter().all(|e| e.is_not_found()) {
                return Ok(None);
            }
            return Err(FetchError::new(format!("GraphQL error: {}", first.message)));
        }
        envelope
            .data
            .map(Some)
            .ok_or_else(|| FetchError::new("response carried neither data nor errors"))
    }

    /// One page of a list query, dispatched to its named shape.
    pub async fn characters(
        &self,
        query: &RemoteQuery,
        page: u32,
    ) -> Result<CharacterPage, FetchError> {
        match query {
            RemoteQuery::All => self.fetch_all(page).await,
            RemoteQuery::ByName(name) => self.search_by_name(name, page).await,
            RemoteQuery::BySpecies(species) => self.fetch_by_species(species, page).await,
        }
    }

    /// All characters, unfiltered.
    pub async fn fetch_all(&self, page: u32) -> Result<CharacterPage, FetchError> {
        self.cached_page(RemoteQuery::All, page).await
    }

    /// Server-side name search ("contains" semantics).
    pub async fn search_by_name(&self, name: &str, page: u32) -> Result<CharacterPage, FetchError> {
        self.cached_page(RemoteQuery::ByName(name.to_string()), page).await
    }

    /// Server-side species filter.
    pub async fn fetch_by_species(
        &self,
        species: &str,
        page: u32,
    ) -> Result<CharacterPage, FetchError> {
        self.cached_page(RemoteQuery::BySpecies(species.to_string()), page)
            .await
    }

    /// Serve from cache when fresh, otherwise fetch and remember.
    async fn cached_page(
        &self,
        query: RemoteQuery,
        page: u32,
    ) -> Result<CharacterPage, FetchError> {
        let key = QueryKey { query, page };
        if let Some(hit) = self.cache.get(&key) {
            tracing::debug!(query = ?key.query, page, "query cache hit");
            return Ok(hit);
        }

        tracing::debug!(
            query = ?key.query,
            page,
            endpoint = %self.endpoint,
            "fetching characters"
        );
        let variables = queries::list_variables(&key.query, page);
        let data: Option<CharactersData> = self.post(CHARACTERS_QUERY, variables).await?;
        let result = match data.and_then(|d| d.characters) {
            Some(raw) => raw.into_page().map_err(FetchError::new)?,
            None => CharacterPage::default(),
        };

        self.cache.insert(key, result.clone());
        Ok(result)
    }

    /// A single record by id, `None` if the catalog has no such id.
    pub async fn character(&self, id: CharacterId) -> Result<Option<Character>, FetchError> {
        let data: Option<CharacterData> = self
            .post(CHARACTER_QUERY, json!({ "id": id.to_string() }))
            .await?;
        data.and_then(|d| d.character)
            .map(|raw| raw.into_character().map_err(FetchError::new))
            .transpose()
    }
}
