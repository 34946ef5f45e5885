//! # GraphQL Documents & Wire Types
//!
//! Query text sent to the catalog and the raw response shapes it returns.
//! Raw records are converted into core [`Character`] values at this seam.

use charadex_core::{Character, CharacterId, CharacterPage, Gender, PageInfo, RemoteQuery, Status};
use serde::Deserialize;
use serde_json::{Value, json};

macro_rules! character_fields {
    () => {
        "fragment CharacterFields on Character { \
         id name image species status gender type created \
         origin { name } location { name } episode { id } }"
    };
}

/// List query covering all three list shapes: all, by name, by species.
pub const CHARACTERS_QUERY: &str = concat!(
    "query Characters($page: Int, $filter: FilterCharacter) { \
     characters(page: $page, filter: $filter) { \
     info { count pages next prev } \
     results { ...CharacterFields } } } ",
    character_fields!()
);

/// Single record by id.
pub const CHARACTER_QUERY: &str = concat!(
    "query Character($id: ID!) { character(id: $id) { ...CharacterFields } } ",
    character_fields!()
);

/// Variables for [`CHARACTERS_QUERY`].
#[must_use]
pub fn list_variables(query: &RemoteQuery, page: u32) -> Value {
    let filter = match query {
        RemoteQuery::All => json!({}),
        RemoteQuery::ByName(name) => json!({ "name": name }),
        RemoteQuery::BySpecies(species) => json!({ "species": species }),
    };
    json!({ "page": page, "filter": filter })
}

// =============================================================================
// RESPONSE ENVELOPE
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlError {
    pub message: String,
}

impl GraphQlError {
    /// The catalog reports an empty result set as a "404" error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.message.contains("404")
    }
}

#[derive(Debug, Deserialize)]
pub struct CharactersData {
    pub characters: Option<RawPage>,
}

#[derive(Debug, Deserialize)]
pub struct CharacterData {
    pub character: Option<RawCharacter>,
}

#[derive(Debug, Deserialize)]
pub struct RawPage {
    pub info: PageInfo,
    #[serde(default)]
    pub results: Vec<RawCharacter>,
}

#[derive(Debug, Deserialize)]
struct Named {
    name: String,
}

#[derive(Debug, Deserialize)]
struct EpisodeRef {}

#[derive(Debug, Deserialize)]
pub struct RawCharacter {
    id: String,
    name: String,
    #[serde(default)]
    image: String,
    #[serde(default)]
    species: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    gender: String,
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    created: String,
    origin: Option<Named>,
    location: Option<Named>,
    #[serde(default)]
    episode: Vec<EpisodeRef>,
}

impl RawCharacter {
    /// Convert to a core record. Fails only on a non-numeric id.
    pub fn into_character(self) -> Result<Character, String> {
        let id: CharacterId = self
            .id
            .parse()
            .map_err(|_| format!("non-numeric character id '{}'", self.id))?;
        let non_blank = |n: Option<Named>| n.map(|n| n.name).filter(|s| !s.trim().is_empty());
        Ok(Character {
            id,
            name: self.name,
            image: self.image,
            species: self.species,
            status: Status::from(self.status),
            gender: Gender::from(self.gender),
            kind: self.kind,
            created: self.created,
            origin: non_blank(self.origin),
            location: non_blank(self.location),
            episode_count: self.episode.len() as u32,
        })
    }
}

impl RawPage {
    pub fn into_page(self) -> Result<CharacterPage, String> {
        let results = self
            .results
            .into_iter()
            .map(RawCharacter::into_character)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(CharacterPage {
            info: self.info,
            results,
        })
    }
}
