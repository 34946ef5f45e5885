//! # Core Type Definitions
//!
//! This module contains the record types shared by every layer:
//! - Character identifiers and records (`CharacterId`, `Character`)
//! - Closed vocabularies reported by the catalog (`Status`, `Gender`)
//! - Pagination metadata (`PageInfo`, `CharacterPage`)
//! - Error types (`CharadexError`)
//!
//! ## Case Handling
//!
//! The catalog spells its vocabularies inconsistently ("Alive", "unknown").
//! Parsing is case-insensitive and anything unrecognised maps to `Unknown`;
//! serialization always emits the catalog's canonical spelling.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Stable identifier of a character in the remote catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CharacterId(pub u64);

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CharacterId {
    type Err = CharadexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(Self)
            .map_err(|_| CharadexError::InvalidParam {
                key: "id".to_string(),
                value: s.to_string(),
            })
    }
}

// =============================================================================
// VOCABULARIES
// =============================================================================

/// Life status of a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Status {
    Alive,
    Dead,
    #[default]
    Unknown,
}

impl Status {
    /// Canonical catalog spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Alive => "Alive",
            Self::Dead => "Dead",
            Self::Unknown => "unknown",
        }
    }
}

impl From<String> for Status {
    fn from(raw: String) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "alive" => Self::Alive,
            "dead" => Self::Dead,
            _ => Self::Unknown,
        }
    }
}

impl From<Status> for String {
    fn from(status: Status) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Gender of a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Gender {
    Male,
    Female,
    Genderless,
    #[default]
    Unknown,
}

impl Gender {
    /// Canonical catalog spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
            Self::Genderless => "Genderless",
            Self::Unknown => "unknown",
        }
    }
}

impl From<String> for Gender {
    fn from(raw: String) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "male" => Self::Male,
            "female" => Self::Female,
            "genderless" => Self::Genderless,
            _ => Self::Unknown,
        }
    }
}

impl From<Gender> for String {
    fn from(gender: Gender) -> Self {
        gender.as_str().to_string()
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// CHARACTER
// =============================================================================

/// A character record as returned by the catalog.
///
/// Records are immutable once fetched. The favorites store keeps full copies
/// so starred characters can be listed without a network round trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub id: CharacterId,
    pub name: String,
    pub image: String,
    pub species: String,
    pub status: Status,
    pub gender: Gender,
    /// Sub-species or variant, often empty.
    #[serde(rename = "type", default)]
    pub kind: String,
    /// ISO-8601 creation timestamp as reported by the catalog.
    pub created: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub episode_count: u32,
}

impl Character {
    /// Create a record with only the fields the filters look at.
    ///
    /// Everything else is left empty or `Unknown`.
    #[must_use]
    pub fn new(id: u64, name: impl Into<String>, species: impl Into<String>) -> Self {
        Self {
            id: CharacterId(id),
            name: name.into(),
            image: String::new(),
            species: species.into(),
            status: Status::Unknown,
            gender: Gender::Unknown,
            kind: String::new(),
            created: String::new(),
            origin: None,
            location: None,
            episode_count: 0,
        }
    }

    #[must_use]
    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = gender;
        self
    }

    #[must_use]
    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    /// Case-insensitive species equality.
    #[must_use]
    pub fn species_is(&self, species: &str) -> bool {
        self.species.eq_ignore_ascii_case(species)
    }
}

// =============================================================================
// PAGINATION
// =============================================================================

/// Pagination metadata attached to every list query.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PageInfo {
    pub count: u32,
    pub pages: u32,
    pub next: Option<u32>,
    pub prev: Option<u32>,
}

/// One page of list results.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CharacterPage {
    pub info: PageInfo,
    pub results: Vec<Character>,
}

impl CharacterPage {
    /// A single page holding every given record.
    #[must_use]
    pub fn single(results: Vec<Character>) -> Self {
        Self {
            info: PageInfo {
                count: results.len() as u32,
                pages: u32::from(!results.is_empty()),
                next: None,
                prev: None,
            },
            results,
        }
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the Charadex core.
///
/// - No silent failures
/// - Use `Result<T, CharadexError>` for fallible operations
/// - The core never panics; storage failures are reported, not swallowed
#[derive(Debug, Error)]
pub enum CharadexError {
    /// No character matched an exact-name lookup.
    #[error("Character not found: {0}")]
    CharacterNotFound(String),

    /// A comment was attached to a character that is not starred.
    #[error("Character {0} is not starred")]
    NotStarred(CharacterId),

    /// A URL or CLI parameter could not be interpreted.
    #[error("Invalid value for '{key}': {value}")]
    InvalidParam { key: String, value: String },

    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// A deserialization error occurred.
    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),
}

// =============================================================================
// TESTS
// =============================================================================
