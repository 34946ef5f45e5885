//! # Field Accessors
//!
//! Enumerated, display-oriented access to character fields.
//!
//! Detail views iterate `CharacterField::DETAIL` instead of reading fields by
//! name, so the set of displayable fields is closed and checked at compile
//! time. Empty free-text fields read as `None` and are skipped by renderers.

use crate::Character;

/// A displayable field of a [`Character`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharacterField {
    Id,
    Name,
    Species,
    Status,
    Gender,
    Kind,
    Origin,
    Location,
    Episodes,
    Created,
    Image,
}

impl CharacterField {
    /// Fields shown in a detail view, in display order.
    pub const DETAIL: [Self; 10] = [
        Self::Name,
        Self::Species,
        Self::Status,
        Self::Gender,
        Self::Kind,
        Self::Origin,
        Self::Location,
        Self::Episodes,
        Self::Created,
        Self::Image,
    ];

    /// Fields shown in one-line list rows.
    pub const ROW: [Self; 4] = [Self::Id, Self::Name, Self::Species, Self::Gender];

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Id => "ID",
            Self::Name => "Name",
            Self::Species => "Species",
            Self::Status => "Status",
            Self::Gender => "Gender",
            Self::Kind => "Type",
            Self::Origin => "Origin",
            Self::Location => "Location",
            Self::Episodes => "Episodes",
            Self::Created => "Created",
            Self::Image => "Image",
        }
    }

    /// Read this field off a character as display text.
    ///
    /// Returns `None` for empty or absent values.
    #[must_use]
    pub fn value(self, character: &Character) -> Option<String> {
        let raw = match self {
            Self::Id => character.id.to_string(),
            Self::Name => character.name.clone(),
            Self::Species => character.species.clone(),
            Self::Status => character.status.to_string(),
            Self::Gender => character.gender.to_string(),
            Self::Kind => character.kind.clone(),
            Self::Origin => character.origin.clone().unwrap_or_default(),
            Self::Location => character.location.clone().unwrap_or_default(),
            Self::Episodes => character.episode_count.to_string(),
            Self::Created => character.created.clone(),
            Self::Image => character.image.clone(),
        };
        if raw.trim().is_empty() { None } else { Some(raw) }
    }
}
