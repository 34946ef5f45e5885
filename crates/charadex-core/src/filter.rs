//! # Filter/Sort Engine
//!
//! Pure functions from a raw result list plus a [`FilterSelection`] to the
//! exact visible subset, in a deterministic order.
//!
//! ## Composition Order
//!
//! 1. Query-level species filter (see [`RemoteQuery`], applied by the API)
//! 2. Relation filter (starred / others / all)
//! 3. Residual species filter (the binary human/alien split)
//! 4. Gender filter
//! 5. Search filter (case-insensitive name prefix)
//! 6. Sort by name
//!
//! Nothing is cached: every call recomputes from scratch and the input list
//! is never mutated.

use crate::{Character, CharacterId, CharadexError, Gender};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::str::FromStr;

/// The species value the binary human/alien facet partitions on.
pub const HUMAN_SPECIES: &str = "Human";

// =============================================================================
// STARRED MEMBERSHIP
// =============================================================================

/// Membership view over the favorite set.
///
/// The relation facet only needs to ask "is this id starred?", so filters take
/// this trait instead of the full store.
pub trait StarredIds {
    fn contains_id(&self, id: CharacterId) -> bool;
}

impl StarredIds for HashSet<CharacterId> {
    fn contains_id(&self, id: CharacterId) -> bool {
        self.contains(&id)
    }
}

impl StarredIds for BTreeSet<CharacterId> {
    fn contains_id(&self, id: CharacterId) -> bool {
        self.contains(&id)
    }
}

impl StarredIds for [CharacterId] {
    fn contains_id(&self, id: CharacterId) -> bool {
        self.contains(&id)
    }
}

// =============================================================================
// FACETS
// =============================================================================

/// Shared behaviour of the closed facet vocabularies.
pub trait Facet: Copy + Default + FromStr<Err = CharadexError> + 'static {
    /// Every accepted value, in display order.
    const VALUES: &'static [Self];

    /// Name of the facet, used in error messages and URL keys.
    const KEY: &'static str;

    fn as_str(self) -> &'static str;

    /// Parse without failing: unrecognised input is the pass-through value.
    fn from_lossy(raw: &str) -> Self;
}

fn parse_facet<F: Facet>(raw: &str) -> Result<F, CharadexError> {
    let needle = raw.trim();
    F::VALUES
        .iter()
        .copied()
        .find(|v| v.as_str().eq_ignore_ascii_case(needle))
        .ok_or_else(|| CharadexError::InvalidParam {
            key: F::KEY.to_string(),
            value: raw.to_string(),
        })
}

macro_rules! facet_str_impls {
    ($ty:ty) => {
        impl FromStr for $ty {
            type Err = CharadexError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                parse_facet(s)
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $ty {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                Ok(<$ty as Facet>::from_lossy(&raw))
            }
        }
    };
}

/// Relation of a character to the favorite set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RelationFilter {
    All,
    Starred,
    #[default]
    Others,
}

impl Facet for RelationFilter {
    const VALUES: &'static [Self] = &[Self::All, Self::Starred, Self::Others];
    const KEY: &'static str = "relation";

    fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Starred => "starred",
            Self::Others => "others",
        }
    }

    fn from_lossy(raw: &str) -> Self {
        parse_facet(raw).unwrap_or(Self::All)
    }
}

impl RelationFilter {
    #[must_use]
    pub fn keep<S: StarredIds + ?Sized>(self, character: &Character, starred: &S) -> bool {
        match self {
            Self::All => true,
            Self::Starred => starred.contains_id(character.id),
            Self::Others => !starred.contains_id(character.id),
        }
    }
}

/// Binary species partition: human versus everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SpeciesFilter {
    #[default]
    All,
    Human,
    /// Anything whose species is not "Human". Not a real species.
    Alien,
}

impl Facet for SpeciesFilter {
    const VALUES: &'static [Self] = &[Self::All, Self::Human, Self::Alien];
    const KEY: &'static str = "species";

    fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Human => "human",
            Self::Alien => "alien",
        }
    }

    fn from_lossy(raw: &str) -> Self {
        parse_facet(raw).unwrap_or(Self::All)
    }
}

impl SpeciesFilter {
    #[must_use]
    pub fn keep(self, character: &Character) -> bool {
        match self {
            Self::All => true,
            Self::Human => character.species_is(HUMAN_SPECIES),
            Self::Alien => !character.species_is(HUMAN_SPECIES),
        }
    }
}

/// Gender facet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GenderFilter {
    #[default]
    All,
    Male,
    Female,
    Genderless,
    Unknown,
}

impl Facet for GenderFilter {
    const VALUES: &'static [Self] = &[
        Self::All,
        Self::Male,
        Self::Female,
        Self::Genderless,
        Self::Unknown,
    ];
    const KEY: &'static str = "gender";

    fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Male => "male",
            Self::Female => "female",
            Self::Genderless => "genderless",
            Self::Unknown => "unknown",
        }
    }

    fn from_lossy(raw: &str) -> Self {
        parse_facet(raw).unwrap_or(Self::All)
    }
}

impl GenderFilter {
    /// Compares decoded genders. Records whose raw gender is outside the
    /// catalog vocabulary decode to [`Gender::Unknown`] and so match `unknown`.
    #[must_use]
    pub fn keep(self, character: &Character) -> bool {
        match self {
            Self::All => true,
            Self::Male => character.gender == Gender::Male,
            Self::Female => character.gender == Gender::Female,
            Self::Genderless => character.gender == Gender::Genderless,
            Self::Unknown => character.gender == Gender::Unknown,
        }
    }
}

/// Name sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl Facet for SortOrder {
    const VALUES: &'static [Self] = &[Self::Asc, Self::Desc];
    const KEY: &'static str = "sort";

    fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    fn from_lossy(raw: &str) -> Self {
        parse_facet(raw).unwrap_or(Self::Asc)
    }
}

impl SortOrder {
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

facet_str_impls!(RelationFilter);
facet_str_impls!(SpeciesFilter);
facet_str_impls!(GenderFilter);
facet_str_impls!(SortOrder);

/// Case-insensitive name prefix match. An empty query matches everything.
#[must_use]
pub fn name_has_prefix(name: &str, query: &str) -> bool {
    let query = query.trim();
    if query.is_empty() {
        return true;
    }
    name.to_lowercase().starts_with(&query.to_lowercase())
}

// =============================================================================
// FILTER SELECTION
// =============================================================================

/// The full facet tuple driving a list view.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSelection {
    pub relation: RelationFilter,
    pub species: SpeciesFilter,
    pub gender: GenderFilter,
    pub search: String,
    pub sort: SortOrder,
}

/// Which list query the remote catalog should run for a selection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RemoteQuery {
    All,
    /// Server-side "contains" match; the prefix rule is re-applied locally.
    ByName(String),
    BySpecies(String),
}

impl FilterSelection {
    /// Pick the narrowest query the catalog can answer for this selection.
    ///
    /// Search text wins over species because the catalog's name search is
    /// the more selective of the two. The alien half of the species facet
    /// cannot be expressed remotely and is always filtered locally.
    #[must_use]
    pub fn remote_query(&self) -> RemoteQuery {
        let search = self.search.trim();
        if !search.is_empty() {
            RemoteQuery::ByName(search.to_string())
        } else if self.species == SpeciesFilter::Human {
            RemoteQuery::BySpecies(HUMAN_SPECIES.to_string())
        } else {
            RemoteQuery::All
        }
    }

    /// Whether a record passes every facet of this selection.
    #[must_use]
    pub fn keep<S: StarredIds + ?Sized>(&self, character: &Character, starred: &S) -> bool {
        self.relation.keep(character, starred)
            && self.species.keep(character)
            && self.gender.keep(character)
            && name_has_prefix(&character.name, &self.search)
    }

    /// Filter and sort `items`, returning owned copies in display order.
    #[must_use]
    pub fn apply<S: StarredIds + ?Sized>(
        &self,
        items: &[Character],
        starred: &S,
    ) -> Vec<Character> {
        let mut visible: Vec<&Character> = items
            .iter()
            .filter(|c| self.relation.keep(c, starred))
            .filter(|c| self.species.keep(c))
            .filter(|c| self.gender.keep(c))
            .filter(|c| name_has_prefix(&c.name, &self.search))
            .collect();
        sort_refs(&mut visible, self.sort);
        visible.into_iter().cloned().collect()
    }
}

// =============================================================================
// SORT
// =============================================================================

fn sort_refs(items: &mut [&Character], order: SortOrder) {
    match order {
        SortOrder::Asc => items.sort_by(|a, b| a.name.cmp(&b.name)),
        SortOrder::Desc => items.sort_by(|a, b| b.name.cmp(&a.name)),
    }
}

/// Sort by name without touching the input. Ties keep their input order.
#[must_use]
pub fn sort_by_name(items: &[Character], order: SortOrder) -> Vec<Character> {
    let mut refs: Vec<&Character> = items.iter().collect();
    sort_refs(&mut refs, order);
    refs.into_iter().cloned().collect()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn names(items: &[Character]) -> Vec<&str> {
        items.iter().map(|c| c.name.as_str()).collect()
    }

    fn family() -> Vec<Character> {
        vec![
            Character::new(1, "Rick Sanchez", "Human").with_gender(Gender::Male),
            Character::new(2, "Morty Smith", "Human").with_gender(Gender::Male),
            Character::new(3, "Summer Smith", "human").with_gender(Gender::Female),
            Character::new(4, "Birdperson", "Bird-Person").with_gender(Gender::Male),
            Character::new(5, "Pickle Rick", "Pickle"),
        ]
    }

    #[test]
    fn default_selection_hides_starred() {
        let sel = FilterSelection::default();
        assert_eq!(sel.relation, RelationFilter::Others);
        let starred: HashSet<CharacterId> = [CharacterId(1)].into_iter().collect();
        let out = sel.apply(&family(), &starred);
        assert!(out.iter().all(|c| c.id != CharacterId(1)));
        assert_eq!(out.len(), 4);
    }

    #[test]
    fn search_is_prefix_only() {
        let sel = FilterSelection {
            relation: RelationFilter::All,
            search: "rick".to_string(),
            ..FilterSelection::default()
        };
        let out = sel.apply(&family(), &HashSet::new());
        assert_eq!(names(&out), vec!["Rick Sanchez"]);
    }

    #[test]
    fn alien_is_not_human_case_insensitive() {
        let sel = FilterSelection {
            relation: RelationFilter::All,
            species: SpeciesFilter::Alien,
            ..FilterSelection::default()
        };
        let out = sel.apply(&family(), &HashSet::new());
        assert_eq!(names(&out), vec!["Birdperson", "Pickle Rick"]);
    }

    #[test]
    fn gender_filter_matches_exactly() {
        let sel = FilterSelection {
            relation: RelationFilter::All,
            gender: GenderFilter::Unknown,
            ..FilterSelection::default()
        };
        let out = sel.apply(&family(), &HashSet::new());
        assert_eq!(names(&out), vec!["Pickle Rick"]);
    }

    #[test]
    fn unknown_facet_values_pass_through() {
        assert_eq!(RelationFilter::from_lossy("friends"), RelationFilter::All);
        assert_eq!(SpeciesFilter::from_lossy("robot"), SpeciesFilter::All);
        assert_eq!(GenderFilter::from_lossy(""), GenderFilter::All);
        assert!("robot".parse::<SpeciesFilter>().is_err());
        assert_eq!("ALIEN".parse::<SpeciesFilter>().ok(), Some(SpeciesFilter::Alien));
    }

    #[test]
    fn remote_query_prefers_search() {
        let mut sel = FilterSelection {
            species: SpeciesFilter::Human,
            ..FilterSelection::default()
        };
        assert_eq!(sel.remote_query(), RemoteQuery::BySpecies("Human".to_string()));
        sel.search = "  Mort ".to_string();
        assert_eq!(sel.remote_query(), RemoteQuery::ByName("Mort".to_string()));
        sel.search.clear();
        sel.species = SpeciesFilter::Alien;
        assert_eq!(sel.remote_query(), RemoteQuery::All);
    }

    #[test]
    fn sort_does_not_mutate_input() {
        let input = family();
        let before = input.clone();
        let _ = sort_by_name(&input, SortOrder::Desc);
        assert_eq!(input, before);
    }

    #[test]
    fn sort_is_stable_on_ties() {
        let input = vec![
            Character::new(10, "Mr. Meeseeks", "Meeseeks"),
            Character::new(11, "Mr. Meeseeks", "Meeseeks"),
            Character::new(12, "Mr. Meeseeks", "Meeseeks"),
        ];
        for order in [SortOrder::Asc, SortOrder::Desc] {
            let ids: Vec<u64> = sort_by_name(&input, order).iter().map(|c| c.id.0).collect();
            assert_eq!(ids, vec![10, 11, 12]);
        }
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let sel = FilterSelection::default();
        assert!(sel.apply(&[], &HashSet::new()).is_empty());
    }

    fn every_value_round_trips<F: Facet + PartialEq + std::fmt::Debug>() {
        for value in F::VALUES {
            assert_eq!(parse_facet::<F>(value.as_str()).expect("parse"), *value);
            assert_eq!(F::from_lossy(&value.as_str().to_uppercase()), *value);
        }
    }

    #[test]
    fn facet_vocabularies_parse_their_own_spelling() {
        every_value_round_trips::<RelationFilter>();
        every_value_round_trips::<SpeciesFilter>();
        every_value_round_trips::<GenderFilter>();
        every_value_round_trips::<SortOrder>();
    }

    #[test]
    fn off_vocabulary_gender_matches_unknown() {
        let robot =
            Character::new(7, "Gear Cop", "Robot").with_gender(Gender::from("Robot".to_string()));
        assert_eq!(robot.gender, Gender::Unknown);
        assert!(GenderFilter::Unknown.keep(&robot));
        assert!(!GenderFilter::Male.keep(&robot));
    }

    #[test]
    fn selection_deserializes_lossy_with_defaults() {
        let sel: FilterSelection =
            serde_json::from_str(r#"{"species":"martian","sort":"desc"}"#).expect("deserialize");
        assert_eq!(sel.species, SpeciesFilter::All);
        assert_eq!(sel.sort, SortOrder::Desc);
        assert_eq!(sel.relation, RelationFilter::Others);
    }
}
