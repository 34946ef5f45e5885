//! # URL-Synchronized View State
//!
//! Mirrors the selected character and the applied filters into a query
//! string so a view can be shared, bookmarked and restored.
//!
//! ## Rules
//!
//! - Reading: a present, valid URL parameter wins; otherwise the in-memory
//!   value; otherwise the parameter's default.
//! - Writing: updates the in-memory value and the parameter together.
//!   Clearing a value removes the parameter instead of leaving `key=`.
//! - Values are percent-encoded on write and decoded on read; `+` reads as a
//!   space.
//! - Facet parameters never fail to parse: unknown values read as the
//!   pass-through `all`. Number and boolean parameters reject malformed
//!   input and fall back to their default.

use crate::filter::{Facet, FilterSelection, GenderFilter, RelationFilter, SortOrder, SpeciesFilter};
use crate::view::ViewState;
use std::fmt;
use std::str::FromStr;

/// Selected character name.
pub const CHARACTER_NAME_PARAM: &str = "character-name";
/// Free-text search.
pub const SEARCH_PARAM: &str = "search";
/// 1-based result page.
pub const PAGE_PARAM: &str = "page";

// =============================================================================
// QUERY PARAMS
// =============================================================================

/// Ordered list of decoded query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}

impl QueryParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a query string, with or without the leading `?`.
    ///
    /// Also accepts a full URL; everything up to the first `?` is ignored.
    #[must_use]
    pub fn parse(input: &str) -> Self {
        let query = match input.split_once('?') {
            Some((_, rest)) => rest,
            None => input,
        };
        let query = query.split('#').next().unwrap_or_default();
        let pairs = query
            .split('&')
            .filter(|part| !part.is_empty())
            .map(|part| match part.split_once('=') {
                Some((k, v)) => (decode_component(k), decode_component(v)),
                None => (decode_component(part), String::new()),
            })
            .filter(|(k, _)| !k.is_empty())
            .collect();
        Self { pairs }
    }

    /// First value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Replace every occurrence of `key` with a single value, keeping the
    /// position of the first occurrence.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.pairs.iter().position(|(k, _)| k == key) {
            Some(pos) => {
                self.pairs[pos].1 = value;
                let mut seen = false;
                self.pairs.retain(|(k, _)| {
                    if k != key {
                        return true;
                    }
                    let keep = !seen;
                    seen = true;
                    keep
                });
            }
            None => self.pairs.push((key.to_string(), value)),
        }
    }

    /// Drop every occurrence of `key`.
    pub fn remove(&mut self, key: &str) {
        self.pairs.retain(|(k, _)| k != key);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Encoded form with leading `?`, or the empty string when empty.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        if self.pairs.is_empty() {
            return String::new();
        }
        let body: Vec<String> = self
            .pairs
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect();
        format!("?{}", body.join("&"))
    }
}

impl fmt::Display for QueryParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query_string())
    }
}

impl FromStr for QueryParams {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

// =============================================================================
// TYPED PARAMETERS
// =============================================================================

/// Coercion between a typed value and its query-string text.
pub trait ParamValue: Sized + Clone + PartialEq {
    /// `None` when the text is malformed for this type.
    fn decode(raw: &str) -> Option<Self>;
    fn encode(&self) -> String;
}

impl ParamValue for String {
    fn decode(raw: &str) -> Option<Self> {
        Some(raw.to_string())
    }

    fn encode(&self) -> String {
        self.clone()
    }
}

impl ParamValue for bool {
    fn decode(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Some(true),
            "false" | "0" | "no" => Some(false),
            _ => None,
        }
    }

    fn encode(&self) -> String {
        self.to_string()
    }
}

macro_rules! number_param {
    ($($ty:ty),*) => {$(
        impl ParamValue for $ty {
            fn decode(raw: &str) -> Option<Self> {
                raw.trim().parse().ok()
            }

            fn encode(&self) -> String {
                self.to_string()
            }
        }
    )*};
}

number_param!(u32, u64, i64);

macro_rules! facet_param {
    ($($ty:ty),*) => {$(
        impl ParamValue for $ty {
            fn decode(raw: &str) -> Option<Self> {
                Some(<$ty as Facet>::from_lossy(raw))
            }

            fn encode(&self) -> String {
                self.as_str().to_string()
            }
        }
    )*};
}

facet_param!(RelationFilter, SpeciesFilter, GenderFilter, SortOrder);

/// A named, typed query parameter with a default and optional validator.
#[derive(Debug, Clone)]
pub struct UrlParam<T> {
    key: &'static str,
    default: T,
    validator: Option<fn(&T) -> bool>,
}

impl<T: ParamValue> UrlParam<T> {
    #[must_use]
    pub const fn new(key: &'static str, default: T) -> Self {
        Self {
            key,
            default,
            validator: None,
        }
    }

    /// Reject decoded values for which `validator` returns `false`.
    #[must_use]
    pub fn with_validator(mut self, validator: fn(&T) -> bool) -> Self {
        self.validator = Some(validator);
        self
    }

    #[must_use]
    pub fn key(&self) -> &'static str {
        self.key
    }

    #[must_use]
    pub fn default_value(&self) -> &T {
        &self.default
    }

    /// The parameter's value if present, well-formed and valid.
    #[must_use]
    pub fn read(&self, params: &QueryParams) -> Option<T> {
        let value = T::decode(params.get(self.key)?)?;
        match self.validator {
            Some(valid) if !valid(&value) => None,
            _ => Some(value),
        }
    }

    #[must_use]
    pub fn read_or_default(&self, params: &QueryParams) -> T {
        self.read(params).unwrap_or_else(|| self.default.clone())
    }

    /// Write `value`, or remove the parameter for `None`.
    pub fn write(&self, params: &mut QueryParams, value: Option<&T>) {
        match value {
            Some(v) => params.set(self.key, v.encode()),
            None => params.remove(self.key),
        }
    }
}

/// A [`UrlParam`] paired with an in-memory fallback value.
#[derive(Debug, Clone)]
pub struct UrlBinding<T> {
    param: UrlParam<T>,
    memory: Option<T>,
}

impl<T: ParamValue> UrlBinding<T> {
    #[must_use]
    pub fn new(param: UrlParam<T>) -> Self {
        Self {
            param,
            memory: None,
        }
    }

    /// URL value, else in-memory value, else default.
    #[must_use]
    pub fn get(&self, params: &QueryParams) -> T {
        self.param
            .read(params)
            .or_else(|| self.memory.clone())
            .unwrap_or_else(|| self.param.default_value().clone())
    }

    /// Set or clear both the in-memory value and the URL parameter.
    pub fn set(&mut self, params: &mut QueryParams, value: Option<T>) {
        self.param.write(params, value.as_ref());
        self.memory = value;
    }
}

// =============================================================================
// VIEW <-> URL
// =============================================================================

fn page_is_positive(page: &u32) -> bool {
    *page >= 1
}

/// The shareable part of a list/detail view, kept in sync with a query string.
#[derive(Debug, Clone)]
pub struct UrlState {
    params: QueryParams,
    selected: UrlBinding<String>,
    relation: UrlBinding<RelationFilter>,
    species: UrlBinding<SpeciesFilter>,
    gender: UrlBinding<GenderFilter>,
    search: UrlBinding<String>,
    sort: UrlBinding<SortOrder>,
    page: UrlBinding<u32>,
}

impl Default for UrlState {
    fn default() -> Self {
        Self::new(QueryParams::new())
    }
}

impl UrlState {
    #[must_use]
    pub fn new(params: QueryParams) -> Self {
        Self {
            params,
            selected: UrlBinding::new(UrlParam::new(CHARACTER_NAME_PARAM, String::new())),
            relation: UrlBinding::new(UrlParam::new(
                RelationFilter::KEY,
                RelationFilter::default(),
            )),
            species: UrlBinding::new(UrlParam::new(SpeciesFilter::KEY, SpeciesFilter::default())),
            gender: UrlBinding::new(UrlParam::new(GenderFilter::KEY, GenderFilter::default())),
            search: UrlBinding::new(UrlParam::new(SEARCH_PARAM, String::new())),
            sort: UrlBinding::new(UrlParam::new(SortOrder::KEY, SortOrder::default())),
            page: UrlBinding::new(UrlParam::new(PAGE_PARAM, 1).with_validator(page_is_positive)),
        }
    }

    #[must_use]
    pub fn from_query(query: &str) -> Self {
        Self::new(QueryParams::parse(query))
    }

    #[must_use]
    pub fn params(&self) -> &QueryParams {
        &self.params
    }

    #[must_use]
    pub fn to_query_string(&self) -> String {
        self.params.to_query_string()
    }

    /// Applied filters as currently represented.
    #[must_use]
    pub fn filters(&self) -> FilterSelection {
        FilterSelection {
            relation: self.relation.get(&self.params),
            species: self.species.get(&self.params),
            gender: self.gender.get(&self.params),
            search: self.search.get(&self.params),
            sort: self.sort.get(&self.params),
        }
    }

    #[must_use]
    pub fn selected(&self) -> Option<String> {
        Some(self.selected.get(&self.params)).filter(|name| !name.trim().is_empty())
    }

    #[must_use]
    pub fn page(&self) -> u32 {
        self.page.get(&self.params)
    }

    #[must_use]
    pub fn view(&self) -> ViewState {
        ViewState {
            filters: self.filters(),
            selected: self.selected(),
        }
    }

    /// Open a detail view, or close it with `None` / a blank name.
    pub fn select(&mut self, name: Option<&str>) {
        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string);
        self.selected.set(&mut self.params, name);
    }

    /// Mirror a committed selection. Values equal to their default are
    /// removed so links stay short.
    pub fn set_filters(&mut self, filters: &FilterSelection) {
        fn non_default<T: ParamValue + Default>(value: T) -> Option<T> {
            if value == T::default() { None } else { Some(value) }
        }
        self.relation.set(&mut self.params, non_default(filters.relation));
        self.species.set(&mut self.params, non_default(filters.species));
        self.gender.set(&mut self.params, non_default(filters.gender));
        let search = filters.search.trim();
        self.search.set(
            &mut self.params,
            (!search.is_empty()).then(|| search.to_string()),
        );
        self.sort.set(&mut self.params, non_default(filters.sort));
    }

    pub fn set_page(&mut self, page: Option<u32>) {
        self.page.set(&mut self.params, page.filter(|p| *p > 1));
    }

    /// Mirror a whole view.
    pub fn set_view(&mut self, view: &ViewState) {
        self.set_filters(&view.filters);
        self.select(view.selected.as_deref());
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_decodes_percent_and_plus() {
        let params = QueryParams::parse("?character-name=Rick%20Sanchez&search=Mr+Poopy");
        assert_eq!(params.get(CHARACTER_NAME_PARAM), Some("Rick Sanchez"));
        assert_eq!(params.get(SEARCH_PARAM), Some("Mr Poopy"));
    }

    #[test]
    fn parse_accepts_full_url_and_fragment() {
        let params = QueryParams::parse("http://localhost:3000/?species=alien#top");
        assert_eq!(params.get("species"), Some("alien"));
    }

    #[test]
    fn to_query_string_percent_encodes() {
        let mut params = QueryParams::new();
        params.set(CHARACTER_NAME_PARAM, "Mr. Poopybutthole & co");
        assert_eq!(
            params.to_query_string(),
            "?character-name=Mr.%20Poopybutthole%20%26%20co"
        );
        assert_eq!(QueryParams::new().to_query_string(), "");
    }

    #[test]
    fn set_collapses_duplicates() {
        let mut params = QueryParams::parse("a=1&b=2&a=3");
        params.set("a", "9");
        assert_eq!(params.to_query_string(), "?a=9&b=2");
    }

    #[test]
    fn clearing_removes_parameter() {
        let mut state = UrlState::default();
        state.select(Some("Morty Smith"));
        assert_eq!(state.to_query_string(), "?character-name=Morty%20Smith");
        state.select(None);
        assert_eq!(state.to_query_string(), "");
        assert!(state.selected().is_none());
    }

    #[test]
    fn url_value_wins_over_memory() {
        let param = UrlParam::new("n", 5u32);
        let mut binding = UrlBinding::new(param);
        let mut params = QueryParams::new();
        binding.set(&mut params, Some(7));
        assert_eq!(binding.get(&params), 7);

        params.set("n", "11");
        assert_eq!(binding.get(&params), 11);

        params.remove("n");
        assert_eq!(binding.get(&params), 7);
    }

    #[test]
    fn validator_rejects_and_falls_back() {
        let state = UrlState::from_query("?page=0");
        assert_eq!(state.page(), 1);
        let state = UrlState::from_query("?page=abc");
        assert_eq!(state.page(), 1);
        let state = UrlState::from_query("?page=3");
        assert_eq!(state.page(), 3);
    }

    #[test]
    fn bool_param_coercion() {
        let param = UrlParam::new("dense", false);
        assert!(param.read_or_default(&QueryParams::parse("dense=yes")));
        assert!(!param.read_or_default(&QueryParams::parse("dense=maybe")));
        assert_eq!(param.read(&QueryParams::parse("dense=maybe")), None);
    }

    #[test]
    fn unknown_facet_reads_as_all() {
        let state = UrlState::from_query("?species=martian&relation=friends");
        let filters = state.filters();
        assert_eq!(filters.species, SpeciesFilter::All);
        assert_eq!(filters.relation, RelationFilter::All);
    }

    #[test]
    fn view_round_trips_through_query_string() {
        let mut state = UrlState::default();
        let view = ViewState {
            filters: FilterSelection {
                relation: RelationFilter::Starred,
                species: SpeciesFilter::Alien,
                gender: GenderFilter::Female,
                search: "Uni".to_string(),
                sort: SortOrder::Desc,
            },
            selected: Some("Unity".to_string()),
        };
        state.set_view(&view);

        let restored = UrlState::from_query(&state.to_query_string());
        assert_eq!(restored.view(), view);
    }

    #[test]
    fn default_filters_leave_no_params() {
        let mut state = UrlState::from_query("?species=alien&sort=desc");
        state.set_filters(&FilterSelection::default());
        assert!(state.params().is_empty());
        assert_eq!(state.filters(), FilterSelection::default());
    }
}
