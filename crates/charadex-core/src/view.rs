//! # View State
//!
//! The applied/pending filter duality and the selected-character pointer.
//!
//! A [`FilterPanel`] owns the committed selection that drives the visible
//! list. Opening the panel copies it into a draft; edits touch only the
//! draft until `commit()` swaps it in atomically. `cancel()` drops the draft.

use crate::filter::{FilterSelection, GenderFilter, RelationFilter, SortOrder, SpeciesFilter};
use serde::{Deserialize, Serialize};

/// Committed filters plus an optional in-progress draft.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterPanel {
    applied: FilterSelection,
    draft: Option<FilterSelection>,
}

impl FilterPanel {
    #[must_use]
    pub fn new(applied: FilterSelection) -> Self {
        Self {
            applied,
            draft: None,
        }
    }

    /// The selection currently driving the visible list.
    #[must_use]
    pub fn applied(&self) -> &FilterSelection {
        &self.applied
    }

    /// The pending edits, if the panel is open.
    #[must_use]
    pub fn draft(&self) -> Option<&FilterSelection> {
        self.draft.as_ref()
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.draft.is_some()
    }

    /// Open the panel, seeding the draft from the applied selection.
    ///
    /// Re-opening an already open panel keeps the existing draft.
    pub fn open(&mut self) -> &mut FilterSelection {
        self.draft.get_or_insert_with(|| self.applied.clone())
    }

    pub fn set_relation(&mut self, relation: RelationFilter) {
        self.open().relation = relation;
    }

    pub fn set_species(&mut self, species: SpeciesFilter) {
        self.open().species = species;
    }

    pub fn set_gender(&mut self, gender: GenderFilter) {
        self.open().gender = gender;
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.open().search = search.into();
    }

    pub fn set_sort(&mut self, sort: SortOrder) {
        self.open().sort = sort;
    }

    /// Commit the draft. Returns `true` if the applied selection changed.
    pub fn commit(&mut self) -> bool {
        match self.draft.take() {
            Some(draft) if draft != self.applied => {
                self.applied = draft;
                true
            }
            _ => false,
        }
    }

    /// Discard the draft, leaving the applied selection untouched.
    pub fn cancel(&mut self) {
        self.draft = None;
    }

    /// Replace the applied selection directly, closing any open draft.
    pub fn reset_to(&mut self, applied: FilterSelection) {
        self.applied = applied;
        self.draft = None;
    }
}

/// Everything needed to restore a view: applied filters and the open detail.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    pub filters: FilterSelection,
    /// Name of the character whose detail view is open.
    pub selected: Option<String>,
}

impl ViewState {
    /// Select a character by name. Blank names clear the selection.
    pub fn select(&mut self, name: Option<&str>) {
        self.selected = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edits_stay_in_draft_until_commit() {
        let mut panel = FilterPanel::default();
        panel.set_species(SpeciesFilter::Alien);
        panel.set_search("Bird");

        assert_eq!(panel.applied().species, SpeciesFilter::All);
        assert_eq!(panel.draft().map(|d| d.species), Some(SpeciesFilter::Alien));

        assert!(panel.commit());
        assert_eq!(panel.applied().species, SpeciesFilter::Alien);
        assert_eq!(panel.applied().search, "Bird");
        assert!(!panel.is_open());
    }

    #[test]
    fn cancel_discards_draft() {
        let mut panel = FilterPanel::default();
        panel.set_gender(GenderFilter::Female);
        panel.cancel();
        assert_eq!(panel.applied().gender, GenderFilter::All);
        assert!(!panel.commit());
    }

    #[test]
    fn commit_without_change_reports_false() {
        let mut panel = FilterPanel::default();
        panel.open();
        assert!(!panel.commit());
    }

    #[test]
    fn reopen_keeps_draft() {
        let mut panel = FilterPanel::default();
        panel.set_sort(SortOrder::Desc);
        panel.open();
        assert_eq!(panel.draft().map(|d| d.sort), Some(SortOrder::Desc));
    }

    #[test]
    fn blank_selection_clears() {
        let mut view = ViewState::default();
        view.select(Some("Rick Sanchez"));
        assert_eq!(view.selected.as_deref(), Some("Rick Sanchez"));
        view.select(Some("   "));
        assert!(view.selected.is_none());
    }
}
