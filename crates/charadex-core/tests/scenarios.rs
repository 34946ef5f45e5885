//! # Scenario Tests
//!
//! End-to-end walks through the engine and stores using small, named
//! character lists.

use charadex_core::{
    Character, CharacterId, CharadexError, FavoritesStore, FilterPanel, FilterSelection, Gender,
    RelationFilter, SortOrder, SpeciesFilter, StorageBackend, UrlState, name_has_prefix,
    sort_by_name,
};
use std::collections::HashSet;

fn names(items: &[Character]) -> Vec<&str> {
    items.iter().map(|c| c.name.as_str()).collect()
}

fn smiths() -> Vec<Character> {
    vec![
        Character::new(1, "Rick Sanchez", "Human"),
        Character::new(2, "Morty Smith", "Human"),
        Character::new(3, "Summer Smith", "Human"),
    ]
}

// =============================================================================
// SORT
// =============================================================================

mod sort {
    use super::*;

    #[test]
    fn ascending_and_descending_by_name() {
        let asc = sort_by_name(&smiths(), SortOrder::Asc);
        assert_eq!(names(&asc), vec!["Morty Smith", "Rick Sanchez", "Summer Smith"]);

        let desc = sort_by_name(&smiths(), SortOrder::Desc);
        assert_eq!(names(&desc), vec!["Summer Smith", "Rick Sanchez", "Morty Smith"]);
    }
}

// =============================================================================
// FACETS
// =============================================================================

mod facets {
    use super::*;

    #[test]
    fn others_excludes_starred_ids() {
        let starred: HashSet<CharacterId> = [CharacterId(1), CharacterId(2)].into_iter().collect();
        let sel = FilterSelection {
            relation: RelationFilter::Others,
            ..FilterSelection::default()
        };
        let out = sel.apply(&smiths(), &starred);
        let ids: Vec<u64> = out.iter().map(|c| c.id.0).collect();
        assert_eq!(ids, vec![3]);
    }

    #[test]
    fn prefix_search_not_substring() {
        assert!(name_has_prefix("Summer Smith", "Sum"));
        assert!(!name_has_prefix("Summer Smith", "mer"));
        assert!(name_has_prefix("Rick Sanchez", "rick"));
        assert!(!name_has_prefix("Pickle Rick", "Rick"));
    }

    #[test]
    fn alien_excludes_every_human_spelling() {
        let items = vec![
            Character::new(1, "A", "Human"),
            Character::new(2, "B", "HUMAN"),
            Character::new(3, "C", "human"),
            Character::new(4, "D", "Humanoid"),
            Character::new(5, "E", "Mythological Creature"),
        ];
        let sel = FilterSelection {
            relation: RelationFilter::All,
            species: SpeciesFilter::Alien,
            ..FilterSelection::default()
        };
        assert_eq!(names(&sel.apply(&items, &HashSet::new())), vec!["D", "E"]);
    }

    #[test]
    fn facets_compose() {
        let items = vec![
            Character::new(1, "Beth Smith", "Human").with_gender(Gender::Female),
            Character::new(2, "Beth Sanchez", "Human").with_gender(Gender::Female),
            Character::new(3, "Beta VII", "Alien").with_gender(Gender::Genderless),
            Character::new(4, "Jerry Smith", "Human").with_gender(Gender::Male),
        ];
        let starred: HashSet<CharacterId> = [CharacterId(2)].into_iter().collect();
        let sel = FilterSelection {
            relation: RelationFilter::Others,
            species: SpeciesFilter::Human,
            gender: charadex_core::GenderFilter::Female,
            search: "be".to_string(),
            sort: SortOrder::Desc,
        };
        assert_eq!(names(&sel.apply(&items, &starred)), vec!["Beth Smith"]);
    }
}

// =============================================================================
// FAVORITES
// =============================================================================

mod favorites {
    use super::*;

    #[test]
    fn starred_view_follows_store() {
        let mut store = FavoritesStore::new();
        store.add(smiths()[2].clone()).expect("add");

        let starred = FilterSelection {
            relation: RelationFilter::Starred,
            ..FilterSelection::default()
        };
        assert_eq!(names(&starred.apply(&smiths(), &store)), vec!["Summer Smith"]);

        store.toggle(smiths()[2].clone()).expect("toggle");
        assert!(starred.apply(&smiths(), &store).is_empty());
    }

    #[test]
    fn comment_lifecycle() {
        let mut store = FavoritesStore::new();
        let morty = smiths()[1].clone();

        assert!(matches!(
            store.set_comment(morty.id, "aw jeez"),
            Err(CharadexError::NotStarred(_))
        ));

        store.add(morty.clone()).expect("add");
        store.set_comment(morty.id, "  aw jeez  ").expect("save");
        assert_eq!(store.comment(morty.id), Some("aw jeez"));

        store.remove(morty.id).expect("remove");
        store.add(morty.clone()).expect("re-add");
        assert_eq!(store.comment(morty.id), None);
    }

    #[test]
    fn reload_from_disk_restores_everything() {
        let temp = tempfile::tempdir().expect("temp dir");
        let path = temp.path().join("favorites.json");
        {
            let backend = StorageBackend::open("file", &path).expect("open");
            let mut store = FavoritesStore::open(backend).expect("store");
            for c in smiths() {
                store.add(c).expect("add");
            }
            store.set_comment(CharacterId(1), "Wubba lubba dub dub").expect("comment");
            store.remove(CharacterId(2)).expect("remove");
        }
        let backend = StorageBackend::open("file", &path).expect("reopen");
        let store = FavoritesStore::open(backend).expect("store");
        assert_eq!(names(store.starred()), vec!["Rick Sanchez", "Summer Smith"]);
        assert_eq!(store.comment(CharacterId(1)), Some("Wubba lubba dub dub"));
    }
}

// =============================================================================
// VIEW STATE
// =============================================================================

mod view_state {
    use super::*;

    #[test]
    fn apply_then_share_then_restore() {
        let mut panel = FilterPanel::default();
        let mut url = UrlState::default();

        panel.set_species(SpeciesFilter::Alien);
        panel.set_sort(SortOrder::Desc);
        assert!(url.to_query_string().is_empty(), "draft edits never reach the URL");

        assert!(panel.commit());
        url.set_filters(panel.applied());
        url.select(Some("Mr. Poopybutthole"));

        let link = url.to_query_string();
        let restored = UrlState::from_query(&link);
        assert_eq!(restored.filters(), *panel.applied());
        assert_eq!(restored.selected().as_deref(), Some("Mr. Poopybutthole"));
    }
}
