//! # Favorites & Comments Store
//!
//! Durable storage of starred characters and their comments.
//!
//! The store keeps an in-memory mirror for O(1) membership queries and writes
//! through to a [`StorageBackend`] on every mutation. Durable state is
//! updated first; the mirror only changes after the write succeeded, so a
//! failed write leaves both sides unchanged.
//!
//! ## Invariant
//!
//! A comment exists only for a character that is currently starred.
//! Unstarring deletes the comment in the same write, and comments loaded from
//! disk for characters that are no longer starred are discarded.

use crate::filter::StarredIds;
use crate::storage::{COMMENTS_KEY, KeyValueStore, STARRED_KEY, StorageBackend};
use crate::{Character, CharacterId, CharadexError};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::sync::mpsc::{Receiver, Sender, channel};

/// Change notification delivered to subscribers after a successful write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FavoritesEvent {
    Starred(CharacterId),
    Unstarred(CharacterId),
    CommentSaved(CharacterId),
    CommentDeleted(CharacterId),
}

/// Starred characters plus per-character comments.
#[derive(Debug)]
pub struct FavoritesStore {
    backend: StorageBackend,
    /// Starred records in the order they were starred.
    starred: Vec<Character>,
    index: HashSet<CharacterId>,
    comments: BTreeMap<CharacterId, String>,
    subscribers: Vec<Sender<FavoritesEvent>>,
}

impl Default for FavoritesStore {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            starred: Vec::new(),
            index: HashSet::new(),
            comments: BTreeMap::new(),
            subscribers: Vec::new(),
        }
    }
}

impl FavoritesStore {
    /// An empty store with volatile in-memory storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load both keys from `backend` once and mirror them in memory.
    pub fn open(backend: StorageBackend) -> Result<Self, CharadexError> {
        let starred: Vec<Character> = decode(backend.get(STARRED_KEY)?)?;
        let raw_comments: BTreeMap<CharacterId, String> = decode(backend.get(COMMENTS_KEY)?)?;

        let mut index = HashSet::with_capacity(starred.len());
        let starred: Vec<Character> = starred
            .into_iter()
            .filter(|c| index.insert(c.id))
            .collect();
        let comments = raw_comments
            .into_iter()
            .filter(|(id, text)| index.contains(id) && !text.trim().is_empty())
            .collect();

        Ok(Self {
            backend,
            starred,
            index,
            comments,
            subscribers: Vec::new(),
        })
    }

    // =========================================================================
    // READ
    // =========================================================================

    /// Starred characters in the order they were starred.
    #[must_use]
    pub fn starred(&self) -> &[Character] {
        &self.starred
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.starred.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.starred.is_empty()
    }

    #[must_use]
    pub fn is_starred(&self, id: CharacterId) -> bool {
        self.index.contains(&id)
    }

    #[must_use]
    pub fn get(&self, id: CharacterId) -> Option<&Character> {
        if !self.is_starred(id) {
            return None;
        }
        self.starred.iter().find(|c| c.id == id)
    }

    #[must_use]
    pub fn comment(&self, id: CharacterId) -> Option<&str> {
        self.comments.get(&id).map(String::as_str)
    }

    #[must_use]
    pub fn comments(&self) -> &BTreeMap<CharacterId, String> {
        &self.comments
    }

    // =========================================================================
    // SUBSCRIBE
    // =========================================================================

    /// Receive an event for every successful mutation from now on.
    ///
    /// Dropping the receiver unsubscribes.
    pub fn subscribe(&mut self) -> Receiver<FavoritesEvent> {
        let (tx, rx) = channel();
        self.subscribers.push(tx);
        rx
    }

    fn notify(&mut self, event: FavoritesEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    // =========================================================================
    // WRITE
    // =========================================================================

    /// Star a character. Returns `false` if it was already starred.
    pub fn add(&mut self, character: Character) -> Result<bool, CharadexError> {
        if self.is_starred(character.id) {
            return Ok(false);
        }
        let id = character.id;
        let mut next = self.starred.clone();
        next.push(character);
        self.backend.set(STARRED_KEY, encode(&next)?)?;

        self.starred = next;
        self.index.insert(id);
        self.notify(FavoritesEvent::Starred(id));
        Ok(true)
    }

    /// Unstar a character and delete its comment in one write.
    ///
    /// Returns `false` if it was not starred.
    pub fn remove(&mut self, id: CharacterId) -> Result<bool, CharadexError> {
        if !self.is_starred(id) {
            return Ok(false);
        }
        let next: Vec<Character> = self.starred.iter().filter(|c| c.id != id).cloned().collect();
        let mut next_comments = self.comments.clone();
        let had_comment = next_comments.remove(&id).is_some();

        self.backend.set_many(&[
            (STARRED_KEY, encode(&next)?),
            (COMMENTS_KEY, encode(&next_comments)?),
        ])?;

        self.starred = next;
        self.index.remove(&id);
        self.comments = next_comments;
        if had_comment {
            self.notify(FavoritesEvent::CommentDeleted(id));
        }
        self.notify(FavoritesEvent::Unstarred(id));
        Ok(true)
    }

    /// Star if absent, unstar if present. Returns the new starred status.
    pub fn toggle(&mut self, character: Character) -> Result<bool, CharadexError> {
        if self.is_starred(character.id) {
            self.remove(character.id)?;
            Ok(false)
        } else {
            self.add(character)?;
            Ok(true)
        }
    }

    /// Save a comment, trimmed. An empty result deletes the comment instead.
    ///
    /// Returns the stored text, or `None` when the save became a delete.
    pub fn set_comment(
        &mut self,
        id: CharacterId,
        text: &str,
    ) -> Result<Option<String>, CharadexError> {
        if !self.is_starred(id) {
            return Err(CharadexError::NotStarred(id));
        }
        let trimmed = text.trim();
        if trimmed.is_empty() {
            self.delete_comment(id)?;
            return Ok(None);
        }
        if self.comment(id) == Some(trimmed) {
            return Ok(Some(trimmed.to_string()));
        }

        let mut next = self.comments.clone();
        next.insert(id, trimmed.to_string());
        self.backend.set(COMMENTS_KEY, encode(&next)?)?;

        self.comments = next;
        self.notify(FavoritesEvent::CommentSaved(id));
        Ok(Some(trimmed.to_string()))
    }

    /// Delete a comment. Returns `false` if there was none.
    pub fn delete_comment(&mut self, id: CharacterId) -> Result<bool, CharadexError> {
        if !self.comments.contains_key(&id) {
            return Ok(false);
        }
        let mut next = self.comments.clone();
        next.remove(&id);
        self.backend.set(COMMENTS_KEY, encode(&next)?)?;

        self.comments = next;
        self.notify(FavoritesEvent::CommentDeleted(id));
        Ok(true)
    }
}

impl StarredIds for FavoritesStore {
    fn contains_id(&self, id: CharacterId) -> bool {
        self.is_starred(id)
    }
}

fn encode<T: serde::Serialize + ?Sized>(value: &T) -> Result<Value, CharadexError> {
    serde_json::to_value(value).map_err(|e| CharadexError::SerializationError(e.to_string()))
}

fn decode<T: serde::de::DeserializeOwned + Default>(
    value: Option<Value>,
) -> Result<T, CharadexError> {
    match value {
        None | Some(Value::Null) => Ok(T::default()),
        Some(v) => serde_json::from_value(v)
            .map_err(|e| CharadexError::DeserializationError(e.to_string())),
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn rick() -> Character {
        Character::new(1, "Rick Sanchez", "Human")
    }

    fn morty() -> Character {
        Character::new(2, "Morty Smith", "Human")
    }

    #[test]
    fn add_is_idempotent() {
        let mut store = FavoritesStore::new();
        assert!(store.add(rick()).expect("add"));
        assert!(!store.add(rick()).expect("add again"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn remove_deletes_comment_and_readd_starts_clean() {
        let mut store = FavoritesStore::new();
        store.add(rick()).expect("add");
        store.set_comment(rick().id, "genius").expect("comment");

        assert!(store.remove(rick().id).expect("remove"));
        assert!(store.comment(rick().id).is_none());

        store.add(rick()).expect("re-add");
        assert!(store.comment(rick().id).is_none());
    }

    #[test]
    fn failed_write_leaves_memory_and_subscribers_untouched() {
        let temp = tempdir().expect("temp dir");
        let dir = temp.path().join("store");
        let backend =
            StorageBackend::open("file", dir.join("favorites.json")).expect("open backend");
        let mut store = FavoritesStore::open(backend).expect("open store");
        store.add(rick()).expect("add");
        store.set_comment(rick().id, "genius").expect("comment");
        let events = store.subscribe();

        // A plain file where the store directory was makes every write fail.
        std::fs::remove_dir_all(&dir).expect("remove dir");
        std::fs::write(&dir, b"").expect("block dir");

        assert!(store.add(morty()).is_err());
        assert!(store.remove(rick().id).is_err());
        assert!(store.toggle(rick()).is_err());
        assert!(store.set_comment(rick().id, "pickle").is_err());
        assert!(store.delete_comment(rick().id).is_err());

        assert_eq!(store.starred(), &[rick()]);
        assert!(store.is_starred(rick().id));
        assert!(!store.is_starred(morty().id));
        assert_eq!(store.comment(rick().id), Some("genius"));
        assert_eq!(store.comments().len(), 1);
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn toggle_flips_membership() {
        let mut store = FavoritesStore::new();
        assert!(store.toggle(morty()).expect("toggle on"));
        assert!(store.is_starred(morty().id));
        assert!(!store.toggle(morty()).expect("toggle off"));
        assert!(!store.is_starred(morty().id));
    }

    #[test]
    fn comment_is_trimmed_and_blank_deletes() {
        let mut store = FavoritesStore::new();
        store.add(rick()).expect("add");

        let saved = store.set_comment(rick().id, "  pickle  ").expect("save");
        assert_eq!(saved.as_deref(), Some("pickle"));
        assert_eq!(store.comment(rick().id), Some("pickle"));

        assert!(store.set_comment(rick().id, " \t\n").expect("blank").is_none());
        assert!(store.comment(rick().id).is_none());
        assert!(store.comments().is_empty());
    }

    #[test]
    fn comment_requires_star() {
        let mut store = FavoritesStore::new();
        let result = store.set_comment(CharacterId(9), "nope");
        assert!(matches!(result, Err(CharadexError::NotStarred(CharacterId(9)))));
    }

    #[test]
    fn delete_comment_reports_absence() {
        let mut store = FavoritesStore::new();
        store.add(rick()).expect("add");
        assert!(!store.delete_comment(rick().id).expect("delete"));
        store.set_comment(rick().id, "x").expect("save");
        assert!(store.delete_comment(rick().id).expect("delete"));
    }

    #[test]
    fn subscribers_see_mutations_in_order() {
        let mut store = FavoritesStore::new();
        let rx = store.subscribe();
        store.add(rick()).expect("add");
        store.set_comment(rick().id, "hi").expect("comment");
        store.remove(rick().id).expect("remove");

        let events: Vec<FavoritesEvent> = rx.try_iter().collect();
        assert_eq!(
            events,
            vec![
                FavoritesEvent::Starred(CharacterId(1)),
                FavoritesEvent::CommentSaved(CharacterId(1)),
                FavoritesEvent::CommentDeleted(CharacterId(1)),
                FavoritesEvent::Unstarred(CharacterId(1)),
            ]
        );
    }

    #[test]
    fn dropped_subscriber_is_pruned() {
        let mut store = FavoritesStore::new();
        drop(store.subscribe());
        store.add(rick()).expect("add");
        assert!(store.subscribers.is_empty());
    }

    #[test]
    fn state_survives_reopen_on_every_backend() {
        let temp = tempdir().expect("temp dir");
        for kind in ["file", "redb"] {
            let path = temp.path().join(format!("favorites.{kind}"));
            {
                let backend = StorageBackend::open(kind, &path).expect("open");
                let mut store = FavoritesStore::open(backend).expect("store");
                store.add(rick()).expect("add");
                store.add(morty()).expect("add");
                store.set_comment(morty().id, "aw geez").expect("comment");
            }
            let backend = StorageBackend::open(kind, &path).expect("reopen");
            let store = FavoritesStore::open(backend).expect("store");
            let ids: Vec<u64> = store.starred().iter().map(|c| c.id.0).collect();
            assert_eq!(ids, vec![1, 2]);
            assert_eq!(store.comment(morty().id), Some("aw geez"));
        }
    }

    #[test]
    fn orphan_comments_dropped_on_load() {
        let mut backend = StorageBackend::default();
        backend
            .set_many(&[
                (STARRED_KEY, encode(&vec![rick()]).expect("encode")),
                (
                    COMMENTS_KEY,
                    serde_json::json!({"1": "kept", "2": "orphan"}),
                ),
            ])
            .expect("seed");
        let store = FavoritesStore::open(backend).expect("open");
        assert_eq!(store.comment(CharacterId(1)), Some("kept"));
        assert!(store.comment(CharacterId(2)).is_none());
    }
}
