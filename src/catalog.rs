//! Playlist catalog collaborator contract
//!
//! Playlists and their ordered items are owned by an external service;
//! the engine only ever reads from it. This module defines the trait the
//! engine consumes plus a static in-memory implementation for tests and
//! for embedders that load their catalog up front.

use crate::error::{MeleteError, Result};
use crate::types::{ItemId, PlaylistId, UserId};
use async_trait::async_trait;
use std::collections::HashMap;

/// Read-only view of playlists and their items
///
/// All methods that take a playlist or item identifier fail with the
/// corresponding not-found error when the catalog does not know it.
#[async_trait]
pub trait PlaylistCatalog: Send + Sync {
    /// Whether the catalog knows this item
    async fn item_exists(&self, item_id: ItemId) -> Result<bool>;

    /// Display title of an item
    async fn item_title(&self, item_id: ItemId) -> Result<String>;

    /// Display title of a playlist
    async fn playlist_title(&self, playlist_id: PlaylistId) -> Result<String>;

    /// Item identifiers of a playlist, in playlist order
    async fn playlist_item_ids(&self, playlist_id: PlaylistId) -> Result<Vec<ItemId>>;

    /// Playlists created by a user, oldest first
    async fn playlists_created_by(&self, user_id: UserId) -> Result<Vec<PlaylistId>>;
}

struct PlaylistRecord {
    title: String,
    owner: UserId,
    items: Vec<ItemId>,
}

/// In-memory catalog built up front and immutable afterwards
///
/// Stands in for the real catalog service in tests and in embedders that
/// already hold playlist data in memory.
#[derive(Default)]
pub struct StaticCatalog {
    items: HashMap<ItemId, String>,
    playlists: HashMap<PlaylistId, PlaylistRecord>,
    // insertion order, so playlists_created_by is deterministic
    playlist_order: Vec<PlaylistId>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a playlist and return its identifier
    pub fn add_playlist(&mut self, owner: UserId, title: &str) -> PlaylistId {
        let id = PlaylistId::new();
        self.playlists.insert(
            id,
            PlaylistRecord {
                title: title.to_string(),
                owner,
                items: Vec::new(),
            },
        );
        self.playlist_order.push(id);
        id
    }

    /// Append an item to a playlist and return its identifier
    ///
    /// # Panics
    /// Panics if the playlist was not previously added; fixtures are
    /// built in order.
    pub fn add_item(&mut self, playlist_id: PlaylistId, title: &str) -> ItemId {
        let id = ItemId::new();
        self.items.insert(id, title.to_string());
        self.playlists
            .get_mut(&playlist_id)
            .expect("playlist registered before its items")
            .items
            .push(id);
        id
    }

    fn playlist(&self, playlist_id: PlaylistId) -> Result<&PlaylistRecord> {
        self.playlists
            .get(&playlist_id)
            .ok_or(MeleteError::PlaylistNotFound(playlist_id))
    }
}

#[async_trait]
impl PlaylistCatalog for StaticCatalog {
    async fn item_exists(&self, item_id: ItemId) -> Result<bool> {
        Ok(self.items.contains_key(&item_id))
    }

    async fn item_title(&self, item_id: ItemId) -> Result<String> {
        self.items
            .get(&item_id)
            .cloned()
            .ok_or(MeleteError::ItemNotFound(item_id))
    }

    async fn playlist_title(&self, playlist_id: PlaylistId) -> Result<String> {
        Ok(self.playlist(playlist_id)?.title.clone())
    }

    async fn playlist_item_ids(&self, playlist_id: PlaylistId) -> Result<Vec<ItemId>> {
        Ok(self.playlist(playlist_id)?.items.clone())
    }

    async fn playlists_created_by(&self, user_id: UserId) -> Result<Vec<PlaylistId>> {
        Ok(self
            .playlist_order
            .iter()
            .filter(|id| {
                self.playlists
                    .get(id)
                    .map(|p| p.owner == user_id)
                    .unwrap_or(false)
            })
            .copied()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_catalog_preserves_item_order() {
        let user = UserId::new();
        let mut catalog = StaticCatalog::new();
        let playlist = catalog.add_playlist(user, "Rust basics");
        let first = catalog.add_item(playlist, "Ownership");
        let second = catalog.add_item(playlist, "Borrowing");

        let ids = catalog.playlist_item_ids(playlist).await.unwrap();
        assert_eq!(ids, vec![first, second]);
    }

    #[tokio::test]
    async fn test_unknown_playlist_is_not_found() {
        let catalog = StaticCatalog::new();
        let err = catalog
            .playlist_item_ids(PlaylistId::new())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_playlists_created_by_filters_owner() {
        let alice = UserId::new();
        let bob = UserId::new();
        let mut catalog = StaticCatalog::new();
        let a = catalog.add_playlist(alice, "A");
        let _b = catalog.add_playlist(bob, "B");
        let c = catalog.add_playlist(alice, "C");

        assert_eq!(catalog.playlists_created_by(alice).await.unwrap(), vec![a, c]);
    }
}
