//! Clipboard Service
//!
//! The form handler and view builder for entry stores. Every call receives a
//! [`RequestContext`] naming the room and the request time; the repository is
//! injected at construction, so the service holds no per-request state.

use chrono::{DateTime, Local};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::storage::{append_entry, Entry, EntryRepository, Room, StorageResult};

/// Per-request inputs to the clipboard service
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Entry store the request addresses
    pub room: Room,
    /// Time used to stamp new entries
    pub now: DateTime<Local>,
}

impl RequestContext {
    /// Context stamped with the current local time
    pub fn new(room: Room) -> Self {
        Self {
            room,
            now: Local::now(),
        }
    }

    /// Context with a fixed time
    pub fn at(room: Room, now: DateTime<Local>) -> Self {
        Self { room, now }
    }
}

/// Result of a text submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The text was stored; holds the store after the change
    Appended(Vec<Entry>),
    /// Blank text; holds the unchanged store
    Ignored(Vec<Entry>),
}

impl SubmitOutcome {
    pub fn entries(&self) -> &[Entry] {
        match self {
            SubmitOutcome::Appended(entries) | SubmitOutcome::Ignored(entries) => entries,
        }
    }

    pub fn is_appended(&self) -> bool {
        matches!(self, SubmitOutcome::Appended(_))
    }
}

/// What a page shows for one room
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ClipboardView {
    pub room: String,
    /// Newest entry, if any
    pub latest: Option<Entry>,
    /// Every entry after the newest, newest first
    pub history: Vec<Entry>,
    /// Total number of entries
    pub count: usize,
}

impl ClipboardView {
    pub fn from_entries(room: &Room, mut entries: Vec<Entry>) -> Self {
        let count = entries.len();
        let latest = if entries.is_empty() {
            None
        } else {
            Some(entries.remove(0))
        };

        Self {
            room: room.to_string(),
            latest,
            history: entries,
            count,
        }
    }
}

/// Load/append/save cycle over an injected entry repository
pub struct ClipboardService {
    repo: Arc<dyn EntryRepository>,
    /// Serializes read-modify-write cycles within this process
    write_lock: Mutex<()>,
}

impl ClipboardService {
    pub fn new(repo: Arc<dyn EntryRepository>) -> Self {
        Self {
            repo,
            write_lock: Mutex::new(()),
        }
    }

    /// Current entries of the context's room
    pub async fn entries(&self, ctx: &RequestContext) -> StorageResult<Vec<Entry>> {
        self.repo.load(&ctx.room).await
    }

    /// Build the page view of the context's room
    pub async fn view(&self, ctx: &RequestContext) -> StorageResult<ClipboardView> {
        let entries = self.repo.load(&ctx.room).await?;
        Ok(ClipboardView::from_entries(&ctx.room, entries))
    }

    /// Prepend `text` to the room's store, trimming to the cap
    pub async fn submit(&self, ctx: &RequestContext, text: &str) -> StorageResult<SubmitOutcome> {
        let _guard = self.write_lock.lock().await;

        let entries = self.repo.load(&ctx.room).await?;
        match append_entry(&entries, text, ctx.now) {
            Some(updated) => {
                self.repo.save(&ctx.room, &updated).await?;
                tracing::info!(
                    room = %ctx.room,
                    chars = text.chars().count(),
                    entries = updated.len(),
                    "Entry saved"
                );
                Ok(SubmitOutcome::Appended(updated))
            }
            None => {
                tracing::debug!(room = %ctx.room, "Blank submission ignored");
                Ok(SubmitOutcome::Ignored(entries))
            }
        }
    }

    /// Remove every entry from the room's store
    pub async fn clear(&self, ctx: &RequestContext) -> StorageResult<()> {
        let _guard = self.write_lock.lock().await;
        self.repo.save(&ctx.room, &[]).await?;
        tracing::info!(room = %ctx.room, "All entries cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{JsonFileRepository, MemoryRepository, MAX_ENTRIES};
    use chrono::{Duration, TimeZone};
    use tempfile::tempdir;

    fn t0() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap()
    }

    fn memory_service() -> ClipboardService {
        ClipboardService::new(Arc::new(MemoryRepository::new()))
    }

    #[tokio::test]
    async fn test_hello_world_sequence() {
        let service = memory_service();
        let first = RequestContext::at(Room::Default, t0());
        let second = RequestContext::at(Room::Default, t0() + Duration::seconds(1));

        assert!(service.entries(&first).await.unwrap().is_empty());

        service.submit(&first, "hello").await.unwrap();
        service.submit(&second, "world").await.unwrap();

        let entries = service.entries(&first).await.unwrap();
        assert_eq!(
            entries,
            vec![
                Entry {
                    text: "world".to_string(),
                    time: "2024-05-01 09:30:01".to_string()
                },
                Entry {
                    text: "hello".to_string(),
                    time: "2024-05-01 09:30:00".to_string()
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_blank_submission_changes_nothing() {
        let service = memory_service();
        let ctx = RequestContext::at(Room::Default, t0());
        service.submit(&ctx, "keep").await.unwrap();

        let outcome = service.submit(&ctx, "  \n ").await.unwrap();
        assert!(!outcome.is_appended());
        assert_eq!(outcome.entries().len(), 1);

        let outcome = service.submit(&ctx, "").await.unwrap();
        assert!(!outcome.is_appended());
        assert_eq!(service.entries(&ctx).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_twenty_one_submissions_keep_newest_twenty() {
        let dir = tempdir().unwrap();
        let service = ClipboardService::new(Arc::new(JsonFileRepository::new(dir.path())));

        let mut previous_len = 0;
        for i in 0..21 {
            let ctx = RequestContext::at(Room::Default, t0() + Duration::seconds(i));
            let outcome = service.submit(&ctx, &format!("n{}", i)).await.unwrap();

            let entries = outcome.entries();
            assert_eq!(entries[0].text, format!("n{}", i));
            assert!(entries.len() >= previous_len);
            assert!(entries.len() <= MAX_ENTRIES);
            previous_len = entries.len();
        }

        let entries = service
            .entries(&RequestContext::new(Room::Default))
            .await
            .unwrap();
        let texts: Vec<_> = entries.iter().map(|e| e.text.as_str()).collect();
        let expected: Vec<String> = (1..21).rev().map(|i| format!("n{}", i)).collect();
        assert_eq!(texts, expected);
    }

    #[tokio::test]
    async fn test_concurrent_submissions_are_not_lost() {
        let dir = tempdir().unwrap();
        let service = Arc::new(ClipboardService::new(Arc::new(JsonFileRepository::new(
            dir.path(),
        ))));

        let mut handles = Vec::new();
        for i in 0..10 {
            let service = Arc::clone(&service);
            handles.push(tokio::spawn(async move {
                let ctx = RequestContext::new(Room::Default);
                service.submit(&ctx, &format!("tab {}", i)).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let entries = service
            .entries(&RequestContext::new(Room::Default))
            .await
            .unwrap();
        assert_eq!(entries.len(), 10);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_readers_of_corrupt_store_do_not_drop_submission() {
        for _ in 0..50 {
            let dir = tempdir().unwrap();
            let repo = JsonFileRepository::new(dir.path());
            std::fs::write(repo.path_for(&Room::Default), b"{corrupt").unwrap();
            let service = Arc::new(ClipboardService::new(Arc::new(repo)));

            let mut handles = Vec::new();
            for _ in 0..4 {
                let service = Arc::clone(&service);
                handles.push(tokio::spawn(async move {
                    let ctx = RequestContext::new(Room::Default);
                    service.view(&ctx).await.unwrap();
                }));
            }
            let writer = Arc::clone(&service);
            handles.push(tokio::spawn(async move {
                let ctx = RequestContext::new(Room::Default);
                assert!(writer.submit(&ctx, "precious").await.unwrap().is_appended());
            }));
            for handle in handles {
                handle.await.unwrap();
            }

            let entries = service
                .entries(&RequestContext::new(Room::Default))
                .await
                .unwrap();
            assert_eq!(entries.len(), 1);
            assert_eq!(entries[0].text, "precious");
        }
    }

    #[tokio::test]
    async fn test_clear() {
        let service = memory_service();
        let ctx = RequestContext::at(Room::Default, t0());
        service.submit(&ctx, "a").await.unwrap();
        service.submit(&ctx, "b").await.unwrap();

        service.clear(&ctx).await.unwrap();
        assert!(service.entries(&ctx).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rooms_are_isolated() {
        let service = memory_service();
        let room = Room::Named("zz99yy88".to_string());

        service
            .submit(&RequestContext::at(room.clone(), t0()), "secret")
            .await
            .unwrap();

        let default_view = service
            .view(&RequestContext::new(Room::Default))
            .await
            .unwrap();
        assert_eq!(default_view.count, 0);

        let room_view = service.view(&RequestContext::new(room)).await.unwrap();
        assert_eq!(room_view.count, 1);
        assert_eq!(room_view.room, "zz99yy88");
    }

    #[test]
    fn test_view_splits_latest_and_history() {
        let entries = vec![
            Entry::new("c", t0()),
            Entry::new("b", t0()),
            Entry::new("a", t0()),
        ];
        let view = ClipboardView::from_entries(&Room::Default, entries);

        assert_eq!(view.count, 3);
        assert_eq!(view.latest.unwrap().text, "c");
        assert_eq!(view.history.len(), 2);
        assert_eq!(view.history[0].text, "b");
        assert_eq!(view.room, "default");
    }

    #[test]
    fn test_empty_view() {
        let view = ClipboardView::from_entries(&Room::Default, Vec::new());
        assert_eq!(view.count, 0);
        assert!(view.latest.is_none());
        assert!(view.history.is_empty());
    }
}
