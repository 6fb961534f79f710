//! WebSocket Message Types
//!
//! Defines all message types for WebSocket communication between
//! browser pages and the ClipShelf server.

use serde::{Deserialize, Serialize};

use crate::storage::{Entry, Room, SharedFile};

/// Topic carrying shelf changes
pub const SHELF_TOPIC: &str = "shelf";

/// Messages sent from client to server
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Subscribe to topics for change notifications
    Subscribe {
        /// Topics to subscribe to (e.g., "room.default", "room.*", "shelf")
        topics: Vec<String>,
    },
    /// Unsubscribe from topics
    Unsubscribe { topics: Vec<String> },
    /// Ping for keepalive
    Ping,
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// A room's entry store changed
    EntriesUpdated {
        room: String,
        /// Newest entry after the change, absent when the store was cleared
        latest: Option<Entry>,
        count: usize,
    },
    /// The shelf's file set changed
    ShelfUpdated { files: Vec<SharedFile> },
    /// Subscription confirmed
    Subscribed { topics: Vec<String> },
    /// Unsubscription confirmed
    Unsubscribed { topics: Vec<String> },
    /// Pong response to ping
    Pong,
    /// Error message
    Error { message: String },
    /// Connection established
    Connected { connection_id: String },
}

/// Internal event for broadcasting through the hub
#[derive(Debug, Clone)]
pub struct WsEvent {
    /// Topic this event belongs to (e.g., "room.default")
    pub topic: String,
    /// The message to send to subscribers
    pub message: ServerMessage,
}

impl WsEvent {
    /// A room's entries changed
    pub fn entries_updated(room: &Room, entries: &[Entry]) -> Self {
        Self {
            topic: room.topic(),
            message: ServerMessage::EntriesUpdated {
                room: room.to_string(),
                latest: entries.first().cloned(),
                count: entries.len(),
            },
        }
    }

    /// The shelf changed
    pub fn shelf_updated(files: Vec<SharedFile>) -> Self {
        Self {
            topic: SHELF_TOPIC.to_string(),
            message: ServerMessage::ShelfUpdated { files },
        }
    }
}
