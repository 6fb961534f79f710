//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! These types are serialized/deserialized to/from JSON.

use serde::{Deserialize, Serialize};

use crate::storage::{Entry, SharedFile};

// ============================================
// ENTRY DTOs
// ============================================

/// Text submission, as JSON or as an HTML form
#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    #[serde(default)]
    pub text: String,
}

/// Text submission response
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    /// "ok" when stored, "ignored" for blank text
    pub status: String,
    /// The room's entries after the request, newest first
    pub entries: Vec<Entry>,
}

// ============================================
// ROOM DTOs
// ============================================

/// Newly generated room
#[derive(Debug, Serialize)]
pub struct NewRoomResponse {
    pub room: String,
    /// Path of the room's HTML page
    pub page: String,
}

// ============================================
// FILE DTOs
// ============================================

/// Shelf listing
#[derive(Debug, Serialize)]
pub struct FileListResponse {
    pub files: Vec<SharedFile>,
}

/// Result of a (possibly multi-file) upload
#[derive(Debug, Default, Serialize)]
pub struct UploadResponse {
    /// Names written to the shelf
    pub stored: Vec<String>,
    /// Names skipped because they already existed
    pub skipped: Vec<String>,
}

// ============================================
// HEALTH DTOs
// ============================================

/// Full health status
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "healthy", "degraded" or "unhealthy"
    pub status: String,
    pub storage: String,
    pub shelf: String,
    pub uptime_seconds: u64,
    pub ws_connections: usize,
    pub version: String,
}
