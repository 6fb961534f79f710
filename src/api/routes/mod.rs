//! API Routes
//!
//! Route handlers organized by functionality.

pub mod entries;
pub mod files;
pub mod health;
pub mod page;
pub mod rooms;
