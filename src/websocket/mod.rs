//! WebSocket Change Notifications
//!
//! Pushes entry-store and shelf changes to open pages so they can refresh
//! without polling.
//!
//! ## Architecture
//!
//! - **ConnectionHub**: Manages all active connections and subscriptions
//! - **Handler**: Handles WebSocket upgrade and message processing
//! - **Messages**: Defines client and server message formats
//!
//! ## Usage
//!
//! Clients connect to `/api/v1/ws` and subscribe to topics:
//! - `room.{room}` - One room's entries (e.g., `room.default`)
//! - `room.*` - Every room
//! - `shelf` - The shared file shelf
//!
//! ## Example
//!
//! ```javascript
//! const ws = new WebSocket('ws://localhost:8085/api/v1/ws');
//!
//! ws.onopen = () => {
//!   ws.send(JSON.stringify({type: 'subscribe', topics: ['room.default', 'shelf']}));
//! };
//!
//! ws.onmessage = (event) => {
//!   const msg = JSON.parse(event.data);
//!   if (msg.type === 'entries_updated') location.reload();
//! };
//! ```

mod handler;
mod hub;
mod messages;

pub use handler::websocket_handler;
pub use hub::{ConnectionHub, HubConfig, HubError};
pub use messages::{ClientMessage, ServerMessage, WsEvent, SHELF_TOPIC};
