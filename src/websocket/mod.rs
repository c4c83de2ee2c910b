//! WebSocket Pub/Sub
//!
//! Routes published messages to subscribed websocket clients.
//!
//! ## Architecture
//!
//! - **ConnectionHub**: Manages active connections and the topic tree
//! - **Handler**: Handles WebSocket upgrade and message processing
//! - **Messages**: Defines client and server message formats
//!
//! ## Usage
//!
//! Clients connect to `/ws` and subscribe to dot-delimited topics:
//! - `chat.room1` - exact topic
//! - `chat.*` - any single segment below `chat`
//! - `*` - every topic
//!
//! ## Example
//!
//! ```javascript
//! // Browser
//! const ws = new WebSocket('ws://localhost:8765/ws');
//!
//! ws.onopen = () => {
//!   ws.send(JSON.stringify({type: 'subscribe', topics: ['chat.*']}));
//!   ws.send(JSON.stringify({type: 'publish', topic: 'chat.room1', data: {text: 'hi'}}));
//! };
//!
//! ws.onmessage = (event) => {
//!   const msg = JSON.parse(event.data);
//!   console.log('Received:', msg);
//! };
//! ```

mod handler;
mod hub;
mod messages;

pub use handler::websocket_handler;
pub use hub::{ConnectionHub, ConnectionId, HubConfig, HubError};
pub use messages::{ClientMessage, ServerMessage, WsEvent};
