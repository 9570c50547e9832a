//! Room-based chat relay.
//!
//! Tracks connected participants and their room, and fans chat, presence and
//! typing events out to the members of a room over WebSocket.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
