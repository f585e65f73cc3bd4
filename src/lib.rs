//! Room Chat Server Library
//!
//! A line-oriented TCP chat server with named rooms and owner-controlled
//! membership, built on tokio using the Actor pattern for state management.
//!
//! # Features
//! - Nicknames in UpperCamelCase, unique among clients and rooms
//! - Room creation; the creator owns the room
//! - Join requests approved by the owner, invitations accepted by the invitee
//! - Forced adds
//! - Direct, room and broadcast messages with a per-client message log
//! - Room deletion when the owner leaves; cleanup on disconnect
//!
//! # Architecture
//! Uses the Actor pattern with `mpsc` channels:
//! - `ChatServer` is the single dispatch worker owning all state
//! - Each connection has a `handler` task submitting commands to it
//! - No locks needed - every command is applied atomically, in order
//!
//! # Example
//! ```ignore
//! use std::num::NonZeroUsize;
//! use tokio::net::TcpListener;
//! use room_chat_server::{handle_connection, ChatServer, WireFormat};
//!
//! #[tokio::main]
//! async fn main() {
//!     let listener = TcpListener::bind("127.0.0.1:5000").await.unwrap();
//!     let (server, worker) = ChatServer::channel(NonZeroUsize::new(256).unwrap());
//!
//!     tokio::spawn(worker.run());
//!
//!     while let Ok((stream, _)) = listener.accept().await {
//!         tokio::spawn(handle_connection(stream, server.clone(), WireFormat::Text));
//!     }
//! }
//! ```

pub mod client;
pub mod codec;
pub mod command;
pub mod config;
pub mod error;
pub mod handler;
pub mod message;
pub mod protocol;
pub mod room;
pub mod server;
pub mod types;

// Re-export main types for convenience
pub use client::Client;
pub use command::{ChatTarget, ServerCommand};
pub use config::Config;
pub use error::{AppError, ProtocolError, SendError};
pub use handler::handle_connection;
pub use message::ServerMessage;
pub use protocol::{parse_line, WireFormat};
pub use room::Room;
pub use server::{ChatServer, ServerHandle, ServerState};
pub use types::ClientId;
