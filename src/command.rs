//! Command model
//!
//! One variant per command kind, each carrying the originating client and
//! its already-validated arguments. Produced by the connection adapter,
//! consumed by the dispatch worker.

use tokio::sync::mpsc;

use crate::error::ProtocolError;
use crate::message::ServerMessage;
use crate::types::ClientId;

/// Addressing mode of a chat message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatTarget {
    /// `-u <nick>`: a single client
    User(String),
    /// `-g <room>`: every other member of a room
    Room(String),
    /// No address flag: every other connected client
    Everyone,
}

/// Commands submitted to the dispatch worker
#[derive(Debug)]
pub enum ServerCommand {
    /// New connection; registers the client's mailbox
    Connect {
        client_id: ClientId,
        sender: mpsc::UnboundedSender<ServerMessage>,
    },
    /// Change nickname
    Identify {
        client_id: ClientId,
        nickname: String,
    },
    /// Accept an invitation or ask the owner for admission
    JoinRoom { client_id: ClientId, room: String },
    /// Invite, approve or force-add clients to a room
    Add {
        client_id: ClientId,
        room: String,
        targets: Vec<String>,
        forced: bool,
    },
    /// Decline an invitation
    Reject { client_id: ClientId, room: String },
    /// Create a room owned by the caller
    CreateRoom { client_id: ClientId, room: String },
    /// List all rooms
    ListRooms { client_id: ClientId },
    /// Send a chat message
    Chat {
        client_id: ClientId,
        target: ChatTarget,
        body: String,
    },
    /// List all clients
    ListUsers { client_id: ClientId },
    /// Show the caller's message log
    ShowLog { client_id: ClientId },
    /// List pending join requests of a room (owner only)
    ListRequests { client_id: ClientId, room: String },
    /// List the caller's pending invitations
    ListInvitations { client_id: ClientId },
    /// Leave a room (deletes it when the caller owns it)
    LeaveRoom { client_id: ClientId, room: String },
    /// Explicit close or transport failure
    Close { client_id: ClientId },
    /// Line that failed validation at the adapter boundary
    Malformed {
        client_id: ClientId,
        error: ProtocolError,
    },
}

impl ServerCommand {
    /// The client this command originates from
    pub fn client_id(&self) -> ClientId {
        match self {
            ServerCommand::Connect { client_id, .. }
            | ServerCommand::Identify { client_id, .. }
            | ServerCommand::JoinRoom { client_id, .. }
            | ServerCommand::Add { client_id, .. }
            | ServerCommand::Reject { client_id, .. }
            | ServerCommand::CreateRoom { client_id, .. }
            | ServerCommand::ListRooms { client_id }
            | ServerCommand::Chat { client_id, .. }
            | ServerCommand::ListUsers { client_id }
            | ServerCommand::ShowLog { client_id }
            | ServerCommand::ListRequests { client_id, .. }
            | ServerCommand::ListInvitations { client_id }
            | ServerCommand::LeaveRoom { client_id, .. }
            | ServerCommand::Close { client_id }
            | ServerCommand::Malformed { client_id, .. } => *client_id,
        }
    }

    /// Short kind name used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            ServerCommand::Connect { .. } => "connect",
            ServerCommand::Identify { .. } => "identify",
            ServerCommand::JoinRoom { .. } => "join_room",
            ServerCommand::Add { .. } => "add",
            ServerCommand::Reject { .. } => "reject",
            ServerCommand::CreateRoom { .. } => "create_room",
            ServerCommand::ListRooms { .. } => "list_rooms",
            ServerCommand::Chat { .. } => "chat",
            ServerCommand::ListUsers { .. } => "list_users",
            ServerCommand::ShowLog { .. } => "show_log",
            ServerCommand::ListRequests { .. } => "list_requests",
            ServerCommand::ListInvitations { .. } => "list_invitations",
            ServerCommand::LeaveRoom { .. } => "leave_room",
            ServerCommand::Close { .. } => "close",
            ServerCommand::Malformed { .. } => "malformed",
        }
    }
}
