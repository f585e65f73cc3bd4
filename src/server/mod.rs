//! ChatServer Actor implementation
//!
//! `ServerState` owns every client and room. `ChatServer` is the single
//! dispatch worker: it drains the command queue and applies one command at
//! a time, so handlers never race and no locks are needed.
//!
//! Handlers are plain synchronous functions. They only mutate state and
//! enqueue into unbounded mailboxes, so the worker never suspends mid-command.

mod membership;
mod messaging;
mod session;


use std::collections::HashMap;
use std::num::NonZeroUsize;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::client::Client;
use crate::command::ServerCommand;
use crate::error::AppError;
use crate::message::ServerMessage;
use crate::room::Room;
use crate::types::ClientId;

/// Authoritative client and room registries
///
/// Invariant: a name is either a client nickname or a room name, never both.
#[derive(Debug, Default)]
pub struct ServerState {
    /// All connected clients: ClientId -> Client
    clients: HashMap<ClientId, Client>,
    /// Nickname index: nickname -> ClientId
    nicknames: HashMap<String, ClientId>,
    /// All rooms: name -> Room
    rooms: HashMap<String, Room>,
}

impl ServerState {
    /// Create empty registries
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a single command
    pub fn apply(&mut self, cmd: ServerCommand) {
        debug!("Dispatching {} from {}", cmd.kind(), cmd.client_id());

        if let ServerCommand::Connect { client_id, sender } = cmd {
            self.handle_connect(client_id, sender);
            return;
        }

        if !self.clients.contains_key(&cmd.client_id()) {
            debug!("Ignoring {} from unknown client {}", cmd.kind(), cmd.client_id());
            return;
        }

        match cmd {
            ServerCommand::Connect { .. } => {}
            ServerCommand::Identify {
                client_id,
                nickname,
            } => self.handle_identify(client_id, nickname),
            ServerCommand::JoinRoom { client_id, room } => self.handle_join_room(client_id, room),
            ServerCommand::Add {
                client_id,
                room,
                targets,
                forced,
            } => self.handle_add(client_id, room, targets, forced),
            ServerCommand::Reject { client_id, room } => self.handle_reject(client_id, room),
            ServerCommand::CreateRoom { client_id, room } => {
                self.handle_create_room(client_id, room)
            }
            ServerCommand::ListRooms { client_id } => self.handle_list_rooms(client_id),
            ServerCommand::Chat {
                client_id,
                target,
                body,
            } => self.handle_chat(client_id, target, body),
            ServerCommand::ListUsers { client_id } => self.handle_list_users(client_id),
            ServerCommand::ShowLog { client_id } => self.handle_show_log(client_id),
            ServerCommand::ListRequests { client_id, room } => {
                self.handle_list_requests(client_id, room)
            }
            ServerCommand::ListInvitations { client_id } => {
                self.handle_list_invitations(client_id)
            }
            ServerCommand::LeaveRoom { client_id, room } => self.handle_leave_room(client_id, room),
            ServerCommand::Close { client_id } => self.handle_close(client_id),
            ServerCommand::Malformed { client_id, error } => {
                self.handle_malformed(client_id, error)
            }
        }
    }

    /// Check whether a name belongs to a client or a room
    pub fn is_name_taken(&self, name: &str) -> bool {
        self.nicknames.contains_key(name) || self.rooms.contains_key(name)
    }

    /// Look up a client by session id
    pub fn client(&self, client_id: ClientId) -> Option<&Client> {
        self.clients.get(&client_id)
    }

    /// Look up a client by nickname
    pub fn client_by_nickname(&self, nickname: &str) -> Option<&Client> {
        self.nicknames
            .get(nickname)
            .and_then(|id| self.clients.get(id))
    }

    /// Look up a room by name
    pub fn room(&self, name: &str) -> Option<&Room> {
        self.rooms.get(name)
    }

    /// Number of connected clients
    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    /// Number of rooms
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Nickname of a client, if connected
    fn nickname_of(&self, client_id: ClientId) -> Option<String> {
        self.clients.get(&client_id).map(|c| c.nickname.clone())
    }

    /// Send a message to one client
    fn reply(&self, client_id: ClientId, msg: ServerMessage) {
        notify(&self.clients, client_id, msg);
    }

    fn log_totals(&self) {
        debug!(
            "Total clients: {}, Total rooms: {}",
            self.clients.len(),
            self.rooms.len()
        );
    }
}

/// Send a message to one client, ignoring closed mailboxes
///
/// A closed mailbox means the adapter is already tearing the connection
/// down and will submit `Close` on its own.
fn notify(clients: &HashMap<ClientId, Client>, client_id: ClientId, msg: ServerMessage) {
    if let Some(client) = clients.get(&client_id) {
        if client.send(msg).is_err() {
            debug!("Mailbox of {} is closed", client_id);
        }
    }
}

/// Send a room notice to every member except `sender`, logging it for each
///
/// The log entry is prefixed with the sender and room, e.g.
/// `from Bob to room Foo: /ROOMQUIT Bob left Foo`.
fn broadcast(
    clients: &mut HashMap<ClientId, Client>,
    room: &Room,
    sender: ClientId,
    sender_name: &str,
    msg: ServerMessage,
) {
    let prefix = format!("from {} to room {}: ", sender_name, room.name);
    for member in room.recipients(sender) {
        if let Some(client) = clients.get_mut(&member) {
            if client.deliver_logged(msg.clone(), &prefix).is_err() {
                debug!("Mailbox of {} is closed", member);
            }
        }
    }
}

/// Submission side of the command queue
///
/// Cloned into every connection task.
#[derive(Debug, Clone)]
pub struct ServerHandle {
    sender: mpsc::Sender<ServerCommand>,
}

impl ServerHandle {
    /// Wrap the sending half of the command queue
    pub fn new(sender: mpsc::Sender<ServerCommand>) -> Self {
        Self { sender }
    }

    /// Enqueue a command for the dispatch worker
    ///
    /// Commands are applied in submission order. Fails only if the worker
    /// has shut down.
    pub async fn submit(&self, cmd: ServerCommand) -> Result<(), AppError> {
        self.sender.send(cmd).await.map_err(|_| AppError::ChannelSend)
    }
}

/// The dispatch worker
///
/// Sole owner and mutator of `ServerState`.
pub struct ChatServer {
    state: ServerState,
    /// Command receiver channel
    receiver: mpsc::Receiver<ServerCommand>,
}

impl ChatServer {
    /// Create a new ChatServer with the given command receiver
    pub fn new(receiver: mpsc::Receiver<ServerCommand>) -> Self {
        Self {
            state: ServerState::new(),
            receiver,
        }
    }

    /// Create the command queue and the worker draining it
    pub fn channel(queue_size: NonZeroUsize) -> (ServerHandle, ChatServer) {
        let (tx, rx) = mpsc::channel(queue_size.get());
        (ServerHandle::new(tx), ChatServer::new(rx))
    }

    /// Run the ChatServer event loop
    ///
    /// Continuously receives and processes commands until all senders are
    /// dropped. Returns the final state.
    pub async fn run(mut self) -> ServerState {
        info!("ChatServer started");

        while let Some(cmd) = self.receiver.recv().await {
            self.state.apply(cmd);
        }

        info!("ChatServer shutting down");
        self.state
    }
}
