//! Client session handlers: registration, nickname changes, user listing,
//! message log and disconnect.

use tokio::sync::mpsc;
use tracing::{info, warn};

use super::ServerState;
use crate::client::Client;
use crate::error::ProtocolError;
use crate::message::ServerMessage;
use crate::types::{is_valid_nickname, placeholder_nickname, ClientId};

impl ServerState {
    /// Handle new client connection
    pub(super) fn handle_connect(
        &mut self,
        client_id: ClientId,
        sender: mpsc::UnboundedSender<ServerMessage>,
    ) {
        if self.clients.contains_key(&client_id) {
            warn!("Client {} is already registered", client_id);
            return;
        }

        let nickname = placeholder_nickname(client_id, |name| self.is_name_taken(name));
        info!("Client {} connected as '{}'", client_id, nickname);

        let client = Client::new(client_id, nickname.clone(), sender);
        self.nicknames.insert(nickname.clone(), client_id);
        self.clients.insert(client_id, client);

        self.reply(client_id, ServerMessage::Welcome { nickname });
        self.log_totals();
    }

    /// Handle nickname change
    pub(super) fn handle_identify(&mut self, client_id: ClientId, nickname: String) {
        if !is_valid_nickname(&nickname) {
            self.reply(client_id, ServerMessage::NotValid);
            return;
        }
        if self.is_name_taken(&nickname) {
            self.reply(client_id, ServerMessage::Taken);
            return;
        }

        let Some(client) = self.clients.get_mut(&client_id) else {
            return;
        };
        let old = std::mem::replace(&mut client.nickname, nickname.clone());
        self.nicknames.remove(&old);
        self.nicknames.insert(nickname.clone(), client_id);

        info!("Client {} renamed '{}' -> '{}'", client_id, old, nickname);
        self.reply(client_id, ServerMessage::Ok);
    }

    /// Handle user listing
    pub(super) fn handle_list_users(&self, client_id: ClientId) {
        if self.nicknames.is_empty() {
            self.reply(client_id, ServerMessage::Empty);
            return;
        }

        let mut items: Vec<String> = self.nicknames.keys().cloned().collect();
        items.sort();
        self.reply(client_id, ServerMessage::Listing { items });
    }

    /// Handle message log request
    pub(super) fn handle_show_log(&self, client_id: ClientId) {
        let Some(client) = self.clients.get(&client_id) else {
            return;
        };
        let entries = client.message_log.clone();
        self.reply(client_id, ServerMessage::Log { entries });
    }

    /// Handle client disconnection (explicit close or transport failure)
    ///
    /// Leaves every room the client belongs to or owns, with the same
    /// semantics as an explicit leave, then unregisters the client and drops
    /// its mailbox, which ends the connection's write task.
    pub(super) fn handle_close(&mut self, client_id: ClientId) {
        let mut rooms: Vec<String> = self
            .rooms
            .values()
            .filter(|room| room.contains(client_id) || room.is_owner(client_id))
            .map(|room| room.name.clone())
            .collect();
        rooms.sort();

        for room in rooms {
            self.leave_room(client_id, &room);
        }

        for room in self.rooms.values_mut() {
            room.remove_request(client_id);
        }

        let Some(client) = self.clients.remove(&client_id) else {
            return;
        };
        self.nicknames.remove(&client.nickname);
        info!("Client {} ('{}') disconnected", client_id, client.nickname);

        let _ = client.send(ServerMessage::Ok);
        drop(client);

        self.log_totals();
    }

    /// Handle a line that failed validation
    pub(super) fn handle_malformed(&self, client_id: ClientId, error: ProtocolError) {
        warn!("Protocol error from {}: {}", client_id, error);
        self.reply(
            client_id,
            ServerMessage::Error {
                message: error.to_string(),
            },
        );
    }
}
