//! Chat delivery in its three addressing modes.

use tracing::debug;

use super::{broadcast, notify, ServerState};
use crate::command::ChatTarget;
use crate::message::ServerMessage;
use crate::types::ClientId;

impl ServerState {
    /// Handle chat message
    ///
    /// Every delivered line is logged for its recipient, and the sender logs
    /// what it sent. The sender receives exactly one `Ok` per command.
    pub(super) fn handle_chat(&mut self, client_id: ClientId, target: ChatTarget, body: String) {
        let Some(from) = self.nickname_of(client_id) else {
            return;
        };

        match target {
            ChatTarget::User(nickname) => {
                let Some(target_id) = self.nicknames.get(&nickname).copied() else {
                    self.reply(client_id, ServerMessage::NotFound { name: None });
                    return;
                };
                if let Some(recipient) = self.clients.get_mut(&target_id) {
                    let msg = ServerMessage::Direct {
                        from,
                        body: body.clone(),
                    };
                    if recipient.deliver_logged(msg, "").is_err() {
                        debug!("Mailbox of {} is closed", target_id);
                    }
                }
                self.record_sent(client_id, format!("to {}: {}", nickname, body));
            }
            ChatTarget::Room(name) => {
                let Some(room) = self.rooms.get(&name) else {
                    self.reply(client_id, ServerMessage::NotFound { name: None });
                    return;
                };
                if !room.contains(client_id) {
                    self.reply(client_id, ServerMessage::NotInRoom);
                    return;
                }
                let msg = ServerMessage::Group {
                    room: name.clone(),
                    from: from.clone(),
                    body: body.clone(),
                };
                broadcast(&mut self.clients, room, client_id, &from, msg);
                self.record_sent(client_id, format!("to room {}: {}", name, body));
            }
            ChatTarget::Everyone => {
                for (id, recipient) in self.clients.iter_mut() {
                    if *id == client_id {
                        continue;
                    }
                    let msg = ServerMessage::Broadcast {
                        from: from.clone(),
                        body: body.clone(),
                    };
                    if recipient.deliver_logged(msg, "").is_err() {
                        debug!("Mailbox of {} is closed", id);
                    }
                }
                self.record_sent(client_id, format!("to everyone: {}", body));
            }
        }

        notify(&self.clients, client_id, ServerMessage::Ok);
    }

    fn record_sent(&mut self, client_id: ClientId, entry: String) {
        if let Some(sender) = self.clients.get_mut(&client_id) {
            sender.record(entry);
        }
    }
}
