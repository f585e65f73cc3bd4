//! Room lifecycle and membership handlers
//!
//! Two paths lead into a room:
//! - invitation: a member invites a client (`Add`), the client accepts with
//!   `JoinRoom` and the invitation is consumed;
//! - request: a client without an invitation asks with `JoinRoom`, the
//!   request is queued and the owner approves it with `Add`.
//!
//! A forced `Add` skips both.

use tracing::{debug, info};

use super::{broadcast, notify, ServerState};
use crate::message::ServerMessage;
use crate::room::Room;
use crate::types::ClientId;

impl ServerState {
    /// Handle room creation
    pub(super) fn handle_create_room(&mut self, client_id: ClientId, name: String) {
        if self.is_name_taken(&name) {
            self.reply(client_id, ServerMessage::Taken);
            return;
        }

        info!("Client {} created room {}", client_id, name);
        self.rooms.insert(name.clone(), Room::new(name, client_id));

        self.reply(client_id, ServerMessage::Ok);
        self.log_totals();
    }

    /// Handle a join attempt
    ///
    /// Consumes an outstanding invitation if there is one; otherwise queues
    /// a join request and tells the owner about it.
    pub(super) fn handle_join_room(&mut self, client_id: ClientId, name: String) {
        let Some(room) = self.rooms.get_mut(&name) else {
            notify(&self.clients, client_id, ServerMessage::NotFound { name: None });
            return;
        };

        if room.contains(client_id) {
            notify(&self.clients, client_id, ServerMessage::Already { name: None });
            return;
        }

        let Some(client) = self.clients.get_mut(&client_id) else {
            return;
        };
        let nickname = client.nickname.clone();

        if client.take_invitation(&name) {
            room.add_member(client_id);
            room.remove_request(client_id);
            info!("Client {} joined room {} by invitation", client_id, name);

            notify(&self.clients, client_id, ServerMessage::Ok);
            let notice = ServerMessage::MemberJoined {
                nickname: nickname.clone(),
                room: name.clone(),
            };
            broadcast(&mut self.clients, room, client_id, &nickname, notice);
            return;
        }

        if !room.add_request(client_id) {
            debug!("Client {} already requested to join {}", client_id, name);
        }
        let owner = room.owner;

        notify(&self.clients, client_id, ServerMessage::Ok);
        notify(
            &self.clients,
            owner,
            ServerMessage::JoinRequested {
                nickname,
                room: name,
            },
        );
    }

    /// Handle invitation refusal
    ///
    /// Silently ignored when the client holds no invitation to the room.
    pub(super) fn handle_reject(&mut self, client_id: ClientId, name: String) {
        let Some(client) = self.clients.get_mut(&client_id) else {
            return;
        };
        if !client.take_invitation(&name) {
            return;
        }
        let nickname = client.nickname.clone();

        if let Some(room) = self.rooms.get(&name) {
            self.reply(
                room.owner,
                ServerMessage::InvitationRejected {
                    nickname,
                    room: name,
                },
            );
        }
        self.reply(client_id, ServerMessage::Ok);
    }

    /// Handle pending request listing (owner only)
    pub(super) fn handle_list_requests(&self, client_id: ClientId, name: String) {
        let Some(room) = self.rooms.get(&name) else {
            self.reply(client_id, ServerMessage::NotFound { name: None });
            return;
        };
        if !room.is_owner(client_id) {
            self.reply(client_id, ServerMessage::NoOwner);
            return;
        }

        let items = room
            .pending_requests
            .iter()
            .filter_map(|id| self.clients.get(id))
            .map(|c| c.nickname.clone())
            .collect();
        self.reply(client_id, ServerMessage::Listing { items });
    }

    /// Handle invitation listing
    pub(super) fn handle_list_invitations(&self, client_id: ClientId) {
        let Some(client) = self.clients.get(&client_id) else {
            return;
        };
        let items = client.invitations.clone();
        self.reply(client_id, ServerMessage::Listing { items });
    }

    /// Handle room listing
    pub(super) fn handle_list_rooms(&self, client_id: ClientId) {
        if self.rooms.is_empty() {
            self.reply(client_id, ServerMessage::Empty);
            return;
        }

        let mut items: Vec<String> = self.rooms.keys().cloned().collect();
        items.sort();
        self.reply(client_id, ServerMessage::Listing { items });
    }

    /// Handle invite / approve / forced add
    ///
    /// Each target is processed independently; the caller gets one notice
    /// per failed target and a final `Ok`.
    pub(super) fn handle_add(
        &mut self,
        client_id: ClientId,
        name: String,
        targets: Vec<String>,
        forced: bool,
    ) {
        let Some(room) = self.rooms.get_mut(&name) else {
            notify(&self.clients, client_id, ServerMessage::NotFound { name: None });
            return;
        };

        for target in targets {
            let Some(target_id) = self.nicknames.get(&target).copied() else {
                notify(&self.clients, client_id, ServerMessage::not_found(target));
                continue;
            };
            if room.contains(target_id) {
                notify(&self.clients, client_id, ServerMessage::already(target));
                continue;
            }
            let Some(target_client) = self.clients.get_mut(&target_id) else {
                continue;
            };

            if forced || room.has_request(target_id) {
                room.add_member(target_id);
                room.remove_request(target_id);
                target_client.take_invitation(&name);
                info!("Client {} added to room {}", target_id, name);
                if target_client
                    .send(ServerMessage::Added { room: name.clone() })
                    .is_err()
                {
                    debug!("Mailbox of {} is closed", target_id);
                }
            } else if target_client.invite(&name) {
                info!("Client {} invited to room {}", target_id, name);
                if target_client
                    .send(ServerMessage::Invited { room: name.clone() })
                    .is_err()
                {
                    debug!("Mailbox of {} is closed", target_id);
                }
            }
        }

        notify(&self.clients, client_id, ServerMessage::Ok);
    }

    /// Handle explicit room departure
    pub(super) fn handle_leave_room(&mut self, client_id: ClientId, name: String) {
        if self.leave_room(client_id, &name) {
            self.reply(client_id, ServerMessage::Ok);
        } else {
            self.reply(client_id, ServerMessage::NotInRoom);
        }
    }

    /// Remove a client from a room and notify the remaining members
    ///
    /// When the client owns the room, the room is deleted instead and every
    /// invitation to it is withdrawn. Returns false if the room does not
    /// exist or the client is neither its owner nor a member.
    pub(super) fn leave_room(&mut self, client_id: ClientId, name: &str) -> bool {
        let Some(room) = self.rooms.get(name) else {
            return false;
        };
        let Some(nickname) = self.nickname_of(client_id) else {
            return false;
        };

        if room.is_owner(client_id) {
            let Some(room) = self.rooms.remove(name) else {
                return false;
            };
            for client in self.clients.values_mut() {
                client.take_invitation(name);
            }

            info!("Room {} deleted by its owner {}", name, client_id);
            let notice = ServerMessage::RoomDeleted {
                owner: nickname.clone(),
                room: room.name.clone(),
            };
            broadcast(&mut self.clients, &room, client_id, &nickname, notice);
            self.log_totals();
            return true;
        }

        let Some(room) = self.rooms.get_mut(name) else {
            return false;
        };
        if !room.remove_member(client_id) {
            return false;
        }

        info!("Client {} left room {}", client_id, name);
        let notice = ServerMessage::MemberLeft {
            nickname: nickname.clone(),
            room: room.name.clone(),
        };
        broadcast(&mut self.clients, room, client_id, &nickname, notice);
        true
    }
}
