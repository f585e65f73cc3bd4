//! Room struct definition
//!
//! Represents a named room with an owner, a member set and a queue of
//! pending join requests.

use std::collections::HashSet;

use crate::types::ClientId;

/// Chat room
///
/// Members and requesters are tracked by session id so that nickname
/// changes never invalidate them. The owner is the creator; the room is
/// deleted (not handed over) when the owner leaves.
#[derive(Debug)]
pub struct Room {
    /// Room name, unique among rooms and client nicknames
    pub name: String,
    /// Room creator
    pub owner: ClientId,
    /// Admitted clients
    pub members: HashSet<ClientId>,
    /// Clients waiting for approval, in request order
    pub pending_requests: Vec<ClientId>,
}

impl Room {
    /// Create a new room with the owner as its only member
    pub fn new(name: String, owner: ClientId) -> Self {
        let mut members = HashSet::new();
        members.insert(owner);
        Self {
            name,
            owner,
            members,
            pending_requests: Vec::new(),
        }
    }

    /// Check if a client is a member of this room
    pub fn contains(&self, client_id: ClientId) -> bool {
        self.members.contains(&client_id)
    }

    /// Check if a client owns this room
    pub fn is_owner(&self, client_id: ClientId) -> bool {
        self.owner == client_id
    }

    /// Admit a client
    ///
    /// Returns false if the client was already a member.
    pub fn add_member(&mut self, client_id: ClientId) -> bool {
        self.members.insert(client_id)
    }

    /// Remove a member
    ///
    /// Returns false if the client was not a member.
    pub fn remove_member(&mut self, client_id: ClientId) -> bool {
        self.members.remove(&client_id)
    }

    /// Queue a join request unless the client already has one pending
    ///
    /// Returns false if the request was already queued.
    pub fn add_request(&mut self, client_id: ClientId) -> bool {
        if self.has_request(client_id) {
            return false;
        }
        self.pending_requests.push(client_id);
        true
    }

    /// Check whether a client has a pending join request
    pub fn has_request(&self, client_id: ClientId) -> bool {
        self.pending_requests.contains(&client_id)
    }

    /// Drop a client's pending join request
    ///
    /// Returns false if there was none.
    pub fn remove_request(&mut self, client_id: ClientId) -> bool {
        match self.pending_requests.iter().position(|id| *id == client_id) {
            Some(index) => {
                self.pending_requests.remove(index);
                true
            }
            None => false,
        }
    }

    /// Members other than `sender`
    pub fn recipients(&self, sender: ClientId) -> impl Iterator<Item = ClientId> + '_ {
        self.members.iter().copied().filter(move |id| *id != sender)
    }

    /// Get the number of members in the room
    pub fn member_count(&self) -> usize {
        self.members.len()
    }
}
