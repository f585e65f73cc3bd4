//! Client session state
//!
//! Represents a connected client: identity, mailbox and the transient
//! protocol state (pending invitations, message log).

use tokio::sync::mpsc;

use crate::error::SendError;
use crate::message::ServerMessage;
use crate::types::ClientId;

/// Connected client information
///
/// The mailbox is the sending half of the adapter's outbound channel. The
/// core only ever enqueues into it; dropping the `Client` closes it.
#[derive(Debug)]
pub struct Client {
    /// Stable session identifier
    pub id: ClientId,
    /// Current nickname (unique among clients and rooms)
    pub nickname: String,
    /// Server → Client message channel
    pub sender: mpsc::UnboundedSender<ServerMessage>,
    /// Rooms this client was invited to, in invitation order
    pub invitations: Vec<String>,
    /// Delivered and sent chat lines
    pub message_log: Vec<String>,
}

impl Client {
    /// Create a new client with the given ID, nickname and sender channel
    pub fn new(id: ClientId, nickname: String, sender: mpsc::UnboundedSender<ServerMessage>) -> Self {
        Self {
            id,
            nickname,
            sender,
            invitations: Vec::new(),
            message_log: Vec::new(),
        }
    }

    /// Send a message to this client
    ///
    /// Never blocks. Returns an error if the channel is closed (client
    /// disconnected).
    pub fn send(&self, msg: ServerMessage) -> Result<(), SendError> {
        self.sender.send(msg).map_err(|_| SendError::ChannelClosed)
    }

    /// Send a message and append it to the message log
    ///
    /// The logged entry is `prefix` followed by the text form of `msg`.
    pub fn deliver_logged(&mut self, msg: ServerMessage, prefix: &str) -> Result<(), SendError> {
        self.message_log.push(format!("{}{}", prefix, msg.to_line()));
        self.send(msg)
    }

    /// Append a line to the message log without sending anything
    pub fn record(&mut self, entry: String) {
        self.message_log.push(entry);
    }

    /// Check for an outstanding invitation to `room`
    pub fn is_invited(&self, room: &str) -> bool {
        self.invitations.iter().any(|r| r == room)
    }

    /// Record an invitation unless one to the same room is already pending
    ///
    /// Returns false if the invitation already existed.
    pub fn invite(&mut self, room: &str) -> bool {
        if self.is_invited(room) {
            return false;
        }
        self.invitations.push(room.to_string());
        true
    }

    /// Consume the invitation to `room`
    ///
    /// Returns false if there was none.
    pub fn take_invitation(&mut self, room: &str) -> bool {
        match self.invitations.iter().position(|r| r == room) {
            Some(index) => {
                self.invitations.remove(index);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> (Client, mpsc::UnboundedReceiver<ServerMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Client::new(ClientId::new(), "Alice".to_string(), tx), rx)
    }

    #[test]
    fn test_client_creation() {
        let (client, _rx) = client();

        assert_eq!(client.nickname, "Alice");
        assert!(client.invitations.is_empty());
        assert!(client.message_log.is_empty());
    }

    #[test]
    fn test_send_after_receiver_dropped() {
        let (client, rx) = client();
        drop(rx);
        assert!(client.send(ServerMessage::Ok).is_err());
    }

    #[test]
    fn test_deliver_logged() {
        let (mut client, mut rx) = client();
        let msg = ServerMessage::Direct {
            from: "Bob".to_string(),
            body: "hi".to_string(),
        };

        client.deliver_logged(msg.clone(), "").unwrap();

        assert_eq!(rx.try_recv().unwrap(), msg);
        assert_eq!(client.message_log, vec!["/MESSAGE Bob hi".to_string()]);
    }

    #[test]
    fn test_invitations_are_deduplicated_and_consumed_once() {
        let (mut client, _rx) = client();

        assert!(client.invite("Foo"));
        assert!(!client.invite("Foo"));
        assert!(client.invite("Bar"));
        assert_eq!(client.invitations, vec!["Foo", "Bar"]);

        assert!(client.take_invitation("Foo"));
        assert!(!client.take_invitation("Foo"));
        assert!(!client.is_invited("Foo"));
        assert!(client.is_invited("Bar"));
    }
}
