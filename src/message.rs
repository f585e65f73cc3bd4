//! Outbound message definitions
//!
//! Every line the server writes to a client is one `ServerMessage`. The
//! closed set of shapes lets tests and clients pattern-match instead of
//! parsing prose; `to_line` renders the text wire form and Serde's tagged
//! enum provides the JSON form.

use serde::Serialize;

/// Server → Client message
///
/// Uses tagged enum with snake_case naming for JSON output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Connection registered, placeholder nickname issued
    Welcome { nickname: String },

    /// Command succeeded
    Ok,
    /// Nickname or room name already belongs to a client or room
    Taken,
    /// Nickname does not have the canonical format
    NotValid,
    /// Room or client does not exist; `name` is set for per-target results
    NotFound {
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
    /// Client is already a member; `name` is set for per-target results
    Already {
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
    /// Caller is not a member of the room
    NotInRoom,
    /// Caller is not the room owner
    NoOwner,
    /// Listing with nothing to list
    Empty,
    /// Listing of names
    Listing { items: Vec<String> },
    /// Protocol-level error (unknown verb, bad syntax)
    Error { message: String },

    /// A client was admitted to a room through an invitation
    MemberJoined { nickname: String, room: String },
    /// A client asked to join a room owned by the recipient
    JoinRequested { nickname: String, room: String },
    /// A client declined an invitation to a room owned by the recipient
    InvitationRejected { nickname: String, room: String },
    /// Recipient was made a member of a room
    Added { room: String },
    /// Recipient was invited to a room
    Invited { room: String },

    /// Direct message to the recipient
    Direct { from: String, body: String },
    /// Message sent to a room the recipient belongs to
    Group {
        room: String,
        from: String,
        body: String,
    },
    /// Message sent to every connected client
    Broadcast { from: String, body: String },

    /// Room owner left, deleting the room
    RoomDeleted { owner: String, room: String },
    /// A member left the room
    MemberLeft { nickname: String, room: String },

    /// Recipient's message log
    Log { entries: Vec<String> },
}

impl ServerMessage {
    /// Per-target not-found result
    pub fn not_found(name: impl Into<String>) -> Self {
        ServerMessage::NotFound {
            name: Some(name.into()),
        }
    }

    /// Per-target already-a-member result
    pub fn already(name: impl Into<String>) -> Self {
        ServerMessage::Already {
            name: Some(name.into()),
        }
    }

    /// Render the text wire form (without the trailing newline)
    pub fn to_line(&self) -> String {
        match self {
            ServerMessage::Welcome { nickname } => format!("/WELCOME {}", nickname),
            ServerMessage::Ok => "Ok".to_string(),
            ServerMessage::Taken => "Taken".to_string(),
            ServerMessage::NotValid => "NotValid".to_string(),
            ServerMessage::NotFound { name: None } => "NotFound".to_string(),
            ServerMessage::NotFound { name: Some(name) } => format!("NotFound {}", name),
            ServerMessage::Already { name: None } => "Already".to_string(),
            ServerMessage::Already { name: Some(name) } => format!("Already {}", name),
            ServerMessage::NotInRoom => "NotInRoom".to_string(),
            ServerMessage::NoOwner => "NoOwner".to_string(),
            ServerMessage::Empty => "Empty".to_string(),
            ServerMessage::Listing { items } => format!("[{}]", items.join(" ")),
            ServerMessage::Error { message } => format!("Error: {}", message),
            ServerMessage::MemberJoined { nickname, room } => {
                format!("/ROOMJOIN {} joined {}", nickname, room)
            }
            ServerMessage::JoinRequested { nickname, room } => {
                format!("/ROOMJOIN {} request-to-join {}", nickname, room)
            }
            ServerMessage::InvitationRejected { nickname, .. } => {
                format!("/ROOMREJECT {} reject", nickname)
            }
            ServerMessage::Added { room } => format!("/ADDED {}", room),
            ServerMessage::Invited { room } => format!("/INVITED {}", room),
            ServerMessage::Direct { from, body } | ServerMessage::Broadcast { from, body } => {
                format!("/MESSAGE {} {}", from, body)
            }
            ServerMessage::Group { room, from, body } => {
                format!("/MESSAGE {}_{} {}", room, from, body)
            }
            ServerMessage::RoomDeleted { owner, room } => {
                format!("/ROOMQUIT {} deleted {}", owner, room)
            }
            ServerMessage::MemberLeft { nickname, room } => {
                format!("/ROOMQUIT {} left {}", nickname, room)
            }
            ServerMessage::Log { entries } => {
                format!("Your message log:\n {}", entries.join("\n"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_line() {
        let msg = ServerMessage::Listing {
            items: vec!["Foo".to_string(), "Bar".to_string()],
        };
        assert_eq!(msg.to_line(), "[Foo Bar]");
        assert_eq!(ServerMessage::Listing { items: vec![] }.to_line(), "[]");
    }

    #[test]
    fn test_per_target_lines() {
        assert_eq!(ServerMessage::not_found("Bob").to_line(), "NotFound Bob");
        assert_eq!(ServerMessage::already("Bob").to_line(), "Already Bob");
        assert_eq!(ServerMessage::NotFound { name: None }.to_line(), "NotFound");
    }

    #[test]
    fn test_room_notice_lines() {
        let joined = ServerMessage::MemberJoined {
            nickname: "Bob".to_string(),
            room: "Foo".to_string(),
        };
        assert_eq!(joined.to_line(), "/ROOMJOIN Bob joined Foo");

        let deleted = ServerMessage::RoomDeleted {
            owner: "Alice".to_string(),
            room: "Foo".to_string(),
        };
        assert_eq!(deleted.to_line(), "/ROOMQUIT Alice deleted Foo");
    }

    #[test]
    fn test_group_message_line() {
        let msg = ServerMessage::Group {
            room: "Foo".to_string(),
            from: "Bob".to_string(),
            body: "hello there".to_string(),
        };
        assert_eq!(msg.to_line(), "/MESSAGE Foo_Bob hello there");
    }

    #[test]
    fn test_server_message_serialize() {
        let json = serde_json::to_string(&ServerMessage::Ok).unwrap();
        assert_eq!(json, r#"{"type":"ok"}"#);

        let json = serde_json::to_string(&ServerMessage::NotFound { name: None }).unwrap();
        assert_eq!(json, r#"{"type":"not_found"}"#);

        let json = serde_json::to_string(&ServerMessage::Added {
            room: "Foo".to_string(),
        })
        .unwrap();
        assert!(json.contains("\"type\":\"added\""));
        assert!(json.contains("\"room\":\"Foo\""));
    }
}
