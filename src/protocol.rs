//! Text wire protocol
//!
//! Inbound: one command per line, a verb token followed by space-separated
//! arguments. Outbound: one `ServerMessage` per line, either in its text form
//! or as a JSON object.

use clap::ValueEnum;

use crate::command::{ChatTarget, ServerCommand};
use crate::error::{AppError, ProtocolError};
use crate::message::ServerMessage;
use crate::types::ClientId;

/// Outbound line format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum WireFormat {
    /// Plain text lines (`Ok`, `/MESSAGE Bob hi`, ...)
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

impl WireFormat {
    /// Render a message as a single outbound line (without newline)
    pub fn render(self, msg: &ServerMessage) -> Result<String, AppError> {
        match self {
            WireFormat::Text => Ok(msg.to_line()),
            WireFormat::Json => Ok(serde_json::to_string(msg)?),
        }
    }
}

/// Parse one inbound line into a command
///
/// Returns `Ok(None)` for blank lines.
pub fn parse_line(client_id: ClientId, line: &str) -> Result<Option<ServerCommand>, ProtocolError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let Some((&verb, args)) = tokens.split_first() else {
        return Ok(None);
    };

    let cmd = match verb {
        "/ID" => {
            if args.is_empty() {
                return Err(ProtocolError::BadSyntax);
            }
            // Extra tokens stay in the nickname so format validation rejects them
            ServerCommand::Identify {
                client_id,
                nickname: args.join(" "),
            }
        }
        "/JOIN" => ServerCommand::JoinRoom {
            client_id,
            room: first_arg(args)?,
        },
        "/ADD" => parse_add(client_id, args)?,
        "/REJECT" => ServerCommand::Reject {
            client_id,
            room: first_arg(args)?,
        },
        "/ROOM" => ServerCommand::CreateRoom {
            client_id,
            room: first_arg(args)?,
        },
        "/ROOMLIST" => ServerCommand::ListRooms { client_id },
        "/CHAT" => parse_chat(client_id, args)?,
        "/USERLIST" => ServerCommand::ListUsers { client_id },
        "/CHATLIST" => ServerCommand::ShowLog { client_id },
        "/REQUESTLIST" => ServerCommand::ListRequests {
            client_id,
            room: first_arg(args)?,
        },
        "/INVITELIST" => ServerCommand::ListInvitations { client_id },
        "/QUIT" => ServerCommand::LeaveRoom {
            client_id,
            room: first_arg(args)?,
        },
        "/CLOSE" => ServerCommand::Close { client_id },
        other => return Err(ProtocolError::UnknownCommand(other.to_string())),
    };
    Ok(Some(cmd))
}

/// Build the command for a line, turning validation failures into `Malformed`
pub fn command_from_line(client_id: ClientId, line: &str) -> Option<ServerCommand> {
    match parse_line(client_id, line) {
        Ok(cmd) => cmd,
        Err(error) => Some(ServerCommand::Malformed { client_id, error }),
    }
}

fn first_arg(args: &[&str]) -> Result<String, ProtocolError> {
    args.first()
        .map(|s| s.to_string())
        .ok_or(ProtocolError::BadSyntax)
}

/// `/ADD [-f] <room> <nick>...`
fn parse_add(client_id: ClientId, args: &[&str]) -> Result<ServerCommand, ProtocolError> {
    let (forced, rest) = match args.split_first() {
        Some((&"-f", rest)) => (true, rest),
        _ => (false, args),
    };
    let Some((room, targets)) = rest.split_first() else {
        return Err(ProtocolError::BadSyntax);
    };

    Ok(ServerCommand::Add {
        client_id,
        room: room.to_string(),
        targets: targets.iter().map(|s| s.to_string()).collect(),
        forced,
    })
}

/// `/CHAT [-u <nick> | -g <room>] -m <body...>`
fn parse_chat(client_id: ClientId, args: &[&str]) -> Result<ServerCommand, ProtocolError> {
    let (target, rest) = match args {
        ["-u", nick, rest @ ..] if *nick != "-m" => (ChatTarget::User(nick.to_string()), rest),
        ["-g", room, rest @ ..] if *room != "-m" => (ChatTarget::Room(room.to_string()), rest),
        _ => (ChatTarget::Everyone, args),
    };

    let Some((&"-m", body)) = rest.split_first() else {
        return Err(ProtocolError::BadSyntax);
    };

    Ok(ServerCommand::Chat {
        client_id,
        target,
        body: body.join(" "),
    })
}
