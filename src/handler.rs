//! TCP connection handler
//!
//! Handles individual client connections: line framing, command parsing,
//! and bidirectional communication with the ChatServer.

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_util::codec::Framed;
use tracing::{debug, error, info, warn};

use crate::codec::{Inbound, LineCodec};
use crate::command::ServerCommand;
use crate::error::{AppError, ProtocolError};
use crate::message::ServerMessage;
use crate::protocol::{command_from_line, WireFormat};
use crate::server::ServerHandle;
use crate::types::ClientId;

/// Longest accepted inbound line, in bytes
pub const MAX_LINE_LENGTH: usize = 8 * 1024;

/// Handle a new TCP connection
///
/// Registers the client with the ChatServer, then runs a read task
/// (socket lines -> commands) and a write task (mailbox -> socket lines)
/// until either side ends. Always submits `Close` on the way out.
pub async fn handle_connection(
    stream: TcpStream,
    server: ServerHandle,
    format: WireFormat,
) -> Result<(), AppError> {
    let peer_addr = stream
        .peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    let framed = Framed::new(stream, LineCodec::new(MAX_LINE_LENGTH));
    let (mut line_sink, mut line_stream) = framed.split();

    // Generate client ID
    let client_id = ClientId::new();
    info!("Client {} connected from {}", client_id, peer_addr);

    // Create mailbox for server -> client messages
    let (msg_tx, mut msg_rx) = mpsc::unbounded_channel::<ServerMessage>();

    // Register with ChatServer
    if let Err(e) = server
        .submit(ServerCommand::Connect {
            client_id,
            sender: msg_tx,
        })
        .await
    {
        error!("Failed to register client {} - server closed", client_id);
        return Err(e);
    }

    let server_read = server.clone();

    // Spawn read task (lines -> ServerCommand)
    let mut read_task = tokio::spawn(async move {
        while let Some(line_result) = line_stream.next().await {
            match line_result {
                Ok(frame) => {
                    let cmd = match frame {
                        Inbound::Line(line) => match command_from_line(client_id, &line) {
                            Some(cmd) => cmd,
                            None => continue,
                        },
                        Inbound::Oversized => {
                            warn!("Oversized line from {}", client_id);
                            ServerCommand::Malformed {
                                client_id,
                                error: ProtocolError::LineTooLong,
                            }
                        }
                    };
                    let closing = matches!(cmd, ServerCommand::Close { .. });
                    if server_read.submit(cmd).await.is_err() {
                        debug!("Server closed, ending read task for {}", client_id);
                        break;
                    }
                    if closing {
                        debug!("Client {} requested close", client_id);
                        break;
                    }
                }
                Err(e) => {
                    error!("Read error for {}: {}", client_id, e);
                    break;
                }
            }
        }
        debug!("Read task ended for {}", client_id);
    });

    // Spawn write task (ServerMessage -> lines)
    let mut write_task = tokio::spawn(async move {
        while let Some(msg) = msg_rx.recv().await {
            match format.render(&msg) {
                Ok(line) => {
                    if line_sink.send(line).await.is_err() {
                        debug!("Socket send failed, ending write task");
                        break;
                    }
                }
                Err(e) => {
                    error!("Failed to render message: {}", e);
                    // Continue - don't break on serialization errors
                }
            }
        }
        debug!("Write task ended for client");

        let _ = line_sink.close().await;
    });

    // Wait for either task to complete. The write task is left running after
    // a read-side exit so it can flush the final acknowledgment; it ends when
    // the worker drops the mailbox.
    tokio::select! {
        _ = &mut read_task => {
            debug!("Read task completed for {}", client_id);
        }
        _ = &mut write_task => {
            debug!("Write task completed for {}", client_id);
            read_task.abort();
        }
    }

    // Send close command (no-op if the client already closed)
    let _ = server.submit(ServerCommand::Close { client_id }).await;

    info!("Client {} disconnected", client_id);

    Ok(())
}
