//! End-to-end session over a real TCP socket

use std::num::NonZeroUsize;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;

use room_chat_server::{handle_connection, ChatServer, WireFormat};

struct TestClient {
    lines: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
}

impl TestClient {
    async fn connect(addr: &str) -> Self {
        let stream = TcpStream::connect(addr).await.unwrap();
        let (read, writer) = stream.into_split();
        let mut client = Self {
            lines: BufReader::new(read).lines(),
            writer,
        };
        let welcome = client.recv().await.unwrap();
        assert!(welcome.starts_with("/WELCOME anonymous"), "got {}", welcome);
        client
    }

    async fn send(&mut self, line: &str) {
        self.writer
            .write_all(format!("{}\n", line).as_bytes())
            .await
            .unwrap();
    }

    async fn send_raw(&mut self, bytes: &[u8]) {
        self.writer.write_all(bytes).await.unwrap();
    }

    async fn recv(&mut self) -> Option<String> {
        timeout(Duration::from_secs(5), self.lines.next_line())
            .await
            .expect("timed out waiting for a line")
            .unwrap()
    }

    async fn expect(&mut self, expected: &str) {
        assert_eq!(self.recv().await.as_deref(), Some(expected));
    }
}

async fn start_server(format: WireFormat) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    let (server, worker) = ChatServer::channel(NonZeroUsize::new(64).unwrap());
    tokio::spawn(worker.run());

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            tokio::spawn(handle_connection(stream, server.clone(), format));
        }
    });
    addr
}

#[tokio::test]
async fn test_room_workflow_over_tcp() {
    let addr = start_server(WireFormat::Text).await;
    let mut alice = TestClient::connect(&addr).await;
    let mut bob = TestClient::connect(&addr).await;

    alice.send("/ID Alice").await;
    alice.expect("Ok").await;
    bob.send("/ID Bob").await;
    bob.expect("Ok").await;
    bob.send("/ID Alice").await;
    bob.expect("Taken").await;

    alice.send("/ROOM Foo").await;
    alice.expect("Ok").await;

    bob.send("/JOIN Foo").await;
    bob.expect("Ok").await;
    alice.expect("/ROOMJOIN Bob request-to-join Foo").await;

    alice.send("/REQUESTLIST Foo").await;
    alice.expect("[Bob]").await;

    alice.send("/ADD Foo Bob").await;
    alice.expect("Ok").await;
    bob.expect("/ADDED Foo").await;

    bob.send("/CHAT -g Foo -m hello there").await;
    bob.expect("Ok").await;
    alice.expect("/MESSAGE Foo_Bob hello there").await;

    bob.send("/DANCE").await;
    bob.expect("Error: Unknown command: /DANCE").await;
    bob.send("/CHAT -g Foo hello").await;
    bob.expect("Error: Bad Syntax").await;

    alice.send("/CLOSE").await;
    alice.expect("Ok").await;
    assert_eq!(alice.recv().await, None);

    bob.expect("/ROOMQUIT Alice deleted Foo").await;
    bob.send("/ROOMLIST").await;
    bob.expect("Empty").await;
    bob.send("/USERLIST").await;
    bob.expect("[Bob]").await;
}

#[tokio::test]
async fn test_dropped_connection_leaves_rooms() {
    let addr = start_server(WireFormat::Text).await;
    let mut alice = TestClient::connect(&addr).await;
    let mut bob = TestClient::connect(&addr).await;

    alice.send("/ID Alice").await;
    alice.expect("Ok").await;
    bob.send("/ID Bob").await;
    bob.expect("Ok").await;
    alice.send("/ROOM Foo").await;
    alice.expect("Ok").await;
    alice.send("/ADD -f Foo Bob").await;
    alice.expect("Ok").await;
    bob.expect("/ADDED Foo").await;

    drop(bob);

    alice.expect("/ROOMQUIT Bob left Foo").await;
    alice.send("/USERLIST").await;
    alice.expect("[Alice]").await;
}

#[tokio::test]
async fn test_json_wire_format() {
    let addr = start_server(WireFormat::Json).await;
    let stream = TcpStream::connect(&addr).await.unwrap();
    let (read, mut writer) = stream.into_split();
    let mut lines = BufReader::new(read).lines();

    let welcome = lines.next_line().await.unwrap().unwrap();
    let welcome: serde_json::Value = serde_json::from_str(&welcome).unwrap();
    assert_eq!(welcome["type"], "welcome");

    writer.write_all(b"/ROOMLIST\n").await.unwrap();
    let reply = timeout(Duration::from_secs(5), lines.next_line())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert_eq!(reply, r#"{"type":"empty"}"#);
}

#[tokio::test]
async fn test_invalid_utf8_keeps_session() {
    let addr = start_server(WireFormat::Text).await;
    let mut alice = TestClient::connect(&addr).await;
    let mut bob = TestClient::connect(&addr).await;

    alice.send("/ID Alice").await;
    alice.expect("Ok").await;
    bob.send("/ID Bob").await;
    bob.expect("Ok").await;
    alice.send("/ROOM Foo").await;
    alice.expect("Ok").await;
    alice.send("/ADD -f Foo Bob").await;
    alice.expect("Ok").await;
    bob.expect("/ADDED Foo").await;

    alice.send_raw(b"/CHAT -m caf\xe9\n").await;
    alice.expect("Ok").await;
    bob.expect("/MESSAGE Alice caf\u{FFFD}").await;

    alice.send("/ROOMLIST").await;
    alice.expect("[Foo]").await;
    bob.send("/ROOMLIST").await;
    bob.expect("[Foo]").await;
}

#[tokio::test]
async fn test_oversized_line_reported() {
    let addr = start_server(WireFormat::Text).await;
    let mut alice = TestClient::connect(&addr).await;

    let long = format!("/CHAT -m {}\n", "x".repeat(room_chat_server::handler::MAX_LINE_LENGTH));
    alice.send_raw(long.as_bytes()).await;
    alice.expect("Error: Line too long").await;

    alice.send("/ID Alice").await;
    alice.expect("Ok").await;
}
