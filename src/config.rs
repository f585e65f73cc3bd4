//! Command-line configuration

use std::num::NonZeroUsize;

use clap::Parser;

use crate::protocol::WireFormat;

/// Default listening port
pub const DEFAULT_PORT: u16 = 5000;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Port to listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Address to bind
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Outbound line format
    #[arg(long, value_enum, default_value_t = WireFormat::Text)]
    pub format: WireFormat,

    /// Bound of the command queue feeding the dispatch worker
    #[arg(long, default_value = "256")]
    pub queue_size: NonZeroUsize,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Config {
    /// Address to bind the listener to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Default tracing filter directive for this crate
    pub fn log_filter(&self) -> String {
        format!("room_chat_server={}", self.log_level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::parse_from(["room_chat_server"]);
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.bind_addr(), "0.0.0.0:5000");
        assert_eq!(config.format, WireFormat::Text);
        assert_eq!(config.queue_size.get(), 256);
        assert_eq!(config.log_filter(), "room_chat_server=info");
    }

    #[test]
    fn test_port_flags() {
        let config = Config::parse_from(["room_chat_server", "-p", "6000"]);
        assert_eq!(config.port, 6000);

        let config = Config::parse_from(["room_chat_server", "--port", "7000", "--host", "127.0.0.1"]);
        assert_eq!(config.bind_addr(), "127.0.0.1:7000");
    }

    #[test]
    fn test_json_format() {
        let config = Config::parse_from(["room_chat_server", "--format", "json"]);
        assert_eq!(config.format, WireFormat::Json);
    }

    #[test]
    fn test_invalid_port_rejected() {
        assert!(Config::try_parse_from(["room_chat_server", "--port", "nope"]).is_err());
    }

    #[test]
    fn test_queue_size() {
        let config = Config::parse_from(["room_chat_server", "--queue-size", "8"]);
        assert_eq!(config.queue_size.get(), 8);

        assert!(Config::try_parse_from(["room_chat_server", "--queue-size", "0"]).is_err());
        assert!(Config::try_parse_from(["room_chat_server", "--queue-size", "-1"]).is_err());
    }
}
