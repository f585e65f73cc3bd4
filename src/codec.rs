//! Line framing for the text protocol
//!
//! Splits the inbound byte stream on `\n` and decodes each line lossily, so
//! stray non-UTF-8 bytes never end a session. Oversized lines are skipped up
//! to the next newline and reported once as `Inbound::Oversized`.

use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

/// One decoded inbound frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// A complete line without its terminator
    Line(String),
    /// A line longer than the limit was dropped
    Oversized,
}

/// Newline-delimited codec with lossy UTF-8 decoding
#[derive(Debug, Clone)]
pub struct LineCodec {
    max_length: usize,
    /// Dropping bytes until the next newline
    discarding: bool,
}

impl LineCodec {
    pub fn new(max_length: usize) -> Self {
        Self {
            max_length,
            discarding: false,
        }
    }
}

fn decode_line(bytes: &[u8]) -> String {
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}

impl Decoder for LineCodec {
    type Item = Inbound;
    type Error = std::io::Error;

    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<Inbound>, std::io::Error> {
        loop {
            let newline = buf.iter().position(|b| *b == b'\n');

            if self.discarding {
                match newline {
                    Some(index) => {
                        buf.advance(index + 1);
                        self.discarding = false;
                        continue;
                    }
                    None => {
                        buf.clear();
                        return Ok(None);
                    }
                }
            }

            return match newline {
                Some(index) if index > self.max_length => {
                    buf.advance(index + 1);
                    Ok(Some(Inbound::Oversized))
                }
                Some(index) => {
                    let line = buf.split_to(index + 1);
                    Ok(Some(Inbound::Line(decode_line(&line[..index]))))
                }
                None if buf.len() > self.max_length => {
                    buf.clear();
                    self.discarding = true;
                    Ok(Some(Inbound::Oversized))
                }
                None => Ok(None),
            };
        }
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<Inbound>, std::io::Error> {
        if let Some(frame) = self.decode(buf)? {
            return Ok(Some(frame));
        }
        if buf.is_empty() || self.discarding {
            buf.clear();
            return Ok(None);
        }
        let rest = buf.split();
        Ok(Some(Inbound::Line(decode_line(&rest))))
    }
}

impl Encoder<String> for LineCodec {
    type Error = std::io::Error;

    fn encode(&mut self, line: String, buf: &mut BytesMut) -> Result<(), std::io::Error> {
        buf.reserve(line.len() + 1);
        buf.put_slice(line.as_bytes());
        buf.put_u8(b'\n');
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decodes_lines() {
        let mut codec = LineCodec::new(64);
        let mut buf = BytesMut::from(&b"/ID Alice\r\n/ROOMLIST\n/JO"[..]);

        assert_eq!(
            codec.decode(&mut buf).unwrap(),
            Some(Inbound::Line("/ID Alice".to_string()))
        );
        assert_eq!(
            codec.decode(&mut buf).unwrap(),
            Some(Inbound::Line("/ROOMLIST".to_string()))
        );
        assert_eq!(codec.decode(&mut buf).unwrap(), None);
        assert_eq!(&buf[..], b"/JO");
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let mut codec = LineCodec::new(64);
        let mut buf = BytesMut::from(&b"/CHAT -m caf\xe9\n/ROOMLIST\n"[..]);

        assert_eq!(
            codec.decode(&mut buf).unwrap(),
            Some(Inbound::Line("/CHAT -m caf\u{FFFD}".to_string()))
        );
        assert_eq!(
            codec.decode(&mut buf).unwrap(),
            Some(Inbound::Line("/ROOMLIST".to_string()))
        );
    }

    #[test]
    fn test_oversized_line_skipped() {
        let mut codec = LineCodec::new(12);
        let mut buf = BytesMut::from(&b"0123456789abcdef"[..]);

        assert_eq!(codec.decode(&mut buf).unwrap(), Some(Inbound::Oversized));
        assert_eq!(codec.decode(&mut buf).unwrap(), None);

        buf.extend_from_slice(b"ghij\n/USERLIST\n");
        assert_eq!(
            codec.decode(&mut buf).unwrap(),
            Some(Inbound::Line("/USERLIST".to_string()))
        );

        let mut buf = BytesMut::from(&b"0123456789abcdef\n/CLOSE\n"[..]);
        assert_eq!(codec.decode(&mut buf).unwrap(), Some(Inbound::Oversized));
        assert_eq!(
            codec.decode(&mut buf).unwrap(),
            Some(Inbound::Line("/CLOSE".to_string()))
        );
    }

    #[test]
    fn test_trailing_line_at_eof() {
        let mut codec = LineCodec::new(64);
        let mut buf = BytesMut::from(&b"/CLOSE"[..]);

        assert_eq!(
            codec.decode_eof(&mut buf).unwrap(),
            Some(Inbound::Line("/CLOSE".to_string()))
        );
        assert_eq!(codec.decode_eof(&mut buf).unwrap(), None);
    }

    #[test]
    fn test_encode_appends_newline() {
        let mut codec = LineCodec::new(64);
        let mut buf = BytesMut::new();
        codec.encode("Ok".to_string(), &mut buf).unwrap();
        assert_eq!(&buf[..], b"Ok\n");
    }
}
