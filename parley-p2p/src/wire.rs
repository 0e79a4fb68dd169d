//! The single-line frame codec.
//!
//! One connection carries one frame: `<ip> <port> <name> <body>`, fields
//! space-separated, the body greedy (it keeps any spaces it contains). There
//! is no length prefix, no escaping, and no terminator; the frame boundary is
//! whatever the remote wrote before closing the connection.

use std::str::FromStr;

use crate::error::DecodeError;
use crate::membership::PeerAddr;

/// Reserved body requesting mutual membership.
pub const BODY_CONNECT: &str = "connect";

/// Reserved body acknowledging a connect request.
pub const BODY_CONNECT_ACK: &str = "connect_ack";

/// Reserved body announcing departure.
pub const BODY_EXIT: &str = "exit";

/// Protocol meaning of a frame body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// Handshake request.
    Connect,
    /// Handshake acknowledgement, terminal.
    ConnectAck,
    /// Departure notice.
    Exit,
    /// Plain chat message.
    Chat,
}

impl FrameKind {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            FrameKind::Connect => "connect",
            FrameKind::ConnectAck => "connect_ack",
            FrameKind::Exit => "exit",
            FrameKind::Chat => "chat",
        }
    }
}

/// One decoded message: who sent it and what they said.
///
/// Constructed per accepted connection, consumed immediately by dispatch,
/// never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// The sender's announced listening address.
    pub sender: PeerAddr,
    /// The sender's display name.
    pub sender_name: String,
    /// Message body, verbatim.
    pub body: String,
}

impl Frame {
    /// Build an outbound frame.
    pub fn new(sender: PeerAddr, sender_name: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            sender,
            sender_name: sender_name.into(),
            body: body.into(),
        }
    }

    /// Encode to wire bytes.
    ///
    /// No escaping is performed: a display name containing a space shifts
    /// the field boundaries on decode. Known limitation of the format.
    pub fn encode(&self) -> Vec<u8> {
        format!(
            "{} {} {} {}",
            self.sender.ip, self.sender.port, self.sender_name, self.body
        )
        .into_bytes()
    }

    /// Decode wire bytes into a frame.
    ///
    /// Splits into exactly four fields, the last greedy. Fails on anything
    /// that is not UTF-8, has fewer than four fields, or carries an
    /// unparseable ip/port.
    pub fn decode(payload: &[u8]) -> Result<Frame, DecodeError> {
        let text = std::str::from_utf8(payload).map_err(|_| DecodeError::InvalidUtf8)?;

        let fields: Vec<&str> = text.splitn(4, ' ').collect();
        if fields.len() < 4 {
            return Err(DecodeError::Truncated(fields.len()));
        }

        let ip = std::net::IpAddr::from_str(fields[0])
            .map_err(|_| DecodeError::InvalidIp(fields[0].to_string()))?;
        let port: u16 = fields[1]
            .parse()
            .map_err(|_| DecodeError::InvalidPort(fields[1].to_string()))?;

        Ok(Frame {
            sender: PeerAddr::new(ip, port),
            sender_name: fields[2].to_string(),
            body: fields[3].to_string(),
        })
    }

    /// Classify the body: reserved values compare trimmed and
    /// case-insensitive, everything else is chat.
    pub fn kind(&self) -> FrameKind {
        let body = self.body.trim();
        if body.eq_ignore_ascii_case(BODY_CONNECT) {
            FrameKind::Connect
        } else if body.eq_ignore_ascii_case(BODY_CONNECT_ACK) {
            FrameKind::ConnectAck
        } else if body.eq_ignore_ascii_case(BODY_EXIT) {
            FrameKind::Exit
        } else {
            FrameKind::Chat
        }
    }
}

impl std::fmt::Display for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{} ({})]: {}",
            self.sender_name, self.sender, self.body
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(s: &str) -> PeerAddr {
        s.parse().unwrap()
    }

    #[test]
    fn test_roundtrip_simple() {
        let original = Frame::new(addr("192.168.1.5:5001"), "alice", "hello");
        let decoded = Frame::decode(&original.encode()).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_roundtrip_body_with_spaces() {
        let original = Frame::new(addr("10.0.0.2:6000"), "bob", "see you at 10 am tomorrow");
        let decoded = Frame::decode(&original.encode()).unwrap();
        assert_eq!(decoded.body, "see you at 10 am tomorrow");
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_encode_layout() {
        let frame = Frame::new(addr("127.0.0.1:5001"), "alice", "connect");
        assert_eq!(frame.encode(), b"127.0.0.1 5001 alice connect");
    }

    #[test]
    fn test_decode_too_few_fields() {
        let err = Frame::decode(b"127.0.0.1 5001 alice").unwrap_err();
        assert!(matches!(err, DecodeError::Truncated(3)));

        let err = Frame::decode(b"hello").unwrap_err();
        assert!(matches!(err, DecodeError::Truncated(1)));
    }

    #[test]
    fn test_decode_bad_port() {
        let err = Frame::decode(b"127.0.0.1 notaport alice hi").unwrap_err();
        assert!(matches!(err, DecodeError::InvalidPort(_)));

        let err = Frame::decode(b"127.0.0.1 99999 alice hi").unwrap_err();
        assert!(matches!(err, DecodeError::InvalidPort(_)));
    }

    #[test]
    fn test_decode_bad_ip() {
        let err = Frame::decode(b"nowhere 5001 alice hi").unwrap_err();
        assert!(matches!(err, DecodeError::InvalidIp(_)));
    }

    #[test]
    fn test_decode_not_utf8() {
        let err = Frame::decode(&[0xff, 0xfe, 0x20, 0x20, 0x20]).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidUtf8));
    }

    #[test]
    fn test_kind_reserved_bodies() {
        let f = |body: &str| Frame::new(addr("127.0.0.1:1"), "a", body);
        assert_eq!(f("connect").kind(), FrameKind::Connect);
        assert_eq!(f("connect_ack").kind(), FrameKind::ConnectAck);
        assert_eq!(f("exit").kind(), FrameKind::Exit);
        assert_eq!(f("hello there").kind(), FrameKind::Chat);
    }

    #[test]
    fn test_kind_case_and_whitespace() {
        let f = |body: &str| Frame::new(addr("127.0.0.1:1"), "a", body);
        assert_eq!(f("CONNECT").kind(), FrameKind::Connect);
        assert_eq!(f("  Exit  ").kind(), FrameKind::Exit);
        assert_eq!(f("Connect_Ack").kind(), FrameKind::ConnectAck);
        // Reserved word embedded in a longer body is still chat.
        assert_eq!(f("please connect later").kind(), FrameKind::Chat);
    }

    #[test]
    fn test_ambiguous_name_shifts_fields() {
        // The documented limitation: an unescaped space in the name steals
        // the first body word.
        let frame = Frame::new(addr("127.0.0.1:5001"), "alice smith", "hi");
        let decoded = Frame::decode(&frame.encode()).unwrap();
        assert_eq!(decoded.sender_name, "alice");
        assert_eq!(decoded.body, "smith hi");
    }
}
