//! Engine.IO / Socket.IO text packets.
//!
//! One WebSocket text message carries exactly one Engine.IO packet:
//! `<engine type digit><data>`. Engine.IO `message` packets (type `4`) carry a
//! Socket.IO packet: `<socket type digit>[/namespace,][ack id]<json>`.
//!
//! ```text
//! 0{"sid":"...","pingInterval":25000,...}   open (server -> client)
//! 2 / 3                                     ping / pong
//! 40                                        connect to default namespace
//! 42["login","alice"]                       event with one argument
//! 41                                        namespace disconnect
//! ```
//!
//! Only the default namespace and plain text events are supported. Binary
//! attachments and acknowledgements are rejected at decode time.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{ProtocolError, Result};

/// Parameters the server sends in the Engine.IO open packet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Handshake {
    /// Engine.IO session ID.
    pub sid: String,
    /// Transports the server would upgrade to.
    #[serde(default)]
    pub upgrades: Vec<String>,
    /// Interval between server pings, in milliseconds.
    pub ping_interval: u64,
    /// Time the server waits for a pong, in milliseconds.
    pub ping_timeout: u64,
    /// Largest payload the server accepts, in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_payload: Option<u64>,
}

/// Engine.IO packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Packet {
    /// Session opened (`0`).
    Open(Handshake),
    /// Session closed (`1`).
    Close,
    /// Heartbeat request with optional probe data (`2`).
    Ping(String),
    /// Heartbeat reply echoing the probe data (`3`).
    Pong(String),
    /// Socket.IO packet (`4`).
    Message(SocketPacket),
    /// Transport upgrade (`5`).
    Upgrade,
    /// No-op (`6`).
    Noop,
}

/// Socket.IO packet on the default namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocketPacket {
    /// Namespace connect (`0`). The server's ack carries `{"sid": ...}`.
    Connect(Option<Value>),
    /// Namespace disconnect (`1`).
    Disconnect,
    /// Named event with its first argument (`2`). Missing arguments decode
    /// as `null`, extra arguments are dropped.
    Event {
        /// Event name.
        name: String,
        /// Event argument.
        data: Value,
    },
    /// Namespace connect refused (`4`).
    ConnectError(Value),
}

impl Packet {
    /// Event packet on the default namespace.
    pub fn event(name: &str, data: Value) -> Self {
        Self::Message(SocketPacket::Event { name: name.to_owned(), data })
    }

    /// Encode to the text carried by one WebSocket message.
    pub fn encode(&self) -> Result<String> {
        let text = match self {
            Self::Open(handshake) => format!("0{}", serde_json::to_string(handshake)?),
            Self::Close => "1".to_owned(),
            Self::Ping(data) => format!("2{data}"),
            Self::Pong(data) => format!("3{data}"),
            Self::Message(packet) => format!("4{}", packet.encode()?),
            Self::Upgrade => "5".to_owned(),
            Self::Noop => "6".to_owned(),
        };
        Ok(text)
    }

    /// Decode the text of one WebSocket message.
    pub fn decode(text: &str) -> Result<Self> {
        let (kind, rest) = split_type(text)?;
        match kind {
            '0' => Ok(Self::Open(serde_json::from_str(rest)?)),
            '1' => Ok(Self::Close),
            '2' => Ok(Self::Ping(rest.to_owned())),
            '3' => Ok(Self::Pong(rest.to_owned())),
            '4' => Ok(Self::Message(SocketPacket::decode(rest)?)),
            '5' => Ok(Self::Upgrade),
            '6' => Ok(Self::Noop),
            other => Err(ProtocolError::UnknownEngineType(other)),
        }
    }
}

impl SocketPacket {
    /// Encode without the Engine.IO prefix.
    pub fn encode(&self) -> Result<String> {
        let text = match self {
            Self::Connect(None) => "0".to_owned(),
            Self::Connect(Some(data)) => format!("0{}", serde_json::to_string(data)?),
            Self::Disconnect => "1".to_owned(),
            Self::Event { name, data } => {
                let args = Value::Array(vec![Value::String(name.clone()), data.clone()]);
                format!("2{}", serde_json::to_string(&args)?)
            },
            Self::ConnectError(data) => format!("4{}", serde_json::to_string(data)?),
        };
        Ok(text)
    }

    /// Decode without the Engine.IO prefix.
    pub fn decode(text: &str) -> Result<Self> {
        let (kind, mut rest) = split_type(text)?;

        if rest.starts_with('/') {
            let (namespace, tail) = rest.split_once(',').unwrap_or((rest, ""));
            if namespace != "/" {
                return Err(ProtocolError::UnsupportedNamespace(namespace.to_owned()));
            }
            rest = tail;
        }

        // Ack IDs are not used by this protocol
        let rest = rest.trim_start_matches(|c: char| c.is_ascii_digit());

        match kind {
            '0' if rest.is_empty() => Ok(Self::Connect(None)),
            '0' => Ok(Self::Connect(Some(serde_json::from_str(rest)?))),
            '1' => Ok(Self::Disconnect),
            '2' => decode_event(rest),
            '4' if rest.is_empty() => Ok(Self::ConnectError(Value::Null)),
            '4' => Ok(Self::ConnectError(serde_json::from_str(rest)?)),
            other => Err(ProtocolError::UnsupportedSocketType(other)),
        }
    }
}

fn split_type(text: &str) -> Result<(char, &str)> {
    let mut chars = text.chars();
    let kind = chars.next().ok_or(ProtocolError::Empty)?;
    Ok((kind, chars.as_str()))
}

fn decode_event(text: &str) -> Result<SocketPacket> {
    let value: Value = serde_json::from_str(text)?;
    let Value::Array(args) = value else {
        return Err(ProtocolError::MalformedEvent("expected an argument array".to_owned()));
    };

    let mut args = args.into_iter();
    let Some(Value::String(name)) = args.next() else {
        return Err(ProtocolError::MalformedEvent("event name must be a string".to_owned()));
    };
    let data = args.next().unwrap_or(Value::Null);

    Ok(SocketPacket::Event { name, data })
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{Outbound, OutgoingMessage};

    #[test]
    fn login_event_encoding() {
        let packet = Outbound::Login("alice".into()).into_packet().expect("encodable");
        insta::assert_snapshot!(packet.encode().expect("encodable"), @r#"42["login","alice"]"#);
    }

    #[test]
    fn message_event_keeps_field_order() {
        let packet = Outbound::Message(OutgoingMessage {
            from: "alice".into(),
            to: "dave".into(),
            message: " hi there".into(),
        })
        .into_packet()
        .expect("encodable");

        insta::assert_snapshot!(
            packet.encode().expect("encodable"),
            @r#"42["message",{"from":"alice","to":"dave","message":" hi there"}]"#
        );
    }

    #[test]
    fn decode_open_handshake() {
        let text = r#"0{"sid":"lv_VI97HAXpY6yYWAAAC","upgrades":["websocket"],"pingInterval":25000,"pingTimeout":20000,"maxPayload":1000000}"#;
        let packet = Packet::decode(text).expect("valid open packet");

        assert_eq!(
            packet,
            Packet::Open(Handshake {
                sid: "lv_VI97HAXpY6yYWAAAC".into(),
                upgrades: vec!["websocket".into()],
                ping_interval: 25_000,
                ping_timeout: 20_000,
                max_payload: Some(1_000_000),
            })
        );
    }

    #[test]
    fn decode_connect_ack() {
        let packet = Packet::decode(r#"40{"sid":"wZX3oN0bSVIhsaknAAAI"}"#).expect("valid ack");
        assert_eq!(
            packet,
            Packet::Message(SocketPacket::Connect(Some(json!({"sid": "wZX3oN0bSVIhsaknAAAI"}))))
        );
    }

    #[test]
    fn heartbeat() {
        assert_eq!(Packet::decode("2").expect("ping"), Packet::Ping(String::new()));
        assert_eq!(Packet::decode("2probe").expect("ping"), Packet::Ping("probe".into()));
        assert_eq!(Packet::Pong(String::new()).encode().expect("pong"), "3");
    }

    #[test]
    fn event_with_ack_id_and_default_namespace() {
        let expected = Packet::event("usersList", json!({"reason": "x", "usersList": []}));

        let with_ack = Packet::decode(r#"4212["usersList",{"reason":"x","usersList":[]}]"#);
        assert_eq!(with_ack.expect("ack id skipped"), expected);

        let with_nsp = Packet::decode(r#"42/,["usersList",{"reason":"x","usersList":[]}]"#);
        assert_eq!(with_nsp.expect("default namespace accepted"), expected);
    }

    #[test]
    fn event_without_argument_decodes_null() {
        let packet = Packet::decode(r#"42["ping"]"#).expect("valid event");
        assert_eq!(packet, Packet::event("ping", Value::Null));
    }

    #[test]
    fn rejects_foreign_namespace() {
        let result = Packet::decode(r#"42/admin,["login","x"]"#);
        assert!(matches!(result, Err(ProtocolError::UnsupportedNamespace(ref n)) if n == "/admin"));
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(matches!(Packet::decode(""), Err(ProtocolError::Empty)));
        assert!(matches!(Packet::decode("9"), Err(ProtocolError::UnknownEngineType('9'))));
        assert!(matches!(Packet::decode("4"), Err(ProtocolError::Empty)));
        assert!(matches!(Packet::decode("45[]"), Err(ProtocolError::UnsupportedSocketType('5'))));
        assert!(matches!(Packet::decode("42{}"), Err(ProtocolError::MalformedEvent(_))));
        assert!(matches!(Packet::decode("42[1,2]"), Err(ProtocolError::MalformedEvent(_))));
        assert!(matches!(Packet::decode("42[\"x\""), Err(ProtocolError::Json(_))));
    }

    #[test]
    fn disconnect_packets() {
        assert_eq!(
            Packet::decode("41").expect("disconnect"),
            Packet::Message(SocketPacket::Disconnect)
        );
        assert_eq!(Packet::decode("1").expect("close"), Packet::Close);
        assert_eq!(SocketPacket::Disconnect.encode().expect("encodable"), "1");
    }
}
