//! Engine.IO v4 and Socket.IO v5 packet codec
//!
//! A polling response body holds one or more Engine.IO packets separated by
//! the record separator `\x1e`. Engine.IO `message` packets carry Socket.IO
//! packets of the form
//! `<type>[<attachments>-][<namespace>,][<ack id>][<json>]`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::PushError;

/// Separator between packets in a polling payload
pub const RECORD_SEPARATOR: char = '\u{1e}';

/// Default Socket.IO namespace
pub const DEFAULT_NAMESPACE: &str = "/";

/// Handshake data sent in the Engine.IO `open` packet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Handshake {
    /// Session id to attach to every following request
    pub sid: String,

    #[serde(default)]
    pub upgrades: Vec<String>,

    /// Milliseconds between server pings
    pub ping_interval: u64,

    /// Milliseconds the server waits for a pong
    pub ping_timeout: u64,

    #[serde(default)]
    pub max_payload: Option<u64>,
}

/// Engine.IO transport packet
#[derive(Debug, Clone, PartialEq)]
pub enum EnginePacket {
    Open(Handshake),
    Close,
    Ping(String),
    Pong(String),
    Message(String),
    Upgrade,
    Noop,
    /// Base64 binary data; nothing the dashboard subscribes to uses it
    Binary(String),
}

/// Socket.IO packet carried inside an Engine.IO message
#[derive(Debug, Clone, PartialEq)]
pub enum SocketPacket {
    Connect {
        namespace: String,
        payload: Option<Value>,
    },
    Disconnect {
        namespace: String,
    },
    Event {
        namespace: String,
        id: Option<u64>,
        name: String,
        args: Vec<Value>,
    },
    ConnectError {
        namespace: String,
        message: String,
    },
    /// ACK and binary packet types, which the listener ignores
    Unsupported(char),
}

/// Split a polling body into Engine.IO packets
pub fn decode_payload(body: &str) -> Result<Vec<EnginePacket>, PushError> {
    body.split(RECORD_SEPARATOR)
        .filter(|chunk| !chunk.is_empty())
        .map(decode_packet)
        .collect()
}

/// Decode a single Engine.IO packet
pub fn decode_packet(packet: &str) -> Result<EnginePacket, PushError> {
    let mut chars = packet.chars();
    let kind = chars
        .next()
        .ok_or_else(|| PushError::Protocol("empty packet".to_string()))?;
    let data = chars.as_str();

    match kind {
        '0' => serde_json::from_str(data)
            .map(EnginePacket::Open)
            .map_err(|e| PushError::Protocol(format!("invalid handshake: {}", e))),
        '1' => Ok(EnginePacket::Close),
        '2' => Ok(EnginePacket::Ping(data.to_string())),
        '3' => Ok(EnginePacket::Pong(data.to_string())),
        '4' => Ok(EnginePacket::Message(data.to_string())),
        '5' => Ok(EnginePacket::Upgrade),
        '6' => Ok(EnginePacket::Noop),
        'b' => Ok(EnginePacket::Binary(data.to_string())),
        other => Err(PushError::Protocol(format!(
            "unknown engine packet type '{}'",
            other
        ))),
    }
}

/// Encode a single Engine.IO packet
pub fn encode_packet(packet: &EnginePacket) -> String {
    match packet {
        EnginePacket::Open(handshake) => format!(
            "0{}",
            serde_json::to_string(handshake).unwrap_or_default()
        ),
        EnginePacket::Close => "1".to_string(),
        EnginePacket::Ping(data) => format!("2{}", data),
        EnginePacket::Pong(data) => format!("3{}", data),
        EnginePacket::Message(data) => format!("4{}", data),
        EnginePacket::Upgrade => "5".to_string(),
        EnginePacket::Noop => "6".to_string(),
        EnginePacket::Binary(data) => format!("b{}", data),
    }
}

/// Join packets into one polling payload
pub fn encode_payload(packets: &[EnginePacket]) -> String {
    packets
        .iter()
        .map(encode_packet)
        .collect::<Vec<_>>()
        .join(&RECORD_SEPARATOR.to_string())
}

/// Socket.IO CONNECT for a namespace, wrapped as an Engine.IO message
pub fn connect_message(namespace: &str) -> EnginePacket {
    if namespace == DEFAULT_NAMESPACE {
        EnginePacket::Message("0".to_string())
    } else {
        EnginePacket::Message(format!("0{},", namespace))
    }
}

/// Decode the Socket.IO packet inside an Engine.IO message
pub fn decode_socket_packet(data: &str) -> Result<SocketPacket, PushError> {
    let mut chars = data.chars();
    let kind = chars
        .next()
        .ok_or_else(|| PushError::Protocol("empty socket packet".to_string()))?;
    let mut rest = chars.as_str();

    // Binary packets announce their attachment count first
    if kind == '5' || kind == '6' {
        if let Some(dash) = rest.find('-') {
            rest = &rest[dash + 1..];
        }
    }

    let namespace = if rest.starts_with('/') {
        match rest.find(',') {
            Some(comma) => {
                let namespace = rest[..comma].to_string();
                rest = &rest[comma + 1..];
                namespace
            }
            None => {
                let namespace = rest.to_string();
                rest = "";
                namespace
            }
        }
    } else {
        DEFAULT_NAMESPACE.to_string()
    };

    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    let id = if digits > 0 {
        rest[..digits].parse::<u64>().ok()
    } else {
        None
    };
    rest = &rest[digits..];

    let payload = if rest.is_empty() {
        None
    } else {
        Some(
            serde_json::from_str::<Value>(rest)
                .map_err(|e| PushError::Protocol(format!("invalid packet data: {}", e)))?,
        )
    };

    match kind {
        '0' => Ok(SocketPacket::Connect { namespace, payload }),
        '1' => Ok(SocketPacket::Disconnect { namespace }),
        '2' => {
            let mut args = match payload {
                Some(Value::Array(items)) => items.into_iter(),
                _ => {
                    return Err(PushError::Protocol(
                        "event packet without an argument array".to_string(),
                    ))
                }
            };
            let name = match args.next() {
                Some(Value::String(name)) => name,
                _ => return Err(PushError::Protocol("event packet without a name".to_string())),
            };
            Ok(SocketPacket::Event {
                namespace,
                id,
                name,
                args: args.collect(),
            })
        }
        '4' => {
            let message = payload
                .as_ref()
                .and_then(|p| p.get("message"))
                .and_then(Value::as_str)
                .unwrap_or("connection refused")
                .to_string();
            Ok(SocketPacket::ConnectError { namespace, message })
        }
        '3' | '5' | '6' => Ok(SocketPacket::Unsupported(kind)),
        other => Err(PushError::Protocol(format!(
            "unknown socket packet type '{}'",
            other
        ))),
    }
}
