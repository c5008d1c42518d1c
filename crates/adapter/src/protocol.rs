//! Protocol module - JSON message types for the remote-control adapter
//!
//! Line-delimited JSON. Every message carries `type`, `seq` (sequence
//! number) and `ts` (timestamp in ms).

use serde::{Deserialize, Serialize};

use arrayvec::ArrayVec;

use crate::core::GameSnapshot;
use crate::types::{GameAction, PieceKind, BOARD_HEIGHT, BOARD_WIDTH};

/// Wire protocol version announced in `welcome`.
pub const PROTOCOL_VERSION: &str = "1.0.0";

/// Game id announced in `welcome`.
pub const GAME_NAME: &str = "block-drop";

/// Upper bound on actions in one command.
pub const MAX_ACTIONS_PER_COMMAND: usize = 32;

// ============== Client -> Game Messages ==============

/// Client hello message (first message to establish connection)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelloMessage {
    #[serde(rename = "type", default)]
    pub msg_type: HelloType,
    pub seq: u64,
    #[serde(default)]
    pub ts: u64,
    pub client: ClientInfo,
    #[serde(default)]
    pub stream_observations: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HelloType {
    #[default]
    #[serde(rename = "hello")]
    Hello,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    #[serde(default)]
    pub version: String,
}

/// Command message (controller only)
#[derive(Debug, Clone, Deserialize)]
pub struct CommandMessage {
    pub seq: u64,
    #[serde(default)]
    pub ts: u64,
    pub actions: ActionList,
}

/// Actions of one command, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionList(pub ArrayVec<GameAction, MAX_ACTIONS_PER_COMMAND>);

impl ActionList {
    pub fn iter(&self) -> impl Iterator<Item = GameAction> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for ActionList {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct V;
        impl<'de> serde::de::Visitor<'de> for V {
            type Value = ActionList;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(f, "an array of action names")
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: serde::de::SeqAccess<'de>,
            {
                let mut out = ArrayVec::<GameAction, MAX_ACTIONS_PER_COMMAND>::new();
                while let Some(name) = seq.next_element::<std::borrow::Cow<'de, str>>()? {
                    let action = GameAction::from_str(&name).ok_or_else(|| {
                        serde::de::Error::custom(format!("unknown action: {}", name))
                    })?;
                    out.try_push(action)
                        .map_err(|_| serde::de::Error::custom("too many actions"))?;
                }
                Ok(ActionList(out))
            }
        }

        deserializer.deserialize_seq(V)
    }
}

impl Serialize for ActionList {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_seq(self.0.iter().map(|a| a.as_str()))
    }
}

// ============== Game -> Client Messages ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WelcomeType {
    #[serde(rename = "welcome")]
    Welcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AckType {
    #[serde(rename = "ack")]
    Ack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AckStatus {
    #[serde(rename = "ok")]
    Ok,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorType {
    #[serde(rename = "error")]
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    HandshakeRequired,
    NotController,
    InvalidCommand,
    BadSeq,
    Backpressure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignedRole {
    Controller,
    Observer,
}

/// Welcome message (response to hello)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WelcomeMessage {
    #[serde(rename = "type")]
    pub msg_type: WelcomeType,
    pub seq: u64,
    pub ts: u64,
    pub protocol_version: String,
    pub game_id: String,
    pub client_id: u64,
    pub role: AssignedRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controller_id: Option<u64>,
}

/// Acknowledgment that a command was applied
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckMessage {
    #[serde(rename = "type")]
    pub msg_type: AckType,
    pub seq: u64,
    pub ts: u64,
    pub status: AckStatus,
}

/// Error message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorMessage {
    #[serde(rename = "type")]
    pub msg_type: ErrorType,
    pub seq: u64,
    pub ts: u64,
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObservationType {
    #[serde(rename = "observation")]
    Observation,
}

/// Game state observation (sent to streaming clients)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservationMessage {
    #[serde(rename = "type")]
    pub msg_type: ObservationType,
    pub seq: u64,
    pub ts: u64,
    pub playable: bool,
    pub game_over: bool,
    pub episode_id: u32,
    pub piece_id: u32,
    pub board: BoardSnapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<ActivePieceSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ghost_y: Option<i8>,
    pub score: u32,
    pub lines: u32,
    pub drop_interval_ms: u32,
    pub drop_timer_ms: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub width: u8,
    pub height: u8,
    /// Row-major, top row first. 0 = empty, 1-7 = piece color index.
    pub cells: [[u8; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivePieceSnapshot {
    pub kind: PieceKindLower,
    /// Column of the shape's top-left corner.
    pub x: i8,
    /// Row of the shape's top-left corner.
    pub y: i8,
    /// Absolute `[col, row]` of each filled cell.
    pub cells: [[i8; 2]; 4],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceKindLower {
    I,
    O,
    T,
    L,
    J,
    S,
    Z,
}

impl From<PieceKind> for PieceKindLower {
    fn from(value: PieceKind) -> Self {
        match value {
            PieceKind::I => Self::I,
            PieceKind::O => Self::O,
            PieceKind::T => Self::T,
            PieceKind::L => Self::L,
            PieceKind::J => Self::J,
            PieceKind::S => Self::S,
            PieceKind::Z => Self::Z,
        }
    }
}

// ============== Parsing ==============

#[derive(Debug, Clone)]
pub enum ParsedMessage {
    Hello(HelloMessage),
    Command(CommandMessage),
    Unknown(UnknownMessage),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownMessage {
    pub seq: u64,
}

/// Parse one inbound line.
///
/// A well-formed object with an unrecognized `type` is `Unknown`, not an error.
pub fn parse_message(json: &str) -> Result<ParsedMessage, serde_json::Error> {
    #[derive(Debug, Deserialize)]
    #[serde(tag = "type")]
    enum InboundMessage {
        #[serde(rename = "hello")]
        Hello(HelloMessage),
        #[serde(rename = "command")]
        Command(CommandMessage),
    }

    match serde_json::from_str::<InboundMessage>(json) {
        Ok(InboundMessage::Hello(m)) => Ok(ParsedMessage::Hello(m)),
        Ok(InboundMessage::Command(m)) => Ok(ParsedMessage::Command(m)),
        Err(e) => {
            #[derive(Debug, Deserialize)]
            struct Envelope<'a> {
                #[serde(rename = "type", borrow)]
                msg_type: Option<&'a str>,
                #[serde(default)]
                seq: u64,
            }
            let env = serde_json::from_str::<Envelope>(json)?;
            match env.msg_type {
                Some("hello") | Some("command") | None => Err(e),
                Some(_) => Ok(ParsedMessage::Unknown(UnknownMessage { seq: env.seq })),
            }
        }
    }
}

/// Pull `"seq": N` out of a line that failed to parse, for the error reply.
pub fn extract_seq_best_effort(s: &str) -> Option<u64> {
    let start = s.find("\"seq\"")?;
    let after_key = &s[start + 5..];
    let colon = after_key.find(':')?;
    let rest = after_key[colon + 1..].trim_start();
    let end = rest.bytes().take_while(|b| b.is_ascii_digit()).count();
    if end == 0 {
        return None;
    }
    rest[..end].parse::<u64>().ok()
}

// ============== Utility Functions ==============

/// Create a hello message
pub fn create_hello(seq: u64, client_name: &str, stream_observations: bool) -> HelloMessage {
    HelloMessage {
        msg_type: HelloType::Hello,
        seq,
        ts: current_timestamp_ms(),
        client: ClientInfo {
            name: client_name.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        stream_observations,
    }
}

/// Create a welcome message
pub fn create_welcome(
    seq: u64,
    client_id: u64,
    role: AssignedRole,
    controller_id: Option<u64>,
) -> WelcomeMessage {
    WelcomeMessage {
        msg_type: WelcomeType::Welcome,
        seq,
        ts: current_timestamp_ms(),
        protocol_version: PROTOCOL_VERSION.to_string(),
        game_id: GAME_NAME.to_string(),
        client_id,
        role,
        controller_id,
    }
}

/// Create an ack echoing the command's `seq`
pub fn create_ack(seq: u64) -> AckMessage {
    AckMessage {
        msg_type: AckType::Ack,
        seq,
        ts: current_timestamp_ms(),
        status: AckStatus::Ok,
    }
}

/// Create an error message
pub fn create_error(seq: u64, code: ErrorCode, message: &str) -> ErrorMessage {
    ErrorMessage {
        msg_type: ErrorType::Error,
        seq,
        ts: current_timestamp_ms(),
        code,
        message: message.to_string(),
    }
}

/// Build an observation from an engine snapshot
pub fn build_observation(snap: &GameSnapshot, seq: u64) -> ObservationMessage {
    let active = snap.active.map(|piece| {
        let mut cells = [[0i8; 2]; 4];
        for (slot, (col, row)) in cells.iter_mut().zip(piece.cells()) {
            *slot = [col, row];
        }
        ActivePieceSnapshot {
            kind: PieceKindLower::from(piece.kind),
            x: piece.col,
            y: piece.row,
            cells,
        }
    });

    ObservationMessage {
        msg_type: ObservationType::Observation,
        seq,
        ts: current_timestamp_ms(),
        playable: snap.playable(),
        game_over: snap.game_over,
        episode_id: snap.episode_id,
        piece_id: snap.piece_id,
        board: BoardSnapshot {
            width: BOARD_WIDTH,
            height: BOARD_HEIGHT,
            cells: snap.board,
        },
        active,
        ghost_y: snap.ghost_row,
        score: snap.score,
        lines: snap.lines,
        drop_interval_ms: snap.drop_interval_ms,
        drop_timer_ms: snap.drop_timer_ms,
    }
}

/// Get current timestamp in milliseconds
fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{GameState, ScriptedSource};

    #[test]
    fn test_parse_hello() {
        let json = r#"{"type":"hello","seq":1,"ts":5,"client":{"name":"bot","version":"0.1"},"stream_observations":true}"#;
        match parse_message(json).unwrap() {
            ParsedMessage::Hello(h) => {
                assert_eq!(h.seq, 1);
                assert_eq!(h.client.name, "bot");
                assert!(h.stream_observations);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_command_actions() {
        let json = r#"{"type":"command","seq":2,"actions":["moveLeft","ROTATE","hardDrop"]}"#;
        match parse_message(json).unwrap() {
            ParsedMessage::Command(c) => {
                assert_eq!(c.seq, 2);
                let actions: Vec<_> = c.actions.iter().collect();
                assert_eq!(
                    actions,
                    vec![GameAction::MoveLeft, GameAction::Rotate, GameAction::HardDrop]
                );
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_unknown_action_is_error() {
        let json = r#"{"type":"command","seq":3,"actions":["hold"]}"#;
        assert!(parse_message(json).is_err());
    }

    #[test]
    fn test_too_many_actions_is_error() {
        let names = vec!["\"softDrop\""; MAX_ACTIONS_PER_COMMAND + 1].join(",");
        let json = format!(r#"{{"type":"command","seq":3,"actions":[{}]}}"#, names);
        assert!(parse_message(&json).is_err());
    }

    #[test]
    fn test_unknown_type_keeps_seq() {
        let json = r#"{"type":"control","seq":9}"#;
        match parse_message(json).unwrap() {
            ParsedMessage::Unknown(u) => assert_eq!(u.seq, 9),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_extract_seq_best_effort() {
        assert_eq!(extract_seq_best_effort(r#"{"seq": 42, "type":"#), Some(42));
        assert_eq!(extract_seq_best_effort("garbage"), None);
    }

    #[test]
    fn test_error_code_names() {
        let err = create_error(4, ErrorCode::BadSeq, "seq must be strictly increasing");
        let v = serde_json::to_value(&err).unwrap();
        assert_eq!(v["type"], "error");
        assert_eq!(v["code"], "bad_seq");

        let v = serde_json::to_value(ErrorCode::HandshakeRequired).unwrap();
        assert_eq!(v, "handshake_required");
    }

    #[test]
    fn test_build_observation_from_snapshot() {
        let mut gs = GameState::with_source(ScriptedSource::repeat(PieceKind::O));
        gs.start();
        gs.hard_drop();
        let obs = build_observation(&gs.snapshot(), 7);

        assert_eq!(obs.seq, 7);
        assert!(obs.playable);
        assert_eq!(obs.board.cells[19][4], 2);
        assert_eq!(obs.piece_id, 2);

        let active = obs.active.as_ref().unwrap();
        assert_eq!(active.kind, PieceKindLower::O);
        assert_eq!((active.x, active.y), (4, 0));
        assert_eq!(active.cells, [[4, 0], [5, 0], [4, 1], [5, 1]]);

        let v = serde_json::to_value(&obs).unwrap();
        assert_eq!(v["type"], "observation");
        assert_eq!(v["active"]["kind"], "o");
        assert_eq!(v["ghost_y"], 16);
    }
}
