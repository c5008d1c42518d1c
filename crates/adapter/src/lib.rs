//! Adapter - remote control via TCP socket with a JSON line protocol
//!
//! External agents (bots, test harnesses) can watch and drive the game through
//! a TCP connection.
//!
//! # Protocol Overview
//!
//! 1. **Connection**: client connects (default `127.0.0.1:7878`)
//! 2. **Handshake**: client sends `hello`, server answers `welcome`
//! 3. **Controller**: the first client to say hello controls the game; the
//!    rest observe. When the controller disconnects, the handshaken client with
//!    the lowest id takes over.
//! 4. **Observations**: clients that asked for them get a state snapshot after
//!    every frame that changed something
//! 5. **Commands**: the controller sends action lists; each applied command is
//!    acknowledged with an `ack` echoing its `seq`
//!
//! `seq` must strictly increase per client. Errors carry one of the codes
//! `handshake_required`, `not_controller`, `invalid_command`, `bad_seq`,
//! `backpressure`.
//!
//! # Environment Variables
//!
//! - `BLOCK_DROP_AI_HOST`: bind address (default "127.0.0.1")
//! - `BLOCK_DROP_AI_PORT`: port number (default 7878)
//! - `BLOCK_DROP_AI_MAX_PENDING`: command queue length (default 10)
//! - `BLOCK_DROP_AI_DISABLED`: "1" or "true" disables the adapter
//!
//! # Example Protocol Flow
//!
//! ```text
//! Client -> Server: {"type":"hello","seq":1,"client":{"name":"bot","version":"0.1"},"stream_observations":true}
//! Server -> Client: {"type":"welcome","seq":1,"ts":...,"protocol_version":"1.0.0","game_id":"block-drop","client_id":1,"role":"controller","controller_id":1}
//! Server -> Client: {"type":"observation","seq":1,"ts":...,"board":{...},"active":{...},...}
//! Client -> Server: {"type":"command","seq":2,"actions":["moveLeft","rotate","hardDrop"]}
//! Server -> Client: {"type":"ack","seq":2,"ts":...,"status":"ok"}
//! ```

pub mod protocol;
pub mod runtime;
pub mod server;

pub use block_drop_core as core;
pub use block_drop_types as types;

pub use protocol::*;
pub use runtime::{Adapter, InboundCommand, InboundPayload, OutboundMessage};
pub use server::{run_server, ServerConfig, ServerStatus};
