//! Adapter runtime integration.
//!
//! Bridges the synchronous frame loop with the async TCP server. The
//! [`Adapter`] owns a tokio runtime; the frame loop polls commands with
//! [`Adapter::try_recv`] and replies with [`Adapter::send`] without ever
//! blocking. The listener is bound before [`Adapter::start`] returns, so a
//! taken port is reported to the caller.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::runtime::Runtime;
use tokio::sync::mpsc;

use crate::core::GameSnapshot;
use crate::protocol::{build_observation, create_ack, ActionList};
use crate::server::{bind_listener, serve, ServerConfig, ServerStatus};

/// Command delivered to the frame loop.
#[derive(Debug, Clone)]
pub struct InboundCommand {
    pub client_id: usize,
    pub seq: u64,
    pub payload: InboundPayload,
}

#[derive(Debug, Clone)]
pub enum InboundPayload {
    /// Apply these actions in order, then ack.
    Actions(ActionList),
    /// A streaming client just said hello and wants the current state.
    SnapshotRequest,
}

/// Outbound line to be delivered by the server.
#[derive(Debug, Clone)]
pub enum OutboundMessage {
    ToClient { client_id: usize, line: String },
    /// To every handshaken client that asked for observations.
    Broadcast { line: String },
}

/// Running adapter instance.
pub struct Adapter {
    _rt: Runtime,
    cmd_rx: mpsc::Receiver<InboundCommand>,
    out_tx: mpsc::UnboundedSender<OutboundMessage>,
    status: Arc<ServerStatus>,
    addr: SocketAddr,
    next_seq: u64,
}

impl Adapter {
    /// Start the adapter from environment variables.
    ///
    /// Returns `Ok(None)` if `BLOCK_DROP_AI_DISABLED` is set.
    pub fn start_from_env() -> Result<Option<Self>> {
        Self::start(ServerConfig::from_env())
    }

    pub fn start(config: ServerConfig) -> Result<Option<Self>> {
        if config.disabled {
            log::info!("remote control disabled");
            return Ok(None);
        }

        let max_pending = config.max_pending_commands.max(1);
        let (cmd_tx, cmd_rx) = mpsc::channel::<InboundCommand>(max_pending);
        let (out_tx, out_rx) = mpsc::unbounded_channel::<OutboundMessage>();
        let status = Arc::new(ServerStatus::default());

        let rt = Runtime::new().context("failed to create tokio runtime")?;
        let listener = rt.block_on(bind_listener(&config))?;
        let addr = listener.local_addr()?;
        {
            let status = Arc::clone(&status);
            rt.spawn(async move {
                if let Err(e) = serve(listener, cmd_tx, out_rx, status).await {
                    log::error!("adapter server stopped: {:#}", e);
                }
            });
        }

        Ok(Some(Self {
            _rt: rt,
            cmd_rx,
            out_tx,
            status,
            addr,
            next_seq: 1,
        }))
    }

    /// Address the server is listening on.
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn try_recv(&mut self) -> Option<InboundCommand> {
        self.cmd_rx.try_recv().ok()
    }

    pub fn send(&self, msg: OutboundMessage) {
        let _ = self.out_tx.send(msg);
    }

    pub fn status(&self) -> &ServerStatus {
        &self.status
    }

    /// Ack a command after its actions were applied.
    pub fn send_ack(&self, client_id: usize, seq: u64) {
        if let Ok(line) = serde_json::to_string(&create_ack(seq)) {
            self.send(OutboundMessage::ToClient { client_id, line });
        }
    }

    /// Send an observation to one client, or broadcast when `client_id` is `None`.
    pub fn send_observation(&mut self, snap: &GameSnapshot, client_id: Option<usize>) {
        let seq = self.next_seq;
        self.next_seq += 1;

        let line = match serde_json::to_string(&build_observation(snap, seq)) {
            Ok(line) => line,
            Err(e) => {
                log::warn!("failed to encode observation: {}", e);
                return;
            }
        };
        match client_id {
            Some(client_id) => self.send(OutboundMessage::ToClient { client_id, line }),
            None => self.send(OutboundMessage::Broadcast { line }),
        }
    }
}
