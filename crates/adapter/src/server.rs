//! TCP server for the remote-control adapter
//!
//! Handles incoming connections and manages client lifecycle. Network tasks
//! never touch the engine: validated commands are queued on a bounded channel
//! for the frame loop, and replies come back through the outbound channel.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot, RwLock};

use crate::protocol::*;
use crate::runtime::{InboundCommand, InboundPayload, OutboundMessage};

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_pending_commands: usize,
    pub disabled: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7878,
            max_pending_commands: 10,
            disabled: false,
        }
    }
}

impl ServerConfig {
    /// Create from `BLOCK_DROP_AI_*` environment variables
    pub fn from_env() -> Self {
        use std::env;

        let defaults = Self::default();

        let host = env::var("BLOCK_DROP_AI_HOST")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.host);
        let port = env::var("BLOCK_DROP_AI_PORT")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.port);

        let max_pending_commands = env::var("BLOCK_DROP_AI_MAX_PENDING")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.max_pending_commands);

        let disabled = env::var("BLOCK_DROP_AI_DISABLED")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Self {
            host,
            port,
            max_pending_commands,
            disabled,
        }
    }
}

/// Counters the frame loop reads for the HUD.
#[derive(Debug, Default)]
pub struct ServerStatus {
    clients: AtomicUsize,
    has_controller: AtomicBool,
}

impl ServerStatus {
    pub fn client_count(&self) -> usize {
        self.clients.load(Ordering::Relaxed)
    }

    pub fn has_controller(&self) -> bool {
        self.has_controller.load(Ordering::Relaxed)
    }
}

/// Handle to a connected client
struct ClientHandle {
    id: usize,
    handshaken: bool,
    stream_observations: bool,
    last_seq: Option<u64>,
    tx: mpsc::UnboundedSender<String>,
}

#[derive(Default)]
struct Registry {
    clients: Vec<ClientHandle>,
    controller: Option<usize>,
}

impl Registry {
    fn get(&self, id: usize) -> Option<&ClientHandle> {
        self.clients.iter().find(|c| c.id == id)
    }

    fn get_mut(&mut self, id: usize) -> Option<&mut ClientHandle> {
        self.clients.iter_mut().find(|c| c.id == id)
    }

    fn is_handshaken(&self, id: usize) -> bool {
        self.get(id).map(|c| c.handshaken).unwrap_or(false)
    }

    /// Accept `seq` only if it is greater than every previous seq from `id`.
    fn check_and_update_seq(&mut self, id: usize, seq: u64) -> bool {
        let Some(client) = self.get_mut(id) else {
            return false;
        };
        match client.last_seq {
            Some(prev) if seq <= prev => false,
            _ => {
                client.last_seq = Some(seq);
                true
            }
        }
    }

    /// Drop `id`; if it was the controller, promote the lowest-id handshaken client.
    fn remove(&mut self, id: usize) -> Option<usize> {
        self.clients.retain(|c| c.id != id);
        if self.controller != Some(id) {
            return None;
        }
        self.controller = self
            .clients
            .iter()
            .filter(|c| c.handshaken)
            .map(|c| c.id)
            .min();
        self.controller
    }
}

/// Shared server state
struct ServerState {
    registry: RwLock<Registry>,
    status: Arc<ServerStatus>,
}

impl ServerState {
    async fn publish_status(&self) {
        let registry = self.registry.read().await;
        self.status
            .clients
            .store(registry.clients.len(), Ordering::Relaxed);
        self.status
            .has_controller
            .store(registry.controller.is_some(), Ordering::Relaxed);
    }
}

/// Start the TCP server
///
/// Sends the bound address on `ready_tx` once listening (useful with port 0).
pub async fn run_server(
    config: ServerConfig,
    command_tx: mpsc::Sender<InboundCommand>,
    out_rx: mpsc::UnboundedReceiver<OutboundMessage>,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    let listener = bind_listener(&config).await?;
    if let Some(tx) = ready_tx {
        let _ = tx.send(listener.local_addr()?);
    }
    serve(listener, command_tx, out_rx, Arc::new(ServerStatus::default())).await
}

pub(crate) async fn bind_listener(config: &ServerConfig) -> anyhow::Result<TcpListener> {
    let listener = TcpListener::bind((config.host.as_str(), config.port))
        .await
        .with_context(|| format!("failed to bind {}:{}", config.host, config.port))?;
    log::info!("adapter listening on {}", listener.local_addr()?);
    Ok(listener)
}

/// Accept loop and outbound dispatcher over an already bound listener.
pub(crate) async fn serve(
    listener: TcpListener,
    command_tx: mpsc::Sender<InboundCommand>,
    mut out_rx: mpsc::UnboundedReceiver<OutboundMessage>,
    status: Arc<ServerStatus>,
) -> anyhow::Result<()> {
    let state = Arc::new(ServerState {
        registry: RwLock::new(Registry::default()),
        status,
    });

    // Outbound dispatcher.
    {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            while let Some(msg) = out_rx.recv().await {
                let registry = state.registry.read().await;
                match msg {
                    OutboundMessage::ToClient { client_id, line } => {
                        if let Some(c) = registry.get(client_id) {
                            let _ = c.tx.send(line);
                        }
                    }
                    OutboundMessage::Broadcast { line } => {
                        for c in registry
                            .clients
                            .iter()
                            .filter(|c| c.handshaken && c.stream_observations)
                        {
                            let _ = c.tx.send(line.clone());
                        }
                    }
                }
            }
        });
    }

    let mut client_id_counter = 0usize;
    loop {
        let (socket, addr) = listener.accept().await?;
        client_id_counter += 1;
        let client_id = client_id_counter;
        log::info!("client {} connected from {}", client_id, addr);

        let state = Arc::clone(&state);
        let command_tx = command_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_client(socket, client_id, &state, command_tx).await {
                log::warn!("client {} error: {:#}", client_id, e);
            }
            log::info!("client {} disconnected", client_id);
        });
    }
}

/// Handle a single client connection
async fn handle_client(
    socket: TcpStream,
    client_id: usize,
    state: &Arc<ServerState>,
    command_tx: mpsc::Sender<InboundCommand>,
) -> anyhow::Result<()> {
    let (reader, mut writer) = socket.into_split();
    let mut reader = BufReader::new(reader);
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    state.registry.write().await.clients.push(ClientHandle {
        id: client_id,
        handshaken: false,
        stream_observations: false,
        last_seq: None,
        tx: tx.clone(),
    });
    state.publish_status().await;

    let write_task = tokio::spawn(async move {
        while let Some(line) = rx.recv().await {
            if writer.write_all(line.as_bytes()).await.is_err()
                || writer.write_all(b"\n").await.is_err()
                || writer.flush().await.is_err()
            {
                break;
            }
        }
    });

    let result = read_loop(&mut reader, client_id, state, &command_tx, &tx).await;

    let promoted = state.registry.write().await.remove(client_id);
    if let Some(new_id) = promoted {
        log::info!("client {} promoted to controller", new_id);
    }
    state.publish_status().await;

    drop(tx);
    let _ = write_task.await;
    result
}

async fn read_loop(
    reader: &mut BufReader<tokio::net::tcp::OwnedReadHalf>,
    client_id: usize,
    state: &Arc<ServerState>,
    command_tx: &mpsc::Sender<InboundCommand>,
    tx: &mpsc::UnboundedSender<String>,
) -> anyhow::Result<()> {
    let send_error = |seq: u64, code: ErrorCode, message: &str| {
        send_json(tx, &create_error(seq, code, message));
    };

    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            return Ok(());
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        match parse_message(trimmed) {
            Ok(ParsedMessage::Hello(hello)) => {
                let mut registry = state.registry.write().await;
                if registry.is_handshaken(client_id)
                    && !registry.check_and_update_seq(client_id, hello.seq)
                {
                    send_error(hello.seq, ErrorCode::BadSeq, "seq must be strictly increasing");
                    continue;
                }

                if registry.controller.is_none() {
                    registry.controller = Some(client_id);
                    log::info!("client {} ({}) is now controller", client_id, hello.client.name);
                }
                let controller = registry.controller;
                if let Some(client) = registry.get_mut(client_id) {
                    client.handshaken = true;
                    client.last_seq = Some(hello.seq);
                    client.stream_observations = hello.stream_observations;
                }
                drop(registry);
                state.publish_status().await;

                let role = if controller == Some(client_id) {
                    AssignedRole::Controller
                } else {
                    AssignedRole::Observer
                };
                send_json(
                    tx,
                    &create_welcome(
                        hello.seq,
                        client_id as u64,
                        role,
                        controller.map(|c| c as u64),
                    ),
                );

                if hello.stream_observations {
                    let _ = command_tx.try_send(InboundCommand {
                        client_id,
                        seq: hello.seq,
                        payload: InboundPayload::SnapshotRequest,
                    });
                }
            }

            Ok(ParsedMessage::Command(cmd)) => {
                {
                    let mut registry = state.registry.write().await;
                    if !registry.is_handshaken(client_id) {
                        send_error(cmd.seq, ErrorCode::HandshakeRequired, "send hello before command");
                        continue;
                    }
                    if !registry.check_and_update_seq(client_id, cmd.seq) {
                        send_error(cmd.seq, ErrorCode::BadSeq, "seq must be strictly increasing");
                        continue;
                    }
                    if registry.controller != Some(client_id) {
                        send_error(cmd.seq, ErrorCode::NotController, "only the controller may send commands");
                        continue;
                    }
                }

                // Ack is sent by the frame loop once the actions are applied.
                match command_tx.try_send(InboundCommand {
                    client_id,
                    seq: cmd.seq,
                    payload: InboundPayload::Actions(cmd.actions),
                }) {
                    Ok(()) => {}
                    Err(TrySendError::Full(_)) => {
                        send_error(cmd.seq, ErrorCode::Backpressure, "command queue is full");
                    }
                    Err(TrySendError::Closed(_)) => {
                        anyhow::bail!("game loop stopped accepting commands");
                    }
                }
            }

            Ok(ParsedMessage::Unknown(unknown)) => {
                send_error(unknown.seq, ErrorCode::InvalidCommand, "unknown message type");
            }

            Err(e) => {
                let seq = extract_seq_best_effort(trimmed).unwrap_or(0);
                send_error(seq, ErrorCode::InvalidCommand, &format!("invalid message: {}", e));
            }
        }
    }
}

fn send_json<T: serde::Serialize>(tx: &mpsc::UnboundedSender<String>, msg: &T) {
    match serde_json::to_string(msg) {
        Ok(line) => {
            let _ = tx.send(line);
        }
        Err(e) => log::warn!("failed to encode reply: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_with(ids: &[(usize, bool)]) -> Registry {
        let mut registry = Registry::default();
        for &(id, handshaken) in ids {
            let (tx, _rx) = mpsc::unbounded_channel();
            registry.clients.push(ClientHandle {
                id,
                handshaken,
                stream_observations: false,
                last_seq: None,
                tx,
            });
        }
        registry
    }

    #[test]
    fn test_server_config_from_env() {
        // Only checks that parsing never panics.
        let _config = ServerConfig::from_env();
    }

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 7878);
        assert_eq!(config.host, "127.0.0.1");
        assert!(!config.disabled);
    }

    #[test]
    fn test_seq_must_strictly_increase() {
        let mut registry = registry_with(&[(1, true)]);
        assert!(registry.check_and_update_seq(1, 5));
        assert!(!registry.check_and_update_seq(1, 5));
        assert!(!registry.check_and_update_seq(1, 4));
        assert!(registry.check_and_update_seq(1, 6));
    }

    #[test]
    fn test_remove_controller_promotes_lowest_handshaken() {
        let mut registry = registry_with(&[(1, true), (2, false), (3, true), (4, true)]);
        registry.controller = Some(1);

        assert_eq!(registry.remove(1), Some(3));
        assert_eq!(registry.controller, Some(3));

        // Removing an observer does not change the controller.
        assert_eq!(registry.remove(4), None);
        assert_eq!(registry.controller, Some(3));

        assert_eq!(registry.remove(3), None);
        assert_eq!(registry.controller, None);
    }
}
