//! UDP multicast transport for the gateway channel.

use super::GatewayHandle;
use super::message::GatewayMessage;
use crate::config::GatewayConfig;
use crate::error::{BridgeError, Result};
use log::{debug, error, info, warn};
use serde_json::json;
use socket2::{Domain, Protocol, Socket, Type};
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::sync::mpsc;

/// Gateway channel client.
///
/// Listens on the gateway's multicast group and forwards decoded envelopes
/// over a channel; read requests funneled through [`ReadHandle`]s are sent
/// back out on the same socket.
pub struct GatewayClient {
    socket: UdpSocket,
    group: SocketAddrV4,
    /// Unicast address of the gateway, configured or learned from traffic.
    peer: Option<SocketAddr>,
    command_tx: mpsc::UnboundedSender<String>,
    command_rx: mpsc::UnboundedReceiver<String>,
}

impl GatewayClient {
    /// Bind the multicast socket described by `config`.
    pub fn new(config: &GatewayConfig) -> Result<Self> {
        let group_ip: Ipv4Addr = config.multicast_addr.parse().map_err(|_| {
            BridgeError::InvalidConfig(format!(
                "invalid multicast address: {}",
                config.multicast_addr
            ))
        })?;
        let group = SocketAddrV4::new(group_ip, config.multicast_port);

        // SO_REUSEADDR so the bridge can share the multicast port with
        // other listeners on the same host.
        let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;
        socket.set_reuse_address(true)?;
        socket.set_nonblocking(true)?;
        socket.bind(&SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, config.multicast_port).into())?;
        let socket = UdpSocket::from_std(socket.into())?;
        socket.join_multicast_v4(group_ip, Ipv4Addr::UNSPECIFIED)?;

        let peer = config
            .gateway_addr
            .as_deref()
            .and_then(|addr| addr.parse().ok());

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        Ok(Self {
            socket,
            group,
            peer,
            command_tx,
            command_rx,
        })
    }

    /// Get a handle for issuing fire-and-forget read requests.
    pub fn read_handle(&self) -> ReadHandle {
        ReadHandle {
            tx: self.command_tx.clone(),
        }
    }

    /// Run the receive loop, forwarding decoded envelopes to `tx`.
    ///
    /// Runs until the envelope channel is closed. Malformed datagrams are
    /// logged and dropped.
    pub async fn run(mut self, tx: mpsc::Sender<GatewayMessage>) {
        info!(
            "Listening on gateway multicast group {}:{}",
            self.group.ip(),
            self.group.port()
        );

        let mut buf = vec![0u8; 4096];
        loop {
            tokio::select! {
                received = self.socket.recv_from(&mut buf) => match received {
                    Ok((len, addr)) => {
                        let payload = match std::str::from_utf8(&buf[..len]) {
                            Ok(s) => s,
                            Err(e) => {
                                warn!("Invalid UTF-8 in gateway datagram: {}", e);
                                continue;
                            }
                        };
                        debug!("Received gateway datagram from {}: {}", addr, payload);

                        match GatewayMessage::parse(payload) {
                            Ok(msg) => {
                                // Learn the gateway's unicast address from its
                                // own traffic when none was configured.
                                if self.peer.is_none() {
                                    self.peer = Some(addr);
                                }
                                if tx.send(msg).await.is_err() {
                                    error!("Gateway message channel closed");
                                    break;
                                }
                            }
                            Err(e) => warn!("Failed to parse gateway message: {}", e),
                        }
                    }
                    Err(e) => {
                        error!("Gateway socket error: {}", e);
                        tokio::time::sleep(Duration::from_secs(5)).await;
                    }
                },
                // command_tx is held by self, so recv() never yields None.
                Some(payload) = self.command_rx.recv() => {
                    let target = self.peer.unwrap_or(SocketAddr::V4(self.group));
                    debug!("Sending gateway command to {}: {}", target, payload);
                    if let Err(e) = self.socket.send_to(payload.as_bytes(), target).await {
                        warn!("Failed to send gateway command: {}", e);
                    }
                }
            }
        }
    }
}

/// Sender half of the read-request channel, handed to devices.
#[derive(Clone)]
pub struct ReadHandle {
    tx: mpsc::UnboundedSender<String>,
}

impl GatewayHandle for ReadHandle {
    fn read_device(&self, sid: &str) {
        let payload = json!({"cmd": "read", "sid": sid}).to_string();
        // Fire-and-forget: a closed transport just drops the request.
        let _ = self.tx.send(payload);
    }
}
