//! Port-forward framing (`v4.channel.k8s.io`)
//!
//! One WebSocket carries `2 × portCount` logical channels: for the i-th
//! requested port, channel `2i` is data and channel `2i+1` is its error
//! stream, so parity alone determines a channel's type. Before any data
//! flows, every channel must announce itself with exactly one 2-byte
//! little-endian port number; only when all have done so is the channel
//! set exposed to the caller.

use tokio::sync::mpsc;
use tracing::debug;

use crate::errors::{KubewireError, Result};
use crate::transport::Flow;

use super::connection::{Outbound, WsConnection, WsWriter};

/// Sub-protocol advertised for port-forward connections
pub const PORT_FORWARD_SUBPROTOCOL: &str = "v4.channel.k8s.io";

/// Direction of one logical channel, determined by wire-number parity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    Data,
    Error,
}

impl ChannelKind {
    /// Channel type for a wire channel number: even is data, odd is the
    /// paired error channel.
    pub fn of(channel_number: u8) -> ChannelKind {
        if channel_number % 2 == 0 {
            ChannelKind::Data
        } else {
            ChannelKind::Error
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ChannelKind::Data => "data",
            ChannelKind::Error => "error",
        }
    }
}

/// One direction-tagged logical stream of a port-forward session.
///
/// Channels are virtual views over the single shared socket: writing
/// prefixes the channel byte, and closing any channel closes the whole
/// connection.
#[derive(Clone)]
pub struct PortChannel {
    number: u8,
    port: u16,
    kind: ChannelKind,
    writer: WsWriter,
}

impl PortChannel {
    pub fn number(&self) -> u8 {
        self.number
    }

    /// The pod-side port this channel is bound to
    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn kind(&self) -> ChannelKind {
        self.kind
    }

    /// Queue a payload on this channel, prefixed with its channel byte
    pub fn write(&self, data: &[u8]) -> Result<()> {
        let mut frame = Vec::with_capacity(data.len() + 1);
        frame.push(self.number);
        frame.extend_from_slice(data);
        self.writer.send_frame(frame)
    }

    /// Close the entire session; channels have no independent lifetime
    pub fn close(&self) -> Result<()> {
        self.writer.close()
    }
}

/// The complete, immutable channel set of one session.
///
/// Constructed only after every channel finished its init handshake; a
/// partially-initialized set is never observable.
pub struct PortChannels {
    channels: Vec<PortChannel>,
}

impl PortChannels {
    pub fn get(&self, number: u8) -> Option<&PortChannel> {
        self.channels.get(number as usize)
    }

    /// The data channel bound to a pod-side port
    pub fn data_channel(&self, port: u16) -> Option<&PortChannel> {
        self.channels
            .iter()
            .find(|c| c.kind == ChannelKind::Data && c.port == port)
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PortChannel> {
        self.channels.iter()
    }
}

/// Receiver for demultiplexed port-forward traffic
pub trait PortForwardListener {
    /// Fires exactly once, after every channel completed its handshake
    fn on_init(&mut self, _channels: &PortChannels) {}

    fn on_data(&mut self, channel: &PortChannel, data: &[u8]) -> Flow;

    fn on_error(&mut self, channel: &PortChannel, data: &[u8]) -> Flow;

    fn on_close(&mut self) {}
}

/// Adapter turning a plain closure into a [`PortForwardListener`].
///
/// The closure receives both data and error traffic; the channel's kind
/// tells them apart.
pub struct FnPortForwardListener<F> {
    callback: F,
}

impl<F> FnPortForwardListener<F>
where
    F: FnMut(&PortChannel, &[u8]) -> Flow,
{
    pub fn new(callback: F) -> Self {
        FnPortForwardListener { callback }
    }
}

impl<F> PortForwardListener for FnPortForwardListener<F>
where
    F: FnMut(&PortChannel, &[u8]) -> Flow,
{
    fn on_data(&mut self, channel: &PortChannel, data: &[u8]) -> Flow {
        (self.callback)(channel, data)
    }

    fn on_error(&mut self, channel: &PortChannel, data: &[u8]) -> Flow {
        (self.callback)(channel, data)
    }
}

/// Frame-level state machine for one session: the init barrier followed
/// by parity-typed dispatch.
struct ForwardProtocol {
    writer: WsWriter,
    pending: Vec<Option<u16>>,
    seen: usize,
    channels: Option<PortChannels>,
}

impl ForwardProtocol {
    fn new(writer: WsWriter, port_count: usize) -> Self {
        ForwardProtocol {
            writer,
            pending: vec![None; port_count * 2],
            seen: 0,
            channels: None,
        }
    }

    fn handle_frame<L: PortForwardListener + ?Sized>(
        &mut self,
        frame: &[u8],
        listener: &mut L,
    ) -> Result<Flow> {
        let (&channel_number, payload) = frame
            .split_first()
            .ok_or_else(|| KubewireError::Protocol("empty port-forward frame".to_string()))?;

        if let Some(channels) = &self.channels {
            let channel = channels.get(channel_number).ok_or_else(|| {
                KubewireError::Protocol(format!(
                    "unrecognized port-forward channel number {}",
                    channel_number
                ))
            })?;
            return Ok(match channel.kind() {
                ChannelKind::Data => listener.on_data(channel, payload),
                ChannelKind::Error => listener.on_error(channel, payload),
            });
        }

        // Still initializing: this frame must be a 2-byte port
        // announcement for a channel we have not seen yet.
        let index = channel_number as usize;
        if index >= self.pending.len() {
            return Err(KubewireError::Protocol(format!(
                "port-forward channel number {} outside session range ({} channels)",
                channel_number,
                self.pending.len()
            )));
        }
        if payload.len() != 2 {
            return Err(KubewireError::Protocol(format!(
                "expected 2-byte port payload during port-forward initialization on channel {}, got {} bytes",
                channel_number,
                payload.len()
            )));
        }
        if self.pending[index].is_some() {
            return Err(KubewireError::Protocol(format!(
                "port-forward channel {} already initialized",
                channel_number
            )));
        }

        self.pending[index] = Some(u16::from_le_bytes([payload[0], payload[1]]));
        self.seen += 1;

        if self.seen == self.pending.len() {
            let channels = PortChannels {
                channels: self
                    .pending
                    .iter()
                    .enumerate()
                    .map(|(i, port)| PortChannel {
                        number: i as u8,
                        port: port.expect("all channels initialized"),
                        kind: ChannelKind::of(i as u8),
                        writer: self.writer.clone(),
                    })
                    .collect(),
            };
            debug!(channels = channels.len(), "port-forward session ready");
            listener.on_init(&channels);
            self.channels = Some(channels);
        }
        Ok(Flow::Continue)
    }
}

/// Drives one port-forward connection to completion.
pub struct PortForwardSession {
    conn: WsConnection,
    port_count: usize,
    tx: mpsc::UnboundedSender<Outbound>,
    rx: mpsc::UnboundedReceiver<Outbound>,
}

impl PortForwardSession {
    pub fn new(conn: WsConnection, port_count: usize) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        PortForwardSession {
            conn,
            port_count,
            tx,
            rx,
        }
    }

    /// Consume frames until the stream ends, the listener stops, or a
    /// protocol error occurs. The shared socket is closed on every exit
    /// path, and the listener's close hook fires exactly once.
    pub async fn run<L: PortForwardListener + ?Sized>(mut self, listener: &mut L) -> Result<()> {
        let mut protocol =
            ForwardProtocol::new(WsWriter::new(self.tx.clone()), self.port_count);

        let result = loop {
            tokio::select! {
                frame = self.conn.next_frame() => match frame {
                    Ok(Some(data)) => match protocol.handle_frame(&data, listener) {
                        Ok(Flow::Continue) => {}
                        Ok(Flow::Stop) => {
                            debug!("port-forward listener requested stop");
                            break Ok(());
                        }
                        Err(e) => break Err(e),
                    },
                    Ok(None) => break Ok(()),
                    Err(e) => break Err(e),
                },
                outbound = self.rx.recv() => match outbound {
                    Some(Outbound::Frame(frame)) => {
                        if let Err(e) = self.conn.send_frame(frame).await {
                            break Err(e);
                        }
                    }
                    Some(Outbound::Close) | None => break Ok(()),
                },
            }
        };

        let _ = self.conn.close().await;
        listener.on_close();
        result
    }
}
