//! Exec/attach stdio framing (`channel.k8s.io`)
//!
//! Every frame carries a one-byte channel number followed by the
//! payload. Five channels are defined; anything else is a protocol
//! error that terminates the connection.

use serde_json::json;
use tokio::sync::mpsc;
use tracing::debug;

use crate::errors::{KubewireError, Result};
use crate::transport::Flow;

use super::connection::{Outbound, WsConnection, WsWriter};

/// Sub-protocol advertised for exec and attach connections
pub const EXEC_SUBPROTOCOL: &str = "channel.k8s.io";

/// The fixed stdio channel table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StdChannel {
    Stdin,
    Stdout,
    Stderr,
    Error,
    Resize,
}

impl StdChannel {
    /// Decode a wire channel number
    pub fn from_byte(byte: u8) -> Result<StdChannel> {
        match byte {
            0 => Ok(StdChannel::Stdin),
            1 => Ok(StdChannel::Stdout),
            2 => Ok(StdChannel::Stderr),
            3 => Ok(StdChannel::Error),
            4 => Ok(StdChannel::Resize),
            other => Err(KubewireError::Protocol(format!(
                "unrecognized exec channel number {}",
                other
            ))),
        }
    }

    pub fn byte(self) -> u8 {
        match self {
            StdChannel::Stdin => 0,
            StdChannel::Stdout => 1,
            StdChannel::Stderr => 2,
            StdChannel::Error => 3,
            StdChannel::Resize => 4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            StdChannel::Stdin => "stdin",
            StdChannel::Stdout => "stdout",
            StdChannel::Stderr => "stderr",
            StdChannel::Error => "error",
            StdChannel::Resize => "resize",
        }
    }
}

/// Split one inbound frame into its channel and payload
pub fn decode_frame(frame: &[u8]) -> Result<(StdChannel, &[u8])> {
    let (&channel_byte, payload) = frame
        .split_first()
        .ok_or_else(|| KubewireError::Protocol("empty exec frame".to_string()))?;
    Ok((StdChannel::from_byte(channel_byte)?, payload))
}

/// Receiver for demultiplexed exec/attach traffic.
///
/// Implement the trait for structured receivers; plain closures go
/// through [`FnExecListener`], which supplies no-op open/close hooks.
pub trait ExecListener {
    fn on_open(&mut self, _writer: &ExecWriter) {}

    /// Called once per demultiplexed frame; return [`Flow::Stop`] to
    /// close the connection.
    fn on_message(&mut self, channel: StdChannel, data: &[u8], writer: &ExecWriter) -> Flow;

    fn on_close(&mut self) {}
}

/// Adapter turning a plain closure into an [`ExecListener`]
pub struct FnExecListener<F> {
    callback: F,
}

impl<F> FnExecListener<F>
where
    F: FnMut(StdChannel, &[u8]) -> Flow,
{
    pub fn new(callback: F) -> Self {
        FnExecListener { callback }
    }
}

impl<F> ExecListener for FnExecListener<F>
where
    F: FnMut(StdChannel, &[u8]) -> Flow,
{
    fn on_message(&mut self, channel: StdChannel, data: &[u8], _writer: &ExecWriter) -> Flow {
        (self.callback)(channel, data)
    }
}

/// Writer handle for the outbound side of an exec connection.
///
/// Every payload is prefixed with the stdin channel byte before it goes
/// on the wire.
#[derive(Clone)]
pub struct ExecWriter {
    inner: WsWriter,
}

impl ExecWriter {
    /// Send bytes to the remote process's stdin
    pub fn write_stdin(&self, data: &[u8]) -> Result<()> {
        let mut frame = Vec::with_capacity(data.len() + 1);
        frame.push(StdChannel::Stdin.byte());
        frame.extend_from_slice(data);
        self.inner.send_frame(frame)
    }

    /// Zero-payload keepalive: just the stdin channel byte
    pub fn keepalive(&self) -> Result<()> {
        self.inner.send_frame(vec![StdChannel::Stdin.byte()])
    }

    /// Resize the remote terminal (only meaningful with `tty=true`)
    pub fn resize(&self, width: u16, height: u16) -> Result<()> {
        let mut frame = vec![StdChannel::Resize.byte()];
        frame.extend_from_slice(json!({"Width": width, "Height": height}).to_string().as_bytes());
        self.inner.send_frame(frame)
    }

    /// Close the connection
    pub fn close(&self) -> Result<()> {
        self.inner.close()
    }
}

/// Drives one exec or attach connection to completion.
pub struct ExecSession {
    conn: WsConnection,
    tx: mpsc::UnboundedSender<Outbound>,
    rx: mpsc::UnboundedReceiver<Outbound>,
}

impl ExecSession {
    pub fn new(conn: WsConnection) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        ExecSession { conn, tx, rx }
    }

    /// Writer handle usable before and during [`run`](Self::run)
    pub fn writer(&self) -> ExecWriter {
        ExecWriter {
            inner: WsWriter::new(self.tx.clone()),
        }
    }

    /// Consume frames until the stream ends, the listener stops, or a
    /// protocol error occurs. The connection is closed on every exit
    /// path, and the listener's close hook fires exactly once.
    pub async fn run<L: ExecListener + ?Sized>(mut self, listener: &mut L) -> Result<()> {
        let writer = self.writer();
        listener.on_open(&writer);

        let result = loop {
            tokio::select! {
                frame = self.conn.next_frame() => match frame {
                    Ok(Some(data)) => {
                        if data.is_empty() {
                            continue;
                        }
                        let (channel, payload) = match decode_frame(&data) {
                            Ok(decoded) => decoded,
                            Err(e) => break Err(e),
                        };
                        if listener.on_message(channel, payload, &writer) == Flow::Stop {
                            debug!("exec listener requested stop");
                            break Ok(());
                        }
                    }
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_stdout_frame() {
        let (channel, data) = decode_frame(b"\x01foo").unwrap();
        assert_eq!(channel, StdChannel::Stdout);
        assert_eq!(channel.name(), "stdout");
        assert_eq!(data, b"foo");
    }

    #[test]
    fn test_decode_stdin_and_stderr_frames() {
        let (channel, data) = decode_frame(b"\x00foo").unwrap();
        assert_eq!(channel, StdChannel::Stdin);
        assert_eq!(data, b"foo");

        let (channel, _) = decode_frame(b"\x02foo").unwrap();
        assert_eq!(channel, StdChannel::Stderr);
    }

    #[test]
    fn test_unknown_channel_is_protocol_error() {
        let err = decode_frame(b"\x09oops").unwrap_err();
        assert!(matches!(err, KubewireError::Protocol(_)));
        assert!(err.to_string().contains('9'));
    }

    #[test]
    fn test_channel_byte_roundtrip() {
        for byte in 0..=4u8 {
            assert_eq!(StdChannel::from_byte(byte).unwrap().byte(), byte);
        }
    }

    #[tokio::test]
    async fn test_writer_prefixes_stdin_channel() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let writer = ExecWriter {
            inner: WsWriter::new(tx),
        };

        writer.write_stdin(b"ls -l\n").unwrap();
        match rx.recv().await.unwrap() {
            Outbound::Frame(frame) => assert_eq!(frame, b"\x00ls -l\n"),
            other => panic!("unexpected outbound: {other:?}"),
        }

        writer.keepalive().unwrap();
        match rx.recv().await.unwrap() {
            Outbound::Frame(frame) => assert_eq!(frame, vec![0u8]),
            other => panic!("unexpected outbound: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_writer_resize_payload() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let writer = ExecWriter {
            inner: WsWriter::new(tx),
        };
        writer.resize(120, 40).unwrap();
        match rx.recv().await.unwrap() {
            Outbound::Frame(frame) => {
                assert_eq!(frame[0], 4);
                let body: serde_json::Value = serde_json::from_slice(&frame[1..]).unwrap();
                assert_eq!(body["Width"], 120);
                assert_eq!(body["Height"], 40);
            }
            other => panic!("unexpected outbound: {other:?}"),
        }
    }
}
