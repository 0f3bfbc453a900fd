//! Generic (unframed) WebSocket handling
//!
//! For use cases without a defined sub-protocol: no channel byte is
//! stripped, every raw frame payload goes straight to the listener.

use tokio::sync::mpsc;

use crate::errors::Result;
use crate::transport::Flow;

use super::connection::{Outbound, WsConnection, WsWriter};

/// Receiver for raw frames
pub trait FrameListener {
    fn on_open(&mut self, _writer: &WsWriter) {}

    /// Called once per frame; return [`Flow::Stop`] to close.
    fn on_frame(&mut self, data: &[u8], writer: &WsWriter) -> Flow;

    fn on_close(&mut self) {}
}

/// Adapter turning a plain closure into a [`FrameListener`]
pub struct FnFrameListener<F> {
    callback: F,
}

impl<F> FnFrameListener<F>
where
    F: FnMut(&[u8]) -> Flow,
{
    pub fn new(callback: F) -> Self {
        FnFrameListener { callback }
    }
}

impl<F> FrameListener for FnFrameListener<F>
where
    F: FnMut(&[u8]) -> Flow,
{
    fn on_frame(&mut self, data: &[u8], _writer: &WsWriter) -> Flow {
        (self.callback)(data)
    }
}

/// Drives one unframed connection to completion.
pub struct GenericSession {
    conn: WsConnection,
    tx: mpsc::UnboundedSender<Outbound>,
    rx: mpsc::UnboundedReceiver<Outbound>,
}

impl GenericSession {
    pub fn new(conn: WsConnection) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        GenericSession { conn, tx, rx }
    }

    pub fn writer(&self) -> WsWriter {
        WsWriter::new(self.tx.clone())
    }

    pub async fn run<L: FrameListener + ?Sized>(mut self, listener: &mut L) -> Result<()> {
        let writer = self.writer();
        listener.on_open(&writer);

        let result = loop {
            tokio::select! {
                frame = self.conn.next_frame() => match frame {
                    Ok(Some(data)) => {
                        if listener.on_frame(&data, &writer) == Flow::Stop {
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
    fn test_closure_adapter_passes_frames_through() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let writer = WsWriter::new(tx);
        let mut seen = Vec::new();
        {
            let mut listener = FnFrameListener::new(|data: &[u8]| {
                seen.push(data.to_vec());
                Flow::Continue
            });
            assert_eq!(listener.on_frame(b"raw", &writer), Flow::Continue);
            listener.on_open(&writer);
            listener.on_close();
        }
        assert_eq!(seen, vec![b"raw".to_vec()]);
    }
}
