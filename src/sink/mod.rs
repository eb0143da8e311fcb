//! Output sink adapters
//!
//! A sink is the destination a template's emitted text is appended to.
//! Writes are infallible at this layer: once the peer is gone the
//! transport owns the failure, and a template mid-execution keeps running.

use std::sync::Mutex;

use bytes::{Bytes, BytesMut};
use tokio::sync::mpsc::UnboundedSender;

/// Destination for produced template output.
///
/// Shared by a parent unit and all of its transitive children, so one
/// logical output stream receives every fragment in call order.
pub trait OutputSink: Send + Sync {
    /// Append one chunk of encoded output.
    fn write(&self, chunk: Bytes);
}

/// Sink that feeds a streaming response body over a channel.
///
/// The HTTP service turns the receiving half into the response stream;
/// the stream ends when the executing unit is dropped and the sender
/// closes.
pub struct ChannelSink {
    sender: UnboundedSender<Bytes>,
}

impl ChannelSink {
    pub fn new(sender: UnboundedSender<Bytes>) -> Self {
        Self { sender }
    }
}

impl OutputSink for ChannelSink {
    fn write(&self, chunk: Bytes) {
        // A closed receiver means the client went away; drop the chunk.
        if self.sender.send(chunk).is_err() {
            log::debug!("output sink receiver dropped, discarding chunk");
        }
    }
}

/// In-memory sink used by tests to inspect produced output.
#[derive(Default)]
pub struct BufferSink {
    buffer: Mutex<BytesMut>,
}

impl BufferSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, decoded as UTF-8.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock().unwrap()).into_owned()
    }
}

impl OutputSink for BufferSink {
    fn write(&self, chunk: Bytes) {
        self.buffer.lock().unwrap().extend_from_slice(&chunk);
    }
}
