//! Test doubles shared by unit tests.

use serde_json::Value;
use tokio::io::{AsyncWriteExt, DuplexStream, WriteHalf};
use tokio::sync::Mutex;
use tracing_subscriber::EnvFilter;

use crate::protocol::{Envelope, namespace};
use crate::transport::codec::{FrameCodec, encode_frame};

/// Frame limit for the fake side.
const MAX_FRAME_SIZE: u32 = 1024 * 1024;

/// Installs a test log subscriber once; filter with `RUST_LOG`.
pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Default sender-to-receiver envelope on the receiver namespace.
pub(crate) fn receiver_envelope() -> Envelope {
    Envelope::new("sender-0", "receiver-0", namespace::RECEIVER)
}

/// Remote end of a duplex stream that speaks the frame protocol.
pub(crate) struct FakeReceiver {
    reader: FrameCodec,
    writer: Mutex<WriteHalf<DuplexStream>>,
}

impl FakeReceiver {
    pub(crate) fn new(stream: DuplexStream) -> Self {
        init_tracing();
        let (read_half, write_half) = tokio::io::split(stream);
        Self {
            reader: FrameCodec::from_parts(read_half, tokio::io::sink(), MAX_FRAME_SIZE),
            writer: Mutex::new(write_half),
        }
    }

    /// Reads the next frame and parses its payload as JSON.
    pub(crate) async fn next_json(&self) -> (Envelope, Value) {
        let (envelope, payload) = self.reader.receive().await.expect("frame from sender");
        let value = serde_json::from_slice(&payload).expect("JSON payload");
        (envelope, value)
    }

    /// Returns `true` if no frame arrives within `millis`.
    pub(crate) async fn is_silent_for(&self, millis: u64) -> bool {
        tokio::time::timeout(
            std::time::Duration::from_millis(millis),
            self.reader.receive(),
        )
        .await
        .is_err()
    }

    /// Writes one frame with a JSON payload.
    pub(crate) async fn send_json(&self, envelope: &Envelope, value: &Value) {
        let payload = serde_json::to_vec(value).expect("serialize");
        let frame = encode_frame(envelope, &payload).expect("encode");
        self.send_raw(&frame).await;
    }

    /// Writes raw bytes.
    pub(crate) async fn send_raw(&self, bytes: &[u8]) {
        let mut writer = self.writer.lock().await;
        writer.write_all(bytes).await.expect("write");
        writer.flush().await.expect("flush");
    }
}
