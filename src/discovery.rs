//! Device discovery seam.
//!
//! Scanning the network is out of this crate's hands; a [`Scanner`]
//! implementation reports candidate devices and the application picks one,
//! opens a stream to it and builds a [`crate::Client`].

// ============================================================================
// Imports
// ============================================================================

use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::debug;

use crate::error::{Error, Result};

// ============================================================================
// Device
// ============================================================================

/// A receiver found on the network.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Device {
    /// Friendly name.
    pub name: String,
    /// Control endpoint.
    pub addr: SocketAddr,
    /// Stable device id, when advertised.
    pub uuid: Option<String>,
}

// ============================================================================
// Scanner
// ============================================================================

/// Source of candidate devices.
#[async_trait]
pub trait Scanner: Send + Sync {
    /// Reports devices on `results` until done or until the receiver is dropped.
    async fn scan(&self, results: mpsc::Sender<Device>) -> Result<()>;
}

/// Returns the first device a scanner reports within `limit`.
///
/// # Errors
///
/// - [`Error::Discovery`] if the scan ends or the limit passes with no device
/// - Any error the scanner returns before reporting a device
pub async fn first_device<S>(scanner: &S, limit: Duration) -> Result<Device>
where
    S: Scanner + ?Sized,
{
    let (tx, mut rx) = mpsc::channel(8);

    let search = async {
        let scan = scanner.scan(tx);
        tokio::pin!(scan);

        // Scan outcome first so a scanner error wins over the closed channel.
        tokio::select! {
            biased;

            result = &mut scan => {
                result?;
                rx.recv()
                    .await
                    .ok_or_else(|| Error::discovery("scan ended without devices"))
            }
            device = rx.recv() => device.ok_or_else(|| Error::discovery("scan ended without devices")),
        }
    };

    let device = timeout(limit, search)
        .await
        .map_err(|_| Error::discovery(format!("no device found within {}ms", limit.as_millis())))??;

    debug!(name = %device.name, addr = %device.addr, "Found device");
    Ok(device)
}

// ============================================================================
// Tests
// ============================================================================
