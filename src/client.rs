//! Receiver session handle.
//!
//! A [`Client`] owns one [`Connection`], has opened the virtual connection
//! to the receiver, and hands out a [`Launcher`] bound to the same
//! addressing.
//!
//! # Example
//!
//! ```no_run
//! use cast_control::{Addressing, Client, ConnectionOptions};
//!
//! # async fn example(stream: tokio::io::DuplexStream) -> cast_control::Result<()> {
//! let client = Client::connect(stream, ConnectionOptions::default(), Addressing::default()).await?;
//! let status = client.launcher().status().await?;
//! println!("{} applications running", status.applications.len());
//! client.close().await?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info};

use crate::command::{Addressing, Launcher};
use crate::error::Result;
use crate::protocol::{ConnectionCommand, Status, namespace};
use crate::transport::{Connection, ConnectionOptions};

// ============================================================================
// Types
// ============================================================================

/// Internal shared state for a client.
struct ClientInner {
    connection: Connection,
    addressing: Addressing,
    launcher: Launcher,
}

// ============================================================================
// Client
// ============================================================================

/// A connected receiver session.
///
/// Cheap to clone; clones share the connection.
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("addressing", &self.inner.addressing)
            .field("connection", &self.inner.connection)
            .finish()
    }
}

// ============================================================================
// Client - Constructors
// ============================================================================

impl Client {
    /// Wraps a connected stream and opens the virtual connection.
    ///
    /// # Errors
    ///
    /// - [`crate::Error::Config`] for invalid options or addressing
    /// - Any error sending `CONNECT`
    pub async fn connect<S>(
        stream: S,
        options: ConnectionOptions,
        addressing: Addressing,
    ) -> Result<Self>
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        addressing.validate()?;
        let connection = Connection::new(stream, options)?;
        Self::open(connection, addressing).await
    }

    /// Opens the virtual connection on an existing [`Connection`].
    ///
    /// # Errors
    ///
    /// Returns any error sending `CONNECT`.
    pub async fn open(connection: Connection, addressing: Addressing) -> Result<Self> {
        addressing.validate()?;
        connection
            .send(
                &addressing.envelope(namespace::CONNECTION),
                &ConnectionCommand::Connect,
            )
            .await?;

        info!(
            source = %addressing.source,
            destination = %addressing.destination,
            "Virtual connection opened"
        );

        let launcher = Launcher::new(connection.clone(), &addressing);
        Ok(Self {
            inner: Arc::new(ClientInner {
                connection,
                addressing,
                launcher,
            }),
        })
    }
}

// ============================================================================
// Client - Accessors
// ============================================================================

impl Client {
    /// Returns the receiver command builder.
    #[inline]
    #[must_use]
    pub fn launcher(&self) -> &Launcher {
        &self.inner.launcher
    }

    /// Returns the underlying connection.
    #[inline]
    #[must_use]
    pub fn connection(&self) -> &Connection {
        &self.inner.connection
    }

    /// Returns the addressing used by this client.
    #[inline]
    #[must_use]
    pub fn addressing(&self) -> &Addressing {
        &self.inner.addressing
    }
}

// ============================================================================
// Client - Operations
// ============================================================================

impl Client {
    /// Queries the receiver status once.
    ///
    /// # Errors
    ///
    /// See [`Launcher::status`].
    pub async fn first_status(&self) -> Result<Status> {
        self.inner.launcher.status().await
    }

    /// Opens a virtual connection to a running application.
    ///
    /// `transport_id` comes from [`crate::Application::transport_id`].
    ///
    /// # Errors
    ///
    /// Returns any error sending `CONNECT`.
    pub async fn connect_app(&self, transport_id: &str) -> Result<Addressing> {
        let app = self.inner.addressing.with_destination(transport_id);
        app.validate()?;

        self.inner
            .connection
            .send(&app.envelope(namespace::CONNECTION), &ConnectionCommand::Connect)
            .await?;

        debug!(transport_id, "Connected to application");
        Ok(app)
    }

    /// Closes the virtual connection and stops the receive loop.
    ///
    /// # Errors
    ///
    /// Returns any error sending `CLOSE`. The loop is stopped either way.
    pub async fn close(&self) -> Result<()> {
        let result = self
            .inner
            .connection
            .send(
                &self.inner.addressing.envelope(namespace::CONNECTION),
                &ConnectionCommand::Close,
            )
            .await;

        self.inner.connection.shutdown();
        debug!("Client closed");
        result
    }
}

// ============================================================================
// Tests
// ============================================================================
