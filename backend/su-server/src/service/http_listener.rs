use crate::{ServerError, ServerResult};

use std::net::SocketAddr;

use tokio::net::TcpListener;

/// Socket the update API is served on.
pub enum HttpListener {
    /// Bound when the control loop starts
    Address(String),
    /// Already bound by the caller
    Bound(TcpListener),
}

impl HttpListener {
    pub fn address(addr: impl Into<String>) -> Self {
        HttpListener::Address(addr.into())
    }

    pub fn bound(listener: TcpListener) -> Self {
        HttpListener::Bound(listener)
    }

    pub(crate) async fn into_listener(self) -> ServerResult<(TcpListener, SocketAddr)> {
        let listener = match self {
            HttpListener::Address(addr) => TcpListener::bind(&addr)
                .await
                .map_err(|e| ServerError::io(format!("Failed to bind {addr}"), e))?,
            HttpListener::Bound(listener) => listener,
        };

        // Actual address matters when port 0 was requested
        let local_addr = listener
            .local_addr()
            .map_err(|e| ServerError::io("Failed to read listener address", e))?;

        Ok((listener, local_addr))
    }
}
