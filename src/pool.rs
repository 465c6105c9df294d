//! Connection pool.
//!
//! The pool owns connection lifecycle and reuse policy; individual calls
//! only borrow. Capacity is enforced with semaphore permits: a checked-out
//! connection holds a permit until the call finishes (buffered) or the
//! response stream is dropped (streaming), so abandoning a stream can never
//! leak a slot. Idle connections left healthy by buffered calls are reused;
//! streaming calls retire their connection, since a half-read body cannot be
//! reused safely.

use crate::error::TransportError;
use crate::transport::{Connector, OutboundBody};
use hyper::body::Incoming;
use hyper::client::conn::http1;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

pub(crate) struct Pool {
    shared: Arc<Shared>,
}

struct Shared {
    connector: Box<dyn Connector>,
    semaphore: Arc<Semaphore>,
    idle: Mutex<Vec<http1::SendRequest<OutboundBody>>>,
    capacity: usize,
    connect_timeout: Duration,
}

impl Pool {
    pub(crate) fn new(
        connector: Box<dyn Connector>,
        capacity: usize,
        connect_timeout: Duration,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                connector,
                semaphore: Arc::new(Semaphore::new(capacity)),
                idle: Mutex::new(Vec::new()),
                capacity,
                connect_timeout,
            }),
        }
    }

    /// Number of connections currently checked out.
    pub(crate) fn active(&self) -> usize {
        self.shared.capacity - self.shared.semaphore.available_permits()
    }

    /// Checks a connection out of the pool, dialing if no healthy idle
    /// connection is available.
    ///
    /// Waits for a permit when the pool is at capacity.
    pub(crate) async fn acquire(&self) -> Result<PooledConn, TransportError> {
        let permit = Arc::clone(&self.shared.semaphore)
            .acquire_owned()
            .await
            .map_err(|_| TransportError::Connect("connection pool closed".to_string()))?;

        // Dead idle connections are discarded here rather than on return,
        // so a daemon restart costs one failed checkout, not a failed call.
        loop {
            let candidate = {
                let mut idle = self.shared.idle.lock().unwrap_or_else(|e| e.into_inner());
                idle.pop()
            };
            let Some(mut sender) = candidate else { break };
            if sender.is_closed() {
                continue;
            }
            if sender.ready().await.is_ok() {
                return Ok(PooledConn {
                    sender,
                    permit,
                    shared: Arc::clone(&self.shared),
                });
            }
        }

        let sender = self.dial().await?;
        Ok(PooledConn {
            sender,
            permit,
            shared: Arc::clone(&self.shared),
        })
    }

    async fn dial(&self) -> Result<http1::SendRequest<OutboundBody>, TransportError> {
        let io = tokio::time::timeout(self.shared.connect_timeout, self.shared.connector.connect())
            .await
            .map_err(|_| TransportError::ConnectTimeout)?
            .map_err(|e| TransportError::Connect(e.to_string()))?;

        let (sender, conn) = http1::handshake::<_, OutboundBody>(TokioIo::new(io))
            .await
            .map_err(|e| TransportError::Connect(format!("handshake failed: {e}")))?;

        tokio::spawn(async move {
            if let Err(err) = conn.await {
                let msg = err.to_string().to_lowercase();
                if !msg.contains("connection reset")
                    && !msg.contains("broken pipe")
                    && !msg.contains("shutting down")
                {
                    tracing::debug!("daemon connection ended: {err}");
                }
            }
        });

        tracing::trace!(active = self.active(), "dialed new daemon connection");
        Ok(sender)
    }
}

/// A connection checked out of the pool.
///
/// Holds the capacity permit; dropping the value releases the slot.
pub(crate) struct PooledConn {
    sender: http1::SendRequest<OutboundBody>,
    permit: OwnedSemaphorePermit,
    shared: Arc<Shared>,
}

impl PooledConn {
    pub(crate) async fn send(
        &mut self,
        request: Request<OutboundBody>,
    ) -> hyper::Result<Response<Incoming>> {
        self.sender.send_request(request).await
    }

    /// Returns the connection to the idle set if it is still usable.
    ///
    /// Only valid once the response body has been drained to the end.
    pub(crate) fn recycle(self) {
        let Self {
            sender,
            permit,
            shared,
        } = self;
        if !sender.is_closed() {
            shared
                .idle
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(sender);
        }
        drop(permit);
    }

    /// Surrenders the connection, keeping only the capacity permit.
    ///
    /// Used by streaming responses: the in-flight body stays alive on the
    /// connection task, and the permit travels with the stream handle so
    /// the slot is released exactly when the stream is dropped.
    pub(crate) fn into_permit(self) -> OwnedSemaphorePermit {
        self.permit
    }
}
