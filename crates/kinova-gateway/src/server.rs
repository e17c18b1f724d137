//! Framed JSON TCP server.
//!
//! [`KinematicsServer`] accepts connections and answers [`Request`]s with
//! [`Response`]s until the client sends `close` or disconnects. The chain is
//! read-only, so every connection shares one [`Kinematics`] through an `Arc`.

use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::thread;

use serde_json::Value;
use tracing::{debug, info, warn};

use kinova_ik::Kinematics;

use crate::framing::{read_message, write_message};
use crate::handler::handle_request;
use crate::protocol::{Operation, ProtocolError, Request, Response};

/// TCP front end for a shared [`Kinematics`].
pub struct KinematicsServer {
    listener: TcpListener,
    kin: Arc<Kinematics>,
}

impl KinematicsServer {
    /// Bind to `addr` (e.g. `"127.0.0.1:5000"`; port 0 picks a free port).
    pub fn bind(addr: impl ToSocketAddrs, kin: Arc<Kinematics>) -> std::io::Result<Self> {
        let listener = TcpListener::bind(addr)?;
        Ok(Self { listener, kin })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept one connection and serve it on the calling thread.
    pub fn serve_one(&self) -> Result<(), ProtocolError> {
        let (stream, peer) = self.listener.accept()?;
        info!(%peer, "client connected");
        handle_connection(stream, &self.kin)
    }

    /// Accept connections forever, one thread per connection.
    ///
    /// Returns only if `accept` itself fails.
    pub fn serve(&self) -> Result<(), ProtocolError> {
        info!(address = %self.local_addr()?, "serving kinematics requests");
        loop {
            let (stream, peer) = self.listener.accept()?;
            info!(%peer, "client connected");
            let kin = Arc::clone(&self.kin);
            thread::spawn(move || {
                if let Err(err) = handle_connection(stream, &kin) {
                    warn!(%peer, %err, "connection ended with error");
                }
            });
        }
    }
}

/// Request/response loop for one client.
///
/// Malformed requests get a failure envelope and the connection stays open;
/// transport errors end it.
fn handle_connection(stream: TcpStream, kin: &Kinematics) -> Result<(), ProtocolError> {
    let mut reader = stream.try_clone()?;
    let mut writer = stream;

    loop {
        let Some(raw) = read_message::<Value>(&mut reader)? else {
            debug!("client disconnected");
            break;
        };

        let (response, close) = match serde_json::from_value::<Request>(raw) {
            Ok(request) => {
                debug!(op = ?request.op, "request");
                (
                    handle_request(kin, &request),
                    request.op == Operation::Close,
                )
            }
            Err(err) => (Response::failure(format!("Invalid request: {err}")), false),
        };

        write_message(&mut writer, &response)?;
        if close {
            debug!("client closed session");
            break;
        }
    }

    Ok(())
}
