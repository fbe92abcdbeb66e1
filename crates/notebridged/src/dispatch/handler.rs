//! Connection handler that dispatches JSONL requests.
//!
//! `DispatchConnectionHandler` implements the transport's `ConnectionHandler`
//! trait. Each connection carries one request line and receives one response
//! line before the connection closes.

use std::io::{self, BufRead, BufReader, Read};
use std::time::Duration;

use tracing::{debug, warn};

use crate::transport::{ConnectionHandler, ConnectionStream};

use super::DISPATCH_TARGET;
use super::dispatcher::RequestDispatcher;
use super::errors::DispatchError;
use super::response::ResponseWriter;

/// Maximum size of a single request line in bytes.
pub(crate) const MAX_REQUEST_BYTES: usize = 1024 * 1024;

/// Time a client has to deliver its request line.
pub(crate) const REQUEST_READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection handler that reads, dispatches, and answers one request.
#[derive(Debug)]
pub struct DispatchConnectionHandler {
    dispatcher: RequestDispatcher,
    read_timeout: Duration,
}

impl DispatchConnectionHandler {
    /// Creates a handler serving requests through `dispatcher`.
    pub fn new(dispatcher: RequestDispatcher) -> Self {
        Self {
            dispatcher,
            read_timeout: REQUEST_READ_TIMEOUT,
        }
    }

    /// Overrides how long a client may take to send its request line.
    #[must_use]
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    fn dispatch(&self, mut stream: ConnectionStream) {
        if let Err(error) = stream.set_read_timeout(Some(self.read_timeout)) {
            warn!(target: DISPATCH_TARGET, %error, "failed to set request read timeout");
            return;
        }
        let request_bytes = match read_request_line(&mut stream) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                debug!(target: DISPATCH_TARGET, "client disconnected without request");
                return;
            }
            Err(DispatchError::Io(error)) if is_timeout(&error) => {
                warn!(
                    target: DISPATCH_TARGET,
                    timeout = ?self.read_timeout,
                    "client did not send a request in time"
                );
                return;
            }
            Err(error) => {
                warn!(
                    target: DISPATCH_TARGET,
                    status = error.status(),
                    %error,
                    "failed to read request"
                );
                let mut writer = ResponseWriter::new(&mut stream);
                if let Err(error) = writer.write_error(&error) {
                    debug!(target: DISPATCH_TARGET, %error, "failed to write rejection");
                }
                return;
            }
        };

        let response = self.dispatcher.dispatch_line(&request_bytes);
        let mut writer = ResponseWriter::new(&mut stream);
        if let Err(error) = writer.write_response(&response) {
            warn!(target: DISPATCH_TARGET, %error, "failed to write response");
        }
    }
}

impl ConnectionHandler for DispatchConnectionHandler {
    fn handle(&self, stream: ConnectionStream) {
        self.dispatch(stream);
    }
}

fn is_timeout(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
    )
}

/// Reads the request line, stopping at the first newline or at EOF.
///
/// The limit applies to the payload; the terminating newline does not count.
/// At most two bytes past [`MAX_REQUEST_BYTES`] are consumed, which is enough
/// to tell an oversized payload from one that fits with its newline.
/// `Ok(None)` means the client closed the connection without sending
/// anything.
fn read_request_line(stream: impl Read) -> Result<Option<Vec<u8>>, DispatchError> {
    let ceiling = u64::try_from(MAX_REQUEST_BYTES + 2).unwrap_or(u64::MAX);
    let mut reader = BufReader::new(stream.take(ceiling));
    let mut line = Vec::new();
    reader.read_until(b'\n', &mut line)?;
    let payload = line.strip_suffix(b"\n").map_or(line.len(), <[u8]>::len);
    if payload > MAX_REQUEST_BYTES {
        return Err(DispatchError::request_too_large(payload, MAX_REQUEST_BYTES));
    }
    Ok((!line.is_empty()).then_some(line))
}
