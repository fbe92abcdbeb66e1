//! Response envelope and JSONL writer.
//!
//! Every request is answered with exactly one line:
//! `{"status":<u16>,"body":<string|null>}`.

use std::io::Write;

use serde::{Deserialize, Serialize};

use super::errors::DispatchError;

/// Status returned with a serialized result.
pub const STATUS_CREATED: u16 = 201;
/// Status returned when the host produced nothing.
pub const STATUS_NO_CONTENT: u16 = 400;

/// HTTP-style response to one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeResponse {
    pub status: u16,
    pub body: Option<String>,
}

impl BridgeResponse {
    /// A successful response carrying JSON text.
    pub fn created(body: String) -> Self {
        Self {
            status: STATUS_CREATED,
            body: Some(body),
        }
    }

    /// The response for an absent result: 400 with no body.
    pub fn no_content() -> Self {
        Self {
            status: STATUS_NO_CONTENT,
            body: None,
        }
    }

    /// The response for a failed request.
    pub fn from_error(error: &DispatchError) -> Self {
        Self {
            status: error.status(),
            body: error.body(),
        }
    }
}

/// Writer that frames responses as JSONL.
pub struct ResponseWriter<W> {
    writer: W,
}

impl<W: Write> ResponseWriter<W> {
    /// Creates a new response writer wrapping the given output stream.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Writes a response line and flushes the stream.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization, writing, or flushing fails.
    pub fn write_response(&mut self, response: &BridgeResponse) -> Result<(), DispatchError> {
        serde_json::to_writer(&mut self.writer, response)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }

    /// Writes the response for `error`.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_error(&mut self, error: &DispatchError) -> Result<(), DispatchError> {
        self.write_response(&BridgeResponse::from_error(error))
    }
}
