//! Error types for request dispatch failures.
//!
//! Every failure a request can run into is a [`DispatchError`] variant. The
//! variant decides the HTTP-style status and whether the caller sees a body.

use std::io;

use thiserror::Error;

use crate::host::HostError;

/// Errors surfaced while parsing, authenticating, resolving, invoking, or
/// serializing a request.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Request line could not be parsed as a request object.
    #[error("malformed request: {message}")]
    MalformedRequest {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    /// Request parsed but a required field was empty.
    #[error("invalid request structure: {message}")]
    InvalidStructure { message: String },

    /// Request exceeds the maximum allowed size.
    #[error("request too large: {size} bytes exceeds {max_size} byte limit")]
    RequestTooLarge { size: usize, max_size: usize },

    /// Supplied token did not match the expected token.
    #[error("unauthorized")]
    Unauthorized,

    /// The member is not part of the target kind's catalogue.
    #[error("unsupported operation '{member}' on {kind}")]
    UnsupportedOperation { kind: &'static str, member: String },

    /// Arguments did not satisfy the member's schema.
    #[error("invalid arguments for '{member}': {message}")]
    InvalidArguments { member: String, message: String },

    /// The requested identifier did not resolve to a host object.
    #[error("{kind} '{id}' not found")]
    MissingTarget { kind: &'static str, id: String },

    /// The host raised a failure while reading or calling the member.
    #[error(transparent)]
    Host(#[from] HostError),

    /// The result could not be rendered as JSON text.
    #[error("failed to serialize result: {message}")]
    Serialization { message: String },

    /// IO error during read or write.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Response envelope serialization failed.
    #[error("failed to serialize response: {0}")]
    SerializeResponse(#[from] serde_json::Error),
}

impl DispatchError {
    /// Returns the HTTP-style status code for this error.
    ///
    /// Protocol violations and catalogue rejections answer 400, token
    /// mismatches 401, and failures past resolution 500.
    pub fn status(&self) -> u16 {
        match self {
            Self::MalformedRequest { .. }
            | Self::InvalidStructure { .. }
            | Self::RequestTooLarge { .. }
            | Self::UnsupportedOperation { .. }
            | Self::InvalidArguments { .. } => 400,
            Self::Unauthorized => 401,
            Self::MissingTarget { .. }
            | Self::Host(_)
            | Self::Serialization { .. }
            | Self::Io(_)
            | Self::SerializeResponse(_) => 500,
        }
    }

    /// Body text returned to the caller, if any.
    ///
    /// Unauthorized requests get no body. Host failures carry the host's
    /// message verbatim.
    pub fn body(&self) -> Option<String> {
        match self {
            Self::Unauthorized => None,
            other => Some(other.to_string()),
        }
    }

    /// Short label used in outcome logs.
    pub fn outcome(&self) -> &'static str {
        match self {
            Self::MalformedRequest { .. }
            | Self::InvalidStructure { .. }
            | Self::RequestTooLarge { .. } => "bad_request",
            Self::Unauthorized => "unauthorized",
            Self::UnsupportedOperation { .. } => "unsupported_operation",
            Self::InvalidArguments { .. } => "invalid_arguments",
            Self::MissingTarget { .. } => "missing_target",
            Self::Host(_) => "host_failure",
            Self::Serialization { .. } => "serialization_failure",
            Self::Io(_) | Self::SerializeResponse(_) => "io_failure",
        }
    }

    /// Creates a malformed request error from a serde error.
    pub fn from_json_error(source: serde_json::Error) -> Self {
        Self::MalformedRequest {
            message: source.to_string(),
            source: Some(source),
        }
    }

    /// Creates a malformed request error with a custom message.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedRequest {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an invalid structure error.
    pub fn invalid_structure(message: impl Into<String>) -> Self {
        Self::InvalidStructure {
            message: message.into(),
        }
    }

    /// Creates a request too large error.
    pub fn request_too_large(size: usize, max_size: usize) -> Self {
        Self::RequestTooLarge { size, max_size }
    }

    /// Creates an unsupported operation error.
    pub fn unsupported_operation(kind: &'static str, member: impl Into<String>) -> Self {
        Self::UnsupportedOperation {
            kind,
            member: member.into(),
        }
    }

    /// Creates an invalid arguments error.
    pub fn invalid_arguments(member: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArguments {
            member: member.into(),
            message: message.into(),
        }
    }

    /// Creates a missing target error.
    pub fn missing_target(kind: &'static str, id: impl Into<String>) -> Self {
        Self::MissingTarget {
            kind,
            id: id.into(),
        }
    }

    /// Creates a serialization error.
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::malformed(DispatchError::malformed("eof"), 400)]
    #[case::unsupported(DispatchError::unsupported_operation("note", "explode"), 400)]
    #[case::invalid_args(DispatchError::invalid_arguments("getNote", "missing"), 400)]
    #[case::unauthorized(DispatchError::Unauthorized, 401)]
    #[case::missing_target(DispatchError::missing_target("note", "abc"), 500)]
    #[case::host(DispatchError::Host(HostError::new("boom")), 500)]
    #[case::serialization(DispatchError::serialization("too deep"), 500)]
    fn maps_statuses(#[case] error: DispatchError, #[case] status: u16) {
        assert_eq!(error.status(), status);
    }

    #[test]
    fn host_failures_relay_the_message_verbatim() {
        let error = DispatchError::from(HostError::new("note is protected"));
        assert_eq!(error.body().as_deref(), Some("note is protected"));
    }

    #[test]
    fn unauthorized_has_no_body() {
        assert_eq!(DispatchError::Unauthorized.body(), None);
    }
}
