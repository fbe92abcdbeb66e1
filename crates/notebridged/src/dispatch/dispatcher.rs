//! Per-request pipeline.
//!
//! A request moves through authentication, resolution, invocation, and
//! serialization, producing exactly one response. Each terminal outcome is
//! logged once under [`DISPATCH_TARGET`].

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::host::Host;

use super::DISPATCH_TARGET;
use super::auth::TokenGate;
use super::errors::DispatchError;
use super::invoker::{InvocationResult, Invoker};
use super::request::BridgeRequest;
use super::resolver::{ObjectKind, ObjectResolver};
use super::response::BridgeResponse;
use super::serializer::SerializationPolicy;

/// Authenticates, resolves, invokes, and serializes requests against a host.
///
/// Holds no per-request state; one instance serves every connection.
#[derive(Clone)]
pub struct RequestDispatcher {
    host: Arc<dyn Host>,
    gate: TokenGate,
    resolver: ObjectResolver,
    invoker: Invoker,
    policy: SerializationPolicy,
}

impl fmt::Debug for RequestDispatcher {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("RequestDispatcher")
            .field("gate", &self.gate)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl RequestDispatcher {
    pub fn new(host: Arc<dyn Host>, gate: TokenGate, policy: SerializationPolicy) -> Self {
        Self {
            host,
            gate,
            resolver: ObjectResolver::new(),
            invoker: Invoker::new(),
            policy,
        }
    }

    /// Parses and dispatches one JSONL request line.
    pub fn dispatch_line(&self, line: &[u8]) -> BridgeResponse {
        match BridgeRequest::parse(line) {
            Ok(request) => self.dispatch(&request),
            Err(error) => {
                warn!(
                    target: DISPATCH_TARGET,
                    status = error.status(),
                    outcome = error.outcome(),
                    %error,
                    "request rejected"
                );
                BridgeResponse::from_error(&error)
            }
        }
    }

    /// Dispatches a parsed request.
    pub fn dispatch(&self, request: &BridgeRequest) -> BridgeResponse {
        let outcome = self.run(request);
        log_outcome(request, &outcome);
        match outcome {
            Ok(Some(body)) => BridgeResponse::created(body),
            Ok(None) => BridgeResponse::no_content(),
            Err(error) => BridgeResponse::from_error(&error),
        }
    }

    fn run(&self, request: &BridgeRequest) -> Result<Option<String>, DispatchError> {
        if !self
            .gate
            .validate(self.host.as_ref(), request.token.as_deref())
        {
            return Err(DispatchError::Unauthorized);
        }
        request.validate()?;

        debug!(
            target: DISPATCH_TARGET,
            object_kind = request.object_kind(),
            object_id = request.object_id(),
            method_name = request.method_name(),
            args = %Args(&request.args),
            "invoking"
        );

        let kind = ObjectKind::parse(request.object_kind());
        let target = self
            .resolver
            .resolve(self.host.as_ref(), &kind, request.object_id());

        match self
            .invoker
            .invoke(&target, request.method_name(), &request.args)?
        {
            InvocationResult::Value(value) => self.policy.serialize(&value).map(Some),
            InvocationResult::Absent => Ok(None),
        }
    }
}

fn log_outcome(request: &BridgeRequest, outcome: &Result<Option<String>, DispatchError>) {
    match outcome {
        Ok(body) => {
            let status = if body.is_some() { 201 } else { 400 };
            info!(
                target: DISPATCH_TARGET,
                object_kind = request.object_kind(),
                object_id = request.object_id(),
                method_name = request.method_name(),
                status,
                outcome = if body.is_some() { "ok" } else { "absent" },
                "request completed"
            );
        }
        Err(DispatchError::Unauthorized) => {
            warn!(
                target: DISPATCH_TARGET,
                object_kind = request.object_kind(),
                method_name = request.method_name(),
                status = 401,
                outcome = "unauthorized",
                "request completed"
            );
        }
        Err(error) => {
            warn!(
                target: DISPATCH_TARGET,
                object_kind = request.object_kind(),
                object_id = request.object_id(),
                method_name = request.method_name(),
                args = %Args(&request.args),
                status = error.status(),
                outcome = error.outcome(),
                %error,
                "request completed"
            );
        }
    }
}

/// Renders arguments as compact JSON for logs.
struct Args<'a>(&'a [Value]);

impl fmt::Display for Args<'_> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self.0) {
            Ok(text) => formatter.write_str(&text),
            Err(_) => formatter.write_str("<unprintable>"),
        }
    }
}
