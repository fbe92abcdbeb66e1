//! Catalogue-driven member invocation.

use serde_json::Value;

use super::catalogue::{MemberCatalogue, MemberShape};
use super::errors::DispatchError;
use super::resolver::TargetHandle;

/// What a successful invocation produced.
#[derive(Debug, Clone, PartialEq)]
pub enum InvocationResult {
    Value(Value),
    /// The host returned nothing.
    Absent,
}

/// Invokes catalogued members on resolved handles.
#[derive(Debug, Default, Clone, Copy)]
pub struct Invoker {
    catalogue: MemberCatalogue,
}

impl Invoker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads or calls `member` on `target` with `args`.
    ///
    /// The member and its arguments are checked against the catalogue before
    /// the host is touched.
    ///
    /// # Errors
    ///
    /// - `UnsupportedOperation` when the target's kind has no such member.
    /// - `InvalidArguments` when `args` do not fit the member's schema.
    /// - `MissingTarget` when the handle holds no object.
    /// - `Host` when the host fails while reading or calling.
    pub fn invoke(
        &self,
        target: &TargetHandle,
        member: &str,
        args: &[Value],
    ) -> Result<InvocationResult, DispatchError> {
        let entry = self.catalogue.lookup(target.kind(), member)?;
        entry.validate(args)?;

        let object = target.object().ok_or_else(|| {
            DispatchError::missing_target(
                target.kind().as_str(),
                target.id().unwrap_or("<none>"),
            )
        })?;

        let value = match entry.shape {
            MemberShape::Property => object.read(entry.name)?,
            MemberShape::Method(_) => object.call(entry.name, args)?,
        };

        Ok(match value {
            Value::Null => InvocationResult::Absent,
            other => InvocationResult::Value(other),
        })
    }
}
