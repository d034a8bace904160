//! SDK error classification
//!
//! Maps `SdkError`s onto the shared taxonomy: service-level refusals
//! become `DeleteRejected`, everything else (dispatch, timeouts, auth
//! plumbing) becomes `Transport`. Not-found detection stays at the call
//! sites, where the operation-specific predicates live.

use aws_sdk_cloudformation::error::{ProvideErrorMetadata, SdkError};
use downstack_core::Error;

/// Best-effort human message out of a service error.
pub(crate) fn message<E: ProvideErrorMetadata>(err: &E) -> String {
    err.meta()
        .message()
        .unwrap_or("unspecified provider error")
        .to_string()
}

/// Classify a read-path failure as a transport error.
pub(crate) fn transport<E, R>(err: SdkError<E, R>) -> Error
where
    E: ProvideErrorMetadata + std::fmt::Debug,
    R: std::fmt::Debug,
{
    Error::Transport(match err {
        SdkError::ServiceError(ctx) => message(ctx.err()),
        other => format!("{other:?}"),
    })
}

/// Classify a delete-request failure: a service error is a rejection,
/// anything below that layer is transport trouble.
pub(crate) fn delete_rejected<E, R>(name: &str, err: SdkError<E, R>) -> Error
where
    E: ProvideErrorMetadata + std::fmt::Debug,
    R: std::fmt::Debug,
{
    match err {
        SdkError::ServiceError(ctx) => Error::DeleteRejected {
            name: name.to_string(),
            reason: message(ctx.err()),
        },
        other => Error::Transport(format!("{other:?}")),
    }
}
