//! Error types for the my-shop API client.
//!
//! # Design
//! Every failure is recoverable by retrying the user-initiated action, so the
//! taxonomy is flat. Non-2xx statuses and network failures both land in
//! `Http`; `status` is `None` when no response was received. `ApiError` is
//! `Clone` because one in-flight read hands the same result to every
//! attached caller.

use thiserror::Error;

use crate::client::Operation;
use crate::mutation::MutationKind;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// The credential provider could not produce a token. The operation is
    /// aborted before any request is sent.
    #[error("credential acquisition failed: {0}")]
    Credential(String),

    /// Non-2xx response or transport-level failure.
    #[error("failed to {operation}{}", status_suffix(.status))]
    Http {
        operation: Operation,
        status: Option<u16>,
    },

    /// The response body was not the JSON the operation expected.
    #[error("failed to {operation}: invalid response body: {message}")]
    Decode { operation: Operation, message: String },

    /// The request payload could not be serialized.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// A mutation of this kind is already pending on the handle.
    #[error("{0} is already in flight")]
    MutationInFlight(MutationKind),

    /// The runtime dropped the mutation task before it finished.
    #[error("{0} was aborted before completing")]
    Aborted(MutationKind),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ApiError {
    /// HTTP status of the failed exchange, when a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => *status,
            _ => None,
        }
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(" (HTTP {code})"),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_failure_display_includes_status_when_known() {
        let err = ApiError::Http {
            operation: Operation::GetMyShop,
            status: Some(404),
        };
        assert_eq!(err.to_string(), "failed to get my shop (HTTP 404)");
        assert_eq!(err.status(), Some(404));

        let err = ApiError::Http {
            operation: Operation::UpdateOrderStatus,
            status: None,
        };
        assert_eq!(err.to_string(), "failed to update order status");
        assert_eq!(err.status(), None);
    }
}
