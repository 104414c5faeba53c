//! Authenticated request execution.
//!
//! `Transport` is the only component that talks to the executor. For every
//! call it obtains a fresh credential, attaches it as a bearer header, sends
//! the request, and classifies the outcome. It never touches the cache or the
//! notification sink.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use crate::client::{parse_json, Operation};
use crate::credential::CredentialProvider;
use crate::error::ApiError;
use crate::http::{HttpExecutor, HttpRequest};

#[derive(Clone)]
pub struct Transport {
    credentials: Arc<dyn CredentialProvider>,
    executor: Arc<dyn HttpExecutor>,
}

impl Transport {
    pub fn new(
        credentials: Arc<dyn CredentialProvider>,
        executor: Arc<dyn HttpExecutor>,
    ) -> Self {
        Self {
            credentials,
            executor,
        }
    }

    /// Execute `request` on behalf of the current user and decode the JSON
    /// body of a 2xx response.
    ///
    /// # Errors
    /// - `ApiError::Credential` if no token could be obtained; nothing is sent.
    /// - `ApiError::Http` for non-2xx statuses and network failures.
    /// - `ApiError::Decode` if the body is not the expected JSON.
    #[instrument(skip(self, request), fields(operation = %operation, method = request.method.as_str()))]
    pub async fn execute<T: DeserializeOwned>(
        &self,
        operation: Operation,
        mut request: HttpRequest,
    ) -> Result<T, ApiError> {
        let credential = self.credentials.get_token().await?;
        request
            .headers
            .push(("authorization".to_string(), credential.bearer()));

        debug!(url = %request.url, "sending request");
        let response = self.executor.send(request).await.map_err(|e| {
            warn!(error = %e.0, "network failure");
            ApiError::Http {
                operation,
                status: None,
            }
        })?;

        if !response.is_success() {
            warn!(status = response.status, "request rejected");
        }
        parse_json(operation, &response)
    }
}
