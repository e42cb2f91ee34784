//! registry::http
//!
//! Remote registry client.
//!
//! # Endpoints
//!
//! - `reference` mode: `POST {base_url}/validate-reference`
//! - `forms` mode: `POST {base_url}/validate-google-forms`, sending the
//!   identity as `userDetails`
//!
//! # Response Mapping
//!
//! The body's [`Outcome`] decides, falling back to
//! [`ValidationResponse::outcome`] inference for backends that omit it.
//!
//! | Response | Status |
//! |---|---|
//! | `validated` | `Available`, or `AlreadyUsed` if `data.status` is processed |
//! | `already_used` | `AlreadyUsed` |
//! | `not_found` | `NotFound` |
//! | `rejected` | `RegistryError::Api` (422) |
//! | `unavailable`, or no recognisable outcome | `RegistryError::Unavailable` |
//! | non-2xx | `RegistryError::Api` |
//! | connection or body failure | `RegistryError::Unavailable` |
//!
//! Only `not_found` and `already_used` are definitive. A bare
//! `success: false` is not enough to call a code unregistered.
//!
//! The client applies no timeout of its own; the verifier bounds each
//! lookup.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, Response};

use super::factory::RegistryEndpoint;
use super::traits::{Registry, RegistryError, RegistryStatus, Submission, SubmissionStatus};
use crate::api::{
    Outcome, ValidateGoogleFormsRequest, ValidateReferenceRequest, ValidationResponse,
};
use crate::core::types::{Identity, ReferenceCode};

/// HTTP registry client.
#[derive(Debug, Clone)]
pub struct HttpRegistry {
    client: Client,
    base_url: String,
    endpoint: RegistryEndpoint,
}

impl HttpRegistry {
    /// Create a client for the backend at `base_url`.
    pub fn new(base_url: impl Into<String>, endpoint: RegistryEndpoint) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            endpoint,
        }
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the endpoint mode.
    pub fn endpoint(&self) -> RegistryEndpoint {
        self.endpoint
    }

    fn url(&self) -> String {
        format!("{}/{}", self.base_url, self.endpoint.path())
    }

    async fn send(
        &self,
        code: &ReferenceCode,
        identity: &Identity,
    ) -> Result<Response, RegistryError> {
        let request = self.client.post(self.url());
        let request = match self.endpoint {
            RegistryEndpoint::Reference => {
                request.json(&ValidateReferenceRequest::new(code.as_str()))
            }
            RegistryEndpoint::Forms => {
                request.json(&ValidateGoogleFormsRequest::new(code.as_str(), identity.clone()))
            }
        };
        request
            .send()
            .await
            .map_err(|e| RegistryError::Unavailable(e.to_string()))
    }

    /// Handle a response, mapping errors appropriately.
    async fn handle_response(
        &self,
        code: &ReferenceCode,
        response: Response,
    ) -> Result<RegistryStatus, RegistryError> {
        let status = response.status();

        if !status.is_success() {
            let message = match response.json::<ValidationResponse>().await {
                Ok(body) => body.message,
                Err(_) => status
                    .canonical_reason()
                    .unwrap_or("unknown error")
                    .to_string(),
            };
            return Err(RegistryError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: ValidationResponse = response.json().await.map_err(|e| {
            RegistryError::Unavailable(format!("failed to parse response: {}", e))
        })?;

        map_response(code, body)
    }
}

/// Map a successful HTTP exchange onto a registry status.
fn map_response(
    code: &ReferenceCode,
    body: ValidationResponse,
) -> Result<RegistryStatus, RegistryError> {
    let outcome = body.outcome();
    let submission = body.data.map(|data| Submission {
        code: code.clone(),
        form_id: data.form_id,
        submission_time: data.submission_time,
        status: data.status,
    });
    // The reference endpoint may confirm without submission details.
    let placeholder = |status| Submission {
        code: code.clone(),
        form_id: String::new(),
        submission_time: Utc::now(),
        status,
    };

    match outcome {
        Some(Outcome::Validated) => Ok(RegistryStatus::from_submission(
            submission.unwrap_or_else(|| placeholder(SubmissionStatus::Validated)),
        )),
        Some(Outcome::AlreadyUsed) => Ok(RegistryStatus::AlreadyUsed(
            submission.unwrap_or_else(|| placeholder(SubmissionStatus::Processed)),
        )),
        Some(Outcome::NotFound) => Ok(RegistryStatus::NotFound),
        Some(Outcome::Rejected) => Err(RegistryError::Api {
            status: Outcome::Rejected.http_status(),
            message: body.message,
        }),
        Some(Outcome::Unavailable) => Err(RegistryError::Unavailable(body.message)),
        None => Err(RegistryError::Unavailable(format!(
            "unrecognised registry answer: {}",
            body.message
        ))),
    }
}

#[async_trait]
impl Registry for HttpRegistry {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn lookup(
        &self,
        code: &ReferenceCode,
        identity: &Identity,
    ) -> Result<RegistryStatus, RegistryError> {
        tracing::debug!(code = %code, url = %self.url(), "querying remote registry");
        let response = self.send(code, identity).await?;
        self.handle_response(code, response).await
    }
}
