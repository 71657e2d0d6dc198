//! reqwest-backed `RecordRepository` and `AuthService`.

use std::time::Duration;

use academy_core::error::DomainError;
use academy_core::record::{CandidateHistory, CompletedTechniqueRecord, CustomerSessionRecord};
use academy_core::repository::{AuthService, RecordRepository};
use academy_core::user::{AuthOutcome, Credentials};
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Request timeout used by [`HttpBackend::new`].
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the academy REST backend.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    http: Client,
    base_url: Url,
}

#[derive(Debug, Serialize)]
struct RegisterRequest<'a> {
    name: &'a str,
    #[serde(flatten)]
    credentials: &'a Credentials,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

impl HttpBackend {
    /// Create a client for the backend at `base_url` with
    /// [`DEFAULT_TIMEOUT`].
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if `base_url` is not an absolute
    /// http(s) URL.
    pub fn new(base_url: &str) -> Result<Self, DomainError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Create a client whose requests give up after `timeout`. A hung
    /// backend then surfaces as `DomainError::Infrastructure`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if `base_url` is not an absolute
    /// http(s) URL, or `DomainError::Infrastructure` if the HTTP client
    /// cannot be built.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, DomainError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::Infrastructure(format!("cannot build HTTP client: {e}")))?;
        Self::with_client(http, base_url)
    }

    /// Create a backend client reusing an existing `reqwest::Client`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if `base_url` is not an absolute
    /// http(s) URL.
    pub fn with_client(http: Client, base_url: &str) -> Result<Self, DomainError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| DomainError::Validation(format!("invalid backend URL: {e}")))?;
        if !matches!(base_url.scheme(), "http" | "https") || base_url.cannot_be_a_base() {
            return Err(DomainError::Validation(format!(
                "backend URL must be http(s): {base_url}"
            )));
        }
        Ok(Self { http, base_url })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, DomainError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| DomainError::Validation("backend URL cannot be a base".to_owned()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn post_record<T: Serialize + Sync>(
        &self,
        segments: &[&str],
        body: &T,
    ) -> Result<(), DomainError> {
        let url = self.endpoint(segments)?;
        debug!(%url, "posting record");
        self.http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(transport_error)?
            .error_for_status()
            .map_err(transport_error)?;
        Ok(())
    }

    async fn post_auth<T: Serialize + Sync>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<AuthOutcome, DomainError> {
        let url = self.endpoint(&[path])?;
        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;
        let status = response.status();
        if status.is_success() {
            return response.json().await.map_err(transport_error);
        }
        if status.is_client_error() {
            let message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.message)
                .unwrap_or_else(|| default_rejection(status));
            return Ok(AuthOutcome::rejected(message));
        }
        Err(DomainError::Infrastructure(format!(
            "backend returned {status} for {path}"
        )))
    }
}

fn default_rejection(status: StatusCode) -> String {
    match status {
        StatusCode::UNAUTHORIZED => "invalid credentials".to_owned(),
        StatusCode::NOT_FOUND => "no such account".to_owned(),
        StatusCode::CONFLICT => "account already exists".to_owned(),
        other => format!("request rejected ({other})"),
    }
}

#[allow(clippy::needless_pass_by_value)]
fn transport_error(err: reqwest::Error) -> DomainError {
    DomainError::Infrastructure(format!("backend request failed: {err}"))
}

#[async_trait]
impl RecordRepository for HttpBackend {
    #[instrument(skip_all, fields(user_id = %record.user_id, technique_id = %record.technique_id))]
    async fn save_completed_technique(
        &self,
        record: &CompletedTechniqueRecord,
    ) -> Result<(), DomainError> {
        self.post_record(
            &["users", record.user_id.as_str(), "completed-techniques"],
            record,
        )
        .await
    }

    #[instrument(skip_all, fields(user_id = %record.user_id, session_id = %record.session_id))]
    async fn save_customer_session(
        &self,
        record: &CustomerSessionRecord,
    ) -> Result<(), DomainError> {
        self.post_record(
            &["users", record.user_id.as_str(), "customer-sessions"],
            record,
        )
        .await
    }

    async fn list_candidates(&self) -> Result<Vec<CandidateHistory>, DomainError> {
        let url = self.endpoint(&["users"])?;
        self.http
            .get(url)
            .send()
            .await
            .map_err(transport_error)?
            .error_for_status()
            .map_err(transport_error)?
            .json()
            .await
            .map_err(transport_error)
    }
}

#[async_trait]
impl AuthService for HttpBackend {
    async fn login(&self, credentials: &Credentials) -> Result<AuthOutcome, DomainError> {
        self.post_auth("login", credentials).await
    }

    async fn register(
        &self,
        name: &str,
        credentials: &Credentials,
    ) -> Result<AuthOutcome, DomainError> {
        self.post_auth("register", &RegisterRequest { name, credentials })
            .await
    }

    async fn reset_password(&self, credentials: &Credentials) -> Result<AuthOutcome, DomainError> {
        self.post_auth("reset-password", credentials).await
    }
}
