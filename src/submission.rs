use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use rand::Rng;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use uuid::Uuid;

use crate::domain::NewLead;

/// Acknowledgement returned by the webhook on a 2xx response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ack {
    pub body: Option<String>,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("the submission request timed out")]
    Timeout,
    #[error("the endpoint rejected the submission with status {0}")]
    Rejected(u16),
    #[error("a submission is already in flight")]
    AlreadyInFlight,
    #[error("failed to reach the endpoint: {0}")]
    NetworkFailure(String),
}

impl SubmissionError {
    /// Transient failures are retried before being surfaced; everything
    /// else fails the submission immediately.
    pub fn is_transient(&self) -> bool {
        match self {
            SubmissionError::Timeout | SubmissionError::NetworkFailure(_) => true,
            SubmissionError::Rejected(status) => (500..=599).contains(status),
            SubmissionError::AlreadyInFlight => false,
        }
    }
}

/// Exponential backoff schedule for transient failures.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_millis(300),
            max_jitter: Duration::from_millis(50),
        }
    }
}

impl RetryPolicy {
    fn delay_for(&self, attempt: u32) -> Duration {
        let backoff = self.base_delay * 2u32.saturating_pow(attempt);
        let jitter_ms = self.max_jitter.as_millis() as u64;
        let jitter = if jitter_ms == 0 {
            Duration::ZERO
        } else {
            Duration::from_millis(rand::thread_rng().gen_range(0..=jitter_ms))
        };
        backoff + jitter
    }
}

pub struct SubmissionClient {
    http_client: Client,
    endpoint: String,
    authorization_token: Option<Secret<String>>,
    retry_policy: RetryPolicy,
    in_flight: AtomicBool,
}

impl SubmissionClient {
    pub fn new(
        endpoint: String,
        authorization_token: Option<Secret<String>>,
        timeout: Duration,
        retry_policy: RetryPolicy,
    ) -> Self {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to build the HTTP client");
        Self {
            http_client,
            endpoint,
            authorization_token,
            retry_policy,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Post the lead to the configured endpoint.
    ///
    /// At most one submission per client is in flight at a time; overlapping
    /// calls fail with `AlreadyInFlight` without touching the network.
    /// Transient failures are retried with exponential backoff before the
    /// last error is surfaced.
    #[tracing::instrument(
        name = "Submitting a lead",
        skip(self, lead),
        fields(
            lead_email = %lead.email,
            submission_token = tracing::field::Empty
        )
    )]
    pub async fn submit(&self, lead: &NewLead) -> Result<Ack, SubmissionError> {
        let _guard = self.mark_in_flight()?;
        let token = Uuid::new_v4();
        tracing::Span::current().record("submission_token", &tracing::field::display(&token));

        let payload = LeadPayload {
            name: lead.name.as_ref(),
            email: lead.email.as_ref(),
            lead_type: lead.lead_type.as_ref(),
        };

        let mut attempt = 0;
        loop {
            match self.send_once(&payload).await {
                Ok(ack) => return Ok(ack),
                Err(e) if e.is_transient() && attempt < self.retry_policy.max_retries => {
                    let delay = self.retry_policy.delay_for(attempt);
                    attempt += 1;
                    tracing::warn!(
                        error = %e,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "Transient submission failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to submit the lead");
                    return Err(e);
                }
            }
        }
    }

    async fn send_once(&self, payload: &LeadPayload<'_>) -> Result<Ack, SubmissionError> {
        let mut request = self.http_client.post(&self.endpoint).json(payload);
        if let Some(token) = &self.authorization_token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request.send().await.map_err(classify_transport_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(SubmissionError::Rejected(status.as_u16()));
        }

        let body = response.text().await.map_err(classify_transport_error)?;
        Ok(Ack {
            body: (!body.is_empty()).then_some(body),
        })
    }

    fn mark_in_flight(&self) -> Result<InFlightGuard<'_>, SubmissionError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(SubmissionError::AlreadyInFlight);
        }
        Ok(InFlightGuard {
            flag: &self.in_flight,
        })
    }
}

// Releases the flag on drop, so a cancelled submit future does not leave
// the client stuck in flight.
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

fn classify_transport_error(e: reqwest::Error) -> SubmissionError {
    if e.is_timeout() {
        SubmissionError::Timeout
    } else {
        SubmissionError::NetworkFailure(e.to_string())
    }
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct LeadPayload<'a> {
    name: &'a str,
    email: &'a str,
    lead_type: &'a str,
}
