use std::time::Duration;

use claims::{assert_err, assert_ok};
use lead_form::submission::{Ack, SubmissionError};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use crate::helpers::{sample_lead, submission_client, WEBHOOK_PATH};

struct LeadBodyMatcher;

impl wiremock::Match for LeadBodyMatcher {
    fn matches(&self, request: &Request) -> bool {
        let result: Result<serde_json::Value, _> = serde_json::from_slice(&request.body);
        if let Ok(body) = result {
            body.get("name").is_some() && body.get("email").is_some() && body.get("leadType").is_some()
        } else {
            false
        }
    }
}

#[tokio::test]
async fn submit_posts_a_json_lead_to_the_endpoint() {
    let mock_server = MockServer::start().await;
    let client = submission_client(&mock_server.uri());

    Mock::given(method("POST"))
        .and(path(WEBHOOK_PATH))
        .and(header("Content-Type", "application/json"))
        .and(LeadBodyMatcher)
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let outcome = client.submit(&sample_lead()).await;

    assert_ok!(outcome);
}

#[tokio::test]
async fn submit_returns_the_response_body_when_present() {
    let mock_server = MockServer::start().await;
    let client = submission_client(&mock_server.uri());

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"workflow":"lead-form"}"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    let ack = client.submit(&sample_lead()).await.unwrap();

    assert_eq!(
        ack,
        Ack {
            body: Some(r#"{"workflow":"lead-form"}"#.to_string())
        }
    );
}

#[tokio::test]
async fn submit_retries_a_transient_server_error() {
    let mock_server = MockServer::start().await;
    let client = submission_client(&mock_server.uri());

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let outcome = client.submit(&sample_lead()).await;

    assert_ok!(outcome);
}

#[tokio::test]
async fn submit_fails_fast_on_a_client_error() {
    let mock_server = MockServer::start().await;
    let client = submission_client(&mock_server.uri());

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400))
        .expect(1)
        .mount(&mock_server)
        .await;

    let outcome = client.submit(&sample_lead()).await;

    assert_eq!(outcome, Err(SubmissionError::Rejected(400)));
}

#[tokio::test]
async fn submit_surfaces_timeout_after_exhausting_retries() {
    let mock_server = MockServer::start().await;
    let client = submission_client(&mock_server.uri());

    // Slower than the 200ms client timeout; one initial attempt plus two
    // retries should hit the server three times.
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .expect(3)
        .mount(&mock_server)
        .await;

    let outcome = client.submit(&sample_lead()).await;

    assert_eq!(outcome, Err(SubmissionError::Timeout));
}

#[tokio::test]
async fn a_second_submit_while_one_is_in_flight_is_rejected() {
    let mock_server = MockServer::start().await;
    let client = submission_client(&mock_server.uri());

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(100)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let lead = sample_lead();
    let (first, second) = tokio::join!(client.submit(&lead), client.submit(&lead));

    assert_ok!(first);
    assert_eq!(second, Err(SubmissionError::AlreadyInFlight));
}

#[tokio::test]
async fn the_in_flight_flag_is_released_after_completion() {
    let mock_server = MockServer::start().await;
    let client = submission_client(&mock_server.uri());

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&mock_server)
        .await;

    let lead = sample_lead();
    assert_ok!(client.submit(&lead).await);
    assert_ok!(client.submit(&lead).await);
}

#[tokio::test]
async fn the_in_flight_flag_is_released_after_a_failure() {
    let mock_server = MockServer::start().await;
    let client = submission_client(&mock_server.uri());

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(404))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let lead = sample_lead();
    assert_err!(client.submit(&lead).await);
    assert_ok!(client.submit(&lead).await);
}
