use chrono::NaiveDate;
use httpmock::prelude::*;
use serde_json::json;

use rota_listings::{
    CancellationReason, HearingRequestPayload, HearingStatus, ListingStatus, ListingsApiError,
    ListingsClient, ListingsClientConfig, SchedulingApi,
};

fn client_for(server: &MockServer) -> ListingsClient {
    ListingsClient::new(ListingsClientConfig {
        api_base: server.base_url(),
        auth_token: "test-listings-token".to_string(),
        request_timeout_ms: 5_000,
    })
    .expect("listings client should be created")
}

#[tokio::test]
async fn get_hearing_decodes_full_record() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/hearings/hrg-204")
            .header("authorization", "Bearer test-listings-token");
        then.status(200).json_body(json!({
            "hearing_id": "hrg-204",
            "case_id": "case-31",
            "status": "LISTED",
            "listing_status": "FIXED",
            "sessions": [
                {"venue_id": "venue-7", "start": "2026-04-01T09:00:00Z", "end": "2026-04-01T11:00:00Z"}
            ],
            "version": 12
        }));
    });

    let record = client_for(&server)
        .get_hearing("hrg-204")
        .await
        .expect("fetch should succeed");

    mock.assert();
    assert_eq!(record.status, HearingStatus::Listed);
    assert_eq!(record.listing_status, Some(ListingStatus::Fixed));
    assert_eq!(record.session_venue_id(), Some("venue-7"));
    assert_eq!(record.version, 12);
}

#[tokio::test]
async fn get_hearing_maps_404_to_not_found() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/hearings/hrg-missing");
        then.status(404).body("no such hearing");
    });

    let error = client_for(&server)
        .get_hearing("hrg-missing")
        .await
        .expect_err("missing hearing should error");

    assert!(matches!(
        error,
        ListingsApiError::NotFound { ref hearing_id } if hearing_id == "hrg-missing"
    ));
    assert!(!error.is_transient());
}

#[tokio::test]
async fn list_hearings_decodes_empty_collection() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/cases/case-9/hearings");
        then.status(200).json_body(json!([]));
    });

    let hearings = client_for(&server)
        .list_hearings("case-9")
        .await
        .expect("list should succeed");

    mock.assert();
    assert!(hearings.is_empty());
}

#[tokio::test]
async fn create_hearing_posts_payload_and_decodes_response() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path("/hearings").json_body_includes(
            json!({
                "case_id": "case-9",
                "duration_minutes": 60,
                "venue_id": "venue-7"
            })
            .to_string(),
        );
        then.status(200).json_body(json!({
            "hearing_id": "hrg-900",
            "version": 1,
            "status": "HEARING_REQUESTED"
        }));
    });

    let payload = HearingRequestPayload {
        case_id: "case-9".to_string(),
        duration_minutes: 60,
        venue_id: "venue-7".to_string(),
        earliest_start: NaiveDate::from_ymd_opt(2026, 4, 1).expect("valid date"),
        auto_list: true,
        notes: String::new(),
    };

    let response = client_for(&server)
        .create_hearing(&payload)
        .await
        .expect("create should succeed");

    mock.assert();
    assert_eq!(response.hearing_id, "hrg-900");
    assert_eq!(response.status, HearingStatus::HearingRequested);
}

#[tokio::test]
async fn cancel_hearing_sends_reason_code() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(DELETE)
            .path("/hearings/hrg-204")
            .json_body(json!({"cancellation_reason": "WITHDRAWN"}));
        then.status(200).json_body(json!({
            "hearing_id": "hrg-204",
            "version": 13,
            "status": "CANCELLED"
        }));
    });

    let response = client_for(&server)
        .cancel_hearing("hrg-204", &CancellationReason::Withdrawn)
        .await
        .expect("cancel should succeed");

    mock.assert();
    assert_eq!(response.status, HearingStatus::Cancelled);
    assert_eq!(response.version, 13);
}

#[tokio::test]
async fn server_errors_are_classified_transient() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/cases/case-9/hearings");
        then.status(503).body("listing backend unavailable");
    });

    let error = client_for(&server)
        .list_hearings("case-9")
        .await
        .expect_err("503 should surface as error");

    assert!(matches!(
        error,
        ListingsApiError::HttpStatus { status: 503, .. }
    ));
    assert!(error.is_transient());
}
