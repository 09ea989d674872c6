use httpmock::prelude::*;
use serde_json::json;

use rota_casework::{CaseApi, CaseApiError, CaseState, CaseworkClient, CaseworkClientConfig};

fn client_for(server: &MockServer) -> CaseworkClient {
    CaseworkClient::new(CaseworkClientConfig {
        api_base: server.base_url(),
        auth_token: "test-case-token".to_string(),
        request_timeout_ms: 5_000,
    })
    .expect("casework client should be created")
}

#[tokio::test]
async fn start_transaction_returns_token_and_snapshot() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/cases/case-31/transactions")
            .header("authorization", "Bearer test-case-token");
        then.status(200).json_body(json!({
            "token": "tok-9",
            "snapshot": {
                "case_id": "case-31",
                "state": "ready_to_list",
                "hearings": [],
                "adjournment_in_progress": false
            }
        }));
    });

    let transaction = client_for(&server)
        .start_transaction("case-31")
        .await
        .expect("transaction should open");

    mock.assert();
    assert_eq!(transaction.token, "tok-9");
    assert_eq!(transaction.snapshot.state, CaseState::ReadyToList);
}

#[tokio::test]
async fn start_transaction_rejects_an_empty_token() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/cases/case-31/transactions");
        then.status(200).json_body(json!({
            "token": " ",
            "snapshot": {
                "case_id": "case-31",
                "state": "ready_to_list"
            }
        }));
    });

    let error = client_for(&server)
        .start_transaction("case-31")
        .await
        .expect_err("blank token must be rejected");

    assert!(matches!(error, CaseApiError::InvalidResponse(_)));
}

#[tokio::test]
async fn commit_sends_token_snapshot_and_narrative() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path("/cases/case-31/commit").json_body_includes(
            json!({
                "token": "tok-9",
                "summary": "Hearing booked",
                "description": "A fixed listing was confirmed",
                "case": {"case_id": "case-31", "state": "hearing"}
            })
            .to_string(),
        );
        then.status(200).json_body(json!({
            "case_id": "case-31",
            "state": "hearing",
            "hearings": [],
            "adjournment_in_progress": false
        }));
    });

    let snapshot = rota_casework::CaseSnapshot {
        case_id: "case-31".to_string(),
        state: CaseState::Hearing,
        hearings: Vec::new(),
        adjournment_in_progress: false,
    };
    let updated = client_for(&server)
        .commit(
            "tok-9",
            &snapshot,
            "Hearing booked",
            "A fixed listing was confirmed",
        )
        .await
        .expect("commit should land");

    mock.assert();
    assert_eq!(updated.state, CaseState::Hearing);
}

#[tokio::test]
async fn stale_token_commit_surfaces_as_version_conflict() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/cases/case-31/commit");
        then.status(409).body("case version changed");
    });

    let snapshot = rota_casework::CaseSnapshot {
        case_id: "case-31".to_string(),
        state: CaseState::Hearing,
        hearings: Vec::new(),
        adjournment_in_progress: false,
    };
    let error = client_for(&server)
        .commit("tok-stale", &snapshot, "summary", "description")
        .await
        .expect_err("409 must surface distinctly");

    assert!(matches!(
        error,
        CaseApiError::VersionConflict { ref case_id } if case_id == "case-31"
    ));
    assert!(!error.is_transient());
}
