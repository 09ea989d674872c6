//! Controller tests: the duplicate-create guard, payload validation, and the
//! fire-and-forget cancellation path.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;

use rota_casework::{
    CaseApi, CaseApiError, CaseMutator, CaseSnapshot, CaseState, CaseTransaction,
};
use rota_listings::{
    CancellationReason, HearingChangeResponse, HearingRecord, HearingRequestPayload,
    HearingStatus, ListingStatus, ListingsApiError, SchedulingApi,
};

use crate::{
    derive_lifecycle_state, validate_hearing_request_payload, HearingLifecycleController,
    HearingLifecycleState, LifecycleError,
};

fn payload(duration_minutes: u32) -> HearingRequestPayload {
    HearingRequestPayload {
        case_id: "case-1".to_string(),
        duration_minutes,
        venue_id: "venue-1".to_string(),
        earliest_start: NaiveDate::from_ymd_opt(2026, 4, 1).expect("valid date"),
        auto_list: false,
        notes: String::new(),
    }
}

fn hearing(hearing_id: &str, status: HearingStatus) -> HearingRecord {
    HearingRecord {
        hearing_id: hearing_id.to_string(),
        case_id: "case-1".to_string(),
        status,
        listing_status: None,
        cancellation_reason: None,
        sessions: Vec::new(),
        version: 2,
    }
}

struct StubSchedulingApi {
    listed: Vec<HearingRecord>,
    creates: AtomicUsize,
    updates: AtomicUsize,
    cancels: AtomicUsize,
}

impl StubSchedulingApi {
    fn with_hearings(listed: Vec<HearingRecord>) -> Self {
        Self {
            listed,
            creates: AtomicUsize::new(0),
            updates: AtomicUsize::new(0),
            cancels: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl SchedulingApi for StubSchedulingApi {
    async fn get_hearing(&self, hearing_id: &str) -> Result<HearingRecord, ListingsApiError> {
        Err(ListingsApiError::NotFound {
            hearing_id: hearing_id.to_string(),
        })
    }

    async fn list_hearings(&self, _case_id: &str) -> Result<Vec<HearingRecord>, ListingsApiError> {
        Ok(self.listed.clone())
    }

    async fn create_hearing(
        &self,
        payload: &HearingRequestPayload,
    ) -> Result<HearingChangeResponse, ListingsApiError> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        assert_eq!(payload.case_id, "case-1");
        Ok(HearingChangeResponse {
            hearing_id: "hrg-new".to_string(),
            version: 1,
            status: HearingStatus::HearingRequested,
        })
    }

    async fn update_hearing(
        &self,
        hearing_id: &str,
        _payload: &HearingRequestPayload,
    ) -> Result<HearingChangeResponse, ListingsApiError> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        Ok(HearingChangeResponse {
            hearing_id: hearing_id.to_string(),
            version: 3,
            status: HearingStatus::UpdateSubmitted,
        })
    }

    async fn cancel_hearing(
        &self,
        hearing_id: &str,
        _reason: &CancellationReason,
    ) -> Result<HearingChangeResponse, ListingsApiError> {
        self.cancels.fetch_add(1, Ordering::SeqCst);
        Ok(HearingChangeResponse {
            hearing_id: hearing_id.to_string(),
            version: 4,
            status: HearingStatus::Cancelled,
        })
    }
}

/// Accepts every commit and keeps the latest snapshot for assertions.
struct AcceptingCaseApi {
    case: Mutex<CaseSnapshot>,
    commits: AtomicUsize,
}

impl AcceptingCaseApi {
    fn new() -> Self {
        Self {
            case: Mutex::new(CaseSnapshot {
                case_id: "case-1".to_string(),
                state: CaseState::ReadyToList,
                hearings: Vec::new(),
                adjournment_in_progress: true,
            }),
            commits: AtomicUsize::new(0),
        }
    }

    fn current(&self) -> CaseSnapshot {
        self.case.lock().expect("case lock").clone()
    }
}

#[async_trait]
impl CaseApi for AcceptingCaseApi {
    async fn start_transaction(&self, _case_id: &str) -> Result<CaseTransaction, CaseApiError> {
        Ok(CaseTransaction {
            token: "tok-1".to_string(),
            snapshot: self.current(),
        })
    }

    async fn commit(
        &self,
        _token: &str,
        snapshot: &CaseSnapshot,
        _summary: &str,
        _description: &str,
    ) -> Result<CaseSnapshot, CaseApiError> {
        self.commits.fetch_add(1, Ordering::SeqCst);
        *self.case.lock().expect("case lock") = snapshot.clone();
        Ok(snapshot.clone())
    }
}

fn controller_for(
    scheduling: Arc<StubSchedulingApi>,
    case_api: Arc<AcceptingCaseApi>,
) -> HearingLifecycleController {
    HearingLifecycleController::new(scheduling, CaseMutator::new(case_api))
}

#[tokio::test]
async fn create_issues_exactly_one_request_when_nothing_is_in_flight() {
    let scheduling = Arc::new(StubSchedulingApi::with_hearings(Vec::new()));
    let case_api = Arc::new(AcceptingCaseApi::new());
    let controller = controller_for(scheduling.clone(), case_api.clone());

    let report = controller
        .request_hearing("case-1", &payload(60))
        .await
        .expect("create should succeed");

    assert_eq!(scheduling.creates.load(Ordering::SeqCst), 1);
    assert!(!report.reused_in_flight);
    assert_eq!(report.hearing_id, "hrg-new");

    let case = case_api.current();
    let details = case.hearing("hrg-new").expect("hearing recorded");
    assert_eq!(details.version, 1);
    assert!(!case.adjournment_in_progress);
}

#[tokio::test]
async fn create_is_suppressed_while_a_hearing_is_in_flight() {
    let scheduling = Arc::new(StubSchedulingApi::with_hearings(vec![hearing(
        "hrg-live",
        HearingStatus::AwaitingListing,
    )]));
    let case_api = Arc::new(AcceptingCaseApi::new());
    let controller = controller_for(scheduling.clone(), case_api.clone());

    let report = controller
        .request_hearing("case-1", &payload(60))
        .await
        .expect("reuse should succeed");

    assert_eq!(scheduling.creates.load(Ordering::SeqCst), 0);
    assert!(report.reused_in_flight);
    assert_eq!(report.hearing_id, "hrg-live");
    assert_eq!(report.version, 2);

    let case = case_api.current();
    assert!(case.hearing("hrg-live").is_some());
}

#[tokio::test]
async fn cancelled_hearings_do_not_suppress_a_fresh_create() {
    let scheduling = Arc::new(StubSchedulingApi::with_hearings(vec![hearing(
        "hrg-old",
        HearingStatus::Cancelled,
    )]));
    let case_api = Arc::new(AcceptingCaseApi::new());
    let controller = controller_for(scheduling.clone(), case_api.clone());

    let report = controller
        .request_hearing("case-1", &payload(60))
        .await
        .expect("create should succeed");

    assert_eq!(scheduling.creates.load(Ordering::SeqCst), 1);
    assert!(!report.reused_in_flight);
}

#[tokio::test]
async fn amend_submits_the_full_payload_and_records_the_new_version() {
    let scheduling = Arc::new(StubSchedulingApi::with_hearings(Vec::new()));
    let case_api = Arc::new(AcceptingCaseApi::new());
    let controller = controller_for(scheduling.clone(), case_api.clone());

    let report = controller
        .amend_hearing("case-1", "hrg-live", &payload(90))
        .await
        .expect("amend should succeed");

    assert_eq!(scheduling.updates.load(Ordering::SeqCst), 1);
    assert_eq!(report.version, 3);

    let case = case_api.current();
    let details = case.hearing("hrg-live").expect("hearing recorded");
    assert_eq!(details.version, 3);
    assert!(!case.adjournment_in_progress);
}

#[tokio::test]
async fn off_grid_duration_is_fatal_before_any_downstream_call() {
    let scheduling = Arc::new(StubSchedulingApi::with_hearings(Vec::new()));
    let case_api = Arc::new(AcceptingCaseApi::new());
    let controller = controller_for(scheduling.clone(), case_api.clone());

    let error = controller
        .amend_hearing("case-1", "hrg-live", &payload(47))
        .await
        .expect_err("off-grid duration must fail");

    assert!(matches!(error, LifecycleError::Listing(_)));
    assert_eq!(scheduling.updates.load(Ordering::SeqCst), 0);
    assert_eq!(case_api.commits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn cancel_is_fire_and_forget_for_the_case_record() {
    let scheduling = Arc::new(StubSchedulingApi::with_hearings(Vec::new()));
    let case_api = Arc::new(AcceptingCaseApi::new());
    let controller = controller_for(scheduling.clone(), case_api.clone());

    let report = controller
        .cancel_hearing("case-1", "hrg-live", &CancellationReason::Withdrawn)
        .await
        .expect("cancel should succeed");

    assert_eq!(scheduling.cancels.load(Ordering::SeqCst), 1);
    assert_eq!(report.version, 4);
    assert_eq!(case_api.commits.load(Ordering::SeqCst), 0);
}

#[test]
fn payload_validation_enforces_the_duration_grid() {
    assert!(validate_hearing_request_payload(&payload(60)).is_ok());
    assert!(validate_hearing_request_payload(&payload(5)).is_ok());
    assert!(validate_hearing_request_payload(&payload(0)).is_err());
    assert!(validate_hearing_request_payload(&payload(47)).is_err());

    let mut missing_venue = payload(60);
    missing_venue.venue_id = " ".to_string();
    assert!(validate_hearing_request_payload(&missing_venue).is_err());
}

#[test]
fn lifecycle_state_derivation_prefers_booked_over_in_flight() {
    assert_eq!(derive_lifecycle_state(&[]), HearingLifecycleState::NoHearing);

    let mut fixed = hearing("hrg-1", HearingStatus::Listed);
    fixed.listing_status = Some(ListingStatus::Fixed);
    assert_eq!(
        derive_lifecycle_state(&[hearing("hrg-0", HearingStatus::Cancelled), fixed]),
        HearingLifecycleState::Booked
    );

    assert_eq!(
        derive_lifecycle_state(&[hearing("hrg-1", HearingStatus::AwaitingListing)]),
        HearingLifecycleState::InFlight
    );

    assert_eq!(
        derive_lifecycle_state(&[hearing("hrg-1", HearingStatus::Cancelled)]),
        HearingLifecycleState::Cancelled
    );
}
