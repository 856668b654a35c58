use std::sync::Arc;

use chrono::NaiveDate;

use super::filter::ManagerFilter;
use super::memory::MemoryPermissionStore;
use super::PermissionWorkflow;
use crate::error::WorkflowError;
use crate::model::approval::{NewApproval, Outcome};
use crate::model::permission_request::{PermissionForm, PermissionStatus};
use crate::model::role::Actor;

const WORKER: u64 = 7;
const OTHER_WORKER: u64 = 8;

fn date(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, month, day).expect("valid date")
}

fn form(day: u32) -> PermissionForm {
    PermissionForm {
        requested_date: Some(date(3, day)),
        cause_id: Some(1),
        permission_type_id: Some(2),
        workplace_id: Some(1),
    }
}

fn setup_with(store: MemoryPermissionStore) -> (Arc<MemoryPermissionStore>, PermissionWorkflow) {
    store.add_worker(WORKER, "12345678", "5");
    store.add_worker(OTHER_WORKER, "12345670", "k");
    let store = Arc::new(store);
    let workflow = PermissionWorkflow::with_clock(store.clone(), Arc::new(|| date(3, 1)));
    (store, workflow)
}

fn setup() -> (Arc<MemoryPermissionStore>, PermissionWorkflow) {
    setup_with(MemoryPermissionStore::new())
}

fn worker() -> Actor {
    Actor::worker(WORKER)
}

fn manager(id: u64) -> Actor {
    Actor::manager(id)
}

#[actix_web::test]
async fn submitted_request_is_pending_without_approvals() {
    let (store, workflow) = setup();

    let request = workflow.submit(&worker(), &form(10)).await.expect("submit");

    assert_eq!(request.worker_id, WORKER);
    assert_eq!(request.submitted_date, date(3, 1));
    assert!(store.approvals().is_empty());

    let listed = workflow.list_for_worker(&worker()).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].status, PermissionStatus::Pending);
    assert_eq!(listed[0].decided_date, None);
}

#[actix_web::test]
async fn submit_reports_missing_field_and_writes_nothing() {
    let (_store, workflow) = setup();
    let mut incomplete = form(10);
    incomplete.workplace_id = None;

    match workflow.submit(&worker(), &incomplete).await {
        Err(WorkflowError::Validation { field: "workplace_id", .. }) => {}
        other => panic!("expected validation error, got {other:?}"),
    }
    assert!(workflow.list_for_worker(&worker()).await.unwrap().is_empty());
}

#[actix_web::test]
async fn managers_cannot_submit_and_workers_cannot_decide() {
    let (_store, workflow) = setup();

    assert!(matches!(
        workflow.submit(&manager(1), &form(10)).await,
        Err(WorkflowError::Authorization { .. })
    ));

    let request = workflow.submit(&worker(), &form(10)).await.unwrap();
    assert!(matches!(
        workflow.decide(&worker(), request.id, Outcome::Approved).await,
        Err(WorkflowError::Authorization { .. })
    ));
    assert!(matches!(
        workflow.list_for_manager(&worker(), &ManagerFilter::default()).await,
        Err(WorkflowError::Authorization { .. })
    ));
}

#[actix_web::test]
async fn second_decision_is_refused_and_status_stays() {
    let (_store, workflow) = setup();
    let request = workflow.submit(&worker(), &form(10)).await.unwrap();

    let approval = workflow
        .decide(&manager(1), request.id, Outcome::Rejected)
        .await
        .expect("first decision");
    assert_eq!(approval.outcome, Outcome::Rejected);
    assert_eq!(approval.decided_date, date(3, 1));

    match workflow.decide(&manager(2), request.id, Outcome::Approved).await {
        Err(WorkflowError::AlreadyDecided { id }) => assert_eq!(id, request.id),
        other => panic!("expected AlreadyDecided, got {other:?}"),
    }

    let listed = workflow.list_for_worker(&worker()).await.unwrap();
    assert_eq!(listed[0].status, PermissionStatus::Rejected);
    assert_eq!(listed[0].decided_date, Some(date(3, 1)));
}

#[actix_web::test]
async fn decide_on_missing_request_is_not_found() {
    let (_store, workflow) = setup();
    assert!(matches!(
        workflow.decide(&manager(1), 404, Outcome::Approved).await,
        Err(WorkflowError::NotFound { id: 404, .. })
    ));
}

#[actix_web::test]
async fn decision_racing_past_the_pre_read_is_refused_by_the_store() {
    let (store, workflow) = setup();
    let request = workflow.submit(&worker(), &form(10)).await.unwrap();
    store.race_next_decision(NewApproval {
        permission_request_id: request.id,
        manager_id: 2,
        outcome: Outcome::Approved,
        decided_date: date(3, 1),
    });

    assert!(matches!(
        workflow.decide(&manager(1), request.id, Outcome::Rejected).await,
        Err(WorkflowError::AlreadyDecided { .. })
    ));

    let approvals = store.approvals();
    assert_eq!(approvals.len(), 1);
    assert_eq!(approvals[0].manager_id, 2);
}

#[actix_web::test]
async fn without_a_unique_guard_the_losing_decision_is_withdrawn() {
    let (store, workflow) = setup_with(MemoryPermissionStore::without_unique_decisions());
    let request = workflow.submit(&worker(), &form(10)).await.unwrap();
    store.race_next_decision(NewApproval {
        permission_request_id: request.id,
        manager_id: 2,
        outcome: Outcome::Approved,
        decided_date: date(3, 1),
    });

    assert!(matches!(
        workflow.decide(&manager(1), request.id, Outcome::Rejected).await,
        Err(WorkflowError::AlreadyDecided { .. })
    ));

    let approvals = store.approvals();
    assert_eq!(approvals.len(), 1);
    assert_eq!(approvals[0].outcome, Outcome::Approved);
}

#[actix_web::test]
async fn without_a_unique_guard_the_later_dated_decision_is_kept() {
    let (store, workflow) = setup_with(MemoryPermissionStore::without_unique_decisions());
    let request = workflow.submit(&worker(), &form(10)).await.unwrap();
    // stored first, but dated the day before
    store.race_next_decision(NewApproval {
        permission_request_id: request.id,
        manager_id: 2,
        outcome: Outcome::Approved,
        decided_date: date(2, 28),
    });

    let approval = workflow
        .decide(&manager(1), request.id, Outcome::Rejected)
        .await
        .expect("effective decision is kept");

    let listed = workflow
        .list_for_manager(&manager(1), &ManagerFilter::default())
        .await
        .unwrap();
    assert_eq!(listed[0].status, PermissionStatus::Rejected);
    assert_eq!(listed[0].decided_date, Some(approval.decided_date));
}

#[actix_web::test]
async fn historical_duplicate_decisions_are_flagged() {
    let (store, workflow) = setup();
    let request = workflow.submit(&worker(), &form(10)).await.unwrap();
    for (manager_id, outcome) in [(1, Outcome::Approved), (2, Outcome::Rejected)] {
        store.seed_approval(NewApproval {
            permission_request_id: request.id,
            manager_id,
            outcome,
            decided_date: date(3, 4),
        });
    }

    let listed = workflow
        .list_for_manager(&manager(1), &ManagerFilter::default())
        .await
        .unwrap();

    assert_eq!(listed[0].status, PermissionStatus::Approved);
    assert!(listed[0].conflicting_decisions);
}

#[actix_web::test]
async fn edit_updates_pending_request_of_owner() {
    let (_store, workflow) = setup();
    let request = workflow.submit(&worker(), &form(10)).await.unwrap();

    let mut changed = form(12);
    changed.cause_id = Some(3);
    let edited = workflow.edit(&worker(), request.id, &changed).await.unwrap();

    assert_eq!(edited.requested_date, date(3, 12));
    assert_eq!(edited.cause_id, 3);
    assert_eq!(edited.submitted_date, request.submitted_date);

    let listed = workflow.list_for_worker(&worker()).await.unwrap();
    assert_eq!(listed[0].request, edited);
}

#[actix_web::test]
async fn edit_after_decision_is_invalid_state_for_any_field() {
    let (_store, workflow) = setup();
    let request = workflow.submit(&worker(), &form(10)).await.unwrap();
    workflow
        .decide(&manager(1), request.id, Outcome::Approved)
        .await
        .unwrap();

    let mut only_workplace = form(10);
    only_workplace.workplace_id = Some(2);

    for changed in [form(11), only_workplace, PermissionForm::default()] {
        assert!(matches!(
            workflow.edit(&worker(), request.id, &changed).await,
            Err(WorkflowError::InvalidState { .. })
        ));
    }
}

#[actix_web::test]
async fn edit_and_delete_require_ownership() {
    let (_store, workflow) = setup();
    let request = workflow.submit(&worker(), &form(10)).await.unwrap();
    let intruder = Actor::worker(OTHER_WORKER);

    assert!(matches!(
        workflow.edit(&intruder, request.id, &form(11)).await,
        Err(WorkflowError::Authorization { .. })
    ));
    assert!(matches!(
        workflow.delete(&intruder, request.id).await,
        Err(WorkflowError::Authorization { .. })
    ));
    assert_eq!(workflow.list_for_worker(&worker()).await.unwrap().len(), 1);
}

#[actix_web::test]
async fn delete_is_idempotent_and_removes_the_decision() {
    let (store, workflow) = setup();
    let request = workflow.submit(&worker(), &form(10)).await.unwrap();
    workflow
        .decide(&manager(1), request.id, Outcome::Approved)
        .await
        .unwrap();

    workflow.delete(&worker(), request.id).await.expect("first delete");
    workflow.delete(&worker(), request.id).await.expect("second delete");

    assert!(store.approvals().is_empty());
    assert!(workflow.list_for_worker(&worker()).await.unwrap().is_empty());
}

#[actix_web::test]
async fn worker_list_is_latest_requested_date_first() {
    let (_store, workflow) = setup();
    for day in [5, 20, 12] {
        workflow.submit(&worker(), &form(day)).await.unwrap();
    }
    workflow
        .submit(&Actor::worker(OTHER_WORKER), &form(25))
        .await
        .unwrap();

    let days: Vec<NaiveDate> = workflow
        .list_for_worker(&worker())
        .await
        .unwrap()
        .iter()
        .map(|v| v.request.requested_date)
        .collect();

    assert_eq!(days, vec![date(3, 20), date(3, 12), date(3, 5)]);
}

#[actix_web::test]
async fn manager_filters_by_status_identifier_and_dates() {
    let (_store, workflow) = setup();
    let pending = workflow.submit(&worker(), &form(10)).await.unwrap();
    let approved = workflow.submit(&worker(), &form(11)).await.unwrap();
    let rejected = workflow
        .submit(&Actor::worker(OTHER_WORKER), &form(12))
        .await
        .unwrap();
    workflow
        .decide(&manager(1), approved.id, Outcome::Approved)
        .await
        .unwrap();
    workflow
        .decide(&manager(1), rejected.id, Outcome::Rejected)
        .await
        .unwrap();

    let only_approved = ManagerFilter {
        status: Some(PermissionStatus::Approved),
        ..Default::default()
    };
    let listed = workflow.list_for_manager(&manager(1), &only_approved).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].request.id, approved.id);

    let by_rut = ManagerFilter {
        identifier: Some("670-k".to_string()),
        ..Default::default()
    };
    let listed = workflow.list_for_manager(&manager(1), &by_rut).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].request.id, rejected.id);

    let first_day = ManagerFilter {
        to: Some(date(3, 10)),
        ..Default::default()
    };
    let listed = workflow.list_for_manager(&manager(1), &first_day).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].request.id, pending.id);

    let all = workflow
        .list_for_manager(&manager(1), &ManagerFilter::default())
        .await
        .unwrap();
    let ids: Vec<u64> = all.iter().map(|v| v.request.id).collect();
    assert_eq!(ids, vec![pending.id, approved.id, rejected.id]);
}

#[actix_web::test]
async fn report_counts_each_status() {
    let (_store, workflow) = setup();
    let first = workflow.submit(&worker(), &form(10)).await.unwrap();
    let second = workflow.submit(&worker(), &form(11)).await.unwrap();
    workflow.submit(&worker(), &form(12)).await.unwrap();
    workflow
        .decide(&manager(1), first.id, Outcome::Approved)
        .await
        .unwrap();
    workflow
        .decide(&manager(1), second.id, Outcome::Rejected)
        .await
        .unwrap();

    let report = workflow
        .report(&manager(1), &ManagerFilter::default())
        .await
        .unwrap();

    assert_eq!(report.total, 3);
    assert_eq!((report.pending, report.approved, report.rejected), (1, 1, 1));
}

#[actix_web::test]
async fn report_rows_name_their_cause_type_and_workplace() {
    let (_store, workflow) = setup();
    workflow.submit(&worker(), &form(10)).await.unwrap();

    let report = workflow
        .report(&manager(1), &ManagerFilter::default())
        .await
        .unwrap();

    let labels = &report.data[0].labels;
    assert_eq!(labels.cause, "Cause 1");
    assert_eq!(labels.permission_type, "Type 2");
    assert_eq!(labels.workplace, "Workplace 1");
}

#[actix_web::test]
async fn end_to_end_rejection_then_refused_approval() {
    let (_store, workflow) = setup();
    let request = workflow
        .submit(
            &worker(),
            &PermissionForm {
                requested_date: Some(date(3, 10)),
                cause_id: Some(1),
                permission_type_id: Some(2),
                workplace_id: Some(1),
            },
        )
        .await
        .unwrap();

    let status = |views: Vec<crate::model::permission_request::PermissionView>| views[0].status;
    let all = ManagerFilter::default();

    assert_eq!(
        status(workflow.list_for_manager(&manager(1), &all).await.unwrap()),
        PermissionStatus::Pending
    );

    workflow
        .decide(&manager(1), request.id, Outcome::Rejected)
        .await
        .expect("manager A rejects");
    assert_eq!(
        status(workflow.list_for_manager(&manager(1), &all).await.unwrap()),
        PermissionStatus::Rejected
    );

    assert!(matches!(
        workflow.decide(&manager(2), request.id, Outcome::Approved).await,
        Err(WorkflowError::AlreadyDecided { .. })
    ));
    assert_eq!(
        status(workflow.list_for_manager(&manager(2), &all).await.unwrap()),
        PermissionStatus::Rejected
    );
}
