//! Integration tests for the request repositories against a real database.
//!
//! Exercises the aggregate root and its child tables:
//! - Submission defaults and the duplicate-ART unique index
//! - Concurrent message appends (both rows survive)
//! - Resubmission field rewrite and status reset
//! - Inspection ledger ordering and deletion
//! - Notification read-acknowledgement

use chrono::NaiveDate;
use reforma_db::models::inspection::CreateInspection;
use reforma_db::models::request::{CreateRequest, ResubmitRequest};
use reforma_db::repositories::{
    DeviceTokenRepo, InspectionRepo, MessageRepo, NotificationRepo, RequestRepo,
};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_request(art: &str) -> CreateRequest {
    CreateRequest {
        work_type: "full renovation".to_string(),
        service_categories: vec!["plumbing".to_string(), "electrical".to_string()],
        start_date: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(),
        provider_name: "Acme Renovations".to_string(),
        provider_registration: "CREA-12345".to_string(),
        art_number: art.to_string(),
        attachment_refs: vec!["1700000000000_floorplan.pdf".to_string()],
    }
}

fn resubmission(art: &str) -> ResubmitRequest {
    ResubmitRequest {
        work_type: "full renovation".to_string(),
        service_categories: vec!["plumbing".to_string()],
        start_date: NaiveDate::from_ymd_opt(2026, 9, 15).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2026, 11, 1).unwrap(),
        provider_name: "Beta Builders".to_string(),
        provider_registration: "CREA-99999".to_string(),
        art_number: art.to_string(),
        attachment_refs: vec![],
    }
}

async fn seed_request(pool: &PgPool, art: &str) -> i64 {
    RequestRepo::create(
        pool,
        "111.222.333-44",
        "Ana Souza",
        "101",
        "A",
        &new_request(art),
    )
    .await
    .unwrap()
    .id
}

// ---------------------------------------------------------------------------
// Test: submission defaults
// ---------------------------------------------------------------------------

#[sqlx::test]
async fn create_starts_under_review(pool: PgPool) {
    let request = RequestRepo::create(
        &pool,
        "111.222.333-44",
        "Ana Souza",
        "101",
        "A",
        &new_request("ART-1"),
    )
    .await
    .unwrap();

    assert_eq!(request.status, "under_review");
    assert_eq!(request.resident_tax_id, "111.222.333-44");
    assert_eq!(request.service_categories.len(), 2);
}

// ---------------------------------------------------------------------------
// Test: duplicate ART is rejected by the partial unique index
// ---------------------------------------------------------------------------

#[sqlx::test]
async fn duplicate_art_number_rejected(pool: PgPool) {
    seed_request(&pool, "ART-1").await;

    let result = RequestRepo::create(
        &pool,
        "999.888.777-66",
        "Rui Lima",
        "202",
        "B",
        &new_request("ART-1"),
    )
    .await;

    let err = result.expect_err("duplicate ART should fail");
    match err {
        sqlx::Error::Database(db_err) => {
            assert_eq!(db_err.code().as_deref(), Some("23505"));
            assert_eq!(db_err.constraint(), Some("uq_renovation_requests_art"));
        }
        other => panic!("Expected a database error, got: {other:?}"),
    }
}

#[sqlx::test]
async fn art_number_reusable_after_soft_delete(pool: PgPool) {
    let id = seed_request(&pool, "ART-1").await;

    sqlx::query("UPDATE renovation_requests SET is_deleted = TRUE WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await
        .unwrap();

    // The partial index only covers non-deleted rows.
    let recreated = RequestRepo::create(
        &pool,
        "111.222.333-44",
        "Ana Souza",
        "101",
        "A",
        &new_request("ART-1"),
    )
    .await
    .unwrap();
    assert_ne!(recreated.id, id);
}

// ---------------------------------------------------------------------------
// Test: concurrent message appends both survive
// ---------------------------------------------------------------------------

#[sqlx::test]
async fn concurrent_message_appends_both_survive(pool: PgPool) {
    let id = seed_request(&pool, "ART-1").await;

    let (first, second) = tokio::join!(
        MessageRepo::append(&pool, id, "resident message", "Ana Souza", false),
        MessageRepo::append(&pool, id, "staff message", "Rui Lima", true),
    );
    first.unwrap();
    second.unwrap();

    let messages = MessageRepo::list_for_request(&pool, id).await.unwrap();
    assert_eq!(messages.len(), 2);
}

#[sqlx::test]
async fn messages_list_oldest_first(pool: PgPool) {
    let id = seed_request(&pool, "ART-1").await;

    MessageRepo::append(&pool, id, "first", "Ana Souza", false)
        .await
        .unwrap();
    MessageRepo::append(&pool, id, "second", "Rui Lima", true)
        .await
        .unwrap();

    let messages = MessageRepo::list_for_request(&pool, id).await.unwrap();
    assert_eq!(messages[0].body, "first");
    assert_eq!(messages[1].body, "second");
    assert!(messages[1].author_is_staff);
}

// ---------------------------------------------------------------------------
// Test: resubmission rewrites fields and resets status
// ---------------------------------------------------------------------------

#[sqlx::test]
async fn resubmission_rewrites_fields_and_resets_status(pool: PgPool) {
    let id = seed_request(&pool, "ART-1").await;
    assert!(RequestRepo::update_status(&pool, id, "rejected")
        .await
        .unwrap());

    let updated = RequestRepo::apply_resubmission(&pool, id, &resubmission("ART-2"))
        .await
        .unwrap()
        .expect("request should exist");

    assert_eq!(updated.status, "under_review");
    assert_eq!(updated.art_number, "ART-2");
    assert_eq!(updated.provider_name, "Beta Builders");
    assert!(updated.attachment_refs.is_empty());
}

// ---------------------------------------------------------------------------
// Test: inspection ledger ordering and deletion
// ---------------------------------------------------------------------------

#[sqlx::test]
async fn inspections_list_newest_first(pool: PgPool) {
    let id = seed_request(&pool, "ART-1").await;

    let first = InspectionRepo::create(
        &pool,
        id,
        "Rui Lima",
        &CreateInspection {
            outcome: "scheduled".to_string(),
            occurred_on: NaiveDate::from_ymd_opt(2026, 9, 10).unwrap(),
            notes: None,
            photo_refs: vec![],
        },
    )
    .await
    .unwrap();
    let second = InspectionRepo::create(
        &pool,
        id,
        "Rui Lima",
        &CreateInspection {
            outcome: "approved".to_string(),
            occurred_on: NaiveDate::from_ymd_opt(2026, 9, 11).unwrap(),
            notes: Some("all good".to_string()),
            photo_refs: vec!["1700000000000_site.jpg".to_string()],
        },
    )
    .await
    .unwrap();

    let listed = InspectionRepo::list_for_request(&pool, id).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, second.id);
    assert_eq!(listed[1].id, first.id);
}

#[sqlx::test]
async fn deleting_an_inspection_leaves_the_request_status_alone(pool: PgPool) {
    let id = seed_request(&pool, "ART-1").await;
    let inspection = InspectionRepo::create(
        &pool,
        id,
        "Rui Lima",
        &CreateInspection {
            outcome: "approved".to_string(),
            occurred_on: NaiveDate::from_ymd_opt(2026, 9, 11).unwrap(),
            notes: None,
            photo_refs: vec!["1700000000000_site.jpg".to_string()],
        },
    )
    .await
    .unwrap();
    RequestRepo::update_status(&pool, id, "inspection_approved")
        .await
        .unwrap();

    assert!(InspectionRepo::delete(&pool, inspection.id).await.unwrap());

    let request = RequestRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(request.status, "inspection_approved");
    assert!(InspectionRepo::find_by_id(&pool, id, inspection.id)
        .await
        .unwrap()
        .is_none());
}

// ---------------------------------------------------------------------------
// Test: aggregate load
// ---------------------------------------------------------------------------

#[sqlx::test]
async fn aggregate_carries_inspections_and_messages(pool: PgPool) {
    let id = seed_request(&pool, "ART-1").await;
    MessageRepo::append(&pool, id, "hello", "Ana Souza", false)
        .await
        .unwrap();
    InspectionRepo::create(
        &pool,
        id,
        "Rui Lima",
        &CreateInspection {
            outcome: "scheduled".to_string(),
            occurred_on: NaiveDate::from_ymd_opt(2026, 9, 10).unwrap(),
            notes: None,
            photo_refs: vec![],
        },
    )
    .await
    .unwrap();

    let aggregate = RequestRepo::load_aggregate(&pool, id)
        .await
        .unwrap()
        .expect("aggregate should exist");
    assert_eq!(aggregate.request.id, id);
    assert_eq!(aggregate.messages.len(), 1);
    assert_eq!(aggregate.inspections.len(), 1);
}

// ---------------------------------------------------------------------------
// Test: notification acknowledgement
// ---------------------------------------------------------------------------

#[sqlx::test]
async fn notification_mark_read_is_scoped_to_the_recipient(pool: PgPool) {
    let notification_id = NotificationRepo::create(
        &pool,
        "111.222.333-44",
        "reforma",
        "Renovation request update",
        "Request ART-1 is now approved",
        Some("/reformas?art=ART-1"),
        None,
    )
    .await
    .unwrap();

    // Another recipient cannot acknowledge it.
    assert!(!NotificationRepo::mark_read(&pool, notification_id, "999.888.777-66")
        .await
        .unwrap());
    assert_eq!(
        NotificationRepo::unread_count(&pool, "111.222.333-44")
            .await
            .unwrap(),
        1
    );

    assert!(NotificationRepo::mark_read(&pool, notification_id, "111.222.333-44")
        .await
        .unwrap());
    // A second acknowledgement is a no-op.
    assert!(!NotificationRepo::mark_read(&pool, notification_id, "111.222.333-44")
        .await
        .unwrap());
    assert_eq!(
        NotificationRepo::unread_count(&pool, "111.222.333-44")
            .await
            .unwrap(),
        0
    );
}

// ---------------------------------------------------------------------------
// Test: device token registration is idempotent
// ---------------------------------------------------------------------------

#[sqlx::test]
async fn device_token_registration_is_idempotent(pool: PgPool) {
    DeviceTokenRepo::register(&pool, "111.222.333-44", "token-1")
        .await
        .unwrap();
    DeviceTokenRepo::register(&pool, "111.222.333-44", "token-1")
        .await
        .unwrap();

    let tokens = DeviceTokenRepo::tokens_for(&pool, &["111.222.333-44".to_string()])
        .await
        .unwrap();
    assert_eq!(tokens, vec!["token-1".to_string()]);

    assert!(DeviceTokenRepo::unregister(&pool, "111.222.333-44", "token-1")
        .await
        .unwrap());
    assert!(DeviceTokenRepo::tokens_for(&pool, &["111.222.333-44".to_string()])
        .await
        .unwrap()
        .is_empty());
}
