//! Engine-level tests for admission, promotion order and the capacity
//! invariant. These call the engine directly, without HTTP.

mod common;

use assert_matches::assert_matches;
use clubhouse_api::background::waitlist_sweep;
use clubhouse_api::error::AppError;
use clubhouse_core::activity::ActivityKind;
use clubhouse_core::error::CoreError;
use clubhouse_core::rsvp::{RequestedStatus, RsvpStatus};
use clubhouse_db::models::event::UpdateEvent;
use clubhouse_db::models::rsvp::RsvpFilter;
use clubhouse_db::repositories::RsvpRepo;
use common::{create_event, create_user, test_engine};
use sqlx::PgPool;

async fn going_count(pool: &PgPool, event_id: uuid::Uuid) -> i64 {
    RsvpRepo::count_with_status(pool, event_id, RsvpStatus::Going)
        .await
        .unwrap()
}

// ---------------------------------------------------------------------------
// Test: FIFO promotion. Capacity 2, A and B going, C and D waitlisted;
// A cancels and C (not D) is promoted.
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn promotion_follows_priority_order(pool: PgPool) {
    let (engine, _bus) = test_engine(pool.clone());
    let event = create_event(&pool, "Pub quiz", 2).await;
    let mut users = Vec::new();
    for name in ["ana", "ben", "cy", "dee"] {
        let user = create_user(&pool, name).await;
        engine.request_rsvp(event.id, user.id).await.unwrap();
        users.push(user);
    }

    engine
        .update_rsvp(event.id, users[0].id, RequestedStatus::NotGoing)
        .await
        .unwrap();

    let c = RsvpRepo::find(&pool, event.id, users[2].id).await.unwrap().unwrap();
    let d = RsvpRepo::find(&pool, event.id, users[3].id).await.unwrap().unwrap();
    assert_eq!(c.status, RsvpStatus::Going);
    assert_eq!(d.status, RsvpStatus::Waitlisted);
    assert_eq!(going_count(&pool, event.id).await, 2);
}

// ---------------------------------------------------------------------------
// Test: rebalancing a balanced event changes nothing, twice
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn rebalance_is_idempotent(pool: PgPool) {
    let (engine, _bus) = test_engine(pool.clone());
    let event = create_event(&pool, "Pub quiz", 1).await;
    for name in ["ana", "ben"] {
        let user = create_user(&pool, name).await;
        engine.request_rsvp(event.id, user.id).await.unwrap();
    }

    let before = RsvpRepo::list_by_event(&pool, event.id).await.unwrap();
    assert!(engine.rebalance_waitlist(event.id).await.unwrap().is_empty());
    assert!(engine.rebalance_waitlist(event.id).await.unwrap().is_empty());
    let after = RsvpRepo::list_by_event(&pool, event.id).await.unwrap();

    let snapshot = |rows: &[clubhouse_db::models::rsvp::Rsvp]| {
        rows.iter()
            .map(|r| (r.id, r.status, r.priority))
            .collect::<Vec<_>>()
    };
    assert_eq!(snapshot(&before), snapshot(&after));
}

// ---------------------------------------------------------------------------
// Test: every status change draws a priority above all existing ones
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn priorities_increase_across_creation_and_updates(pool: PgPool) {
    let (engine, _bus) = test_engine(pool.clone());
    let event = create_event(&pool, "Pub quiz", 3).await;
    let ana = create_user(&pool, "ana").await;
    let ben = create_user(&pool, "ben").await;

    let a = engine.request_rsvp(event.id, ana.id).await.unwrap();
    let b = engine.request_rsvp(event.id, ben.id).await.unwrap();
    assert!(b.priority > a.priority);

    let a2 = engine
        .update_rsvp(event.id, ana.id, RequestedStatus::NotGoing)
        .await
        .unwrap();
    assert!(a2.priority > b.priority);

    let a3 = engine
        .update_rsvp(event.id, ana.id, RequestedStatus::Going)
        .await
        .unwrap();
    assert_eq!(a3.status, RsvpStatus::Going);
    assert!(a3.priority > a2.priority);
}

// ---------------------------------------------------------------------------
// Test: asking for the current status is a no-op
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn same_status_update_is_a_no_op(pool: PgPool) {
    let (engine, _bus) = test_engine(pool.clone());
    let event = create_event(&pool, "Pub quiz", 3).await;
    let ana = create_user(&pool, "ana").await;

    let created = engine.request_rsvp(event.id, ana.id).await.unwrap();
    let updated = engine
        .update_rsvp(event.id, ana.id, RequestedStatus::Going)
        .await
        .unwrap();

    assert_eq!(updated.status, RsvpStatus::Going);
    assert_eq!(updated.priority, created.priority);
}

// ---------------------------------------------------------------------------
// Test: a duplicate request surfaces as Conflict and leaves one row
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_request_is_conflict(pool: PgPool) {
    let (engine, _bus) = test_engine(pool.clone());
    let event = create_event(&pool, "Pub quiz", 3).await;
    let ana = create_user(&pool, "ana").await;

    engine.request_rsvp(event.id, ana.id).await.unwrap();
    let err = engine.request_rsvp(event.id, ana.id).await.unwrap_err();

    assert_matches!(err, AppError::Core(CoreError::Conflict(_)));
    let filter = RsvpFilter {
        event_id: Some(event.id),
        ..Default::default()
    };
    assert_eq!(RsvpRepo::count(&pool, &filter).await.unwrap(), 1);
}

// ---------------------------------------------------------------------------
// Test: full event rejects a waitlisted member's `going` request
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn waitlisted_going_request_at_capacity_is_rejected(pool: PgPool) {
    let (engine, _bus) = test_engine(pool.clone());
    let event = create_event(&pool, "Pub quiz", 1).await;
    let ana = create_user(&pool, "ana").await;
    let ben = create_user(&pool, "ben").await;
    engine.request_rsvp(event.id, ana.id).await.unwrap();
    engine.request_rsvp(event.id, ben.id).await.unwrap();

    let err = engine
        .update_rsvp(event.id, ben.id, RequestedStatus::Going)
        .await
        .unwrap_err();
    assert_matches!(err, AppError::Core(CoreError::CapacityExceeded(_)));

    let ben_rsvp = RsvpRepo::find(&pool, event.id, ben.id).await.unwrap().unwrap();
    assert_eq!(ben_rsvp.status, RsvpStatus::Waitlisted);
}

// ---------------------------------------------------------------------------
// Test: capacity edits promote and demote inside the edit
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn capacity_edit_rebalances_in_both_directions(pool: PgPool) {
    let (engine, _bus) = test_engine(pool.clone());
    let event = create_event(&pool, "Pub quiz", 3).await;
    let mut users = Vec::new();
    for name in ["ana", "ben", "cy", "dee"] {
        let user = create_user(&pool, name).await;
        engine.request_rsvp(event.id, user.id).await.unwrap();
        users.push(user);
    }
    assert_eq!(going_count(&pool, event.id).await, 3);

    // Shrink to 1: the two most recent `going` RSVPs return to the waitlist
    // with their priorities intact.
    let shrink = UpdateEvent {
        max_attendees: Some(1),
        ..Default::default()
    };
    engine.edit_event(event.id, &shrink).await.unwrap();
    assert_eq!(going_count(&pool, event.id).await, 1);

    let roster = RsvpRepo::list_by_event(&pool, event.id).await.unwrap();
    let states: Vec<_> = roster.iter().map(|r| (r.priority, r.status)).collect();
    assert_eq!(
        states,
        vec![
            (1, RsvpStatus::Going),
            (2, RsvpStatus::Waitlisted),
            (3, RsvpStatus::Waitlisted),
            (4, RsvpStatus::Waitlisted),
        ]
    );

    // Grow to 3: the two oldest waitlisted RSVPs are promoted.
    let grow = UpdateEvent {
        max_attendees: Some(3),
        ..Default::default()
    };
    engine.edit_event(event.id, &grow).await.unwrap();
    let roster = RsvpRepo::list_by_event(&pool, event.id).await.unwrap();
    let going: Vec<_> = roster
        .iter()
        .filter(|r| r.status == RsvpStatus::Going)
        .map(|r| r.priority)
        .collect();
    assert_eq!(going, vec![1, 2, 3]);
}

// ---------------------------------------------------------------------------
// Test: an invalid capacity is rejected before anything is written
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn invalid_capacity_edit_is_rejected(pool: PgPool) {
    let (engine, _bus) = test_engine(pool.clone());
    let event = create_event(&pool, "Pub quiz", 3).await;

    let edit = UpdateEvent {
        max_attendees: Some(0),
        ..Default::default()
    };
    let err = engine.edit_event(event.id, &edit).await.unwrap_err();
    assert_matches!(err, AppError::Core(CoreError::Validation(_)));
}

// ---------------------------------------------------------------------------
// Test: concurrent requests never overfill an event
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn concurrent_requests_respect_capacity(pool: PgPool) {
    let (engine, _bus) = test_engine(pool.clone());
    let event = create_event(&pool, "Pub quiz", 3).await;
    let mut user_ids = Vec::new();
    for i in 0..8 {
        user_ids.push(create_user(&pool, &format!("member{i}")).await.id);
    }

    let results = futures::future::join_all(
        user_ids
            .iter()
            .map(|user_id| engine.request_rsvp(event.id, *user_id)),
    )
    .await;
    assert!(results.iter().all(Result::is_ok));

    assert_eq!(going_count(&pool, event.id).await, 3);

    let roster = RsvpRepo::list_by_event(&pool, event.id).await.unwrap();
    let priorities: Vec<i32> = roster.iter().map(|r| r.priority).collect();
    assert_eq!(priorities, (1..=8).collect::<Vec<_>>());
    assert!(roster[..3].iter().all(|r| r.status == RsvpStatus::Going));
    assert!(roster[3..].iter().all(|r| r.status == RsvpStatus::Waitlisted));
}

// ---------------------------------------------------------------------------
// Test: activity is published after commit, one entry per promotion
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn promotion_publishes_activity(pool: PgPool) {
    let (engine, bus) = test_engine(pool.clone());
    let event = create_event(&pool, "Pub quiz", 1).await;
    let ana = create_user(&pool, "ana").await;
    let ben = create_user(&pool, "ben").await;
    engine.request_rsvp(event.id, ana.id).await.unwrap();
    engine.request_rsvp(event.id, ben.id).await.unwrap();

    let mut rx = bus.subscribe();
    engine
        .update_rsvp(event.id, ana.id, RequestedStatus::NotGoing)
        .await
        .unwrap();

    let cancelled = rx.recv().await.unwrap();
    assert_eq!(cancelled.kind, ActivityKind::RsvpUpdated);
    assert_eq!(
        cancelled.details,
        "User 'ana' updated RSVP to 'not going' for event 'Pub quiz'."
    );

    let promoted = rx.recv().await.unwrap();
    assert_eq!(promoted.kind, ActivityKind::WaitlistPromoted);
    assert_eq!(promoted.user_id, Some(ben.id));
    assert!(rx.try_recv().is_err());
}

// ---------------------------------------------------------------------------
// Test: a rejected operation publishes nothing
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn rejected_update_publishes_nothing(pool: PgPool) {
    let (engine, bus) = test_engine(pool.clone());
    let event = create_event(&pool, "Pub quiz", 1).await;
    let ana = create_user(&pool, "ana").await;
    let ben = create_user(&pool, "ben").await;
    engine.request_rsvp(event.id, ana.id).await.unwrap();
    engine.request_rsvp(event.id, ben.id).await.unwrap();

    let mut rx = bus.subscribe();
    let _ = engine
        .update_rsvp(event.id, ben.id, RequestedStatus::Going)
        .await;

    assert!(rx.try_recv().is_err());
}

// ---------------------------------------------------------------------------
// Test: the background sweep repairs events changed outside the engine
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn sweep_promotes_after_out_of_band_capacity_change(pool: PgPool) {
    let (engine, _bus) = test_engine(pool.clone());
    let event = create_event(&pool, "Pub quiz", 1).await;
    let ana = create_user(&pool, "ana").await;
    let ben = create_user(&pool, "ben").await;
    engine.request_rsvp(event.id, ana.id).await.unwrap();
    engine.request_rsvp(event.id, ben.id).await.unwrap();

    sqlx::query("UPDATE events SET max_attendees = 2 WHERE id = $1")
        .bind(event.id)
        .execute(&pool)
        .await
        .unwrap();

    let changed = waitlist_sweep::sweep_once(&pool, &engine).await;
    assert_eq!(changed, 1);
    assert_eq!(going_count(&pool, event.id).await, 2);

    // Nothing left to do on the next pass.
    assert_eq!(waitlist_sweep::sweep_once(&pool, &engine).await, 0);
}

// ---------------------------------------------------------------------------
// Test: a waitlisted member can cancel; they go to the back of the line and
// are never promoted afterwards
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn waitlisted_member_can_cancel(pool: PgPool) {
    let (engine, _bus) = test_engine(pool.clone());
    let event = create_event(&pool, "Pub quiz", 1).await;
    let ana = create_user(&pool, "ana").await;
    let ben = create_user(&pool, "ben").await;
    engine.request_rsvp(event.id, ana.id).await.unwrap();
    engine.request_rsvp(event.id, ben.id).await.unwrap();

    let cancelled = engine
        .update_rsvp(event.id, ben.id, RequestedStatus::NotGoing)
        .await
        .unwrap();
    assert_eq!(cancelled.status, RsvpStatus::NotGoing);
    assert_eq!(cancelled.priority, 3);

    let stored = RsvpRepo::find(&pool, event.id, ben.id).await.unwrap().unwrap();
    assert_eq!(stored.status, RsvpStatus::NotGoing);
    assert_eq!(stored.priority, 3);

    // Freeing ana's seat must not hand it to ben.
    engine
        .update_rsvp(event.id, ana.id, RequestedStatus::NotGoing)
        .await
        .unwrap();
    assert!(engine.rebalance_waitlist(event.id).await.unwrap().is_empty());

    let stored = RsvpRepo::find(&pool, event.id, ben.id).await.unwrap().unwrap();
    assert_eq!(stored.status, RsvpStatus::NotGoing);
    assert_eq!(going_count(&pool, event.id).await, 0);
}

// ---------------------------------------------------------------------------
// Test: a waitlisted member asking for `going` behind someone earlier in
// line gets their RSVP back unchanged while the earlier member is promoted
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn waitlisted_going_request_respects_line_order(pool: PgPool) {
    let (engine, _bus) = test_engine(pool.clone());
    let event = create_event(&pool, "Pub quiz", 1).await;
    let ana = create_user(&pool, "ana").await;
    let ben = create_user(&pool, "ben").await;
    let cy = create_user(&pool, "cy").await;
    for user in [&ana, &ben, &cy] {
        engine.request_rsvp(event.id, user.id).await.unwrap();
    }

    sqlx::query("UPDATE events SET max_attendees = 2 WHERE id = $1")
        .bind(event.id)
        .execute(&pool)
        .await
        .unwrap();

    let returned = engine
        .update_rsvp(event.id, cy.id, RequestedStatus::Going)
        .await
        .unwrap();
    assert_eq!(returned.status, RsvpStatus::Waitlisted);
    assert_eq!(returned.priority, 3);

    let ben_rsvp = RsvpRepo::find(&pool, event.id, ben.id).await.unwrap().unwrap();
    assert_eq!(ben_rsvp.status, RsvpStatus::Going);
    assert_eq!(going_count(&pool, event.id).await, 2);
}
