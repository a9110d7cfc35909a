// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Engine-level walkthrough of the full contention lifecycle: claim,
//! blocked takeover, admin override, resolution, customer reopen, reclaim.

use super::helpers::{ADMIN, CUSTOMER, NOW, STAFF_A, STAFF_B, STAFF_C, context, ticket};
use crate::{ClaimGuard, CoreError, TicketCommand, Transition, apply};
use bistro_desk_domain::{DomainError, Role, TicketSnapshot, TicketStatus, UserId};

/// Applies a transition's ownership effects to a snapshot, standing in for
/// the store's row update.
fn commit(mut snapshot: TicketSnapshot, transition: &Transition) -> TicketSnapshot {
    match transition {
        Transition::Claim { owner, status, .. } => {
            snapshot.owner_id = Some(*owner);
            snapshot.status = *status;
        }
        Transition::StatusUpdate { status } => snapshot.status = *status,
        Transition::Reassign { owner, status } => {
            snapshot.owner_id = *owner;
            if let Some(status) = status {
                snapshot.status = *status;
            }
        }
        Transition::CustomerReply { reopen, .. } => {
            if *reopen {
                snapshot.status = TicketStatus::Reopened;
                snapshot.owner_id = None;
            }
        }
        Transition::AgentReply { .. } | Transition::Feedback { .. } => {}
    }
    snapshot
}

#[test]
fn test_full_contention_lifecycle() {
    // Customer files a ticket: New, unowned.
    let mut snapshot = ticket(None, TicketStatus::New);
    assert_eq!(snapshot.status, TicketStatus::New);
    assert_eq!(snapshot.owner_id, None);

    // Staff A claims it.
    let claim_a = apply(
        &context(snapshot.clone()),
        TicketCommand::Claim {
            explicit_status: None,
        },
        &STAFF_A,
        NOW,
    )
    .expect("Staff A claims the unowned ticket");
    snapshot = commit(snapshot, &claim_a);
    assert_eq!(snapshot.owner_id, Some(STAFF_A.id));
    assert_eq!(snapshot.status, TicketStatus::InProgress);

    // Staff B tries to take it over and is rejected.
    let claim_b = apply(
        &context(snapshot.clone()),
        TicketCommand::Claim {
            explicit_status: None,
        },
        &STAFF_B,
        NOW,
    );
    assert_eq!(
        claim_b,
        Err(CoreError::DomainViolation(DomainError::OwnedByAnotherAgent))
    );

    // Admin reassigns to Staff C, allowed regardless of prior ownership.
    let reassign = apply(
        &context(snapshot.clone()),
        TicketCommand::Reassign {
            target: Some((STAFF_C.id, Role::Staff)),
            status: None,
        },
        &ADMIN,
        NOW,
    )
    .expect("admin reassignment bypasses the contention rule");
    snapshot = commit(snapshot, &reassign);
    assert_eq!(snapshot.owner_id, Some(STAFF_C.id));

    // Staff C resolves the ticket.
    let resolve = apply(
        &context(snapshot.clone()),
        TicketCommand::UpdateStatus {
            status: TicketStatus::Resolved,
        },
        &STAFF_C,
        NOW,
    )
    .expect("owner resolves the ticket");
    snapshot = commit(snapshot, &resolve);
    assert_eq!(snapshot.status, TicketStatus::Resolved);

    // Customer replies within the window: auto-reopen, ownership cleared.
    let reply = apply(
        &context(snapshot.clone()),
        TicketCommand::CustomerReply {
            message: String::from("the charge reappeared"),
            author_email: None,
        },
        &CUSTOMER,
        NOW,
    )
    .expect("customer reply within window must succeed");
    snapshot = commit(snapshot, &reply);
    assert_eq!(snapshot.status, TicketStatus::Reopened);
    assert_eq!(snapshot.owner_id, None);

    // Staff B now claims the reopened ticket successfully.
    let reclaim = apply(
        &context(snapshot.clone()),
        TicketCommand::Claim {
            explicit_status: None,
        },
        &STAFF_B,
        NOW,
    )
    .expect("reopened tickets are claimable by any staff member");
    snapshot = commit(snapshot, &reclaim);
    assert_eq!(snapshot.owner_id, Some(STAFF_B.id));
    assert_eq!(snapshot.status, TicketStatus::InProgress);
}

#[test]
fn test_reopened_ticket_with_lingering_owner_is_still_contestable() {
    // An admin status change to Reopened does not clear ownership; the
    // status alone makes the ticket claimable by other staff.
    let snapshot = ticket(Some(STAFF_A.id), TicketStatus::Reopened);

    let claim = apply(
        &context(snapshot),
        TicketCommand::Claim {
            explicit_status: None,
        },
        &STAFF_B,
        NOW,
    )
    .expect("reopened status overrides active ownership for claims");

    match claim {
        Transition::Claim { owner, guard, .. } => {
            assert_eq!(owner, STAFF_B.id);
            assert_eq!(
                guard,
                ClaimGuard::UnownedSelfOrReopened {
                    claimant: STAFF_B.id
                }
            );
        }
        other => panic!("Expected Claim transition, got {other:?}"),
    }
}

#[test]
fn test_status_strings_stay_within_recognized_set() {
    // Every reachable transition carries a TicketStatus value; the type is
    // closed over the six recognized strings by construction.
    let statuses = [
        TicketStatus::New,
        TicketStatus::PendingReview,
        TicketStatus::WaitingCustomerResponse,
        TicketStatus::InProgress,
        TicketStatus::Resolved,
        TicketStatus::Reopened,
    ];
    for status in statuses {
        let ctx = context(ticket(Some(UserId::new(1)), TicketStatus::InProgress));
        let transition = apply(
            &ctx,
            TicketCommand::UpdateStatus { status },
            &STAFF_A,
            NOW,
        )
        .expect("owner may set any recognized status");
        assert_eq!(transition, Transition::StatusUpdate { status });
    }
}
