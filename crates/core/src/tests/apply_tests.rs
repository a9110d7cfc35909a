// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Per-command tests for [`apply`].

use super::helpers::{
    ADMIN, CUSTOMER, NOW, OTHER_CUSTOMER, STAFF_A, STAFF_B, context, context_with_staff_comment,
    ticket,
};
use crate::{ClaimGuard, CoreError, TicketCommand, Transition, apply};
use bistro_desk_domain::{DomainError, Role, TicketStatus, UserId};
use time::Duration;

// ---------------------------------------------------------------------------
// Claim
// ---------------------------------------------------------------------------

#[test]
fn test_staff_claim_defaults_to_in_progress() {
    let ctx = context(ticket(None, TicketStatus::New));

    let transition = apply(
        &ctx,
        TicketCommand::Claim {
            explicit_status: None,
        },
        &STAFF_A,
        NOW,
    )
    .expect("claim on unowned ticket must succeed");

    assert_eq!(
        transition,
        Transition::Claim {
            owner: STAFF_A.id,
            status: TicketStatus::InProgress,
            guard: ClaimGuard::UnownedSelfOrReopened {
                claimant: STAFF_A.id
            },
        }
    );
}

#[test]
fn test_claim_with_explicit_status() {
    let ctx = context(ticket(None, TicketStatus::New));

    let transition = apply(
        &ctx,
        TicketCommand::Claim {
            explicit_status: Some(TicketStatus::PendingReview),
        },
        &STAFF_A,
        NOW,
    )
    .expect("claim with explicit status must succeed");

    match transition {
        Transition::Claim { status, .. } => assert_eq!(status, TicketStatus::PendingReview),
        other => panic!("Expected Claim transition, got {other:?}"),
    }
}

#[test]
fn test_admin_claim_is_unconditional() {
    let ctx = context(ticket(Some(STAFF_A.id), TicketStatus::InProgress));

    let transition = apply(
        &ctx,
        TicketCommand::Claim {
            explicit_status: None,
        },
        &ADMIN,
        NOW,
    )
    .expect("admin claim must succeed over an active owner");

    match transition {
        Transition::Claim { guard, owner, .. } => {
            assert_eq!(guard, ClaimGuard::Unconditional);
            assert_eq!(owner, ADMIN.id);
        }
        other => panic!("Expected Claim transition, got {other:?}"),
    }
}

#[test]
fn test_staff_claim_on_foreign_owned_ticket_is_denied() {
    let ctx = context(ticket(Some(STAFF_A.id), TicketStatus::InProgress));

    let result = apply(
        &ctx,
        TicketCommand::Claim {
            explicit_status: None,
        },
        &STAFF_B,
        NOW,
    );

    assert_eq!(
        result,
        Err(CoreError::DomainViolation(DomainError::OwnedByAnotherAgent))
    );
}

// ---------------------------------------------------------------------------
// Status updates
// ---------------------------------------------------------------------------

#[test]
fn test_owner_updates_status() {
    let ctx = context(ticket(Some(STAFF_A.id), TicketStatus::InProgress));

    let transition = apply(
        &ctx,
        TicketCommand::UpdateStatus {
            status: TicketStatus::WaitingCustomerResponse,
        },
        &STAFF_A,
        NOW,
    )
    .expect("owner status update must succeed");

    assert_eq!(
        transition,
        Transition::StatusUpdate {
            status: TicketStatus::WaitingCustomerResponse
        }
    );
}

#[test]
fn test_non_owner_status_update_requires_claim() {
    let ctx = context(ticket(Some(STAFF_A.id), TicketStatus::InProgress));

    let result = apply(
        &ctx,
        TicketCommand::UpdateStatus {
            status: TicketStatus::Resolved,
        },
        &STAFF_B,
        NOW,
    );

    assert_eq!(
        result,
        Err(CoreError::DomainViolation(DomainError::MustClaimFirst))
    );
}

// ---------------------------------------------------------------------------
// Reassignment
// ---------------------------------------------------------------------------

#[test]
fn test_admin_reassigns_over_active_owner() {
    let ctx = context(ticket(Some(STAFF_A.id), TicketStatus::InProgress));

    let transition = apply(
        &ctx,
        TicketCommand::Reassign {
            target: Some((STAFF_B.id, Role::Staff)),
            status: None,
        },
        &ADMIN,
        NOW,
    )
    .expect("admin reassignment must succeed");

    assert_eq!(
        transition,
        Transition::Reassign {
            owner: Some(STAFF_B.id),
            status: None,
        }
    );
}

#[test]
fn test_admin_unassigns_with_none_target() {
    let ctx = context(ticket(Some(STAFF_A.id), TicketStatus::InProgress));

    let transition = apply(
        &ctx,
        TicketCommand::Reassign {
            target: None,
            status: Some(TicketStatus::PendingReview),
        },
        &ADMIN,
        NOW,
    )
    .expect("unassign must succeed");

    assert_eq!(
        transition,
        Transition::Reassign {
            owner: None,
            status: Some(TicketStatus::PendingReview),
        }
    );
}

#[test]
fn test_reassign_to_customer_is_rejected() {
    let ctx = context(ticket(None, TicketStatus::New));

    let result = apply(
        &ctx,
        TicketCommand::Reassign {
            target: Some((UserId::new(500), Role::Customer)),
            status: None,
        },
        &ADMIN,
        NOW,
    );

    assert_eq!(
        result,
        Err(CoreError::DomainViolation(DomainError::OwnerMustBeAgent {
            role: Role::Customer
        }))
    );
}

#[test]
fn test_staff_cannot_reassign() {
    let ctx = context(ticket(None, TicketStatus::New));

    let result = apply(
        &ctx,
        TicketCommand::Reassign {
            target: Some((STAFF_B.id, Role::Staff)),
            status: None,
        },
        &STAFF_A,
        NOW,
    );

    assert!(matches!(
        result,
        Err(CoreError::DomainViolation(
            DomainError::RoleNotPermitted { .. }
        ))
    ));
}

// ---------------------------------------------------------------------------
// Customer replies and the reply window
// ---------------------------------------------------------------------------

#[test]
fn test_customer_reply_with_no_staff_comment_is_always_open() {
    let ctx = context(ticket(None, TicketStatus::New));

    let transition = apply(
        &ctx,
        TicketCommand::CustomerReply {
            message: String::from("  any update?  "),
            author_email: Some(String::from("diner@example.com")),
        },
        &CUSTOMER,
        NOW,
    )
    .expect("reply with no deadline must succeed");

    match transition {
        Transition::CustomerReply {
            comment,
            reopen,
            window,
        } => {
            assert_eq!(comment.message, "any update?");
            assert_eq!(comment.author_role, Role::Customer);
            assert!(!reopen);
            assert!(window.open);
            assert_eq!(window.deadline, None);
        }
        other => panic!("Expected CustomerReply transition, got {other:?}"),
    }
}

#[test]
fn test_customer_reply_within_window() {
    let staff_commented_at = NOW - Duration::days(4) - Duration::hours(23);
    let ctx = context_with_staff_comment(
        ticket(Some(STAFF_A.id), TicketStatus::WaitingCustomerResponse),
        staff_commented_at,
    );

    let result = apply(
        &ctx,
        TicketCommand::CustomerReply {
            message: String::from("still broken"),
            author_email: None,
        },
        &CUSTOMER,
        NOW,
    );

    assert!(result.is_ok());
}

#[test]
fn test_customer_reply_after_window_is_denied() {
    let staff_commented_at = NOW - Duration::days(5) - Duration::hours(1);
    let ctx = context_with_staff_comment(
        ticket(Some(STAFF_A.id), TicketStatus::WaitingCustomerResponse),
        staff_commented_at,
    );

    let result = apply(
        &ctx,
        TicketCommand::CustomerReply {
            message: String::from("still broken"),
            author_email: None,
        },
        &CUSTOMER,
        NOW,
    );

    assert!(matches!(
        result,
        Err(CoreError::DomainViolation(
            DomainError::ReplyWindowClosed { .. }
        ))
    ));
}

#[test]
fn test_reply_on_resolved_ticket_reopens() {
    let ctx = context(ticket(Some(STAFF_A.id), TicketStatus::Resolved));

    let transition = apply(
        &ctx,
        TicketCommand::CustomerReply {
            message: String::from("it came back"),
            author_email: None,
        },
        &CUSTOMER,
        NOW,
    )
    .expect("reply within window must succeed");

    match transition {
        Transition::CustomerReply { reopen, .. } => assert!(reopen),
        other => panic!("Expected CustomerReply transition, got {other:?}"),
    }
}

#[test]
fn test_reply_on_reopened_ticket_does_not_retrigger() {
    let ctx = context(ticket(None, TicketStatus::Reopened));

    let transition = apply(
        &ctx,
        TicketCommand::CustomerReply {
            message: String::from("more detail"),
            author_email: None,
        },
        &CUSTOMER,
        NOW,
    )
    .expect("reply must succeed");

    match transition {
        Transition::CustomerReply { reopen, .. } => assert!(!reopen),
        other => panic!("Expected CustomerReply transition, got {other:?}"),
    }
}

#[test]
fn test_foreign_customer_cannot_reply() {
    let ctx = context(ticket(None, TicketStatus::New));

    let result = apply(
        &ctx,
        TicketCommand::CustomerReply {
            message: String::from("hello"),
            author_email: None,
        },
        &OTHER_CUSTOMER,
        NOW,
    );

    assert_eq!(
        result,
        Err(CoreError::DomainViolation(DomainError::NotTicketCustomer))
    );
}

#[test]
fn test_empty_reply_rejected() {
    let ctx = context(ticket(None, TicketStatus::New));

    let result = apply(
        &ctx,
        TicketCommand::CustomerReply {
            message: String::from("   "),
            author_email: None,
        },
        &CUSTOMER,
        NOW,
    );

    assert_eq!(
        result,
        Err(CoreError::DomainViolation(DomainError::EmptyField {
            field: "message"
        }))
    );
}

// ---------------------------------------------------------------------------
// Agent replies
// ---------------------------------------------------------------------------

#[test]
fn test_owner_agent_reply() {
    let ctx = context(ticket(Some(STAFF_A.id), TicketStatus::InProgress));

    let transition = apply(
        &ctx,
        TicketCommand::AgentReply {
            message: String::from("Looking into it."),
            author_email: Some(String::from("a@bistro.example")),
        },
        &STAFF_A,
        NOW,
    )
    .expect("owner reply must succeed");

    match transition {
        Transition::AgentReply { comment } => {
            assert_eq!(comment.author_role, Role::Staff);
            assert_eq!(comment.author_id, STAFF_A.id);
        }
        other => panic!("Expected AgentReply transition, got {other:?}"),
    }
}

#[test]
fn test_non_owner_agent_reply_requires_claim() {
    let ctx = context(ticket(Some(STAFF_A.id), TicketStatus::InProgress));

    let result = apply(
        &ctx,
        TicketCommand::AgentReply {
            message: String::from("jumping in"),
            author_email: None,
        },
        &STAFF_B,
        NOW,
    );

    assert_eq!(
        result,
        Err(CoreError::DomainViolation(DomainError::MustClaimFirst))
    );
}

// ---------------------------------------------------------------------------
// Feedback
// ---------------------------------------------------------------------------

#[test]
fn test_feedback_on_resolved_ticket() {
    let ctx = context(ticket(Some(STAFF_A.id), TicketStatus::Resolved));

    let transition = apply(
        &ctx,
        TicketCommand::SubmitFeedback {
            stars: 5,
            comment: Some(String::from("  great service  ")),
        },
        &CUSTOMER,
        NOW,
    )
    .expect("feedback on resolved ticket must succeed");

    assert_eq!(
        transition,
        Transition::Feedback {
            stars: 5,
            comment: Some(String::from("great service")),
        }
    );
}

#[test]
fn test_feedback_on_unresolved_ticket_is_denied() {
    let ctx = context(ticket(Some(STAFF_A.id), TicketStatus::InProgress));

    let result = apply(
        &ctx,
        TicketCommand::SubmitFeedback {
            stars: 4,
            comment: None,
        },
        &CUSTOMER,
        NOW,
    );

    assert_eq!(
        result,
        Err(CoreError::DomainViolation(
            DomainError::FeedbackNotResolved {
                status: TicketStatus::InProgress
            }
        ))
    );
}

#[test]
fn test_feedback_star_bounds() {
    let ctx = context(ticket(Some(STAFF_A.id), TicketStatus::Resolved));

    for (stars, ok) in [(0, false), (1, true), (5, true), (6, false)] {
        let result = apply(
            &ctx,
            TicketCommand::SubmitFeedback {
                stars,
                comment: None,
            },
            &CUSTOMER,
            NOW,
        );
        assert_eq!(result.is_ok(), ok, "stars={stars}");
    }
}

#[test]
fn test_feedback_from_foreign_customer_is_denied() {
    let ctx = context(ticket(None, TicketStatus::Resolved));

    let result = apply(
        &ctx,
        TicketCommand::SubmitFeedback {
            stars: 3,
            comment: None,
        },
        &OTHER_CUSTOMER,
        NOW,
    );

    assert_eq!(
        result,
        Err(CoreError::DomainViolation(DomainError::NotTicketCustomer))
    );
}
