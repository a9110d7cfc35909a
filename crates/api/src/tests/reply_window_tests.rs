// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Reply-window enforcement through the API: the write-time check is
//! authoritative, the detail view's fields are advisory.

use super::helpers::{NOW, TestWorld, file_ticket, setup};
use crate::{ApiError, ClaimTicketRequest, ReplyRequest};
use time::{Duration, OffsetDateTime};

/// Claims the ticket as Staff A and posts a support comment at `at`.
fn staff_comment_at(world: &mut TestWorld, ticket_id: i64, at: OffsetDateTime) {
    crate::claim_ticket(
        &mut world.persistence,
        ticket_id,
        &ClaimTicketRequest { status: None },
        &world.staff_a,
        at,
    )
    .expect("claim must succeed");
    crate::agent_reply(
        &mut world.persistence,
        ticket_id,
        &ReplyRequest {
            message: String::from("We are looking into this."),
        },
        &world.staff_a,
        at,
    )
    .expect("staff reply must succeed");
}

#[test]
fn test_reply_succeeds_just_inside_the_window() {
    let mut world = setup();
    let ticket = file_ticket(&mut world);
    staff_comment_at(&mut world, ticket.ticket_id, NOW);

    let result = crate::customer_reply(
        &mut world.persistence,
        ticket.ticket_id,
        &ReplyRequest {
            message: String::from("thanks, waiting"),
        },
        &world.customer,
        NOW + Duration::days(4) + Duration::hours(23),
    );
    assert!(result.is_ok());
}

#[test]
fn test_reply_fails_just_past_the_window() {
    let mut world = setup();
    let ticket = file_ticket(&mut world);
    staff_comment_at(&mut world, ticket.ticket_id, NOW);

    let result = crate::customer_reply(
        &mut world.persistence,
        ticket.ticket_id,
        &ReplyRequest {
            message: String::from("am I too late?"),
        },
        &world.customer,
        NOW + Duration::days(5) + Duration::hours(1),
    );
    assert!(matches!(result, Err(ApiError::Unauthorized { .. })));
}

#[test]
fn test_customer_comment_does_not_extend_the_window() {
    let mut world = setup();
    let ticket = file_ticket(&mut world);
    staff_comment_at(&mut world, ticket.ticket_id, NOW);

    // A customer comment one day in does not move the deadline.
    crate::customer_reply(
        &mut world.persistence,
        ticket.ticket_id,
        &ReplyRequest {
            message: String::from("any update?"),
        },
        &world.customer,
        NOW + Duration::days(1),
    )
    .expect("reply within window must succeed");

    let result = crate::customer_reply(
        &mut world.persistence,
        ticket.ticket_id,
        &ReplyRequest {
            message: String::from("hello again"),
        },
        &world.customer,
        NOW + Duration::days(5) + Duration::hours(1),
    );
    assert!(matches!(result, Err(ApiError::Unauthorized { .. })));
}

#[test]
fn test_staff_comment_restarts_the_window() {
    let mut world = setup();
    let ticket = file_ticket(&mut world);
    staff_comment_at(&mut world, ticket.ticket_id, NOW);

    // A second staff comment three days in pushes the deadline out.
    crate::agent_reply(
        &mut world.persistence,
        ticket.ticket_id,
        &ReplyRequest {
            message: String::from("Update: refund issued."),
        },
        &world.staff_a,
        NOW + Duration::days(3),
    )
    .expect("staff reply must succeed");

    let result = crate::customer_reply(
        &mut world.persistence,
        ticket.ticket_id,
        &ReplyRequest {
            message: String::from("confirmed, thanks"),
        },
        &world.customer,
        NOW + Duration::days(7),
    );
    assert!(result.is_ok());
}

#[test]
fn test_detail_exposes_window_state() {
    let mut world = setup();
    let ticket = file_ticket(&mut world);

    // No staff comment yet: open with no deadline.
    let detail = crate::get_my_ticket_detail(
        &mut world.persistence,
        ticket.ticket_id,
        &world.customer,
        NOW,
    )
    .expect("detail must render");
    assert!(detail.allow_customer_reply);
    assert_eq!(detail.reply_deadline, None);

    staff_comment_at(&mut world, ticket.ticket_id, NOW);

    // Inside the window: open, with a deadline.
    let detail = crate::get_my_ticket_detail(
        &mut world.persistence,
        ticket.ticket_id,
        &world.customer,
        NOW + Duration::days(1),
    )
    .expect("detail must render");
    assert!(detail.allow_customer_reply);
    assert!(detail.reply_deadline.is_some());

    // Past the window: closed, deadline still shown.
    let detail = crate::get_my_ticket_detail(
        &mut world.persistence,
        ticket.ticket_id,
        &world.customer,
        NOW + Duration::days(6),
    )
    .expect("detail must render");
    assert!(!detail.allow_customer_reply);
    assert!(detail.reply_deadline.is_some());
}
