// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Shared builders for engine tests.

use crate::TicketContext;
use bistro_desk_domain::{Actor, Role, TicketId, TicketSnapshot, TicketStatus, UserId};
use time::OffsetDateTime;
use time::macros::datetime;

pub const CUSTOMER: Actor = Actor::new(UserId::new(100), Role::Customer);
pub const OTHER_CUSTOMER: Actor = Actor::new(UserId::new(101), Role::Customer);
pub const STAFF_A: Actor = Actor::new(UserId::new(1), Role::Staff);
pub const STAFF_B: Actor = Actor::new(UserId::new(2), Role::Staff);
pub const STAFF_C: Actor = Actor::new(UserId::new(3), Role::Staff);
pub const ADMIN: Actor = Actor::new(UserId::new(9), Role::Admin);

pub const NOW: OffsetDateTime = datetime!(2026-04-01 09:00 UTC);

/// Builds a ticket snapshot owned by `CUSTOMER` with the given ownership
/// and status.
pub fn ticket(owner: Option<UserId>, status: TicketStatus) -> TicketSnapshot {
    TicketSnapshot {
        id: TicketId::new(42),
        ticket_number: 1042,
        customer_id: CUSTOMER.id,
        category: String::from("billing"),
        subject: String::from("Wrong charge"),
        description: String::from("I was charged twice for order #88."),
        order_id: None,
        owner_id: owner,
        status,
        created_at: datetime!(2026-03-28 18:30 UTC),
        updated_at: datetime!(2026-03-30 10:00 UTC),
    }
}

/// Wraps a ticket into a context with no staff comment on record.
pub fn context(ticket: TicketSnapshot) -> TicketContext {
    TicketContext::new(ticket, None)
}

/// Wraps a ticket into a context whose last staff comment was posted at
/// the given instant.
pub fn context_with_staff_comment(
    ticket: TicketSnapshot,
    at: OffsetDateTime,
) -> TicketContext {
    TicketContext::new(ticket, Some(at))
}
