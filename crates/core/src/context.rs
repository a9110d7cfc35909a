// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use bistro_desk_domain::TicketSnapshot;
use time::OffsetDateTime;

/// Everything the engine needs to evaluate a command against one ticket.
///
/// The context is assembled from a single read immediately before the
/// command is applied. Tickets are independent units of concurrency, so no
/// cross-ticket state is ever loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketContext {
    /// The ticket row as last read.
    pub ticket: TicketSnapshot,
    /// Creation time of the most recent staff/admin comment, if any.
    /// Drives the customer reply window.
    pub last_staff_comment_at: Option<OffsetDateTime>,
}

impl TicketContext {
    /// Creates a context for a ticket with its reply-window input.
    #[must_use]
    pub const fn new(
        ticket: TicketSnapshot,
        last_staff_comment_at: Option<OffsetDateTime>,
    ) -> Self {
        Self {
            ticket,
            last_staff_comment_at,
        }
    }
}
