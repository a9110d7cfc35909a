// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Ticket snapshot and creation types.

use crate::error::DomainError;
use crate::status::TicketStatus;
use crate::types::{OrderId, TicketId, UserId};
use crate::validation::require_non_empty;
use time::OffsetDateTime;

/// Maximum characters accepted for the free-text description.
const DESCRIPTION_MAX_CHARS: usize = 4000;

/// A point-in-time image of a ticket row.
///
/// Every rule evaluation runs against a snapshot loaded immediately before
/// the mutation; the store re-checks the race-prone parts (ownership, the
/// resolved-reopen guard) with conditional writes at commit time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketSnapshot {
    /// The canonical ticket identifier.
    pub id: TicketId,
    /// The human-facing ticket number, assigned once at creation.
    pub ticket_number: i64,
    /// The filing customer. Immutable.
    pub customer_id: UserId,
    /// Issue category chosen at creation.
    pub category: String,
    /// One-line summary.
    pub subject: String,
    /// Free-text description.
    pub description: String,
    /// Optional association with a prior order of the same customer.
    pub order_id: Option<OrderId>,
    /// The staff/admin user currently responsible, if any.
    pub owner_id: Option<UserId>,
    /// Current lifecycle status.
    pub status: TicketStatus,
    /// Server-assigned creation timestamp.
    pub created_at: OffsetDateTime,
    /// Refreshed on every mutation.
    pub updated_at: OffsetDateTime,
}

impl TicketSnapshot {
    /// Returns true if the given user is the ticket's owning customer.
    #[must_use]
    pub fn is_customer(&self, user: UserId) -> bool {
        self.customer_id == user
    }

    /// Returns true if the given user currently owns the ticket.
    #[must_use]
    pub fn is_owned_by(&self, user: UserId) -> bool {
        self.owner_id == Some(user)
    }
}

/// Validated input for ticket creation.
///
/// Construction trims and validates the required text fields; the order
/// reference, if present, must still be resolved against the store by the
/// caller before the insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTicket {
    /// The filing customer.
    pub customer_id: UserId,
    /// Issue category.
    pub category: String,
    /// One-line summary.
    pub subject: String,
    /// Free-text description.
    pub description: String,
    /// Optional order association, not yet ownership-checked.
    pub order_id: Option<OrderId>,
    /// Optional contact phone captured with the ticket.
    pub customer_phone: Option<String>,
}

impl NewTicket {
    /// Builds a validated `NewTicket`.
    ///
    /// # Errors
    ///
    /// Returns an error if category, subject, or description is empty after
    /// trimming, or the description exceeds its maximum length.
    pub fn new(
        customer_id: UserId,
        category: &str,
        subject: &str,
        description: &str,
        order_id: Option<OrderId>,
        customer_phone: Option<&str>,
    ) -> Result<Self, DomainError> {
        let category: String = require_non_empty("category", category)?;
        let subject: String = require_non_empty("subject", subject)?;
        let description: String = require_non_empty("description", description)?;
        crate::validation::require_max_chars("description", &description, DESCRIPTION_MAX_CHARS)?;

        let customer_phone: Option<String> = customer_phone
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(ToString::to_string);

        Ok(Self {
            customer_id,
            category,
            subject,
            description,
            order_id,
            customer_phone,
        })
    }
}
