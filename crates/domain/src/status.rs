// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Ticket status values and parsing.
//!
//! The status set is closed: every mutation path parses incoming strings
//! through [`TicketStatus::from_str`], so an unrecognized value is rejected
//! before any row is touched. There is no terminal state; a resolved ticket
//! can always be reopened by a qualifying customer reply, and staff move
//! freely between the six values on tickets they own.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Lifecycle status of a support ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TicketStatus {
    /// Freshly filed by a customer; not yet looked at.
    New,
    /// Picked up for triage.
    #[serde(rename = "Pending Review")]
    PendingReview,
    /// Support is waiting on the customer.
    #[serde(rename = "Waiting Customer Response")]
    WaitingCustomerResponse,
    /// Actively being worked by its owner.
    #[serde(rename = "In Progress")]
    InProgress,
    /// Support considers the issue addressed.
    Resolved,
    /// A customer reply brought the ticket back into the queue.
    Reopened,
}

impl TicketStatus {
    /// Returns the display string used in persistence and API payloads.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::New => "New",
            Self::PendingReview => "Pending Review",
            Self::WaitingCustomerResponse => "Waiting Customer Response",
            Self::InProgress => "In Progress",
            Self::Resolved => "Resolved",
            Self::Reopened => "Reopened",
        }
    }

    /// Returns true if feedback may currently be submitted.
    #[must_use]
    pub const fn accepts_feedback(&self) -> bool {
        matches!(self, Self::Resolved)
    }

    /// Returns true if the ticket is contestable by any staff member
    /// regardless of current ownership.
    #[must_use]
    pub const fn is_contestable(&self) -> bool {
        matches!(self, Self::Reopened)
    }
}

impl FromStr for TicketStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "New" => Ok(Self::New),
            "Pending Review" => Ok(Self::PendingReview),
            "Waiting Customer Response" => Ok(Self::WaitingCustomerResponse),
            "In Progress" => Ok(Self::InProgress),
            "Resolved" => Ok(Self::Resolved),
            "Reopened" => Ok(Self::Reopened),
            _ => Err(DomainError::InvalidStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [TicketStatus; 6] = [
        TicketStatus::New,
        TicketStatus::PendingReview,
        TicketStatus::WaitingCustomerResponse,
        TicketStatus::InProgress,
        TicketStatus::Resolved,
        TicketStatus::Reopened,
    ];

    #[test]
    fn test_status_string_round_trip() {
        for status in ALL {
            let s = status.as_str();
            match TicketStatus::from_str(s) {
                Ok(parsed) => assert_eq!(status, parsed),
                Err(e) => panic!("Failed to parse status string: {s}: {e}"),
            }
        }
    }

    #[test]
    fn test_unrecognized_status_rejected() {
        for bad in ["Closed", "resolved", "IN PROGRESS", "", "Escalated"] {
            let result = TicketStatus::from_str(bad);
            assert!(result.is_err(), "'{bad}' should be rejected");
        }
    }

    #[test]
    fn test_only_resolved_accepts_feedback() {
        for status in ALL {
            assert_eq!(
                status.accepts_feedback(),
                status == TicketStatus::Resolved,
                "feedback acceptance wrong for {status}"
            );
        }
    }

    #[test]
    fn test_only_reopened_is_contestable() {
        for status in ALL {
            assert_eq!(status.is_contestable(), status == TicketStatus::Reopened);
        }
    }
}
