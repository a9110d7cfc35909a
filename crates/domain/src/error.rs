// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::status::TicketStatus;
use crate::types::Role;
use time::OffsetDateTime;

/// Errors that can occur during domain validation and rule evaluation.
///
/// Validation failures and permission denials are separate variants so the
/// API layer can report "bad request" and "forbidden" distinctly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A required field is empty or whitespace-only.
    EmptyField {
        /// The field name.
        field: &'static str,
    },
    /// A field exceeds its maximum length.
    FieldTooLong {
        /// The field name.
        field: &'static str,
        /// The maximum number of characters permitted.
        max: usize,
    },
    /// The email address is malformed.
    InvalidEmail(String),
    /// The status string is not one of the recognized ticket statuses.
    InvalidStatus(String),
    /// The role string is not one of the recognized roles.
    InvalidRole(String),
    /// The star rating is outside the permitted 1-5 range.
    InvalidStars {
        /// The rejected rating value.
        stars: i32,
    },
    /// The referenced order does not exist or belongs to another customer.
    InvalidOrderReference {
        /// The rejected order identifier.
        order_id: i64,
    },
    /// A ticket owner must hold the staff or admin role.
    OwnerMustBeAgent {
        /// The role of the rejected assignment target.
        role: Role,
    },
    /// The actor's role does not permit this action at all.
    RoleNotPermitted {
        /// The action that was attempted.
        action: &'static str,
        /// The actor's role.
        role: Role,
    },
    /// The ticket does not belong to the acting customer.
    NotTicketCustomer,
    /// A staff actor must claim the ticket before acting on it.
    MustClaimFirst,
    /// The ticket is actively owned by another staff member and not reopened.
    OwnedByAnotherAgent,
    /// The customer reply window has closed.
    ReplyWindowClosed {
        /// The deadline that has passed.
        deadline: OffsetDateTime,
    },
    /// Feedback may only be submitted while the ticket is resolved.
    FeedbackNotResolved {
        /// The ticket's current status.
        status: TicketStatus,
    },
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyField { field } => write!(f, "Field '{field}' must not be empty"),
            Self::FieldTooLong { field, max } => {
                write!(f, "Field '{field}' exceeds the maximum of {max} characters")
            }
            Self::InvalidEmail(email) => write!(f, "Invalid email address: '{email}'"),
            Self::InvalidStatus(status) => write!(f, "Invalid ticket status: '{status}'"),
            Self::InvalidRole(role) => write!(f, "Invalid role: '{role}'"),
            Self::InvalidStars { stars } => {
                write!(f, "Star rating must be between 1 and 5, got {stars}")
            }
            Self::InvalidOrderReference { order_id } => {
                write!(f, "Order {order_id} does not exist for this customer")
            }
            Self::OwnerMustBeAgent { role } => {
                write!(f, "Ticket owner must be staff or admin, got role '{role}'")
            }
            Self::RoleNotPermitted { action, role } => {
                write!(f, "Role '{role}' is not permitted to {action}")
            }
            Self::NotTicketCustomer => write!(f, "Ticket does not belong to this customer"),
            Self::MustClaimFirst => {
                write!(f, "Ticket must be claimed before it can be acted on")
            }
            Self::OwnedByAnotherAgent => {
                write!(f, "Ticket is already assigned to another staff member")
            }
            Self::ReplyWindowClosed { deadline } => {
                write!(f, "The reply window closed at {deadline}")
            }
            Self::FeedbackNotResolved { status } => {
                write!(
                    f,
                    "Feedback can only be submitted for resolved tickets (current status: {status})"
                )
            }
        }
    }
}

impl std::error::Error for DomainError {}
