// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The ticket access matrix.
//!
//! All staff-side authorization decisions flow through one predicate,
//! [`authorize_ticket_action`], evaluated against a ticket snapshot before
//! every mutation. Ownership is advisory at this point; the store's
//! conditional writes close the read-to-write race for claims.
//!
//! Rules, in evaluation order:
//!
//! 1. Admins may always claim, reassign, or act on any ticket.
//! 2. A staff member who owns the ticket may act on it.
//! 3. A staff member may claim an unowned ticket (first writer wins).
//! 4. A staff member may claim a ticket owned by someone else only while
//!    its status is `Reopened` (reopened tickets are back in the queue).
//! 5. Any other staff status-update or reply is denied: claim first.
//! 6. Reassignment targets must hold the staff or admin role.

use crate::error::DomainError;
use crate::ticket::TicketSnapshot;
use crate::types::{Actor, Role};

/// Staff-side actions gated by the access matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketAction {
    /// Take ownership of the ticket (self-assign).
    Claim,
    /// Change the ticket's status.
    UpdateStatus,
    /// Post a support-side comment.
    Reply,
    /// Transfer or clear ownership (admin only).
    Reassign,
}

impl TicketAction {
    /// Returns the action name used in denial messages and log fields.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Claim => "claim this ticket",
            Self::UpdateStatus => "update the ticket status",
            Self::Reply => "reply to this ticket",
            Self::Reassign => "reassign this ticket",
        }
    }
}

/// Decides whether `actor` may perform `action` on the ticket as captured
/// by `ticket`.
///
/// # Errors
///
/// Returns a `DomainError` describing the denial:
///
/// * `RoleNotPermitted` - customers (and, for reassignment, staff) are
///   outside the matrix entirely
/// * `OwnedByAnotherAgent` - claim on an actively owned, non-reopened ticket
/// * `MustClaimFirst` - status update or reply on an unclaimed or
///   foreign-owned ticket
pub fn authorize_ticket_action(
    actor: &Actor,
    action: TicketAction,
    ticket: &TicketSnapshot,
) -> Result<(), DomainError> {
    // Rule 1: admins bypass ownership entirely.
    if actor.role == Role::Admin {
        return Ok(());
    }

    if actor.role != Role::Staff {
        return Err(DomainError::RoleNotPermitted {
            action: action.as_str(),
            role: actor.role,
        });
    }

    match action {
        TicketAction::Reassign => Err(DomainError::RoleNotPermitted {
            action: action.as_str(),
            role: actor.role,
        }),
        TicketAction::Claim => match ticket.owner_id {
            // Rule 3: unowned tickets are claimable, first writer wins.
            None => Ok(()),
            // Rule 2: re-claiming your own ticket is a no-op-level action.
            Some(owner) if owner == actor.id => Ok(()),
            // Rule 4: reopened tickets are contestable regardless of owner.
            Some(_) if ticket.status.is_contestable() => Ok(()),
            Some(_) => Err(DomainError::OwnedByAnotherAgent),
        },
        TicketAction::UpdateStatus | TicketAction::Reply => {
            // Rule 2; everything else is rule 5.
            if ticket.is_owned_by(actor.id) {
                Ok(())
            } else {
                Err(DomainError::MustClaimFirst)
            }
        }
    }
}

/// Validates an admin reassignment target (rule 6).
///
/// `None` clears ownership and is always acceptable.
///
/// # Errors
///
/// Returns `DomainError::OwnerMustBeAgent` if the target holds the
/// customer role.
pub fn validate_reassign_target(target_role: Option<Role>) -> Result<(), DomainError> {
    match target_role {
        None => Ok(()),
        Some(role) if role.is_agent() => Ok(()),
        Some(role) => Err(DomainError::OwnerMustBeAgent { role }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::TicketStatus;
    use crate::types::{TicketId, UserId};
    use time::macros::datetime;

    fn ticket(owner: Option<i64>, status: TicketStatus) -> TicketSnapshot {
        TicketSnapshot {
            id: TicketId::new(1),
            ticket_number: 1001,
            customer_id: UserId::new(100),
            category: String::from("billing"),
            subject: String::from("Wrong charge"),
            description: String::from("Charged twice"),
            order_id: None,
            owner_id: owner.map(UserId::new),
            status,
            created_at: datetime!(2026-01-05 12:00 UTC),
            updated_at: datetime!(2026-01-05 12:00 UTC),
        }
    }

    const STAFF_A: Actor = Actor::new(UserId::new(1), Role::Staff);
    const STAFF_B: Actor = Actor::new(UserId::new(2), Role::Staff);
    const ADMIN: Actor = Actor::new(UserId::new(3), Role::Admin);
    const CUSTOMER: Actor = Actor::new(UserId::new(100), Role::Customer);

    #[test]
    fn test_admin_may_do_anything() {
        let owned = ticket(Some(1), TicketStatus::InProgress);
        for action in [
            TicketAction::Claim,
            TicketAction::UpdateStatus,
            TicketAction::Reply,
            TicketAction::Reassign,
        ] {
            assert!(authorize_ticket_action(&ADMIN, action, &owned).is_ok());
        }
    }

    #[test]
    fn test_staff_claims_unowned_ticket() {
        let unowned = ticket(None, TicketStatus::New);
        assert!(authorize_ticket_action(&STAFF_A, TicketAction::Claim, &unowned).is_ok());
    }

    #[test]
    fn test_staff_cannot_claim_foreign_owned_ticket() {
        let owned = ticket(Some(1), TicketStatus::InProgress);
        let result = authorize_ticket_action(&STAFF_B, TicketAction::Claim, &owned);
        assert_eq!(result, Err(DomainError::OwnedByAnotherAgent));
    }

    #[test]
    fn test_staff_claims_reopened_ticket_despite_owner() {
        let reopened = ticket(Some(1), TicketStatus::Reopened);
        assert!(authorize_ticket_action(&STAFF_B, TicketAction::Claim, &reopened).is_ok());
    }

    #[test]
    fn test_owner_may_update_and_reply() {
        let owned = ticket(Some(1), TicketStatus::InProgress);
        assert!(authorize_ticket_action(&STAFF_A, TicketAction::UpdateStatus, &owned).is_ok());
        assert!(authorize_ticket_action(&STAFF_A, TicketAction::Reply, &owned).is_ok());
    }

    #[test]
    fn test_non_owner_must_claim_first() {
        let owned = ticket(Some(1), TicketStatus::InProgress);
        let unowned = ticket(None, TicketStatus::New);
        for t in [&owned, &unowned] {
            assert_eq!(
                authorize_ticket_action(&STAFF_B, TicketAction::UpdateStatus, t),
                Err(DomainError::MustClaimFirst)
            );
            assert_eq!(
                authorize_ticket_action(&STAFF_B, TicketAction::Reply, t),
                Err(DomainError::MustClaimFirst)
            );
        }
    }

    #[test]
    fn test_staff_cannot_reassign() {
        let unowned = ticket(None, TicketStatus::New);
        let result = authorize_ticket_action(&STAFF_A, TicketAction::Reassign, &unowned);
        assert!(matches!(result, Err(DomainError::RoleNotPermitted { .. })));
    }

    #[test]
    fn test_customer_is_outside_the_matrix() {
        let unowned = ticket(None, TicketStatus::New);
        for action in [
            TicketAction::Claim,
            TicketAction::UpdateStatus,
            TicketAction::Reply,
            TicketAction::Reassign,
        ] {
            let result = authorize_ticket_action(&CUSTOMER, action, &unowned);
            assert!(matches!(result, Err(DomainError::RoleNotPermitted { .. })));
        }
    }

    #[test]
    fn test_reassign_target_roles() {
        assert!(validate_reassign_target(None).is_ok());
        assert!(validate_reassign_target(Some(Role::Staff)).is_ok());
        assert!(validate_reassign_target(Some(Role::Admin)).is_ok());
        assert_eq!(
            validate_reassign_target(Some(Role::Customer)),
            Err(DomainError::OwnerMustBeAgent {
                role: Role::Customer
            })
        );
    }
}
