// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Command application: the ticket lifecycle and assignment engine.
//!
//! [`apply`] is a pure function from `(context, command, actor, now)` to a
//! [`Transition`]. It performs every role, ownership, window, and gate check,
//! then describes the writes the store must commit - including the
//! conditional guard that closes the claim race. It never touches the store
//! itself.

use crate::command::TicketCommand;
use crate::context::TicketContext;
use crate::error::CoreError;
use bistro_desk_domain::{
    Actor, ReplyWindow, Role, TicketAction, TicketSnapshot, TicketStatus, UserId,
    authorize_ticket_action, evaluate_reply_window, validate_comment_message,
    validate_feedback_fields, validate_feedback_submission, validate_reassign_target,
};
use time::OffsetDateTime;

/// The condition under which an ownership write may commit.
///
/// The engine's ownership check runs against a snapshot and is therefore
/// advisory; the guard is re-evaluated by the store inside the UPDATE's
/// `WHERE` clause so that a concurrent claim affects zero rows instead of
/// silently overwriting an established owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimGuard {
    /// Admin path: commit regardless of current ownership.
    Unconditional,
    /// Staff path: commit only while the row is still unowned, owned by the
    /// claimant, or in the contestable `Reopened` status.
    UnownedSelfOrReopened {
        /// The claiming staff member.
        claimant: UserId,
    },
}

/// A comment row to append, already validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    /// The authoring user.
    pub author_id: UserId,
    /// The author's role at posting time.
    pub author_role: Role,
    /// Display email snapshot.
    pub author_email: Option<String>,
    /// Trimmed message body.
    pub message: String,
}

/// The writes a successfully applied command requires.
///
/// Exactly one variant per command; the store translates each into its
/// row-level operations and reports conflicts where a guard fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Set ownership and status together under `guard`.
    Claim {
        /// The new owner.
        owner: UserId,
        /// The status to set alongside ownership.
        status: TicketStatus,
        /// The commit condition.
        guard: ClaimGuard,
    },
    /// Plain status change on the ticket row.
    StatusUpdate {
        /// The new status.
        status: TicketStatus,
    },
    /// Admin ownership transfer, optionally with a status change.
    Reassign {
        /// The new owner, or `None` to unassign.
        owner: Option<UserId>,
        /// Optional status to set in the same write.
        status: Option<TicketStatus>,
    },
    /// Customer comment; when `reopen` is set the same transaction must
    /// flip the ticket to `Reopened` and clear ownership, guarded on the
    /// row still being `Resolved`.
    CustomerReply {
        /// The comment to append.
        comment: NewComment,
        /// Whether the resolved-ticket auto-reopen fires.
        reopen: bool,
        /// The evaluated window, for response rendering.
        window: ReplyWindow,
    },
    /// Staff/admin comment; never changes status.
    AgentReply {
        /// The comment to append.
        comment: NewComment,
    },
    /// Feedback insert; uniqueness is enforced by the store.
    Feedback {
        /// Star rating, already validated to 1-5.
        stars: u8,
        /// Optional trimmed comment.
        comment: Option<String>,
    },
}

/// Applies a command to a ticket context on behalf of an actor.
///
/// # Arguments
///
/// * `ctx` - The ticket snapshot and reply-window input, freshly loaded
/// * `command` - The command to apply
/// * `actor` - The identity-resolved actor
/// * `now` - The evaluation instant (write-time reply-window checks are
///   authoritative, so the caller supplies the clock)
///
/// # Errors
///
/// Returns `CoreError::DomainViolation` when a role, ownership, window,
/// gate, or field rule rejects the command. No partial effects: a rejected
/// command produces no transition at all.
pub fn apply(
    ctx: &TicketContext,
    command: TicketCommand,
    actor: &Actor,
    now: OffsetDateTime,
) -> Result<Transition, CoreError> {
    let ticket: &TicketSnapshot = &ctx.ticket;

    match command {
        TicketCommand::Claim { explicit_status } => {
            authorize_ticket_action(actor, TicketAction::Claim, ticket)?;

            let status: TicketStatus = explicit_status.unwrap_or(TicketStatus::InProgress);
            let guard: ClaimGuard = if actor.role == Role::Admin {
                ClaimGuard::Unconditional
            } else {
                ClaimGuard::UnownedSelfOrReopened { claimant: actor.id }
            };

            Ok(Transition::Claim {
                owner: actor.id,
                status,
                guard,
            })
        }
        TicketCommand::UpdateStatus { status } => {
            authorize_ticket_action(actor, TicketAction::UpdateStatus, ticket)?;
            Ok(Transition::StatusUpdate { status })
        }
        TicketCommand::Reassign { target, status } => {
            authorize_ticket_action(actor, TicketAction::Reassign, ticket)?;
            validate_reassign_target(target.map(|(_, role)| role))?;

            Ok(Transition::Reassign {
                owner: target.map(|(id, _)| id),
                status,
            })
        }
        TicketCommand::CustomerReply {
            message,
            author_email,
        } => {
            if actor.role != Role::Customer || !ticket.is_customer(actor.id) {
                return Err(bistro_desk_domain::DomainError::NotTicketCustomer.into());
            }

            let window: ReplyWindow = evaluate_reply_window(ctx.last_staff_comment_at, now);
            if !window.open {
                // The deadline is always present when the window is closed.
                if let Some(deadline) = window.deadline {
                    return Err(
                        bistro_desk_domain::DomainError::ReplyWindowClosed { deadline }.into(),
                    );
                }
            }

            let message: String = validate_comment_message(&message)?;

            Ok(Transition::CustomerReply {
                comment: NewComment {
                    author_id: actor.id,
                    author_role: Role::Customer,
                    author_email,
                    message,
                },
                // Only a reply to a Resolved ticket reopens; replying to an
                // already-Reopened ticket must not re-trigger the clear.
                reopen: ticket.status == TicketStatus::Resolved,
                window,
            })
        }
        TicketCommand::AgentReply {
            message,
            author_email,
        } => {
            authorize_ticket_action(actor, TicketAction::Reply, ticket)?;
            let message: String = validate_comment_message(&message)?;

            Ok(Transition::AgentReply {
                comment: NewComment {
                    author_id: actor.id,
                    author_role: actor.role,
                    author_email,
                    message,
                },
            })
        }
        TicketCommand::SubmitFeedback { stars, comment } => {
            if actor.role != Role::Customer || !ticket.is_customer(actor.id) {
                return Err(bistro_desk_domain::DomainError::NotTicketCustomer.into());
            }

            validate_feedback_submission(ticket.status)?;
            validate_feedback_fields(stars, comment.as_deref())?;

            let stars: u8 = u8::try_from(stars)
                .map_err(|_| bistro_desk_domain::DomainError::InvalidStars { stars })?;
            let comment: Option<String> = comment
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(ToString::to_string);

            Ok(Transition::Feedback { stars, comment })
        }
    }
}
