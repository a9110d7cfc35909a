// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API handler functions for ticket operations.
//!
//! Every mutating handler follows the same shape: resolve the actor's
//! collection-level gate, load the ticket context with a single read, run
//! the engine's `apply`, execute the resulting transition through the
//! store (whose conditional writes re-check the race-prone parts), and
//! translate errors at this boundary.

use std::str::FromStr;

use bistro_desk::{TicketCommand, TicketContext, Transition, apply};
use bistro_desk_domain::{
    NewTicket, OrderId, ReplyWindow, Role, TicketStatus, UserId, evaluate_reply_window,
};
use bistro_desk_persistence::{
    CommentRow, Persistence, ProfileData, TicketRow, fmt_timestamp,
};
use time::OffsetDateTime;
use tracing::{info, warn};

use crate::auth::{AuthenticatedActor, AuthorizationService};
use crate::error::{
    ApiError, translate_core_error, translate_domain_error, translate_persistence_error,
};
use crate::request_response::{
    AssignableUserInfo, ClaimTicketRequest, CommentInfo, CreateStaffRequest, CreateTicketRequest,
    CustomerTicketDetailResponse, FeedbackInfo, FeedbackRequest, ListAssignableUsersResponse,
    ReassignTicketRequest, ReplyRequest, ReplyResponse, StaffTicketDetailResponse,
    StaffTicketInfo, SubmitFeedbackResponse, TicketActionResponse, TicketInfo,
    UpdateStatusRequest,
};

/// Loads a ticket visible to anyone on the support side.
fn load_ticket(persistence: &mut Persistence, ticket_id: i64) -> Result<TicketRow, ApiError> {
    persistence
        .get_ticket(ticket_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| ticket_not_found(ticket_id))
}

/// Loads a ticket scoped to the acting customer. A foreign ticket answers
/// exactly like a nonexistent one, so existence never leaks.
fn load_customer_ticket(
    persistence: &mut Persistence,
    ticket_id: i64,
    customer: UserId,
) -> Result<TicketRow, ApiError> {
    persistence
        .get_ticket_for_customer(ticket_id, customer.value())
        .map_err(translate_persistence_error)?
        .ok_or_else(|| ticket_not_found(ticket_id))
}

fn ticket_not_found(ticket_id: i64) -> ApiError {
    ApiError::ResourceNotFound {
        resource_type: String::from("Ticket"),
        message: format!("Ticket {ticket_id} does not exist"),
    }
}

/// Builds the engine context for a loaded row.
fn build_context(
    persistence: &mut Persistence,
    row: &TicketRow,
) -> Result<TicketContext, ApiError> {
    let snapshot = row.to_snapshot().map_err(translate_persistence_error)?;
    let last_staff_comment_at = persistence
        .last_staff_comment_at(row.ticket_id)
        .map_err(translate_persistence_error)?;
    Ok(TicketContext::new(snapshot, last_staff_comment_at))
}

/// Fetches a ticket's comments, degrading explicitly on failure: the
/// detail still renders, but with the `comments_unavailable` flag set and
/// a warning logged, never indistinguishable from an empty thread.
fn fetch_comments_degraded(
    persistence: &mut Persistence,
    ticket_id: i64,
) -> (Vec<CommentInfo>, bool) {
    match persistence.list_comments(ticket_id) {
        Ok(rows) => (rows.iter().map(CommentInfo::from_row).collect(), false),
        Err(e) => {
            warn!(ticket_id, error = %e, "Comment fetch failed; rendering detail without thread");
            (Vec::new(), true)
        }
    }
}

fn fetch_feedback(
    persistence: &mut Persistence,
    ticket_id: i64,
) -> Result<Option<FeedbackInfo>, ApiError> {
    Ok(persistence
        .get_feedback(ticket_id)
        .map_err(translate_persistence_error)?
        .as_ref()
        .map(FeedbackInfo::from_row))
}

fn parse_status(value: &str) -> Result<TicketStatus, ApiError> {
    TicketStatus::from_str(value).map_err(translate_domain_error)
}

// ============================================================================
// Customer operations
// ============================================================================

/// Creates a ticket on behalf of the acting customer.
///
/// If an order reference is supplied it must resolve to an order owned by
/// the same customer; linkage is validated here, at creation only.
///
/// # Errors
///
/// Returns an error if the actor is not a customer, a required field is
/// empty, the order reference does not resolve, or the insert fails.
pub fn create_ticket(
    persistence: &mut Persistence,
    request: &CreateTicketRequest,
    actor: &AuthenticatedActor,
    now: OffsetDateTime,
) -> Result<TicketInfo, ApiError> {
    AuthorizationService::require_customer(actor, "create_ticket")?;

    let new_ticket: NewTicket = NewTicket::new(
        actor.id,
        &request.category,
        &request.subject,
        &request.description,
        request.order_id.map(OrderId::new),
        request.customer_phone.as_deref(),
    )
    .map_err(translate_domain_error)?;

    if let Some(order_id) = request.order_id {
        let owned: bool = persistence
            .order_owned_by_customer(order_id, actor.id.value())
            .map_err(translate_persistence_error)?;
        if !owned {
            return Err(translate_domain_error(
                bistro_desk_domain::DomainError::InvalidOrderReference { order_id },
            ));
        }
    }

    let row: TicketRow = persistence
        .insert_ticket(&new_ticket, &actor.display_name, &actor.email, now)
        .map_err(translate_persistence_error)?;

    info!(
        ticket_id = row.ticket_id,
        ticket_number = row.ticket_number,
        customer_id = actor.id.value(),
        "Ticket created"
    );

    Ok(TicketInfo::from_row(&row))
}

/// Lists the acting customer's tickets, newest first.
///
/// # Errors
///
/// Returns an error if the actor is not a customer or the query fails.
pub fn list_my_tickets(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
) -> Result<Vec<TicketInfo>, ApiError> {
    AuthorizationService::require_customer(actor, "list_my_tickets")?;

    let rows: Vec<TicketRow> = persistence
        .list_tickets_for_customer(actor.id.value())
        .map_err(translate_persistence_error)?;

    Ok(rows.iter().map(TicketInfo::from_row).collect())
}

/// Assembles the customer's view of one ticket: the thread, the reply
/// window (advisory; re-checked at write time), and any feedback.
///
/// # Errors
///
/// Returns an error if the actor is not a customer or the ticket is not
/// theirs (reported identically to a nonexistent one).
pub fn get_my_ticket_detail(
    persistence: &mut Persistence,
    ticket_id: i64,
    actor: &AuthenticatedActor,
    now: OffsetDateTime,
) -> Result<CustomerTicketDetailResponse, ApiError> {
    AuthorizationService::require_customer(actor, "get_my_ticket_detail")?;

    let row: TicketRow = load_customer_ticket(persistence, ticket_id, actor.id)?;

    let last_staff_comment_at = persistence
        .last_staff_comment_at(ticket_id)
        .map_err(translate_persistence_error)?;
    let window: ReplyWindow = evaluate_reply_window(last_staff_comment_at, now);
    let reply_deadline: Option<String> = window
        .deadline
        .map(fmt_timestamp)
        .transpose()
        .map_err(translate_persistence_error)?;

    let (comments, comments_unavailable) = fetch_comments_degraded(persistence, ticket_id);
    let feedback: Option<FeedbackInfo> = fetch_feedback(persistence, ticket_id)?;

    Ok(CustomerTicketDetailResponse {
        ticket: TicketInfo::from_row(&row),
        description: row.description,
        comments,
        comments_unavailable,
        allow_customer_reply: window.open,
        reply_deadline,
        feedback,
    })
}

/// Posts a customer reply, reopening a resolved ticket in the same store
/// transaction when applicable.
///
/// # Errors
///
/// Returns an error if the ticket is not the actor's, the reply window has
/// closed, the message is empty, or the writes fail.
pub fn customer_reply(
    persistence: &mut Persistence,
    ticket_id: i64,
    request: &ReplyRequest,
    actor: &AuthenticatedActor,
    now: OffsetDateTime,
) -> Result<ReplyResponse, ApiError> {
    AuthorizationService::require_customer(actor, "customer_reply")?;

    let row: TicketRow = load_customer_ticket(persistence, ticket_id, actor.id)?;
    let ctx: TicketContext = build_context(persistence, &row)?;

    let transition: Transition = apply(
        &ctx,
        TicketCommand::CustomerReply {
            message: request.message.clone(),
            author_email: Some(actor.email.clone()),
        },
        &actor.to_actor(),
        now,
    )
    .map_err(translate_core_error)?;

    let Transition::CustomerReply {
        comment, reopen, ..
    } = transition
    else {
        return Err(ApiError::Internal {
            message: String::from("Engine produced an unexpected transition for a reply"),
        });
    };

    let comment_row: CommentRow = persistence
        .insert_customer_reply(ticket_id, &comment, reopen, now)
        .map_err(translate_persistence_error)?;
    let updated: TicketRow = load_customer_ticket(persistence, ticket_id, actor.id)?;

    if reopen {
        info!(ticket_id, "Customer reply reopened ticket");
    }

    Ok(ReplyResponse {
        comment: CommentInfo::from_row(&comment_row),
        ticket: TicketInfo::from_row(&updated),
        reopened: reopen,
    })
}

/// Submits feedback for a resolved ticket.
///
/// # Errors
///
/// Returns an error if the ticket is not the actor's, the ticket is not
/// resolved (re-read here, at submission time), the rating is out of
/// range, or feedback already exists (conflict).
pub fn submit_feedback(
    persistence: &mut Persistence,
    ticket_id: i64,
    request: &FeedbackRequest,
    actor: &AuthenticatedActor,
    now: OffsetDateTime,
) -> Result<SubmitFeedbackResponse, ApiError> {
    AuthorizationService::require_customer(actor, "submit_feedback")?;

    let row: TicketRow = load_customer_ticket(persistence, ticket_id, actor.id)?;
    let ctx: TicketContext = build_context(persistence, &row)?;

    let transition: Transition = apply(
        &ctx,
        TicketCommand::SubmitFeedback {
            stars: request.stars,
            comment: request.comment.clone(),
        },
        &actor.to_actor(),
        now,
    )
    .map_err(translate_core_error)?;

    let Transition::Feedback { stars, comment } = transition else {
        return Err(ApiError::Internal {
            message: String::from("Engine produced an unexpected transition for feedback"),
        });
    };

    let feedback_row = persistence
        .insert_feedback(ticket_id, stars, comment.as_deref(), now)
        .map_err(translate_persistence_error)?;

    Ok(SubmitFeedbackResponse {
        feedback: FeedbackInfo::from_row(&feedback_row),
        message: String::from("Thank you for your feedback"),
    })
}

// ============================================================================
// Staff/admin operations
// ============================================================================

/// Lists all tickets, newest first.
///
/// # Errors
///
/// Returns an error if the actor is a customer or the query fails.
pub fn list_tickets(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
) -> Result<Vec<StaffTicketInfo>, ApiError> {
    AuthorizationService::require_agent(actor, "list_tickets")?;

    let rows: Vec<TicketRow> = persistence
        .list_tickets()
        .map_err(translate_persistence_error)?;

    Ok(rows.iter().map(StaffTicketInfo::from_row).collect())
}

/// Assembles the staff view of one ticket.
///
/// # Errors
///
/// Returns an error if the actor is a customer or the ticket does not
/// exist.
pub fn get_ticket_detail(
    persistence: &mut Persistence,
    ticket_id: i64,
    actor: &AuthenticatedActor,
) -> Result<StaffTicketDetailResponse, ApiError> {
    AuthorizationService::require_agent(actor, "get_ticket_detail")?;

    let row: TicketRow = load_ticket(persistence, ticket_id)?;
    let (comments, comments_unavailable) = fetch_comments_degraded(persistence, ticket_id);
    let feedback: Option<FeedbackInfo> = fetch_feedback(persistence, ticket_id)?;

    Ok(StaffTicketDetailResponse {
        ticket: StaffTicketInfo::from_row(&row),
        comments,
        comments_unavailable,
        feedback,
    })
}

/// Posts a support-side reply on a claimed ticket.
///
/// # Errors
///
/// Returns an error if the actor does not own the ticket (and is not an
/// admin), the message is empty, or the writes fail.
pub fn agent_reply(
    persistence: &mut Persistence,
    ticket_id: i64,
    request: &ReplyRequest,
    actor: &AuthenticatedActor,
    now: OffsetDateTime,
) -> Result<ReplyResponse, ApiError> {
    AuthorizationService::require_agent(actor, "agent_reply")?;

    let row: TicketRow = load_ticket(persistence, ticket_id)?;
    let ctx: TicketContext = build_context(persistence, &row)?;

    let transition: Transition = apply(
        &ctx,
        TicketCommand::AgentReply {
            message: request.message.clone(),
            author_email: Some(actor.email.clone()),
        },
        &actor.to_actor(),
        now,
    )
    .map_err(translate_core_error)?;

    let Transition::AgentReply { comment } = transition else {
        return Err(ApiError::Internal {
            message: String::from("Engine produced an unexpected transition for a reply"),
        });
    };

    let comment_row: CommentRow = persistence
        .insert_agent_comment(ticket_id, &comment, now)
        .map_err(translate_persistence_error)?;
    let updated: TicketRow = load_ticket(persistence, ticket_id)?;

    Ok(ReplyResponse {
        comment: CommentInfo::from_row(&comment_row),
        ticket: TicketInfo::from_row(&updated),
        reopened: false,
    })
}

/// Claims a ticket for the acting staff/admin user.
///
/// The engine's ownership check is advisory; the store re-checks the claim
/// guard inside the UPDATE, so a lost race surfaces as a conflict and the
/// caller is told to retry.
///
/// # Errors
///
/// Returns an error if the actor is a customer, the explicit status is
/// unrecognized, the ticket is actively owned by another staff member, or
/// a concurrent claim won.
pub fn claim_ticket(
    persistence: &mut Persistence,
    ticket_id: i64,
    request: &ClaimTicketRequest,
    actor: &AuthenticatedActor,
    now: OffsetDateTime,
) -> Result<TicketActionResponse, ApiError> {
    AuthorizationService::require_agent(actor, "claim_ticket")?;

    let explicit_status: Option<TicketStatus> = request
        .status
        .as_deref()
        .map(parse_status)
        .transpose()?;

    let row: TicketRow = load_ticket(persistence, ticket_id)?;
    let ctx: TicketContext = build_context(persistence, &row)?;

    let transition: Transition = apply(
        &ctx,
        TicketCommand::Claim { explicit_status },
        &actor.to_actor(),
        now,
    )
    .map_err(translate_core_error)?;

    let Transition::Claim {
        owner,
        status,
        guard,
    } = transition
    else {
        return Err(ApiError::Internal {
            message: String::from("Engine produced an unexpected transition for a claim"),
        });
    };

    let updated: TicketRow = persistence
        .claim_ticket(ticket_id, owner.value(), status, guard, now)
        .map_err(translate_persistence_error)?;

    info!(
        ticket_id,
        owner_id = owner.value(),
        status = status.as_str(),
        "Ticket claimed"
    );

    Ok(TicketActionResponse {
        ticket: StaffTicketInfo::from_row(&updated),
        message: format!("Ticket {} assigned to you", updated.ticket_number),
    })
}

/// Updates a ticket's status.
///
/// # Errors
///
/// Returns an error if the actor is a customer, does not own the ticket
/// (and is not an admin), or the status string is unrecognized.
pub fn update_status(
    persistence: &mut Persistence,
    ticket_id: i64,
    request: &UpdateStatusRequest,
    actor: &AuthenticatedActor,
    now: OffsetDateTime,
) -> Result<TicketActionResponse, ApiError> {
    AuthorizationService::require_agent(actor, "update_status")?;

    let status: TicketStatus = parse_status(&request.status)?;

    let row: TicketRow = load_ticket(persistence, ticket_id)?;
    let ctx: TicketContext = build_context(persistence, &row)?;

    let transition: Transition = apply(
        &ctx,
        TicketCommand::UpdateStatus { status },
        &actor.to_actor(),
        now,
    )
    .map_err(translate_core_error)?;

    let Transition::StatusUpdate { status } = transition else {
        return Err(ApiError::Internal {
            message: String::from("Engine produced an unexpected transition for a status update"),
        });
    };

    let updated: TicketRow = persistence
        .update_ticket_status(ticket_id, status, now)
        .map_err(translate_persistence_error)?;

    Ok(TicketActionResponse {
        ticket: StaffTicketInfo::from_row(&updated),
        message: format!(
            "Ticket {} status set to {}",
            updated.ticket_number, updated.status
        ),
    })
}

/// Reassigns or unassigns a ticket (admin only).
///
/// The target, if present, is resolved to a profile here so the engine can
/// validate its role without a directory lookup of its own.
///
/// # Errors
///
/// Returns an error if the actor is not an admin, the target profile does
/// not exist or is a customer, or the status string is unrecognized.
pub fn reassign_ticket(
    persistence: &mut Persistence,
    ticket_id: i64,
    request: &ReassignTicketRequest,
    actor: &AuthenticatedActor,
    now: OffsetDateTime,
) -> Result<TicketActionResponse, ApiError> {
    AuthorizationService::require_admin(actor, "reassign_ticket")?;

    let status: Option<TicketStatus> = request
        .status
        .as_deref()
        .map(parse_status)
        .transpose()?;

    let target: Option<(UserId, Role)> = match request.owner_id {
        None => None,
        Some(owner_id) => {
            let profile: ProfileData = persistence
                .get_profile_by_id(owner_id)
                .map_err(translate_persistence_error)?
                .ok_or_else(|| ApiError::InvalidInput {
                    field: String::from("owner_id"),
                    message: format!("No profile with ID {owner_id}"),
                })?;
            let role: Role = profile
                .parsed_role()
                .map_err(translate_persistence_error)?;
            Some((UserId::new(owner_id), role))
        }
    };

    let row: TicketRow = load_ticket(persistence, ticket_id)?;
    let ctx: TicketContext = build_context(persistence, &row)?;

    let transition: Transition = apply(
        &ctx,
        TicketCommand::Reassign { target, status },
        &actor.to_actor(),
        now,
    )
    .map_err(translate_core_error)?;

    let Transition::Reassign { owner, status } = transition else {
        return Err(ApiError::Internal {
            message: String::from("Engine produced an unexpected transition for a reassignment"),
        });
    };

    let updated: TicketRow = persistence
        .reassign_ticket(ticket_id, owner.map(|o| o.value()), status, now)
        .map_err(translate_persistence_error)?;

    let message: String = match updated.owner_id {
        Some(owner_id) => format!("Ticket {} assigned to {owner_id}", updated.ticket_number),
        None => format!("Ticket {} unassigned", updated.ticket_number),
    };

    Ok(TicketActionResponse {
        ticket: StaffTicketInfo::from_row(&updated),
        message,
    })
}

/// Lists profiles eligible to own tickets (admin only).
///
/// # Errors
///
/// Returns an error if the actor is not an admin or the query fails.
pub fn list_assignable_users(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
) -> Result<ListAssignableUsersResponse, ApiError> {
    AuthorizationService::require_admin(actor, "list_assignable_users")?;

    let profiles: Vec<ProfileData> = persistence
        .list_assignable_profiles()
        .map_err(translate_persistence_error)?;

    Ok(ListAssignableUsersResponse {
        users: profiles.iter().map(AssignableUserInfo::from_profile).collect(),
    })
}

/// Provisions a staff or admin account (admin only).
///
/// # Errors
///
/// Returns an error if the actor is not an admin, the role is not staff or
/// admin, a field fails validation, or the email is already registered.
pub fn create_staff_profile(
    persistence: &mut Persistence,
    request: &CreateStaffRequest,
    actor: &AuthenticatedActor,
) -> Result<AssignableUserInfo, ApiError> {
    AuthorizationService::require_admin(actor, "create_staff_profile")?;

    let role: Role = Role::from_str(&request.role).map_err(translate_domain_error)?;
    if !role.is_agent() {
        return Err(ApiError::InvalidInput {
            field: String::from("role"),
            message: String::from("Role must be 'staff' or 'admin'"),
        });
    }

    let display_name: String = bistro_desk_domain::require_non_empty("name", &request.name)
        .map_err(translate_domain_error)?;
    let email: String = bistro_desk_domain::normalize_email(&request.email)
        .map_err(translate_domain_error)?;

    crate::password_policy::PasswordPolicy::default().validate(
        &request.password,
        &email,
        &display_name,
    )?;

    let profile_id: i64 = persistence
        .create_profile(&email, &display_name, None, &request.password, role.as_str())
        .map_err(translate_persistence_error)?;

    let profile: ProfileData = persistence
        .get_profile_by_id(profile_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| ApiError::Internal {
            message: String::from("Profile disappeared after creation"),
        })?;

    info!(profile_id, role = role.as_str(), "Provisioned support account");

    Ok(AssignableUserInfo::from_profile(&profile))
}
