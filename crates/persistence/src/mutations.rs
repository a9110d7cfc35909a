// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Write-side mutations.
//!
//! Ownership-sensitive writes are conditional: the claim UPDATE carries the
//! engine's guard in its `WHERE` clause, and the customer-reply reopen is
//! guarded on the row still being `Resolved`. A guarded write that matches
//! zero rows is reported as a conflict, never retried here and never applied
//! over a concurrently established owner.

use crate::data_models::{CommentRow, FeedbackRow, TicketRow, fmt_timestamp};
use crate::diesel_schema::{orders, profiles, sessions, ticket_comments, ticket_feedback, tickets};
use crate::error::PersistenceError;
use crate::queries;
use bistro_desk::{ClaimGuard, NewComment};
use bistro_desk_domain::{NewTicket, TicketStatus};
use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::result::DatabaseErrorKind;
use diesel::sql_types::BigInt;
use time::OffsetDateTime;
use tracing::{debug, info};

/// Helper function to get the last inserted row ID.
///
/// `SQLite` doesn't support `RETURNING` clauses in all contexts,
/// so we must query `last_insert_rowid()`.
///
/// # Errors
///
/// Returns an error if the query fails.
fn get_last_insert_rowid(conn: &mut SqliteConnection) -> Result<i64, PersistenceError> {
    Ok(diesel::select(sql::<BigInt>("last_insert_rowid()")).get_result(conn)?)
}

/// First human-facing ticket number minus one; numbering starts at 1001.
const TICKET_NUMBER_FLOOR: i64 = 1000;

// ============================================================================
// Profiles & sessions
// ============================================================================

/// Creates a new profile with a bcrypt-hashed password.
///
/// # Errors
///
/// Returns `DuplicateEmail` if the email is already registered, or another
/// error if hashing or the insert fails.
pub fn create_profile(
    conn: &mut SqliteConnection,
    email: &str,
    display_name: &str,
    phone: Option<&str>,
    password: &str,
    role: &str,
) -> Result<i64, PersistenceError> {
    info!(email, role, "Creating profile");

    let password_hash: String = bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|e| PersistenceError::Other(format!("Failed to hash password: {e}")))?;

    let result = diesel::insert_into(profiles::table)
        .values((
            profiles::email.eq(email),
            profiles::display_name.eq(display_name),
            profiles::phone.eq(phone),
            profiles::password_hash.eq(&password_hash),
            profiles::role.eq(role),
        ))
        .execute(conn);

    match result {
        Ok(_) => {}
        Err(diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
            return Err(PersistenceError::DuplicateEmail(email.to_string()));
        }
        Err(e) => return Err(e.into()),
    }

    let profile_id: i64 = get_last_insert_rowid(conn)?;
    info!(profile_id, "Profile created");
    Ok(profile_id)
}

/// Verifies a password against a stored hash.
///
/// # Errors
///
/// Returns an error if the stored hash is malformed.
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, PersistenceError> {
    bcrypt::verify(password, password_hash)
        .map_err(|e| PersistenceError::Other(format!("Failed to verify password: {e}")))
}

/// Updates the last login timestamp for a profile.
///
/// # Errors
///
/// Returns an error if the database update fails.
pub fn update_last_login(
    conn: &mut SqliteConnection,
    profile_id: i64,
    now: OffsetDateTime,
) -> Result<(), PersistenceError> {
    debug!(profile_id, "Updating last_login_at");
    diesel::update(profiles::table.filter(profiles::profile_id.eq(profile_id)))
        .set(profiles::last_login_at.eq(fmt_timestamp(now)?))
        .execute(conn)?;
    Ok(())
}

/// Creates a new session for a profile.
///
/// # Errors
///
/// Returns an error if the session cannot be created.
pub fn create_session(
    conn: &mut SqliteConnection,
    session_token: &str,
    profile_id: i64,
    expires_at: OffsetDateTime,
    now: OffsetDateTime,
) -> Result<i64, PersistenceError> {
    let now_text: String = fmt_timestamp(now)?;
    diesel::insert_into(sessions::table)
        .values((
            sessions::session_token.eq(session_token),
            sessions::profile_id.eq(profile_id),
            sessions::created_at.eq(&now_text),
            sessions::last_activity_at.eq(&now_text),
            sessions::expires_at.eq(fmt_timestamp(expires_at)?),
        ))
        .execute(conn)?;
    get_last_insert_rowid(conn)
}

/// Updates the last activity timestamp for a session.
///
/// # Errors
///
/// Returns an error if the database update fails.
pub fn update_session_activity(
    conn: &mut SqliteConnection,
    session_id: i64,
    now: OffsetDateTime,
) -> Result<(), PersistenceError> {
    diesel::update(sessions::table.filter(sessions::session_id.eq(session_id)))
        .set(sessions::last_activity_at.eq(fmt_timestamp(now)?))
        .execute(conn)?;
    Ok(())
}

/// Deletes a session by token.
///
/// # Errors
///
/// Returns an error if the database delete fails.
pub fn delete_session(
    conn: &mut SqliteConnection,
    session_token: &str,
) -> Result<(), PersistenceError> {
    diesel::delete(sessions::table.filter(sessions::session_token.eq(session_token)))
        .execute(conn)?;
    Ok(())
}

/// Deletes all sessions that expired before `now`.
///
/// RFC 3339 UTC timestamps compare correctly as text.
///
/// # Errors
///
/// Returns an error if the database delete fails.
pub fn delete_expired_sessions(
    conn: &mut SqliteConnection,
    now: OffsetDateTime,
) -> Result<usize, PersistenceError> {
    Ok(
        diesel::delete(sessions::table.filter(sessions::expires_at.lt(fmt_timestamp(now)?)))
            .execute(conn)?,
    )
}

// ============================================================================
// Orders
// ============================================================================

/// Inserts an order row. The order subsystem itself is out of scope; this
/// exists so ticket linkage validation has something real to resolve
/// against (seeding, tests).
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_order(
    conn: &mut SqliteConnection,
    customer_id: i64,
    total_cents: i64,
    now: OffsetDateTime,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(orders::table)
        .values((
            orders::customer_id.eq(customer_id),
            orders::total_cents.eq(total_cents),
            orders::created_at.eq(fmt_timestamp(now)?),
        ))
        .execute(conn)?;
    get_last_insert_rowid(conn)
}

// ============================================================================
// Tickets
// ============================================================================

/// Inserts a new ticket with status `New` and no owner, assigning the next
/// ticket number inside the same transaction.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `new_ticket` - The validated creation input
/// * `customer_name` / `customer_email` - Contact snapshot captured with
///   the ticket
/// * `now` - The creation instant
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_ticket(
    conn: &mut SqliteConnection,
    new_ticket: &NewTicket,
    customer_name: &str,
    customer_email: &str,
    now: OffsetDateTime,
) -> Result<TicketRow, PersistenceError> {
    let now_text: String = fmt_timestamp(now)?;

    let ticket_id: i64 = conn.transaction::<i64, PersistenceError, _>(|conn| {
        let max_number: Option<i64> = tickets::table
            .select(diesel::dsl::max(tickets::ticket_number))
            .first::<Option<i64>>(conn)?;
        let ticket_number: i64 = max_number.unwrap_or(TICKET_NUMBER_FLOOR) + 1;

        diesel::insert_into(tickets::table)
            .values((
                tickets::ticket_number.eq(ticket_number),
                tickets::customer_id.eq(new_ticket.customer_id.value()),
                tickets::customer_name.eq(customer_name),
                tickets::customer_email.eq(customer_email),
                tickets::customer_phone.eq(new_ticket.customer_phone.as_deref()),
                tickets::order_id.eq(new_ticket.order_id.map(|o| o.value())),
                tickets::category.eq(&new_ticket.category),
                tickets::subject.eq(&new_ticket.subject),
                tickets::description.eq(&new_ticket.description),
                tickets::status.eq(TicketStatus::New.as_str()),
                tickets::created_at.eq(&now_text),
                tickets::updated_at.eq(&now_text),
            ))
            .execute(conn)?;

        get_last_insert_rowid(conn)
    })?;

    info!(ticket_id, "Ticket created");
    fetch_ticket(conn, ticket_id)
}

/// Applies a claim under its guard as a single conditional UPDATE.
///
/// For staff the `WHERE` clause re-checks, at commit time, that the row is
/// still unowned, owned by the claimant, or in the contestable `Reopened`
/// status; a concurrent claim therefore affects zero rows and surfaces as
/// `ClaimConflict` rather than silently overwriting the winner.
///
/// # Errors
///
/// Returns `TicketNotFound` if no such ticket exists, `ClaimConflict` if
/// the guard did not match, or another error if the update fails.
pub fn claim_ticket(
    conn: &mut SqliteConnection,
    ticket_id: i64,
    owner_id: i64,
    status: TicketStatus,
    guard: ClaimGuard,
    now: OffsetDateTime,
) -> Result<TicketRow, PersistenceError> {
    let now_text: String = fmt_timestamp(now)?;
    let assignment = (
        tickets::owner_id.eq(Some(owner_id)),
        tickets::status.eq(status.as_str()),
        tickets::updated_at.eq(&now_text),
    );

    let affected: usize = match guard {
        ClaimGuard::Unconditional => {
            diesel::update(tickets::table.filter(tickets::ticket_id.eq(ticket_id)))
                .set(assignment)
                .execute(conn)?
        }
        ClaimGuard::UnownedSelfOrReopened { claimant } => diesel::update(
            tickets::table.filter(tickets::ticket_id.eq(ticket_id)).filter(
                tickets::owner_id
                    .is_null()
                    .or(tickets::owner_id.eq(claimant.value()))
                    .or(tickets::status.eq(TicketStatus::Reopened.as_str())),
            ),
        )
        .set(assignment)
        .execute(conn)?,
    };

    if affected == 0 {
        return if queries::get_ticket(conn, ticket_id)?.is_some() {
            debug!(ticket_id, owner_id, "Claim lost to a concurrent writer");
            Err(PersistenceError::ClaimConflict { ticket_id })
        } else {
            Err(PersistenceError::TicketNotFound(ticket_id))
        };
    }

    info!(ticket_id, owner_id, status = status.as_str(), "Ticket claimed");
    fetch_ticket(conn, ticket_id)
}

/// Updates a ticket's status.
///
/// # Errors
///
/// Returns `TicketNotFound` if no such ticket exists, or another error if
/// the update fails.
pub fn update_ticket_status(
    conn: &mut SqliteConnection,
    ticket_id: i64,
    status: TicketStatus,
    now: OffsetDateTime,
) -> Result<TicketRow, PersistenceError> {
    let affected: usize =
        diesel::update(tickets::table.filter(tickets::ticket_id.eq(ticket_id)))
            .set((
                tickets::status.eq(status.as_str()),
                tickets::updated_at.eq(fmt_timestamp(now)?),
            ))
            .execute(conn)?;

    if affected == 0 {
        return Err(PersistenceError::TicketNotFound(ticket_id));
    }

    info!(ticket_id, status = status.as_str(), "Ticket status updated");
    fetch_ticket(conn, ticket_id)
}

/// Transfers or clears ticket ownership, optionally updating status in the
/// same write. Admin-only at the engine level; no ownership guard applies.
///
/// # Errors
///
/// Returns `TicketNotFound` if no such ticket exists, or another error if
/// the update fails.
pub fn reassign_ticket(
    conn: &mut SqliteConnection,
    ticket_id: i64,
    owner_id: Option<i64>,
    status: Option<TicketStatus>,
    now: OffsetDateTime,
) -> Result<TicketRow, PersistenceError> {
    let now_text: String = fmt_timestamp(now)?;
    let target = tickets::table.filter(tickets::ticket_id.eq(ticket_id));

    let affected: usize = if let Some(status) = status {
        diesel::update(target)
            .set((
                tickets::owner_id.eq(owner_id),
                tickets::status.eq(status.as_str()),
                tickets::updated_at.eq(&now_text),
            ))
            .execute(conn)?
    } else {
        diesel::update(target)
            .set((
                tickets::owner_id.eq(owner_id),
                tickets::updated_at.eq(&now_text),
            ))
            .execute(conn)?
    };

    if affected == 0 {
        return Err(PersistenceError::TicketNotFound(ticket_id));
    }

    info!(ticket_id, ?owner_id, "Ticket reassigned");
    fetch_ticket(conn, ticket_id)
}

// ============================================================================
// Comments
// ============================================================================

/// Appends a support-side comment and refreshes the ticket's `updated_at`.
///
/// # Errors
///
/// Returns an error if the insert or update fails.
pub fn insert_agent_comment(
    conn: &mut SqliteConnection,
    ticket_id: i64,
    comment: &NewComment,
    now: OffsetDateTime,
) -> Result<CommentRow, PersistenceError> {
    let now_text: String = fmt_timestamp(now)?;

    conn.transaction::<CommentRow, PersistenceError, _>(|conn| {
        let row: CommentRow = insert_comment_row(conn, ticket_id, comment, &now_text)?;

        diesel::update(tickets::table.filter(tickets::ticket_id.eq(ticket_id)))
            .set(tickets::updated_at.eq(&now_text))
            .execute(conn)?;

        Ok(row)
    })
}

/// Appends a customer comment; when `reopen` is set, flips the ticket to
/// `Reopened` and clears ownership in the same transaction.
///
/// The reopen UPDATE is guarded on the row still being `Resolved`, so a
/// concurrent status change simply leaves the status untouched - replying
/// to an already-reopened ticket never re-triggers the clear.
///
/// # Errors
///
/// Returns an error if any write in the transaction fails.
pub fn insert_customer_reply(
    conn: &mut SqliteConnection,
    ticket_id: i64,
    comment: &NewComment,
    reopen: bool,
    now: OffsetDateTime,
) -> Result<CommentRow, PersistenceError> {
    let now_text: String = fmt_timestamp(now)?;

    conn.transaction::<CommentRow, PersistenceError, _>(|conn| {
        let row: CommentRow = insert_comment_row(conn, ticket_id, comment, &now_text)?;

        if reopen {
            let reopened: usize = diesel::update(
                tickets::table
                    .filter(tickets::ticket_id.eq(ticket_id))
                    .filter(tickets::status.eq(TicketStatus::Resolved.as_str())),
            )
            .set((
                tickets::status.eq(TicketStatus::Reopened.as_str()),
                tickets::owner_id.eq(None::<i64>),
                tickets::updated_at.eq(&now_text),
            ))
            .execute(conn)?;

            if reopened > 0 {
                info!(ticket_id, "Customer reply reopened resolved ticket");
            }
        }

        diesel::update(tickets::table.filter(tickets::ticket_id.eq(ticket_id)))
            .set(tickets::updated_at.eq(&now_text))
            .execute(conn)?;

        Ok(row)
    })
}

fn insert_comment_row(
    conn: &mut SqliteConnection,
    ticket_id: i64,
    comment: &NewComment,
    now_text: &str,
) -> Result<CommentRow, PersistenceError> {
    diesel::insert_into(ticket_comments::table)
        .values((
            ticket_comments::ticket_id.eq(ticket_id),
            ticket_comments::author_id.eq(Some(comment.author_id.value())),
            ticket_comments::author_role.eq(comment.author_role.as_str()),
            ticket_comments::author_email.eq(comment.author_email.as_deref()),
            ticket_comments::message.eq(&comment.message),
            ticket_comments::created_at.eq(now_text),
        ))
        .execute(conn)?;

    let comment_id: i64 = get_last_insert_rowid(conn)?;
    Ok(ticket_comments::table
        .filter(ticket_comments::comment_id.eq(comment_id))
        .first::<CommentRow>(conn)?)
}

// ============================================================================
// Feedback
// ============================================================================

/// Inserts a feedback row for a ticket.
///
/// The UNIQUE constraint on `ticket_id` makes a second submission a
/// conflict, never an overwrite.
///
/// # Errors
///
/// Returns `DuplicateFeedback` if feedback already exists for this ticket,
/// or another error if the insert fails.
pub fn insert_feedback(
    conn: &mut SqliteConnection,
    ticket_id: i64,
    stars: u8,
    comment: Option<&str>,
    now: OffsetDateTime,
) -> Result<FeedbackRow, PersistenceError> {
    let result = diesel::insert_into(ticket_feedback::table)
        .values((
            ticket_feedback::ticket_id.eq(ticket_id),
            ticket_feedback::stars.eq(i32::from(stars)),
            ticket_feedback::comment.eq(comment),
            ticket_feedback::created_at.eq(fmt_timestamp(now)?),
        ))
        .execute(conn);

    match result {
        Ok(_) => {}
        Err(diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
            return Err(PersistenceError::DuplicateFeedback { ticket_id });
        }
        Err(e) => return Err(e.into()),
    }

    let feedback_id: i64 = get_last_insert_rowid(conn)?;
    info!(ticket_id, feedback_id, stars, "Feedback recorded");

    Ok(ticket_feedback::table
        .filter(ticket_feedback::feedback_id.eq(feedback_id))
        .first::<FeedbackRow>(conn)?)
}

/// Re-reads a ticket row after a mutation.
fn fetch_ticket(
    conn: &mut SqliteConnection,
    ticket_id: i64,
) -> Result<TicketRow, PersistenceError> {
    queries::get_ticket(conn, ticket_id)?.ok_or(PersistenceError::TicketNotFound(ticket_id))
}
