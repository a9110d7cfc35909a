// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-side queries.
//!
//! Customer-scoped ticket lookups filter on `customer_id` inside the query,
//! so a ticket owned by a different customer is indistinguishable from a
//! nonexistent one at this layer.

use crate::data_models::{
    CommentRow, FeedbackRow, ProfileData, SessionData, TicketRow, parse_timestamp,
};
use crate::diesel_schema::{orders, profiles, sessions, ticket_comments, ticket_feedback, tickets};
use crate::error::PersistenceError;
use bistro_desk_domain::Role;
use diesel::prelude::*;
use time::OffsetDateTime;

/// Retrieves a profile by normalized email.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_profile_by_email(
    conn: &mut SqliteConnection,
    email: &str,
) -> Result<Option<ProfileData>, PersistenceError> {
    Ok(profiles::table
        .filter(profiles::email.eq(email))
        .first::<ProfileData>(conn)
        .optional()?)
}

/// Retrieves a profile by ID.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_profile_by_id(
    conn: &mut SqliteConnection,
    profile_id: i64,
) -> Result<Option<ProfileData>, PersistenceError> {
    Ok(profiles::table
        .filter(profiles::profile_id.eq(profile_id))
        .first::<ProfileData>(conn)
        .optional()?)
}

/// Lists enabled profiles that can own tickets (role staff or admin).
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_assignable_profiles(
    conn: &mut SqliteConnection,
) -> Result<Vec<ProfileData>, PersistenceError> {
    Ok(profiles::table
        .filter(
            profiles::role
                .eq(Role::Staff.as_str())
                .or(profiles::role.eq(Role::Admin.as_str())),
        )
        .filter(profiles::is_disabled.eq(0))
        .order(profiles::display_name.asc())
        .load::<ProfileData>(conn)?)
}

/// Retrieves a session by token.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_session_by_token(
    conn: &mut SqliteConnection,
    session_token: &str,
) -> Result<Option<SessionData>, PersistenceError> {
    Ok(sessions::table
        .filter(sessions::session_token.eq(session_token))
        .first::<SessionData>(conn)
        .optional()?)
}

/// Checks whether an order exists and belongs to the given customer.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn order_owned_by_customer(
    conn: &mut SqliteConnection,
    order_id: i64,
    customer_id: i64,
) -> Result<bool, PersistenceError> {
    let count: i64 = orders::table
        .filter(orders::order_id.eq(order_id))
        .filter(orders::customer_id.eq(customer_id))
        .count()
        .get_result(conn)?;
    Ok(count > 0)
}

/// Retrieves a ticket row by ID.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_ticket(
    conn: &mut SqliteConnection,
    ticket_id: i64,
) -> Result<Option<TicketRow>, PersistenceError> {
    Ok(tickets::table
        .filter(tickets::ticket_id.eq(ticket_id))
        .first::<TicketRow>(conn)
        .optional()?)
}

/// Retrieves a ticket row by ID, scoped to its owning customer.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_ticket_for_customer(
    conn: &mut SqliteConnection,
    ticket_id: i64,
    customer_id: i64,
) -> Result<Option<TicketRow>, PersistenceError> {
    Ok(tickets::table
        .filter(tickets::ticket_id.eq(ticket_id))
        .filter(tickets::customer_id.eq(customer_id))
        .first::<TicketRow>(conn)
        .optional()?)
}

/// Lists all tickets, newest first.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_tickets(conn: &mut SqliteConnection) -> Result<Vec<TicketRow>, PersistenceError> {
    Ok(tickets::table
        .order(tickets::created_at.desc())
        .load::<TicketRow>(conn)?)
}

/// Lists one customer's tickets, newest first.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_tickets_for_customer(
    conn: &mut SqliteConnection,
    customer_id: i64,
) -> Result<Vec<TicketRow>, PersistenceError> {
    Ok(tickets::table
        .filter(tickets::customer_id.eq(customer_id))
        .order(tickets::created_at.desc())
        .load::<TicketRow>(conn)?)
}

/// Lists a ticket's comments in display order (oldest first).
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_comments(
    conn: &mut SqliteConnection,
    ticket_id: i64,
) -> Result<Vec<CommentRow>, PersistenceError> {
    Ok(ticket_comments::table
        .filter(ticket_comments::ticket_id.eq(ticket_id))
        .order(ticket_comments::created_at.asc())
        .load::<CommentRow>(conn)?)
}

/// Finds the creation time of the most recent staff/admin comment on a
/// ticket. This is the sole input to the customer reply window; customer
/// comments are excluded by the role filter.
///
/// # Errors
///
/// Returns an error if the database query fails or the stored timestamp
/// does not parse.
pub fn last_staff_comment_at(
    conn: &mut SqliteConnection,
    ticket_id: i64,
) -> Result<Option<OffsetDateTime>, PersistenceError> {
    let latest: Option<String> = ticket_comments::table
        .filter(ticket_comments::ticket_id.eq(ticket_id))
        .filter(
            ticket_comments::author_role
                .eq(Role::Staff.as_str())
                .or(ticket_comments::author_role.eq(Role::Admin.as_str())),
        )
        .order(ticket_comments::created_at.desc())
        .select(ticket_comments::created_at)
        .first::<String>(conn)
        .optional()?;

    latest.as_deref().map(parse_timestamp).transpose()
}

/// Retrieves the feedback row for a ticket, if any.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_feedback(
    conn: &mut SqliteConnection,
    ticket_id: i64,
) -> Result<Option<FeedbackRow>, PersistenceError> {
    Ok(ticket_feedback::table
        .filter(ticket_feedback::ticket_id.eq(ticket_id))
        .first::<FeedbackRow>(conn)
        .optional()?)
}
