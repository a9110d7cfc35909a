// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for the Bistro Desk support platform.
//!
//! This crate stores profiles, sessions, tickets, comments, and feedback in
//! `SQLite` via Diesel with embedded migrations. In-memory shared-cache
//! databases back unit and integration tests; file-backed databases with
//! WAL journaling back production use.
//!
//! ## Concurrency discipline
//!
//! The store offers row-level conditional updates, not cross-table
//! transactions spanning requests. Every race-prone write carries its
//! precondition in the UPDATE's `WHERE` clause:
//!
//! - a staff claim commits only while the ticket is still unowned, owned by
//!   the claimant, or `Reopened` - a losing concurrent claim affects zero
//!   rows and is reported as a conflict;
//! - the customer-reply auto-reopen commits only while the ticket is still
//!   `Resolved`, so repeating the reply never re-triggers it.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

use diesel::SqliteConnection;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use bistro_desk::{ClaimGuard, NewComment};
use bistro_desk_domain::{NewTicket, TicketStatus};
use time::OffsetDateTime;

mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;
mod sqlite;

#[cfg(test)]
mod tests;

pub use data_models::{
    CommentRow, FeedbackRow, OrderRow, ProfileData, SessionData, TicketRow, fmt_timestamp,
    parse_timestamp,
};
pub use error::PersistenceError;

/// Atomic counter for generating unique in-memory database names.
///
/// Each call to `new_in_memory()` receives a unique sequential ID, keeping
/// tests isolated without time-based collisions.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Persistence adapter for the support platform.
pub struct Persistence {
    conn: SqliteConnection,
}

impl Persistence {
    /// Creates a persistence adapter backed by a fresh in-memory `SQLite`
    /// database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id: u64 = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let db_name: String = format!("memdb_test_{db_id}");
        let shared_memory_url: String = format!("file:{db_name}?mode=memory&cache=shared");

        let mut conn: SqliteConnection = sqlite::initialize_database(&shared_memory_url)?;
        sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Creates a persistence adapter backed by a file-based `SQLite`
    /// database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str: &str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = sqlite::initialize_database(path_str)?;
        sqlite::enable_wal_mode(&mut conn)?;
        sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    // ========================================================================
    // Profiles & sessions
    // ========================================================================

    /// Creates a profile with a bcrypt-hashed password.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateEmail` for an already-registered address, or
    /// another error if the insert fails.
    pub fn create_profile(
        &mut self,
        email: &str,
        display_name: &str,
        phone: Option<&str>,
        password: &str,
        role: &str,
    ) -> Result<i64, PersistenceError> {
        mutations::create_profile(&mut self.conn, email, display_name, phone, password, role)
    }

    /// Retrieves a profile by normalized email.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_profile_by_email(
        &mut self,
        email: &str,
    ) -> Result<Option<ProfileData>, PersistenceError> {
        queries::get_profile_by_email(&mut self.conn, email)
    }

    /// Retrieves a profile by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_profile_by_id(
        &mut self,
        profile_id: i64,
    ) -> Result<Option<ProfileData>, PersistenceError> {
        queries::get_profile_by_id(&mut self.conn, profile_id)
    }

    /// Lists enabled staff and admin profiles (the assignable set).
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_assignable_profiles(&mut self) -> Result<Vec<ProfileData>, PersistenceError> {
        queries::list_assignable_profiles(&mut self.conn)
    }

    /// Verifies a password against a stored hash.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored hash is malformed.
    pub fn verify_password(
        &self,
        password: &str,
        password_hash: &str,
    ) -> Result<bool, PersistenceError> {
        mutations::verify_password(password, password_hash)
    }

    /// Updates the last login timestamp for a profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub fn update_last_login(
        &mut self,
        profile_id: i64,
        now: OffsetDateTime,
    ) -> Result<(), PersistenceError> {
        mutations::update_last_login(&mut self.conn, profile_id, now)
    }

    /// Creates a session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be created.
    pub fn create_session(
        &mut self,
        session_token: &str,
        profile_id: i64,
        expires_at: OffsetDateTime,
        now: OffsetDateTime,
    ) -> Result<i64, PersistenceError> {
        mutations::create_session(&mut self.conn, session_token, profile_id, expires_at, now)
    }

    /// Retrieves a session by token.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_session_by_token(
        &mut self,
        session_token: &str,
    ) -> Result<Option<SessionData>, PersistenceError> {
        queries::get_session_by_token(&mut self.conn, session_token)
    }

    /// Refreshes a session's activity timestamp.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub fn update_session_activity(
        &mut self,
        session_id: i64,
        now: OffsetDateTime,
    ) -> Result<(), PersistenceError> {
        mutations::update_session_activity(&mut self.conn, session_id, now)
    }

    /// Deletes a session by token.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub fn delete_session(&mut self, session_token: &str) -> Result<(), PersistenceError> {
        mutations::delete_session(&mut self.conn, session_token)
    }

    /// Deletes all sessions that expired before `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub fn delete_expired_sessions(
        &mut self,
        now: OffsetDateTime,
    ) -> Result<usize, PersistenceError> {
        mutations::delete_expired_sessions(&mut self.conn, now)
    }

    // ========================================================================
    // Orders
    // ========================================================================

    /// Inserts an order row for linkage validation to resolve against.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn insert_order(
        &mut self,
        customer_id: i64,
        total_cents: i64,
        now: OffsetDateTime,
    ) -> Result<i64, PersistenceError> {
        mutations::insert_order(&mut self.conn, customer_id, total_cents, now)
    }

    /// Checks whether an order exists and belongs to the given customer.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn order_owned_by_customer(
        &mut self,
        order_id: i64,
        customer_id: i64,
    ) -> Result<bool, PersistenceError> {
        queries::order_owned_by_customer(&mut self.conn, order_id, customer_id)
    }

    // ========================================================================
    // Tickets
    // ========================================================================

    /// Inserts a new ticket with status `New` and no owner.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn insert_ticket(
        &mut self,
        new_ticket: &NewTicket,
        customer_name: &str,
        customer_email: &str,
        now: OffsetDateTime,
    ) -> Result<TicketRow, PersistenceError> {
        mutations::insert_ticket(&mut self.conn, new_ticket, customer_name, customer_email, now)
    }

    /// Retrieves a ticket row by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_ticket(&mut self, ticket_id: i64) -> Result<Option<TicketRow>, PersistenceError> {
        queries::get_ticket(&mut self.conn, ticket_id)
    }

    /// Retrieves a ticket row by ID, scoped to its owning customer. A
    /// non-owned ticket is indistinguishable from a nonexistent one.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_ticket_for_customer(
        &mut self,
        ticket_id: i64,
        customer_id: i64,
    ) -> Result<Option<TicketRow>, PersistenceError> {
        queries::get_ticket_for_customer(&mut self.conn, ticket_id, customer_id)
    }

    /// Lists all tickets, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_tickets(&mut self) -> Result<Vec<TicketRow>, PersistenceError> {
        queries::list_tickets(&mut self.conn)
    }

    /// Lists one customer's tickets, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_tickets_for_customer(
        &mut self,
        customer_id: i64,
    ) -> Result<Vec<TicketRow>, PersistenceError> {
        queries::list_tickets_for_customer(&mut self.conn, customer_id)
    }

    /// Applies a claim under its guard as a single conditional UPDATE.
    ///
    /// # Errors
    ///
    /// Returns `ClaimConflict` if a concurrent writer won the race,
    /// `TicketNotFound` if the ticket does not exist, or another error if
    /// the update fails.
    pub fn claim_ticket(
        &mut self,
        ticket_id: i64,
        owner_id: i64,
        status: TicketStatus,
        guard: ClaimGuard,
        now: OffsetDateTime,
    ) -> Result<TicketRow, PersistenceError> {
        mutations::claim_ticket(&mut self.conn, ticket_id, owner_id, status, guard, now)
    }

    /// Updates a ticket's status.
    ///
    /// # Errors
    ///
    /// Returns `TicketNotFound` if the ticket does not exist, or another
    /// error if the update fails.
    pub fn update_ticket_status(
        &mut self,
        ticket_id: i64,
        status: TicketStatus,
        now: OffsetDateTime,
    ) -> Result<TicketRow, PersistenceError> {
        mutations::update_ticket_status(&mut self.conn, ticket_id, status, now)
    }

    /// Transfers or clears ticket ownership (admin path).
    ///
    /// # Errors
    ///
    /// Returns `TicketNotFound` if the ticket does not exist, or another
    /// error if the update fails.
    pub fn reassign_ticket(
        &mut self,
        ticket_id: i64,
        owner_id: Option<i64>,
        status: Option<TicketStatus>,
        now: OffsetDateTime,
    ) -> Result<TicketRow, PersistenceError> {
        mutations::reassign_ticket(&mut self.conn, ticket_id, owner_id, status, now)
    }

    // ========================================================================
    // Comments & feedback
    // ========================================================================

    /// Lists a ticket's comments in display order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_comments(&mut self, ticket_id: i64) -> Result<Vec<CommentRow>, PersistenceError> {
        queries::list_comments(&mut self.conn, ticket_id)
    }

    /// Finds the creation time of the most recent staff/admin comment.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails or the stored timestamp
    /// does not parse.
    pub fn last_staff_comment_at(
        &mut self,
        ticket_id: i64,
    ) -> Result<Option<OffsetDateTime>, PersistenceError> {
        queries::last_staff_comment_at(&mut self.conn, ticket_id)
    }

    /// Appends a support-side comment.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn insert_agent_comment(
        &mut self,
        ticket_id: i64,
        comment: &NewComment,
        now: OffsetDateTime,
    ) -> Result<CommentRow, PersistenceError> {
        mutations::insert_agent_comment(&mut self.conn, ticket_id, comment, now)
    }

    /// Appends a customer comment, reopening a resolved ticket in the same
    /// transaction when `reopen` is set.
    ///
    /// # Errors
    ///
    /// Returns an error if any write in the transaction fails.
    pub fn insert_customer_reply(
        &mut self,
        ticket_id: i64,
        comment: &NewComment,
        reopen: bool,
        now: OffsetDateTime,
    ) -> Result<CommentRow, PersistenceError> {
        mutations::insert_customer_reply(&mut self.conn, ticket_id, comment, reopen, now)
    }

    /// Retrieves the feedback row for a ticket, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_feedback(
        &mut self,
        ticket_id: i64,
    ) -> Result<Option<FeedbackRow>, PersistenceError> {
        queries::get_feedback(&mut self.conn, ticket_id)
    }

    /// Inserts a feedback row.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateFeedback` if feedback already exists for the
    /// ticket, or another error if the insert fails.
    pub fn insert_feedback(
        &mut self,
        ticket_id: i64,
        stars: u8,
        comment: Option<&str>,
        now: OffsetDateTime,
    ) -> Result<FeedbackRow, PersistenceError> {
        mutations::insert_feedback(&mut self.conn, ticket_id, stars, comment, now)
    }
}
