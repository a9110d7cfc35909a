// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Row types and conversions between stored rows and domain values.
//!
//! Timestamps are stored as RFC 3339 text and parsed back on read; role and
//! status columns hold the canonical domain strings and are re-validated on
//! every load so a corrupted row surfaces as a serialization error instead
//! of silently widening the status set.

use crate::error::PersistenceError;
use bistro_desk_domain::{
    CommentRecord, FeedbackRecord, OrderId, Role, TicketId, TicketSnapshot, TicketStatus, UserId,
};
use diesel::prelude::*;
use std::str::FromStr;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Formats a timestamp for storage.
///
/// # Errors
///
/// Returns a serialization error if formatting fails.
pub fn fmt_timestamp(at: OffsetDateTime) -> Result<String, PersistenceError> {
    Ok(at.format(&Rfc3339)?)
}

/// Parses a stored timestamp.
///
/// # Errors
///
/// Returns a serialization error if the stored text is not RFC 3339.
pub fn parse_timestamp(text: &str) -> Result<OffsetDateTime, PersistenceError> {
    Ok(OffsetDateTime::parse(text, &Rfc3339)?)
}

/// A platform user account row.
#[derive(Debug, Clone, PartialEq, Eq, Queryable)]
pub struct ProfileData {
    pub profile_id: i64,
    pub email: String,
    pub display_name: String,
    pub phone: Option<String>,
    pub role: String,
    pub password_hash: String,
    pub is_disabled: i32,
    pub created_at: String,
    pub last_login_at: Option<String>,
}

impl ProfileData {
    /// Parses the stored role string.
    ///
    /// # Errors
    ///
    /// Returns a serialization error for an unrecognized role value.
    pub fn parsed_role(&self) -> Result<Role, PersistenceError> {
        Role::from_str(&self.role).map_err(|e| {
            PersistenceError::SerializationError(format!(
                "profile {} has invalid role: {e}",
                self.profile_id
            ))
        })
    }

    /// Returns true if the account is disabled.
    #[must_use]
    pub const fn is_disabled(&self) -> bool {
        self.is_disabled != 0
    }
}

/// A session row.
#[derive(Debug, Clone, PartialEq, Eq, Queryable)]
pub struct SessionData {
    pub session_id: i64,
    pub session_token: String,
    pub profile_id: i64,
    pub created_at: String,
    pub last_activity_at: String,
    pub expires_at: String,
}

/// An order row; only what ticket-creation linkage validation needs.
#[derive(Debug, Clone, PartialEq, Eq, Queryable)]
pub struct OrderRow {
    pub order_id: i64,
    pub customer_id: i64,
    pub total_cents: i64,
    pub created_at: String,
}

/// A ticket row as stored, including the customer contact snapshot the
/// staff dashboard displays.
#[derive(Debug, Clone, PartialEq, Eq, Queryable)]
pub struct TicketRow {
    pub ticket_id: i64,
    pub ticket_number: i64,
    pub customer_id: i64,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub order_id: Option<i64>,
    pub category: String,
    pub subject: String,
    pub description: String,
    pub owner_id: Option<i64>,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

impl TicketRow {
    /// Converts the row into the snapshot the engine reasons over.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the status or a timestamp fails to
    /// parse.
    pub fn to_snapshot(&self) -> Result<TicketSnapshot, PersistenceError> {
        let status: TicketStatus = TicketStatus::from_str(&self.status).map_err(|e| {
            PersistenceError::SerializationError(format!(
                "ticket {} has invalid status: {e}",
                self.ticket_id
            ))
        })?;

        Ok(TicketSnapshot {
            id: TicketId::new(self.ticket_id),
            ticket_number: self.ticket_number,
            customer_id: UserId::new(self.customer_id),
            category: self.category.clone(),
            subject: self.subject.clone(),
            description: self.description.clone(),
            order_id: self.order_id.map(OrderId::new),
            owner_id: self.owner_id.map(UserId::new),
            status,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
        })
    }
}

/// A comment row.
#[derive(Debug, Clone, PartialEq, Eq, Queryable)]
pub struct CommentRow {
    pub comment_id: i64,
    pub ticket_id: i64,
    pub author_id: Option<i64>,
    pub author_role: String,
    pub author_email: Option<String>,
    pub message: String,
    pub created_at: String,
}

impl CommentRow {
    /// Converts the row into a domain comment record.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the role or timestamp fails to
    /// parse.
    pub fn to_record(&self) -> Result<CommentRecord, PersistenceError> {
        let author_role: Role = Role::from_str(&self.author_role).map_err(|e| {
            PersistenceError::SerializationError(format!(
                "comment {} has invalid author role: {e}",
                self.comment_id
            ))
        })?;

        Ok(CommentRecord {
            id: self.comment_id,
            ticket_id: TicketId::new(self.ticket_id),
            author_id: self.author_id.map(UserId::new),
            author_role,
            author_email: self.author_email.clone(),
            message: self.message.clone(),
            created_at: parse_timestamp(&self.created_at)?,
        })
    }
}

/// A feedback row.
#[derive(Debug, Clone, PartialEq, Eq, Queryable)]
pub struct FeedbackRow {
    pub feedback_id: i64,
    pub ticket_id: i64,
    pub stars: i32,
    pub comment: Option<String>,
    pub created_at: String,
}

impl FeedbackRow {
    /// Converts the row into a domain feedback record.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the stored rating is outside 1-5 or
    /// the timestamp fails to parse.
    pub fn to_record(&self) -> Result<FeedbackRecord, PersistenceError> {
        let stars: u8 = u8::try_from(self.stars)
            .ok()
            .filter(|s| (1..=5u8).contains(s))
            .ok_or_else(|| {
                PersistenceError::SerializationError(format!(
                    "feedback {} has invalid star rating {}",
                    self.feedback_id, self.stars
                ))
            })?;

        Ok(FeedbackRecord {
            id: self.feedback_id,
            ticket_id: TicketId::new(self.ticket_id),
            stars,
            comment: self.comment.clone(),
            created_at: parse_timestamp(&self.created_at)?,
        })
    }
}
