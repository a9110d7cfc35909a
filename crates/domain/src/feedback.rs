// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Feedback gating rules.
//!
//! Feedback is accepted only while the owning ticket is `Resolved` (the
//! status is re-read at submission time, never cached), carries a 1-5 star
//! rating with an optional bounded comment, and is immutable once created.
//! Uniqueness per ticket is enforced by the store; a second submission
//! surfaces as a conflict, not an overwrite.

use crate::error::DomainError;
use crate::status::TicketStatus;
use crate::types::TicketId;
use crate::validation::require_max_chars;
use time::OffsetDateTime;

/// Maximum characters accepted for the optional feedback comment.
pub const FEEDBACK_COMMENT_MAX_CHARS: usize = 1000;

/// A recorded feedback row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackRecord {
    /// The canonical feedback identifier.
    pub id: i64,
    /// The rated ticket. At most one feedback row exists per ticket.
    pub ticket_id: TicketId,
    /// Star rating, 1-5 inclusive.
    pub stars: u8,
    /// Optional free-text comment.
    pub comment: Option<String>,
    /// Server-assigned creation timestamp.
    pub created_at: OffsetDateTime,
}

/// Validates the submitted rating fields.
///
/// # Errors
///
/// Returns an error if `stars` is outside 1-5 or the comment exceeds
/// [`FEEDBACK_COMMENT_MAX_CHARS`].
pub fn validate_feedback_fields(stars: i32, comment: Option<&str>) -> Result<(), DomainError> {
    if !(1..=5).contains(&stars) {
        return Err(DomainError::InvalidStars { stars });
    }
    if let Some(text) = comment {
        require_max_chars("comment", text, FEEDBACK_COMMENT_MAX_CHARS)?;
    }
    Ok(())
}

/// Validates that the ticket's current status admits feedback.
///
/// # Errors
///
/// Returns `DomainError::FeedbackNotResolved` for any status other than
/// `Resolved`.
pub const fn validate_feedback_submission(status: TicketStatus) -> Result<(), DomainError> {
    if status.accepts_feedback() {
        Ok(())
    } else {
        Err(DomainError::FeedbackNotResolved { status })
    }
}
