// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::types::{Role, TicketId, UserId};
use crate::validation::require_non_empty;
use time::OffsetDateTime;

/// A comment on a ticket's conversation thread.
///
/// Comments are append-only: never edited, never deleted. Display order is
/// ascending by creation time. `author_id` may be absent for support-side
/// entries that only recorded a role and email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentRecord {
    /// The canonical comment identifier.
    pub id: i64,
    /// The owning ticket.
    pub ticket_id: TicketId,
    /// The authoring user, when known.
    pub author_id: Option<UserId>,
    /// The author's role at posting time.
    pub author_role: Role,
    /// Display email snapshot for the author.
    pub author_email: Option<String>,
    /// The message body, trimmed.
    pub message: String,
    /// Server-assigned creation timestamp.
    pub created_at: OffsetDateTime,
}

impl CommentRecord {
    /// Returns true if this comment was authored on the support side.
    #[must_use]
    pub const fn is_staff_side(&self) -> bool {
        self.author_role.is_agent()
    }
}

/// Trims a comment message and rejects empty results.
///
/// # Errors
///
/// Returns `DomainError::EmptyField` if the message is empty after trimming.
pub fn validate_comment_message(message: &str) -> Result<String, DomainError> {
    require_non_empty("message", message)
}
