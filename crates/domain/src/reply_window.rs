// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Customer reply-window computation.
//!
//! A customer may reply to their ticket until five days after the most
//! recent staff or admin comment. The window is derived lazily from comment
//! timestamps on every read and re-checked at write time; there is no
//! scheduled expiry job. Customer comments never start or extend the window.

use time::{Duration, OffsetDateTime};

/// How long a customer may reply after the last staff/admin comment.
pub const REPLY_WINDOW: Duration = Duration::days(5);

/// The evaluated reply window for a ticket at a particular instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplyWindow {
    /// Whether the customer may currently reply.
    pub open: bool,
    /// The instant the window closes, if a deadline has started.
    pub deadline: Option<OffsetDateTime>,
}

/// Evaluates the reply window.
///
/// With no staff/admin comment on record the window is open indefinitely
/// (no deadline has started). Otherwise the window is open while
/// `now <= last_staff_comment_at + 5 days`, inclusive at the boundary.
///
/// # Arguments
///
/// * `last_staff_comment_at` - Creation time of the most recent comment
///   authored by a staff or admin user, if any
/// * `now` - The evaluation instant
#[must_use]
pub fn evaluate_reply_window(
    last_staff_comment_at: Option<OffsetDateTime>,
    now: OffsetDateTime,
) -> ReplyWindow {
    last_staff_comment_at.map_or(
        ReplyWindow {
            open: true,
            deadline: None,
        },
        |last| {
            let deadline: OffsetDateTime = last + REPLY_WINDOW;
            ReplyWindow {
                open: now <= deadline,
                deadline: Some(deadline),
            }
        },
    )
}
