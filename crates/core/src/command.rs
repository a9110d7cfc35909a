// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use bistro_desk_domain::{Role, TicketStatus, UserId};

/// Mutating commands the engine accepts against a loaded ticket.
///
/// Creation is not a command: a new ticket has no prior snapshot to load, so
/// it goes straight through validated insert in the persistence layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TicketCommand {
    /// Staff/admin self-assignment. Status defaults to `In Progress` unless
    /// an explicit target status was supplied.
    Claim {
        /// Optional explicit status to set alongside ownership.
        explicit_status: Option<TicketStatus>,
    },
    /// Staff/admin status change on an owned ticket.
    UpdateStatus {
        /// The new status.
        status: TicketStatus,
    },
    /// Admin ownership transfer. `target` is `None` to unassign; the role is
    /// resolved by the caller so the engine can validate it without a
    /// directory lookup of its own.
    Reassign {
        /// The new owner and their resolved role, or `None` to clear.
        target: Option<(UserId, Role)>,
        /// Optional simultaneous status change.
        status: Option<TicketStatus>,
    },
    /// Customer reply on their own ticket, subject to the reply window.
    CustomerReply {
        /// The raw message body.
        message: String,
        /// Display email snapshot for the comment row.
        author_email: Option<String>,
    },
    /// Staff/admin reply on a claimed ticket.
    AgentReply {
        /// The raw message body.
        message: String,
        /// Display email snapshot for the comment row.
        author_email: Option<String>,
    },
    /// Customer feedback on a resolved ticket.
    SubmitFeedback {
        /// Star rating; validated to 1-5.
        stars: i32,
        /// Optional free-text comment.
        comment: Option<String>,
    },
}
