// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.
//!
//! DTOs are distinct from domain types and represent the API contract.
//! Ticket rows surface in two shapes: [`TicketInfo`] for customers (their
//! own tickets; no contact snapshot) and [`StaffTicketInfo`] for the
//! support dashboard.

use bistro_desk_persistence::{CommentRow, FeedbackRow, ProfileData, TicketRow};
use serde::{Deserialize, Serialize};

/// API request to register a customer account.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SignupRequest {
    /// The display name.
    pub name: String,
    /// The email address.
    pub email: String,
    /// The password.
    pub password: String,
    /// Optional contact phone.
    pub phone: Option<String>,
}

/// API request to authenticate.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LoginRequest {
    /// The email address.
    pub email: String,
    /// The password.
    pub password: String,
}

/// Profile fields exposed to the account holder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileInfo {
    /// The canonical profile identifier.
    pub profile_id: i64,
    /// The email address.
    pub email: String,
    /// The display name.
    pub display_name: String,
    /// The resolved role.
    pub role: String,
}

/// API response for a successful signup or login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionResponse {
    /// The bearer token for subsequent requests.
    pub token: String,
    /// The authenticated profile.
    pub profile: ProfileInfo,
}

/// API request to create a ticket.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CreateTicketRequest {
    /// Issue category.
    pub category: String,
    /// One-line summary.
    pub subject: String,
    /// Free-text description.
    pub description: String,
    /// Optional association with a prior order.
    pub order_id: Option<i64>,
    /// Optional contact phone for this ticket.
    pub customer_phone: Option<String>,
}

/// Ticket fields exposed to the owning customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketInfo {
    /// The canonical ticket identifier.
    pub ticket_id: i64,
    /// The human-facing ticket number.
    pub ticket_number: i64,
    /// Issue category.
    pub category: String,
    /// One-line summary.
    pub subject: String,
    /// Current status.
    pub status: String,
    /// The current owner, if any.
    pub owner_id: Option<i64>,
    /// Creation timestamp (RFC 3339).
    pub created_at: String,
    /// Last mutation timestamp (RFC 3339).
    pub updated_at: String,
}

impl TicketInfo {
    /// Projects a stored row into the customer-facing shape.
    #[must_use]
    pub fn from_row(row: &TicketRow) -> Self {
        Self {
            ticket_id: row.ticket_id,
            ticket_number: row.ticket_number,
            category: row.category.clone(),
            subject: row.subject.clone(),
            status: row.status.clone(),
            owner_id: row.owner_id,
            created_at: row.created_at.clone(),
            updated_at: row.updated_at.clone(),
        }
    }
}

/// Ticket fields exposed to staff and admins, including the customer
/// contact snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffTicketInfo {
    /// The canonical ticket identifier.
    pub ticket_id: i64,
    /// The human-facing ticket number.
    pub ticket_number: i64,
    /// The filing customer's identifier.
    pub customer_id: i64,
    /// Contact snapshot: name.
    pub customer_name: String,
    /// Contact snapshot: email.
    pub customer_email: String,
    /// Contact snapshot: phone.
    pub customer_phone: Option<String>,
    /// Optional order association.
    pub order_id: Option<i64>,
    /// Issue category.
    pub category: String,
    /// One-line summary.
    pub subject: String,
    /// Free-text description.
    pub description: String,
    /// Current status.
    pub status: String,
    /// The current owner, if any.
    pub owner_id: Option<i64>,
    /// Creation timestamp (RFC 3339).
    pub created_at: String,
    /// Last mutation timestamp (RFC 3339).
    pub updated_at: String,
}

impl StaffTicketInfo {
    /// Projects a stored row into the staff-facing shape.
    #[must_use]
    pub fn from_row(row: &TicketRow) -> Self {
        Self {
            ticket_id: row.ticket_id,
            ticket_number: row.ticket_number,
            customer_id: row.customer_id,
            customer_name: row.customer_name.clone(),
            customer_email: row.customer_email.clone(),
            customer_phone: row.customer_phone.clone(),
            order_id: row.order_id,
            category: row.category.clone(),
            subject: row.subject.clone(),
            description: row.description.clone(),
            status: row.status.clone(),
            owner_id: row.owner_id,
            created_at: row.created_at.clone(),
            updated_at: row.updated_at.clone(),
        }
    }
}

/// A comment in a ticket's conversation thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentInfo {
    /// The canonical comment identifier.
    pub comment_id: i64,
    /// The author's role at posting time.
    pub author_role: String,
    /// Display email snapshot.
    pub author_email: Option<String>,
    /// The message body.
    pub message: String,
    /// Creation timestamp (RFC 3339).
    pub created_at: String,
}

impl CommentInfo {
    /// Projects a stored row into the wire shape.
    #[must_use]
    pub fn from_row(row: &CommentRow) -> Self {
        Self {
            comment_id: row.comment_id,
            author_role: row.author_role.clone(),
            author_email: row.author_email.clone(),
            message: row.message.clone(),
            created_at: row.created_at.clone(),
        }
    }
}

/// Recorded feedback for a resolved ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackInfo {
    /// The canonical feedback identifier.
    pub feedback_id: i64,
    /// Star rating, 1-5.
    pub stars: i32,
    /// Optional free-text comment.
    pub comment: Option<String>,
    /// Creation timestamp (RFC 3339).
    pub created_at: String,
}

impl FeedbackInfo {
    /// Projects a stored row into the wire shape.
    #[must_use]
    pub fn from_row(row: &FeedbackRow) -> Self {
        Self {
            feedback_id: row.feedback_id,
            stars: row.stars,
            comment: row.comment.clone(),
            created_at: row.created_at.clone(),
        }
    }
}

/// Customer ticket detail: the ticket, its thread, the reply window, and
/// any feedback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerTicketDetailResponse {
    /// The ticket.
    pub ticket: TicketInfo,
    /// Free-text description (listed separately from the summary row).
    pub description: String,
    /// The conversation thread, oldest first.
    pub comments: Vec<CommentInfo>,
    /// Set when the comment fetch failed and the thread is missing rather
    /// than empty.
    pub comments_unavailable: bool,
    /// Whether the customer may currently reply (advisory; re-checked at
    /// write time).
    pub allow_customer_reply: bool,
    /// The reply deadline (RFC 3339), if one has started.
    pub reply_deadline: Option<String>,
    /// Feedback, if submitted.
    pub feedback: Option<FeedbackInfo>,
}

/// Staff ticket detail: the full row, its thread, and any feedback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffTicketDetailResponse {
    /// The ticket with contact snapshot.
    pub ticket: StaffTicketInfo,
    /// The conversation thread, oldest first.
    pub comments: Vec<CommentInfo>,
    /// Set when the comment fetch failed and the thread is missing rather
    /// than empty.
    pub comments_unavailable: bool,
    /// Feedback, if submitted.
    pub feedback: Option<FeedbackInfo>,
}

/// API request to post a comment.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ReplyRequest {
    /// The message body.
    pub message: String,
}

/// API response for a posted comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyResponse {
    /// The appended comment.
    pub comment: CommentInfo,
    /// The ticket after the reply (status may have changed via reopen).
    pub ticket: TicketInfo,
    /// Whether this reply reopened a resolved ticket.
    pub reopened: bool,
}

/// API request to submit feedback.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FeedbackRequest {
    /// Star rating, 1-5.
    pub stars: i32,
    /// Optional free-text comment.
    pub comment: Option<String>,
}

/// API response for submitted feedback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitFeedbackResponse {
    /// The recorded feedback.
    pub feedback: FeedbackInfo,
    /// A success message.
    pub message: String,
}

/// API request to claim a ticket (assign to self).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ClaimTicketRequest {
    /// Optional explicit status; defaults to `In Progress`.
    pub status: Option<String>,
}

/// API request to update a ticket's status.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct UpdateStatusRequest {
    /// The new status; must be one of the six recognized values.
    pub status: String,
}

/// API request for admin reassignment.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ReassignTicketRequest {
    /// The new owner's profile ID, or `None` to unassign.
    pub owner_id: Option<i64>,
    /// Optional simultaneous status change.
    pub status: Option<String>,
}

/// API response for claim, status-update, and reassignment operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketActionResponse {
    /// The ticket after the operation.
    pub ticket: StaffTicketInfo,
    /// A success message.
    pub message: String,
}

/// A profile eligible to own tickets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignableUserInfo {
    /// The canonical profile identifier.
    pub profile_id: i64,
    /// The display name.
    pub display_name: String,
    /// The email address.
    pub email: String,
    /// The role (staff or admin).
    pub role: String,
}

impl AssignableUserInfo {
    /// Projects a profile row into the wire shape.
    #[must_use]
    pub fn from_profile(profile: &ProfileData) -> Self {
        Self {
            profile_id: profile.profile_id,
            display_name: profile.display_name.clone(),
            email: profile.email.clone(),
            role: profile.role.clone(),
        }
    }
}

/// API response listing assignable profiles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListAssignableUsersResponse {
    /// Profiles with role staff or admin, enabled only.
    pub users: Vec<AssignableUserInfo>,
}

/// API request to provision a staff or admin account.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CreateStaffRequest {
    /// The display name.
    pub name: String,
    /// The email address.
    pub email: String,
    /// The password.
    pub password: String,
    /// The role: "staff" or "admin".
    pub role: String,
}
