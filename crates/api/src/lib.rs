// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

mod auth;
mod error;
mod handlers;
mod password_policy;
mod request_response;

#[cfg(test)]
mod tests;

pub use auth::{AuthenticatedActor, AuthenticationService, AuthorizationService};
pub use error::{
    ApiError, AuthError, translate_core_error, translate_domain_error, translate_persistence_error,
};
pub use handlers::{
    agent_reply, claim_ticket, create_staff_profile, create_ticket, customer_reply,
    get_my_ticket_detail, get_ticket_detail, list_assignable_users, list_my_tickets, list_tickets,
    reassign_ticket, submit_feedback, update_status,
};
pub use password_policy::{PasswordPolicy, PasswordPolicyError};
pub use request_response::{
    AssignableUserInfo, ClaimTicketRequest, CommentInfo, CreateStaffRequest, CreateTicketRequest,
    CustomerTicketDetailResponse, FeedbackInfo, FeedbackRequest, ListAssignableUsersResponse,
    LoginRequest, ProfileInfo, ReassignTicketRequest, ReplyRequest, ReplyResponse,
    SessionResponse, SignupRequest, StaffTicketDetailResponse, StaffTicketInfo,
    SubmitFeedbackResponse, TicketActionResponse, TicketInfo, UpdateStatusRequest,
};
