// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use crate::password_policy::PasswordPolicyError;
use bistro_desk::CoreError;
use bistro_desk_domain::DomainError;
use bistro_desk_persistence::PersistenceError;

/// Authentication and authorization errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role} role")
            }
        }
    }
}

impl std::error::Error for AuthError {}

/// API-level errors.
///
/// These are distinct from domain/core errors and represent the API
/// contract: one kind per status class the transport layer renders. Validation
/// and authorization failures stay separate so callers can distinguish
/// "bad request" from "forbidden", and customer-scoped not-found responses
/// never reveal whether a foreign ticket exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// The actor's role or ownership does not permit the operation.
    Unauthorized {
        /// A human-readable description of the denial.
        message: String,
    },
    /// Invalid input was provided.
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// A requested resource was not found (or is not visible to the actor).
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// The operation conflicts with concurrent or prior state: a lost
    /// claim race or duplicate feedback/email.
    Conflict {
        /// A human-readable description of the conflict.
        message: String,
    },
    /// The backing store failed; the request may be retried.
    Dependency {
        /// A description of the dependency failure.
        message: String,
    },
    /// An internal error occurred.
    Internal {
        /// A description of the internal error.
        message: String,
    },
    /// Password policy violation.
    PasswordPolicyViolation {
        /// A human-readable description of the policy violation.
        message: String,
    },
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized { message } => write!(f, "Unauthorized: {message}"),
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::ResourceNotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
            Self::Conflict { message } => write!(f, "Conflict: {message}"),
            Self::Dependency { message } => write!(f, "Dependency failure: {message}"),
            Self::Internal { message } => write!(f, "Internal error: {message}"),
            Self::PasswordPolicyViolation { message } => {
                write!(f, "Password policy violation: {message}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationFailed { reason } => Self::AuthenticationFailed { reason },
            AuthError::Unauthorized {
                action,
                required_role,
            } => Self::Unauthorized {
                message: format!("'{action}' requires {required_role} role"),
            },
        }
    }
}

impl From<PasswordPolicyError> for ApiError {
    fn from(err: PasswordPolicyError) -> Self {
        Self::PasswordPolicyViolation {
            message: err.to_string(),
        }
    }
}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not leaked
/// directly. Rule denials become `Unauthorized`; malformed input becomes
/// `InvalidInput`.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    match err {
        DomainError::EmptyField { field } => ApiError::InvalidInput {
            field: field.to_string(),
            message: format!("Field '{field}' must not be empty"),
        },
        DomainError::FieldTooLong { field, max } => ApiError::InvalidInput {
            field: field.to_string(),
            message: format!("Field '{field}' exceeds the maximum of {max} characters"),
        },
        DomainError::InvalidEmail(email) => ApiError::InvalidInput {
            field: String::from("email"),
            message: format!("Invalid email address: '{email}'"),
        },
        DomainError::InvalidStatus(status) => ApiError::InvalidInput {
            field: String::from("status"),
            message: format!("Invalid ticket status: '{status}'"),
        },
        DomainError::InvalidRole(role) => ApiError::InvalidInput {
            field: String::from("role"),
            message: format!("Invalid role: '{role}'"),
        },
        DomainError::InvalidStars { stars } => ApiError::InvalidInput {
            field: String::from("stars"),
            message: format!("Star rating must be between 1 and 5, got {stars}"),
        },
        DomainError::InvalidOrderReference { order_id } => ApiError::InvalidInput {
            field: String::from("order_id"),
            message: format!("Order {order_id} does not exist for this customer"),
        },
        DomainError::OwnerMustBeAgent { role } => ApiError::InvalidInput {
            field: String::from("owner_id"),
            message: format!("Ticket owner must be staff or admin, got role '{role}'"),
        },
        err @ (DomainError::RoleNotPermitted { .. }
        | DomainError::NotTicketCustomer
        | DomainError::MustClaimFirst
        | DomainError::OwnedByAnotherAgent
        | DomainError::ReplyWindowClosed { .. }
        | DomainError::FeedbackNotResolved { .. }) => ApiError::Unauthorized {
            message: err.to_string(),
        },
    }
}

/// Translates a core error into an API error.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
    }
}

/// Translates a persistence error into an API error.
///
/// Conflicts and not-found results map to their own kinds; everything else
/// surfaces as a retryable dependency failure rather than being swallowed.
#[must_use]
pub fn translate_persistence_error(err: PersistenceError) -> ApiError {
    match err {
        PersistenceError::ClaimConflict { ticket_id } => ApiError::Conflict {
            message: format!("Ticket {ticket_id} changed concurrently; please retry"),
        },
        PersistenceError::DuplicateFeedback { ticket_id } => ApiError::Conflict {
            message: format!("Feedback already exists for ticket {ticket_id}"),
        },
        PersistenceError::DuplicateEmail(email) => ApiError::Conflict {
            message: format!("A profile with email '{email}' already exists"),
        },
        PersistenceError::TicketNotFound(id) => ApiError::ResourceNotFound {
            resource_type: String::from("Ticket"),
            message: format!("Ticket {id} does not exist"),
        },
        PersistenceError::NotFound(msg)
        | PersistenceError::ProfileNotFound(msg)
        | PersistenceError::SessionNotFound(msg) => ApiError::ResourceNotFound {
            resource_type: String::from("Resource"),
            message: msg,
        },
        PersistenceError::SerializationError(msg) => ApiError::Internal { message: msg },
        err => ApiError::Dependency {
            message: err.to_string(),
        },
    }
}
