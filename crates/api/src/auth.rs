// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Authentication and role-gate services.
//!
//! Session-token authentication resolves a bearer credential to an
//! [`AuthenticatedActor`]; the per-ticket ownership matrix lives in the
//! domain crate and is evaluated by the engine. The gates here cover only
//! the collection-level endpoints (ticket lists, the assignable directory)
//! where no single ticket snapshot exists to authorize against.

use crate::error::AuthError;
use crate::password_policy::PasswordPolicy;
use bistro_desk_domain::{Actor, Role, UserId, normalize_email};
use bistro_desk_persistence::{Persistence, ProfileData, SessionData};
use time::{Duration, OffsetDateTime};

/// An authenticated platform user with an associated role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedActor {
    /// The user's canonical identifier.
    pub id: UserId,
    /// The resolved role.
    pub role: Role,
    /// The account email (used as the comment author snapshot).
    pub email: String,
    /// The display name.
    pub display_name: String,
}

impl AuthenticatedActor {
    /// Builds an actor from a loaded profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored role does not parse.
    fn from_profile(profile: &ProfileData) -> Result<Self, AuthError> {
        let role: Role = profile
            .parsed_role()
            .map_err(|e| AuthError::AuthenticationFailed {
                reason: e.to_string(),
            })?;
        Ok(Self {
            id: UserId::new(profile.profile_id),
            role,
            email: profile.email.clone(),
            display_name: profile.display_name.clone(),
        })
    }

    /// Returns the `(user_id, role)` pair the engine consumes.
    #[must_use]
    pub const fn to_actor(&self) -> Actor {
        Actor::new(self.id, self.role)
    }
}

/// Role gates for collection-level endpoints.
pub struct AuthorizationService;

impl AuthorizationService {
    /// Requires the customer role.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is staff or admin.
    pub fn require_customer(actor: &AuthenticatedActor, action: &str) -> Result<(), AuthError> {
        if actor.role == Role::Customer {
            Ok(())
        } else {
            Err(AuthError::Unauthorized {
                action: action.to_string(),
                required_role: String::from("Customer"),
            })
        }
    }

    /// Requires the staff or admin role.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is a customer.
    pub fn require_agent(actor: &AuthenticatedActor, action: &str) -> Result<(), AuthError> {
        if actor.role.is_agent() {
            Ok(())
        } else {
            Err(AuthError::Unauthorized {
                action: action.to_string(),
                required_role: String::from("Staff/Admin"),
            })
        }
    }

    /// Requires the admin role.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is not an admin.
    pub fn require_admin(actor: &AuthenticatedActor, action: &str) -> Result<(), AuthError> {
        if actor.role == Role::Admin {
            Ok(())
        } else {
            Err(AuthError::Unauthorized {
                action: action.to_string(),
                required_role: String::from("Admin"),
            })
        }
    }
}

/// Session-based authentication service.
pub struct AuthenticationService;

impl AuthenticationService {
    /// Default session expiration duration (30 days).
    const DEFAULT_SESSION_EXPIRATION: Duration = Duration::days(30);

    /// Registers a customer account and opens a session for it.
    ///
    /// Staff and admin accounts are provisioned by an admin operation, not
    /// through public signup.
    ///
    /// # Arguments
    ///
    /// * `persistence` - The persistence layer
    /// * `display_name` - The display name
    /// * `email` - The email address (normalized to lowercase)
    /// * `phone` - Optional contact phone
    /// * `password` - The plain-text password (policy-checked, then hashed)
    /// * `now` - The current instant
    ///
    /// # Returns
    ///
    /// A tuple of (`session_token`, `authenticated_actor`).
    ///
    /// # Errors
    ///
    /// Returns an error if validation, the policy check, or persistence
    /// fails.
    pub fn signup(
        persistence: &mut Persistence,
        display_name: &str,
        email: &str,
        phone: Option<&str>,
        password: &str,
        now: OffsetDateTime,
    ) -> Result<(String, AuthenticatedActor), crate::error::ApiError> {
        let display_name: String =
            bistro_desk_domain::require_non_empty("name", display_name)
                .map_err(crate::error::translate_domain_error)?;
        let email: String =
            normalize_email(email).map_err(crate::error::translate_domain_error)?;

        PasswordPolicy::default().validate(password, &email, &display_name)?;

        let profile_id: i64 = persistence
            .create_profile(
                &email,
                &display_name,
                phone,
                password,
                Role::Customer.as_str(),
            )
            .map_err(crate::error::translate_persistence_error)?;

        let profile: ProfileData = persistence
            .get_profile_by_id(profile_id)
            .map_err(crate::error::translate_persistence_error)?
            .ok_or_else(|| crate::error::ApiError::Internal {
                message: String::from("Profile disappeared after creation"),
            })?;

        let actor: AuthenticatedActor = AuthenticatedActor::from_profile(&profile)?;
        let token: String = Self::open_session(persistence, profile.profile_id, now)
            .map_err(crate::error::ApiError::from)?;

        Ok((token, actor))
    }

    /// Authenticates an account and creates a session.
    ///
    /// # Arguments
    ///
    /// * `persistence` - The persistence layer
    /// * `email` - The account email
    /// * `password` - The plain-text password
    /// * `now` - The current instant
    ///
    /// # Returns
    ///
    /// A tuple of (`session_token`, `authenticated_actor`).
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are invalid or the account is
    /// disabled. Unknown addresses and wrong passwords produce the same
    /// message.
    pub fn login(
        persistence: &mut Persistence,
        email: &str,
        password: &str,
        now: OffsetDateTime,
    ) -> Result<(String, AuthenticatedActor), AuthError> {
        let email: String =
            normalize_email(email).map_err(|_| AuthError::AuthenticationFailed {
                reason: String::from("Invalid email or password"),
            })?;

        let profile: ProfileData = persistence
            .get_profile_by_email(&email)
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| AuthError::AuthenticationFailed {
                reason: String::from("Invalid email or password"),
            })?;

        if profile.is_disabled() {
            return Err(AuthError::AuthenticationFailed {
                reason: String::from("Account is disabled"),
            });
        }

        let verified: bool = persistence
            .verify_password(password, &profile.password_hash)
            .map_err(Self::map_persistence_error)?;
        if !verified {
            return Err(AuthError::AuthenticationFailed {
                reason: String::from("Invalid email or password"),
            });
        }

        persistence
            .update_last_login(profile.profile_id, now)
            .map_err(Self::map_persistence_error)?;

        let actor: AuthenticatedActor = AuthenticatedActor::from_profile(&profile)?;
        let token: String = Self::open_session(persistence, profile.profile_id, now)?;

        Ok((token, actor))
    }

    /// Validates a session token and returns the authenticated actor.
    ///
    /// # Errors
    ///
    /// Returns an error if the session is unknown or expired, or the
    /// account is disabled.
    pub fn validate_session(
        persistence: &mut Persistence,
        session_token: &str,
        now: OffsetDateTime,
    ) -> Result<AuthenticatedActor, AuthError> {
        let session: SessionData = persistence
            .get_session_by_token(session_token)
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| AuthError::AuthenticationFailed {
                reason: String::from("Invalid session token"),
            })?;

        let expires_at: OffsetDateTime = bistro_desk_persistence::parse_timestamp(
            &session.expires_at,
        )
        .map_err(|e| AuthError::AuthenticationFailed {
            reason: format!("Failed to parse session expiration: {e}"),
        })?;

        if now > expires_at {
            return Err(AuthError::AuthenticationFailed {
                reason: String::from("Session expired"),
            });
        }

        let profile: ProfileData = persistence
            .get_profile_by_id(session.profile_id)
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| AuthError::AuthenticationFailed {
                reason: String::from("Profile not found"),
            })?;

        if profile.is_disabled() {
            return Err(AuthError::AuthenticationFailed {
                reason: String::from("Account is disabled"),
            });
        }

        persistence
            .update_session_activity(session.session_id, now)
            .map_err(Self::map_persistence_error)?;

        AuthenticatedActor::from_profile(&profile)
    }

    /// Logs out by deleting the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn logout(persistence: &mut Persistence, session_token: &str) -> Result<(), AuthError> {
        persistence
            .delete_session(session_token)
            .map_err(Self::map_persistence_error)
    }

    /// Mints a token and records the session row.
    fn open_session(
        persistence: &mut Persistence,
        profile_id: i64,
        now: OffsetDateTime,
    ) -> Result<String, AuthError> {
        let token: String = Self::generate_session_token();
        let expires_at: OffsetDateTime = now + Self::DEFAULT_SESSION_EXPIRATION;

        persistence
            .create_session(&token, profile_id, expires_at, now)
            .map_err(Self::map_persistence_error)?;

        Ok(token)
    }

    /// Generates an unguessable session token.
    fn generate_session_token() -> String {
        format!("session_{:032x}", rand::random::<u128>())
    }

    /// Maps persistence errors to authentication errors.
    fn map_persistence_error(err: bistro_desk_persistence::PersistenceError) -> AuthError {
        AuthError::AuthenticationFailed {
            reason: format!("Database error: {err}"),
        }
    }
}
