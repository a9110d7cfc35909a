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

use axum::{
    Json, Router,
    extract::{Path, State as AxumState},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tracing::{info, warn};

use bistro_desk_api::{
    ApiError, AssignableUserInfo, AuthError, AuthenticatedActor, AuthenticationService,
    ClaimTicketRequest, CreateStaffRequest, CreateTicketRequest, CustomerTicketDetailResponse,
    FeedbackRequest, ListAssignableUsersResponse, LoginRequest, ProfileInfo,
    ReassignTicketRequest, ReplyRequest, ReplyResponse, SessionResponse, SignupRequest,
    StaffTicketDetailResponse, StaffTicketInfo, SubmitFeedbackResponse, TicketActionResponse,
    TicketInfo, UpdateStatusRequest,
};
use bistro_desk_persistence::Persistence;

/// Bistro Desk Server - HTTP server for the restaurant support platform
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long)]
    database: Option<String>,

    /// Port to bind the server to
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// Provision an admin account with this email at startup if it does
    /// not already exist. Requires `--admin-password`.
    #[arg(long, requires = "admin_password")]
    admin_email: Option<String>,

    /// Password for the provisioned admin account.
    #[arg(long, requires = "admin_email")]
    admin_password: Option<String>,
}

/// Application state shared across handlers.
///
/// All ticket state lives in the store; request handlers hold no ticket
/// state of their own. The mutex serializes store access within this
/// process, while the race-prone writes stay conditional at the row level.
#[derive(Clone)]
struct AppState {
    /// The persistence layer.
    persistence: Arc<Mutex<Persistence>>,
}

/// API response for listing the customer's own tickets.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct MyTicketsResponse {
    /// The customer's tickets, newest first.
    tickets: Vec<TicketInfo>,
}

/// API response for the staff ticket list.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct AllTicketsResponse {
    /// All tickets, newest first.
    tickets: Vec<StaffTicketInfo>,
}

/// API response for logout.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct LogoutResponse {
    /// Success indicator.
    success: bool,
}

/// Error response type.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorResponse {
    /// Error indicator.
    error: bool,
    /// Error message.
    message: String,
}

/// HTTP error wrapper that implements `IntoResponse`.
struct HttpError {
    /// The HTTP status code.
    status: StatusCode,
    /// The error message.
    message: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let status: StatusCode = match err {
            ApiError::AuthenticationFailed { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Unauthorized { .. } => StatusCode::FORBIDDEN,
            ApiError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            ApiError::PasswordPolicyViolation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::Dependency { .. } => StatusCode::BAD_GATEWAY,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl From<AuthError> for HttpError {
    fn from(err: AuthError) -> Self {
        let status: StatusCode = match err {
            AuthError::AuthenticationFailed { .. } => StatusCode::UNAUTHORIZED,
            AuthError::Unauthorized { .. } => StatusCode::FORBIDDEN,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

/// Extracts the bearer token from the Authorization header.
fn bearer_token(headers: &HeaderMap) -> Result<String, HttpError> {
    let value: &str = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| HttpError {
            status: StatusCode::UNAUTHORIZED,
            message: String::from("Missing bearer token"),
        })?;

    value
        .strip_prefix("Bearer ")
        .map(ToString::to_string)
        .ok_or_else(|| HttpError {
            status: StatusCode::UNAUTHORIZED,
            message: String::from("Authorization header must be 'Bearer <token>'"),
        })
}

/// Resolves the request's bearer credential to an authenticated actor.
async fn authenticate(
    app_state: &AppState,
    headers: &HeaderMap,
) -> Result<AuthenticatedActor, HttpError> {
    let token: String = bearer_token(headers)?;
    let mut persistence = app_state.persistence.lock().await;
    let actor: AuthenticatedActor = AuthenticationService::validate_session(
        &mut persistence,
        &token,
        OffsetDateTime::now_utc(),
    )?;
    drop(persistence);
    Ok(actor)
}

fn profile_info(actor: &AuthenticatedActor) -> ProfileInfo {
    ProfileInfo {
        profile_id: actor.id.value(),
        email: actor.email.clone(),
        display_name: actor.display_name.clone(),
        role: actor.role.as_str().to_string(),
    }
}

// ============================================================================
// Auth handlers
// ============================================================================

/// Handler for POST `/auth/signup`.
async fn handle_signup(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), HttpError> {
    info!(email = %req.email, "Handling signup request");

    let mut persistence = app_state.persistence.lock().await;
    let (token, actor) = AuthenticationService::signup(
        &mut persistence,
        &req.name,
        &req.email,
        req.phone.as_deref(),
        &req.password,
        OffsetDateTime::now_utc(),
    )?;
    drop(persistence);

    Ok((
        StatusCode::CREATED,
        Json(SessionResponse {
            token,
            profile: profile_info(&actor),
        }),
    ))
}

/// Handler for POST `/auth/login`.
async fn handle_login(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, HttpError> {
    info!(email = %req.email, "Handling login request");

    let mut persistence = app_state.persistence.lock().await;
    let (token, actor) = AuthenticationService::login(
        &mut persistence,
        &req.email,
        &req.password,
        OffsetDateTime::now_utc(),
    )?;
    drop(persistence);

    Ok(Json(SessionResponse {
        token,
        profile: profile_info(&actor),
    }))
}

/// Handler for POST `/auth/logout`.
async fn handle_logout(
    AxumState(app_state): AxumState<AppState>,
    headers: HeaderMap,
) -> Result<Json<LogoutResponse>, HttpError> {
    let token: String = bearer_token(&headers)?;
    let mut persistence = app_state.persistence.lock().await;
    AuthenticationService::logout(&mut persistence, &token)?;
    drop(persistence);

    Ok(Json(LogoutResponse { success: true }))
}

/// Handler for GET `/auth/me`.
async fn handle_whoami(
    AxumState(app_state): AxumState<AppState>,
    headers: HeaderMap,
) -> Result<Json<ProfileInfo>, HttpError> {
    let actor: AuthenticatedActor = authenticate(&app_state, &headers).await?;
    Ok(Json(profile_info(&actor)))
}

// ============================================================================
// Customer ticket handlers
// ============================================================================

/// Handler for POST `/tickets`.
async fn handle_create_ticket(
    AxumState(app_state): AxumState<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateTicketRequest>,
) -> Result<(StatusCode, Json<TicketInfo>), HttpError> {
    let actor: AuthenticatedActor = authenticate(&app_state, &headers).await?;
    info!(customer_id = actor.id.value(), category = %req.category, "Handling create_ticket request");

    let mut persistence = app_state.persistence.lock().await;
    let ticket: TicketInfo = bistro_desk_api::create_ticket(
        &mut persistence,
        &req,
        &actor,
        OffsetDateTime::now_utc(),
    )?;
    drop(persistence);

    Ok((StatusCode::CREATED, Json(ticket)))
}

/// Handler for GET `/tickets/mine`.
async fn handle_list_my_tickets(
    AxumState(app_state): AxumState<AppState>,
    headers: HeaderMap,
) -> Result<Json<MyTicketsResponse>, HttpError> {
    let actor: AuthenticatedActor = authenticate(&app_state, &headers).await?;

    let mut persistence = app_state.persistence.lock().await;
    let tickets: Vec<TicketInfo> = bistro_desk_api::list_my_tickets(&mut persistence, &actor)?;
    drop(persistence);

    Ok(Json(MyTicketsResponse { tickets }))
}

/// Handler for GET `/tickets/mine/{id}`.
async fn handle_my_ticket_detail(
    AxumState(app_state): AxumState<AppState>,
    headers: HeaderMap,
    Path(ticket_id): Path<i64>,
) -> Result<Json<CustomerTicketDetailResponse>, HttpError> {
    let actor: AuthenticatedActor = authenticate(&app_state, &headers).await?;

    let mut persistence = app_state.persistence.lock().await;
    let detail: CustomerTicketDetailResponse = bistro_desk_api::get_my_ticket_detail(
        &mut persistence,
        ticket_id,
        &actor,
        OffsetDateTime::now_utc(),
    )?;
    drop(persistence);

    Ok(Json(detail))
}

/// Handler for POST `/tickets/mine/{id}/comments`.
async fn handle_customer_reply(
    AxumState(app_state): AxumState<AppState>,
    headers: HeaderMap,
    Path(ticket_id): Path<i64>,
    Json(req): Json<ReplyRequest>,
) -> Result<(StatusCode, Json<ReplyResponse>), HttpError> {
    let actor: AuthenticatedActor = authenticate(&app_state, &headers).await?;
    info!(ticket_id, customer_id = actor.id.value(), "Handling customer reply");

    let mut persistence = app_state.persistence.lock().await;
    let response: ReplyResponse = bistro_desk_api::customer_reply(
        &mut persistence,
        ticket_id,
        &req,
        &actor,
        OffsetDateTime::now_utc(),
    )?;
    drop(persistence);

    Ok((StatusCode::CREATED, Json(response)))
}

/// Handler for POST `/tickets/mine/{id}/feedback`.
async fn handle_submit_feedback(
    AxumState(app_state): AxumState<AppState>,
    headers: HeaderMap,
    Path(ticket_id): Path<i64>,
    Json(req): Json<FeedbackRequest>,
) -> Result<(StatusCode, Json<SubmitFeedbackResponse>), HttpError> {
    let actor: AuthenticatedActor = authenticate(&app_state, &headers).await?;
    info!(ticket_id, stars = req.stars, "Handling feedback submission");

    let mut persistence = app_state.persistence.lock().await;
    let response: SubmitFeedbackResponse = bistro_desk_api::submit_feedback(
        &mut persistence,
        ticket_id,
        &req,
        &actor,
        OffsetDateTime::now_utc(),
    )?;
    drop(persistence);

    Ok((StatusCode::CREATED, Json(response)))
}

// ============================================================================
// Staff/admin ticket handlers
// ============================================================================

/// Handler for GET `/tickets`.
async fn handle_list_tickets(
    AxumState(app_state): AxumState<AppState>,
    headers: HeaderMap,
) -> Result<Json<AllTicketsResponse>, HttpError> {
    let actor: AuthenticatedActor = authenticate(&app_state, &headers).await?;

    let mut persistence = app_state.persistence.lock().await;
    let tickets: Vec<StaffTicketInfo> = bistro_desk_api::list_tickets(&mut persistence, &actor)?;
    drop(persistence);

    Ok(Json(AllTicketsResponse { tickets }))
}

/// Handler for GET `/tickets/{id}`.
async fn handle_ticket_detail(
    AxumState(app_state): AxumState<AppState>,
    headers: HeaderMap,
    Path(ticket_id): Path<i64>,
) -> Result<Json<StaffTicketDetailResponse>, HttpError> {
    let actor: AuthenticatedActor = authenticate(&app_state, &headers).await?;

    let mut persistence = app_state.persistence.lock().await;
    let detail: StaffTicketDetailResponse =
        bistro_desk_api::get_ticket_detail(&mut persistence, ticket_id, &actor)?;
    drop(persistence);

    Ok(Json(detail))
}

/// Handler for POST `/tickets/{id}/comments`.
async fn handle_agent_reply(
    AxumState(app_state): AxumState<AppState>,
    headers: HeaderMap,
    Path(ticket_id): Path<i64>,
    Json(req): Json<ReplyRequest>,
) -> Result<(StatusCode, Json<ReplyResponse>), HttpError> {
    let actor: AuthenticatedActor = authenticate(&app_state, &headers).await?;
    info!(ticket_id, agent_id = actor.id.value(), "Handling agent reply");

    let mut persistence = app_state.persistence.lock().await;
    let response: ReplyResponse = bistro_desk_api::agent_reply(
        &mut persistence,
        ticket_id,
        &req,
        &actor,
        OffsetDateTime::now_utc(),
    )?;
    drop(persistence);

    Ok((StatusCode::CREATED, Json(response)))
}

/// Handler for PATCH `/tickets/{id}/assign-self`.
async fn handle_assign_self(
    AxumState(app_state): AxumState<AppState>,
    headers: HeaderMap,
    Path(ticket_id): Path<i64>,
    Json(req): Json<ClaimTicketRequest>,
) -> Result<Json<TicketActionResponse>, HttpError> {
    let actor: AuthenticatedActor = authenticate(&app_state, &headers).await?;
    info!(ticket_id, agent_id = actor.id.value(), "Handling assign-self request");

    let mut persistence = app_state.persistence.lock().await;
    let response: TicketActionResponse = bistro_desk_api::claim_ticket(
        &mut persistence,
        ticket_id,
        &req,
        &actor,
        OffsetDateTime::now_utc(),
    )?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for PATCH `/tickets/{id}/status`.
async fn handle_update_status(
    AxumState(app_state): AxumState<AppState>,
    headers: HeaderMap,
    Path(ticket_id): Path<i64>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<TicketActionResponse>, HttpError> {
    let actor: AuthenticatedActor = authenticate(&app_state, &headers).await?;
    info!(ticket_id, status = %req.status, "Handling status update");

    let mut persistence = app_state.persistence.lock().await;
    let response: TicketActionResponse = bistro_desk_api::update_status(
        &mut persistence,
        ticket_id,
        &req,
        &actor,
        OffsetDateTime::now_utc(),
    )?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for PATCH `/tickets/{id}/assign-staff`.
async fn handle_assign_staff(
    AxumState(app_state): AxumState<AppState>,
    headers: HeaderMap,
    Path(ticket_id): Path<i64>,
    Json(req): Json<ReassignTicketRequest>,
) -> Result<Json<TicketActionResponse>, HttpError> {
    let actor: AuthenticatedActor = authenticate(&app_state, &headers).await?;
    info!(ticket_id, owner_id = ?req.owner_id, "Handling assign-staff request");

    let mut persistence = app_state.persistence.lock().await;
    let response: TicketActionResponse = bistro_desk_api::reassign_ticket(
        &mut persistence,
        ticket_id,
        &req,
        &actor,
        OffsetDateTime::now_utc(),
    )?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for GET `/staff/assignable`.
async fn handle_list_assignable(
    AxumState(app_state): AxumState<AppState>,
    headers: HeaderMap,
) -> Result<Json<ListAssignableUsersResponse>, HttpError> {
    let actor: AuthenticatedActor = authenticate(&app_state, &headers).await?;

    let mut persistence = app_state.persistence.lock().await;
    let response: ListAssignableUsersResponse =
        bistro_desk_api::list_assignable_users(&mut persistence, &actor)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for POST `/staff`.
async fn handle_create_staff(
    AxumState(app_state): AxumState<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateStaffRequest>,
) -> Result<(StatusCode, Json<AssignableUserInfo>), HttpError> {
    let actor: AuthenticatedActor = authenticate(&app_state, &headers).await?;
    info!(email = %req.email, role = %req.role, "Handling staff provisioning");

    let mut persistence = app_state.persistence.lock().await;
    let profile: AssignableUserInfo =
        bistro_desk_api::create_staff_profile(&mut persistence, &req, &actor)?;
    drop(persistence);

    Ok((StatusCode::CREATED, Json(profile)))
}

/// Builds the application router.
fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/auth/signup", post(handle_signup))
        .route("/auth/login", post(handle_login))
        .route("/auth/logout", post(handle_logout))
        .route("/auth/me", get(handle_whoami))
        .route("/tickets", post(handle_create_ticket))
        .route("/tickets", get(handle_list_tickets))
        .route("/tickets/mine", get(handle_list_my_tickets))
        .route("/tickets/mine/{id}", get(handle_my_ticket_detail))
        .route("/tickets/mine/{id}/comments", post(handle_customer_reply))
        .route("/tickets/mine/{id}/feedback", post(handle_submit_feedback))
        .route("/tickets/{id}", get(handle_ticket_detail))
        .route("/tickets/{id}/comments", post(handle_agent_reply))
        .route("/tickets/{id}/assign-self", patch(handle_assign_self))
        .route("/tickets/{id}/status", patch(handle_update_status))
        .route("/tickets/{id}/assign-staff", patch(handle_assign_staff))
        .route("/staff/assignable", get(handle_list_assignable))
        .route("/staff", post(handle_create_staff))
        .with_state(app_state)
}

/// Provisions the startup admin account if requested and absent.
fn provision_admin(
    persistence: &mut Persistence,
    email: &str,
    password: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    if persistence.get_profile_by_email(email)?.is_some() {
        info!(email, "Admin account already exists; skipping provisioning");
        return Ok(());
    }
    persistence.create_profile(email, "Administrator", None, password, "admin")?;
    info!(email, "Provisioned startup admin account");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args: Args = Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing Bistro Desk Server");

    // Initialize persistence (in-memory or file-based based on CLI argument)
    let mut persistence: Persistence = if let Some(db_path) = &args.database {
        info!("Using file-based database at: {}", db_path);
        Persistence::new_with_file(db_path)?
    } else {
        info!("Using in-memory database");
        Persistence::new_in_memory()?
    };

    if let (Some(email), Some(password)) = (&args.admin_email, &args.admin_password) {
        provision_admin(&mut persistence, email, password)?;
    } else if persistence.list_assignable_profiles()?.is_empty() {
        warn!(
            "No staff or admin accounts exist; tickets cannot be worked until one is provisioned"
        );
    }

    let app_state: AppState = AppState {
        persistence: Arc::new(Mutex::new(persistence)),
    };

    // Build router
    let app: Router = build_router(app_state);

    // Bind to address
    let addr: std::net::SocketAddr = format!("127.0.0.1:{}", args.port).parse()?;
    info!("Server listening on {}", addr);

    // Run server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
