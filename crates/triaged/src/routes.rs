//! API routes for triaged.
//!
//! Endpoint shapes and JSON field names stay compatible with the
//! original single-user triage frontend.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::{header, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{error, info};

use triage_common::{LoadError, LogScanner, MappingLoader, ScanError, TriageReport};

use crate::auth::{self, mask_token};
use crate::server::AppState;

type AppStateArc = Arc<AppState>;

const ALLOWED_LOG_EXTENSIONS: &[&str] = &["log", "txt", "out"];
const ALLOWED_MAPPING_EXTENSIONS: &[&str] = &["csv"];

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorBody>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
}

fn bad_request(message: impl Into<String>) -> ApiError {
    api_error(StatusCode::BAD_REQUEST, message)
}

/// Check if a filename carries an allowed extension.
fn allowed_file(filename: &str, allowed: &[&str]) -> bool {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| allowed.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Reduce an uploaded filename to a safe display form: final path
/// component only, restricted character set.
fn sanitize_filename(filename: &str) -> String {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename);
    base.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .collect()
}

/// Resolve the session on a protected route.
async fn require_session(state: &AppState, headers: &HeaderMap) -> Result<String, ApiError> {
    let token = auth::session_token(headers)
        .ok_or_else(|| api_error(StatusCode::UNAUTHORIZED, "Authentication required"))?;
    state
        .sessions
        .username_for(&token)
        .await
        .ok_or_else(|| api_error(StatusCode::UNAUTHORIZED, "Authentication required"))
}

// ============================================================================
// Health Routes
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}

pub fn health_routes() -> Router<AppStateArc> {
    Router::new().route("/api/health", get(health_check))
}

async fn health_check(State(state): State<AppStateArc>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
    })
}

// ============================================================================
// Auth Routes
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct AuthStatus {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

pub fn auth_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/api/login", post(login))
        .route("/api/logout", post(logout))
        .route("/api/check-auth", get(check_auth))
}

async fn login(
    State(state): State<AppStateArc>,
    Json(req): Json<LoginRequest>,
) -> Result<([(header::HeaderName, String); 1], Json<LoginResponse>), ApiError> {
    let username = req.username.trim();
    if username.is_empty() || req.password.is_empty() {
        return Err(bad_request("Username and password required"));
    }

    let creds = &state.config.auth;
    if username != creds.username || !auth::verify_password(&req.password, &creds.password_sha256)
    {
        info!("Rejected login for '{}'", username);
        return Err(api_error(
            StatusCode::UNAUTHORIZED,
            "Invalid username or password",
        ));
    }

    let token = state.sessions.create(username).await;
    info!("User '{}' logged in ({})", username, mask_token(&token));

    Ok((
        [(header::SET_COOKIE, auth::session_cookie(&token))],
        Json(LoginResponse {
            success: true,
            message: "Login successful".to_string(),
            username: username.to_string(),
        }),
    ))
}

async fn logout(
    State(state): State<AppStateArc>,
    headers: HeaderMap,
) -> ([(header::HeaderName, String); 1], Json<serde_json::Value>) {
    if let Some(token) = auth::session_token(&headers) {
        state.sessions.revoke(&token).await;
    }

    (
        [(header::SET_COOKIE, auth::clear_session_cookie())],
        Json(serde_json::json!({
            "success": true,
            "message": "Logged out successfully"
        })),
    )
}

async fn check_auth(
    State(state): State<AppStateArc>,
    headers: HeaderMap,
) -> Result<Json<AuthStatus>, (StatusCode, Json<AuthStatus>)> {
    match require_session(&state, &headers).await {
        Ok(username) => Ok(Json(AuthStatus {
            authenticated: true,
            username: Some(username),
        })),
        Err(_) => Err((
            StatusCode::UNAUTHORIZED,
            Json(AuthStatus {
                authenticated: false,
                username: None,
            }),
        )),
    }
}

// ============================================================================
// Triage Routes
// ============================================================================

/// One upload staged to disk. The temp file is released on drop, on every
/// exit path.
struct StagedUpload {
    filename: String,
    file: NamedTempFile,
}

#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mappings_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub fn triage_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/api/triage", post(perform_triage))
        .route("/api/validate-mappings", post(validate_mappings))
}

/// Stage one multipart file field to a temp file.
async fn stage_upload(
    field: axum::extract::multipart::Field<'_>,
    allowed: &[&str],
    type_error: &str,
) -> Result<Option<StagedUpload>, ApiError> {
    let filename = field.file_name().map(str::to_string).unwrap_or_default();
    if filename.is_empty() {
        // An empty file input submits a nameless part; treat as absent.
        return Ok(None);
    }
    if !allowed_file(&filename, allowed) {
        return Err(bad_request(type_error));
    }

    let bytes = field
        .bytes()
        .await
        .map_err(|e| bad_request(format!("Upload failed: {e}")))?;

    let staged = (|| -> std::io::Result<NamedTempFile> {
        let mut file = NamedTempFile::new()?;
        file.write_all(&bytes)?;
        file.flush()?;
        Ok(file)
    })();
    let file = staged.map_err(|e| {
        error!("Failed to stage upload: {}", e);
        api_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to stage upload")
    })?;

    Ok(Some(StagedUpload {
        filename: sanitize_filename(&filename),
        file,
    }))
}

/// Load + scan on the blocking pool; the core is synchronous by design.
async fn run_triage(
    mappings_path: PathBuf,
    log_path: PathBuf,
    max_errors: Option<usize>,
) -> Result<TriageReport, TriageFailure> {
    tokio::task::spawn_blocking(move || {
        let mappings = MappingLoader::new(&mappings_path)
            .load()
            .map_err(TriageFailure::Load)?;
        let outcome = LogScanner::new(&mappings)
            .scan(&log_path)
            .map_err(TriageFailure::Scan)?;
        Ok(TriageReport::new(
            &outcome.matches,
            mappings.len(),
            max_errors,
        ))
    })
    .await
    .map_err(|e| TriageFailure::Scan(ScanError::Io(e.to_string())))?
}

enum TriageFailure {
    Load(LoadError),
    Scan(ScanError),
}

impl From<TriageFailure> for ApiError {
    fn from(failure: TriageFailure) -> Self {
        match failure {
            TriageFailure::Load(e) => {
                bad_request(format!("Failed to load error mappings: {e}"))
            }
            TriageFailure::Scan(e) => {
                error!("Scan failed: {}", e);
                api_error(StatusCode::INTERNAL_SERVER_ERROR, format!("Server error: {e}"))
            }
        }
    }
}

async fn perform_triage(
    State(state): State<AppStateArc>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<TriageReport>, ApiError> {
    let username = require_session(&state, &headers).await?;

    let mut log_upload: Option<StagedUpload> = None;
    let mut mappings_upload: Option<StagedUpload> = None;
    let mut max_errors: Option<usize> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(format!("Invalid upload: {e}")))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "logfile" => {
                log_upload = stage_upload(
                    field,
                    ALLOWED_LOG_EXTENSIONS,
                    "Invalid log file type. Allowed: .log, .txt, .out",
                )
                .await?;
            }
            "mappings_file" => {
                mappings_upload = stage_upload(
                    field,
                    ALLOWED_MAPPING_EXTENSIONS,
                    "Invalid mappings file type. Allowed: .csv",
                )
                .await?;
            }
            "max_errors" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| bad_request(format!("Invalid upload: {e}")))?;
                // Values below 1 mean "no cap", as does an unparseable field.
                max_errors = text.trim().parse::<usize>().ok().filter(|&n| n >= 1);
            }
            _ => {}
        }
    }

    let log = log_upload.ok_or_else(|| bad_request("No log file provided"))?;

    let mappings_path = match &mappings_upload {
        Some(upload) => upload.file.path().to_path_buf(),
        None => state.config.mappings_path.clone(),
    };

    info!(
        "Triage request from '{}': log '{}', {} mapping table",
        username,
        log.filename,
        if mappings_upload.is_some() {
            "uploaded"
        } else {
            "default"
        }
    );

    let report = run_triage(mappings_path, log.file.path().to_path_buf(), max_errors).await?;
    info!(
        "Triage complete for '{}': {} match(es) from {} mappings",
        log.filename, report.total_errors, report.mappings_count
    );

    Ok(Json(report.with_log_filename(log.filename.clone())))
}

async fn validate_mappings(
    State(state): State<AppStateArc>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<ValidateResponse>, ApiError> {
    require_session(&state, &headers).await?;

    let mut upload: Option<StagedUpload> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(format!("Invalid upload: {e}")))?
    {
        if field.name() == Some("mappings_file") {
            upload = stage_upload(
                field,
                ALLOWED_MAPPING_EXTENSIONS,
                "Invalid mappings file type. Allowed: .csv",
            )
            .await?;
        }
    }

    let upload = upload.ok_or_else(|| bad_request("No mappings file provided"))?;

    let path = upload.file.path().to_path_buf();
    let loaded = tokio::task::spawn_blocking(move || MappingLoader::new(&path).load())
        .await
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    let response = match loaded {
        Ok(set) => ValidateResponse {
            valid: true,
            mappings_count: Some(set.len()),
            filename: Some(upload.filename.clone()),
            error: None,
        },
        Err(e) => ValidateResponse {
            valid: false,
            mappings_count: None,
            filename: None,
            error: Some(e.to_string()),
        },
    };

    Ok(Json(response))
}
