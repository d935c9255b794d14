//! Session authentication for the single permitted user.
//!
//! Sessions are opaque uuid tokens held in process memory and handed to
//! the browser as an HttpOnly cookie. Restarting the daemon logs the
//! user out, which is acceptable for a single-user tool.

use std::collections::HashMap;
use std::sync::Arc;

use axum::http::{header, HeaderMap};
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "triage_session";

/// In-process session store: token -> username.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, String>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session and return its token.
    pub async fn create(&self, username: &str) -> String {
        let token = Uuid::new_v4().simple().to_string();
        self.sessions
            .write()
            .await
            .insert(token.clone(), username.to_string());
        debug!("Session created for '{}' ({})", username, mask_token(&token));
        token
    }

    pub async fn username_for(&self, token: &str) -> Option<String> {
        self.sessions.read().await.get(token).cloned()
    }

    /// Remove a session. Returns the username it belonged to, if any.
    pub async fn revoke(&self, token: &str) -> Option<String> {
        let removed = self.sessions.write().await.remove(token);
        if removed.is_some() {
            debug!("Session revoked ({})", mask_token(token));
        }
        removed
    }
}

/// Compare a presented password against the configured SHA-256 digest.
pub fn verify_password(password: &str, expected_sha256_hex: &str) -> bool {
    let digest = hex::encode(Sha256::digest(password.as_bytes()));
    digest.eq_ignore_ascii_case(expected_sha256_hex)
}

/// Extract the session token from the request's Cookie header.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE).then(|| value.to_string())
    })
}

/// Cookie value that installs a session token in the browser.
pub fn session_cookie(token: &str) -> String {
    format!("{SESSION_COOKIE}={token}; HttpOnly; SameSite=Lax; Path=/")
}

/// Cookie value that clears the session in the browser.
pub fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0")
}

/// Mask token for logging (show first 8 chars only).
pub fn mask_token(token: &str) -> String {
    if token.len() > 8 {
        format!("{}...", &token[..8])
    } else {
        "***".to_string()
    }
}
