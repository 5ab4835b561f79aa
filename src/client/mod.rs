//! HTTP client for the portal API.
//!
//! Besides the plain data calls used by the CLI, this is where the two
//! session-layer contracts meet the wire: `PortalClient` implements the
//! refresh coordinator's `SessionProvider`/`ProfileStore` against
//! `GET /api/auth/whoami`, and routes explicit 401s from real data calls
//! through the session-expiry authority. The whoami path used by the
//! background refresh deliberately does not touch the authority.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::models::profile::Profile;
use crate::database::models::request::DesignRequest;
use crate::session::coordinator::{ProfileStore, SessionError, SessionProvider};
use crate::session::gate::CurrentSession;
use crate::session::{AuthGate, SessionExpiry, SessionUser};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Invalid server URL: {0}")]
    InvalidBaseUrl(String),

    #[error("Not signed in")]
    NotSignedIn,

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("Session expired")]
    Unauthorized,

    #[error("Server returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Unexpected response: {0}")]
    Decode(String),
}

pub struct PortalClient {
    http: reqwest::Client,
    base_url: String,
    token: RwLock<Option<String>>,
    gate: Arc<AuthGate>,
    expiry: SessionExpiry,
}

#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: SessionUser,
    pub profile: Profile,
    pub token: String,
    pub expires_in: i64,
}

impl PortalClient {
    pub fn new(base_url: &str, gate: Arc<AuthGate>) -> Result<Self, ClientError> {
        let parsed = url::Url::parse(base_url)
            .map_err(|e| ClientError::InvalidBaseUrl(format!("{}: {}", base_url, e)))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ClientError::InvalidBaseUrl(base_url.to_string()));
        }

        Ok(Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: RwLock::new(None),
            expiry: SessionExpiry::new(gate.clone()),
            gate,
        })
    }

    pub fn gate(&self) -> Arc<AuthGate> {
        self.gate.clone()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn set_token(&self, token: Option<String>) {
        *self.token.write().await = token;
    }

    async fn bearer(&self) -> Result<String, ClientError> {
        self.token
            .read()
            .await
            .clone()
            .ok_or(ClientError::NotSignedIn)
    }

    /// POST /auth/login. On success the token is retained and the gate is
    /// signed in.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, ClientError> {
        let resp = self
            .http
            .post(self.url("/auth/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        // A 401 here is just bad credentials, never a session expiry
        let data = unwrap_envelope(resp).await?;

        let token = data
            .get("token")
            .and_then(Value::as_str)
            .ok_or_else(|| ClientError::Decode("missing token".into()))?
            .to_string();
        let user: SessionUser = serde_json::from_value(
            data.get("user").cloned().unwrap_or(Value::Null),
        )
        .map_err(|e| ClientError::Decode(e.to_string()))?;
        let profile: Profile = serde_json::from_value(
            data.get("profile").cloned().unwrap_or(Value::Null),
        )
        .map_err(|e| ClientError::Decode(e.to_string()))?;
        let expires_in = data.get("expires_in").and_then(Value::as_i64).unwrap_or(0);

        self.set_token(Some(token.clone())).await;
        self.gate.sign_in(user.clone(), profile.clone()).await;

        Ok(LoginOutcome { user, profile, token, expires_in })
    }

    /// Client-side logout: discard the token and reset the gate.
    pub async fn logout(&self) {
        self.set_token(None).await;
        self.gate.sign_out().await;
    }

    /// Run the initial auth check against a previously saved token and mark
    /// the gate bootstrapped either way.
    pub async fn bootstrap(&self) -> Result<bool, ClientError> {
        let session = match self.fetch_whoami().await {
            Ok(Some((user, profile))) => Some(CurrentSession { user, profile }),
            Ok(None) => None,
            Err(SessionError::Network(msg)) => {
                // Offline start: stay signed out but usable
                tracing::warn!("Auth check failed during startup: {}", msg);
                None
            }
            Err(SessionError::Backend(msg)) => return Err(ClientError::Decode(msg)),
        };
        let authenticated = session.is_some();
        self.gate.complete_bootstrap(session).await;
        Ok(authenticated)
    }

    /// GET /api/auth/whoami, with 401 and missing-token folded into
    /// Ok(None). Transport problems surface as SessionError::Network so the
    /// refresh coordinator can treat them as ambiguous.
    async fn fetch_whoami(&self) -> Result<Option<(SessionUser, Profile)>, SessionError> {
        let token = match self.token.read().await.clone() {
            Some(token) => token,
            None => return Ok(None),
        };

        let resp = self
            .http
            .get(self.url("/api/auth/whoami"))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| SessionError::Network(e.to_string()))?;

        if resp.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(SessionError::Backend(format!(
                "whoami returned {}",
                resp.status()
            )));
        }

        let body: Value = resp
            .json()
            .await
            .map_err(|e| SessionError::Backend(e.to_string()))?;
        let data = body
            .get("data")
            .cloned()
            .ok_or_else(|| SessionError::Backend("missing data envelope".into()))?;

        let user: SessionUser =
            serde_json::from_value(data.get("user").cloned().unwrap_or(Value::Null))
                .map_err(|e| SessionError::Backend(e.to_string()))?;
        let profile: Profile =
            serde_json::from_value(data.get("profile").cloned().unwrap_or(Value::Null))
                .map_err(|e| SessionError::Backend(e.to_string()))?;

        Ok(Some((user, profile)))
    }

    // ---- authenticated data calls ----
    //
    // Each of these treats 401 as the authoritative expiry signal and
    // reports it to the session-expiry authority.

    async fn get_data(&self, path: &str) -> Result<Value, ClientError> {
        let token = self.bearer().await?;
        let resp = self
            .http
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await?;
        self.handle_data_response(path, resp).await
    }

    async fn send_json(
        &self,
        method: reqwest::Method,
        path: &str,
        body: &Value,
    ) -> Result<Value, ClientError> {
        let token = self.bearer().await?;
        let resp = self
            .http
            .request(method, self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await?;
        self.handle_data_response(path, resp).await
    }

    async fn handle_data_response(
        &self,
        context: &str,
        resp: reqwest::Response,
    ) -> Result<Value, ClientError> {
        if resp.status() == reqwest::StatusCode::UNAUTHORIZED {
            self.expiry.handle_unauthorized(context).await;
            return Err(ClientError::Unauthorized);
        }
        unwrap_envelope(resp).await
    }

    pub async fn list_requests(&self) -> Result<Vec<DesignRequest>, ClientError> {
        let data = self.get_data("/api/requests").await?;
        serde_json::from_value(data).map_err(|e| ClientError::Decode(e.to_string()))
    }

    pub async fn submit_request(
        &self,
        kind: &str,
        title: &str,
        description: &str,
        details: Value,
    ) -> Result<DesignRequest, ClientError> {
        let data = self
            .send_json(
                reqwest::Method::POST,
                "/api/requests",
                &json!({
                    "kind": kind,
                    "title": title,
                    "description": description,
                    "details": details,
                }),
            )
            .await?;
        serde_json::from_value(data).map_err(|e| ClientError::Decode(e.to_string()))
    }

    pub async fn set_request_status(
        &self,
        id: Uuid,
        status: &str,
    ) -> Result<DesignRequest, ClientError> {
        let data = self
            .send_json(
                reqwest::Method::PUT,
                &format!("/api/admin/requests/{}/status", id),
                &json!({ "status": status }),
            )
            .await?;
        serde_json::from_value(data).map_err(|e| ClientError::Decode(e.to_string()))
    }

    pub async fn library(&self) -> Result<Value, ClientError> {
        self.get_data("/api/assets").await
    }

    pub async fn list_clients(&self) -> Result<Value, ClientError> {
        self.get_data("/api/admin/clients").await
    }
}

/// Parse a portal response envelope, mapping error envelopes to
/// ClientError::Api.
async fn unwrap_envelope(resp: reqwest::Response) -> Result<Value, ClientError> {
    let status = resp.status();
    let body: Value = resp
        .json()
        .await
        .map_err(|e| ClientError::Decode(e.to_string()))?;

    let success = body.get("success").and_then(Value::as_bool).unwrap_or(false);
    if !status.is_success() || !success {
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("request failed")
            .to_string();
        return Err(ClientError::Api {
            status: status.as_u16(),
            message,
        });
    }

    body.get("data")
        .cloned()
        .ok_or_else(|| ClientError::Decode("missing data envelope".into()))
}

#[async_trait]
impl SessionProvider for PortalClient {
    async fn current_user(&self) -> Result<Option<SessionUser>, SessionError> {
        Ok(self.fetch_whoami().await?.map(|(user, _)| user))
    }
}

#[async_trait]
impl ProfileStore for PortalClient {
    async fn fetch_and_upsert(&self, user: &SessionUser) -> Result<Profile, SessionError> {
        match self.fetch_whoami().await? {
            Some((reported, profile)) if reported.id == user.id => Ok(profile),
            Some((reported, _)) => Err(SessionError::Backend(format!(
                "profile sync answered for a different user ({})",
                reported.email
            ))),
            None => Err(SessionError::Backend(
                "profile sync returned no user".to_string(),
            )),
        }
    }
}
