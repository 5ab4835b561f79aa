use std::sync::Arc;
use tokio::time::Instant;
use tracing::warn;

use super::gate::AuthGate;

/// The user-facing "session expired" banner. Carries its own deadline so
/// consumers can drop it without bookkeeping.
#[derive(Debug, Clone)]
pub struct ExpiryNotice {
    pub message: String,
    shown_until: Instant,
}

impl ExpiryNotice {
    pub(super) fn new(message: String, shown_until: Instant) -> Self {
        Self { message, shown_until }
    }

    pub fn is_live(&self) -> bool {
        Instant::now() < self.shown_until
    }
}

/// The session-expiry authority.
///
/// This is the only component permitted to force a logout, and it acts only
/// on an explicit unauthorized response from a real authenticated data call.
/// The background focus-refresh never routes through here: its validation
/// failures are ambiguous (a network blip looks identical to a dead
/// session) and must not log anyone out.
#[derive(Debug, Clone)]
pub struct SessionExpiry {
    gate: Arc<AuthGate>,
}

impl SessionExpiry {
    pub fn new(gate: Arc<AuthGate>) -> Self {
        Self { gate }
    }

    /// React to an authoritative 401: clear the cached session and raise the
    /// time-limited notice.
    pub async fn handle_unauthorized(&self, context: &str) {
        if !self.gate.is_authenticated().await {
            return;
        }
        warn!("Unauthorized response from {}; signing out", context);
        self.gate
            .expire("Your session has expired. Please sign in again.".to_string())
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::profile::Profile;
    use crate::session::SessionUser;
    use chrono::Utc;
    use std::time::Duration;
    use uuid::Uuid;

    fn new_gate() -> Arc<AuthGate> {
        Arc::new(AuthGate::with_notice_ttl(Duration::from_secs(5)))
    }

    async fn sign_in(gate: &AuthGate) {
        let id = Uuid::new_v4();
        gate.sign_in(
            SessionUser {
                id,
                email: "client@example.com".into(),
                role: "client".into(),
            },
            Profile {
                account_id: id,
                full_name: "Alice".into(),
                company: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
        )
        .await;
    }

    #[tokio::test]
    async fn unauthorized_clears_session_and_raises_notice() {
        let gate = new_gate();
        sign_in(&gate).await;

        let expiry = SessionExpiry::new(gate.clone());
        expiry.handle_unauthorized("GET /api/requests").await;

        assert!(!gate.is_authenticated().await);
        let notice = gate.active_notice().await.expect("notice should be live");
        assert!(notice.message.contains("expired"));
    }

    #[tokio::test]
    async fn unauthorized_when_signed_out_is_a_noop() {
        let gate = new_gate();
        let expiry = SessionExpiry::new(gate.clone());

        expiry.handle_unauthorized("GET /api/requests").await;
        assert!(gate.active_notice().await.is_none());
    }
}
