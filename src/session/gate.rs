use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::config;
use crate::database::models::profile::Profile;

use super::expiry::ExpiryNotice;
use super::SessionUser;

/// The signed-in user together with the application profile synchronized
/// from the backend.
#[derive(Debug, Clone)]
pub struct CurrentSession {
    pub user: SessionUser,
    pub profile: Profile,
}

#[derive(Debug, Default)]
struct GateState {
    bootstrapped: bool,
    session: Option<CurrentSession>,
    notice: Option<ExpiryNotice>,
}

/// Owns top-level authentication state for a client. Child views read it;
/// the refresh coordinator consults it for its guards and writes the
/// refreshed profile back through it.
#[derive(Debug)]
pub struct AuthGate {
    state: RwLock<GateState>,
    notice_ttl: Duration,
}

impl AuthGate {
    pub fn new() -> Self {
        Self::with_notice_ttl(Duration::from_secs(
            config::config().session.expiry_notice_secs,
        ))
    }

    pub fn with_notice_ttl(notice_ttl: Duration) -> Self {
        Self {
            state: RwLock::new(GateState::default()),
            notice_ttl,
        }
    }

    /// Finish the initial auth check. Until this runs, the refresh
    /// coordinator treats the gate as mid-bootstrap and does nothing.
    pub async fn complete_bootstrap(&self, session: Option<CurrentSession>) {
        let mut state = self.state.write().await;
        state.bootstrapped = true;
        state.session = session;
    }

    pub async fn is_bootstrapped(&self) -> bool {
        self.state.read().await.bootstrapped
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.session.is_some()
    }

    pub async fn current(&self) -> Option<CurrentSession> {
        self.state.read().await.session.clone()
    }

    pub async fn sign_in(&self, user: SessionUser, profile: Profile) {
        let mut state = self.state.write().await;
        state.bootstrapped = true;
        state.session = Some(CurrentSession { user, profile });
        state.notice = None;
    }

    /// Explicit user-initiated logout. Clears everything, no notice.
    pub async fn sign_out(&self) {
        let mut state = self.state.write().await;
        state.session = None;
        state.notice = None;
    }

    /// Replace the cached profile after a successful refresh. A no-op when
    /// the user signed out while the refresh was in flight.
    pub async fn update_profile(&self, profile: Profile) {
        let mut state = self.state.write().await;
        if let Some(session) = state.session.as_mut() {
            session.profile = profile;
        }
    }

    /// Forced logout on an authoritative unauthorized response. Only the
    /// expiry authority calls this.
    pub(super) async fn expire(&self, message: String) {
        let mut state = self.state.write().await;
        state.session = None;
        state.notice = Some(ExpiryNotice::new(message, Instant::now() + self.notice_ttl));
    }

    /// The "session expired" notice, while it is still live. Expired notices
    /// are pruned on read.
    pub async fn active_notice(&self) -> Option<ExpiryNotice> {
        {
            let state = self.state.read().await;
            match &state.notice {
                None => return None,
                Some(notice) if notice.is_live() => return Some(notice.clone()),
                Some(_) => {}
            }
        }
        let mut state = self.state.write().await;
        if state.notice.as_ref().is_some_and(|n| !n.is_live()) {
            state.notice = None;
        }
        state.notice.clone()
    }
}

impl Default for AuthGate {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn user() -> SessionUser {
        SessionUser {
            id: Uuid::new_v4(),
            email: "client@example.com".into(),
            role: "client".into(),
        }
    }

    fn profile(account_id: Uuid, name: &str) -> Profile {
        Profile {
            account_id,
            full_name: name.into(),
            company: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn bootstrap_then_sign_in_and_out() {
        let gate = AuthGate::with_notice_ttl(Duration::from_secs(5));
        assert!(!gate.is_bootstrapped().await);

        gate.complete_bootstrap(None).await;
        assert!(gate.is_bootstrapped().await);
        assert!(!gate.is_authenticated().await);

        let u = user();
        gate.sign_in(u.clone(), profile(u.id, "Alice")).await;
        assert!(gate.is_authenticated().await);

        gate.sign_out().await;
        assert!(!gate.is_authenticated().await);
        assert!(gate.active_notice().await.is_none());
    }

    #[tokio::test]
    async fn update_profile_is_noop_when_signed_out() {
        let gate = AuthGate::with_notice_ttl(Duration::from_secs(5));
        gate.complete_bootstrap(None).await;

        gate.update_profile(profile(Uuid::new_v4(), "Ghost")).await;
        assert!(gate.current().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn expiry_notice_goes_quiet_after_ttl() {
        let gate = AuthGate::with_notice_ttl(Duration::from_secs(5));
        let u = user();
        gate.sign_in(u.clone(), profile(u.id, "Alice")).await;

        gate.expire("Your session has expired".into()).await;
        assert!(!gate.is_authenticated().await);
        assert!(gate.active_notice().await.is_some());

        tokio::time::advance(Duration::from_secs(6)).await;
        assert!(gate.active_notice().await.is_none());
    }
}
