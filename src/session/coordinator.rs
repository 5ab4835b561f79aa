//! Focus/visibility refresh coordination.
//!
//! When a client regains the user's attention (window focus, tab made
//! visible, a watch tick in the CLI), the session may have gone stale in the
//! background. The coordinator revalidates it and broadcasts a data-version
//! bump so every data-owning view re-fetches on its own terms. It is
//! deliberately forgiving: an ambiguous validation failure keeps the current
//! session intact, because a network blip during a tab switch must not log
//! anyone out. Authoritative logout belongs exclusively to
//! [`super::expiry::SessionExpiry`].

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{watch, Mutex};
use tokio::time::Instant;
use tracing::{debug, error, warn};

use crate::config;
use crate::database::models::profile::Profile;

use super::gate::AuthGate;
use super::SessionUser;

/// Failure of a session-backend call, as seen by the coordinator. The
/// distinction is informational only: both variants are treated as
/// ambiguous.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("network error: {0}")]
    Network(String),

    #[error("backend error: {0}")]
    Backend(String),
}

/// "Who is currently signed in" against the session backend. Ok(None) means
/// the backend answered but reported no user.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn current_user(&self) -> Result<Option<SessionUser>, SessionError>;
}

/// Synchronizes the authenticated identity into the application profile and
/// returns the fresh record.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn fetch_and_upsert(&self, user: &SessionUser) -> Result<Profile, SessionError>;
}

/// Platform-reported state at the moment of the focus event.
#[derive(Debug, Clone, Copy)]
pub struct ActivityState {
    /// The surface is actually visible, not a backgrounded tab.
    pub visible: bool,
    /// The runtime reports network connectivity.
    pub online: bool,
}

impl ActivityState {
    pub fn foreground() -> Self {
        Self { visible: true, online: true }
    }
}

/// Why a focus event was dropped without any observable effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// A refresh is already in flight; the event is dropped, not queued.
    InFlight,
    /// The initial auth check has not finished yet.
    Bootstrapping,
    Unauthenticated,
    Hidden,
    Offline,
    /// Less than the minimum interval since the last successful refresh.
    Throttled,
}

/// Why a started refresh stopped without bumping the data version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    /// The validation call errored, timed out, or returned no user. Could be
    /// an expired session, could be a dropped packet; we keep the session.
    AmbiguousValidation,
    /// Validation succeeded but the profile sync failed.
    ProfileSync,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Refreshed,
    Skipped(SkipReason),
    Aborted(AbortReason),
}

/// Coordinates background session refreshes for one authenticated session.
///
/// Two states: idle and refreshing. The transition into refreshing is
/// guarded six ways (single-flight, bootstrapped, authenticated, visible,
/// online, throttle) so rapid focus flicker neither hammers the backend nor
/// races itself. Successful refreshes bump a shared data version; views
/// watch it and re-run their own fetches when it changes.
pub struct RefreshCoordinator {
    provider: Arc<dyn SessionProvider>,
    profiles: Arc<dyn ProfileStore>,
    min_interval: Duration,
    call_timeout: Option<Duration>,
    in_flight: AtomicBool,
    last_refresh: Mutex<Option<Instant>>,
    version_tx: watch::Sender<u64>,
}

/// Clears the in-flight flag when dropped, so the flag is released on every
/// exit path including panics.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl RefreshCoordinator {
    pub fn new(provider: Arc<dyn SessionProvider>, profiles: Arc<dyn ProfileStore>) -> Self {
        let session = &config::config().session;
        Self::with_timing(
            provider,
            profiles,
            Duration::from_secs(session.refresh_min_interval_secs),
            session.refresh_call_timeout_secs.map(Duration::from_secs),
        )
    }

    pub fn with_timing(
        provider: Arc<dyn SessionProvider>,
        profiles: Arc<dyn ProfileStore>,
        min_interval: Duration,
        call_timeout: Option<Duration>,
    ) -> Self {
        let (version_tx, _) = watch::channel(0);
        Self {
            provider,
            profiles,
            min_interval,
            call_timeout,
            in_flight: AtomicBool::new(false),
            last_refresh: Mutex::new(None),
            version_tx,
        }
    }

    /// Current data version. Starts at 0 and increments by exactly one per
    /// successful refresh.
    pub fn version(&self) -> u64 {
        *self.version_tx.borrow()
    }

    /// Subscribe to data-version bumps. The contract for consumers is
    /// simply: a changed value means "your data may be stale, re-fetch".
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.version_tx.subscribe()
    }

    /// Handle a focus/visibility event.
    ///
    /// Evaluates the guards and either drops the event silently or runs one
    /// refresh to completion. Never signs the user out and never propagates
    /// an error: this is best-effort housekeeping.
    pub async fn on_focus(&self, gate: &AuthGate, activity: ActivityState) -> RefreshOutcome {
        // Single-flight: claim the slot or drop the event. Concurrent
        // triggers are not queued; at-most-once semantics.
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return RefreshOutcome::Skipped(SkipReason::InFlight);
        }
        let _guard = InFlightGuard(&self.in_flight);

        if !gate.is_bootstrapped().await {
            return RefreshOutcome::Skipped(SkipReason::Bootstrapping);
        }
        if !gate.is_authenticated().await {
            return RefreshOutcome::Skipped(SkipReason::Unauthenticated);
        }
        if !activity.visible {
            return RefreshOutcome::Skipped(SkipReason::Hidden);
        }
        if !activity.online {
            return RefreshOutcome::Skipped(SkipReason::Offline);
        }
        if let Some(last) = *self.last_refresh.lock().await {
            if last.elapsed() < self.min_interval {
                return RefreshOutcome::Skipped(SkipReason::Throttled);
            }
        }

        self.refresh(gate).await
    }

    async fn refresh(&self, gate: &AuthGate) -> RefreshOutcome {
        let user = match self.bounded(self.provider.current_user()).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                warn!("Session check returned no user; keeping current session");
                return RefreshOutcome::Aborted(AbortReason::AmbiguousValidation);
            }
            Err(e) => {
                warn!("Session check failed ({}); keeping current session", e);
                return RefreshOutcome::Aborted(AbortReason::AmbiguousValidation);
            }
        };

        let profile = match self.bounded(self.profiles.fetch_and_upsert(&user)).await {
            Ok(profile) => profile,
            Err(e) => {
                error!("Profile sync failed during session refresh: {}", e);
                return RefreshOutcome::Aborted(AbortReason::ProfileSync);
            }
        };

        gate.update_profile(profile).await;
        *self.last_refresh.lock().await = Some(Instant::now());
        self.version_tx.send_modify(|v| *v += 1);
        debug!("Session refreshed; data version {}", self.version());

        RefreshOutcome::Refreshed
    }

    /// Apply the configured bound to a backend call. A call that outlives
    /// the bound reads as a network failure, which the caller treats as
    /// ambiguous; without this, a hung call would hold the single-flight
    /// slot until process exit.
    async fn bounded<T>(
        &self,
        fut: impl Future<Output = Result<T, SessionError>>,
    ) -> Result<T, SessionError> {
        match self.call_timeout {
            Some(limit) => match tokio::time::timeout(limit, fut).await {
                Ok(result) => result,
                Err(_) => Err(SessionError::Network(format!(
                    "call exceeded {}s",
                    limit.as_secs()
                ))),
            },
            None => fut.await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::sync::atomic::AtomicU64;
    use std::sync::Mutex as StdMutex;
    use tokio::sync::Notify;
    use uuid::Uuid;

    fn session_user() -> SessionUser {
        SessionUser {
            id: Uuid::new_v4(),
            email: "client@example.com".into(),
            role: "client".into(),
        }
    }

    fn profile_named(name: &str) -> Profile {
        Profile {
            account_id: Uuid::new_v4(),
            full_name: name.into(),
            company: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    async fn signed_in_gate() -> AuthGate {
        let gate = AuthGate::with_notice_ttl(Duration::from_secs(5));
        let user = session_user();
        gate.sign_in(user, profile_named("Stale Name")).await;
        gate
    }

    #[derive(Clone)]
    enum ProviderScript {
        User,
        Empty,
        Fail,
        Panic,
        /// Signal `entered`, then wait for `release` before answering.
        Block,
        /// Never answers; only reachable through the call timeout.
        Hang,
    }

    struct TestProvider {
        calls: AtomicU64,
        script: StdMutex<ProviderScript>,
        entered: Notify,
        release: Notify,
    }

    impl TestProvider {
        fn new(script: ProviderScript) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicU64::new(0),
                script: StdMutex::new(script),
                entered: Notify::new(),
                release: Notify::new(),
            })
        }

        fn set_script(&self, script: ProviderScript) {
            *self.script.lock().unwrap() = script;
        }

        fn call_count(&self) -> u64 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SessionProvider for TestProvider {
        async fn current_user(&self) -> Result<Option<SessionUser>, SessionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let script = self.script.lock().unwrap().clone();
            match script {
                ProviderScript::User => Ok(Some(session_user())),
                ProviderScript::Empty => Ok(None),
                ProviderScript::Fail => Err(SessionError::Network("connection reset".into())),
                ProviderScript::Panic => panic!("provider exploded"),
                ProviderScript::Block => {
                    self.entered.notify_one();
                    self.release.notified().await;
                    Ok(Some(session_user()))
                }
                ProviderScript::Hang => {
                    self.entered.notify_one();
                    std::future::pending().await
                }
            }
        }
    }

    struct TestStore {
        calls: AtomicU64,
        fail: bool,
    }

    impl TestStore {
        fn new() -> Arc<Self> {
            Arc::new(Self { calls: AtomicU64::new(0), fail: false })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self { calls: AtomicU64::new(0), fail: true })
        }
    }

    #[async_trait]
    impl ProfileStore for TestStore {
        async fn fetch_and_upsert(&self, _user: &SessionUser) -> Result<Profile, SessionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(SessionError::Backend("profiles table unavailable".into()))
            } else {
                Ok(profile_named("Fresh Name"))
            }
        }
    }

    fn coordinator(
        provider: Arc<TestProvider>,
        store: Arc<TestStore>,
    ) -> Arc<RefreshCoordinator> {
        Arc::new(RefreshCoordinator::with_timing(
            provider,
            store,
            Duration::from_secs(30),
            Some(Duration::from_secs(10)),
        ))
    }

    // Scenario A: all guards pass, validation succeeds.
    #[tokio::test(start_paused = true)]
    async fn successful_refresh_bumps_version_and_profile() {
        let provider = TestProvider::new(ProviderScript::User);
        let coord = coordinator(provider.clone(), TestStore::new());
        let gate = signed_in_gate().await;

        let outcome = coord.on_focus(&gate, ActivityState::foreground()).await;

        assert_eq!(outcome, RefreshOutcome::Refreshed);
        assert_eq!(coord.version(), 1);
        assert_eq!(provider.call_count(), 1);
        let session = gate.current().await.unwrap();
        assert_eq!(session.profile.full_name, "Fresh Name");
    }

    // Scenario B: second focus inside the throttle window is a no-op.
    #[tokio::test(start_paused = true)]
    async fn throttle_enforces_minimum_interval() {
        let provider = TestProvider::new(ProviderScript::User);
        let coord = coordinator(provider.clone(), TestStore::new());
        let gate = signed_in_gate().await;

        assert_eq!(
            coord.on_focus(&gate, ActivityState::foreground()).await,
            RefreshOutcome::Refreshed
        );

        tokio::time::advance(Duration::from_secs(10)).await;
        assert_eq!(
            coord.on_focus(&gate, ActivityState::foreground()).await,
            RefreshOutcome::Skipped(SkipReason::Throttled)
        );
        assert_eq!(coord.version(), 1);
        assert_eq!(provider.call_count(), 1);

        tokio::time::advance(Duration::from_secs(25)).await;
        assert_eq!(
            coord.on_focus(&gate, ActivityState::foreground()).await,
            RefreshOutcome::Refreshed
        );
        assert_eq!(coord.version(), 2);
    }

    // Scenario C plus the remaining guards: no observable effect at all.
    #[tokio::test(start_paused = true)]
    async fn guard_failures_produce_no_state_change() {
        let provider = TestProvider::new(ProviderScript::User);
        let coord = coordinator(provider.clone(), TestStore::new());

        let gate = AuthGate::with_notice_ttl(Duration::from_secs(5));
        assert_eq!(
            coord.on_focus(&gate, ActivityState::foreground()).await,
            RefreshOutcome::Skipped(SkipReason::Bootstrapping)
        );

        gate.complete_bootstrap(None).await;
        assert_eq!(
            coord.on_focus(&gate, ActivityState::foreground()).await,
            RefreshOutcome::Skipped(SkipReason::Unauthenticated)
        );

        let gate = signed_in_gate().await;
        assert_eq!(
            coord
                .on_focus(&gate, ActivityState { visible: false, online: true })
                .await,
            RefreshOutcome::Skipped(SkipReason::Hidden)
        );
        assert_eq!(
            coord
                .on_focus(&gate, ActivityState { visible: true, online: false })
                .await,
            RefreshOutcome::Skipped(SkipReason::Offline)
        );

        assert_eq!(coord.version(), 0);
        assert_eq!(provider.call_count(), 0);
    }

    // Scenario D: ambiguous validation failure keeps the session intact.
    #[tokio::test(start_paused = true)]
    async fn validation_failure_never_signs_out() {
        for script in [ProviderScript::Fail, ProviderScript::Empty] {
            let provider = TestProvider::new(script);
            let coord = coordinator(provider.clone(), TestStore::new());
            let gate = signed_in_gate().await;

            let outcome = coord.on_focus(&gate, ActivityState::foreground()).await;

            assert_eq!(
                outcome,
                RefreshOutcome::Aborted(AbortReason::AmbiguousValidation)
            );
            assert_eq!(coord.version(), 0);
            assert!(gate.is_authenticated().await);
            let session = gate.current().await.unwrap();
            assert_eq!(session.profile.full_name, "Stale Name");

            // The flag is released and no throttle stamp was recorded, so a
            // later attempt may proceed immediately.
            provider.set_script(ProviderScript::User);
            assert_eq!(
                coord.on_focus(&gate, ActivityState::foreground()).await,
                RefreshOutcome::Refreshed
            );
        }
    }

    // Profile sync failure after successful validation: no version bump.
    #[tokio::test(start_paused = true)]
    async fn profile_sync_failure_aborts_without_version_bump() {
        let provider = TestProvider::new(ProviderScript::User);
        let coord = coordinator(provider.clone(), TestStore::failing());
        let gate = signed_in_gate().await;

        let outcome = coord.on_focus(&gate, ActivityState::foreground()).await;

        assert_eq!(outcome, RefreshOutcome::Aborted(AbortReason::ProfileSync));
        assert_eq!(coord.version(), 0);
        assert!(gate.is_authenticated().await);
    }

    // Scenario E: a second focus event while the first refresh is awaiting
    // the backend is dropped; exactly one validation call happens.
    #[tokio::test(start_paused = true)]
    async fn overlapping_events_are_single_flight() {
        let provider = TestProvider::new(ProviderScript::Block);
        let coord = coordinator(provider.clone(), TestStore::new());
        let gate = Arc::new(signed_in_gate().await);

        let first = {
            let coord = coord.clone();
            let gate = gate.clone();
            tokio::spawn(async move { coord.on_focus(&gate, ActivityState::foreground()).await })
        };

        // Wait until the first refresh is parked inside the provider call
        provider.entered.notified().await;

        assert_eq!(
            coord.on_focus(&gate, ActivityState::foreground()).await,
            RefreshOutcome::Skipped(SkipReason::InFlight)
        );

        provider.release.notify_one();
        assert_eq!(first.await.unwrap(), RefreshOutcome::Refreshed);
        assert_eq!(provider.call_count(), 1);
        assert_eq!(coord.version(), 1);
    }

    // A hung backend call is cut off by the bound and reads as ambiguous;
    // the single-flight slot is freed for future attempts.
    #[tokio::test(start_paused = true)]
    async fn hung_call_is_bounded_and_releases_the_slot() {
        let provider = TestProvider::new(ProviderScript::Hang);
        let coord = coordinator(provider.clone(), TestStore::new());
        let gate = signed_in_gate().await;

        let outcome = coord.on_focus(&gate, ActivityState::foreground()).await;

        assert_eq!(
            outcome,
            RefreshOutcome::Aborted(AbortReason::AmbiguousValidation)
        );
        assert!(gate.is_authenticated().await);

        provider.set_script(ProviderScript::User);
        assert_eq!(
            coord.on_focus(&gate, ActivityState::foreground()).await,
            RefreshOutcome::Refreshed
        );
    }

    // The flag is released even when the provider panics.
    #[tokio::test(start_paused = true)]
    async fn panic_in_provider_still_releases_the_flag() {
        let provider = TestProvider::new(ProviderScript::Panic);
        let coord = coordinator(provider.clone(), TestStore::new());
        let gate = Arc::new(signed_in_gate().await);

        let task = {
            let coord = coord.clone();
            let gate = gate.clone();
            tokio::spawn(async move { coord.on_focus(&gate, ActivityState::foreground()).await })
        };
        assert!(task.await.is_err());

        provider.set_script(ProviderScript::User);
        assert_eq!(
            coord.on_focus(&gate, ActivityState::foreground()).await,
            RefreshOutcome::Refreshed
        );
        assert_eq!(coord.version(), 1);
    }

    // Watchers observe each bump exactly once and in order.
    #[tokio::test(start_paused = true)]
    async fn subscribers_see_monotonic_versions() {
        let provider = TestProvider::new(ProviderScript::User);
        let coord = coordinator(provider.clone(), TestStore::new());
        let gate = signed_in_gate().await;
        let mut rx = coord.subscribe();

        assert_eq!(*rx.borrow(), 0);

        coord.on_focus(&gate, ActivityState::foreground()).await;
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), 1);

        tokio::time::advance(Duration::from_secs(31)).await;
        coord.on_focus(&gate, ActivityState::foreground()).await;
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), 2);
    }
}
