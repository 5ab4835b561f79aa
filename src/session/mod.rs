//! Client-side session layer: the auth gate that owns authentication state,
//! the focus/visibility refresh coordinator that keeps it fresh, and the
//! expiry authority that is the only component allowed to force a logout.

pub mod coordinator;
pub mod expiry;
pub mod gate;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use coordinator::{
    AbortReason, ActivityState, ProfileStore, RefreshCoordinator, RefreshOutcome, SessionProvider,
    SkipReason,
};
pub use expiry::{ExpiryNotice, SessionExpiry};
pub use gate::AuthGate;

/// The authenticated identity as reported by the session backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: Uuid,
    pub email: String,
    pub role: String,
}
